use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{Medication, MedicationForm};
use crate::schema::medications;

pub async fn list(connection: &mut AsyncPgConnection) -> Result<Vec<Medication>, DieselError> {
    medications::table
        .order(medications::name.asc())
        .select(Medication::as_select())
        .load(connection)
        .await
}

pub async fn find(
    connection: &mut AsyncPgConnection,
    medication_id: i32,
) -> Result<Option<Medication>, DieselError> {
    medications::table
        .find(medication_id)
        .select(Medication::as_select())
        .first(connection)
        .await
        .optional()
}

pub async fn insert(
    connection: &mut AsyncPgConnection,
    form: &MedicationForm,
) -> Result<Medication, DieselError> {
    diesel::insert_into(medications::table)
        .values(form)
        .returning(Medication::as_returning())
        .get_result(connection)
        .await
}

pub async fn update(
    connection: &mut AsyncPgConnection,
    medication_id: i32,
    form: &MedicationForm,
) -> Result<Option<Medication>, DieselError> {
    diesel::update(medications::table.find(medication_id))
        .set(form)
        .returning(Medication::as_returning())
        .get_result(connection)
        .await
        .optional()
}

pub async fn delete(
    connection: &mut AsyncPgConnection,
    medication_id: i32,
) -> Result<bool, DieselError> {
    let deleted = diesel::delete(medications::table.find(medication_id))
        .execute(connection)
        .await?;
    Ok(deleted > 0)
}

/// Medications whose stock dropped below their minimum.
pub async fn below_minimum(
    connection: &mut AsyncPgConnection,
) -> Result<Vec<Medication>, DieselError> {
    medications::table
        .filter(medications::stock.lt(medications::minimum_stock))
        .order(medications::name.asc())
        .select(Medication::as_select())
        .load(connection)
        .await
}
