use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{full_name, ScheduledDose, Treatment, TreatmentForm, TreatmentView};
use crate::schema::{medications, residents, staff, treatments};

type ViewRow = (Treatment, String, String, String, String, String);

fn to_view(
    (treatment, name, surname, medication_name, staff_name, staff_surname): ViewRow,
) -> TreatmentView {
    TreatmentView {
        treatment,
        resident_name: full_name(&name, &surname),
        medication_name,
        staff_name: full_name(&staff_name, &staff_surname),
    }
}

macro_rules! joined {
    () => {
        treatments::table
            .inner_join(residents::table.on(residents::id.eq(treatments::resident_id)))
            .inner_join(medications::table.on(medications::id.eq(treatments::medication_id)))
            .inner_join(staff::table.on(staff::id.eq(treatments::staff_id)))
    };
}

macro_rules! view_columns {
    () => {
        (
            Treatment::as_select(),
            residents::name,
            residents::surname,
            medications::name,
            staff::name,
            staff::surname,
        )
    };
}

pub async fn list(connection: &mut AsyncPgConnection) -> Result<Vec<TreatmentView>, DieselError> {
    let rows: Vec<ViewRow> = joined!()
        .order((treatments::start_date.desc(), treatments::id.desc()))
        .select(view_columns!())
        .load(connection)
        .await?;
    Ok(rows.into_iter().map(to_view).collect())
}

pub async fn find(
    connection: &mut AsyncPgConnection,
    treatment_id: i32,
) -> Result<Option<TreatmentView>, DieselError> {
    let row: Option<ViewRow> = joined!()
        .filter(treatments::id.eq(treatment_id))
        .select(view_columns!())
        .first(connection)
        .await
        .optional()?;
    Ok(row.map(to_view))
}

pub async fn for_resident(
    connection: &mut AsyncPgConnection,
    resident_id: i32,
    active_only: bool,
) -> Result<Vec<TreatmentView>, DieselError> {
    let rows: Vec<ViewRow> = if active_only {
        joined!()
            .filter(treatments::resident_id.eq(resident_id))
            .filter(treatments::active.eq(true))
            .order(treatments::start_date.desc())
            .select(view_columns!())
            .load(connection)
            .await?
    } else {
        joined!()
            .filter(treatments::resident_id.eq(resident_id))
            .order(treatments::start_date.desc())
            .select(view_columns!())
            .load(connection)
            .await?
    };
    Ok(rows.into_iter().map(to_view).collect())
}

pub async fn insert(
    connection: &mut AsyncPgConnection,
    form: &TreatmentForm,
) -> Result<Treatment, DieselError> {
    diesel::insert_into(treatments::table)
        .values(form)
        .returning(Treatment::as_returning())
        .get_result(connection)
        .await
}

pub async fn update(
    connection: &mut AsyncPgConnection,
    treatment_id: i32,
    form: &TreatmentForm,
) -> Result<Option<Treatment>, DieselError> {
    diesel::update(treatments::table.find(treatment_id))
        .set(form)
        .returning(Treatment::as_returning())
        .get_result(connection)
        .await
        .optional()
}

pub async fn set_active(
    connection: &mut AsyncPgConnection,
    treatment_id: i32,
    active: bool,
) -> Result<Option<Treatment>, DieselError> {
    diesel::update(treatments::table.find(treatment_id))
        .set(treatments::active.eq(active))
        .returning(Treatment::as_returning())
        .get_result(connection)
        .await
        .optional()
}

pub async fn delete(
    connection: &mut AsyncPgConnection,
    treatment_id: i32,
) -> Result<bool, DieselError> {
    let deleted = diesel::delete(treatments::table.find(treatment_id))
        .execute(connection)
        .await?;
    Ok(deleted > 0)
}

/// Active treatments of active residents, ordered by resident.
pub async fn scheduled_doses(
    connection: &mut AsyncPgConnection,
) -> Result<Vec<ScheduledDose>, DieselError> {
    let rows: Vec<(i32, String, String, String, String, String, String, String)> =
        treatments::table
            .inner_join(residents::table.on(residents::id.eq(treatments::resident_id)))
            .inner_join(medications::table.on(medications::id.eq(treatments::medication_id)))
            .filter(treatments::active.eq(true))
            .filter(residents::active.eq(true))
            .order((residents::id.asc(), medications::name.asc()))
            .select((
                residents::id,
                residents::name,
                residents::surname,
                residents::email,
                medications::name,
                treatments::dose,
                treatments::frequency,
                treatments::route,
            ))
            .load(connection)
            .await?;
    Ok(rows
        .into_iter()
        .map(
            |(resident_id, name, surname, resident_email, medication, dose, frequency, route)| {
                ScheduledDose {
                    resident_id,
                    resident_name: full_name(&name, &surname),
                    resident_email,
                    medication,
                    dose,
                    frequency,
                    route,
                }
            },
        )
        .collect())
}
