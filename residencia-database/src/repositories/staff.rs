use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{Staff, StaffForm};
use crate::schema::staff;

pub async fn list(connection: &mut AsyncPgConnection) -> Result<Vec<Staff>, DieselError> {
    staff::table
        .order((staff::surname.asc(), staff::name.asc()))
        .select(Staff::as_select())
        .load(connection)
        .await
}

pub async fn find(
    connection: &mut AsyncPgConnection,
    staff_id: i32,
) -> Result<Option<Staff>, DieselError> {
    staff::table
        .find(staff_id)
        .select(Staff::as_select())
        .first(connection)
        .await
        .optional()
}

pub async fn exists(connection: &mut AsyncPgConnection, staff_id: i32) -> Result<bool, DieselError> {
    let count: i64 = staff::table
        .find(staff_id)
        .count()
        .get_result(connection)
        .await?;
    Ok(count > 0)
}

pub async fn insert(
    connection: &mut AsyncPgConnection,
    form: &StaffForm,
) -> Result<Staff, DieselError> {
    diesel::insert_into(staff::table)
        .values(form)
        .returning(Staff::as_returning())
        .get_result(connection)
        .await
}

pub async fn update(
    connection: &mut AsyncPgConnection,
    staff_id: i32,
    form: &StaffForm,
) -> Result<Option<Staff>, DieselError> {
    diesel::update(staff::table.find(staff_id))
        .set(form)
        .returning(Staff::as_returning())
        .get_result(connection)
        .await
        .optional()
}

pub async fn set_active(
    connection: &mut AsyncPgConnection,
    staff_id: i32,
    active: bool,
) -> Result<Option<Staff>, DieselError> {
    diesel::update(staff::table.find(staff_id))
        .set(staff::active.eq(active))
        .returning(Staff::as_returning())
        .get_result(connection)
        .await
        .optional()
}

pub async fn delete(connection: &mut AsyncPgConnection, staff_id: i32) -> Result<bool, DieselError> {
    let deleted = diesel::delete(staff::table.find(staff_id))
        .execute(connection)
        .await?;
    Ok(deleted > 0)
}

/// Active members of `category` that have an email address.
pub async fn reachable_in_category(
    connection: &mut AsyncPgConnection,
    category: &str,
) -> Result<Vec<Staff>, DieselError> {
    staff::table
        .filter(staff::category.eq(category))
        .filter(staff::active.eq(true))
        .filter(staff::email.is_not_null())
        .select(Staff::as_select())
        .load(connection)
        .await
}
