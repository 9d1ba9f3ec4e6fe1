use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{full_name, Visit, VisitForm, VisitView};
use crate::schema::{residents, visits};

type ViewRow = (Visit, String, String);

fn to_view((visit, name, surname): ViewRow) -> VisitView {
    VisitView {
        visit,
        resident_name: full_name(&name, &surname),
    }
}

pub async fn list(connection: &mut AsyncPgConnection) -> Result<Vec<VisitView>, DieselError> {
    let rows: Vec<ViewRow> = visits::table
        .inner_join(residents::table.on(residents::id.eq(visits::resident_id)))
        .order(visits::entered_at.desc())
        .select((Visit::as_select(), residents::name, residents::surname))
        .load(connection)
        .await?;
    Ok(rows.into_iter().map(to_view).collect())
}

pub async fn find(
    connection: &mut AsyncPgConnection,
    visit_id: i32,
) -> Result<Option<VisitView>, DieselError> {
    let row: Option<ViewRow> = visits::table
        .inner_join(residents::table.on(residents::id.eq(visits::resident_id)))
        .filter(visits::id.eq(visit_id))
        .select((Visit::as_select(), residents::name, residents::surname))
        .first(connection)
        .await
        .optional()?;
    Ok(row.map(to_view))
}

pub async fn insert(connection: &mut AsyncPgConnection, form: &VisitForm) -> Result<Visit, DieselError> {
    diesel::insert_into(visits::table)
        .values(form)
        .returning(Visit::as_returning())
        .get_result(connection)
        .await
}

pub async fn update(
    connection: &mut AsyncPgConnection,
    visit_id: i32,
    form: &VisitForm,
) -> Result<Option<Visit>, DieselError> {
    diesel::update(visits::table.find(visit_id))
        .set(form)
        .returning(Visit::as_returning())
        .get_result(connection)
        .await
        .optional()
}

pub async fn delete(connection: &mut AsyncPgConnection, visit_id: i32) -> Result<bool, DieselError> {
    let deleted = diesel::delete(visits::table.find(visit_id))
        .execute(connection)
        .await?;
    Ok(deleted > 0)
}
