use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{full_name, Incident, IncidentForm, IncidentView};
use crate::schema::{incidents, residents, staff};

type ViewRow = (
    Incident,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn join_name(name: Option<String>, surname: Option<String>) -> Option<String> {
    name.zip(surname).map(|(name, surname)| full_name(&name, &surname))
}

fn to_view((incident, name, surname, staff_name, staff_surname): ViewRow) -> IncidentView {
    IncidentView {
        incident,
        resident_name: join_name(name, surname),
        reported_by_name: join_name(staff_name, staff_surname),
    }
}

macro_rules! joined {
    () => {
        incidents::table
            .left_join(residents::table.on(residents::id.nullable().eq(incidents::resident_id)))
            .left_join(staff::table.on(staff::id.nullable().eq(incidents::reported_by)))
            .select((
                Incident::as_select(),
                residents::name.nullable(),
                residents::surname.nullable(),
                staff::name.nullable(),
                staff::surname.nullable(),
            ))
    };
}

pub async fn list(connection: &mut AsyncPgConnection) -> Result<Vec<IncidentView>, DieselError> {
    let rows: Vec<ViewRow> = joined!()
        .order(incidents::occurred_at.desc())
        .load(connection)
        .await?;
    Ok(rows.into_iter().map(to_view).collect())
}

pub async fn find(
    connection: &mut AsyncPgConnection,
    incident_id: i32,
) -> Result<Option<IncidentView>, DieselError> {
    let row: Option<ViewRow> = joined!()
        .filter(incidents::id.eq(incident_id))
        .first(connection)
        .await
        .optional()?;
    Ok(row.map(to_view))
}

pub async fn insert(
    connection: &mut AsyncPgConnection,
    form: &IncidentForm,
) -> Result<Incident, DieselError> {
    diesel::insert_into(incidents::table)
        .values(form)
        .returning(Incident::as_returning())
        .get_result(connection)
        .await
}

pub async fn update(
    connection: &mut AsyncPgConnection,
    incident_id: i32,
    form: &IncidentForm,
) -> Result<Option<Incident>, DieselError> {
    diesel::update(incidents::table.find(incident_id))
        .set(form)
        .returning(Incident::as_returning())
        .get_result(connection)
        .await
        .optional()
}

pub async fn delete(
    connection: &mut AsyncPgConnection,
    incident_id: i32,
) -> Result<bool, DieselError> {
    let deleted = diesel::delete(incidents::table.find(incident_id))
        .execute(connection)
        .await?;
    Ok(deleted > 0)
}
