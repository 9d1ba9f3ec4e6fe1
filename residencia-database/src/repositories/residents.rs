use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{NewResident, Resident, ResidentChanges, ResidentDetails, ResidentView};
use crate::repositories::{activities, diets, treatments};
use crate::schema::{residents, rooms};

type ViewRow = (Resident, Option<i32>, Option<String>, Option<i32>);

fn to_view((resident, room_number, room_type, floor): ViewRow) -> ResidentView {
    ResidentView {
        resident,
        room_number,
        room_type,
        floor,
    }
}

pub async fn list(connection: &mut AsyncPgConnection) -> Result<Vec<ResidentView>, DieselError> {
    let rows: Vec<ViewRow> = residents::table
        .left_join(rooms::table.on(rooms::id.nullable().eq(residents::room_id)))
        .order((residents::surname.asc(), residents::name.asc()))
        .select((
            Resident::as_select(),
            rooms::number.nullable(),
            rooms::room_type.nullable(),
            rooms::floor.nullable(),
        ))
        .load(connection)
        .await?;
    Ok(rows.into_iter().map(to_view).collect())
}

pub async fn find(
    connection: &mut AsyncPgConnection,
    resident_id: i32,
) -> Result<Option<ResidentView>, DieselError> {
    let row: Option<ViewRow> = residents::table
        .left_join(rooms::table.on(rooms::id.nullable().eq(residents::room_id)))
        .filter(residents::id.eq(resident_id))
        .select((
            Resident::as_select(),
            rooms::number.nullable(),
            rooms::room_type.nullable(),
            rooms::floor.nullable(),
        ))
        .first(connection)
        .await
        .optional()?;
    Ok(row.map(to_view))
}

pub async fn details(
    connection: &mut AsyncPgConnection,
    resident_id: i32,
) -> Result<Option<ResidentDetails>, DieselError> {
    let Some(resident) = find(connection, resident_id).await? else {
        return Ok(None);
    };
    let treatments = treatments::for_resident(connection, resident_id, true).await?;
    let diets = diets::assignments_for(connection, resident_id, true).await?;
    let activities = activities::participation_of(connection, resident_id).await?;
    Ok(Some(ResidentDetails {
        resident,
        treatments,
        diets,
        activities,
    }))
}

pub async fn national_id_taken(
    connection: &mut AsyncPgConnection,
    national_id: &str,
    excluding: Option<i32>,
) -> Result<bool, DieselError> {
    let with_national_id = residents::table.filter(residents::national_id.eq(national_id));
    let count: i64 = match excluding {
        Some(resident_id) => {
            with_national_id
                .filter(residents::id.ne(resident_id))
                .count()
                .get_result(connection)
                .await?
        }
        None => with_national_id.count().get_result(connection).await?,
    };
    Ok(count > 0)
}

pub async fn insert(
    connection: &mut AsyncPgConnection,
    resident: NewResident<'_>,
) -> Result<Resident, DieselError> {
    diesel::insert_into(residents::table)
        .values(resident)
        .returning(Resident::as_returning())
        .get_result(connection)
        .await
}

/// Applies the changed columns. Returns `None` if the resident does not exist.
pub async fn update(
    connection: &mut AsyncPgConnection,
    resident_id: i32,
    changes: ResidentChanges<'_>,
) -> Result<Option<Resident>, DieselError> {
    if changes.is_empty() {
        return residents::table
            .find(resident_id)
            .select(Resident::as_select())
            .first(connection)
            .await
            .optional();
    }
    diesel::update(residents::table.find(resident_id))
        .set(changes)
        .returning(Resident::as_returning())
        .get_result(connection)
        .await
        .optional()
}

pub async fn exists(connection: &mut AsyncPgConnection, resident_id: i32) -> Result<bool, DieselError> {
    let count: i64 = residents::table
        .find(resident_id)
        .count()
        .get_result(connection)
        .await?;
    Ok(count > 0)
}
