use std::collections::HashMap;

use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use residencia_occupancy::{Room, RoomStatus};

use crate::models::{
    NewRoom, Resident, RoomChangeRow, RoomChangeView, RoomChanges, RoomRow,
};
use crate::schema::{residents, room_changes, rooms, staff};

fn to_domain(row: RoomRow) -> Result<Room, DieselError> {
    Room::try_from(row).map_err(|err| DieselError::DeserializationError(Box::new(err)))
}

fn convert(rows: Vec<RoomRow>) -> Result<Vec<Room>, DieselError> {
    rows.into_iter().map(to_domain).collect()
}

pub async fn list(connection: &mut AsyncPgConnection) -> Result<Vec<Room>, DieselError> {
    let rows = rooms::table
        .order((rooms::floor.asc(), rooms::number.asc()))
        .select(RoomRow::as_select())
        .load(connection)
        .await?;
    convert(rows)
}

pub async fn list_available(connection: &mut AsyncPgConnection) -> Result<Vec<Room>, DieselError> {
    let rows = rooms::table
        .filter(rooms::status.eq(RoomStatus::Available.as_str()))
        .order((rooms::floor.asc(), rooms::number.asc()))
        .select(RoomRow::as_select())
        .load(connection)
        .await?;
    convert(rows)
}

pub async fn find(
    connection: &mut AsyncPgConnection,
    room_id: i32,
) -> Result<Option<Room>, DieselError> {
    let row = rooms::table
        .find(room_id)
        .select(RoomRow::as_select())
        .first(connection)
        .await
        .optional()?;
    row.map(to_domain).transpose()
}

/// Whether another room already uses `number`.
pub async fn number_taken(
    connection: &mut AsyncPgConnection,
    number: i32,
    excluding: Option<i32>,
) -> Result<bool, DieselError> {
    let with_number = rooms::table.filter(rooms::number.eq(number));
    let count: i64 = match excluding {
        Some(room_id) => {
            with_number
                .filter(rooms::id.ne(room_id))
                .count()
                .get_result(connection)
                .await?
        }
        None => with_number.count().get_result(connection).await?,
    };
    Ok(count > 0)
}

pub async fn insert(
    connection: &mut AsyncPgConnection,
    room: NewRoom<'_>,
) -> Result<Room, DieselError> {
    let row = diesel::insert_into(rooms::table)
        .values(room)
        .returning(RoomRow::as_returning())
        .get_result(connection)
        .await?;
    to_domain(row)
}

pub async fn update(
    connection: &mut AsyncPgConnection,
    room_id: i32,
    changes: RoomChanges<'_>,
) -> Result<Option<Room>, DieselError> {
    if changes.is_empty() {
        return find(connection, room_id).await;
    }
    let row = diesel::update(rooms::table.find(room_id))
        .set(changes)
        .returning(RoomRow::as_returning())
        .get_result(connection)
        .await
        .optional()?;
    row.map(to_domain).transpose()
}

pub async fn delete(connection: &mut AsyncPgConnection, room_id: i32) -> Result<bool, DieselError> {
    let deleted = diesel::delete(rooms::table.find(room_id))
        .execute(connection)
        .await?;
    Ok(deleted > 0)
}

/// Active residents assigned to the room.
pub async fn residents(
    connection: &mut AsyncPgConnection,
    room_id: i32,
) -> Result<Vec<Resident>, DieselError> {
    residents::table
        .filter(residents::room_id.eq(room_id))
        .filter(residents::active.eq(true))
        .order((residents::surname.asc(), residents::name.asc()))
        .select(Resident::as_select())
        .load(connection)
        .await
}

/// Change history touching the room, newest first.
pub async fn history(
    connection: &mut AsyncPgConnection,
    room_id: i32,
) -> Result<Vec<RoomChangeView>, DieselError> {
    let rows: Vec<(RoomChangeRow, String, String, Option<String>, Option<String>)> =
        room_changes::table
            .inner_join(residents::table.on(residents::id.eq(room_changes::resident_id)))
            .left_join(staff::table.on(staff::id.nullable().eq(room_changes::staff_id)))
            .filter(
                room_changes::new_room_id
                    .eq(room_id)
                    .or(room_changes::previous_room_id.eq(room_id)),
            )
            .order((room_changes::changed_at.desc(), room_changes::id.desc()))
            .select((
                RoomChangeRow::as_select(),
                residents::name,
                residents::surname,
                staff::name.nullable(),
                staff::surname.nullable(),
            ))
            .load(connection)
            .await?;

    let room_ids: Vec<i32> = rows
        .iter()
        .flat_map(|(change, ..)| [Some(change.new_room_id), change.previous_room_id])
        .flatten()
        .collect();
    let numbers: HashMap<i32, i32> = rooms::table
        .filter(rooms::id.eq_any(room_ids))
        .select((rooms::id, rooms::number))
        .load::<(i32, i32)>(connection)
        .await?
        .into_iter()
        .collect();

    Ok(rows
        .into_iter()
        .map(|(change, name, surname, staff_name, staff_surname)| RoomChangeView {
            id: change.id,
            changed_at: change.changed_at,
            reason: change.reason,
            resident_id: change.resident_id,
            resident_name: name,
            resident_surname: surname,
            previous_room_number: change
                .previous_room_id
                .and_then(|id| numbers.get(&id).copied()),
            new_room_number: numbers.get(&change.new_room_id).copied(),
            staff_name: staff_name
                .zip(staff_surname)
                .map(|(name, surname)| crate::models::full_name(&name, &surname)),
        })
        .collect())
}
