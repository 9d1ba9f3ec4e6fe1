use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use residencia_occupancy::model::{NewRoomChange, UnknownVariant};
use residencia_occupancy::{OccupancyStore, Placement, Room, RoomChange, RoomStatus};

use crate::models::{NewRoomChangeRow, RoomChangeRow, RoomRow};
use crate::schema::{residents, room_changes, rooms};

/// [`OccupancyStore`] on a PostgreSQL connection. Create it inside
/// [`crate::transaction`]: room and resident reads take row locks that are held
/// until the surrounding transaction ends.
pub struct PgOccupancyStore<'a> {
    connection: &'a mut AsyncPgConnection,
}

impl<'a> PgOccupancyStore<'a> {
    pub fn new(connection: &'a mut AsyncPgConnection) -> Self {
        Self { connection }
    }
}

fn corrupt(err: UnknownVariant) -> DieselError {
    DieselError::DeserializationError(Box::new(err))
}

fn to_room(row: Option<RoomRow>) -> Result<Option<Room>, DieselError> {
    row.map(Room::try_from).transpose().map_err(corrupt)
}

#[async_trait]
impl OccupancyStore for PgOccupancyStore<'_> {
    type Error = DieselError;

    async fn room(&mut self, room_id: i32) -> Result<Option<Room>, Self::Error> {
        let row = rooms::table
            .find(room_id)
            .select(RoomRow::as_select())
            .for_update()
            .first(&mut *self.connection)
            .await
            .optional()?;
        to_room(row)
    }

    async fn room_by_number(&mut self, number: i32) -> Result<Option<Room>, Self::Error> {
        let row = rooms::table
            .filter(rooms::number.eq(number))
            .select(RoomRow::as_select())
            .first(&mut *self.connection)
            .await
            .optional()?;
        to_room(row)
    }

    async fn lock_rooms(&mut self, room_ids: &[i32]) -> Result<Vec<Room>, Self::Error> {
        // rows are locked in the ORDER BY order
        let rows = rooms::table
            .filter(rooms::id.eq_any(room_ids))
            .order(rooms::id.asc())
            .select(RoomRow::as_select())
            .for_update()
            .load(&mut *self.connection)
            .await?;
        rows.into_iter()
            .map(|row| Room::try_from(row).map_err(corrupt))
            .collect()
    }

    async fn placement(&mut self, resident_id: i32) -> Result<Option<Placement>, Self::Error> {
        let row = residents::table
            .find(resident_id)
            .select((residents::id, residents::room_id, residents::active))
            .for_update()
            .first::<(i32, Option<i32>, bool)>(&mut *self.connection)
            .await
            .optional()?;
        Ok(row.map(|(resident_id, room_id, active)| Placement {
            resident_id,
            room_id,
            active,
        }))
    }

    async fn active_occupants(&mut self, room_id: i32) -> Result<i64, Self::Error> {
        residents::table
            .filter(residents::room_id.eq(room_id))
            .filter(residents::active.eq(true))
            .count()
            .get_result(&mut *self.connection)
            .await
    }

    async fn change_count(&mut self, room_id: i32) -> Result<i64, Self::Error> {
        room_changes::table
            .filter(
                room_changes::new_room_id
                    .eq(room_id)
                    .or(room_changes::previous_room_id.eq(room_id)),
            )
            .count()
            .get_result(&mut *self.connection)
            .await
    }

    async fn set_room_status(
        &mut self,
        room_id: i32,
        status: RoomStatus,
    ) -> Result<(), Self::Error> {
        diesel::update(rooms::table.find(room_id))
            .set(rooms::status.eq(status.as_str()))
            .execute(&mut *self.connection)
            .await?;
        Ok(())
    }

    async fn set_resident_room(
        &mut self,
        resident_id: i32,
        room_id: Option<i32>,
    ) -> Result<(), Self::Error> {
        diesel::update(residents::table.find(resident_id))
            .set(residents::room_id.eq(room_id))
            .execute(&mut *self.connection)
            .await?;
        Ok(())
    }

    async fn set_resident_active(
        &mut self,
        resident_id: i32,
        active: bool,
    ) -> Result<(), Self::Error> {
        diesel::update(residents::table.find(resident_id))
            .set(residents::active.eq(active))
            .execute(&mut *self.connection)
            .await?;
        Ok(())
    }

    async fn append_change(&mut self, change: NewRoomChange) -> Result<RoomChange, Self::Error> {
        let row = diesel::insert_into(room_changes::table)
            .values(NewRoomChangeRow {
                resident_id: change.resident_id,
                previous_room_id: change.previous_room_id,
                new_room_id: change.new_room_id,
                reason: &change.reason,
                staff_id: change.staff_id,
            })
            .returning(RoomChangeRow::as_returning())
            .get_result(&mut *self.connection)
            .await?;
        Ok(row.into())
    }
}
