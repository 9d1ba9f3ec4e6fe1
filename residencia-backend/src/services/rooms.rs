use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::scoped_futures::ScopedFutureExt;
use residencia_database::models::{NewRoom, RoomChanges};
use residencia_database::repositories::rooms;
use residencia_database::{transaction, PgOccupancyStore, Pool};
use residencia_occupancy::{coordinator, OccupancyStore, Room, RoomStatus, RoomType};
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::validation;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub number: Option<i32>,
    #[serde(alias = "type")]
    pub room_type: Option<RoomType>,
    pub floor: Option<i32>,
    pub status: Option<RoomStatus>,
    pub notes: Option<String>,
}

fn positive_number(number: i32) -> Result<i32, AppError> {
    if number > 0 {
        Ok(number)
    } else {
        Err(AppError::Validation("number must be positive".to_owned()))
    }
}

fn new_room(payload: &RoomPayload) -> Result<NewRoom<'_>, AppError> {
    let status = payload.status.unwrap_or(RoomStatus::Available);
    if status == RoomStatus::Occupied {
        return Err(AppError::Conflict(format!(
            "a new room has no residents and cannot be {status}"
        )));
    }
    Ok(NewRoom {
        number: positive_number(validation::present("number", payload.number)?)?,
        room_type: validation::present("roomType", payload.room_type)?.as_str(),
        floor: validation::present("floor", payload.floor)?,
        status: status.as_str(),
        notes: payload.notes.as_deref(),
    })
}

fn room_changes(payload: &RoomPayload) -> Result<RoomChanges<'_>, AppError> {
    Ok(RoomChanges {
        number: payload.number.map(positive_number).transpose()?,
        room_type: payload.room_type.map(RoomType::as_str),
        floor: payload.floor,
        status: payload.status.map(RoomStatus::as_str),
        notes: payload.notes.as_deref(),
    })
}

pub async fn create(pool: &Pool, payload: &RoomPayload) -> Result<Room, AppError> {
    let room = new_room(payload)?;
    let mut connection = pool.get().await?;
    let number = room.number;
    if rooms::number_taken(&mut connection, number, None).await? {
        return Err(duplicate_number(number));
    }
    let room = rooms::insert(&mut connection, room)
        .await
        .map_err(|err| insert_error(number, err))?;
    info!(room_id = room.id, number = room.number, status = %room.status, "room created");
    Ok(room)
}

fn duplicate_number(number: i32) -> AppError {
    AppError::Validation(format!("room number {number} already exists"))
}

// a concurrent create can take the number between the check and the insert
fn insert_error(number: i32, err: DieselError) -> AppError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            duplicate_number(number)
        }
        err => err.into(),
    }
}

/// Edits a room. Status edits are checked against the active residents of the room.
pub async fn update(pool: &Pool, room_id: i32, payload: &RoomPayload) -> Result<Room, AppError> {
    let changes = room_changes(payload)?;
    transaction(pool, |connection| {
        async move {
            let mut store = PgOccupancyStore::new(connection);
            let room = store
                .room(room_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("room {room_id} not found")))?;
            if let Some(status) = payload.status {
                coordinator::check_status_edit(&mut store, &room, status).await?;
            }
            if let Some(number) = changes.number {
                if rooms::number_taken(connection, number, Some(room_id)).await? {
                    return Err(AppError::Conflict(format!(
                        "room number {number} is already used by another room"
                    )));
                }
            }
            let updated = rooms::update(connection, room_id, changes)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("room {room_id} not found")))?;
            if updated.status != room.status {
                info!(room_id, status = %updated.status, "room status changed");
            }
            Ok(updated)
        }
        .scope_boxed()
    })
    .await
}

/// Deletes a room nobody lives in and no history refers to.
pub async fn remove(pool: &Pool, room_id: i32) -> Result<(), AppError> {
    transaction(pool, |connection| {
        async move {
            let mut store = PgOccupancyStore::new(connection);
            let room = store
                .room(room_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("room {room_id} not found")))?;
            coordinator::check_removal(&mut store, &room).await?;
            rooms::delete(connection, room_id).await?;
            info!(room_id, number = room.number, "room deleted");
            Ok(())
        }
        .scope_boxed()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RoomPayload {
        RoomPayload {
            number: Some(101),
            room_type: Some(RoomType::Double),
            floor: Some(1),
            ..RoomPayload::default()
        }
    }

    #[test]
    fn new_rooms_default_to_available() {
        let payload = payload();
        let room = new_room(&payload).unwrap();
        assert_eq!(room.status, "Disponible");
        assert_eq!(room.room_type, "Doble");
    }

    #[test]
    fn new_rooms_cannot_start_occupied() {
        let payload = RoomPayload {
            status: Some(RoomStatus::Occupied),
            ..payload()
        };
        assert!(matches!(new_room(&payload), Err(AppError::Conflict(_))));
    }

    #[test]
    fn number_type_and_floor_are_required() {
        for payload in [
            RoomPayload {
                number: None,
                ..payload()
            },
            RoomPayload {
                number: Some(0),
                ..payload()
            },
            RoomPayload {
                room_type: None,
                ..payload()
            },
            RoomPayload {
                floor: None,
                ..payload()
            },
        ] {
            assert!(matches!(new_room(&payload), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn racing_duplicate_numbers_are_validation_errors() {
        let duplicate = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(String::from(
                "duplicate key value violates unique constraint \"rooms_number_key\"",
            )),
        );
        match insert_error(101, duplicate) {
            AppError::Validation(message) => {
                assert_eq!(message, "room number 101 already exists");
            }
            other => panic!("unexpected error {other:?}"),
        }
        let missing = DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new(String::from("violates foreign key constraint")),
        );
        assert!(matches!(insert_error(101, missing), AppError::Conflict(_)));
    }

    #[test]
    fn payload_uses_stored_names() {
        let payload: RoomPayload = serde_json::from_str(
            r#"{ "number": 3, "roomType": "Triple", "floor": 0, "status": "Mantenimiento" }"#,
        )
        .unwrap();
        assert_eq!(payload.room_type, Some(RoomType::Triple));
        assert_eq!(payload.status, Some(RoomStatus::Maintenance));
        let changes = room_changes(&payload).unwrap();
        assert_eq!(changes.status, Some("Mantenimiento"));
    }
}
