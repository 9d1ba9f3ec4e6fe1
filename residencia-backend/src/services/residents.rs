use chrono::NaiveDate;
use diesel_async::scoped_futures::ScopedFutureExt;
use residencia_database::models::{NewResident, Resident, ResidentChanges, ResidentView};
use residencia_database::repositories::{residents, staff};
use residencia_database::{transaction, PgOccupancyStore, Pool};
use residencia_occupancy::{coordinator, Deactivation, Policy, RoomChange, RoomChangeRequest, VacatedRoom};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::validation;

const GENDERS: &[&str] = &["M", "F", "O"];

/// Create and edit form of a resident. On edit every field is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResidentPayload {
    pub national_id: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub admission_date: Option<NaiveDate>,
    #[serde(alias = "numeroHabitacion")]
    pub room_number: Option<i32>,
    pub blood_type: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub medical_notes: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RoomChangePayload {
    #[serde(rename = "nuevaHabitacionId")]
    pub target_room_id: Option<i32>,
    #[serde(rename = "motivo", default)]
    pub reason: String,
    #[serde(rename = "personalId")]
    pub staff_id: Option<i32>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoomChangeOutcome {
    pub change: RoomChange,
    pub vacated_room: Option<VacatedRoom>,
}

fn gender(value: &str) -> Result<&str, AppError> {
    let value = value.trim();
    let value = if value.eq_ignore_ascii_case("otro") { "O" } else { value };
    validation::one_of("gender", value, GENDERS)?;
    Ok(value)
}

fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn new_resident(payload: &ResidentPayload) -> Result<NewResident<'_>, AppError> {
    let email = validation::required("email", payload.email.as_deref())?;
    validation::email("email", email)?;
    Ok(NewResident {
        national_id: validation::required("nationalId", payload.national_id.as_deref())?,
        name: validation::required("name", payload.name.as_deref())?,
        surname: validation::required("surname", payload.surname.as_deref())?,
        birth_date: validation::present("birthDate", payload.birth_date)?,
        gender: gender(validation::required("gender", payload.gender.as_deref())?)?,
        email,
        admission_date: validation::present("admissionDate", payload.admission_date)?,
        room_id: None,
        blood_type: optional(payload.blood_type.as_deref()),
        emergency_contact_name: optional(payload.emergency_contact_name.as_deref()),
        emergency_contact_phone: optional(payload.emergency_contact_phone.as_deref()),
        medical_notes: optional(payload.medical_notes.as_deref()),
    })
}

fn resident_changes(payload: &ResidentPayload) -> Result<ResidentChanges<'_>, AppError> {
    let mut changes = ResidentChanges {
        birth_date: payload.birth_date,
        admission_date: payload.admission_date,
        blood_type: payload.blood_type.as_deref(),
        emergency_contact_name: payload.emergency_contact_name.as_deref(),
        emergency_contact_phone: payload.emergency_contact_phone.as_deref(),
        medical_notes: payload.medical_notes.as_deref(),
        ..ResidentChanges::default()
    };
    if payload.national_id.is_some() {
        changes.national_id = Some(validation::required("nationalId", payload.national_id.as_deref())?);
    }
    if payload.name.is_some() {
        changes.name = Some(validation::required("name", payload.name.as_deref())?);
    }
    if payload.surname.is_some() {
        changes.surname = Some(validation::required("surname", payload.surname.as_deref())?);
    }
    if let Some(value) = &payload.gender {
        changes.gender = Some(gender(value)?);
    }
    if let Some(email) = &payload.email {
        let email = email.trim();
        validation::email("email", email)?;
        changes.email = Some(email);
    }
    Ok(changes)
}

/// Stores a new resident and occupies the requested room.
pub async fn admit(pool: &Pool, payload: &ResidentPayload) -> Result<Resident, AppError> {
    let mut resident = new_resident(payload)?;
    let room_number = payload.room_number;
    transaction(pool, |connection| {
        async move {
            if residents::national_id_taken(connection, resident.national_id, None).await? {
                return Err(AppError::Conflict(format!(
                    "a resident with national id {} already exists",
                    resident.national_id
                )));
            }
            let room = match room_number {
                Some(number) => Some(
                    coordinator::admission_room(&mut PgOccupancyStore::new(connection), number)
                        .await?,
                ),
                None => None,
            };
            resident.room_id = room.as_ref().map(|room| room.id);
            let stored = residents::insert(connection, resident).await?;
            if let Some(room) = &room {
                coordinator::occupy(&mut PgOccupancyStore::new(connection), room).await?;
            }
            info!(resident_id = stored.id, room_id = ?stored.room_id, "resident admitted");
            Ok(stored)
        }
        .scope_boxed()
    })
    .await
}

/// Applies an edit of the resident record. A different room number moves the
/// resident, attributed to `staff_id`.
pub async fn update(
    pool: &Pool,
    resident_id: i32,
    payload: &ResidentPayload,
    staff_id: Option<i32>,
    policy: Policy,
) -> Result<ResidentView, AppError> {
    let changes = resident_changes(payload)?;
    let room_number = payload.room_number;
    transaction(pool, |connection| {
        async move {
            if !residents::exists(connection, resident_id).await? {
                return Err(AppError::NotFound(format!("resident {resident_id} not found")));
            }
            if let Some(national_id) = changes.national_id {
                if residents::national_id_taken(connection, national_id, Some(resident_id)).await? {
                    return Err(AppError::Conflict(format!(
                        "a resident with national id {national_id} already exists"
                    )));
                }
            }
            residents::update(connection, resident_id, changes).await?;
            if let Some(number) = room_number {
                coordinator::reassign(
                    &mut PgOccupancyStore::new(connection),
                    resident_id,
                    number,
                    staff_id,
                    policy,
                )
                .await?;
            }
            residents::find(connection, resident_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("resident {resident_id} not found")))
        }
        .scope_boxed()
    })
    .await
}

/// Explicit transfer with a reason. The staff member defaults to the caller's.
pub async fn change_room(
    pool: &Pool,
    resident_id: i32,
    payload: RoomChangePayload,
    caller_staff_id: Option<i32>,
    policy: Policy,
) -> Result<RoomChangeOutcome, AppError> {
    let target_room_id = validation::present("nuevaHabitacionId", payload.target_room_id)?;
    let staff_id = payload.staff_id.or(caller_staff_id);
    transaction(pool, |connection| {
        async move {
            if let Some(staff_id) = staff_id {
                if !staff::exists(connection, staff_id).await? {
                    return Err(AppError::Validation(format!(
                        "staff member {staff_id} does not exist"
                    )));
                }
            }
            let transfer = coordinator::change_room(
                &mut PgOccupancyStore::new(connection),
                RoomChangeRequest {
                    resident_id,
                    target_room_id,
                    reason: payload.reason,
                    staff_id,
                },
                policy,
            )
            .await?;
            Ok(RoomChangeOutcome {
                change: transfer.change,
                vacated_room: transfer.vacated,
            })
        }
        .scope_boxed()
    })
    .await
}

/// Activates or deactivates a resident. Returns the resident as stored afterwards.
pub async fn set_active(pool: &Pool, resident_id: i32, active: bool) -> Result<ResidentView, AppError> {
    transaction(pool, |connection| {
        async move {
            let mut store = PgOccupancyStore::new(connection);
            if active {
                coordinator::reactivate(&mut store, resident_id).await?;
            } else {
                coordinator::deactivate(&mut store, resident_id).await?;
            }
            residents::find(connection, resident_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("resident {resident_id} not found")))
        }
        .scope_boxed()
    })
    .await
}

/// Soft delete. Deleting an inactive resident is reported as not found.
pub async fn remove(pool: &Pool, resident_id: i32) -> Result<(), AppError> {
    transaction(pool, |connection| {
        async move {
            match coordinator::deactivate(&mut PgOccupancyStore::new(connection), resident_id).await? {
                Deactivation::AlreadyInactive => Err(AppError::NotFound(format!(
                    "resident {resident_id} not found or already inactive"
                ))),
                Deactivation::Deactivated { .. } => Ok(()),
            }
        }
        .scope_boxed()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ResidentPayload {
        ResidentPayload {
            national_id: Some("12345678A".to_owned()),
            name: Some("Carmen".to_owned()),
            surname: Some("López".to_owned()),
            birth_date: NaiveDate::from_ymd_opt(1938, 2, 11),
            gender: Some("F".to_owned()),
            email: Some("carmen@example.com".to_owned()),
            admission_date: NaiveDate::from_ymd_opt(2024, 1, 8),
            room_number: Some(101),
            ..ResidentPayload::default()
        }
    }

    #[test]
    fn complete_payload_is_accepted() {
        let payload = complete();
        let resident = new_resident(&payload).unwrap();
        assert_eq!(resident.name, "Carmen");
        assert_eq!(resident.room_id, None);
    }

    #[test]
    fn missing_fields_are_rejected() {
        for payload in [
            ResidentPayload {
                national_id: None,
                ..complete()
            },
            ResidentPayload {
                birth_date: None,
                ..complete()
            },
            ResidentPayload {
                admission_date: None,
                ..complete()
            },
            ResidentPayload {
                surname: Some("  ".to_owned()),
                ..complete()
            },
        ] {
            assert!(matches!(new_resident(&payload), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn malformed_email_is_rejected() {
        let payload = ResidentPayload {
            email: Some("carmen.example.com".to_owned()),
            ..complete()
        };
        assert!(matches!(new_resident(&payload), Err(AppError::Validation(_))));
    }

    #[test]
    fn gender_accepts_codes() {
        assert_eq!(gender("M").unwrap(), "M");
        assert_eq!(gender("Otro").unwrap(), "O");
        assert!(gender("X").is_err());
    }

    #[test]
    fn edits_only_touch_sent_fields() {
        let payload = ResidentPayload {
            medical_notes: Some("Diabetes tipo 2".to_owned()),
            ..ResidentPayload::default()
        };
        let changes = resident_changes(&payload).unwrap();
        assert_eq!(changes.medical_notes, Some("Diabetes tipo 2"));
        assert!(changes.name.is_none());

        let blank_name = ResidentPayload {
            name: Some(String::new()),
            ..ResidentPayload::default()
        };
        assert!(resident_changes(&blank_name).is_err());
    }

    #[test]
    fn room_change_body_uses_frontend_names() {
        let payload: RoomChangePayload = serde_json::from_str(
            r#"{ "nuevaHabitacionId": 7, "motivo": "medical", "personalId": 3 }"#,
        )
        .unwrap();
        assert_eq!(payload.target_room_id, Some(7));
        assert_eq!(payload.reason, "medical");
        assert_eq!(payload.staff_id, Some(3));
    }

    #[test]
    fn room_number_accepts_legacy_name() {
        let payload: ResidentPayload =
            serde_json::from_str(r#"{ "numeroHabitacion": 204 }"#).unwrap();
        assert_eq!(payload.room_number, Some(204));
    }
}
