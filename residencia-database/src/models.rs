use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use residencia_occupancy::model::UnknownVariant;
use residencia_occupancy::{Room, RoomChange};
use serde::{Deserialize, Serialize};

use crate::schema::{
    activities, activity_participants, diet_assignments, diets, incidents, medications, residents,
    room_changes, rooms, staff, treatments, users, visits,
};

#[must_use]
pub fn full_name(name: &str, surname: &str) -> String {
    format!("{name} {surname}")
}

// staff

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = staff, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: i32,
    pub national_id: String,
    pub name: String,
    pub surname: String,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub category: String,
    pub hired_on: NaiveDate,
    pub active: bool,
}

#[derive(Insertable, AsChangeset, Deserialize, Debug, Clone)]
#[diesel(table_name = staff, treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct StaffForm {
    pub national_id: String,
    pub name: String,
    pub surname: String,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub category: String,
    pub hired_on: NaiveDate,
}

// users

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = users, check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub staff_id: Option<i32>,
    pub last_login: Option<DateTime<Utc>>,
    pub active: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub staff_id: Option<i32>,
}

// rooms

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = rooms, check_for_backend(diesel::pg::Pg))]
pub struct RoomRow {
    pub id: i32,
    pub number: i32,
    pub room_type: String,
    pub floor: i32,
    pub status: String,
    pub notes: Option<String>,
}

impl TryFrom<RoomRow> for Room {
    type Error = UnknownVariant;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            number: row.number,
            room_type: row.room_type.parse()?,
            floor: row.floor,
            status: row.status.parse()?,
            notes: row.notes,
        })
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = rooms)]
pub struct NewRoom<'a> {
    pub number: i32,
    pub room_type: &'a str,
    pub floor: i32,
    pub status: &'a str,
    pub notes: Option<&'a str>,
}

/// Partial room update, `None` leaves the column as it is.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = rooms)]
pub struct RoomChanges<'a> {
    pub number: Option<i32>,
    pub room_type: Option<&'a str>,
    pub floor: Option<i32>,
    pub status: Option<&'a str>,
    pub notes: Option<&'a str>,
}

impl RoomChanges<'_> {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.room_type.is_none()
            && self.floor.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }
}

// residents

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = residents, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: i32,
    pub national_id: String,
    pub name: String,
    pub surname: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub email: String,
    pub admission_date: NaiveDate,
    pub room_id: Option<i32>,
    pub blood_type: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub medical_notes: Option<String>,
    pub active: bool,
}

/// A resident together with the room they are assigned to.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResidentView {
    #[serde(flatten)]
    pub resident: Resident,
    pub room_number: Option<i32>,
    pub room_type: Option<String>,
    pub floor: Option<i32>,
}

/// Everything the resident detail page shows in one response.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResidentDetails {
    #[serde(flatten)]
    pub resident: ResidentView,
    pub treatments: Vec<TreatmentView>,
    pub diets: Vec<DietAssignmentView>,
    pub activities: Vec<Participation>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = residents)]
pub struct NewResident<'a> {
    pub national_id: &'a str,
    pub name: &'a str,
    pub surname: &'a str,
    pub birth_date: NaiveDate,
    pub gender: &'a str,
    pub email: &'a str,
    pub admission_date: NaiveDate,
    pub room_id: Option<i32>,
    pub blood_type: Option<&'a str>,
    pub emergency_contact_name: Option<&'a str>,
    pub emergency_contact_phone: Option<&'a str>,
    pub medical_notes: Option<&'a str>,
}

/// Partial resident update. Room and active flag are owned by the occupancy coordinator.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = residents)]
pub struct ResidentChanges<'a> {
    pub national_id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub surname: Option<&'a str>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<&'a str>,
    pub email: Option<&'a str>,
    pub admission_date: Option<NaiveDate>,
    pub blood_type: Option<&'a str>,
    pub emergency_contact_name: Option<&'a str>,
    pub emergency_contact_phone: Option<&'a str>,
    pub medical_notes: Option<&'a str>,
}

impl ResidentChanges<'_> {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.national_id.is_none()
            && self.name.is_none()
            && self.surname.is_none()
            && self.birth_date.is_none()
            && self.gender.is_none()
            && self.email.is_none()
            && self.admission_date.is_none()
            && self.blood_type.is_none()
            && self.emergency_contact_name.is_none()
            && self.emergency_contact_phone.is_none()
            && self.medical_notes.is_none()
    }
}

// room change history

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = room_changes, check_for_backend(diesel::pg::Pg))]
pub struct RoomChangeRow {
    pub id: i32,
    pub resident_id: i32,
    pub previous_room_id: Option<i32>,
    pub new_room_id: i32,
    pub changed_at: DateTime<Utc>,
    pub reason: String,
    pub staff_id: Option<i32>,
}

impl From<RoomChangeRow> for RoomChange {
    fn from(row: RoomChangeRow) -> Self {
        Self {
            id: row.id,
            resident_id: row.resident_id,
            previous_room_id: row.previous_room_id,
            new_room_id: row.new_room_id,
            changed_at: row.changed_at,
            reason: row.reason,
            staff_id: row.staff_id,
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = room_changes)]
pub struct NewRoomChangeRow<'a> {
    pub resident_id: i32,
    pub previous_room_id: Option<i32>,
    pub new_room_id: i32,
    pub reason: &'a str,
    pub staff_id: Option<i32>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoomChangeView {
    pub id: i32,
    pub changed_at: DateTime<Utc>,
    pub reason: String,
    pub resident_id: i32,
    pub resident_name: String,
    pub resident_surname: String,
    pub previous_room_number: Option<i32>,
    pub new_room_number: Option<i32>,
    pub staff_name: Option<String>,
}

// medications

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = medications, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub contraindications: Option<String>,
    pub stock: i32,
    pub minimum_stock: i32,
}

#[derive(Insertable, AsChangeset, Deserialize, Debug, Clone)]
#[diesel(table_name = medications, treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct MedicationForm {
    pub name: String,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub contraindications: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub minimum_stock: i32,
}

// treatments

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = treatments, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub id: i32,
    pub resident_id: i32,
    pub medication_id: i32,
    pub dose: String,
    pub frequency: String,
    pub route: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub instructions: Option<String>,
    pub staff_id: i32,
    pub active: bool,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentView {
    #[serde(flatten)]
    pub treatment: Treatment,
    pub resident_name: String,
    pub medication_name: String,
    pub staff_name: String,
}

#[derive(Insertable, AsChangeset, Deserialize, Debug, Clone)]
#[diesel(table_name = treatments, treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentForm {
    pub resident_id: i32,
    pub medication_id: i32,
    pub dose: String,
    pub frequency: String,
    pub route: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub instructions: Option<String>,
    pub staff_id: i32,
}

/// One line of the daily medication summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledDose {
    pub resident_id: i32,
    pub resident_name: String,
    pub resident_email: String,
    pub medication: String,
    pub dose: String,
    pub frequency: String,
    pub route: String,
}

// activities

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = activities, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub staff_id: Option<i32>,
    pub max_participants: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: Activity,
    pub staff_name: Option<String>,
}

#[derive(Insertable, AsChangeset, Deserialize, Debug, Clone)]
#[diesel(table_name = activities, treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct ActivityForm {
    pub name: String,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub staff_id: Option<i32>,
    pub max_participants: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = activity_participants, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(default)]
    pub activity_id: i32,
    pub resident_id: i32,
    #[serde(default)]
    pub attended: bool,
    pub rating: Option<i32>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    #[serde(flatten)]
    pub participant: Participant,
    pub resident_name: String,
}

/// An activity a resident signed up for, as shown on the resident detail page.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub activity_id: i32,
    pub activity_name: String,
    pub starts_at: DateTime<Utc>,
    pub attended: bool,
    pub rating: Option<i32>,
}

// diets

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = diets, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Diet {
    pub id: i32,
    pub name: String,
    pub characteristics: Option<String>,
    pub active: bool,
}

#[derive(Insertable, AsChangeset, Deserialize, Debug, Clone)]
#[diesel(table_name = diets, treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct DietForm {
    pub name: String,
    pub characteristics: Option<String>,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = diet_assignments, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct DietAssignment {
    pub id: i32,
    pub resident_id: i32,
    pub diet_id: i32,
    pub staff_id: Option<i32>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub active: bool,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DietAssignmentView {
    #[serde(flatten)]
    pub assignment: DietAssignment,
    pub diet_name: String,
    pub staff_name: Option<String>,
}

#[derive(Insertable, Deserialize, Debug, Clone)]
#[diesel(table_name = diet_assignments)]
#[serde(rename_all = "camelCase")]
pub struct DietAssignmentForm {
    pub resident_id: i32,
    pub diet_id: i32,
    pub staff_id: Option<i32>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

// visits

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = visits, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: i32,
    pub resident_id: i32,
    pub visitor_name: String,
    pub relationship: Option<String>,
    pub entered_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VisitView {
    #[serde(flatten)]
    pub visit: Visit,
    pub resident_name: String,
}

#[derive(Insertable, AsChangeset, Deserialize, Debug, Clone)]
#[diesel(table_name = visits, treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct VisitForm {
    pub resident_id: i32,
    pub visitor_name: String,
    pub relationship: Option<String>,
    pub entered_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

// incidents

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = incidents, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: i32,
    pub occurred_at: DateTime<Utc>,
    pub description: String,
    pub kind: String,
    pub severity: String,
    pub status: String,
    pub notes: Option<String>,
    pub resident_id: Option<i32>,
    pub reported_by: Option<i32>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IncidentView {
    #[serde(flatten)]
    pub incident: Incident,
    pub resident_name: Option<String>,
    pub reported_by_name: Option<String>,
}

#[derive(Insertable, AsChangeset, Deserialize, Debug, Clone)]
#[diesel(table_name = incidents, treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct IncidentForm {
    pub occurred_at: DateTime<Utc>,
    pub description: String,
    pub kind: String,
    pub severity: String,
    pub status: String,
    pub notes: Option<String>,
    pub resident_id: Option<i32>,
    pub reported_by: Option<i32>,
}

#[cfg(test)]
mod tests {
    use residencia_occupancy::{RoomStatus, RoomType};

    use super::*;

    fn row(room_type: &str, status: &str) -> RoomRow {
        RoomRow {
            id: 1,
            number: 101,
            room_type: room_type.to_owned(),
            floor: 1,
            status: status.to_owned(),
            notes: None,
        }
    }

    #[test]
    fn room_rows_convert_to_domain_rooms() {
        let room = Room::try_from(row("Doble", "Ocupada")).unwrap();
        assert_eq!(room.room_type, RoomType::Double);
        assert_eq!(room.status, RoomStatus::Occupied);
    }

    #[test]
    fn unknown_stored_status_is_rejected() {
        let err = Room::try_from(row("Individual", "Reservada")).unwrap_err();
        assert_eq!(err.value, "Reservada");
    }

    #[test]
    fn empty_changesets_are_detected() {
        assert!(ResidentChanges::default().is_empty());
        assert!(!RoomChanges {
            floor: Some(2),
            ..RoomChanges::default()
        }
        .is_empty());
    }
}
