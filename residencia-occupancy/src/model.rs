use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Individual,
    #[serde(rename = "Doble")]
    Double,
    #[serde(rename = "Triple")]
    Triple,
}

impl RoomType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Double => "Doble",
            Self::Triple => "Triple",
        }
    }

    /// Number of residents the room is furnished for.
    #[must_use]
    pub const fn capacity(self) -> i64 {
        match self {
            Self::Individual => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

impl FromStr for RoomType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Individual" => Ok(Self::Individual),
            "Doble" => Ok(Self::Double),
            "Triple" => Ok(Self::Triple),
            other => Err(UnknownVariant {
                kind: "room type",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomStatus {
    #[serde(rename = "Disponible")]
    Available,
    #[serde(rename = "Ocupada")]
    Occupied,
    #[serde(rename = "Mantenimiento")]
    Maintenance,
}

impl RoomStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Disponible",
            Self::Occupied => "Ocupada",
            Self::Maintenance => "Mantenimiento",
        }
    }
}

impl FromStr for RoomStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Disponible" => Ok(Self::Available),
            "Ocupada" => Ok(Self::Occupied),
            "Mantenimiento" => Ok(Self::Maintenance),
            other => Err(UnknownVariant {
                kind: "room status",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i32,
    pub number: i32,
    pub room_type: RoomType,
    pub floor: i32,
    pub status: RoomStatus,
    pub notes: Option<String>,
}

/// Where a resident currently sleeps, as far as occupancy is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub resident_id: i32,
    pub room_id: Option<i32>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoomChange {
    pub resident_id: i32,
    pub previous_room_id: Option<i32>,
    pub new_room_id: i32,
    pub reason: String,
    pub staff_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomChange {
    pub id: i32,
    pub resident_id: i32,
    pub previous_room_id: Option<i32>,
    pub new_room_id: i32,
    pub changed_at: DateTime<Utc>,
    pub reason: String,
    pub staff_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    pub enforce_capacity: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_names_round_trip() {
        for status in [
            RoomStatus::Available,
            RoomStatus::Occupied,
            RoomStatus::Maintenance,
        ] {
            assert_eq!(status.as_str().parse::<RoomStatus>(), Ok(status));
        }
        assert_eq!("Doble".parse::<RoomType>(), Ok(RoomType::Double));
        assert!("Suite".parse::<RoomType>().is_err());
    }

    #[test]
    fn capacity_follows_room_type() {
        assert_eq!(RoomType::Individual.capacity(), 1);
        assert_eq!(RoomType::Double.capacity(), 2);
        assert_eq!(RoomType::Triple.capacity(), 3);
    }
}
