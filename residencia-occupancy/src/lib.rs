//! Room occupancy rules for the residence.
//!
//! A room is `Occupied` exactly when at least one active resident references it.
//! Every transfer appends a [`model::RoomChange`] record. The rules live in
//! [`coordinator`] and talk to persistence only through [`store::OccupancyStore`].

pub mod coordinator;
pub mod error;
#[cfg(test)]
mod memory;
pub mod model;
pub mod store;

pub use coordinator::{Deactivation, RoomChangeRequest, Transfer, VacatedRoom};
pub use error::OccupancyError;
pub use model::{Placement, Policy, Room, RoomChange, RoomStatus, RoomType};
pub use store::OccupancyStore;
