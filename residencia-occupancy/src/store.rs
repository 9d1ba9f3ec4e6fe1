use async_trait::async_trait;

use crate::model::{NewRoomChange, Placement, Room, RoomChange, RoomStatus};

/// Persistence the coordinator needs. Implementations are expected to run every
/// call of one coordinator operation inside a single transaction and to lock the
/// rows returned by `room`, `lock_rooms` and `placement` until it commits.
/// `room_by_number` only resolves a number and takes no lock.
#[async_trait]
pub trait OccupancyStore: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn room(&mut self, room_id: i32) -> Result<Option<Room>, Self::Error>;

    async fn room_by_number(&mut self, number: i32) -> Result<Option<Room>, Self::Error>;

    /// Locks the existing rooms among `room_ids` in ascending id order, whatever the
    /// order of `room_ids`, and returns them in that order.
    async fn lock_rooms(&mut self, room_ids: &[i32]) -> Result<Vec<Room>, Self::Error>;

    async fn placement(&mut self, resident_id: i32) -> Result<Option<Placement>, Self::Error>;

    /// Active residents whose room reference points at `room_id`.
    async fn active_occupants(&mut self, room_id: i32) -> Result<i64, Self::Error>;

    /// History records mentioning `room_id` as previous or new room.
    async fn change_count(&mut self, room_id: i32) -> Result<i64, Self::Error>;

    async fn set_room_status(&mut self, room_id: i32, status: RoomStatus)
        -> Result<(), Self::Error>;

    async fn set_resident_room(
        &mut self,
        resident_id: i32,
        room_id: Option<i32>,
    ) -> Result<(), Self::Error>;

    async fn set_resident_active(&mut self, resident_id: i32, active: bool)
        -> Result<(), Self::Error>;

    async fn append_change(&mut self, change: NewRoomChange) -> Result<RoomChange, Self::Error>;
}
