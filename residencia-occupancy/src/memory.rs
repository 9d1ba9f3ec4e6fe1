//! Map-backed [`OccupancyStore`] for exercising the coordinator without a database.

use std::collections::BTreeMap;
use std::convert::Infallible;

use async_trait::async_trait;
use chrono::Utc;

use crate::model::{NewRoomChange, Placement, Room, RoomChange, RoomStatus, RoomType};
use crate::store::OccupancyStore;

/// A `lock_rooms` call: the rooms locked and how many writes the store had seen by then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomLock {
    pub room_ids: Vec<i32>,
    pub writes_before: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    rooms: BTreeMap<i32, Room>,
    residents: BTreeMap<i32, Placement>,
    changes: Vec<RoomChange>,
    next_id: i32,
    writes: usize,
    locks: Vec<RoomLock>,
}

// locking is bookkeeping, not state
impl PartialEq for InMemoryStore {
    fn eq(&self, other: &Self) -> bool {
        self.rooms == other.rooms
            && self.residents == other.residents
            && self.changes == other.changes
    }
}

impl Eq for InMemoryStore {}

impl InMemoryStore {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_room(&mut self, number: i32, room_type: RoomType, status: RoomStatus) -> i32 {
        let id = self.next_id();
        self.rooms.insert(
            id,
            Room {
                id,
                number,
                room_type,
                floor: number / 100,
                status,
                notes: None,
            },
        );
        id
    }

    pub fn add_resident(&mut self, room_id: Option<i32>, active: bool) -> i32 {
        let resident_id = self.next_id();
        self.residents.insert(
            resident_id,
            Placement {
                resident_id,
                room_id,
                active,
            },
        );
        resident_id
    }

    pub fn resident_room(&self, resident_id: i32) -> Option<i32> {
        self.residents[&resident_id].room_id
    }

    pub fn status(&self, room_id: i32) -> RoomStatus {
        self.rooms[&room_id].status
    }

    pub fn room_snapshot(&self, room_id: i32) -> Room {
        self.rooms[&room_id].clone()
    }

    pub fn active_count(&self, room_id: i32) -> i64 {
        self.residents
            .values()
            .filter(|placement| placement.active && placement.room_id == Some(room_id))
            .count()
            .try_into()
            .unwrap()
    }

    pub fn changes(&self) -> &[RoomChange] {
        &self.changes
    }

    pub const fn writes(&self) -> usize {
        self.writes
    }

    pub fn locks(&self) -> &[RoomLock] {
        &self.locks
    }
}

#[async_trait]
impl OccupancyStore for InMemoryStore {
    type Error = Infallible;

    async fn room(&mut self, room_id: i32) -> Result<Option<Room>, Self::Error> {
        Ok(self.rooms.get(&room_id).cloned())
    }

    async fn room_by_number(&mut self, number: i32) -> Result<Option<Room>, Self::Error> {
        Ok(self
            .rooms
            .values()
            .find(|room| room.number == number)
            .cloned())
    }

    async fn lock_rooms(&mut self, room_ids: &[i32]) -> Result<Vec<Room>, Self::Error> {
        let locked: Vec<Room> = self
            .rooms
            .values()
            .filter(|room| room_ids.contains(&room.id))
            .cloned()
            .collect();
        self.locks.push(RoomLock {
            room_ids: locked.iter().map(|room| room.id).collect(),
            writes_before: self.writes,
        });
        Ok(locked)
    }

    async fn placement(&mut self, resident_id: i32) -> Result<Option<Placement>, Self::Error> {
        Ok(self.residents.get(&resident_id).copied())
    }

    async fn active_occupants(&mut self, room_id: i32) -> Result<i64, Self::Error> {
        Ok(self.active_count(room_id))
    }

    async fn change_count(&mut self, room_id: i32) -> Result<i64, Self::Error> {
        Ok(self
            .changes
            .iter()
            .filter(|change| {
                change.new_room_id == room_id || change.previous_room_id == Some(room_id)
            })
            .count()
            .try_into()
            .unwrap())
    }

    async fn set_room_status(
        &mut self,
        room_id: i32,
        status: RoomStatus,
    ) -> Result<(), Self::Error> {
        self.writes += 1;
        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.status = status;
        }
        Ok(())
    }

    async fn set_resident_room(
        &mut self,
        resident_id: i32,
        room_id: Option<i32>,
    ) -> Result<(), Self::Error> {
        self.writes += 1;
        if let Some(placement) = self.residents.get_mut(&resident_id) {
            placement.room_id = room_id;
        }
        Ok(())
    }

    async fn set_resident_active(
        &mut self,
        resident_id: i32,
        active: bool,
    ) -> Result<(), Self::Error> {
        self.writes += 1;
        if let Some(placement) = self.residents.get_mut(&resident_id) {
            placement.active = active;
        }
        Ok(())
    }

    async fn append_change(&mut self, change: NewRoomChange) -> Result<RoomChange, Self::Error> {
        self.writes += 1;
        let id = self.next_id();
        let change = RoomChange {
            id,
            resident_id: change.resident_id,
            previous_room_id: change.previous_room_id,
            new_room_id: change.new_room_id,
            changed_at: Utc::now(),
            reason: change.reason,
            staff_id: change.staff_id,
        };
        self.changes.push(change.clone());
        Ok(change)
    }
}
