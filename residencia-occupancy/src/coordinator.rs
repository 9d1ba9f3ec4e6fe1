//! Keeps resident room assignments, room statuses and the change history consistent.
//!
//! Every function assumes the store wraps the whole call in one transaction, so an
//! error returned half way leaves nothing behind. Validation happens before the
//! first write regardless.

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::OccupancyError;
use crate::model::{NewRoomChange, Placement, Policy, Room, RoomChange, RoomStatus};
use crate::store::OccupancyStore;

pub type OccupancyResult<T, S> = Result<T, OccupancyError<<S as OccupancyStore>::Error>>;

/// Reason recorded when a room changes through an edit of the resident record.
pub const RESIDENT_EDIT_REASON: &str = "Room changed from resident record";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomChangeRequest {
    pub resident_id: i32,
    pub target_room_id: i32,
    pub reason: String,
    pub staff_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VacatedRoom {
    pub room_id: i32,
    pub status: RoomStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub change: RoomChange,
    pub vacated: Option<VacatedRoom>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deactivation {
    AlreadyInactive,
    Deactivated { vacated: Option<VacatedRoom> },
}

/// Resolves the room a new resident is admitted into. The room must exist and be available.
pub async fn admission_room<S: OccupancyStore>(
    store: &mut S,
    number: i32,
) -> OccupancyResult<Room, S> {
    let missing = || OccupancyError::<S::Error>::Validation(format!("room {number} does not exist"));
    let room = store.room_by_number(number).await?.ok_or_else(missing)?;
    let room = store
        .lock_rooms(&[room.id])
        .await?
        .pop()
        .ok_or_else(missing)?;
    if room.status != RoomStatus::Available {
        return Err(OccupancyError::Validation(format!(
            "room {number} is not available ({})",
            room.status
        )));
    }
    Ok(room)
}

/// Marks `room` occupied after a resident has been stored with a reference to it.
pub async fn occupy<S: OccupancyStore>(store: &mut S, room: &Room) -> OccupancyResult<(), S> {
    if room.status != RoomStatus::Occupied {
        store.set_room_status(room.id, RoomStatus::Occupied).await?;
        info!(room_id = room.id, status = %RoomStatus::Occupied, "room status changed");
    }
    Ok(())
}

/// Explicit transfer of a resident. The target may already be shared with other residents
/// unless capacity enforcement is on.
#[instrument(skip(store))]
pub async fn change_room<S: OccupancyStore>(
    store: &mut S,
    request: RoomChangeRequest,
    policy: Policy,
) -> OccupancyResult<Transfer, S> {
    if request.reason.trim().is_empty() {
        return Err(OccupancyError::Validation(
            "a reason for the room change is required".to_owned(),
        ));
    }
    let placement = active_placement(store, request.resident_id).await?;
    let Some(target) = lock_transfer(store, placement, request.target_room_id).await? else {
        return Err(OccupancyError::NotFound(format!(
            "room {} not found",
            request.target_room_id
        )));
    };
    if placement.room_id == Some(target.id) {
        return Err(OccupancyError::Conflict(format!(
            "resident {} is already assigned to room {}",
            placement.resident_id, target.number
        )));
    }
    if target.status == RoomStatus::Maintenance {
        return Err(OccupancyError::Conflict(format!(
            "room {} is under maintenance",
            target.number
        )));
    }
    ensure_capacity(store, &target, policy).await?;

    move_resident(store, placement, &target, request.reason, request.staff_id).await
}

/// Room change requested through the resident edit form, addressed by room number.
/// Unlike [`change_room`] the target has to be available. Returns `None` when the
/// resident already lives there.
#[instrument(skip(store))]
pub async fn reassign<S: OccupancyStore>(
    store: &mut S,
    resident_id: i32,
    target_number: i32,
    staff_id: Option<i32>,
    policy: Policy,
) -> OccupancyResult<Option<Transfer>, S> {
    let placement = active_placement(store, resident_id).await?;
    let Some(target) = store.room_by_number(target_number).await? else {
        return Err(OccupancyError::Validation(format!(
            "room {target_number} does not exist"
        )));
    };
    if placement.room_id == Some(target.id) {
        return Ok(None);
    }
    let Some(target) = lock_transfer(store, placement, target.id).await? else {
        return Err(OccupancyError::Validation(format!(
            "room {target_number} does not exist"
        )));
    };
    if target.status != RoomStatus::Available {
        return Err(OccupancyError::Validation(format!(
            "room {target_number} is not available ({})",
            target.status
        )));
    }
    ensure_capacity(store, &target, policy).await?;

    move_resident(
        store,
        placement,
        &target,
        RESIDENT_EDIT_REASON.to_owned(),
        staff_id,
    )
    .await
    .map(Some)
}

/// Deactivates a resident and releases the room they held.
#[instrument(skip(store))]
pub async fn deactivate<S: OccupancyStore>(
    store: &mut S,
    resident_id: i32,
) -> OccupancyResult<Deactivation, S> {
    let placement = existing_placement(store, resident_id).await?;
    if !placement.active {
        return Ok(Deactivation::AlreadyInactive);
    }
    store.set_resident_active(resident_id, false).await?;
    let vacated = match placement.room_id {
        Some(room_id) => {
            store.set_resident_room(resident_id, None).await?;
            reevaluate(store, room_id).await?
        }
        None => None,
    };
    info!(resident_id, ?vacated, "resident deactivated");
    Ok(Deactivation::Deactivated { vacated })
}

/// Reactivates a resident. They come back without a room. Returns whether anything changed.
#[instrument(skip(store))]
pub async fn reactivate<S: OccupancyStore>(
    store: &mut S,
    resident_id: i32,
) -> OccupancyResult<bool, S> {
    let placement = existing_placement(store, resident_id).await?;
    if placement.active {
        return Ok(false);
    }
    store.set_resident_active(resident_id, true).await?;
    info!(resident_id, "resident reactivated");
    Ok(true)
}

/// Frees a room once no active resident references it any more.
pub async fn reevaluate<S: OccupancyStore>(
    store: &mut S,
    room_id: i32,
) -> OccupancyResult<Option<VacatedRoom>, S> {
    let Some(room) = store.room(room_id).await? else {
        return Ok(None);
    };
    let mut status = room.status;
    if status == RoomStatus::Occupied && store.active_occupants(room_id).await? == 0 {
        status = RoomStatus::Available;
        store.set_room_status(room_id, status).await?;
        info!(room_id, %status, "room status changed");
    }
    Ok(Some(VacatedRoom { room_id, status }))
}

/// Guards manual status edits. `Occupied` is derived from assignments and can
/// neither be set on an empty room nor removed from a room with residents.
pub async fn check_status_edit<S: OccupancyStore>(
    store: &mut S,
    room: &Room,
    requested: RoomStatus,
) -> OccupancyResult<(), S> {
    if requested == room.status {
        return Ok(());
    }
    let occupants = store.active_occupants(room.id).await?;
    if occupants > 0 {
        return Err(OccupancyError::Conflict(format!(
            "room {} has {occupants} active resident(s), its status cannot change to {requested}",
            room.number
        )));
    }
    if requested == RoomStatus::Occupied {
        return Err(OccupancyError::Conflict(format!(
            "room {} has no active residents and cannot be marked {requested}",
            room.number
        )));
    }
    Ok(())
}

/// Rooms with active residents or with change history cannot be deleted.
pub async fn check_removal<S: OccupancyStore>(
    store: &mut S,
    room: &Room,
) -> OccupancyResult<(), S> {
    if store.active_occupants(room.id).await? > 0 {
        return Err(OccupancyError::Conflict(format!(
            "room {} is occupied by active residents",
            room.number
        )));
    }
    if store.change_count(room.id).await? > 0 {
        return Err(OccupancyError::Conflict(format!(
            "room {} is referenced by the room change history",
            room.number
        )));
    }
    Ok(())
}

async fn existing_placement<S: OccupancyStore>(
    store: &mut S,
    resident_id: i32,
) -> OccupancyResult<Placement, S> {
    store
        .placement(resident_id)
        .await?
        .ok_or_else(|| OccupancyError::NotFound(format!("resident {resident_id} not found")))
}

async fn active_placement<S: OccupancyStore>(
    store: &mut S,
    resident_id: i32,
) -> OccupancyResult<Placement, S> {
    let placement = existing_placement(store, resident_id).await?;
    if !placement.active {
        return Err(OccupancyError::Conflict(format!(
            "resident {resident_id} is inactive"
        )));
    }
    Ok(placement)
}

/// Locks the resident's current room together with the target before anything is
/// written and returns the locked target. Concurrent transfers between the same two
/// rooms then wait on the lower id instead of holding one room each.
async fn lock_transfer<S: OccupancyStore>(
    store: &mut S,
    placement: Placement,
    target_room_id: i32,
) -> OccupancyResult<Option<Room>, S> {
    let room_ids: Vec<i32> = placement
        .room_id
        .into_iter()
        .chain([target_room_id])
        .collect();
    let rooms = store.lock_rooms(&room_ids).await?;
    Ok(rooms.into_iter().find(|room| room.id == target_room_id))
}

async fn ensure_capacity<S: OccupancyStore>(
    store: &mut S,
    target: &Room,
    policy: Policy,
) -> OccupancyResult<(), S> {
    if !policy.enforce_capacity {
        return Ok(());
    }
    let occupants = store.active_occupants(target.id).await?;
    if occupants >= target.room_type.capacity() {
        return Err(OccupancyError::Conflict(format!(
            "room {} is full ({occupants} of {})",
            target.number,
            target.room_type.capacity()
        )));
    }
    Ok(())
}

async fn move_resident<S: OccupancyStore>(
    store: &mut S,
    placement: Placement,
    target: &Room,
    reason: String,
    staff_id: Option<i32>,
) -> OccupancyResult<Transfer, S> {
    let change = store
        .append_change(NewRoomChange {
            resident_id: placement.resident_id,
            previous_room_id: placement.room_id,
            new_room_id: target.id,
            reason,
            staff_id,
        })
        .await?;
    store
        .set_resident_room(placement.resident_id, Some(target.id))
        .await?;
    let vacated = match placement.room_id {
        Some(previous) => reevaluate(store, previous).await?,
        None => None,
    };
    occupy(store, target).await?;
    info!(
        resident_id = placement.resident_id,
        from = ?placement.room_id,
        to = target.id,
        "resident changed room"
    );
    Ok(Transfer { change, vacated })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryStore, RoomLock};
    use crate::model::RoomType;

    const NO_CAP: Policy = Policy {
        enforce_capacity: false,
    };

    fn request(resident_id: i32, target_room_id: i32, reason: &str) -> RoomChangeRequest {
        RoomChangeRequest {
            resident_id,
            target_room_id,
            reason: reason.to_owned(),
            staff_id: Some(7),
        }
    }

    #[tokio::test]
    async fn transfer_between_single_rooms_records_history_and_swaps_statuses() {
        let mut store = InMemoryStore::default();
        let r101 = store.add_room(101, RoomType::Individual, RoomStatus::Occupied);
        let r102 = store.add_room(102, RoomType::Individual, RoomStatus::Available);
        let ana = store.add_resident(Some(r101), true);

        let transfer = change_room(&mut store, request(ana, r102, "medical"), NO_CAP)
            .await
            .unwrap();

        assert_eq!(store.resident_room(ana), Some(r102));
        assert_eq!(store.status(r101), RoomStatus::Available);
        assert_eq!(store.status(r102), RoomStatus::Occupied);
        assert_eq!(transfer.change.previous_room_id, Some(r101));
        assert_eq!(transfer.change.new_room_id, r102);
        assert_eq!(transfer.change.reason, "medical");
        assert_eq!(transfer.change.staff_id, Some(7));
        assert_eq!(
            transfer.vacated,
            Some(VacatedRoom {
                room_id: r101,
                status: RoomStatus::Available
            })
        );
        assert_eq!(store.changes().len(), 1);
    }

    #[tokio::test]
    async fn crossed_transfers_lock_both_rooms_in_id_order_before_writing() {
        let mut store = InMemoryStore::default();
        let r101 = store.add_room(101, RoomType::Double, RoomStatus::Occupied);
        let r102 = store.add_room(102, RoomType::Double, RoomStatus::Occupied);
        let ana = store.add_resident(Some(r101), true);
        let luis = store.add_resident(Some(r102), true);

        change_room(&mut store, request(ana, r102, "window"), NO_CAP)
            .await
            .unwrap();
        let writes = store.writes();
        change_room(&mut store, request(luis, r101, "window"), NO_CAP)
            .await
            .unwrap();

        assert_eq!(
            store.locks(),
            &[
                RoomLock {
                    room_ids: vec![r101, r102],
                    writes_before: 0,
                },
                RoomLock {
                    room_ids: vec![r101, r102],
                    writes_before: writes,
                },
            ]
        );
        assert_eq!(store.resident_room(ana), Some(r102));
        assert_eq!(store.resident_room(luis), Some(r101));
        assert_eq!(store.status(r101), RoomStatus::Occupied);
        assert_eq!(store.status(r102), RoomStatus::Occupied);
    }

    #[tokio::test]
    async fn edit_form_reassignment_locks_both_rooms_first() {
        let mut store = InMemoryStore::default();
        // the target gets the lower id
        let r104 = store.add_room(104, RoomType::Individual, RoomStatus::Available);
        let r101 = store.add_room(101, RoomType::Individual, RoomStatus::Occupied);
        let ana = store.add_resident(Some(r101), true);

        reassign(&mut store, ana, 104, None, NO_CAP)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            store.locks(),
            &[RoomLock {
                room_ids: vec![r104, r101],
                writes_before: 0,
            }]
        );
        assert_eq!(store.resident_room(ana), Some(r104));
    }

    #[tokio::test]
    async fn shared_room_stays_occupied_while_someone_remains() {
        let mut store = InMemoryStore::default();
        let r201 = store.add_room(201, RoomType::Double, RoomStatus::Occupied);
        let r202 = store.add_room(202, RoomType::Individual, RoomStatus::Available);
        let first = store.add_resident(Some(r201), true);
        let second = store.add_resident(Some(r201), true);

        change_room(&mut store, request(first, r202, "quiet"), NO_CAP)
            .await
            .unwrap();

        assert_eq!(store.status(r201), RoomStatus::Occupied);
        assert_eq!(store.resident_room(second), Some(r201));
        assert_eq!(store.status(r202), RoomStatus::Occupied);
    }

    #[tokio::test]
    async fn moving_into_an_occupied_room_is_allowed_without_capacity_enforcement() {
        let mut store = InMemoryStore::default();
        let r301 = store.add_room(301, RoomType::Individual, RoomStatus::Occupied);
        let r302 = store.add_room(302, RoomType::Individual, RoomStatus::Occupied);
        let mover = store.add_resident(Some(r301), true);
        store.add_resident(Some(r302), true);

        change_room(&mut store, request(mover, r302, "family"), NO_CAP)
            .await
            .unwrap();

        assert_eq!(store.active_count(r302), 2);
        assert_eq!(store.status(r301), RoomStatus::Available);
    }

    #[tokio::test]
    async fn capacity_enforcement_rejects_a_full_room() {
        let mut store = InMemoryStore::default();
        let r301 = store.add_room(301, RoomType::Individual, RoomStatus::Occupied);
        let r302 = store.add_room(302, RoomType::Individual, RoomStatus::Occupied);
        let mover = store.add_resident(Some(r301), true);
        store.add_resident(Some(r302), true);
        let before = store.clone();

        let result = change_room(
            &mut store,
            request(mover, r302, "family"),
            Policy {
                enforce_capacity: true,
            },
        )
        .await;

        assert!(matches!(result, Err(OccupancyError::Conflict(_))));
        assert_eq!(store, before);
    }

    #[tokio::test]
    async fn rejected_changes_leave_everything_untouched() {
        let mut store = InMemoryStore::default();
        let r101 = store.add_room(101, RoomType::Individual, RoomStatus::Occupied);
        let r103 = store.add_room(103, RoomType::Individual, RoomStatus::Maintenance);
        let ana = store.add_resident(Some(r101), true);
        let gone = store.add_resident(None, false);
        let before = store.clone();

        let maintenance = change_room(&mut store, request(ana, r103, "x"), NO_CAP).await;
        assert!(matches!(maintenance, Err(OccupancyError::Conflict(_))));

        let same = change_room(&mut store, request(ana, r101, "x"), NO_CAP).await;
        assert!(matches!(same, Err(OccupancyError::Conflict(_))));

        let inactive = change_room(&mut store, request(gone, r101, "x"), NO_CAP).await;
        assert!(matches!(inactive, Err(OccupancyError::Conflict(_))));

        let no_room = change_room(&mut store, request(ana, 999, "x"), NO_CAP).await;
        assert!(matches!(no_room, Err(OccupancyError::NotFound(_))));

        let no_resident = change_room(&mut store, request(999, r101, "x"), NO_CAP).await;
        assert!(matches!(no_resident, Err(OccupancyError::NotFound(_))));

        let blank = change_room(&mut store, request(ana, r101, "  "), NO_CAP).await;
        assert!(matches!(blank, Err(OccupancyError::Validation(_))));

        assert_eq!(store, before);
    }

    #[tokio::test]
    async fn resident_without_room_can_be_moved_and_history_has_no_previous_room() {
        let mut store = InMemoryStore::default();
        let r105 = store.add_room(105, RoomType::Double, RoomStatus::Available);
        let ana = store.add_resident(None, true);

        let transfer = change_room(&mut store, request(ana, r105, "admission"), NO_CAP)
            .await
            .unwrap();

        assert_eq!(transfer.change.previous_room_id, None);
        assert_eq!(transfer.vacated, None);
        assert_eq!(store.status(r105), RoomStatus::Occupied);
    }

    #[tokio::test]
    async fn admission_requires_an_available_room() {
        let mut store = InMemoryStore::default();
        store.add_room(101, RoomType::Individual, RoomStatus::Occupied);
        let r104 = store.add_room(104, RoomType::Individual, RoomStatus::Available);

        assert!(matches!(
            admission_room(&mut store, 101).await,
            Err(OccupancyError::Validation(_))
        ));
        assert!(matches!(
            admission_room(&mut store, 555).await,
            Err(OccupancyError::Validation(_))
        ));

        let room = admission_room(&mut store, 104).await.unwrap();
        assert_eq!(room.id, r104);
        store.add_resident(Some(r104), true);
        occupy(&mut store, &room).await.unwrap();
        assert_eq!(store.status(r104), RoomStatus::Occupied);
    }

    #[tokio::test]
    async fn reassign_through_edit_form_requires_available_target() {
        let mut store = InMemoryStore::default();
        let r101 = store.add_room(101, RoomType::Individual, RoomStatus::Occupied);
        let r102 = store.add_room(102, RoomType::Double, RoomStatus::Occupied);
        let r104 = store.add_room(104, RoomType::Individual, RoomStatus::Available);
        let ana = store.add_resident(Some(r101), true);
        store.add_resident(Some(r102), true);

        let busy = reassign(&mut store, ana, 102, None, NO_CAP).await;
        assert!(matches!(busy, Err(OccupancyError::Validation(_))));

        let unchanged = reassign(&mut store, ana, 101, None, NO_CAP).await.unwrap();
        assert_eq!(unchanged, None);
        assert!(store.changes().is_empty());

        let transfer = reassign(&mut store, ana, 104, Some(3), NO_CAP)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(transfer.change.reason, RESIDENT_EDIT_REASON);
        assert_eq!(transfer.change.staff_id, Some(3));
        assert_eq!(store.status(r101), RoomStatus::Available);
        assert_eq!(store.status(r104), RoomStatus::Occupied);
    }

    #[tokio::test]
    async fn deactivation_releases_the_room_and_reactivation_does_not_reclaim_it() {
        let mut store = InMemoryStore::default();
        let r101 = store.add_room(101, RoomType::Individual, RoomStatus::Occupied);
        let ana = store.add_resident(Some(r101), true);

        let outcome = deactivate(&mut store, ana).await.unwrap();
        assert_eq!(
            outcome,
            Deactivation::Deactivated {
                vacated: Some(VacatedRoom {
                    room_id: r101,
                    status: RoomStatus::Available
                })
            }
        );
        assert_eq!(store.resident_room(ana), None);
        assert_eq!(store.status(r101), RoomStatus::Available);

        assert_eq!(
            deactivate(&mut store, ana).await.unwrap(),
            Deactivation::AlreadyInactive
        );

        assert!(reactivate(&mut store, ana).await.unwrap());
        assert_eq!(store.resident_room(ana), None);
        assert_eq!(store.status(r101), RoomStatus::Available);
        assert!(!reactivate(&mut store, ana).await.unwrap());
    }

    #[tokio::test]
    async fn deactivating_one_of_two_roommates_keeps_room_occupied() {
        let mut store = InMemoryStore::default();
        let r201 = store.add_room(201, RoomType::Double, RoomStatus::Occupied);
        let first = store.add_resident(Some(r201), true);
        store.add_resident(Some(r201), true);

        deactivate(&mut store, first).await.unwrap();

        assert_eq!(store.status(r201), RoomStatus::Occupied);
        assert_eq!(store.active_count(r201), 1);
    }

    #[tokio::test]
    async fn unknown_resident_cannot_be_deactivated() {
        let mut store = InMemoryStore::default();
        assert!(matches!(
            deactivate(&mut store, 1).await,
            Err(OccupancyError::NotFound(_))
        ));
        assert!(matches!(
            reactivate(&mut store, 1).await,
            Err(OccupancyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn occupied_status_is_derived() {
        let mut store = InMemoryStore::default();
        let r101 = store.add_room(101, RoomType::Individual, RoomStatus::Occupied);
        let r102 = store.add_room(102, RoomType::Individual, RoomStatus::Available);
        store.add_resident(Some(r101), true);
        let occupied = store.room_snapshot(r101);
        let free = store.room_snapshot(r102);

        assert!(matches!(
            check_status_edit(&mut store, &occupied, RoomStatus::Maintenance).await,
            Err(OccupancyError::Conflict(_))
        ));
        assert!(matches!(
            check_status_edit(&mut store, &free, RoomStatus::Occupied).await,
            Err(OccupancyError::Conflict(_))
        ));
        check_status_edit(&mut store, &occupied, RoomStatus::Occupied)
            .await
            .unwrap();
        check_status_edit(&mut store, &free, RoomStatus::Maintenance)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rooms_with_residents_or_history_cannot_be_removed() {
        let mut store = InMemoryStore::default();
        let r101 = store.add_room(101, RoomType::Individual, RoomStatus::Occupied);
        let r102 = store.add_room(102, RoomType::Individual, RoomStatus::Available);
        let r103 = store.add_room(103, RoomType::Individual, RoomStatus::Available);
        let ana = store.add_resident(Some(r101), true);

        let occupied = store.room_snapshot(r101);
        assert!(matches!(
            check_removal(&mut store, &occupied).await,
            Err(OccupancyError::Conflict(_))
        ));

        change_room(&mut store, request(ana, r102, "x"), NO_CAP)
            .await
            .unwrap();
        let with_history = store.room_snapshot(r101);
        assert!(matches!(
            check_removal(&mut store, &with_history).await,
            Err(OccupancyError::Conflict(_))
        ));

        let untouched = store.room_snapshot(r103);
        check_removal(&mut store, &untouched).await.unwrap();
    }

    #[tokio::test]
    async fn statuses_match_assignments_after_a_sequence_of_operations() {
        let mut store = InMemoryStore::default();
        let rooms: Vec<i32> = (1..=4)
            .map(|n| store.add_room(100 + n, RoomType::Double, RoomStatus::Available))
            .collect();
        let residents: Vec<i32> = (0..3).map(|_| store.add_resident(None, true)).collect();

        for (step, resident) in residents.iter().enumerate() {
            let target = rooms[step % 2];
            change_room(&mut store, request(*resident, target, "initial"), NO_CAP)
                .await
                .unwrap();
        }
        change_room(&mut store, request(residents[0], rooms[3], "move"), NO_CAP)
            .await
            .unwrap();
        deactivate(&mut store, residents[1]).await.unwrap();
        change_room(&mut store, request(residents[2], rooms[2], "move"), NO_CAP)
            .await
            .unwrap();

        for room in rooms {
            let occupied = store.active_count(room) > 0;
            assert_eq!(
                store.status(room) == RoomStatus::Occupied,
                occupied,
                "room {room}"
            );
        }
    }
}
