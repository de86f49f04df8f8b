//! Occupancy queries. Nothing here is cached, every answer is summed from the
//! current group mapping.

use serde::Serialize;

use crate::allocation::Allocation;
use crate::error::AllocationError;
use crate::model::{GuestId, RoomId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUtilisation {
    pub room_id: RoomId,
    pub occupancy: u32,
    pub max_capacity: u32,
}

/// Narrows a wide occupancy for reporting, anything above `u32::MAX` is
/// reported as `u32::MAX`.
pub(crate) fn saturate(wide: u64) -> u32 {
    u32::try_from(wide).unwrap_or(u32::MAX)
}

/// Capacity left once `used` units are taken, 0 if the room is already full.
pub(crate) fn remaining(max_capacity: u32, used: u64) -> u32 {
    saturate(u64::from(max_capacity).saturating_sub(used))
}

#[derive(Debug, Clone, Copy)]
pub struct CapacityLedger<'a> {
    allocation: &'a Allocation,
}

impl<'a> CapacityLedger<'a> {
    pub(crate) const fn new(allocation: &'a Allocation) -> Self {
        Self { allocation }
    }

    /// Sum of the occupancy of every guest placed in the room, 0 if the room
    /// has no group. Saturates at `u32::MAX`.
    #[must_use]
    pub fn occupancy_of(&self, room_id: &RoomId) -> u32 {
        saturate(self.wide_occupancy_excluding(room_id, &[]))
    }

    /// Occupancy of the room if the `excluded` guests were taken out of it.
    /// Saturates at `u32::MAX`.
    #[must_use]
    pub fn occupancy_excluding(&self, room_id: &RoomId, excluded: &[&GuestId]) -> u32 {
        saturate(self.wide_occupancy_excluding(room_id, excluded))
    }

    /// Occupancy summed in `u64` so that no mapping of `u32` weights can wrap.
    pub(crate) fn wide_occupancy_excluding(
        &self,
        room_id: &RoomId,
        excluded: &[&GuestId],
    ) -> u64 {
        self.allocation.group_of(room_id).map_or(0, |group| {
            group
                .guest_ids
                .iter()
                .filter(|guest_id| !excluded.contains(guest_id))
                .map(|guest_id| u64::from(self.allocation.occupancy_of_guest(guest_id)))
                .sum()
        })
    }

    pub fn remaining_capacity(&self, room_id: &RoomId) -> Result<u32, AllocationError> {
        let room = self.allocation.room(room_id)?;
        Ok(remaining(
            room.max_capacity,
            self.wide_occupancy_excluding(room_id, &[]),
        ))
    }

    pub fn would_exceed(
        &self,
        room_id: &RoomId,
        additional_occupancy: u32,
    ) -> Result<bool, AllocationError> {
        let room = self.allocation.room(room_id)?;
        Ok(self.wide_occupancy_excluding(room_id, &[]) + u64::from(additional_occupancy)
            > u64::from(room.max_capacity))
    }

    /// Occupancy against capacity for every room, in room order.
    #[must_use]
    pub fn utilisation(&self) -> Vec<RoomUtilisation> {
        self.allocation
            .rooms()
            .iter()
            .map(|room| RoomUtilisation {
                room_id: room.id.clone(),
                occupancy: self.occupancy_of(&room.id),
                max_capacity: room.max_capacity,
            })
            .collect()
    }
}
