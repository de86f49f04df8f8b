//! The assignment state of one event: which guests sit in which room.
//!
//! [`Allocation`] is the only owner of the guest to room relation. It is passed
//! explicitly to whoever needs it, the engine, packer and rescue operations are
//! all implemented as methods on it so every mutation goes through one place.

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::error::AllocationError;
use crate::ledger::{saturate, CapacityLedger};
use crate::model::{Group, Guest, GuestId, Room, RoomId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    guests: Vec<Guest>,
    rooms: Vec<Room>,
    groups: Vec<Group>,
}

impl Allocation {
    /// Creates an allocation where every guest is unassigned.
    pub fn new(guests: Vec<Guest>, rooms: Vec<Room>) -> Result<Self, AllocationError> {
        if let Some(duplicate) = guests.iter().map(|guest| &guest.id).duplicates().next() {
            return Err(AllocationError::DuplicateGuest(duplicate.clone()));
        }
        if let Some(duplicate) = rooms.iter().map(|room| &room.id).duplicates().next() {
            return Err(AllocationError::DuplicateRoom(duplicate.clone()));
        }
        if let Some(guest) = guests.iter().find(|guest| guest.occupancy.0 == 0) {
            return Err(AllocationError::ZeroOccupancy(guest.id.clone()));
        }
        if let Some(room) = rooms.iter().find(|room| room.max_capacity == 0) {
            return Err(AllocationError::ZeroCapacity(room.id.clone()));
        }
        Ok(Self {
            guests,
            rooms,
            groups: Vec::new(),
        })
    }

    /// Creates an allocation from a previously persisted group mapping.
    ///
    /// The mapping has to satisfy the same invariants every mutation keeps:
    /// known rooms and guests, one group per room, no empty group, no guest in
    /// two groups and no room above its capacity.
    pub fn with_groups(
        guests: Vec<Guest>,
        rooms: Vec<Room>,
        groups: Vec<Group>,
    ) -> Result<Self, AllocationError> {
        let mut allocation = Self::new(guests, rooms)?;
        if let Some(duplicate) = groups.iter().map(|group| &group.room_id).duplicates().next() {
            return Err(AllocationError::DuplicateRoom(duplicate.clone()));
        }
        if let Some(duplicate) = groups
            .iter()
            .flat_map(|group| &group.guest_ids)
            .duplicates()
            .next()
        {
            return Err(AllocationError::DuplicateGuest(duplicate.clone()));
        }
        for group in &groups {
            allocation.room(&group.room_id)?;
            if group.guest_ids.is_empty() {
                return Err(AllocationError::EmptyGroup(group.room_id.clone()));
            }
            for guest_id in &group.guest_ids {
                allocation.guest(guest_id)?;
            }
        }
        allocation.groups = groups;

        let ledger = allocation.ledger();
        for room in &allocation.rooms {
            let occupancy = ledger.wide_occupancy_excluding(&room.id, &[]);
            if occupancy > u64::from(room.max_capacity) {
                return Err(AllocationError::CapacityExceeded {
                    room_id: room.id.clone(),
                    attempted: saturate(occupancy),
                    capacity: room.max_capacity,
                });
            }
        }
        Ok(allocation)
    }

    #[must_use]
    pub const fn ledger(&self) -> CapacityLedger<'_> {
        CapacityLedger::new(self)
    }

    #[must_use]
    pub fn guests(&self) -> &[Guest] {
        &self.guests
    }

    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn guest(&self, guest_id: &GuestId) -> Result<&Guest, AllocationError> {
        self.guests
            .iter()
            .find(|guest| &guest.id == guest_id)
            .ok_or_else(|| AllocationError::GuestNotFound(guest_id.clone()))
    }

    pub fn room(&self, room_id: &RoomId) -> Result<&Room, AllocationError> {
        self.rooms
            .iter()
            .find(|room| &room.id == room_id)
            .ok_or_else(|| AllocationError::RoomNotFound(room_id.clone()))
    }

    #[must_use]
    pub fn group_of(&self, room_id: &RoomId) -> Option<&Group> {
        self.groups.iter().find(|group| &group.room_id == room_id)
    }

    /// The room a guest is currently placed in, if any.
    #[must_use]
    pub fn room_of(&self, guest_id: &GuestId) -> Option<&RoomId> {
        self.groups
            .iter()
            .find(|group| group.contains(guest_id))
            .map(|group| &group.room_id)
    }

    /// Guests without a room, in input order.
    pub fn unassigned_guests(&self) -> impl Iterator<Item = &Guest> {
        self.guests
            .iter()
            .filter(|guest| self.room_of(&guest.id).is_none())
    }

    /// Everyone travelling under the same family id as `guest_id`, the guest
    /// itself included. A guest without a family is its own family.
    pub fn family_members(&self, guest_id: &GuestId) -> Result<Vec<&Guest>, AllocationError> {
        let guest = self.guest(guest_id)?;
        Ok(match &guest.family_id {
            Some(family_id) => self
                .guests
                .iter()
                .filter(|member| member.family_id.as_ref() == Some(family_id))
                .collect(),
            None => vec![guest],
        })
    }

    pub(crate) fn occupancy_of_guest(&self, guest_id: &GuestId) -> u32 {
        self.guest(guest_id).map_or(0, |guest| guest.occupancy.0)
    }

    /// Removes the guest from its group, dropping the group once it is empty.
    /// Returns the room the guest was taken out of.
    pub(crate) fn detach(&mut self, guest_id: &GuestId) -> Option<RoomId> {
        let index = self
            .groups
            .iter()
            .position(|group| group.contains(guest_id))?;
        let group = &mut self.groups[index];
        group.guest_ids.retain(|member| member != guest_id);
        let room_id = group.room_id.clone();
        if group.guest_ids.is_empty() {
            debug!(room = %room_id, "pruning empty group");
            self.groups.remove(index);
        }
        Some(room_id)
    }

    /// Moves the guest into the room without looking at capacity, callers
    /// must have checked it already.
    pub(crate) fn place(&mut self, guest_id: &GuestId, room_id: &RoomId) -> Option<RoomId> {
        let previous = self.detach(guest_id);
        match self
            .groups
            .iter_mut()
            .find(|group| &group.room_id == room_id)
        {
            Some(group) => group.guest_ids.push(guest_id.clone()),
            None => self.groups.push(Group {
                room_id: room_id.clone(),
                guest_ids: vec![guest_id.clone()],
            }),
        }
        previous
    }

    #[must_use]
    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}
