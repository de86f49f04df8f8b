use tracing::{debug, info, instrument, warn};

use crate::allocation::Allocation;
use crate::error::AllocationError;
use crate::ledger::saturate;
use crate::model::{GuestId, RoomId};

impl Allocation {
    /// Moves a guest into `target`, or out of any room when `target` is `None`.
    ///
    /// Either the move happens completely or the allocation is left untouched.
    #[instrument(level = "debug", skip(self), fields(guest = %guest_id))]
    pub fn assign(
        &mut self,
        guest_id: &GuestId,
        target: Option<&RoomId>,
    ) -> Result<(), AllocationError> {
        let occupancy = self.guest(guest_id)?.occupancy.0;

        let Some(target) = target else {
            if let Some(previous) = self.detach(guest_id) {
                info!(guest = %guest_id, room = %previous, "unassigned guest");
            }
            return Ok(());
        };

        let capacity = self.room(target)?.max_capacity;
        if self.room_of(guest_id) == Some(target) {
            debug!(room = %target, "guest already placed");
            return Ok(());
        }

        let attempted = self
            .ledger()
            .wide_occupancy_excluding(target, &[guest_id])
            + u64::from(occupancy);
        if attempted > u64::from(capacity) {
            warn!(room = %target, attempted, capacity, "assignment exceeds room capacity");
            return Err(AllocationError::CapacityExceeded {
                room_id: target.clone(),
                attempted: saturate(attempted),
                capacity,
            });
        }

        let previous = self.place(guest_id, target);
        info!(guest = %guest_id, from = ?previous, to = %target, "assigned guest");
        Ok(())
    }

    /// Like [`Allocation::assign`] but moves the whole family of the guest as one
    /// unit. Members already in `target` stay where they are and only the
    /// others count against its remaining capacity.
    #[instrument(level = "debug", skip(self), fields(guest = %guest_id))]
    pub fn assign_family(
        &mut self,
        guest_id: &GuestId,
        target: Option<&RoomId>,
    ) -> Result<(), AllocationError> {
        let members: Vec<(GuestId, u32)> = self
            .family_members(guest_id)?
            .into_iter()
            .map(|member| (member.id.clone(), member.occupancy.0))
            .collect();

        let Some(target) = target else {
            for (member, _) in &members {
                self.detach(member);
            }
            info!(guest = %guest_id, members = members.len(), "unassigned family");
            return Ok(());
        };

        let capacity = self.room(target)?.max_capacity;
        let moving: Vec<&(GuestId, u32)> = members
            .iter()
            .filter(|(member, _)| self.room_of(member) != Some(target))
            .collect();
        if moving.is_empty() {
            return Ok(());
        }

        let moving_occupancy: u64 = moving
            .iter()
            .map(|(_, occupancy)| u64::from(*occupancy))
            .sum();
        let attempted = self.ledger().wide_occupancy_excluding(target, &[]) + moving_occupancy;
        if attempted > u64::from(capacity) {
            warn!(room = %target, attempted, capacity, "family does not fit into room");
            return Err(AllocationError::CapacityExceeded {
                room_id: target.clone(),
                attempted: saturate(attempted),
                capacity,
            });
        }

        for (member, _) in moving {
            self.place(member, target);
        }
        info!(guest = %guest_id, to = %target, "assigned family");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::allocation::Allocation;
    use crate::error::AllocationError;
    use crate::model::{Group, Guest, GuestId, PolicyType, Room, RoomId};

    fn id(value: &str) -> GuestId {
        GuestId::from(value)
    }

    fn room(value: &str) -> RoomId {
        RoomId::from(value)
    }

    fn allocation() -> Result<Allocation, AllocationError> {
        Allocation::new(
            vec![
                Guest::new("g1", "Asha", 2),
                Guest::new("g2", "Ravi", 1),
                Guest::new("g3", "Meera", 1),
            ],
            vec![
                Room::new("101", 2, PolicyType::Flexible),
                Room::new("102", 3, PolicyType::NonRefundable),
            ],
        )
    }

    #[test]
    fn capacity_exceeded_leaves_room_untouched() -> Result<(), AllocationError> {
        let mut allocation = allocation()?;
        allocation.assign(&id("g1"), Some(&room("101")))?;
        assert_eq!(allocation.ledger().occupancy_of(&room("101")), 2);

        assert_eq!(
            allocation.assign(&id("g2"), Some(&room("101"))),
            Err(AllocationError::CapacityExceeded {
                room_id: room("101"),
                attempted: 3,
                capacity: 2,
            })
        );
        assert_eq!(allocation.ledger().occupancy_of(&room("101")), 2);
        assert_eq!(allocation.room_of(&id("g2")), None);
        Ok(())
    }

    #[test]
    fn failed_move_keeps_original_room() -> Result<(), AllocationError> {
        let mut allocation = allocation()?;
        allocation.assign(&id("g1"), Some(&room("101")))?;
        allocation.assign(&id("g2"), Some(&room("102")))?;
        allocation.assign(&id("g3"), Some(&room("102")))?;
        let before = allocation.clone();

        // 102 holds 2 of 3, g1 weighs 2
        assert!(allocation.assign(&id("g1"), Some(&room("102"))).is_err());
        assert_eq!(allocation, before);
        Ok(())
    }

    #[test]
    fn reassigning_to_same_room_is_idempotent() -> Result<(), AllocationError> {
        let mut allocation = allocation()?;
        allocation.assign(&id("g1"), Some(&room("101")))?;
        let before = allocation.groups().to_vec();
        allocation.assign(&id("g1"), Some(&room("101")))?;
        assert_eq!(allocation.groups(), before.as_slice());
        Ok(())
    }

    #[test]
    fn moving_does_not_double_count() -> Result<(), AllocationError> {
        let mut allocation = allocation()?;
        allocation.assign(&id("g2"), Some(&room("101")))?;
        allocation.assign(&id("g2"), Some(&room("102")))?;
        assert_eq!(allocation.room_of(&id("g2")), Some(&room("102")));
        assert_eq!(allocation.group_of(&room("101")), None);
        assert_eq!(allocation.ledger().occupancy_of(&room("102")), 1);
        Ok(())
    }

    #[test]
    fn unassigning_prunes_empty_group_and_is_idempotent() -> Result<(), AllocationError> {
        let mut allocation = allocation()?;
        allocation.assign(&id("g2"), Some(&room("102")))?;
        allocation.assign(&id("g2"), None)?;
        assert!(allocation.groups().is_empty());
        allocation.assign(&id("g2"), None)?;
        assert!(allocation.groups().is_empty());
        Ok(())
    }

    #[test]
    fn unknown_ids_are_reported() -> Result<(), AllocationError> {
        let mut allocation = allocation()?;
        assert_eq!(
            allocation.assign(&id("nobody"), Some(&room("101"))),
            Err(AllocationError::GuestNotFound(id("nobody")))
        );
        assert_eq!(
            allocation.assign(&id("g1"), Some(&room("999"))),
            Err(AllocationError::RoomNotFound(room("999")))
        );
        assert!(allocation.groups().is_empty());
        Ok(())
    }

    #[test]
    fn family_moves_together_or_not_at_all() -> Result<(), AllocationError> {
        let mut allocation = Allocation::with_groups(
            vec![
                Guest::new("g1", "Kapoor", 2).in_family("f1", Some("g1")),
                Guest::new("g2", "Kapoor jr", 1).in_family("f1", Some("g1")),
                Guest::new("g3", "Singh", 1),
            ],
            vec![
                Room::new("101", 3, PolicyType::Flexible),
                Room::new("102", 3, PolicyType::Flexible),
            ],
            vec![Group {
                room_id: room("102"),
                guest_ids: vec![id("g3")],
            }],
        )?;

        let before = allocation.clone();
        assert_eq!(
            allocation.assign_family(&id("g2"), Some(&room("102"))),
            Err(AllocationError::CapacityExceeded {
                room_id: room("102"),
                attempted: 4,
                capacity: 3,
            })
        );
        assert_eq!(allocation, before);

        allocation.assign_family(&id("g2"), Some(&room("101")))?;
        assert_eq!(
            allocation.group_of(&room("101")).map(|group| group.guest_ids.clone()),
            Some(vec![id("g1"), id("g2")])
        );

        allocation.assign_family(&id("g1"), None)?;
        assert_eq!(allocation.group_of(&room("101")), None);
        Ok(())
    }

    #[test]
    fn huge_occupancies_are_refused() -> Result<(), AllocationError> {
        let mut allocation = Allocation::new(
            vec![
                Guest::new("a", "A", 1 << 31),
                Guest::new("b", "B", 1 << 31).in_family("f1", Some("b")),
                Guest::new("c", "C", 1 << 31).in_family("f1", Some("b")),
            ],
            vec![Room::new("1", u32::MAX, PolicyType::Flexible)],
        )?;
        allocation.assign(&id("a"), Some(&room("1")))?;
        assert_eq!(
            allocation.assign(&id("b"), Some(&room("1"))),
            Err(AllocationError::CapacityExceeded {
                room_id: room("1"),
                attempted: u32::MAX,
                capacity: u32::MAX,
            })
        );

        allocation.assign(&id("a"), None)?;
        assert_eq!(
            allocation.assign_family(&id("b"), Some(&room("1"))),
            Err(AllocationError::CapacityExceeded {
                room_id: room("1"),
                attempted: u32::MAX,
                capacity: u32::MAX,
            })
        );
        assert!(allocation.groups().is_empty());
        Ok(())
    }
}
