//! Greedy first-fit-descending batch assignment.
//!
//! Large parties are seated first, each into the first room (in room order)
//! that still has room for them. A guest that fits nowhere simply stays
//! unassigned, the caller finds it in [`AutoFillReport::unassigned`].

use core::cmp::Reverse;
use std::collections::BTreeMap;

use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::allocation::Allocation;
use crate::ledger::remaining;
use crate::model::{Group, Guest, GuestId, Room, RoomId};

/// A room together with the capacity it has left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bin {
    pub room_id: RoomId,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub guest_id: GuestId,
    pub room_id: Option<RoomId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFillReport {
    pub placed: Vec<(GuestId, RoomId)>,
    pub unassigned: Vec<GuestId>,
}

/// Packs `guests` into `bins`, consuming their remaining capacity.
///
/// The sort is stable so guests of equal occupancy keep their input order,
/// which makes the result a pure function of the inputs.
pub fn first_fit_descending<'a>(
    guests: impl IntoIterator<Item = &'a Guest>,
    bins: &mut [Bin],
) -> Vec<Placement> {
    guests
        .into_iter()
        .sorted_by_key(|guest| Reverse(guest.occupancy))
        .map(|guest| {
            let room_id = bins
                .iter_mut()
                .find(|bin| bin.remaining >= guest.occupancy.0)
                .map(|bin| {
                    bin.remaining -= guest.occupancy.0;
                    bin.room_id.clone()
                });
            Placement {
                guest_id: guest.id.clone(),
                room_id,
            }
        })
        .collect()
}

/// Batch assigns `unassigned_guests` on top of `current_groups` and returns the
/// new mapping. `all_guests` supplies the occupancy of the guests that are
/// already seated. Guests that are already part of a group are skipped. A room
/// holding a guest that neither list knows about is treated as full.
#[must_use]
pub fn auto_fill(
    unassigned_guests: &[Guest],
    rooms: &[Room],
    current_groups: &[Group],
    all_guests: &[Guest],
) -> Vec<Group> {
    let occupancy: BTreeMap<&GuestId, u32> = all_guests
        .iter()
        .chain(unassigned_guests)
        .map(|guest| (&guest.id, guest.occupancy.0))
        .collect();
    let mut bins: Vec<Bin> = rooms
        .iter()
        .map(|room| {
            let seated = current_groups
                .iter()
                .filter(|group| group.room_id == room.id)
                .flat_map(|group| &group.guest_ids);
            let mut used = 0_u64;
            for guest_id in seated {
                let Some(weight) = occupancy.get(guest_id) else {
                    warn!(
                        guest = %guest_id,
                        room = %room.id,
                        "grouped guest has no occupancy, treating room as full"
                    );
                    used = u64::from(room.max_capacity);
                    break;
                };
                used += u64::from(*weight);
            }
            Bin {
                room_id: room.id.clone(),
                remaining: remaining(room.max_capacity, used),
            }
        })
        .collect();

    let candidates = unassigned_guests.iter().filter(|guest| {
        !current_groups
            .iter()
            .any(|group| group.contains(&guest.id))
    });

    let mut groups = current_groups.to_vec();
    for Placement { guest_id, room_id } in first_fit_descending(candidates, &mut bins) {
        let Some(room_id) = room_id else {
            continue;
        };
        match groups.iter_mut().find(|group| group.room_id == room_id) {
            Some(group) => group.guest_ids.push(guest_id),
            None => groups.push(Group {
                room_id,
                guest_ids: vec![guest_id],
            }),
        }
    }
    groups
}

impl Allocation {
    /// Seats every unassigned guest that still fits somewhere.
    #[instrument(level = "debug", skip(self))]
    pub fn auto_fill(&mut self) -> AutoFillReport {
        let ledger = self.ledger();
        let mut bins: Vec<Bin> = self
            .rooms()
            .iter()
            .map(|room| Bin {
                room_id: room.id.clone(),
                remaining: remaining(
                    room.max_capacity,
                    ledger.wide_occupancy_excluding(&room.id, &[]),
                ),
            })
            .collect();
        let placements = first_fit_descending(self.unassigned_guests(), &mut bins);

        let mut report = AutoFillReport::default();
        for Placement { guest_id, room_id } in placements {
            match room_id {
                Some(room_id) => {
                    // capacity was reserved in the bin above
                    self.place(&guest_id, &room_id);
                    debug!(guest = %guest_id, room = %room_id, "auto-filled guest");
                    report.placed.push((guest_id, room_id));
                }
                None => report.unassigned.push(guest_id),
            }
        }
        info!(
            placed = report.placed.len(),
            unassigned = report.unassigned.len(),
            "auto-fill finished"
        );
        report
    }
}
