//! Avoiding non-refundable cancellation penalties by moving a guest out of a
//! flexible room into the room that is about to be vacated.

use core::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::allocation::Allocation;
use crate::error::AllocationError;
use crate::model::{CaseId, GuestId, PolicyType, RoomId};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseStatus {
    Pending,
    Processing,
    Approved,
    Rejected,
}

impl CaseStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    const fn can_become(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Processing)
                | (Self::Pending | Self::Processing, Self::Approved | Self::Rejected)
        )
    }
}

impl Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        })
    }
}

/// A guest asked to cancel the booking of `source_room_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationCase {
    pub id: CaseId,
    pub source_room_id: RoomId,
    #[serde(default)]
    pub guest_name: String,
    /// What the hotel charges if the room is released without a replacement.
    pub penalty_amount: u64,
    pub policy_type: PolicyType,
    pub status: CaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CancellationCase {
    pub fn new(
        id: impl Into<String>,
        source_room_id: impl Into<String>,
        guest_name: impl Into<String>,
        penalty_amount: u64,
        policy_type: PolicyType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CaseId::new(id),
            source_room_id: RoomId::new(source_room_id),
            guest_name: guest_name.into(),
            penalty_amount,
            policy_type,
            status: CaseStatus::Pending,
            approved_action: None,
            approved_date: None,
            rejection_reason: None,
            rejected_date: None,
            created_at,
        }
    }

    pub fn ensure_transition(&self, to: CaseStatus) -> Result<(), AllocationError> {
        if self.status.can_become(to) {
            Ok(())
        } else {
            Err(AllocationError::InvalidTransition {
                case_id: self.id.clone(),
                from: self.status,
                to,
            })
        }
    }

    pub fn start_processing(&mut self) -> Result<(), AllocationError> {
        self.ensure_transition(CaseStatus::Processing)?;
        self.status = CaseStatus::Processing;
        info!(case = %self.id, "cancellation is being processed");
        Ok(())
    }

    pub fn approve(
        &mut self,
        action: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), AllocationError> {
        self.ensure_transition(CaseStatus::Approved)?;
        let action = action.into();
        info!(case = %self.id, %action, "cancellation approved");
        self.status = CaseStatus::Approved;
        self.approved_action = Some(action);
        self.approved_date = Some(at);
        Ok(())
    }

    pub fn reject(
        &mut self,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), AllocationError> {
        self.ensure_transition(CaseStatus::Rejected)?;
        let reason = reason.into();
        info!(case = %self.id, %reason, "cancellation rejected");
        self.status = CaseStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.rejected_date = Some(at);
        Ok(())
    }
}

/// A guest that could be moved into the room under cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RescueCandidate {
    pub guest_id: GuestId,
    pub guest_name: String,
    pub occupancy: u32,
    pub current_room_id: RoomId,
    pub current_policy: PolicyType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapOutcome {
    pub guest_id: GuestId,
    pub from_room: Option<RoomId>,
    pub to_room: RoomId,
    pub penalty_saved: u64,
}

impl Allocation {
    /// Every seated guest outside the room under cancellation.
    #[must_use]
    pub fn rescue_candidates(&self, case: &CancellationCase) -> Vec<GuestId> {
        self.groups()
            .iter()
            .filter(|group| group.room_id != case.source_room_id)
            .flat_map(|group| group.guest_ids.iter().cloned())
            .collect()
    }

    /// Keeps the candidates whose current room can be released without a
    /// penalty. Capacity is only checked when the swap is confirmed.
    pub fn propose_rescue(
        &self,
        case: &CancellationCase,
        candidates: &[GuestId],
    ) -> Result<Vec<RescueCandidate>, AllocationError> {
        self.room(&case.source_room_id)?;
        let mut eligible = Vec::new();
        for guest_id in candidates {
            let guest = self.guest(guest_id)?;
            let Some(room_id) = self.room_of(guest_id) else {
                continue;
            };
            if room_id == &case.source_room_id {
                continue;
            }
            let room = self.room(room_id)?;
            if room.policy_type.allows_penalty_free_release() {
                eligible.push(RescueCandidate {
                    guest_id: guest.id.clone(),
                    guest_name: guest.name.clone(),
                    occupancy: guest.occupancy.0,
                    current_room_id: room.id.clone(),
                    current_policy: room.policy_type,
                });
            }
        }
        Ok(eligible)
    }

    /// Moves `guest_id` into the room under cancellation and approves the case.
    ///
    /// The case is only touched once the move went through. A guest that
    /// already sits in the room under cancellation cannot rescue it.
    #[instrument(level = "debug", skip(self, case, at), fields(case = %case.id))]
    pub fn confirm_swap(
        &mut self,
        case: &mut CancellationCase,
        guest_id: &GuestId,
        at: DateTime<Utc>,
    ) -> Result<SwapOutcome, AllocationError> {
        case.ensure_transition(CaseStatus::Approved)?;
        let to_room = case.source_room_id.clone();
        let capacity = self.room(&to_room)?.max_capacity;
        let guest = self.guest(guest_id)?;
        let guest_name = guest.name.clone();
        let occupancy = guest.occupancy.0;
        if occupancy > capacity {
            return Err(AllocationError::CapacityExceeded {
                room_id: to_room,
                attempted: occupancy,
                capacity,
            });
        }

        let from_room = self.room_of(guest_id).cloned();
        if from_room.as_ref() == Some(&to_room) {
            return Err(AllocationError::AlreadyInRoom {
                guest_id: guest_id.clone(),
                room_id: to_room,
            });
        }
        self.assign(guest_id, Some(&to_room))?;
        case.approve(format!("Room swap: {guest_name} moved to Room {to_room}"), at)?;
        info!(
            guest = %guest_id,
            from = ?from_room,
            to = %to_room,
            penalty_saved = case.penalty_amount,
            "room swap confirmed"
        );
        Ok(SwapOutcome {
            guest_id: guest_id.clone(),
            from_room,
            to_room,
            penalty_saved: case.penalty_amount,
        })
    }
}
