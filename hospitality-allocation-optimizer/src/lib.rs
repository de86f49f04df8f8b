//! Guest to room allocation for event hospitality.
//!
//! An [`Allocation`] owns the guest to room relation of one event. Guests are
//! moved with [`Allocation::assign`], batch seated with
//! [`Allocation::auto_fill`] and cancellations of non-refundable rooms are
//! rescued with [`Allocation::propose_rescue`] and
//! [`Allocation::confirm_swap`]. After every operation each room holds at most
//! its `max_capacity`.

pub mod allocation;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod model;
pub mod packer;
pub mod rescue;
pub mod scenario;

pub use allocation::Allocation;
pub use error::AllocationError;
pub use ledger::{CapacityLedger, RoomUtilisation};
pub use model::{
    CaseId, EventId, FamilyId, Group, Guest, GuestId, Occupancy, PolicyType, Room, RoomId,
};
pub use packer::{auto_fill, first_fit_descending, AutoFillReport, Bin, Placement};
pub use rescue::{CancellationCase, CaseStatus, RescueCandidate, SwapOutcome};
pub use scenario::{Outcome, Scenario};
