use thiserror::Error;

use crate::model::{CaseId, GuestId, RoomId};
use crate::rescue::CaseStatus;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("room {room_id} would hold {attempted} but only has capacity for {capacity}")]
    CapacityExceeded {
        room_id: RoomId,
        attempted: u32,
        capacity: u32,
    },
    #[error("room {0} does not exist")]
    RoomNotFound(RoomId),
    #[error("guest {0} does not exist")]
    GuestNotFound(GuestId),
    #[error("guest {0} is listed more than once")]
    DuplicateGuest(GuestId),
    #[error("room {0} is listed more than once")]
    DuplicateRoom(RoomId),
    #[error("guest {0} must occupy at least one capacity unit")]
    ZeroOccupancy(GuestId),
    #[error("room {0} must have a capacity of at least one")]
    ZeroCapacity(RoomId),
    #[error("guest {guest_id} already sits in room {room_id}")]
    AlreadyInRoom { guest_id: GuestId, room_id: RoomId },
    #[error("room {0} has an empty group")]
    EmptyGroup(RoomId),
    #[error("cancellation {case_id} cannot move from {from} to {to}")]
    InvalidTransition {
        case_id: CaseId,
        from: CaseStatus,
        to: CaseStatus,
    },
}
