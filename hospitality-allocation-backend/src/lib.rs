//! Per-event service facade over the allocation core.
//!
//! Drag and drop handlers, API routes or scripts all go through [`EventStore`],
//! which serializes the operations of one event.

pub mod clock;
pub mod error;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::AppError;
pub use store::{CancellationRequest, EventSnapshot, EventState, EventStore};
