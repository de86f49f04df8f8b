use hospitality_allocation_optimizer::{AllocationError, CaseId, EventId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocationError),
    #[error("event {0} does not exist")]
    EventNotFound(EventId),
    #[error("event {0} already exists")]
    EventExists(EventId),
    #[error("cancellation {0} does not exist")]
    CaseNotFound(CaseId),
    #[error("cancellation {0} already exists")]
    CaseExists(CaseId),
}
