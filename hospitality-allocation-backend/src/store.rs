//! Serialized access to the allocation state of many events.
//!
//! Every event sits behind its own mutex, so operations on one event run one
//! after another (the capacity check and the mutation of an `assign` can never
//! interleave with another `assign`) while different events do not wait for
//! each other.

use std::collections::BTreeMap;
use std::sync::Arc;

use hospitality_allocation_optimizer::{
    Allocation, AutoFillReport, CancellationCase, CaseId, EventId, Group, GuestId, PolicyType,
    RescueCandidate, RoomId, RoomUtilisation, SwapOutcome,
};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument};

use crate::clock::{Clock, SystemClock};
use crate::error::AppError;

#[derive(Debug)]
pub struct EventState {
    allocation: Allocation,
    cases: Vec<CancellationCase>,
}

impl EventState {
    fn case_mut(&mut self, case_id: &CaseId) -> Result<&mut CancellationCase, AppError> {
        self.cases
            .iter_mut()
            .find(|case| &case.id == case_id)
            .ok_or_else(|| AppError::CaseNotFound(case_id.clone()))
    }
}

/// What collaborators render for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSnapshot {
    pub event_id: EventId,
    pub groups: Vec<Group>,
    pub utilisation: Vec<RoomUtilisation>,
    pub unassigned: Vec<GuestId>,
    pub cases: Vec<CancellationCase>,
}

/// The details a guest gives when asking to cancel a room.
#[derive(Debug, Clone)]
pub struct CancellationRequest {
    pub case_id: CaseId,
    pub source_room_id: RoomId,
    pub guest_name: String,
    pub penalty_amount: u64,
    pub policy_type: PolicyType,
}

#[derive(Clone)]
pub struct EventStore<C: Clock = SystemClock> {
    events: Arc<RwLock<BTreeMap<EventId, Arc<Mutex<EventState>>>>>,
    clock: C,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> EventStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            events: Arc::new(RwLock::new(BTreeMap::new())),
            clock,
        }
    }

    async fn event(&self, event_id: &EventId) -> Result<Arc<Mutex<EventState>>, AppError> {
        self.events
            .read()
            .await
            .get(event_id)
            .cloned()
            .ok_or_else(|| AppError::EventNotFound(event_id.clone()))
    }

    #[instrument(skip(self, allocation))]
    pub async fn create_event(
        &self,
        event_id: EventId,
        allocation: Allocation,
    ) -> Result<(), AppError> {
        let mut events = self.events.write().await;
        if events.contains_key(&event_id) {
            return Err(AppError::EventExists(event_id));
        }
        info!(
            guests = allocation.guests().len(),
            rooms = allocation.rooms().len(),
            "event created"
        );
        events.insert(
            event_id,
            Arc::new(Mutex::new(EventState {
                allocation,
                cases: Vec::new(),
            })),
        );
        Ok(())
    }

    /// Drops the event and hands back its final state.
    #[instrument(skip(self))]
    pub async fn remove_event(&self, event_id: &EventId) -> Result<EventSnapshot, AppError> {
        let event = self
            .events
            .write()
            .await
            .remove(event_id)
            .ok_or_else(|| AppError::EventNotFound(event_id.clone()))?;
        let state = event.lock().await;
        info!("event removed");
        Ok(snapshot(event_id, &state))
    }

    #[instrument(skip(self))]
    pub async fn assign(
        &self,
        event_id: &EventId,
        guest_id: &GuestId,
        target: Option<&RoomId>,
    ) -> Result<(), AppError> {
        let event = self.event(event_id).await?;
        let mut state = event.lock().await;
        Ok(state.allocation.assign(guest_id, target)?)
    }

    #[instrument(skip(self))]
    pub async fn assign_family(
        &self,
        event_id: &EventId,
        guest_id: &GuestId,
        target: Option<&RoomId>,
    ) -> Result<(), AppError> {
        let event = self.event(event_id).await?;
        let mut state = event.lock().await;
        Ok(state.allocation.assign_family(guest_id, target)?)
    }

    #[instrument(skip(self))]
    pub async fn auto_fill(&self, event_id: &EventId) -> Result<AutoFillReport, AppError> {
        let event = self.event(event_id).await?;
        let mut state = event.lock().await;
        Ok(state.allocation.auto_fill())
    }

    #[instrument(skip(self, request), fields(case = %request.case_id))]
    pub async fn open_cancellation(
        &self,
        event_id: &EventId,
        request: CancellationRequest,
    ) -> Result<CancellationCase, AppError> {
        let event = self.event(event_id).await?;
        let mut state = event.lock().await;
        state.allocation.room(&request.source_room_id)?;
        if state.cases.iter().any(|case| case.id == request.case_id) {
            return Err(AppError::CaseExists(request.case_id));
        }
        let case = CancellationCase::new(
            request.case_id.0,
            request.source_room_id.0,
            request.guest_name,
            request.penalty_amount,
            request.policy_type,
            self.clock.now(),
        );
        info!(room = %case.source_room_id, penalty = case.penalty_amount, "cancellation opened");
        state.cases.push(case.clone());
        Ok(case)
    }

    #[instrument(skip(self))]
    pub async fn start_processing(
        &self,
        event_id: &EventId,
        case_id: &CaseId,
    ) -> Result<CancellationCase, AppError> {
        let event = self.event(event_id).await?;
        let mut state = event.lock().await;
        let case = state.case_mut(case_id)?;
        case.start_processing()?;
        Ok(case.clone())
    }

    #[instrument(skip(self))]
    pub async fn propose_rescue(
        &self,
        event_id: &EventId,
        case_id: &CaseId,
    ) -> Result<Vec<RescueCandidate>, AppError> {
        let event = self.event(event_id).await?;
        let state = event.lock().await;
        let case = state
            .cases
            .iter()
            .find(|case| &case.id == case_id)
            .ok_or_else(|| AppError::CaseNotFound(case_id.clone()))?;
        let candidates = state.allocation.rescue_candidates(case);
        Ok(state.allocation.propose_rescue(case, &candidates)?)
    }

    #[instrument(skip(self))]
    pub async fn confirm_swap(
        &self,
        event_id: &EventId,
        case_id: &CaseId,
        guest_id: &GuestId,
    ) -> Result<SwapOutcome, AppError> {
        let event = self.event(event_id).await?;
        let mut guard = event.lock().await;
        let EventState { allocation, cases } = &mut *guard;
        let case = cases
            .iter_mut()
            .find(|case| &case.id == case_id)
            .ok_or_else(|| AppError::CaseNotFound(case_id.clone()))?;
        Ok(allocation.confirm_swap(case, guest_id, self.clock.now())?)
    }

    #[instrument(skip(self))]
    pub async fn reject_cancellation(
        &self,
        event_id: &EventId,
        case_id: &CaseId,
        reason: &str,
    ) -> Result<CancellationCase, AppError> {
        let event = self.event(event_id).await?;
        let mut state = event.lock().await;
        let now = self.clock.now();
        let case = state.case_mut(case_id)?;
        case.reject(reason, now)?;
        Ok(case.clone())
    }

    pub async fn snapshot(&self, event_id: &EventId) -> Result<EventSnapshot, AppError> {
        let event = self.event(event_id).await?;
        let state = event.lock().await;
        Ok(snapshot(event_id, &state))
    }
}

fn snapshot(event_id: &EventId, state: &EventState) -> EventSnapshot {
    EventSnapshot {
        event_id: event_id.clone(),
        groups: state.allocation.groups().to_vec(),
        utilisation: state.allocation.ledger().utilisation(),
        unassigned: state
            .allocation
            .unassigned_guests()
            .map(|guest| guest.id.clone())
            .collect(),
        cases: state.cases.clone(),
    }
}
