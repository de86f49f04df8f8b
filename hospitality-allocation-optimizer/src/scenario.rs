//! Batch input and output of the command line tool.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::allocation::Allocation;
use crate::error::AllocationError;
use crate::ledger::RoomUtilisation;
use crate::model::{CaseId, Group, Guest, Room};
use crate::packer::AutoFillReport;
use crate::rescue::{CancellationCase, RescueCandidate};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub guests: Vec<Guest>,
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub cancellations: Vec<CancellationCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRescue {
    pub case_id: CaseId,
    pub penalty_amount: u64,
    pub candidates: Vec<RescueCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub groups: Vec<Group>,
    pub utilisation: Vec<RoomUtilisation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_fill: Option<AutoFillReport>,
    pub rescues: Vec<CaseRescue>,
}

impl Scenario {
    /// Builds the allocation, optionally seats the remaining guests and lists
    /// the rescue candidates of every open cancellation.
    pub fn run(self, auto_fill: bool) -> Result<Outcome, AllocationError> {
        let mut allocation = Allocation::with_groups(self.guests, self.rooms, self.groups)?;
        let auto_fill = auto_fill.then(|| allocation.auto_fill());

        let mut rescues = Vec::new();
        for case in self
            .cancellations
            .iter()
            .filter(|case| !case.status.is_terminal())
        {
            let candidates =
                allocation.propose_rescue(case, &allocation.rescue_candidates(case))?;
            info!(case = %case.id, candidates = candidates.len(), "rescue proposals");
            rescues.push(CaseRescue {
                case_id: case.id.clone(),
                penalty_amount: case.penalty_amount,
                candidates,
            });
        }

        let skipped = self
            .cancellations
            .iter()
            .filter(|case| case.status.is_terminal())
            .count();
        if skipped > 0 {
            info!(skipped, "closed cancellations ignored");
        }

        Ok(Outcome {
            utilisation: allocation.ledger().utilisation(),
            groups: allocation.into_groups(),
            auto_fill,
            rescues,
        })
    }
}
