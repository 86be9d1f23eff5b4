//! Deferred-acceptance matching of applicants to capacity-limited slots.
//!
//! The engine always works on its own copy of the input population, so one
//! imported population can feed any number of runs or snapshot streams.

pub mod audit;
pub mod domain;
pub mod engine;
pub mod report;
pub mod router;
pub mod snapshots;

#[cfg(test)]
mod tests;

pub use audit::{audit, InvariantViolation};
pub use domain::{Applicant, ApplicantId, Population, Slot, SlotId};
pub use engine::{
    MatchingEngine, MatchingError, MatchingOutcome, MatchingStats, ProposalOutcome,
    DEFAULT_SNAPSHOT_STRIDE,
};
pub use report::views::{
    AllocationStatus, AllocationSummary, ApplicantAllocationView, RankCount, SlotOccupancyView,
};
pub use report::AllocationReport;
pub use router::matching_router;
pub use snapshots::{PopulationSnapshot, SnapshotStream};
