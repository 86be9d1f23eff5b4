use super::super::domain::{ApplicantId, SlotId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    Allocated,
    Unallocated,
}

impl AllocationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Allocated => "allocated",
            Self::Unallocated => "unallocated",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicantAllocationView {
    pub applicant_id: ApplicantId,
    pub score: u32,
    pub preferences: Vec<SlotId>,
    pub allocated_slot: Option<SlotId>,
    pub rank: Option<usize>,
    pub rank_label: String,
    pub status: AllocationStatus,
    pub status_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotOccupancyView {
    pub slot_id: SlotId,
    pub capacity: u32,
    pub minimum_score: u32,
    pub occupants: Vec<ApplicantId>,
    pub filled: usize,
    pub fill_ratio: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankCount {
    pub rank: usize,
    pub applicants: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationSummary {
    pub total_applicants: usize,
    pub allocated: usize,
    pub unallocated: usize,
    pub without_preferences: usize,
    pub rank_distribution: Vec<RankCount>,
    pub seats_total: u64,
    pub seats_filled: usize,
    pub full_slots: usize,
    pub empty_slots: usize,
}

impl AllocationSummary {
    pub fn allocation_rate(&self) -> f32 {
        if self.total_applicants == 0 {
            0.0
        } else {
            self.allocated as f32 / self.total_applicants as f32
        }
    }
}
