use super::super::domain::{Applicant, Population, Slot};
use super::views::{
    AllocationStatus, AllocationSummary, ApplicantAllocationView, RankCount, SlotOccupancyView,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Read-only view over a finished (or snapshotted) population.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    pub applicants: Vec<ApplicantAllocationView>,
    pub slots: Vec<SlotOccupancyView>,
    pub summary: AllocationSummary,
}

impl AllocationReport {
    pub fn from_population(population: &Population) -> Self {
        let applicants = population
            .applicants()
            .iter()
            .map(applicant_view)
            .collect();
        let slots = population.slots().iter().map(slot_view).collect();

        Self {
            applicants,
            slots,
            summary: summarize(population),
        }
    }
}

fn applicant_view(applicant: &Applicant) -> ApplicantAllocationView {
    let rank = applicant.allocated_rank();
    let status = if applicant.is_allocated() {
        AllocationStatus::Allocated
    } else {
        AllocationStatus::Unallocated
    };

    ApplicantAllocationView {
        applicant_id: applicant.id.clone(),
        score: applicant.score,
        preferences: applicant.preferences.clone(),
        allocated_slot: applicant.allocated_slot.clone(),
        rank,
        rank_label: rank.map_or_else(|| status.label().to_string(), |rank| rank.to_string()),
        status,
        status_label: status.label(),
    }
}

fn slot_view(slot: &Slot) -> SlotOccupancyView {
    let filled = slot.occupants.len();
    let fill_ratio = if slot.capacity == 0 {
        0.0
    } else {
        filled as f32 / slot.capacity as f32
    };

    SlotOccupancyView {
        slot_id: slot.id.clone(),
        capacity: slot.capacity,
        minimum_score: slot.minimum_score,
        occupants: slot.occupants.clone(),
        filled,
        fill_ratio,
    }
}

fn summarize(population: &Population) -> AllocationSummary {
    let mut ranks: BTreeMap<usize, usize> = BTreeMap::new();
    for rank in population.allocated().filter_map(Applicant::allocated_rank) {
        *ranks.entry(rank).or_default() += 1;
    }

    let allocated = population.allocated().count();
    let total_applicants = population.applicants().len();

    AllocationSummary {
        total_applicants,
        allocated,
        unallocated: total_applicants - allocated,
        without_preferences: population
            .applicants()
            .iter()
            .filter(|applicant| applicant.preferences.is_empty())
            .count(),
        rank_distribution: ranks
            .into_iter()
            .map(|(rank, applicants)| RankCount { rank, applicants })
            .collect(),
        seats_total: population
            .slots()
            .iter()
            .map(|slot| u64::from(slot.capacity))
            .sum(),
        seats_filled: population
            .slots()
            .iter()
            .map(|slot| slot.occupants.len())
            .sum(),
        full_slots: population
            .slots()
            .iter()
            .filter(|slot| slot.capacity > 0 && slot.is_full())
            .count(),
        empty_slots: population
            .slots()
            .iter()
            .filter(|slot| slot.occupants.is_empty())
            .count(),
    }
}
