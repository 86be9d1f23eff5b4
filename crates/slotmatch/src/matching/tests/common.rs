use crate::matching::domain::{Applicant, ApplicantId, Population, Slot, SlotId};

pub(super) fn applicant(id: &str, score: u32, preferences: &[&str]) -> Applicant {
    Applicant::new(
        id,
        score,
        preferences.iter().map(|slot| SlotId::from(*slot)).collect(),
    )
}

pub(super) fn slot(id: &str, capacity: u32, minimum_score: u32) -> Slot {
    Slot::new(id, capacity, minimum_score)
}

pub(super) fn occupants(population: &Population, slot_id: &str) -> Vec<String> {
    population
        .slot(&SlotId::from(slot_id))
        .expect("slot present")
        .occupants
        .iter()
        .map(|id| id.0.clone())
        .collect()
}

pub(super) fn allocation_of(population: &Population, applicant_id: &str) -> Option<String> {
    population
        .applicant(&ApplicantId::from(applicant_id))
        .expect("applicant present")
        .allocated_slot
        .as_ref()
        .map(|slot| slot.0.clone())
}

/// Twelve applicants over four slots with thresholds, ties, and a closed slot.
pub(super) fn cohort() -> Population {
    Population::new(
        vec![
            applicant("A1", 5, &["P1", "P2", "P3"]),
            applicant("A2", 3, &["P1", "P3"]),
            applicant("A3", 4, &["P2", "P1"]),
            applicant("A4", 4, &["P1", "P2", "P4"]),
            applicant("A5", 2, &["P3", "P4"]),
            applicant("A6", 5, &["P2"]),
            applicant("A7", 3, &["P4", "P3", "P2"]),
            applicant("A8", 4, &["P3", "P1"]),
            applicant("A9", 1, &["P1", "P2", "P3"]),
            applicant("A10", 3, &[]),
            applicant("A11", 5, &["P4", "P1"]),
            applicant("A12", 3, &["P2", "P3"]),
        ],
        vec![
            slot("P1", 2, 4),
            slot("P2", 2, 3),
            slot("P3", 3, 2),
            slot("P4", 0, 0),
        ],
    )
}
