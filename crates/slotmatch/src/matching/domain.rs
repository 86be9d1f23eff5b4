use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for applicants taking part in a matching run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

/// Identifier wrapper for capacity-limited slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub String);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApplicantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for SlotId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// An applicant competing for slots with a score and an ordered wish list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: ApplicantId,
    pub score: u32,
    pub preferences: Vec<SlotId>,
    #[serde(default)]
    pub allocated_slot: Option<SlotId>,
    #[serde(default)]
    pub next_proposal_index: usize,
}

impl Applicant {
    pub fn new(id: impl Into<String>, score: u32, preferences: Vec<SlotId>) -> Self {
        Self {
            id: ApplicantId(id.into()),
            score,
            preferences,
            allocated_slot: None,
            next_proposal_index: 0,
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated_slot.is_some()
    }

    /// 1-based position of the allocated slot within the preference list.
    pub fn allocated_rank(&self) -> Option<usize> {
        let slot = self.allocated_slot.as_ref()?;
        self.preferences
            .iter()
            .position(|candidate| candidate == slot)
            .map(|index| index + 1)
    }

    pub fn has_remaining_preferences(&self) -> bool {
        self.next_proposal_index < self.preferences.len()
    }
}

/// A slot with a fixed number of seats and a score threshold.
///
/// `occupants` keeps allocation order; the eviction tie-break depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub capacity: u32,
    pub minimum_score: u32,
    #[serde(default)]
    pub occupants: Vec<ApplicantId>,
}

impl Slot {
    pub fn new(id: impl Into<String>, capacity: u32, minimum_score: u32) -> Self {
        Self {
            id: SlotId(id.into()),
            capacity,
            minimum_score,
            occupants: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity as usize
    }

    pub fn admits(&self, score: u32) -> bool {
        score >= self.minimum_score
    }

    pub fn free_seats(&self) -> usize {
        (self.capacity as usize).saturating_sub(self.occupants.len())
    }
}

/// Arena holding every applicant and slot of one matching population.
///
/// All relations are expressed through ids; cloning produces a fully
/// independent copy suitable for a fresh run or a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PopulationParts")]
pub struct Population {
    applicants: Vec<Applicant>,
    slots: Vec<Slot>,
    #[serde(skip)]
    slot_index: HashMap<SlotId, usize>,
    #[serde(skip)]
    applicant_index: HashMap<ApplicantId, usize>,
}

impl Population {
    pub fn new(applicants: Vec<Applicant>, slots: Vec<Slot>) -> Self {
        let slot_index = slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (slot.id.clone(), index))
            .collect();
        let applicant_index = applicants
            .iter()
            .enumerate()
            .map(|(index, applicant)| (applicant.id.clone(), index))
            .collect();

        Self {
            applicants,
            slots,
            slot_index,
            applicant_index,
        }
    }

    pub fn applicants(&self) -> &[Applicant] {
        &self.applicants
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn applicant(&self, id: &ApplicantId) -> Option<&Applicant> {
        self.applicant_index
            .get(id)
            .map(|&index| &self.applicants[index])
    }

    pub fn slot(&self, id: &SlotId) -> Option<&Slot> {
        self.slot_index.get(id).map(|&index| &self.slots[index])
    }

    pub fn allocated(&self) -> impl Iterator<Item = &Applicant> {
        self.applicants.iter().filter(|applicant| applicant.is_allocated())
    }

    pub fn unallocated(&self) -> impl Iterator<Item = &Applicant> {
        self.applicants
            .iter()
            .filter(|applicant| !applicant.is_allocated())
    }

    pub fn into_parts(self) -> (Vec<Applicant>, Vec<Slot>) {
        (self.applicants, self.slots)
    }

    pub(crate) fn slot_position(&self, id: &SlotId) -> Option<usize> {
        self.slot_index.get(id).copied()
    }

    pub(crate) fn applicant_at(&self, index: usize) -> &Applicant {
        &self.applicants[index]
    }

    pub(crate) fn slot_at(&self, index: usize) -> &Slot {
        &self.slots[index]
    }

    pub(crate) fn advance_cursor(&mut self, applicant: usize) {
        self.applicants[applicant].next_proposal_index += 1;
    }

    /// Seat `applicant` in `slot`, updating both sides of the relation.
    pub(crate) fn allocate(&mut self, applicant: usize, slot: usize) {
        let applicant_id = self.applicants[applicant].id.clone();
        let target = &mut self.slots[slot];
        target.occupants.push(applicant_id);
        self.applicants[applicant].allocated_slot = Some(target.id.clone());
    }

    /// Remove the occupant at `seat` from `slot`, clearing its allocation.
    ///
    /// Returns the arena index of the released applicant.
    pub(crate) fn release(&mut self, slot: usize, seat: usize) -> Option<usize> {
        let occupant = self.slots[slot].occupants.get(seat)?;
        let index = self.applicant_index.get(occupant).copied()?;
        self.slots[slot].occupants.remove(seat);
        self.applicants[index].allocated_slot = None;
        Some(index)
    }

    pub(crate) fn applicant_position(&self, id: &ApplicantId) -> Option<usize> {
        self.applicant_index.get(id).copied()
    }
}

#[derive(Deserialize)]
struct PopulationParts {
    applicants: Vec<Applicant>,
    slots: Vec<Slot>,
}

impl From<PopulationParts> for Population {
    fn from(parts: PopulationParts) -> Self {
        Self::new(parts.applicants, parts.slots)
    }
}
