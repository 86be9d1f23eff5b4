use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use tracing::{debug, info, trace};

use super::domain::{ApplicantId, Population, SlotId};
use super::snapshots::SnapshotStream;
use crate::config::MatchingConfig;

/// Attempts between two intermediate snapshots unless configured otherwise.
pub const DEFAULT_SNAPSHOT_STRIDE: usize = 50;

/// Errors raised before a run starts; a failing run never yields a population.
#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    #[error("applicant {applicant} lists unknown slot {slot}")]
    UnknownSlot { applicant: ApplicantId, slot: SlotId },
    #[error("applicant {applicant} lists slot {slot} more than once")]
    DuplicatePreference { applicant: ApplicantId, slot: SlotId },
    #[error("applicant id {0} appears more than once")]
    DuplicateApplicant(ApplicantId),
    #[error("slot id {0} appears more than once")]
    DuplicateSlot(SlotId),
    #[error("snapshot stride must be greater than zero")]
    InvalidSnapshotStride,
}

/// Result of a single dequeue-and-process cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalOutcome {
    /// The applicant ran out of preferences and leaves the queue for good.
    Exhausted { applicant: ApplicantId },
    /// The applicant scores below the slot threshold.
    Ineligible { applicant: ApplicantId, slot: SlotId },
    /// The slot had a free seat.
    Accepted { applicant: ApplicantId, slot: SlotId },
    /// The slot was full and its weakest occupant made room.
    Displaced {
        applicant: ApplicantId,
        slot: SlotId,
        evicted: ApplicantId,
    },
    /// The slot was full and nobody in it scored lower.
    Rejected { applicant: ApplicantId, slot: SlotId },
}

/// Counters describing how a run progressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchingStats {
    pub attempts: usize,
    pub acceptances: usize,
    pub evictions: usize,
    pub rejections: usize,
    pub ineligible: usize,
    pub exhausted: usize,
}

impl MatchingStats {
    fn record(&mut self, outcome: &ProposalOutcome) {
        self.attempts += 1;
        match outcome {
            ProposalOutcome::Exhausted { .. } => self.exhausted += 1,
            ProposalOutcome::Ineligible { .. } => self.ineligible += 1,
            ProposalOutcome::Accepted { .. } => self.acceptances += 1,
            ProposalOutcome::Displaced { .. } => {
                self.acceptances += 1;
                self.evictions += 1;
            }
            ProposalOutcome::Rejected { .. } => self.rejections += 1,
        }
    }
}

/// Final population of a run together with its counters.
#[derive(Debug, Clone)]
pub struct MatchingOutcome {
    pub population: Population,
    pub stats: MatchingStats,
}

/// Deferred-acceptance matcher with eligibility thresholds and eviction.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    snapshot_stride: usize,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self {
            snapshot_stride: DEFAULT_SNAPSHOT_STRIDE,
        }
    }
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot_stride(snapshot_stride: usize) -> Result<Self, MatchingError> {
        if snapshot_stride == 0 {
            return Err(MatchingError::InvalidSnapshotStride);
        }

        Ok(Self { snapshot_stride })
    }

    pub fn from_config(config: &MatchingConfig) -> Result<Self, MatchingError> {
        Self::with_snapshot_stride(config.snapshot_stride)
    }

    pub fn snapshot_stride(&self) -> usize {
        self.snapshot_stride
    }

    /// Run to a fixed point on a fresh copy of `population`.
    pub fn run(&self, population: &Population) -> Result<Population, MatchingError> {
        self.run_with_stats(population)
            .map(|outcome| outcome.population)
    }

    pub fn run_with_stats(&self, population: &Population) -> Result<MatchingOutcome, MatchingError> {
        let mut run = MatchingRun::new(population)?;
        while run.step().is_some() {}
        Ok(run.finish())
    }

    /// Lazily drive a run, producing at most `snapshot_count` snapshots
    /// (the initial state included) plus the terminal state.
    pub fn run_with_snapshots(
        &self,
        population: &Population,
        snapshot_count: usize,
    ) -> Result<SnapshotStream, MatchingError> {
        let run = MatchingRun::new(population)?;
        Ok(SnapshotStream::new(run, self.snapshot_stride, snapshot_count))
    }
}

/// Live state of one run: the working copy plus the free queue.
#[derive(Debug)]
pub(crate) struct MatchingRun {
    population: Population,
    preferences: Vec<Vec<usize>>,
    queue: VecDeque<usize>,
    stats: MatchingStats,
}

impl MatchingRun {
    pub(crate) fn new(source: &Population) -> Result<Self, MatchingError> {
        let preferences = resolve_preferences(source)?;
        let population = fresh_copy(source);

        let queue: VecDeque<usize> = preferences
            .iter()
            .enumerate()
            .filter(|(_, candidates)| !candidates.is_empty())
            .map(|(index, _)| index)
            .collect();

        info!(
            applicants = population.applicants().len(),
            slots = population.slots().len(),
            active = queue.len(),
            "matching run started"
        );

        Ok(Self {
            population,
            preferences,
            queue,
            stats: MatchingStats::default(),
        })
    }

    pub(crate) fn population(&self) -> &Population {
        &self.population
    }

    pub(crate) fn stats(&self) -> MatchingStats {
        self.stats
    }

    /// Process the next free applicant; `None` once the queue is drained.
    pub(crate) fn step(&mut self) -> Option<ProposalOutcome> {
        let applicant = self.queue.pop_front()?;
        let outcome = self.propose(applicant);
        self.stats.record(&outcome);
        trace!(attempt = self.stats.attempts, ?outcome, "proposal processed");
        Some(outcome)
    }

    pub(crate) fn finish(self) -> MatchingOutcome {
        let allocated = self.population.allocated().count();
        info!(
            attempts = self.stats.attempts,
            evictions = self.stats.evictions,
            allocated,
            unallocated = self.population.applicants().len() - allocated,
            "matching run finished"
        );

        MatchingOutcome {
            population: self.population,
            stats: self.stats,
        }
    }

    fn propose(&mut self, applicant: usize) -> ProposalOutcome {
        let proposer = self.population.applicant_at(applicant);
        let applicant_id = proposer.id.clone();
        let score = proposer.score;

        let Some(&slot) = self.preferences[applicant].get(proposer.next_proposal_index) else {
            return ProposalOutcome::Exhausted {
                applicant: applicant_id,
            };
        };

        let target = self.population.slot_at(slot);
        let slot_id = target.id.clone();

        if !target.admits(score) {
            self.reject(applicant);
            return ProposalOutcome::Ineligible {
                applicant: applicant_id,
                slot: slot_id,
            };
        }

        if !target.is_full() {
            self.population.allocate(applicant, slot);
            return ProposalOutcome::Accepted {
                applicant: applicant_id,
                slot: slot_id,
            };
        }

        match self.weakest_occupant(slot) {
            Some((seat, weakest_score)) if score > weakest_score => {
                match self.population.release(slot, seat) {
                    Some(evicted) => {
                        self.population.allocate(applicant, slot);
                        self.queue.push_back(evicted);
                        let evicted_id = self.population.applicant_at(evicted).id.clone();
                        debug!(
                            slot = %slot_id,
                            incoming = %applicant_id,
                            evicted = %evicted_id,
                            "occupant evicted"
                        );
                        ProposalOutcome::Displaced {
                            applicant: applicant_id,
                            slot: slot_id,
                            evicted: evicted_id,
                        }
                    }
                    None => {
                        self.reject(applicant);
                        ProposalOutcome::Rejected {
                            applicant: applicant_id,
                            slot: slot_id,
                        }
                    }
                }
            }
            _ => {
                self.reject(applicant);
                ProposalOutcome::Rejected {
                    applicant: applicant_id,
                    slot: slot_id,
                }
            }
        }
    }

    fn reject(&mut self, applicant: usize) {
        self.population.advance_cursor(applicant);
        self.queue.push_back(applicant);
    }

    /// Seat position and score of the lowest-scoring occupant.
    ///
    /// Ties go to the earliest-allocated occupant.
    fn weakest_occupant(&self, slot: usize) -> Option<(usize, u32)> {
        self.population
            .slot_at(slot)
            .occupants
            .iter()
            .enumerate()
            .filter_map(|(seat, occupant)| {
                self.population
                    .applicant_position(occupant)
                    .map(|index| (seat, self.population.applicant_at(index).score))
            })
            .min_by_key(|&(_, score)| score)
    }
}

/// Map every preference to a slot position, rejecting malformed input.
fn resolve_preferences(population: &Population) -> Result<Vec<Vec<usize>>, MatchingError> {
    let mut seen_slots = HashSet::new();
    for slot in population.slots() {
        if !seen_slots.insert(&slot.id) {
            return Err(MatchingError::DuplicateSlot(slot.id.clone()));
        }
    }

    let mut seen_applicants = HashSet::new();
    let mut resolved = Vec::with_capacity(population.applicants().len());

    for applicant in population.applicants() {
        if !seen_applicants.insert(&applicant.id) {
            return Err(MatchingError::DuplicateApplicant(applicant.id.clone()));
        }

        let mut listed = HashSet::new();
        let mut candidates = Vec::with_capacity(applicant.preferences.len());
        for slot in &applicant.preferences {
            if !listed.insert(slot) {
                return Err(MatchingError::DuplicatePreference {
                    applicant: applicant.id.clone(),
                    slot: slot.clone(),
                });
            }

            let position =
                population
                    .slot_position(slot)
                    .ok_or_else(|| MatchingError::UnknownSlot {
                        applicant: applicant.id.clone(),
                        slot: slot.clone(),
                    })?;
            candidates.push(position);
        }
        resolved.push(candidates);
    }

    Ok(resolved)
}

/// Deep copy with allocation state cleared so every run starts from scratch.
fn fresh_copy(source: &Population) -> Population {
    let (mut applicants, mut slots) = source.clone().into_parts();

    for applicant in &mut applicants {
        applicant.allocated_slot = None;
        applicant.next_proposal_index = 0;
    }
    for slot in &mut slots {
        slot.occupants.clear();
    }

    Population::new(applicants, slots)
}
