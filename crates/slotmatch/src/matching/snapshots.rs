use std::iter::FusedIterator;

use serde::Serialize;

use super::domain::Population;
use super::engine::{MatchingRun, MatchingStats};

/// Independent copy of the population at one point of a run.
#[derive(Debug, Clone, Serialize)]
pub struct PopulationSnapshot {
    /// Position in the produced sequence, starting at 0 for the initial state.
    pub sequence: usize,
    /// Proposal attempts processed when the copy was taken.
    pub attempts: usize,
    pub is_final: bool,
    pub population: Population,
}

/// Lazy, finite sequence of snapshots driven by a single run.
///
/// Each call to `next` advances the underlying run just far enough to
/// produce the following snapshot. The stream owns the live state and
/// cannot be restarted.
#[derive(Debug)]
pub struct SnapshotStream {
    run: Option<MatchingRun>,
    stride: usize,
    limit: usize,
    produced: usize,
    final_stats: Option<MatchingStats>,
}

impl SnapshotStream {
    pub(crate) fn new(run: MatchingRun, stride: usize, limit: usize) -> Self {
        Self {
            run: Some(run),
            stride: stride.max(1),
            limit,
            produced: 0,
            final_stats: None,
        }
    }

    /// Counters of the finished run, available once the final snapshot was produced.
    pub fn final_stats(&self) -> Option<MatchingStats> {
        self.final_stats
    }

    fn capture(&mut self, population: Population, attempts: usize, is_final: bool) -> PopulationSnapshot {
        let snapshot = PopulationSnapshot {
            sequence: self.produced,
            attempts,
            is_final,
            population,
        };
        self.produced += 1;
        snapshot
    }
}

impl Iterator for SnapshotStream {
    type Item = PopulationSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        let run = self.run.as_mut()?;

        if self.produced == 0 {
            let initial = run.population().clone();
            return Some(self.capture(initial, 0, false));
        }

        while run.step().is_some() {
            let attempts = run.stats().attempts;
            if attempts % self.stride == 0 && self.produced < self.limit {
                let current = run.population().clone();
                return Some(self.capture(current, attempts, false));
            }
        }

        let outcome = self.run.take()?.finish();
        self.final_stats = Some(outcome.stats);
        Some(self.capture(outcome.population, outcome.stats.attempts, true))
    }
}

impl FusedIterator for SnapshotStream {}
