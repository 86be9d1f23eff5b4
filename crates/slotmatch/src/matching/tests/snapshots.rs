use super::common::*;
use crate::matching::audit::{audit, InvariantViolation};
use crate::matching::domain::Population;
use crate::matching::engine::MatchingEngine;
use crate::matching::snapshots::PopulationSnapshot;

fn drain(engine: &MatchingEngine, population: &Population, limit: usize) -> Vec<PopulationSnapshot> {
    engine
        .run_with_snapshots(population, limit)
        .expect("stream starts")
        .collect()
}

#[test]
fn stream_starts_with_untouched_state_and_ends_with_final_state() {
    let engine = MatchingEngine::with_snapshot_stride(5).expect("valid stride");
    let source = cohort();

    let snapshots = drain(&engine, &source, 3);

    let attempts: Vec<usize> = snapshots.iter().map(|snapshot| snapshot.attempts).collect();
    assert_eq!(attempts, vec![0, 5, 10, 26]);
    assert_eq!(snapshots[0].population, source);
    assert!(snapshots.iter().take(3).all(|snapshot| !snapshot.is_final));

    let last = snapshots.last().expect("final snapshot");
    assert!(last.is_final);
    assert_eq!(last.sequence, 3);
    let direct = engine.run(&source).expect("run succeeds");
    assert_eq!(last.population, direct);
}

#[test]
fn earlier_snapshots_are_not_rewritten_by_later_progress() {
    let engine = MatchingEngine::with_snapshot_stride(5).expect("valid stride");

    let snapshots = drain(&engine, &cohort(), 3);

    let early = &snapshots[1].population;
    assert_eq!(early.allocated().count(), 4);
    assert_eq!(allocation_of(early, "A4").as_deref(), Some("P1"));

    let last = &snapshots.last().expect("final").population;
    assert_eq!(last.allocated().count(), 7);
    assert_eq!(allocation_of(last, "A4"), None);
}

#[test]
fn zero_limit_still_yields_initial_and_final() {
    let engine = MatchingEngine::with_snapshot_stride(1).expect("valid stride");

    let snapshots = drain(&engine, &cohort(), 0);

    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].attempts, 0);
    assert!(snapshots[1].is_final);
}

#[test]
fn default_stride_on_short_runs_yields_two_snapshots() {
    let snapshots = drain(&MatchingEngine::new(), &cohort(), 20);

    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[1].attempts, 26);
}

#[test]
fn stream_is_fused_and_reports_final_stats() {
    let engine = MatchingEngine::with_snapshot_stride(10).expect("valid stride");
    let mut stream = engine
        .run_with_snapshots(&cohort(), 5)
        .expect("stream starts");

    assert!(stream.final_stats().is_none());
    let produced = stream.by_ref().count();
    assert_eq!(produced, 4);
    assert!(stream.next().is_none());

    let stats = stream.final_stats().expect("stats after final snapshot");
    assert_eq!(stats.attempts, 26);
    assert_eq!(stats.evictions, 2);
}

#[test]
fn every_snapshot_respects_capacity_eligibility_and_consistency() {
    let engine = MatchingEngine::with_snapshot_stride(1).expect("valid stride");

    for snapshot in drain(&engine, &cohort(), usize::MAX) {
        let structural: Vec<_> = audit(&snapshot.population)
            .into_iter()
            .filter(|violation| !matches!(violation, InvariantViolation::BlockingPair { .. }))
            .collect();
        assert!(
            structural.is_empty(),
            "snapshot {} broke invariants: {structural:?}",
            snapshot.sequence
        );
    }
}

#[test]
fn proposal_cursors_never_move_backwards() {
    let engine = MatchingEngine::with_snapshot_stride(1).expect("valid stride");
    let snapshots = drain(&engine, &cohort(), usize::MAX);

    for pair in snapshots.windows(2) {
        for (before, after) in pair[0]
            .population
            .applicants()
            .iter()
            .zip(pair[1].population.applicants())
        {
            assert!(after.next_proposal_index >= before.next_proposal_index);
        }
    }
}
