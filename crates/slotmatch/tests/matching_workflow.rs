use slotmatch::ingestion::PopulationImporter;
use slotmatch::matching::{
    audit, AllocationReport, AllocationStatus, ApplicantId, MatchingEngine, SlotId,
};

fn imported() -> slotmatch::ingestion::ImportedPopulation {
    let data = include_str!("fixtures/cohort.txt");
    PopulationImporter::from_text(data).expect("fixture imports")
}

#[test]
fn importer_cleans_fixture_preferences() {
    let imported = imported();

    assert_eq!(imported.summary.slots, 5);
    assert_eq!(imported.summary.applicants, 10);
    assert_eq!(imported.summary.dropped_preferences, 5);

    let a2 = imported
        .population
        .applicant(&ApplicantId::from("A2"))
        .expect("A2 present");
    assert_eq!(a2.preferences, vec![SlotId::from("P1"), SlotId::from("P3")]);

    let a10 = imported
        .population
        .applicant(&ApplicantId::from("A10"))
        .expect("A10 present");
    assert!(a10.preferences.is_empty());
}

#[test]
fn fixture_run_produces_stable_allocation() {
    let imported = imported();
    let outcome = MatchingEngine::new()
        .run_with_stats(&imported.population)
        .expect("run succeeds");
    let population = &outcome.population;

    assert!(audit(population).is_empty());
    assert_eq!(outcome.stats.attempts, 22);
    assert_eq!(outcome.stats.evictions, 2);

    let expected = [
        ("A1", Some("P1")),
        ("A2", Some("P3")),
        ("A3", None),
        ("A4", Some("P1")),
        ("A5", Some("P3")),
        ("A6", Some("P2")),
        ("A7", None),
        ("A8", Some("P4")),
        ("A9", None),
        ("A10", None),
    ];
    for (applicant, slot) in expected {
        let found = population
            .applicant(&ApplicantId::from(applicant))
            .expect("applicant present");
        assert_eq!(
            found.allocated_slot.as_ref().map(|slot| slot.0.as_str()),
            slot,
            "unexpected allocation for {applicant}"
        );
    }

    let closed = population.slot(&SlotId::from("P5")).expect("P5 present");
    assert!(closed.occupants.is_empty());
}

#[test]
fn report_exposes_ranks_for_downstream_consumers() {
    let imported = imported();
    let population = MatchingEngine::new()
        .run(&imported.population)
        .expect("run succeeds");

    let report = AllocationReport::from_population(&population);

    let a5 = report
        .applicants
        .iter()
        .find(|view| view.applicant_id == ApplicantId::from("A5"))
        .expect("A5 view");
    assert_eq!(a5.rank, Some(3));
    assert_eq!(a5.status, AllocationStatus::Allocated);

    let a7 = report
        .applicants
        .iter()
        .find(|view| view.applicant_id == ApplicantId::from("A7"))
        .expect("A7 view");
    assert_eq!(a7.rank_label, "unallocated");

    assert_eq!(report.summary.allocated, 6);
    assert_eq!(report.summary.unallocated, 4);
    assert_eq!(report.summary.seats_total, 6);

    let json = serde_json::to_value(&report).expect("report serializes");
    assert_eq!(json["summary"]["allocated"], 6);
    assert_eq!(json["applicants"][0]["status"], "allocated");
}

#[test]
fn snapshot_stream_finishes_on_the_same_allocation() {
    let imported = imported();
    let engine = MatchingEngine::with_snapshot_stride(4).expect("valid stride");

    let snapshots: Vec<_> = engine
        .run_with_snapshots(&imported.population, 3)
        .expect("stream starts")
        .collect();

    let attempts: Vec<usize> = snapshots.iter().map(|snapshot| snapshot.attempts).collect();
    assert_eq!(attempts, vec![0, 4, 8, 22]);

    let direct = engine.run(&imported.population).expect("run succeeds");
    assert_eq!(snapshots[3].population, direct);
    assert!(imported
        .population
        .applicants()
        .iter()
        .all(|applicant| applicant.allocated_slot.is_none()));
}

#[test]
fn csv_sources_match_text_sources() {
    let slots = "Slot,Capacity,Minimum Score\nP1,2,5\nP2,1,4\nP3,2,3\nP4,1,3\nP5,0,0\n";
    let applicants = "Applicant,Score,Preferences\n\
A1,5,P1;P2;P3\n\
A2,3,P51;P1;P3\n\
A3,4,P2;P2;P4\n\
A4,5,P1;P3;P4\n\
A5,5,P1;P2;P3\n\
A6,5,P2;P1;P4\n\
A7,3,P3;P4;P5\n\
A8,4,P4;P3;P1\n\
A9,2,P1;P2;P4\n\
A10,5,P60;P61;P62\n";

    let from_csv = PopulationImporter::from_csv_readers(slots.as_bytes(), applicants.as_bytes())
        .expect("csv imports");
    let engine = MatchingEngine::new();

    let csv_result = engine.run(&from_csv.population).expect("csv run");
    let text_result = engine.run(&imported().population).expect("text run");

    assert_eq!(csv_result, text_result);
}
