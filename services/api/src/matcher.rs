use chrono::{DateTime, Local};
use clap::Args;
use serde::Serialize;
use slotmatch::config::{AppConfig, MatchingConfig};
use slotmatch::error::AppError;
use slotmatch::ingestion::{ImportSummary, ImportedPopulation, PopulationImporter};
use slotmatch::matching::{
    audit, AllocationReport, MatchingEngine, MatchingStats, Population, PopulationSnapshot,
};
use slotmatch::telemetry;
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Debug, Default)]
pub(crate) struct MatchArgs {
    /// Text input file. Defaults to APP_INPUT_PATH.
    #[arg(long, conflicts_with_all = ["slots_csv", "applicants_csv"])]
    pub(crate) input: Option<PathBuf>,
    /// CSV file with `Slot,Capacity,Minimum Score` rows
    #[arg(long, requires = "applicants_csv")]
    pub(crate) slots_csv: Option<PathBuf>,
    /// CSV file with `Applicant,Score,Preferences` rows
    #[arg(long, requires = "slots_csv")]
    pub(crate) applicants_csv: Option<PathBuf>,
    /// Print a progress line for up to N snapshots before the final state
    #[arg(long)]
    pub(crate) snapshots: Option<usize>,
    /// Proposal attempts between snapshots (overrides APP_SNAPSHOT_STRIDE)
    #[arg(long)]
    pub(crate) stride: Option<usize>,
    /// Audit the final allocation and fail on any violation
    #[arg(long)]
    pub(crate) verify: bool,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct MatchOutput {
    computed_at: DateTime<Local>,
    import: ImportSummary,
    stats: MatchingStats,
    report: AllocationReport,
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    if let Some(stride) = args.stride {
        config.matching.snapshot_stride = stride;
    }
    let engine = MatchingEngine::from_config(&config.matching)?;
    let imported = load_population(&args, &config.matching)?;

    let (population, stats) = match args.snapshots {
        Some(limit) => run_with_progress(&engine, &imported.population, limit, args.json)?,
        None => {
            let outcome = engine.run_with_stats(&imported.population)?;
            (outcome.population, outcome.stats)
        }
    };

    let report = AllocationReport::from_population(&population);
    if args.json {
        let output = MatchOutput {
            computed_at: Local::now(),
            import: imported.summary,
            stats,
            report,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Report payload unavailable: {err}"),
        }
    } else {
        render_report(&report, &imported.summary, &stats);
    }

    if args.verify {
        verify(&population)?;
    }

    Ok(())
}

fn load_population(
    args: &MatchArgs,
    config: &MatchingConfig,
) -> Result<ImportedPopulation, AppError> {
    match (&args.slots_csv, &args.applicants_csv) {
        (Some(slots), Some(applicants)) => {
            PopulationImporter::from_csv_paths(slots, applicants).map_err(AppError::from)
        }
        _ => {
            let path = args.input.as_ref().unwrap_or(&config.input_path);
            PopulationImporter::from_path(path).map_err(AppError::from)
        }
    }
}

fn run_with_progress(
    engine: &MatchingEngine,
    population: &Population,
    limit: usize,
    quiet: bool,
) -> Result<(Population, MatchingStats), AppError> {
    let mut stream = engine.run_with_snapshots(population, limit)?;
    let mut last = None;

    if !quiet {
        println!("Snapshot progress (every {} attempts)", engine.snapshot_stride());
    }
    for snapshot in stream.by_ref() {
        if !quiet {
            print_progress(&snapshot);
        }
        last = Some(snapshot.population);
    }

    let stats = stream.final_stats().unwrap_or_default();
    Ok((last.unwrap_or_default(), stats))
}

fn print_progress(snapshot: &PopulationSnapshot) {
    let total = snapshot.population.applicants().len();
    let allocated = snapshot.population.allocated().count();
    let marker = if snapshot.is_final { " (final)" } else { "" };
    println!(
        "- #{} after {} attempts: {}/{} allocated{}",
        snapshot.sequence, snapshot.attempts, allocated, total, marker
    );
}

fn render_report(report: &AllocationReport, import: &ImportSummary, stats: &MatchingStats) {
    println!("Slot allocation report");
    println!(
        "Input: {} slots, {} applicants ({} preferences dropped)",
        import.slots, import.applicants, import.dropped_preferences
    );
    println!(
        "Run: {} attempts | {} evictions | {} rejections | {} below threshold",
        stats.attempts, stats.evictions, stats.rejections, stats.ineligible
    );

    println!("\nApplicants");
    for view in &report.applicants {
        match &view.allocated_slot {
            Some(slot) => println!(
                "- {} (score {}): {} [choice {}]",
                view.applicant_id, view.score, slot, view.rank_label
            ),
            None => println!(
                "- {} (score {}): {}",
                view.applicant_id, view.score, view.status_label
            ),
        }
    }

    println!("\nSlots");
    for slot in &report.slots {
        let occupants: Vec<&str> = slot.occupants.iter().map(|id| id.0.as_str()).collect();
        println!(
            "- {} ({}/{} seats, min {}): {}",
            slot.slot_id,
            slot.filled,
            slot.capacity,
            slot.minimum_score,
            if occupants.is_empty() {
                "-".to_string()
            } else {
                occupants.join(", ")
            }
        );
    }

    let summary = &report.summary;
    println!(
        "\nAllocated {}/{} applicants ({:.0}%) | {}/{} seats filled | {} without preferences",
        summary.allocated,
        summary.total_applicants,
        summary.allocation_rate() * 100.0,
        summary.seats_filled,
        summary.seats_total,
        summary.without_preferences
    );
    for entry in &summary.rank_distribution {
        println!("  choice {}: {} applicants", entry.rank, entry.applicants);
    }
}

fn verify(population: &Population) -> Result<(), AppError> {
    let violations = audit(population);
    if violations.is_empty() {
        eprintln!("Audit passed: allocation is consistent and stable");
        return Ok(());
    }

    for violation in &violations {
        warn!(%violation, "allocation invariant violated");
    }
    Err(AppError::Audit(violations.len()))
}
