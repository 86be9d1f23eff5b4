use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::engine::{MatchingEngine, MatchingStats};
use super::report::AllocationReport;
use crate::error::AppError;
use crate::ingestion::{ApplicantRecord, ImportSummary, PopulationImporter, SlotRecord};

/// Matching input: either the raw text format or explicit records.
#[derive(Debug, Default, Deserialize)]
pub struct MatchingRequest {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub slots: Vec<SlotRecord>,
    #[serde(default)]
    pub applicants: Vec<ApplicantRecord>,
    #[serde(default)]
    pub snapshot_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDigest {
    pub sequence: usize,
    pub attempts: usize,
    pub is_final: bool,
    pub allocated: usize,
    pub unallocated: usize,
}

#[derive(Debug, Serialize)]
pub struct MatchingResponse {
    pub computed_at: DateTime<Utc>,
    pub import: ImportSummary,
    pub stats: MatchingStats,
    pub report: AllocationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<Vec<SnapshotDigest>>,
}

/// Router builder exposing the matching run endpoint.
pub fn matching_router(engine: Arc<MatchingEngine>) -> Router {
    Router::new()
        .route("/api/v1/matching/run", post(run_handler))
        .with_state(engine)
}

pub(crate) async fn run_handler(
    State(engine): State<Arc<MatchingEngine>>,
    Json(request): Json<MatchingRequest>,
) -> Result<Json<MatchingResponse>, AppError> {
    let MatchingRequest {
        input,
        slots,
        applicants,
        snapshot_count,
    } = request;

    let imported = match input {
        Some(text) => PopulationImporter::from_text(&text)?,
        None => PopulationImporter::from_records(slots, applicants)?,
    };

    let (outcome_population, stats, snapshots) = match snapshot_count {
        Some(limit) => {
            let mut stream = engine.run_with_snapshots(&imported.population, limit)?;
            let mut digests = Vec::new();
            let mut last = None;
            for snapshot in stream.by_ref() {
                let allocated = snapshot.population.allocated().count();
                digests.push(SnapshotDigest {
                    sequence: snapshot.sequence,
                    attempts: snapshot.attempts,
                    is_final: snapshot.is_final,
                    allocated,
                    unallocated: snapshot.population.applicants().len() - allocated,
                });
                last = Some(snapshot.population);
            }
            let stats = stream.final_stats().unwrap_or_default();
            (last.unwrap_or_default(), stats, Some(digests))
        }
        None => {
            let outcome = engine.run_with_stats(&imported.population)?;
            (outcome.population, outcome.stats, None)
        }
    };

    Ok(Json(MatchingResponse {
        computed_at: Utc::now(),
        import: imported.summary,
        stats,
        report: AllocationReport::from_population(&outcome_population),
        snapshots,
    }))
}
