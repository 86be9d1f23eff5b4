use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::matching::engine::MatchingEngine;
use crate::matching::router::matching_router;

const TWO_SLOT_INPUT: &str = "(P1, 1, 3)\n(P2, 1, 0)\n(A1):(P1, P2) (4)\n(A2):(P1, P2) (5)\n";

async fn post_run(engine: MatchingEngine, payload: Value) -> (StatusCode, Value) {
    let router = matching_router(Arc::new(engine));

    let response = router
        .oneshot(
            Request::post("/api/v1/matching/run")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn run_route_matches_text_input() {
    let (status, body) = post_run(MatchingEngine::new(), json!({ "input": TWO_SLOT_INPUT })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["attempts"], 4);
    assert_eq!(body["stats"]["evictions"], 1);
    assert_eq!(body["import"]["applicants"], 2);
    assert_eq!(body["report"]["slots"][0]["occupants"], json!(["A2"]));
    assert_eq!(body["report"]["slots"][1]["occupants"], json!(["A1"]));
    assert_eq!(body["report"]["applicants"][0]["rank"], 2);
    assert!(body.get("snapshots").is_none());
    assert!(body["computed_at"].is_string());
}

#[tokio::test]
async fn run_route_accepts_structured_records() {
    let payload = json!({
        "slots": [{ "id": "P1", "capacity": 1, "minimum_score": 0 }],
        "applicants": [{ "id": "A1", "score": 2, "preferences": ["P1", "P9"] }]
    });

    let (status, body) = post_run(MatchingEngine::new(), payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["import"]["dropped_preferences"], 1);
    assert_eq!(body["stats"]["attempts"], 1);
    assert_eq!(body["report"]["summary"]["allocated"], 1);
}

#[tokio::test]
async fn run_route_reports_snapshot_progress() {
    let engine = MatchingEngine::with_snapshot_stride(1).unwrap();
    let payload = json!({ "input": TWO_SLOT_INPUT, "snapshot_count": 2 });

    let (status, body) = post_run(engine, payload).await;

    assert_eq!(status, StatusCode::OK);
    let snapshots = body["snapshots"].as_array().expect("snapshots listed");
    let attempts: Vec<u64> = snapshots
        .iter()
        .map(|snapshot| snapshot["attempts"].as_u64().unwrap())
        .collect();
    assert_eq!(attempts, vec![0, 1, 4]);
    assert_eq!(snapshots[2]["is_final"], true);
    assert_eq!(snapshots[2]["allocated"], 2);
    assert_eq!(body["stats"]["attempts"], 4);
}

#[tokio::test]
async fn run_route_rejects_duplicate_slots() {
    let payload = json!({
        "slots": [
            { "id": "P1", "capacity": 1, "minimum_score": 0 },
            { "id": "P1", "capacity": 2, "minimum_score": 0 }
        ],
        "applicants": []
    });

    let (status, body) = post_run(MatchingEngine::new(), payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("P1 is declared twice"));
}
