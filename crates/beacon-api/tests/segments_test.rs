//! Integration tests for segment management and evaluation.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

async fn ingest(pool: &PgPool, email: &str, event_type: &str, properties: serde_json::Value, occurred_at: &str) {
    let (status, _) = common::post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/events",
        &json!({"email": email, "type": event_type, "properties": properties, "occurredAt": occurred_at}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_type_in_window_excludes_stale_and_wrong_type(pool: PgPool) {
    ingest(&pool, "recent@example.com", "login", json!({}), "2026-01-14T10:00:00Z").await;
    ingest(&pool, "stale@example.com", "login", json!({}), "2025-12-01T10:00:00Z").await;
    ingest(&pool, "other@example.com", "purchase", json!({}), "2026-01-14T10:00:00Z").await;

    let (status, json) = common::post_json(
        common::build_test_app(pool),
        "/api/v1/segments/preview",
        &json!({"definition": {"kind": "event_type_in_last_days", "eventType": "login", "days": 7}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["customers"][0]["email"], "recent@example.com");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_min_count_matches_three_but_not_two(pool: PgPool) {
    for day in ["2026-01-06", "2026-01-10", "2026-01-14"] {
        ingest(&pool, "three@example.com", "page_view", json!({}), &format!("{day}T08:00:00Z")).await;
    }
    for day in ["2026-01-10", "2026-01-14"] {
        ingest(&pool, "two@example.com", "page_view", json!({}), &format!("{day}T08:00:00Z")).await;
    }

    let (status, json) = common::post_json(
        common::build_test_app(pool),
        "/api/v1/segments/preview",
        &json!({"definition": {"kind": "event_count_gte_in_last_days", "eventType": "page_view", "days": 30, "minCount": 3}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["customers"][0]["email"], "three@example.com");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_property_equality_on_stored_segment(pool: PgPool) {
    ingest(&pool, "pricing@example.com", "page_view", json!({"path": "/pricing"}), "2026-01-14T08:00:00Z").await;
    ingest(&pool, "docs@example.com", "page_view", json!({"path": "/docs"}), "2026-01-14T08:00:00Z").await;

    let (status, segment) = common::post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/segments",
        &json!({
            "name": "Pricing visitors",
            "definition": {"kind": "event_property_equals", "eventType": "page_view", "path": "path", "value": "/pricing", "days": 7}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = segment["id"].as_str().unwrap();
    let (status, json) =
        common::get_json(common::build_test_app(pool), &format!("/api/v1/segments/{id}/preview")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["customers"][0]["email"], "pricing@example.com");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_missing_kind_is_rejected(pool: PgPool) {
    let (status, json) = common::post_json(
        common::build_test_app(pool),
        "/api/v1/segments",
        &json!({"name": "Broken", "definition": {"eventType": "login", "days": 3}}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"].as_str().unwrap().contains("kind"));
}
