//! Integration tests for the read API
//!
//! Tests cover:
//! - Listing with president/year filters, sorting and pagination
//! - Lenient parameter handling (bad numbers fall back to defaults)
//! - Single-order lookup and 404s
//! - Latest-N feed
//! - Health endpoint

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use eoa_common::db::executive_orders;
use eoa_common::CanonicalRecord;
use eoa_ingest::{build_router, AppState};
use helpers::create_test_db;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: archive seeded with five orders across two presidents
async fn setup_test_db() -> (TempDir, SqlitePool) {
    let (dir, pool) = create_test_db().await.unwrap();

    let seed = [
        ("EO-13765", "Minimizing the Economic Burden", (2017, 1, 20), "Donald J. Trump"),
        ("EO-13766", "Expediting Environmental Reviews", (2017, 1, 24), "Donald J. Trump"),
        ("EO-13985", "Advancing Racial Equity", (2021, 1, 20), "Joseph R. Biden Jr."),
        ("EO-13986", "Ensuring a Lawful Census", (2021, 1, 20), "Joseph R. Biden Jr."),
        ("EO-14000", "Supporting the Reopening", (2021, 1, 21), "Joseph R. Biden Jr."),
    ];

    for (id, title, (y, m, d), president) in seed {
        executive_orders::insert(
            &pool,
            &CanonicalRecord {
                id: id.to_string(),
                title: title.to_string(),
                issuance_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
                issuing_authority: president.to_string(),
                citation: Some(format!("FR citation for {}", id)),
                source_url: None,
                summary: None,
            },
        )
        .await
        .unwrap();
    }

    (dir, pool)
}

fn setup_app(db: SqlitePool) -> axum::Router {
    build_router(AppState::new(db))
}

fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn get_json(db: &SqlitePool, uri: &str) -> (StatusCode, Value) {
    let response = setup_app(db.clone())
        .oneshot(test_request(uri))
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    (status, serde_json::from_slice(&bytes).expect("Should parse JSON"))
}

fn ids(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, db) = setup_test_db().await;

    let (status, body) = get_json(&db, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "eoa-ingest");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
}

// =============================================================================
// List Endpoint
// =============================================================================

#[tokio::test]
async fn test_list_defaults_newest_first() {
    let (_dir, db) = setup_test_db().await;

    let (status, body) = get_json(&db, "/api/v1/executive-orders").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ids(&body["items"]),
        vec!["EO-14000", "EO-13985", "EO-13986", "EO-13766", "EO-13765"]
    );
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["per_page"], 20);
    assert_eq!(body["pagination"]["total_items"], 5);
    assert_eq!(body["pagination"]["total_pages"], 1);
    assert_eq!(body["pagination"]["has_next"], false);
    assert_eq!(body["pagination"]["has_prev"], false);

    let first = &body["items"][0];
    assert_eq!(first["president"], "Joseph R. Biden Jr.");
    assert_eq!(first["issuance_date"], "2021-01-21");
    assert_eq!(first["federal_register_citation"], "FR citation for EO-14000");
    assert!(first["url"].is_null());
}

#[tokio::test]
async fn test_list_filters_by_president_and_year() {
    let (_dir, db) = setup_test_db().await;

    let (_, body) = get_json(
        &db,
        "/api/v1/executive-orders?president=Donald%20J.%20Trump&sort=id&order=asc",
    )
    .await;
    assert_eq!(ids(&body["items"]), vec!["EO-13765", "EO-13766"]);

    let (_, body) = get_json(&db, "/api/v1/executive-orders?year=2021&sort=id&order=asc").await;
    assert_eq!(ids(&body["items"]), vec!["EO-13985", "EO-13986", "EO-14000"]);
    assert_eq!(body["pagination"]["total_items"], 3);
}

#[tokio::test]
async fn test_list_paginates() {
    let (_dir, db) = setup_test_db().await;

    let (_, body) = get_json(&db, "/api/v1/executive-orders?per_page=2&page=2&sort=id&order=asc").await;

    assert_eq!(ids(&body["items"]), vec!["EO-13985", "EO-13986"]);
    assert_eq!(body["pagination"]["total_pages"], 3);
    assert_eq!(body["pagination"]["has_next"], true);
    assert_eq!(body["pagination"]["has_prev"], true);
}

#[tokio::test]
async fn test_list_bad_numbers_fall_back_to_defaults() {
    let (_dir, db) = setup_test_db().await;

    let (status, body) = get_json(
        &db,
        "/api/v1/executive-orders?page=zero&per_page=500&year=abc",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["per_page"], 20);
    assert_eq!(body["pagination"]["total_items"], 5);
}

#[tokio::test]
async fn test_list_huge_page_number_falls_back_to_first_page() {
    let (_dir, db) = setup_test_db().await;

    let (status, body) = get_json(
        &db,
        "/api/v1/executive-orders?page=9223372036854775807&per_page=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["per_page"], 2);
    assert_eq!(ids(&body["items"]), vec!["EO-14000", "EO-13985"]);
}

#[tokio::test]
async fn test_list_page_past_the_end_is_empty() {
    let (_dir, db) = setup_test_db().await;

    let (status, body) = get_json(&db, "/api/v1/executive-orders?page=1000000000000").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1000000000000i64);
    assert_eq!(body["pagination"]["has_next"], false);
    assert!(ids(&body["items"]).is_empty());
}

#[tokio::test]
async fn test_list_rejects_unknown_sort_field() {
    let (_dir, db) = setup_test_db().await;

    let (status, body) = get_json(&db, "/api/v1/executive-orders?sort=created_at").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert_eq!(body["status_code"], 400);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Valid options are"));
}

#[tokio::test]
async fn test_list_sort_by_president_descending() {
    let (_dir, db) = setup_test_db().await;

    let (_, body) = get_json(&db, "/api/v1/executive-orders?sort=president&order=desc").await;
    let presidents: Vec<_> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["president"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(presidents[0], "Joseph R. Biden Jr.");
    assert_eq!(presidents[4], "Donald J. Trump");
}

// =============================================================================
// Single Item
// =============================================================================

#[tokio::test]
async fn test_get_by_id() {
    let (_dir, db) = setup_test_db().await;

    let (status, body) = get_json(&db, "/api/v1/executive-orders/EO-13985").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "Advancing Racial Equity");
    assert!(body["data"]["created_at"].is_string());
}

#[tokio::test]
async fn test_get_missing_id_is_404() {
    let (_dir, db) = setup_test_db().await;

    let (status, body) = get_json(&db, "/api/v1/executive-orders/EO-1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
    assert_eq!(body["status_code"], 404);
    assert_eq!(body["error_type"], "NOT_FOUND");
}

// =============================================================================
// Latest Feed
// =============================================================================

#[tokio::test]
async fn test_latest_orders() {
    let (_dir, db) = setup_test_db().await;

    let (status, body) = get_json(&db, "/api/v1/latest-executive-orders?limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(ids(&body["data"]), vec!["EO-14000", "EO-13985"]);
}

#[tokio::test]
async fn test_latest_limit_out_of_range_uses_default() {
    let (_dir, db) = setup_test_db().await;

    let (_, body) = get_json(&db, "/api/v1/latest-executive-orders?limit=1000").await;

    assert_eq!(body["data"].as_array().unwrap().len(), 5);
}
