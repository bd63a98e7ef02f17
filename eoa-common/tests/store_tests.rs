//! Keyed store tests against a temporary SQLite database

use chrono::NaiveDate;
use eoa_common::db::executive_orders::{self, RecordQuery, SortField, SortOrder};
use eoa_common::db::init_database_pool;
use eoa_common::{CanonicalRecord, Error};
use sqlx::SqlitePool;
use std::time::Duration;
use tempfile::TempDir;

async fn create_test_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database_pool(&temp_dir.path().join("test_eoa.db"))
        .await
        .unwrap();
    (temp_dir, pool)
}

fn record(id: &str, title: &str, date: (i32, u32, u32), president: &str) -> CanonicalRecord {
    CanonicalRecord {
        id: id.to_string(),
        title: title.to_string(),
        issuance_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        issuing_authority: president.to_string(),
        citation: Some("86 FR 7009".to_string()),
        source_url: None,
        summary: None,
    }
}

async fn seed(pool: &SqlitePool) {
    let records = [
        record("EO-13985", "Advancing Racial Equity", (2021, 1, 20), "Joseph R. Biden Jr."),
        record("EO-13990", "Protecting Public Health", (2021, 1, 20), "Joseph R. Biden Jr."),
        record("EO-13769", "Protecting the Nation", (2017, 1, 27), "Donald J. Trump"),
        record("EO-13636", "Improving Cybersecurity", (2013, 2, 12), "Barack Obama"),
        record("EO-14028", "Improving the Nation's Cybersecurity", (2021, 5, 12), "Joseph R. Biden Jr."),
    ];
    for r in &records {
        executive_orders::insert(pool, r).await.unwrap();
    }
}

#[tokio::test]
async fn test_insert_then_get_round_trips_fields() {
    let (_dir, pool) = create_test_db().await;
    let original = record("EO-13985", "Advancing Racial Equity", (2021, 1, 20), "Joseph R. Biden Jr.");

    executive_orders::insert(&pool, &original).await.unwrap();
    let stored = executive_orders::get_by_id(&pool, "EO-13985")
        .await
        .unwrap()
        .expect("record should exist");

    assert_eq!(stored.to_canonical(), original);
    assert_eq!(stored.created_at, stored.updated_at);
}

#[tokio::test]
async fn test_update_preserves_created_at() {
    let (_dir, pool) = create_test_db().await;
    let mut r = record("EO-13985", "Draft title", (2021, 1, 20), "Unknown");
    executive_orders::insert(&pool, &r).await.unwrap();
    let before = executive_orders::get_by_id(&pool, "EO-13985").await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    r.title = "Advancing Racial Equity".to_string();
    r.citation = None;
    executive_orders::update(&pool, &r).await.unwrap();

    let after = executive_orders::get_by_id(&pool, "EO-13985").await.unwrap().unwrap();
    assert_eq!(after.title, "Advancing Racial Equity");
    assert_eq!(after.citation, None);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let (_dir, pool) = create_test_db().await;
    let r = record("EO-1", "Missing", (2020, 1, 1), "Unknown");

    let result = executive_orders::update(&pool, &r).await;

    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_list_filters_by_president_and_year() {
    let (_dir, pool) = create_test_db().await;
    seed(&pool).await;

    let query = RecordQuery {
        president: Some("Joseph R. Biden Jr.".to_string()),
        ..Default::default()
    };
    let (items, total) = executive_orders::list(&pool, &query).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(items.len(), 3);

    let query = RecordQuery {
        year: Some(2017),
        ..Default::default()
    };
    let (items, total) = executive_orders::list(&pool, &query).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, "EO-13769");
}

#[tokio::test]
async fn test_list_sorts_and_paginates() {
    let (_dir, pool) = create_test_db().await;
    seed(&pool).await;

    let query = RecordQuery {
        sort: SortField::Id,
        order: SortOrder::Asc,
        limit: 2,
        offset: 2,
        ..Default::default()
    };
    let (items, total) = executive_orders::list(&pool, &query).await.unwrap();

    assert_eq!(total, 5);
    let ids: Vec<_> = items.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["EO-13985", "EO-13990"]);
}

#[tokio::test]
async fn test_latest_orders_by_issuance_date_desc() {
    let (_dir, pool) = create_test_db().await;
    seed(&pool).await;

    let items = executive_orders::latest(&pool, 2).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "EO-14028");
    assert_eq!(items[1].issuance_date, NaiveDate::from_ymd_opt(2021, 1, 20).unwrap());
    assert_eq!(executive_orders::count(&pool).await.unwrap(), 5);
}
