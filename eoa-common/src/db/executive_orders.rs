//! Executive order store operations
//!
//! Keyed get/insert/update used by reconciliation, plus the filtered,
//! sorted, paginated queries used by the read API. `created_at` and
//! `updated_at` are always set here, never by the caller.

use chrono::Utc;
use sqlx::sqlite::SqliteExecutor;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::fmt;
use std::str::FromStr;

use super::models::{CanonicalRecord, StoredRecord};
use crate::{Error, Result};

const SELECT_COLUMNS: &str = "SELECT id, title, issuance_date, issuing_authority, citation, \
     source_url, summary, created_at, updated_at FROM executive_orders";

/// Sortable columns exposed by the read API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    Title,
    President,
    #[default]
    IssuanceDate,
}

impl SortField {
    pub const VALID_NAMES: [&'static str; 4] = ["issuance_date", "id", "title", "president"];

    fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::President => "issuing_authority",
            SortField::IssuanceDate => "issuance_date",
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "issuance_date" => Ok(SortField::IssuanceDate),
            "id" => Ok(SortField::Id),
            "title" => Ok(SortField::Title),
            "president" => Ok(SortField::President),
            other => Err(Error::InvalidInput(format!(
                "Invalid sort field '{}'. Valid options are: {}",
                other,
                Self::VALID_NAMES.join(", ")
            ))),
        }
    }
}

/// Sort direction; anything other than "asc" means descending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse_lenient(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

/// Filter/sort/paginate query over the archive
#[derive(Debug, Clone)]
pub struct RecordQuery {
    pub president: Option<String>,
    pub year: Option<i32>,
    pub sort: SortField,
    pub order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            president: None,
            year: None,
            sort: SortField::default(),
            order: SortOrder::default(),
            limit: 20,
            offset: 0,
        }
    }
}

/// Reject records that would violate table invariants
pub fn validate_record(record: &CanonicalRecord) -> Result<()> {
    if record.id.trim().is_empty() {
        return Err(Error::InvalidInput("record id is empty".to_string()));
    }
    if record.title.trim().is_empty() {
        return Err(Error::InvalidInput(format!(
            "record {} has an empty title",
            record.id
        )));
    }
    Ok(())
}

/// Look up a stored record by id
pub async fn get_by_id<'e, E>(executor: E, id: &str) -> Result<Option<StoredRecord>>
where
    E: SqliteExecutor<'e>,
{
    let record = sqlx::query_as::<_, StoredRecord>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(record)
}

/// Insert a new record; both timestamps are set to now
pub async fn insert<'e, E>(executor: E, record: &CanonicalRecord) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    validate_record(record)?;
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO executive_orders (
            id, title, issuance_date, issuing_authority, citation,
            source_url, summary, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.title)
    .bind(record.issuance_date)
    .bind(&record.issuing_authority)
    .bind(&record.citation)
    .bind(&record.source_url)
    .bind(&record.summary)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(())
}

/// Overwrite every field except `id` and `created_at`; `updated_at` is refreshed
pub async fn update<'e, E>(executor: E, record: &CanonicalRecord) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    validate_record(record)?;

    let result = sqlx::query(
        r#"
        UPDATE executive_orders SET
            title = ?,
            issuance_date = ?,
            issuing_authority = ?,
            citation = ?,
            source_url = ?,
            summary = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&record.title)
    .bind(record.issuance_date)
    .bind(&record.issuing_authority)
    .bind(&record.citation)
    .bind(&record.source_url)
    .bind(&record.summary)
    .bind(Utc::now())
    .bind(&record.id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("executive order {}", record.id)));
    }

    Ok(())
}

/// Count all archived records
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM executive_orders")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, query: &'a RecordQuery) {
    let mut separator = " WHERE ";

    if let Some(president) = &query.president {
        builder
            .push(separator)
            .push("issuing_authority = ")
            .push_bind(president.as_str());
        separator = " AND ";
    }

    if let Some(year) = query.year {
        builder
            .push(separator)
            .push("strftime('%Y', issuance_date) = ")
            .push_bind(format!("{:04}", year));
    }
}

/// Run a filtered, sorted, paginated listing
///
/// Returns the requested slice and the total number of matching records.
pub async fn list(pool: &SqlitePool, query: &RecordQuery) -> Result<(Vec<StoredRecord>, i64)> {
    let mut count_builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM executive_orders");
    push_filters(&mut count_builder, query);
    let total: i64 = count_builder
        .build_query_scalar()
        .fetch_one(pool)
        .await?;

    let mut builder = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
    push_filters(&mut builder, query);
    // Secondary key keeps page boundaries stable across equal sort values
    builder.push(format!(
        " ORDER BY {} {}, id ASC LIMIT ",
        query.sort.column(),
        query.order
    ));
    builder.push_bind(query.limit);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset);

    let items = builder
        .build_query_as::<StoredRecord>()
        .fetch_all(pool)
        .await?;

    Ok((items, total))
}

/// Most recent records by issuance date
pub async fn latest(pool: &SqlitePool, limit: i64) -> Result<Vec<StoredRecord>> {
    let items = sqlx::query_as::<_, StoredRecord>(&format!(
        "{} ORDER BY issuance_date DESC, id ASC LIMIT ?",
        SELECT_COLUMNS
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(items)
}
