//! Executive order listing and lookup
//!
//! Read-only views over the archive: filtered/sorted/paginated listing,
//! single-item get, and the latest-N feed.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use eoa_common::db::executive_orders::{self, RecordQuery, SortField, SortOrder};
use eoa_common::StoredRecord;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::pagination::{
    sanitize_page, sanitize_size, Pagination, DEFAULT_LATEST_LIMIT, DEFAULT_PER_PAGE,
};
use crate::AppState;

/// Wire representation of an archived order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveOrderView {
    pub id: String,
    pub title: String,
    pub issuance_date: NaiveDate,
    pub president: String,
    pub federal_register_citation: Option<String>,
    pub url: Option<String>,
    pub plain_language_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredRecord> for ExecutiveOrderView {
    fn from(record: StoredRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            issuance_date: record.issuance_date,
            president: record.issuing_authority,
            federal_register_citation: record.citation,
            url: record.source_url,
            plain_language_summary: record.summary,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Query parameters for the list endpoint
///
/// Numeric parameters are taken as strings so that garbage falls back to
/// the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub president: Option<String>,
    pub year: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LatestQuery {
    pub limit: Option<String>,
}

/// Paginated list response
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: Vec<ExecutiveOrderView>,
    pub pagination: Pagination,
}

/// `{"success": true, "data": ...}` envelope
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

fn parse_int(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|s| s.trim().parse().ok())
}

/// GET /api/v1/executive-orders
pub async fn list_executive_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListResponse>> {
    let per_page = sanitize_size(parse_int(&query.per_page), DEFAULT_PER_PAGE);
    let page = sanitize_page(parse_int(&query.page), per_page);

    let sort = match query.sort.as_deref() {
        Some(field) => field.parse::<SortField>()?,
        None => SortField::default(),
    };
    let order = query
        .order
        .as_deref()
        .map(SortOrder::parse_lenient)
        .unwrap_or_default();

    let record_query = RecordQuery {
        president: query.president.filter(|p| !p.trim().is_empty()),
        year: parse_int(&query.year)
            .filter(|year| *year != 0)
            .and_then(|year| i32::try_from(year).ok()),
        sort,
        order,
        limit: per_page,
        offset: Pagination::offset(page, per_page),
    };

    let (records, total) = executive_orders::list(&state.db, &record_query).await?;
    let pagination = Pagination::new(page, per_page, total);

    Ok(Json(ListResponse {
        items: records.into_iter().map(ExecutiveOrderView::from).collect(),
        pagination,
    }))
}

/// GET /api/v1/executive-orders/:id
pub async fn get_executive_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse<ExecutiveOrderView>>> {
    let record = executive_orders::get_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Executive order with ID '{}' not found", id)))?;

    Ok(Json(SuccessResponse::new(record.into())))
}

/// GET /api/v1/latest-executive-orders
pub async fn latest_executive_orders(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> ApiResult<Json<SuccessResponse<Vec<ExecutiveOrderView>>>> {
    let limit = sanitize_size(parse_int(&query.limit), DEFAULT_LATEST_LIMIT);

    let records = executive_orders::latest(&state.db, limit).await?;

    Ok(Json(SuccessResponse::new(
        records.into_iter().map(ExecutiveOrderView::from).collect(),
    )))
}

/// Build executive order routes (mounted under `/api/v1`)
pub fn executive_order_routes() -> Router<AppState> {
    Router::new()
        .route("/executive-orders", get(list_executive_orders))
        .route("/executive-orders/:id", get(get_executive_order))
        .route("/latest-executive-orders", get(latest_executive_orders))
}
