//! Federal Register API client
//!
//! Owns every outbound call to the documents endpoint and the retry policy
//! around it:
//!
//! - **429**: sleep for `Retry-After` seconds (default 60) and re-issue the
//!   same request. Does not consume the retry budget.
//! - **5xx / network failure / body read failure**: exponential backoff with jitter,
//!   `base_delay * 2^attempt + random(0, max_jitter)`, up to `max_retries`.
//! - **Other 4xx / exhausted budget**: [`FRError`] carrying status and body.

use async_trait::async_trait;
use eoa_common::config::SourceConfig;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{PageResult, SourceDocument, SourceFilters};

pub const FEDERAL_REGISTER_BASE_URL: &str = "https://www.federalregister.gov/api/v1/";
pub const USER_AGENT: &str = "ExecutiveOrdersArchive/1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
const DOCUMENTS_ENDPOINT: &str = "documents";

/// Fields the normalizer reads; the API omits most of them unless asked
const DOCUMENT_FIELDS: [&str; 9] = [
    "executive_order_number",
    "executive_order_notes",
    "document_number",
    "title",
    "signing_date",
    "publication_date",
    "president",
    "citation",
    "html_url",
];

/// Federal Register client errors
#[derive(Debug, Error)]
pub enum FRError {
    /// Non-retryable status, or a 5xx that outlived the retry budget
    #[error("Federal Register API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Request failed after {retries} retries: {message}")]
    Network { retries: u32, message: String },

    #[error("Client build error: {0}")]
    Build(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl FRError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FRError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Backoff and rate-limit policy of the client
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed for 5xx and network failures
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Jitter is drawn uniformly from `[0, max_jitter)`
    pub max_jitter: Duration,
    /// Wait used for a 429 without a usable Retry-After
    pub default_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
            default_retry_after: Duration::from_secs(DEFAULT_RETRY_AFTER_SECS),
        }
    }
}

impl RetryPolicy {
    /// `base_delay * 2^attempt + random(0, max_jitter)`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponential = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let jitter = if self.max_jitter.is_zero() {
            Duration::ZERO
        } else {
            self.max_jitter.mul_f64(rand::thread_rng().gen_range(0.0..1.0))
        };
        exponential + jitter
    }

    /// Wait requested by a 429 response
    fn retry_after(&self, headers: &HeaderMap) -> Duration {
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.default_retry_after)
    }
}

/// Client construction settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: FEDERAL_REGISTER_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&SourceConfig> for ClientConfig {
    fn from(config: &SourceConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                base_delay: Duration::from_millis(config.retry_base_delay_ms),
                max_jitter: Duration::from_millis(config.max_jitter_ms),
                default_retry_after: Duration::from_secs(config.default_retry_after_secs),
            },
        }
    }
}

/// Paginated source of executive order documents
///
/// The orchestrator only sees this seam, so runs can be driven by the real
/// API client or by a scripted source.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_page(
        &self,
        filters: &SourceFilters,
        page: u32,
        page_size: u32,
    ) -> Result<PageResult, FRError>;
}

/// Federal Register API client
pub struct FederalRegisterClient {
    http_client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl FederalRegisterClient {
    pub fn new(config: ClientConfig) -> Result<Self, FRError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FRError::Build(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url,
            retry: config.retry,
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// GET with the retry policy applied; `None` for an empty success body
    async fn request(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Option<Value>, FRError> {
        let url = self.endpoint_url(endpoint);
        let max_retries = self.retry.max_retries;
        let mut attempt: u32 = 0;

        loop {
            tracing::info!(url = %url, attempt = attempt + 1, "Requesting Federal Register API");

            let response = match self.http_client.get(&url).query(params).send().await {
                Ok(response) => response,
                Err(e) => {
                    if attempt < max_retries {
                        let backoff = self.retry.backoff_delay(attempt);
                        tracing::warn!(
                            error = %e,
                            backoff_ms = backoff.as_millis() as u64,
                            "Request failed, retrying after backoff"
                        );
                        tokio::time::sleep(backoff).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(FRError::Network {
                        retries: max_retries,
                        message: e.to_string(),
                    });
                }
            };

            let status = response.status();
            tracing::debug!(status = status.as_u16(), "Received response");

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = self.retry.retry_after(response.headers());
                tracing::warn!(wait_secs = wait.as_secs(), "Rate limited, retrying same request");
                tokio::time::sleep(wait).await;
                continue;
            }

            if status.is_server_error() && attempt < max_retries {
                let backoff = self.retry.backoff_delay(attempt);
                tracing::warn!(
                    status = status.as_u16(),
                    backoff_ms = backoff.as_millis() as u64,
                    "Server error, retrying after backoff"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
                continue;
            }

            if status.is_success() {
                let bytes = match response.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        if attempt < max_retries {
                            let backoff = self.retry.backoff_delay(attempt);
                            tracing::warn!(
                                error = %e,
                                backoff_ms = backoff.as_millis() as u64,
                                "Reading response body failed, retrying after backoff"
                            );
                            tokio::time::sleep(backoff).await;
                            attempt += 1;
                            continue;
                        }
                        return Err(FRError::Network {
                            retries: max_retries,
                            message: e.to_string(),
                        });
                    }
                };
                if bytes.is_empty() {
                    return Ok(None);
                }
                return serde_json::from_slice(&bytes)
                    .map(Some)
                    .map_err(|e| FRError::Parse(e.to_string()));
            }

            let body = response.text().await.unwrap_or_default();
            return Err(FRError::Api {
                status: status.as_u16(),
                body,
            });
        }
    }

    fn base_params() -> Vec<(String, String)> {
        let mut params = vec![(
            "conditions[presidential_document_type][]".to_string(),
            "executive_order".to_string(),
        )];
        params.extend(
            DOCUMENT_FIELDS
                .iter()
                .map(|field| ("fields[]".to_string(), field.to_string())),
        );
        params
    }

    fn decode_page(value: Option<Value>) -> Result<PageResult, FRError> {
        match value {
            Some(value) => {
                serde_json::from_value(value).map_err(|e| FRError::Parse(e.to_string()))
            }
            None => Ok(PageResult::default()),
        }
    }

    /// Fetch one page of executive orders, newest first
    pub async fn get_executive_orders(
        &self,
        filters: &SourceFilters,
        page: u32,
        per_page: u32,
    ) -> Result<PageResult, FRError> {
        let mut params = Self::base_params();
        params.push(("page".to_string(), page.to_string()));
        params.push(("per_page".to_string(), per_page.to_string()));
        params.push(("order".to_string(), "newest".to_string()));

        if let Some(president) = &filters.president {
            params.push(("conditions[president][]".to_string(), president.clone()));
        }
        if let Some(year) = filters.year {
            params.push(("conditions[publication_date][year]".to_string(), year.to_string()));
        }
        if let Some(start) = filters.start_date {
            params.push((
                "conditions[publication_date][gte]".to_string(),
                start.format("%Y-%m-%d").to_string(),
            ));
        }
        if let Some(end) = filters.end_date {
            params.push((
                "conditions[publication_date][lte]".to_string(),
                end.format("%Y-%m-%d").to_string(),
            ));
        }

        let page_result = Self::decode_page(self.request(DOCUMENTS_ENDPOINT, &params).await?)?;

        tracing::info!(
            page,
            total_pages = ?page_result.total_pages,
            documents = page_result.results.len(),
            "Retrieved executive orders page"
        );

        Ok(page_result)
    }

    /// Fetch a single executive order by its number, e.g. "13985"
    pub async fn get_executive_order_by_number(
        &self,
        number: &str,
    ) -> Result<Option<SourceDocument>, FRError> {
        let mut params = Self::base_params();
        params.push((
            "conditions[executive_order_number]".to_string(),
            number.to_string(),
        ));

        let page = Self::decode_page(self.request(DOCUMENTS_ENDPOINT, &params).await?)?;

        if page.count.unwrap_or(0) == 0 {
            return Ok(None);
        }

        page.results
            .into_iter()
            .next()
            .map(|raw| serde_json::from_value(raw).map_err(|e| FRError::Parse(e.to_string())))
            .transpose()
    }

    /// Full-text search over executive orders, by relevance
    pub async fn search_executive_orders(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PageResult, FRError> {
        let mut params = Self::base_params();
        params.push(("page".to_string(), page.to_string()));
        params.push(("per_page".to_string(), per_page.to_string()));
        params.push(("order".to_string(), "relevance".to_string()));
        params.push(("conditions[term]".to_string(), query.to_string()));

        Self::decode_page(self.request(DOCUMENTS_ENDPOINT, &params).await?)
    }
}

#[async_trait]
impl DocumentSource for FederalRegisterClient {
    async fn fetch_page(
        &self,
        filters: &SourceFilters,
        page: u32,
        page_size: u32,
    ) -> Result<PageResult, FRError> {
        self.get_executive_orders(filters, page, page_size).await
    }
}
