//! Scripted document source
//!
//! In-process `DocumentSource` that serves canned pages, injects failures
//! on chosen pages or years, and records every request.

use async_trait::async_trait;
use eoa_ingest::models::{PageResult, SourceFilters};
use eoa_ingest::services::{DocumentSource, FRError};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedSource {
    pages: HashMap<u32, PageResult>,
    year_documents: HashMap<i32, Vec<Value>>,
    failing_years: HashSet<i32>,
    /// page -> remaining failures
    page_failures: Mutex<HashMap<u32, u32>>,
    calls: Mutex<Vec<(SourceFilters, u32, u32)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `documents` for `page`, reporting `total_pages`
    pub fn with_page(mut self, page: u32, total_pages: u32, documents: Vec<Value>) -> Self {
        self.pages.insert(
            page,
            PageResult {
                count: Some(documents.len() as u64),
                total_pages: Some(total_pages),
                results: documents,
            },
        );
        self
    }

    /// Serve `documents` as the single page of a year-filtered request
    pub fn with_year(mut self, year: i32, documents: Vec<Value>) -> Self {
        self.year_documents.insert(year, documents);
        self
    }

    /// Fail every request for `year` with a 500
    pub fn fail_year(mut self, year: i32) -> Self {
        self.failing_years.insert(year);
        self
    }

    /// Fail the next `times` requests for `page` with a 500
    pub fn fail_page(self, page: u32, times: u32) -> Self {
        self.page_failures.lock().unwrap().insert(page, times);
        self
    }

    pub fn calls(&self) -> Vec<(SourceFilters, u32, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.calls().into_iter().map(|(_, page, _)| page).collect()
    }

    fn server_error(message: &str) -> FRError {
        FRError::Api {
            status: 500,
            body: message.to_string(),
        }
    }
}

#[async_trait]
impl DocumentSource for ScriptedSource {
    async fn fetch_page(
        &self,
        filters: &SourceFilters,
        page: u32,
        page_size: u32,
    ) -> Result<PageResult, FRError> {
        self.calls
            .lock()
            .unwrap()
            .push((filters.clone(), page, page_size));

        if let Some(year) = filters.year {
            if self.failing_years.contains(&year) {
                return Err(Self::server_error("year unavailable"));
            }
            let documents = match page {
                1 => self.year_documents.get(&year).cloned().unwrap_or_default(),
                _ => Vec::new(),
            };
            return Ok(PageResult {
                count: Some(documents.len() as u64),
                total_pages: Some(1),
                results: documents,
            });
        }

        {
            let mut failures = self.page_failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&page) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(Self::server_error("scripted failure"));
                }
            }
        }

        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}
