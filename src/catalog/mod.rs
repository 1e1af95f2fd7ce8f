//! # Catalog Access Module
//!
//! ## Purpose
//! Handles all communication with the remote catalog service: category
//! collection fetches, server-side search, retry handling and health checks.
//! Everything downstream of this module sees clean `Vec<RawRecord>` input
//! regardless of the wire shape the catalog chose for a given payload.
//!
//! ## Input/Output Specification
//! - **Input**: Category endpoints, query parameters, filter state
//! - **Output**: Raw record collections, normalized working sets, fetch statistics
//! - **Endpoints**: `GET /{category}`, `GET /{category}/search?<criteria>`
//!
//! ## Key Features
//! - Single boundary step coercing array-or-map payloads to record arrays
//! - Retry with fixed backoff for recoverable failures
//! - Concurrent multi-category loading with per-category degradation
//! - Filter-state translation into the server's query-parameter shape

pub mod client;
pub mod response;

pub use client::{CatalogClient, FacetLoad};
pub use response::CatalogResponse;

use crate::errors::Result;
use crate::filter::{Criterion, FilterField, FilterState};
use crate::{CategoryKind, RawRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Abstraction over the catalog service, the seam for test doubles
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the full collection for one category
    async fn fetch_all(&self, category: CategoryKind) -> Result<Vec<RawRecord>>;

    /// Fetch a server-side filtered collection for one category
    async fn search(
        &self,
        category: CategoryKind,
        params: &[(String, String)],
    ) -> Result<Vec<RawRecord>>;

    /// Check catalog reachability
    async fn health_check(&self) -> Result<SourceHealth>;
}

/// Health snapshot for the catalog service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceHealth {
    pub is_healthy: bool,
    pub last_check: DateTime<Utc>,
    pub response_time_ms: u64,
    pub error_message: Option<String>,
}

/// Per-category fetch statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchStats {
    /// Raw records received from the catalog
    pub fetched: usize,
    /// Records surviving normalization and de-duplication
    pub normalized: usize,
    /// Duplicate records dropped
    pub duplicates_dropped: usize,
    /// Fetch errors observed for this category
    pub fetch_errors: usize,
    /// Last successful fetch
    pub last_update: Option<DateTime<Utc>>,
}

/// Translate a filter state into the catalog's query-parameter shape:
/// multi-select sets become comma-joined strings, ranges a single numeric
/// ceiling, single selects their plain value. Empty criteria are omitted.
pub fn translate_filters(filters: &FilterState) -> Vec<(String, String)> {
    let mut params = Vec::new();

    for (field, criterion) in filters.criteria() {
        let key = match field {
            FilterField::Fee => "maxFee",
            FilterField::Rating => "maxRating",
            FilterField::City => "city",
            FilterField::CategoryType => "type",
            FilterField::Name => "name",
            FilterField::Tags => "courses",
        };

        match criterion {
            Criterion::Range { max, .. } => {
                params.push((key.to_string(), format_number(*max)));
            }
            Criterion::MultiSelect { values, .. } => {
                if !values.is_empty() {
                    params.push((key.to_string(), values.join(",")));
                }
            }
            Criterion::Select(selection) => {
                if let Some(selected) = selection.as_deref().map(str::trim) {
                    if !selected.is_empty() {
                        params.push((key.to_string(), selected.to_string()));
                    }
                }
            }
        }
    }

    params
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
