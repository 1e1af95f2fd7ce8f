//! # Search Matcher Module
//!
//! ## Purpose
//! Case-insensitive substring search over record text fields, plus the
//! debounce primitive that gates how often typed queries trigger
//! re-evaluation. The debounce is a timing contract only; correctness comes
//! from the generation token that discards superseded submissions.
//!
//! ## Input/Output Specification
//! - **Input**: Normalized records, free-text query, target fields
//! - **Output**: Records where at least one field contains the query
//! - **Guarantees**: Empty/whitespace queries pass input through unchanged;
//!   stale submissions never overwrite results of newer ones
//!
//! ## Key Features
//! - Multi-field substring matching
//! - Debounced scheduling with cancel-on-new-input semantics
//! - Last-write-wins by recency, not completion order

use crate::config::SearchConfig;
use crate::errors::{DirectoryError, Result};
use crate::normalize::NormalizedRecord;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Text fields the matcher can search over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    City,
    CategoryType,
    Tags,
}

/// Validate a query against the configured length bounds before execution.
///
/// An empty or whitespace-only query is always valid: it means match-all,
/// not a search.
pub fn validate_query(query: &str, config: &SearchConfig) -> Result<()> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    if trimmed.len() < config.min_query_length {
        return Err(DirectoryError::InvalidSearchQuery {
            query: query.to_string(),
            reason: format!("Query too short: minimum {} characters", config.min_query_length),
        });
    }

    if trimmed.len() > config.max_query_length {
        return Err(DirectoryError::InvalidSearchQuery {
            query: query.to_string(),
            reason: format!("Query too long: maximum {} characters", config.max_query_length),
        });
    }

    Ok(())
}

/// Filter records to those where at least one of `fields` contains `query`
/// as a case-insensitive substring. Empty or whitespace-only queries return
/// the input unchanged.
pub fn search_records(
    records: Vec<NormalizedRecord>,
    query: &str,
    fields: &[SearchField],
) -> Vec<NormalizedRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records;
    }

    records
        .into_iter()
        .filter(|record| field_matches(record, &needle, fields))
        .collect()
}

fn field_matches(record: &NormalizedRecord, needle: &str, fields: &[SearchField]) -> bool {
    fields.iter().any(|field| match field {
        SearchField::Name => record.name.to_lowercase().contains(needle),
        SearchField::City => record.city.to_lowercase().contains(needle),
        SearchField::CategoryType => record.category_type.to_lowercase().contains(needle),
        SearchField::Tags => record
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle)),
    })
}

/// Debounced scheduler for query evaluation.
///
/// Each `submit` supersedes every earlier one: a pending evaluation whose
/// quiet interval has not elapsed is abandoned, and an evaluation that
/// completes after a newer submission was issued has its result discarded.
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet interval
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Debouncer using the conventional 500 ms typing pause
    pub fn default_interval() -> Self {
        Self::new(Duration::from_millis(500))
    }

    /// Debouncer using the configured quiet interval
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(Duration::from_millis(config.debounce_ms))
    }

    /// Schedule `action(query)` after the quiet interval.
    ///
    /// Resolves to `Some(output)` only if this submission is still the most
    /// recent both when the interval elapses and when the action completes;
    /// superseded submissions resolve to `None`.
    pub fn submit<T, F, Fut>(&self, query: String, action: F) -> JoinHandle<Option<T>>
    where
        T: Send + 'static,
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if latest.load(Ordering::SeqCst) != token {
                debug!(token, "debounced query superseded before evaluation");
                return None;
            }

            let output = action(query).await;

            // A newer submission may have been issued while the action ran
            if latest.load(Ordering::SeqCst) != token {
                debug!(token, "query result discarded, newer submission issued");
                return None;
            }

            Some(output)
        })
    }
}
