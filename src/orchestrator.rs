//! # Query Orchestration Module
//!
//! ## Purpose
//! Decides, per filter or search change, whether a listing view is answered by
//! a fresh server query or a pure client-side re-filter of the last fetched
//! working set, and reconciles both paths into a single filtered-result view.
//!
//! ## Input/Output Specification
//! - **Input**: Filter-change and search-change events, catalog responses
//! - **Output**: View state (`Idle -> Loading -> Success | Failure`) and a
//!   presentation state (loading / error / empty / results)
//! - **Guarantees**: Only the response to the most recently issued request may
//!   transition state; superseded in-flight responses are discarded
//!
//! ## Resolution Policy
//! - Initial load and "reset filters" always fetch from the server
//! - Free-text search and client-only filter changes re-filter the working set
//! - Explicit "apply filters" fetches with the filter state translated into
//!   the server's query-parameter shape
//! - A failed or empty server response falls back to the previous non-empty
//!   working set and surfaces a non-fatal notice

use crate::catalog::CatalogClient;
use crate::errors::Result;
use crate::filter::{apply_filters, FilterState};
use crate::normalize::NormalizedRecord;
use crate::CategoryKind;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Listing view state machine
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading,
    Success(Vec<NormalizedRecord>),
    Failure(String),
}

/// The mutually exclusive presentation states a page renders from
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    /// A request is in flight
    Loading,
    /// The load failed and no data is available
    Error(String),
    /// Load succeeded but filters/search matched nothing
    Empty,
    /// Matched records, in working-set order
    Results(Vec<NormalizedRecord>),
}

/// Per-page query orchestrator.
///
/// Owns the working set and filter state for exactly one listing view; there
/// is no cross-page shared mutable state.
pub struct QueryOrchestrator {
    client: Arc<CatalogClient>,
    category: CategoryKind,
    /// Most recent server result, after normalization and de-duplication
    working_set: Vec<NormalizedRecord>,
    /// Last non-empty working set, the fallback for failed refreshes
    last_non_empty: Vec<NormalizedRecord>,
    filters: FilterState,
    query: String,
    state: ViewState,
    /// Non-fatal, user-visible message from a degraded refresh
    notice: Option<String>,
    /// Sequence number of the latest issued request
    generation: u64,
}

impl QueryOrchestrator {
    pub fn new(client: Arc<CatalogClient>, category: CategoryKind) -> Self {
        Self {
            client,
            category,
            working_set: Vec::new(),
            last_non_empty: Vec::new(),
            filters: FilterState::new(),
            query: String::new(),
            state: ViewState::Idle,
            notice: None,
            generation: 0,
        }
    }

    /// Initial page load: always a server fetch of the full collection
    pub async fn initial_load(&mut self) -> Result<()> {
        let token = self.begin();
        let outcome = self.client.fetch_and_normalize(self.category, &[]).await;
        self.complete(token, outcome);
        Ok(())
    }

    /// Reset filters: clears all state and refetches from the server
    pub async fn reset_filters(&mut self) -> Result<()> {
        self.filters.clear();
        self.query.clear();
        self.initial_load().await
    }

    /// Explicit "apply filters" action: server fetch with translated params
    pub async fn apply_server_filters(&mut self, filters: FilterState) -> Result<()> {
        self.filters = filters;
        let token = self.begin();
        let outcome = self
            .client
            .search_with_filters(self.category, &self.filters)
            .await;
        self.complete(token, outcome);
        Ok(())
    }

    /// Free-text search change: pure client-side re-filter of the working set
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    /// Client-only filter change: re-filter without a server round trip
    pub fn set_client_filters(&mut self, filters: FilterState) {
        self.filters = filters;
        self.refilter();
    }

    /// Issue a new request token; any in-flight request becomes stale.
    ///
    /// `Loading` is re-entrant: beginning a request while another is pending
    /// simply supersedes it.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state = ViewState::Loading;
        debug!(generation = self.generation, category = %self.category, "request issued");
        self.generation
    }

    /// Apply a request outcome if and only if `token` is still the latest.
    ///
    /// Returns `false` when the response was stale and discarded; visible
    /// state is untouched in that case.
    pub fn complete(&mut self, token: u64, outcome: Result<Vec<NormalizedRecord>>) -> bool {
        if token != self.generation {
            debug!(token, latest = self.generation, "stale response discarded");
            return false;
        }

        match outcome {
            Ok(records) if !records.is_empty() => {
                info!(category = %self.category, count = records.len(), "working set refreshed");
                self.working_set = records.clone();
                self.last_non_empty = records;
                self.notice = None;
                self.refilter();
            }
            // A successful fetch with zero records is a legitimate empty
            // collection on first load; only a refresh falls back
            Ok(_) if self.last_non_empty.is_empty() => {
                info!(category = %self.category, "working set refreshed empty");
                self.working_set = Vec::new();
                self.notice = None;
                self.refilter();
            }
            Ok(_) => self.degrade("No matching institutions were returned".to_string()),
            Err(e) => {
                warn!(category = %self.category, error = %e, "server fetch failed");
                self.degrade(format!("Failed to load listings: {}", e));
            }
        }

        true
    }

    /// Fall back to the previous non-empty working set where one exists,
    /// otherwise surface the failure as the terminal view state. Not used
    /// for a successful empty first load, which is the empty state.
    fn degrade(&mut self, message: String) {
        if self.last_non_empty.is_empty() {
            self.state = ViewState::Failure(message);
        } else {
            self.working_set = self.last_non_empty.clone();
            self.notice = Some(message);
            self.refilter();
        }
    }

    /// Recompute the visible result set from the working set, the filter
    /// state and the debounce-gated query
    fn refilter(&mut self) {
        let matched = apply_filters(&self.working_set, &self.filters, &self.query);
        self.state = ViewState::Success(matched);
    }

    /// Current view state
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Non-fatal notice from a degraded refresh, if any
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Which of the mutually exclusive presentation states applies now
    pub fn presentation(&self) -> Presentation {
        match &self.state {
            ViewState::Idle | ViewState::Loading => Presentation::Loading,
            ViewState::Failure(message) => Presentation::Error(message.clone()),
            ViewState::Success(records) if records.is_empty() => Presentation::Empty,
            ViewState::Success(records) => Presentation::Results(records.clone()),
        }
    }
}
