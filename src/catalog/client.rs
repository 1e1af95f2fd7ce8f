//! # Catalog HTTP Client
//!
//! ## Purpose
//! Concrete `CatalogSource` backed by `reqwest`. Wraps every fetch in the
//! boundary coercion from `response`, retries recoverable failures with a
//! fixed backoff, and records per-category fetch statistics.
//!
//! ## Input/Output Specification
//! - **Input**: Catalog configuration, category, optional query parameters
//! - **Output**: Raw or normalized record collections, facet maps, health snapshots
//! - **Concurrency**: Facet loading issues all category fetches concurrently;
//!   one category's failure degrades only its own facet section

use super::response::CatalogResponse;
use super::{CatalogSource, FetchStats, SourceHealth};
use crate::config::Config;
use crate::dedupe::dedupe;
use crate::errors::{DirectoryError, Result};
use crate::facets::{build_facets, FacetMap};
use crate::filter::FilterState;
use crate::normalize::{NormalizedRecord, Normalizer, RatingPolicy};
use crate::{CategoryKind, RawRecord};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// HTTP client for the catalog service
pub struct CatalogClient {
    client: Client,
    base_url: String,
    retry_attempts: u32,
    retry_delay: Duration,
    normalizer: Normalizer,
    stats: Arc<RwLock<HashMap<CategoryKind, FetchStats>>>,
}

/// Result of the concurrent multi-category facet load
#[derive(Debug, Clone)]
pub struct FacetLoad {
    /// Facet hierarchy over every category that loaded
    pub facets: FacetMap,
    /// Categories whose fetch failed; their facet sections degrade to a
    /// "browse all" fallback in the presentation layer
    pub failed: Vec<CategoryKind>,
}

impl CatalogClient {
    /// Create a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_rating_policy(config, RatingPolicy::default())
    }

    /// Create a client with an explicit rating fallback policy
    pub fn with_rating_policy(config: &Config, policy: RatingPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.catalog.timeout_seconds))
            .user_agent("edu-directory-engine/0.1")
            .build()
            .map_err(|e| DirectoryError::NetworkError {
                details: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.catalog.base_url.trim_end_matches('/').to_string(),
            retry_attempts: config.catalog.retry_attempts,
            retry_delay: Duration::from_millis(config.catalog.retry_delay_ms),
            normalizer: Normalizer::with_rating_policy(policy),
            stats: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Fetch, coerce, normalize and de-duplicate one category.
    ///
    /// With empty `params` this hits the full-collection endpoint; otherwise
    /// the server-side search endpoint.
    pub async fn fetch_and_normalize(
        &self,
        category: CategoryKind,
        params: &[(String, String)],
    ) -> Result<Vec<NormalizedRecord>> {
        let raw = if params.is_empty() {
            self.fetch_all(category).await
        } else {
            self.search(category, params).await
        };

        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                self.stats.write().await.entry(category).or_default().fetch_errors += 1;
                return Err(e);
            }
        };

        let fetched = raw.len();
        let normalized = self.normalizer.normalize_all(&raw, category);
        let deduped = dedupe(normalized);

        let mut stats = self.stats.write().await;
        let entry = stats.entry(category).or_default();
        entry.fetched = fetched;
        entry.normalized = deduped.len();
        entry.duplicates_dropped = fetched - deduped.len();
        entry.last_update = Some(Utc::now());

        debug!(
            %category,
            fetched,
            kept = deduped.len(),
            "catalog fetch normalized"
        );

        Ok(deduped)
    }

    /// Fetch a server-side filtered working set from the current filter state
    pub async fn search_with_filters(
        &self,
        category: CategoryKind,
        filters: &FilterState,
    ) -> Result<Vec<NormalizedRecord>> {
        let params = super::translate_filters(filters);
        self.fetch_and_normalize(category, &params).await
    }

    /// Load facets across all categories concurrently.
    ///
    /// Categories are fetched independently; a failing category is reported
    /// in `failed` and excluded from the facet map instead of blocking the
    /// others.
    pub async fn load_facets(&self) -> FacetLoad {
        let fetches = CategoryKind::ALL.into_iter().map(|category| async move {
            (category, self.fetch_and_normalize(category, &[]).await)
        });

        let mut all_records = Vec::new();
        let mut failed = Vec::new();

        for (category, outcome) in futures::future::join_all(fetches).await {
            match outcome {
                Ok(records) => all_records.extend(records),
                Err(e) => {
                    warn!(%category, error = %e, "facet fetch failed, degrading section");
                    failed.push(category);
                }
            }
        }

        info!(
            records = all_records.len(),
            failed = failed.len(),
            "facet load complete"
        );

        FacetLoad {
            facets: build_facets(&all_records),
            failed,
        }
    }

    /// Snapshot of the fetch statistics for one category
    pub async fn stats(&self, category: CategoryKind) -> FetchStats {
        self.stats
            .read()
            .await
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    async fn request(
        &self,
        category: CategoryKind,
        search: bool,
        params: &[(String, String)],
    ) -> Result<Vec<RawRecord>> {
        let url = if search {
            format!("{}/{}/search", self.base_url, category.endpoint())
        } else {
            format!("{}/{}", self.base_url, category.endpoint())
        };

        let mut attempt = 0;
        loop {
            match self.request_once(category, &url, params).await {
                Ok(records) => return Ok(records),
                Err(e) if e.is_recoverable() && attempt < self.retry_attempts => {
                    attempt += 1;
                    warn!(
                        %category,
                        attempt,
                        error = %e,
                        "catalog request failed, retrying"
                    );
                    sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request_once(
        &self,
        category: CategoryKind,
        url: &str,
        params: &[(String, String)],
    ) -> Result<Vec<RawRecord>> {
        debug!(%category, url, "fetching catalog endpoint");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| DirectoryError::NetworkError {
                details: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DirectoryError::CatalogUnavailable {
                category: category.to_string(),
                details: format!("HTTP {}", response.status()),
            });
        }

        let envelope: CatalogResponse =
            response
                .json()
                .await
                .map_err(|e| DirectoryError::ResponseParsing {
                    category: category.to_string(),
                    details: e.to_string(),
                })?;

        if !envelope.success {
            return Err(DirectoryError::CatalogRejected {
                category: category.to_string(),
            });
        }

        Ok(envelope.into_records())
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_all(&self, category: CategoryKind) -> Result<Vec<RawRecord>> {
        self.request(category, false, &[]).await
    }

    async fn search(
        &self,
        category: CategoryKind,
        params: &[(String, String)],
    ) -> Result<Vec<RawRecord>> {
        self.request(category, true, params).await
    }

    async fn health_check(&self) -> Result<SourceHealth> {
        let start = Instant::now();
        let response = self.client.get(&self.base_url).send().await;
        let response_time_ms = start.elapsed().as_millis() as u64;

        match response {
            Ok(resp) if resp.status().is_success() => Ok(SourceHealth {
                is_healthy: true,
                last_check: Utc::now(),
                response_time_ms,
                error_message: None,
            }),
            Ok(resp) => Ok(SourceHealth {
                is_healthy: false,
                last_check: Utc::now(),
                response_time_ms,
                error_message: Some(format!("HTTP {}", resp.status())),
            }),
            Err(e) => Ok(SourceHealth {
                is_healthy: false,
                last_check: Utc::now(),
                response_time_ms,
                error_message: Some(e.to_string()),
            }),
        }
    }
}
