//! # Educational-Institution Directory Engine
//!
//! ## Overview
//! This library implements the data pipeline behind a directory/listing
//! application for educational institutions: schools, colleges, pre-university
//! colleges, coaching centers and independent teachers. It fetches
//! heterogeneous records from a remote catalog service, normalizes them into a
//! canonical shape, and answers faceted, filtered and free-text queries.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `catalog`: HTTP client for the remote catalog service with retry and health checks
//! - `normalize`: Field normalization from loosely-typed records to a canonical shape
//! - `dedupe`: Identity-keyed de-duplication preserving first-seen order
//! - `facets`: Two-level facet hierarchy (institution type -> cities) for navigation
//! - `filter`: Predicate engine evaluating structured filter state against records
//! - `search`: Debounced, case-insensitive substring search over text fields
//! - `orchestrator`: Server-vs-client query resolution and view state machine
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Catalog JSON payloads (array or id-keyed map), filter state, search queries
//! - **Output**: Normalized, de-duplicated, filtered record collections and facet maps
//! - **Guarantees**: Deterministic normalization, stale-response discard, sentinel fallbacks
//!
//! ## Usage
//! ```rust,no_run
//! use edu_directory_engine::{CatalogClient, CategoryKind, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let client = CatalogClient::new(&config)?;
//!     let records = client.fetch_and_normalize(CategoryKind::School, &[]).await?;
//!     println!("Fetched {} schools", records.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod catalog;
pub mod config;
pub mod dedupe;
pub mod errors;
pub mod facets;
pub mod filter;
pub mod normalize;
pub mod orchestrator;
pub mod search;

// Re-exports for convenience
pub use catalog::CatalogClient;
pub use config::Config;
pub use errors::{DirectoryError, Result};
pub use facets::{build_facets, FacetMap};
pub use filter::{apply_filters, FilterState};
pub use normalize::{NormalizedRecord, Normalizer, RatingPolicy};
pub use orchestrator::{Presentation, QueryOrchestrator, ViewState};

use serde::{Deserialize, Serialize};

/// Loosely-typed record as received from the catalog service.
///
/// Field names differ by category and sometimes by record; all access goes
/// through the normalizer's candidate-field lists.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Sentinel city for records whose city cannot be resolved
pub const UNKNOWN_CITY: &str = "Unknown";

/// Sentinel type for records whose institution type cannot be resolved
pub const OTHER_TYPE: &str = "Other";

/// Institution categories served by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    School,
    College,
    PuCollege,
    Coaching,
    Teacher,
}

impl CategoryKind {
    /// All categories, in navigation order
    pub const ALL: [CategoryKind; 5] = [
        CategoryKind::School,
        CategoryKind::College,
        CategoryKind::PuCollege,
        CategoryKind::Coaching,
        CategoryKind::Teacher,
    ];

    /// Path segment used by the catalog service for this category
    pub fn endpoint(&self) -> &'static str {
        match self {
            CategoryKind::School => "schools",
            CategoryKind::College => "colleges",
            CategoryKind::PuCollege => "pu-colleges",
            CategoryKind::Coaching => "coaching",
            CategoryKind::Teacher => "teachers",
        }
    }

    /// Parse a category from its endpoint name
    pub fn from_endpoint(name: &str) -> Result<Self> {
        match name {
            "schools" => Ok(CategoryKind::School),
            "colleges" => Ok(CategoryKind::College),
            "pu-colleges" => Ok(CategoryKind::PuCollege),
            "coaching" => Ok(CategoryKind::Coaching),
            "teachers" => Ok(CategoryKind::Teacher),
            other => Err(DirectoryError::UnknownCategory {
                name: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_round_trip() {
        for category in CategoryKind::ALL {
            assert_eq!(
                CategoryKind::from_endpoint(category.endpoint()).unwrap(),
                category
            );
        }
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        assert!(matches!(
            CategoryKind::from_endpoint("universities"),
            Err(DirectoryError::UnknownCategory { .. })
        ));
    }
}
