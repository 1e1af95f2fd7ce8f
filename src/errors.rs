//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the directory engine, providing structured
//! error types and conversion utilities for all system components.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from catalog access, normalization, filtering
//! - **Output**: Structured error types with context and error chains
//! - **Error Categories**: Catalog, Configuration, Search, API
//!
//! ## Key Features
//! - Hierarchical error types with detailed context
//! - Recovery classification for retry decisions
//! - Structured logging integration
//!
//! ## Usage
//! ```rust,ignore
//! use crate::errors::{Result, DirectoryError};
//!
//! fn fetch_operation() -> Result<Vec<String>> {
//!     Err(DirectoryError::CatalogUnavailable {
//!         category: "schools".to_string(),
//!         details: "connection refused".to_string(),
//!     })
//! }
//! ```

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Error types for the directory engine
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Network-related errors
    #[error("Network error: {details}")]
    NetworkError { details: String },

    /// Catalog endpoint unavailable or returning non-success status
    #[error("Catalog endpoint for '{category}' is unavailable: {details}")]
    CatalogUnavailable { category: String, details: String },

    /// Catalog response could not be decoded
    #[error("Failed to parse catalog response for '{category}': {details}")]
    ResponseParsing { category: String, details: String },

    /// Catalog answered with `success: false`
    #[error("Catalog rejected request for '{category}'")]
    CatalogRejected { category: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Search query rejected before execution
    #[error("Invalid search query: {query} - {reason}")]
    InvalidSearchQuery { query: String, reason: String },

    /// Unknown category name on the CLI or API surface
    #[error("Unknown category: {name}")]
    UnknownCategory { name: String },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DirectoryError {
    /// Check if the error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DirectoryError::NetworkError { .. } | DirectoryError::CatalogUnavailable { .. }
        )
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            DirectoryError::NetworkError { .. }
            | DirectoryError::CatalogUnavailable { .. }
            | DirectoryError::ResponseParsing { .. }
            | DirectoryError::CatalogRejected { .. } => "catalog",
            DirectoryError::Config { .. } => "configuration",
            DirectoryError::InvalidSearchQuery { .. } => "search",
            DirectoryError::UnknownCategory { .. } => "api",
            DirectoryError::Internal { .. } | DirectoryError::ValidationFailed { .. } => "generic",
        }
    }
}
