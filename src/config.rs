//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration management for the directory engine, supporting
//! TOML files and environment variables with validation and type-safe access
//! to all system settings.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation, dependency verification
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration files
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,ignore
//! use crate::config::Config;
//!
//! // Load from default locations
//! let config = Config::load()?;
//!
//! // Access configuration
//! println!("Catalog URL: {}", config.catalog.base_url);
//! ```

use crate::errors::{DirectoryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog service access
    pub catalog: CatalogConfig,
    /// Search behavior
    pub search: SearchConfig,
    /// Filter defaults
    pub filters: FilterConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Catalog service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog service
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Retry attempts for recoverable fetch failures
    pub retry_attempts: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

/// Search behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Debounce interval before a typed query is applied (ms)
    pub debounce_ms: u64,
    /// Minimum query length
    pub min_query_length: usize,
    /// Maximum query length
    pub max_query_length: usize,
}

/// Filter defaults configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Default fee range ceiling (currency units per year)
    pub max_fee: f64,
    /// Lower bound of the rating scale
    pub min_rating: f64,
    /// Upper bound of the rating scale
    pub max_rating: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| DirectoryError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| DirectoryError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(base_url) = std::env::var("EDU_DIRECTORY_CATALOG_URL") {
            self.catalog.base_url = base_url;
        }
        if let Ok(timeout) = std::env::var("EDU_DIRECTORY_TIMEOUT_SECONDS") {
            self.catalog.timeout_seconds =
                timeout.parse().map_err(|_| DirectoryError::Config {
                    message: "Invalid value in EDU_DIRECTORY_TIMEOUT_SECONDS".to_string(),
                })?;
        }
        if let Ok(level) = std::env::var("EDU_DIRECTORY_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.catalog.base_url.is_empty() {
            return Err(DirectoryError::ValidationFailed {
                field: "catalog.base_url".to_string(),
                reason: "Catalog base URL cannot be empty".to_string(),
            });
        }

        if self.catalog.timeout_seconds == 0 {
            return Err(DirectoryError::ValidationFailed {
                field: "catalog.timeout_seconds".to_string(),
                reason: "Timeout must be greater than zero".to_string(),
            });
        }

        if self.search.min_query_length > self.search.max_query_length {
            return Err(DirectoryError::ValidationFailed {
                field: "search.min_query_length".to_string(),
                reason: "Minimum query length cannot be greater than maximum".to_string(),
            });
        }

        if self.filters.min_rating >= self.filters.max_rating {
            return Err(DirectoryError::ValidationFailed {
                field: "filters.min_rating".to_string(),
                reason: "Rating lower bound must be below the upper bound".to_string(),
            });
        }

        if self.filters.max_fee <= 0.0 {
            return Err(DirectoryError::ValidationFailed {
                field: "filters.max_fee".to_string(),
                reason: "Fee ceiling must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Get configuration as TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DirectoryError::Config {
            message: format!("Failed to serialize config to TOML: {}", e),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                base_url: "http://localhost:4000/api".to_string(),
                timeout_seconds: 30,
                retry_attempts: 3,
                retry_delay_ms: 500,
            },
            search: SearchConfig {
                debounce_ms: 500,
                min_query_length: 1,
                max_query_length: 200,
            },
            filters: FilterConfig {
                max_fee: 500_000.0,
                min_rating: 0.0,
                max_rating: 5.0,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}
