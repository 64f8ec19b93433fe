// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and positive sizes/thresholds.

use crate::diagnostic::ConfigError;
use crate::model::StrataConfig;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &StrataConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.service.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "service.name must not be empty".to_string(),
        });
    }

    if !VALID_LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level must be one of {}, got `{}`",
                VALID_LOG_LEVELS.join(", "),
                config.service.log_level
            ),
        });
    }

    if config.cache.window_size == 0 {
        errors.push(ConfigError::Validation {
            message: "cache.window_size must be at least 1".to_string(),
        });
    }

    if config.cache.ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "cache.ttl_secs must be at least 1".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.archive.db_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "archive.db_limit must be at least 1".to_string(),
        });
    }

    if config.archive.retention_days == 0 {
        errors.push(ConfigError::Validation {
            message: "archive.retention_days must be at least 1".to_string(),
        });
    }

    if config.archive.sweep_retention_hours == 0 {
        errors.push(ConfigError::Validation {
            message: "archive.sweep_retention_hours must be at least 1".to_string(),
        });
    }

    if config.archive.bucket.is_none() && config.archive.dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "archive.dir must not be empty when no archive.bucket is set".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
