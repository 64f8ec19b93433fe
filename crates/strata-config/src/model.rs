// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Strata messaging pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Strata configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrataConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Conversation-window cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Primary message store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cold-storage archival settings.
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "strata".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Conversation-window cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of messages held per conversation window.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Seconds before a cached window expires.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_window_size() -> usize {
    100
}

fn default_ttl_secs() -> u64 {
    3600
}

/// Primary message store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("strata").join("strata.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("strata.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Cold-storage archival configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Per-conversation live-message count at which archival triggers.
    #[serde(default = "default_db_limit")]
    pub db_limit: u64,

    /// Cold-storage retention in days. Informational: enforced by the
    /// storage tier's own lifecycle rules, not by this service.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Hours of primary-store history the retention sweep keeps.
    #[serde(default = "default_sweep_retention_hours")]
    pub sweep_retention_hours: u64,

    /// Directory for the filesystem archive backend.
    #[serde(default = "default_archive_dir")]
    pub dir: String,

    /// S3 bucket for the S3 archive backend. `None` selects the
    /// filesystem backend.
    #[serde(default)]
    pub bucket: Option<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            db_limit: default_db_limit(),
            retention_days: default_retention_days(),
            sweep_retention_hours: default_sweep_retention_hours(),
            dir: default_archive_dir(),
            bucket: None,
        }
    }
}

fn default_db_limit() -> u64 {
    1000
}

fn default_retention_days() -> u32 {
    365
}

fn default_sweep_retention_hours() -> u64 {
    24
}

fn default_archive_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("strata").join("archive"))
        .unwrap_or_else(|| std::path::PathBuf::from("archive"))
        .to_string_lossy()
        .into_owned()
}
