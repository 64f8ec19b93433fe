// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./strata.toml` > `~/.config/strata/strata.toml` > `/etc/strata/strata.toml`
//! with environment variable overrides via `STRATA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::StrataConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/strata/strata.toml` (system-wide)
/// 3. `~/.config/strata/strata.toml` (user XDG config)
/// 4. `./strata.toml` (local directory)
/// 5. `STRATA_*` environment variables
pub fn load_config() -> Result<StrataConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrataConfig::default()))
        .merge(Toml::file("/etc/strata/strata.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("strata/strata.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("strata.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a specific TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<StrataConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrataConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StrataConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrataConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `STRATA_CACHE_WINDOW_SIZE`
/// must map to `cache.window_size`, not `cache.window.size`.
fn env_provider() -> Env {
    Env::prefixed("STRATA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: STRATA_CACHE_WINDOW_SIZE -> "cache_window_size"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("cache_", "cache.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("archive_", "archive.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_files() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.cache.window_size, 100);
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.archive.db_limit, 1000);
        assert_eq!(config.archive.retention_days, 365);
        assert_eq!(config.service.name, "strata");
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[cache]
window_size = 2
ttl_secs = 60

[archive]
db_limit = 3
"#,
        )
        .unwrap();
        assert_eq!(config.cache.window_size, 2);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.archive.db_limit, 3);
        // Unset sections keep their defaults.
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
[cache]
window_sze = 10
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn env_override_maps_section_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STRATA_CACHE_WINDOW_SIZE", "7");
            jail.set_env("STRATA_ARCHIVE_DB_LIMIT", "42");
            let config: StrataConfig = Figment::new()
                .merge(Serialized::defaults(StrataConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.cache.window_size, 7);
            assert_eq!(config.archive.db_limit, 42);
            Ok(())
        });
    }
}
