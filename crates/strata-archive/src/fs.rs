// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem archive backend.
//!
//! Maps object keys onto a directory tree under a configured root. Used for
//! single-node deployments and as the archive tier in tests; production
//! deployments point the pipeline at [`crate::s3::S3Archive`] instead.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use strata_core::{AdapterType, ArchiveAdapter, HealthStatus, PluginAdapter, StrataError};

/// Archive backend rooted at a local directory.
pub struct FsArchive {
    root: PathBuf,
}

impl FsArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

/// Collect relative object keys under `dir`, depth first.
fn collect_keys(root: &Path, dir: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_keys(root, &path, out)?;
        } else if let Ok(rel) = path.strip_prefix(root) {
            // Keys always use forward slashes, whatever the platform.
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push(key);
        }
    }
    Ok(())
}

#[async_trait]
impl PluginAdapter for FsArchive {
    fn name(&self) -> &str {
        "fs"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Archive
    }

    async fn health_check(&self) -> Result<HealthStatus, StrataError> {
        if self.root.exists() || std::fs::create_dir_all(&self.root).is_ok() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy(format!(
                "archive root {} is not writable",
                self.root.display()
            )))
        }
    }

    async fn shutdown(&self) -> Result<(), StrataError> {
        Ok(())
    }
}

#[async_trait]
impl ArchiveAdapter for FsArchive {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StrataError> {
        let path = self.object_path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StrataError::ArchiveWrite {
                    source: Box::new(e),
                })?;
        }
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| StrataError::ArchiveWrite {
                source: Box::new(e),
            })?;
        debug!(key, path = %path.display(), "archive object written");
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StrataError> {
        tokio::fs::read(self.object_path(key))
            .await
            .map_err(|e| StrataError::Storage {
                source: Box::new(e),
            })
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StrataError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        collect_keys(&self.root, &self.root, &mut keys).map_err(|e| StrataError::Storage {
            source: Box::new(e),
        })?;
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}
