// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive adapter trait for the cold blob-storage tier.

use async_trait::async_trait;

use crate::error::StrataError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for cold archival storage.
///
/// Objects are opaque byte blobs under deterministic string keys. A
/// successful `put_object` must mean the object is durable: the archival
/// pipeline only deletes primary-store messages after the put returns.
#[async_trait]
pub trait ArchiveAdapter: PluginAdapter {
    /// Write one archival object under `key`.
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StrataError>;

    /// Read an archival object back.
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StrataError>;

    /// List object keys under a prefix.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StrataError>;
}
