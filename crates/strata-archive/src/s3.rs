// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! S3 archive backend.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use strata_core::{AdapterType, ArchiveAdapter, HealthStatus, PluginAdapter, StrataError};

/// Archive backend writing batches to an S3 bucket.
pub struct S3Archive {
    client: Client,
    bucket: String,
}

impl S3Archive {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the ambient AWS environment (region, credentials
    /// chain) and wrap it for the given bucket.
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl PluginAdapter for S3Archive {
    fn name(&self) -> &str {
        "s3"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Archive
    }

    async fn health_check(&self) -> Result<HealthStatus, StrataError> {
        match self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(
                e.into_service_error().to_string(),
            )),
        }
    }

    async fn shutdown(&self) -> Result<(), StrataError> {
        Ok(())
    }
}

#[async_trait]
impl ArchiveAdapter for S3Archive {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StrataError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StrataError::ArchiveWrite {
                source: Box::new(e.into_service_error()),
            })?;
        debug!(key, bucket = %self.bucket, "archive object written");
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StrataError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StrataError::Storage {
                source: Box::new(e.into_service_error()),
            })?;

        let bytes = resp
            .body
            .collect()
            .await
            .map_err(|e| StrataError::Storage {
                source: Box::new(e),
            })?
            .into_bytes();
        Ok(bytes.to_vec())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StrataError> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);

            if let Some(token) = &continuation_token {
                req = req.continuation_token(token);
            }

            let resp = req.send().await.map_err(|e| StrataError::Storage {
                source: Box::new(e.into_service_error()),
            })?;

            for obj in resp.contents() {
                if let Some(key) = obj.key() {
                    keys.push(key.to_string());
                }
            }

            if resp.is_truncated() == Some(true) {
                continuation_token = resp.next_continuation_token().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(keys)
    }
}
