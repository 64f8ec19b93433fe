// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use tokio_rusqlite::Connection;
use tracing::debug;

use strata_core::StrataError;

/// Funnel for tokio-rusqlite errors into the storage error variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> StrataError {
    StrataError::Storage {
        source: Box::new(e),
    }
}

/// A handle to the SQLite database.
///
/// Wraps a single `tokio_rusqlite::Connection`; all query modules accept
/// `&Database` and go through [`Database::connection`], so every statement
/// runs on the one background thread.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode, apply PRAGMAs,
    /// and run all pending migrations.
    pub async fn open(path: &str) -> Result<Self, StrataError> {
        Self::open_with(path, true).await
    }

    /// Open with an explicit journal mode choice (`wal_mode = false` keeps
    /// SQLite's rollback journal, for filesystems where WAL misbehaves).
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, StrataError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StrataError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path).await.map_err(|e| StrataError::Storage {
            source: Box::new(e),
        })?;

        conn.call(move |conn| {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL;")
                    .map_err(|e| StrataError::Storage {
                        source: Box::new(e),
                    })?;
            }
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA foreign_keys = ON;",
            )
            .map_err(|e| StrataError::Storage {
                source: Box::new(e),
            })?;
            crate::migrations::run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(|e: tokio_rusqlite::Error<StrataError>| match e {
            tokio_rusqlite::Error::Error(inner) => inner,
            other => StrataError::Storage {
                source: Box::new(other),
            },
        })?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying serialized connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(&self) -> Result<(), StrataError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
