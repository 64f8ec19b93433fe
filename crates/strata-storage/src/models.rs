// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities plus SQL value conversions.
//!
//! The canonical types are defined in `strata-core::types` for use across
//! adapter trait boundaries. This module re-exports them and holds the
//! timestamp column encoding shared by the query modules.

use chrono::{DateTime, SecondsFormat, Utc};

pub use strata_core::types::{ChatKey, ChatMetadata, Message, MessageId, UserId};

/// Encode a timestamp for the `timestamp` / `latest_timestamp` columns.
///
/// RFC 3339, UTC, fixed nanosecond precision: lexical order of the encoded
/// strings equals chronological order (which the conversation listings'
/// ORDER BY relies on), and decoding restores the instant exactly.
pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Decode a timestamp column value.
pub(crate) fn decode_timestamp(
    column: usize,
    value: &str,
) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
