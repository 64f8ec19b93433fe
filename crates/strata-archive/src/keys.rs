// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive object key conventions.
//!
//! Pure string functions, no storage-SDK dependency. These define the
//! canonical layout of objects in the cold tier and must stay bit-exact
//! with the historical layout: existing archives were written under these
//! keys.

use chrono::{DateTime, Datelike, Timelike, Utc};

use strata_core::types::UserId;

/// Key for one conversation backup batch.
///
/// `{owner}/{year}/{day_of_year}/{hour}/{peer}.json`, bucketed by the
/// wall-clock instant the backup ran (not by per-message timestamps), so a
/// conversation's batches group under the hour of each archival pass.
pub fn conversation_batch(owner: &UserId, peer: &UserId, at: DateTime<Utc>) -> String {
    format!(
        "{}/{}/{}/{}/{}.json",
        owner,
        at.year(),
        at.ordinal(),
        at.hour(),
        peer
    )
}

/// Prefix of every batch a user owns.
pub fn owner_prefix(owner: &UserId) -> String {
    format!("{owner}/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn batch_key_layout_is_bit_exact() {
        // 2024-02-29 is day-of-year 60 of a leap year.
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 13, 5, 59).unwrap();
        let key = conversation_batch(&UserId("alice".into()), &UserId("bob".into()), at);
        assert_eq!(key, "alice/2024/60/13/bob.json");
    }

    #[test]
    fn batch_key_buckets_by_hour() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 7, 59, 59).unwrap();
        let a = UserId("alice".into());
        let b = UserId("bob".into());
        assert_eq!(
            conversation_batch(&a, &b, early),
            conversation_batch(&a, &b, later)
        );
    }

    #[test]
    fn owner_prefix_matches_batch_keys() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let key = conversation_batch(&UserId("alice".into()), &UserId("bob".into()), at);
        assert!(key.starts_with(&owner_prefix(&UserId("alice".into()))));
    }
}
