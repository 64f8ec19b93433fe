// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock collaborators and the end-to-end test harness for the Strata
//! messaging pipeline.

pub mod flaky_cache;
pub mod harness;
pub mod mock_directory;

pub use flaky_cache::FlakyCache;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_directory::{MockBlockList, MockDirectory, MockGroups};
