// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cold-storage tier for the Strata messaging pipeline.
//!
//! Deterministic object key layout, filesystem and S3 archive backends, the
//! inline archival pipeline, and the scheduler-driven retention sweep.

pub mod fs;
pub mod keys;
pub mod pipeline;
pub mod s3;
pub mod sweep;

pub use fs::FsArchive;
pub use pipeline::Archiver;
pub use s3::S3Archive;
pub use sweep::{RetentionSweep, SweepOutcome};
