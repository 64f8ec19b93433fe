// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process TTL'd conversation-window cache for the Strata pipeline.

pub mod memory;

pub use memory::MemoryCache;
