// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-instance id generation.
//!
//! Must be unique within a process lifetime and sort ascending (spec.md §9):
//! a monotonic counter seeded at process start with the current tick count,
//! formatted as a fixed-width zero-padded decimal.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Width chosen so that `seed + any realistic process lifetime increment
/// count` never overflows the field: current epoch nanoseconds are already
/// ~19 digits, so 19 is the floor; we use 19 to match spec.md §9 exactly.
const FIRE_INSTANCE_ID_WIDTH: usize = 19;

/// Process-wide monotonic counter for fire-instance ids.
///
/// One instance lives on the store for its whole process lifetime — it is
/// the only piece of cross-operation process state besides the in-memory
/// block set (spec.md §5).
pub struct FireInstanceIdGenerator {
    counter: AtomicI64,
}

impl FireInstanceIdGenerator {
    /// Seed with the current tick count (epoch nanoseconds, clamped to fit
    /// the field), matching spec.md §4.6 / §9.
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0);
        Self { counter: AtomicI64::new(seed) }
    }

    /// Seed with an explicit value (for deterministic tests).
    pub fn with_seed(seed: i64) -> Self {
        Self { counter: AtomicI64::new(seed) }
    }

    /// Atomically increment and format as a zero-padded decimal string.
    pub fn next(&self) -> String {
        let value = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{:0width$}", value, width = FIRE_INSTANCE_ID_WIDTH)
    }
}

impl Default for FireInstanceIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "fire_instance_tests.rs"]
mod tests;
