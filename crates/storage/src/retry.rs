// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry Wrapper: reruns a mutating operation on optimistic-concurrency
//! conflicts, with a configurable cap and no backoff beyond what the
//! natural reload imposes (spec.md §4.9).
//!
//! Grounded in the teacher's `flowcatalyst` poller idiom of a bounded loop
//! that logs each failed attempt and surfaces the final one unchanged
//! (`other_examples/.../fc-scheduler::DispatchScheduler::start`), adapted
//! from a fixed-interval poll to a conflict-triggered retry.

use jobstore_core::{StoreError, StoreResult};
use std::future::Future;
use tracing::{error, warn};

/// Run `op` up to `cap` times, retrying only on
/// [`StoreError::ConcurrencyConflict`]. Any other error, or the last
/// conflict once the cap is exhausted, is returned unchanged — a
/// conflict never escapes this wrapper to the operation surface's caller.
pub async fn with_retry<T, F, Fut>(cap: u32, label: &str, mut op: F) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_concurrency_conflict() && attempt < cap => {
                warn!(operation = label, attempt, cap, "retrying after concurrency conflict");
            }
            Err(e) if e.is_concurrency_conflict() => {
                error!(operation = label, attempts = attempt, "exhausted concurrency retries");
                return Err(e);
            }
            Err(e) => return Err(e),
        }
    }
}

pub fn default_retry_cap(clustered: bool) -> u32 {
    if clustered {
        100
    } else {
        5
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
