// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};

#[tokio::test]
async fn succeeds_after_transient_conflicts() {
    let attempts = AtomicU32::new(0);
    let result = with_retry(5, "test_op", || async {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        if n < 2 {
            Err(StoreError::ConcurrencyConflict { key: "k".to_string() })
        } else {
            Ok(42)
        }
    })
    .await;
    assert_eq!(result.unwrap(), 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_at_cap() {
    let attempts = AtomicU32::new(0);
    let result: StoreResult<()> = with_retry(3, "test_op", || async {
        attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::ConcurrencyConflict { key: "k".to_string() })
    })
    .await;
    assert!(result.unwrap_err().is_concurrency_conflict());
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn non_conflict_errors_return_immediately() {
    let attempts = AtomicU32::new(0);
    let result: StoreResult<()> = with_retry(5, "test_op", || async {
        attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::TransientStoreError("boom".to_string()))
    })
    .await;
    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn default_retry_cap_matches_spec() {
    assert_eq!(default_retry_cap(true), 100);
    assert_eq!(default_retry_cap(false), 5);
}
