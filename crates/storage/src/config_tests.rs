// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_match_spec() {
    let cfg = StoreConfig::default();
    assert_eq!(cfg.concurrency_error_retries, None);
    assert_eq!(cfg.seconds_to_wait_for_indexing, 15);
    assert!(!cfg.clustered);
    assert!(!cfg.validate_job_type);
}

#[test]
fn effective_retry_cap_depends_on_clustered_when_unset() {
    let mut cfg = StoreConfig::default();
    assert_eq!(cfg.effective_retry_cap(), 5);
    cfg.clustered = true;
    assert_eq!(cfg.effective_retry_cap(), 100);
}

#[test]
fn effective_retry_cap_honors_explicit_override() {
    let mut cfg = StoreConfig::default();
    cfg.concurrency_error_retries = Some(3);
    assert_eq!(cfg.effective_retry_cap(), 3);
    cfg.clustered = true;
    assert_eq!(cfg.effective_retry_cap(), 3);
}

#[test]
fn collection_name_honors_prefix() {
    let mut cfg = StoreConfig::default();
    assert_eq!(cfg.collection_name("triggers"), "triggers");
    cfg.collection_prefix = Some("tenant-a".to_string());
    assert_eq!(cfg.collection_name("triggers"), "tenant-a/triggers");
}

#[test]
fn round_trips_through_json() {
    let cfg = StoreConfig::default();
    let json = serde_json::to_string(&cfg).unwrap();
    let back: StoreConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.database_name, cfg.database_name);
    assert_eq!(back.misfire_threshold, cfg.misfire_threshold);
}
