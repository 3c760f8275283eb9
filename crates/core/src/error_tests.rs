// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::key::GroupName;

#[test]
fn job_already_exists_formats_doc_id() {
    let err = StoreError::job_already_exists(&GroupName::new("Job", "Group"), "sched1");
    assert_eq!(err.to_string(), "job sched1/Group/Job already exists");
}

#[test]
fn concurrency_conflict_is_detected() {
    let err = StoreError::ConcurrencyConflict { key: "sched1/g/t".into() };
    assert!(err.is_concurrency_conflict());
    let other = StoreError::TransientStoreError("timeout".into());
    assert!(!other.is_concurrency_conflict());
}

#[test]
fn configuration_failure_wraps_source() {
    let inner = StoreError::JobPersistenceFailure("missing job".into());
    let wrapped = StoreError::ConfigurationFailure(Box::new(inner));
    assert!(wrapped.to_string().contains("couldn't recover jobs"));
}
