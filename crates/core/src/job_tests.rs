// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn doc_id_is_deterministic() {
    let job = Job::new("sched1", GroupName::new("Job", "Group"), "com.example.NoopJob");
    assert_eq!(job.doc_id(), "sched1/Group/Job");
}

#[test]
fn new_job_defaults_are_non_durable_and_concurrent() {
    let job = Job::new("sched1", GroupName::new("Job", "Group"), "com.example.NoopJob");
    assert!(!job.durable);
    assert!(!job.concurrent_execution_disallowed);
    assert!(job.data.is_empty());
}

#[test]
fn builder_overrides_defaults() {
    let job = Job::builder()
        .key(GroupName::new("Custom", "Group"))
        .durable(true)
        .concurrent_execution_disallowed(true)
        .build();
    assert!(job.durable);
    assert!(job.concurrent_execution_disallowed);
    assert_eq!(job.key.name, "Custom");
}

#[test]
fn job_round_trips_json() {
    let job = Job::builder().build();
    let encoded = serde_json::to_string(&job).unwrap();
    let decoded: Job = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, job);
}
