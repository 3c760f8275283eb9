// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use jobstore_core::{GroupName, Job};

#[test]
fn job_doc_id_matches_entity_doc_id() {
    let job = Job::new("sched1", GroupName::new("Job1", "DEFAULT"), "com.example.NoopJob");
    let expected = job.doc_id();
    let doc = JobDoc::new(job);
    assert_eq!(doc.id, expected);
    assert_eq!(doc.version, 0);
}

#[test]
fn next_version_increments() {
    let job = Job::new("sched1", GroupName::new("Job1", "DEFAULT"), "com.example.NoopJob");
    let doc = JobDoc::new(job);
    assert_eq!(doc.next_version(), 1);
}

#[test]
fn round_trips_through_bson() {
    let job = Job::new("sched1", GroupName::new("Job1", "DEFAULT"), "com.example.NoopJob");
    let doc = JobDoc::new(job);
    let bytes = bson::to_vec(&doc).unwrap();
    let back: JobDoc = bson::from_slice(&bytes).unwrap();
    assert_eq!(back, doc);
}
