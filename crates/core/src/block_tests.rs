// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn doc_id_is_scoped_to_scheduler_and_job() {
    let blocked = BlockedJob::new("sched1", GroupName::new("Job", "Group"));
    assert_eq!(blocked.doc_id(), "Bsched1#sched1/Group/Job");
}

#[test]
fn distinct_jobs_have_distinct_doc_ids() {
    let a = BlockedJob::new("sched1", GroupName::new("JobA", "Group"));
    let b = BlockedJob::new("sched1", GroupName::new("JobB", "Group"));
    assert_ne!(a.doc_id(), b.doc_id());
}
