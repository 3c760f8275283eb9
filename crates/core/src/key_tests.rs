// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

#[test]
fn group_name_doc_id_is_deterministic() {
    let key = GroupName::new("Job", "Group");
    assert_eq!(key.doc_id("sched1"), "sched1/Group/Job");
    assert_eq!(key.doc_id("sched1"), key.doc_id("sched1"));
}

#[test]
fn group_name_display_is_group_dot_name() {
    let key = GroupName::new("Job", "Group");
    assert_eq!(key.to_string(), "Group.Job");
}

#[test]
fn calendar_doc_id_is_scoped() {
    assert_eq!(calendar_doc_id("sched1", "holidays"), "sched1/calendars/holidays");
}

#[test]
fn paused_group_doc_ids_are_distinct_by_kind() {
    assert_ne!(
        paused_trigger_group_doc_id("sched1", "g"),
        paused_job_group_doc_id("sched1", "g")
    );
}

#[test]
fn job_doc_id_hashes_by_str() {
    let id = JobDocId::from("sched1/Group/Job");
    let mut map = HashMap::new();
    map.insert(id.clone(), 1);
    assert_eq!(map.get("sched1/Group/Job"), Some(&1));
}

#[test]
fn job_doc_id_display_round_trips() {
    let id = JobDocId::from("sched1/Group/Job".to_string());
    assert_eq!(id.to_string(), "sched1/Group/Job");
    assert_eq!(id.as_str(), "sched1/Group/Job");
}
