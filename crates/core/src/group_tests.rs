// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn paused_trigger_and_job_group_ids_are_distinct() {
    let t = PausedTriggerGroup::new("sched1", "known");
    let j = PausedJobGroup::new("sched1", "known");
    assert_ne!(t.doc_id(), j.doc_id());
    assert_eq!(t.doc_id(), "Tsched1#known");
    assert_eq!(j.doc_id(), "Jsched1#known");
}

#[test]
fn equality_matcher_matches_exact_group_only() {
    let m = GroupMatcher::equals("known");
    assert!(m.matches("known"));
    assert!(!m.matches("known2"));
    assert!(!m.requires_client_side_scan());
}

#[test]
fn starts_with_and_ends_with_matchers() {
    assert!(GroupMatcher::starts_with("pre").matches("prefix"));
    assert!(!GroupMatcher::starts_with("pre").matches("xprefix"));
    assert!(GroupMatcher::ends_with("fix").matches("prefix"));
    assert!(!GroupMatcher::ends_with("fix").matches("fixture"));
}

#[test]
fn anything_matcher_matches_everything() {
    assert!(GroupMatcher::anything().matches(""));
    assert!(GroupMatcher::anything().matches("whatever"));
}

#[test]
fn contains_matcher_requires_client_side_scan() {
    let m = GroupMatcher::contains("mid");
    assert!(m.requires_client_side_scan());
    assert!(m.matches("a-middle-b"));
    assert!(!m.matches("nope"));
}
