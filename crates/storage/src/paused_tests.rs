// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn matching_groups_equality() {
    let matcher = GroupMatcher::equals("known");
    let groups = ["known", "other"];
    assert_eq!(
        PausedGroupRegistry::matching_groups(&matcher, groups),
        vec!["known".to_string()]
    );
}

#[test]
fn matching_groups_contains_scans_client_side() {
    let matcher = GroupMatcher::contains("ob");
    assert!(matcher.requires_client_side_scan());
    let groups = ["job-a", "cron-b", "reports"];
    assert_eq!(
        PausedGroupRegistry::matching_groups(&matcher, groups),
        vec!["job-a".to_string()]
    );
}

#[test]
fn matching_groups_anything_matches_all() {
    let matcher = GroupMatcher::anything();
    let groups = ["a", "b", "c"];
    assert_eq!(PausedGroupRegistry::matching_groups(&matcher, groups).len(), 3);
}
