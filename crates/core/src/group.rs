// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Paused-group markers and the group-matcher operators used to query them.

use serde::{Deserialize, Serialize};

/// Marker that any trigger entering `group` (by trigger-group) should start
/// Paused. Existence is the only signal — a document-existence check on
/// [`crate::key::paused_trigger_group_doc_id`] is O(1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PausedTriggerGroup {
    pub scheduler: String,
    pub group: String,
}

/// Marker that any trigger whose *job* is in `group` (by job-group) should
/// start Paused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PausedJobGroup {
    pub scheduler: String,
    pub group: String,
}

impl PausedTriggerGroup {
    pub fn new(scheduler: impl Into<String>, group: impl Into<String>) -> Self {
        Self { scheduler: scheduler.into(), group: group.into() }
    }

    pub fn doc_id(&self) -> String {
        crate::key::paused_trigger_group_doc_id(&self.scheduler, &self.group)
    }
}

impl PausedJobGroup {
    pub fn new(scheduler: impl Into<String>, group: impl Into<String>) -> Self {
        Self { scheduler: scheduler.into(), group: group.into() }
    }

    pub fn doc_id(&self) -> String {
        crate::key::paused_job_group_doc_id(&self.scheduler, &self.group)
    }
}

/// Operators supported by a [`GroupMatcher`].
///
/// Equality/StartsWith/EndsWith/Anything all compile to a database-side
/// where-clause on the group attribute. `Contains` cannot be expressed as a
/// prefix-index lookup and degrades to a client-side scan over a stream —
/// see spec.md §9 Open Question (ii).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOperator {
    Equality,
    StartsWith,
    EndsWith,
    Contains,
    Anything,
}

/// A group-name predicate used by the `*Groups` operations
/// (`PauseTriggers`, `ResumeJobs`, `GetTriggerKeys`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMatcher {
    pub operator: MatchOperator,
    pub compare_to: String,
}

impl GroupMatcher {
    pub fn equals(group: impl Into<String>) -> Self {
        Self { operator: MatchOperator::Equality, compare_to: group.into() }
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        Self { operator: MatchOperator::StartsWith, compare_to: prefix.into() }
    }

    pub fn ends_with(suffix: impl Into<String>) -> Self {
        Self { operator: MatchOperator::EndsWith, compare_to: suffix.into() }
    }

    pub fn contains(substring: impl Into<String>) -> Self {
        Self { operator: MatchOperator::Contains, compare_to: substring.into() }
    }

    pub fn anything() -> Self {
        Self { operator: MatchOperator::Anything, compare_to: String::new() }
    }

    /// Whether this matcher requires a client-side scan rather than a
    /// database-side predicate.
    pub fn requires_client_side_scan(&self) -> bool {
        matches!(self.operator, MatchOperator::Contains)
    }

    /// Evaluate the matcher against a concrete group name. Used both by the
    /// `Contains` client-side fallback and by unit tests for the other
    /// operators without a database round trip.
    pub fn matches(&self, group: &str) -> bool {
        match self.operator {
            MatchOperator::Equality => group == self.compare_to,
            MatchOperator::StartsWith => group.starts_with(&self.compare_to),
            MatchOperator::EndsWith => group.ends_with(&self.compare_to),
            MatchOperator::Contains => group.contains(&self.compare_to),
            MatchOperator::Anything => true,
        }
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
