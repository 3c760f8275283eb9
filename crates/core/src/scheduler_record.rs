// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-scheduler control record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::simple_display! {
    SchedulerLifecycle {
        Unknown => "unknown",
        Started => "started",
        Paused => "paused",
        Resumed => "resumed",
        Shutdown => "shutdown",
    }
}

/// Lifecycle state of a scheduler instance, as last reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerLifecycle {
    Unknown,
    Started,
    Paused,
    Resumed,
    Shutdown,
}

impl Default for SchedulerLifecycle {
    fn default() -> Self {
        SchedulerLifecycle::Unknown
    }
}

/// One document per `InstanceName`, created on first attach and updated on
/// every lifecycle transition.
///
/// The store itself never decides whether another instance's record is
/// stale enough to treat as an orphan — ownership/leader-election is
/// explicitly out of scope (spec.md §1 Non-goals). `last_checkin` and
/// `checkin_interval` are persisted purely so the runtime can make that
/// call itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerRecord {
    pub instance_name: String,
    pub last_checkin: DateTime<Utc>,
    pub checkin_interval_ms: i64,
    pub state: SchedulerLifecycle,
}

impl SchedulerRecord {
    pub fn new(instance_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            instance_name: instance_name.into(),
            last_checkin: now,
            checkin_interval_ms: 7_500,
            state: SchedulerLifecycle::Unknown,
        }
    }

    pub fn doc_id(&self) -> &str {
        &self.instance_name
    }

    pub fn checkin(&mut self, now: DateTime<Utc>) {
        self.last_checkin = now;
    }
}

#[cfg(test)]
#[path = "scheduler_record_tests.rs"]
mod tests;
