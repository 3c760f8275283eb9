// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Types produced by the Fire & Complete protocol.

use crate::calendar::Calendar;
use crate::job::Job;
use crate::trigger::Trigger;
use chrono::{DateTime, Utc};

/// Everything the runtime needs to actually execute a fire.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerFiredBundle {
    pub job: Job,
    pub trigger: Trigger,
    pub calendar: Option<Calendar>,
    pub fire_time: DateTime<Utc>,
    pub previous_fire_time: Option<DateTime<Utc>>,
    pub next_fire_time: Option<DateTime<Utc>>,
}

/// Per-trigger outcome of `TriggersFired`, so the runtime can discard one
/// trigger from a batch without aborting the whole call (spec.md §7).
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerFiredResult {
    Fired(TriggerFiredBundle),
    /// The trigger was not in `Acquired` state when reloaded.
    NotAcquired,
    /// The trigger's job is currently blocked (non-concurrent sibling
    /// already executing).
    JobBlocked,
    /// The job record backing this trigger no longer exists.
    JobDeleted,
}

#[cfg(test)]
#[path = "fired_tests.rs"]
mod tests;
