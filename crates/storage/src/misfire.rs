// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Misfire Reconciler (spec.md §4.5).
//!
//! Pure in-memory state transition plus the two listener notifications;
//! the caller (Acquisition Engine, Fire & Complete Protocol, or a direct
//! `GetTriggerState` read per spec.md §3 invariant 5) is responsible for
//! loading the calendar and persisting the result.

use crate::signaler::Signaler;
use chrono::{DateTime, Utc};
use jobstore_core::{Calendar, ScheduleCalculator, Trigger, TriggerState};

/// Result of one reconciliation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MisfireOutcome {
    /// The trigger was not misfired; nothing changed.
    NotMisfired,
    /// Reconciled, but the schedule's next-fire time did not move.
    NoChange,
    /// The schedule advanced past the missed fire.
    Advanced,
    /// The schedule is exhausted; the trigger is now `Complete`.
    Finalized,
}

pub struct MisfireReconciler<'a> {
    calculator: &'a dyn ScheduleCalculator,
    signaler: &'a dyn Signaler,
}

impl<'a> MisfireReconciler<'a> {
    pub fn new(calculator: &'a dyn ScheduleCalculator, signaler: &'a dyn Signaler) -> Self {
        Self { calculator, signaler }
    }

    /// Compute `misfireCutoff = now - misfireThreshold` and reconcile
    /// `trigger` in place if it qualifies as misfired.
    pub async fn reconcile(
        &self,
        trigger: &mut Trigger,
        calendar: Option<&Calendar>,
        now: DateTime<Utc>,
        misfire_threshold: chrono::Duration,
    ) -> MisfireOutcome {
        let cutoff = now - misfire_threshold;
        if !trigger.is_misfired(cutoff) {
            return MisfireOutcome::NotMisfired;
        }

        let prior_next = trigger.next_fire_time;
        self.signaler.notify_trigger_listeners_misfired(trigger).await;
        self.calculator.update_after_misfire(trigger, calendar);

        if trigger.next_fire_time.is_none() {
            self.signaler.notify_scheduler_listeners_finalized(trigger).await;
            trigger.state = TriggerState::Complete;
            return MisfireOutcome::Finalized;
        }

        if trigger.next_fire_time == prior_next {
            MisfireOutcome::NoChange
        } else {
            MisfireOutcome::Advanced
        }
    }
}

#[cfg(test)]
#[path = "misfire_tests.rs"]
mod tests;
