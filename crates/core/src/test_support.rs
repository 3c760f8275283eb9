// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::calendar::Calendar;
use crate::trigger::{ScheduleCalculator, Trigger};
use chrono::{DateTime, Duration, Utc};

/// A [`ScheduleCalculator`] that just advances by a fixed interval,
/// regardless of the trigger's actual `schedule` payload. Good enough for
/// exercising the misfire reconciler, acquisition engine, and fire protocol
/// without depending on real cron/calendar-interval arithmetic.
pub struct FixedIntervalCalculator {
    pub interval: Duration,
    /// When `Some(n)`, the calculator returns `None` (schedule exhausted)
    /// once the trigger has advanced past `n` occurrences past `start_time`.
    pub max_fires: Option<i32>,
}

impl FixedIntervalCalculator {
    pub fn new(interval: Duration) -> Self {
        Self { interval, max_fires: None }
    }

    pub fn with_max_fires(interval: Duration, max_fires: i32) -> Self {
        Self { interval, max_fires: Some(max_fires) }
    }

    fn advance(&self, from: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        from.map(|t| t + self.interval)
    }
}

impl ScheduleCalculator for FixedIntervalCalculator {
    fn compute_first_fire_time(&self, trigger: &Trigger, _calendar: Option<&Calendar>) -> Option<DateTime<Utc>> {
        Some(trigger.start_time)
    }

    fn update_after_misfire(&self, trigger: &mut Trigger, _calendar: Option<&Calendar>) {
        trigger.previous_fire_time = trigger.next_fire_time;
        if self.exhausted(trigger) {
            trigger.next_fire_time = None;
        } else {
            trigger.next_fire_time = self.advance(trigger.next_fire_time);
        }
    }

    fn triggered(&self, trigger: &mut Trigger, _calendar: Option<&Calendar>) {
        trigger.previous_fire_time = trigger.next_fire_time;
        if self.exhausted(trigger) {
            trigger.next_fire_time = None;
        } else {
            trigger.next_fire_time = self.advance(trigger.next_fire_time);
        }
    }
}

impl FixedIntervalCalculator {
    fn exhausted(&self, trigger: &Trigger) -> bool {
        match self.max_fires {
            None => false,
            Some(max) => {
                let elapsed = trigger
                    .previous_fire_time
                    .map(|prev| (prev - trigger.start_time).num_milliseconds())
                    .unwrap_or(0);
                let fires_so_far = if self.interval.num_milliseconds() > 0 {
                    elapsed / self.interval.num_milliseconds()
                } else {
                    0
                };
                fires_so_far >= max as i64
            }
        }
    }
}
