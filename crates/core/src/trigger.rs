// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger entity, its internal state machine, and the schedule-options
//! payload.
//!
//! Concrete schedule math (cron parsing, calendar-interval/daily-time-interval
//! arithmetic) is an external collaborator per spec.md §1 — this module only
//! carries the tagged data the runtime's schedule implementation needs, plus
//! the [`ScheduleCalculator`] trait the store calls through to get dates
//! without knowing how any particular schedule kind computes them.

use crate::calendar::Calendar;
use crate::data_map::JobDataMap;
use crate::instruction::MisfireInstruction;
use crate::key::GroupName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Internal trigger state. See spec.md §4.4 for the full transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    Waiting,
    Acquired,
    Executing,
    Blocked,
    Paused,
    PausedAndBlocked,
    Complete,
    Error,
}

crate::simple_display! {
    TriggerState {
        Waiting => "waiting",
        Acquired => "acquired",
        Executing => "executing",
        Blocked => "blocked",
        Paused => "paused",
        PausedAndBlocked => "paused_and_blocked",
        Complete => "complete",
        Error => "error",
    }
}

/// The public projection of [`TriggerState`] returned by `GetTriggerState`.
///
/// `PausedAndBlocked` collapses into `Paused`; every other state maps
/// one-to-one. A trigger the store has never heard of projects to `None`
/// (modeled by the caller wrapping this in `Option`, not by a variant here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalTriggerState {
    Waiting,
    Acquired,
    Executing,
    Blocked,
    Paused,
    Complete,
    Error,
}

impl From<TriggerState> for ExternalTriggerState {
    fn from(state: TriggerState) -> Self {
        match state {
            TriggerState::Waiting => ExternalTriggerState::Waiting,
            TriggerState::Acquired => ExternalTriggerState::Acquired,
            TriggerState::Executing => ExternalTriggerState::Executing,
            TriggerState::Blocked => ExternalTriggerState::Blocked,
            TriggerState::Paused | TriggerState::PausedAndBlocked => ExternalTriggerState::Paused,
            TriggerState::Complete => ExternalTriggerState::Complete,
            TriggerState::Error => ExternalTriggerState::Error,
        }
    }
}

impl TriggerState {
    /// Fold in paused/blocked status the way new-trigger creation does
    /// (spec.md §3 invariant 6, §4.3): the initial state is the first
    /// defined of Blocked, Paused, PausedAndBlocked, Waiting.
    pub fn initial(is_paused: bool, is_blocked: bool) -> Self {
        match (is_paused, is_blocked) {
            (true, true) => TriggerState::PausedAndBlocked,
            (true, false) => TriggerState::Paused,
            (false, true) => TriggerState::Blocked,
            (false, false) => TriggerState::Waiting,
        }
    }

    /// The state a `Paused`/non-paused trigger resolves to once the block
    /// condition changes, preserving the pause bit.
    pub fn with_blocked(self, is_blocked: bool) -> Self {
        use TriggerState::*;
        match (self, is_blocked) {
            (Paused, true) => PausedAndBlocked,
            (PausedAndBlocked, false) => Paused,
            (Waiting, true) => Blocked,
            (Blocked, false) => Waiting,
            (other, _) => other,
        }
    }

    pub fn is_paused(self) -> bool {
        matches!(self, TriggerState::Paused | TriggerState::PausedAndBlocked)
    }

    pub fn is_blocked(self) -> bool {
        matches!(self, TriggerState::Blocked | TriggerState::PausedAndBlocked)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TriggerState::Complete)
    }
}

/// Day-of-week bitset for daily-time-interval schedules (bit 0 = Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DaysOfWeek(pub u8);

impl DaysOfWeek {
    pub const ALL: DaysOfWeek = DaysOfWeek(0b0111_1111);

    pub fn includes(&self, chrono_weekday: chrono::Weekday) -> bool {
        let bit = chrono_weekday.num_days_from_sunday();
        self.0 & (1 << bit) != 0
    }
}

/// Time-of-day (no date component) used by daily-time-interval schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Repeat unit shared by calendar-interval and daily-time-interval schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// The tagged schedule-options payload. Exactly one variant is populated per
/// trigger; do not model this by inheritance (spec.md §9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleOptions {
    Cron { expression: String, time_zone: String },
    Simple { repeat_count: i32, repeat_interval_ms: i64 },
    CalendarInterval {
        unit: IntervalUnit,
        interval: i32,
        times_triggered: i32,
        time_zone: String,
        skip_day_if_hours_excluded_by_calendar: bool,
        prefer_daylight_saving_time: bool,
    },
    DailyTimeInterval {
        unit: IntervalUnit,
        interval: i32,
        repeat_count: i32,
        start_time_of_day: TimeOfDay,
        end_time_of_day: TimeOfDay,
        days_of_week: DaysOfWeek,
        time_zone: String,
        times_triggered: i32,
    },
}

/// A schedule attached to a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub key: GroupName,
    pub job_key: GroupName,
    pub scheduler: String,
    pub state: TriggerState,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub calendar_name: Option<String>,
    #[serde(default)]
    pub data: JobDataMap,
    #[serde(default)]
    pub fire_instance_id: Option<String>,
    #[serde(default)]
    pub misfire_instruction: MisfireInstruction,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub next_fire_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub previous_fire_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub millisecond_precision: bool,
    pub schedule: ScheduleOptions,
}

/// Default trigger priority, matching the conventional Quartz default.
pub const DEFAULT_PRIORITY: i32 = 5;

impl Trigger {
    pub fn doc_id(&self) -> String {
        self.key.doc_id(&self.scheduler)
    }

    /// Next-fire time as epoch milliseconds, for indexable (next-fire
    /// ascending, priority descending) ordering. `i64::MAX` for a trigger
    /// with no next fire, so it naturally sorts last.
    pub fn next_fire_time_ticks(&self) -> i64 {
        self.next_fire_time.map(|t| t.timestamp_millis()).unwrap_or(i64::MAX)
    }

    /// Whether `next_fire_time` is strictly due for misfire reconciliation:
    /// present, at or before `misfire_cutoff`, and not exempt by policy.
    pub fn is_misfired(&self, misfire_cutoff: DateTime<Utc>) -> bool {
        self.misfire_instruction != MisfireInstruction::IgnoreMisfirePolicy
            && self.next_fire_time.is_some_and(|t| t <= misfire_cutoff)
    }
}

crate::builder! {
    pub struct TriggerBuilder => Trigger {
        into {
            scheduler: String = "sched1",
        }
        set {
            key: GroupName = GroupName::new("TestTrigger", "DEFAULT"),
            job_key: GroupName = GroupName::new("TestJob", "DEFAULT"),
            state: TriggerState = TriggerState::Waiting,
            data: JobDataMap = JobDataMap::new(),
            misfire_instruction: MisfireInstruction = MisfireInstruction::SmartPolicy,
            priority: i32 = DEFAULT_PRIORITY,
            millisecond_precision: bool = true,
            schedule: ScheduleOptions = ScheduleOptions::Simple { repeat_count: 0, repeat_interval_ms: 0 },
        }
        option {
            description: String = None,
            calendar_name: String = None,
            fire_instance_id: String = None,
            end_time: DateTime<Utc> = None,
            next_fire_time: DateTime<Utc> = None,
            previous_fire_time: DateTime<Utc> = None,
        }
        computed {
            start_time: DateTime<Utc> = Utc::now(),
        }
    }
}

/// External collaborator: computes schedule-specific dates.
///
/// Concrete cron/simple/calendar-interval/daily-time-interval math lives on
/// the runtime side (spec.md §1 Non-goals); the store only needs these three
/// hooks to drive the misfire reconciler, the fire protocol, and recovery's
/// first-fire recomputation without knowing how any given schedule kind
/// works.
pub trait ScheduleCalculator: Send + Sync {
    /// First fire time for a freshly created trigger, honoring `calendar`
    /// if present.
    fn compute_first_fire_time(
        &self,
        trigger: &Trigger,
        calendar: Option<&Calendar>,
    ) -> Option<DateTime<Utc>>;

    /// Advance `trigger.next_fire_time`/`previous_fire_time` to account for
    /// a missed fire, honoring `calendar`. Returns `None` if there is no
    /// more ever, after accounting for start/end windows.
    fn update_after_misfire(
        &self,
        trigger: &mut Trigger,
        calendar: Option<&Calendar>,
    );

    /// Advance `trigger.next_fire_time`/`previous_fire_time` after a
    /// successful fire, honoring `calendar`.
    fn triggered(&self, trigger: &mut Trigger, calendar: Option<&Calendar>);
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
