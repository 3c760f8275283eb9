// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Misfire and completion instruction codes.

use serde::{Deserialize, Serialize};

/// What to do when a trigger's next-fire time is discovered to be older
/// than `now - MisfireThreshold`.
///
/// The concrete meaning of `SmartPolicy` / the schedule-specific variants is
/// decided by the schedule kind (`ScheduleOptions`); the reconciler only
/// needs to know whether to skip reconciliation entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MisfireInstruction {
    /// Let the schedule kind decide (the common case).
    SmartPolicy,
    /// Never treat this trigger as misfired.
    IgnoreMisfirePolicy,
    /// Fire once immediately, then resume the original schedule.
    FireOnceNow,
    /// Skip to the next scheduled fire time, dropping the missed one.
    DoNothing,
}

impl Default for MisfireInstruction {
    fn default() -> Self {
        MisfireInstruction::SmartPolicy
    }
}

crate::simple_display! {
    MisfireInstruction {
        SmartPolicy => "smart_policy",
        IgnoreMisfirePolicy => "ignore_misfire_policy",
        FireOnceNow => "fire_once_now",
        DoNothing => "do_nothing",
    }
}

/// Instruction returned by the runtime from `TriggeredJobComplete`, telling
/// the store what to do with the trigger(s) that just fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionInstruction {
    NoInstruction,
    ReExecuteJob,
    SetTriggerComplete,
    SetTriggerError,
    SetAllJobTriggersComplete,
    SetAllJobTriggersError,
    DeleteTrigger,
}

crate::simple_display! {
    CompletionInstruction {
        NoInstruction => "no_instruction",
        ReExecuteJob => "re_execute_job",
        SetTriggerComplete => "set_trigger_complete",
        SetTriggerError => "set_trigger_error",
        SetAllJobTriggersComplete => "set_all_job_triggers_complete",
        SetAllJobTriggersError => "set_all_job_triggers_error",
        DeleteTrigger => "delete_trigger",
    }
}

#[cfg(test)]
#[path = "instruction_tests.rs"]
mod tests;
