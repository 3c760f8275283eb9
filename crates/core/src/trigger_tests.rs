// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Duration;

#[test]
fn initial_state_prefers_blocked_over_paused() {
    assert_eq!(TriggerState::initial(true, true), TriggerState::PausedAndBlocked);
    assert_eq!(TriggerState::initial(true, false), TriggerState::Paused);
    assert_eq!(TriggerState::initial(false, true), TriggerState::Blocked);
    assert_eq!(TriggerState::initial(false, false), TriggerState::Waiting);
}

#[test]
fn with_blocked_preserves_pause_bit() {
    assert_eq!(TriggerState::Waiting.with_blocked(true), TriggerState::Blocked);
    assert_eq!(TriggerState::Blocked.with_blocked(false), TriggerState::Waiting);
    assert_eq!(TriggerState::Paused.with_blocked(true), TriggerState::PausedAndBlocked);
    assert_eq!(TriggerState::PausedAndBlocked.with_blocked(false), TriggerState::Paused);
}

#[test]
fn external_projection_collapses_paused_and_blocked() {
    let projected: ExternalTriggerState = TriggerState::PausedAndBlocked.into();
    assert_eq!(projected, ExternalTriggerState::Paused);
    let projected: ExternalTriggerState = TriggerState::Executing.into();
    assert_eq!(projected, ExternalTriggerState::Executing);
}

#[test]
fn is_terminal_only_for_complete() {
    assert!(TriggerState::Complete.is_terminal());
    assert!(!TriggerState::Error.is_terminal());
}

#[test]
fn next_fire_time_ticks_sorts_absent_last() {
    let with_fire = TriggerBuilder::default().next_fire_time(Utc::now()).build();
    let without_fire = TriggerBuilder::default().build();
    assert!(with_fire.next_fire_time_ticks() < without_fire.next_fire_time_ticks());
    assert_eq!(without_fire.next_fire_time_ticks(), i64::MAX);
}

#[test]
fn is_misfired_respects_ignore_policy() {
    let cutoff = Utc::now();
    let overdue = cutoff - Duration::seconds(1);
    let due = TriggerBuilder::default().next_fire_time(overdue).build();
    assert!(due.is_misfired(cutoff));

    let exempt = TriggerBuilder::default()
        .next_fire_time(overdue)
        .misfire_instruction(MisfireInstruction::IgnoreMisfirePolicy)
        .build();
    assert!(!exempt.is_misfired(cutoff));

    let not_yet_due = TriggerBuilder::default().next_fire_time(cutoff + Duration::seconds(60)).build();
    assert!(!not_yet_due.is_misfired(cutoff));
}

#[test]
fn days_of_week_bitset_checks_membership() {
    let weekdays = DaysOfWeek(0b0111_1110); // Mon-Fri, not Sun/Sat
    assert!(weekdays.includes(chrono::Weekday::Mon));
    assert!(!weekdays.includes(chrono::Weekday::Sun));
    assert!(DaysOfWeek::ALL.includes(chrono::Weekday::Sat));
}

#[test]
fn schedule_options_round_trip_json_per_tag() {
    let cron = ScheduleOptions::Cron { expression: "0 0 * * * ?".into(), time_zone: "UTC".into() };
    let encoded = serde_json::to_string(&cron).unwrap();
    assert!(encoded.contains("\"kind\":\"cron\""));
    let decoded: ScheduleOptions = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, cron);
}

#[test]
fn fake_schedule_calculator_advances_fire_times() {
    let calc = crate::test_support::FixedIntervalCalculator::new(Duration::minutes(1));
    let mut trigger = TriggerBuilder::default().next_fire_time(Utc::now()).build();
    let before = trigger.next_fire_time;
    calc.triggered(&mut trigger, None);
    assert_eq!(trigger.previous_fire_time, before);
    assert!(trigger.next_fire_time > before);
}
