// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use jobstore_core::test_support::FixedIntervalCalculator;
use jobstore_core::{GroupName, MisfireInstruction, ScheduleOptions, TriggerBuilder};

struct NoopSignaler;

#[async_trait]
impl Signaler for NoopSignaler {
    async fn signal_scheduling_change(&self, _candidate_new_next_fire_time: Option<i64>) {}
    async fn notify_trigger_listeners_misfired(&self, _trigger: &Trigger) {}
    async fn notify_scheduler_listeners_finalized(&self, _trigger: &Trigger) {}
    async fn notify_scheduler_listeners_job_deleted(&self, _job: &GroupName) {}
}

fn threshold() -> chrono::Duration {
    chrono::Duration::seconds(60)
}

#[tokio::test]
async fn not_misfired_when_next_fire_is_recent() {
    let calculator = FixedIntervalCalculator::new(chrono::Duration::minutes(1));
    let signaler = NoopSignaler;
    let reconciler = MisfireReconciler::new(&calculator, &signaler);
    let now = Utc::now();
    let mut trigger = TriggerBuilder::default()
        .next_fire_time(now)
        .schedule(ScheduleOptions::Simple { repeat_count: -1, repeat_interval_ms: 60_000 })
        .build();
    let outcome = reconciler.reconcile(&mut trigger, None, now, threshold()).await;
    assert_eq!(outcome, MisfireOutcome::NotMisfired);
}

#[tokio::test]
async fn advances_when_misfired_with_remaining_schedule() {
    let calculator = FixedIntervalCalculator::new(chrono::Duration::minutes(1));
    let signaler = NoopSignaler;
    let reconciler = MisfireReconciler::new(&calculator, &signaler);
    let now = Utc::now();
    let stale = now - chrono::Duration::minutes(5);
    let mut trigger = TriggerBuilder::default().next_fire_time(stale).build();
    let outcome = reconciler.reconcile(&mut trigger, None, now, threshold()).await;
    assert_eq!(outcome, MisfireOutcome::Advanced);
    assert_eq!(trigger.previous_fire_time, Some(stale));
    assert_eq!(trigger.next_fire_time, Some(stale + chrono::Duration::minutes(1)));
}

#[tokio::test]
async fn finalizes_when_schedule_exhausted() {
    let calculator = FixedIntervalCalculator::with_max_fires(chrono::Duration::minutes(1), 0);
    let signaler = NoopSignaler;
    let reconciler = MisfireReconciler::new(&calculator, &signaler);
    let now = Utc::now();
    let stale = now - chrono::Duration::minutes(5);
    let mut trigger = TriggerBuilder::default().next_fire_time(stale).build();
    let outcome = reconciler.reconcile(&mut trigger, None, now, threshold()).await;
    assert_eq!(outcome, MisfireOutcome::Finalized);
    assert_eq!(trigger.state, TriggerState::Complete);
    assert!(trigger.next_fire_time.is_none());
}

#[tokio::test]
async fn ignore_misfire_policy_is_exempt() {
    let calculator = FixedIntervalCalculator::new(chrono::Duration::minutes(1));
    let signaler = NoopSignaler;
    let reconciler = MisfireReconciler::new(&calculator, &signaler);
    let now = Utc::now();
    let stale = now - chrono::Duration::minutes(5);
    let mut trigger = TriggerBuilder::default()
        .next_fire_time(stale)
        .misfire_instruction(MisfireInstruction::IgnoreMisfirePolicy)
        .build();
    let outcome = reconciler.reconcile(&mut trigger, None, now, threshold()).await;
    assert_eq!(outcome, MisfireOutcome::NotMisfired);
}
