// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::job::JobBuilder;
use crate::trigger::TriggerBuilder;

#[test]
fn fired_result_variants_are_distinguishable() {
    let bundle = TriggerFiredBundle {
        job: JobBuilder::default().build(),
        trigger: TriggerBuilder::default().build(),
        calendar: None,
        fire_time: Utc::now(),
        previous_fire_time: None,
        next_fire_time: None,
    };
    let fired = TriggerFiredResult::Fired(bundle);
    assert!(matches!(fired, TriggerFiredResult::Fired(_)));
    assert!(!matches!(TriggerFiredResult::NotAcquired, TriggerFiredResult::Fired(_)));
    assert_ne!(TriggerFiredResult::JobBlocked, TriggerFiredResult::JobDeleted);
}
