// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_record_starts_unknown() {
    let record = SchedulerRecord::new("sched1", Utc::now());
    assert_eq!(record.state, SchedulerLifecycle::Unknown);
    assert_eq!(record.doc_id(), "sched1");
}

#[test]
fn checkin_updates_last_checkin() {
    let t0 = Utc::now();
    let mut record = SchedulerRecord::new("sched1", t0);
    let t1 = t0 + chrono::Duration::seconds(10);
    record.checkin(t1);
    assert_eq!(record.last_checkin, t1);
}

#[test]
fn lifecycle_display() {
    assert_eq!(SchedulerLifecycle::Shutdown.to_string(), "shutdown");
}
