// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct RecordingSignaler {
    scheduling_changes: Mutex<Vec<Option<i64>>>,
}

#[async_trait]
impl Signaler for RecordingSignaler {
    async fn signal_scheduling_change(&self, candidate_new_next_fire_time: Option<i64>) {
        self.scheduling_changes.lock().push(candidate_new_next_fire_time);
    }

    async fn notify_trigger_listeners_misfired(&self, _trigger: &Trigger) {}
    async fn notify_scheduler_listeners_finalized(&self, _trigger: &Trigger) {}
    async fn notify_scheduler_listeners_job_deleted(&self, _job: &GroupName) {}
}

struct AllowListTypeLoader(Vec<&'static str>);

impl JobTypeLoader for AllowListTypeLoader {
    fn is_known(&self, job_type: &str) -> bool {
        self.0.contains(&job_type)
    }
}

#[tokio::test]
async fn signaler_records_calls() {
    let signaler = Arc::new(RecordingSignaler::default());
    let as_trait: Arc<dyn Signaler> = signaler.clone();
    as_trait.signal_scheduling_change(Some(42)).await;
    as_trait.signal_scheduling_change(None).await;
    assert_eq!(*signaler.scheduling_changes.lock(), vec![Some(42), None]);
}

#[test]
fn type_loader_rejects_unknown_types() {
    let loader = AllowListTypeLoader(vec!["com.example.NoopJob"]);
    assert!(loader.is_known("com.example.NoopJob"));
    assert!(!loader.is_known("com.example.Other"));
}
