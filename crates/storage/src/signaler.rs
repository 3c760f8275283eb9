// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External collaborators the store calls through to, never implements.
//!
//! Grounded in the teacher's consumer-trait idiom for external dependencies
//! (`other_examples/.../fc-scheduler::QueuePublisher`): the store is handed
//! `Arc<dyn Signaler>` and `Arc<dyn JobTypeLoader>` at `Initialize` time and
//! never constructs a concrete implementation itself.

use async_trait::async_trait;
use jobstore_core::{GroupName, Trigger};

/// Notifies the runtime of scheduling changes and listener events. Calls
/// here are fire-and-forget from the store's perspective (spec.md §9) —
/// implementations should not block a hot path on them.
#[async_trait]
pub trait Signaler: Send + Sync {
    async fn signal_scheduling_change(&self, candidate_new_next_fire_time: Option<i64>);
    async fn notify_trigger_listeners_misfired(&self, trigger: &Trigger);
    async fn notify_scheduler_listeners_finalized(&self, trigger: &Trigger);
    async fn notify_scheduler_listeners_job_deleted(&self, job: &GroupName);
}

/// Resolves a job-type identifier string to a concrete runtime job class.
/// The store only consults this when `StoreConfig::validate_job_type` is
/// set (off by default — see DESIGN.md).
pub trait JobTypeLoader: Send + Sync {
    fn is_known(&self, job_type: &str) -> bool;
}

#[cfg(test)]
#[path = "signaler_tests.rs"]
mod tests;
