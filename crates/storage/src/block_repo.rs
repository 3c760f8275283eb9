// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Block Repository: records which non-concurrent jobs currently have a
//! trigger Executing. Two interchangeable backends behind one trait
//! (spec.md §4.3) — the scheduler picks one at attach time based on its
//! `Clustered` flag.

use crate::codec::BlockedJobDoc;
use crate::session::{transient, SessionHelper};
use async_trait::async_trait;
use bson::doc;
use futures_util::TryStreamExt;
use jobstore_core::{BlockedJob, GroupName, StoreResult};
use parking_lot::Mutex;
use std::collections::HashSet;

/// Block/Release/ReleaseAll/IsBlocked/ListBlocked, as named in spec.md §4.3.
#[async_trait]
pub trait BlockRepository: Send + Sync {
    async fn block(&self, scheduler: &str, job: &GroupName) -> StoreResult<()>;
    async fn release(&self, scheduler: &str, job: &GroupName) -> StoreResult<()>;
    async fn release_all(&self, scheduler: &str) -> StoreResult<()>;
    async fn is_blocked(&self, scheduler: &str, job: &GroupName) -> StoreResult<bool>;
    async fn list_blocked(&self, scheduler: &str) -> StoreResult<Vec<GroupName>>;
}

/// Non-clustered backend: a process-global set guarded by `parking_lot`,
/// matching the teacher's choice of `parking_lot` for its in-process
/// queue/block locks. A latency optimization, not a correctness
/// requirement — see DESIGN.md on clustered-vs-single-node selection.
#[derive(Default)]
pub struct InMemoryBlockRepository {
    blocked: Mutex<HashSet<(String, GroupName)>>,
}

impl InMemoryBlockRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlockRepository for InMemoryBlockRepository {
    async fn block(&self, scheduler: &str, job: &GroupName) -> StoreResult<()> {
        self.blocked.lock().insert((scheduler.to_string(), job.clone()));
        Ok(())
    }

    async fn release(&self, scheduler: &str, job: &GroupName) -> StoreResult<()> {
        self.blocked.lock().remove(&(scheduler.to_string(), job.clone()));
        Ok(())
    }

    async fn release_all(&self, scheduler: &str) -> StoreResult<()> {
        self.blocked.lock().retain(|(s, _)| s != scheduler);
        Ok(())
    }

    async fn is_blocked(&self, scheduler: &str, job: &GroupName) -> StoreResult<bool> {
        Ok(self.blocked.lock().contains(&(scheduler.to_string(), job.clone())))
    }

    async fn list_blocked(&self, scheduler: &str) -> StoreResult<Vec<GroupName>> {
        Ok(self
            .blocked
            .lock()
            .iter()
            .filter(|(s, _)| s == scheduler)
            .map(|(_, job)| job.clone())
            .collect())
    }
}

/// Clustered backend: one `BlockedJob` document per (scheduler, job), the
/// correctness requirement per spec.md §9 — any instance in the cluster
/// must be able to observe a block set by another.
pub struct PersistedBlockRepository {
    session: SessionHelper,
}

impl PersistedBlockRepository {
    pub fn new(session: SessionHelper) -> Self {
        Self { session }
    }
}

#[async_trait]
impl BlockRepository for PersistedBlockRepository {
    async fn block(&self, scheduler: &str, job: &GroupName) -> StoreResult<()> {
        let blocked = BlockedJob::new(scheduler, job.clone());
        let doc = BlockedJobDoc::new(blocked);
        let id = doc.id.clone();
        match self.session.insert_new(&self.session.blocked_jobs(), &doc, "blocked_job", id).await {
            Ok(()) => Ok(()),
            // Already blocked is not an error: blocking is idempotent.
            Err(jobstore_core::StoreError::ObjectAlreadyExists { .. }) => Ok(()),
            Err(other) => Err(other),
        }
    }

    async fn release(&self, scheduler: &str, job: &GroupName) -> StoreResult<()> {
        let id = jobstore_core::BlockedJob::new(scheduler, job.clone()).doc_id();
        self.session.delete_by_id(&self.session.blocked_jobs(), &id).await?;
        Ok(())
    }

    async fn release_all(&self, scheduler: &str) -> StoreResult<()> {
        self.session
            .blocked_jobs()
            .delete_many(doc! { "scheduler": scheduler })
            .await
            .map_err(transient)?;
        Ok(())
    }

    async fn is_blocked(&self, scheduler: &str, job: &GroupName) -> StoreResult<bool> {
        let id = jobstore_core::BlockedJob::new(scheduler, job.clone()).doc_id();
        self.session.exists(&self.session.blocked_jobs(), &id).await
    }

    async fn list_blocked(&self, scheduler: &str) -> StoreResult<Vec<GroupName>> {
        let mut cursor = self
            .session
            .blocked_jobs()
            .find(doc! { "scheduler": scheduler })
            .await
            .map_err(transient)?;
        let mut jobs = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(transient)? {
            jobs.push(doc.blocked.job);
        }
        Ok(jobs)
    }
}

#[cfg(test)]
#[path = "block_repo_tests.rs"]
mod tests;
