// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Paused-Group Registry: persists paused trigger-group and job-group
//! markers, probed whenever a trigger is created or state-changed
//! (spec.md §4.3).

use crate::codec::{PausedJobGroupDoc, PausedTriggerGroupDoc};
use crate::session::SessionHelper;
use futures_util::TryStreamExt;
use jobstore_core::{GroupMatcher, PausedJobGroup, PausedTriggerGroup, StoreResult};
use bson::doc;

pub struct PausedGroupRegistry {
    session: SessionHelper,
}

impl PausedGroupRegistry {
    pub fn new(session: SessionHelper) -> Self {
        Self { session }
    }

    pub async fn is_trigger_group_paused(&self, scheduler: &str, group: &str) -> StoreResult<bool> {
        let id = jobstore_core::key::paused_trigger_group_doc_id(scheduler, group);
        self.session.exists(&self.session.paused_trigger_groups(), &id).await
    }

    pub async fn is_job_group_paused(&self, scheduler: &str, group: &str) -> StoreResult<bool> {
        let id = jobstore_core::key::paused_job_group_doc_id(scheduler, group);
        self.session.exists(&self.session.paused_job_groups(), &id).await
    }

    pub async fn pause_trigger_group(&self, scheduler: &str, group: &str) -> StoreResult<()> {
        let doc = PausedTriggerGroupDoc::new(PausedTriggerGroup::new(scheduler, group));
        match self
            .session
            .insert_new(&self.session.paused_trigger_groups(), &doc, "paused_trigger_group", doc.id.clone())
            .await
        {
            Ok(()) | Err(jobstore_core::StoreError::ObjectAlreadyExists { .. }) => Ok(()),
            Err(other) => Err(other),
        }
    }

    pub async fn resume_trigger_group(&self, scheduler: &str, group: &str) -> StoreResult<()> {
        let id = jobstore_core::key::paused_trigger_group_doc_id(scheduler, group);
        self.session.delete_by_id(&self.session.paused_trigger_groups(), &id).await?;
        Ok(())
    }

    pub async fn pause_job_group(&self, scheduler: &str, group: &str) -> StoreResult<()> {
        let doc = PausedJobGroupDoc::new(PausedJobGroup::new(scheduler, group));
        match self
            .session
            .insert_new(&self.session.paused_job_groups(), &doc, "paused_job_group", doc.id.clone())
            .await
        {
            Ok(()) | Err(jobstore_core::StoreError::ObjectAlreadyExists { .. }) => Ok(()),
            Err(other) => Err(other),
        }
    }

    pub async fn resume_job_group(&self, scheduler: &str, group: &str) -> StoreResult<()> {
        let id = jobstore_core::key::paused_job_group_doc_id(scheduler, group);
        self.session.delete_by_id(&self.session.paused_job_groups(), &id).await?;
        Ok(())
    }

    pub async fn list_paused_trigger_groups(&self, scheduler: &str) -> StoreResult<Vec<String>> {
        let mut cursor = self
            .session
            .paused_trigger_groups()
            .find(doc! { "scheduler": scheduler })
            .await
            .map_err(crate::session::transient)?;
        let mut groups = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(crate::session::transient)? {
            groups.push(doc.marker.group);
        }
        Ok(groups)
    }

    pub async fn list_paused_job_groups(&self, scheduler: &str) -> StoreResult<Vec<String>> {
        let mut cursor = self
            .session
            .paused_job_groups()
            .find(doc! { "scheduler": scheduler })
            .await
            .map_err(crate::session::transient)?;
        let mut groups = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(crate::session::transient)? {
            groups.push(doc.marker.group);
        }
        Ok(groups)
    }

    /// Filter a set of known group names by `matcher`. Equality/StartsWith/
    /// EndsWith/Anything would normally compile to a database-side
    /// predicate on the caller's distinct-groups query; `Contains` has no
    /// index-friendly form and always falls back to this client-side scan
    /// (spec.md §9 Open Question ii).
    pub fn matching_groups<'a>(matcher: &GroupMatcher, groups: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        groups.into_iter().filter(|g| matcher.matches(g)).map(String::from).collect()
    }
}

#[cfg(test)]
#[path = "paused_tests.rs"]
mod tests;
