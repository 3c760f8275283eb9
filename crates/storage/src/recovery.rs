// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery (spec.md §4.8): run once, at attach time, when the scheduler
//! record already existed — meaning a previous instance died mid-flight.

use crate::block_repo::BlockRepository;
use crate::codec::{JobDoc, TriggerDoc};
use crate::session::{transient, SessionHelper};
use bson::doc;
use futures_util::TryStreamExt;
use jobstore_core::{ScheduleCalculator, StoreError, StoreResult, TriggerState};

pub struct Recovery<'a> {
    session: &'a SessionHelper,
    calculator: &'a dyn ScheduleCalculator,
    block_repo: &'a dyn BlockRepository,
}

impl<'a> Recovery<'a> {
    pub fn new(session: &'a SessionHelper, calculator: &'a dyn ScheduleCalculator, block_repo: &'a dyn BlockRepository) -> Self {
        Self { session, calculator, block_repo }
    }

    pub async fn recover(&self, scheduler: &str) -> StoreResult<()> {
        self.reset_interrupted(scheduler)
            .await
            .map_err(|e| wrap(e, "resetting interrupted triggers"))?;
        self.block_repo
            .release_all(scheduler)
            .await
            .map_err(|e| wrap(e, "releasing blocks"))?;
        self.clean_completed(scheduler)
            .await
            .map_err(|e| wrap(e, "cleaning completed triggers"))?;
        self.recompute_recovery_jobs(scheduler)
            .await
            .map_err(|e| wrap(e, "recomputing recovery-requested jobs"))?;
        Ok(())
    }

    async fn triggers_in_states(&self, scheduler: &str, states: &[TriggerState]) -> StoreResult<Vec<TriggerDoc>> {
        let state_strings: Vec<String> = states.iter().map(|s| s.to_string()).collect();
        let filter = doc! {
            "scheduler": scheduler,
            "state": { "$in": state_strings },
        };
        let mut cursor = self.session.triggers().find(filter).await.map_err(transient)?;
        let mut docs = Vec::new();
        while let Some(d) = cursor.try_next().await.map_err(transient)? {
            docs.push(d);
        }
        Ok(docs)
    }

    async fn reset_interrupted(&self, scheduler: &str) -> StoreResult<()> {
        let triggers = self.session.triggers();
        let stuck = self.triggers_in_states(scheduler, &[TriggerState::Acquired, TriggerState::Blocked]).await?;
        for doc in stuck {
            let mut doc = doc;
            doc.trigger.state = TriggerState::Waiting;
            doc.trigger.fire_instance_id = None;
            let next_version = doc.next_version();
            let persisted = TriggerDoc { version: next_version, ..doc };
            self.session.cas_update(&triggers, &persisted.id, next_version - 1, &persisted).await?;
        }
        Ok(())
    }

    async fn other_triggers_remain(&self, scheduler: &str, job_key: &jobstore_core::GroupName, excluding_id: &str) -> StoreResult<bool> {
        let filter = doc! {
            "scheduler": scheduler,
            "job_key.name": job_key.name.as_str(),
            "job_key.group": job_key.group.as_str(),
            "_id": { "$ne": excluding_id },
        };
        let count = self.session.triggers().count_documents(filter).await.map_err(transient)?;
        Ok(count > 0)
    }

    async fn clean_completed(&self, scheduler: &str) -> StoreResult<()> {
        let completed = self.triggers_in_states(scheduler, &[TriggerState::Complete]).await?;
        for doc in completed {
            let trigger_id = doc.id.clone();
            let job_id = doc.trigger.job_key.doc_id(scheduler);
            if let Some(job_doc) = self.session.find_by_id::<JobDoc>(&self.session.jobs(), &job_id).await? {
                if !job_doc.job.durable && !self.other_triggers_remain(scheduler, &doc.trigger.job_key, &trigger_id).await? {
                    self.session.delete_by_id(&self.session.jobs(), &job_id).await?;
                }
            }
            self.session.delete_by_id(&self.session.triggers(), &trigger_id).await?;
        }
        Ok(())
    }

    async fn recompute_recovery_jobs(&self, scheduler: &str) -> StoreResult<()> {
        let filter = doc! { "scheduler": scheduler, "requests_recovery": true };
        let mut cursor = self.session.jobs().find(filter).await.map_err(transient)?;
        let mut jobs = Vec::new();
        while let Some(d) = cursor.try_next().await.map_err(transient)? {
            jobs.push(d);
        }

        let triggers = self.session.triggers();
        for job_doc in jobs {
            let job_filter = doc! {
                "scheduler": scheduler,
                "job_key.name": job_doc.job.key.name.as_str(),
                "job_key.group": job_doc.job.key.group.as_str(),
            };
            let mut cursor = triggers.find(job_filter).await.map_err(transient)?;
            let mut job_triggers = Vec::new();
            while let Some(d) = cursor.try_next().await.map_err(transient)? {
                job_triggers.push(d);
            }
            for doc in job_triggers {
                let mut doc = doc;
                let calendar_name = doc.trigger.calendar_name.clone();
                let calendar = self.load_calendar(scheduler, &calendar_name).await?;
                let next_fire = self.calculator.compute_first_fire_time(&doc.trigger, calendar.as_ref());
                if next_fire != doc.trigger.next_fire_time {
                    doc.trigger.next_fire_time = next_fire;
                    let next_version = doc.next_version();
                    let persisted = TriggerDoc { version: next_version, ..doc };
                    self.session.cas_update(&triggers, &persisted.id, next_version - 1, &persisted).await?;
                }
            }
        }
        Ok(())
    }

    async fn load_calendar(&self, scheduler: &str, name: &Option<String>) -> StoreResult<Option<jobstore_core::Calendar>> {
        let Some(name) = name else { return Ok(None) };
        let id = jobstore_core::key::calendar_doc_id(scheduler, name);
        let doc: Option<crate::codec::CalendarDoc> = self.session.find_by_id(&self.session.calendars(), &id).await?;
        Ok(doc.map(|d| d.calendar))
    }
}

/// Recovery failures wrap as `ConfigurationFailure` (spec.md §7: "recovery
/// failure wrapping any underlying error"), not as a persistence failure —
/// the underlying error is preserved as the `#[source]`.
fn wrap(err: StoreError, context: &str) -> StoreError {
    tracing::error!(context, %err, "recovery step failed");
    StoreError::ConfigurationFailure(Box::new(err))
}

// No colocated unit tests: recovery's guarantees (interrupted-trigger reset,
// orphan cleanup, recovery-job recompute) are observable only against a real
// collection under concurrent writers. Covered by the runtime's own
// integration suite against a live `mongod` — see DESIGN.md.
