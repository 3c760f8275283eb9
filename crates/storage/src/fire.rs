// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire & Complete Protocol (spec.md §4.7): `TriggersFired`,
//! `ReleaseAcquiredTrigger`, `TriggeredJobComplete`.

use crate::block_repo::BlockRepository;
use crate::codec::{CalendarDoc, JobDoc, TriggerDoc};
use crate::session::{transient, SessionHelper};
use crate::signaler::Signaler;
use bson::doc;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use jobstore_core::{
    Calendar, CompletionInstruction, GroupName, Job, ScheduleCalculator, StoreError, StoreResult,
    Trigger, TriggerFiredBundle, TriggerFiredResult, TriggerState,
};

pub struct FireProtocol<'a> {
    session: &'a SessionHelper,
    calculator: &'a dyn ScheduleCalculator,
    signaler: &'a dyn Signaler,
    block_repo: &'a dyn BlockRepository,
}

impl<'a> FireProtocol<'a> {
    pub fn new(
        session: &'a SessionHelper,
        calculator: &'a dyn ScheduleCalculator,
        signaler: &'a dyn Signaler,
        block_repo: &'a dyn BlockRepository,
    ) -> Self {
        Self { session, calculator, signaler, block_repo }
    }

    async fn load_calendar(&self, scheduler: &str, name: &Option<String>) -> StoreResult<Option<Calendar>> {
        let Some(name) = name else { return Ok(None) };
        let id = jobstore_core::key::calendar_doc_id(scheduler, name);
        let doc: Option<CalendarDoc> = self.session.find_by_id(&self.session.calendars(), &id).await?;
        Ok(doc.map(|d| d.calendar))
    }

    /// Find every other trigger of `job_key` and fold the block condition
    /// into their state (Waiting→Blocked, Paused→PausedAndBlocked).
    async fn block_siblings(&self, scheduler: &str, job_key: &GroupName, excluding_id: &str) -> StoreResult<()> {
        self.transition_siblings(scheduler, job_key, excluding_id, true).await
    }

    /// Inverse of [`Self::block_siblings`]: Blocked→Waiting,
    /// PausedAndBlocked→Paused.
    async fn unblock_siblings(&self, scheduler: &str, job_key: &GroupName, excluding_id: &str) -> StoreResult<()> {
        self.transition_siblings(scheduler, job_key, excluding_id, false).await
    }

    async fn transition_siblings(
        &self,
        scheduler: &str,
        job_key: &GroupName,
        excluding_id: &str,
        blocking: bool,
    ) -> StoreResult<()> {
        let filter = doc! {
            "scheduler": scheduler,
            "job_key.name": job_key.name.as_str(),
            "job_key.group": job_key.group.as_str(),
            "_id": { "$ne": excluding_id },
        };
        let triggers = self.session.triggers();
        let mut cursor = triggers.find(filter).await.map_err(transient)?;
        let mut siblings = Vec::new();
        while let Some(d) = cursor.try_next().await.map_err(transient)? {
            siblings.push(d);
        }
        for sibling in siblings {
            let new_state = match (sibling.trigger.state, blocking) {
                (TriggerState::Waiting, true) => Some(TriggerState::Blocked),
                (TriggerState::Paused, true) => Some(TriggerState::PausedAndBlocked),
                (TriggerState::Blocked, false) => Some(TriggerState::Waiting),
                (TriggerState::PausedAndBlocked, false) => Some(TriggerState::Paused),
                _ => None,
            };
            if let Some(state) = new_state {
                let mut sibling = sibling;
                sibling.trigger.state = state;
                let next_version = sibling.next_version();
                let persisted = TriggerDoc { version: next_version, ..sibling };
                self.session.cas_update(&triggers, &persisted.id, next_version - 1, &persisted).await?;
            }
        }
        Ok(())
    }

    /// Count triggers still referencing `job_key`, excluding `excluding_id`.
    async fn other_triggers_remain(&self, scheduler: &str, job_key: &GroupName, excluding_id: &str) -> StoreResult<bool> {
        let filter = doc! {
            "scheduler": scheduler,
            "job_key.name": job_key.name.as_str(),
            "job_key.group": job_key.group.as_str(),
            "_id": { "$ne": excluding_id },
        };
        let count = self.session.triggers().count_documents(filter).await.map_err(transient)?;
        Ok(count > 0)
    }

    /// Delete `job_key`'s job document if it is non-durable and no trigger
    /// references it anymore (spec.md §3 invariant 2).
    async fn maybe_delete_orphaned_job(&self, scheduler: &str, job_key: &GroupName, excluding_trigger_id: &str) -> StoreResult<()> {
        let job_id = job_key.doc_id(scheduler);
        let Some(job_doc) = self.session.find_by_id::<JobDoc>(&self.session.jobs(), &job_id).await? else {
            return Ok(());
        };
        if job_doc.job.durable {
            return Ok(());
        }
        if self.other_triggers_remain(scheduler, job_key, excluding_trigger_id).await? {
            return Ok(());
        }
        self.session.delete_by_id(&self.session.jobs(), &job_id).await?;
        self.signaler.notify_scheduler_listeners_job_deleted(job_key).await;
        Ok(())
    }

    pub async fn triggers_fired(
        &self,
        scheduler: &str,
        trigger_keys: &[GroupName],
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<TriggerFiredResult>> {
        let triggers = self.session.triggers();
        let mut results = Vec::with_capacity(trigger_keys.len());

        for key in trigger_keys {
            let id = key.doc_id(scheduler);
            let Some(doc) = self.session.find_by_id::<TriggerDoc>(&triggers, &id).await? else {
                results.push(TriggerFiredResult::NotAcquired);
                continue;
            };
            if doc.trigger.state != TriggerState::Acquired {
                results.push(TriggerFiredResult::NotAcquired);
                continue;
            }
            if self.block_repo.is_blocked(scheduler, &doc.trigger.job_key).await? {
                results.push(TriggerFiredResult::JobBlocked);
                continue;
            }
            let job_id = doc.trigger.job_key.doc_id(scheduler);
            let Some(job_doc) = self.session.find_by_id::<JobDoc>(&self.session.jobs(), &job_id).await? else {
                self.block_repo.release(scheduler, &doc.trigger.job_key).await?;
                results.push(TriggerFiredResult::JobDeleted);
                continue;
            };

            let calendar = self.load_calendar(scheduler, &doc.trigger.calendar_name).await?;
            let mut trigger = doc.trigger.clone();
            let previous_fire_time = trigger.previous_fire_time;
            let fire_time = trigger.next_fire_time.unwrap_or(now);
            self.calculator.triggered(&mut trigger, calendar.as_ref());
            let next_fire_time = trigger.next_fire_time;

            if job_doc.job.concurrent_execution_disallowed {
                self.block_siblings(scheduler, &doc.trigger.job_key, &id).await?;
                self.block_repo.block(scheduler, &doc.trigger.job_key).await?;
            }
            trigger.state = TriggerState::Executing;

            let next_version = doc.next_version();
            let persisted = TriggerDoc { version: next_version, trigger: trigger.clone(), ..doc };
            self.session.cas_update(&triggers, &persisted.id, next_version - 1, &persisted).await?;

            results.push(TriggerFiredResult::Fired(TriggerFiredBundle {
                job: job_doc.job,
                trigger,
                calendar,
                fire_time,
                previous_fire_time,
                next_fire_time,
            }));
        }

        if results.len() != trigger_keys.len() {
            return Err(StoreError::UnreachableState(
                "TriggersFired result count diverged from request count".to_string(),
            ));
        }
        Ok(results)
    }

    pub async fn release_acquired_trigger(&self, scheduler: &str, trigger_key: &GroupName) -> StoreResult<()> {
        let triggers = self.session.triggers();
        let id = trigger_key.doc_id(scheduler);
        let Some(doc) = self.session.find_by_id::<TriggerDoc>(&triggers, &id).await? else {
            return Ok(());
        };
        if doc.trigger.state != TriggerState::Acquired {
            return Ok(());
        }
        let is_blocked = self.block_repo.is_blocked(scheduler, &doc.trigger.job_key).await?;
        let mut doc = doc;
        doc.trigger.state = if is_blocked { TriggerState::Blocked } else { TriggerState::Waiting };
        let next_version = doc.next_version();
        let persisted = TriggerDoc { version: next_version, ..doc };
        self.session.cas_update(&triggers, &persisted.id, next_version - 1, &persisted).await
    }

    /// `trigger` is the runtime's in-memory, already-advanced copy from the
    /// fired bundle — used to decide the `DeleteTrigger` branch's signaling
    /// rule (spec.md §9 Open Question i: both delete sub-branches signal).
    pub async fn triggered_job_complete(
        &self,
        scheduler: &str,
        trigger: &Trigger,
        job_detail: &Job,
        instruction: CompletionInstruction,
    ) -> StoreResult<()> {
        let triggers = self.session.triggers();
        let trigger_id = trigger.doc_id();
        let job_id = job_detail.doc_id();

        let stored_trigger = self.session.find_by_id::<TriggerDoc>(&triggers, &trigger_id).await?;
        let stored_job = self.session.find_by_id::<JobDoc>(&self.session.jobs(), &job_id).await?;

        self.block_repo.release(scheduler, &job_detail.key).await?;

        if let Some(job_doc) = stored_job {
            if job_detail.persist_data_after_execution {
                let mut job_doc = job_doc;
                job_doc.job.data = job_detail.data.clone();
                let next_version = job_doc.next_version();
                let persisted = JobDoc { version: next_version, ..job_doc };
                self.session.cas_update(&self.session.jobs(), &persisted.id, next_version - 1, &persisted).await?;
            }
        }
        if job_detail.concurrent_execution_disallowed {
            self.unblock_siblings(scheduler, &job_detail.key, &trigger_id).await?;
        }

        let mut signal = false;

        match instruction {
            CompletionInstruction::NoInstruction | CompletionInstruction::ReExecuteJob => {
                if let Some(doc) = stored_trigger {
                    if doc.trigger.state == TriggerState::Executing {
                        let mut doc = doc;
                        doc.trigger.state = TriggerState::Waiting;
                        let next_version = doc.next_version();
                        let persisted = TriggerDoc { version: next_version, ..doc };
                        self.session.cas_update(&triggers, &persisted.id, next_version - 1, &persisted).await?;
                    }
                }
            }
            CompletionInstruction::DeleteTrigger => {
                let stored_has_no_next_fire =
                    stored_trigger.as_ref().is_none_or(|d| d.trigger.next_fire_time.is_none());
                signal = !(trigger.next_fire_time.is_none() && stored_has_no_next_fire);
                self.session.delete_by_id(&triggers, &trigger_id).await?;
                self.maybe_delete_orphaned_job(scheduler, &job_detail.key, &trigger_id).await?;
            }
            CompletionInstruction::SetTriggerComplete | CompletionInstruction::SetTriggerError => {
                if let Some(doc) = stored_trigger {
                    let mut doc = doc;
                    doc.trigger.state = if instruction == CompletionInstruction::SetTriggerComplete {
                        TriggerState::Complete
                    } else {
                        TriggerState::Error
                    };
                    let next_version = doc.next_version();
                    let persisted = TriggerDoc { version: next_version, ..doc };
                    self.session.cas_update(&triggers, &persisted.id, next_version - 1, &persisted).await?;
                }
                signal = true;
            }
            CompletionInstruction::SetAllJobTriggersComplete
            | CompletionInstruction::SetAllJobTriggersError => {
                let target = if instruction == CompletionInstruction::SetAllJobTriggersComplete {
                    TriggerState::Complete
                } else {
                    TriggerState::Error
                };
                self.set_all_job_triggers(scheduler, &job_detail.key, target).await?;
                signal = true;
            }
        }

        if signal {
            self.signaler.signal_scheduling_change(None).await;
        }
        Ok(())
    }

    async fn set_all_job_triggers(&self, scheduler: &str, job_key: &GroupName, target: TriggerState) -> StoreResult<()> {
        let filter = doc! {
            "scheduler": scheduler,
            "job_key.name": job_key.name.as_str(),
            "job_key.group": job_key.group.as_str(),
        };
        let triggers = self.session.triggers();
        let mut cursor = triggers.find(filter).await.map_err(transient)?;
        let mut all = Vec::new();
        while let Some(d) = cursor.try_next().await.map_err(transient)? {
            all.push(d);
        }
        for doc in all {
            let mut doc = doc;
            doc.trigger.state = target;
            let next_version = doc.next_version();
            let persisted = TriggerDoc { version: next_version, ..doc };
            self.session.cas_update(&triggers, &persisted.id, next_version - 1, &persisted).await?;
        }
        Ok(())
    }
}

// No colocated unit tests: every path needs a real collection to exercise
// the CAS interactions it coordinates. Covered by the runtime's own
// integration suite against a live `mongod` — see DESIGN.md.
