// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The public operation surface (spec.md §6): `MongoJobStore`.
//!
//! Every mutating operation is wrapped by [`crate::retry::with_retry`]
//! (spec.md §4.9); retrieval-only operations are not, except
//! `GetTriggerState`, which may itself mutate a misfired trigger in place
//! (spec.md §3 invariant 5) and so needs the same CAS-loss retry.

use crate::acquire::AcquisitionEngine;
use crate::block_repo::{BlockRepository, InMemoryBlockRepository, PersistedBlockRepository};
use crate::codec::{CalendarDoc, JobDoc, SchedulerDoc, TriggerDoc};
use crate::config::StoreConfig;
use crate::fire::FireProtocol;
use crate::misfire::{MisfireOutcome, MisfireReconciler};
use crate::paused::PausedGroupRegistry;
use crate::recovery::Recovery;
use crate::retry::with_retry;
use crate::session::{transient, SessionHelper};
use crate::signaler::{JobTypeLoader, Signaler};
use bson::{doc, Document};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use jobstore_core::{
    Calendar, CompletionInstruction, ExternalTriggerState, FireInstanceIdGenerator, GroupMatcher,
    GroupName, Job, ScheduleCalculator, SchedulerLifecycle, SchedulerRecord, StoreError,
    StoreResult, Trigger, TriggerFiredResult, TriggerState,
};
use std::sync::Arc;

/// Document-store job-scheduler backend. One instance per attached
/// scheduler process; `scheduler` (the `InstanceName`) is passed explicitly
/// to every call rather than held as a single-tenant field, since one
/// process may in principle attach more than one named scheduler against
/// the same database.
pub struct MongoJobStore {
    session: SessionHelper,
    calculator: Arc<dyn ScheduleCalculator>,
    signaler: Arc<dyn Signaler>,
    type_loader: Arc<dyn JobTypeLoader>,
    block_repo: Arc<dyn BlockRepository>,
    paused: PausedGroupRegistry,
    fire_instance_ids: FireInstanceIdGenerator,
    retry_cap: u32,
}

impl MongoJobStore {
    /// Connect to the configured database and perform `Initialize` +
    /// attach (spec.md §6, §4.8).
    pub async fn connect(
        config: StoreConfig,
        calculator: Arc<dyn ScheduleCalculator>,
        type_loader: Arc<dyn JobTypeLoader>,
        signaler: Arc<dyn Signaler>,
    ) -> StoreResult<Self> {
        let session = SessionHelper::connect(config).await?;
        Self::initialize(session, calculator, type_loader, signaler).await
    }

    /// `Initialize(typeLoader, signaler)` against an already-open session.
    /// Schedule math (`ScheduleCalculator`) is a third collaborator this
    /// crate needs beyond the two spec.md names explicitly — see
    /// DESIGN.md.
    pub async fn initialize(
        session: SessionHelper,
        calculator: Arc<dyn ScheduleCalculator>,
        type_loader: Arc<dyn JobTypeLoader>,
        signaler: Arc<dyn Signaler>,
    ) -> StoreResult<Self> {
        let clustered = session.config().clustered;
        let block_repo: Arc<dyn BlockRepository> = if clustered {
            Arc::new(PersistedBlockRepository::new(session.clone()))
        } else {
            Arc::new(InMemoryBlockRepository::new())
        };
        let paused = PausedGroupRegistry::new(session.clone());
        let retry_cap = session.config().effective_retry_cap();

        let store = Self {
            session,
            calculator,
            signaler,
            type_loader,
            block_repo,
            paused,
            fire_instance_ids: FireInstanceIdGenerator::new(),
            retry_cap,
        };
        store.attach().await?;
        Ok(store)
    }

    /// Create (first attach) or recover (re-attach) the scheduler record,
    /// per spec.md §4.8.
    async fn attach(&self) -> StoreResult<()> {
        let instance_name = self.session.config().instance_name.clone();
        let now = Utc::now();
        let existing = self
            .session
            .find_by_id::<SchedulerDoc>(&self.session.schedulers(), &instance_name)
            .await?;

        match existing {
            Some(doc) => {
                let mut doc = doc;
                doc.record.checkin(now);
                doc.record.state = SchedulerLifecycle::Started;
                let next_version = doc.next_version();
                let persisted = SchedulerDoc { version: next_version, ..doc };
                self.session
                    .cas_update(&self.session.schedulers(), &persisted.id, next_version - 1, &persisted)
                    .await?;
                let recovery = Recovery::new(&self.session, self.calculator.as_ref(), self.block_repo.as_ref());
                recovery.recover(&instance_name).await
            }
            None => {
                let mut record = SchedulerRecord::new(instance_name, now);
                record.state = SchedulerLifecycle::Started;
                let doc = SchedulerDoc::new(record);
                match self
                    .session
                    .insert_new(&self.session.schedulers(), &doc, "scheduler", doc.id.clone())
                    .await
                {
                    Ok(()) | Err(StoreError::ObjectAlreadyExists { .. }) => Ok(()),
                    Err(other) => Err(other),
                }
            }
        }
    }

    // ---- Lifecycle ---------------------------------------------------

    pub async fn scheduler_started(&self) -> StoreResult<()> {
        self.update_lifecycle(SchedulerLifecycle::Started).await
    }

    pub async fn scheduler_paused(&self) -> StoreResult<()> {
        self.update_lifecycle(SchedulerLifecycle::Paused).await
    }

    pub async fn scheduler_resumed(&self) -> StoreResult<()> {
        self.update_lifecycle(SchedulerLifecycle::Resumed).await
    }

    pub async fn shutdown(&self) -> StoreResult<()> {
        self.update_lifecycle(SchedulerLifecycle::Shutdown).await
    }

    async fn update_lifecycle(&self, state: SchedulerLifecycle) -> StoreResult<()> {
        with_retry(self.retry_cap, "update_lifecycle", || async {
            let instance_name = self.session.config().instance_name.clone();
            let Some(doc) = self.session.find_by_id::<SchedulerDoc>(&self.session.schedulers(), &instance_name).await?
            else {
                return Err(StoreError::UnreachableState(
                    "scheduler record missing after attach".to_string(),
                ));
            };
            let mut doc = doc;
            doc.record.state = state;
            doc.record.checkin(Utc::now());
            let next_version = doc.next_version();
            let persisted = SchedulerDoc { version: next_version, ..doc };
            self.session
                .cas_update(&self.session.schedulers(), &persisted.id, next_version - 1, &persisted)
                .await
        })
        .await
    }

    // ---- Storage -------------------------------------------------------

    pub async fn store_job(&self, job: Job, replace: bool) -> StoreResult<()> {
        with_retry(self.retry_cap, "store_job", || self.store_job_once(&job, replace)).await
    }

    async fn store_job_once(&self, job: &Job, replace: bool) -> StoreResult<()> {
        if self.session.config().validate_job_type && !self.type_loader.is_known(&job.job_type) {
            return Err(StoreError::JobPersistenceFailure(format!("unknown job type {}", job.job_type)));
        }
        let doc = JobDoc::new(job.clone());
        if replace {
            self.session.upsert(&self.session.jobs(), &doc.id, &doc).await
        } else {
            self.session.insert_new(&self.session.jobs(), &doc, "job", doc.id.clone()).await
        }
    }

    pub async fn store_job_and_trigger(&self, job: Job, trigger: Trigger) -> StoreResult<()> {
        with_retry(self.retry_cap, "store_job_and_trigger", || async {
            self.store_job_once(&job, true).await?;
            self.store_trigger_once(&trigger, true).await
        })
        .await
    }

    pub async fn store_jobs_and_triggers(&self, jobs_and_triggers: Vec<(Job, Vec<Trigger>)>, replace: bool) -> StoreResult<()> {
        with_retry(self.retry_cap, "store_jobs_and_triggers", || async {
            for (job, triggers) in &jobs_and_triggers {
                self.store_job_once(job, replace).await?;
                for trigger in triggers {
                    self.store_trigger_once(trigger, replace).await?;
                }
            }
            Ok(())
        })
        .await
    }

    pub async fn store_trigger(&self, trigger: Trigger, replace: bool) -> StoreResult<()> {
        with_retry(self.retry_cap, "store_trigger", || self.store_trigger_once(&trigger, replace)).await
    }

    /// Always recomputes the initial Paused/Blocked fold (spec.md §3
    /// invariant 6) from current marker state rather than preserving
    /// whatever execution-state the caller's `Trigger` carries — see
    /// DESIGN.md's note on `ReplaceTrigger` semantics.
    async fn store_trigger_once(&self, trigger: &Trigger, replace: bool) -> StoreResult<()> {
        let scheduler = trigger.scheduler.clone();
        let job_id = trigger.job_key.doc_id(&scheduler);
        if self.session.find_by_id::<JobDoc>(&self.session.jobs(), &job_id).await?.is_none() {
            return Err(StoreError::JobPersistenceFailure(format!(
                "trigger {} references missing job {job_id}",
                trigger.key
            )));
        }

        let mut trigger = trigger.clone();
        let is_paused = self.paused.is_trigger_group_paused(&scheduler, &trigger.key.group).await?
            || self.paused.is_job_group_paused(&scheduler, &trigger.job_key.group).await?;
        let is_blocked = self.block_repo.is_blocked(&scheduler, &trigger.job_key).await?;
        trigger.state = TriggerState::initial(is_paused, is_blocked);

        let doc = TriggerDoc::new(trigger);
        if replace {
            self.session.upsert(&self.session.triggers(), &doc.id, &doc).await
        } else {
            self.session.insert_new(&self.session.triggers(), &doc, "trigger", doc.id.clone()).await
        }
    }

    pub async fn store_calendar(&self, name: &str, calendar: Calendar, replace: bool, update_triggers: bool) -> StoreResult<()> {
        with_retry(self.retry_cap, "store_calendar", || async {
            let doc = CalendarDoc::new(calendar.clone());
            if replace {
                self.session.upsert(&self.session.calendars(), &doc.id, &doc).await?;
            } else {
                self.session.insert_new(&self.session.calendars(), &doc, "calendar", doc.id.clone()).await?;
            }
            if update_triggers {
                self.recompute_triggers_for_calendar(&calendar.scheduler, name).await?;
            }
            Ok(())
        })
        .await
    }

    async fn recompute_triggers_for_calendar(&self, scheduler: &str, calendar_name: &str) -> StoreResult<()> {
        let calendar_id = jobstore_core::key::calendar_doc_id(scheduler, calendar_name);
        let calendar = self
            .session
            .find_by_id::<CalendarDoc>(&self.session.calendars(), &calendar_id)
            .await?
            .map(|d| d.calendar);

        let triggers = self.session.triggers();
        let filter = doc! { "scheduler": scheduler, "calendar_name": calendar_name };
        let mut cursor = triggers.find(filter).await.map_err(transient)?;
        let mut docs = Vec::new();
        while let Some(d) = cursor.try_next().await.map_err(transient)? {
            docs.push(d);
        }

        for doc in docs {
            let mut doc = doc;
            let next = self.calculator.compute_first_fire_time(&doc.trigger, calendar.as_ref());
            if next != doc.trigger.next_fire_time {
                doc.trigger.next_fire_time = next;
                let next_version = doc.next_version();
                let persisted = TriggerDoc { version: next_version, ..doc };
                self.session.cas_update(&triggers, &persisted.id, next_version - 1, &persisted).await?;
            }
        }
        Ok(())
    }

    // ---- Removal -------------------------------------------------------

    pub async fn remove_job(&self, scheduler: &str, key: &GroupName) -> StoreResult<bool> {
        with_retry(self.retry_cap, "remove_job", || self.remove_job_once(scheduler, key)).await
    }

    async fn remove_job_once(&self, scheduler: &str, key: &GroupName) -> StoreResult<bool> {
        let job_id = key.doc_id(scheduler);
        let filter = doc! {
            "scheduler": scheduler,
            "job_key.name": key.name.as_str(),
            "job_key.group": key.group.as_str(),
        };
        let triggers = self.session.triggers();
        let mut cursor = triggers.find(filter).await.map_err(transient)?;
        let mut ids = Vec::new();
        while let Some(d) = cursor.try_next().await.map_err(transient)? {
            ids.push(d.id);
        }
        for id in ids {
            self.session.delete_by_id(&triggers, &id).await?;
        }
        self.session.delete_by_id(&self.session.jobs(), &job_id).await
    }

    pub async fn remove_jobs(&self, scheduler: &str, keys: &[GroupName]) -> StoreResult<bool> {
        with_retry(self.retry_cap, "remove_jobs", || async {
            let mut all = true;
            for key in keys {
                all &= self.remove_job_once(scheduler, key).await?;
            }
            Ok(all)
        })
        .await
    }

    pub async fn remove_trigger(&self, scheduler: &str, key: &GroupName) -> StoreResult<bool> {
        with_retry(self.retry_cap, "remove_trigger", || self.remove_trigger_once(scheduler, key)).await
    }

    async fn remove_trigger_once(&self, scheduler: &str, key: &GroupName) -> StoreResult<bool> {
        let trigger_id = key.doc_id(scheduler);
        let Some(doc) = self.session.find_by_id::<TriggerDoc>(&self.session.triggers(), &trigger_id).await? else {
            return Ok(false);
        };
        let deleted = self.session.delete_by_id(&self.session.triggers(), &trigger_id).await?;
        if deleted {
            let job_id = doc.trigger.job_key.doc_id(scheduler);
            if let Some(job_doc) = self.session.find_by_id::<JobDoc>(&self.session.jobs(), &job_id).await? {
                if !job_doc.job.durable && !self.other_triggers_remain(scheduler, &doc.trigger.job_key, &trigger_id).await? {
                    self.session.delete_by_id(&self.session.jobs(), &job_id).await?;
                }
            }
        }
        Ok(deleted)
    }

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

    pub async fn remove_triggers(&self, scheduler: &str, keys: &[GroupName]) -> StoreResult<bool> {
        with_retry(self.retry_cap, "remove_triggers", || async {
            let mut all = true;
            for key in keys {
                all &= self.remove_trigger_once(scheduler, key).await?;
            }
            Ok(all)
        })
        .await
    }

    pub async fn remove_calendar(&self, scheduler: &str, name: &str) -> StoreResult<bool> {
        with_retry(self.retry_cap, "remove_calendar", || async {
            let id = jobstore_core::key::calendar_doc_id(scheduler, name);
            self.session.delete_by_id(&self.session.calendars(), &id).await
        })
        .await
    }

    pub async fn replace_trigger(&self, scheduler: &str, key: &GroupName, new_trigger: Trigger) -> StoreResult<bool> {
        with_retry(self.retry_cap, "replace_trigger", || async {
            let trigger_id = key.doc_id(scheduler);
            if self.session.find_by_id::<TriggerDoc>(&self.session.triggers(), &trigger_id).await?.is_none() {
                return Ok(false);
            }
            if new_trigger.key != *key {
                self.session.delete_by_id(&self.session.triggers(), &trigger_id).await?;
            }
            self.store_trigger_once(&new_trigger, true).await?;
            Ok(true)
        })
        .await
    }

    pub async fn clear_all_scheduling_data(&self, scheduler: &str) -> StoreResult<()> {
        with_retry(self.retry_cap, "clear_all_scheduling_data", || async {
            let filter = doc! { "scheduler": scheduler };
            self.session.jobs().delete_many(filter.clone()).await.map_err(transient)?;
            self.session.triggers().delete_many(filter.clone()).await.map_err(transient)?;
            self.session.calendars().delete_many(filter.clone()).await.map_err(transient)?;
            self.session.paused_trigger_groups().delete_many(filter.clone()).await.map_err(transient)?;
            self.session.paused_job_groups().delete_many(filter).await.map_err(transient)?;
            self.block_repo.release_all(scheduler).await?;
            Ok(())
        })
        .await
    }

    // ---- Retrieval -------------------------------------------------------

    pub async fn retrieve_job(&self, scheduler: &str, key: &GroupName) -> StoreResult<Option<Job>> {
        let id = key.doc_id(scheduler);
        Ok(self.session.find_by_id::<JobDoc>(&self.session.jobs(), &id).await?.map(|d| d.job))
    }

    pub async fn retrieve_trigger(&self, scheduler: &str, key: &GroupName) -> StoreResult<Option<Trigger>> {
        let id = key.doc_id(scheduler);
        Ok(self.session.find_by_id::<TriggerDoc>(&self.session.triggers(), &id).await?.map(|d| d.trigger))
    }

    pub async fn retrieve_calendar(&self, scheduler: &str, name: &str) -> StoreResult<Option<Calendar>> {
        let id = jobstore_core::key::calendar_doc_id(scheduler, name);
        Ok(self.session.find_by_id::<CalendarDoc>(&self.session.calendars(), &id).await?.map(|d| d.calendar))
    }

    pub async fn calendar_exists(&self, scheduler: &str, name: &str) -> StoreResult<bool> {
        let id = jobstore_core::key::calendar_doc_id(scheduler, name);
        self.session.exists(&self.session.calendars(), &id).await
    }

    pub async fn job_exists(&self, scheduler: &str, key: &GroupName) -> StoreResult<bool> {
        self.session.exists(&self.session.jobs(), &key.doc_id(scheduler)).await
    }

    pub async fn trigger_exists(&self, scheduler: &str, key: &GroupName) -> StoreResult<bool> {
        self.session.exists(&self.session.triggers(), &key.doc_id(scheduler)).await
    }

    pub async fn get_number_of_jobs(&self, scheduler: &str) -> StoreResult<u64> {
        self.session.jobs().count_documents(doc! { "scheduler": scheduler }).await.map_err(transient)
    }

    pub async fn get_number_of_triggers(&self, scheduler: &str) -> StoreResult<u64> {
        self.session.triggers().count_documents(doc! { "scheduler": scheduler }).await.map_err(transient)
    }

    pub async fn get_number_of_calendars(&self, scheduler: &str) -> StoreResult<u64> {
        self.session.calendars().count_documents(doc! { "scheduler": scheduler }).await.map_err(transient)
    }

    pub async fn get_job_keys(&self, scheduler: &str, matcher: &GroupMatcher) -> StoreResult<Vec<GroupName>> {
        if matcher.operator == jobstore_core::MatchOperator::Equality {
            let filter = doc! { "scheduler": scheduler, "key.group": matcher.compare_to.as_str() };
            return self.collect_job_keys(filter).await;
        }
        let all = self.collect_job_keys(doc! { "scheduler": scheduler }).await?;
        Ok(all.into_iter().filter(|k| matcher.matches(&k.group)).collect())
    }

    async fn collect_job_keys(&self, filter: Document) -> StoreResult<Vec<GroupName>> {
        let mut cursor = self.session.jobs().find(filter).await.map_err(transient)?;
        let mut keys = Vec::new();
        while let Some(d) = cursor.try_next().await.map_err(transient)? {
            keys.push(d.job.key);
        }
        Ok(keys)
    }

    pub async fn get_trigger_keys(&self, scheduler: &str, matcher: &GroupMatcher) -> StoreResult<Vec<GroupName>> {
        if matcher.operator == jobstore_core::MatchOperator::Equality {
            let filter = doc! { "scheduler": scheduler, "key.group": matcher.compare_to.as_str() };
            return self.collect_trigger_keys(filter).await;
        }
        let all = self.collect_trigger_keys(doc! { "scheduler": scheduler }).await?;
        Ok(all.into_iter().filter(|k| matcher.matches(&k.group)).collect())
    }

    async fn collect_trigger_keys(&self, filter: Document) -> StoreResult<Vec<GroupName>> {
        let mut cursor = self.session.triggers().find(filter).await.map_err(transient)?;
        let mut keys = Vec::new();
        while let Some(d) = cursor.try_next().await.map_err(transient)? {
            keys.push(d.trigger.key);
        }
        Ok(keys)
    }

    pub async fn get_job_group_names(&self, scheduler: &str) -> StoreResult<Vec<String>> {
        let values = self
            .session
            .jobs()
            .distinct("key.group", doc! { "scheduler": scheduler })
            .await
            .map_err(transient)?;
        Ok(values.into_iter().filter_map(|b| b.as_str().map(String::from)).collect())
    }

    pub async fn get_trigger_group_names(&self, scheduler: &str) -> StoreResult<Vec<String>> {
        let values = self
            .session
            .triggers()
            .distinct("key.group", doc! { "scheduler": scheduler })
            .await
            .map_err(transient)?;
        Ok(values.into_iter().filter_map(|b| b.as_str().map(String::from)).collect())
    }

    pub async fn get_calendar_names(&self, scheduler: &str) -> StoreResult<Vec<String>> {
        let values = self
            .session
            .calendars()
            .distinct("name", doc! { "scheduler": scheduler })
            .await
            .map_err(transient)?;
        Ok(values.into_iter().filter_map(|b| b.as_str().map(String::from)).collect())
    }

    pub async fn get_triggers_for_job(&self, scheduler: &str, job_key: &GroupName) -> StoreResult<Vec<Trigger>> {
        let filter = doc! {
            "scheduler": scheduler,
            "job_key.name": job_key.name.as_str(),
            "job_key.group": job_key.group.as_str(),
        };
        let mut cursor = self.session.triggers().find(filter).await.map_err(transient)?;
        let mut triggers = Vec::new();
        while let Some(d) = cursor.try_next().await.map_err(transient)? {
            triggers.push(d.trigger);
        }
        Ok(triggers)
    }

    /// Applies misfire reconciliation before returning a `Waiting` trigger's
    /// state (spec.md §3 invariant 5) — the only retrieval operation that
    /// can mutate, so it is the only one wrapped in the retry loop.
    pub async fn get_trigger_state(&self, scheduler: &str, key: &GroupName) -> StoreResult<Option<ExternalTriggerState>> {
        with_retry(self.retry_cap, "get_trigger_state", || async {
            let id = key.doc_id(scheduler);
            let Some(doc) = self.session.find_by_id::<TriggerDoc>(&self.session.triggers(), &id).await? else {
                return Ok(None);
            };
            if doc.trigger.state != TriggerState::Waiting {
                return Ok(Some(doc.trigger.state.into()));
            }

            let mut trigger = doc.trigger.clone();
            let calendar = self.load_calendar(scheduler, &trigger.calendar_name).await?;
            let reconciler = MisfireReconciler::new(self.calculator.as_ref(), self.signaler.as_ref());
            let now = Utc::now();
            let threshold = self.session.config().misfire_threshold_chrono();
            let outcome = reconciler.reconcile(&mut trigger, calendar.as_ref(), now, threshold).await;

            match outcome {
                MisfireOutcome::NotMisfired | MisfireOutcome::NoChange => Ok(Some(trigger.state.into())),
                MisfireOutcome::Advanced | MisfireOutcome::Finalized => {
                    let next_version = doc.next_version();
                    let persisted = TriggerDoc { version: next_version, trigger: trigger.clone(), ..doc };
                    self.session.cas_update(&self.session.triggers(), &persisted.id, next_version - 1, &persisted).await?;
                    if outcome == MisfireOutcome::Finalized {
                        self.signaler.signal_scheduling_change(None).await;
                    }
                    Ok(Some(trigger.state.into()))
                }
            }
        })
        .await
    }

    pub async fn get_paused_trigger_groups(&self, scheduler: &str) -> StoreResult<Vec<String>> {
        self.paused.list_paused_trigger_groups(scheduler).await
    }

    async fn load_calendar(&self, scheduler: &str, name: &Option<String>) -> StoreResult<Option<Calendar>> {
        let Some(name) = name else { return Ok(None) };
        let id = jobstore_core::key::calendar_doc_id(scheduler, name);
        let doc: Option<CalendarDoc> = self.session.find_by_id(&self.session.calendars(), &id).await?;
        Ok(doc.map(|d| d.calendar))
    }

    // ---- Pause/Resume -------------------------------------------------

    pub async fn pause_trigger(&self, scheduler: &str, key: &GroupName) -> StoreResult<()> {
        with_retry(self.retry_cap, "pause_trigger", || self.pause_trigger_once(scheduler, key)).await
    }

    async fn pause_trigger_once(&self, scheduler: &str, key: &GroupName) -> StoreResult<()> {
        let id = key.doc_id(scheduler);
        let Some(doc) = self.session.find_by_id::<TriggerDoc>(&self.session.triggers(), &id).await? else {
            return Ok(());
        };
        let new_state = match doc.trigger.state {
            TriggerState::Complete | TriggerState::Paused | TriggerState::PausedAndBlocked => return Ok(()),
            TriggerState::Blocked => TriggerState::PausedAndBlocked,
            _ => TriggerState::Paused,
        };
        let mut doc = doc;
        doc.trigger.state = new_state;
        let next_version = doc.next_version();
        let persisted = TriggerDoc { version: next_version, ..doc };
        self.session.cas_update(&self.session.triggers(), &persisted.id, next_version - 1, &persisted).await
    }

    pub async fn pause_triggers(&self, scheduler: &str, matcher: &GroupMatcher) -> StoreResult<Vec<String>> {
        with_retry(self.retry_cap, "pause_triggers", || async {
            let groups = self.matching_trigger_groups(scheduler, matcher).await?;
            for group in &groups {
                self.paused.pause_trigger_group(scheduler, group).await?;
            }
            for key in self.matching_trigger_keys(scheduler, &groups).await? {
                self.pause_trigger_once(scheduler, &key).await?;
            }
            Ok(groups)
        })
        .await
    }

    async fn matching_trigger_groups(&self, scheduler: &str, matcher: &GroupMatcher) -> StoreResult<Vec<String>> {
        let values = self
            .session
            .triggers()
            .distinct("key.group", doc! { "scheduler": scheduler })
            .await
            .map_err(transient)?;
        let all: Vec<String> = values.into_iter().filter_map(|b| b.as_str().map(String::from)).collect();
        Ok(PausedGroupRegistry::matching_groups(matcher, all.iter().map(String::as_str)))
    }

    async fn matching_job_groups(&self, scheduler: &str, matcher: &GroupMatcher) -> StoreResult<Vec<String>> {
        let values = self
            .session
            .jobs()
            .distinct("key.group", doc! { "scheduler": scheduler })
            .await
            .map_err(transient)?;
        let all: Vec<String> = values.into_iter().filter_map(|b| b.as_str().map(String::from)).collect();
        Ok(PausedGroupRegistry::matching_groups(matcher, all.iter().map(String::as_str)))
    }

    async fn matching_trigger_keys(&self, scheduler: &str, groups: &[String]) -> StoreResult<Vec<GroupName>> {
        if groups.is_empty() {
            return Ok(Vec::new());
        }
        let filter = doc! { "scheduler": scheduler, "key.group": { "$in": groups } };
        self.collect_trigger_keys(filter).await
    }

    async fn jobs_in_groups(&self, scheduler: &str, groups: &[String]) -> StoreResult<Vec<GroupName>> {
        if groups.is_empty() {
            return Ok(Vec::new());
        }
        let filter = doc! { "scheduler": scheduler, "key.group": { "$in": groups } };
        self.collect_job_keys(filter).await
    }

    pub async fn pause_job(&self, scheduler: &str, key: &GroupName) -> StoreResult<()> {
        with_retry(self.retry_cap, "pause_job", || async {
            for trigger in self.get_triggers_for_job(scheduler, key).await? {
                self.pause_trigger_once(scheduler, &trigger.key).await?;
            }
            Ok(())
        })
        .await
    }

    pub async fn pause_jobs(&self, scheduler: &str, matcher: &GroupMatcher) -> StoreResult<Vec<String>> {
        with_retry(self.retry_cap, "pause_jobs", || async {
            let groups = self.matching_job_groups(scheduler, matcher).await?;
            for group in &groups {
                self.paused.pause_job_group(scheduler, group).await?;
            }
            for job_key in self.jobs_in_groups(scheduler, &groups).await? {
                for trigger in self.get_triggers_for_job(scheduler, &job_key).await? {
                    self.pause_trigger_once(scheduler, &trigger.key).await?;
                }
            }
            Ok(groups)
        })
        .await
    }

    async fn resume_trigger_once(&self, scheduler: &str, key: &GroupName) -> StoreResult<()> {
        let id = key.doc_id(scheduler);
        let Some(doc) = self.session.find_by_id::<TriggerDoc>(&self.session.triggers(), &id).await? else {
            return Ok(());
        };
        if !doc.trigger.state.is_paused() {
            return Ok(());
        }
        let still_paused = self.paused.is_trigger_group_paused(scheduler, &doc.trigger.key.group).await?
            || self.paused.is_job_group_paused(scheduler, &doc.trigger.job_key.group).await?;
        if still_paused {
            return Ok(());
        }
        let is_blocked = self.block_repo.is_blocked(scheduler, &doc.trigger.job_key).await?;
        let mut doc = doc;
        doc.trigger.state = TriggerState::initial(false, is_blocked);
        let next_version = doc.next_version();
        let persisted = TriggerDoc { version: next_version, ..doc };
        self.session.cas_update(&self.session.triggers(), &persisted.id, next_version - 1, &persisted).await
    }

    pub async fn resume_trigger(&self, scheduler: &str, key: &GroupName) -> StoreResult<()> {
        with_retry(self.retry_cap, "resume_trigger", || self.resume_trigger_once(scheduler, key)).await
    }

    pub async fn resume_triggers(&self, scheduler: &str, matcher: &GroupMatcher) -> StoreResult<Vec<String>> {
        with_retry(self.retry_cap, "resume_triggers", || async {
            let groups = self.matching_trigger_groups(scheduler, matcher).await?;
            for group in &groups {
                self.paused.resume_trigger_group(scheduler, group).await?;
            }
            for key in self.matching_trigger_keys(scheduler, &groups).await? {
                self.resume_trigger_once(scheduler, &key).await?;
            }
            Ok(groups)
        })
        .await
    }

    pub async fn resume_job(&self, scheduler: &str, key: &GroupName) -> StoreResult<()> {
        with_retry(self.retry_cap, "resume_job", || async {
            for trigger in self.get_triggers_for_job(scheduler, key).await? {
                self.resume_trigger_once(scheduler, &trigger.key).await?;
            }
            Ok(())
        })
        .await
    }

    pub async fn resume_jobs(&self, scheduler: &str, matcher: &GroupMatcher) -> StoreResult<Vec<String>> {
        with_retry(self.retry_cap, "resume_jobs", || async {
            let groups = self.matching_job_groups(scheduler, matcher).await?;
            for group in &groups {
                self.paused.resume_job_group(scheduler, group).await?;
            }
            for job_key in self.jobs_in_groups(scheduler, &groups).await? {
                for trigger in self.get_triggers_for_job(scheduler, &job_key).await? {
                    self.resume_trigger_once(scheduler, &trigger.key).await?;
                }
            }
            Ok(groups)
        })
        .await
    }

    /// Pauses every trigger group that exists at call time. Does not leave
    /// a blanket "future groups start paused" marker — spec.md names no
    /// such marker; see DESIGN.md.
    pub async fn pause_all(&self, scheduler: &str) -> StoreResult<()> {
        self.pause_triggers(scheduler, &GroupMatcher::anything()).await?;
        Ok(())
    }

    pub async fn resume_all(&self, scheduler: &str) -> StoreResult<()> {
        self.resume_triggers(scheduler, &GroupMatcher::anything()).await?;
        Ok(())
    }

    pub async fn is_job_group_paused(&self, scheduler: &str, group: &str) -> StoreResult<bool> {
        self.paused.is_job_group_paused(scheduler, group).await
    }

    pub async fn is_trigger_group_paused(&self, scheduler: &str, group: &str) -> StoreResult<bool> {
        self.paused.is_trigger_group_paused(scheduler, group).await
    }

    pub async fn reset_trigger_from_error_state(&self, scheduler: &str, key: &GroupName) -> StoreResult<()> {
        with_retry(self.retry_cap, "reset_trigger_from_error_state", || async {
            let id = key.doc_id(scheduler);
            let Some(doc) = self.session.find_by_id::<TriggerDoc>(&self.session.triggers(), &id).await? else {
                return Ok(());
            };
            if doc.trigger.state != TriggerState::Error {
                return Ok(());
            }
            let is_paused = self.paused.is_trigger_group_paused(scheduler, &doc.trigger.key.group).await?
                || self.paused.is_job_group_paused(scheduler, &doc.trigger.job_key.group).await?;
            let is_blocked = self.block_repo.is_blocked(scheduler, &doc.trigger.job_key).await?;
            let mut doc = doc;
            doc.trigger.state = TriggerState::initial(is_paused, is_blocked);
            let next_version = doc.next_version();
            let persisted = TriggerDoc { version: next_version, ..doc };
            self.session.cas_update(&self.session.triggers(), &persisted.id, next_version - 1, &persisted).await
        })
        .await
    }

    // ---- Firing -------------------------------------------------------

    pub async fn acquire_next_triggers(
        &self,
        scheduler: &str,
        no_later_than: DateTime<Utc>,
        max_count: usize,
        time_window: chrono::Duration,
    ) -> StoreResult<Vec<Trigger>> {
        with_retry(self.retry_cap, "acquire_next_triggers", || async {
            let engine = AcquisitionEngine::new(
                &self.session,
                self.calculator.as_ref(),
                self.signaler.as_ref(),
                self.block_repo.as_ref(),
                &self.fire_instance_ids,
            );
            let now = Utc::now();
            let threshold = self.session.config().misfire_threshold_chrono();
            engine.acquire_next_triggers(scheduler, no_later_than, max_count, time_window, threshold, now).await
        })
        .await
    }

    pub async fn release_acquired_trigger(&self, scheduler: &str, key: &GroupName) -> StoreResult<()> {
        with_retry(self.retry_cap, "release_acquired_trigger", || async {
            let protocol =
                FireProtocol::new(&self.session, self.calculator.as_ref(), self.signaler.as_ref(), self.block_repo.as_ref());
            protocol.release_acquired_trigger(scheduler, key).await
        })
        .await
    }

    pub async fn triggers_fired(&self, scheduler: &str, keys: &[GroupName]) -> StoreResult<Vec<TriggerFiredResult>> {
        with_retry(self.retry_cap, "triggers_fired", || async {
            let protocol =
                FireProtocol::new(&self.session, self.calculator.as_ref(), self.signaler.as_ref(), self.block_repo.as_ref());
            protocol.triggers_fired(scheduler, keys, Utc::now()).await
        })
        .await
    }

    pub async fn triggered_job_complete(
        &self,
        scheduler: &str,
        trigger: &Trigger,
        job_detail: &Job,
        instruction: CompletionInstruction,
    ) -> StoreResult<()> {
        with_retry(self.retry_cap, "triggered_job_complete", || async {
            let protocol =
                FireProtocol::new(&self.session, self.calculator.as_ref(), self.signaler.as_ref(), self.block_repo.as_ref());
            protocol.triggered_job_complete(scheduler, trigger, job_detail, instruction).await
        })
        .await
    }
}

// No colocated unit tests: the operation surface is a thin dispatcher over
// already-tested components (retry, misfire, acquire, fire, recovery,
// paused, block_repo) plus the CAS-heavy storage/removal/pause operations
// defined directly here, which need a real collection to exercise. Covered
// by the runtime's own integration suite against a live `mongod` — see
// DESIGN.md.
