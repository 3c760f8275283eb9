// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Acquisition Engine (spec.md §4.6): finds due triggers, orders them,
//! excludes concurrency-disallowed duplicates within the call, and
//! atomically marks survivors Acquired with a unique fire-instance id.
//!
//! Pages candidates through a sorted cursor rather than maintaining a true
//! priority queue in memory — functionally equivalent for the ordering and
//! stop condition spec.md §4.6 describes, simpler to reason about; see
//! DESIGN.md.

use crate::block_repo::BlockRepository;
use crate::codec::{CalendarDoc, JobDoc, TriggerDoc};
use crate::misfire::{MisfireOutcome, MisfireReconciler};
use crate::session::{transient, SessionHelper};
use crate::signaler::Signaler;
use bson::doc;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use jobstore_core::{FireInstanceIdGenerator, ScheduleCalculator, StoreResult, Trigger, TriggerState};
use mongodb::options::FindOptions;
use std::collections::HashSet;

/// Candidates are paged in chunks this many times `max_count`, so a page
/// usually has enough headroom to survive in-page misfire skips without a
/// second round trip.
const PAGE_MULTIPLIER: u64 = 3;

pub struct AcquisitionEngine<'a> {
    session: &'a SessionHelper,
    calculator: &'a dyn ScheduleCalculator,
    signaler: &'a dyn Signaler,
    block_repo: &'a dyn BlockRepository,
    fire_instance_ids: &'a FireInstanceIdGenerator,
}

impl<'a> AcquisitionEngine<'a> {
    pub fn new(
        session: &'a SessionHelper,
        calculator: &'a dyn ScheduleCalculator,
        signaler: &'a dyn Signaler,
        block_repo: &'a dyn BlockRepository,
        fire_instance_ids: &'a FireInstanceIdGenerator,
    ) -> Self {
        Self { session, calculator, signaler, block_repo, fire_instance_ids }
    }

    async fn load_calendar(&self, scheduler: &str, name: &Option<String>) -> StoreResult<Option<jobstore_core::Calendar>> {
        let Some(name) = name else { return Ok(None) };
        let id = jobstore_core::key::calendar_doc_id(scheduler, name);
        let doc: Option<CalendarDoc> = self.session.find_by_id(&self.session.calendars(), &id).await?;
        Ok(doc.map(|d| d.calendar))
    }

    pub async fn acquire_next_triggers(
        &self,
        scheduler: &str,
        no_later_than: DateTime<Utc>,
        max_count: usize,
        time_window: chrono::Duration,
        misfire_threshold: chrono::Duration,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Trigger>> {
        let upper_limit = no_later_than + time_window;
        let reconciler = MisfireReconciler::new(self.calculator, self.signaler);
        let mut acquired = Vec::with_capacity(max_count);
        let mut claimed_nonconcurrent_jobs: HashSet<String> = HashSet::new();
        let mut skip: u64 = 0;
        let page_size = (max_count as u64).max(1) * PAGE_MULTIPLIER;
        let triggers = self.session.triggers();

        'paging: loop {
            if acquired.len() >= max_count {
                break;
            }
            let filter = doc! {
                "scheduler": scheduler,
                "state": jobstore_core::TriggerState::Waiting.to_string(),
                "next_fire_time": { "$lte": bson::DateTime::from_chrono(upper_limit) },
            };
            let options = FindOptions::builder()
                .sort(doc! { "next_fire_time": 1, "priority": -1 })
                .skip(skip)
                .limit(page_size as i64)
                .build();
            let mut cursor = triggers.find(filter).with_options(options).await.map_err(transient)?;
            let mut page: Vec<TriggerDoc> = Vec::new();
            while let Some(d) = cursor.try_next().await.map_err(transient)? {
                page.push(d);
            }
            if page.is_empty() {
                break;
            }
            skip += page.len() as u64;
            let page_was_full = page.len() as u64 == page_size;

            'candidates: for mut candidate in page {
                if acquired.len() >= max_count {
                    break 'paging;
                }
                let mut trigger = candidate.trigger.clone();
                if trigger.next_fire_time.is_none() {
                    continue 'candidates;
                }

                let calendar = self.load_calendar(scheduler, &trigger.calendar_name).await?;
                match reconciler.reconcile(&mut trigger, calendar.as_ref(), now, misfire_threshold).await {
                    MisfireOutcome::Finalized => {
                        candidate.trigger = trigger;
                        let next_version = candidate.next_version();
                        let to_persist = TriggerDoc { version: next_version, ..candidate };
                        self.session.cas_update(&triggers, &to_persist.id, next_version - 1, &to_persist).await?;
                        self.signaler.signal_scheduling_change(None).await;
                        continue 'candidates;
                    }
                    MisfireOutcome::Advanced => {
                        candidate.trigger = trigger.clone();
                        let next_version = candidate.next_version();
                        let to_persist = TriggerDoc { version: next_version, ..candidate };
                        self.session.cas_update(&triggers, &to_persist.id, next_version - 1, &to_persist).await?;
                        match trigger.next_fire_time {
                            None => continue 'candidates,
                            Some(nf) if nf > upper_limit => break 'paging,
                            Some(_) => { candidate = to_persist; }
                        }
                    }
                    MisfireOutcome::NotMisfired | MisfireOutcome::NoChange => {}
                }

                if let Some(nf) = trigger.next_fire_time {
                    if nf > upper_limit {
                        break 'paging;
                    }
                } else {
                    continue 'candidates;
                }

                let job_id = trigger.job_key.doc_id(scheduler);
                let job_doc: Option<JobDoc> = self.session.find_by_id(&self.session.jobs(), &job_id).await?;
                let Some(job_doc) = job_doc else {
                    // Orphaned trigger referencing a deleted job; Recovery
                    // is responsible for cleaning these up, not acquisition.
                    continue 'candidates;
                };
                if job_doc.job.concurrent_execution_disallowed
                    && !claimed_nonconcurrent_jobs.insert(job_id.clone())
                {
                    continue 'candidates;
                }
                if self.block_repo.is_blocked(scheduler, &trigger.job_key).await? {
                    continue 'candidates;
                }

                trigger.state = TriggerState::Acquired;
                trigger.fire_instance_id = Some(self.fire_instance_ids.next());
                let next_version = candidate.next_version();
                let to_persist = TriggerDoc { version: next_version, trigger: trigger.clone(), ..candidate };
                self.session.cas_update(&triggers, &to_persist.id, next_version - 1, &to_persist).await?;
                acquired.push(trigger);
            }

            if !page_was_full {
                break 'paging;
            }
        }

        Ok(acquired)
    }
}

// No colocated unit tests: every code path here needs a real collection to
// exercise the CAS race it exists to resolve. Covered by the runtime's own
// integration suite against a live `mongod` — see DESIGN.md.
