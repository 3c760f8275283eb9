// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire documents.
//!
//! Every collection stores a `{ _id, version, ...flattened entity }`
//! document. `_id` is the deterministic composed key from
//! `jobstore_core::key`; `version` backs the optimistic-concurrency
//! compare-and-swap the Session Helper performs on every mutating write —
//! it plays the role RavenDB's change vector plays in the system this
//! crate reimplements.

use jobstore_core::{BlockedJob, Calendar, Job, PausedJobGroup, PausedTriggerGroup, SchedulerRecord, Trigger};
use serde::{Deserialize, Serialize};

macro_rules! versioned_doc {
    ($doc:ident, $entity:ty, $field:ident) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $doc {
            #[serde(rename = "_id")]
            pub id: String,
            pub version: i64,
            #[serde(flatten)]
            pub $field: $entity,
        }

        impl $doc {
            pub fn next_version(&self) -> i64 {
                self.version + 1
            }
        }
    };
}

versioned_doc!(JobDoc, Job, job);
versioned_doc!(TriggerDoc, Trigger, trigger);
versioned_doc!(CalendarDoc, Calendar, calendar);
versioned_doc!(SchedulerDoc, SchedulerRecord, record);

impl JobDoc {
    pub fn new(job: Job) -> Self {
        let id = job.doc_id();
        Self { id, version: 0, job }
    }
}

impl TriggerDoc {
    pub fn new(trigger: Trigger) -> Self {
        let id = trigger.doc_id();
        Self { id, version: 0, trigger }
    }
}

impl CalendarDoc {
    pub fn new(calendar: Calendar) -> Self {
        let id = calendar.doc_id();
        Self { id, version: 0, calendar }
    }
}

impl SchedulerDoc {
    pub fn new(record: SchedulerRecord) -> Self {
        let id = record.doc_id().to_string();
        Self { id, version: 0, record }
    }
}

/// Existence-only markers never need a version: they are inserted or
/// deleted wholesale, never partially mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PausedTriggerGroupDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub marker: PausedTriggerGroup,
}

impl PausedTriggerGroupDoc {
    pub fn new(marker: PausedTriggerGroup) -> Self {
        let id = marker.doc_id();
        Self { id, marker }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PausedJobGroupDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub marker: PausedJobGroup,
}

impl PausedJobGroupDoc {
    pub fn new(marker: PausedJobGroup) -> Self {
        let id = marker.doc_id();
        Self { id, marker }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedJobDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub blocked: BlockedJob,
}

impl BlockedJobDoc {
    pub fn new(blocked: BlockedJob) -> Self {
        let id = blocked.doc_id();
        Self { id, blocked }
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
