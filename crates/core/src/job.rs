// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job entity.

use crate::data_map::JobDataMap;
use crate::key::GroupName;
use serde::{Deserialize, Serialize};

/// Code to run plus metadata. Jobs own themselves: triggers reference a job
/// weakly (by id, not by ownership), and a durable job may outlive every
/// trigger that referenced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub key: GroupName,
    pub scheduler: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Stable, version-agnostic identifier the runtime's type loader
    /// resolves to a concrete job class. The store never interprets this
    /// string beyond storing and returning it.
    pub job_type: String,
    /// If false, the job is deleted once no trigger references it anymore
    /// (spec.md §3 invariant 2).
    #[serde(default)]
    pub durable: bool,
    #[serde(default)]
    pub concurrent_execution_disallowed: bool,
    #[serde(default)]
    pub persist_data_after_execution: bool,
    #[serde(default)]
    pub requests_recovery: bool,
    #[serde(default)]
    pub data: JobDataMap,
}

impl Job {
    pub fn new(scheduler: impl Into<String>, key: GroupName, job_type: impl Into<String>) -> Self {
        Self {
            key,
            scheduler: scheduler.into(),
            description: None,
            job_type: job_type.into(),
            durable: false,
            concurrent_execution_disallowed: false,
            persist_data_after_execution: false,
            requests_recovery: false,
            data: JobDataMap::new(),
        }
    }

    pub fn doc_id(&self) -> String {
        self.key.doc_id(&self.scheduler)
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            scheduler: String = "sched1",
            job_type: String = "com.example.NoopJob",
        }
        set {
            key: GroupName = GroupName::new("TestJob", "DEFAULT"),
            durable: bool = false,
            concurrent_execution_disallowed: bool = false,
            persist_data_after_execution: bool = false,
            requests_recovery: bool = false,
            data: JobDataMap = JobDataMap::new(),
        }
        option {
            description: String = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
