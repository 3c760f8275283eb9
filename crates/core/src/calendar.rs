// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Calendar wrapper.
//!
//! The store never interprets a calendar's excluded-date logic — that lives
//! in the runtime's concrete calendar implementation. The store only
//! (de)serializes the opaque payload under `{scheduler}/calendars/{name}`.

use serde::{Deserialize, Serialize};

/// A named calendar scoped to a scheduler instance.
///
/// `payload` is whatever the runtime's calendar implementation serialized
/// itself to (e.g. a set of excluded date ranges); the store round-trips it
/// without inspecting it. Triggers reference calendars weakly by name —
/// deleting a calendar does not cascade to triggers that still name it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub name: String,
    pub scheduler: String,
    pub payload: serde_json::Value,
}

impl Calendar {
    pub fn new(scheduler: impl Into<String>, name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { scheduler: scheduler.into(), name: name.into(), payload }
    }

    pub fn doc_id(&self) -> String {
        crate::key::calendar_doc_id(&self.scheduler, &self.name)
    }
}

#[cfg(test)]
#[path = "calendar_tests.rs"]
mod tests;
