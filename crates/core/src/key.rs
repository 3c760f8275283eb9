// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic, composed identifiers.
//!
//! Every persistent id in this store is derived from stable inputs, never
//! database-generated surrogates: `{scheduler}/{group}/{name}` for jobs and
//! triggers, `{scheduler}/calendars/{name}` for calendars. This makes
//! existence checks collision-free across instances and lets a retry
//! rediscover the same document after losing a compare-and-swap.

use smol_str::SmolStr;
use std::borrow::Borrow;
use std::fmt;

/// Define a newtype id wrapper around an inline-optimized string.
///
/// Unlike a random-suffix id generator, every id produced by the generated
/// `new` constructor is a pure function of its inputs: calling it twice with
/// the same arguments yields the same id. That is the property the whole
/// store's existence-check and retry-replay logic depends on.
#[macro_export]
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub smol_str::SmolStr);

        impl $name {
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(smol_str::SmolStr::new(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(smol_str::SmolStr::new(s))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                self.0.as_str()
            }
        }
    };
}

define_key! {
    /// Deterministic document id for a job: `{scheduler}/{group}/{name}`.
    pub struct JobDocId;
}

define_key! {
    /// Deterministic document id for a trigger: `{scheduler}/{group}/{name}`.
    pub struct TriggerDocId;
}

define_key! {
    /// Deterministic document id for a calendar: `{scheduler}/calendars/{name}`.
    pub struct CalendarDocId;
}

/// A (group, name) pair identifying a job or trigger within a scheduler.
///
/// Mirrors Quartz's `JobKey`/`TriggerKey` pair without picking a name that
/// collides with either — this type backs both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GroupName {
    pub name: SmolStr,
    pub group: SmolStr,
}

impl GroupName {
    pub fn new(name: impl Into<SmolStr>, group: impl Into<SmolStr>) -> Self {
        Self { name: name.into(), group: group.into() }
    }

    /// Deterministic document id scoped to `scheduler`.
    pub fn doc_id(&self, scheduler: &str) -> String {
        format!("{}/{}/{}", scheduler, self.group, self.name)
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.name)
    }
}

/// Deterministic document id for a calendar, scoped to `scheduler`.
pub fn calendar_doc_id(scheduler: &str, name: &str) -> String {
    format!("{}/calendars/{}", scheduler, name)
}

/// Deterministic document id for a paused trigger-group marker.
pub fn paused_trigger_group_doc_id(scheduler: &str, group: &str) -> String {
    format!("T{}#{}", scheduler, group)
}

/// Deterministic document id for a paused job-group marker.
pub fn paused_job_group_doc_id(scheduler: &str, group: &str) -> String {
    format!("J{}#{}", scheduler, group)
}

/// Deterministic document id for a blocked-job marker.
pub fn blocked_job_doc_id(scheduler: &str, job: &GroupName) -> String {
    format!("B{}#{}", scheduler, job.doc_id(scheduler))
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
