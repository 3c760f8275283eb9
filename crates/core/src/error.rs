// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-level error kinds.
//!
//! These are semantic kinds, not a wrapper around any particular database
//! driver's error type — `jobstore-mongo` maps `mongodb::error::Error` into
//! this enum at the session boundary so callers never see driver internals.

use crate::key::GroupName;
use thiserror::Error;

/// Errors raised by the job-store operation surface.
///
/// [`StoreError::ConcurrencyConflict`] is always handled locally by the
/// retry wrapper and must never be returned to a caller of the public
/// operation surface — its presence here is so internal layers below the
/// retry wrapper have a variant to raise.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `Store*(..., replace = false)` was called for an id that already
    /// exists.
    #[error("{kind} {key} already exists")]
    ObjectAlreadyExists { kind: &'static str, key: String },

    /// Data corruption, or a trigger referencing a job that does not exist.
    #[error("job persistence failure: {0}")]
    JobPersistenceFailure(String),

    /// Recovery failed; wraps whatever underlying error caused it.
    #[error("couldn't recover jobs: {0}")]
    ConfigurationFailure(#[source] Box<StoreError>),

    /// Lost a compare-and-swap on a document's version. Handled locally by
    /// the retry wrapper; never surfaced past it.
    #[error("concurrency conflict on {key}")]
    ConcurrencyConflict { key: String },

    /// Network/session failure from the underlying database driver.
    #[error("transient store error: {0}")]
    TransientStoreError(String),

    /// A state the implementation believes is unreachable given the
    /// invariants in spec.md §3. Aborts the operation rather than guessing.
    #[error("unreachable state: {0}")]
    UnreachableState(String),
}

impl StoreError {
    pub fn job_already_exists(key: &GroupName, scheduler: &str) -> Self {
        StoreError::ObjectAlreadyExists { kind: "job", key: key.doc_id(scheduler) }
    }

    pub fn trigger_already_exists(key: &GroupName, scheduler: &str) -> Self {
        StoreError::ObjectAlreadyExists { kind: "trigger", key: key.doc_id(scheduler) }
    }

    pub fn calendar_already_exists(scheduler: &str, name: &str) -> Self {
        StoreError::ObjectAlreadyExists {
            kind: "calendar",
            key: crate::key::calendar_doc_id(scheduler, name),
        }
    }

    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrencyConflict { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
