// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jobstore-mongo: a persistent, optionally clustered document-store
//! backend for a job-scheduler runtime. Wraps `mongodb` collections with
//! compare-and-swap semantics standing in for RavenDB's change-vector
//! optimistic concurrency, and implements the acquisition, fire/complete,
//! and recovery protocols on top of them.
//!
//! [`store::MongoJobStore`] is the single entry point; everything else in
//! this crate is an internal component it composes.

pub mod acquire;
pub mod block_repo;
pub mod codec;
pub mod config;
pub mod fire;
pub mod misfire;
pub mod paused;
pub mod recovery;
pub mod retry;
pub mod session;
pub mod signaler;
pub mod store;

pub use config::StoreConfig;
pub use session::SessionHelper;
pub use signaler::{JobTypeLoader, Signaler};
pub use store::MongoJobStore;
