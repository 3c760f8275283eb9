// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Database session handling: connection, collection access, and the
//! compare-and-swap primitives every mutating component builds on.
//!
//! There is no RavenDB driver to mirror here, so optimistic concurrency is
//! reimplemented on top of `mongodb`'s `find_one_and_update` the way
//! `other_examples/.../fc-scheduler` uses the same crate for its dispatch
//! job documents: a `version: i64` field stands in for RavenDB's change
//! vector, and a CAS loss (no document matched the expected version) maps
//! to [`StoreError::ConcurrencyConflict`].

use crate::codec::{
    BlockedJobDoc, CalendarDoc, JobDoc, PausedJobGroupDoc, PausedTriggerGroupDoc, SchedulerDoc,
    TriggerDoc,
};
use crate::config::StoreConfig;
use bson::doc;
use jobstore_core::{StoreError, StoreResult};
use mongodb::options::{
    ClientOptions, FindOneAndReplaceOptions, ReadConcern, ReturnDocument, WriteConcern,
};
use mongodb::{Client, Collection, Database};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Opens database sessions and performs the CAS reads/writes every
/// component (Block Repository, Paused-Group Registry, Acquisition Engine,
/// Fire & Complete Protocol, Recovery) is built on.
///
/// Distinguishes "waiting" sessions (majority read/write concern, used by
/// every mutating call — spec.md §4.2) from plain ones (bulk streams where
/// staleness is acceptable) only by the concern attached to the
/// collections it hands out; there is no separate session object to
/// dispose, matching how the underlying driver already pools connections.
#[derive(Clone)]
pub struct SessionHelper {
    database: Database,
    config: StoreConfig,
}

impl SessionHelper {
    pub fn new(database: Database, config: StoreConfig) -> Self {
        Self { database, config }
    }

    /// Connect using the server URLs and database name in `config`.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        let url = config
            .server_urls
            .first()
            .ok_or_else(|| StoreError::ConfigurationFailure(Box::new(StoreError::TransientStoreError(
                "no server_urls configured".to_string(),
            ))))?;
        let mut options = ClientOptions::parse(url)
            .await
            .map_err(|e| StoreError::TransientStoreError(e.to_string()))?;
        options.app_name = Some(config.instance_name.clone());
        let client = Client::with_options(options)
            .map_err(|e| StoreError::TransientStoreError(e.to_string()))?;
        let database = client.database(&config.database_name);
        Ok(Self::new(database, config))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// A collection with majority read/write concern, for use on every
    /// mutating call (spec.md §4.2 "waiting" session).
    fn waiting_collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync,
    {
        self.database
            .collection_with_options::<T>(
                &self.config.collection_name(name),
                mongodb::options::CollectionOptions::builder()
                    .read_concern(ReadConcern::majority())
                    .write_concern(WriteConcern::majority())
                    .build(),
            )
    }

    pub fn jobs(&self) -> Collection<JobDoc> {
        self.waiting_collection("jobs")
    }

    pub fn triggers(&self) -> Collection<TriggerDoc> {
        self.waiting_collection("triggers")
    }

    pub fn calendars(&self) -> Collection<CalendarDoc> {
        self.waiting_collection("calendars")
    }

    pub fn schedulers(&self) -> Collection<SchedulerDoc> {
        self.waiting_collection("schedulers")
    }

    pub fn paused_trigger_groups(&self) -> Collection<PausedTriggerGroupDoc> {
        self.waiting_collection("paused_trigger_groups")
    }

    pub fn paused_job_groups(&self) -> Collection<PausedJobGroupDoc> {
        self.waiting_collection("paused_job_groups")
    }

    pub fn blocked_jobs(&self) -> Collection<BlockedJobDoc> {
        self.waiting_collection("blocked_jobs")
    }

    /// Insert a brand-new document, surfacing a duplicate key as
    /// [`StoreError::ObjectAlreadyExists`].
    pub async fn insert_new<T>(
        &self,
        collection: &Collection<T>,
        doc: &T,
        kind: &'static str,
        key: impl Into<String>,
    ) -> StoreResult<()>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync,
    {
        match collection.insert_one(doc).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                Err(StoreError::ObjectAlreadyExists { kind, key: key.into() })
            }
            Err(e) => Err(transient(e)),
        }
    }

    /// Unconditionally overwrite (or create) a document, used by
    /// `replace = true` storage calls. Does not participate in the
    /// version CAS chain — a full replace resets it.
    pub async fn upsert<T>(&self, collection: &Collection<T>, id: &str, doc: &T) -> StoreResult<()>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync,
    {
        collection
            .find_one_and_replace(doc! { "_id": id }, doc)
            .with_options(FindOneAndReplaceOptions::builder().upsert(true).build())
            .await
            .map_err(transient)?;
        Ok(())
    }

    /// Compare-and-swap update: succeeds only if the stored document's
    /// `version` still equals `expected_version`. A CAS loss is a
    /// [`StoreError::ConcurrencyConflict`], handled transparently by
    /// [`crate::retry::with_retry`].
    pub async fn cas_update<T>(
        &self,
        collection: &Collection<T>,
        id: &str,
        expected_version: i64,
        doc: &T,
    ) -> StoreResult<()>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync,
    {
        let filter = doc! { "_id": id, "version": expected_version };
        let result = collection
            .find_one_and_replace(filter, doc)
            .with_options(
                mongodb::options::FindOneAndReplaceOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build(),
            )
            .await
            .map_err(transient)?;
        if result.is_none() {
            warn!(doc_id = %id, "lost compare-and-swap on version {expected_version}");
            return Err(StoreError::ConcurrencyConflict { key: id.to_string() });
        }
        Ok(())
    }

    pub async fn delete_by_id<T>(&self, collection: &Collection<T>, id: &str) -> StoreResult<bool>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync,
    {
        let result = collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(transient)?;
        Ok(result.deleted_count > 0)
    }

    pub async fn find_by_id<T>(&self, collection: &Collection<T>, id: &str) -> StoreResult<Option<T>>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync,
    {
        collection.find_one(doc! { "_id": id }).await.map_err(transient)
    }

    pub async fn exists<T>(&self, collection: &Collection<T>, id: &str) -> StoreResult<bool>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync,
    {
        Ok(self.find_by_id(collection, id).await?.is_some())
    }

    /// Bounded poll-retry for a read that must observe a just-completed
    /// write, absorbing replication lag up to `SecondsToWaitForIndexing`
    /// (spec.md §4.2). Most reads do not need this — majority read concern
    /// already makes it a no-op in the common case — so callers opt in
    /// explicitly rather than paying the poll loop on every query.
    pub async fn wait_for_indexing<T, F, Fut>(&self, mut probe: F) -> StoreResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = StoreResult<Option<T>>>,
    {
        let deadline = tokio::time::Instant::now() + self.config.index_wait();
        loop {
            if let Some(found) = probe().await? {
                return Ok(Some(found));
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            debug!("waiting for index to catch up");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

pub fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(we))
            if we.code == 11000
    )
}

pub fn transient(e: mongodb::error::Error) -> StoreError {
    StoreError::TransientStoreError(e.to_string())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
