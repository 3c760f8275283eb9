// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//
// No live `mongod` in this workspace's unit tests (teacher convention:
// exercise logic without spinning up external services); CAS and
// duplicate-key behavior are covered by `store`'s tests against the
// feature-gated in-memory fixture instead. This module covers the parts
// of `SessionHelper` with no database dependency.

use super::*;
use jobstore_core::Job;

#[tokio::test]
async fn wait_for_indexing_returns_as_soon_as_probe_succeeds() {
    let helper = SessionHelper::new(
        Client::with_uri_str("mongodb://localhost:1").await.unwrap().database("unused"),
        StoreConfig { seconds_to_wait_for_indexing: 1, ..Default::default() },
    );
    let mut calls = 0;
    let result = helper
        .wait_for_indexing(|| {
            calls += 1;
            async move { Ok::<_, StoreError>(Some(calls)) }
        })
        .await
        .unwrap();
    assert_eq!(result, Some(1));
}

#[tokio::test]
async fn wait_for_indexing_gives_up_at_deadline() {
    let helper = SessionHelper::new(
        Client::with_uri_str("mongodb://localhost:1").await.unwrap().database("unused"),
        StoreConfig { seconds_to_wait_for_indexing: 0, ..Default::default() },
    );
    let result: Option<Job> = helper
        .wait_for_indexing(|| async { Ok::<_, StoreError>(None) })
        .await
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn collection_accessors_use_configured_prefix() {
    let config = StoreConfig { collection_prefix: Some("tenant-a".to_string()), ..Default::default() };
    assert_eq!(config.collection_name("triggers"), "tenant-a/triggers");
}
