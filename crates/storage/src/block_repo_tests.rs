// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn job(name: &str) -> GroupName {
    GroupName::new(name, "DEFAULT")
}

#[tokio::test]
async fn in_memory_blocks_and_releases() {
    let repo = InMemoryBlockRepository::new();
    let j = job("Job1");
    assert!(!repo.is_blocked("sched1", &j).await.unwrap());

    repo.block("sched1", &j).await.unwrap();
    assert!(repo.is_blocked("sched1", &j).await.unwrap());
    assert_eq!(repo.list_blocked("sched1").await.unwrap(), vec![j.clone()]);

    repo.release("sched1", &j).await.unwrap();
    assert!(!repo.is_blocked("sched1", &j).await.unwrap());
}

#[tokio::test]
async fn in_memory_scopes_by_scheduler() {
    let repo = InMemoryBlockRepository::new();
    let j = job("Job1");
    repo.block("sched1", &j).await.unwrap();
    assert!(!repo.is_blocked("sched2", &j).await.unwrap());
    assert_eq!(repo.list_blocked("sched2").await.unwrap(), Vec::new());
}

#[tokio::test]
async fn in_memory_release_all_scopes_by_scheduler() {
    let repo = InMemoryBlockRepository::new();
    repo.block("sched1", &job("A")).await.unwrap();
    repo.block("sched2", &job("B")).await.unwrap();
    repo.release_all("sched1").await.unwrap();
    assert!(repo.list_blocked("sched1").await.unwrap().is_empty());
    assert_eq!(repo.list_blocked("sched2").await.unwrap().len(), 1);
}

#[tokio::test]
async fn in_memory_block_is_idempotent() {
    let repo = InMemoryBlockRepository::new();
    let j = job("Job1");
    repo.block("sched1", &j).await.unwrap();
    repo.block("sched1", &j).await.unwrap();
    assert_eq!(repo.list_blocked("sched1").await.unwrap().len(), 1);
}
