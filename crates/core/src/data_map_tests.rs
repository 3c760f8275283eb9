// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_is_empty() {
    assert!(JobDataMap::new().is_empty());
}

#[test]
fn deref_allows_map_methods() {
    let mut data = JobDataMap::new();
    data.insert("retries".to_string(), serde_json::json!(3));
    assert_eq!(data.get("retries"), Some(&serde_json::json!(3)));
    assert_eq!(data.len(), 1);
}

#[test]
fn round_trips_json() {
    let mut data = JobDataMap::new();
    data.insert("url".to_string(), serde_json::json!("https://example.test"));
    let encoded = serde_json::to_string(&data).unwrap();
    let decoded: JobDataMap = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, data);
}
