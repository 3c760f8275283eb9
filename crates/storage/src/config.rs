// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime-supplied configuration, deserializable from the host
//! application's config file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration the runtime hands to [`crate::store::MongoJobStore::new`]
/// (spec.md §6, "Configuration recognized").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_name: String,
    pub server_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_password: Option<String>,
    /// If set, collections live at `{prefix}/{defaultCollection}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_prefix: Option<String>,
    /// Overrides the spec.md §4.9 default retry cap (100 clustered, 5
    /// otherwise, via [`crate::retry::default_retry_cap`]) when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_error_retries: Option<u32>,
    pub seconds_to_wait_for_indexing: u64,
    #[serde(with = "humantime_millis")]
    pub misfire_threshold: Duration,
    pub clustered: bool,
    pub instance_id: String,
    pub instance_name: String,
    /// Informational only; the store does no thread-pool sizing itself.
    pub thread_pool_size: u32,
    /// Whether `StoreJob` rejects an unresolvable `job_type` via
    /// `JobTypeLoader::is_known`. Off by default — spec.md does not mandate
    /// this check (see DESIGN.md Open Question: type-loader validation).
    pub validate_job_type: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_name: "quartz".to_string(),
            server_urls: vec!["mongodb://localhost:27017".to_string()],
            certificate_path: None,
            certificate_password: None,
            collection_prefix: None,
            concurrency_error_retries: None,
            seconds_to_wait_for_indexing: 15,
            misfire_threshold: Duration::from_secs(60),
            clustered: false,
            instance_id: "NON_CLUSTERED".to_string(),
            instance_name: "QuartzScheduler".to_string(),
            thread_pool_size: 10,
            validate_job_type: false,
        }
    }
}

impl StoreConfig {
    /// Retry budget matching the spec.md §4.9 default (100 clustered, 5
    /// otherwise), unless the caller overrode `concurrency_error_retries`.
    pub fn effective_retry_cap(&self) -> u32 {
        self.concurrency_error_retries.unwrap_or_else(|| crate::retry::default_retry_cap(self.clustered))
    }

    pub fn collection_name(&self, default: &str) -> String {
        match &self.collection_prefix {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}/{default}"),
            _ => default.to_string(),
        }
    }

    pub fn index_wait(&self) -> Duration {
        Duration::from_secs(self.seconds_to_wait_for_indexing)
    }

    /// `misfire_threshold` as a `chrono::Duration`, for arithmetic against
    /// `DateTime<Utc>` fire times.
    pub fn misfire_threshold_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.misfire_threshold).unwrap_or_else(|_| chrono::Duration::seconds(60))
    }
}

/// `(de)serialize` a `Duration` as milliseconds, since `toml`/`serde_json`
/// have no native duration type.
mod humantime_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
