// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Arbitrary job/trigger data, opaque to the store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

/// A bag of runtime-supplied values the store persists and returns verbatim.
///
/// The store never interprets these values — it only needs them to
/// round-trip through BSON, which is why the value type is `serde_json::Value`
/// rather than something the runtime's job classes would otherwise have to
/// agree on a schema for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobDataMap(pub HashMap<String, serde_json::Value>);

impl JobDataMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deref for JobDataMap {
    type Target = HashMap<String, serde_json::Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for JobDataMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<HashMap<String, serde_json::Value>> for JobDataMap {
    fn from(map: HashMap<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, serde_json::Value)> for JobDataMap {
    fn from_iter<T: IntoIterator<Item = (String, serde_json::Value)>>(iter: T) -> Self {
        Self(HashMap::from_iter(iter))
    }
}

#[cfg(test)]
#[path = "data_map_tests.rs"]
mod tests;
