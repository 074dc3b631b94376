//! Preference sets and persisted snapshots.
//!
//! A [`PreferenceSet`] maps every known setting key to its current value.  It
//! is backed by a `BTreeMap`, so iteration and serialisation order is by key
//! and two saves of the same set produce byte-identical files.
//!
//! A [`Snapshot`] is the persisted form: a schema `version` plus the values.
//! When a session starts, the snapshot is merged onto the registered defaults
//! with [`PreferenceSet::merged_with`]:
//!
//! - keys the defaults do not know are dropped (settings removed in a newer
//!   release must not break loading an older file);
//! - values that cannot take the default's shape are dropped, and the
//!   default is kept (see [`PreferenceValue::conformed_to`]: a whole float
//!   loads as `Int` for an integer default, `20.5` is dropped);
//! - keys missing from the snapshot keep their default (settings added in a
//!   newer release).

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::value::PreferenceValue;

/// Current on-disk snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Raised when a key that has no registered default is read or written.
///
/// This is always a programming or configuration defect (a typo in a key
/// name, a descriptor missing from the catalog); it is never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown preference key: {0:?}")]
pub struct UnknownKeyError(pub String);

/// The full mapping of setting keys to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceSet {
    values: BTreeMap<String, PreferenceValue>,
}

impl PreferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PreferenceValue> {
        self.values.get(key)
    }

    /// Inserts or overwrites a value, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PreferenceValue>,
    ) -> Option<PreferenceValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates over `(key, value)` pairs in sorted key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, PreferenceValue> {
        self.values.iter()
    }

    /// Builds a new set by laying `persisted` over `self` (the defaults).
    ///
    /// Only keys present in `self` survive, and each persisted value is
    /// reshaped to its default's variant or dropped.  The returned [`MergeReport`] lists
    /// what was applied and what was ignored so the caller can log it.
    pub fn merged_with(&self, persisted: &PreferenceSet) -> (PreferenceSet, MergeReport) {
        let mut merged = self.clone();
        let mut report = MergeReport::default();

        for (key, value) in persisted.iter() {
            match self.values.get(key) {
                None => {
                    debug!(key = %key, "ignoring persisted preference with no registered default");
                    report.ignored_unknown.push(key.clone());
                }
                Some(default) => match value.conformed_to(default) {
                    Some(conformed) => {
                        merged.values.insert(key.clone(), conformed);
                        report.applied += 1;
                    }
                    None => {
                        debug!(
                            key = %key,
                            expected = %default.kind(),
                            found = %value,
                            "ignoring persisted preference with mismatched type"
                        );
                        report.ignored_mismatched.push(key.clone());
                    }
                },
            }
        }

        (merged, report)
    }
}

impl<K: Into<String>, V: Into<PreferenceValue>> FromIterator<(K, V)> for PreferenceSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PreferenceSet {
    type Item = (&'a String, &'a PreferenceValue);
    type IntoIter = btree_map::Iter<'a, String, PreferenceValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Outcome of merging a persisted snapshot onto the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Number of persisted values that replaced a default.
    pub applied: usize,
    /// Persisted keys with no registered default.
    pub ignored_unknown: Vec<String>,
    /// Persisted keys whose value kind did not match the default's.
    pub ignored_mismatched: Vec<String>,
}

impl MergeReport {
    /// Returns `true` if every persisted value was applied.
    pub fn is_clean(&self) -> bool {
        self.ignored_unknown.is_empty() && self.ignored_mismatched.is_empty()
    }
}

/// A persisted copy of a [`PreferenceSet`] at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version – bump when breaking changes are introduced.
    #[serde(default = "default_version")]
    pub version: u32,
    /// The persisted values.
    #[serde(default)]
    pub values: PreferenceSet,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl Snapshot {
    /// Wraps `values` in a snapshot at the current format version.
    pub fn new(values: PreferenceSet) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            values,
        }
    }
}
