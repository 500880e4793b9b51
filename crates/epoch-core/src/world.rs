//! World-state metrics and per-turn deltas.
//!
//! Both types are ordered maps so that serialized output and logs are
//! stable across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A signed change per metric, carried by an event option or produced by
/// aggregating a turn's decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateDelta(BTreeMap<String, i64>);

impl StateDelta {
    /// Creates an empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every entry of `other` into this delta. Keys present in both are
    /// summed, so opposite choices cancel rather than overwrite.
    pub fn accumulate(&mut self, other: &StateDelta) {
        for (metric, delta) in &other.0 {
            let entry = self.0.entry(metric.clone()).or_insert(0);
            *entry = entry.saturating_add(*delta);
        }
    }

    /// Returns the delta for `metric`, if any.
    #[must_use]
    pub fn get(&self, metric: &str) -> Option<i64> {
        self.0.get(metric).copied()
    }

    /// Returns `true` if the delta has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates metrics in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &i64)> {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for StateDelta {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// The session's aggregate condition: metric name to current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldState(BTreeMap<String, i64>);

impl WorldState {
    /// Returns the value of `metric`, if tracked.
    #[must_use]
    pub fn get(&self, metric: &str) -> Option<i64> {
        self.0.get(metric).copied()
    }

    /// Applies `delta` in place. Metrics absent from the state start at 0.
    pub fn apply(&mut self, delta: &StateDelta) {
        for (metric, change) in delta.iter() {
            let value = self.0.entry(metric.clone()).or_insert(0);
            *value = value.saturating_add(*change);
        }
    }

    /// Returns a copy of this state with `delta` applied.
    #[must_use]
    pub fn applied(&self, delta: &StateDelta) -> Self {
        let mut next = self.clone();
        next.apply(delta);
        next
    }

    /// Iterates metrics in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &i64)> {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for WorldState {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
