use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};

/// Identifier of a user in the preference data
pub type UserId = i64;

/// Identifier of an item in the preference data
pub type ItemId = i64;

/// A single rating a user has given an item
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreferenceRecord {
    user_id: UserId,
    item_id: ItemId,
    value: f64,
}

impl PreferenceRecord {
    /// Creates a validated record
    ///
    /// Rejects negative ids and non-finite values.
    pub fn new(user_id: UserId, item_id: ItemId, value: f64) -> AppResult<Self> {
        if user_id < 0 {
            return Err(AppError::InvalidRecord(format!(
                "negative user id {}",
                user_id
            )));
        }
        if item_id < 0 {
            return Err(AppError::InvalidRecord(format!(
                "negative item id {}",
                item_id
            )));
        }
        if !value.is_finite() {
            return Err(AppError::InvalidRecord(format!(
                "non-finite preference {} for user {}, item {}",
                value, user_id, item_id
            )));
        }

        Ok(Self {
            user_id,
            item_id,
            value,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Sparse mapping from the other dimension's id to a preference value
///
/// For an item this is keyed by user id, for a user by item id. Keys are
/// kept ordered so every traversal is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceVector {
    values: BTreeMap<i64, f64>,
}

impl PreferenceVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value for a key, returning the previous one if any
    pub fn insert(&mut self, key: i64, value: f64) -> Option<f64> {
        self.values.insert(key, value)
    }

    pub fn get(&self, key: i64) -> Option<f64> {
        self.values.get(&key).copied()
    }

    pub fn contains(&self, key: i64) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.values.keys().copied()
    }

    /// (key, value) pairs in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Co-rated entries as (key, self value, other value)
    ///
    /// Walks the smaller vector and probes the larger one.
    pub fn overlap<'a>(
        &'a self,
        other: &'a PreferenceVector,
    ) -> impl Iterator<Item = (i64, f64, f64)> + 'a {
        let (small, large, swapped) = if self.len() <= other.len() {
            (self, other, false)
        } else {
            (other, self, true)
        };

        small.iter().filter_map(move |(key, small_value)| {
            large.get(key).map(|large_value| {
                if swapped {
                    (key, large_value, small_value)
                } else {
                    (key, small_value, large_value)
                }
            })
        })
    }
}

impl FromIterator<(i64, f64)> for PreferenceVector {
    fn from_iter<T: IntoIterator<Item = (i64, f64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
