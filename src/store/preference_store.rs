use serde::Deserialize;
use std::collections::BTreeMap;

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, PreferenceRecord, PreferenceVector, UserId},
};

/// How a second value for an existing (user, item) pair is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// The later value replaces the earlier one
    #[default]
    Overwrite,
    /// The later value is refused with `DuplicatePreference`
    Reject,
}

/// In-memory index of preference triples
///
/// Maintains a user-indexed and an item-indexed view, both updated on
/// every insert. Reads take `&self`; writers must be serialized by the
/// caller.
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    by_user: BTreeMap<UserId, PreferenceVector>,
    by_item: BTreeMap<ItemId, PreferenceVector>,
    duplicate_policy: DuplicatePolicy,
    num_preferences: usize,
}

impl PreferenceStore {
    /// Creates an empty store that overwrites duplicates
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicate_policy(duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            duplicate_policy,
            ..Self::default()
        }
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Validates and stores a preference
    ///
    /// Returns the value it replaced when the pair already existed.
    pub fn put_preference(
        &mut self,
        user_id: UserId,
        item_id: ItemId,
        value: f64,
    ) -> AppResult<Option<f64>> {
        let record = PreferenceRecord::new(user_id, item_id, value)?;
        self.put_record(record)
    }

    /// Stores an already validated record
    pub fn put_record(&mut self, record: PreferenceRecord) -> AppResult<Option<f64>> {
        let (user_id, item_id, value) = (record.user_id(), record.item_id(), record.value());

        if self.duplicate_policy == DuplicatePolicy::Reject
            && self.preference_value(user_id, item_id).is_some()
        {
            return Err(AppError::DuplicatePreference { user_id, item_id });
        }

        let previous = self
            .by_user
            .entry(user_id)
            .or_default()
            .insert(item_id, value);
        self.by_item
            .entry(item_id)
            .or_default()
            .insert(user_id, value);

        match previous {
            Some(old) => {
                tracing::debug!(
                    user_id,
                    item_id,
                    old_value = old,
                    new_value = value,
                    "Overwrote duplicate preference"
                );
            }
            None => self.num_preferences += 1,
        }

        Ok(previous)
    }

    /// Preferences of a user keyed by item id; empty for unknown users
    pub fn preferences_for_user(&self, user_id: UserId) -> PreferenceVector {
        self.by_user.get(&user_id).cloned().unwrap_or_default()
    }

    /// Preferences for an item keyed by user id; empty for unknown items
    pub fn preferences_for_item(&self, item_id: ItemId) -> PreferenceVector {
        self.by_item.get(&item_id).cloned().unwrap_or_default()
    }

    /// Borrowing variant of [`Self::preferences_for_user`]
    pub fn user_vector(&self, user_id: UserId) -> Option<&PreferenceVector> {
        self.by_user.get(&user_id)
    }

    /// Borrowing variant of [`Self::preferences_for_item`]
    pub fn item_vector(&self, item_id: ItemId) -> Option<&PreferenceVector> {
        self.by_item.get(&item_id)
    }

    pub fn preference_value(&self, user_id: UserId, item_id: ItemId) -> Option<f64> {
        self.by_user.get(&user_id).and_then(|v| v.get(item_id))
    }

    /// All user ids in ascending order
    pub fn all_user_ids(&self) -> Vec<UserId> {
        self.by_user.keys().copied().collect()
    }

    /// All item ids in ascending order
    pub fn all_item_ids(&self) -> Vec<ItemId> {
        self.by_item.keys().copied().collect()
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.by_user.contains_key(&user_id)
    }

    pub fn num_users(&self) -> usize {
        self.by_user.len()
    }

    pub fn num_items(&self) -> usize {
        self.by_item.len()
    }

    pub fn num_preferences(&self) -> usize {
        self.num_preferences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> PreferenceStore {
        let mut store = PreferenceStore::new();
        store.put_preference(1, 10, 5.0).unwrap();
        store.put_preference(1, 20, 3.0).unwrap();
        store.put_preference(2, 10, 4.0).unwrap();
        store
    }

    #[test]
    fn test_both_views_are_maintained() {
        let store = sample_store();

        let user = store.preferences_for_user(1);
        assert_eq!(user.get(10), Some(5.0));
        assert_eq!(user.get(20), Some(3.0));

        let item = store.preferences_for_item(10);
        assert_eq!(item.get(1), Some(5.0));
        assert_eq!(item.get(2), Some(4.0));
    }

    #[test]
    fn test_ids_are_sorted() {
        let mut store = PreferenceStore::new();
        store.put_preference(9, 3, 1.0).unwrap();
        store.put_preference(2, 7, 1.0).unwrap();
        store.put_preference(5, 1, 1.0).unwrap();

        assert_eq!(store.all_user_ids(), vec![2, 5, 9]);
        assert_eq!(store.all_item_ids(), vec![1, 3, 7]);
    }

    #[test]
    fn test_unknown_ids_give_empty_vectors() {
        let store = sample_store();
        assert!(store.preferences_for_user(42).is_empty());
        assert!(store.preferences_for_item(42).is_empty());
        assert!(!store.contains_user(42));
    }

    #[test]
    fn test_overwrite_updates_both_views() {
        let mut store = sample_store();
        let previous = store.put_preference(1, 10, 2.0).unwrap();

        assert_eq!(previous, Some(5.0));
        assert_eq!(store.preference_value(1, 10), Some(2.0));
        assert_eq!(store.preferences_for_item(10).get(1), Some(2.0));
        assert_eq!(store.num_preferences(), 3);
    }

    #[test]
    fn test_reject_policy_refuses_duplicates() {
        let mut store = PreferenceStore::with_duplicate_policy(DuplicatePolicy::Reject);
        store.put_preference(1, 10, 5.0).unwrap();

        let result = store.put_preference(1, 10, 1.0);
        assert!(matches!(
            result,
            Err(AppError::DuplicatePreference {
                user_id: 1,
                item_id: 10
            })
        ));
        assert_eq!(store.preference_value(1, 10), Some(5.0));
    }

    #[test]
    fn test_invalid_records_leave_store_untouched() {
        let mut store = PreferenceStore::new();
        assert!(store.put_preference(-1, 10, 5.0).is_err());
        assert!(store.put_preference(1, 10, f64::NAN).is_err());
        assert_eq!(store.num_users(), 0);
        assert_eq!(store.num_items(), 0);
        assert_eq!(store.num_preferences(), 0);
    }
}
