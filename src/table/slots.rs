//! Ordered, integer-keyed storage with splice support.

use std::collections::BTreeMap;
use std::collections::btree_map;

/// Sparse ordered slots addressed by `usize` keys.
///
/// Keys need not be contiguous. [`Slots::insert_shift`] splices a value in
/// at a key and moves every entry at or after it one slot further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slots<T> {
    entries: BTreeMap<usize, T>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> Slots<T> {
    /// Empty slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots from explicit `(key, value)` pairs; a repeated key keeps the
    /// last value.
    pub fn from_entries(entries: impl IntoIterator<Item = (usize, T)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `key`.
    #[must_use]
    pub fn get(&self, key: usize) -> Option<&T> {
        self.entries.get(&key)
    }

    /// Mutable value at `key`.
    pub fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        self.entries.get_mut(&key)
    }

    /// Whether `key` is occupied.
    #[must_use]
    pub fn contains(&self, key: usize) -> bool {
        self.entries.contains_key(&key)
    }

    /// Put a value at `key`, returning what was there.
    pub fn set(&mut self, key: usize, value: T) -> Option<T> {
        self.entries.insert(key, value)
    }

    /// Remove the value at `key` without moving other entries.
    pub fn remove(&mut self, key: usize) -> Option<T> {
        self.entries.remove(&key)
    }

    /// Append after the last occupied slot.
    pub fn push(&mut self, value: T) -> usize {
        let key = self.next_key();
        self.entries.insert(key, value);
        key
    }

    /// Key one past the last occupied slot (0 when empty).
    #[must_use]
    pub fn next_key(&self) -> usize {
        self.entries.last_key_value().map_or(0, |(&key, _)| key + 1)
    }

    /// Put a value at `key`, first moving every entry at or after `key`
    /// one slot further.
    pub fn insert_shift(&mut self, key: usize, value: T) {
        self.insert_shift_by(key, value, 1);
    }

    /// Put a value at `key`, first moving every entry at or after `key`
    /// `amount` slots further.
    pub fn insert_shift_by(&mut self, key: usize, value: T, amount: usize) {
        let tail = self.entries.split_off(&key);
        self.entries.extend(tail.into_iter().map(|(k, v)| (k + amount, v)));
        self.entries.insert(key, value);
    }

    /// Re-key the entries `0..len` keeping their order.
    pub fn compact(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        self.entries = entries.into_values().enumerate().collect();
    }

    /// Occupied slots in key order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &T)> {
        self.entries.iter().map(|(&k, v)| (k, v))
    }

    /// Mutable occupied slots in key order.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (usize, &mut T)> {
        self.entries.iter_mut().map(|(&k, v)| (k, v))
    }

    /// Values in key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.entries.values()
    }

    /// Keys in order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(usize, &mut T) -> bool) {
        self.entries.retain(|&k, v| keep(k, v));
    }
}

impl<T> FromIterator<T> for Slots<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().enumerate().collect(),
        }
    }
}

impl<T> IntoIterator for Slots<T> {
    type Item = (usize, T);
    type IntoIter = btree_map::IntoIter<usize, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
