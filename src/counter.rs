//! Insertion-ordered frequency counting.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Counts occurrences of keys and remembers the order in which each key was
/// first seen. A key that was never counted reads as 0.
#[derive(Debug, Clone)]
pub struct FrequencyTable<K> {
    counts: HashMap<K, u64>,
    order: Vec<K>,
    total: u64,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
            order: Vec::new(),
            total: 0,
        }
    }
}

impl<K: Eq + Hash + Clone> FrequencyTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `key`.
    pub fn add(&mut self, key: K) {
        self.add_n(key, 1);
    }

    /// Record `n` occurrences of `key`. Adding zero still registers the key.
    pub fn add_n(&mut self, key: K, n: u64) {
        match self.counts.get_mut(&key) {
            Some(count) => *count += n,
            None => {
                self.order.push(key.clone());
                self.counts.insert(key, n);
            }
        }
        self.total += n;
    }

    pub fn add_all<I: IntoIterator<Item = K>>(&mut self, keys: I) {
        for key in keys {
            self.add(key);
        }
    }

    /// Additive merge. Keys new to `self` are appended in `other`'s order.
    pub fn merge(&mut self, other: &FrequencyTable<K>) {
        for (key, count) in other.iter() {
            self.add_n(key.clone(), count);
        }
    }

    pub fn get<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Keys with their counts, in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> + '_ {
        self.order.iter().map(move |k| (k, self.counts[k]))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.order.iter()
    }

    /// Entries sorted by count, highest first. Equal counts keep their
    /// first-insertion order.
    pub fn most_common(&self) -> Vec<(K, u64)> {
        let mut sorted: Vec<(K, u64)> = self.iter().map(|(k, c)| (k.clone(), c)).collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for FrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        table.add_all(iter);
        table
    }
}

/// Equality compares counts only, not insertion order.
impl<K: Eq + Hash> PartialEq for FrequencyTable<K> {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}
