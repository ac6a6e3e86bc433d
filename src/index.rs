//! Candidate indexing by the character found at crossing positions.
//!
//! An index is built once per request from that request's freshly retrieved
//! candidates and borrows them; it is never mutated afterwards or shared
//! across requests.
//!
//! Buckets are stable (candidates keep their retrieval order) and keys are
//! remembered in first-appearance order, so iterating an index is
//! deterministic for a fixed candidate list.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::word_record::WordRecord;

/// Candidates grouped by a key derived from each one.
#[derive(Debug, Clone)]
pub struct KeyedIndex<'a, K> {
    buckets: HashMap<K, Vec<&'a Arc<WordRecord>>>,
    /// Keys in the order their first candidate appeared.
    key_order: Vec<K>,
    /// How many candidates landed in some bucket.
    indexed: usize,
}

/// Candidates keyed by the character at one position.
pub type PositionIndex<'a> = KeyedIndex<'a, char>;

/// Candidates keyed by the characters at two positions.
pub type PairIndex<'a> = KeyedIndex<'a, (char, char)>;

impl<'a, K: Copy + Eq + Hash> KeyedIndex<'a, K> {
    /// Group `candidates` by `key_of`; candidates for which it returns `None`
    /// are left out.
    fn build(candidates: &'a [Arc<WordRecord>], key_of: impl Fn(&WordRecord) -> Option<K>) -> Self {
        let mut buckets: HashMap<K, Vec<&'a Arc<WordRecord>>> = HashMap::new();
        let mut key_order = Vec::new();
        let mut indexed = 0;

        for candidate in candidates {
            let Some(key) = key_of(candidate.as_ref()) else {
                continue;
            };
            buckets
                .entry(key)
                .or_insert_with(|| {
                    key_order.push(key);
                    Vec::new()
                })
                .push(candidate);
            indexed += 1;
        }

        debug_assert_eq!(key_order.len(), buckets.len(), "every bucket must have exactly one ordered key");
        KeyedIndex { buckets, key_order, indexed }
    }

    /// The bucket for `key`, empty if no candidate has it.
    #[must_use]
    pub fn get(&self, key: K) -> &[&'a Arc<WordRecord>] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Buckets in first-appearance order of their key.
    pub fn iter(&self) -> impl Iterator<Item = (K, &[&'a Arc<WordRecord>])> + '_ {
        self.key_order.iter().map(move |&key| (key, self.get(key)))
    }

    /// Distinct keys in first-appearance order.
    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.key_order
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.key_order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key_order.is_empty()
    }

    /// Number of candidates that were long enough to be indexed.
    #[must_use]
    pub fn indexed_count(&self) -> usize {
        self.indexed
    }
}

/// Index candidates by the character at a 1-based `position` of their
/// normalized form. Words too short for `position` are silently left out.
#[must_use]
pub fn index_by_position(candidates: &[Arc<WordRecord>], position: usize) -> PositionIndex<'_> {
    KeyedIndex::build(candidates, |record| record.char_at(position))
}

/// Index candidates by the pair of characters at two 1-based positions.
/// Words too short for either position are left out.
#[must_use]
pub fn index_by_pair(candidates: &[Arc<WordRecord>], first: usize, second: usize) -> PairIndex<'_> {
    KeyedIndex::build(candidates, |record| Some((record.char_at(first)?, record.char_at(second)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(words: &[&str]) -> Vec<Arc<WordRecord>> {
        words.iter().map(|w| Arc::new(WordRecord::new(w))).collect()
    }

    fn keys_of(bucket: &[&Arc<WordRecord>]) -> Vec<String> {
        bucket.iter().map(|r| r.normalized.clone()).collect()
    }

    #[test]
    fn test_index_groups_by_character() {
        let candidates = records(&["seau", "sel", "veau", "sot"]);
        let index = index_by_position(&candidates, 1);
        assert_eq!(keys_of(index.get('S')), vec!["SEAU", "SEL", "SOT"]);
        assert_eq!(keys_of(index.get('V')), vec!["VEAU"]);
        assert!(index.get('X').is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_index_is_stable() {
        let candidates = records(&["tesor", "temps", "tesla", "tes", "tenu"]);
        let index = index_by_position(&candidates, 3);
        assert_eq!(keys_of(index.get('S')), vec!["TESOR", "TESLA", "TES"]);
        assert_eq!(keys_of(index.get('M')), vec!["TEMPS"]);
        assert_eq!(keys_of(index.get('N')), vec!["TENU"]);
    }

    #[test]
    fn test_index_skips_short_words() {
        let candidates = records(&["au", "seau", "a"]);
        let index = index_by_position(&candidates, 3);
        assert_eq!(keys_of(index.get('A')), vec!["SEAU"]);
        assert_eq!(index.indexed_count(), 1);
    }

    #[test]
    fn test_index_position_zero_indexes_nothing() {
        let candidates = records(&["au", "seau"]);
        let index = index_by_position(&candidates, 0);
        assert!(index.is_empty());
        assert_eq!(index.indexed_count(), 0);
    }

    #[test]
    fn test_keys_in_first_appearance_order() {
        let candidates = records(&["veau", "seau", "beau", "sel", "vin"]);
        let index = index_by_position(&candidates, 1);
        assert_eq!(index.keys(), &['V', 'S', 'B']);
        let order: Vec<char> = index.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!['V', 'S', 'B']);
    }

    #[test]
    fn test_pair_index() {
        let candidates = records(&["tas", "tes", "ta", "tus", "tis"]);
        let index = index_by_pair(&candidates, 1, 3);
        assert_eq!(keys_of(index.get(('T', 'S'))), vec!["TAS", "TES", "TUS", "TIS"]);
        assert_eq!(index.indexed_count(), 4);

        let index = index_by_pair(&candidates, 2, 3);
        assert_eq!(keys_of(index.get(('E', 'S'))), vec!["TES"]);
        assert_eq!(index.get(('A', 'S')).len(), 1);
        assert_eq!(index.keys(), &[('A', 'S'), ('E', 'S'), ('U', 'S'), ('I', 'S')]);
    }

    #[test]
    fn test_index_shares_records() {
        let candidates = records(&["seau"]);
        let index = index_by_position(&candidates, 1);
        assert!(Arc::ptr_eq(index.get('S')[0], &candidates[0]));
    }
}
