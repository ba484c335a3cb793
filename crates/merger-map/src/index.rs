//! Reverse lookup from normalized alias to standard name.

use std::collections::HashMap;

use crate::normalize::NormalizedKey;
use crate::registry::AliasRegistry;

/// Keys shorter than this (in characters) never take part in fuzzy matching.
pub const MIN_FUZZY_KEY_LEN: usize = 2;

/// Mapping of [`NormalizedKey`] to standard name, derived from an
/// [`AliasRegistry`] snapshot.
///
/// The index is not tied to the registry it was built from; rebuild it after
/// every registry mutation.
#[derive(Debug, Clone, Default)]
pub struct ReverseAliasIndex {
    /// Keys in first-insertion order with their current standard name.
    entries: Vec<(NormalizedKey, String)>,
    positions: HashMap<NormalizedKey, usize>,
    /// Entry positions sorted by key length descending, ties by insertion.
    fuzzy_order: Vec<usize>,
}

impl ReverseAliasIndex {
    fn insert(&mut self, key: NormalizedKey, standard: &str) {
        match self.positions.get(&key) {
            Some(&pos) => {
                let slot = &mut self.entries[pos].1;
                if slot != standard {
                    tracing::debug!(
                        key = %key,
                        previous = %slot,
                        standard,
                        "Alias key reassigned"
                    );
                }
                *slot = standard.to_string();
            }
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, standard.to_string()));
            }
        }
    }

    fn finish(&mut self) {
        let mut order: Vec<usize> = (0..self.entries.len())
            .filter(|&pos| self.entries[pos].0.char_len() >= MIN_FUZZY_KEY_LEN)
            .collect();
        // sort_by_key is stable, so equal lengths keep insertion order
        order.sort_by_key(|&pos| std::cmp::Reverse(self.entries[pos].0.char_len()));
        self.fuzzy_order = order;
    }

    /// Exact lookup of an already-normalized key.
    pub fn get(&self, key: &NormalizedKey) -> Option<&str> {
        self.positions
            .get(key)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    /// Exact lookup of a raw label.
    pub fn exact(&self, label: &str) -> Option<&str> {
        self.get(&NormalizedKey::new(label))
    }

    /// Longest key contained in `key`, with its standard name.
    pub fn fuzzy(&self, key: &NormalizedKey) -> Option<(&NormalizedKey, &str)> {
        if key.is_empty() {
            return None;
        }
        self.fuzzy_order.iter().find_map(|&pos| {
            let (candidate, standard) = &self.entries[pos];
            key.as_str()
                .contains(candidate.as_str())
                .then_some((candidate, standard.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys and standard names in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedKey, &str)> {
        self.entries.iter().map(|(key, std)| (key, std.as_str()))
    }
}

/// Builds the reverse index.
///
/// For each entry, in registry order, the standard name's own key is inserted
/// and then every alias key. A later insertion of an existing key overwrites
/// its standard name. Aliases that normalize to the empty key are skipped.
pub fn build_index(registry: &AliasRegistry) -> ReverseAliasIndex {
    let mut index = ReverseAliasIndex::default();
    for entry in registry.entries() {
        index.insert(NormalizedKey::new(&entry.standard), &entry.standard);
        for alias in &entry.aliases {
            let key = NormalizedKey::new(alias);
            if key.is_empty() {
                continue;
            }
            index.insert(key, &entry.standard);
        }
    }
    index.finish();
    tracing::debug!(keys = index.len(), "Built reverse alias index");
    index
}
