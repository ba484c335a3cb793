//! Column label resolution against a [`ReverseAliasIndex`].

use std::collections::{HashMap, HashSet};
use std::fmt;

use merger_model::{ModelError, Table};
use serde::{Deserialize, Serialize};

use crate::index::{ReverseAliasIndex, build_index};
use crate::normalize::NormalizedKey;
use crate::registry::AliasRegistry;

/// How a label was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    Unmapped,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::Unmapped => "unmapped",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one input label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// The raw label as it appeared in the input.
    pub original: String,
    /// Standard name (or the original label when unmapped), before suffixing.
    pub resolved: String,
    /// Final column name; differs from `resolved` only when `collided`.
    pub rendered: String,
    pub kind: MatchKind,
    /// Set when a `_N` suffix was appended to keep names unique.
    pub collided: bool,
}

/// One row of a [`MappingReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub original: String,
    pub resolved: String,
    pub kind: MatchKind,
}

/// How each label of one resolution call was resolved, in input order.
///
/// Duplicate original labels each get their own entry. Resolved names are the
/// pre-suffix names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingReport {
    pub entries: Vec<MappingEntry>,
}

impl MappingReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }

    /// Entries that changed the label or matched fuzzily.
    pub fn changed(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries
            .iter()
            .filter(|e| e.kind != MatchKind::Unmapped && e.original != e.resolved)
    }

    pub fn count(&self, kind: MatchKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }
}

/// Result of [`resolve_columns`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub columns: Vec<ResolvedColumn>,
}

impl Resolution {
    /// Final, collision-free column names in input order.
    pub fn renamed_labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.rendered.clone()).collect()
    }

    pub fn report(&self) -> MappingReport {
        MappingReport {
            entries: self
                .columns
                .iter()
                .map(|c| MappingEntry {
                    original: c.original.clone(),
                    resolved: c.resolved.clone(),
                    kind: c.kind,
                })
                .collect(),
        }
    }

    pub fn collisions(&self) -> usize {
        self.columns.iter().filter(|c| c.collided).count()
    }
}

fn resolve_one(label: &str, index: &ReverseAliasIndex, fuzzy: bool) -> (String, MatchKind) {
    let key = NormalizedKey::new(label);
    if let Some(standard) = index.get(&key) {
        return (standard.to_string(), MatchKind::Exact);
    }
    if fuzzy && let Some((matched, standard)) = index.fuzzy(&key) {
        tracing::debug!(label, key = %matched, standard, "Fuzzy column match");
        return (standard.to_string(), MatchKind::Fuzzy);
    }
    (label.to_string(), MatchKind::Unmapped)
}

/// Resolves every label to a standard name (exact, then optionally fuzzy) or
/// passes it through, then makes the resulting names unique.
pub fn resolve_columns<S: AsRef<str>>(
    labels: &[S],
    index: &ReverseAliasIndex,
    fuzzy: bool,
) -> Resolution {
    let resolved: Vec<(String, MatchKind)> = labels
        .iter()
        .map(|label| resolve_one(label.as_ref(), index, fuzzy))
        .collect();
    let names: Vec<&str> = resolved.iter().map(|(name, _)| name.as_str()).collect();
    let rendered = ensure_unique_columns(&names);

    let columns = labels
        .iter()
        .zip(resolved.iter())
        .zip(rendered)
        .map(|((label, (name, kind)), (rendered, collided))| ResolvedColumn {
            original: label.as_ref().to_string(),
            resolved: name.clone(),
            rendered,
            kind: *kind,
            collided,
        })
        .collect();
    Resolution { columns }
}

/// Makes names unique by suffixing repeats with `_N`.
///
/// The first occurrence keeps its name. Later occurrences get `_1`, `_2`, ...
/// counted per name. A candidate that would equal any other name in the input,
/// or one already produced, is skipped by incrementing N. Returns each final
/// name with whether it was suffixed.
pub fn ensure_unique_columns<S: AsRef<str>>(names: &[S]) -> Vec<(String, bool)> {
    let originals: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut counters: HashMap<&str, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        let name = name.as_ref();
        if !taken.contains(name) {
            taken.insert(name.to_string());
            out.push((name.to_string(), false));
            continue;
        }
        let counter = counters.entry(name).or_insert(0);
        let candidate = loop {
            *counter += 1;
            let candidate = format!("{name}_{counter}");
            if !taken.contains(&candidate) && !originals.contains(candidate.as_str()) {
                break candidate;
            }
        };
        tracing::debug!(name, renamed = %candidate, "Column name collision");
        taken.insert(candidate.clone());
        out.push((candidate, true));
    }
    out
}

/// A resolver holding an index built from a registry snapshot.
#[derive(Debug, Clone, Default)]
pub struct ColumnResolver {
    index: ReverseAliasIndex,
}

impl ColumnResolver {
    pub fn new(registry: &AliasRegistry) -> Self {
        Self {
            index: build_index(registry),
        }
    }

    /// Rebuilds the index after the registry changed.
    pub fn rebuild(&mut self, registry: &AliasRegistry) {
        self.index = build_index(registry);
    }

    pub fn index(&self) -> &ReverseAliasIndex {
        &self.index
    }

    pub fn resolve<S: AsRef<str>>(&self, labels: &[S], fuzzy: bool) -> Resolution {
        resolve_columns(labels, &self.index, fuzzy)
    }

    /// Renames the columns of `table` in place and returns the resolution.
    pub fn resolve_table(
        &self,
        table: &mut Table,
        fuzzy: bool,
    ) -> Result<Resolution, ModelError> {
        let resolution = self.resolve(&table.column_names(), fuzzy);
        table.rename_columns(resolution.renamed_labels())?;
        tracing::debug!(
            table = table.name(),
            exact = resolution.columns.iter().filter(|c| c.kind == MatchKind::Exact).count(),
            fuzzy = resolution.columns.iter().filter(|c| c.kind == MatchKind::Fuzzy).count(),
            collisions = resolution.collisions(),
            "Resolved table columns"
        );
        Ok(resolution)
    }
}
