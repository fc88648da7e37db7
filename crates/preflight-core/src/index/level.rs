//! Name storage for a single level of the hierarchy.

use indexmap::{IndexMap, IndexSet};

/// Normalized names of one level, in first-seen order, with original casing.
///
/// One ordered map backs the existence set, the candidate list and the
/// casing map, so the three views cannot drift apart.
#[derive(Debug, Clone, Default)]
pub(crate) struct NameLevel {
    names: IndexMap<String, String>,
}

impl NameLevel {
    /// Registers `normalized` with its `original` casing. The first casing
    /// seen for a key is kept; returns whether the key was new.
    pub(crate) fn insert(&mut self, normalized: &str, original: &str) -> bool {
        if self.names.contains_key(normalized) {
            return false;
        }
        self.names
            .insert(normalized.to_string(), original.to_string());
        true
    }

    pub(crate) fn contains(&self, normalized: &str) -> bool {
        self.names.contains_key(normalized)
    }

    pub(crate) fn original(&self, normalized: &str) -> Option<&str> {
        self.names.get(normalized).map(String::as_str)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.keys().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}

/// Normalized names within one parent (tables of a schema, columns of a table).
pub(crate) type ScopedNames = IndexSet<String>;
