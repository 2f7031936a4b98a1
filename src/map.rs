//! Ordered, case-normalizing name registry.
//!
//! [`NameMap`] wraps an [`IndexMap`] and is used for both the section registry of a
//! [`Document`](crate::Document) and the key registry of a [`Section`](crate::Section).
//! Insertion order is write-back order, so entries are removed with
//! [`IndexMap::shift_remove`] to keep the remaining order intact.
//!
//! When case folding is enabled, names are lowercased before they are stored or
//! looked up, and the lowercased form is what gets written back.

use indexmap::IndexMap;

/// An insertion-ordered map from normalized names to entries.
///
/// # Examples
///
/// ```rust
/// use ini_doc::NameMap;
///
/// let mut map = NameMap::new(true);
/// map.insert("Author", 1);
/// map.insert("b", 2);
///
/// assert_eq!(map.get("AUTHOR"), Some(&1));
/// let names: Vec<_> = map.names().collect();
/// assert_eq!(names, vec!["author", "b"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NameMap<V> {
    entries: IndexMap<String, V>,
    fold_case: bool,
}

impl<V> NameMap<V> {
    /// Creates an empty map, folding names to lowercase when `fold_case` is set.
    #[must_use]
    pub fn new(fold_case: bool) -> Self {
        NameMap {
            entries: IndexMap::new(),
            fold_case,
        }
    }

    /// Returns the stored form of `name`.
    #[must_use]
    pub fn normalize(&self, name: &str) -> String {
        if self.fold_case {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Inserts an entry, returning the previous entry under the same normalized name.
    ///
    /// A replaced entry keeps its position.
    pub fn insert(&mut self, name: &str, value: V) -> Option<V> {
        let name = self.normalize(name);
        self.entries.insert(name, value)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&V> {
        if self.fold_case {
            self.entries.get(&name.to_lowercase())
        } else {
            self.entries.get(name)
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        if self.fold_case {
            self.entries.get_mut(&name.to_lowercase())
        } else {
            self.entries.get_mut(name)
        }
    }

    /// Returns the entry for `name`, inserting the result of `create` first if absent.
    pub fn get_or_insert_with<F>(&mut self, name: &str, create: F) -> &mut V
    where
        F: FnOnce(String) -> V,
    {
        let name = self.normalize(name);
        self.entries
            .entry(name)
            .or_insert_with_key(|name| create(name.clone()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes an entry, preserving the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<V> {
        let name = self.normalize(name);
        self.entries.shift_remove(&name)
    }

    /// Position of `name` in insertion order.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.get_index_of(&self.normalize(name))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, V> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> indexmap::map::ValuesMut<'_, String, V> {
        self.entries.values_mut()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, V> {
        self.entries.iter()
    }
}

impl<V> Default for NameMap<V> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<'a, V> IntoIterator for &'a NameMap<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = indexmap::map::Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_sensitive_by_default() {
        let mut map = NameMap::default();
        map.insert("Key", 1);
        assert!(map.get("key").is_none());
        assert_eq!(map.get("Key"), Some(&1));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map = NameMap::new(false);
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            map.insert(name, i);
        }
        assert_eq!(map.remove("b"), Some(1));
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(map.index_of("c"), Some(1));
    }

    #[test]
    fn test_get_or_insert_with_receives_normalized_name() {
        let mut map: NameMap<String> = NameMap::new(true);
        let stored = map.get_or_insert_with("MiXeD", |name| name);
        assert_eq!(stored, "mixed");
        map.get_or_insert_with("MIXED", |_| unreachable!());
        assert_eq!(map.len(), 1);
    }
}
