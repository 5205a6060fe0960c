//! Index façades bundling a trie with its searcher factory.
//!
//! [`IndexSet`] and [`IndexMap`] own the trie, handle sorting and
//! deduplication on build, persist through the flat `SFTI` format, and
//! hand out fresh [`Searcher`](crate::search::Searcher)s sharing the
//! trie. Values of a map remain mutable in place through
//! [`trie_mut`](IndexMap::trie_mut); keys never change.

use std::io::{Read, Write};
use std::path::Path;

use crate::search::Searcher;
use crate::text::{sort_pairs, Symbol};
use crate::trie::{BuildError, IndexUnit, PersistError, TrieMap, TrieSet, ValueUnit};

/// An index over keys without values.
///
/// # Example
///
/// ```rust
/// use sftindex::index::IndexSet;
///
/// let index: IndexSet = IndexSet::build(["amp", "am", "cad", "am"]).unwrap();
/// assert_eq!(index.len(), 3);
/// assert!(index.searcher().exact("amp"));
/// ```
#[derive(Clone, Debug)]
pub struct IndexSet<U: Symbol = u8, I: IndexUnit = u32> {
    trie: TrieSet<U, I>,
}

impl<U: Symbol, I: IndexUnit> IndexSet<U, I> {
    /// Build from keys in any order; duplicates are dropped.
    pub fn build<S: AsRef<str>>(keys: impl IntoIterator<Item = S>) -> Result<Self, BuildError> {
        let mut units: Vec<Vec<U>> = keys
            .into_iter()
            .map(|key| U::units_of(key.as_ref()))
            .collect();
        units.sort_unstable();
        units.dedup();
        Ok(IndexSet {
            trie: TrieSet::from_sorted_units(units)?,
        })
    }

    /// Build from keys already sorted and unique; fails fast otherwise.
    pub fn from_sorted<S: AsRef<str>>(keys: &[S]) -> Result<Self, BuildError> {
        Ok(IndexSet {
            trie: TrieSet::from_sorted(keys)?,
        })
    }

    /// Load an image previously written by [`save`](IndexSet::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        Ok(IndexSet {
            trie: TrieSet::load(path)?,
        })
    }

    /// Load an image from a reader.
    pub fn load_from<R: Read>(reader: &mut R) -> Result<Self, PersistError> {
        Ok(IndexSet {
            trie: TrieSet::load_from(reader)?,
        })
    }

    /// Save the image to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        self.trie.save(path)
    }

    /// Save the image to a writer.
    pub fn save_to<W: Write>(&self, writer: &mut W) -> Result<(), PersistError> {
        self.trie.save_to(writer)
    }

    /// A fresh search client sharing this index's trie.
    pub fn searcher(&self) -> Searcher<'_, TrieSet<U, I>> {
        Searcher::new(&self.trie)
    }

    /// The underlying trie.
    pub fn trie(&self) -> &TrieSet<U, I> {
        &self.trie
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    /// Is the index empty?
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }
}

/// An index mapping each key to a value.
///
/// # Example
///
/// ```rust
/// use sftindex::index::IndexMap;
///
/// let index: IndexMap<i64> = IndexMap::build([("cad", 3), ("am", 1)]).unwrap();
/// assert_eq!(index.trie().get("cad"), Some(&3));
///
/// let close: Vec<_> = index
///     .searcher()
///     .approx("cat", 1)
///     .map(|hit| (hit.key, hit.value, hit.edits))
///     .collect();
/// assert_eq!(close, vec![("cad".to_string(), 3, 1)]);
/// ```
#[derive(Clone, Debug)]
pub struct IndexMap<V, U: Symbol = u8, I: IndexUnit = u32> {
    trie: TrieMap<V, U, I>,
}

impl<V: Clone, U: Symbol, I: IndexUnit> IndexMap<V, U, I> {
    /// Build from key–value pairs in any order; for duplicate keys the
    /// first value wins.
    pub fn build<S: AsRef<str> + Ord>(
        pairs: impl IntoIterator<Item = (S, V)>,
    ) -> Result<Self, BuildError> {
        let mut pairs: Vec<(S, V)> = pairs.into_iter().collect();
        sort_pairs(&mut pairs);
        Ok(IndexMap {
            trie: TrieMap::from_sorted(&pairs)?,
        })
    }

    /// Build from pairs with keys already sorted and unique.
    pub fn from_sorted<S: AsRef<str>>(pairs: &[(S, V)]) -> Result<Self, BuildError> {
        Ok(IndexMap {
            trie: TrieMap::from_sorted(pairs)?,
        })
    }

    /// A fresh search client sharing this index's trie.
    pub fn searcher(&self) -> Searcher<'_, TrieMap<V, U, I>> {
        Searcher::new(&self.trie)
    }

    /// The underlying trie.
    pub fn trie(&self) -> &TrieMap<V, U, I> {
        &self.trie
    }

    /// The underlying trie, mutably: values may be replaced in place,
    /// keys cannot change.
    pub fn trie_mut(&mut self) -> &mut TrieMap<V, U, I> {
        &mut self.trie
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    /// Is the index empty?
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }
}

impl<V: ValueUnit, U: Symbol, I: IndexUnit> IndexMap<V, U, I> {
    /// Load an image previously written by [`save`](IndexMap::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        Ok(IndexMap {
            trie: TrieMap::load(path)?,
        })
    }

    /// Load an image from a reader.
    pub fn load_from<R: Read>(reader: &mut R) -> Result<Self, PersistError> {
        Ok(IndexMap {
            trie: TrieMap::load_from(reader)?,
        })
    }

    /// Save the image to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        self.trie.save(path)
    }

    /// Save the image to a writer.
    pub fn save_to<W: Write>(&self, writer: &mut W) -> Result<(), PersistError> {
        self.trie.save_to(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_sorts_and_dedups() {
        let index: IndexSet = IndexSet::build(["cm", "am", "cm", "amd"]).unwrap();
        assert_eq!(index.len(), 3);
        let s = index.searcher();
        assert!(s.exact("am"));
        assert!(s.exact("amd"));
        assert!(s.exact("cm"));
    }

    #[test]
    fn map_build_keeps_first_value_of_duplicates() {
        let index: IndexMap<u32> = IndexMap::build([("b", 2), ("a", 1), ("b", 9)]).unwrap();
        assert_eq!(index.trie().get("b"), Some(&2));
    }

    #[test]
    fn map_values_mutate_through_trie_mut() {
        let mut index: IndexMap<u32> = IndexMap::build([("am", 1), ("cm", 2)]).unwrap();
        *index.trie_mut().get_mut("cm").unwrap() = 20;
        assert_eq!(index.trie().get("cm"), Some(&20));
    }

    #[test]
    fn set_stream_round_trip() {
        let index: IndexSet = IndexSet::build(["am", "amd", "cad"]).unwrap();
        let mut image = Vec::new();
        index.save_to(&mut image).unwrap();
        let loaded = IndexSet::<u8, u32>::load_from(&mut &image[..]).unwrap();
        assert_eq!(loaded.len(), 3);
        assert!(loaded.searcher().exact("cad"));
    }
}
