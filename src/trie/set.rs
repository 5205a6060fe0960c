//! The set flavor: keys only.

use std::ops::Range;

use super::builder::{build_layout, BuildError};
use super::node::{IndexUnit, Node};
use super::{children_of, FlatTrie, NodeHandle, ROOT};
use crate::text::Symbol;

/// A succinct flat trie over keys without associated values.
///
/// Immutable after construction; share it freely across threads and hand
/// each thread its own [`Searcher`](crate::search::Searcher).
///
/// # Example
///
/// ```rust
/// use sftindex::trie::TrieSet;
///
/// let trie: TrieSet = TrieSet::from_sorted(&["am", "amd", "cad"]).unwrap();
/// assert!(trie.contains("amd"));
/// assert!(!trie.contains("am d"));
/// ```
#[derive(Clone, Debug)]
pub struct TrieSet<U: Symbol = u8, I: IndexUnit = u32> {
    pub(super) nodes: Vec<Node<U, I>>,
    pub(super) key_count: usize,
}

impl<U: Symbol, I: IndexUnit> TrieSet<U, I> {
    /// Build from keys already in ascending order without duplicates.
    ///
    /// Fails fast on unsorted or duplicated input; see
    /// [`sort_keys`](crate::text::sort_keys) for preparation.
    pub fn from_sorted<S: AsRef<str>>(keys: &[S]) -> Result<Self, BuildError> {
        let units: Vec<Vec<U>> = keys.iter().map(|k| U::units_of(k.as_ref())).collect();
        Self::from_sorted_units(units)
    }

    /// Build from pre-decomposed unit sequences in ascending order.
    pub fn from_sorted_units(keys: Vec<Vec<U>>) -> Result<Self, BuildError> {
        let layout = build_layout::<U, I>(&keys)?;
        Ok(TrieSet {
            nodes: layout.nodes,
            key_count: keys.len(),
        })
    }

    /// Is the string a key of the dictionary?
    pub fn contains(&self, key: &str) -> bool {
        self.contains_units(&U::units_of(key))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.key_count
    }

    /// Is the dictionary empty?
    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }

    /// Handle on the root slot.
    pub fn root(&self) -> NodeHandle<'_, Self> {
        NodeHandle::new(self, ROOT)
    }
}

impl<U: Symbol, I: IndexUnit> FlatTrie for TrieSet<U, I> {
    type Unit = U;
    type Value = ();

    fn key_count(&self) -> usize {
        self.key_count
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn is_match(&self, node: usize) -> bool {
        self.nodes[node].is_match()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.nodes[node].is_leaf()
    }

    fn label(&self, node: usize) -> U {
        self.nodes[node].label()
    }

    fn children(&self, node: usize) -> Range<usize> {
        children_of(&self.nodes, node)
    }

    fn value_at(&self, _node: usize) {}
}
