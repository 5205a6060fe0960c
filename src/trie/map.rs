//! The map flavor: keys with associated values.

use std::ops::Range;

use super::builder::{build_layout, BuildError};
use super::node::{IndexUnit, Node};
use super::{children_of, FlatTrie, NodeHandle, ROOT};
use crate::text::Symbol;

/// A succinct flat trie mapping each key to a value.
///
/// Shares the node layout of [`TrieSet`](super::TrieSet); every match node
/// additionally carries a `value_index` into the parallel value array,
/// which holds the values in key order. Keys are immutable after
/// construction, values may be replaced in place through
/// [`values_mut`](TrieMap::values_mut) / [`get_mut`](TrieMap::get_mut).
#[derive(Clone, Debug)]
pub struct TrieMap<V, U: Symbol = u8, I: IndexUnit = u32> {
    pub(super) nodes: Vec<Node<U, I>>,
    pub(super) value_ids: Vec<I>,
    pub(super) values: Vec<V>,
    pub(super) key_count: usize,
}

impl<V: Clone, U: Symbol, I: IndexUnit> TrieMap<V, U, I> {
    /// Build from key–value pairs with keys already in ascending order
    /// without duplicates.
    ///
    /// Fails fast on unsorted or duplicated keys; see
    /// [`sort_pairs`](crate::text::sort_pairs) for preparation.
    pub fn from_sorted<S: AsRef<str>>(pairs: &[(S, V)]) -> Result<Self, BuildError> {
        let units: Vec<Vec<U>> = pairs.iter().map(|(k, _)| U::units_of(k.as_ref())).collect();
        let values: Vec<V> = pairs.iter().map(|(_, v)| v.clone()).collect();
        Self::from_sorted_units(units, values)
    }

    /// Build from pre-decomposed unit sequences and their values.
    pub fn from_sorted_units(keys: Vec<Vec<U>>, values: Vec<V>) -> Result<Self, BuildError> {
        debug_assert_eq!(keys.len(), values.len());
        let layout = build_layout::<U, I>(&keys)?;
        Ok(TrieMap {
            nodes: layout.nodes,
            value_ids: layout.value_ids,
            values,
            key_count: keys.len(),
        })
    }

    /// Look up the value of a key.
    pub fn get(&self, key: &str) -> Option<&V> {
        let node = self.locate(&U::units_of(key))?;
        self.nodes[node]
            .is_match()
            .then(|| &self.values[self.value_ids[node].to_raw() as usize])
    }

    /// Mutable access to the value of a key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let node = self.locate(&U::units_of(key))?;
        if !self.nodes[node].is_match() {
            return None;
        }
        Some(&mut self.values[self.value_ids[node].to_raw() as usize])
    }

    /// Is the string a key of the dictionary?
    pub fn contains(&self, key: &str) -> bool {
        self.contains_units(&U::units_of(key))
    }

    /// The values, in key order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// The values, in key order, mutably. Keys cannot change.
    pub fn values_mut(&mut self) -> &mut [V] {
        &mut self.values
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

impl<V: Clone, U: Symbol, I: IndexUnit> FlatTrie for TrieMap<V, U, I> {
    type Unit = U;
    type Value = V;

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

    fn value_at(&self, node: usize) -> V {
        self.values[self.value_ids[node].to_raw() as usize].clone()
    }
}
