//! The search client: five query families over one trie.
//!
//! [`Searcher`] borrows an immutable trie and answers exact, common-prefix,
//! predictive, approximate, and approximate-predictive queries. Results
//! come back lazily (iterators) or through a sink closure that may stop
//! the walk by returning `false`. All sequences are in trie DFS order:
//! pre-order, children by ascending label.
//!
//! A searcher is cheap to create and single-threaded; give each thread its
//! own (the trie itself is freely shareable).

mod approx_iter;
mod walk;

pub use approx_iter::ApproxIter;
pub use walk::{PredictIter, PrefixIter};

use std::marker::PhantomData;
use std::ops::ControlFlow;

use crate::matcher::{EditMatcher, LevenshteinDfa};
use crate::text::Symbol;
use crate::trie::{FlatTrie, ROOT};

/// A key found by prefix or predictive search, with its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixHit<V> {
    /// The key.
    pub key: String,
    /// Associated value (`()` for sets).
    pub value: V,
}

/// A key found by approximate search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApproxHit<V> {
    /// The key.
    pub key: String,
    /// Associated value (`()` for sets).
    pub value: V,
    /// Levenshtein distance between the key and the query.
    pub edits: usize,
}

/// A key found by approximate predictive search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApproxPredictHit<V> {
    /// The key.
    pub key: String,
    /// Associated value (`()` for sets).
    pub value: V,
    /// Minimum distance between the query and any matched prefix of the key.
    pub prefix_edits: usize,
    /// Distance between the query and the whole key, counting every symbol
    /// fed past the pattern as one edit.
    pub whole_edits: usize,
}

/// Search client over a trie `T` with matcher strategy `M`.
///
/// # Example
///
/// ```rust
/// use sftindex::search::Searcher;
/// use sftindex::trie::TrieSet;
///
/// let trie: TrieSet = TrieSet::from_sorted(&["cam", "camp", "cap"]).unwrap();
/// let searcher = Searcher::new(&trie);
///
/// let keys: Vec<String> = searcher.predict("cam").map(|hit| hit.key).collect();
/// assert_eq!(keys, vec!["cam", "camp"]);
/// ```
pub struct Searcher<'t, T: FlatTrie, M = LevenshteinDfa<<T as FlatTrie>::Unit>> {
    trie: &'t T,
    _matcher: PhantomData<fn() -> M>,
}

impl<'t, T: FlatTrie> Searcher<'t, T> {
    /// A fresh client sharing `trie`, matching with the Levenshtein DFA.
    pub fn new(trie: &'t T) -> Self {
        Searcher {
            trie,
            _matcher: PhantomData,
        }
    }
}

impl<'t, T: FlatTrie, M: EditMatcher<T::Unit>> Searcher<'t, T, M> {
    /// A client with a custom matcher strategy.
    pub fn with_matcher(trie: &'t T) -> Self {
        Searcher {
            trie,
            _matcher: PhantomData,
        }
    }

    /// Is `query` a key of the dictionary?
    pub fn exact(&self, query: &str) -> bool {
        self.trie.contains_units(&T::Unit::units_of(query))
    }

    /// Every key that is a prefix of `query`, in increasing length.
    pub fn prefix(&self, query: &str) -> PrefixIter<'t, T> {
        PrefixIter::new(self.trie, T::Unit::units_of(query))
    }

    /// Every key having `query` as a prefix, in trie DFS order. An empty
    /// query enumerates the whole dictionary.
    pub fn predict(&self, query: &str) -> PredictIter<'t, T> {
        PredictIter::new(self.trie, T::Unit::units_of(query))
    }

    /// Every key within `max_edits` of `query`, lazily, in trie DFS order,
    /// with its exact distance.
    pub fn approx(&self, query: &str, max_edits: usize) -> ApproxIter<'t, T, M> {
        ApproxIter::new(self.trie, T::Unit::units_of(query), max_edits)
    }

    /// Sink form of [`approx`](Searcher::approx): calls `sink` for every
    /// hit in trie DFS order until it returns `false`.
    pub fn approx_into<F>(&self, query: &str, max_edits: usize, mut sink: F)
    where
        F: FnMut(ApproxHit<T::Value>) -> bool,
    {
        let units = T::Unit::units_of(query);
        let mut matcher = M::from_pattern(&units, max_edits);
        let mut key = Vec::new();
        let _ = self.approx_step(&mut matcher, ROOT, &mut key, &mut sink);
    }

    fn approx_step<F>(
        &self,
        matcher: &mut M,
        node: usize,
        key: &mut Vec<T::Unit>,
        sink: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(ApproxHit<T::Value>) -> bool,
    {
        if self.trie.is_match(node) && matcher.matched() {
            let hit = ApproxHit {
                key: T::Unit::render(key),
                value: self.trie.value_at(node),
                edits: matcher.distance(),
            };
            if !sink(hit) {
                return ControlFlow::Break(());
            }
        }
        if self.trie.is_leaf(node) {
            return ControlFlow::Continue(());
        }
        for child in self.trie.children(node) {
            let label = self.trie.label(child);
            if matcher.update(label) {
                key.push(label);
                let flow = self.approx_step(matcher, child, key, sink);
                key.pop();
                matcher.back();
                flow?;
            }
        }
        ControlFlow::Continue(())
    }

    /// Every key with some prefix within `max_edits` of `query`: the walk
    /// runs as [`approx`](Searcher::approx) until the first matched node,
    /// then collects that node's whole subtree. `prefix_edits` is the
    /// minimum distance over all matched prefixes of the key,
    /// `whole_edits` the distance of the whole key (one edit per symbol
    /// the matcher no longer consumed). The sink stops the walk by
    /// returning `false`.
    pub fn approx_predict_into<F>(&self, query: &str, max_edits: usize, mut sink: F)
    where
        F: FnMut(ApproxPredictHit<T::Value>) -> bool,
    {
        let units = T::Unit::units_of(query);
        let mut matcher = M::from_pattern(&units, max_edits);
        let mut key = Vec::new();
        let _ = self.approx_predict_step(&mut matcher, ROOT, &mut key, &mut sink);
    }

    fn approx_predict_step<F>(
        &self,
        matcher: &mut M,
        node: usize,
        key: &mut Vec<T::Unit>,
        sink: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(ApproxPredictHit<T::Value>) -> bool,
    {
        if matcher.matched() {
            let edits = matcher.distance();
            return self.collect_subtree(matcher, node, key, edits, edits, sink);
        }
        if self.trie.is_leaf(node) {
            return ControlFlow::Continue(());
        }
        for child in self.trie.children(node) {
            let label = self.trie.label(child);
            if matcher.update(label) {
                key.push(label);
                let flow = self.approx_predict_step(matcher, child, key, sink);
                key.pop();
                matcher.back();
                flow?;
            }
        }
        ControlFlow::Continue(())
    }

    fn collect_subtree<F>(
        &self,
        matcher: &mut M,
        node: usize,
        key: &mut Vec<T::Unit>,
        prefix_edits: usize,
        current_edits: usize,
        sink: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(ApproxPredictHit<T::Value>) -> bool,
    {
        if self.trie.is_match(node) {
            let hit = ApproxPredictHit {
                key: T::Unit::render(key),
                value: self.trie.value_at(node),
                prefix_edits: prefix_edits.min(current_edits),
                whole_edits: current_edits,
            };
            if !sink(hit) {
                return ControlFlow::Break(());
            }
        }
        if self.trie.is_leaf(node) {
            return ControlFlow::Continue(());
        }
        for child in self.trie.children(node) {
            let label = self.trie.label(child);
            key.push(label);
            // Keep feeding the matcher while the key is no longer than the
            // pattern and a bounded state remains; afterwards every further
            // symbol costs one edit.
            let flow = if current_edits <= matcher.max_distance()
                && key.len() <= matcher.pattern_len()
                && matcher.update(label)
            {
                let advanced = matcher.distance();
                let flow = self.collect_subtree(
                    matcher,
                    child,
                    key,
                    prefix_edits.min(advanced),
                    advanced,
                    sink,
                );
                matcher.back();
                flow
            } else {
                self.collect_subtree(matcher, child, key, prefix_edits, current_edits + 1, sink)
            };
            key.pop();
            flow?;
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::TrieSet;

    fn trie(keys: &[&str]) -> TrieSet {
        let mut sorted = keys.to_vec();
        sorted.sort_unstable();
        TrieSet::from_sorted(&sorted).unwrap()
    }

    #[test]
    fn approx_sink_can_stop_early() {
        let t = trie(&["a", "b", "c", "d"]);
        let s = Searcher::new(&t);
        let mut seen = Vec::new();
        s.approx_into("a", 1, |hit| {
            seen.push(hit.key);
            seen.len() < 2
        });
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn approx_predict_pivots_at_the_first_match() {
        let t = trie(&["cam", "camp", "camping", "cap"]);
        let s = Searcher::new(&t);
        let mut hits = Vec::new();
        s.approx_predict_into("cam", 0, |hit| {
            hits.push((hit.key, hit.prefix_edits, hit.whole_edits));
            true
        });
        assert_eq!(
            hits,
            vec![
                ("cam".to_string(), 0, 0),
                ("camp".to_string(), 0, 1),
                ("camping".to_string(), 0, 4),
            ]
        );
    }

    #[test]
    fn approx_predict_counts_unfed_symbols() {
        let t = trie(&["care", "caret", "carets"]);
        let s = Searcher::new(&t);
        let mut hits = Vec::new();
        s.approx_predict_into("cart", 1, |hit| {
            hits.push((hit.key, hit.prefix_edits, hit.whole_edits));
            true
        });
        // The walk pivots at "car" (distance 1). "care" is still fed to
        // the matcher; every symbol beyond the pattern length costs one.
        assert_eq!(
            hits,
            vec![
                ("care".to_string(), 1, 1),
                ("caret".to_string(), 1, 2),
                ("carets".to_string(), 1, 3),
            ]
        );
    }
}
