//! Lazy prefix and predictive walks.

use std::ops::Range;

use super::PrefixHit;
use crate::text::Symbol;
use crate::trie::{FlatTrie, ROOT};

/// Lazy common-prefix search: every key that is a prefix of the query, in
/// increasing length. Includes the empty key when the dictionary holds it.
pub struct PrefixIter<'t, T: FlatTrie> {
    trie: &'t T,
    query: Vec<T::Unit>,
    node: usize,
    consumed: usize,
    done: bool,
}

impl<'t, T: FlatTrie> PrefixIter<'t, T> {
    pub(super) fn new(trie: &'t T, query: Vec<T::Unit>) -> Self {
        PrefixIter {
            trie,
            query,
            node: ROOT,
            consumed: 0,
            done: false,
        }
    }
}

impl<T: FlatTrie> Iterator for PrefixIter<'_, T> {
    type Item = PrefixHit<T::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let node = self.node;
            let length = self.consumed;
            let emit = self.trie.is_match(node);

            // Step to the next query symbol before yielding.
            if self.consumed == self.query.len() || self.trie.is_leaf(node) {
                self.done = true;
            } else {
                match self.trie.child_with(node, self.query[self.consumed]) {
                    Some(child) => {
                        self.node = child;
                        self.consumed += 1;
                    }
                    None => self.done = true,
                }
            }

            if emit {
                return Some(PrefixHit {
                    key: T::Unit::render(&self.query[..length]),
                    value: self.trie.value_at(node),
                });
            }
        }
        None
    }
}

/// Lazy predictive search: every key having the query as a prefix, in trie
/// DFS order. An empty query enumerates the whole dictionary.
pub struct PredictIter<'t, T: FlatTrie> {
    trie: &'t T,
    /// Query units plus the labels of the nodes entered below it.
    key: Vec<T::Unit>,
    /// Pivot node, present until its own match flag has been tested.
    pivot: Option<usize>,
    /// Child ranges of the nodes on the current DFS path; the first frame
    /// belongs to the pivot and contributes no label of its own.
    frames: Vec<Range<usize>>,
}

impl<'t, T: FlatTrie> PredictIter<'t, T> {
    pub(super) fn new(trie: &'t T, query: Vec<T::Unit>) -> Self {
        let pivot = trie.locate(&query);
        PredictIter {
            trie,
            key: query,
            pivot,
            frames: Vec::new(),
        }
    }
}

impl<T: FlatTrie> Iterator for PredictIter<'_, T> {
    type Item = PrefixHit<T::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(pivot) = self.pivot.take() {
            self.frames.push(self.trie.children(pivot));
            if self.trie.is_match(pivot) {
                return Some(PrefixHit {
                    key: T::Unit::render(&self.key),
                    value: self.trie.value_at(pivot),
                });
            }
        }

        while let Some(frame) = self.frames.last_mut() {
            match frame.next() {
                Some(node) => {
                    self.key.push(self.trie.label(node));
                    self.frames.push(self.trie.children(node));
                    if self.trie.is_match(node) {
                        return Some(PrefixHit {
                            key: T::Unit::render(&self.key),
                            value: self.trie.value_at(node),
                        });
                    }
                }
                None => {
                    self.frames.pop();
                    if !self.frames.is_empty() {
                        self.key.pop();
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::super::Searcher;
    use crate::trie::{TrieMap, TrieSet};

    fn set(keys: &[&str]) -> TrieSet {
        TrieSet::from_sorted(keys).unwrap()
    }

    #[test]
    fn prefix_yields_in_increasing_length() {
        let t = set(&["a", "am", "amp", "cap"]);
        let s = Searcher::new(&t);
        let keys: Vec<String> = s.prefix("amplify").map(|h| h.key).collect();
        assert_eq!(keys, vec!["a", "am", "amp"]);
    }

    #[test]
    fn prefix_includes_the_empty_key() {
        let t = set(&["", "ab"]);
        let s = Searcher::new(&t);
        let keys: Vec<String> = s.prefix("abc").map(|h| h.key).collect();
        assert_eq!(keys, vec!["", "ab"]);
    }

    #[test]
    fn prefix_of_missing_stem_is_empty() {
        let t = set(&["am", "amp"]);
        let s = Searcher::new(&t);
        assert_eq!(s.prefix("bmp").count(), 0);
        assert_eq!(s.prefix("").count(), 0);
    }

    #[test]
    fn predict_enumerates_the_subtree_in_order() {
        let t = set(&["a", "am", "amd", "amp", "ca", "cam"]);
        let s = Searcher::new(&t);
        let keys: Vec<String> = s.predict("a").map(|h| h.key).collect();
        assert_eq!(keys, vec!["a", "am", "amd", "amp"]);
    }

    #[test]
    fn predict_with_empty_query_enumerates_everything() {
        let all = ["a", "am", "amd", "amp", "ca", "cam"];
        let t = set(&all);
        let s = Searcher::new(&t);
        let keys: Vec<String> = s.predict("").map(|h| h.key).collect();
        assert_eq!(keys, all.to_vec());
    }

    #[test]
    fn predict_misses_absent_stems() {
        let t = set(&["am", "amp"]);
        let s = Searcher::new(&t);
        assert_eq!(s.predict("b").count(), 0);
        assert_eq!(s.predict("amd").count(), 0);
        assert_eq!(s.predict("ampx").count(), 0);
    }

    #[test]
    fn predict_carries_values() {
        let m: TrieMap<u32> =
            TrieMap::from_sorted(&[("am", 1), ("amd", 2), ("amp", 3), ("ca", 4)]).unwrap();
        let s = Searcher::new(&m);
        let hits: Vec<(String, u32)> = s.predict("am").map(|h| (h.key, h.value)).collect();
        assert_eq!(
            hits,
            vec![
                ("am".to_string(), 1),
                ("amd".to_string(), 2),
                ("amp".to_string(), 3)
            ]
        );
    }
}
