//! Lazy approximate search.
//!
//! The iterator keeps the invariant state of the joint walk: the matcher,
//! the partial key, and the path of sibling cursors from the root to the
//! current node. Each `next` resumes the depth-first traversal exactly
//! where the previous yield left it: descend to the first child while
//! transitions succeed, otherwise step to the next sibling, otherwise
//! unwind until a sibling is available.

use super::ApproxHit;
use crate::matcher::EditMatcher;
use crate::text::Symbol;
use crate::trie::{FlatTrie, ROOT};

/// Cursor into one sibling block.
#[derive(Clone, Copy)]
struct Cursor {
    node: usize,
    end: usize,
}

impl Cursor {
    fn incrementable(&self) -> bool {
        self.node + 1 < self.end
    }

    fn sibling(&self) -> Cursor {
        Cursor {
            node: self.node + 1,
            end: self.end,
        }
    }
}

/// Lazy iterator over the keys within the edit bound of a query, in trie
/// DFS order, each with its exact distance.
pub struct ApproxIter<'t, T: FlatTrie, M> {
    trie: &'t T,
    matcher: M,
    path: Vec<Cursor>,
    key: Vec<T::Unit>,
    started: bool,
}

impl<'t, T: FlatTrie, M: EditMatcher<T::Unit>> ApproxIter<'t, T, M> {
    pub(super) fn new(trie: &'t T, query: Vec<T::Unit>, max_edits: usize) -> Self {
        ApproxIter {
            trie,
            matcher: M::from_pattern(&query, max_edits),
            path: vec![Cursor {
                node: ROOT,
                end: ROOT + 1,
            }],
            key: Vec::new(),
            started: false,
        }
    }

    fn hit(&self, node: usize) -> ApproxHit<T::Value> {
        ApproxHit {
            key: T::Unit::render(&self.key),
            value: self.trie.value_at(node),
            edits: self.matcher.distance(),
        }
    }

    /// Enter `next`; reports whether the matcher accepted the edge.
    fn try_transition(&mut self, next: Cursor) -> bool {
        let label = self.trie.label(next.node);
        let accepted = self.matcher.update(label);
        self.path.push(next);
        self.key.push(label);
        accepted
    }

    /// Leave the current node, whose transition had succeeded.
    fn back_transition(&mut self) {
        self.path.pop();
        self.key.pop();
        self.matcher.back();
    }

    fn advance(&mut self) -> Option<ApproxHit<T::Value>> {
        let mut accepted = true;
        loop {
            let top = *self.path.last()?;
            if accepted && !self.trie.is_leaf(top.node) {
                // Descend to the first child.
                let range = self.trie.children(top.node);
                accepted = self.try_transition(Cursor {
                    node: range.start,
                    end: range.end,
                });
            } else if !accepted && self.path.len() > 1 && top.incrementable() {
                // The failed node is replaced by its next sibling.
                let next = top.sibling();
                self.path.pop();
                self.key.pop();
                accepted = self.try_transition(next);
            } else {
                if !accepted {
                    self.path.pop();
                    self.key.pop();
                }
                // Unwind to the nearest ancestor with a pending sibling.
                while self.path.len() > 1 {
                    let top = *self.path.last()?;
                    if top.incrementable() {
                        break;
                    }
                    self.back_transition();
                }
                if self.path.len() > 1 {
                    let next = self.path.last()?.sibling();
                    self.back_transition();
                    accepted = self.try_transition(next);
                } else {
                    self.path.pop();
                }
            }

            let top = match self.path.last() {
                Some(&cursor) => cursor,
                None => return None,
            };
            if accepted && self.trie.is_match(top.node) && self.matcher.matched() {
                return Some(self.hit(top.node));
            }
        }
    }
}

impl<T: FlatTrie, M: EditMatcher<T::Unit>> Iterator for ApproxIter<'_, T, M> {
    type Item = ApproxHit<T::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            // The root itself holds the empty key.
            if self.trie.is_match(ROOT) && self.matcher.matched() {
                return Some(self.hit(ROOT));
            }
        }
        self.advance()
    }
}
