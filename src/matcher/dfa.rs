//! Deterministic Levenshtein automaton, built lazily per query.
//!
//! Depth-first subset construction over NFA configurations. Each
//! discovered state emits a wildcard transition (the zero unit, standing
//! for every symbol outside the pattern alphabet) plus one labeled
//! transition per pattern symbol whose target differs from the wildcard
//! target. Transitions live in one flat array sorted by `(state, label)`
//! with the wildcard ordered last, so a state's block is
//! `[start(s), start(s + 1))` with a sentinel state closing the last
//! block, and the labeled lookup is the same halving-then-linear scan as
//! the trie's sibling search.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use super::nfa::{LevenshteinNfa, NfaConfig};
use super::EditMatcher;
use crate::scan;
use crate::text::Symbol;

#[derive(Clone, Copy, Debug)]
struct State {
    start: u32,
    matched: bool,
    edits: u32,
}

#[derive(Clone, Copy, Debug)]
struct Transition<U> {
    from: u32,
    to: u32,
    label: U,
}

/// Deterministic matcher for one pattern and bound.
///
/// Drives the trie walk: [`update`](EditMatcher::update) follows one edge
/// symbol, [`back`](EditMatcher::back) restores the exact prior state by
/// popping the internal state-id stack, never by reversing transitions.
///
/// A state's reported distance is the minimum cost over its accepting
/// pairs when it accepts, so [`distance`](EditMatcher::distance) at a
/// matched node is the true Levenshtein distance of the fed prefix.
#[derive(Clone, Debug)]
pub struct LevenshteinDfa<U: Symbol> {
    pattern: Vec<U>,
    max_edits: u32,
    states: Vec<State>,
    transitions: Vec<Transition<U>>,
    stack: Vec<u32>,
}

struct Explorer<'n, U: Symbol> {
    nfa: &'n LevenshteinNfa<U>,
    ids: FxHashMap<NfaConfig, u32>,
    states: Vec<State>,
    transitions: Vec<Transition<U>>,
}

impl<U: Symbol> Explorer<'_, U> {
    fn explore(&mut self, alphabet: &[U], config: NfaConfig) -> u32 {
        if let Some(&id) = self.ids.get(&config) {
            return id;
        }
        let id = self.states.len() as u32;
        self.ids.insert(config.clone(), id);

        let matched = self.nfa.is_match(&config);
        let pattern_len = self.nfa.pattern().len() as u32;
        let mut edits = self.nfa.max_edits() as u32 + 1;
        for &(position, cost) in &config {
            if (!matched || position == pattern_len) && cost < edits {
                edits = cost;
            }
        }
        self.states.push(State {
            start: 0,
            matched,
            edits,
        });

        let wildcard = self.explore(alphabet, self.nfa.step(&config, U::NULL));
        self.transitions.push(Transition {
            from: id,
            to: wildcard,
            label: U::NULL,
        });

        for &label in alphabet {
            let target = self.explore(alphabet, self.nfa.step(&config, label));
            if target != wildcard {
                self.transitions.push(Transition {
                    from: id,
                    to: target,
                    label,
                });
            }
        }

        id
    }
}

impl<U: Symbol> LevenshteinDfa<U> {
    /// Determinize a reference automaton.
    pub fn from_nfa(nfa: &LevenshteinNfa<U>) -> Self {
        let alphabet = nfa.transitions();
        let mut explorer = Explorer {
            nfa,
            ids: FxHashMap::default(),
            states: Vec::new(),
            transitions: Vec::new(),
        };
        explorer.explore(&alphabet, nfa.start());

        let Explorer {
            mut states,
            mut transitions,
            ..
        } = explorer;

        // Stable sort by (state, label), wildcard greatest, so each
        // state's block ends with its wildcard edge.
        transitions.sort_by(|a, b| {
            a.from
                .cmp(&b.from)
                .then_with(|| wildcard_last(a.label, b.label))
        });
        for (at, transition) in transitions.iter().enumerate() {
            let from = transition.from as usize;
            if at == 0 || transitions[at - 1].from < transition.from {
                states[from].start = at as u32;
            }
        }
        // Sentinel state closes the last block.
        states.push(State {
            start: transitions.len() as u32,
            matched: false,
            edits: nfa.max_edits() as u32 + 1,
        });

        LevenshteinDfa {
            pattern: nfa.pattern().to_vec(),
            max_edits: nfa.max_edits() as u32,
            states,
            transitions,
            stack: vec![0],
        }
    }

    /// Build directly from a pattern and bound.
    pub fn new(pattern: Vec<U>, max_edits: usize) -> Self {
        Self::from_nfa(&LevenshteinNfa::new(pattern, max_edits))
    }

    /// The query pattern.
    pub fn pattern(&self) -> &[U] {
        &self.pattern
    }

    /// Number of deterministic states, sentinel excluded.
    pub fn state_count(&self) -> usize {
        self.states.len() - 1
    }

    fn current(&self) -> usize {
        debug_assert!(!self.stack.is_empty());
        self.stack.last().copied().unwrap_or(0) as usize
    }
}

fn wildcard_last<U: Symbol>(a: U, b: U) -> Ordering {
    match (a == U::NULL, b == U::NULL) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(&b),
    }
}

impl<U: Symbol> EditMatcher<U> for LevenshteinDfa<U> {
    fn from_pattern(pattern: &[U], max_edits: usize) -> Self {
        Self::new(pattern.to_vec(), max_edits)
    }

    fn update(&mut self, label: U) -> bool {
        let state = self.current();
        let begin = self.states[state].start as usize;
        let end = self.states[state + 1].start as usize;
        // The wildcard edge sits at end - 1; labeled edges before it.
        let last = end - 1;
        let at = scan::lower_bound(begin, last, label, |i| self.transitions[i].label);
        let taken = if at < last && self.transitions[at].label == label {
            at
        } else {
            last
        };
        let next = self.transitions[taken].to as usize;
        if self.states[next].edits <= self.max_edits {
            self.stack.push(next as u32);
            true
        } else {
            false
        }
    }

    fn back(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn matched(&self) -> bool {
        self.states[self.current()].matched
    }

    fn distance(&self) -> usize {
        self.states[self.current()].edits as usize
    }

    fn max_distance(&self) -> usize {
        self.max_edits as usize
    }

    fn pattern_len(&self) -> usize {
        self.pattern.len()
    }
}
