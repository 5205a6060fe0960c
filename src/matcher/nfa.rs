//! Reference Levenshtein automaton over `(position, cost)` configurations.
//!
//! After the simple-and-fast formulation by Jules Jacobs: a configuration
//! holds, for each reachable pattern position, the cheapest way to reach
//! it. `step` advances all pairs by one input symbol, applying insertion,
//! deletion, and substitution relaxations in a single left-to-right pass.

use std::collections::BTreeSet;

use smallvec::SmallVec;

use crate::text::Symbol;

/// One automaton configuration: `(position, cost)` pairs, position
/// ascending, minimal cost per position.
pub type NfaConfig = SmallVec<[(u32, u32); 8]>;

/// Nondeterministic Levenshtein automaton for one pattern and bound.
///
/// Recognizes exactly the strings within `max_edits` of `pattern`. Used
/// directly only as the reference; queries run on the
/// [`LevenshteinDfa`](super::LevenshteinDfa) built from it.
#[derive(Clone, Debug)]
pub struct LevenshteinNfa<U> {
    pattern: Vec<U>,
    max_edits: u32,
}

impl<U: Symbol> LevenshteinNfa<U> {
    /// Automaton for `pattern` with bound `max_edits`.
    pub fn new(pattern: Vec<U>, max_edits: usize) -> Self {
        LevenshteinNfa {
            pattern,
            max_edits: max_edits as u32,
        }
    }

    /// The query pattern.
    pub fn pattern(&self) -> &[U] {
        &self.pattern
    }

    /// The edit bound.
    pub fn max_edits(&self) -> usize {
        self.max_edits as usize
    }

    /// Initial configuration: `(i, i)` for `i ≤ min(k, |pattern|)`,
    /// reaching position `i` by deleting the first `i` pattern symbols.
    pub fn start(&self) -> NfaConfig {
        let top = self.max_edits.min(self.pattern.len() as u32);
        (0..=top).map(|i| (i, i)).collect()
    }

    /// Advance a configuration by one input symbol.
    pub fn step(&self, states: &NfaConfig, symbol: U) -> NfaConfig {
        let mut next = NfaConfig::new();

        // Insertion of a leading symbol keeps position 0 reachable.
        if let Some(&(position, cost)) = states.first() {
            if position == 0 && cost < self.max_edits {
                next.push((0, cost + 1));
            }
        }

        for (j, &(position, cost)) in states.iter().enumerate() {
            if position as usize == self.pattern.len() {
                break;
            }
            let hit = self.pattern[position as usize] == symbol;
            let mut advanced = cost + u32::from(!hit);
            if let Some(&(last_position, last_cost)) = next.last() {
                if last_position == position {
                    // Deletion: skip this pattern symbol instead.
                    advanced = advanced.min(last_cost + 1);
                }
            }
            if let Some(&(next_position, next_cost)) = states.get(j + 1) {
                if next_position == position + 1 {
                    // Substitution relative to the already-cheaper successor.
                    advanced = advanced.min(next_cost + 1);
                }
            }
            if advanced <= self.max_edits {
                next.push((position + 1, advanced));
            }
        }

        next
    }

    /// Does the configuration accept (reach the end of the pattern)?
    pub fn is_match(&self, states: &NfaConfig) -> bool {
        states
            .last()
            .is_some_and(|&(position, _)| position as usize == self.pattern.len())
    }

    /// Can the configuration still lead anywhere?
    pub fn can_match(&self, states: &NfaConfig) -> bool {
        !states.is_empty()
    }

    /// The "interesting" alphabet: distinct pattern symbols, ascending.
    /// Every other symbol behaves like the wildcard.
    pub fn transitions(&self) -> Vec<U> {
        self.pattern
            .iter()
            .copied()
            .collect::<BTreeSet<U>>()
            .into_iter()
            .collect()
    }
}
