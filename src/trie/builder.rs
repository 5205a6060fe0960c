//! Construction of the flat node array from sorted keys.
//!
//! A work stack of pending nodes is processed depth-first: a pending node
//! emits its whole child block at the end of the array and pushes the
//! children, first child on top. Because the first child is processed
//! immediately after its parent's block, its own `next` lands exactly at
//! the end of that block, which is what makes the O(1) child-range
//! computation `[next(i), next(first_child))` sound.

use thiserror::Error;

use super::node::{max_next, IndexUnit, Node};
use crate::text::Symbol;

/// Failures while building a trie from prepared input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The input keys were not in ascending lexicographic order.
    #[error("keys are not sorted: key at position {index} is out of order")]
    Unsorted {
        /// Position of the first offending key.
        index: usize,
    },

    /// The same key appeared twice.
    #[error("duplicate key at position {index}")]
    Duplicate {
        /// Position of the second occurrence.
        index: usize,
    },

    /// The node array outgrew the packable range of the offset type.
    #[error("node count {nodes} exceeds the capacity of the offset type ({max})")]
    CapacityExceeded {
        /// Nodes required so far.
        nodes: usize,
        /// Largest packable offset.
        max: u64,
    },

    /// A key contained the reserved zero unit.
    #[error("key at position {index} contains the reserved zero unit")]
    ReservedUnit {
        /// Position of the offending key.
        index: usize,
    },
}

/// Node array plus per-node value slots (key ranks at match nodes).
#[derive(Debug)]
pub(crate) struct Layout<U, I> {
    pub nodes: Vec<Node<U, I>>,
    pub value_ids: Vec<I>,
}

/// Pending node: index in the array, key range passing through it, depth.
struct Pending {
    node: usize,
    lo: usize,
    hi: usize,
    depth: usize,
}

pub(crate) fn build_layout<U: Symbol, I: IndexUnit>(
    keys: &[Vec<U>],
) -> Result<Layout<U, I>, BuildError> {
    verify_sorted(keys)?;

    let mut nodes: Vec<Node<U, I>> = Vec::with_capacity(keys.len() * 2 + 2);
    let mut value_ids: Vec<I> = Vec::with_capacity(keys.len() * 2 + 2);
    let root_match = keys.first().is_some_and(|k| k.is_empty());
    nodes.push(Node::new(0, root_match, false, U::NULL));
    value_ids.push(I::from_raw(0));

    let mut stack = vec![Pending {
        node: 0,
        lo: 0,
        hi: keys.len(),
        depth: 0,
    }];

    while let Some(Pending {
        node,
        lo,
        hi,
        depth,
    }) = stack.pop()
    {
        let next = nodes.len();
        nodes[node].set_next(next);

        // The shortest key through this node may terminate here; it was
        // already marked on the node and takes no child edge.
        let mut lo = lo;
        if lo < hi && keys[lo].len() == depth {
            lo += 1;
        }
        if lo == hi {
            nodes[node].mark_leaf();
            continue;
        }

        if nodes.len() as u64 + (hi - lo) as u64 + 1 > max_next::<I>() {
            return Err(BuildError::CapacityExceeded {
                nodes: nodes.len() + (hi - lo) + 1,
                max: max_next::<I>(),
            });
        }

        let first_child = nodes.len();
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        let mut i = lo;
        while i < hi {
            let symbol = keys[i][depth];
            if symbol == U::NULL {
                return Err(BuildError::ReservedUnit { index: i });
            }
            let j = i + keys[i..hi].partition_point(|k| k[depth] == symbol);
            let terminates = keys[i].len() == depth + 1;
            nodes.push(Node::new(0, terminates, false, symbol));
            value_ids.push(I::from_raw(if terminates { i as u64 } else { 0 }));
            ranges.push((i, j));
            i = j;
        }

        for (offset, &(clo, chi)) in ranges.iter().enumerate().rev() {
            stack.push(Pending {
                node: first_child + offset,
                lo: clo,
                hi: chi,
                depth: depth + 1,
            });
        }
    }

    // Sentinel: terminates the child range of the last real node; its
    // `next` equals the final array length.
    let total = nodes.len() + 1;
    if total as u64 > max_next::<I>() {
        return Err(BuildError::CapacityExceeded {
            nodes: total,
            max: max_next::<I>(),
        });
    }
    nodes.push(Node::new(total, false, false, U::NULL));
    value_ids.push(I::from_raw(0));

    Ok(Layout { nodes, value_ids })
}

fn verify_sorted<U: Symbol>(keys: &[Vec<U>]) -> Result<(), BuildError> {
    for (index, pair) in keys.windows(2).enumerate() {
        match pair[0].cmp(&pair[1]) {
            std::cmp::Ordering::Less => {}
            std::cmp::Ordering::Equal => return Err(BuildError::Duplicate { index: index + 1 }),
            std::cmp::Ordering::Greater => return Err(BuildError::Unsorted { index: index + 1 }),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(keys: &[&str]) -> Vec<Vec<u8>> {
        keys.iter().map(|k| k.bytes().collect()).collect()
    }

    fn layout(keys: &[&str]) -> Layout<u8, u32> {
        build_layout(&units(keys)).unwrap()
    }

    #[test]
    fn empty_input_is_a_lone_leaf_root() {
        let l = layout(&[]);
        assert_eq!(l.nodes.len(), 2);
        assert!(l.nodes[0].is_leaf());
        assert!(!l.nodes[0].is_match());
        assert_eq!(l.nodes[1].next(), 2);
    }

    #[test]
    fn empty_key_marks_the_root() {
        let l = layout(&[""]);
        assert!(l.nodes[0].is_match());
        assert!(l.nodes[0].is_leaf());
        assert_eq!(l.nodes.len(), 2);
    }

    #[test]
    fn siblings_are_contiguous_and_sorted() {
        let l = layout(&["b", "d", "f"]);
        // root + 3 children + sentinel
        assert_eq!(l.nodes.len(), 5);
        assert_eq!(l.nodes[0].next(), 1);
        let labels: Vec<u8> = (1..4).map(|i| l.nodes[i].label()).collect();
        assert_eq!(labels, vec![b'b', b'd', b'f']);
        assert!((1..4).all(|i| l.nodes[i].is_match() && l.nodes[i].is_leaf()));
    }

    #[test]
    fn child_range_invariant_holds() {
        let l = layout(&["am", "amd", "cad", "cam", "cm", "dm"]);
        let nodes = &l.nodes;
        // For every non-leaf node, the block [next, next(first_child))
        // contains exactly its children, label-ascending.
        for i in 0..nodes.len() - 1 {
            if nodes[i].is_leaf() {
                continue;
            }
            let begin = nodes[i].next();
            let end = nodes[begin].next();
            assert!(begin > i && end > begin, "node {i}");
            for pair in nodes[begin..end].windows(2) {
                assert!(pair[0].label() < pair[1].label());
            }
        }
    }

    #[test]
    fn match_nodes_carry_key_ranks() {
        let keys = ["am", "amd", "cad"];
        let l = layout(&keys);
        let mut seen = vec![];
        for (i, n) in l.nodes.iter().enumerate() {
            if n.is_match() {
                seen.push(l.value_ids[i].to_raw() as usize);
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn unsorted_input_fails_fast() {
        let err = build_layout::<u8, u32>(&units(&["b", "a"])).unwrap_err();
        assert_eq!(err, BuildError::Unsorted { index: 1 });
    }

    #[test]
    fn duplicate_input_fails_fast() {
        let err = build_layout::<u8, u32>(&units(&["a", "a"])).unwrap_err();
        assert_eq!(err, BuildError::Duplicate { index: 1 });
    }

    #[test]
    fn reserved_unit_is_rejected() {
        let err = build_layout::<u8, u32>(&[vec![b'a', 0]]).unwrap_err();
        assert_eq!(err, BuildError::ReservedUnit { index: 0 });
    }
}
