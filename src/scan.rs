//! Sibling-block search shared by the trie and the DFA transition table.

/// Block widths at or below this are scanned linearly.
pub(crate) const LINEAR_SPAN: usize = 16;

/// First position in `[begin, end)` whose key is not less than `target`.
///
/// Halves the range while it is wider than [`LINEAR_SPAN`], then scans the
/// remainder linearly; the caller finishes with an equality test.
pub(crate) fn lower_bound<K, F>(mut begin: usize, end: usize, target: K, key: F) -> usize
where
    K: Ord + Copy,
    F: Fn(usize) -> K,
{
    let mut width = end - begin;
    while width > LINEAR_SPAN {
        let half = width / 2;
        if key(begin + half) < target {
            begin += half + 1;
            width -= half + 1;
        } else {
            width = half;
        }
    }
    let stop = begin + width;
    while begin < stop && key(begin) < target {
        begin += 1;
    }
    begin
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(items: &[u32], target: u32) -> usize {
        lower_bound(0, items.len(), target, |i| items[i])
    }

    #[test]
    fn empty_range() {
        assert_eq!(probe(&[], 5), 0);
    }

    #[test]
    fn short_block_linear() {
        let items = [2, 4, 6, 8];
        assert_eq!(probe(&items, 4), 1);
        assert_eq!(probe(&items, 5), 2);
        assert_eq!(probe(&items, 9), 4);
        assert_eq!(probe(&items, 1), 0);
    }

    #[test]
    fn wide_block_halving() {
        let items: Vec<u32> = (0..100).map(|i| i * 2).collect();
        for target in 0..200 {
            let expect = items.partition_point(|&v| v < target);
            assert_eq!(probe(&items, target), expect, "target {target}");
        }
    }

    #[test]
    fn offset_range() {
        let items = [9, 9, 1, 3, 5, 9];
        assert_eq!(lower_bound(2, 5, 4, |i| items[i]), 4);
        assert_eq!(lower_bound(2, 5, 6, |i| items[i]), 5);
    }
}
