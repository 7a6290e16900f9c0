// Longest-match search over a suffix array.

use std::cmp::Ordering;

/// Longest common prefix between a target slice and some old suffix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Match {
    /// Number of matching bytes.
    pub len: usize,
    /// Start of the matching suffix in the old sequence.
    pub pos: usize,
}

/// Find the old suffix sharing the longest prefix with `target`.
///
/// Binary-searches `sa` (as built by [`super::sort::suffix_sort`] over
/// `old`) until two neighbouring candidates remain, then measures both. On
/// equal lengths the lower candidate wins.
///
/// Probes compare only up to the shorter operand, so an old suffix that is a
/// proper prefix of `target` steers the search downward.
pub fn search(sa: &[usize], old: &[u8], target: &[u8]) -> Match {
    debug_assert_eq!(sa.len(), old.len() + 1);

    let mut start = 0;
    let mut end = sa.len() - 1;
    while end - start >= 2 {
        let mid = start + (end - start) / 2;
        if compare_truncated(&old[sa[mid]..], target) == Ordering::Less {
            start = mid;
        } else {
            end = mid;
        }
    }

    let start_len = common_prefix_len(&old[sa[start]..], target);
    let end_len = common_prefix_len(&old[sa[end]..], target);
    if start_len >= end_len {
        Match {
            len: start_len,
            pos: sa[start],
        }
    } else {
        Match {
            len: end_len,
            pos: sa[end],
        }
    }
}

/// Lexicographic compare of the first `min(a.len(), b.len())` bytes.
#[inline]
fn compare_truncated(a: &[u8], b: &[u8]) -> Ordering {
    let n = a.len().min(b.len());
    a[..n].cmp(&b[..n])
}

#[inline]
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
