// Suffix index over the old sequence.
//
// This module provides:
// - Suffix sorting by prefix doubling (`sort`)
// - Longest-match search over the sorted suffixes (`search`)

pub mod search;
pub mod sort;

pub use search::Match;

/// Sorted suffixes of one old sequence, including the empty suffix.
///
/// `as_slice()[k]` is the start of the `k`-th smallest suffix, so
/// `old[sa[k]..] <= old[sa[k + 1]..]` for every `k`. Entry 0 is always
/// `old.len()` (the empty suffix).
///
/// The index takes `size_of::<usize>() * (old.len() + 1)` bytes and sorting
/// needs a second array of the same size; this dominates memory use when
/// creating a patch.
pub struct SuffixIndex<'a> {
    old: &'a [u8],
    sa: Vec<usize>,
}

impl<'a> SuffixIndex<'a> {
    /// Sort every suffix of `old`.
    pub fn new(old: &'a [u8]) -> Self {
        Self {
            old,
            sa: sort::suffix_sort(old),
        }
    }

    /// The sequence this index was built over.
    pub fn old(&self) -> &'a [u8] {
        self.old
    }

    /// Suffix start positions in sorted order. Entry 0 is the empty suffix
    /// at `old.len()`.
    pub fn as_slice(&self) -> &[usize] {
        &self.sa
    }

    /// Number of suffixes (old length plus the empty suffix).
    pub fn len(&self) -> usize {
        self.sa.len()
    }

    /// Always false: the empty suffix is indexed even for empty old data.
    pub fn is_empty(&self) -> bool {
        self.sa.is_empty()
    }

    /// Longest prefix of `target` that occurs anywhere in the old sequence.
    pub fn longest_match(&self, target: &[u8]) -> Match {
        search::search(&self.sa, self.old, target)
    }
}

impl std::fmt::Debug for SuffixIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuffixIndex")
            .field("old_len", &self.old.len())
            .finish()
    }
}
