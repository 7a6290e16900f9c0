// Suffix sorting by prefix doubling (Larsson-Sadakane qsufsort).
//
// Suffixes start bucketed by their first byte. Each round refines every
// still-tied group by the rank of the suffix `h` bytes further on, doubling
// `h` until all ranks are distinct.
//
// State lives in two arrays of length n + 1:
//   sa[k]    suffix start, or a negative run marker (`sa[k] == -len` means
//            `len` consecutive positions starting at k are already sorted)
//   rank[i]  group id of suffix i, the index of the last slot of its group
//
// The empty suffix (position n) has rank 0 and acts as the sentinel.

use log::trace;

/// Tied groups shorter than this are refined by a selection scan rather
/// than a three-way partition.
const SMALL_GROUP: usize = 16;

/// Return the suffix array of `old`: `n + 1` suffix starts in sorted order,
/// the empty suffix first.
pub fn suffix_sort(old: &[u8]) -> Vec<usize> {
    let n = old.len();

    let mut buckets = [0usize; 256];
    for &b in old {
        buckets[b as usize] += 1;
    }
    for i in 1..256 {
        buckets[i] += buckets[i - 1];
    }
    for i in (1..256).rev() {
        buckets[i] = buckets[i - 1];
    }
    buckets[0] = 0;

    // Slot 0 belongs to the empty suffix; byte buckets fill 1..=n.
    let mut sa = vec![0isize; n + 1];
    for (i, &b) in old.iter().enumerate() {
        buckets[b as usize] += 1;
        sa[buckets[b as usize]] = i as isize;
    }

    // buckets[c] now holds the last slot of bucket c.
    let mut rank = vec![0isize; n + 1];
    for (i, &b) in old.iter().enumerate() {
        rank[i] = buckets[b as usize] as isize;
    }

    for i in 1..256 {
        if buckets[i] == buckets[i - 1] + 1 {
            sa[buckets[i]] = -1;
        }
    }
    sa[0] = -1;

    let done = -(n as isize + 1);
    let mut h = 1;
    while sa[0] != done {
        trace!("suffix sort: refining at depth {h}");
        refine(&mut sa, &mut rank, h);
        h += h;
    }

    for (i, &r) in rank.iter().enumerate() {
        sa[r as usize] = i as isize;
    }

    sa.into_iter().map(|s| s as usize).collect()
}

/// One doubling round: split every unsorted group and merge adjacent sorted
/// runs into a single negative marker.
fn refine(sa: &mut [isize], rank: &mut [isize], h: usize) {
    let total = sa.len();
    let mut sorted_run = 0usize;
    let mut i = 0usize;

    while i < total {
        if sa[i] < 0 {
            let run = (-sa[i]) as usize;
            sorted_run += run;
            i += run;
        } else {
            if sorted_run != 0 {
                sa[i - sorted_run] = -(sorted_run as isize);
            }
            let group = (rank[sa[i] as usize] + 1) as usize - i;
            split(sa, rank, i, group, h);
            i += group;
            sorted_run = 0;
        }
    }

    if sorted_run != 0 {
        sa[i - sorted_run] = -(sorted_run as isize);
    }
}

/// Sort key of slot `k` at depth `h`.
#[inline]
fn key(sa: &[isize], rank: &[isize], k: usize, h: usize) -> isize {
    rank[sa[k] as usize + h]
}

/// Refine the tied group `sa[start..start + len]` by the rank found `h`
/// bytes into each suffix.
fn split(sa: &mut [isize], rank: &mut [isize], mut start: usize, mut len: usize, h: usize) {
    // The lower partition recurses; the upper one loops.
    loop {
        if len < SMALL_GROUP {
            split_small(sa, rank, start, len, h);
            return;
        }

        let pivot = key(sa, rank, start + len / 2, h);

        let mut less = 0;
        let mut equal = 0;
        for k in start..start + len {
            let v = key(sa, rank, k, h);
            if v < pivot {
                less += 1;
            } else if v == pivot {
                equal += 1;
            }
        }
        let lo = start + less;
        let hi = lo + equal;

        let mut i = start;
        let mut j = 0;
        let mut k = 0;
        while i < lo {
            let v = key(sa, rank, i, h);
            if v < pivot {
                i += 1;
            } else if v == pivot {
                sa.swap(i, lo + j);
                j += 1;
            } else {
                sa.swap(i, hi + k);
                k += 1;
            }
        }
        while lo + j < hi {
            if key(sa, rank, lo + j, h) == pivot {
                j += 1;
            } else {
                sa.swap(lo + j, hi + k);
                k += 1;
            }
        }

        if lo > start {
            split(sa, rank, start, lo - start, h);
        }

        let group_rank = (hi - 1) as isize;
        for slot in lo..hi {
            rank[sa[slot] as usize] = group_rank;
        }
        if lo == hi - 1 {
            sa[lo] = -1;
        }

        if start + len > hi {
            len = start + len - hi;
            start = hi;
        } else {
            return;
        }
    }
}

/// Selection-style refinement for small groups: repeatedly pull every
/// element with the smallest key to the front and give them a shared rank.
fn split_small(sa: &mut [isize], rank: &mut [isize], start: usize, len: usize, h: usize) {
    let end = start + len;
    let mut k = start;

    while k < end {
        let mut j = 1;
        let mut x = key(sa, rank, k, h);
        for i in 1..end - k {
            let v = key(sa, rank, k + i, h);
            if v < x {
                x = v;
                j = 0;
            }
            if v == x {
                sa.swap(k + j, k + i);
                j += 1;
            }
        }

        let group_rank = (k + j - 1) as isize;
        for slot in k..k + j {
            rank[sa[slot] as usize] = group_rank;
        }
        if j == 1 {
            sa[k] = -1;
        }
        k += j;
    }
}
