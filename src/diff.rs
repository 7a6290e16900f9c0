// Delta scan: turns (old, new) into control triples plus diff/extra payloads.
//
// The scan walks the new sequence asking the suffix index for the longest
// match at each position, while keeping a running score of how many bytes
// the previous match's alignment would already cover. A boundary is
// committed when the fresh match is exactly as good as staying on the old
// alignment, or more than 8 bytes better. At each boundary:
//   1. Extend the previous match forward by the prefix maximising
//      2 * matches - length.
//   2. Extend the new match backward by the same score, never past the
//      previous boundary.
//   3. If the two extensions overlap, split the overlap where the forward
//      alignment stops winning.
//   4. Emit (forward length, gap length, old seek) and the payload bytes.

use crate::format::Control;
use crate::index::SuffixIndex;

/// A new-sequence match is accepted outright once it beats the previous
/// alignment by more than this many bytes.
const MIN_GAIN: isize = 8;

/// Streaming delta scan over one (old, new) pair.
///
/// Iterating yields control triples in order; the diff and extra payload
/// buffers grow as each triple is produced. Together they are a complete
/// reconstruction program for `new`.
///
/// ```
/// use oxidiff::diff::DiffEncoder;
/// use oxidiff::index::SuffixIndex;
///
/// let old = b"the quick brown fox";
/// let new = b"the quick red fox";
/// let index = SuffixIndex::new(old);
/// let mut encoder = DiffEncoder::new(&index, new);
/// let controls: Vec<_> = encoder.by_ref().collect();
/// let copied: i64 = controls.iter().map(|c| c.copy).sum();
/// assert_eq!(copied as usize, encoder.diff_payload().len());
/// ```
pub struct DiffEncoder<'a> {
    index: &'a SuffixIndex<'a>,
    old: &'a [u8],
    new: &'a [u8],
    scan: usize,
    len: usize,
    pos: usize,
    last_scan: usize,
    last_pos: usize,
    last_offset: isize,
    diff: Vec<u8>,
    extra: Vec<u8>,
    controls: u64,
    overlaps: u64,
}

/// Payload buffers left over once the scan is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payloads {
    /// Bytewise `new - old` over every copy region.
    pub diff: Vec<u8>,
    /// Literal new bytes over every gap.
    pub extra: Vec<u8>,
}

impl<'a> DiffEncoder<'a> {
    pub fn new(index: &'a SuffixIndex<'a>, new: &'a [u8]) -> Self {
        Self {
            index,
            old: index.old(),
            new,
            scan: 0,
            len: 0,
            pos: 0,
            last_scan: 0,
            last_pos: 0,
            last_offset: 0,
            diff: Vec::new(),
            extra: Vec::new(),
            controls: 0,
            overlaps: 0,
        }
    }

    /// Diff bytes emitted so far.
    pub fn diff_payload(&self) -> &[u8] {
        &self.diff
    }

    /// Extra bytes emitted so far.
    pub fn extra_payload(&self) -> &[u8] {
        &self.extra
    }

    /// Number of triples yielded so far.
    pub fn controls_emitted(&self) -> u64 {
        self.controls
    }

    /// Boundaries where the forward and backward extensions overlapped and
    /// had to be split.
    pub fn overlaps_resolved(&self) -> u64 {
        self.overlaps
    }

    pub fn into_payloads(self) -> Payloads {
        Payloads {
            diff: self.diff,
            extra: self.extra,
        }
    }

    #[inline]
    fn old_at(&self, i: isize) -> Option<u8> {
        usize::try_from(i)
            .ok()
            .and_then(|i| self.old.get(i).copied())
    }

    /// Does `new[i]` agree with the previous match's alignment?
    #[inline]
    fn on_last_alignment(&self, i: usize) -> bool {
        self.old_at(i as isize + self.last_offset) == Some(self.new[i])
    }

    /// Commit the boundary at `self.scan` and produce its triple.
    fn emit(&mut self) -> Control {
        let old = self.old;
        let new = self.new;
        let scan = self.scan;
        let pos = self.pos;
        let last_scan = self.last_scan;
        let last_pos = self.last_pos;

        let mut lenf = 0usize;
        {
            let mut matches = 0isize;
            let mut best = 0isize;
            let mut i = 0usize;
            while last_scan + i < scan && last_pos + i < old.len() {
                if old[last_pos + i] == new[last_scan + i] {
                    matches += 1;
                }
                i += 1;
                if matches * 2 - i as isize > best * 2 - lenf as isize {
                    best = matches;
                    lenf = i;
                }
            }
        }

        let mut lenb = 0usize;
        if scan < new.len() {
            let mut matches = 0isize;
            let mut best = 0isize;
            let mut i = 1usize;
            while scan >= last_scan + i && pos >= i {
                if old[pos - i] == new[scan - i] {
                    matches += 1;
                }
                if matches * 2 - i as isize > best * 2 - lenb as isize {
                    best = matches;
                    lenb = i;
                }
                i += 1;
            }
        }

        if last_scan + lenf > scan - lenb {
            let overlap = (last_scan + lenf) - (scan - lenb);
            let mut score = 0isize;
            let mut best = 0isize;
            let mut lens = 0usize;
            for i in 0..overlap {
                if new[last_scan + lenf - overlap + i] == old[last_pos + lenf - overlap + i] {
                    score += 1;
                }
                if new[scan - lenb + i] == old[pos - lenb + i] {
                    score -= 1;
                }
                if score > best {
                    best = score;
                    lens = i + 1;
                }
            }
            lenf = lenf - overlap + lens;
            lenb -= lens;
            self.overlaps += 1;
        }

        let copy_end = last_scan + lenf;
        let extra_end = scan - lenb;

        self.diff.extend(
            new[last_scan..copy_end]
                .iter()
                .zip(&old[last_pos..last_pos + lenf])
                .map(|(n, o)| n.wrapping_sub(*o)),
        );
        self.extra.extend_from_slice(&new[copy_end..extra_end]);

        let control = Control::new(
            lenf as i64,
            (extra_end - copy_end) as i64,
            (pos - lenb) as i64 - (last_pos + lenf) as i64,
        );

        self.last_scan = scan - lenb;
        self.last_pos = pos - lenb;
        self.last_offset = pos as isize - scan as isize;
        self.controls += 1;

        control
    }
}

impl Iterator for DiffEncoder<'_> {
    type Item = Control;

    fn next(&mut self) -> Option<Control> {
        let new_len = self.new.len();

        while self.scan < new_len {
            let mut old_score = 0isize;
            self.scan += self.len;
            let mut scsc = self.scan;

            while self.scan < new_len {
                let m = self.index.longest_match(&self.new[self.scan..]);
                self.len = m.len;
                self.pos = m.pos;

                while scsc < self.scan + self.len {
                    if self.on_last_alignment(scsc) {
                        old_score += 1;
                    }
                    scsc += 1;
                }

                let len = self.len as isize;
                if (len == old_score && len != 0) || len > old_score + MIN_GAIN {
                    break;
                }

                if self.on_last_alignment(self.scan) {
                    old_score -= 1;
                }
                self.scan += 1;
            }

            if self.len as isize != old_score || self.scan == new_len {
                return Some(self.emit());
            }
        }

        None
    }
}
