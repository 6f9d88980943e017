//! CIGAR construction from gapped aligned sequence pairs.
//!
//! One aligned query/reference string pair becomes an ordered run-length
//! encoded operation sequence plus the accumulated edit count used for the
//! NM tag. The element sequence is built once per mapped mate and handed to
//! the emitter, which consumes it.

use crate::hsp::Hsp;
use std::fmt;

/// Gap marker in the aligned strings.
const GAP: u8 = b'-';

/// A deletion run at least this long is reported as a skipped region (N)
/// instead of a deletion.
pub const SKIP_MIN_DELETION: i32 = 100;

/// CIGAR operation emitted by this tool.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CigarOp {
    S = b'S',  // Soft clip
    I = b'I',  // Insertion to the reference
    D = b'D',  // Deletion from the reference
    N = b'N',  // Skipped region (long deletion)
    Eq = b'=', // Sequence match
    X = b'X',  // Sequence mismatch
}

impl CigarOp {
    /// Convert to byte representation
    #[inline(always)]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Returns true if this operation consumes query bases
    #[inline(always)]
    pub const fn consumes_query(self) -> bool {
        matches!(self, Self::S | Self::I | Self::Eq | Self::X)
    }

    /// Returns true if this operation consumes reference bases
    #[inline(always)]
    pub const fn consumes_ref(self) -> bool {
        matches!(self, Self::D | Self::N | Self::Eq | Self::X)
    }

    /// Returns true if this operation counts toward the edit distance
    /// (everything the column scan can produce except a match).
    #[inline(always)]
    pub const fn is_edit(self) -> bool {
        matches!(self, Self::I | Self::D | Self::N | Self::X)
    }
}

/// Run-length encoded CIGAR plus the accumulated edit count. Every element
/// count is >= 1; matches never contribute to `edit_distance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cigar {
    pub elements: Vec<(CigarOp, i32)>,
    pub edit_distance: i32,
}

impl Cigar {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Query bases covered by the CIGAR, clips included.
    pub fn query_span(&self) -> i64 {
        self.elements
            .iter()
            .filter(|(op, _)| op.consumes_query())
            .map(|&(_, len)| len as i64)
            .sum()
    }

    /// Reference bases covered by the CIGAR.
    pub fn reference_span(&self) -> i64 {
        self.elements
            .iter()
            .filter(|(op, _)| op.consumes_ref())
            .map(|&(_, len)| len as i64)
            .sum()
    }
}

impl fmt::Display for Cigar {
    /// Forward-order rendering; "*" when empty (unmapped per SAM).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return f.write_str("*");
        }
        for &(op, len) in &self.elements {
            write!(f, "{}{}", len, op.to_byte() as char)?;
        }
        Ok(())
    }
}

/// Classify one alignment column. A gap in the reference string is an
/// insertion into the query, a gap in the query string a deletion;
/// otherwise equal bytes match.
#[inline(always)]
fn classify(q: u8, h: u8) -> CigarOp {
    if h == GAP {
        CigarOp::I
    } else if q == GAP {
        CigarOp::D
    } else if q == h {
        CigarOp::Eq
    } else {
        CigarOp::X
    }
}

/// Build the CIGAR for one mapped mate.
///
/// `read_len` is the raw read length; the caller guarantees
/// `read_len >= hsp.query_to`, otherwise the trailing clip is meaningless.
pub fn build_cigar(hsp: &Hsp, read_len: usize) -> Cigar {
    let q = hsp.qseq.as_bytes();
    let h = hsp.hseq.as_bytes();
    let columns = q.len().min(h.len());

    let mut elements = Vec::with_capacity(16);
    let mut edit_distance = 0;

    // Unaligned query prefix (5' soft clip)
    if hsp.query_from > 1 {
        elements.push((CigarOp::S, (hsp.query_from - 1) as i32));
    }

    let mut pos = 0;
    while pos < columns {
        let class = classify(q[pos], h[pos]);
        let start = pos;
        pos += 1;
        while pos < columns && classify(q[pos], h[pos]) == class {
            pos += 1;
        }
        let count = (pos - start) as i32;

        // Long deletion runs denote skipped regions, not true deletions
        let op = if class == CigarOp::D && count >= SKIP_MIN_DELETION {
            CigarOp::N
        } else {
            class
        };

        if op.is_edit() {
            edit_distance += count;
        }
        elements.push((op, count));
    }

    // Unaligned query suffix (3' soft clip)
    let tail = read_len as i64 - hsp.query_to;
    if tail > 0 {
        elements.push((CigarOp::S, tail as i32));
    }

    Cigar {
        elements,
        edit_distance,
    }
}
