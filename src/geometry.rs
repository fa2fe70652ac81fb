//! Splice arithmetic for joining two contigs.
//!
//! Positions are signed: with a large `right_ext_pos` the overlap length can
//! go negative, and the splice points are then whatever the formulas give.
//! [`crate::scaffold::Scaffold`] clamps them when it materializes sequence.

use crate::contig::Contig;

/// Where the current frontier contig and the incoming contig are cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeGeometry {
    /// First frontier position the overlap may start at
    pub merge_start: i64,
    /// Frontier bases from `merge_start` to its end
    pub right_ext_len: i64,
    /// Overlap length on the incoming contig, bounded by its left budget
    pub next_start: i64,
    /// Frontier position where the overlap ends
    pub merge_end: i64,
    /// Estimated overlap length
    pub merge_len: i64,
}

impl MergeGeometry {
    /// Computes the geometry for joining `next` after `current`, given the
    /// begin position of the supporting alignment on `current`.
    ///
    /// `next` must already be in its final orientation.
    pub fn compute(current: &Contig, next: &Contig, begin_pos: i64) -> Self {
        let merge_start = current.right_ext_pos().max(begin_pos);
        let right_ext_len = current.total_len() - merge_start;
        let next_start = right_ext_len.min(next.total_ext_left());
        let merge_end = next_start + begin_pos;
        let merge_len = merge_end - merge_start;

        MergeGeometry {
            merge_start,
            right_ext_len,
            next_start,
            merge_end,
            merge_len,
        }
    }

    /// End (exclusive) of the frontier contig's contribution: midpoint of the
    /// overlap on the frontier side.
    pub fn current_end(&self) -> i64 {
        self.merge_start + self.merge_len / 2
    }

    /// Start of the incoming contig's contribution: midpoint of the overlap
    /// on the incoming side.
    pub fn next_begin(&self) -> i64 {
        self.next_start - self.merge_len / 2
    }

    /// Bases the splice removes: the frontier tail after [`Self::current_end`]
    /// plus the incoming head before [`Self::next_begin`]. Scaffold windows
    /// are clamped, so this only matches the materialized loss when both
    /// splice points fall inside their contigs.
    pub fn spliced_out(&self) -> i64 {
        self.right_ext_len + self.next_start - 2 * (self.merge_len / 2)
    }
}
