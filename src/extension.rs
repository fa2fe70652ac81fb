//! Read-based contig extension.
//!
//! Reads aligned to a contig that hang over either end carry sequence the
//! draft is missing. The longest overhang on each side is glued onto the
//! contig and recorded as its extension budget, which the merge geometry
//! later spends as overlap when the contig becomes a merge target.

use crate::alignment::{AlignmentBatch, AlignmentRecord};
use crate::contig::Contig;
use log::debug;

/// Read bases past the contig's right end, outermost last.
///
/// Only the part of the trailing soft clip beyond the contig end counts;
/// clip bases that still fall on the contig are ignored.
pub fn right_overhang<'a>(contig_len: usize, record: &'a AlignmentRecord) -> Option<&'a [u8]> {
    let clip = record.cigar.trailing_soft_clip()? as i64;
    let short_of_end = contig_len as i64 - record.end_pos();
    let overhang = (clip - short_of_end).min(clip);
    if overhang <= 0 || record.sequence.len() < overhang as usize {
        return None;
    }
    Some(&record.sequence[record.sequence.len() - overhang as usize..])
}

/// Read bases before the contig's position 0, outermost first.
pub fn left_overhang(record: &AlignmentRecord) -> Option<&[u8]> {
    let clip = record.cigar.leading_soft_clip()? as i64;
    let overhang = (clip - record.begin_pos).min(clip);
    if overhang <= 0 || record.sequence.len() < overhang as usize {
        return None;
    }
    Some(&record.sequence[..overhang as usize])
}

/// Extends `contig` with the longest overhangs of the primary records in
/// `batch`.
///
/// Each side is capped at `max_extension` bases, keeping those adjacent to
/// the contig. Returns a clone when nothing overhangs.
pub fn extend_contig(contig: &Contig, mut batch: AlignmentBatch, max_extension: usize) -> Contig {
    batch.retain_primary();

    let right = batch
        .iter()
        .filter_map(|record| right_overhang(contig.len(), record))
        .max_by_key(|ext| ext.len())
        .unwrap_or_default();
    let left = batch
        .iter()
        .filter_map(left_overhang)
        .max_by_key(|ext| ext.len())
        .unwrap_or_default();

    let right = &right[..right.len().min(max_extension)];
    let left = &left[left.len() - left.len().min(max_extension)..];

    if left.is_empty() && right.is_empty() {
        return contig.clone();
    }

    debug!(
        "Extending {} by {} bp left, {} bp right",
        contig.id(),
        left.len(),
        right.len()
    );
    Contig::with_extensions(contig.id(), contig.seq(), left, right)
}
