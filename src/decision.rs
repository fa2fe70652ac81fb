//! Merge decision: is an alignment record valid evidence for extending a
//! contig to the right?
//!
//! The checks run in a fixed order and the first failing one is reported as
//! a [`SkipReason`]. Skips are never errors.

use crate::alignment::AlignmentRecord;
use crate::config::Config;
use crate::contig::{owner_contig_id, Contig};
use std::collections::HashSet;
use std::fmt;

/// Why a record was not used as merge evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Unmapped, secondary or supplementary record
    NotPrimary,
    /// The anchor belongs to the contig being extended
    SelfHit,
    /// The anchor already justified an earlier merge
    AnchorUsed,
    /// The alignment does not end in a soft clip
    NoTrailingClip,
    /// The clipped tail does not reach far enough past the contig end
    ShortExtension,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::NotPrimary => "unmapped or non-primary",
            SkipReason::SelfHit => "self hit",
            SkipReason::AnchorUsed => "anchor already used",
            SkipReason::NoTrailingClip => "no trailing soft clip",
            SkipReason::ShortExtension => "extension too short",
        };
        f.write_str(text)
    }
}

/// Lengths derived from a record's CIGAR against the contig it hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evidence {
    /// Read bases inside the alignment (trailing clip excluded)
    pub used_read_size: i64,
    /// Contig bases covered by the alignment
    pub used_contig_size: i64,
    /// Length of the trailing soft clip
    pub right_clip_len: i64,
    /// Portion of the clip that lies beyond the contig end
    pub extension_length: i64,
}

/// Outcome of evaluating one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept(Evidence),
    Reject(SkipReason),
    /// Passed the structural checks but the overhang is too short.
    TooShort(Evidence),
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept(_))
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Decision::Accept(_) => None,
            Decision::Reject(reason) => Some(*reason),
            Decision::TooShort(_) => Some(SkipReason::ShortExtension),
        }
    }
}

/// Computes [`Evidence`] for a record whose CIGAR ends in a soft clip.
///
/// The extension formula subtracts from the clip whatever part of it still
/// falls inside the contig because the aligned block stopped short of the
/// contig end. The sign is not clamped: an alignment running past the
/// contig end makes the subtracted term negative and inflates the result.
pub fn measure(contig: &Contig, record: &AlignmentRecord) -> Option<Evidence> {
    let right_clip_len = record.cigar.trailing_soft_clip()? as i64;

    let used_read_size = record.cigar.read_len() as i64 - right_clip_len;
    let used_contig_size = record.cigar.contig_len() as i64;

    let extension_length =
        right_clip_len - (contig.total_len() - (record.begin_pos + used_contig_size));

    Some(Evidence {
        used_read_size,
        used_contig_size,
        right_clip_len,
        extension_length,
    })
}

/// Accept/reject rule for candidate merge records.
#[derive(Debug, Clone, Copy)]
pub struct MergeEvaluator {
    anchor_len: usize,
    anchor_threshold: f64,
}

impl MergeEvaluator {
    pub fn new(anchor_len: usize, anchor_threshold: f64) -> Self {
        MergeEvaluator {
            anchor_len,
            anchor_threshold,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        MergeEvaluator::new(config.anchor_len, config.anchor_threshold)
    }

    /// Exclusive lower bound on `extension_length`.
    pub fn min_extension(&self) -> f64 {
        self.anchor_threshold * self.anchor_len as f64
    }

    /// Runs every check in order and reports the first failure.
    pub fn evaluate(
        &self,
        contig: &Contig,
        record: &AlignmentRecord,
        used_ids: &HashSet<String>,
    ) -> Decision {
        if record.is_unmapped() || record.is_secondary() {
            return Decision::Reject(SkipReason::NotPrimary);
        }

        if owner_contig_id(&record.query_name) == contig.id() {
            return Decision::Reject(SkipReason::SelfHit);
        }

        if used_ids.contains(&record.query_name) {
            return Decision::Reject(SkipReason::AnchorUsed);
        }

        let Some(evidence) = measure(contig, record) else {
            return Decision::Reject(SkipReason::NoTrailingClip);
        };

        if evidence.extension_length as f64 > self.min_extension() {
            Decision::Accept(evidence)
        } else {
            Decision::TooShort(evidence)
        }
    }

    /// True when `record` is accepted as evidence for extending `contig`.
    pub fn should_connect(
        &self,
        contig: &Contig,
        record: &AlignmentRecord,
        used_ids: &HashSet<String>,
    ) -> bool {
        self.evaluate(contig, record, used_ids).is_accept()
    }
}

impl Default for MergeEvaluator {
    fn default() -> Self {
        MergeEvaluator::from_config(&Config::default())
    }
}
