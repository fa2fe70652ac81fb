//! CIGAR operations and length arithmetic.
//!
//! The merge evaluator only ever needs three numbers out of a CIGAR: how many
//! read bases and how many contig bases the alignment consumed, and how long
//! the clip at either end is. Everything here serves those computations.

use crate::error::{Result, ScaffoldError};
use std::fmt;
use std::str::FromStr;

/// CIGAR operation type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CigarKind {
    Match = b'M',
    Insertion = b'I',
    Deletion = b'D',
    Skip = b'N',
    SoftClip = b'S',
    HardClip = b'H',
    Padding = b'P',
    SequenceMatch = b'=',
    SequenceMismatch = b'X',
}

impl CigarKind {
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'M' => Some(Self::Match),
            b'I' => Some(Self::Insertion),
            b'D' => Some(Self::Deletion),
            b'N' => Some(Self::Skip),
            b'S' => Some(Self::SoftClip),
            b'H' => Some(Self::HardClip),
            b'P' => Some(Self::Padding),
            b'=' => Some(Self::SequenceMatch),
            b'X' => Some(Self::SequenceMismatch),
            _ => None,
        }
    }

    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Returns true if this operation consumes read (query) bases.
    pub const fn consumes_read(self) -> bool {
        matches!(
            self,
            Self::Match
                | Self::Insertion
                | Self::SoftClip
                | Self::SequenceMatch
                | Self::SequenceMismatch
        )
    }

    /// Returns true if this operation consumes reference (contig) bases.
    pub const fn consumes_contig(self) -> bool {
        matches!(
            self,
            Self::Match
                | Self::Deletion
                | Self::Skip
                | Self::SequenceMatch
                | Self::SequenceMismatch
        )
    }
}

/// A single CIGAR operation: kind plus run length.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CigarOp {
    pub kind: CigarKind,
    pub len: u32,
}

impl CigarOp {
    pub const fn new(kind: CigarKind, len: u32) -> Self {
        CigarOp { kind, len }
    }
}

/// Parsed CIGAR string.
///
/// An empty CIGAR corresponds to SAM's `*`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cigar {
    ops: Vec<CigarOp>,
}

impl Cigar {
    pub fn new(ops: Vec<CigarOp>) -> Self {
        Cigar { ops }
    }

    pub fn ops(&self) -> &[CigarOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Length of the trailing soft clip, if the CIGAR ends in one.
    pub fn trailing_soft_clip(&self) -> Option<u32> {
        match self.ops.last() {
            Some(op) if op.kind == CigarKind::SoftClip => Some(op.len),
            _ => None,
        }
    }

    /// Length of the leading soft clip, if the CIGAR starts with one.
    pub fn leading_soft_clip(&self) -> Option<u32> {
        match self.ops.first() {
            Some(op) if op.kind == CigarKind::SoftClip => Some(op.len),
            _ => None,
        }
    }

    /// Sum of the lengths of all read-consuming operations (clips included).
    pub fn read_len(&self) -> u64 {
        self.ops
            .iter()
            .filter(|op| op.kind.consumes_read())
            .map(|op| op.len as u64)
            .sum()
    }

    /// Sum of the lengths of all contig-consuming operations.
    pub fn contig_len(&self) -> u64 {
        self.ops
            .iter()
            .filter(|op| op.kind.consumes_contig())
            .map(|op| op.len as u64)
            .sum()
    }
}

impl FromStr for Cigar {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "*" || s.is_empty() {
            return Ok(Cigar::default());
        }

        let mut ops = Vec::new();
        let mut num_str = String::new();

        for ch in s.chars() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                continue;
            }

            let kind = u8::try_from(ch)
                .ok()
                .and_then(CigarKind::from_byte)
                .ok_or_else(|| {
                    ScaffoldError::CigarParseError(format!("unknown operation '{ch}' in {s}"))
                })?;
            let len: u32 = num_str.parse().map_err(|_| {
                ScaffoldError::CigarParseError(format!("missing length before '{ch}' in {s}"))
            })?;
            num_str.clear();

            ops.push(CigarOp::new(kind, len));
        }

        if !num_str.is_empty() {
            return Err(ScaffoldError::CigarParseError(format!(
                "trailing length without operation in {s}"
            )));
        }

        Ok(Cigar { ops })
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "*");
        }
        for op in &self.ops {
            write!(f, "{}{}", op.len, op.kind.to_byte() as char)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_lengths() {
        let cigar: Cigar = "5S90M2I3D50M100S".parse().unwrap();
        assert_eq!(cigar.ops().len(), 6);
        assert_eq!(cigar.read_len(), 5 + 90 + 2 + 50 + 100);
        assert_eq!(cigar.contig_len(), 90 + 3 + 50);
        assert_eq!(cigar.trailing_soft_clip(), Some(100));
        assert_eq!(cigar.leading_soft_clip(), Some(5));
        assert_eq!(cigar.to_string(), "5S90M2I3D50M100S");
    }

    #[test]
    fn test_hard_clip_consumes_nothing() {
        let cigar: Cigar = "10H40=2X8M".parse().unwrap();
        assert_eq!(cigar.read_len(), 50);
        assert_eq!(cigar.contig_len(), 50);
        assert_eq!(cigar.trailing_soft_clip(), None);
        assert_eq!(cigar.leading_soft_clip(), None);
    }

    #[test]
    fn test_star_is_empty() {
        let cigar: Cigar = "*".parse().unwrap();
        assert!(cigar.is_empty());
        assert_eq!(cigar.to_string(), "*");
        assert_eq!(cigar.trailing_soft_clip(), None);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("10Q".parse::<Cigar>().is_err());
        assert!("M10".parse::<Cigar>().is_err());
        assert!("10M5".parse::<Cigar>().is_err());
    }
}
