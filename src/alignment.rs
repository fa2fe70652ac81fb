//! Alignment records as returned by the external aligner.
//!
//! The aligner writes SAM; this module reads it with noodles into
//! [`AlignmentRecord`]s grouped in an [`AlignmentBatch`]. Only the columns the
//! scaffolder reads are kept.

use crate::cigar::{Cigar, CigarKind, CigarOp};
use crate::error::{Result, ScaffoldError};
use noodles::sam::{
    self,
    alignment::{record::cigar::op::Kind, RecordBuf},
};
use std::fmt;
use std::io::BufRead;

/// SAM flag denoting an unmapped query.
pub const UNMAPPED: u16 = 0x4;

/// SAM flag denoting a query from the complement strand of the reference.
pub const COMPLEMENT: u16 = 0x10;

/// SAM flags denoting a non-primary line (secondary or supplementary).
pub const SECONDARY_LINE: u16 = 0x900;

/// One alignment of a query (anchor or read) against a reference contig.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    /// Query name; for anchor alignments this is the anchor id
    pub query_name: String,

    /// SAM flag bits
    pub flags: u16,

    /// Reference contig name
    pub reference_name: String,

    /// Alignment start on the reference (0-based, -1 when unmapped)
    pub begin_pos: i64,

    /// Mapping quality (255 = unavailable)
    pub mapping_quality: u8,

    /// Alignment CIGAR
    pub cigar: Cigar,

    /// Query bases as stored in the record (empty when SAM has `*`)
    pub sequence: Vec<u8>,
}

impl AlignmentRecord {
    /// Creates a mapped forward-strand record; mostly useful in tests and for
    /// in-memory aligners.
    pub fn new(query_name: impl Into<String>, begin_pos: i64, cigar: Cigar) -> Self {
        AlignmentRecord {
            query_name: query_name.into(),
            flags: 0,
            reference_name: String::new(),
            begin_pos,
            mapping_quality: 60,
            cigar,
            sequence: Vec::new(),
        }
    }

    /// Builder-style flag setter.
    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_sequence(mut self, sequence: Vec<u8>) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn is_unmapped(&self) -> bool {
        self.flags & UNMAPPED != 0
    }

    pub fn is_secondary(&self) -> bool {
        self.flags & SECONDARY_LINE != 0
    }

    pub fn is_reverse(&self) -> bool {
        self.flags & COMPLEMENT != 0
    }

    /// Primary, mapped record.
    pub fn is_primary(&self) -> bool {
        !self.is_unmapped() && !self.is_secondary()
    }

    /// End of the alignment on the reference (0-based, exclusive).
    pub fn end_pos(&self) -> i64 {
        self.begin_pos + self.cigar.contig_len() as i64
    }

    fn from_record_buf(record: &RecordBuf, header: &sam::Header) -> Result<Self> {
        let query_name = record
            .name()
            .map(|name| {
                let name: &[u8] = name.as_ref();
                String::from_utf8_lossy(name).into_owned()
            })
            .unwrap_or_default();

        let reference_name = match record.reference_sequence_id() {
            Some(id) => header
                .reference_sequences()
                .get_index(id)
                .map(|(name, _)| name.to_string())
                .ok_or_else(|| {
                    ScaffoldError::SamParseError(format!(
                        "Reference sequence {id} missing from header"
                    ))
                })?,
            None => String::new(),
        };

        let cigar = record
            .cigar()
            .as_ref()
            .iter()
            .map(|op| CigarOp::new(cigar_kind(op.kind()), op.len() as u32))
            .collect();

        Ok(AlignmentRecord {
            query_name,
            flags: record.flags().bits(),
            reference_name,
            begin_pos: record
                .alignment_start()
                .map_or(-1, |position| usize::from(position) as i64 - 1),
            mapping_quality: record.mapping_quality().map_or(255, |mapq| mapq.get()),
            cigar: Cigar::new(cigar),
            sequence: record.sequence().as_ref().to_vec(),
        })
    }
}

fn cigar_kind(kind: Kind) -> CigarKind {
    match kind {
        Kind::Match => CigarKind::Match,
        Kind::Insertion => CigarKind::Insertion,
        Kind::Deletion => CigarKind::Deletion,
        Kind::Skip => CigarKind::Skip,
        Kind::SoftClip => CigarKind::SoftClip,
        Kind::HardClip => CigarKind::HardClip,
        Kind::Pad => CigarKind::Padding,
        Kind::SequenceMatch => CigarKind::SequenceMatch,
        Kind::SequenceMismatch => CigarKind::SequenceMismatch,
    }
}

fn sam_error(e: std::io::Error) -> ScaffoldError {
    ScaffoldError::SamParseError(e.to_string())
}

/// Header plus all records produced by one aligner call.
///
/// Record order is whatever the aligner emitted and carries no meaning.
#[derive(Debug, Clone, Default)]
pub struct AlignmentBatch {
    /// `@SQ` entries as (name, length)
    pub reference_sequences: Vec<(String, usize)>,
    pub records: Vec<AlignmentRecord>,
}

impl AlignmentBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        AlignmentBatch::default()
    }

    pub fn from_records(records: Vec<AlignmentRecord>) -> Self {
        AlignmentBatch {
            reference_sequences: Vec::new(),
            records,
        }
    }

    /// Reads a SAM stream (header and records).
    pub fn from_sam<R: BufRead>(inner: R) -> Result<Self> {
        let mut reader = sam::io::Reader::new(inner);
        let header = reader.read_header().map_err(sam_error)?;

        let reference_sequences = header
            .reference_sequences()
            .iter()
            .map(|(name, reference_sequence)| {
                (name.to_string(), reference_sequence.length().get())
            })
            .collect();

        let records = reader
            .record_bufs(&header)
            .map(|result| {
                let record = result.map_err(sam_error)?;
                AlignmentRecord::from_record_buf(&record, &header)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(AlignmentBatch {
            reference_sequences,
            records,
        })
    }

    /// Length of a reference sequence declared in the header.
    pub fn reference_len(&self, name: &str) -> Option<usize> {
        self.reference_sequences
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, len)| len)
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> impl Iterator<Item = &AlignmentRecord> {
        self.records.iter()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the aligner found nothing.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every unmapped and non-primary record.
    pub fn retain_primary(&mut self) {
        self.records.retain(AlignmentRecord::is_primary);
    }
}
impl fmt::Display for AlignmentBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Alignment records: {} total", self.records.len())?;
        for (i, record) in self.records.iter().enumerate() {
            writeln!(
                f,
                "[{}] {} -> {}:{} {} (flag {})",
                i,
                record.query_name,
                record.reference_name,
                record.begin_pos,
                record.cigar,
                record.flags
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAM: &str = "@HD\tVN:1.6\tSO:unsorted\n\
@SQ\tSN:ctg1\tLN:1000\n\
@PG\tID:bwa\tPN:bwa\n\
ctg2L\t0\tctg1\t951\t60\t50M100S\t*\t0\t0\t*\t*\tNM:i:0\n\
ctg3R\t16\tctg1\t901\t12\t2M2S\t*\t0\t0\tACGT\t*\n\
ctg4L\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*\n";

    #[test]
    fn test_parse_batch() {
        let batch = AlignmentBatch::from_sam(SAM.as_bytes()).unwrap();
        assert_eq!(batch.reference_sequences, vec![("ctg1".to_string(), 1000)]);
        assert_eq!(batch.reference_len("ctg1"), Some(1000));
        assert_eq!(batch.reference_len("ctg2"), None);
        assert_eq!(batch.len(), 3);

        let first = &batch.records[0];
        assert_eq!(first.query_name, "ctg2L");
        assert_eq!(first.reference_name, "ctg1");
        assert_eq!(first.begin_pos, 950);
        assert_eq!(first.end_pos(), 1000);
        assert_eq!(first.mapping_quality, 60);
        assert_eq!(first.cigar.trailing_soft_clip(), Some(100));
        assert!(first.is_primary());
        assert!(!first.is_reverse());

        let second = &batch.records[1];
        assert!(second.is_reverse());
        assert_eq!(second.begin_pos, 900);
        assert_eq!(second.sequence, b"ACGT".to_vec());

        let third = &batch.records[2];
        assert!(third.is_unmapped());
        assert_eq!(third.begin_pos, -1);
        assert!(third.reference_name.is_empty());
        assert!(third.cigar.is_empty());
    }

    #[test]
    fn test_cigar_kinds_mapped() {
        let sam = "@SQ\tSN:c\tLN:500\n\
q\t0\tc\t1\t60\t3H5=1X2I4D6N7M8S\t*\t0\t0\t*\t*\n";
        let batch = AlignmentBatch::from_sam(sam.as_bytes()).unwrap();
        let cigar = &batch.records[0].cigar;
        assert_eq!(cigar.to_string(), "3H5=1X2I4D6N7M8S");
        assert_eq!(cigar.read_len(), 5 + 1 + 2 + 7 + 8);
        assert_eq!(cigar.contig_len(), 5 + 1 + 4 + 6 + 7);
    }

    #[test]
    fn test_headerless_stream() {
        let batch = AlignmentBatch::from_sam("".as_bytes()).unwrap();
        assert!(batch.is_empty());
        assert!(batch.reference_sequences.is_empty());
    }

    #[test]
    fn test_secondary_and_supplementary_flags() {
        let secondary = AlignmentRecord::new("a", 0, Cigar::default()).with_flags(0x100);
        let supplementary = AlignmentRecord::new("a", 0, Cigar::default()).with_flags(0x800);
        assert!(secondary.is_secondary());
        assert!(supplementary.is_secondary());
        assert!(!secondary.is_primary());
    }

    #[test]
    fn test_retain_primary() {
        let mut batch = AlignmentBatch::from_sam(SAM.as_bytes()).unwrap();
        batch.retain_primary();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_rejects_truncated_record() {
        let sam = "@SQ\tSN:ctg1\tLN:1000\nread\t0\tctg1\n";
        assert!(matches!(
            AlignmentBatch::from_sam(sam.as_bytes()),
            Err(ScaffoldError::SamParseError(_))
        ));
    }

    #[test]
    fn test_rejects_reference_missing_from_header() {
        let sam = "@SQ\tSN:ctg1\tLN:1000\nread\t0\tother\t1\t60\t4M\t*\t0\t0\t*\t*\n";
        assert!(AlignmentBatch::from_sam(sam.as_bytes()).is_err());
    }
}
