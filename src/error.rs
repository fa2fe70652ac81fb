//! Error types for the scaffolder-rs library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scaffolding operations.
pub type Result<T> = std::result::Result<T, ScaffoldError>;

/// Errors that can occur while scaffolding.
///
/// Every variant is fatal for the run. Records that are merely unsuitable as
/// merge evidence are not errors; see [`crate::decision::SkipReason`].
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// Input file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The external aligner could not be run or exited with an error
    #[error("Aligner execution failed: {0}")]
    AlignerExecutionFailed(String),

    /// Failed to parse SAM output
    #[error("Failed to parse SAM output: {0}")]
    SamParseError(String),

    /// Failed to parse CIGAR string
    #[error("Failed to parse CIGAR string: {0}")]
    CigarParseError(String),

    /// Failed to read a FASTA/FASTQ file
    #[error("Failed to parse FASTA input: {0}")]
    FastaParseError(String),

    /// Invalid configuration parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An anchor names a contig that is not in the contig set.
    ///
    /// Anchors are generated from the contig set itself, so this means the
    /// anchor bookkeeping is inconsistent and the run cannot continue.
    #[error("Anchor {anchor_id} refers to unknown contig {contig_id}")]
    UnknownContig { anchor_id: String, contig_id: String },

    /// Two input contigs share an identifier
    #[error("Duplicate contig id: {0}")]
    DuplicateContigId(String),

    /// The draft genome contained no contigs
    #[error("Draft genome contains no contigs")]
    EmptyDraft,

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl From<needletail::errors::ParseError> for ScaffoldError {
    fn from(err: needletail::errors::ParseError) -> Self {
        ScaffoldError::FastaParseError(err.to_string())
    }
}
