//! # scaffolder-rs: long-read scaffolding of draft assemblies
//!
//! This library joins the contigs of a draft genome into scaffolds using
//! evidence from short "anchor" sequences cut from both ends of every contig.
//!
//! ## Overview
//!
//! Scaffolding runs as a greedy walk:
//! - Optionally extend each contig with read overhangs (`bwa mem` of the reads
//!   against the contig)
//! - Cut an anchor from each end of every contig
//! - Align the anchor pool against the frontier contig of the scaffold being
//!   built and accept the first anchor whose soft-clipped tail reaches far
//!   enough past the contig end
//! - Splice the anchor's contig in at the midpoint of the estimated overlap
//!   and repeat from the new frontier
//! - When no anchor qualifies, start a new scaffold from the next unused contig
//!
//! ## Example Usage
//!
//! ```no_run
//! # use anyhow::Result;
//! # fn main() -> Result<()> {
//! use scaffolder_rs::{Config, Scaffolder};
//! use std::path::Path;
//!
//! let scaffolder = Scaffolder::new(Config::default())?;
//! let written = scaffolder.run(
//!     Path::new("reads.fastq"),
//!     Path::new("draft.fasta"),
//!     Path::new("scaffolds.fasta"),
//! )?;
//! println!("{written} scaffolds");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - `contig`, `scaffold`: the data model (contig arena and spliced chains)
//! - `decision`, `geometry`: merge evidence and splice arithmetic
//! - `connector`: the scaffolding state machine
//! - `aligner`, `runner`, `binary_finder`: the `bwa` subprocess seam
//! - `alignment`, `cigar`, `fasta`: file formats
//! - `extension`: read-based contig extension
//!
//! The connector only sees the [`AnchorAligner`] trait, so the core can be
//! driven by any aligner, including canned in-memory results.

pub mod aligner;
pub mod alignment;
pub mod binary_finder;
pub mod cigar;
pub mod config;
pub mod connector;
pub mod contig;
pub mod decision;
pub mod error;
pub mod extension;
pub mod fasta;
pub mod geometry;
pub mod runner;
pub mod scaffold;

use error::Result;
use log::{info, warn};
use std::path::Path;

pub use aligner::AnchorAligner;
pub use alignment::{AlignmentBatch, AlignmentRecord};
pub use config::Config;
pub use connector::{Assembly, ConnectStats, Connector, ConnectorState};
pub use contig::{Anchor, Contig, ContigId, ContigSet, Orientation};
pub use decision::{Decision, MergeEvaluator, SkipReason};
pub use error::ScaffoldError;
pub use geometry::MergeGeometry;
pub use runner::BwaAligner;
pub use scaffold::Scaffold;

/// Main entry point: file-to-file scaffolding with `bwa`.
#[derive(Debug, Clone)]
pub struct Scaffolder {
    config: Config,
}

impl Scaffolder {
    /// Creates a scaffolder, rejecting invalid configurations.
    ///
    /// # Example
    /// ```
    /// use scaffolder_rs::{Config, Scaffolder};
    ///
    /// let config = Config::builder()
    ///     .anchor_len(200)
    ///     .anchor_threshold(0.7)
    ///     .num_threads(4)
    ///     .build();
    ///
    /// assert!(Scaffolder::new(config).is_ok());
    /// assert!(Scaffolder::new(Config::builder().anchor_len(0).build()).is_err());
    /// ```
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Scaffolder { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scaffolds `draft` using `reads` and writes the result to `output`.
    ///
    /// # Arguments
    /// * `reads` - Long reads (FASTA/FASTQ, optionally gzipped)
    /// * `draft` - Draft assembly contigs (FASTA)
    /// * `output` - Where to write the scaffolds (FASTA)
    ///
    /// # Returns
    /// The number of scaffolds written
    ///
    /// # Errors
    /// Returns an error if:
    /// - An input file is missing or unreadable
    /// - The draft is empty or has duplicate contig ids
    /// - `bwa` cannot be found or fails
    ///
    /// Nothing is written to `output` when an error occurs.
    pub fn run(&self, reads: &Path, draft: &Path, output: &Path) -> Result<usize> {
        if !reads.exists() {
            return Err(ScaffoldError::FileNotFound(reads.to_path_buf()));
        }

        let mut contigs = ContigSet::new(fasta::read_contigs(draft)?)?;
        info!("Loaded {} contigs from {}", contigs.len(), draft.display());

        let mut aligner = BwaAligner::new(&self.config)?;

        if self.config.extend_contigs {
            let extended = self.extend_contigs(&mut aligner, contigs.into_contigs(), reads)?;
            contigs = ContigSet::new(extended)?;
        } else {
            info!("Read-based extension disabled");
        }

        let assembly = self.scaffold_contigs(contigs, &mut aligner)?;
        let written = assembly.write_fasta(output)?;
        info!("Wrote {} scaffolds to {}", written, output.display());
        Ok(written)
    }

    /// Extends every contig with the overhangs of reads aligned to it.
    pub fn extend_contigs(
        &self,
        aligner: &mut BwaAligner,
        contigs: Vec<Contig>,
        reads: &Path,
    ) -> Result<Vec<Contig>> {
        let mut extended = Vec::with_capacity(contigs.len());
        let mut grown = 0;

        for contig in &contigs {
            let batch = aligner.align_reads(contig, reads)?;
            if batch.is_empty() {
                warn!("No reads align to {}", contig.id());
            }
            let next = extension::extend_contig(contig, batch, self.config.max_extension);
            if next.len() > contig.len() {
                grown += 1;
            }
            extended.push(next);
        }

        info!("Extended {} of {} contigs with read overhangs", grown, contigs.len());
        Ok(extended)
    }

    /// Runs the scaffolding core on in-memory contigs with any aligner.
    pub fn scaffold_contigs<A: AnchorAligner>(
        &self,
        contigs: ContigSet,
        aligner: A,
    ) -> Result<Assembly> {
        Connector::new(contigs, aligner, &self.config)?.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config::builder().anchor_threshold(1.5).build();
        assert!(matches!(
            Scaffolder::new(config),
            Err(ScaffoldError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_reads_rejected_before_alignment() {
        let scaffolder = Scaffolder::new(Config::default()).unwrap();
        let result = scaffolder.run(
            Path::new("/no/such/reads.fq"),
            Path::new("/no/such/draft.fa"),
            Path::new("/tmp/never-written.fa"),
        );
        assert!(matches!(result, Err(ScaffoldError::FileNotFound(_))));
    }
}
