//! Subprocess runner for `bwa`.
//!
//! Every call writes its inputs to a scratch directory, runs `bwa index` and
//! `bwa mem` as child processes and parses the SAM written to stdout. The
//! scratch reference is overwritten by each call; the anchor pool is written
//! once by [`AnchorAligner::load_anchors`].

use crate::aligner::AnchorAligner;
use crate::alignment::AlignmentBatch;
use crate::binary_finder::find_binary;
use crate::contig::{Anchor, Contig};
use crate::error::{Result, ScaffoldError};
use crate::fasta;
use crate::Config;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Scratch reference, rewritten before every alignment.
pub const REFERENCE_FILE: &str = "connector.fasta";

/// Anchor pool, written once per run.
pub const ANCHORS_FILE: &str = "anchors.fasta";

/// Last SAM output, kept for inspection.
pub const ALIGNMENT_FILE: &str = "aln.sam";

/// Directory holding the aligner's scratch files.
///
/// Removed on drop unless the configuration asks to keep intermediates.
#[derive(Debug)]
pub struct ScratchSpace {
    path: PathBuf,
    _temp: Option<TempDir>,
}

impl ScratchSpace {
    pub fn new(config: &Config) -> Result<Self> {
        let base = config.temp_dir.clone().unwrap_or_else(std::env::temp_dir);

        if config.keep_intermediates {
            let path = base.join(format!("scaffolder_{}", std::process::id()));
            std::fs::create_dir_all(&path)?;
            info!("Keeping scratch files in {}", path.display());
            return Ok(ScratchSpace { path, _temp: None });
        }

        let temp = tempfile::Builder::new()
            .prefix("scaffolder_")
            .tempdir_in(&base)
            .map_err(|e| ScaffoldError::Other(format!("Failed to create temp directory: {e}")))?;
        Ok(ScratchSpace {
            path: temp.path().to_path_buf(),
            _temp: Some(temp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// [`AnchorAligner`] backed by the `bwa` executable.
#[derive(Debug)]
pub struct BwaAligner {
    bwa: PathBuf,
    num_threads: usize,
    scratch: ScratchSpace,
    anchors_loaded: bool,
}

impl BwaAligner {
    pub fn new(config: &Config) -> Result<Self> {
        let bwa = find_binary("bwa", config.bwa_path.as_deref())?;
        debug!("Using bwa at {}", bwa.display());

        Ok(BwaAligner {
            bwa,
            num_threads: config.num_threads,
            scratch: ScratchSpace::new(config)?,
            anchors_loaded: false,
        })
    }

    pub fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    /// Aligns long reads against `contig`; used for read-based extension.
    pub fn align_reads(&mut self, contig: &Contig, reads: &Path) -> Result<AlignmentBatch> {
        if !reads.exists() {
            return Err(ScaffoldError::FileNotFound(reads.to_path_buf()));
        }
        let reference = self.write_reference(contig)?;
        self.index(&reference)?;
        let batch = self.mem(&reference, reads)?;
        check_reference(&batch, contig)?;
        Ok(batch)
    }

    fn write_reference(&self, contig: &Contig) -> Result<PathBuf> {
        let reference = self.scratch.file(REFERENCE_FILE);
        fasta::write_fasta(&reference, [(contig.id(), contig.seq())])?;
        Ok(reference)
    }

    fn index(&self, reference: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.bwa);
        cmd.arg("index").arg(reference);

        debug!("Executing: {cmd:?}");

        let output = cmd
            .output()
            .map_err(|e| ScaffoldError::AlignerExecutionFailed(format!("Failed to run bwa: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScaffoldError::AlignerExecutionFailed(format!(
                "bwa index failed: {stderr}"
            )));
        }

        Ok(())
    }

    fn mem(&self, reference: &Path, query: &Path) -> Result<AlignmentBatch> {
        let mut cmd = Command::new(&self.bwa);
        cmd.arg("mem")
            .arg("-t")
            .arg(self.num_threads.to_string())
            .arg(reference)
            .arg(query);

        debug!("Executing: {cmd:?}");

        let output = cmd
            .output()
            .map_err(|e| ScaffoldError::AlignerExecutionFailed(format!("Failed to run bwa: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScaffoldError::AlignerExecutionFailed(format!(
                "bwa mem failed: {stderr}"
            )));
        }

        std::fs::write(self.scratch.file(ALIGNMENT_FILE), &output.stdout)?;

        let batch = AlignmentBatch::from_sam(output.stdout.as_slice())?;
        debug!("bwa mem returned {} records", batch.len());
        Ok(batch)
    }
}

/// The `@SQ` line bwa echoes back must describe the contig that was written.
fn check_reference(batch: &AlignmentBatch, contig: &Contig) -> Result<()> {
    match batch.reference_len(contig.id()) {
        Some(len) if len == contig.len() => Ok(()),
        Some(len) => Err(ScaffoldError::AlignerExecutionFailed(format!(
            "bwa reports reference {} with length {len}, expected {}",
            contig.id(),
            contig.len()
        ))),
        None if batch.reference_sequences.is_empty() => Ok(()),
        None => Err(ScaffoldError::AlignerExecutionFailed(format!(
            "bwa output does not mention reference {}",
            contig.id()
        ))),
    }
}

impl AnchorAligner for BwaAligner {
    fn load_anchors(&mut self, anchors: &[Anchor]) -> Result<()> {
        let path = self.scratch.file(ANCHORS_FILE);
        fasta::write_fasta(
            &path,
            anchors.iter().map(|a| (a.id.as_str(), a.seq.as_slice())),
        )?;
        debug!("Wrote {} anchors to {}", anchors.len(), path.display());
        self.anchors_loaded = true;
        Ok(())
    }

    fn align_anchors(&mut self, contig: &Contig) -> Result<AlignmentBatch> {
        if !self.anchors_loaded {
            return Err(ScaffoldError::Other(
                "anchor pool must be loaded before aligning".to_string(),
            ));
        }
        let reference = self.write_reference(contig)?;
        self.index(&reference)?;
        let batch = self.mem(&reference, &self.scratch.file(ANCHORS_FILE))?;
        check_reference(&batch, contig)?;
        Ok(batch)
    }
}
