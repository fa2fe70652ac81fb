//! Configuration options for scaffolding runs.
//!
//! This module provides a builder pattern for configuring the merge
//! evaluator, the external aligner and the scratch workspace.

use crate::error::{Result, ScaffoldError};
use std::path::PathBuf;

/// Default number of bases taken from each contig end to build an anchor.
pub const DEFAULT_ANCHOR_LEN: usize = 150;

/// Default fraction of the anchor that must reach past the contig end.
pub const ANCHOR_THRESHOLD: f64 = 0.66;

/// Configuration for a scaffolding run.
///
/// # Default Values
/// - `anchor_len`: 150 bp
/// - `anchor_threshold`: 0.66
/// - `num_threads`: Number of CPU cores
/// - `extend_contigs`: true
/// - `max_extension`: 5000 bp
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of bases taken from each contig end to build its anchors
    pub anchor_len: usize,

    /// Fraction of `anchor_len` a record's clipped tail must extend past the
    /// contig end before it counts as merge evidence
    pub anchor_threshold: f64,

    /// Number of threads handed to the aligner
    pub num_threads: usize,

    /// Directory in which the scratch workspace is created
    pub temp_dir: Option<PathBuf>,

    /// Keep scratch files (reference, anchors, SAM) after the run
    pub keep_intermediates: bool,

    /// Explicit path to the `bwa` executable
    pub bwa_path: Option<PathBuf>,

    /// Extend contigs with long-read overhangs before connecting them
    pub extend_contigs: bool,

    /// Upper bound on the bases added to either side of a contig by read
    /// extension
    pub max_extension: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            anchor_len: DEFAULT_ANCHOR_LEN,
            anchor_threshold: ANCHOR_THRESHOLD,
            num_threads: num_cpus::get().max(1),
            temp_dir: None,
            keep_intermediates: false,
            bwa_path: None,
            extend_contigs: true,
            max_extension: 5000,
        }
    }
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Example
    /// ```
    /// use scaffolder_rs::Config;
    ///
    /// let config = Config::builder()
    ///     .anchor_len(200)
    ///     .anchor_threshold(0.7)
    ///     .num_threads(4)
    ///     .build();
    /// assert_eq!(config.anchor_len, 200);
    /// ```
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Checks that the parameters describe a runnable configuration.
    pub fn validate(&self) -> Result<()> {
        if self.anchor_len == 0 {
            return Err(ScaffoldError::InvalidConfig(
                "anchor length must be positive".to_string(),
            ));
        }
        if !(self.anchor_threshold > 0.0 && self.anchor_threshold <= 1.0) {
            return Err(ScaffoldError::InvalidConfig(format!(
                "anchor threshold must be in (0, 1], got {}",
                self.anchor_threshold
            )));
        }
        if self.num_threads == 0 {
            return Err(ScaffoldError::InvalidConfig(
                "number of threads must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing Config instances.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets the anchor length.
    ///
    /// Default: 150 bp
    pub fn anchor_len(mut self, length: usize) -> Self {
        self.config.anchor_len = length;
        self
    }

    /// Sets the fraction of the anchor that must extend past the contig end.
    ///
    /// Value should be in (0.0, 1.0]. Checked by [`Config::validate`].
    /// Default: 0.66
    pub fn anchor_threshold(mut self, threshold: f64) -> Self {
        self.config.anchor_threshold = threshold;
        self
    }

    /// Sets the number of aligner threads.
    ///
    /// Default: Number of CPU cores
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Sets the directory in which scratch files are created.
    ///
    /// Default: System temp directory
    pub fn temp_dir(mut self, path: PathBuf) -> Self {
        self.config.temp_dir = Some(path);
        self
    }

    /// Keep scratch files for debugging.
    ///
    /// Default: false
    pub fn keep_intermediates(mut self, keep: bool) -> Self {
        self.config.keep_intermediates = keep;
        self
    }

    /// Use a specific `bwa` executable instead of searching for one.
    pub fn bwa_path(mut self, path: PathBuf) -> Self {
        self.config.bwa_path = Some(path);
        self
    }

    /// Enables or disables read-based contig extension.
    ///
    /// Default: true
    pub fn extend_contigs(mut self, enabled: bool) -> Self {
        self.config.extend_contigs = enabled;
        self
    }

    /// Caps the number of bases read extension may add to each contig side.
    ///
    /// Default: 5000
    pub fn max_extension(mut self, bases: usize) -> Self {
        self.config.max_extension = bases;
        self
    }

    /// Builds the final Config instance.
    pub fn build(self) -> Config {
        self.config
    }
}

/// Preset configurations for common use cases.
impl Config {
    /// Requires 80% of each anchor to overhang the contig end.
    ///
    /// Fewer joins, fewer false joins in repeat-rich drafts.
    pub fn strict() -> Self {
        Config {
            anchor_threshold: 0.8,
            ..Default::default()
        }
    }

    /// Accepts overhangs covering half the anchor.
    pub fn permissive() -> Self {
        Config {
            anchor_threshold: 0.5,
            ..Default::default()
        }
    }
}
