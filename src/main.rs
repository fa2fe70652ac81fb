use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use scaffolder_rs::config::{ANCHOR_THRESHOLD, DEFAULT_ANCHOR_LEN};
use scaffolder_rs::{Config, Scaffolder};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scaffolder")]
#[command(about = "Scaffold draft assembly contigs with long-read anchor alignments")]
#[command(version)]
struct Cli {
    /// Long reads (FASTA/FASTQ, optionally gzipped)
    reads: PathBuf,

    /// Draft assembly contigs (FASTA)
    draft: PathBuf,

    /// Output scaffolds (FASTA)
    output: PathBuf,

    /// Bases cut from each contig end as an anchor
    #[arg(long, default_value_t = DEFAULT_ANCHOR_LEN)]
    anchor_len: usize,

    /// Fraction of the anchor that must extend past the contig end
    #[arg(long, default_value_t = ANCHOR_THRESHOLD)]
    threshold: f64,

    /// Number of bwa threads (default: all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Directory for scratch files
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Keep scratch files after the run
    #[arg(long)]
    keep_temp: bool,

    /// Path to the bwa executable
    #[arg(long)]
    bwa: Option<PathBuf>,

    /// Skip read-based contig extension
    #[arg(long)]
    no_extend: bool,

    /// Maximum bases added to each contig side by read extension
    #[arg(long, default_value_t = 5000)]
    max_extension: usize,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut builder = Config::builder()
        .anchor_len(cli.anchor_len)
        .anchor_threshold(cli.threshold)
        .keep_intermediates(cli.keep_temp)
        .extend_contigs(!cli.no_extend)
        .max_extension(cli.max_extension);
    if let Some(threads) = cli.threads {
        builder = builder.num_threads(threads);
    }
    if let Some(dir) = cli.temp_dir {
        builder = builder.temp_dir(dir);
    }
    if let Some(bwa) = cli.bwa {
        builder = builder.bwa_path(bwa);
    }

    let scaffolder = Scaffolder::new(builder.build())?;
    let written = scaffolder
        .run(&cli.reads, &cli.draft, &cli.output)
        .with_context(|| format!("Failed to scaffold {}", cli.draft.display()))?;

    info!("Done: {} scaffolds in {}", written, cli.output.display());
    Ok(())
}
