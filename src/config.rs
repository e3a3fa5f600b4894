//! Run configuration parsed from the command line.

use std::path::PathBuf;

use clap::Parser;

/// Aligns short reads to a reference genome, producing coverage, variant
/// candidates, quality recalibration statistics, and a SAM alignment.
#[derive(Debug, Parser)]
#[command(name = "ngs-align", version, about)]
pub struct Cli {
    /// Reference genome in FASTA format.
    #[arg(long = "reference", value_name = "FASTA")]
    pub reference: PathBuf,

    /// Reads to align, in FASTQ format (optionally gzip-compressed).
    #[arg(long = "fastq", value_name = "FASTQ")]
    pub fastq: PathBuf,

    /// Gene annotation table in CSV format.
    #[arg(long = "annotations", value_name = "CSV")]
    pub annotations: Option<PathBuf>,

    /// Exclusion genome (e.g. a sequencing spike-in) in FASTA format.
    #[arg(long = "exclude", value_name = "FASTA")]
    pub exclude: Option<PathBuf>,

    /// Write a SAM alignment to this path.
    #[arg(long = "sam-file", value_name = "PATH")]
    pub sam_file: Option<PathBuf>,

    /// Quality encoding offset. 33 for Sanger.
    #[arg(long = "quality-offset", default_value_t = 33)]
    pub quality_offset: u8,

    /// Number of bases to trim from the start of every read.
    #[arg(long = "begin-snip", default_value_t = 0)]
    pub begin_snip: usize,

    /// Number of bases to trim from the end of every read.
    #[arg(long = "end-snip", default_value_t = 0)]
    pub end_snip: usize,

    /// Quality threshold below which an observation does not contribute to
    /// coverage or variant calls.
    #[arg(long = "qlimit", default_value_t = 30)]
    pub qlimit: u8,

    /// Reject reads whose exact sequence has been seen more than this many
    /// times. 0 disables the filter.
    #[arg(long = "duplimit", default_value_t = 0)]
    pub duplimit: u32,

    /// Dump residual unmatched reads to unfound.fastq.
    #[arg(long = "unmatched-dump", default_value_t = false)]
    pub unmatched_dump: bool,

    /// Directory to write data.js/unfound.fastq into. Defaults to the
    /// current directory.
    #[arg(long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// Seed for the tie-breaking PRNG. Defaults to a value derived from the
    /// current time; pass an explicit value for reproducible runs.
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

/// A fully-resolved run configuration, with the PRNG seed always present so
/// that it can be logged (and therefore embedded in the run's output log)
/// regardless of whether the user supplied one.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub reference: PathBuf,
    pub fastq: PathBuf,
    pub annotations: Option<PathBuf>,
    pub exclude: Option<PathBuf>,
    pub sam_file: Option<PathBuf>,
    pub quality_offset: u8,
    pub begin_snip: usize,
    pub end_snip: usize,
    pub qlimit: u8,
    pub duplimit: u32,
    pub unmatched_dump: bool,
    pub output_dir: PathBuf,
    pub seed: u64,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        let seed = cli.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });

        RunConfig {
            reference: cli.reference,
            fastq: cli.fastq,
            annotations: cli.annotations,
            exclude: cli.exclude,
            sam_file: cli.sam_file,
            quality_offset: cli.quality_offset,
            begin_snip: cli.begin_snip,
            end_snip: cli.end_snip,
            qlimit: cli.qlimit,
            duplimit: cli.duplimit,
            unmatched_dump: cli.unmatched_dump,
            output_dir: cli.output_dir,
            seed,
        }
    }
}
