//! Report generation: the `data.js` plotting feed, the optional unmatched-read
//! dump, and the stdout summary table. Grounded on `antonie.cc`'s
//! `jsonVector`/`printCorrectMappings`/`printGCMappings`/`emitRegion` blocks
//! in `main()`, translated from hand-rolled `fprintf` calls into `serde_json`
//! splices the way the teacher's `qc/general.rs` serializes its own metrics.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use num_format::{Locale, ToFormattedString};
use prettytable::{row, Table};
use serde::Serialize;

use crate::errors::AlignError;

/// One region of interest to plot: an undercovered gap, a variable locus, or
/// an insertion hotspot. Mirrors `emitRegion`'s `region[i]` object.
#[derive(Debug, Clone, Serialize)]
pub struct Region {
    pub name: String,
    pub pos: usize,
    pub depth: Vec<(usize, u32)>,
    pub picture: String,
    pub annotations: String,
}

/// One entry in the significant-locus table printed to stdout.
#[derive(Debug, Clone)]
pub struct SignificantLocus {
    pub pos: usize,
    pub reference_base: u8,
    pub coverage: u32,
    pub variability: u32,
}

/// Every named variable `data.js` must define, per spec.md's Outputs
/// section. Populated by the run coordinator once a run completes.
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    pub qhisto: Vec<(usize, f64)>,
    pub dupcounts: Vec<(usize, f64)>,
    pub gcreadhisto: Vec<(usize, f64)>,
    pub gcrefhisto: Vec<(usize, f64)>,
    pub kmerstats: Vec<(usize, f64)>,
    pub gc_ratios: Vec<(usize, f64)>,
    pub full_histo: Vec<(usize, f64)>,
    pub fuzzy_histo: Vec<(usize, f64)>,
    pub qualities: Vec<(usize, f64)>,
    pub qlo: Vec<(usize, f64)>,
    pub qhi: Vec<(usize, f64)>,
    pub reference_q: Vec<(usize, f64)>,
    pub control_q: Vec<(usize, f64)>,
    pub qqdata: Vec<(usize, f64)>,
    pub regions: Vec<Region>,
    pub antonie_log: String,
    pub genome_gc_ratio: f64,
}

fn write_js_var<T: Serialize>(out: &mut impl Write, name: &str, value: &T) -> Result<(), AlignError> {
    let json = serde_json::to_string(value).map_err(|e| AlignError::BadFormat {
        detail: e.to_string(),
    })?;
    writeln!(out, "var {}={};", name, json)?;
    Ok(())
}

/// Writes `data.js`: every variable named in spec.md's Outputs section.
pub fn write_data_js(path: &Path, data: &ReportData) -> Result<(), AlignError> {
    let file = File::create(path)?;
    let mut out = std::io::BufWriter::new(file);

    write_js_var(&mut out, "qhisto", &data.qhisto)?;
    write_js_var(&mut out, "dupcounts", &data.dupcounts)?;
    write_js_var(&mut out, "gcreadhisto", &data.gcreadhisto)?;
    write_js_var(&mut out, "gcrefhisto", &data.gcrefhisto)?;
    write_js_var(&mut out, "kmerstats", &data.kmerstats)?;
    write_js_var(&mut out, "gcRatios", &data.gc_ratios)?;
    write_js_var(&mut out, "fullHisto", &data.full_histo)?;
    write_js_var(&mut out, "fuzzyHisto", &data.fuzzy_histo)?;
    write_js_var(&mut out, "qualities", &data.qualities)?;
    write_js_var(&mut out, "qlo", &data.qlo)?;
    write_js_var(&mut out, "qhi", &data.qhi)?;
    write_js_var(&mut out, "referenceQ", &data.reference_q)?;
    write_js_var(&mut out, "controlQ", &data.control_q)?;
    write_js_var(&mut out, "qqdata", &data.qqdata)?;

    for (i, region) in data.regions.iter().enumerate() {
        writeln!(
            out,
            "region[{}]={};",
            i,
            serde_json::to_string(region).map_err(|e| AlignError::BadFormat {
                detail: e.to_string(),
            })?
        )?;
    }

    writeln!(out, "var antonieLog=\"{}\";", escape_js_string(&data.antonie_log))?;
    writeln!(out, "var genomeGCRatio={};", data.genome_gc_ratio)?;

    out.flush()?;
    Ok(())
}

fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// One unfound read, for the `--unmatched-dump` concatenated FASTQ output.
pub struct UnmatchedRead<'a> {
    pub name: &'a str,
    pub nucleotides: &'a [u8],
    pub quality: &'a [u8],
}

/// Writes reads that matched neither the exact nor the fuzzy pass back out
/// as a plain FASTQ file, gated by `--unmatched-dump` at the CLI layer.
pub fn write_unfound_fastq(path: &Path, reads: &[UnmatchedRead]) -> Result<(), AlignError> {
    let file = File::create(path)?;
    let mut out = std::io::BufWriter::new(file);
    for read in reads {
        writeln!(out, "@{}", read.name)?;
        out.write_all(read.nucleotides)?;
        writeln!(out)?;
        writeln!(out, "+")?;
        let quality: Vec<u8> = read.quality.iter().map(|&q| q + 33).collect();
        out.write_all(&quality)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Summary counters for the skip/reject lines spec.md §7 requires (absolute
/// count plus percentage of reads seen).
#[derive(Debug, Clone, Default)]
pub struct RejectionCounts {
    pub total_reads: u64,
    pub contains_n: u64,
    pub wrong_length: u64,
    pub over_frequency: u64,
    pub exact_matched: u64,
    pub fuzzy_matched: u64,
    pub unmatched: u64,
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

/// Prints the stdout textual report: the skip/reject summary, the
/// significant-locus table, and the insertion-hotspot table. Mirrors the
/// teacher's `qc.rs`-style thousands-grouped counters plus a `prettytable`
/// table, in place of the original's bare `cout<<boost::format(...)`.
pub fn print_summary(
    counts: &RejectionCounts,
    significant_loci: &[SignificantLocus],
    insertion_hotspots: &[(usize, u32)],
) {
    tracing::info!(
        "Processed {} reads",
        counts.total_reads.to_formatted_string(&Locale::en)
    );
    tracing::info!(
        "  exact matches:    {:>10} ({:.2}%)",
        counts.exact_matched.to_formatted_string(&Locale::en),
        percentage(counts.exact_matched, counts.total_reads)
    );
    tracing::info!(
        "  fuzzy matches:    {:>10} ({:.2}%)",
        counts.fuzzy_matched.to_formatted_string(&Locale::en),
        percentage(counts.fuzzy_matched, counts.total_reads)
    );
    tracing::info!(
        "  unmatched:        {:>10} ({:.2}%)",
        counts.unmatched.to_formatted_string(&Locale::en),
        percentage(counts.unmatched, counts.total_reads)
    );
    tracing::info!(
        "  contained N:      {:>10} ({:.2}%)",
        counts.contains_n.to_formatted_string(&Locale::en),
        percentage(counts.contains_n, counts.total_reads)
    );
    tracing::info!(
        "  wrong length:     {:>10} ({:.2}%)",
        counts.wrong_length.to_formatted_string(&Locale::en),
        percentage(counts.wrong_length, counts.total_reads)
    );
    tracing::info!(
        "  over-frequency:   {:>10} ({:.2}%)",
        counts.over_frequency.to_formatted_string(&Locale::en),
        percentage(counts.over_frequency, counts.total_reads)
    );

    if !significant_loci.is_empty() {
        let mut table = Table::new();
        table.add_row(row!["Position", "Reference", "Coverage", "Variability"]);
        for locus in significant_loci {
            table.add_row(row![
                locus.pos,
                locus.reference_base as char,
                locus.coverage,
                locus.variability,
            ]);
        }
        table.printstd();
    }

    if !insertion_hotspots.is_empty() {
        let mut table = Table::new();
        table.add_row(row!["Position", "Insertion count"]);
        for (pos, count) in insertion_hotspots {
            table.add_row(row![pos, count]);
        }
        table.printstd();
    }
}
