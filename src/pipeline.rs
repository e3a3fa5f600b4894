//! The run coordinator (C8): the pipeline state machine driving reference
//! loading, indexing, the exact pass, re-indexing, the fuzzy pass, and
//! summarization. Grounded on `antonie.cc::main`'s overall control flow,
//! re-expressed as a staged sequence of loops the way `commands/qc.rs::app`
//! structures its own two-pass-with-facets run.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::annotations::AnnotationReader;
use crate::cluster::{Clusterer, Positioned};
use crate::config::RunConfig;
use crate::coverage::{CoverageMap, ReadBackReference};
use crate::dna::{fnv1a32, gc_content, q_to_err};
use crate::errors::AlignError;
use crate::io::fastq::FastqSource;
use crate::io::sam::SamWriter;
use crate::log::LogBuffer;
use crate::matching::{exact, fuzzy};
use crate::reference::index::KmerIndex;
use crate::reference::ReferenceGenome;
use crate::report::{self, Region, RejectionCounts, ReportData, SignificantLocus, UnmatchedRead};
use crate::variants::{self, InsertionCounts, LocusStats, PerOffsetTallies, QualityTallyTable};

/// Fixed k-mer length used once the run falls back to triplet-anchor
/// matching, matching the original's hardcoded `keylen=11`.
const FUZZY_KEYLEN: usize = 11;

/// Repeat counts above this are folded into the same histogram bucket,
/// matching `antonie.cc`'s `min(repeatCount, 20)`.
const DUPLICATE_CAP: u32 = 20;

/// Online mean/variance accumulator (Welford's algorithm), filling the role
/// of the original's `boost::accumulators`-based `VarMeanEstimator` for the
/// per-offset quality estimators and the 4-mer-count coefficient of
/// variation.
#[derive(Debug, Default, Clone, Copy)]
struct VarMeanEstimator {
    count: u64,
    mean: f64,
    m2: f64,
}

impl VarMeanEstimator {
    fn observe(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    fn mean(&self) -> f64 {
        self.mean
    }

    fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }
}

/// Hash-bucketed duplicate-read counter, capped at [`DUPLICATE_CAP`].
struct DuplicateCounter {
    seen: HashMap<u32, u32>,
}

impl DuplicateCounter {
    fn new() -> Self {
        DuplicateCounter {
            seen: HashMap::new(),
        }
    }

    /// Records one observation of `nucleotides`, returning the running
    /// count for its exact sequence.
    fn feed(&mut self, nucleotides: &[u8]) -> u32 {
        let hash = fnv1a32(nucleotides);
        let count = self.seen.entry(hash).or_insert(0);
        *count += 1;
        *count
    }

    /// A histogram of `[0, DUPLICATE_CAP]`-capped repeat counts, as
    /// `(bucket, count)` pairs.
    fn histogram(&self) -> Vec<(usize, u64)> {
        let mut buckets = vec![0u64; DUPLICATE_CAP as usize + 1];
        for &count in self.seen.values() {
            buckets[count.min(DUPLICATE_CAP) as usize] += 1;
        }
        buckets.into_iter().enumerate().collect()
    }
}

fn per_offset_to_qscore(per_offset: &PerOffsetTallies) -> Vec<(usize, f64)> {
    per_offset
        .correct_mappings
        .iter()
        .zip(&per_offset.wrong_mappings)
        .enumerate()
        .filter(|(_, (&c, &w))| c != 0 && w != 0)
        .map(|(i, (&c, &w))| {
            let total = (c + w) as f64;
            (i, -10.0 * (w as f64 / total).log10())
        })
        .collect()
}

/// Drives the whole run: loads inputs, performs the exact pass, rebuilds the
/// index for fuzzy matching, performs the fuzzy pass, and writes the report.
pub struct RunCoordinator {
    config: RunConfig,
}

impl RunCoordinator {
    pub fn new(config: RunConfig) -> Self {
        RunCoordinator { config }
    }

    pub fn run(&self, log_buffer: LogBuffer) -> Result<(), AlignError> {
        info!("Loading reference genome from {}", self.config.reference.display());
        let genome = ReferenceGenome::load(&self.config.reference)?;
        let genome_gc_ratio = genome.composition().gc_ratio();
        info!("GC content of reference genome: {:.2}%", 100.0 * genome_gc_ratio);

        let exclude_genome = match &self.config.exclude {
            Some(path) => {
                info!("Loading exclusion genome from {}", path.display());
                Some(ReferenceGenome::load(path)?)
            }
            None => None,
        };

        let annotations = match &self.config.annotations {
            Some(path) => {
                info!("Loading gene annotations from {}", path.display());
                Some(AnnotationReader::load(path)?)
            }
            None => None,
        };

        let mut fastq = FastqSource::open(
            &self.config.fastq,
            self.config.quality_offset,
            self.config.begin_snip,
            self.config.end_snip,
        )?;

        let read_len = match fastq.next_record()? {
            Some(first) => first.nucleotides.len(),
            None => {
                warn!("FASTQ source contained no reads");
                return Ok(());
            }
        };
        fastq.seek_to(0)?;

        info!(
            "Snipping {} from beginning of reads, {} from end of reads",
            self.config.begin_snip, self.config.end_snip
        );

        let exact_index = KmerIndex::build(&genome, read_len);
        let exclude_index = exclude_genome.as_ref().map(|g| KmerIndex::build(g, read_len));

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        info!("Using PRNG seed {}", self.config.seed);

        let mut coverage = CoverageMap::new(genome.size());
        let mut exclude_coverage = exclude_genome.as_ref().map(|g| CoverageMap::new(g.size()));

        let mut sam_writer = match &self.config.sam_file {
            Some(path) => Some(SamWriter::create(path, &genome.name, genome.size())?),
            None => None,
        };

        let mut per_offset = PerOffsetTallies::new(read_len);
        let mut control_per_offset = PerOffsetTallies::new(read_len);
        let mut control_locus_stats = LocusStats::new();
        let mut control_quality_tally = QualityTallyTable::new();
        let mut control_insertion_counts = InsertionCounts::new();
        let mut gc_mappings = vec![0u64; read_len];
        let mut ta_mappings = vec![0u64; read_len];
        let mut kmer_mappings: Vec<HashMap<u32, u64>> = vec![HashMap::new(); read_len];
        let mut gc_read_histogram = vec![0u64; read_len + 1];
        let mut quality_tally = QualityTallyTable::new();
        let mut qcounts = vec![0u64; 256];
        let mut per_offset_quality: Vec<VarMeanEstimator> = vec![VarMeanEstimator::default(); read_len];
        let mut duplicate_counter = DuplicateCounter::new();
        let mut locus_stats = LocusStats::new();
        let mut insertion_counts = InsertionCounts::new();

        let mut counts = RejectionCounts::default();
        let mut unmatched_offsets: Vec<u64> = Vec::new();

        info!("Performing exact matches of reads to reference genome");

        loop {
            let offset_in_source = fastq.current_offset();
            let record = match fastq.next_record()? {
                Some(r) => r,
                None => break,
            };
            counts.total_reads += 1;

            for (offset, &q) in record.quality.iter().enumerate() {
                let err = q_to_err(q)?;
                qcounts[q as usize] += 1;
                if let Some(estimator) = per_offset_quality.get_mut(offset) {
                    estimator.observe(err);
                }
            }

            if self.config.duplimit > 0 && duplicate_counter.feed(&record.nucleotides) > self.config.duplimit {
                counts.over_frequency += 1;
                continue;
            }

            let bucket = (read_len as f64 * gc_content(&record.nucleotides)).round() as usize;
            if let Some(slot) = gc_read_histogram.get_mut(bucket.min(read_len)) {
                *slot += 1;
            }

            let mut had_n = false;
            for (i, &base) in record.nucleotides.iter().enumerate() {
                if i < gc_mappings.len() {
                    if base == b'G' || base == b'C' {
                        gc_mappings[i] += 1;
                    } else {
                        ta_mappings[i] += 1;
                    }
                }
                if i < kmer_mappings.len() && record.nucleotides.len() - i > 4 {
                    let kmer = fnv1a32(&record.nucleotides[i..i + 4]);
                    *kmer_mappings[i].entry(kmer).or_insert(0) += 1;
                }
                if base == b'N' {
                    had_n = true;
                }
            }

            if had_n {
                counts.contains_n += 1;
                unmatched_offsets.push(offset_in_source);
                continue;
            }
            if record.nucleotides.len() != read_len {
                counts.wrong_length += 1;
                unmatched_offsets.push(offset_in_source);
                continue;
            }

            let mut nucleotides = record.nucleotides.clone();
            let quality = record.quality.clone();
            let hit = exact::find_both(
                &genome,
                &exact_index,
                &mut coverage,
                &mut nucleotides,
                &quality,
                self.config.qlimit,
                &mut rng,
            )?;

            if let Some(m) = hit {
                coverage.map_read(
                    m.pos,
                    ReadBackReference {
                        read_offset_in_source: offset_in_source,
                        reversed: m.reversed,
                        indel_offset: 0,
                    },
                );
                for (i, &q) in quality.iter().enumerate() {
                    let read_offset = if m.reversed { read_len - 1 - i } else { i };
                    // Deliberate improvement over the original, which only
                    // bulk-overwrites correct_mappings after the whole pass:
                    // per-base accounting keeps referenceQ/qqdata meaningful
                    // for exactly-matched reads too.
                    per_offset.correct_mappings[read_offset] += 1;
                    quality_tally.record_correct(q);
                }
                if let Some(writer) = sam_writer.as_mut() {
                    writer.write_record(&record.name, m.pos, m.reversed, &nucleotides, &quality, 0)?;
                }
                counts.exact_matched += 1;
                continue;
            }

            if let (Some(exclude_genome), Some(exclude_index), Some(exclude_coverage)) = (
                exclude_genome.as_ref(),
                exclude_index.as_ref(),
                exclude_coverage.as_mut(),
            ) {
                let mut exclude_read = record.nucleotides.clone();
                let excluded = exact::find_both(
                    exclude_genome,
                    exclude_index,
                    exclude_coverage,
                    &mut exclude_read,
                    &quality,
                    self.config.qlimit,
                    &mut rng,
                )?;
                if let Some(m) = excluded {
                    for i in 0..quality.len() {
                        let read_offset = if m.reversed { read_len - 1 - i } else { i };
                        control_per_offset.correct_mappings[read_offset] += 1;
                    }
                    continue;
                }
            }

            unmatched_offsets.push(offset_in_source);
        }

        let total_nucleotides = counts.total_reads * read_len as u64;
        info!(
            "Total reads: {} ({:.2} gigabase-pairs)",
            counts.total_reads,
            total_nucleotides as f64 / 1_000_000_000.0
        );
        info!(
            "Full matches: {} ({:.2}%)",
            counts.exact_matched,
            100.0 * counts.exact_matched as f64 / counts.total_reads.max(1) as f64
        );

        let full_summary = coverage.summarize();

        info!("Performing sliding window partial matches");
        let fuzzy_index = KmerIndex::build(&genome, FUZZY_KEYLEN);
        let fuzzy_exclude_index = exclude_genome.as_ref().map(|g| KmerIndex::build(g, FUZZY_KEYLEN));

        let mut still_unfound = Vec::new();
        for offset in unmatched_offsets {
            fastq.seek_to(offset)?;
            let record = match fastq.next_record()? {
                Some(r) => r,
                None => continue,
            };

            let mut nucleotides = record.nucleotides.clone();
            let mut quality = record.quality.clone();
            let candidate = fuzzy::fuzzy_find(
                &genome,
                &fuzzy_index,
                &mut nucleotides,
                &mut quality,
                self.config.qlimit,
                &mut rng,
            )?;

            if let Some(candidate) = candidate {
                let _diffcount = variants::dna_diff(
                    &genome,
                    candidate.pos,
                    &mut nucleotides,
                    &mut quality,
                    candidate.reversed,
                    self.config.qlimit,
                    offset,
                    &mut coverage,
                    &mut locus_stats,
                    &mut quality_tally,
                    &mut per_offset,
                    &mut insertion_counts,
                );
                if let Some(writer) = sam_writer.as_mut() {
                    let indel_offset = coverage
                        .back_references_at(candidate.pos)
                        .first()
                        .map(|r| r.indel_offset as i64)
                        .unwrap_or(0);
                    writer.write_record(
                        &record.name,
                        candidate.pos,
                        candidate.reversed,
                        &nucleotides,
                        &quality,
                        indel_offset,
                    )?;
                }
                counts.fuzzy_matched += 1;
                continue;
            }

            if let (Some(exclude_genome), Some(fuzzy_exclude_index)) =
                (exclude_genome.as_ref(), fuzzy_exclude_index.as_ref())
            {
                let excluded = fuzzy::fuzzy_find(
                    exclude_genome,
                    fuzzy_exclude_index,
                    &mut nucleotides,
                    &mut quality,
                    self.config.qlimit,
                    &mut rng,
                )?;
                if let Some(excluded) = excluded {
                    if let Some(exclude_coverage) = exclude_coverage.as_mut() {
                        variants::dna_diff(
                            exclude_genome,
                            excluded.pos,
                            &mut nucleotides,
                            &mut quality,
                            excluded.reversed,
                            self.config.qlimit,
                            offset,
                            exclude_coverage,
                            &mut control_locus_stats,
                            &mut control_quality_tally,
                            &mut control_per_offset,
                            &mut control_insertion_counts,
                        );
                    }
                    continue;
                }
            }

            still_unfound.push(record);
        }

        counts.unmatched = still_unfound.len() as u64;
        info!(
            "Unmatchable reads: {} ({:.2}%)",
            counts.unmatched,
            100.0 * counts.unmatched as f64 / counts.total_reads.max(1) as f64
        );

        if self.config.unmatched_dump {
            let unmatched_reads: Vec<UnmatchedRead> = still_unfound
                .iter()
                .map(|r| UnmatchedRead {
                    name: &r.name,
                    nucleotides: &r.nucleotides,
                    quality: &r.quality,
                })
                .collect();
            report::write_unfound_fastq(&self.config.output_dir.join("unfound.fastq"), &unmatched_reads)?;
        }

        if let Some(writer) = sam_writer.as_mut() {
            writer.flush()?;
        }

        // --- Summarize ---

        let summary = coverage.summarize();
        let undercovered_clusters = CoverageMap::cluster_undercovered(summary.undercovered_regions, 100);
        info!(
            "Undercovered nucleotides: {} ({:.2}%), {} ranges",
            summary.undercovered_positions,
            100.0 * summary.undercovered_positions as f64 / genome.size().max(1) as f64,
            undercovered_clusters.len()
        );

        let mut regions = Vec::new();
        for cluster in &undercovered_clusters {
            let mid = cluster.midpoint();
            regions.push(self.emit_region(
                &genome,
                &coverage,
                annotations.as_ref(),
                "Undermatched",
                mid.saturating_sub(200),
                mid + 200,
            ));
        }

        struct ClusterLocus(usize);
        impl Positioned for ClusterLocus {
            fn position(&self) -> usize {
                self.0
            }
        }

        let mut significant_loci = Vec::new();
        let mut variable_positions: Vec<usize> = locus_stats.positions().collect();
        variable_positions.sort_unstable();
        let mut locus_clusterer: Clusterer<ClusterLocus> = Clusterer::new(100);
        for pos in variable_positions {
            let samples = locus_stats.samples_at(pos);
            let reference_coverage = coverage.coverage_at(pos);
            let score = variants::variability_score(&genome, pos, reference_coverage, samples);
            if !variants::is_significant(score) {
                continue;
            }
            let reference_base = genome.snippet(pos, pos + 1).first().copied().unwrap_or(b'?');
            significant_loci.push(SignificantLocus {
                pos,
                reference_base,
                coverage: reference_coverage,
                variability: score,
            });
            locus_clusterer.feed(ClusterLocus(pos));
        }
        info!("Found {} significantly variable loci", significant_loci.len());

        // Only the first locus in each cluster gets its own region; the
        // rest are already covered by that region's flanking window.
        for cluster in &locus_clusterer.clusters {
            if cluster.members.len() > 1 {
                info!(
                    "Skipping {} other member(s) of a variable-locus cluster near position {}",
                    cluster.members.len() - 1,
                    cluster.members[0].position()
                );
            }
            let pos = cluster.members[0].position();
            regions.push(self.emit_region(
                &genome,
                &coverage,
                annotations.as_ref(),
                "Variable",
                pos.saturating_sub(200),
                pos + 200,
            ));
        }

        let mut insertion_hotspots: Vec<(usize, u32)> = insertion_counts
            .hotspots()
            .filter(|&(_, count)| count > 10)
            .collect();
        insertion_hotspots.sort_by(|a, b| b.1.cmp(&a.1));
        for &(pos, _) in &insertion_hotspots {
            regions.push(self.emit_region(
                &genome,
                &coverage,
                annotations.as_ref(),
                "Insert",
                pos.saturating_sub(200),
                pos + 200,
            ));
        }
        info!("Found {} significant inserts", insertion_hotspots.len());

        let total_nucleotides_f = total_nucleotides.max(1) as f64;
        let qhisto: Vec<(usize, f64)> = qcounts[..50.min(qcounts.len())]
            .iter()
            .enumerate()
            .map(|(q, &c)| (q, c as f64 / total_nucleotides_f))
            .collect();

        let total_reads_f = counts.total_reads.max(1) as f64;
        let dupcounts: Vec<(usize, f64)> = duplicate_counter
            .histogram()
            .into_iter()
            .map(|(bucket, count)| (bucket, count as f64 / total_reads_f))
            .collect();

        let total_gc_reads = gc_read_histogram.iter().sum::<u64>().max(1) as f64;
        let gcreadhisto: Vec<(usize, f64)> = gc_read_histogram
            .iter()
            .enumerate()
            .map(|(i, &c)| (i, c as f64 / total_gc_reads))
            .collect();

        let gc_ref_histogram = genome.gc_histogram(read_len);
        let total_gc_ref = gc_ref_histogram.iter().sum::<u64>().max(1) as f64;
        let gcrefhisto: Vec<(usize, f64)> = gc_ref_histogram
            .iter()
            .enumerate()
            .map(|(i, &c)| (i, c as f64 / total_gc_ref))
            .collect();

        let mut kmerstats = Vec::new();
        for (offset, counts_by_kmer) in kmer_mappings.iter().enumerate() {
            if offset + 4 >= read_len {
                break;
            }
            let mut estimator = VarMeanEstimator::default();
            for &count in counts_by_kmer.values() {
                estimator.observe(count as f64);
            }
            if estimator.mean() > 0.0 {
                kmerstats.push((offset, estimator.variance().sqrt() / estimator.mean()));
            }
        }

        let gc_ratios: Vec<(usize, f64)> = (0..read_len)
            .map(|i| {
                let total = (gc_mappings[i] + ta_mappings[i]).max(1) as f64;
                (i, gc_mappings[i] as f64 / total)
            })
            .collect();

        let full_total = full_summary.histogram.iter().sum::<u64>().max(1) as f64;
        let full_histo: Vec<(usize, f64)> = full_summary
            .histogram
            .iter()
            .enumerate()
            .map(|(cov, &c)| (cov, c as f64 / full_total))
            .collect();

        let fuzzy_total = summary.histogram.iter().sum::<u64>().max(1) as f64;
        let fuzzy_histo: Vec<(usize, f64)> = summary
            .histogram
            .iter()
            .enumerate()
            .map(|(cov, &c)| (cov, c as f64 / fuzzy_total))
            .collect();

        let quality_curve = |bias: f64| -> Vec<(usize, f64)> {
            per_offset_quality
                .iter()
                .enumerate()
                .filter(|(_, e)| e.count > 0)
                .map(|(i, e)| {
                    let q = -10.0 * e.mean().log10();
                    let spread = (-10.0 * e.variance().max(1e-12).log10()).sqrt();
                    (i, q + bias * spread)
                })
                .collect()
        };
        let qualities = quality_curve(0.0);
        let qlo = quality_curve(-1.0);
        let qhi = quality_curve(1.0);

        let reference_q = per_offset_to_qscore(&per_offset);
        let control_q = per_offset_to_qscore(&control_per_offset);

        let qqdata: Vec<(usize, f64)> = quality_tally
            .iter()
            .filter(|(_, t)| t.correct > 0 || t.incorrect > 0)
            .map(|(q, t)| {
                let total = t.correct + t.incorrect;
                let qscore = if t.incorrect > 0 && t.correct > 0 {
                    -10.0 * (t.incorrect as f64 / total as f64).log10()
                } else if t.correct == 0 {
                    0.0
                } else {
                    41.0
                };
                (q as usize, qscore)
            })
            .collect();

        let report_data = ReportData {
            qhisto,
            dupcounts,
            gcreadhisto,
            gcrefhisto,
            kmerstats,
            gc_ratios,
            full_histo,
            fuzzy_histo,
            qualities,
            qlo,
            qhi,
            reference_q,
            control_q,
            qqdata,
            regions,
            antonie_log: log_buffer.take(),
            genome_gc_ratio,
        };

        report::write_data_js(&self.config.output_dir.join("data.js"), &report_data)?;
        report::print_summary(&counts, &significant_loci, &insertion_hotspots);

        Ok(())
    }

    fn emit_region(
        &self,
        genome: &ReferenceGenome,
        coverage: &CoverageMap,
        annotations: Option<&AnnotationReader>,
        name: &str,
        start: usize,
        stop: usize,
    ) -> Region {
        let pos = (start + stop) / 2;
        let depth = (start..stop).map(|p| (p, coverage.coverage_at(p))).collect();
        let picture = String::from_utf8_lossy(genome.snippet(start, stop)).into_owned();

        let mut annotation_text = String::new();
        if let Some(annotations) = annotations {
            for a in annotations.lookup(pos as u64) {
                annotation_text.push_str(&a.name);
                annotation_text.push_str(" [");
                annotation_text.push_str(&a.tag);
                annotation_text.push_str("], ");
            }
        }

        Region {
            name: name.to_string(),
            pos,
            depth,
            picture,
            annotations: annotation_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_var_mean_estimator_tracks_mean_and_variance() {
        let mut e = VarMeanEstimator::default();
        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            e.observe(x);
        }
        assert!((e.mean() - 5.0).abs() < 1e-9);
        assert!((e.variance() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_counter_caps_histogram_bucket() {
        let mut dc = DuplicateCounter::new();
        for _ in 0..25 {
            dc.feed(b"ACGTACGT");
        }
        let histogram = dc.histogram();
        assert_eq!(histogram[DUPLICATE_CAP as usize].1, 1);
    }

    #[test]
    fn test_per_offset_to_qscore_skips_zero_entries() {
        let mut per_offset = PerOffsetTallies::new(3);
        per_offset.correct_mappings = vec![10, 0, 5];
        per_offset.wrong_mappings = vec![1, 0, 0];
        let result = per_offset_to_qscore(&per_offset);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0, 0);
    }

    fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_run_end_to_end_writes_data_js_and_sam() {
        let dir = tempfile::tempdir().unwrap();
        let reference = write_file(
            dir.path(),
            "ref.fasta",
            ">chr1\nACGTACGTTTGGCCAATTACGTGGGGCCCCAAAATTTTACGTACGTTTGG\n",
        );
        let fastq = write_file(
            dir.path(),
            "reads.fastq",
            "@read1\nACGTACGTTTGG\n+\nIIIIIIIIIIII\n@read2\nCCAATTACGTGG\n+\nIIIIIIIIIIII\n",
        );
        let sam_path = dir.path().join("out.sam");

        let config = RunConfig {
            reference,
            fastq,
            annotations: None,
            exclude: None,
            sam_file: Some(sam_path.clone()),
            quality_offset: 33,
            begin_snip: 0,
            end_snip: 0,
            qlimit: 30,
            duplimit: 0,
            unmatched_dump: false,
            output_dir: dir.path().to_path_buf(),
            seed: 42,
        };

        let coordinator = RunCoordinator::new(config);
        let log_buffer = LogBuffer::new();
        coordinator.run(log_buffer).unwrap();

        let data_js = std::fs::read_to_string(dir.path().join("data.js")).unwrap();
        assert!(data_js.contains("var genomeGCRatio="));
        assert!(sam_path.exists());
    }
}
