//! The variant & recalibration accumulator (C7, spec.md §4.7–§4.8):
//! per-quality correct/incorrect tallies, per-locus allele samples,
//! insertion hotspots, and the downstream variability score.

use std::collections::HashMap;

use crate::coverage::{CoverageMap, ReadBackReference};
use crate::matching::indel;
use crate::reference::ReferenceGenome;

/// `(correct, incorrect)` counts of base-observations at a single reported
/// quality score.
#[derive(Debug, Default, Clone, Copy)]
pub struct QualityTally {
    pub correct: u64,
    pub incorrect: u64,
}

/// Per-quality-score tally table, indexed 0..255 by the reported (not
/// error-adjusted) quality value.
pub struct QualityTallyTable(Vec<QualityTally>);

impl QualityTallyTable {
    pub fn new() -> Self {
        QualityTallyTable(vec![QualityTally::default(); 256])
    }

    pub fn record_correct(&mut self, quality: u8) {
        self.0[quality as usize].correct += 1;
    }

    pub fn record_incorrect(&mut self, quality: u8) {
        self.0[quality as usize].incorrect += 1;
    }

    pub fn get(&self, quality: u8) -> QualityTally {
        self.0[quality as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, QualityTally)> + '_ {
        self.0.iter().enumerate().map(|(q, t)| (q as u8, *t))
    }
}

impl Default for QualityTallyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// One observed mismatch at a locus: the base actually read, its reported
/// quality, and whether it fell in the distal ("tail") half of the read
/// after orientation normalization.
#[derive(Debug, Clone, Copy)]
pub struct LocusSample {
    pub base: u8,
    pub quality: u8,
    pub tail: bool,
}

/// Per-reference-position collections of mismatch samples (spec.md §3,
/// "Locus stats"). Only positions with at least one observed mismatch have
/// an entry.
#[derive(Default)]
pub struct LocusStats(HashMap<usize, Vec<LocusSample>>);

impl LocusStats {
    pub fn new() -> Self {
        LocusStats(HashMap::new())
    }

    pub fn record(&mut self, pos: usize, sample: LocusSample) {
        self.0.entry(pos).or_default().push(sample);
    }

    pub fn samples_at(&self, pos: usize) -> &[LocusSample] {
        self.0.get(&pos).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }
}

/// Reference position -> count of reads supporting an insertion there.
#[derive(Default)]
pub struct InsertionCounts(HashMap<usize, u32>);

impl InsertionCounts {
    pub fn new() -> Self {
        InsertionCounts(HashMap::new())
    }

    pub fn increment(&mut self, pos: usize) {
        *self.0.entry(pos).or_insert(0) += 1;
    }

    pub fn count_at(&self, pos: usize) -> u32 {
        self.0.get(&pos).copied().unwrap_or(0)
    }

    pub fn hotspots(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.0.iter().map(|(&pos, &count)| (pos, count))
    }
}

/// Fixed-size per-read-offset tallies that the columnar `dna_diff` pass
/// updates (spec.md §3, "Per-read-offset tallies" — the `correctMappings`/
/// `wrongMappings` half; the GC/AT and 4-mer halves are populated directly
/// by the run coordinator during the exact pass, not here).
pub struct PerOffsetTallies {
    pub correct_mappings: Vec<u64>,
    pub wrong_mappings: Vec<u64>,
}

impl PerOffsetTallies {
    pub fn new(read_len: usize) -> Self {
        PerOffsetTallies {
            correct_mappings: vec![0; read_len],
            wrong_mappings: vec![0; read_len],
        }
    }
}

/// Walks `read` against `ref[pos..pos+read.len()]`, recording coverage and
/// mismatch samples. Mutates `read`/`quality` in place when a 1-base indel
/// is detected, so that the columnar comparison below realigns. Returns the
/// final (possibly indel-collapsed) weighted diff count.
#[allow(clippy::too_many_arguments)]
pub fn dna_diff(
    genome: &ReferenceGenome,
    pos: usize,
    read: &mut Vec<u8>,
    quality: &mut Vec<u8>,
    reversed: bool,
    qlimit: u8,
    read_offset_in_source: u64,
    coverage: &mut CoverageMap,
    locus_stats: &mut LocusStats,
    quality_tally: &mut QualityTallyTable,
    per_offset: &mut PerOffsetTallies,
    insertion_counts: &mut InsertionCounts,
) -> f64 {
    let reference = genome.snippet(pos, pos + read.len()).to_vec();

    let mut diffcount = 0.0f64;
    for i in 0..read.len().min(reference.len()) {
        if read[i] != reference[i] {
            diffcount += if quality[i] > qlimit { 1.0 } else { 0.5 };
        }
    }

    if diffcount < 5.0 {
        coverage.map_read(
            pos,
            ReadBackReference {
                read_offset_in_source,
                reversed,
                indel_offset: 0,
            },
        );
    } else {
        let offset = indel::detect_indel(&reference, read);
        if offset != 0 {
            coverage.map_read(
                pos,
                ReadBackReference {
                    read_offset_in_source,
                    reversed,
                    indel_offset: offset as i32,
                },
            );
            diffcount = 1.0;
            if offset > 0 {
                // Read has an insertion at this offset: erase it so the
                // columnar pass below realigns.
                let idx = offset as usize;
                if idx < read.len() {
                    read.remove(idx);
                    quality.remove(idx);
                }
                insertion_counts.increment(pos + idx);
            } else {
                // Read has a deletion at this offset: pad with a synthetic
                // placeholder base so lengths realign.
                let idx = (-offset) as usize;
                if idx <= read.len() {
                    read.insert(idx, b'X');
                    quality.insert(idx, 40);
                }
            }
        }
    }

    let len = read.len();
    for i in 0..len.min(reference.len()) {
        let read_offset = if reversed { len - 1 - i } else { i };
        if read[i] != reference[i] {
            if quality[i] > qlimit && diffcount < 5.0 {
                let tail = reversed != (i > len / 2);
                locus_stats.record(
                    pos + i,
                    LocusSample {
                        base: read[i],
                        quality: quality[i],
                        tail,
                    },
                );
            }
            if diffcount < 5.0 {
                quality_tally.record_incorrect(quality[i]);
                per_offset.wrong_mappings[read_offset] += 1;
            }
        } else {
            coverage.cover(pos + i, quality[i], qlimit);
            quality_tally.record_correct(quality[i]);
            per_offset.correct_mappings[read_offset] += 1;
        }
    }

    diffcount
}

/// Score threshold at or above which a locus is reported as significant
/// (spec.md §4.8).
pub const SIGNIFICANCE_THRESHOLD: u32 = 20;

pub fn is_significant(score: u32) -> bool {
    score >= SIGNIFICANCE_THRESHOLD
}

/// Variability score for one locus (spec.md §4.8): `0` when depth is
/// insufficient or the sample set is strand-biased, else
/// `100 * non_dominant / dominant` over observed base counts (reference
/// coverage counts toward the reference base).
pub fn variability_score(
    genome: &ReferenceGenome,
    pos: usize,
    reference_coverage: u32,
    samples: &[LocusSample],
) -> u32 {
    let mut counts = [0u32; 256];
    if let Some(&ref_base) = genome.snippet(pos, pos + 1).first() {
        counts[ref_base as usize] += reference_coverage;
    }

    let mut tail_count = 0usize;
    for sample in samples {
        counts[sample.base as usize] += 1;
        if sample.tail {
            tail_count += 1;
        }
    }

    let dom = *counts.iter().max().unwrap_or(&0);
    let non_dom = counts.iter().sum::<u32>() - dom;

    if dom + non_dom < 20 {
        return 0;
    }

    let tail_fraction = tail_count as f64 / samples.len() as f64;
    if !(0.05..=0.95).contains(&tail_fraction) {
        return 0;
    }

    if dom == 0 {
        return 0;
    }
    100 * non_dom / dom
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn genome(contents: &str) -> ReferenceGenome {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, ">r\n{}", contents).unwrap();
        ReferenceGenome::load(f.path()).unwrap()
    }

    #[test]
    fn test_dna_diff_perfect_match_covers_and_tallies() {
        let g = genome("ACGTACGTACGT");
        let mut coverage = CoverageMap::new(g.size());
        let mut locus_stats = LocusStats::new();
        let mut quality_tally = QualityTallyTable::new();
        let mut per_offset = PerOffsetTallies::new(4);
        let mut insertions = InsertionCounts::new();

        let mut read = b"ACGT".to_vec();
        let mut quality = vec![40u8; 4];
        let diffcount = dna_diff(
            &g,
            1,
            &mut read,
            &mut quality,
            false,
            30,
            0,
            &mut coverage,
            &mut locus_stats,
            &mut quality_tally,
            &mut per_offset,
            &mut insertions,
        );

        assert_eq!(diffcount, 0.0);
        for p in 1..=4 {
            assert_eq!(coverage.coverage_at(p), 1);
        }
        assert_eq!(quality_tally.get(40).correct, 4);
        assert_eq!(per_offset.correct_mappings, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_dna_diff_records_mismatch_sample() {
        let g = genome("ACGTACGTACGT");
        let mut coverage = CoverageMap::new(g.size());
        let mut locus_stats = LocusStats::new();
        let mut quality_tally = QualityTallyTable::new();
        let mut per_offset = PerOffsetTallies::new(4);
        let mut insertions = InsertionCounts::new();

        let mut read = b"AGGT".to_vec(); // mismatch at offset 1 (C->G)
        let mut quality = vec![40u8; 4];
        let diffcount = dna_diff(
            &g,
            1,
            &mut read,
            &mut quality,
            false,
            30,
            0,
            &mut coverage,
            &mut locus_stats,
            &mut quality_tally,
            &mut per_offset,
            &mut insertions,
        );

        assert_eq!(diffcount, 1.0);
        assert_eq!(locus_stats.samples_at(2).len(), 1);
        assert_eq!(locus_stats.samples_at(2)[0].base, b'G');
        assert_eq!(quality_tally.get(40).incorrect, 1);
        assert_eq!(quality_tally.get(40).correct, 3);
    }

    #[test]
    fn test_variability_score_strand_filter() {
        let g = genome("ACGTACGTACGT");
        let samples: Vec<LocusSample> = (0..30)
            .map(|_| LocusSample {
                base: b'G',
                quality: 40,
                tail: true,
            })
            .collect();
        // All samples tail-flagged -> tail_fraction = 1.0, filtered out.
        let score = variability_score(&g, 1, 5, &samples);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_variability_score_insufficient_depth() {
        let g = genome("ACGTACGTACGT");
        let samples = vec![LocusSample {
            base: b'G',
            quality: 40,
            tail: false,
        }];
        let score = variability_score(&g, 1, 1, &samples);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_variability_score_computed() {
        let g = genome("ACGTACGTACGT");
        let mut samples = Vec::new();
        for _ in 0..50 {
            samples.push(LocusSample {
                base: b'G',
                quality: 40,
                tail: false,
            });
        }
        for _ in 0..50 {
            samples.push(LocusSample {
                base: b'G',
                quality: 40,
                tail: true,
            });
        }
        // reference_coverage contributes to the dominant "A" bucket.
        let score = variability_score(&g, 1, 100, &samples);
        assert_eq!(score, 100 * 100 / 100);
        assert!(is_significant(score));
    }

    #[test]
    fn test_insertion_counts() {
        let mut counts = InsertionCounts::new();
        counts.increment(10);
        counts.increment(10);
        counts.increment(20);
        assert_eq!(counts.count_at(10), 2);
        assert_eq!(counts.count_at(20), 1);
        assert_eq!(counts.count_at(30), 0);
    }
}
