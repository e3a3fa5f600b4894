//! The coverage map (C3): per-reference-position coverage counter,
//! mismatch-sample collector, and insertion counter.

use crate::cluster::{Clusterer, Positioned};

/// One read's contribution to a genomic locus: where the read came from in
/// the FASTQ source, whether it was reverse-complemented to map, and the
/// indel offset (`0` = none, `+n` = insertion after the read's nth base,
/// `-n` = deletion at the read's nth base).
#[derive(Debug, Clone, Copy)]
pub struct ReadBackReference {
    pub read_offset_in_source: u64,
    pub reversed: bool,
    pub indel_offset: i32,
}

#[derive(Default)]
struct LocusEntry {
    coverage: u32,
    /// Newest-first, matching the original's `push_front` prepend semantics
    /// (spec.md §5, "Ordering").
    back_references: Vec<ReadBackReference>,
}

/// A contiguous run of undercovered reference positions `[start, end)`,
/// flanked on both sides by at least 40 covered bases. `left`/`unmatched`/
/// `right` text is materialized later by [`Unmatched::resolve`] once a
/// reference is available -- the coverage map itself doesn't own one.
pub struct UndercoveredRange {
    pub start: usize,
    pub end: usize,
}

impl Positioned for UndercoveredRange {
    fn position(&self) -> usize {
        self.start
    }
}

/// A fully-materialized undercovered-region report record, matching
/// spec.md §4.3's `Unmatched` shape.
pub struct Unmatched {
    pub left: Vec<u8>,
    pub unmatched: Vec<u8>,
    pub right: Vec<u8>,
    pub pos: usize,
}

impl UndercoveredRange {
    /// Builds an [`Unmatched`] record by slicing `snippet` flanks around
    /// this range.
    pub fn resolve(&self, snippet: impl Fn(usize, usize) -> Vec<u8>) -> Unmatched {
        Unmatched {
            left: snippet(self.start.saturating_sub(40), self.start),
            unmatched: snippet(self.start, self.end),
            right: snippet(self.end, self.end + 40),
            pos: self.start,
        }
    }
}

/// Coverage histogram, total depth, and undercovered-region report produced
/// by [`CoverageMap::summarize`].
pub struct CoverageSummary {
    pub histogram: Vec<u64>,
    pub total_depth: u64,
    pub undercovered_positions: u64,
    pub undercovered_regions: Vec<UndercoveredRange>,
}

/// Per-locus coverage and back-reference accumulator, indexed by 1-based
/// reference position (index 0 is the unused sentinel position).
pub struct CoverageMap {
    entries: Vec<LocusEntry>,
}

impl CoverageMap {
    /// Creates a map sized for a reference of `ref_len` bases (plus the
    /// sentinel at position 0).
    pub fn new(ref_len: usize) -> Self {
        let mut entries = Vec::with_capacity(ref_len + 1);
        entries.resize_with(ref_len + 1, LocusEntry::default);
        CoverageMap { entries }
    }

    /// Increments the coverage counter at `pos` iff `quality > qlimit`.
    pub fn cover(&mut self, pos: usize, quality: u8, qlimit: u8) {
        if quality > qlimit {
            if let Some(entry) = self.entries.get_mut(pos) {
                entry.coverage += 1;
            }
        }
    }

    pub fn coverage_at(&self, pos: usize) -> u32 {
        self.entries.get(pos).map(|e| e.coverage).unwrap_or(0)
    }

    /// Prepends a back-reference to the list at `pos` (newest-first).
    pub fn map_read(&mut self, pos: usize, back_reference: ReadBackReference) {
        if let Some(entry) = self.entries.get_mut(pos) {
            entry.back_references.insert(0, back_reference);
        }
    }

    pub fn back_references_at(&self, pos: usize) -> &[ReadBackReference] {
        self.entries
            .get(pos)
            .map(|e| e.back_references.as_slice())
            .unwrap_or(&[])
    }

    /// Scans the full map, building a coverage histogram (truncated of
    /// trailing empty bins), total depth, the count of undercovered
    /// positions (coverage < 2), and the list of undercovered regions
    /// flanked by at least 40 covered bases on both sides.
    pub fn summarize(&self) -> CoverageSummary {
        if self.entries.len() <= 1 {
            return CoverageSummary {
                histogram: Vec::new(),
                total_depth: 0,
                undercovered_positions: 0,
                undercovered_regions: Vec::new(),
            };
        }

        let mut histogram = vec![0u64; 1];
        let mut total_depth = 0u64;
        let mut undercovered_positions = 0u64;

        let mut regions = Vec::new();
        let mut was_undercovered = true;
        let mut region_start = 0usize;

        for (pos, entry) in self.entries.iter().enumerate().skip(1) {
            let cov = entry.coverage as usize;
            if cov >= histogram.len() {
                histogram.resize(cov + 1, 0);
            }
            histogram[cov] += 1;
            total_depth += entry.coverage as u64;

            let undercovered = entry.coverage < 2;
            if undercovered {
                undercovered_positions += 1;
            }

            if !undercovered && was_undercovered {
                if region_start > 40 && pos + 40 < self.entries.len() {
                    regions.push(UndercoveredRange {
                        start: region_start,
                        end: pos,
                    });
                }
                was_undercovered = false;
            } else if undercovered && !was_undercovered {
                was_undercovered = true;
                region_start = pos;
            }
        }

        // Truncate trailing all-zero bins.
        while histogram.len() > 1 && *histogram.last().unwrap() == 0 {
            histogram.pop();
        }

        CoverageSummary {
            histogram,
            total_depth,
            undercovered_positions,
            undercovered_regions: regions,
        }
    }

    /// Clusters undercovered regions within `gap` positions of one another.
    pub fn cluster_undercovered(
        regions: Vec<UndercoveredRange>,
        gap: usize,
    ) -> Vec<Cluster<UndercoveredRange>> {
        let mut clusterer = Clusterer::new(gap);
        for region in regions {
            clusterer.feed(region);
        }
        clusterer.clusters
    }
}

pub use crate::cluster::Cluster;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_respects_qlimit() {
        let mut cm = CoverageMap::new(10);
        cm.cover(5, 40, 30);
        cm.cover(5, 20, 30);
        assert_eq!(cm.coverage_at(5), 1);
    }

    #[test]
    fn test_map_read_prepends() {
        let mut cm = CoverageMap::new(10);
        cm.map_read(
            3,
            ReadBackReference {
                read_offset_in_source: 1,
                reversed: false,
                indel_offset: 0,
            },
        );
        cm.map_read(
            3,
            ReadBackReference {
                read_offset_in_source: 2,
                reversed: false,
                indel_offset: 0,
            },
        );
        let refs = cm.back_references_at(3);
        assert_eq!(refs[0].read_offset_in_source, 2);
        assert_eq!(refs[1].read_offset_in_source, 1);
    }

    #[test]
    fn test_summarize_counts_undercovered() {
        let mut cm = CoverageMap::new(5);
        cm.cover(1, 40, 30);
        let summary = cm.summarize();
        // positions 2..5 are undercovered (0 coverage), position 1 has 1 (still <2).
        assert_eq!(summary.undercovered_positions, 5);
        assert_eq!(summary.total_depth, 1);
    }

    #[test]
    fn test_summarize_empty_genome() {
        let cm = CoverageMap::new(0);
        let summary = cm.summarize();
        assert!(summary.histogram.is_empty());
    }
}
