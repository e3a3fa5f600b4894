//! The k-mer index (C2): a sorted array of `(hash, pos)` pairs supporting
//! equal-range probing.

use crate::dna::fnv1a32;
use crate::errors::AlignError;
use crate::reference::ReferenceGenome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HashPos {
    hash: u32,
    pos: u32,
}

/// Sorted `(hash, pos)` index over a reference, built for a fixed k-mer
/// length. Rebuilding for a new `k` replaces the index in place.
pub struct KmerIndex {
    k: usize,
    entries: Vec<HashPos>,
    /// Ratio of distinct hashes to index size, reported by the last build.
    pub fill_ratio: f64,
}

impl KmerIndex {
    /// Builds an index over every `k`-length window of `genome`.
    pub fn build(genome: &ReferenceGenome, k: usize) -> Self {
        let len = genome.size();
        let mut entries = Vec::with_capacity(len.saturating_sub(k));

        if k > 0 && len > k {
            for pos in 0..(len - k) {
                // Reference positions are 1-based; window starts at pos+1.
                let start = pos + 1;
                let window = genome.snippet(start, start + k);
                entries.push(HashPos {
                    hash: fnv1a32(window),
                    pos: start as u32,
                });
            }
        }

        entries.sort_by_key(|e| e.hash);

        let distinct = entries
            .iter()
            .zip(entries.iter().skip(1))
            .filter(|(a, b)| a.hash != b.hash)
            .count()
            + usize::from(!entries.is_empty());

        let fill_ratio = if distinct == 0 {
            0.0
        } else {
            entries.len() as f64 / distinct as f64
        };

        KmerIndex {
            k,
            entries,
            fill_ratio,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns every genome position whose `k`-byte window matches `kmer`
    /// byte-for-byte. `kmer.len()` must equal the index's `k`.
    pub fn probe(&self, genome: &ReferenceGenome, kmer: &[u8]) -> Result<Vec<usize>, AlignError> {
        if kmer.len() != self.k {
            return Err(AlignError::IndexMismatch {
                expected: self.k,
                got: kmer.len(),
            });
        }

        let target = fnv1a32(kmer);
        let start = self.entries.partition_point(|e| e.hash < target);
        let end = self.entries.partition_point(|e| e.hash <= target);

        let mut out = Vec::new();
        for entry in &self.entries[start..end] {
            let pos = entry.pos as usize;
            if genome.snippet(pos, pos + self.k) == kmer {
                out.push(pos);
            }
        }
        Ok(out)
    }
}
