//! The exact matcher (C4): full-read lookup via a single k-mer probe,
//! forward then reverse-complement.

use rand::Rng;

use crate::coverage::CoverageMap;
use crate::dna::reverse_complement;
use crate::errors::AlignError;
use crate::matching::Match;
use crate::reference::index::KmerIndex;
use crate::reference::ReferenceGenome;

/// Attempts a full-length exact match of `read` against `index`/`genome`,
/// trying the read as given and then its reverse complement. On a hit,
/// covers the matched bases (using `quality`) and returns the chosen
/// position. Multiple equally-good hits are broken uniformly at random via
/// `rng`, so that repeat regions are spread across candidate positions
/// reproducibly for a given seed.
pub fn find_both(
    genome: &ReferenceGenome,
    index: &KmerIndex,
    coverage: &mut CoverageMap,
    read: &mut Vec<u8>,
    quality: &[u8],
    qlimit: u8,
    rng: &mut impl Rng,
) -> Result<Option<Match>, AlignError> {
    let mut reversed = false;

    for _ in 0..2 {
        let hits = index.probe(genome, read)?;
        if !hits.is_empty() {
            let pos = hits[rng.gen_range(0..hits.len())];
            for (i, &q) in quality.iter().enumerate() {
                coverage.cover(pos + i, q, qlimit);
            }
            return Ok(Some(Match { pos, reversed }));
        }
        reverse_complement(read);
        reversed = !reversed;
    }

    Ok(None)
}
