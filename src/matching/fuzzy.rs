//! The fuzzy matcher (C5): triplet-anchor sliding-window matching with
//! Hamming-then-diff scoring, for reads the exact matcher missed.

use rand::Rng;

use crate::dna::reverse_complement;
use crate::errors::AlignError;
use crate::matching::indel;
use crate::reference::index::KmerIndex;
use crate::reference::ReferenceGenome;

/// One candidate genomic position surviving triplet-anchor matching, with
/// its diff score and the read orientation that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub pos: usize,
    pub score: u32,
    pub reversed: bool,
}

/// Hamming distance over `ref[pos..pos+read.len()]` vs. `read`, counting
/// only positions where quality clears `qlimit`. At five or more
/// differences, falls back to the indel classifier; a nonzero indel
/// collapses the score to 1 (still a usable, indel-capable match).
fn diff_score(genome: &ReferenceGenome, pos: usize, read: &[u8], quality: &[u8], qlimit: u8) -> u32 {
    let reference = genome.snippet(pos, pos + read.len());
    let mut diffcount = 0u32;
    for i in 0..read.len().min(reference.len()) {
        if read[i] != reference[i] && quality[i] > qlimit {
            diffcount += 1;
        }
    }

    if diffcount >= 5 {
        let res = indel::detect_indel(reference, read);
        if res != 0 {
            return 1;
        }
    }

    diffcount
}

/// Scans a sorted, tagged merge of the L/M/R anchor hit lists for adjacent
/// `(L, M, R)` triplets whose pairwise gaps are each under `1.2 * interval`,
/// returning each triplet's implied genomic read-start (`L`'s position minus
/// `shift`, skipped if that would be negative).
fn find_triplets(together: &[(usize, u8)], interval: usize, shift: usize) -> Vec<usize> {
    let mut out = Vec::new();
    if together.len() < 3 {
        return out;
    }
    let tolerance = 1.2 * interval as f64;
    for w in together.windows(3) {
        let (lpos, ltag) = w[0];
        let (mpos, mtag) = w[1];
        let (rpos, rtag) = w[2];
        if ltag == b'L'
            && mtag == b'M'
            && rtag == b'R'
            && ((mpos - lpos) as f64) < tolerance
            && ((rpos - mpos) as f64) < tolerance
        {
            if lpos < shift {
                continue;
            }
            out.push(lpos - shift);
        }
    }
    out
}

fn reverse_complement_pair(read: &mut [u8], quality: &mut [u8]) {
    reverse_complement(read);
    quality.reverse();
}

/// Triplet-anchor fuzzy match of `read` against `genome`/`index` (the index
/// must already be built with the small fuzzy k-mer length). Mutates
/// `read`/`quality` in place as it tries orientations, leaving them
/// oriented to match the returned candidate's `reversed` flag (or restored
/// to the original orientation on a miss).
pub fn fuzzy_find(
    genome: &ReferenceGenome,
    index: &KmerIndex,
    read: &mut Vec<u8>,
    quality: &mut Vec<u8>,
    qlimit: u8,
    rng: &mut impl Rng,
) -> Result<Option<Candidate>, AlignError> {
    let k = index.k();
    let len = read.len();
    if len < 3 * k {
        return Ok(None);
    }
    let interval = (len - 3 * k) / 3;
    if interval == 0 {
        return Ok(None);
    }

    let mut all_matches: Vec<Candidate> = Vec::new();
    let mut current_reversed = false;

    let mut attempts = 0usize;
    'search: while attempts < interval {
        for try_idx in 0..2 {
            if try_idx == 1 {
                reverse_complement_pair(read, quality);
                current_reversed = !current_reversed;
            }

            let l_start = attempts;
            let m_start = interval + attempts;
            let r_start = 2 * interval + attempts;
            if r_start + k > len {
                continue;
            }

            let l_kmer = &read[l_start..l_start + k];
            let m_kmer = &read[m_start..m_start + k];
            let r_kmer = &read[r_start..r_start + k];

            let lpos = index.probe(genome, l_kmer)?;
            if lpos.is_empty() {
                continue;
            }
            let mpos = index.probe(genome, m_kmer)?;
            if mpos.is_empty() {
                continue;
            }
            let rpos = index.probe(genome, r_kmer)?;

            if lpos.len() + mpos.len() + rpos.len() < 3 {
                continue;
            }

            let mut together: Vec<(usize, u8)> = Vec::with_capacity(lpos.len() + mpos.len() + rpos.len());
            together.extend(lpos.into_iter().map(|p| (p, b'L')));
            together.extend(mpos.into_iter().map(|p| (p, b'M')));
            together.extend(rpos.into_iter().map(|p| (p, b'R')));
            together.sort_by_key(|&(p, _)| p);

            let mut found_zero = false;
            for pos in find_triplets(&together, interval, attempts) {
                if all_matches.iter().any(|c| c.pos == pos) {
                    continue;
                }
                let score = diff_score(genome, pos, read, quality, qlimit);
                all_matches.push(Candidate {
                    pos,
                    score,
                    reversed: current_reversed,
                });
                if score == 0 {
                    found_zero = true;
                    break;
                }
            }
            if found_zero {
                break 'search;
            }
        }
        attempts += 3;
    }

    if all_matches.is_empty() {
        if current_reversed {
            reverse_complement_pair(read, quality);
        }
        return Ok(None);
    }

    let min_score = all_matches.iter().map(|c| c.score).min().unwrap();
    let tied: Vec<Candidate> = all_matches.into_iter().filter(|c| c.score == min_score).collect();
    let picked = tied[rng.gen_range(0..tied.len())];

    if current_reversed != picked.reversed {
        reverse_complement_pair(read, quality);
    }

    Ok(Some(picked))
}
