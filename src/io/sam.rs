//! A minimal SAM writer (C9's `--sam-file` output), matching the
//! `SAMWriter::write(pos, fqfrag[, indel])` call shape used around
//! `DNADiff`/`fuzzyFind`. Only what a single-contig ungapped/one-indel
//! aligner needs: a header, one `@SQ` line, and one record per mapped read.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::AlignError;

const FLAG_REVERSE: u16 = 0x10;

pub struct SamWriter {
    writer: BufWriter<File>,
}

impl SamWriter {
    /// Opens `path` for writing and emits the `@HD`/`@SQ` header lines.
    pub fn create(path: &Path, reference_name: &str, reference_len: usize) -> Result<Self, AlignError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "@HD\tVN:1.6\tSO:unsorted")?;
        writeln!(writer, "@SQ\tSN:{}\tLN:{}", reference_name, reference_len)?;
        Ok(SamWriter { writer })
    }

    /// Writes one mapped read. `pos` is 1-based, matching the reference's
    /// own 1-based sentinel convention. `indel_offset` is the signed offset
    /// from [`crate::matching::indel::detect_indel`]: 0 for an ungapped hit,
    /// negative for a reference-relative deletion in the read, positive for
    /// an insertion.
    pub fn write_record(
        &mut self,
        read_name: &str,
        pos: usize,
        reversed: bool,
        sequence: &[u8],
        quality: &[u8],
        indel_offset: i64,
    ) -> Result<(), AlignError> {
        let flag = if reversed { FLAG_REVERSE } else { 0 };
        let cigar = build_cigar(sequence.len(), indel_offset);
        let seq = String::from_utf8_lossy(sequence);
        let qual: String = quality.iter().map(|&q| (q + 33) as char).collect();

        writeln!(
            self.writer,
            "{}\t{}\t*\t{}\t255\t{}\t*\t0\t0\t{}\t{}",
            read_name, flag, pos, cigar, seq, qual
        )?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), AlignError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Builds a minimal CIGAR string for a read with at most one single-base
/// indel, per the small-indel detector's scope (spec.md §4.6): `N=` for a
/// clean hit, `a=1Db=` for a one-base deletion at offset `a`, `a=1Ib=` for a
/// one-base insertion at offset `a`.
fn build_cigar(read_len: usize, indel_offset: i64) -> String {
    if indel_offset == 0 {
        return format!("{}=", read_len);
    }
    let offset = indel_offset.unsigned_abs() as usize;
    let before = offset.min(read_len);
    let after = read_len.saturating_sub(before);
    let op = if indel_offset < 0 { 'D' } else { 'I' };
    if after == 0 {
        format!("{}=1{}", before, op)
    } else {
        format!("{}=1{}{}=", before, op, after)
    }
}
