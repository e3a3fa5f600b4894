//! FASTQ reading with gzip auto-detection, per spec.md §6. A thin
//! collaborator: four-line record framing, quality-offset subtraction, and
//! begin/end trimming, nothing algorithmic.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::errors::AlignError;

/// One parsed FASTQ record: nucleotides and quality scores already trimmed
/// by `begin_snip`/`end_snip` and with the quality offset subtracted.
#[derive(Debug, Clone)]
pub struct FastqRecord {
    pub name: String,
    pub nucleotides: Vec<u8>,
    pub quality: Vec<u8>,
}

/// Two-variant dynamic dispatch on the `.gz` suffix, matching
/// `zstuff.cc`'s `LineReader::make`. The gzip variant seeks by replaying
/// from the start of the (re-decompressed) stream rather than the
/// original's periodic-checkpoint scheme (see DESIGN.md's Open Questions).
enum Source {
    Plain(BufReader<File>),
    Gzipped(BufReader<GzDecoder<File>>),
}

pub struct FastqSource {
    path: std::path::PathBuf,
    source: Source,
    /// Byte offset into the *uncompressed* record stream of the next read
    /// to be returned by [`FastqSource::next_record`].
    offset: u64,
    quality_offset: u8,
    begin_snip: usize,
    end_snip: usize,
}

impl FastqSource {
    pub fn open(
        path: &Path,
        quality_offset: u8,
        begin_snip: usize,
        end_snip: usize,
    ) -> Result<Self, AlignError> {
        let source = Self::open_source(path)?;
        Ok(FastqSource {
            path: path.to_path_buf(),
            source,
            offset: 0,
            quality_offset,
            begin_snip,
            end_snip,
        })
    }

    fn open_source(path: &Path) -> Result<Source, AlignError> {
        let file = File::open(path)?;
        if path.extension().map(|e| e == "gz").unwrap_or(false) {
            Ok(Source::Gzipped(BufReader::new(GzDecoder::new(file))))
        } else {
            Ok(Source::Plain(BufReader::new(file)))
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, AlignError> {
        let mut line = String::new();
        let n = match &mut self.source {
            Source::Plain(r) => r.read_line(&mut line)?,
            Source::Gzipped(r) => r.read_line(&mut line)?,
        };
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end().to_string()))
    }

    /// Returns the byte offset (in uncompressed-record-count terms) of the
    /// next record, suitable for passing to [`FastqSource::seek_to`] later.
    pub fn current_offset(&self) -> u64 {
        self.offset
    }

    /// Re-positions to the `n`th record (0-based), counting from the start
    /// of the stream. Plain files could do this faster with a byte seek,
    /// but uncompressed-record counting keeps both variants uniform.
    pub fn seek_to(&mut self, record_index: u64) -> Result<(), AlignError> {
        self.source = Self::open_source(&self.path)?;
        self.offset = 0;
        while self.offset < record_index {
            if self.next_record()?.is_none() {
                return Err(AlignError::UnexpectedEof);
            }
        }
        Ok(())
    }

    /// Reads the next 4-line FASTQ record, applying quality-offset
    /// subtraction and begin/end trimming. Returns `None` at end of stream.
    pub fn next_record(&mut self) -> Result<Option<FastqRecord>, AlignError> {
        let header = match self.read_line()? {
            Some(h) => h,
            None => return Ok(None),
        };
        if !header.starts_with('@') {
            return Err(AlignError::BadFormat {
                detail: format!("expected FASTQ header, got {:?}", header),
            });
        }
        let seq_line = self.read_line()?.ok_or(AlignError::UnexpectedEof)?;
        let plus_line = self.read_line()?.ok_or(AlignError::UnexpectedEof)?;
        if !plus_line.starts_with('+') {
            return Err(AlignError::BadFormat {
                detail: "expected '+' separator line".to_string(),
            });
        }
        let qual_line = self.read_line()?.ok_or(AlignError::UnexpectedEof)?;

        let mut nucleotides = seq_line.into_bytes();
        let mut quality: Vec<u8> = qual_line
            .bytes()
            .map(|b| b.saturating_sub(self.quality_offset))
            .collect();

        let len = nucleotides.len();
        let end = len.saturating_sub(self.end_snip);
        let begin = self.begin_snip.min(end);
        if begin > 0 || end < len {
            nucleotides = nucleotides[begin..end].to_vec();
            quality = quality[begin..end.min(quality.len())].to_vec();
        }

        self.offset += 1;

        Ok(Some(FastqRecord {
            name: header[1..].to_string(),
            nucleotides,
            quality,
        }))
    }
}

/// Materializes a single record by record index, for the coverage map's
/// back-reference replay (Design Notes §9, "Back-reference cycle"). Always
/// reopens a fresh handle so it never disturbs the caller's own iteration
/// position.
pub fn read_record_at(
    path: &Path,
    record_index: u64,
    quality_offset: u8,
    begin_snip: usize,
    end_snip: usize,
) -> Result<FastqRecord, AlignError> {
    let mut source = FastqSource::open(path, quality_offset, begin_snip, end_snip)?;
    source.seek_to(record_index)?;
    source.next_record()?.ok_or(AlignError::UnexpectedEof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fastq(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_reads_records_and_subtracts_quality_offset() {
        let f = write_fastq("@r1\nACGT\n+\nIIII\n");
        let mut source = FastqSource::open(f.path(), 33, 0, 0).unwrap();
        let record = source.next_record().unwrap().unwrap();
        assert_eq!(record.nucleotides, b"ACGT");
        // 'I' is ASCII 73; 73 - 33 = 40.
        assert_eq!(record.quality, vec![40, 40, 40, 40]);
    }

    #[test]
    fn test_begin_end_snip_trims_both_strands() {
        let f = write_fastq("@r1\nACGTACGT\n+\nIIIIIIII\n");
        let mut source = FastqSource::open(f.path(), 33, 1, 1).unwrap();
        let record = source.next_record().unwrap().unwrap();
        assert_eq!(record.nucleotides, b"CGTACG");
        assert_eq!(record.quality.len(), 6);
    }

    #[test]
    fn test_seek_to_replays_from_start() {
        let f = write_fastq("@r1\nAAAA\n+\nIIII\n@r2\nCCCC\n+\nIIII\n@r3\nGGGG\n+\nIIII\n");
        let mut source = FastqSource::open(f.path(), 33, 0, 0).unwrap();
        source.seek_to(2).unwrap();
        let record = source.next_record().unwrap().unwrap();
        assert_eq!(record.nucleotides, b"GGGG");
    }

    #[test]
    fn test_eof_returns_none() {
        let f = write_fastq("@r1\nAAAA\n+\nIIII\n");
        let mut source = FastqSource::open(f.path(), 33, 0, 0).unwrap();
        source.next_record().unwrap();
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_rejects_malformed_header() {
        let f = write_fastq("NOT_A_HEADER\nAAAA\n+\nIIII\n");
        let mut source = FastqSource::open(f.path(), 33, 0, 0).unwrap();
        assert!(source.next_record().is_err());
    }
}
