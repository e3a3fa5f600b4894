//! Minimal FASTA reading: the first record only, per spec.md §6.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::AlignError;

/// Reads the first FASTA record from `path`: the header name (text after
/// `>`, truncated at the first whitespace) and the concatenated body lines
/// (without the leading sentinel `ReferenceGenome` adds).
pub fn read_first_record(path: &Path) -> Result<(String, Vec<u8>), AlignError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut header = String::new();
    let bytes_read = reader.read_line(&mut header)?;
    if bytes_read == 0 {
        return Err(AlignError::UnexpectedEof);
    }
    let header = header.trim_end();
    if !header.starts_with('>') {
        return Err(AlignError::BadFormat {
            detail: format!("{} does not begin with '>'", path.display()),
        });
    }
    let name = header[1..]
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string();

    let mut bases = Vec::new();
    for line in reader.lines() {
        let line = line?;
        // A second header line marks the start of another record; only the
        // first is consumed per spec.md §6.
        if line.starts_with('>') {
            break;
        }
        bases.extend(line.trim_end().bytes());
    }

    Ok((name, bases))
}
