//! Error kinds shared across the alignment pipeline.

use std::fmt;

/// The error kinds the pipeline can produce. Per-read anomalies (wrong
/// length, contains `N`, too frequent) are tallied by the run coordinator
/// instead of being represented here -- they are not failures.
#[derive(Debug)]
pub enum AlignError {
    /// The reference or annotations file did not match the expected format.
    BadFormat { detail: String },

    /// An I/O operation on a mandatory input or output failed.
    Io(std::io::Error),

    /// A record was truncated before it could be fully read.
    UnexpectedEof,

    /// A probe was attempted with a k-mer length that does not match the
    /// length the index was built with.
    IndexMismatch { expected: usize, got: usize },

    /// The gzip decompressor reached an invalid state.
    Decompression(String),

    /// A quality score fell outside the domain the error-probability table
    /// is defined over.
    OutOfRange { value: i64, lo: i64, hi: i64 },
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignError::BadFormat { detail } => write!(f, "bad format: {}", detail),
            AlignError::Io(e) => write!(f, "I/O error: {}", e),
            AlignError::UnexpectedEof => write!(f, "unexpected end of file"),
            AlignError::IndexMismatch { expected, got } => write!(
                f,
                "index was built for k={} but probed with k={}",
                expected, got
            ),
            AlignError::Decompression(msg) => write!(f, "decompression error: {}", msg),
            AlignError::OutOfRange { value, lo, hi } => write!(
                f,
                "value {} is out of range [{}, {}]",
                value, lo, hi
            ),
        }
    }
}

impl std::error::Error for AlignError {}

impl From<std::io::Error> for AlignError {
    fn from(e: std::io::Error) -> Self {
        AlignError::Io(e)
    }
}
