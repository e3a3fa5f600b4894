//! Shared types for the exact and fuzzy matchers.

pub mod exact;
pub mod fuzzy;
pub mod indel;

/// The outcome of successfully mapping a read to the reference.
#[derive(Debug, Clone, Copy)]
pub struct Match {
    pub pos: usize,
    pub reversed: bool,
}
