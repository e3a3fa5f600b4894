//! Thin I/O collaborators (spec.md §1): FASTA/FASTQ/SAM format handling.
//! None of this is algorithmically interesting; it exists so the core
//! components have something real to read from and write to.

pub mod fasta;
pub mod fastq;
pub mod sam;
