//! End-to-end scenarios driving the whole run coordinator, rather than its
//! individual collaborators. Each test builds a small reference/FASTQ pair on
//! disk and asserts on the resulting `data.js`/SAM output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use ngs_align::config::RunConfig;
use ngs_align::dna::{fnv1a32, reverse_complement};
use ngs_align::log::LogBuffer;
use ngs_align::pipeline::RunCoordinator;

/// A long, low-repeat sequence so that fixed-length reads sliced out of it
/// map back to a single, unambiguous position.
fn synthetic_genome(len: usize) -> Vec<u8> {
    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
    (0..len)
        .map(|i| BASES[(fnv1a32(&(i as u64).to_le_bytes()) % 4) as usize])
        .collect()
}

fn write_fasta(dir: &Path, name: &str, genome: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    writeln!(f, ">chr1").unwrap();
    f.write_all(genome).unwrap();
    writeln!(f).unwrap();
    path
}

fn write_fastq(dir: &Path, name: &str, records: &[(String, Vec<u8>)]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    for (read_name, seq) in records {
        let quality = "I".repeat(seq.len());
        writeln!(f, "@{}", read_name).unwrap();
        f.write_all(seq).unwrap();
        writeln!(f).unwrap();
        writeln!(f, "+").unwrap();
        writeln!(f, "{}", quality).unwrap();
    }
    path
}

fn base_config(dir: &Path, reference: std::path::PathBuf, fastq: std::path::PathBuf) -> RunConfig {
    RunConfig {
        reference,
        fastq,
        annotations: None,
        exclude: None,
        sam_file: None,
        quality_offset: 33,
        begin_snip: 0,
        end_snip: 0,
        qlimit: 30,
        duplimit: 0,
        unmatched_dump: false,
        output_dir: dir.to_path_buf(),
        seed: 7,
    }
}

fn run(config: RunConfig) {
    RunCoordinator::new(config).run(LogBuffer::new()).unwrap();
}

/// S1: perfect reads tiling the start of the genome exact-match cleanly and
/// raise no variable-locus or insertion regions.
#[test]
fn s1_perfect_reads_produce_no_regions() {
    let dir = tempfile::tempdir().unwrap();
    let genome = synthetic_genome(600);
    let reference = write_fasta(dir.path(), "ref.fasta", &genome);

    let records: Vec<(String, Vec<u8>)> = (1..=20)
        .map(|start: usize| {
            let seq = genome[start - 1..start - 1 + 50].to_vec();
            (format!("read{}", start), seq)
        })
        .collect();
    let fastq = write_fastq(dir.path(), "reads.fastq", &records);

    run(base_config(dir.path(), reference, fastq));

    let data_js = std::fs::read_to_string(dir.path().join("data.js")).unwrap();
    assert!(!data_js.contains("\"name\":\"Variable\""));
    assert!(!data_js.contains("\"name\":\"Insert\""));
}

/// S2: a mix of perfect and single-mismatch reads sharing one genomic locus
/// raises exactly one `Variable` region there.
#[test]
fn s2_shared_mismatch_locus_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let genome = synthetic_genome(700);
    let reference = write_fasta(dir.path(), "ref.fasta", &genome);

    let variant_pos = 300usize; // 1-based
    let alt_base = |original: u8| -> u8 {
        for candidate in [b'A', b'C', b'G', b'T'] {
            if candidate != original {
                return candidate;
            }
        }
        unreachable!()
    };

    let mut records: Vec<(String, Vec<u8>)> = Vec::new();
    for (i, start) in (271..=290usize).enumerate() {
        let seq = genome[start - 1..start - 1 + 50].to_vec();
        records.push((format!("perfect{}", i), seq));
    }
    for (i, start) in (271..=290usize).enumerate() {
        let mut seq = genome[start - 1..start - 1 + 50].to_vec();
        let offset = variant_pos - start; // 0-based index into the read
        seq[offset] = alt_base(seq[offset]);
        records.push((format!("mismatch{}", i), seq));
    }
    let fastq = write_fastq(dir.path(), "reads.fastq", &records);

    run(base_config(dir.path(), reference, fastq));

    let data_js = std::fs::read_to_string(dir.path().join("data.js")).unwrap();
    assert!(data_js.contains("\"name\":\"Variable\""));
}

/// S3: a single-base insertion is recovered by the fuzzy pass and recorded
/// as an `I` operation in the SAM CIGAR.
#[test]
fn s3_single_base_insertion_recovers_cigar_with_insert_op() {
    let dir = tempfile::tempdir().unwrap();
    let genome = synthetic_genome(200);
    let reference = write_fasta(dir.path(), "ref.fasta", &genome);

    let start = 50usize; // 1-based
    let window = genome[start - 1..start - 1 + 50].to_vec();
    let foreign_base = alt_base_for(window[10]);
    let mut read = Vec::with_capacity(50);
    read.extend_from_slice(&window[0..10]);
    read.push(foreign_base);
    read.extend_from_slice(&window[10..49]);
    assert_eq!(read.len(), 50);

    let fastq = write_fastq(dir.path(), "reads.fastq", &[("ins1".to_string(), read)]);
    let sam_path = dir.path().join("out.sam");

    let mut config = base_config(dir.path(), reference, fastq);
    config.sam_file = Some(sam_path.clone());
    run(config);

    let sam = std::fs::read_to_string(&sam_path).unwrap();
    let record = sam.lines().last().unwrap();
    let fields: Vec<&str> = record.split('\t').collect();
    assert!(fields[5].contains('I'), "expected an insertion op in {}", fields[5]);
}

/// S4: a read identical to the reverse complement of a genomic window is
/// still found, with the SAM reverse-strand flag set.
#[test]
fn s4_reverse_complement_read_sets_reverse_flag() {
    let dir = tempfile::tempdir().unwrap();
    let genome = synthetic_genome(200);
    let reference = write_fasta(dir.path(), "ref.fasta", &genome);

    let mut read = genome[0..50].to_vec();
    reverse_complement(&mut read);

    let fastq = write_fastq(dir.path(), "reads.fastq", &[("rc1".to_string(), read)]);
    let sam_path = dir.path().join("out.sam");

    let mut config = base_config(dir.path(), reference, fastq);
    config.sam_file = Some(sam_path.clone());
    run(config);

    let sam = std::fs::read_to_string(&sam_path).unwrap();
    let record = sam.lines().last().unwrap();
    let fields: Vec<&str> = record.split('\t').collect();
    assert_eq!(fields[1], "16");
}

/// S5: a lone mismatched read doesn't accumulate enough depth at its locus
/// to be reported as a variable region.
#[test]
fn s5_single_read_mismatch_is_below_significance_depth() {
    let dir = tempfile::tempdir().unwrap();
    let genome = synthetic_genome(600);
    let reference = write_fasta(dir.path(), "ref.fasta", &genome);

    let start = 476usize;
    let mut read = genome[start - 1..start - 1 + 50].to_vec();
    let offset = 24; // roughly the middle of the read
    read[offset] = alt_base_for(read[offset]);

    let fastq = write_fastq(dir.path(), "reads.fastq", &[("mid1".to_string(), read)]);

    run(base_config(dir.path(), reference, fastq));

    let data_js = std::fs::read_to_string(dir.path().join("data.js")).unwrap();
    assert!(!data_js.contains("\"name\":\"Variable\""));
}

/// S6: with `duplimit = 4`, only the first four copies of a repeated read
/// reach the matcher; the rest are rejected as over-frequency before ever
/// being written out.
#[test]
fn s6_duplicate_filter_caps_processed_copies() {
    let dir = tempfile::tempdir().unwrap();
    let genome = synthetic_genome(200);
    let reference = write_fasta(dir.path(), "ref.fasta", &genome);

    let read = genome[0..50].to_vec();
    let records: Vec<(String, Vec<u8>)> = (0..10)
        .map(|i| (format!("dup{}", i), read.clone()))
        .collect();
    let fastq = write_fastq(dir.path(), "reads.fastq", &records);
    let sam_path = dir.path().join("out.sam");

    let mut config = base_config(dir.path(), reference, fastq);
    config.sam_file = Some(sam_path.clone());
    config.duplimit = 4;
    run(config);

    let sam = std::fs::read_to_string(&sam_path).unwrap();
    let record_count = sam.lines().filter(|l| !l.starts_with('@')).count();
    assert_eq!(record_count, 4);
}

fn alt_base_for(original: u8) -> u8 {
    for candidate in [b'A', b'C', b'G', b'T'] {
        if candidate != original {
            return candidate;
        }
    }
    unreachable!()
}
