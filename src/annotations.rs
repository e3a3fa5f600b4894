//! The gene-annotation CSV reader: an out-of-scope thin collaborator per
//! spec.md §1, required so the run coordinator can populate `data.js`'s
//! `region[i].annotations` field.

use std::fs::File;
use std::path::Path;

use crate::errors::AlignError;

/// One annotated feature: `tag`/`name` plus a half-open-ish `[start, stop]`
/// span (matching the original's inclusive-looking but effectively
/// exclusive-at-the-boundary containment test in [`AnnotationReader::lookup`]).
#[derive(Debug, Clone)]
pub struct Annotation {
    pub tag: String,
    pub start_pos: u64,
    pub stop_pos: u64,
    pub name: String,
}

/// Gene annotations sorted by `start_pos`, supporting point lookups.
pub struct AnnotationReader {
    annotations: Vec<Annotation>,
}

impl AnnotationReader {
    /// Loads annotations from a comma/quote-delimited CSV: field 0 = tag,
    /// field 2 = start position, field 3 = stop position, field 5 = name.
    /// Lines beginning with `#` are comments.
    pub fn load(path: &Path) -> Result<Self, AlignError> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(file);

        let mut annotations = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| AlignError::BadFormat {
                detail: e.to_string(),
            })?;
            if record.len() < 6 {
                continue;
            }
            let tag = record.get(0).unwrap_or("").to_string();
            let start_pos = record.get(2).and_then(|s| s.parse().ok()).unwrap_or(0);
            let stop_pos = record.get(3).and_then(|s| s.parse().ok()).unwrap_or(0);
            let name = record.get(5).unwrap_or("").to_string();
            annotations.push(Annotation {
                tag,
                start_pos,
                stop_pos,
                name,
            });
        }
        annotations.sort_by_key(|a| a.start_pos);

        Ok(AnnotationReader { annotations })
    }

    /// Finds annotations whose span strictly contains `pos`. Mirrors
    /// `GeneAnnotationReader::lookup`'s lower-bound-then-walk-back-then-scan
    /// shape, including its "stop at the first non-overlapping element"
    /// forward scan.
    pub fn lookup(&self, pos: u64) -> Vec<&Annotation> {
        let start_idx = self.annotations.partition_point(|a| a.start_pos < pos);
        if start_idx == self.annotations.len() {
            return Vec::new();
        }

        let mut i = start_idx;
        while i > 0 && pos < self.annotations[i].stop_pos {
            i -= 1;
        }
        i += 1;

        let mut ret = Vec::new();
        for a in &self.annotations[i..] {
            if a.start_pos < pos && a.stop_pos > pos {
                ret.push(a);
            } else {
                break;
            }
        }
        ret
    }
}
