//! The small-indel detector (C6): shortest-edit-script diff over a read vs.
//! a reference snippet, classifying a single insertion or deletion.
//!
//! The edit-script algorithm is the classic Myers `O((N+M)*D)`
//! forward-diagonal diff (Myers, "An O(ND) Difference Algorithm and Its
//! Variations", 1986). Only the classifier below is load-bearing per spec;
//! the diff itself is a standard textbook implementation.

/// One run of a compressed edit script. `Delete` removes a run from the
/// reference (`a`); `Insert` adds a run from the read (`b`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Match { len: usize },
    Delete { offset: usize, len: usize },
    Insert { offset: usize, len: usize },
}

/// Computes the shortest edit script turning `a` into `b`.
pub fn shortest_edit_script(a: &[u8], b: &[u8]) -> Vec<EditOp> {
    let n = a.len() as i64;
    let m = b.len() as i64;
    let max = n + m;
    if max == 0 {
        return Vec::new();
    }

    let offset = max as usize;
    let width = 2 * max as usize + 1;
    let mut v = vec![0i64; width];
    let mut trace: Vec<Vec<i64>> = Vec::new();
    let mut found_d = None;

    'outer: for d in 0..=max {
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let idx = (k + offset as i64) as usize;
            let go_down = k == -d || (k != d && v[idx - 1] < v[idx + 1]);
            let mut x = if go_down { v[idx + 1] } else { v[idx - 1] + 1 };
            let mut y = x - k;

            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;

            if x >= n && y >= m {
                found_d = Some(d);
                break 'outer;
            }
            k += 2;
        }
    }

    let d_max = match found_d {
        Some(d) => d,
        None => return Vec::new(),
    };

    let mut moves: Vec<(i64, i64, i64, i64)> = Vec::new();
    let mut x = n;
    let mut y = m;

    for d in (0..=d_max).rev() {
        let vv = &trace[d as usize];
        let k = x - y;
        let idx = (k + offset as i64) as usize;
        let go_down = k == -d || (k != d && vv[idx - 1] < vv[idx + 1]);
        let prev_k = if go_down { k + 1 } else { k - 1 };
        let prev_idx = (prev_k + offset as i64) as usize;
        let prev_x = vv[prev_idx];
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            moves.push((x - 1, y - 1, x, y));
            x -= 1;
            y -= 1;
        }
        if d > 0 {
            moves.push((prev_x, prev_y, x, y));
        }
        x = prev_x;
        y = prev_y;
    }
    moves.reverse();

    let mut ops: Vec<EditOp> = Vec::new();
    for (px, py, cx, cy) in moves {
        if cx - px == 1 && cy - py == 1 {
            match ops.last_mut() {
                Some(EditOp::Match { len }) => *len += 1,
                _ => ops.push(EditOp::Match { len: 1 }),
            }
        } else if cx - px == 1 && cy == py {
            let off = px as usize;
            match ops.last_mut() {
                Some(EditOp::Delete { offset, len }) if *offset + *len == off => *len += 1,
                _ => ops.push(EditOp::Delete { offset: off, len: 1 }),
            }
        } else if cy - py == 1 && cx == px {
            let off = py as usize;
            match ops.last_mut() {
                Some(EditOp::Insert { offset, len }) if *offset + *len == off => *len += 1,
                _ => ops.push(EditOp::Insert { offset: off, len: 1 }),
            }
        }
    }
    ops
}

/// Classifies a compressed edit script per spec: a script of exactly four
/// ops matching `Match, Delete(1), Match, Insert(1)` is a 1-base deletion
/// in the read (returns the negative offset); `Match, Insert(1), Match,
/// Delete(1)` is a 1-base insertion (returns the positive offset). Scripts
/// with more than six ops are rejected as too noisy. Everything else
/// (including the deliberately-conservative 5-6 op range) returns 0.
pub fn classify_indel(ops: &[EditOp]) -> i64 {
    if ops.len() == 4 {
        if let (EditOp::Match { .. }, EditOp::Match { .. }) = (&ops[0], &ops[2]) {
            match (&ops[1], &ops[3]) {
                (EditOp::Delete { offset, len: 1 }, EditOp::Insert { len: 1, .. }) => {
                    return -(*offset as i64);
                }
                (EditOp::Insert { offset, len: 1 }, EditOp::Delete { len: 1, .. }) => {
                    return *offset as i64;
                }
                _ => {}
            }
        }
    }
    0
}

/// Runs the diff and classifier together, as the fuzzy matcher and
/// recalibration accumulator call it.
pub fn detect_indel(reference: &[u8], read: &[u8]) -> i64 {
    let ops = shortest_edit_script(reference, read);
    classify_indel(&ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_sequences_yield_single_match() {
        let ops = shortest_edit_script(b"ACGTACGT", b"ACGTACGT");
        assert_eq!(ops, vec![EditOp::Match { len: 8 }]);
    }

    #[test]
    fn test_detects_single_deletion() {
        // Read is missing the 'C' at offset 4 relative to a same-length
        // reference window (it reads one base further to compensate).
        let reference = b"AAAACGGGG";
        let read = b"AAAAGGGGT";
        let ops = shortest_edit_script(reference, read);
        let result = classify_indel(&ops);
        assert_eq!(result, -4);
    }

    #[test]
    fn test_detects_single_insertion() {
        // Read has an extra 'X' at offset 4 not present in the reference
        // window, and is missing the reference's final base as a result.
        let reference = b"AAAAGGGGT";
        let read = b"AAAAXGGGG";
        let ops = shortest_edit_script(reference, read);
        let result = classify_indel(&ops);
        assert_eq!(result, 4);
    }

    #[test]
    fn test_two_or_more_changes_return_zero() {
        let reference = b"AAAACCCCAAAA";
        let read = b"AAAATTTTAAAA";
        let ops = shortest_edit_script(reference, read);
        assert_eq!(classify_indel(&ops), 0);
    }

    #[test]
    fn test_classifier_symmetry_roundtrip() {
        for offset in [1usize, 3, 6] {
            let mut reference = b"AAAAAAAAAAAAAA".to_vec();
            let mut read = reference.clone();
            read.remove(offset);
            read.push(b'T');
            let result = detect_indel(&reference, &read);
            assert_eq!(result, -(offset as i64), "deletion at offset {}", offset);

            reference = b"AAAAAAAAAAAAAA".to_vec();
            let mut read2 = reference.clone();
            read2.insert(offset, b'X');
            read2.pop();
            let result2 = detect_indel(&reference, &read2);
            assert_eq!(result2, offset as i64, "insertion at offset {}", offset);
        }
    }

    #[test]
    fn test_empty_sequences() {
        let ops = shortest_edit_script(b"", b"");
        assert!(ops.is_empty());
        assert_eq!(classify_indel(&ops), 0);
    }
}
