//! Row diff for whole-document rewrites.

use similar::{Algorithm, DiffOp, capture_diff_slices};

use super::change::LineDiffOp;

/// Diff two row arrays into keep/insert/delete opcodes.
///
/// Rows are aligned with Myers' algorithm, which runs in linear space, so
/// a rewrite touching both ends of a long document stays cheap.
pub fn diff_lines(old: &[String], new: &[String]) -> Vec<LineDiffOp> {
    let mut ops = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, old, new) {
        match op {
            DiffOp::Equal { len, .. } => push_keep(&mut ops, len),
            DiffOp::Delete {
                old_index, old_len, ..
            } => push_deleted(&mut ops, &old[old_index..old_index + old_len]),
            DiffOp::Insert {
                new_index, new_len, ..
            } => push_inserted(&mut ops, &new[new_index..new_index + new_len]),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                push_deleted(&mut ops, &old[old_index..old_index + old_len]);
                push_inserted(&mut ops, &new[new_index..new_index + new_len]);
            }
        }
    }
    ops
}

/// Whether a diff changes anything.
pub fn is_unchanged(ops: &[LineDiffOp]) -> bool {
    ops.iter().all(|op| matches!(op, LineDiffOp::Keep(_)))
}

fn push_keep(ops: &mut Vec<LineDiffOp>, count: usize) {
    if count == 0 {
        return;
    }
    if let Some(LineDiffOp::Keep(kept)) = ops.last_mut() {
        *kept += count;
    } else {
        ops.push(LineDiffOp::Keep(count));
    }
}

fn push_deleted(ops: &mut Vec<LineDiffOp>, rows: &[String]) {
    ops.extend(rows.iter().cloned().map(LineDiffOp::Delete));
}

fn push_inserted(ops: &mut Vec<LineDiffOp>, rows: &[String]) {
    ops.extend(rows.iter().cloned().map(LineDiffOp::Insert));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_identical_rows_are_one_keep() {
        let a = rows(&["a", "b", "c"]);
        assert_eq!(diff_lines(&a, &a), vec![LineDiffOp::Keep(3)]);
        assert!(is_unchanged(&diff_lines(&a, &a)));
    }

    #[test]
    fn test_single_row_replacement() {
        let ops = diff_lines(&rows(&["a", "b", "c"]), &rows(&["a", "B", "c"]));
        assert_eq!(
            ops,
            vec![
                LineDiffOp::Keep(1),
                LineDiffOp::Delete("b".into()),
                LineDiffOp::Insert("B".into()),
                LineDiffOp::Keep(1),
            ]
        );
    }

    #[test]
    fn test_insertions_and_deletions_interleave() {
        let ops = diff_lines(&rows(&["x", "a", "y", "b"]), &rows(&["a", "z", "b", "w"]));
        let kept: usize = ops
            .iter()
            .map(|op| match op {
                LineDiffOp::Keep(n) => *n,
                _ => 0,
            })
            .sum();
        assert_eq!(kept, 2);
        assert!(!is_unchanged(&ops));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(diff_lines(&[], &[]).is_empty());
        assert_eq!(diff_lines(&[], &rows(&["a"])), vec![LineDiffOp::Insert("a".into())]);
    }

    #[test]
    fn test_long_document_changed_at_both_ends() {
        let old: Vec<String> = (0..50_000).map(|i| format!("row {i}")).collect();
        let mut new = old.clone();
        new[0] = "first".to_owned();
        new[49_999] = "last".to_owned();

        let ops = diff_lines(&old, &new);
        let kept: usize = ops
            .iter()
            .map(|op| match op {
                LineDiffOp::Keep(n) => *n,
                _ => 0,
            })
            .sum();
        assert_eq!(kept, 49_998);
        assert_eq!(ops.len(), 5);
        assert!(ops.contains(&LineDiffOp::Insert("first".into())));
        assert!(ops.contains(&LineDiffOp::Delete("row 49999".into())));
    }
}
