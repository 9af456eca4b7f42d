use std::collections::HashMap;

use crate::model::{DiffLine, LineType, PairedLine};

/// Align a hunk's lines into left/right rows for the side-by-side view.
///
/// Context and EOF markers fill both sides. A run of deletions directly
/// followed by a run of additions is aligned as one changed block; additions
/// with no deletions before them stand alone on the right.
pub fn pair_lines_for_split_view(lines: &[DiffLine]) -> Vec<PairedLine<'_>> {
    let mut pairs = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        match line.line_type {
            LineType::Context | LineType::AddEofNewline | LineType::DelEofNewline => {
                pairs.push(PairedLine::both(line));
                i += 1;
            }
            LineType::Addition => {
                pairs.push(PairedLine::right_only(line));
                i += 1;
            }
            LineType::Deletion => {
                let del_end = run_end(lines, i, LineType::Deletion);
                let add_end = run_end(lines, del_end, LineType::Addition);
                pairs.extend(align_changed_block(
                    &lines[i..del_end],
                    &lines[del_end..add_end],
                ));
                i = add_end;
            }
        }
    }
    pairs
}

/// Index one past the run of `line_type` lines starting at `start`
fn run_end(lines: &[DiffLine], start: usize, line_type: LineType) -> usize {
    lines[start..]
        .iter()
        .position(|line| line.line_type != line_type)
        .map_or(lines.len(), |offset| start + offset)
}

/// Pair deletions with additions.
///
/// A deletion carrying the `new_lineno` of one of the additions was matched
/// to it by word diff and is placed on the same row. Without any such match
/// the two sides are zipped by position.
pub fn align_changed_block<'a>(
    deletions: &'a [DiffLine],
    additions: &'a [DiffLine],
) -> Vec<PairedLine<'a>> {
    let mut addition_by_line: HashMap<u32, usize> = HashMap::with_capacity(additions.len());
    for (idx, addition) in additions.iter().enumerate() {
        if let Some(new_lineno) = addition.new_lineno {
            addition_by_line.entry(new_lineno).or_insert(idx);
        }
    }

    // Matches must advance on both sides or a line would be emitted twice.
    let mut matches: Vec<(usize, usize)> = Vec::new();
    for (del_idx, deletion) in deletions.iter().enumerate() {
        let Some(&add_idx) = deletion
            .new_lineno
            .and_then(|n| addition_by_line.get(&n))
        else {
            continue;
        };
        if matches.last().is_some_and(|&(_, prev_add)| add_idx <= prev_add) {
            log::debug!(
                "dropping crossing word-diff match: deletion {del_idx} -> addition {add_idx}"
            );
            continue;
        }
        matches.push((del_idx, add_idx));
    }

    if matches.is_empty() {
        let rows = deletions.len().max(additions.len());
        return (0..rows)
            .map(|offset| PairedLine {
                left: deletions.get(offset),
                right: additions.get(offset),
            })
            .collect();
    }

    let mut pairs = Vec::with_capacity(deletions.len() + additions.len());
    let (mut del_ptr, mut add_ptr) = (0, 0);
    for (del_idx, add_idx) in matches {
        pairs.extend(deletions[del_ptr..del_idx].iter().map(PairedLine::left_only));
        pairs.extend(additions[add_ptr..add_idx].iter().map(PairedLine::right_only));
        pairs.push(PairedLine {
            left: Some(&deletions[del_idx]),
            right: Some(&additions[add_idx]),
        });
        del_ptr = del_idx + 1;
        add_ptr = add_idx + 1;
    }
    pairs.extend(deletions[del_ptr..].iter().map(PairedLine::left_only));
    pairs.extend(additions[add_ptr..].iter().map(PairedLine::right_only));
    pairs
}
