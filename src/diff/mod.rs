//! Diff alignment engine.
//!
//! Data flows one way: hunks go through the gap model, optionally get
//! fetched context merged back in, are paired for side-by-side display when
//! needed, and end up as identities, regions and virtual rows.

pub mod gaps;
pub mod region;
pub mod rows;
pub mod split;

use serde::{Deserialize, Serialize};

use crate::model::{
    DiffElement, DiffHunk, DiffLine, LineIdentity, LineType, PairedLine,
    line_identity_for_diff_line, line_identity_for_paired_line,
};

pub use gaps::{
    ExpandDirection, FetchedLines, GapExpansion, augment_hunks, build_diff_elements,
    expand_gap_range, validate_hunks,
};
pub use region::resolve_selection_to_region;
pub use rows::{VirtualRow, VirtualRowModel, build_virtual_row_model};
pub use split::{align_changed_block, pair_lines_for_split_view};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiffViewMode {
    #[default]
    #[serde(rename = "unified")]
    Unified,
    #[serde(rename = "split", alias = "side-by-side")]
    SideBySide,
}

impl DiffViewMode {
    pub fn toggle(self) -> Self {
        match self {
            DiffViewMode::Unified => DiffViewMode::SideBySide,
            DiffViewMode::SideBySide => DiffViewMode::Unified,
        }
    }
}

/// One navigable row of a hunk in the active view mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRow<'a> {
    Unified(&'a DiffLine),
    Split(PairedLine<'a>),
}

impl DisplayRow<'_> {
    pub fn identity(&self) -> Option<LineIdentity> {
        match self {
            DisplayRow::Unified(line) => line_identity_for_diff_line(line),
            DisplayRow::Split(pair) => line_identity_for_paired_line(pair),
        }
    }

    /// Old-file line this row contributes (context or deletion only)
    pub fn old_line(&self) -> Option<u32> {
        let line = match self {
            DisplayRow::Unified(line) => Some(*line),
            DisplayRow::Split(pair) => pair.left,
        }?;
        match line.line_type {
            LineType::Context | LineType::Deletion => line.old_lineno,
            _ => None,
        }
    }

    /// New-file line this row contributes (context or addition only)
    pub fn new_line(&self) -> Option<u32> {
        let line = match self {
            DisplayRow::Unified(line) => Some(*line),
            DisplayRow::Split(pair) => pair.right,
        }?;
        match line.line_type {
            LineType::Context | LineType::Addition => line.new_lineno,
            _ => None,
        }
    }

    pub fn is_change(&self) -> bool {
        match self {
            DisplayRow::Unified(line) => line.line_type.is_change(),
            DisplayRow::Split(pair) => {
                pair.left
                    .is_some_and(|l| l.line_type == LineType::Deletion)
                    || pair
                        .right
                        .is_some_and(|r| r.line_type == LineType::Addition)
            }
        }
    }

    /// Whether a comment anchored at `target` belongs under this row.
    /// Split rows match on either side's own identity.
    pub fn hosts(&self, target: LineIdentity) -> bool {
        match self {
            DisplayRow::Unified(line) => line_identity_for_diff_line(line) == Some(target),
            DisplayRow::Split(pair) => [pair.left, pair.right]
                .into_iter()
                .flatten()
                .any(|line| line_identity_for_diff_line(line) == Some(target)),
        }
    }
}

/// Rows of a single hunk in document order
pub fn hunk_display_rows(hunk: &DiffHunk, mode: DiffViewMode) -> Vec<DisplayRow<'_>> {
    match mode {
        DiffViewMode::Unified => hunk.lines.iter().map(DisplayRow::Unified).collect(),
        DiffViewMode::SideBySide => pair_lines_for_split_view(&hunk.lines)
            .into_iter()
            .map(DisplayRow::Split)
            .collect(),
    }
}

/// Rows of every hunk in `elements`, tagged with the hunk's ordinal
pub fn document_rows(
    elements: &[DiffElement],
    mode: DiffViewMode,
) -> Vec<(usize, DisplayRow<'_>)> {
    elements
        .iter()
        .filter_map(DiffElement::as_hunk)
        .enumerate()
        .flat_map(|(hunk_idx, hunk)| {
            hunk_display_rows(hunk, mode)
                .into_iter()
                .map(move |row| (hunk_idx, row))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::{DiffHunk, DiffLine};

    /// Build a hunk whose ranges are derived from its lines
    pub fn hunk(lines: Vec<DiffLine>) -> DiffHunk {
        let old_nums: Vec<u32> = lines
            .iter()
            .filter(|l| l.line_type != crate::model::LineType::Addition)
            .filter_map(|l| l.old_lineno)
            .collect();
        let new_nums: Vec<u32> = lines
            .iter()
            .filter(|l| l.line_type != crate::model::LineType::Deletion)
            .filter_map(|l| l.new_lineno)
            .collect();
        let old_start = old_nums.first().copied().unwrap_or(0);
        let new_start = new_nums.first().copied().unwrap_or(0);
        DiffHunk {
            old_start,
            old_lines: old_nums.len() as u32,
            new_start,
            new_lines: new_nums.len() as u32,
            header: String::new(),
            lines,
        }
    }

    pub fn ranged_hunk(old_start: u32, old_lines: u32, new_start: u32, new_lines: u32) -> DiffHunk {
        DiffHunk {
            old_start,
            old_lines,
            new_start,
            new_lines,
            header: format!("@@ -{old_start},{old_lines} +{new_start},{new_lines} @@"),
            lines: Vec::new(),
        }
    }
}
