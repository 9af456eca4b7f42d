use crate::model::{DiffElement, DiffLine, HunkGap, LineIdentity, PairedLine};

use super::{DiffViewMode, DisplayRow, hunk_display_rows};

/// One row handed to a virtualized list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualRow<'a> {
    /// Hidden context; `is_last` gaps only offer "expand up"
    Gap { gap: HunkGap, is_last: bool },
    UnifiedLine {
        line: &'a DiffLine,
        hunk_idx: usize,
        nav_index: usize,
    },
    SplitLine {
        pair: PairedLine<'a>,
        hunk_idx: usize,
        nav_index: usize,
    },
    /// Inline comment editor attached to the line above it
    CommentForm { target: LineIdentity },
}

impl VirtualRow<'_> {
    pub fn nav_index(&self) -> Option<usize> {
        match self {
            VirtualRow::UnifiedLine { nav_index, .. } | VirtualRow::SplitLine { nav_index, .. } => {
                Some(*nav_index)
            }
            VirtualRow::Gap { .. } | VirtualRow::CommentForm { .. } => None,
        }
    }

    fn display_row(&self) -> Option<DisplayRow<'_>> {
        match self {
            VirtualRow::UnifiedLine { line, .. } => Some(DisplayRow::Unified(*line)),
            VirtualRow::SplitLine { pair, .. } => Some(DisplayRow::Split(*pair)),
            VirtualRow::Gap { .. } | VirtualRow::CommentForm { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualRowModel<'a> {
    pub rows: Vec<VirtualRow<'a>>,
    /// `nav_to_virtual[nav_index]` is the index of that line's row in `rows`
    pub nav_to_virtual: Vec<usize>,
    pub total_nav_rows: usize,
}

impl VirtualRowModel<'_> {
    pub fn virtual_index(&self, nav_index: usize) -> Option<usize> {
        self.nav_to_virtual.get(nav_index).copied()
    }

    /// Navigation index of the row showing `identity`, for scrolling the
    /// cursor into view
    pub fn nav_index_of(&self, identity: LineIdentity) -> Option<usize> {
        self.rows.iter().find_map(|row| {
            let nav_index = row.nav_index()?;
            (row.display_row()?.identity() == Some(identity)).then_some(nav_index)
        })
    }
}

/// Flatten gaps and hunks into one addressable row list.
///
/// Every line (or side-by-side pair) gets the next navigation index. When
/// `active_comment` names a line, a comment form row follows it.
pub fn build_virtual_row_model<'a>(
    elements: &'a [DiffElement],
    mode: DiffViewMode,
    active_comment: Option<LineIdentity>,
) -> VirtualRowModel<'a> {
    let mut model = VirtualRowModel::default();
    let mut hunk_idx = 0;

    for (element_idx, element) in elements.iter().enumerate() {
        let hunk = match element {
            DiffElement::Gap(gap) => {
                model.rows.push(VirtualRow::Gap {
                    gap: *gap,
                    is_last: element_idx + 1 == elements.len(),
                });
                continue;
            }
            DiffElement::Hunk(hunk) => hunk,
        };

        for row in hunk_display_rows(hunk, mode) {
            let nav_index = model.total_nav_rows;
            model.nav_to_virtual.push(model.rows.len());
            model.total_nav_rows += 1;

            model.rows.push(match row {
                DisplayRow::Unified(line) => VirtualRow::UnifiedLine {
                    line,
                    hunk_idx,
                    nav_index,
                },
                DisplayRow::Split(pair) => VirtualRow::SplitLine {
                    pair,
                    hunk_idx,
                    nav_index,
                },
            });

            if let Some(target) = active_comment
                && row.hosts(target)
            {
                model.rows.push(VirtualRow::CommentForm { target });
            }
        }
        hunk_idx += 1;
    }

    model
}
