use crate::model::{DiffElement, LineIdentity, Region};

use super::{DiffViewMode, document_rows};

/// Min/max of the line numbers seen on one side
#[derive(Debug, Default, Clone, Copy)]
struct SideSpan {
    bounds: Option<(u32, u32)>,
}

impl SideSpan {
    fn include(&mut self, line: u32) {
        self.bounds = Some(match self.bounds {
            Some((min, max)) => (min.min(line), max.max(line)),
            None => (line, line),
        });
    }

    /// `(start, lines)`, or the anchor with zero lines when the side is empty
    fn resolve(self, anchor: Option<u32>) -> (u32, u32) {
        match self.bounds {
            Some((min, max)) => (min, max - min + 1),
            None => (anchor.unwrap_or(0), 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Before,
    In { entered_at: LineIdentity },
}

/// Resolve the span between two line identities into a reviewable region.
///
/// Rows are walked in document order. The span starts at whichever endpoint
/// comes first and ends right after the other one (or right after the only
/// one when both are equal). Returns `None` when the span holds no additions
/// or deletions.
///
/// A side with no lines in the span is anchored at the last line of that side
/// seen before the span, so a pure insertion still knows where it goes.
pub fn resolve_selection_to_region(
    first: LineIdentity,
    second: LineIdentity,
    elements: &[DiffElement],
    mode: DiffViewMode,
) -> Option<Region> {
    let mut phase = Phase::Before;
    let mut last_old_before = None;
    let mut last_new_before = None;
    let mut old_span = SideSpan::default();
    let mut new_span = SideSpan::default();
    let mut has_change = false;

    for (_, row) in document_rows(elements, mode) {
        let identity = row.identity();
        let is_endpoint = identity.is_some_and(|id| id == first || id == second);

        if phase == Phase::Before {
            if !is_endpoint {
                if let Some(old) = row.old_line() {
                    last_old_before = Some(old);
                }
                if let Some(new) = row.new_line() {
                    last_new_before = Some(new);
                }
                continue;
            }
            if let Some(entered_at) = identity {
                phase = Phase::In { entered_at };
            }
        }

        if let Some(old) = row.old_line() {
            old_span.include(old);
        }
        if let Some(new) = row.new_line() {
            new_span.include(new);
        }
        has_change |= row.is_change();

        let Phase::In { entered_at } = phase else {
            continue;
        };
        let closes = first == second || (is_endpoint && identity != Some(entered_at));
        if closes {
            break;
        }
    }

    if !has_change {
        return None;
    }

    let (old_start, old_lines) = old_span.resolve(last_old_before);
    let (new_start, new_lines) = new_span.resolve(last_new_before);
    Some(Region {
        old_start,
        old_lines,
        new_start,
        new_lines,
    })
}
