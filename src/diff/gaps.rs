use std::collections::BTreeMap;

use crate::error::{HunkwiseError, Result};
use crate::model::{DiffElement, DiffHunk, DiffLine, HunkGap};

/// Context lines fetched so far for one file, keyed by new-file line number.
///
/// Lines are only ever added, never replaced, so recomputing the hunks from
/// the same map always gives the same result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedLines {
    lines: BTreeMap<u32, DiffLine>,
}

impl FetchedLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn contains(&self, new_lineno: u32) -> bool {
        self.lines.contains_key(&new_lineno)
    }

    pub fn get(&self, new_lineno: u32) -> Option<&DiffLine> {
        self.lines.get(&new_lineno)
    }

    /// Add freshly fetched lines. Lines without a new line number, or whose
    /// number is already present, are skipped. Returns how many were added.
    pub fn extend<I: IntoIterator<Item = DiffLine>>(&mut self, lines: I) -> usize {
        let mut added = 0;
        for line in lines {
            let Some(new_lineno) = line.new_lineno else {
                continue;
            };
            if let std::collections::btree_map::Entry::Vacant(entry) = self.lines.entry(new_lineno)
            {
                entry.insert(line);
                added += 1;
            }
        }
        added
    }

    /// Lines in `[start, end]`, ascending. Empty when the range is empty.
    fn in_range(&self, start: i64, end: i64) -> Vec<&DiffLine> {
        if start > end || end < 1 {
            return Vec::new();
        }
        let start = u32::try_from(start.max(1)).unwrap_or(u32::MAX);
        let end = u32::try_from(end).unwrap_or(u32::MAX);
        self.lines.range(start..=end).map(|(_, line)| line).collect()
    }
}

impl FromIterator<DiffLine> for FetchedLines {
    fn from_iter<I: IntoIterator<Item = DiffLine>>(iter: I) -> Self {
        let mut fetched = FetchedLines::new();
        fetched.extend(iter);
        fetched
    }
}

/// A gap range as computed from hunk boundaries; may be empty or inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GapRange {
    new_start: i64,
    new_end: i64,
    old_start: i64,
}

impl GapRange {
    fn count(&self) -> i64 {
        self.new_end - self.new_start + 1
    }

    fn to_gap(self) -> Option<HunkGap> {
        if self.count() <= 0 || self.new_start < 1 {
            return None;
        }
        Some(HunkGap {
            new_start: u32::try_from(self.new_start).ok()?,
            new_end: u32::try_from(self.new_end).ok()?,
            old_start: u32::try_from(self.old_start.max(1)).ok()?,
            count: u32::try_from(self.count()).ok()?,
        })
    }
}

/// The `hunks.len() + 1` gap ranges around the hunks: leading, between each
/// pair, trailing. Empty when there are no hunks.
fn gap_ranges(hunks: &[DiffHunk], total_new_file_lines: u32) -> Vec<GapRange> {
    let (Some(first), Some(last)) = (hunks.first(), hunks.last()) else {
        return Vec::new();
    };

    let new_end = |h: &DiffHunk| i64::from(h.new_start) + i64::from(h.new_lines) - 1;
    let old_end = |h: &DiffHunk| i64::from(h.old_start) + i64::from(h.old_lines) - 1;

    let mut ranges = Vec::with_capacity(hunks.len() + 1);
    ranges.push(GapRange {
        new_start: 1,
        new_end: i64::from(first.new_start) - 1,
        old_start: 1,
    });
    for pair in hunks.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        ranges.push(GapRange {
            new_start: new_end(prev) + 1,
            new_end: i64::from(next.new_start) - 1,
            old_start: old_end(prev) + 1,
        });
    }
    ranges.push(GapRange {
        new_start: new_end(last) + 1,
        new_end: i64::from(total_new_file_lines),
        old_start: old_end(last) + 1,
    });
    ranges
}

/// Interleave hidden-context gaps with the hunks.
///
/// Gaps that would hold no lines are left out, so a hunk starting at line 1
/// has no leading gap.
pub fn build_diff_elements(hunks: &[DiffHunk], total_new_file_lines: u32) -> Vec<DiffElement> {
    let ranges = gap_ranges(hunks, total_new_file_lines);
    let Some(trailing) = ranges.last().copied() else {
        return Vec::new();
    };

    let mut elements = Vec::with_capacity(hunks.len() * 2 + 1);
    for (hunk, range) in hunks.iter().zip(&ranges) {
        if let Some(gap) = range.to_gap() {
            elements.push(DiffElement::Gap(gap));
        }
        elements.push(DiffElement::Hunk(hunk.clone()));
    }
    if let Some(gap) = trailing.to_gap() {
        elements.push(DiffElement::Gap(gap));
    }
    elements
}

/// Merge fetched context lines into the hunks they border.
///
/// Only runs that touch a hunk are merged: the run ending at the gap's last
/// line goes onto the following hunk, the run starting at the gap's first
/// line onto the preceding one. A gap filled completely is appended to the
/// preceding hunk and the two hunks are then joined.
pub fn augment_hunks(
    hunks: &[DiffHunk],
    fetched: &FetchedLines,
    total_new_file_lines: u32,
) -> Vec<DiffHunk> {
    if hunks.is_empty() || fetched.is_empty() {
        return hunks.to_vec();
    }

    let ranges = gap_ranges(hunks, total_new_file_lines);
    let trailing_idx = hunks.len();
    let mut result = hunks.to_vec();

    for (idx, range) in ranges.iter().enumerate() {
        let collected = fetched.in_range(range.new_start, range.new_end);
        if collected.is_empty() {
            continue;
        }

        let bottom = bottom_run(&collected, range.new_start);
        let top = top_run(&collected, range.new_end);
        if bottom.len() + top.len() < collected.len() {
            log::debug!(
                "ignoring {} fetched lines not adjacent to a hunk in {}..={}",
                collected.len().saturating_sub(bottom.len().max(top.len())),
                range.new_start,
                range.new_end
            );
        }

        if idx == 0 {
            prepend_lines(&mut result[0], &top);
        } else if idx == trailing_idx {
            append_lines(&mut result[idx - 1], &bottom);
        } else {
            let bottom_end = range.new_start + bottom.len() as i64 - 1;
            let top_start = range.new_end - top.len() as i64 + 1;
            if !bottom.is_empty() && bottom_end + 1 >= top_start {
                append_lines(&mut result[idx - 1], &collected);
            } else {
                append_lines(&mut result[idx - 1], &bottom);
                prepend_lines(&mut result[idx], &top);
            }
        }
    }

    merge_touching_hunks(result)
}

/// Maximal run of consecutive lines starting exactly at `start`
fn bottom_run<'a>(collected: &[&'a DiffLine], start: i64) -> Vec<&'a DiffLine> {
    let mut expected = start;
    let mut run = Vec::new();
    for line in collected {
        if line.new_lineno.map(i64::from) != Some(expected) {
            break;
        }
        run.push(*line);
        expected += 1;
    }
    run
}

/// Maximal run of consecutive lines ending exactly at `end`, ascending
fn top_run<'a>(collected: &[&'a DiffLine], end: i64) -> Vec<&'a DiffLine> {
    let mut expected = end;
    let mut run = Vec::new();
    for line in collected.iter().rev() {
        if line.new_lineno.map(i64::from) != Some(expected) {
            break;
        }
        run.push(*line);
        expected -= 1;
    }
    run.reverse();
    run
}

fn prepend_lines(hunk: &mut DiffHunk, lines: &[&DiffLine]) {
    let Some(first) = lines.first() else {
        return;
    };
    let count = lines.len() as u32;
    hunk.new_start = first
        .new_lineno
        .unwrap_or_else(|| hunk.new_start.saturating_sub(count));
    hunk.old_start = first
        .old_lineno
        .unwrap_or_else(|| hunk.old_start.saturating_sub(count));
    hunk.new_lines += count;
    hunk.old_lines += count;
    let mut merged: Vec<DiffLine> = lines.iter().map(|line| (*line).clone()).collect();
    merged.append(&mut hunk.lines);
    hunk.lines = merged;
    refresh_header(hunk);
}

fn append_lines(hunk: &mut DiffHunk, lines: &[&DiffLine]) {
    if lines.is_empty() {
        return;
    }
    let count = lines.len() as u32;
    hunk.new_lines += count;
    hunk.old_lines += count;
    hunk.lines.extend(lines.iter().map(|line| (*line).clone()));
    refresh_header(hunk);
}

/// Join every hunk that reaches the start of the next one
fn merge_touching_hunks(hunks: Vec<DiffHunk>) -> Vec<DiffHunk> {
    let mut merged: Vec<DiffHunk> = Vec::with_capacity(hunks.len());
    for hunk in hunks {
        if let Some(prev) = merged.last_mut()
            && prev.new_end_exclusive() >= hunk.new_start
        {
            let new_end = prev.new_end_exclusive().max(hunk.new_end_exclusive());
            let old_end = prev.old_end_exclusive().max(hunk.old_end_exclusive());
            prev.new_lines = new_end - prev.new_start;
            prev.old_lines = old_end.saturating_sub(prev.old_start);
            prev.lines.extend(hunk.lines);
            refresh_header(prev);
            continue;
        }
        merged.push(hunk);
    }
    merged
}

/// Rewrite the `@@ -a,b +c,d @@` ranges of a header, keeping any section text
fn refresh_header(hunk: &mut DiffHunk) {
    let section = hunk
        .header
        .strip_prefix("@@")
        .and_then(|rest| rest.split_once("@@"))
        .map(|(_, section)| section.to_string())
        .unwrap_or_default();
    hunk.header = format!(
        "@@ -{},{} +{},{} @@{section}",
        hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines
    );
}

/// Check the upstream contract: hunks sorted and non-overlapping on both sides
pub fn validate_hunks(hunks: &[DiffHunk]) -> Result<()> {
    for (idx, pair) in hunks.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.new_end_exclusive() > next.new_start {
            return Err(HunkwiseError::MalformedHunks(format!(
                "hunk {} (new {}+{}) overlaps hunk {} starting at new line {}",
                idx,
                prev.new_start,
                prev.new_lines,
                idx + 1,
                next.new_start
            )));
        }
        if prev.old_end_exclusive() > next.old_start {
            return Err(HunkwiseError::MalformedHunks(format!(
                "hunk {} (old {}+{}) overlaps hunk {} starting at old line {}",
                idx,
                prev.old_start,
                prev.old_lines,
                idx + 1,
                next.old_start
            )));
        }
    }
    Ok(())
}

/// Which part of a gap to reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandDirection {
    /// Lines directly above the following hunk
    Up,
    /// Lines directly below the preceding hunk
    Down,
    All,
}

/// New-file lines to fetch for an expansion, plus the matching old line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapExpansion {
    pub start_line: u32,
    pub end_line: u32,
    pub old_start_line: u32,
}

/// Compute which lines of `gap` to fetch. `step` caps the number of lines for
/// `Up`/`Down`; a zero step reveals nothing.
pub fn expand_gap_range(
    gap: &HunkGap,
    direction: ExpandDirection,
    step: u32,
) -> Option<GapExpansion> {
    if gap.count == 0 {
        return None;
    }
    let (start_line, end_line) = match direction {
        ExpandDirection::All => (gap.new_start, gap.new_end),
        _ if step == 0 => return None,
        ExpandDirection::Up => (
            gap.new_end
                .saturating_sub(step - 1)
                .max(gap.new_start),
            gap.new_end,
        ),
        ExpandDirection::Down => (
            gap.new_start,
            gap.new_start
                .saturating_add(step - 1)
                .min(gap.new_end),
        ),
    };
    Some(GapExpansion {
        start_line,
        end_line,
        old_start_line: gap.old_start + (start_line - gap.new_start),
    })
}
