//! Unified diff parser for git-style patches (`git diff`, `git format-patch`,
//! `jj diff --git`).

use std::iter::Peekable;
use std::path::PathBuf;
use std::str::Lines;

use crate::error::{HunkwiseError, Result};
use crate::model::{DiffFile, DiffHunk, DiffLine, FileStatus, LineType, Token};

const FILE_HEADER: &str = "diff --git ";
const NO_NEWLINE: &str = "No newline at end of file";

/// Parse unified diff text into one `DiffFile` per `diff --git` section.
///
/// Returns `NoChanges` when the text holds no file sections, and
/// `InvalidHunkHeader` for an `@@` line that cannot be read.
pub fn parse_unified_diff(diff_text: &str) -> Result<Vec<DiffFile>> {
    let mut files = Vec::new();
    let mut lines = diff_text.lines().peekable();

    while let Some(line) = lines.next() {
        if !line.starts_with(FILE_HEADER) {
            continue;
        }
        let (old_path, new_path, status, is_binary) = parse_file_header(&mut lines);

        let mut hunks = Vec::new();
        while let Some(peek_line) = lines.peek() {
            if peek_line.starts_with(FILE_HEADER) {
                break;
            } else if peek_line.starts_with("@@") {
                hunks.push(parse_hunk(&mut lines)?);
            } else {
                lines.next();
            }
        }

        files.push(DiffFile {
            old_path,
            new_path,
            status,
            hunks,
            is_binary,
        });
    }

    if files.is_empty() {
        return Err(HunkwiseError::NoChanges);
    }
    Ok(files)
}

fn strip_path(raw: &str, prefix: &str) -> Option<PathBuf> {
    // Paths may carry a tab-separated timestamp
    let raw = raw.split('\t').next().unwrap_or(raw);
    if raw == "/dev/null" {
        return None;
    }
    Some(PathBuf::from(raw.strip_prefix(prefix).unwrap_or(raw)))
}

fn parse_file_header(
    lines: &mut Peekable<Lines<'_>>,
) -> (Option<PathBuf>, Option<PathBuf>, FileStatus, bool) {
    let mut old_path = None;
    let mut new_path = None;
    let mut status = FileStatus::Modified;
    let mut is_binary = false;
    let mut saw_old_marker = false;

    while let Some(line) = lines.peek() {
        if line.starts_with("@@") || line.starts_with(FILE_HEADER) {
            break;
        }
        if let Some(path) = line.strip_prefix("--- ") {
            old_path = strip_path(path, "a/");
            saw_old_marker = true;
        } else if let Some(path) = line.strip_prefix("+++ ") {
            new_path = strip_path(path, "b/");
            lines.next();
            break;
        } else if line.starts_with("new file") {
            status = FileStatus::Added;
        } else if line.starts_with("deleted file") {
            status = FileStatus::Deleted;
        } else if let Some(path) = line.strip_prefix("rename from ") {
            status = FileStatus::Renamed;
            old_path = Some(PathBuf::from(path));
        } else if let Some(path) = line.strip_prefix("rename to ") {
            new_path = Some(PathBuf::from(path));
        } else if let Some(path) = line.strip_prefix("copy from ") {
            status = FileStatus::Copied;
            old_path = Some(PathBuf::from(path));
        } else if let Some(path) = line.strip_prefix("copy to ") {
            new_path = Some(PathBuf::from(path));
        } else if line.starts_with("Binary files ") || line.starts_with("GIT binary patch") {
            is_binary = true;
            if let Some((old, new)) = parse_binary_file_line(line) {
                old_path = old_path.or(old);
                new_path = new_path.or(new);
            }
        }
        lines.next();
    }

    if status == FileStatus::Modified && saw_old_marker {
        match (&old_path, &new_path) {
            (None, Some(_)) => status = FileStatus::Added,
            (Some(_), None) => status = FileStatus::Deleted,
            _ => {}
        }
    }

    (old_path, new_path, status, is_binary)
}

/// "Binary files a/<old> and b/<new> differ"
fn parse_binary_file_line(line: &str) -> Option<(Option<PathBuf>, Option<PathBuf>)> {
    let content = line.strip_prefix("Binary files ")?.strip_suffix(" differ")?;
    let (old_part, new_part) = content.split_once(" and ")?;
    Some((strip_path(old_part, "a/"), strip_path(new_part, "b/")))
}

fn parse_hunk(lines: &mut Peekable<Lines<'_>>) -> Result<DiffHunk> {
    let header = lines.next().unwrap_or_default();
    let (old_start, old_lines, new_start, new_lines) = parse_hunk_header(header)
        .ok_or_else(|| HunkwiseError::InvalidHunkHeader(header.to_string()))?;

    let mut old_lineno = old_start;
    let mut new_lineno = new_start;
    let mut old_remaining = old_lines;
    let mut new_remaining = new_lines;
    let mut diff_lines: Vec<DiffLine> = Vec::new();

    while let Some(&line) = lines.peek() {
        if line.starts_with("@@") || line.starts_with(FILE_HEADER) {
            break;
        }
        if line.starts_with('\\') {
            lines.next();
            if let Some(marker) = diff_lines.last().and_then(eof_marker_after) {
                diff_lines.push(marker);
            }
            continue;
        }
        if old_remaining == 0 && new_remaining == 0 {
            break;
        }
        lines.next();

        let (first, text) = match line.char_indices().nth(1) {
            Some((idx, _)) => (&line[..idx], &line[idx..]),
            None => (line, ""),
        };
        match first {
            "+" => {
                diff_lines.push(DiffLine::addition(new_lineno, text));
                new_lineno += 1;
                new_remaining = new_remaining.saturating_sub(1);
            }
            "-" => {
                diff_lines.push(DiffLine::deletion(old_lineno, text));
                old_lineno += 1;
                old_remaining = old_remaining.saturating_sub(1);
            }
            // Some tools strip the leading space from empty context lines
            " " | "" => {
                diff_lines.push(DiffLine::context(old_lineno, new_lineno, text));
                old_lineno += 1;
                new_lineno += 1;
                old_remaining = old_remaining.saturating_sub(1);
                new_remaining = new_remaining.saturating_sub(1);
            }
            _ => log::debug!("skipping unrecognized diff line: {line:?}"),
        }
    }

    Ok(DiffHunk {
        old_start,
        old_lines,
        new_start,
        new_lines,
        header: header.to_string(),
        lines: diff_lines,
    })
}

/// The marker line for a `\ No newline at end of file` following `prev`.
///
/// Markers carry no line numbers of their own, so they never compete with
/// the line they annotate for an identity. A marker after a context line
/// applies to both files and is dropped.
fn eof_marker_after(prev: &DiffLine) -> Option<DiffLine> {
    let line_type = match prev.line_type {
        LineType::Addition => LineType::AddEofNewline,
        LineType::Deletion => LineType::DelEofNewline,
        _ => return None,
    };
    Some(DiffLine {
        line_type,
        old_lineno: None,
        new_lineno: None,
        tokens: vec![Token::plain(NO_NEWLINE)],
    })
}

/// `@@ -old_start[,old_count] +new_start[,new_count] @@ [section]`
fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32)> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "@@" {
        return None;
    }
    let (old_start, old_count) = parse_range(parts.next()?.strip_prefix('-')?)?;
    let (new_start, new_count) = parse_range(parts.next()?.strip_prefix('+')?)?;
    if parts.next()? != "@@" {
        return None;
    }
    Some((old_start, old_count, new_start, new_count))
}

fn parse_range(s: &str) -> Option<(u32, u32)> {
    match s.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((s.parse().ok()?, 1)),
    }
}
