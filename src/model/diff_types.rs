use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

impl FileStatus {
    pub fn as_char(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
            FileStatus::Copied => 'C',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Context,
    Addition,
    Deletion,
    /// "\ No newline at end of file" marker following an added line
    AddEofNewline,
    /// "\ No newline at end of file" marker following a deleted line
    DelEofNewline,
}

impl LineType {
    pub fn is_eof_marker(&self) -> bool {
        matches!(self, LineType::AddEofNewline | LineType::DelEofNewline)
    }

    pub fn is_change(&self) -> bool {
        matches!(self, LineType::Addition | LineType::Deletion)
    }
}

/// A highlighted fragment of a line's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub color: Option<Color>,
    /// Set by word diff for the fragments that actually changed
    pub changed: bool,
}

impl Token {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            changed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub line_type: LineType,
    pub old_lineno: Option<u32>,
    /// For deletions this may carry the line number of the addition it was
    /// paired with by word diff.
    pub new_lineno: Option<u32>,
    pub tokens: Vec<Token>,
}

impl DiffLine {
    pub fn context(old_lineno: u32, new_lineno: u32, text: impl Into<String>) -> Self {
        Self {
            line_type: LineType::Context,
            old_lineno: Some(old_lineno),
            new_lineno: Some(new_lineno),
            tokens: vec![Token::plain(text)],
        }
    }

    pub fn addition(new_lineno: u32, text: impl Into<String>) -> Self {
        Self {
            line_type: LineType::Addition,
            old_lineno: None,
            new_lineno: Some(new_lineno),
            tokens: vec![Token::plain(text)],
        }
    }

    pub fn deletion(old_lineno: u32, text: impl Into<String>) -> Self {
        Self {
            line_type: LineType::Deletion,
            old_lineno: Some(old_lineno),
            new_lineno: None,
            tokens: vec![Token::plain(text)],
        }
    }

    /// The line number this line is addressed by: old for deletions, new
    /// for everything else (EOF markers fall back to old).
    pub fn canonical_lineno(&self) -> Option<u32> {
        match self.line_type {
            LineType::Deletion => self.old_lineno,
            LineType::AddEofNewline | LineType::DelEofNewline => {
                self.new_lineno.or(self.old_lineno)
            }
            LineType::Context | LineType::Addition => self.new_lineno,
        }
    }

    /// Concatenated token text
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    /// Starting line number in the old file (from @@ header)
    pub old_start: u32,
    /// Number of lines from the old file in this hunk
    pub old_lines: u32,
    /// Starting line number in the new file (from @@ header)
    pub new_start: u32,
    /// Number of lines from the new file in this hunk
    pub new_lines: u32,
    pub header: String,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// One past the last new-file line covered by this hunk
    pub fn new_end_exclusive(&self) -> u32 {
        self.new_start + self.new_lines
    }

    /// One past the last old-file line covered by this hunk
    pub fn old_end_exclusive(&self) -> u32 {
        self.old_start + self.old_lines
    }
}

/// A run of hidden, unfetched context lines in the new file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkGap {
    pub new_start: u32,
    pub new_end: u32,
    pub old_start: u32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffElement {
    Gap(HunkGap),
    Hunk(DiffHunk),
}

impl DiffElement {
    pub fn as_hunk(&self) -> Option<&DiffHunk> {
        match self {
            DiffElement::Hunk(hunk) => Some(hunk),
            DiffElement::Gap(_) => None,
        }
    }
}

/// One row of the side-by-side view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairedLine<'a> {
    pub left: Option<&'a DiffLine>,
    pub right: Option<&'a DiffLine>,
}

impl<'a> PairedLine<'a> {
    pub fn both(line: &'a DiffLine) -> Self {
        Self {
            left: Some(line),
            right: Some(line),
        }
    }

    pub fn left_only(line: &'a DiffLine) -> Self {
        Self {
            left: Some(line),
            right: None,
        }
    }

    pub fn right_only(line: &'a DiffLine) -> Self {
        Self {
            left: None,
            right: Some(line),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiffFile {
    pub old_path: Option<PathBuf>,
    pub new_path: Option<PathBuf>,
    pub status: FileStatus,
    pub hunks: Vec<DiffHunk>,
    pub is_binary: bool,
}

impl DiffFile {
    pub fn display_path(&self) -> Option<&Path> {
        self.new_path.as_deref().or(self.old_path.as_deref())
    }

    /// Number of lines in the new file, as far as the hunks can tell.
    ///
    /// Without the file contents the trailing gap cannot be sized, so this
    /// is the end of the last hunk.
    pub fn known_new_line_count(&self) -> u32 {
        self.hunks
            .last()
            .map(|h| h.new_end_exclusive().saturating_sub(1))
            .unwrap_or(0)
    }
}
