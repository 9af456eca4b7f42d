use std::path::{Path, PathBuf};

use crate::diff::GapExpansion;
use crate::error::{HunkwiseError, Result};
use crate::model::DiffLine;

/// A run of new-file lines to load for gap expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRequest {
    pub file_path: PathBuf,
    /// Revision to read the file at; `None` reads the working copy
    pub commit_ref: Option<String>,
    pub start_line: u32,
    /// Inclusive
    pub end_line: u32,
    /// Old-file line matching `start_line`
    pub old_start_line: u32,
}

impl ContextRequest {
    pub fn for_gap(
        file_path: impl Into<PathBuf>,
        commit_ref: Option<String>,
        expansion: GapExpansion,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            commit_ref,
            start_line: expansion.start_line,
            end_line: expansion.end_line,
            old_start_line: expansion.old_start_line,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_line == 0 || self.start_line > self.end_line {
            return Err(HunkwiseError::InvalidLineRange {
                start: self.start_line,
                end: self.end_line,
            });
        }
        Ok(())
    }
}

/// Source of file contents for hidden context lines
pub trait ContextSource {
    /// Load the requested lines as context `DiffLine`s numbered from
    /// `(old_start_line, start_line)`. Lines past the end of the file are
    /// left out.
    fn fetch_context_lines(&self, request: &ContextRequest) -> Result<Vec<DiffLine>>;
}

/// Cut the requested range out of a file's full text
pub(crate) fn context_lines_from_text(content: &str, request: &ContextRequest) -> Vec<DiffLine> {
    let first = request.start_line as usize - 1;
    let count = (request.end_line - request.start_line + 1) as usize;
    content
        .lines()
        .skip(first)
        .take(count)
        .zip(0..)
        .map(|(text, offset)| {
            DiffLine::context(
                request.old_start_line + offset,
                request.start_line + offset,
                text,
            )
        })
        .collect()
}

/// Reads files straight from a directory on disk
#[derive(Debug, Clone)]
pub struct FileContextSource {
    root: PathBuf,
}

impl FileContextSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContextSource for FileContextSource {
    fn fetch_context_lines(&self, request: &ContextRequest) -> Result<Vec<DiffLine>> {
        request.validate()?;
        if let Some(commit_ref) = &request.commit_ref {
            log::debug!(
                "file context source ignores revision {commit_ref} for {}",
                request.file_path.display()
            );
        }
        let content = std::fs::read_to_string(self.root.join(&request.file_path))?;
        Ok(context_lines_from_text(&content, request))
    }
}
