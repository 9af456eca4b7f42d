use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::identity::{LineIdentity, LineSide};

/// A range of lines for a comment (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    /// Create a new line range
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Create a single-line range
    pub fn single(line: u32) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, line: u32) -> bool {
        line >= self.start && line <= self.end
    }
}

/// Where a comment form is opened: a single line, or a range on one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentTarget {
    pub side: LineSide,
    pub range: LineRange,
}

impl CommentTarget {
    pub fn single(identity: LineIdentity) -> Self {
        Self {
            side: identity.side,
            range: LineRange::single(identity.line),
        }
    }

    pub fn ranged(side: LineSide, start: u32, end: u32) -> Self {
        Self {
            side,
            range: LineRange::new(start, end),
        }
    }

    /// The line the comment form is attached to (the end of the range)
    pub fn identity(&self) -> LineIdentity {
        LineIdentity::new(self.range.end, self.side)
    }

    /// Build the payload handed to the review store
    pub fn to_request(
        &self,
        body: impl Into<String>,
        path: impl Into<PathBuf>,
        commit_ref: impl Into<String>,
    ) -> CommentRequest {
        let (start_line, start_side) = if self.range.is_single() {
            (None, None)
        } else {
            (Some(self.range.start), Some(self.side))
        };
        CommentRequest {
            body: body.into(),
            path: path.into(),
            line: self.range.end,
            side: self.side,
            commit_ref: commit_ref.into(),
            start_line,
            start_side,
        }
    }
}

/// Comment creation payload for the review store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRequest {
    pub body: String,
    pub path: PathBuf,
    pub line: u32,
    pub side: LineSide,
    pub commit_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_side: Option<LineSide>,
}
