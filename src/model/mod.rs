pub mod comment;
pub mod diff_types;
pub mod identity;
pub mod review;

pub use comment::{CommentRequest, CommentTarget, LineRange};
pub use diff_types::{
    DiffElement, DiffFile, DiffHunk, DiffLine, FileStatus, HunkGap, LineType, PairedLine, Token,
};
pub use identity::{
    LineIdentity, LineSide, line_identity_for_diff_line, line_identity_for_paired_line,
};
pub use review::Region;
