use thiserror::Error;

#[derive(Error, Debug)]
pub enum HunkwiseError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a repository")]
    NotARepository,

    #[error("No changes to review")]
    NoChanges,

    #[error("Invalid hunk header: {0}")]
    InvalidHunkHeader(String),

    #[error("Malformed hunks: {0}")]
    MalformedHunks(String),

    #[error("Invalid line identity '{0}', expected L<n> or R<n>")]
    InvalidLineIdentity(String),

    #[error("Invalid line range {start}..={end}")]
    InvalidLineRange { start: u32, end: u32 },
}

pub type Result<T> = std::result::Result<T, HunkwiseError>;
