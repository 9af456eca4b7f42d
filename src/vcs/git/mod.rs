pub mod context;

use git2::Repository;
use std::path::Path;

use crate::error::{HunkwiseError, Result};
use crate::model::DiffLine;

use super::traits::{ContextRequest, ContextSource, context_lines_from_text};

pub use context::{read_blob_at, read_working_tree};

/// Context lines read through libgit2: committed blobs for a revision, or
/// the working tree when the request names none
pub struct GitContextSource {
    repo: Repository,
}

impl GitContextSource {
    /// Discover the repository containing `path`
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|_| HunkwiseError::NotARepository)?;
        Ok(Self { repo })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }
}

impl ContextSource for GitContextSource {
    fn fetch_context_lines(&self, request: &ContextRequest) -> Result<Vec<DiffLine>> {
        request.validate()?;
        let content = match &request.commit_ref {
            Some(commit_ref) => read_blob_at(&self.repo, commit_ref, &request.file_path)?,
            None => read_working_tree(&self.repo, &request.file_path)?,
        };
        Ok(context_lines_from_text(&content, request))
    }
}
