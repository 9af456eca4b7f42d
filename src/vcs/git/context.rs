use git2::Repository;
use std::path::Path;

use crate::error::{HunkwiseError, Result};

/// Full text of `file_path` as committed at `commit_ref`
pub fn read_blob_at(repo: &Repository, commit_ref: &str, file_path: &Path) -> Result<String> {
    let tree = repo.revparse_single(commit_ref)?.peel_to_tree()?;
    let entry = tree.get_path(file_path)?;
    let blob = repo.find_blob(entry.id())?;
    Ok(String::from_utf8_lossy(blob.content()).into_owned())
}

/// Full text of `file_path` in the repository's working tree
pub fn read_working_tree(repo: &Repository, file_path: &Path) -> Result<String> {
    let workdir = repo.workdir().ok_or(HunkwiseError::NotARepository)?;
    Ok(std::fs::read_to_string(workdir.join(file_path))?)
}
