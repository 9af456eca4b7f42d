//! Where diffs and file contents come from.
//!
//! Diffs arrive as git-style unified diff text. Hidden context for gap
//! expansion is read through a `ContextSource`: libgit2 for repositories, or
//! plain files on disk.

mod diff_parser;
pub mod git;
mod traits;

pub use diff_parser::parse_unified_diff;
pub use git::GitContextSource;
pub use traits::{ContextRequest, ContextSource, FileContextSource};

use std::path::Path;

use crate::error::Result;

/// A git source when `path` is inside a repository, plain files otherwise
pub fn detect_context_source(path: &Path) -> Result<Box<dyn ContextSource>> {
    match GitContextSource::discover(path) {
        Ok(source) => Ok(Box::new(source)),
        Err(err) => {
            log::debug!("no git repository at {}: {err}", path.display());
            Ok(Box::new(FileContextSource::new(path)))
        }
    }
}
