//! Diff alignment and line-mode review navigation.
//!
//! `diff` turns parsed hunks into gaps, side-by-side pairs, regions and
//! virtual rows. `navigation` drives the keyboard cursor over them, and
//! `vcs` supplies the diffs and the hidden context lines.

pub mod config;
pub mod diff;
pub mod error;
pub mod input;
pub mod model;
pub mod navigation;
pub mod vcs;

pub use error::{HunkwiseError, Result};
