use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::HunkwiseError;

use super::diff_types::{DiffLine, LineType, PairedLine};

/// Which side of the diff a line lives on
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineSide {
    /// Deleted lines, keyed by old_lineno
    Left,
    /// Added and context lines, keyed by new_lineno
    #[default]
    Right,
}

/// Canonical address of a displayable line, shared by unified and split views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineIdentity {
    pub line: u32,
    pub side: LineSide,
}

impl LineIdentity {
    pub fn new(line: u32, side: LineSide) -> Self {
        Self { line, side }
    }

    pub fn left(line: u32) -> Self {
        Self::new(line, LineSide::Left)
    }

    pub fn right(line: u32) -> Self {
        Self::new(line, LineSide::Right)
    }
}

impl std::fmt::Display for LineIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.side {
            LineSide::Left => write!(f, "L{}", self.line),
            LineSide::Right => write!(f, "R{}", self.line),
        }
    }
}

/// Parses the `L12` / `R12` form produced by `Display`
impl FromStr for LineIdentity {
    type Err = HunkwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HunkwiseError::InvalidLineIdentity(s.to_string());
        let mut chars = s.chars();
        let side = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('L') => LineSide::Left,
            Some('R') => LineSide::Right,
            _ => return Err(invalid()),
        };
        let line: u32 = chars.as_str().parse().map_err(|_| invalid())?;
        if line == 0 {
            return Err(invalid());
        }
        Ok(Self::new(line, side))
    }
}

/// Identity of a line in the unified view.
///
/// A deletion is addressed by its old line number even when word diff gave
/// it a new_lineno.
pub fn line_identity_for_diff_line(line: &DiffLine) -> Option<LineIdentity> {
    match line.line_type {
        LineType::Deletion => line.old_lineno.map(LineIdentity::left),
        _ => line.canonical_lineno().map(LineIdentity::right),
    }
}

/// Identity of a side-by-side row: the right side's new line wins
pub fn line_identity_for_paired_line(pair: &PairedLine<'_>) -> Option<LineIdentity> {
    pair.right
        .and_then(|line| line.new_lineno)
        .map(LineIdentity::right)
        .or_else(|| {
            pair.left
                .and_then(|line| line.old_lineno)
                .map(LineIdentity::left)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_displayed_form() {
        assert_eq!("L3".parse::<LineIdentity>().unwrap(), LineIdentity::left(3));
        assert_eq!("r12".parse::<LineIdentity>().unwrap(), LineIdentity::right(12));
        let roundtrip: LineIdentity = LineIdentity::left(7).to_string().parse().unwrap();
        assert_eq!(roundtrip, LineIdentity::left(7));
        for bad in ["", "X3", "L", "R0", "L-1", "R3x"] {
            assert!(bad.parse::<LineIdentity>().is_err(), "{bad}");
        }
    }

    #[test]
    fn should_ignore_new_lineno_on_deletion() {
        // given
        let mut line = DiffLine::deletion(7, "old");
        line.new_lineno = Some(8);

        // when
        let id = line_identity_for_diff_line(&line);

        // then
        assert_eq!(id, Some(LineIdentity::left(7)));
    }

    #[test]
    fn should_ignore_old_lineno_on_addition() {
        let mut line = DiffLine::addition(3, "new");
        line.old_lineno = Some(40);
        assert_eq!(line_identity_for_diff_line(&line), Some(LineIdentity::right(3)));
    }

    #[test]
    fn should_address_context_by_new_line() {
        let line = DiffLine::context(10, 12, "same");
        assert_eq!(
            line_identity_for_diff_line(&line),
            Some(LineIdentity::right(12))
        );
    }

    #[test]
    fn should_fall_back_to_old_line_for_eof_marker() {
        let marker = DiffLine {
            line_type: LineType::DelEofNewline,
            old_lineno: Some(5),
            new_lineno: None,
            tokens: Vec::new(),
        };
        assert_eq!(
            line_identity_for_diff_line(&marker),
            Some(LineIdentity::right(5))
        );
    }

    #[test]
    fn should_return_none_without_line_numbers() {
        let line = DiffLine {
            line_type: LineType::Addition,
            old_lineno: None,
            new_lineno: None,
            tokens: Vec::new(),
        };
        assert_eq!(line_identity_for_diff_line(&line), None);
    }

    #[test]
    fn should_prefer_right_side_for_pairs() {
        let del = DiffLine::deletion(4, "a");
        let add = DiffLine::addition(5, "b");
        let pair = PairedLine {
            left: Some(&del),
            right: Some(&add),
        };
        assert_eq!(
            line_identity_for_paired_line(&pair),
            Some(LineIdentity::right(5))
        );
    }

    #[test]
    fn should_use_left_side_when_right_missing() {
        let del = DiffLine::deletion(4, "a");
        let pair = PairedLine::left_only(&del);
        assert_eq!(
            line_identity_for_paired_line(&pair),
            Some(LineIdentity::left(4))
        );
    }

    #[test]
    fn should_return_none_for_empty_pair() {
        let pair = PairedLine {
            left: None,
            right: None,
        };
        assert_eq!(line_identity_for_paired_line(&pair), None);
    }

    #[test]
    fn should_serialize_side_in_uppercase() {
        let json = serde_json::to_string(&LineIdentity::left(3)).unwrap();
        assert_eq!(json, r#"{"line":3,"side":"LEFT"}"#);
    }

    #[test]
    fn should_compare_identities_structurally() {
        assert_eq!(LineIdentity::right(2), LineIdentity::new(2, LineSide::Right));
        assert_ne!(LineIdentity::right(2), LineIdentity::left(2));
    }
}
