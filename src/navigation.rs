//! Line mode: keyboard-driven cursor, selection, marking and commenting for
//! one open file.
//!
//! The state is a small value owned by the caller. Every transition
//! recomputes the navigable lines from the current elements, so expanding a
//! gap between two keystrokes needs no bookkeeping here.

use crate::diff::{DiffViewMode, document_rows, resolve_selection_to_region};
use crate::model::{CommentTarget, DiffElement, LineIdentity, Region};

/// Where line-mode side effects go. Implementations may hand the work to
/// something asynchronous; the state machine never waits on them.
pub trait ReviewSink {
    /// Mark a region of a hunk as reviewed
    fn mark_region(&mut self, region: Region);

    /// Whether comment forms can be opened at all. Sinks that handle
    /// `create_comment` must opt in here.
    fn comments_enabled(&self) -> bool {
        false
    }

    /// Open a comment form for `target`
    fn create_comment(&mut self, _target: CommentTarget) {}

    /// Line mode was left
    fn exit(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Anchored(LineIdentity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkDirection {
    Next,
    Prev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineModeAction {
    Move(isize),
    MoveToBoundary(Boundary),
    MoveToAdjacentHunk(HunkDirection),
    ToggleSelection,
    MarkRegion,
    Comment,
    Exit,
}

/// What a transition did, so the caller knows what to redraw or scroll to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineModeOutcome {
    Unchanged,
    Moved(LineIdentity),
    SelectionChanged,
    Marked(Region),
    CommentOpened(CommentTarget),
    /// The state must be dropped
    Exited,
}

/// A line the cursor can rest on, with the ordinal of its hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigableLine {
    pub identity: LineIdentity,
    pub hunk_idx: usize,
}

/// All lines with an identity, in document order
pub fn navigable_lines(elements: &[DiffElement], mode: DiffViewMode) -> Vec<NavigableLine> {
    document_rows(elements, mode)
        .into_iter()
        .filter_map(|(hunk_idx, row)| {
            row.identity()
                .map(|identity| NavigableLine { identity, hunk_idx })
        })
        .collect()
}

fn index_of(lines: &[NavigableLine], identity: LineIdentity) -> Option<usize> {
    lines.iter().position(|l| l.identity == identity)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineModeState {
    pub cursor: LineIdentity,
    pub selection: Selection,
}

impl LineModeState {
    /// Enter line mode with the cursor on the first navigable line.
    /// Returns `None` when the file has nothing to navigate.
    pub fn enter(elements: &[DiffElement], mode: DiffViewMode) -> Option<Self> {
        let first = navigable_lines(elements, mode).first()?.identity;
        Some(Self {
            cursor: first,
            selection: Selection::Idle,
        })
    }

    pub fn anchor(&self) -> Option<LineIdentity> {
        match self.selection {
            Selection::Idle => None,
            Selection::Anchored(anchor) => Some(anchor),
        }
    }

    pub fn apply(
        &mut self,
        action: LineModeAction,
        elements: &[DiffElement],
        mode: DiffViewMode,
        sink: &mut dyn ReviewSink,
    ) -> LineModeOutcome {
        if action == LineModeAction::Exit {
            self.selection = Selection::Idle;
            sink.exit();
            return LineModeOutcome::Exited;
        }

        let lines = navigable_lines(elements, mode);
        let previous = self.cursor;
        let Some(cursor_idx) = self.clamp_cursor(&lines) else {
            return LineModeOutcome::Unchanged;
        };

        let outcome = match action {
            LineModeAction::Move(delta) => {
                let last = lines.len() as isize - 1;
                let target = (cursor_idx as isize).saturating_add(delta).clamp(0, last) as usize;
                self.move_to(&lines, cursor_idx, target)
            }
            LineModeAction::MoveToBoundary(Boundary::First) => self.move_to(&lines, cursor_idx, 0),
            LineModeAction::MoveToBoundary(Boundary::Last) => {
                self.move_to(&lines, cursor_idx, lines.len() - 1)
            }
            LineModeAction::MoveToAdjacentHunk(direction) => {
                match adjacent_hunk_start(&lines, cursor_idx, direction) {
                    Some(target) => self.move_to(&lines, cursor_idx, target),
                    None => LineModeOutcome::Unchanged,
                }
            }
            LineModeAction::ToggleSelection => {
                self.selection = match self.selection {
                    Selection::Idle => Selection::Anchored(self.cursor),
                    Selection::Anchored(_) => Selection::Idle,
                };
                LineModeOutcome::SelectionChanged
            }
            LineModeAction::MarkRegion => self.mark_region(&lines, elements, mode, sink),
            LineModeAction::Comment => self.comment(sink),
            LineModeAction::Exit => LineModeOutcome::Exited,
        };

        // A clamped cursor has moved even if the action itself did nothing
        match outcome {
            LineModeOutcome::Unchanged if self.cursor != previous => {
                LineModeOutcome::Moved(self.cursor)
            }
            outcome => outcome,
        }
    }

    /// Whether `identity` lies inside the active selection
    pub fn is_selected(
        &self,
        identity: LineIdentity,
        elements: &[DiffElement],
        mode: DiffViewMode,
    ) -> bool {
        let Selection::Anchored(anchor) = self.selection else {
            return false;
        };
        let lines = navigable_lines(elements, mode);
        let (Some(a), Some(c), Some(i)) = (
            index_of(&lines, anchor),
            index_of(&lines, self.cursor),
            index_of(&lines, identity),
        ) else {
            return false;
        };
        (a.min(c)..=a.max(c)).contains(&i)
    }

    /// Index of the cursor, moving it to the first line if its identity is
    /// gone. `None` when there are no lines at all.
    fn clamp_cursor(&mut self, lines: &[NavigableLine]) -> Option<usize> {
        if let Some(idx) = index_of(lines, self.cursor) {
            return Some(idx);
        }
        let first = lines.first()?;
        log::debug!(
            "line mode cursor {} no longer exists, moving to {}",
            self.cursor,
            first.identity
        );
        self.cursor = first.identity;
        Some(0)
    }

    fn move_to(&mut self, lines: &[NavigableLine], from: usize, to: usize) -> LineModeOutcome {
        if from == to {
            return LineModeOutcome::Unchanged;
        }
        self.cursor = lines[to].identity;
        LineModeOutcome::Moved(self.cursor)
    }

    fn mark_region(
        &mut self,
        lines: &[NavigableLine],
        elements: &[DiffElement],
        mode: DiffViewMode,
        sink: &mut dyn ReviewSink,
    ) -> LineModeOutcome {
        let anchor = self.anchor().unwrap_or(self.cursor);
        let region = resolve_selection_to_region(anchor, self.cursor, elements, mode);
        if let Some(region) = region {
            sink.mark_region(region);
        }

        if let Selection::Anchored(anchor) = self.selection {
            self.selection = Selection::Idle;
            if let (Some(a), Some(c)) = (index_of(lines, anchor), index_of(lines, self.cursor))
                && a < c
            {
                self.cursor = anchor;
            }
        }

        match region {
            Some(region) => LineModeOutcome::Marked(region),
            None => LineModeOutcome::SelectionChanged,
        }
    }

    fn comment(&mut self, sink: &mut dyn ReviewSink) -> LineModeOutcome {
        if !sink.comments_enabled() {
            return LineModeOutcome::Unchanged;
        }
        let target = match self.selection {
            Selection::Anchored(anchor)
                if anchor.side == self.cursor.side && anchor.line != self.cursor.line =>
            {
                CommentTarget::ranged(self.cursor.side, anchor.line, self.cursor.line)
            }
            _ => CommentTarget::single(self.cursor),
        };
        self.selection = Selection::Idle;
        sink.create_comment(target);
        LineModeOutcome::CommentOpened(target)
    }
}

fn adjacent_hunk_start(
    lines: &[NavigableLine],
    cursor_idx: usize,
    direction: HunkDirection,
) -> Option<usize> {
    let hunk = lines[cursor_idx].hunk_idx;
    match direction {
        HunkDirection::Next => lines.iter().position(|l| l.hunk_idx > hunk),
        HunkDirection::Prev => {
            let own_start = lines.iter().position(|l| l.hunk_idx == hunk)?;
            if own_start != cursor_idx {
                return Some(own_start);
            }
            let prev_hunk = lines[..own_start].last()?.hunk_idx;
            lines.iter().position(|l| l.hunk_idx == prev_hunk)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::build_diff_elements;
    use crate::diff::test_support::hunk;
    use crate::model::{DiffLine, LineSide};

    #[derive(Default)]
    struct RecordingSink {
        regions: Vec<Region>,
        comments: Vec<CommentTarget>,
        exits: usize,
        comments_disabled: bool,
    }

    impl ReviewSink for RecordingSink {
        fn mark_region(&mut self, region: Region) {
            self.regions.push(region);
        }

        fn comments_enabled(&self) -> bool {
            !self.comments_disabled
        }

        fn create_comment(&mut self, target: CommentTarget) {
            self.comments.push(target);
        }

        fn exit(&mut self) {
            self.exits += 1;
        }
    }

    /// Two hunks: 1..=4 with a replaced line, and 10..=11 with an addition
    fn elements() -> Vec<DiffElement> {
        build_diff_elements(
            &[
                hunk(vec![
                    DiffLine::context(1, 1, "a"),
                    DiffLine::deletion(2, "b"),
                    DiffLine::addition(2, "B"),
                    DiffLine::context(3, 3, "c"),
                ]),
                hunk(vec![
                    DiffLine::context(9, 9, "x"),
                    DiffLine::addition(10, "y"),
                ]),
            ],
            20,
        )
    }

    fn state_at(cursor: LineIdentity) -> LineModeState {
        LineModeState {
            cursor,
            selection: Selection::Idle,
        }
    }

    fn apply(
        state: &mut LineModeState,
        action: LineModeAction,
        sink: &mut RecordingSink,
    ) -> LineModeOutcome {
        state.apply(action, &elements(), DiffViewMode::Unified, sink)
    }

    #[test]
    fn should_enter_on_first_navigable_line() {
        let state = LineModeState::enter(&elements(), DiffViewMode::Unified).unwrap();
        assert_eq!(state.cursor, LineIdentity::right(1));
        assert_eq!(state.selection, Selection::Idle);
        assert_eq!(LineModeState::enter(&[], DiffViewMode::Unified), None);
    }

    #[test]
    fn should_move_by_delta_and_clamp() {
        let mut sink = RecordingSink::default();
        let mut state = state_at(LineIdentity::right(1));

        assert_eq!(
            apply(&mut state, LineModeAction::Move(1), &mut sink),
            LineModeOutcome::Moved(LineIdentity::left(2))
        );
        apply(&mut state, LineModeAction::Move(100), &mut sink);
        assert_eq!(state.cursor, LineIdentity::right(10));
        apply(&mut state, LineModeAction::Move(-100), &mut sink);
        assert_eq!(state.cursor, LineIdentity::right(1));
    }

    #[test]
    fn should_not_move_past_boundaries() {
        let mut sink = RecordingSink::default();

        let mut first = state_at(LineIdentity::right(1));
        assert_eq!(
            apply(&mut first, LineModeAction::Move(-1), &mut sink),
            LineModeOutcome::Unchanged
        );

        let mut last = state_at(LineIdentity::right(10));
        assert_eq!(
            apply(&mut last, LineModeAction::Move(1), &mut sink),
            LineModeOutcome::Unchanged
        );
        assert_eq!(last.cursor, LineIdentity::right(10));
    }

    #[test]
    fn should_jump_to_boundaries() {
        let mut sink = RecordingSink::default();
        let mut state = state_at(LineIdentity::left(2));

        apply(&mut state, LineModeAction::MoveToBoundary(Boundary::Last), &mut sink);
        assert_eq!(state.cursor, LineIdentity::right(10));
        apply(&mut state, LineModeAction::MoveToBoundary(Boundary::First), &mut sink);
        assert_eq!(state.cursor, LineIdentity::right(1));
    }

    #[test]
    fn should_jump_to_next_hunk_and_stop_at_last() {
        let mut sink = RecordingSink::default();
        let mut state = state_at(LineIdentity::left(2));

        apply(&mut state, LineModeAction::MoveToAdjacentHunk(HunkDirection::Next), &mut sink);
        assert_eq!(state.cursor, LineIdentity::right(9));
        assert_eq!(
            apply(&mut state, LineModeAction::MoveToAdjacentHunk(HunkDirection::Next), &mut sink),
            LineModeOutcome::Unchanged
        );
    }

    #[test]
    fn should_jump_to_own_hunk_start_before_previous_hunk() {
        let mut sink = RecordingSink::default();
        let mut state = state_at(LineIdentity::right(10));
        let prev = LineModeAction::MoveToAdjacentHunk(HunkDirection::Prev);

        apply(&mut state, prev, &mut sink);
        assert_eq!(state.cursor, LineIdentity::right(9));
        apply(&mut state, prev, &mut sink);
        assert_eq!(state.cursor, LineIdentity::right(1));
        assert_eq!(apply(&mut state, prev, &mut sink), LineModeOutcome::Unchanged);
    }

    #[test]
    fn should_toggle_selection_without_moving_cursor() {
        let mut sink = RecordingSink::default();
        let mut state = state_at(LineIdentity::left(2));

        apply(&mut state, LineModeAction::ToggleSelection, &mut sink);
        assert_eq!(state.selection, Selection::Anchored(LineIdentity::left(2)));
        apply(&mut state, LineModeAction::Move(1), &mut sink);
        apply(&mut state, LineModeAction::ToggleSelection, &mut sink);
        assert_eq!(state.selection, Selection::Idle);
        assert_eq!(state.cursor, LineIdentity::right(2));
    }

    #[test]
    fn should_mark_cursor_line_region() {
        let mut sink = RecordingSink::default();
        let mut state = state_at(LineIdentity::left(2));

        let outcome = apply(&mut state, LineModeAction::MarkRegion, &mut sink);

        assert_eq!(outcome, LineModeOutcome::Marked(Region::new(2, 1, 1, 0)));
        assert_eq!(sink.regions, vec![Region::new(2, 1, 1, 0)]);
    }

    #[test]
    fn should_not_mark_pure_context() {
        let mut sink = RecordingSink::default();
        let mut state = state_at(LineIdentity::right(1));

        apply(&mut state, LineModeAction::MarkRegion, &mut sink);

        assert!(sink.regions.is_empty());
    }

    #[test]
    fn should_collapse_selection_to_earliest_endpoint_after_mark() {
        // given: anchored on the first line, cursor on the addition below
        let mut sink = RecordingSink::default();
        let mut state = LineModeState {
            cursor: LineIdentity::right(2),
            selection: Selection::Anchored(LineIdentity::right(1)),
        };

        // when
        let outcome = apply(&mut state, LineModeAction::MarkRegion, &mut sink);

        // then
        assert_eq!(outcome, LineModeOutcome::Marked(Region::new(1, 2, 1, 2)));
        assert_eq!(state.selection, Selection::Idle);
        assert_eq!(state.cursor, LineIdentity::right(1));
    }

    #[test]
    fn should_open_ranged_comment_on_same_side() {
        let mut sink = RecordingSink::default();
        let mut state = LineModeState {
            cursor: LineIdentity::right(1),
            selection: Selection::Anchored(LineIdentity::right(3)),
        };

        let outcome = apply(&mut state, LineModeAction::Comment, &mut sink);

        let expected = CommentTarget::ranged(LineSide::Right, 1, 3);
        assert_eq!(outcome, LineModeOutcome::CommentOpened(expected));
        assert_eq!(sink.comments, vec![expected]);
        assert_eq!(state.selection, Selection::Idle);
    }

    #[test]
    fn should_open_single_comment_when_sides_differ() {
        let mut sink = RecordingSink::default();
        let mut state = LineModeState {
            cursor: LineIdentity::right(2),
            selection: Selection::Anchored(LineIdentity::left(2)),
        };

        apply(&mut state, LineModeAction::Comment, &mut sink);

        assert_eq!(sink.comments, vec![CommentTarget::single(LineIdentity::right(2))]);
    }

    #[test]
    fn should_ignore_comment_without_comment_support() {
        let mut sink = RecordingSink {
            comments_disabled: true,
            ..Default::default()
        };
        let mut state = state_at(LineIdentity::right(1));

        assert_eq!(
            apply(&mut state, LineModeAction::Comment, &mut sink),
            LineModeOutcome::Unchanged
        );
        assert!(sink.comments.is_empty());
    }

    #[test]
    fn should_not_open_comments_on_sink_without_opt_in() {
        // given: a sink that only marks regions
        struct MarkOnlySink {
            regions: Vec<Region>,
        }
        impl ReviewSink for MarkOnlySink {
            fn mark_region(&mut self, region: Region) {
                self.regions.push(region);
            }

            fn exit(&mut self) {}
        }
        let mut sink = MarkOnlySink {
            regions: Vec::new(),
        };
        let mut state = state_at(LineIdentity::right(2));
        state.selection = Selection::Anchored(LineIdentity::left(2));

        // when
        let outcome = state.apply(
            LineModeAction::Comment,
            &elements(),
            DiffViewMode::Unified,
            &mut sink,
        );

        // then
        assert_eq!(outcome, LineModeOutcome::Unchanged);
        assert_eq!(state.selection, Selection::Anchored(LineIdentity::left(2)));
        assert!(sink.regions.is_empty());
    }

    #[test]
    fn should_exit_and_notify_sink() {
        let mut sink = RecordingSink::default();
        let mut state = state_at(LineIdentity::right(1));

        assert_eq!(
            apply(&mut state, LineModeAction::Exit, &mut sink),
            LineModeOutcome::Exited
        );
        assert_eq!(sink.exits, 1);
    }

    #[test]
    fn should_clamp_vanished_cursor_to_first_line() {
        // given: a cursor on a line that is no longer part of the diff
        let mut sink = RecordingSink::default();
        let mut state = state_at(LineIdentity::right(15));

        // when
        let outcome = apply(&mut state, LineModeAction::Move(1), &mut sink);

        // then
        assert_eq!(outcome, LineModeOutcome::Moved(LineIdentity::left(2)));
    }

    #[test]
    fn should_report_move_when_clamp_lands_on_cursor_target() {
        // given: a vanished cursor and actions that would stay on the first line
        for action in [
            LineModeAction::Move(-1),
            LineModeAction::MoveToBoundary(Boundary::First),
            LineModeAction::MoveToAdjacentHunk(HunkDirection::Prev),
        ] {
            let mut sink = RecordingSink::default();
            let mut state = state_at(LineIdentity::right(40));

            // when
            let outcome = apply(&mut state, action, &mut sink);

            // then
            assert_eq!(
                outcome,
                LineModeOutcome::Moved(LineIdentity::right(1)),
                "{action:?}"
            );
            assert_eq!(state.cursor, LineIdentity::right(1));
        }
    }

    #[test]
    fn should_report_selected_lines_in_document_order() {
        let state = LineModeState {
            cursor: LineIdentity::right(3),
            selection: Selection::Anchored(LineIdentity::left(2)),
        };
        let elements = elements();

        assert!(state.is_selected(LineIdentity::right(2), &elements, DiffViewMode::Unified));
        assert!(state.is_selected(LineIdentity::left(2), &elements, DiffViewMode::Unified));
        assert!(!state.is_selected(LineIdentity::right(1), &elements, DiffViewMode::Unified));
        assert!(!state.is_selected(LineIdentity::right(9), &elements, DiffViewMode::Unified));
    }

    #[test]
    fn should_navigate_pairs_in_split_mode() {
        let mut sink = RecordingSink::default();
        let elements = elements();
        let mut state = LineModeState::enter(&elements, DiffViewMode::SideBySide).unwrap();

        state.apply(LineModeAction::Move(1), &elements, DiffViewMode::SideBySide, &mut sink);

        // the deletion and addition share one row, addressed by the right side
        assert_eq!(state.cursor, LineIdentity::right(2));
        let lines = navigable_lines(&elements, DiffViewMode::SideBySide);
        assert_eq!(lines.len(), 5);
    }
}
