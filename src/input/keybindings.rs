use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::navigation::{Boundary, HunkDirection, LineModeAction};

/// Map a key press in line mode to its action, `None` for unbound keys
pub fn map_key_to_action(key: KeyEvent) -> Option<LineModeAction> {
    let action = match (key.code, key.modifiers) {
        (KeyCode::Char('j') | KeyCode::Down, KeyModifiers::NONE) => LineModeAction::Move(1),
        (KeyCode::Char('k') | KeyCode::Up, KeyModifiers::NONE) => LineModeAction::Move(-1),
        (KeyCode::Char('g') | KeyCode::Home, KeyModifiers::NONE) => {
            LineModeAction::MoveToBoundary(Boundary::First)
        }
        // Shift is implicit in the character
        (KeyCode::Char('G'), _) | (KeyCode::End, KeyModifiers::NONE) => {
            LineModeAction::MoveToBoundary(Boundary::Last)
        }
        (KeyCode::Char(']'), _) => LineModeAction::MoveToAdjacentHunk(HunkDirection::Next),
        (KeyCode::Char('['), _) => LineModeAction::MoveToAdjacentHunk(HunkDirection::Prev),

        (KeyCode::Char('v'), KeyModifiers::NONE) => LineModeAction::ToggleSelection,
        (KeyCode::Char('r'), KeyModifiers::NONE) => LineModeAction::MarkRegion,
        (KeyCode::Char('c'), KeyModifiers::NONE) => LineModeAction::Comment,

        (KeyCode::Esc | KeyCode::Char('q'), KeyModifiers::NONE) => LineModeAction::Exit,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn should_map_vertical_movement() {
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('j'))),
            Some(LineModeAction::Move(1))
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Down)),
            Some(LineModeAction::Move(1))
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('k'))),
            Some(LineModeAction::Move(-1))
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Up)),
            Some(LineModeAction::Move(-1))
        );
    }

    #[test]
    fn should_map_boundaries_with_implicit_shift() {
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('g'))),
            Some(LineModeAction::MoveToBoundary(Boundary::First))
        );
        assert_eq!(
            map_key_to_action(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Some(LineModeAction::MoveToBoundary(Boundary::Last))
        );
    }

    #[test]
    fn should_map_hunk_jumps() {
        assert_eq!(
            map_key_to_action(key(KeyCode::Char(']'))),
            Some(LineModeAction::MoveToAdjacentHunk(HunkDirection::Next))
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('['))),
            Some(LineModeAction::MoveToAdjacentHunk(HunkDirection::Prev))
        );
    }

    #[test]
    fn should_map_review_actions_and_exit() {
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('v'))),
            Some(LineModeAction::ToggleSelection)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('r'))),
            Some(LineModeAction::MarkRegion)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('c'))),
            Some(LineModeAction::Comment)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Esc)),
            Some(LineModeAction::Exit)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('q'))),
            Some(LineModeAction::Exit)
        );
    }

    #[test]
    fn should_ignore_unbound_and_modified_keys() {
        assert_eq!(map_key_to_action(key(KeyCode::Char('x'))), None);
        assert_eq!(
            map_key_to_action(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL)),
            None
        );
    }
}
