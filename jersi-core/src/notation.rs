//! Action notation
//!
//! `<src><sep><dst>[!]` for one sub-move, with a second `<sep><dst>[!]`
//! group for compound actions. `-` marks a cube move, `=` a stack move and
//! `!` a capture, e.g. `a1-a2!=b3`.

use crate::board::Geometry;
use crate::game::Action;

/// Failure to resolve a typed action name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("'{0}' is not a legal action here")]
    UnknownAction(String),
    #[error("no action name given")]
    Empty,
}

/// Render an action with its capture marks
pub fn action_name(geometry: &Geometry, action: &Action) -> String {
    let path = action.path();
    let mut name = String::with_capacity(10);
    name.push_str(geometry.name(path[0]));
    for (i, &dst) in path[1..].iter().enumerate() {
        name.push(if action.is_stack_move(i) { '=' } else { '-' });
        name.push_str(geometry.name(dst));
        if action.captured(i) {
            name.push('!');
        }
    }
    name
}

/// Strip capture marks, turning a full name into a simple one
pub fn simple_name(name: &str) -> String {
    name.chars().filter(|&c| c != '!').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;
    use crate::tables::Tables;

    #[test]
    fn test_names_follow_path() {
        let game = GameState::new(Tables::shared());
        for action in game.actions() {
            let name = game.action_name(action);
            assert_eq!(game.action_by_name(&name), Some(action));
            let separators = name.chars().filter(|c| *c == '-' || *c == '=').count();
            assert_eq!(separators, action.sub_move_count());
            // nothing is capturable from the opening
            assert!(!name.contains('!'));
        }
    }

    #[test]
    fn test_capture_marks() {
        let game = GameState::from_setup_text(Tables::shared(), "c3:WR d4:s a1:W g1:w").unwrap();
        let action = game.action_by_simple_name("c3=d4-e4").unwrap();
        assert_eq!(game.action_name(action), "c3=d4!-e4");
        assert_eq!(simple_name("c3-d4!=e4"), "c3-d4=e4");

        // a mark on the wrong sub-move still finds the action
        assert_eq!(game.find_action("c3=d4-e4!"), Some(action));
        assert_eq!(game.find_action("c3=d4-e4"), Some(action));
    }
}
