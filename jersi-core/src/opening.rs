//! Opening book
//!
//! Root search results for the standard starting position, one file per
//! depth (`openings-depth-<d>.txt`), one `<action name> <value>` line per
//! best action. A missing or unreadable book is a cache miss; failing to
//! write one only costs the next search its shortcut.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::game::{Action, GameState};

/// Directory holding the per-depth opening files
#[derive(Clone, Debug)]
pub struct OpeningBook {
    dir: PathBuf,
}

impl OpeningBook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the results of a search at `depth`
    pub fn path(&self, depth: u32) -> PathBuf {
        self.dir.join(format!("openings-depth-{}.txt", depth))
    }

    /// Best root actions and their value, if a usable book exists
    pub fn load(&self, state: &GameState, depth: u32) -> Option<Vec<(Action, f32)>> {
        let path = self.path(depth);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no opening book");
                return None;
            }
        };

        let mut entries = Vec::new();
        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            let parsed = line.split_once(' ').and_then(|(name, value)| {
                let action = state.action_by_name(name.trim())?;
                let value = value.trim().parse::<f32>().ok()?;
                Some((action.clone(), value))
            });
            match parsed {
                Some(entry) => entries.push(entry),
                None => {
                    tracing::warn!(path = %path.display(), line, "ignoring opening book with bad line");
                    return None;
                }
            }
        }

        if entries.is_empty() {
            return None;
        }
        tracing::debug!(path = %path.display(), count = entries.len(), "opening book hit");
        Some(entries)
    }

    /// Persist best root actions; failures are logged and otherwise ignored
    pub fn store(&self, state: &GameState, depth: u32, entries: &[(Action, f32)]) {
        let path = self.path(depth);
        let mut content = String::new();
        for (action, value) in entries {
            let _ = writeln!(content, "{} {}", state.action_name(action), value);
        }

        let written = std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(&path, content));
        match written {
            Ok(()) => tracing::debug!(path = %path.display(), count = entries.len(), "opening book written"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to write opening book"),
        }
    }
}
