//! Completion-state persistence collaborator.
//!
//! The engine persists exactly one thing: the id→completed mapping, and
//! only on explicit user toggle. Derived temporal/spatial state is never
//! written anywhere. Malformed or missing persisted content degrades to
//! the empty mapping; a broken store must never block rendering.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::Result;
use crate::error::TrackingError;
use crate::types::ActivityId;

/// Mapping persisted between sessions.
pub type CompletionState = HashMap<ActivityId, bool>;

/// Storage collaborator for the completion flags.
pub trait CompletionStore: Send + Sync {
    /// Load the persisted mapping. Implementations degrade malformed
    /// content to the empty mapping instead of failing.
    fn load(&self) -> Result<CompletionState>;

    /// Persist the mapping.
    fn save(&self, state: &CompletionState) -> Result<()>;
}

/// File-backed JSON store.
pub struct JsonCompletionStore {
    path: PathBuf,
}

impl JsonCompletionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CompletionStore for JsonCompletionStore {
    fn load(&self) -> Result<CompletionState> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CompletionState::new());
            }
            Err(e) => return Err(TrackingError::store(&self.path, e)),
        };

        match serde_json::from_str(&raw) {
            Ok(state) => Ok(state),
            Err(e) => {
                // Unexpected shape: fall back to defaults, never crash
                // activity rendering
                warn!(path = %self.path.display(), error = %e, "Malformed completion state, using defaults");
                Ok(CompletionState::new())
            }
        }
    }

    fn save(&self, state: &CompletionState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| TrackingError::parse("completion-state", e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| TrackingError::store(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCompletionStore::new(dir.path().join("completion.json"));

        let mut state = CompletionState::new();
        state.insert(ActivityId::new("duomo"), true);
        state.insert(ActivityId::new("lunch"), false);

        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCompletionStore::new(dir.path().join("nothing-here.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn garbage_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("completion.json");
        fs::write(&path, "{not json at all").unwrap();

        let store = JsonCompletionStore::new(path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn wrong_shape_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("completion.json");
        fs::write(&path, r#"[{"id": "duomo", "completed": true}]"#).unwrap();

        let store = JsonCompletionStore::new(path);
        assert!(store.load().unwrap().is_empty());
    }
}
