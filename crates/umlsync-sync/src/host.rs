use serde::{Deserialize, Serialize};

use crate::cursor::CursorState;
use crate::model::GuiState;

/// A failure reported by the host while the engine was reading or writing its state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Events the host forwards to [`crate::SyncEngine::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncEvent {
    TextInput,
    TextBlur,
    ActorSelectionChanged,
    ActionChanged,
    ActionAdded,
    ActionRemoved,
    ActionReordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
    /// Too many failures in a row; nothing syncs until `resume`.
    SyncPaused { errors: u32 },
    SyncResumed,
}

/// The editor the engine keeps in sync: a text surface plus the GUI model.
pub trait SyncHost {
    fn code(&self) -> String;

    fn set_code(&mut self, code: &str) -> Result<(), HostError>;

    fn cursor(&self) -> CursorState;

    fn set_cursor(&mut self, cursor: CursorState);

    fn gui_state(&self) -> GuiState;

    /// Replaces the GUI actors, actions and title with `state`.
    fn apply_projection(&mut self, state: &GuiState) -> Result<(), HostError>;

    fn refresh_ui(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn notify(&mut self, _notification: Notification) {}

    /// Events the host raised while the engine was writing to it.
    fn drain_events(&mut self) -> Vec<SyncEvent> {
        Vec::new()
    }
}
