#![forbid(unsafe_code)]

//! `umlsync` parses PlantUML sequence diagrams and keeps them in step with a structured editor
//! model.
//!
//! # Features
//!
//! - `sync`: enable the two-way synchronization engine (`umlsync::sync`)

pub use umlsync_core::*;

#[cfg(feature = "sync")]
pub mod sync {
    pub use umlsync_sync::*;

    /// Parses `code` and projects it straight into a fresh GUI state.
    ///
    /// Returns `None` when the parser produced no document. Diagnostics do not prevent a
    /// projection; check [`crate::ParseOutcome::errors`] via [`crate::parse_source`] when they
    /// matter.
    pub fn gui_from_code(code: &str) -> Option<GuiState> {
        let outcome = umlsync_core::parse_source(code);
        let document = outcome.document?;
        Some(document_to_gui(&document).apply_to(GuiState::default()))
    }
}
