#![forbid(unsafe_code)]

//! Keeps PlantUML text and a structured GUI model in agreement.
//!
//! The engine is single-threaded and timer-free: time comes from an injected [`Clock`] and the
//! host drives debounced work by calling [`SyncEngine::poll`]. Everything the engine touches in
//! the outside world goes through the [`SyncHost`] trait.

pub mod clock;
pub mod codegen;
pub mod config;
pub mod convert;
pub mod cursor;
pub mod diff;
pub mod engine;
pub mod error;
pub mod export;
pub mod host;
pub mod metrics;
pub mod model;

pub use clock::{Clock, ManualClock, PendingTask, SystemClock, TaskHandle};
pub use codegen::generate;
pub use config::SyncConfig;
pub use convert::{Projection, document_to_gui};
pub use cursor::CursorState;
pub use diff::{CodeDiff, GuiDiff};
pub use engine::{
    DiagramParser, ParseFailure, SkipReason, SyncEngine, SyncOutcome, SyncState, SyncStatus,
};
pub use error::{Result, SyncError};
pub use export::{ExportDocument, ExportMetadata};
pub use host::{HostError, Notification, SyncEvent, SyncHost};
pub use metrics::{MetricsReport, SyncMetrics};
pub use model::{Action, EditorMode, GuiState, SyncDirection};

#[cfg(test)]
mod tests;
