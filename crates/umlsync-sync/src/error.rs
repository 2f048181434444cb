use std::any::Any;

use crate::host::HostError;
use crate::model::SyncDirection;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("{direction} sync failed in host: {source}")]
    Host {
        direction: SyncDirection,
        #[source]
        source: HostError,
    },

    #[error("{direction} sync panicked: {message}")]
    Panic {
        direction: SyncDirection,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Import failed: {message}")]
    Import { message: String },
}

impl SyncError {
    pub(crate) fn host(direction: SyncDirection) -> impl FnOnce(HostError) -> Self {
        move |source| Self::Host { direction, source }
    }

    pub(crate) fn panic(direction: SyncDirection, payload: &(dyn Any + Send)) -> Self {
        Self::Panic {
            direction,
            message: panic_message(payload),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
