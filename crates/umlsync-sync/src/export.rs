use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codegen::generate;
use crate::convert::document_to_gui;
use crate::error::{Result, SyncError};
use crate::model::GuiState;

pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Plain JSON snapshot of a diagram: the condition blocks as GUI records plus the full
/// PlantUML text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub conditions: Vec<Value>,
    #[serde(rename = "plantUML")]
    pub plant_uml: String,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub condition_count: usize,
}

impl ExportDocument {
    pub fn from_state(state: &GuiState, exported_at: DateTime<Utc>) -> Result<Self> {
        let conditions = state
            .actions
            .iter()
            .filter(|a| a.is_condition())
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            metadata: ExportMetadata {
                version: EXPORT_FORMAT_VERSION.to_string(),
                exported_at,
                condition_count: conditions.len(),
            },
            conditions,
            plant_uml: generate(state),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Rebuilds GUI state from the `plantUML` text. The `conditions` array is informational;
    /// the text is the source of truth.
    pub fn import(&self) -> Result<GuiState> {
        let outcome = umlsync_core::parse_source(&self.plant_uml);
        let Some(document) = outcome.document else {
            return Err(SyncError::Import {
                message: outcome
                    .errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "no document".to_string()),
            });
        };
        if let Some(first) = outcome.errors.first() {
            tracing::warn!(
                errors = outcome.errors.len(),
                first = %first,
                "imported PlantUML has diagnostics"
            );
        }
        Ok(document_to_gui(&document).apply_to(GuiState::default()))
    }
}
