use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncDirection {
    CodeToGui,
    GuiToCode,
}

impl SyncDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CodeToGui => "code-to-gui",
            Self::GuiToCode => "gui-to-code",
        }
    }
}

impl std::fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    #[default]
    Gui,
    Code,
    Split,
}

/// One step of the diagram as the GUI editors see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Message {
        from: String,
        to: String,
        message: String,
    },
    Activation {
        actor: String,
    },
    Deactivation {
        actor: String,
    },
    /// `position` is PlantUML placement text such as `right`, `left of A` or `over A, B`.
    Note {
        position: String,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Alt {
        condition: String,
        true_branch: Vec<Action>,
        #[serde(default)]
        false_branch: Vec<Action>,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        else_condition: String,
    },
    Loop {
        condition: String,
        actions: Vec<Action>,
    },
    Par {
        branches: Vec<Vec<Action>>,
    },
    Opt {
        condition: String,
        actions: Vec<Action>,
    },
}

impl Action {
    pub fn message(
        from: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::Message {
            from: from.into(),
            to: to.into(),
            message: text.into(),
        }
    }

    /// Control-flow actions, the ones the condition editor owns.
    pub fn is_condition(&self) -> bool {
        matches!(self, Self::Alt { .. } | Self::Loop { .. } | Self::Par { .. } | Self::Opt { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuiState {
    pub selected_actors: IndexSet<String>,
    pub actions: Vec<Action>,
    pub current_mode: EditorMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl GuiState {
    pub fn is_empty(&self) -> bool {
        self.selected_actors.is_empty() && self.actions.is_empty() && self.title.is_none()
    }
}
