use serde::{Deserialize, Serialize};

use super::token::Token;

/// Source range of a node: 1-based start line/column plus byte offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn of(token: &Token) -> Self {
        Self {
            line: token.line,
            column: token.column,
            start: token.offset,
            end: token.end(),
        }
    }

    /// Extends this span so it ends where `other` ends.
    pub fn to(self, other: Span) -> Self {
        Self {
            end: other.end.max(self.end),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub diagrams: Vec<Diagram>,
    pub span: Span,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub statements: Vec<Statement>,
    pub span: Span,
    /// Whether the diagram was closed by `@enduml`.
    pub terminated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Participant,
    Actor,
    Boundary,
    Control,
    Entity,
    Database,
    Collections,
    Queue,
}

impl ParticipantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Actor => "actor",
            Self::Boundary => "boundary",
            Self::Control => "control",
            Self::Entity => "entity",
            Self::Database => "database",
            Self::Collections => "collections",
            Self::Queue => "queue",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteSide {
    Left,
    #[default]
    Right,
    Over,
}

impl NoteSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Over => "over",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub condition: String,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Statement {
    Participant {
        kind: ParticipantKind,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        span: Span,
    },
    #[serde(rename_all = "camelCase")]
    Message {
        from: String,
        to: String,
        text: String,
        arrow: String,
        is_async: bool,
        is_return: bool,
        span: Span,
    },
    /// The first branch is the implicit "if"; its condition equals `condition`.
    Alternative {
        condition: String,
        branches: Vec<Branch>,
        span: Span,
    },
    Loop {
        condition: String,
        statements: Vec<Statement>,
        span: Span,
    },
    Parallel {
        branches: Vec<Branch>,
        span: Span,
    },
    Optional {
        condition: String,
        statements: Vec<Statement>,
        span: Span,
    },
    Note {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        side: NoteSide,
        span: Span,
    },
    Activation {
        target: String,
        span: Span,
    },
    Deactivation {
        target: String,
        span: Span,
    },
    Title {
        text: String,
        span: Span,
    },
    Autonumber {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<u32>,
        span: Span,
    },
    Error {
        message: String,
        span: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Document,
    Diagram,
    Participant,
    Message,
    Alternative,
    Branch,
    Loop,
    Parallel,
    Optional,
    Note,
    Activation,
    Deactivation,
    Title,
    Autonumber,
    Error,
}

impl NodeKind {
    pub fn is_control_structure(self) -> bool {
        matches!(
            self,
            Self::Alternative | Self::Loop | Self::Parallel | Self::Optional
        )
    }
}

impl Statement {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Participant { .. } => NodeKind::Participant,
            Self::Message { .. } => NodeKind::Message,
            Self::Alternative { .. } => NodeKind::Alternative,
            Self::Loop { .. } => NodeKind::Loop,
            Self::Parallel { .. } => NodeKind::Parallel,
            Self::Optional { .. } => NodeKind::Optional,
            Self::Note { .. } => NodeKind::Note,
            Self::Activation { .. } => NodeKind::Activation,
            Self::Deactivation { .. } => NodeKind::Deactivation,
            Self::Title { .. } => NodeKind::Title,
            Self::Autonumber { .. } => NodeKind::Autonumber,
            Self::Error { .. } => NodeKind::Error,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Participant { span, .. }
            | Self::Message { span, .. }
            | Self::Alternative { span, .. }
            | Self::Loop { span, .. }
            | Self::Parallel { span, .. }
            | Self::Optional { span, .. }
            | Self::Note { span, .. }
            | Self::Activation { span, .. }
            | Self::Deactivation { span, .. }
            | Self::Title { span, .. }
            | Self::Autonumber { span, .. }
            | Self::Error { span, .. } => *span,
        }
    }

    fn walk(&self, visit: &mut dyn FnMut(NodeKind, Option<&Statement>)) {
        visit(self.kind(), Some(self));
        match self {
            Self::Alternative { branches, .. } | Self::Parallel { branches, .. } => {
                for branch in branches {
                    visit(NodeKind::Branch, None);
                    for stmt in &branch.statements {
                        stmt.walk(visit);
                    }
                }
            }
            Self::Loop { statements, .. } | Self::Optional { statements, .. } => {
                for stmt in statements {
                    stmt.walk(visit);
                }
            }
            _ => {}
        }
    }
}

impl Document {
    /// Depth-first pre-order visit of every node. `Document`, `Diagram` and `Branch` nodes are
    /// reported without a statement.
    pub fn walk(&self, mut visit: impl FnMut(NodeKind, Option<&Statement>)) {
        visit(NodeKind::Document, None);
        for diagram in &self.diagrams {
            visit(NodeKind::Diagram, None);
            for stmt in &diagram.statements {
                stmt.walk(&mut visit);
            }
        }
    }

    /// Top-level statements of every diagram, in document order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.diagrams.iter().flat_map(|d| d.statements.iter())
    }
}
