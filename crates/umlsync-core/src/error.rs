use crate::sequence::Token;
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No parse result available")]
    NoParseResult,

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Internal,
}

/// A positioned, non-fatal problem found while lexing or parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
    /// Byte offset into the source.
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
}

impl Diagnostic {
    pub fn lexical(
        message: impl Into<String>,
        line: usize,
        column: usize,
        position: usize,
    ) -> Self {
        Self {
            kind: DiagnosticKind::Lexical,
            message: message.into(),
            line,
            column,
            position,
            token: None,
        }
    }

    pub fn syntax(message: impl Into<String>, at: &Token) -> Self {
        Self {
            kind: DiagnosticKind::Syntax,
            message: message.into(),
            line: at.line,
            column: at.column,
            position: at.offset,
            token: Some(at.clone()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Internal,
            message: message.into(),
            line: 0,
            column: 0,
            position: 0,
            token: None,
        }
    }
}
