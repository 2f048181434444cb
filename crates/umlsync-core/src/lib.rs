#![forbid(unsafe_code)]

//! PlantUML sequence-diagram parser (headless).
//!
//! Design goals:
//! - a permissive lexer and a recovering recursive-descent parser: malformed input yields a
//!   best-effort AST plus positioned diagnostics, never a hard failure
//! - one stable result object per parse (tokens, AST, merged diagnostics, statistics)
//! - a grammar-independent regex extractor for when structured parsing is not good enough

pub mod error;
pub mod extract;
pub mod preprocess;
pub mod sequence;

pub use error::{Diagnostic, DiagnosticKind, Error, Result};
pub use extract::{Extracted, ExtractedMessage, extract};
pub use preprocess::{DEFAULT_MAX_LINES, RepairResult, repair_source};
pub use sequence::{AstStatistics, Document, Statement, Token, TokenKind};

use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Everything produced by one parse of one source text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseOutcome {
    pub input: String,
    pub tokens: Vec<Token>,
    /// `None` only when the parser itself broke down.
    pub document: Option<Document>,
    /// Lexical diagnostics first, then syntax diagnostics.
    pub errors: Vec<Diagnostic>,
    pub statistics: Option<AstStatistics>,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// A document was produced and no diagnostics were raised.
    pub fn is_clean(&self) -> bool {
        self.document.is_some() && self.errors.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Lexes and parses `text` without keeping any state.
///
/// A panic inside the lexer or parser is caught here and reported as a single internal
/// diagnostic with no document.
pub fn parse_source(text: &str) -> ParseOutcome {
    match catch_unwind(AssertUnwindSafe(|| analyze(text))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(%detail, "parser panicked");
            ParseOutcome {
                input: text.to_string(),
                errors: vec![Diagnostic::internal(format!("Parser error: {detail}"))],
                ..ParseOutcome::default()
            }
        }
    }
}

fn analyze(text: &str) -> ParseOutcome {
    let lexed = sequence::tokenize(text);
    let parsed = sequence::parse(&lexed.tokens);

    let mut errors = lexed.errors;
    errors.extend(parsed.errors);

    let statistics = AstStatistics::compute(&parsed.document);
    tracing::debug!(
        tokens = lexed.tokens.len(),
        nodes = statistics.total_nodes,
        errors = errors.len(),
        "parsed sequence source"
    );

    ParseOutcome {
        input: text.to_string(),
        tokens: lexed.tokens,
        document: Some(parsed.document),
        errors,
        statistics: Some(statistics),
    }
}

/// Parse facade that keeps the most recent result for later inspection.
#[derive(Debug, Clone, Default)]
pub struct PlantUmlParser {
    last: Option<ParseOutcome>,
}

impl PlantUmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, text: &str) -> &ParseOutcome {
        self.last.insert(parse_source(text))
    }

    pub fn last_result(&self) -> Option<&ParseOutcome> {
        self.last.as_ref()
    }

    pub fn has_errors(&self) -> bool {
        self.last.as_ref().is_some_and(ParseOutcome::has_errors)
    }

    pub fn errors(&self) -> &[Diagnostic] {
        match &self.last {
            Some(outcome) => &outcome.errors,
            None => &[],
        }
    }

    pub fn statistics(&self) -> Option<&AstStatistics> {
        self.last.as_ref()?.statistics.as_ref()
    }

    pub fn to_json(&self) -> Result<String> {
        self.last.as_ref().ok_or(Error::NoParseResult)?.to_json()
    }
}

#[cfg(test)]
mod tests;
