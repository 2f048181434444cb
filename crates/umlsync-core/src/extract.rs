//! Line-oriented regex extraction of actors and messages.
//!
//! This is deliberately independent of the grammar in [`crate::sequence`]: it is what callers
//! fall back to when a structured parse fails or takes too long, so it only needs to be robust,
//! not precise. Anything that is not an `actor "Name"` declaration or an `A -> B : text` line is
//! ignored.

use indexmap::IndexSet;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::sequence::{Diagram, Document, ParticipantKind, Span, Statement};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedMessage {
    pub from: String,
    pub to: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extracted {
    /// Declared actors and message endpoints, in first-seen order.
    pub actors: IndexSet<String>,
    pub messages: Vec<ExtractedMessage>,
    /// `as` aliases of declared actors, alias to display name.
    #[serde(skip)]
    pub aliases: FxHashMap<String, String>,
}

fn actor_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"actor\s+"([^"]+)"(?:\s+as\s+(\w+))?"#).expect("valid regex"))
}

fn message_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+)\s*->\s*(\w+)\s*:\s*(.+)").expect("valid regex"))
}

pub fn extract(code: &str) -> Extracted {
    let mut out = Extracted::default();

    for line in code.lines() {
        if let Some(caps) = actor_regex().captures(line) {
            let name = caps[1].to_string();
            if let Some(alias) = caps.get(2) {
                out.aliases.insert(alias.as_str().to_string(), name.clone());
            }
            out.actors.insert(name);
            continue;
        }

        if let Some(caps) = message_regex().captures(line) {
            let from = out.resolve(&caps[1]);
            let to = out.resolve(&caps[2]);
            out.actors.insert(from.clone());
            out.actors.insert(to.clone());
            out.messages.push(ExtractedMessage {
                from,
                to,
                text: caps[3].trim().to_string(),
            });
        }
    }

    tracing::debug!(
        actors = out.actors.len(),
        messages = out.messages.len(),
        "fallback extraction finished"
    );
    out
}

impl Extracted {
    fn resolve(&self, endpoint: &str) -> String {
        self.aliases
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| endpoint.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty() && self.messages.is_empty()
    }

    /// The extraction as a single-diagram document: actor declarations first, then messages.
    pub fn to_document(&self) -> Document {
        let participants = self.actors.iter().map(|name| Statement::Participant {
            kind: ParticipantKind::Actor,
            name: name.clone(),
            alias: None,
            span: Span::default(),
        });
        let messages = self.messages.iter().map(|msg| Statement::Message {
            from: msg.from.clone(),
            to: msg.to.clone(),
            text: msg.text.clone(),
            arrow: "->".to_string(),
            is_async: false,
            is_return: false,
            span: Span::default(),
        });

        Document {
            diagrams: vec![Diagram {
                statements: participants.chain(messages).collect(),
                span: Span::default(),
                terminated: true,
            }],
            span: Span::default(),
        }
    }
}
