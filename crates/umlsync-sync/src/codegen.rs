//! GUI state to PlantUML text.
//!
//! Works directly on the action list rather than going through the AST. Actors are declared as
//! `actor "Name" as Alias` and every reference uses the alias, so the output always re-parses to
//! the same GUI state. Free text is made inert on the way out: quotes become apostrophes and
//! anything the lexer would read as a comment opener is broken up.

use rustc_hash::{FxHashMap, FxHashSet};
use umlsync_core::sequence::{is_ident_char, is_ident_start, keyword};

use crate::model::{Action, GuiState};

const INDENT: &str = "  ";

pub fn generate(state: &GuiState) -> String {
    let mut generator = Generator::default();
    generator.document(state);
    generator.out
}

#[derive(Default)]
struct Generator {
    out: String,
    aliases: FxHashMap<String, String>,
    used: FxHashSet<String>,
}

impl Generator {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn document(&mut self, state: &GuiState) {
        self.line(0, "@startuml");
        let title = state.title.as_deref().map(inert_text).unwrap_or_default();
        if !title.is_empty() {
            self.line(0, &format!("title {title}"));
        }

        for name in &state.selected_actors {
            let alias = self.alias(name);
            let display = single_line(name).replace('"', "'");
            self.line(0, &format!("actor \"{display}\" as {alias}"));
        }
        if !state.selected_actors.is_empty() && !state.actions.is_empty() {
            self.out.push('\n');
        }

        self.actions(&state.actions, 0);
        self.out.push_str("@enduml");
    }

    /// Stable identifier for `name`, unique within this document.
    fn alias(&mut self, name: &str) -> String {
        if let Some(alias) = self.aliases.get(name) {
            return alias.clone();
        }

        let mut base: String = name
            .trim()
            .chars()
            .map(|c| if is_ident_char(c) { c } else { '_' })
            .collect();
        if !base.chars().next().is_some_and(is_ident_start) {
            base.insert(0, '_');
        }
        if keyword(&base.to_ascii_lowercase()).is_some() {
            base.push('_');
        }

        let mut alias = base.clone();
        let mut n = 2;
        while self.used.contains(&alias) {
            alias = format!("{base}_{n}");
            n += 1;
        }
        self.used.insert(alias.clone());
        self.aliases.insert(name.to_string(), alias.clone());
        alias
    }

    fn actions(&mut self, actions: &[Action], depth: usize) {
        for action in actions {
            self.action(action, depth);
        }
    }

    fn action(&mut self, action: &Action, depth: usize) {
        match action {
            Action::Message { from, to, message } => {
                let (from, to) = (self.alias(from), self.alias(to));
                let message = inert_text(message);
                if message.is_empty() {
                    self.line(depth, &format!("{from} -> {to}"));
                } else {
                    self.line(depth, &format!("{from} -> {to} : {message}"));
                }
            }
            Action::Activation { actor } => {
                let actor = self.alias(actor);
                self.line(depth, &format!("activate {actor}"));
            }
            Action::Deactivation { actor } => {
                let actor = self.alias(actor);
                self.line(depth, &format!("deactivate {actor}"));
            }
            Action::Note { position, text } => self.note(position, text, depth),
            Action::Alt {
                condition,
                true_branch,
                false_branch,
                else_condition,
            } => self.alt(condition, true_branch, false_branch, else_condition, depth),
            Action::Loop { condition, actions } => {
                self.line(depth, &keyword_line("loop", condition));
                self.actions(actions, depth + 1);
                self.line(depth, "end");
            }
            Action::Opt { condition, actions } => {
                self.line(depth, &keyword_line("opt", condition));
                self.actions(actions, depth + 1);
                self.line(depth, "end");
            }
            Action::Par { branches } => {
                self.line(depth, "par");
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        self.line(depth, "else");
                    }
                    self.actions(branch, depth + 1);
                }
                self.line(depth, "end");
            }
        }
    }

    fn note(&mut self, position: &str, text: &str, depth: usize) {
        let position = self.note_position(position);
        let head = if position.is_empty() {
            "note".to_string()
        } else {
            format!("note {position}")
        };

        if text.contains('\n') {
            self.line(depth, &head);
            for line in text.lines() {
                self.line(depth + 1, &note_line(line));
            }
            self.line(depth, "end note");
        } else {
            self.line(depth, &format!("{head} : {}", inert_text(text)));
        }
    }

    fn note_position(&mut self, position: &str) -> String {
        let position = position.trim();
        let lower = position.to_ascii_lowercase();
        for prefix in ["left of ", "right of ", "over "] {
            if lower.starts_with(prefix) {
                let targets: Vec<String> = position[prefix.len()..]
                    .split(',')
                    .map(|t| self.alias(t.trim()))
                    .collect();
                return format!("{prefix}{}", targets.join(", "));
            }
        }
        lower
    }

    /// An unlabelled `else` holding nothing but another alt is written as a chained `else`,
    /// which is how multi-branch alternatives are projected. The inner alt must carry a branch
    /// of its own after that; otherwise re-parsing would fold it into a two-branch alt, so it
    /// is nested instead.
    fn alt(
        &mut self,
        condition: &str,
        true_branch: &[Action],
        false_branch: &[Action],
        else_condition: &str,
        depth: usize,
    ) {
        self.line(depth, &keyword_line("alt", condition));
        self.actions(true_branch, depth + 1);

        let (mut false_branch, mut else_condition) = (false_branch, else_condition);
        loop {
            match false_branch {
                [
                    Action::Alt {
                        condition,
                        true_branch,
                        false_branch: next_false,
                        else_condition: next_else,
                    },
                ] if else_condition.trim().is_empty()
                    && (!next_false.is_empty() || !next_else.trim().is_empty()) =>
                {
                    self.line(depth, &keyword_line("else", condition));
                    self.actions(true_branch, depth + 1);
                    false_branch = next_false.as_slice();
                    else_condition = next_else.as_str();
                }
                _ => break,
            }
        }
        if !false_branch.is_empty() || !else_condition.trim().is_empty() {
            self.line(depth, &keyword_line("else", else_condition));
            self.actions(false_branch, depth + 1);
        }

        self.line(depth, "end");
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text placed after a keyword or colon: one line with no quotes and no `/'`.
fn inert_text(text: &str) -> String {
    single_line(text).replace('"', "'").replace("/'", "/ '")
}

/// A note body line starts its own source line, where a leading `'` opens a comment.
fn note_line(line: &str) -> String {
    let line = inert_text(line);
    match line.strip_prefix('\'') {
        Some(rest) => format!("\u{2019}{rest}"),
        None => line,
    }
}

fn keyword_line(keyword: &str, condition: &str) -> String {
    let condition = inert_text(condition);
    if condition.is_empty() {
        keyword.to_string()
    } else {
        format!("{keyword} {condition}")
    }
}
