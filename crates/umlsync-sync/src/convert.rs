//! AST to GUI projection.

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use umlsync_core::sequence::{ArrowClass, Branch, NoteSide, arrow_class};
use umlsync_core::{Document, Statement};

use crate::model::{Action, GuiState};

/// The GUI-facing view of one parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub actors: IndexSet<String>,
    pub actions: Vec<Action>,
    pub title: Option<String>,
}

impl Projection {
    /// Replaces the actors, actions and title of `base`, keeping everything else.
    pub fn apply_to(self, mut base: GuiState) -> GuiState {
        base.selected_actors.clear();
        base.actions.clear();
        base.selected_actors.extend(self.actors);
        base.actions.extend(self.actions);
        base.title = self.title;
        base
    }
}

pub fn document_to_gui(document: &Document) -> Projection {
    let mut converter = Converter::default();
    document.walk(|_, stmt| {
        if let Some(Statement::Participant { name, alias, .. }) = stmt {
            converter.actors.insert(name.clone());
            if let Some(alias) = alias {
                converter.aliases.insert(alias.clone(), name.clone());
            }
        }
    });

    let mut actions = Vec::new();
    for stmt in document.statements() {
        converter.statement(stmt, &mut actions);
    }

    Projection {
        actors: converter.actors,
        actions,
        title: converter.title,
    }
}

#[derive(Default)]
struct Converter {
    actors: IndexSet<String>,
    /// Declared `as` aliases, mapped back to the display name.
    aliases: FxHashMap<String, String>,
    title: Option<String>,
}

impl Converter {
    fn resolve(&self, name: &str) -> String {
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    fn actor(&mut self, name: &str) -> String {
        let resolved = self.resolve(name);
        self.actors.insert(resolved.clone());
        resolved
    }

    fn block(&mut self, statements: &[Statement]) -> Vec<Action> {
        let mut out = Vec::new();
        for stmt in statements {
            self.statement(stmt, &mut out);
        }
        out
    }

    fn statement(&mut self, stmt: &Statement, out: &mut Vec<Action>) {
        match stmt {
            Statement::Participant { .. } | Statement::Autonumber { .. } => {}
            Statement::Error { message, .. } => {
                tracing::debug!(%message, "error node has no GUI counterpart");
            }
            Statement::Title { text, .. } => self.title = Some(text.clone()),
            Statement::Message {
                from,
                to,
                text,
                arrow,
                ..
            } => {
                let (mut from, mut to) = (self.actor(from), self.actor(to));
                if arrow_class(arrow) == Some(ArrowClass::Reverse) {
                    std::mem::swap(&mut from, &mut to);
                }
                out.push(Action::Message {
                    from,
                    to,
                    message: text.clone(),
                });
            }
            Statement::Activation { target, .. } => out.push(Action::Activation {
                actor: self.resolve(target),
            }),
            Statement::Deactivation { target, .. } => out.push(Action::Deactivation {
                actor: self.resolve(target),
            }),
            Statement::Note {
                text, target, side, ..
            } => {
                let position = match (side, target) {
                    (side, None) => side.as_str().to_string(),
                    (NoteSide::Over, Some(target)) => format!("over {}", self.targets(target)),
                    (side, Some(target)) => {
                        format!("{} of {}", side.as_str(), self.targets(target))
                    }
                };
                out.push(Action::Note {
                    position,
                    text: text.clone(),
                });
            }
            Statement::Alternative { branches, .. } => {
                if let Some(action) = self.alternative(branches) {
                    out.push(action);
                }
            }
            Statement::Loop {
                condition,
                statements,
                ..
            } => {
                let actions = self.block(statements);
                out.push(Action::Loop {
                    condition: condition.clone(),
                    actions,
                });
            }
            Statement::Optional {
                condition,
                statements,
                ..
            } => {
                let actions = self.block(statements);
                out.push(Action::Opt {
                    condition: condition.clone(),
                    actions,
                });
            }
            Statement::Parallel { branches, .. } => {
                let branches = branches.iter().map(|b| self.block(&b.statements)).collect();
                out.push(Action::Par { branches });
            }
        }
    }

    /// Two branches map onto true/false directly; a third and later branches nest as an `alt`
    /// inside the false branch.
    fn alternative(&mut self, branches: &[Branch]) -> Option<Action> {
        let (first, rest) = branches.split_first()?;
        let true_branch = self.block(&first.statements);
        let (false_branch, else_condition) = match rest {
            [] => (Vec::new(), String::new()),
            [second] => (self.block(&second.statements), second.condition.clone()),
            _ => (self.alternative(rest).into_iter().collect(), String::new()),
        };
        Some(Action::Alt {
            condition: first.condition.clone(),
            true_branch,
            false_branch,
            else_condition,
        })
    }

    fn targets(&self, targets: &str) -> String {
        targets
            .split(',')
            .map(|t| self.resolve(t.trim()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
