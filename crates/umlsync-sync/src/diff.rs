use serde::Serialize;

use crate::model::GuiState;

/// Above this many cells the LCS table is skipped and the changed middle is counted wholesale.
const MAX_LCS_CELLS: usize = 1_000_000;

/// Line-level summary of a text edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeDiff {
    pub added: usize,
    pub removed: usize,
    pub old_len: usize,
    pub new_len: usize,
}

impl CodeDiff {
    pub fn compute(old: &str, new: &str) -> Self {
        let old_lines: Vec<&str> = old.lines().collect();
        let new_lines: Vec<&str> = new.lines().collect();

        let prefix = old_lines
            .iter()
            .zip(&new_lines)
            .take_while(|(a, b)| a == b)
            .count();
        let suffix = old_lines[prefix..]
            .iter()
            .rev()
            .zip(new_lines[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();

        let a = &old_lines[prefix..old_lines.len() - suffix];
        let b = &new_lines[prefix..new_lines.len() - suffix];
        let common = if a.len().saturating_mul(b.len()) > MAX_LCS_CELLS {
            0
        } else {
            lcs_len(a, b)
        };

        Self {
            added: b.len() - common,
            removed: a.len() - common,
            old_len: old_lines.len(),
            new_len: new_lines.len(),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

fn lcs_len(a: &[&str], b: &[&str]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            row[j + 1] = if x == y {
                prev[j] + 1
            } else {
                row[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

/// What changed between two GUI snapshots. Actions are compared by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuiDiff {
    pub actors_added: Vec<String>,
    pub actors_removed: Vec<String>,
    pub actions_added: Vec<usize>,
    pub actions_removed: Vec<usize>,
    pub actions_modified: Vec<usize>,
    pub mode_changed: bool,
    pub title_changed: bool,
}

impl GuiDiff {
    pub fn compute(old: &GuiState, new: &GuiState) -> Self {
        let actors_added = new
            .selected_actors
            .difference(&old.selected_actors)
            .cloned()
            .collect();
        let actors_removed = old
            .selected_actors
            .difference(&new.selected_actors)
            .cloned()
            .collect();

        let shared = old.actions.len().min(new.actions.len());
        let actions_modified = (0..shared)
            .filter(|&i| old.actions[i] != new.actions[i])
            .collect();

        Self {
            actors_added,
            actors_removed,
            actions_added: (shared..new.actions.len()).collect(),
            actions_removed: (shared..old.actions.len()).collect(),
            actions_modified,
            mode_changed: old.current_mode != new.current_mode,
            title_changed: old.title != new.title,
        }
    }

    /// Changes that affect the generated text. Mode switches alone do not.
    pub fn affects_code(&self) -> bool {
        !self.actors_added.is_empty()
            || !self.actors_removed.is_empty()
            || !self.actions_added.is_empty()
            || !self.actions_removed.is_empty()
            || !self.actions_modified.is_empty()
            || self.title_changed
    }

    pub fn has_changes(&self) -> bool {
        self.affects_code() || self.mode_changed
    }
}
