use std::collections::BTreeMap;

use serde::Serialize;

use super::ast::{Document, NodeKind};

/// Node counts over a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AstStatistics {
    pub total_nodes: usize,
    pub node_kinds: BTreeMap<NodeKind, usize>,
    pub participants: usize,
    pub messages: usize,
    pub control_structures: usize,
    pub errors: usize,
}

impl AstStatistics {
    pub fn compute(document: &Document) -> Self {
        let mut stats = Self::default();
        document.walk(|kind, _| {
            stats.total_nodes += 1;
            *stats.node_kinds.entry(kind).or_default() += 1;
            match kind {
                NodeKind::Participant => stats.participants += 1,
                NodeKind::Message => stats.messages += 1,
                NodeKind::Error => stats.errors += 1,
                k if k.is_control_structure() => stats.control_structures += 1,
                _ => {}
            }
        });
        stats
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.node_kinds.get(&kind).copied().unwrap_or(0)
    }
}
