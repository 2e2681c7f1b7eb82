use std::collections::HashSet;

use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{Dfs, Reversed};

use crate::edge::Connection;

/// How a connection relates to the current selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeEmphasis {
    None,
    /// On the path from the selected node up to the root
    Upstream,
    /// Inside the subtree below the selected node
    Downstream,
}

/// Ancestors and descendants of a selected node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Highlight {
    pub selected: String,
    pub ancestors: HashSet<String>,
    pub descendants: HashSet<String>,
}

impl Highlight {
    pub fn contains(&self, id: &str) -> bool {
        self.selected == id || self.ancestors.contains(id) || self.descendants.contains(id)
    }

    pub fn len(&self) -> usize {
        1 + self.ancestors.len() + self.descendants.len()
    }

    /// `{selected} ∪ ancestors ∪ descendants`
    pub fn ids(&self) -> HashSet<String> {
        let mut ids = HashSet::with_capacity(self.len());
        ids.insert(self.selected.clone());
        ids.extend(self.ancestors.iter().cloned());
        ids.extend(self.descendants.iter().cloned());
        ids
    }

    pub fn emphasis(&self, connection: &Connection) -> EdgeEmphasis {
        let below = |id: &str| self.selected == id || self.descendants.contains(id);
        let above = |id: &str| self.selected == id || self.ancestors.contains(id);
        if below(&connection.from_id) && self.descendants.contains(&connection.to_id) {
            EdgeEmphasis::Downstream
        } else if self.ancestors.contains(&connection.from_id) && above(&connection.to_id) {
            EdgeEmphasis::Upstream
        } else {
            EdgeEmphasis::None
        }
    }

    /// Extends the subtree when `child` hangs off a highlighted descendant.
    /// Returns whether the highlight changed.
    pub(crate) fn absorb_child(&mut self, parent_id: &str, child_id: &str) -> bool {
        if self.selected == parent_id || self.descendants.contains(parent_id) {
            self.descendants.insert(child_id.to_string())
        } else {
            false
        }
    }
}

/// Computes highlight sets by walking an adjacency built on demand from the edge list.
pub struct DependencyHighlighter;

impl DependencyHighlighter {
    /// Walks `connections` outward from `node_id` in both directions.
    ///
    /// Each direction keeps its own visited set, so a malformed stream that
    /// introduces a cycle still terminates.
    pub fn highlight(node_id: &str, connections: &[Connection]) -> Highlight {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::with_capacity(
            connections.len() + 1,
            connections.len(),
        );
        graph.add_node(node_id);
        for connection in connections {
            graph.add_edge(connection.from_id.as_str(), connection.to_id.as_str(), ());
        }

        let mut descendants = HashSet::new();
        let mut dfs = Dfs::new(&graph, node_id);
        while let Some(id) = dfs.next(&graph) {
            if id != node_id {
                descendants.insert(id.to_string());
            }
        }

        let mut ancestors = HashSet::new();
        let upward = Reversed(&graph);
        let mut dfs = Dfs::new(upward, node_id);
        while let Some(id) = dfs.next(upward) {
            if id != node_id {
                ancestors.insert(id.to_string());
            }
        }

        tracing::debug!(
            node_id,
            ancestors = ancestors.len(),
            descendants = descendants.len(),
            "computed highlight"
        );
        Highlight {
            selected: node_id.to_string(),
            ancestors,
            descendants,
        }
    }

    pub fn highlight_set_for(node_id: &str, connections: &[Connection]) -> HashSet<String> {
        Self::highlight(node_id, connections).ids()
    }
}
