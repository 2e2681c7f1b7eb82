use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::edge::Connection;
use crate::node::{Node, NodeFields};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("node `{0}` already exists")]
    DuplicateId(String),
    #[error("connection `{0}` already exists")]
    DuplicateConnection(String),
    #[error("connection {from} -> {to} references a missing node")]
    DanglingReference { from: String, to: String },
}

/// Canonical node and connection store for one session.
///
/// Nodes keep insertion order. Positions are written once, at insertion, and
/// only shared references are handed out afterwards.
#[derive(Debug, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    connections: Vec<Connection>,
    connection_ids: HashSet<String>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_node(&mut self, node: Node) -> Result<(), ModelError> {
        if self.index.contains_key(&node.id) {
            return Err(ModelError::DuplicateId(node.id));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn insert_connection(&mut self, connection: Connection) -> Result<(), ModelError> {
        if !self.contains(&connection.from_id) || !self.contains(&connection.to_id) {
            return Err(ModelError::DanglingReference {
                from: connection.from_id,
                to: connection.to_id,
            });
        }
        if !self.connection_ids.insert(connection.id.clone()) {
            return Err(ModelError::DuplicateConnection(connection.id));
        }
        self.connections.push(connection);
        Ok(())
    }

    /// Merges `fields` into node `id`. Unknown ids are dropped; returns whether a node was updated.
    pub fn update_node(&mut self, id: &str, fields: NodeFields) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.nodes[i].merge(fields);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.connections.clear();
        self.connection_ids.clear();
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn has_connection(&self, from_id: &str, to_id: &str) -> bool {
        self.connection_ids.contains(&Connection::id_for(from_id, to_id))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.first().filter(|n| n.is_root())
    }

    /// Clears `appearing` on nodes older than `duration`; returns how many changed
    pub fn settle_appearing(&mut self, now: Instant, duration: Duration) -> usize {
        let mut settled = 0;
        for node in self.nodes.iter_mut().filter(|n| n.appearing) {
            if now.saturating_duration_since(node.created_at) >= duration {
                node.appearing = false;
                settled += 1;
            }
        }
        settled
    }
}
