use std::time::{Duration, Instant};

use proofviz_layout::{LayoutNode, Position};
use serde::Deserialize;

/// How long a freshly inserted node keeps its `appearing` flag
pub const APPEAR_DURATION: Duration = Duration::from_millis(800);

/// Side length of the square a node occupies in layout space, centred on its position
pub const NODE_EXTENT: f64 = 120.0;

const DISPLAY_LIMIT: usize = 80;
const DISPLAY_KEEP: usize = 77;

/// A node as announced by the analysis stream, before placement.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewNode {
    pub id: String,
    pub statement: String,
    pub level: usize,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_elementary: bool,
}

impl NewNode {
    pub fn root(id: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            statement: statement.into(),
            level: 0,
            parent_id: None,
            is_elementary: false,
        }
    }

    pub fn child(
        id: impl Into<String>,
        statement: impl Into<String>,
        level: usize,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            statement: statement.into(),
            level,
            parent_id: Some(parent_id.into()),
            is_elementary: false,
        }
    }

    /// Treats an empty parent id as no parent
    pub(crate) fn normalized(mut self) -> Self {
        if self.parent_id.as_deref().is_some_and(str::is_empty) {
            self.parent_id = None;
        }
        self
    }
}

impl LayoutNode for NewNode {
    fn level(&self) -> usize {
        self.level
    }
}

/// Fields a `node_update` may carry. Absent fields leave the node untouched.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeFields {
    pub is_elementary: Option<bool>,
    pub explanation: Option<String>,
    pub proof_text: Option<String>,
}

impl NodeFields {
    pub fn is_empty(&self) -> bool {
        self.is_elementary.is_none() && self.explanation.is_none() && self.proof_text.is_none()
    }
}

/// One statement in the dependency tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub statement: String,
    pub level: usize,
    pub parent_id: Option<String>,
    pub is_elementary: bool,
    pub explanation: String,
    pub proof_text: String,
    /// Fixed at insertion by the layout engine
    pub position: Position,
    /// Rendering hint only; cleared by `GraphModel::settle_appearing`
    pub appearing: bool,
    pub created_at: Instant,
}

impl Node {
    pub fn new(spec: NewNode, position: Position, created_at: Instant) -> Self {
        Self {
            id: spec.id,
            statement: spec.statement,
            level: spec.level,
            parent_id: spec.parent_id,
            is_elementary: spec.is_elementary,
            explanation: String::new(),
            proof_text: String::new(),
            position,
            appearing: true,
            created_at,
        }
    }

    pub fn is_root(&self) -> bool {
        self.level == 0
    }

    pub(crate) fn merge(&mut self, fields: NodeFields) {
        if let Some(is_elementary) = fields.is_elementary {
            self.is_elementary = is_elementary;
        }
        if let Some(explanation) = fields.explanation {
            self.explanation = explanation;
        }
        if let Some(proof_text) = fields.proof_text {
            self.proof_text = proof_text;
        }
    }

    /// Statement shortened for display on the node itself
    pub fn display_text(&self) -> String {
        if self.statement.chars().count() > DISPLAY_LIMIT {
            let mut text: String = self.statement.chars().take(DISPLAY_KEEP).collect();
            text.push_str("...");
            text
        } else {
            self.statement.clone()
        }
    }

    pub fn kind_label(&self) -> &'static str {
        if self.is_elementary {
            "Elementary"
        } else {
            "Complex statement"
        }
    }

    /// True while a non-root node is still waiting to be marked elementary
    pub fn is_analyzing(&self) -> bool {
        !self.is_root() && !self.is_elementary
    }

    pub fn contains(&self, point: Position) -> bool {
        let half = NODE_EXTENT / 2.0;
        (point.x - self.position.x).abs() <= half && (point.y - self.position.y).abs() <= half
    }
}

/// Visual classes a renderer applies to a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeStyle {
    pub root: bool,
    pub elementary: bool,
    pub analyzing: bool,
    pub appearing: bool,
    /// Part of the current highlight set
    pub highlighted: bool,
    /// A selection exists and this node is outside it
    pub dimmed: bool,
}
