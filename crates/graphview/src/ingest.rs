use std::fmt;
use std::time::Instant;

use proofviz_layout::{LayoutEngine, Position};

use crate::edge::Connection;
use crate::event::Event;
use crate::model::{GraphModel, ModelError};
use crate::node::{APPEAR_DURATION, NewNode, Node, NodeFields};

/// Lifecycle of one streaming session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been started since the last clear
    #[default]
    Idle,
    /// Session started; waiting for the channel to report ready
    Connecting,
    Streaming,
    Completed,
    Failed(String),
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Streaming)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Connecting => write!(f, "connecting"),
            SessionState::Streaming => write!(f, "streaming"),
            SessionState::Completed => write!(f, "completed"),
            SessionState::Failed(_) => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("node `{id}` names unknown parent `{parent}`")]
    UnknownParent { id: String, parent: String },
    #[error("node `{id}` at level {level} is not one below parent `{parent}` at level {parent_level}")]
    LevelMismatch {
        id: String,
        level: usize,
        parent: String,
        parent_level: usize,
    },
    #[error("node `{id}` at level {level} has no parent")]
    MissingParent { id: String, level: usize },
    #[error("session must start with a root node, got `{id}` at level {level}")]
    RootNotFirst { id: String, level: usize },
    #[error("root already present, rejecting second root `{id}`")]
    DuplicateRoot { id: String },
    #[error("no streaming session ({state}), dropping `{kind}` event")]
    SessionInactive {
        state: SessionState,
        kind: &'static str,
    },
}

/// Outcome of an accepted event.
#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    Inserted { id: String, position: Position },
    Updated { id: String },
    /// Update for an id the model does not know
    Ignored { id: String },
    Completed,
    Failed { message: String },
}

/// Status bar text and progress percentage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    pub text: String,
    pub progress: u8,
}

/// Sole writer of the [`GraphModel`].
///
/// Applies stream events one at a time, placing nodes through the layout
/// engine before they enter the model.
#[derive(Debug, Default)]
pub struct EventIngestor {
    model: GraphModel,
    layout: LayoutEngine,
    state: SessionState,
    rejected: usize,
}

impl EventIngestor {
    pub fn new(layout: LayoutEngine) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Events rejected in the current session
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Drops the previous graph and waits for the channel
    pub fn start_session(&mut self) {
        self.reset();
        self.state = SessionState::Connecting;
        tracing::info!("session started, waiting for channel");
    }

    /// Signals that the messaging channel is ready and events may flow
    pub fn channel_ready(&mut self) {
        if self.state == SessionState::Connecting {
            self.state = SessionState::Streaming;
            tracing::info!("channel ready, streaming");
        } else {
            tracing::debug!(state = %self.state, "channel ready outside of connect, ignored");
        }
    }

    pub fn clear(&mut self) {
        self.reset();
        self.state = SessionState::Idle;
    }

    fn reset(&mut self) {
        self.model.clear();
        self.layout.reset();
        self.rejected = 0;
    }

    /// Applies one event. `center` is the layout center snapshot for this call.
    ///
    /// A rejected event leaves the model and the layout counters untouched.
    pub fn apply(
        &mut self,
        event: Event,
        center: Position,
        now: Instant,
    ) -> Result<Applied, IngestError> {
        if self.state != SessionState::Streaming {
            self.rejected += 1;
            let err = IngestError::SessionInactive {
                state: self.state.clone(),
                kind: event.kind(),
            };
            tracing::warn!(%err, "rejected event");
            return Err(err);
        }

        let result = match event {
            Event::NodeAdded(node) => self.add_node(node, center, now),
            Event::NodeUpdated { id, fields } => Ok(self.update_node(id, fields)),
            Event::SessionCompleted => {
                self.state = SessionState::Completed;
                tracing::info!(nodes = self.model.size(), "session complete");
                Ok(Applied::Completed)
            }
            Event::SessionFailed { message } => {
                tracing::warn!(%message, nodes = self.model.size(), "session failed");
                self.state = SessionState::Failed(message.clone());
                Ok(Applied::Failed { message })
            }
        };

        if let Err(err) = &result {
            self.rejected += 1;
            tracing::warn!(%err, "rejected event");
        }
        result
    }

    fn add_node(
        &mut self,
        node: NewNode,
        center: Position,
        now: Instant,
    ) -> Result<Applied, IngestError> {
        self.check_insertable(&node)?;

        // nothing below can fail once the checks pass
        let position = self.layout.place(&node, center);
        let id = node.id.clone();
        let parent = node.parent_id.clone();
        self.model.insert_node(Node::new(node, position, now))?;
        if let Some(parent) = parent {
            self.model
                .insert_connection(Connection::between(&parent, &id))?;
        }

        tracing::debug!(%id, x = position.x, y = position.y, nodes = self.model.size(), "node added");
        Ok(Applied::Inserted { id, position })
    }

    fn check_insertable(&self, node: &NewNode) -> Result<(), IngestError> {
        if self.model.contains(&node.id) {
            return Err(ModelError::DuplicateId(node.id.clone()).into());
        }
        if self.model.is_empty() {
            if node.level != 0 || node.parent_id.is_some() {
                return Err(IngestError::RootNotFirst {
                    id: node.id.clone(),
                    level: node.level,
                });
            }
            return Ok(());
        }
        if node.level == 0 {
            return Err(IngestError::DuplicateRoot {
                id: node.id.clone(),
            });
        }
        let Some(parent_id) = &node.parent_id else {
            return Err(IngestError::MissingParent {
                id: node.id.clone(),
                level: node.level,
            });
        };
        let Some(parent) = self.model.node(parent_id) else {
            return Err(IngestError::UnknownParent {
                id: node.id.clone(),
                parent: parent_id.clone(),
            });
        };
        if parent.level.checked_add(1) != Some(node.level) {
            return Err(IngestError::LevelMismatch {
                id: node.id.clone(),
                level: node.level,
                parent: parent_id.clone(),
                parent_level: parent.level,
            });
        }
        if self.model.has_connection(parent_id, &node.id) {
            return Err(ModelError::DuplicateConnection(Connection::id_for(parent_id, &node.id)).into());
        }
        Ok(())
    }

    fn update_node(&mut self, id: String, fields: NodeFields) -> Applied {
        if self.model.update_node(&id, fields) {
            tracing::debug!(%id, "node updated");
            Applied::Updated { id }
        } else {
            tracing::debug!(%id, "update for unknown node dropped");
            Applied::Ignored { id }
        }
    }

    pub fn settle_appearing(&mut self, now: Instant) -> usize {
        self.model.settle_appearing(now, APPEAR_DURATION)
    }

    pub fn status(&self) -> SessionStatus {
        let n = self.model.size();
        let (text, progress) = match &self.state {
            SessionState::Idle => ("Ready to analyze statements".to_string(), 0),
            SessionState::Connecting => ("Connecting to server...".to_string(), 0),
            SessionState::Streaming if n == 0 => ("Starting analysis...".to_string(), 10),
            SessionState::Streaming => (
                format!("Analyzing dependencies... ({n} nodes)"),
                (n.saturating_mul(10)).min(90) as u8,
            ),
            SessionState::Completed => (format!("Analysis complete - {n} nodes generated"), 100),
            SessionState::Failed(message) => (format!("Error: {message}"), 0),
        };
        SessionStatus { text, progress }
    }
}
