use std::collections::HashSet;
use std::time::Instant;

use proofviz_layout::{LayoutEngine, Position, Size};

use crate::edge::Connection;
use crate::event::Event;
use crate::highlight::{DependencyHighlighter, EdgeEmphasis, Highlight};
use crate::ingest::{Applied, EventIngestor, IngestError, SessionState, SessionStatus};
use crate::model::GraphModel;
use crate::node::{Node, NodeStyle};
use crate::viewport::{Transform, ViewportController, ZoomLimits};

/// What a primary pointer press landed on
#[derive(Clone, Debug, PartialEq)]
pub enum PointerTarget {
    Node(String),
    Background,
}

/// Live proof graph: streaming model, viewport and selection behind one host-facing API.
#[derive(Debug, Default)]
pub struct ProofGraph {
    ingestor: EventIngestor,
    viewport: ViewportController,
    highlight: Option<Highlight>,
}

impl ProofGraph {
    pub fn new(layout: LayoutEngine, limits: ZoomLimits, container: Size) -> Self {
        Self {
            ingestor: EventIngestor::new(layout),
            viewport: ViewportController::new(limits).with_container(container),
            highlight: None,
        }
    }

    /// Clears graph content and selection for a new analysis. The view transform is kept.
    pub fn start_session(&mut self) {
        self.highlight = None;
        self.ingestor.start_session();
    }

    /// The messaging channel can now deliver events
    pub fn channel_ready(&mut self) {
        self.ingestor.channel_ready();
    }

    pub fn clear(&mut self) {
        self.highlight = None;
        self.ingestor.clear();
    }

    pub fn ingest(&mut self, event: Event) -> Result<Applied, IngestError> {
        self.ingest_at(event, Instant::now())
    }

    pub fn ingest_at(&mut self, event: Event, now: Instant) -> Result<Applied, IngestError> {
        let parent = match &event {
            Event::NodeAdded(node) => node.parent_id.clone(),
            _ => None,
        };
        let center = self.viewport.center();
        let applied = self.ingestor.apply(event, center, now)?;

        if let (Applied::Inserted { id, .. }, Some(parent), Some(highlight)) =
            (&applied, parent, self.highlight.as_mut())
        {
            highlight.absorb_child(&parent, id);
        }
        Ok(applied)
    }

    /// Highlights `id` with its ancestors and descendants. Unknown ids leave the selection as is.
    pub fn select_node(&mut self, id: &str) -> bool {
        if !self.ingestor.model().contains(id) {
            tracing::debug!(id, "select of unknown node ignored");
            return false;
        }
        self.highlight = Some(DependencyHighlighter::highlight(
            id,
            self.ingestor.model().connections(),
        ));
        true
    }

    pub fn deselect_all(&mut self) {
        self.highlight = None;
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.highlight
            .as_ref()
            .and_then(|h| self.ingestor.model().node(&h.selected))
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    /// Current highlight set; empty when nothing is selected
    pub fn highlight_set(&self) -> HashSet<String> {
        self.highlight.as_ref().map(Highlight::ids).unwrap_or_default()
    }

    /// Topmost node under a screen-space point
    pub fn node_at(&self, screen_x: f64, screen_y: f64) -> Option<&Node> {
        let point = self.viewport.to_layout(Position::new(screen_x, screen_y));
        self.ingestor
            .model()
            .nodes()
            .iter()
            .rev()
            .find(|n| n.contains(point))
    }

    /// Primary button press: selects the node under the pointer, otherwise
    /// deselects and starts panning
    pub fn pointer_down(&mut self, x: f64, y: f64) -> PointerTarget {
        match self.node_at(x, y).map(|n| n.id.clone()) {
            Some(id) => {
                self.select_node(&id);
                PointerTarget::Node(id)
            }
            None => {
                self.deselect_all();
                self.viewport.begin_drag(x, y);
                PointerTarget::Background
            }
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.viewport.continue_drag(x, y);
    }

    pub fn pointer_up(&mut self) {
        self.viewport.end_drag();
    }

    /// Middle-button drag pans regardless of what is under the pointer
    pub fn begin_pan(&mut self, x: f64, y: f64) {
        self.viewport.begin_drag(x, y);
    }

    pub fn wheel(&mut self, x: f64, y: f64, direction: f64) {
        self.viewport.zoom_at(x, y, direction);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(Size::new(width, height));
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn tick(&mut self, now: Instant) -> usize {
        self.ingestor.settle_appearing(now)
    }

    pub fn model(&self) -> &GraphModel {
        self.ingestor.model()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn session(&self) -> &SessionState {
        self.ingestor.state()
    }

    pub fn status(&self) -> SessionStatus {
        self.ingestor.status()
    }

    pub fn rejected(&self) -> usize {
        self.ingestor.rejected()
    }

    /// Read-only snapshot for a renderer
    pub fn view(&self) -> GraphView<'_> {
        let model = self.ingestor.model();
        GraphView {
            nodes: model.nodes(),
            connections: model.connections(),
            transform: self.viewport.transform(),
            highlight: self.highlight.as_ref(),
            model,
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct GraphView<'a> {
    pub nodes: &'a [Node],
    pub connections: &'a [Connection],
    pub transform: Transform,
    pub highlight: Option<&'a Highlight>,
    model: &'a GraphModel,
}

impl<'a> GraphView<'a> {
    pub fn style(&self, node: &Node) -> NodeStyle {
        let highlighted = self.highlight.is_some_and(|h| h.contains(&node.id));
        NodeStyle {
            root: node.is_root(),
            elementary: node.is_elementary,
            analyzing: node.is_analyzing(),
            appearing: node.appearing,
            highlighted,
            dimmed: self.highlight.is_some() && !highlighted,
        }
    }

    pub fn emphasis(&self, connection: &Connection) -> EdgeEmphasis {
        self.highlight
            .map(|h| h.emphasis(connection))
            .unwrap_or(EdgeEmphasis::None)
    }

    /// Looks `id` up through the model's index
    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.model.node(id)
    }
}
