mod edge;
mod event;
mod graph;
mod highlight;
mod ingest;
mod model;
mod node;
mod viewport;

pub use edge::Connection;
pub use event::{DecodeError, Event};
pub use graph::{GraphView, PointerTarget, ProofGraph};
pub use highlight::{DependencyHighlighter, EdgeEmphasis, Highlight};
pub use ingest::{Applied, EventIngestor, IngestError, SessionState, SessionStatus};
pub use model::{GraphModel, ModelError};
pub use node::{APPEAR_DURATION, NODE_EXTENT, NewNode, Node, NodeFields, NodeStyle};
pub use viewport::{Transform, ViewportController, ZoomLimits};

pub use proofviz_layout::{LayoutEngine, Position, RadialLayout, Size};
