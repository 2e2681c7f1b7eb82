//! Streaming radial placement for incrementally discovered trees.
//!
//! Nodes are positioned once, at the moment they arrive, on concentric rings
//! keyed by their level. Earlier placements are never revisited.

mod radial;
mod types;

pub use radial::*;
pub use types::*;
