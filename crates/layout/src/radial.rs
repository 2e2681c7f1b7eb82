use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::TAU;

use crate::types::*;

/// Ring geometry for the streaming radial layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialLayout {
    /// Ring radius per level, ascending. The last entry is reused for deeper levels.
    pub radii: Vec<f64>,
    /// Lower bound on the angular division of a ring
    pub min_slots: usize,
}

impl Default for RadialLayout {
    fn default() -> Self {
        Self {
            radii: vec![0.0, 200.0, 300.0, 400.0, 500.0, 600.0],
            min_slots: 8,
        }
    }
}

impl RadialLayout {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.radii.is_empty() {
            return Err(LayoutError::EmptyRadii);
        }
        if let Some(&radius) = self.radii.iter().find(|r| !r.is_finite() || **r < 0.0) {
            return Err(LayoutError::InvalidRadius(radius));
        }
        for pair in self.radii.windows(2) {
            if pair[1] < pair[0] {
                return Err(LayoutError::DescendingRadii {
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }
        if self.min_slots == 0 {
            return Err(LayoutError::NoSlots);
        }
        Ok(())
    }

    pub fn radius_for(&self, level: usize) -> f64 {
        let last = self.radii.len().saturating_sub(1);
        self.radii.get(level.min(last)).copied().unwrap_or(0.0)
    }

    /// Angular step used for the node that arrives after `placed` siblings
    pub fn angle_step(&self, placed: usize) -> f64 {
        TAU / self.min_slots.max(placed + 1) as f64
    }
}

/// Per-level count of nodes placed in the current session.
///
/// Counts only grow until [`LevelCounters::reset`]. Only levels that
/// received a node have an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelCounters {
    placed: BTreeMap<usize, usize>,
}

impl LevelCounters {
    pub fn placed_at(&self, level: usize) -> usize {
        self.placed.get(&level).copied().unwrap_or(0)
    }

    /// Returns the slot index for the next node on `level` and claims it
    pub fn claim(&mut self, level: usize) -> usize {
        let count = self.placed.entry(level).or_insert(0);
        let k = *count;
        *count += 1;
        k
    }

    pub fn total(&self) -> usize {
        self.placed.values().sum()
    }

    pub fn reset(&mut self) {
        self.placed.clear();
    }
}

/// Places each node exactly once, at insertion time.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: RadialLayout,
    counters: LevelCounters,
}

impl LayoutEngine {
    pub fn new(config: RadialLayout) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self {
            config,
            counters: LevelCounters::default(),
        })
    }

    pub fn config(&self) -> &RadialLayout {
        &self.config
    }

    pub fn counters(&self) -> &LevelCounters {
        &self.counters
    }

    /// Position for `node` around `center`.
    ///
    /// The root sits on the center. Every other node takes the next free slot on
    /// the ring for its level; the slot is consumed even if the caller later
    /// discards the node, so validate before placing.
    pub fn place<N: LayoutNode>(&mut self, node: &N, center: Position) -> Position {
        let level = node.level();
        if level == 0 {
            return center;
        }
        let radius = self.config.radius_for(level);
        let angle = self.next_angle(level);
        let position = center.polar_offset(radius, angle);
        tracing::trace!(level, radius, angle, x = position.x, y = position.y, "placed node");
        position
    }

    /// Claims the next angle on `level`
    pub fn next_angle(&mut self, level: usize) -> f64 {
        let k = self.counters.claim(level);
        k as f64 * self.config.angle_step(k)
    }

    /// Forgets all per-level counts. Called when a new session starts.
    pub fn reset(&mut self) {
        self.counters.reset();
    }
}
