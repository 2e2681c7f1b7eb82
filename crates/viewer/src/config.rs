//! Viewer configuration read from a KDL file
//!
//! ```kdl
//! layout {
//!     radii 0 200 300 400 500 600
//!     min-slots 8
//! }
//! viewport {
//!     width 1280
//!     height 800
//!     min-zoom 0.1
//!     max-zoom 5.0
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use graphview::{RadialLayout, Size, ZoomLimits};
use kdl::{KdlDocument, KdlNode, KdlValue};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub layout: RadialLayout,
    pub zoom: ZoomLimits,
    pub container: Size,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            layout: RadialLayout::default(),
            zoom: ZoomLimits::default(),
            container: Size::new(1280.0, 800.0),
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("loading config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let doc = KdlDocument::parse(content).map_err(|err| anyhow!("invalid KDL: {err}"))?;
        let mut config = Self::default();

        if let Some(layout) = doc.get("layout") {
            for setting in settings(layout) {
                match setting.name().value() {
                    "radii" => config.layout.radii = numbers(setting)?,
                    "min-slots" => config.layout.min_slots = count(setting)?,
                    other => tracing::warn!(key = other, "unknown layout setting ignored"),
                }
            }
            config.layout.validate()?;
        }

        if let Some(viewport) = doc.get("viewport") {
            for setting in settings(viewport) {
                match setting.name().value() {
                    "width" => config.container.width = number(setting)?,
                    "height" => config.container.height = number(setting)?,
                    "min-zoom" => config.zoom.min = number(setting)?,
                    "max-zoom" => config.zoom.max = number(setting)?,
                    other => tracing::warn!(key = other, "unknown viewport setting ignored"),
                }
            }
            if config.zoom.min <= 0.0 || config.zoom.min > config.zoom.max {
                bail!(
                    "zoom range {}..{} is empty or not positive",
                    config.zoom.min,
                    config.zoom.max
                );
            }
        }

        Ok(config)
    }
}

fn settings(node: &KdlNode) -> impl Iterator<Item = &KdlNode> {
    node.children().into_iter().flat_map(|doc| doc.nodes())
}

fn arguments(node: &KdlNode) -> impl Iterator<Item = &KdlValue> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| e.value())
}

fn as_number(value: &KdlValue) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
}

fn number(node: &KdlNode) -> Result<f64> {
    let key = node.name().value();
    let mut args = arguments(node);
    match (args.next().and_then(as_number), args.next()) {
        (Some(n), None) if n.is_finite() => Ok(n),
        _ => bail!("`{key}` expects exactly one number"),
    }
}

fn numbers(node: &KdlNode) -> Result<Vec<f64>> {
    let key = node.name().value();
    arguments(node)
        .map(|v| as_number(v).ok_or_else(|| anyhow!("`{key}` expects numbers, got {v}")))
        .collect()
}

fn count(node: &KdlNode) -> Result<usize> {
    let key = node.name().value();
    let mut args = arguments(node);
    match (args.next().and_then(KdlValue::as_integer), args.next()) {
        (Some(n), None) => {
            usize::try_from(n).with_context(|| format!("`{key}` must not be negative"))
        }
        _ => bail!("`{key}` expects exactly one integer"),
    }
}
