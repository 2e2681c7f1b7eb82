use proofviz_layout::{Position, Size};
use serde::Deserialize;

/// Zoom/pan mapping from layout space to screen space: `screen = pan + layout * zoom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Transform {
    pub fn to_screen(&self, p: Position) -> Position {
        Position::new(self.pan_x + p.x * self.zoom, self.pan_y + p.y * self.zoom)
    }

    pub fn to_layout(&self, p: Position) -> Position {
        Position::new((p.x - self.pan_x) / self.zoom, (p.y - self.pan_y) / self.zoom)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
    /// Multiplier applied for a positive wheel direction
    pub out_factor: f64,
    /// Multiplier applied otherwise
    pub in_factor: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 5.0,
            out_factor: 0.9,
            in_factor: 1.1,
        }
    }
}

impl ZoomLimits {
    /// Orders the bounds and falls back to defaults for unusable values
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let usable = |v: f64| v.is_finite() && v > 0.0;
        let (mut min, mut max) = (self.min, self.max);
        if !usable(min) || !usable(max) {
            min = defaults.min;
            max = defaults.max;
        } else if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self {
            min,
            max,
            out_factor: if usable(self.out_factor) { self.out_factor } else { defaults.out_factor },
            in_factor: if usable(self.in_factor) { self.in_factor } else { defaults.in_factor },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Drag {
    start_pointer: Position,
    start_pan: Position,
}

/// Pan/zoom state for the graph canvas.
///
/// Independent of graph content. The layout center is derived from the
/// container size alone and ignores zoom and pan.
#[derive(Clone, Debug, Default)]
pub struct ViewportController {
    transform: Transform,
    limits: ZoomLimits,
    drag: Option<Drag>,
    container: Size,
}

impl ViewportController {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            limits: limits.normalized(),
            ..Default::default()
        }
    }

    pub fn with_container(mut self, container: Size) -> Self {
        self.container = container;
        self
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn zoom(&self) -> f64 {
        self.transform.zoom
    }

    pub fn container(&self) -> Size {
        self.container
    }

    /// Logical center used for placement
    pub fn center(&self) -> Position {
        self.container.center()
    }

    /// Records the container's current bounding box
    pub fn resize(&mut self, container: Size) {
        if self.container != container {
            tracing::debug!(
                width = container.width,
                height = container.height,
                "viewport resized"
            );
            self.container = container;
        }
    }

    /// Zooms one wheel step around the cursor so the point under it stays put
    pub fn zoom_at(&mut self, cursor_x: f64, cursor_y: f64, direction: f64) {
        if !(cursor_x.is_finite() && cursor_y.is_finite()) || direction.is_nan() {
            return;
        }
        let factor = if direction > 0.0 {
            self.limits.out_factor
        } else {
            self.limits.in_factor
        };
        let old = self.transform;
        let new_zoom = (old.zoom * factor).clamp(self.limits.min, self.limits.max);
        let zoom_factor = new_zoom / old.zoom;
        self.transform = Transform {
            zoom: new_zoom,
            pan_x: cursor_x - (cursor_x - old.pan_x) * zoom_factor,
            pan_y: cursor_y - (cursor_y - old.pan_y) * zoom_factor,
        };
    }

    pub fn begin_drag(&mut self, pointer_x: f64, pointer_y: f64) {
        self.drag = Some(Drag {
            start_pointer: Position::new(pointer_x, pointer_y),
            start_pan: Position::new(self.transform.pan_x, self.transform.pan_y),
        });
    }

    pub fn continue_drag(&mut self, pointer_x: f64, pointer_y: f64) {
        let Some(drag) = self.drag else {
            return;
        };
        if !(pointer_x.is_finite() && pointer_y.is_finite()) {
            return;
        }
        self.transform.pan_x = drag.start_pan.x + (pointer_x - drag.start_pointer.x);
        self.transform.pan_y = drag.start_pan.y + (pointer_y - drag.start_pointer.y);
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn reset(&mut self) {
        self.transform = Transform::default();
        self.drag = None;
    }

    pub fn to_screen(&self, p: Position) -> Position {
        self.transform.to_screen(p)
    }

    pub fn to_layout(&self, p: Position) -> Position {
        self.transform.to_layout(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_initial_transform() {
        let viewport = ViewportController::default();
        assert_eq!(viewport.transform(), Transform::default());
        assert_eq!(viewport.zoom(), 1.0);
    }

    #[test]
    fn test_positive_direction_zooms_out() {
        let mut viewport = ViewportController::default();
        viewport.zoom_at(0.0, 0.0, 1.0);
        assert!((viewport.zoom() - 0.9).abs() < EPS);
        viewport.zoom_at(0.0, 0.0, -1.0);
        assert!((viewport.zoom() - 0.99).abs() < EPS);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = ViewportController::default();
        for _ in 0..100 {
            viewport.zoom_at(10.0, 10.0, -1.0);
        }
        assert_eq!(viewport.zoom(), 5.0);
        for _ in 0..200 {
            viewport.zoom_at(10.0, 10.0, 1.0);
        }
        assert_eq!(viewport.zoom(), 0.1);
    }

    #[test]
    fn test_zoom_keeps_cursor_anchor() {
        let mut viewport = ViewportController::default();
        viewport.begin_drag(0.0, 0.0);
        viewport.continue_drag(35.0, -20.0);
        viewport.end_drag();

        let cursor = Position::new(400.0, 250.0);
        let anchor = viewport.to_layout(cursor);
        viewport.zoom_at(cursor.x, cursor.y, -1.0);
        let after = viewport.to_screen(anchor);
        assert!((after.x - cursor.x).abs() < 1e-6);
        assert!((after.y - cursor.y).abs() < 1e-6);
    }

    #[test]
    fn test_drag_translates_by_delta() {
        let mut viewport = ViewportController::default();
        viewport.begin_drag(100.0, 100.0);
        viewport.continue_drag(130.0, 90.0);
        viewport.continue_drag(130.0, 90.0);
        assert_eq!(viewport.transform().pan_x, 30.0);
        assert_eq!(viewport.transform().pan_y, -10.0);
        viewport.end_drag();

        viewport.continue_drag(500.0, 500.0);
        assert_eq!(viewport.transform().pan_x, 30.0);

        viewport.begin_drag(0.0, 0.0);
        viewport.continue_drag(5.0, 5.0);
        assert_eq!(viewport.transform().pan_x, 35.0);
        assert_eq!(viewport.transform().pan_y, -5.0);
    }

    #[test]
    fn test_center_ignores_zoom_and_pan() {
        let mut viewport = ViewportController::default().with_container(Size::new(800.0, 600.0));
        assert_eq!(viewport.center(), Position::new(400.0, 300.0));
        viewport.zoom_at(10.0, 10.0, 1.0);
        viewport.begin_drag(0.0, 0.0);
        viewport.continue_drag(50.0, 50.0);
        assert_eq!(viewport.center(), Position::new(400.0, 300.0));
        viewport.resize(Size::new(1000.0, 500.0));
        assert_eq!(viewport.center(), Position::new(500.0, 250.0));
    }

    #[test]
    fn test_reset_restores_identity() {
        let mut viewport = ViewportController::default();
        viewport.zoom_at(10.0, 20.0, 1.0);
        viewport.begin_drag(0.0, 0.0);
        viewport.reset();
        assert_eq!(viewport.transform(), Transform::default());
        assert!(!viewport.is_dragging());
    }

    #[test]
    fn test_inverted_limits_are_reordered() {
        let mut viewport = ViewportController::new(ZoomLimits {
            min: 4.0,
            max: 0.5,
            ..Default::default()
        });
        for _ in 0..50 {
            viewport.zoom_at(0.0, 0.0, 1.0);
        }
        assert_eq!(viewport.zoom(), 0.5);
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let mut viewport = ViewportController::default();
        viewport.zoom_at(f64::NAN, 0.0, 1.0);
        viewport.zoom_at(0.0, 0.0, f64::NAN);
        assert_eq!(viewport.transform(), Transform::default());
    }
}
