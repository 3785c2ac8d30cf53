//! Surface-normalized geometry: points, strokes, screen bounds and orientation.
//!
//! Every stored coordinate lives in the wall's own unit square: `(0, 0)` is
//! the top-left corner of the wall as the viewer sees it and `(1, 1)` the
//! bottom-right. Screen pixels only exist transiently, inside a
//! [`SurfaceBounds`] that the camera layer recomputes each frame.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// A point in surface-normalized space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both components into `[0, 1]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self { x: self.x.clamp(0.0, 1.0), y: self.y.clamp(0.0, 1.0) }
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance in normalized units.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A captured sample: a normalized point and the epoch-millisecond time it was taken.
///
/// Only lives for the duration of a gesture; strokes store bare [`Point`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPoint {
    pub point: Point,
    pub time_ms: i64,
}

impl TimedPoint {
    #[must_use]
    pub fn new(point: Point, time_ms: i64) -> Self {
        Self { point, time_ms }
    }
}

/// One continuous pen-down-to-pen-up path.
///
/// Strokes built by the recorder are never empty. Strokes decoded from
/// storage may be; see [`Stroke::is_well_formed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    /// Build a stroke, returning `None` for an empty path.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A single-point stroke, drawn as a dot.
    #[must_use]
    pub fn is_tap(&self) -> bool {
        self.points.len() == 1
    }

    /// Non-empty and every coordinate finite.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| p.is_finite())
    }
}

/// Whether a wall's texture runs with or against the viewer's left-to-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Normal,
    /// Texture u axis is reversed relative to screen x.
    Mirrored,
}

/// Map a stroke from viewer space into a wall's texture space.
///
/// Mirrored walls flip `x' = 1 - x`; normal walls pass through. The renderer
/// calls this for texture targets only, so a stroke is flipped exactly once.
#[must_use]
pub fn transform_for_orientation(stroke: &Stroke, orientation: Orientation) -> Stroke {
    match orientation {
        Orientation::Normal => stroke.clone(),
        Orientation::Mirrored => Stroke {
            points: stroke
                .points
                .iter()
                .map(|p| Point::new(1.0 - p.x, p.y))
                .collect(),
        },
    }
}

/// Screen-space rectangle (CSS pixels) covered by a wall this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl SurfaceBounds {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Zero or negative extent on either axis.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }
}

/// Convert a screen sample into a point on the wall.
///
/// # Errors
///
/// [`GeometryError::Unavailable`] when the bounds have zero width or height,
/// [`GeometryError::Outside`] when the sample misses the rectangle.
pub fn screen_to_surface_normalized(screen_x: f64, screen_y: f64, bounds: &SurfaceBounds) -> Result<Point, GeometryError> {
    if bounds.is_degenerate() {
        return Err(GeometryError::Unavailable);
    }
    let outside_x = screen_x < bounds.min_x || screen_x > bounds.max_x;
    let outside_y = screen_y < bounds.min_y || screen_y > bounds.max_y;
    if outside_x || outside_y || !screen_x.is_finite() || !screen_y.is_finite() {
        return Err(GeometryError::Outside);
    }
    Ok(Point {
        x: (screen_x - bounds.min_x) / bounds.width(),
        y: (screen_y - bounds.min_y) / bounds.height(),
    })
}

/// Inverse of [`screen_to_surface_normalized`]: where a wall point sits on screen.
///
/// The result is held inside `bounds` so that any point of the unit square
/// maps back without landing a rounding step outside the rectangle.
#[must_use]
pub fn surface_normalized_to_screen(point: Point, bounds: &SurfaceBounds) -> (f64, f64) {
    let x = point.x.mul_add(bounds.width(), bounds.min_x);
    let y = point.y.mul_add(bounds.height(), bounds.min_y);
    // max/min rather than clamp: clamp panics on inverted bounds.
    (x.max(bounds.min_x).min(bounds.max_x), y.max(bounds.min_y).min(bounds.max_y))
}
