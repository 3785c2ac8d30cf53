//! Angle snapper for the carve implement.
//!
//! Runs after the velocity gate. Each accepted segment is rotated onto the
//! nearest of a fixed set of directions, keeping its length, which turns a
//! wobbly hand path into the straight, angular cuts of a chisel.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use std::f64::consts::TAU;

use crate::consts::{SNAP_DIRECTIONS, SNAP_JITTER_THRESHOLD};
use crate::geometry::Point;

/// Snap `to` onto one of eight directions around `from`.
#[must_use]
pub fn snap(from: Point, to: Point) -> Point {
    snap_with(from, to, SNAP_DIRECTIONS, SNAP_JITTER_THRESHOLD)
}

/// Snap `to` onto one of `directions` equally spaced angles around `from`.
///
/// Segments shorter than `jitter` (normalized units) come back untouched so
/// the first wobble of a gesture does not pick a random direction.
#[must_use]
pub fn snap_with(from: Point, to: Point, directions: u32, jitter: f64) -> Point {
    let distance = from.distance(to);
    if distance < jitter || directions == 0 {
        return to;
    }
    let angle = snapped_angle(from, to, directions);
    Point::new(distance.mul_add(angle.cos(), from.x), distance.mul_add(angle.sin(), from.y))
}

/// Direction of `from → to`, rounded to the nearest multiple of `TAU / directions`.
#[must_use]
pub fn snapped_angle(from: Point, to: Point, directions: u32) -> f64 {
    let raw = (to.y - from.y).atan2(to.x - from.x);
    if directions == 0 {
        return raw;
    }
    let step = TAU / f64::from(directions);
    (raw / step).round() * step
}
