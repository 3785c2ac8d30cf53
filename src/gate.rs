//! Velocity gate for the carve implement.
//!
//! Carving only registers slow, deliberate motion. Each new sample is compared
//! with the last accepted one; if the pointer moved faster than the threshold
//! the sample is dropped. Dropping is the whole effect: the resulting gap or
//! kink is what a rushed carve looks like, so no error is raised.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use tracing::{debug, trace};

use crate::consts::DEFAULT_VELOCITY_THRESHOLD;
use crate::geometry::TimedPoint;

/// Whether `candidate` may follow `last`.
///
/// Distances are measured in the wall's own pixel space (`surface_px_w` ×
/// `surface_px_h`), not device pixels, so the same threshold holds on a
/// small preview and a full-screen wall. A zero or negative time step is
/// accepted unconditionally.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn accept(last: &TimedPoint, candidate: &TimedPoint, surface_px_w: f64, surface_px_h: f64, threshold: f64) -> bool {
    let dt = candidate.time_ms.saturating_sub(last.time_ms);
    if dt < 0 {
        debug!(dt, "out-of-order sample accepted");
    }
    if dt <= 0 {
        return true;
    }

    let dx = (candidate.point.x - last.point.x) * surface_px_w;
    let dy = (candidate.point.y - last.point.y) * surface_px_h;
    let velocity = dx.hypot(dy) / dt as f64;

    let accepted = velocity <= threshold;
    if !accepted {
        trace!(velocity, threshold, dt, "carve sample rejected");
    }
    accepted
}

/// A velocity gate with a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityGate {
    /// Maximum velocity in surface pixels per millisecond.
    pub threshold: f64,
}

impl Default for VelocityGate {
    fn default() -> Self {
        Self { threshold: DEFAULT_VELOCITY_THRESHOLD }
    }
}

impl VelocityGate {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// See [`accept`].
    #[must_use]
    pub fn accept(&self, last: &TimedPoint, candidate: &TimedPoint, surface_px_w: f64, surface_px_h: f64) -> bool {
        accept(last, candidate, surface_px_w, surface_px_h, self.threshold)
    }
}
