//! Time-based opacity.
//!
//! Opacity is a pure function of a mark's timestamps, its implement and the
//! caller's `now`. Nothing here reads a clock, and nothing stores the result;
//! the renderer evaluates it on every frame so fades stay continuous.

#[cfg(test)]
#[path = "decay_test.rs"]
mod decay_test;

use crate::consts::{FADE_RANGE, MIN_OPACITY};
use crate::implement::Implement;

/// Visible opacity of a mark at `now`, all times in epoch milliseconds.
///
/// Non-fading implements always return `1.0`. Fading implements fall
/// linearly from `1.0` at `created_at` to [`MIN_OPACITY`] at `expires_at`
/// and stay there. A non-positive lifespan counts as fully faded.
#[must_use]
pub fn opacity(created_at: i64, expires_at: i64, implement: Implement, now: i64) -> f64 {
    if !implement.fades() {
        return 1.0;
    }
    let elapsed = progress(created_at, expires_at, now);
    if elapsed >= 1.0 {
        return MIN_OPACITY;
    }
    (1.0 - elapsed * FADE_RANGE).clamp(MIN_OPACITY, 1.0)
}

/// Fraction of the lifespan elapsed at `now`, clamped to `[0, 1]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn progress(created_at: i64, expires_at: i64, now: i64) -> f64 {
    let lifespan = expires_at.saturating_sub(created_at);
    if lifespan <= 0 {
        return 1.0;
    }
    let age = now.saturating_sub(created_at);
    (age as f64 / lifespan as f64).clamp(0.0, 1.0)
}

/// Whether opacity has bottomed out (fading) or the mark is past expiry (any implement).
#[must_use]
pub fn is_spent(created_at: i64, expires_at: i64, now: i64) -> bool {
    progress(created_at, expires_at, now) >= 1.0
}
