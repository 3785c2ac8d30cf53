//! Shared numeric constants for the ink wall core.

// ── Capture ─────────────────────────────────────────────────────

/// Maximum carve velocity in surface pixels per millisecond.
///
/// Calibrated against an 800×600 wall; kept as-is on other sizes because the
/// gate measures in the wall's own pixel space.
pub const DEFAULT_VELOCITY_THRESHOLD: f64 = 0.15;

/// Number of equally spaced directions the carve snapper bins into.
pub const SNAP_DIRECTIONS: u32 = 8;

/// Normalized distance below which the snapper leaves a sample alone.
pub const SNAP_JITTER_THRESHOLD: f64 = 0.005;

// ── Decay ───────────────────────────────────────────────────────

/// Opacity of a fading mark at (and after) its expiry.
pub const MIN_OPACITY: f64 = 0.3;

/// Opacity lost over a fading mark's full lifespan.
pub const FADE_RANGE: f64 = 1.0 - MIN_OPACITY;

/// One hour in milliseconds.
pub const HOUR_MS: i64 = 60 * 60 * 1000;

// ── Rendering ───────────────────────────────────────────────────

/// Target width, in pixels, at which implement styles are authored.
pub const REFERENCE_WIDTH: f64 = 1024.0;

/// Peak per-segment jitter for the sketch implement, in reference pixels.
pub const SKETCH_JITTER_PX: f64 = 0.6;
