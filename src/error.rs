//! Error types for the ink wall core.
//!
//! Most capture-time conditions (off-wall samples, velocity violations) are
//! filtered silently and never reach these types. Errors here are the ones a
//! host can act on.

/// Why a screen sample could not be mapped onto a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// No perspective camera, or the wall's screen rectangle is degenerate.
    #[error("surface geometry unavailable")]
    Unavailable,
    /// The sample lies outside the wall's screen rectangle.
    #[error("sample outside surface bounds")]
    Outside,
}

/// Errors produced by the capture pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The draft already holds (or is drawing) a stroke with another implement.
    #[error("implement is locked until the current mark is committed or discarded")]
    ImplementLocked,
    /// Operation requires no gesture in progress.
    #[error("a gesture is still in progress")]
    GestureActive,
}

/// Errors produced while drawing to a raster target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The raster backend rejected a call.
    #[error("raster backend error: {0}")]
    Backend(String),
}

/// Errors produced by persistence and broadcast adapters.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The referenced mark does not exist in the store.
    #[error("mark not found: {0}")]
    NotFound(uuid::Uuid),
    /// The channel or backing store has shut down.
    #[error("relay closed")]
    Closed,
    /// A payload could not be encoded or decoded.
    #[error("wire format error: {0}")]
    Wire(#[from] serde_json::Error),
    /// The backend reported a failure.
    #[error("relay backend error: {0}")]
    Backend(String),
}

/// Errors produced while loading configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
