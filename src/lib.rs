//! Stroke capture and rendering core for the shared ink walls.
//!
//! Anonymous visitors draw on three walls of a 3D enclosure. This crate owns
//! everything between a raw pointer event and a rasterized wall: projecting a
//! wall's 3D quad into a screen rectangle, normalizing pointer samples onto
//! that wall, gating and snapping samples for the carve implement, recording
//! strokes into marks, deriving each mark's decayed opacity from its
//! timestamps, and replaying marks onto a raster target. Persistence, fan-out,
//! scene setup and UI chrome belong to the host; the [`relay`] module defines
//! the traits the host implements for them.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Host-facing wall engine; turns pointer events into [`engine::Action`]s |
//! | [`capture`] | Capture pipeline: projector → gate → snapper → recorder |
//! | [`camera`] | 3D camera, enclosure walls and screen-space bounds projection |
//! | [`geometry`] | Normalized points, screen bounds and orientation flips |
//! | [`gate`] | Velocity gate for the carve implement |
//! | [`snap`] | Eight-way angle snapper for the carve implement |
//! | [`recorder`] | Gesture state machine and mark drafts |
//! | [`implement`] | Closed implement catalogue with styles and decay durations |
//! | [`mark`] | Committed marks and the local mark set |
//! | [`decay`] | Time-based opacity |
//! | [`render`] | Raster context trait and the stroke renderer |
//! | [`relay`] | Persistence/broadcast ports, in-memory adapters, submission |
//! | [`wire`] | JSON envelope for broadcast events |
//! | [`config`] | Environment-driven tuning |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod capture;
pub mod config;
pub mod consts;
pub mod decay;
pub mod engine;
pub mod error;
pub mod gate;
pub mod geometry;
pub mod implement;
pub mod mark;
pub mod recorder;
pub mod relay;
pub mod render;
pub mod snap;
pub mod wire;
