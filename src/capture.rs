//! Capture pipeline: screen samples in, normalized strokes out.
//!
//! Each sample runs projector → (gate → snapper, carve only) → recorder.
//! Samples that cannot be mapped (no camera, degenerate bounds, off the wall)
//! are ignored without error, as are samples the velocity gate rejects. An
//! off-wall sample during a gesture leaves the gesture open, and the last
//! accepted sample stays the gate's reference until the pointer returns.

#[cfg(test)]
#[path = "capture_test.rs"]
mod capture_test;

use tracing::debug;
use uuid::Uuid;

use crate::camera::{CameraProvider, Enclosure, SurfaceId};
use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::gate::VelocityGate;
use crate::geometry::{self, Stroke, SurfaceBounds, TimedPoint};
use crate::implement::Implement;
use crate::mark::{Mark, MarkId};
use crate::recorder::StrokeRecorder;
use crate::snap;

/// Capture state for one wall.
#[derive(Debug, Clone)]
pub struct CapturePipeline {
    surface: SurfaceId,
    /// Id the current draft will be committed under; also seeds preview jitter.
    draft_id: MarkId,
    bounds: Option<SurfaceBounds>,
    gate: VelocityGate,
    config: CaptureConfig,
    recorder: StrokeRecorder,
}

impl CapturePipeline {
    #[must_use]
    pub fn new(surface: SurfaceId, implement: Implement, config: CaptureConfig) -> Self {
        Self {
            surface,
            draft_id: Uuid::new_v4(),
            bounds: None,
            gate: VelocityGate::new(config.velocity_threshold),
            config,
            recorder: StrokeRecorder::new(implement),
        }
    }

    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Move capture to another wall. Locked while a draft is in progress.
    ///
    /// # Errors
    ///
    /// [`CaptureError::ImplementLocked`] while the draft holds strokes or a gesture is open.
    pub fn set_surface(&mut self, surface: SurfaceId) -> Result<(), CaptureError> {
        if surface == self.surface {
            return Ok(());
        }
        if self.recorder.is_locked() {
            return Err(CaptureError::ImplementLocked);
        }
        self.surface = surface;
        self.bounds = None;
        Ok(())
    }

    #[must_use]
    pub fn draft_id(&self) -> MarkId {
        self.draft_id
    }

    #[must_use]
    pub fn implement(&self) -> Implement {
        self.recorder.implement()
    }

    /// # Errors
    ///
    /// See [`StrokeRecorder::set_implement`].
    pub fn set_implement(&mut self, implement: Implement) -> Result<(), CaptureError> {
        self.recorder.set_implement(implement)
    }

    #[must_use]
    pub fn bounds(&self) -> Option<SurfaceBounds> {
        self.bounds
    }

    /// Install this frame's screen bounds. `None` suspends capture.
    pub fn set_bounds(&mut self, bounds: Option<SurfaceBounds>) {
        self.bounds = bounds.filter(|b| !b.is_degenerate());
    }

    /// Recompute bounds from the host's camera and viewport.
    pub fn refresh_bounds(&mut self, enclosure: &Enclosure, provider: &dyn CameraProvider) -> Option<SurfaceBounds> {
        let bounds = provider
            .camera()
            .and_then(|camera| enclosure.project(&camera, provider.viewport(), self.surface));
        self.set_bounds(bounds);
        self.bounds
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.recorder.is_active()
    }

    #[must_use]
    pub fn recorder(&self) -> &StrokeRecorder {
        &self.recorder
    }

    /// Pointer down. Returns `true` if a gesture opened.
    pub fn start(&mut self, screen_x: f64, screen_y: f64, now: i64) -> bool {
        if self.recorder.is_active() {
            return false;
        }
        let Some(bounds) = self.bounds else {
            debug!(surface = ?self.surface, "start ignored: bounds unavailable");
            return false;
        };
        match geometry::screen_to_surface_normalized(screen_x, screen_y, &bounds) {
            Ok(point) => {
                self.recorder.begin(TimedPoint::new(point, now));
                true
            }
            Err(e) => {
                debug!(error = %e, "start ignored");
                false
            }
        }
    }

    /// Pointer move. Returns `true` if a point was appended.
    pub fn move_to(&mut self, screen_x: f64, screen_y: f64, now: i64) -> bool {
        if !self.recorder.is_active() {
            return false;
        }
        let Some(bounds) = self.bounds else {
            return false;
        };
        let Ok(point) = geometry::screen_to_surface_normalized(screen_x, screen_y, &bounds) else {
            return false;
        };
        let candidate = TimedPoint::new(point, now);

        if !self.recorder.implement().is_constrained() {
            self.recorder.push(candidate);
            return true;
        }

        let Some(last) = self.recorder.last_sample().copied() else {
            return false;
        };
        if !self.gate.accept(&last, &candidate, bounds.width(), bounds.height()) {
            return false;
        }
        let snapped = snap::snap_with(last.point, point, self.config.snap_directions, self.config.snap_jitter).clamped();
        self.recorder.push(TimedPoint::new(snapped, now));
        true
    }

    /// Pointer up. Returns `true` if a stroke was sealed onto the draft.
    pub fn end(&mut self) -> bool {
        self.recorder.finish()
    }

    /// Pointer left the wall or the gesture was interrupted; drop the open path.
    pub fn cancel(&mut self) {
        self.recorder.cancel();
    }

    /// Sealed strokes plus the open path.
    #[must_use]
    pub fn preview_strokes(&self) -> Vec<Stroke> {
        self.recorder.preview_strokes()
    }

    /// The draft as a transient mark created at `now`, for preview rendering.
    ///
    /// Uses the draft id, so jitter in the preview matches the committed mark.
    #[must_use]
    pub fn preview_mark(&self, color: &str, now: i64) -> Option<Mark> {
        let strokes = self.preview_strokes();
        if strokes.is_empty() {
            return None;
        }
        let implement = self.recorder.implement();
        Some(Mark {
            id: self.draft_id,
            surface_id: self.surface,
            implement,
            strokes,
            color: color.to_owned(),
            created_at: now,
            expires_at: now.saturating_add(implement.decay_ms()),
        })
    }

    /// Drop the draft, unlocking implement and surface.
    pub fn discard(&mut self) {
        self.recorder.discard();
        self.draft_id = Uuid::new_v4();
    }

    /// Seal the draft into a mark on this wall under the draft id.
    ///
    /// # Errors
    ///
    /// [`CaptureError::GestureActive`] while a gesture is open.
    pub fn commit(&mut self, color: &str, now: i64) -> Result<Option<Mark>, CaptureError> {
        let committed = self.recorder.commit(self.draft_id, self.surface, color, now)?;
        if committed.is_some() {
            self.draft_id = Uuid::new_v4();
        }
        Ok(committed)
    }
}
