//! Stroke recorder: the per-gesture state machine and the mark draft it fills.
//!
//! A gesture runs `Idle → Active → Idle`. The first accepted sample opens it,
//! further accepted samples extend the working path, and release seals the
//! path into a [`Stroke`] on the draft. A draft can collect several disjoint
//! strokes before it is committed as one [`Mark`].
//!
//! The implement is locked once the draft's first stroke begins; switching
//! requires committing or discarding the draft first.

#[cfg(test)]
#[path = "recorder_test.rs"]
mod recorder_test;

use tracing::debug;

use crate::camera::SurfaceId;
use crate::error::CaptureError;
use crate::geometry::{Point, Stroke, TimedPoint};
use crate::implement::Implement;
use crate::mark::{Mark, MarkId};

/// Gesture state between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Pointer is down and at least one sample was accepted.
    Active {
        /// Accepted samples so far, oldest first. Never empty.
        path: Vec<TimedPoint>,
    },
}

/// Accumulates gestures into a mark draft.
#[derive(Debug, Clone, Default)]
pub struct StrokeRecorder {
    implement: Implement,
    strokes: Vec<Stroke>,
    gesture: GestureState,
}

impl StrokeRecorder {
    #[must_use]
    pub fn new(implement: Implement) -> Self {
        Self { implement, strokes: Vec::new(), gesture: GestureState::Idle }
    }

    #[must_use]
    pub fn implement(&self) -> Implement {
        self.implement
    }

    /// Switch implement. Allowed only while the draft is empty and no gesture is active.
    ///
    /// # Errors
    ///
    /// [`CaptureError::ImplementLocked`] once the draft's first stroke has begun.
    pub fn set_implement(&mut self, implement: Implement) -> Result<(), CaptureError> {
        if implement == self.implement {
            return Ok(());
        }
        if self.is_locked() {
            return Err(CaptureError::ImplementLocked);
        }
        self.implement = implement;
        Ok(())
    }

    /// Whether the implement is locked to the current draft.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.is_active() || !self.strokes.is_empty()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.gesture, GestureState::Active { .. })
    }

    #[must_use]
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    /// Open a gesture with its first accepted sample. Ignored if one is already open.
    pub fn begin(&mut self, sample: TimedPoint) {
        if self.is_active() {
            debug!("begin ignored: gesture already active");
            return;
        }
        self.gesture = GestureState::Active { path: vec![sample] };
    }

    /// Append an accepted sample to the open gesture. Ignored when idle.
    pub fn push(&mut self, sample: TimedPoint) {
        if let GestureState::Active { path } = &mut self.gesture {
            path.push(sample);
        }
    }

    /// The most recent accepted sample of the open gesture.
    #[must_use]
    pub fn last_sample(&self) -> Option<&TimedPoint> {
        match &self.gesture {
            GestureState::Active { path } => path.last(),
            GestureState::Idle => None,
        }
    }

    /// Close the open gesture and seal its path into a stroke.
    ///
    /// Returns `true` if a stroke was added. A one-point path becomes a dot,
    /// except for implements that forbid taps, where it is dropped.
    pub fn finish(&mut self) -> bool {
        let GestureState::Active { path } = std::mem::take(&mut self.gesture) else {
            return false;
        };
        if path.len() == 1 && !self.implement.allows_taps() {
            debug!(implement = ?self.implement, "tap dropped");
            return false;
        }
        let points: Vec<Point> = path.into_iter().map(|s| s.point).collect();
        match Stroke::new(points) {
            Some(stroke) => {
                self.strokes.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Abandon the open gesture without keeping its path.
    pub fn cancel(&mut self) {
        if self.is_active() {
            debug!("gesture cancelled");
        }
        self.gesture = GestureState::Idle;
    }

    /// Sealed strokes of the draft.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Sealed strokes plus the open gesture's path, for live preview.
    #[must_use]
    pub fn preview_strokes(&self) -> Vec<Stroke> {
        let mut out = self.strokes.clone();
        if let GestureState::Active { path } = &self.gesture
            && let Some(stroke) = Stroke::new(path.iter().map(|s| s.point).collect())
        {
            out.push(stroke);
        }
        out
    }

    /// Drop the draft and any open gesture, unlocking the implement.
    pub fn discard(&mut self) {
        self.strokes.clear();
        self.gesture = GestureState::Idle;
    }

    /// Seal the draft into a mark created at `now`.
    ///
    /// Returns `Ok(None)` for an empty draft.
    ///
    /// # Errors
    ///
    /// [`CaptureError::GestureActive`] while a gesture is still open.
    pub fn commit(&mut self, id: MarkId, surface_id: SurfaceId, color: &str, now: i64) -> Result<Option<Mark>, CaptureError> {
        if self.is_active() {
            return Err(CaptureError::GestureActive);
        }
        if self.strokes.is_empty() {
            return Ok(None);
        }
        let strokes = std::mem::take(&mut self.strokes);
        Ok(Some(Mark {
            id,
            surface_id,
            implement: self.implement,
            strokes,
            color: color.to_owned(),
            created_at: now,
            expires_at: now.saturating_add(self.implement.decay_ms()),
        }))
    }
}
