//! Host-facing wall engine.
//!
//! [`EngineCore`] holds all state that does not depend on a runtime: the mark
//! set, the enclosure, the capture pipeline and the renderer. Pointer handlers
//! return [`Action`]s; the host reacts to them (redraw, submit). [`Engine`]
//! adds the store and bus and turns `MarkCommitted` into a fire-and-forget
//! submission.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::camera::{CameraProvider, Enclosure, SurfaceId};
use crate::capture::CapturePipeline;
use crate::config::{CaptureConfig, RenderConfig};
use crate::error::{CaptureError, RelayError, RenderError};
use crate::geometry::SurfaceBounds;
use crate::implement::Implement;
use crate::mark::{Mark, MarkId, MarkSet};
use crate::relay::{self, MarkBus, MarkStore};
use crate::render::{RasterContext, RenderReport, RenderTarget, StrokeRenderer};
use crate::wire::{EventBody, MarkEvent};

/// Default ink color for new marks.
pub const DEFAULT_COLOR: &str = "#1F1A17";

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A mark was committed locally and is already in the mark set.
    MarkCommitted(Mark),
    /// Something visible changed.
    RenderNeeded,
}

/// Engine state that needs no store, bus or runtime.
#[derive(Debug)]
pub struct EngineCore {
    pub marks: MarkSet,
    pub enclosure: Enclosure,
    pub capture: CapturePipeline,
    pub renderer: StrokeRenderer,
    color: String,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(CaptureConfig::default(), RenderConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(capture: CaptureConfig, render: RenderConfig) -> Self {
        Self {
            marks: MarkSet::new(),
            enclosure: Enclosure::default(),
            capture: CapturePipeline::new(SurfaceId::Back, Implement::default(), capture),
            renderer: StrokeRenderer::new(render.reference_width),
            color: DEFAULT_COLOR.to_owned(),
        }
    }

    // --- Data inputs ---

    /// Replace one wall's marks with a fetched snapshot.
    pub fn load_snapshot(&mut self, surface: SurfaceId, marks: Vec<Mark>) -> Action {
        info!(?surface, count = marks.len(), "wall snapshot loaded");
        self.marks.load_snapshot(surface, marks);
        Action::RenderNeeded
    }

    /// Add a mark created elsewhere. Re-delivery of a known id replaces it.
    pub fn apply_remote(&mut self, mark: Mark) -> Action {
        let id = mark.id;
        if !self.marks.insert(mark) {
            debug!(mark_id = %id, "remote mark replaced existing copy");
        }
        Action::RenderNeeded
    }

    pub fn apply_delete(&mut self, id: &MarkId) -> Option<Action> {
        self.marks.remove(id).map(|_| Action::RenderNeeded)
    }

    pub fn apply_clear(&mut self, surface: SurfaceId) -> Action {
        self.marks.load_snapshot(surface, Vec::new());
        Action::RenderNeeded
    }

    /// Apply one broadcast event.
    pub fn apply_event(&mut self, event: MarkEvent) -> Option<Action> {
        match event.body {
            EventBody::Created(mark) => Some(self.apply_remote(mark)),
            EventBody::Deleted { id } => self.apply_delete(&id),
            EventBody::Cleared => Some(self.apply_clear(event.surface_id)),
        }
    }

    /// Apply every event already waiting on `rx` without blocking.
    pub fn drain_events(&mut self, rx: &mut broadcast::Receiver<MarkEvent>) -> Vec<Action> {
        let mut actions = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => actions.extend(self.apply_event(event)),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!(missed, "mark events dropped; next snapshot will reconcile");
                }
                Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => break,
            }
        }
        actions.dedup();
        actions
    }

    // --- Tool state ---

    /// # Errors
    ///
    /// [`CaptureError::ImplementLocked`] while a draft is in progress.
    pub fn set_implement(&mut self, implement: Implement) -> Result<(), CaptureError> {
        self.capture.set_implement(implement)
    }

    /// # Errors
    ///
    /// [`CaptureError::ImplementLocked`] while a draft is in progress.
    pub fn set_surface(&mut self, surface: SurfaceId) -> Result<(), CaptureError> {
        self.capture.set_surface(surface)
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    // --- Geometry ---

    /// Recompute the active wall's screen bounds. Call on camera or viewport change.
    pub fn refresh_bounds(&mut self, provider: &dyn CameraProvider) -> Option<SurfaceBounds> {
        self.capture.refresh_bounds(&self.enclosure, provider)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_x: f64, screen_y: f64, now: i64) -> Vec<Action> {
        if self.capture.start(screen_x, screen_y, now) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    pub fn on_pointer_move(&mut self, screen_x: f64, screen_y: f64, now: i64) -> Vec<Action> {
        if self.capture.move_to(screen_x, screen_y, now) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.capture.end();
        vec![Action::RenderNeeded]
    }

    /// Pointer left the wall mid-gesture; the open path is abandoned.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        if !self.capture.is_active() {
            return Vec::new();
        }
        self.capture.cancel();
        vec![Action::RenderNeeded]
    }

    /// Commit the draft. The mark joins the local set immediately.
    ///
    /// # Errors
    ///
    /// [`CaptureError::GestureActive`] while a gesture is open.
    pub fn commit(&mut self, now: i64) -> Result<Vec<Action>, CaptureError> {
        let Some(mark) = self.capture.commit(&self.color, now)? else {
            return Ok(Vec::new());
        };
        info!(mark_id = %mark.id, surface = ?mark.surface_id, implement = ?mark.implement, strokes = mark.strokes.len(), "mark committed");
        self.marks.insert(mark.clone());
        Ok(vec![Action::MarkCommitted(mark), Action::RenderNeeded])
    }

    /// Throw the draft away.
    pub fn discard(&mut self) -> Action {
        self.capture.discard();
        Action::RenderNeeded
    }

    // --- Render ---

    /// Texture target for `surface`, oriented per the enclosure.
    #[must_use]
    pub fn texture_target(&self, surface: SurfaceId, width: f64, height: f64) -> RenderTarget {
        RenderTarget::texture(width, height, self.enclosure.orientation(surface))
    }

    /// Draw every mark on `surface` at its opacity for `now`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the raster backend rejects a call.
    pub fn render_surface<C>(&self, ctx: &mut C, surface: SurfaceId, target: &RenderTarget, now: i64) -> Result<RenderReport, RenderError>
    where
        C: RasterContext + ?Sized,
    {
        let marks = self.marks.on_surface(surface);
        self.renderer.render(ctx, &marks, target, now)
    }

    /// Draw the in-progress draft onto the screen-aligned preview overlay.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the raster backend rejects a call.
    pub fn render_preview<C>(&self, ctx: &mut C, target: &RenderTarget, now: i64) -> Result<RenderReport, RenderError>
    where
        C: RasterContext + ?Sized,
    {
        let preview = self.capture.preview_mark(&self.color, now);
        let marks: Vec<&Mark> = preview.iter().collect();
        self.renderer.render(ctx, &marks, target, now)
    }
}

/// Engine bound to a store and bus.
pub struct Engine<S, B> {
    pub core: EngineCore,
    store: Arc<S>,
    bus: Arc<B>,
}

impl<S, B> Engine<S, B>
where
    S: MarkStore + 'static,
    B: MarkBus + 'static,
{
    #[must_use]
    pub fn new(core: EngineCore, store: Arc<S>, bus: Arc<B>) -> Self {
        Self { core, store, bus }
    }

    /// Fetch a wall's marks from the store and replace the local copy.
    ///
    /// # Errors
    ///
    /// Propagates the store's error; the local set is left untouched.
    pub async fn fetch_surface(&mut self, surface: SurfaceId) -> Result<Action, RelayError> {
        let marks = self.store.list(surface).await?;
        Ok(self.core.load_snapshot(surface, marks))
    }

    /// Subscribe to a wall's broadcast channel.
    #[must_use]
    pub fn subscribe(&self, surface: SurfaceId) -> broadcast::Receiver<MarkEvent> {
        self.bus.subscribe(surface)
    }

    /// Commit the draft and hand it to the store and bus without waiting.
    ///
    /// Outside any async runtime the mark stays local; see
    /// [`relay::spawn_submit`].
    ///
    /// # Errors
    ///
    /// [`CaptureError::GestureActive`] while a gesture is open.
    pub fn commit(&mut self, now: i64) -> Result<Vec<Action>, CaptureError> {
        let actions = self.core.commit(now)?;
        for action in &actions {
            if let Action::MarkCommitted(mark) = action {
                // Detached; failures are logged by the relay.
                drop(relay::spawn_submit(Arc::clone(&self.store), Arc::clone(&self.bus), mark.clone(), now));
            }
        }
        Ok(actions)
    }
}
