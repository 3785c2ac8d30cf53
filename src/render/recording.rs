//! Headless raster backend that records every call.
//!
//! Two renders that produce equal command logs produce equal pixels on any
//! deterministic backend, so the log is what snapshot comparisons and
//! determinism checks look at.

use crate::error::RenderError;
use crate::implement::{LineCap, LineJoin, Shadow};
use crate::render::RasterContext;

/// One recorded raster call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    ClearRect { x: f64, y: f64, width: f64, height: f64 },
    GlobalAlpha(f64),
    StrokeStyle(String),
    FillStyle(String),
    LineWidth(f64),
    LineCap(LineCap),
    LineJoin(LineJoin),
    LineDash(Vec<f64>),
    Shadow { blur: f64, offset_x: f64, offset_y: f64, color: String },
    NoShadow,
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Arc { x: f64, y: f64, radius: f64, start: f64, end: f64 },
    Fill,
    Stroke,
}

/// Records draw calls and tracks the alpha/save-stack state a real canvas would.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    alpha: f64,
    saved_alpha: Vec<f64>,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self { commands: Vec::new(), alpha: 1.0, saved_alpha: Vec::new() }
    }
}

impl RecordingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the log, leaving the context empty but keeping its state.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Current global alpha.
    #[must_use]
    pub fn global_alpha(&self) -> f64 {
        self.alpha
    }

    /// Number of unmatched `save` calls.
    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.saved_alpha.len()
    }

    /// Count of filled dots (`arc` followed by `fill`).
    #[must_use]
    pub fn dot_count(&self) -> usize {
        self.commands
            .windows(2)
            .filter(|w| matches!(w, [DrawCommand::Arc { .. }, DrawCommand::Fill]))
            .count()
    }

    /// Count of stroked paths.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke))
            .count()
    }
}

impl RasterContext for RecordingContext {
    fn save(&mut self) {
        self.saved_alpha.push(self.alpha);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(alpha) = self.saved_alpha.pop() {
            self.alpha = alpha;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::ClearRect { x, y, width, height });
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::StrokeStyle(color.to_owned()));
    }

    fn set_fill_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::FillStyle(color.to_owned()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.commands.push(DrawCommand::LineCap(cap));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.commands.push(DrawCommand::LineJoin(join));
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), RenderError> {
        if segments.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(RenderError::Backend(format!("invalid dash pattern {segments:?}")));
        }
        self.commands.push(DrawCommand::LineDash(segments.to_vec()));
        Ok(())
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        let command = match shadow {
            Some(s) => DrawCommand::Shadow {
                blur: s.blur,
                offset_x: s.offset_x,
                offset_y: s.offset_y,
                color: s.color.to_owned(),
            },
            None => DrawCommand::NoShadow,
        };
        self.commands.push(command);
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo(x, y));
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), RenderError> {
        if radius < 0.0 {
            return Err(RenderError::Backend(format!("negative arc radius {radius}")));
        }
        self.commands.push(DrawCommand::Arc { x, y, radius, start, end });
        Ok(())
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }
}
