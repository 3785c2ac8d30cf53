//! Rendering: replays marks onto a raster target.
//!
//! The renderer only talks to a [`RasterContext`], a small Canvas2D-shaped
//! trait. Backends: [`recording::RecordingContext`] keeps a command log
//! (headless, deterministic) and, with the `web` feature, the browser's
//! `CanvasRenderingContext2d` draws real pixels for the preview overlay and
//! the wall textures.
//!
//! Strokes are stored in viewer space. Texture targets on mirrored walls flip
//! them here, once; preview targets never flip.
//!
//! All fallible raster calls propagate [`RenderError`]. A malformed stroke is
//! not an error: it is skipped and counted so one bad mark cannot blank a wall.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

pub mod recording;
#[cfg(feature = "web")]
pub mod web;

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::consts::REFERENCE_WIDTH;
use crate::error::RenderError;
use crate::geometry::{self, Orientation, Point};
use crate::implement::{LineCap, LineJoin, Shadow, Style};
use crate::mark::{Mark, MarkId};

/// The subset of a 2D canvas API the stroke renderer needs.
pub trait RasterContext {
    fn save(&mut self);
    fn restore(&mut self);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_stroke_style(&mut self, color: &str);
    fn set_fill_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    /// Empty `segments` restores solid lines.
    ///
    /// # Errors
    ///
    /// Backend-specific failure.
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), RenderError>;
    /// `None` disables the shadow.
    fn set_shadow(&mut self, shadow: Option<&Shadow>);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    /// # Errors
    ///
    /// Backend-specific failure (e.g. negative radius).
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), RenderError>;
    fn fill(&mut self);
    fn stroke(&mut self);
}

/// Size and orientation of the raster being drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTarget {
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
}

impl RenderTarget {
    /// Screen-aligned overlay; strokes are drawn as the viewer drew them.
    #[must_use]
    pub fn preview(width: f64, height: f64) -> Self {
        Self { width, height, orientation: Orientation::Normal }
    }

    /// Wall texture; strokes are mapped into the wall's texture space.
    #[must_use]
    pub fn texture(width: f64, height: f64, orientation: Orientation) -> Self {
        Self { width, height, orientation }
    }

    fn to_pixels(self, p: Point) -> (f64, f64) {
        (p.x * self.width, p.y * self.height)
    }
}

/// What a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderReport {
    pub marks: usize,
    pub strokes: usize,
    /// Malformed strokes left out.
    pub skipped: usize,
}

/// Stroke renderer with a configurable style reference width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeRenderer {
    pub reference_width: f64,
}

impl Default for StrokeRenderer {
    fn default() -> Self {
        Self { reference_width: REFERENCE_WIDTH }
    }
}

impl StrokeRenderer {
    #[must_use]
    pub fn new(reference_width: f64) -> Self {
        Self { reference_width }
    }

    /// Style scale factor for a target.
    #[must_use]
    pub fn scale_for(&self, target: &RenderTarget) -> f64 {
        if self.reference_width > 0.0 { target.width / self.reference_width } else { 1.0 }
    }

    /// Clear the target and draw `marks` in order at their opacity for `now`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the raster backend rejects a call.
    pub fn render<C>(&self, ctx: &mut C, marks: &[&Mark], target: &RenderTarget, now: i64) -> Result<RenderReport, RenderError>
    where
        C: RasterContext + ?Sized,
    {
        ctx.clear_rect(0.0, 0.0, target.width, target.height);
        let scale = self.scale_for(target);
        let mut report = RenderReport::default();

        let mut outcome = Ok(());
        for mark in marks {
            ctx.save();
            ctx.set_global_alpha(mark.opacity_at(now));
            let drawn = draw_mark(ctx, mark, target, scale, &mut report);
            ctx.restore();
            if drawn.is_err() {
                outcome = drawn;
                break;
            }
            report.marks += 1;
        }

        // Backends without save/restore must not carry a faded alpha into the next batch.
        ctx.set_global_alpha(1.0);
        outcome.map(|()| report)
    }
}

/// Render with the default reference width. See [`StrokeRenderer::render`].
///
/// # Errors
///
/// Returns `Err` if the raster backend rejects a call.
pub fn render<C>(ctx: &mut C, marks: &[&Mark], target: &RenderTarget, now: i64) -> Result<RenderReport, RenderError>
where
    C: RasterContext + ?Sized,
{
    StrokeRenderer::default().render(ctx, marks, target, now)
}

// =============================================================
// Mark drawing
// =============================================================

fn draw_mark<C>(
    ctx: &mut C,
    mark: &Mark,
    target: &RenderTarget,
    scale: f64,
    report: &mut RenderReport,
) -> Result<(), RenderError>
where
    C: RasterContext + ?Sized,
{
    let style = mark.implement.style();
    let color = style.color.unwrap_or(&mark.color);
    apply_style(ctx, &style, color, scale)?;

    for (stroke_index, stroke) in mark.strokes.iter().enumerate() {
        if !stroke.is_well_formed() {
            warn!(mark_id = %mark.id, stroke_index, "skipping malformed stroke");
            report.skipped += 1;
            continue;
        }
        let oriented = geometry::transform_for_orientation(stroke, target.orientation);
        let points = oriented.points();

        if let [only] = points {
            if mark.implement.allows_taps() {
                draw_dot(ctx, target.to_pixels(*only), style.width * scale * 0.5)?;
                report.strokes += 1;
            }
            continue;
        }

        draw_path(ctx, points, target, &style, scale, mark.id, stroke_index);
        report.strokes += 1;
    }
    Ok(())
}

fn apply_style<C>(ctx: &mut C, style: &Style, color: &str, scale: f64) -> Result<(), RenderError>
where
    C: RasterContext + ?Sized,
{
    ctx.set_stroke_style(color);
    ctx.set_fill_style(color);
    ctx.set_line_width(style.width * scale);
    ctx.set_line_cap(style.cap);
    ctx.set_line_join(style.join);
    match style.dash {
        Some([on, off]) => ctx.set_line_dash(&[on * scale, off * scale])?,
        None => ctx.set_line_dash(&[])?,
    }
    let shadow = style.shadow.map(|s| Shadow {
        blur: s.blur * scale,
        offset_x: s.offset_x * scale,
        offset_y: s.offset_y * scale,
        color: s.color,
    });
    ctx.set_shadow(shadow.as_ref());
    Ok(())
}

fn draw_dot<C>(ctx: &mut C, (x, y): (f64, f64), radius: f64) -> Result<(), RenderError>
where
    C: RasterContext + ?Sized,
{
    ctx.begin_path();
    ctx.arc(x, y, radius, 0.0, TAU)?;
    ctx.fill();
    Ok(())
}

fn draw_path<C>(
    ctx: &mut C,
    points: &[Point],
    target: &RenderTarget,
    style: &Style,
    scale: f64,
    mark_id: MarkId,
    stroke_index: usize,
) where
    C: RasterContext + ?Sized,
{
    let amplitude = style.jitter * scale;
    ctx.begin_path();
    for (point_index, point) in points.iter().enumerate() {
        let (mut x, mut y) = target.to_pixels(*point);
        if amplitude > 0.0 && point_index > 0 {
            let (dx, dy) = jitter_offset(mark_id, stroke_index, point_index, amplitude);
            x += dx;
            y += dy;
        }
        if point_index == 0 {
            ctx.move_to(x, y);
        } else {
            ctx.line_to(x, y);
        }
    }
    ctx.stroke();
}

// =============================================================
// Jitter
// =============================================================

/// Seed for one segment's jitter, stable across renders of the same stored mark.
#[must_use]
pub fn jitter_seed(mark_id: MarkId, stroke_index: usize, point_index: usize) -> u64 {
    let (hi, lo) = mark_id.as_u64_pair();
    hi ^ lo.rotate_left(29)
        ^ (stroke_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (point_index as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}

/// Displacement of one segment end, each axis within `±amplitude`.
#[must_use]
pub fn jitter_offset(mark_id: MarkId, stroke_index: usize, point_index: usize, amplitude: f64) -> (f64, f64) {
    let mut rng = StdRng::seed_from_u64(jitter_seed(mark_id, stroke_index, point_index));
    let dx: f64 = rng.random_range(-1.0..=1.0);
    let dy: f64 = rng.random_range(-1.0..=1.0);
    (dx * amplitude, dy * amplitude)
}
