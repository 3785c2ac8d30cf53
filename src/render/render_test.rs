#![allow(clippy::float_cmp)]

use std::io;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::recording::{DrawCommand, RecordingContext};
use super::*;
use crate::camera::SurfaceId;
use crate::consts::{HOUR_MS, MIN_OPACITY};
use crate::geometry::Stroke;
use crate::implement::{Implement, WALL_PAINT};

const NOW: i64 = 1_700_000_000_000;

fn stroke(points: &[(f64, f64)]) -> Stroke {
    Stroke::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect()).unwrap()
}

fn mark(implement: Implement, strokes: Vec<Stroke>) -> Mark {
    Mark {
        id: Uuid::new_v4(),
        surface_id: SurfaceId::Back,
        implement,
        strokes,
        color: "#1F1A17".into(),
        created_at: NOW,
        expires_at: NOW + implement.decay_ms(),
    }
}

fn moves(ctx: &RecordingContext) -> Vec<(f64, f64)> {
    ctx.commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::MoveTo(x, y) | DrawCommand::LineTo(x, y) => Some((*x, *y)),
            _ => None,
        })
        .collect()
}

fn first_alpha_after_save(ctx: &RecordingContext) -> Option<f64> {
    ctx.commands().windows(2).find_map(|w| match w {
        [DrawCommand::Save, DrawCommand::GlobalAlpha(a)] => Some(*a),
        _ => None,
    })
}

/// Log sink shared between a test and its subscriber.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================
// Dots and paths
// =============================================================

#[test]
fn single_point_draws_one_dot() {
    let m = mark(Implement::BoldMarker, vec![stroke(&[(0.5, 0.5)])]);
    let mut ctx = RecordingContext::new();
    let report = render(&mut ctx, &[&m], &RenderTarget::preview(1024.0, 768.0), NOW).unwrap();
    assert_eq!(ctx.dot_count(), 1);
    assert_eq!(ctx.stroke_count(), 0);
    assert_eq!(report.strokes, 1);
    assert!(ctx.commands().contains(&DrawCommand::Arc { x: 512.0, y: 384.0, radius: 4.5, start: 0.0, end: TAU }));
}

#[test]
fn carve_single_point_draws_nothing() {
    let m = mark(Implement::SlowCarve, vec![stroke(&[(0.5, 0.5)])]);
    let mut ctx = RecordingContext::new();
    let report = render(&mut ctx, &[&m], &RenderTarget::preview(1024.0, 768.0), NOW).unwrap();
    assert_eq!(ctx.dot_count(), 0);
    assert_eq!(ctx.stroke_count(), 0);
    assert_eq!(report.strokes, 0);
    assert_eq!(report.marks, 1);
}

#[test]
fn multi_point_stroke_is_one_path() {
    let m = mark(Implement::BoldMarker, vec![stroke(&[(0.0, 0.0), (0.5, 0.25), (1.0, 1.0)])]);
    let mut ctx = RecordingContext::new();
    render(&mut ctx, &[&m], &RenderTarget::preview(1024.0, 768.0), NOW).unwrap();
    assert_eq!(ctx.stroke_count(), 1);
    assert_eq!(moves(&ctx), vec![(0.0, 0.0), (512.0, 192.0), (1024.0, 768.0)]);
}

#[test]
fn every_stroke_of_a_mark_is_drawn() {
    let m = mark(
        Implement::ChalkDash,
        vec![stroke(&[(0.1, 0.1), (0.2, 0.2)]), stroke(&[(0.6, 0.6)]), stroke(&[(0.3, 0.9), (0.9, 0.3)])],
    );
    let mut ctx = RecordingContext::new();
    let report = render(&mut ctx, &[&m], &RenderTarget::preview(1024.0, 768.0), NOW).unwrap();
    assert_eq!(report.strokes, 3);
    assert_eq!(ctx.stroke_count(), 2);
    assert_eq!(ctx.dot_count(), 1);
}

#[test]
fn malformed_stroke_is_skipped() {
    let empty: Stroke = serde_json::from_str("[]").unwrap();
    let bad = stroke(&[(0.1, f64::NAN), (0.2, 0.2)]);
    let good = stroke(&[(0.1, 0.1), (0.2, 0.2)]);
    let m = mark(Implement::BoldMarker, vec![empty, bad, good]);
    let mut ctx = RecordingContext::new();
    let report = render(&mut ctx, &[&m], &RenderTarget::preview(800.0, 600.0), NOW).unwrap();
    assert_eq!(report.skipped, 2);
    assert_eq!(report.strokes, 1);
    assert_eq!(ctx.stroke_count(), 1);
}

#[test]
fn malformed_stroke_is_logged_as_warning() {
    let log = CapturedLog::default();
    let sink = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || sink.clone())
        .finish();

    let m = mark(Implement::BoldMarker, vec![stroke(&[(0.1, 0.1)]), stroke(&[(f64::NAN, 0.2)])]);
    let report = tracing::subscriber::with_default(subscriber, || {
        render(&mut RecordingContext::new(), &[&m], &RenderTarget::preview(800.0, 600.0), NOW).unwrap()
    });

    assert_eq!(report.skipped, 1);
    let output = log.contents();
    assert!(output.contains("WARN"), "{output}");
    assert!(output.contains("skipping malformed stroke"), "{output}");
    assert!(output.contains("stroke_index=1"), "{output}");
    assert!(output.contains(&m.id.to_string()), "{output}");
}

// =============================================================
// Style
// =============================================================

#[test]
fn width_scales_with_target() {
    let m = mark(Implement::BoldMarker, vec![stroke(&[(0.1, 0.1), (0.2, 0.2)])]);
    let mut small = RecordingContext::new();
    let mut large = RecordingContext::new();
    render(&mut small, &[&m], &RenderTarget::preview(512.0, 512.0), NOW).unwrap();
    render(&mut large, &[&m], &RenderTarget::preview(2048.0, 2048.0), NOW).unwrap();
    assert!(small.commands().contains(&DrawCommand::LineWidth(4.5)));
    assert!(large.commands().contains(&DrawCommand::LineWidth(18.0)));
}

#[test]
fn chalk_dash_pattern_scales_and_solid_resets() {
    let chalk = mark(Implement::ChalkDash, vec![stroke(&[(0.1, 0.1), (0.2, 0.2)])]);
    let marker = mark(Implement::BoldMarker, vec![stroke(&[(0.1, 0.1), (0.2, 0.2)])]);
    let mut ctx = RecordingContext::new();
    render(&mut ctx, &[&chalk, &marker], &RenderTarget::preview(512.0, 512.0), NOW).unwrap();
    let dashes: Vec<&DrawCommand> = ctx.commands().iter().filter(|c| matches!(c, DrawCommand::LineDash(_))).collect();
    assert_eq!(dashes, [&DrawCommand::LineDash(vec![6.0, 4.0]), &DrawCommand::LineDash(Vec::new())]);
}

#[test]
fn cover_out_uses_wall_paint() {
    let m = mark(Implement::CoverOut, vec![stroke(&[(0.1, 0.1), (0.9, 0.9)])]);
    let mut ctx = RecordingContext::new();
    render(&mut ctx, &[&m], &RenderTarget::preview(1024.0, 1024.0), NOW).unwrap();
    assert!(ctx.commands().contains(&DrawCommand::StrokeStyle(WALL_PAINT.into())));
    assert!(!ctx.commands().contains(&DrawCommand::StrokeStyle("#1F1A17".into())));
}

#[test]
fn marker_shadow_is_set_and_chalk_clears_it() {
    let marker = mark(Implement::BoldMarker, vec![stroke(&[(0.1, 0.1), (0.2, 0.2)])]);
    let chalk = mark(Implement::ChalkDash, vec![stroke(&[(0.1, 0.1), (0.2, 0.2)])]);
    let mut ctx = RecordingContext::new();
    render(&mut ctx, &[&marker, &chalk], &RenderTarget::preview(1024.0, 1024.0), NOW).unwrap();
    assert!(ctx.commands().iter().any(|c| matches!(c, DrawCommand::Shadow { .. })));
    assert!(ctx.commands().contains(&DrawCommand::NoShadow));
}

// =============================================================
// Opacity and state hygiene
// =============================================================

#[test]
fn opacity_follows_decay() {
    let mut m = mark(Implement::LightSketch, vec![stroke(&[(0.1, 0.1), (0.2, 0.2)])]);
    m.created_at = NOW - 4 * HOUR_MS;
    m.expires_at = NOW;
    let mut ctx = RecordingContext::new();
    render(&mut ctx, &[&m], &RenderTarget::preview(800.0, 600.0), NOW).unwrap();
    assert_eq!(first_alpha_after_save(&ctx), Some(MIN_OPACITY));
}

#[test]
fn alpha_is_reset_after_render() {
    let mut faded = mark(Implement::ChalkDash, vec![stroke(&[(0.1, 0.1), (0.2, 0.2)])]);
    faded.created_at = NOW - HOUR_MS;
    faded.expires_at = NOW;
    let mut ctx = RecordingContext::new();
    render(&mut ctx, &[&faded], &RenderTarget::preview(800.0, 600.0), NOW).unwrap();
    assert_eq!(ctx.global_alpha(), 1.0);
    assert_eq!(ctx.save_depth(), 0);
    assert_eq!(ctx.commands().last(), Some(&DrawCommand::GlobalAlpha(1.0)));
}

#[test]
fn backend_error_propagates_and_state_is_restored() {
    // A negative target width yields a negative dot radius.
    let m = mark(Implement::BoldMarker, vec![stroke(&[(0.5, 0.5)])]);
    let mut ctx = RecordingContext::new();
    let result = render(&mut ctx, &[&m], &RenderTarget::preview(-100.0, 100.0), NOW);
    assert!(matches!(result, Err(RenderError::Backend(_))));
    assert_eq!(ctx.global_alpha(), 1.0);
    assert_eq!(ctx.save_depth(), 0);
}

#[test]
fn render_clears_full_target_first() {
    let mut ctx = RecordingContext::new();
    let report = render(&mut ctx, &[], &RenderTarget::preview(640.0, 480.0), NOW).unwrap();
    assert_eq!(report, RenderReport::default());
    assert_eq!(ctx.commands()[0], DrawCommand::ClearRect { x: 0.0, y: 0.0, width: 640.0, height: 480.0 });
}

// =============================================================
// Orientation
// =============================================================

#[test]
fn mirrored_texture_flips_horizontally() {
    let m = mark(Implement::BoldMarker, vec![stroke(&[(0.25, 0.5), (0.5, 0.75)])]);
    let mut ctx = RecordingContext::new();
    render(&mut ctx, &[&m], &RenderTarget::texture(1000.0, 1000.0, Orientation::Mirrored), NOW).unwrap();
    assert_eq!(moves(&ctx), vec![(750.0, 500.0), (500.0, 750.0)]);
}

#[test]
fn preview_is_never_flipped() {
    let m = mark(Implement::BoldMarker, vec![stroke(&[(0.25, 0.5), (0.5, 0.75)])]);
    let mut ctx = RecordingContext::new();
    render(&mut ctx, &[&m], &RenderTarget::preview(1000.0, 1000.0), NOW).unwrap();
    assert_eq!(moves(&ctx), vec![(250.0, 500.0), (500.0, 750.0)]);
}

// =============================================================
// Determinism
// =============================================================

#[test]
fn same_inputs_give_same_command_log() {
    let marks = [
        mark(Implement::LightSketch, vec![stroke(&[(0.1, 0.1), (0.3, 0.2), (0.5, 0.6), (0.7, 0.4)])]),
        mark(Implement::SlowCarve, vec![stroke(&[(0.2, 0.8), (0.6, 0.8)])]),
        mark(Implement::ChalkDash, vec![stroke(&[(0.9, 0.1)])]),
    ];
    let refs: Vec<&Mark> = marks.iter().collect();
    let target = RenderTarget::texture(1024.0, 512.0, Orientation::Mirrored);

    let mut first = RecordingContext::new();
    let mut second = RecordingContext::new();
    render(&mut first, &refs, &target, NOW + HOUR_MS).unwrap();
    render(&mut second, &refs, &target, NOW + HOUR_MS).unwrap();
    assert_eq!(first.commands(), second.commands());
}

#[test]
fn sketch_jitter_moves_points_but_not_the_start() {
    let m = mark(Implement::LightSketch, vec![stroke(&[(0.25, 0.25), (0.5, 0.5), (0.75, 0.25)])]);
    let mut ctx = RecordingContext::new();
    render(&mut ctx, &[&m], &RenderTarget::preview(1024.0, 1024.0), NOW).unwrap();
    let pts = moves(&ctx);
    assert_eq!(pts[0], (256.0, 256.0));
    let amplitude = crate::consts::SKETCH_JITTER_PX;
    for (actual, expected) in pts[1..].iter().zip([(512.0, 512.0), (768.0, 256.0)]) {
        assert!((actual.0 - expected.0).abs() <= amplitude + 1e-9);
        assert!((actual.1 - expected.1).abs() <= amplitude + 1e-9);
    }
}

#[test]
fn jitter_depends_on_mark_stroke_and_point() {
    let id = Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
    assert_eq!(jitter_offset(id, 0, 1, 1.0), jitter_offset(id, 0, 1, 1.0));
    assert_ne!(jitter_seed(id, 0, 1), jitter_seed(id, 0, 2));
    assert_ne!(jitter_seed(id, 0, 1), jitter_seed(id, 1, 1));
    assert_ne!(jitter_seed(id, 0, 1), jitter_seed(Uuid::from_u128(7), 0, 1));
}

#[test]
fn jitter_offset_stays_within_amplitude() {
    let id = Uuid::from_u128(42);
    for point_index in 0..200 {
        let (dx, dy) = jitter_offset(id, 3, point_index, 0.6);
        assert!(dx.abs() <= 0.6 && dy.abs() <= 0.6);
    }
}

#[test]
fn custom_reference_width_changes_scale() {
    let renderer = StrokeRenderer::new(512.0);
    assert_eq!(renderer.scale_for(&RenderTarget::preview(1024.0, 10.0)), 2.0);
    assert_eq!(StrokeRenderer::new(0.0).scale_for(&RenderTarget::preview(1024.0, 10.0)), 1.0);
}
