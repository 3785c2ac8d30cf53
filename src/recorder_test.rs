use uuid::Uuid;

use super::*;

fn sample(x: f64, y: f64, time_ms: i64) -> TimedPoint {
    TimedPoint::new(Point::new(x, y), time_ms)
}

fn draw_line(rec: &mut StrokeRecorder, from: (f64, f64), to: (f64, f64)) {
    rec.begin(sample(from.0, from.1, 0));
    rec.push(sample(to.0, to.1, 16));
    assert!(rec.finish());
}

// =============================================================
// Gesture state machine
// =============================================================

#[test]
fn new_recorder_is_idle_and_unlocked() {
    let rec = StrokeRecorder::new(Implement::BoldMarker);
    assert!(matches!(rec.gesture(), GestureState::Idle));
    assert!(!rec.is_locked());
    assert!(rec.strokes().is_empty());
}

#[test]
fn begin_push_finish_seals_one_stroke() {
    let mut rec = StrokeRecorder::new(Implement::LightSketch);
    rec.begin(sample(0.1, 0.1, 0));
    rec.push(sample(0.2, 0.2, 16));
    rec.push(sample(0.3, 0.2, 32));
    assert!(rec.is_active());
    assert!(rec.finish());
    assert!(!rec.is_active());
    assert_eq!(rec.strokes().len(), 1);
    assert_eq!(rec.strokes()[0].len(), 3);
}

#[test]
fn second_begin_while_active_is_ignored() {
    let mut rec = StrokeRecorder::new(Implement::LightSketch);
    rec.begin(sample(0.1, 0.1, 0));
    rec.begin(sample(0.9, 0.9, 5));
    assert_eq!(rec.last_sample().map(|s| s.point), Some(Point::new(0.1, 0.1)));
}

#[test]
fn push_while_idle_is_ignored() {
    let mut rec = StrokeRecorder::new(Implement::LightSketch);
    rec.push(sample(0.1, 0.1, 0));
    assert!(!rec.is_active());
    assert!(!rec.finish());
    assert!(rec.strokes().is_empty());
}

#[test]
fn tap_becomes_dot_for_marker() {
    let mut rec = StrokeRecorder::new(Implement::BoldMarker);
    rec.begin(sample(0.4, 0.4, 0));
    assert!(rec.finish());
    assert!(rec.strokes()[0].is_tap());
}

#[test]
fn tap_is_dropped_for_carve() {
    let mut rec = StrokeRecorder::new(Implement::SlowCarve);
    rec.begin(sample(0.4, 0.4, 0));
    assert!(!rec.finish());
    assert!(rec.strokes().is_empty());
    assert!(!rec.is_locked());
}

#[test]
fn cancel_discards_open_path_only() {
    let mut rec = StrokeRecorder::new(Implement::LightSketch);
    draw_line(&mut rec, (0.1, 0.1), (0.2, 0.2));
    rec.begin(sample(0.5, 0.5, 100));
    rec.push(sample(0.6, 0.6, 116));
    rec.cancel();
    assert!(!rec.is_active());
    assert_eq!(rec.strokes().len(), 1);
}

#[test]
fn preview_includes_open_path() {
    let mut rec = StrokeRecorder::new(Implement::LightSketch);
    draw_line(&mut rec, (0.1, 0.1), (0.2, 0.2));
    rec.begin(sample(0.5, 0.5, 100));
    assert_eq!(rec.preview_strokes().len(), 2);
    rec.cancel();
    assert_eq!(rec.preview_strokes().len(), 1);
}

// =============================================================
// Implement lock
// =============================================================

#[test]
fn implement_switch_allowed_on_empty_draft() {
    let mut rec = StrokeRecorder::new(Implement::LightSketch);
    assert_eq!(rec.set_implement(Implement::ChalkDash), Ok(()));
    assert_eq!(rec.implement(), Implement::ChalkDash);
}

#[test]
fn implement_locked_during_gesture() {
    let mut rec = StrokeRecorder::new(Implement::LightSketch);
    rec.begin(sample(0.1, 0.1, 0));
    assert_eq!(rec.set_implement(Implement::BoldMarker), Err(CaptureError::ImplementLocked));
    assert_eq!(rec.implement(), Implement::LightSketch);
}

#[test]
fn implement_locked_after_first_stroke() {
    let mut rec = StrokeRecorder::new(Implement::LightSketch);
    draw_line(&mut rec, (0.1, 0.1), (0.2, 0.2));
    assert_eq!(rec.set_implement(Implement::BoldMarker), Err(CaptureError::ImplementLocked));
    // Reselecting the current implement is always fine.
    assert_eq!(rec.set_implement(Implement::LightSketch), Ok(()));
}

#[test]
fn discard_unlocks_implement() {
    let mut rec = StrokeRecorder::new(Implement::LightSketch);
    draw_line(&mut rec, (0.1, 0.1), (0.2, 0.2));
    rec.discard();
    assert!(rec.strokes().is_empty());
    assert_eq!(rec.set_implement(Implement::SlowCarve), Ok(()));
}

// =============================================================
// Commit
// =============================================================

#[test]
fn commit_builds_mark_with_expiry() {
    let mut rec = StrokeRecorder::new(Implement::BoldMarker);
    draw_line(&mut rec, (0.1, 0.1), (0.2, 0.2));
    draw_line(&mut rec, (0.5, 0.5), (0.6, 0.7));
    let id = Uuid::new_v4();
    let mark = rec.commit(id, SurfaceId::Left, "#112233", 1_000).unwrap().unwrap();
    assert_eq!(mark.id, id);
    assert_eq!(mark.surface_id, SurfaceId::Left);
    assert_eq!(mark.implement, Implement::BoldMarker);
    assert_eq!(mark.strokes.len(), 2);
    assert_eq!(mark.color, "#112233");
    assert_eq!(mark.created_at, 1_000);
    assert_eq!(mark.expires_at, 1_000 + Implement::BoldMarker.decay_ms());
    assert!(rec.strokes().is_empty());
    assert!(!rec.is_locked());
}

#[test]
fn commit_of_empty_draft_is_none() {
    let mut rec = StrokeRecorder::new(Implement::LightSketch);
    assert_eq!(rec.commit(Uuid::new_v4(), SurfaceId::Back, "#000", 0), Ok(None));
}

#[test]
fn commit_during_gesture_is_rejected() {
    let mut rec = StrokeRecorder::new(Implement::LightSketch);
    draw_line(&mut rec, (0.1, 0.1), (0.2, 0.2));
    rec.begin(sample(0.5, 0.5, 100));
    assert_eq!(rec.commit(Uuid::new_v4(), SurfaceId::Back, "#000", 0), Err(CaptureError::GestureActive));
    assert_eq!(rec.strokes().len(), 1);
}
