//! Committed marks and the local, render-ready mark set.
//!
//! A [`Mark`] is what a visitor submits: one or more strokes drawn with a
//! single implement on a single wall, plus creation and expiry timestamps.
//! Marks arrive here from three directions (the local recorder, a snapshot
//! fetched from the store, and the broadcast channel) and are all held in one
//! [`MarkSet`] that the renderer reads.

#[cfg(test)]
#[path = "mark_test.rs"]
mod mark_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::camera::SurfaceId;
use crate::decay;
use crate::geometry::Stroke;
use crate::implement::Implement;

/// Unique identifier for a mark.
pub type MarkId = Uuid;

/// A committed drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub id: MarkId,
    pub surface_id: SurfaceId,
    pub implement: Implement,
    pub strokes: Vec<Stroke>,
    /// CSS color string.
    pub color: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub expires_at: i64,
}

impl Mark {
    /// Current opacity; see [`decay::opacity`].
    #[must_use]
    pub fn opacity_at(&self, now: i64) -> f64 {
        decay::opacity(self.created_at, self.expires_at, self.implement, now)
    }

    /// Whether `now` is at or past the expiry the store will sweep on.
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

/// Everything the store needs to create a mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMark {
    /// Client-generated id. Stores keep it so jitter seeds survive the round-trip.
    pub id: MarkId,
    pub surface_id: SurfaceId,
    pub implement: Implement,
    pub strokes: Vec<Stroke>,
    pub color: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl From<Mark> for NewMark {
    fn from(mark: Mark) -> Self {
        Self {
            id: mark.id,
            surface_id: mark.surface_id,
            implement: mark.implement,
            strokes: mark.strokes,
            color: mark.color,
            created_at: mark.created_at,
            expires_at: mark.expires_at,
        }
    }
}

impl From<NewMark> for Mark {
    fn from(new: NewMark) -> Self {
        Self {
            id: new.id,
            surface_id: new.surface_id,
            implement: new.implement,
            strokes: new.strokes,
            color: new.color,
            created_at: new.created_at,
            expires_at: new.expires_at,
        }
    }
}

/// In-memory set of marks across all walls.
#[derive(Debug, Default)]
pub struct MarkSet {
    marks: HashMap<MarkId, Mark>,
}

impl MarkSet {
    #[must_use]
    pub fn new() -> Self {
        Self { marks: HashMap::new() }
    }

    /// Insert or replace a mark. Returns `true` if the id was new.
    pub fn insert(&mut self, mark: Mark) -> bool {
        self.marks.insert(mark.id, mark).is_none()
    }

    pub fn remove(&mut self, id: &MarkId) -> Option<Mark> {
        self.marks.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &MarkId) -> Option<&Mark> {
        self.marks.get(id)
    }

    /// Replace every mark on `surface` with a fresh snapshot, leaving other walls alone.
    ///
    /// Snapshot entries that belong to another wall are dropped.
    pub fn load_snapshot(&mut self, surface: SurfaceId, marks: Vec<Mark>) {
        self.marks.retain(|_, m| m.surface_id != surface);
        for mark in marks {
            if mark.surface_id != surface {
                debug!(mark_id = %mark.id, expected = ?surface, found = ?mark.surface_id, "snapshot mark on wrong wall");
                continue;
            }
            self.marks.insert(mark.id, mark);
        }
    }

    /// Marks on `surface` in draw order: oldest first, ties broken by id.
    #[must_use]
    pub fn on_surface(&self, surface: SurfaceId) -> Vec<&Mark> {
        let mut marks: Vec<&Mark> = self.marks.values().filter(|m| m.surface_id == surface).collect();
        marks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        marks
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
