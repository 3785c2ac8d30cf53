//! 3D camera and enclosure walls, and their projection into screen space.
//!
//! The host owns the real scene and camera; this module only needs enough of
//! it to answer one question per frame: which screen rectangle does a wall
//! cover right now? The answer ([`SurfaceBounds`]) keeps the 2D capture and
//! preview layers pixel-aligned with the 3D-rendered wall.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use glam::{DMat4, DVec3, DVec4};
use serde::{Deserialize, Serialize};

use crate::geometry::{Orientation, SurfaceBounds};

/// Smallest clip-space `w` treated as in front of the camera.
const MIN_CLIP_W: f64 = 1e-9;

/// One of the three drawable walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceId {
    Left,
    Back,
    Right,
}

impl SurfaceId {
    /// All walls, in left-to-right viewing order.
    pub const ALL: [Self; 3] = [Self::Left, Self::Back, Self::Right];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Back => "back",
            Self::Right => "right",
        }
    }

    /// Broadcast channel name scoped to this wall.
    #[must_use]
    pub fn channel(self) -> String {
        format!("surface:{}", self.as_str())
    }
}

/// A camera as seen by the projector.
///
/// Only perspective cameras can drive capture; an orthographic camera is
/// representable so hosts can pass whatever they hold, but it yields no bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Camera {
    Perspective { view: DMat4, projection: DMat4 },
    Orthographic { view: DMat4, projection: DMat4 },
}

impl Camera {
    /// Right-handed perspective camera looking from `eye` at `target`.
    ///
    /// `fov_y` is in radians. Depth maps to the GL `[-1, 1]` clip range.
    #[must_use]
    pub fn look_at(eye: DVec3, target: DVec3, up: DVec3, fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self::Perspective {
            view: DMat4::look_at_rh(eye, target, up),
            projection: DMat4::perspective_rh_gl(fov_y, aspect, near, far),
        }
    }

    /// Right-handed orthographic camera with the given half extents.
    #[must_use]
    pub fn orthographic(eye: DVec3, target: DVec3, up: DVec3, half_w: f64, half_h: f64, near: f64, far: f64) -> Self {
        Self::Orthographic {
            view: DMat4::look_at_rh(eye, target, up),
            projection: DMat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, near, far),
        }
    }

    /// Combined view-projection matrix.
    #[must_use]
    pub fn view_projection(&self) -> DMat4 {
        match self {
            Self::Perspective { view, projection } | Self::Orthographic { view, projection } => *projection * *view,
        }
    }

    #[must_use]
    pub fn is_perspective(&self) -> bool {
        matches!(self, Self::Perspective { .. })
    }
}

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }
}

/// Read-only access to the host's camera and viewport.
pub trait CameraProvider {
    /// The current camera, or `None` if the host has lost it.
    fn camera(&self) -> Option<Camera>;

    /// The current viewport size.
    fn viewport(&self) -> Viewport;
}

/// A wall quad in world space plus how its texture is oriented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    /// Corners in texture order: top-left, top-right, bottom-right, bottom-left.
    pub corners: [DVec3; 4],
    pub orientation: Orientation,
}

impl Wall {
    /// Whether the quad encloses no area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let [a, b, _, d] = self.corners;
        (b - a).cross(d - a).length_squared() <= f64::EPSILON
    }
}

/// The three-walled room the marks live on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enclosure {
    pub left: Wall,
    pub back: Wall,
    pub right: Wall,
}

impl Default for Enclosure {
    /// A 10 × 6 × 10 room, open towards +z, floor at `y = 0`.
    fn default() -> Self {
        let (hw, h, d) = (5.0, 6.0, -10.0);
        Self {
            // Texture u runs front to back on the left wall: left-to-right
            // as seen from the open side.
            left: Wall {
                corners: [
                    DVec3::new(-hw, h, 0.0),
                    DVec3::new(-hw, h, d),
                    DVec3::new(-hw, 0.0, d),
                    DVec3::new(-hw, 0.0, 0.0),
                ],
                orientation: Orientation::Normal,
            },
            back: Wall {
                corners: [
                    DVec3::new(-hw, h, d),
                    DVec3::new(hw, h, d),
                    DVec3::new(hw, 0.0, d),
                    DVec3::new(-hw, 0.0, d),
                ],
                orientation: Orientation::Normal,
            },
            // Also front to back, which is right-to-left on screen.
            right: Wall {
                corners: [
                    DVec3::new(hw, h, 0.0),
                    DVec3::new(hw, h, d),
                    DVec3::new(hw, 0.0, d),
                    DVec3::new(hw, 0.0, 0.0),
                ],
                orientation: Orientation::Mirrored,
            },
        }
    }
}

impl Enclosure {
    #[must_use]
    pub fn wall(&self, surface: SurfaceId) -> &Wall {
        match surface {
            SurfaceId::Left => &self.left,
            SurfaceId::Back => &self.back,
            SurfaceId::Right => &self.right,
        }
    }

    #[must_use]
    pub fn orientation(&self, surface: SurfaceId) -> Orientation {
        self.wall(surface).orientation
    }

    /// A perspective camera standing at the open side, looking at the back wall.
    #[must_use]
    pub fn default_camera(viewport: Viewport) -> Camera {
        Camera::look_at(
            DVec3::new(0.0, 3.0, 6.0),
            DVec3::new(0.0, 3.0, -10.0),
            DVec3::Y,
            60f64.to_radians(),
            viewport.aspect(),
            0.1,
            100.0,
        )
    }

    /// Screen bounds of `surface` this frame, or `None` when unavailable.
    #[must_use]
    pub fn project(&self, camera: &Camera, viewport: Viewport, surface: SurfaceId) -> Option<SurfaceBounds> {
        project_surface_bounds(camera, viewport.width, viewport.height, self.wall(surface))
    }
}

/// Project a wall's four corners to screen space and take their bounding box.
///
/// Returns `None` for a non-perspective camera, a zero-sized viewport, a
/// degenerate wall, any corner at or behind the camera plane, or a
/// zero-area screen rectangle.
#[must_use]
pub fn project_surface_bounds(camera: &Camera, viewport_w: f64, viewport_h: f64, wall: &Wall) -> Option<SurfaceBounds> {
    let corners = project_corners(camera, viewport_w, viewport_h, wall)?;
    let mut bounds = SurfaceBounds {
        min_x: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        min_y: f64::INFINITY,
        max_y: f64::NEG_INFINITY,
    };
    for (px, py) in corners {
        bounds.min_x = bounds.min_x.min(px);
        bounds.max_x = bounds.max_x.max(px);
        bounds.min_y = bounds.min_y.min(py);
        bounds.max_y = bounds.max_y.max(py);
    }

    if bounds.is_degenerate() {
        return None;
    }
    Some(bounds)
}

/// How a wall's texture u axis runs on screen from this camera.
///
/// `Mirrored` when the top edge (corner 0 to corner 1) projects right to
/// left. `None` under the same conditions as [`project_surface_bounds`].
#[must_use]
pub fn screen_orientation(camera: &Camera, viewport_w: f64, viewport_h: f64, wall: &Wall) -> Option<Orientation> {
    let [(x0, _), (x1, _), ..] = project_corners(camera, viewport_w, viewport_h, wall)?;
    if x1 < x0 { Some(Orientation::Mirrored) } else { Some(Orientation::Normal) }
}

/// Pixel positions of a wall's corners, in corner order.
fn project_corners(camera: &Camera, viewport_w: f64, viewport_h: f64, wall: &Wall) -> Option<[(f64, f64); 4]> {
    if !camera.is_perspective() || wall.is_degenerate() {
        return None;
    }
    if !(viewport_w > 0.0 && viewport_h > 0.0) {
        return None;
    }

    let view_proj = camera.view_projection();
    let mut out = [(0.0, 0.0); 4];
    for (slot, corner) in out.iter_mut().zip(wall.corners) {
        let clip = view_proj * DVec4::new(corner.x, corner.y, corner.z, 1.0);
        if clip.w <= MIN_CLIP_W {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let px = (ndc_x + 1.0) * 0.5 * viewport_w;
        let py = (1.0 - ndc_y) * 0.5 * viewport_h;
        if !px.is_finite() || !py.is_finite() {
            return None;
        }
        *slot = (px, py);
    }
    Some(out)
}
