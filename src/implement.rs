//! Drawing implements and their fixed styles.
//!
//! Each implement is a closed variant carrying its stroke style, its decay
//! duration and its capture constraints. Everything is a `match`; nothing is
//! looked up by name at runtime.

#[cfg(test)]
#[path = "implement_test.rs"]
mod implement_test;

use serde::{Deserialize, Serialize};

use crate::consts::HOUR_MS;

/// The selected drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Implement {
    /// Thin graphite line with a slight hand tremor. Fades.
    #[default]
    LightSketch,
    /// Wide felt marker. Fades.
    BoldMarker,
    /// Engraved groove. Needs slow, angular motion; never fades.
    SlowCarve,
    /// Wide opaque wall-paint stroke that hides what is beneath. Never fades.
    CoverOut,
    /// Dashed chalk line. Fades quickly.
    ChalkDash,
}

/// Line end style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl LineCap {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// Line corner style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }
}

/// Drop shadow, in reference pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub color: &'static str,
}

/// Fixed stroke style of an implement, in reference pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub shadow: Option<Shadow>,
    /// Dash pattern (on, off); `None` for solid lines.
    pub dash: Option<[f64; 2]>,
    /// Peak per-segment displacement; zero disables jitter.
    pub jitter: f64,
    /// Color that overrides the mark's own color.
    pub color: Option<&'static str>,
}

/// Wall paint color used by [`Implement::CoverOut`].
pub const WALL_PAINT: &str = "#EDE7DC";

impl Implement {
    /// Every implement, in toolbar order.
    pub const ALL: [Self; 5] = [Self::LightSketch, Self::BoldMarker, Self::SlowCarve, Self::CoverOut, Self::ChalkDash];

    #[must_use]
    pub fn style(self) -> Style {
        match self {
            Self::LightSketch => Style {
                width: 2.0,
                cap: LineCap::Round,
                join: LineJoin::Round,
                shadow: None,
                dash: None,
                jitter: crate::consts::SKETCH_JITTER_PX,
                color: None,
            },
            Self::BoldMarker => Style {
                width: 9.0,
                cap: LineCap::Round,
                join: LineJoin::Round,
                shadow: Some(Shadow { blur: 2.0, offset_x: 0.0, offset_y: 0.0, color: "rgba(0, 0, 0, 0.25)" }),
                dash: None,
                jitter: 0.0,
                color: None,
            },
            Self::SlowCarve => Style {
                width: 4.0,
                cap: LineCap::Square,
                join: LineJoin::Miter,
                shadow: Some(Shadow { blur: 1.5, offset_x: 1.0, offset_y: 1.5, color: "rgba(255, 255, 255, 0.55)" }),
                dash: None,
                jitter: 0.0,
                color: None,
            },
            Self::CoverOut => Style {
                width: 24.0,
                cap: LineCap::Round,
                join: LineJoin::Round,
                shadow: None,
                dash: None,
                jitter: 0.0,
                color: Some(WALL_PAINT),
            },
            Self::ChalkDash => Style {
                width: 5.0,
                cap: LineCap::Butt,
                join: LineJoin::Bevel,
                shadow: None,
                dash: Some([12.0, 8.0]),
                jitter: 0.0,
                color: None,
            },
        }
    }

    /// Time from creation to storage expiry.
    #[must_use]
    pub fn decay_ms(self) -> i64 {
        match self {
            Self::LightSketch => 4 * HOUR_MS,
            Self::BoldMarker => 24 * HOUR_MS,
            Self::SlowCarve => 7 * 24 * HOUR_MS,
            Self::CoverOut => 12 * HOUR_MS,
            Self::ChalkDash => HOUR_MS,
        }
    }

    /// Whether opacity drops with age. Non-fading marks stay fully opaque
    /// until the store removes them.
    #[must_use]
    pub fn fades(self) -> bool {
        match self {
            Self::LightSketch | Self::BoldMarker | Self::ChalkDash => true,
            Self::SlowCarve | Self::CoverOut => false,
        }
    }

    /// Whether a bare tap becomes a dot.
    #[must_use]
    pub fn allows_taps(self) -> bool {
        !matches!(self, Self::SlowCarve)
    }

    /// Whether capture runs samples through the velocity gate and angle snapper.
    #[must_use]
    pub fn is_constrained(self) -> bool {
        matches!(self, Self::SlowCarve)
    }
}
