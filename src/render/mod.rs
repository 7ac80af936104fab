//! Render surface seam for trajectory playback.
//!
//! The playback core never draws anything itself. It talks to a
//! [`RenderSurface`], which hands out opaque trail and marker handles and
//! accepts full geometry replacements for them. [`SceneBuffer`] is the
//! in-memory surface used by the CLI and the tests; it keeps the current
//! artifact state and can snapshot it as a [`SceneFrame`] for export.

mod scene;

pub use scene::*;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::playback::{Point3, TrailSlice};
use crate::schema::AxesConfig;

/// Default color cycle handed out to trails created without an explicit color.
pub const DEFAULT_PALETTE: [Color; 10] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0x17, 0xbe, 0xcf),
];

/// 24-bit display color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, RenderError> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(RenderError::InvalidColor(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| RenderError::InvalidColor(s.to_string()))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Palette color for the `n`th automatically colored artifact.
    pub fn palette(n: usize) -> Self {
        DEFAULT_PALETTE[n % DEFAULT_PALETTE.len()]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = RenderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Opaque reference to a polyline artifact on a render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrailHandle(usize);

impl TrailHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Opaque reference to a single-point marker artifact on a render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(usize);

impl MarkerHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Style applied when an artifact is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtifactStyle {
    /// Explicit color, or `None` to take the surface's next palette color.
    pub color: Option<Color>,
    /// Line width for trails, marker size for markers.
    pub size: f32,
}

/// Errors reported by a render surface.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
    #[error("Unknown trail handle {0:?}")]
    UnknownTrail(TrailHandle),
    #[error("Unknown marker handle {0:?}")]
    UnknownMarker(MarkerHandle),
}

/// Drawing collaborator used by the playback core.
///
/// Scene decoration (axes, title, focal body, legend) is drawn once at
/// setup. Per frame, the core only replaces trail geometry and marker
/// positions through the handles it was given.
pub trait RenderSurface {
    /// Set axis bounds, axis labels and the figure title.
    fn configure_axes(&mut self, axes: &AxesConfig, title: &str);

    /// Draw the fixed, non-animated focal point.
    fn add_focal_point(&mut self, label: &str, at: Point3, color: Color, size: f32);

    /// Create an empty trail and report the color it was pinned to.
    fn create_trail(
        &mut self,
        label: &str,
        style: ArtifactStyle,
    ) -> Result<(TrailHandle, Color), RenderError>;

    /// Create a marker, optionally placed at an initial position.
    fn create_marker(
        &mut self,
        label: &str,
        style: ArtifactStyle,
        at: Option<Point3>,
    ) -> Result<MarkerHandle, RenderError>;

    /// Replace the full geometry of a trail.
    fn set_trail(&mut self, handle: TrailHandle, trail: TrailSlice<'_>) -> Result<(), RenderError>;

    /// Move a marker to a single position.
    fn set_marker(&mut self, handle: MarkerHandle, at: Point3) -> Result<(), RenderError>;

    /// Hide a marker until it is next positioned.
    fn clear_marker(&mut self, handle: MarkerHandle) -> Result<(), RenderError>;

    /// Draw the legend keyed by artifact label and color.
    fn show_legend(&mut self, location: u8);

    fn release_trail(&mut self, handle: TrailHandle) -> Result<(), RenderError>;

    fn release_marker(&mut self, handle: MarkerHandle) -> Result<(), RenderError>;

    /// Capture the current artifact state for export.
    fn snapshot(&self) -> SceneFrame;
}
