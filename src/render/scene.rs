//! In-memory render surface.

use serde::{Deserialize, Serialize};

use super::{ArtifactStyle, Color, MarkerHandle, RenderError, RenderSurface, TrailHandle};
use crate::playback::{Point3, TrailSlice};
use crate::schema::AxesConfig;

/// Current state of one trail artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailState {
    pub label: String,
    pub color: Color,
    pub width: f32,
    pub points: Vec<Point3>,
}

/// Current state of one marker artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerState {
    pub label: String,
    pub color: Color,
    pub size: f32,
    /// `None` while hidden.
    pub position: Option<Point3>,
}

/// Fixed focal point drawn once at setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocalPoint {
    pub label: String,
    pub position: Point3,
    pub color: Color,
    pub size: f32,
}

/// Snapshot of every live artifact, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFrame {
    pub trails: Vec<TrailState>,
    pub markers: Vec<MarkerState>,
}

impl SceneFrame {
    /// Total number of trail points across all trails.
    pub fn trail_points(&self) -> usize {
        self.trails.iter().map(|t| t.points.len()).sum()
    }
}

/// Render surface that keeps artifact state in memory.
///
/// Released artifacts leave a tombstone so handles are never reused.
#[derive(Debug, Default)]
pub struct SceneBuffer {
    axes: Option<AxesConfig>,
    title: String,
    focal: Vec<FocalPoint>,
    trails: Vec<Option<TrailState>>,
    markers: Vec<Option<MarkerState>>,
    legend: Option<u8>,
    palette_cursor: usize,
}

impl SceneBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axes(&self) -> Option<&AxesConfig> {
        self.axes.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn focal_points(&self) -> &[FocalPoint] {
        &self.focal
    }

    /// Legend location, if a legend has been drawn.
    pub fn legend(&self) -> Option<u8> {
        self.legend
    }

    pub fn trail(&self, handle: TrailHandle) -> Option<&TrailState> {
        self.trails.get(handle.index()).and_then(Option::as_ref)
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<&MarkerState> {
        self.markers.get(handle.index()).and_then(Option::as_ref)
    }

    /// Number of live (unreleased) trails and markers.
    pub fn live_artifacts(&self) -> usize {
        self.trails.iter().flatten().count() + self.markers.iter().flatten().count()
    }

    fn trail_mut(&mut self, handle: TrailHandle) -> Result<&mut TrailState, RenderError> {
        self.trails
            .get_mut(handle.index())
            .and_then(Option::as_mut)
            .ok_or(RenderError::UnknownTrail(handle))
    }

    fn marker_mut(&mut self, handle: MarkerHandle) -> Result<&mut MarkerState, RenderError> {
        self.markers
            .get_mut(handle.index())
            .and_then(Option::as_mut)
            .ok_or(RenderError::UnknownMarker(handle))
    }
}

impl RenderSurface for SceneBuffer {
    fn configure_axes(&mut self, axes: &AxesConfig, title: &str) {
        self.axes = Some(axes.clone());
        self.title = title.to_string();
    }

    fn add_focal_point(&mut self, label: &str, at: Point3, color: Color, size: f32) {
        self.focal.push(FocalPoint {
            label: label.to_string(),
            position: at,
            color,
            size,
        });
    }

    fn create_trail(
        &mut self,
        label: &str,
        style: ArtifactStyle,
    ) -> Result<(TrailHandle, Color), RenderError> {
        // Explicit colors still advance the cycle, like a plotting library would.
        let auto = Color::palette(self.palette_cursor);
        self.palette_cursor += 1;
        let color = style.color.unwrap_or(auto);

        let handle = TrailHandle::new(self.trails.len());
        self.trails.push(Some(TrailState {
            label: label.to_string(),
            color,
            width: style.size,
            points: Vec::new(),
        }));
        Ok((handle, color))
    }

    fn create_marker(
        &mut self,
        label: &str,
        style: ArtifactStyle,
        at: Option<Point3>,
    ) -> Result<MarkerHandle, RenderError> {
        let color = style
            .color
            .unwrap_or_else(|| Color::palette(self.palette_cursor));
        let handle = MarkerHandle::new(self.markers.len());
        self.markers.push(Some(MarkerState {
            label: label.to_string(),
            color,
            size: style.size,
            position: at,
        }));
        Ok(handle)
    }

    fn set_trail(&mut self, handle: TrailHandle, trail: TrailSlice<'_>) -> Result<(), RenderError> {
        let state = self.trail_mut(handle)?;
        state.points.clear();
        state.points.extend(trail.points());
        Ok(())
    }

    fn set_marker(&mut self, handle: MarkerHandle, at: Point3) -> Result<(), RenderError> {
        self.marker_mut(handle)?.position = Some(at);
        Ok(())
    }

    fn clear_marker(&mut self, handle: MarkerHandle) -> Result<(), RenderError> {
        self.marker_mut(handle)?.position = None;
        Ok(())
    }

    fn show_legend(&mut self, location: u8) {
        self.legend = Some(location);
    }

    fn release_trail(&mut self, handle: TrailHandle) -> Result<(), RenderError> {
        self.trail_mut(handle)?;
        self.trails[handle.index()] = None;
        Ok(())
    }

    fn release_marker(&mut self, handle: MarkerHandle) -> Result<(), RenderError> {
        self.marker_mut(handle)?;
        self.markers[handle.index()] = None;
        Ok(())
    }

    fn snapshot(&self) -> SceneFrame {
        SceneFrame {
            trails: self.trails.iter().flatten().cloned().collect(),
            markers: self.markers.iter().flatten().cloned().collect(),
        }
    }
}
