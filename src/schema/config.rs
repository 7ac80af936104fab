//! Configuration types for orbit playback.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::CompressionType;
use crate::playback::Point3;
use crate::render::Color;

/// Top-level playback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Figure title.
    pub title: String,
    /// Figure size in inches (width, height).
    pub figure_size: (f32, f32),
    /// Axis bounds and labels.
    pub axes: AxesConfig,
    /// Fixed body at the focus of all orbits.
    pub focal: FocalConfig,
    /// Animated bodies, in canonical draw order.
    pub bodies: Vec<BodyConfig>,
    /// Artifact styling.
    pub style: StyleConfig,
    /// Frame loop parameters.
    pub timing: TimingConfig,
    /// Output encoding parameters.
    pub export: ExportConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            title: "A Capricorn's Solar Orbiters".to_string(),
            figure_size: (12.0, 6.0),
            axes: AxesConfig::default(),
            focal: FocalConfig::default(),
            bodies: vec![
                BodyConfig::new("Mercury", "mercury"),
                BodyConfig::new("Venus", "venus"),
                BodyConfig::new("Earth", "earth"),
                BodyConfig::new("Mars", "mars"),
            ],
            style: StyleConfig::default(),
            timing: TimingConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// Bounds and label for a single axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub label: String,
}

impl AxisRange {
    pub fn new(min: f64, max: f64, label: impl Into<String>) -> Self {
        Self {
            min,
            max,
            label: label.into(),
        }
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }
}

/// 3D axes configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxesConfig {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            x: AxisRange::new(-1.375, 1.375, "X Axis"),
            y: AxisRange::new(-1.375, 1.375, "Y Axis"),
            z: AxisRange::new(-3.0, 3.0, "Z Axis"),
        }
    }
}

/// The fixed focal body (the Sun).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocalConfig {
    pub label: String,
    pub position: Point3,
    pub color: Color,
    pub marker_size: f32,
}

impl Default for FocalConfig {
    fn default() -> Self {
        Self {
            label: "SUN".to_string(),
            position: Point3::new(-0.951049, 1.52138, -2.35551),
            color: Color::rgb(0x8c, 0x19, 0x07),
            marker_size: 8.0,
        }
    }
}

/// One animated body: display name, trajectory key and optional color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    /// Legend label.
    pub name: String,
    /// Trajectory key in the data source.
    pub key: String,
    /// Explicit color; `None` takes the surface palette.
    #[serde(default)]
    pub color: Option<Color>,
}

impl BodyConfig {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Artifact styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub trail_width: f32,
    pub marker_size: f32,
    /// Legend anchor code (2 = upper left).
    pub legend_location: u8,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            trail_width: 0.8,
            marker_size: 6.0,
            legend_location: 2,
        }
    }
}

/// Whether ticks are paced in wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Ticks run back to back; the interval only describes the output.
    #[default]
    Offline,
    /// Sleep so each tick takes at least one interval.
    Realtime,
}

/// Marker handling at frame index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPolicy {
    /// Leave the marker at its previous position.
    #[default]
    Keep,
    /// Hide the marker while no samples are revealed.
    Hide,
}

/// Frame loop parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Number of ticks (frame indices `0..total_ticks`).
    pub total_ticks: usize,
    /// Interval between ticks in milliseconds.
    pub tick_interval_ms: u64,
    pub pacing: Pacing,
    pub marker_at_zero: MarkerPolicy,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            total_ticks: 1000,
            tick_interval_ms: 80,
            pacing: Pacing::Offline,
            marker_at_zero: MarkerPolicy::Keep,
        }
    }
}

impl TimingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Output encoding parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output frame rate.
    pub fps: f32,
    /// Target bitrate in kbit/s.
    pub bitrate: u32,
    pub compression: CompressionType,
    /// Extra attempts for a failed frame export (0 or 1).
    pub retries: u32,
    /// Artist metadata written to the output.
    pub artist: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fps: 15.0,
            bitrate: 1800,
            compression: CompressionType::None,
            retries: 0,
            artist: "Me".to_string(),
        }
    }
}

impl PlaybackConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bodies.is_empty() {
            return Err(ConfigError::NoBodies);
        }
        for (name, axis) in [("x", &self.axes.x), ("y", &self.axes.y), ("z", &self.axes.z)] {
            if !axis.is_valid() {
                return Err(ConfigError::InvalidAxis(name));
            }
        }
        if self.timing.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidTickInterval);
        }
        if !(self.export.fps > 0.0) {
            return Err(ConfigError::InvalidFrameRate);
        }
        if !self.export.compression.is_available() {
            return Err(ConfigError::CompressionUnavailable(self.export.compression));
        }
        if self.export.retries > 1 {
            return Err(ConfigError::TooManyRetries(self.export.retries));
        }
        if !(self.style.trail_width > 0.0)
            || !(self.style.marker_size > 0.0)
            || !(self.focal.marker_size > 0.0)
        {
            return Err(ConfigError::InvalidStyle);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("At least one body must be configured")]
    NoBodies,
    #[error("Axis {0} bounds must be finite with min < max")]
    InvalidAxis(&'static str),
    #[error("Tick interval must be positive")]
    InvalidTickInterval,
    #[error("Frame rate must be positive")]
    InvalidFrameRate,
    #[error("{0:?} compression is not available in this build")]
    CompressionUnavailable(CompressionType),
    #[error("At most one export retry is allowed, got {0}")]
    TooManyRetries(u32),
    #[error("Trail width and marker sizes must be positive")]
    InvalidStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PlaybackConfig::default();
        config.validate().unwrap();
        assert_eq!(config.bodies.len(), 4);
        assert_eq!(config.bodies[2].key, "earth");
        assert_eq!(config.timing.tick_interval(), Duration::from_millis(80));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r##"{
            "bodies": [
                {"name": "A", "key": "a", "color": "#ff0000"},
                {"name": "B", "key": "b"}
            ],
            "timing": {"total_ticks": 3, "marker_at_zero": "hide"}
        }"##;
        let config: PlaybackConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.bodies[0].color, Some(Color::rgb(255, 0, 0)));
        assert_eq!(config.bodies[1].color, None);
        assert_eq!(config.timing.total_ticks, 3);
        assert_eq!(config.timing.tick_interval_ms, 80);
        assert_eq!(config.timing.marker_at_zero, MarkerPolicy::Hide);
        assert_eq!(config.export.fps, 15.0);
        config.validate().unwrap();
    }

    #[test]
    fn test_lz4_requires_feature() {
        let mut config = PlaybackConfig::default();
        config.export.compression = CompressionType::Lz4;
        if cfg!(feature = "lz4") {
            config.validate().unwrap();
        } else {
            assert!(matches!(
                config.validate(),
                Err(ConfigError::CompressionUnavailable(CompressionType::Lz4))
            ));
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = PlaybackConfig::default();
        config.axes.z = AxisRange::new(3.0, -3.0, "Z");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidAxis("z"))));

        let mut config = PlaybackConfig::default();
        config.timing.tick_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTickInterval)
        ));

        let mut config = PlaybackConfig::default();
        config.export.retries = 2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyRetries(2))
        ));

        let mut config = PlaybackConfig::default();
        config.export.fps = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFrameRate)));

        let config = PlaybackConfig {
            bodies: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoBodies)));
    }
}
