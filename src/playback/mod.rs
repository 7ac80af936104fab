//! Playback module - the trajectory playback engine.
//!
//! Data flows one way through four stages:
//!
//! - [`TrajectoryStore`]: validated, read-only per-body position series
//! - [`BodyRegistry`]: stable body identities and their render handles
//! - [`FrameCompositor`]: maps a frame index to trail and marker geometry
//! - [`PlaybackDriver`]: steps frame indices and hands frames to a sink
//!
//! [`PlaybackSession`] bundles the first two with the render surface they
//! were bound to.

mod compositor;
mod driver;
mod registry;
mod session;
mod trajectory;

pub use compositor::*;
pub use driver::*;
pub use registry::*;
pub use session::*;
pub use trajectory::*;

use std::io;

use crate::render::RenderError;
use crate::schema::ConfigError;

/// Errors raised while loading, binding or playing back trajectories.
///
/// Every variant is fatal to the current playback run.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("Trajectory '{body}' has the wrong shape: {detail}")]
    DataShapeMismatch { body: String, detail: String },

    #[error("Body '{name}' is already registered")]
    DuplicateBodyName { name: String },

    #[error("No trajectory for body key '{key}'")]
    UnknownTrajectory { key: String },

    #[error("Frame index {num} out of range (max {total_frames})")]
    FrameIndexOutOfRange { num: usize, total_frames: usize },

    #[error("Failed to export frame {frame}: {source}")]
    ExportFailure {
        frame: usize,
        #[source]
        source: io::Error,
    },

    #[error("Playback cancelled before frame {frame}")]
    Cancelled { frame: usize },

    #[error("Playback driver has already run")]
    DriverNotIdle,

    #[error("Render surface rejected '{body}': {source}")]
    Render {
        body: String,
        #[source]
        source: RenderError,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Discriminant of [`PlaybackError`], kept in the driver's failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DataShapeMismatch,
    DuplicateBodyName,
    UnknownTrajectory,
    FrameIndexOutOfRange,
    ExportFailure,
    Cancelled,
    DriverNotIdle,
    Render,
    Config,
}

impl PlaybackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DataShapeMismatch { .. } => ErrorKind::DataShapeMismatch,
            Self::DuplicateBodyName { .. } => ErrorKind::DuplicateBodyName,
            Self::UnknownTrajectory { .. } => ErrorKind::UnknownTrajectory,
            Self::FrameIndexOutOfRange { .. } => ErrorKind::FrameIndexOutOfRange,
            Self::ExportFailure { .. } => ErrorKind::ExportFailure,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::DriverNotIdle => ErrorKind::DriverNotIdle,
            Self::Render { .. } => ErrorKind::Render,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn render(body: &str, source: RenderError) -> Self {
        Self::Render {
            body: body.to_string(),
            source,
        }
    }
}
