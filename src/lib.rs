//! Orbit playback - animated reveal of precomputed orbital trajectories.
//!
//! Given time series of 3D positions for several bodies orbiting a fixed
//! focal point, this crate works out what every animation frame shows: a
//! trail of all samples revealed so far and a marker at the latest one.
//!
//! # Architecture
//!
//! - `schema`: Configuration and trajectory data files
//! - `playback`: Trajectory store, body registry, frame compositor, driver
//! - `render`: Render surface seam and an in-memory scene buffer
//! - `animation`: Frame sinks and the `.orba` animation container
//!
//! # Example
//!
//! ```rust,no_run
//! use orbit_playback::{
//!     animation::{AnimationRecorder, RecorderConfig},
//!     playback::{PlaybackSession, TrajectoryStore},
//!     render::SceneBuffer,
//!     schema::{PlaybackConfig, TrajectoryFile},
//! };
//!
//! let config = PlaybackConfig::default();
//! let data = TrajectoryFile::synthetic(&["mercury", "venus", "earth", "mars"], 1400);
//! let store = TrajectoryStore::load(&data)?;
//!
//! let mut session = PlaybackSession::setup(&config, store, SceneBuffer::new())?;
//! let mut driver = session.driver(&config);
//! let mut recorder = AnimationRecorder::new("solar.orba", RecorderConfig::from_playback(&config))?;
//!
//! let report = driver.run(
//!     config.timing.total_ticks,
//!     config.timing.tick_interval(),
//!     &mut session,
//!     &mut recorder,
//! )?;
//! println!("Exported {}", report.stats);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod animation;
pub mod playback;
pub mod render;
pub mod schema;

// Re-export commonly used types
pub use playback::{
    FrameCompositor, PlaybackDriver, PlaybackError, PlaybackSession, Trajectory, TrajectoryStore,
};
pub use schema::{PlaybackConfig, TrajectoryFile};
