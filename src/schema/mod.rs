//! Schema module - Configuration and data file types for orbit playback.

mod config;
mod data;

pub use config::*;
pub use data::*;
