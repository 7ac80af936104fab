//! Frame export for orbit playback.
//!
//! The playback driver hands every composed frame to a [`FrameSink`].
//! [`AnimationRecorder`] writes them to an `.orba` file that
//! [`AnimationPlayer`] can read back; [`MemorySink`] keeps them in memory.
//!
//! # File Format
//!
//! ```text
//! Header (48 bytes):
//!   Magic: "ORBA" (4 bytes)
//!   Version: u16
//!   Flags: u16 (compression)
//!   Trail count: u32
//!   Marker count: u32
//!   Frame count: u64
//!   Frame rate: f32
//!   Bitrate: u32
//!   Tick interval (ms): u32
//!   Reserved: 12 bytes
//!
//! Scene layout (variable):
//!   Artist: u16 length + UTF-8
//!   Per trail, then per marker: label (u16 length + UTF-8), RGB (3 bytes), size f32
//!
//! Frame data (variable):
//!   Per trail: point count u32, then x/y/z f64 per point
//!   Per marker: present u8, then x/y/z f64 if present
//!   Optionally LZ4 compressed
//!
//! Frame index table (frame_count * 16 bytes):
//!   Offset: u64
//!   Compressed size: u64
//! ```

mod format;
mod player;
mod recorder;

pub use format::{
    ANIMATION_MAGIC, ANIMATION_VERSION, AnimationFlags, AnimationHeader, ArtifactEntry,
    CompressionType, FrameIndex, SceneLayout, decode_frame, encode_frame,
};
pub use player::{AnimationPlayer, FrameIterator};
pub use recorder::{AnimationRecorder, RecorderConfig};

use std::io;

use crate::render::SceneFrame;

/// Consumer of composed frames, called once per tick and finalized once.
pub trait FrameSink {
    /// Export the frame composed for index `num`.
    fn write_frame(&mut self, num: usize, frame: &SceneFrame) -> io::Result<()>;

    /// Finalize the output after the last frame.
    fn finish(&mut self) -> io::Result<ExportStats>;
}

/// Statistics from an export session.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStats {
    /// Total frames exported.
    pub frame_count: u64,
    /// Total output size in bytes.
    pub total_bytes: u64,
    /// Average stored frame size.
    pub average_frame_size: u64,
    /// Compression used.
    pub compression: CompressionType,
}

impl std::fmt::Display for ExportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames, {} bytes total, {} bytes/frame avg ({:?} compression)",
            self.frame_count, self.total_bytes, self.average_frame_size, self.compression
        )
    }
}

/// Sink that keeps every exported frame in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Exported frames with their frame index.
    pub frames: Vec<(usize, SceneFrame)>,
    /// Set once `finish` has been called.
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame indices in export order.
    pub fn indices(&self) -> Vec<usize> {
        self.frames.iter().map(|(num, _)| *num).collect()
    }
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, num: usize, frame: &SceneFrame) -> io::Result<()> {
        if self.finished {
            return Err(io::Error::other("Sink already finished"));
        }
        self.frames.push((num, frame.clone()));
        Ok(())
    }

    fn finish(&mut self) -> io::Result<ExportStats> {
        self.finished = true;
        Ok(ExportStats {
            frame_count: self.frames.len() as u64,
            total_bytes: 0,
            average_frame_size: 0,
            compression: CompressionType::None,
        })
    }
}
