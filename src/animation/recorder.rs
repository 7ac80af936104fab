//! Animation recorder for capturing composed frames.

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use super::format::{
    AnimationFlags, AnimationHeader, CompressionType, FrameIndex, SceneLayout, compress_lz4,
    encode_frame,
};
use super::{ExportStats, FrameSink};
use crate::render::SceneFrame;
use crate::schema::PlaybackConfig;

/// Configuration for animation recording.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Compression type to use.
    pub compression: CompressionType,
    /// Playback frame rate stored in the header.
    pub fps: f32,
    /// Target bitrate in kbit/s.
    pub bitrate: u32,
    /// Source tick interval in milliseconds.
    pub tick_interval_ms: u32,
    /// Artist metadata.
    pub artist: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self::from_playback(&PlaybackConfig::default())
    }
}

impl RecorderConfig {
    pub fn from_playback(config: &PlaybackConfig) -> Self {
        Self {
            compression: config.export.compression,
            fps: config.export.fps,
            bitrate: config.export.bitrate,
            tick_interval_ms: u32::try_from(config.timing.tick_interval_ms).unwrap_or(u32::MAX),
            artist: config.export.artist.clone(),
        }
    }
}

/// Writes composed frames to an `.orba` file as they are exported.
///
/// The header is written as a placeholder up front and rewritten with the
/// final counts by [`AnimationRecorder::finalize`]. The scene layout is taken
/// from the first frame; every later frame must have the same artifacts.
///
/// ```ignore
/// let mut recorder = AnimationRecorder::new("solar.orba", RecorderConfig::default())?;
/// for num in 0..1000 {
///     compositor.apply(num, registry.bodies(), &store, &mut scene)?;
///     recorder.record_frame(&scene.snapshot())?;
/// }
/// recorder.finalize()?;
/// ```
pub struct AnimationRecorder {
    writer: BufWriter<File>,
    header: AnimationHeader,
    layout: Option<SceneLayout>,
    artist: String,
    frame_indices: Vec<FrameIndex>,
    frames_written: u64,
    /// Offset of the first frame, just past the layout.
    data_start: u64,
    finished: bool,
    encode_buffer: Vec<u8>,
}

impl AnimationRecorder {
    pub fn new<P: AsRef<Path>>(path: P, config: RecorderConfig) -> io::Result<Self> {
        if !config.compression.is_available() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{:?} compression is not available in this build",
                    config.compression
                ),
            ));
        }
        let mut writer = BufWriter::new(File::create(path)?);

        // Artifact counts come from the first frame, the frame count from finalize.
        let header = AnimationHeader {
            trail_count: 0,
            marker_count: 0,
            frame_count: 0,
            fps: config.fps,
            bitrate: config.bitrate,
            tick_interval_ms: config.tick_interval_ms,
            flags: AnimationFlags {
                compression: config.compression,
            },
        };
        header.write_to(&mut writer)?;

        Ok(Self {
            writer,
            header,
            layout: None,
            artist: config.artist,
            frame_indices: Vec::new(),
            frames_written: 0,
            data_start: AnimationHeader::SIZE as u64,
            finished: false,
            encode_buffer: Vec::new(),
        })
    }

    fn write_layout(&mut self, layout: SceneLayout) -> io::Result<()> {
        layout.write_to(&mut self.writer)?;
        self.header.trail_count = layout.trails.len() as u32;
        self.header.marker_count = layout.markers.len() as u32;
        self.data_start = self.writer.stream_position()?;
        self.layout = Some(layout);
        Ok(())
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.finished {
            return Err(io::Error::other("Recorder already finalized"));
        }
        Ok(())
    }

    /// Append one composed frame.
    pub fn record_frame(&mut self, frame: &SceneFrame) -> io::Result<()> {
        self.ensure_open()?;

        if self.layout.is_none() {
            self.write_layout(SceneLayout::of(frame, &self.artist))?;
        }
        if let Some(layout) = &self.layout
            && !layout.matches(frame)
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Frame has {} trails and {} markers, recording expects {} and {}",
                    frame.trails.len(),
                    frame.markers.len(),
                    layout.trails.len(),
                    layout.markers.len()
                ),
            ));
        }

        encode_frame(frame, &mut self.encode_buffer);
        let compressed;
        let bytes: &[u8] = match self.header.flags.compression {
            CompressionType::None => &self.encode_buffer,
            CompressionType::Lz4 => {
                compressed = compress_lz4(&self.encode_buffer)?;
                &compressed
            }
        };

        let offset = self.writer.stream_position()?;
        self.writer.write_all(bytes)?;
        self.frame_indices.push(FrameIndex {
            offset,
            size: bytes.len() as u64,
        });
        self.frames_written += 1;
        Ok(())
    }

    /// Write the index table and the final header.
    ///
    /// The recorder accepts no frames afterwards.
    pub fn finalize(&mut self) -> io::Result<ExportStats> {
        self.ensure_open()?;

        // An empty recording still carries the metadata block.
        if self.layout.is_none() {
            let layout = SceneLayout {
                artist: self.artist.clone(),
                ..Default::default()
            };
            self.write_layout(layout)?;
        }

        let index_offset = self.writer.stream_position()?;
        for entry in &self.frame_indices {
            entry.write_to(&mut self.writer)?;
        }
        let total_bytes = self.writer.stream_position()?;

        self.header.frame_count = self.frames_written;
        self.writer.seek(SeekFrom::Start(0))?;
        self.header.write_to(&mut self.writer)?;
        self.writer.flush()?;
        self.finished = true;

        log::info!(
            "Finalized animation: {} frames, {} bytes",
            self.frames_written,
            total_bytes
        );

        let frame_bytes = index_offset.saturating_sub(self.data_start);
        Ok(ExportStats {
            frame_count: self.frames_written,
            total_bytes,
            average_frame_size: frame_bytes.checked_div(self.frames_written).unwrap_or(0),
            compression: self.header.flags.compression,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl FrameSink for AnimationRecorder {
    fn write_frame(&mut self, num: usize, frame: &SceneFrame) -> io::Result<()> {
        if num as u64 != self.frames_written {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Frame {} exported out of order, expected {}",
                    num, self.frames_written
                ),
            ));
        }
        self.record_frame(frame)
    }

    fn finish(&mut self) -> io::Result<ExportStats> {
        self.finalize()
    }
}
