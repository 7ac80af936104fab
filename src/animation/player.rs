//! Reader for recorded `.orba` playbacks.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;

use super::format::{
    AnimationHeader, CompressionType, FrameIndex, SceneLayout, decode_frame, decompress_lz4,
};
use crate::render::SceneFrame;

/// Random-access reader over a finalized recording.
///
/// ```ignore
/// let mut player = AnimationPlayer::open("solar.orba")?;
/// let last = player.read_frame(player.frame_count() - 1)?;
/// println!("{} points in the final trails", last.trail_points());
/// ```
pub struct AnimationPlayer {
    reader: BufReader<File>,
    header: AnimationHeader,
    layout: SceneLayout,
    index: Vec<FrameIndex>,
    scratch: Vec<u8>,
}

impl AnimationPlayer {
    /// Open a recording and load its frame index.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let header = AnimationHeader::read_from(&mut reader)?;
        let layout = SceneLayout::read_from(&mut reader, &header)?;
        let index = read_index_table(&mut reader, header.frame_count)?;

        log::debug!(
            "Opened recording: {} frames, {} trails, {} markers",
            header.frame_count,
            layout.trails.len(),
            layout.markers.len()
        );

        Ok(Self {
            reader,
            header,
            layout,
            index,
            scratch: Vec::new(),
        })
    }

    pub fn header(&self) -> &AnimationHeader {
        &self.header
    }

    /// Artifact labels, colors and metadata.
    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn frame_count(&self) -> u64 {
        self.header.frame_count
    }

    pub fn fps(&self) -> f32 {
        self.header.fps
    }

    /// Decode the scene exported at tick `num`.
    pub fn read_frame(&mut self, num: u64) -> io::Result<SceneFrame> {
        let entry = usize::try_from(num)
            .ok()
            .and_then(|i| self.index.get(i).copied())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "Frame {} not in recording of {} frames",
                        num, self.header.frame_count
                    ),
                )
            })?;

        self.reader.seek(SeekFrom::Start(entry.offset))?;
        self.scratch.resize(entry.size as usize, 0);
        self.reader.read_exact(&mut self.scratch)?;

        if self.header.flags.compression == CompressionType::Lz4 {
            let raw = decompress_lz4(&self.scratch)?;
            decode_frame(&raw, &self.layout)
        } else {
            decode_frame(&self.scratch, &self.layout)
        }
    }

    /// Decode every frame in tick order.
    pub fn frames(&mut self) -> FrameIterator<'_> {
        let remaining = 0..self.header.frame_count;
        FrameIterator {
            player: self,
            remaining,
        }
    }
}

/// The index table sits at the end of the file, one entry per frame.
fn read_index_table<R: Read + Seek>(
    reader: &mut R,
    frame_count: u64,
) -> io::Result<Vec<FrameIndex>> {
    let table_len = frame_count.saturating_mul(FrameIndex::SIZE as u64);
    let file_len = reader.seek(SeekFrom::End(0))?;
    let start = file_len.checked_sub(table_len).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "File of {} bytes cannot hold {} frame indices",
                file_len, frame_count
            ),
        )
    })?;
    reader.seek(SeekFrom::Start(start))?;

    let mut index = Vec::new();
    for num in 0..frame_count {
        let entry = FrameIndex::read_from(&mut *reader)?;
        // Frame data must lie between the header and the index table.
        let end = entry.offset.checked_add(entry.size);
        if entry.offset < AnimationHeader::SIZE as u64 || end.is_none_or(|end| end > start) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Frame {} spans {} bytes at offset {}, outside the frame data",
                    num, entry.size, entry.offset
                ),
            ));
        }
        index.push(entry);
    }
    Ok(index)
}

/// Frames of a recording, decoded lazily.
pub struct FrameIterator<'a> {
    player: &'a mut AnimationPlayer,
    remaining: Range<u64>,
}

impl Iterator for FrameIterator<'_> {
    type Item = io::Result<SceneFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        let num = self.remaining.next()?;
        Some(self.player.read_frame(num))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.remaining.end - self.remaining.start) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for FrameIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationRecorder, CompressionType, RecorderConfig};
    use crate::playback::Point3;
    use crate::render::{Color, MarkerState, TrailState};
    use std::fs;
    use tempfile::tempdir;

    fn frames(count: usize) -> Vec<SceneFrame> {
        (0..count)
            .map(|n| {
                let points: Vec<Point3> = (0..n)
                    .map(|i| Point3::new(i as f64 * 0.1, -(i as f64), 0.5))
                    .collect();
                SceneFrame {
                    trails: vec![TrailState {
                        label: "Mars".to_string(),
                        color: Color::palette(3),
                        width: 0.8,
                        points: points.clone(),
                    }],
                    markers: vec![MarkerState {
                        label: "Mars".to_string(),
                        color: Color::palette(3),
                        size: 6.0,
                        position: points.last().copied(),
                    }],
                }
            })
            .collect()
    }

    fn record(path: &Path, frames: &[SceneFrame], config: RecorderConfig) {
        let mut recorder = AnimationRecorder::new(path, config).unwrap();
        for frame in frames {
            recorder.record_frame(frame).unwrap();
        }
        recorder.finalize().unwrap();
    }

    #[test]
    fn test_player_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roundtrip.orba");
        let frames = frames(5);
        record(&path, &frames, RecorderConfig::default());

        let mut player = AnimationPlayer::open(&path).unwrap();
        assert_eq!(player.frame_count(), 5);
        assert_eq!(player.fps(), 15.0);
        assert_eq!(player.header().bitrate, 1800);
        assert_eq!(player.layout().artist, "Me");
        assert_eq!(player.layout().trails[0].label, "Mars");

        // Random access, out of order
        assert_eq!(player.read_frame(4).unwrap(), frames[4]);
        assert_eq!(player.read_frame(0).unwrap(), frames[0]);
        assert!(player.read_frame(5).is_err());
    }

    #[cfg(feature = "lz4")]
    #[test]
    fn test_player_lz4_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lz4.orba");
        let frames = frames(20);
        let config = RecorderConfig {
            compression: CompressionType::Lz4,
            ..Default::default()
        };
        record(&path, &frames, config);

        let mut player = AnimationPlayer::open(&path).unwrap();
        assert_eq!(player.header().flags.compression, CompressionType::Lz4);
        assert_eq!(player.read_frame(19).unwrap(), frames[19]);
    }

    #[test]
    fn test_player_iterator() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("iter.orba");
        let frames = frames(3);
        record(&path, &frames, RecorderConfig::default());

        let mut player = AnimationPlayer::open(&path).unwrap();
        let iter = player.frames();
        assert_eq!(iter.len(), 3);

        let loaded: Vec<_> = iter.collect::<io::Result<_>>().unwrap();
        assert_eq!(loaded, frames);
    }

    #[test]
    fn test_player_empty_recording() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.orba");
        record(&path, &[], RecorderConfig::default());

        let mut player = AnimationPlayer::open(&path).unwrap();
        assert_eq!(player.frame_count(), 0);
        assert!(player.layout().trails.is_empty());
        assert_eq!(player.frames().count(), 0);
    }

    #[test]
    fn test_player_rejects_corrupt_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.orba");
        record(&path, &frames(2), RecorderConfig::default());

        // The last index entry ends the file; its size is the final u64.
        let mut bytes = fs::read(&path).unwrap();
        let len = bytes.len();
        bytes[len - 8..].copy_from_slice(&u64::MAX.to_le_bytes());
        fs::write(&path, &bytes).unwrap();

        let err = AnimationPlayer::open(&path).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
