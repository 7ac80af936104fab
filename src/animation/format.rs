//! Binary format definitions for orbit animation files.

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use crate::playback::Point3;
use crate::render::{Color, MarkerState, SceneFrame, TrailState};

/// Magic bytes identifying an orbit animation file.
pub const ANIMATION_MAGIC: &[u8; 4] = b"ORBA";

/// Current format version.
pub const ANIMATION_VERSION: u16 = 1;

/// Compression type for frame data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CompressionType {
    /// No compression (raw little-endian data).
    #[default]
    None = 0,
    /// LZ4 fast compression.
    Lz4 = 1,
}

impl CompressionType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Lz4),
            _ => None,
        }
    }

    /// Whether this build can encode and decode frames with this compression.
    pub fn is_available(self) -> bool {
        match self {
            CompressionType::None => true,
            CompressionType::Lz4 => cfg!(feature = "lz4"),
        }
    }
}

/// Animation file header flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationFlags {
    /// Compression type (lower 4 bits).
    pub compression: CompressionType,
}

impl AnimationFlags {
    pub fn to_u16(self) -> u16 {
        self.compression as u16
    }

    pub fn from_u16(v: u16) -> Self {
        Self {
            compression: CompressionType::from_u8((v & 0x0F) as u8).unwrap_or_default(),
        }
    }
}

/// File header for the orbit animation format.
#[derive(Debug, Clone)]
pub struct AnimationHeader {
    /// Number of trail artifacts per frame.
    pub trail_count: u32,
    /// Number of marker artifacts per frame.
    pub marker_count: u32,
    /// Total number of frames.
    pub frame_count: u64,
    /// Playback frame rate.
    pub fps: f32,
    /// Target bitrate in kbit/s.
    pub bitrate: u32,
    /// Interval between source ticks in milliseconds.
    pub tick_interval_ms: u32,
    /// Animation flags.
    pub flags: AnimationFlags,
}

impl AnimationHeader {
    /// Size of header in bytes.
    /// Magic(4) + Version(2) + Flags(2) + Trails(4) + Markers(4) +
    /// FrameCount(8) + Fps(4) + Bitrate(4) + TickInterval(4) + Reserved(12) = 48
    pub const SIZE: usize = 48;

    /// Write header to output.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(ANIMATION_MAGIC)?;
        w.write_all(&ANIMATION_VERSION.to_le_bytes())?;
        w.write_all(&self.flags.to_u16().to_le_bytes())?;
        w.write_all(&self.trail_count.to_le_bytes())?;
        w.write_all(&self.marker_count.to_le_bytes())?;
        w.write_all(&self.frame_count.to_le_bytes())?;
        w.write_all(&self.fps.to_le_bytes())?;
        w.write_all(&self.bitrate.to_le_bytes())?;
        w.write_all(&self.tick_interval_ms.to_le_bytes())?;
        // Reserved bytes
        w.write_all(&[0u8; 12])?;
        Ok(())
    }

    /// Read header from input.
    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != ANIMATION_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Invalid ORBA magic bytes",
            ));
        }

        let version = read_u16(r)?;
        if version != ANIMATION_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unsupported ORBA version: {}", version),
            ));
        }

        let flags = AnimationFlags::from_u16(read_u16(r)?);
        let trail_count = read_u32(r)?;
        let marker_count = read_u32(r)?;
        let frame_count = read_u64(r)?;
        let fps = f32::from_le_bytes(read_array(r)?);
        let bitrate = read_u32(r)?;
        let tick_interval_ms = read_u32(r)?;

        // Skip reserved bytes
        let _reserved: [u8; 12] = read_array(r)?;

        Ok(Self {
            trail_count,
            marker_count,
            frame_count,
            fps,
            bitrate,
            tick_interval_ms,
            flags,
        })
    }
}

/// Static description of one artifact, stored once after the header.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactEntry {
    pub label: String,
    pub color: Color,
    pub size: f32,
}

impl ArtifactEntry {
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_string(w, &self.label)?;
        w.write_all(&[self.color.r, self.color.g, self.color.b])?;
        w.write_all(&self.size.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let label = read_string(r)?;
        let [red, green, blue]: [u8; 3] = read_array(r)?;
        let size = f32::from_le_bytes(read_array(r)?);
        Ok(Self {
            label,
            color: Color::rgb(red, green, blue),
            size,
        })
    }
}

/// Artifact table and metadata following the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneLayout {
    pub artist: String,
    pub trails: Vec<ArtifactEntry>,
    pub markers: Vec<ArtifactEntry>,
}

impl SceneLayout {
    /// Layout of the artifacts present in `frame`.
    pub fn of(frame: &SceneFrame, artist: &str) -> Self {
        Self {
            artist: artist.to_string(),
            trails: frame
                .trails
                .iter()
                .map(|t| ArtifactEntry {
                    label: t.label.clone(),
                    color: t.color,
                    size: t.width,
                })
                .collect(),
            markers: frame
                .markers
                .iter()
                .map(|m| ArtifactEntry {
                    label: m.label.clone(),
                    color: m.color,
                    size: m.size,
                })
                .collect(),
        }
    }

    /// Check that `frame` has the same artifact counts as this layout.
    pub fn matches(&self, frame: &SceneFrame) -> bool {
        self.trails.len() == frame.trails.len() && self.markers.len() == frame.markers.len()
    }

    /// Write metadata and artifact entries; counts live in the header.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_string(w, &self.artist)?;
        for entry in self.trails.iter().chain(&self.markers) {
            entry.write_to(w)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R, header: &AnimationHeader) -> io::Result<Self> {
        let artist = read_string(r)?;
        let trails = (0..header.trail_count)
            .map(|_| ArtifactEntry::read_from(r))
            .collect::<io::Result<_>>()?;
        let markers = (0..header.marker_count)
            .map(|_| ArtifactEntry::read_from(r))
            .collect::<io::Result<_>>()?;
        Ok(Self {
            artist,
            trails,
            markers,
        })
    }
}

/// Index entry for a single frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameIndex {
    /// Byte offset from start of file.
    pub offset: u64,
    /// Compressed size in bytes (equals uncompressed if no compression).
    pub size: u64,
}

impl FrameIndex {
    /// Size of one index entry in bytes.
    pub const SIZE: usize = 16;

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.offset.to_le_bytes())?;
        w.write_all(&self.size.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let offset = read_u64(r)?;
        let size = read_u64(r)?;
        Ok(Self { offset, size })
    }
}

/// Encode the dynamic part of a frame into `out` (cleared first).
///
/// Per trail: point count (u32) then xyz f64 triples.
/// Per marker: presence byte, then an xyz f64 triple if present.
pub fn encode_frame(frame: &SceneFrame, out: &mut Vec<u8>) {
    out.clear();
    for trail in &frame.trails {
        out.extend_from_slice(&(trail.points.len() as u32).to_le_bytes());
        for p in &trail.points {
            encode_point(p, out);
        }
    }
    for marker in &frame.markers {
        match &marker.position {
            Some(p) => {
                out.push(1);
                encode_point(p, out);
            }
            None => out.push(0),
        }
    }
}

/// Decode frame bytes using the stored artifact layout.
pub fn decode_frame(bytes: &[u8], layout: &SceneLayout) -> io::Result<SceneFrame> {
    let mut r = bytes;
    let mut frame = SceneFrame::default();

    for entry in &layout.trails {
        let count = read_u32(&mut r)? as usize;
        if count.saturating_mul(24) > r.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Trail '{}' claims {} points but only {} bytes remain",
                    entry.label,
                    count,
                    r.len()
                ),
            ));
        }
        let points = (0..count)
            .map(|_| decode_point(&mut r))
            .collect::<io::Result<_>>()?;
        frame.trails.push(TrailState {
            label: entry.label.clone(),
            color: entry.color,
            width: entry.size,
            points,
        });
    }

    for entry in &layout.markers {
        let [present]: [u8; 1] = read_array(&mut r)?;
        let position = match present {
            0 => None,
            1 => Some(decode_point(&mut r)?),
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Invalid marker flag {} for '{}'", other, entry.label),
                ));
            }
        };
        frame.markers.push(MarkerState {
            label: entry.label.clone(),
            color: entry.color,
            size: entry.size,
            position,
        });
    }

    if !r.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} trailing bytes after frame data", r.len()),
        ));
    }
    Ok(frame)
}

fn encode_point(p: &Point3, out: &mut Vec<u8>) {
    out.extend_from_slice(&p.x.to_le_bytes());
    out.extend_from_slice(&p.y.to_le_bytes());
    out.extend_from_slice(&p.z.to_le_bytes());
}

fn decode_point<R: Read>(r: &mut R) -> io::Result<Point3> {
    let x = f64::from_le_bytes(read_array(r)?);
    let y = f64::from_le_bytes(read_array(r)?);
    let z = f64::from_le_bytes(read_array(r)?);
    Ok(Point3::new(x, y, z))
}

fn read_array<R: Read, const N: usize>(r: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_u16<R: Read>(r: &mut R) -> io::Result<u16> {
    Ok(u16::from_le_bytes(read_array(r)?))
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    Ok(u32::from_le_bytes(read_array(r)?))
}

fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    Ok(u64::from_le_bytes(read_array(r)?))
}

fn write_string<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    let len = u16::try_from(s.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("String of {} bytes is too long to store", s.len()),
        )
    })?;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(s.as_bytes())
}

fn read_string<R: Read>(r: &mut R) -> io::Result<String> {
    let len = read_u16(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Compress data using LZ4.
#[cfg(feature = "lz4")]
pub fn compress_lz4(data: &[u8]) -> io::Result<Vec<u8>> {
    Ok(lz4_flex::compress_prepend_size(data))
}

/// Decompress LZ4 data.
#[cfg(feature = "lz4")]
pub fn decompress_lz4(data: &[u8]) -> io::Result<Vec<u8>> {
    lz4_flex::decompress_size_prepended(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(not(feature = "lz4"))]
pub fn compress_lz4(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(lz4_unavailable())
}

#[cfg(not(feature = "lz4"))]
pub fn decompress_lz4(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(lz4_unavailable())
}

#[cfg(not(feature = "lz4"))]
fn lz4_unavailable() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "LZ4 compression requires the `lz4` feature",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_frame() -> SceneFrame {
        SceneFrame {
            trails: vec![
                TrailState {
                    label: "Mercury".to_string(),
                    color: Color::rgb(0x1f, 0x77, 0xb4),
                    width: 0.8,
                    points: vec![Point3::new(0.1, 0.2, 0.3), Point3::new(-1.5, 2.25, 1e-9)],
                },
                TrailState {
                    label: "Venus".to_string(),
                    color: Color::rgb(0xff, 0x7f, 0x0e),
                    width: 0.8,
                    points: Vec::new(),
                },
            ],
            markers: vec![
                MarkerState {
                    label: "Mercury".to_string(),
                    color: Color::rgb(0x1f, 0x77, 0xb4),
                    size: 6.0,
                    position: Some(Point3::new(-1.5, 2.25, 1e-9)),
                },
                MarkerState {
                    label: "Venus".to_string(),
                    color: Color::rgb(0xff, 0x7f, 0x0e),
                    size: 6.0,
                    position: None,
                },
            ],
        }
    }

    #[test]
    fn test_header_roundtrip() {
        let header = AnimationHeader {
            trail_count: 4,
            marker_count: 4,
            frame_count: 1000,
            fps: 15.0,
            bitrate: 1800,
            tick_interval_ms: 80,
            flags: AnimationFlags {
                compression: CompressionType::Lz4,
            },
        };

        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), AnimationHeader::SIZE);

        let mut cursor = Cursor::new(&buf);
        let decoded = AnimationHeader::read_from(&mut cursor).unwrap();

        assert_eq!(decoded.trail_count, 4);
        assert_eq!(decoded.marker_count, 4);
        assert_eq!(decoded.frame_count, 1000);
        assert_eq!(decoded.fps, 15.0);
        assert_eq!(decoded.bitrate, 1800);
        assert_eq!(decoded.tick_interval_ms, 80);
        assert_eq!(decoded.flags.compression, CompressionType::Lz4);
    }

    #[test]
    fn test_header_rejects_bad_magic() {
        let mut buf = vec![0u8; AnimationHeader::SIZE];
        buf[..4].copy_from_slice(b"FLWA");
        let err = AnimationHeader::read_from(&mut Cursor::new(&buf)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_frame_encode_decode_is_exact() {
        let frame = sample_frame();
        let layout = SceneLayout::of(&frame, "Me");

        let mut bytes = Vec::new();
        encode_frame(&frame, &mut bytes);
        // 2 counts + 2 points + 2 flags + 1 marker point
        assert_eq!(bytes.len(), 4 + 2 * 24 + 4 + 1 + 24 + 1);

        let decoded = decode_frame(&bytes, &layout).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_decode_rejects_truncated_frame() {
        let frame = sample_frame();
        let layout = SceneLayout::of(&frame, "Me");
        let mut bytes = Vec::new();
        encode_frame(&frame, &mut bytes);

        assert!(decode_frame(&bytes[..bytes.len() - 1], &layout).is_err());
        bytes.push(0);
        assert!(decode_frame(&bytes, &layout).is_err());
    }

    #[test]
    fn test_layout_roundtrip() {
        let frame = sample_frame();
        let layout = SceneLayout::of(&frame, "Me");
        let header = AnimationHeader {
            trail_count: 2,
            marker_count: 2,
            frame_count: 0,
            fps: 15.0,
            bitrate: 1800,
            tick_interval_ms: 80,
            flags: AnimationFlags::default(),
        };

        let mut buf = Vec::new();
        layout.write_to(&mut buf).unwrap();
        let decoded = SceneLayout::read_from(&mut Cursor::new(&buf), &header).unwrap();
        assert_eq!(decoded, layout);
        assert!(decoded.matches(&frame));
    }

    #[test]
    fn test_frame_index_roundtrip() {
        let index = FrameIndex {
            offset: 12345678,
            size: 8192,
        };

        let mut buf = Vec::new();
        index.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), FrameIndex::SIZE);

        let mut cursor = Cursor::new(&buf);
        let decoded = FrameIndex::read_from(&mut cursor).unwrap();

        assert_eq!(decoded.offset, 12345678);
        assert_eq!(decoded.size, 8192);
    }
}
