//! Trajectory data model and the validated, read-only trajectory store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::PlaybackError;

/// A single 3D position sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Precomputed positions of one body, stored component-major.
///
/// The three component vectors always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    xs: Vec<f64>,
    ys: Vec<f64>,
    zs: Vec<f64>,
}

impl Trajectory {
    /// Build from a sequence of samples.
    pub fn from_samples(samples: &[Point3]) -> Self {
        Self {
            xs: samples.iter().map(|p| p.x).collect(),
            ys: samples.iter().map(|p| p.y).collect(),
            zs: samples.iter().map(|p| p.z).collect(),
        }
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Sample at `index`, if in range.
    #[inline]
    pub fn sample(&self, index: usize) -> Option<Point3> {
        (index < self.len()).then(|| Point3::new(self.xs[index], self.ys[index], self.zs[index]))
    }

    /// Leading `num` samples, clamped to the trajectory length.
    #[inline]
    pub fn prefix(&self, num: usize) -> TrailSlice<'_> {
        let n = num.min(self.len());
        TrailSlice {
            xs: &self.xs[..n],
            ys: &self.ys[..n],
            zs: &self.zs[..n],
        }
    }

    /// Normalize a raw array into component-major form.
    ///
    /// `body` is only used for error context.
    pub fn from_raw(body: &str, raw: &RawTrajectory) -> Result<Self, PlaybackError> {
        let mismatch = |detail: String| PlaybackError::DataShapeMismatch {
            body: body.to_string(),
            detail,
        };

        match raw.layout {
            ArrayLayout::ComponentMajor => {
                if raw.rows.len() != 3 {
                    return Err(mismatch(format!(
                        "expected 3 component rows, found {}",
                        raw.rows.len()
                    )));
                }
                let len = raw.rows[0].len();
                if let Some(row) = raw.rows.iter().position(|r| r.len() != len) {
                    return Err(mismatch(format!(
                        "component row {} has {} samples, expected {}",
                        row,
                        raw.rows[row].len(),
                        len
                    )));
                }
                Ok(Self {
                    xs: raw.rows[0].clone(),
                    ys: raw.rows[1].clone(),
                    zs: raw.rows[2].clone(),
                })
            }
            ArrayLayout::SampleMajor => {
                if let Some(i) = raw.rows.iter().position(|r| r.len() != 3) {
                    return Err(mismatch(format!(
                        "sample {} has {} components, expected 3",
                        i,
                        raw.rows[i].len()
                    )));
                }
                let mut traj = Self {
                    xs: Vec::with_capacity(raw.rows.len()),
                    ys: Vec::with_capacity(raw.rows.len()),
                    zs: Vec::with_capacity(raw.rows.len()),
                };
                for row in &raw.rows {
                    traj.xs.push(row[0]);
                    traj.ys.push(row[1]);
                    traj.zs.push(row[2]);
                }
                Ok(traj)
            }
        }
    }
}

/// Borrowed prefix of a trajectory, component-wise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSlice<'a> {
    pub xs: &'a [f64],
    pub ys: &'a [f64],
    pub zs: &'a [f64],
}

impl<'a> TrailSlice<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Most recent sample in the slice.
    pub fn last(&self) -> Option<Point3> {
        let i = self.len().checked_sub(1)?;
        Some(Point3::new(self.xs[i], self.ys[i], self.zs[i]))
    }

    /// Iterate samples in order.
    pub fn points(self) -> impl Iterator<Item = Point3> + 'a {
        self.xs
            .iter()
            .zip(self.ys)
            .zip(self.zs)
            .map(|((&x, &y), &z)| Point3::new(x, y, z))
    }

    pub fn to_vec(&self) -> Vec<Point3> {
        self.points().collect()
    }
}

/// Orientation of a raw per-body array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayLayout {
    /// Three rows (X, Y, Z), each with T samples.
    ComponentMajor,
    /// T rows, each an (x, y, z) triple.
    #[default]
    SampleMajor,
}

/// Raw 2D array for one body as supplied by a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrajectory {
    pub layout: ArrayLayout,
    pub rows: Vec<Vec<f64>>,
}

/// Supplier of raw per-body position arrays.
pub trait TrajectorySource {
    /// Body keys available from this source, in load order.
    fn keys(&self) -> Vec<String>;

    /// Raw array for `key`.
    fn fetch(&self, key: &str) -> Result<RawTrajectory, PlaybackError>;
}

/// Validated trajectories keyed by body key. Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryStore {
    trajectories: HashMap<String, Trajectory>,
    total_frames: usize,
}

impl TrajectoryStore {
    /// Load and normalize every trajectory offered by `source`.
    pub fn load<S: TrajectorySource + ?Sized>(source: &S) -> Result<Self, PlaybackError> {
        let mut entries = Vec::new();
        for key in source.keys() {
            let raw = source.fetch(&key)?;
            let traj = Trajectory::from_raw(&key, &raw)?;
            entries.push((key, traj));
        }
        Self::from_trajectories(entries)
    }

    /// Build from already-normalized trajectories, enforcing equal lengths.
    pub fn from_trajectories<I>(entries: I) -> Result<Self, PlaybackError>
    where
        I: IntoIterator<Item = (String, Trajectory)>,
    {
        let mut trajectories = HashMap::new();
        let mut reference: Option<(String, usize)> = None;

        for (key, traj) in entries {
            let (first, len) = reference.get_or_insert_with(|| (key.clone(), traj.len()));
            if *len != traj.len() {
                return Err(PlaybackError::DataShapeMismatch {
                    detail: format!("{} samples, but '{}' has {}", traj.len(), first, len),
                    body: key,
                });
            }
            if trajectories.insert(key.clone(), traj).is_some() {
                return Err(PlaybackError::DataShapeMismatch {
                    body: key,
                    detail: "trajectory supplied more than once".to_string(),
                });
            }
        }

        let total_frames = reference.map_or(0, |(_, len)| len);
        log::info!(
            "Loaded {} trajectories with {} samples each",
            trajectories.len(),
            total_frames
        );

        Ok(Self {
            trajectories,
            total_frames,
        })
    }

    /// Shared trajectory length T.
    #[inline]
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn get(&self, key: &str) -> Option<&Trajectory> {
        self.trajectories.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.trajectories.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }
}
