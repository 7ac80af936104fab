//! JSON trajectory data files.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::playback::{ArrayLayout, PlaybackError, RawTrajectory, TrajectorySource};

/// Per-body position arrays as stored on disk.
///
/// ```json
/// {
///   "layout": "sample_major",
///   "bodies": { "earth": [[1.0, 0.0, 0.0], [0.99, 0.06, 0.0]] }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrajectoryFile {
    /// Orientation shared by every array in the file.
    #[serde(default)]
    pub layout: ArrayLayout,
    /// Body key to 2D numeric array.
    pub bodies: BTreeMap<String, Vec<Vec<f64>>>,
}

/// Loop parameters for synthetic data, indexed by body order.
const SYNTHETIC_LOOPS: [(f64, f64, f64); 8] = [
    // (semi-major axis, eccentricity, inclination in radians)
    (0.387, 0.206, 0.122),
    (0.723, 0.007, 0.059),
    (1.000, 0.017, 0.000),
    (1.524, 0.093, 0.032),
    (2.767, 0.076, 0.185),
    (5.203, 0.049, 0.023),
    (9.537, 0.057, 0.043),
    (19.19, 0.046, 0.013),
];

impl TrajectoryFile {
    /// Deterministic parametric loops for demos and benchmarks.
    ///
    /// Each body traces an inclined ellipse with a period proportional to
    /// `a^1.5`, sampled uniformly in time. This is geometry, not dynamics.
    pub fn synthetic(keys: &[&str], samples: usize) -> Self {
        let bodies = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let (a, e, inc) = SYNTHETIC_LOOPS[i % SYNTHETIC_LOOPS.len()];
                let period = a.powf(1.5) * 365.0;
                let rows = (0..samples)
                    .map(|t| {
                        let angle = TAU * t as f64 / period;
                        let r = a * (1.0 - e * e) / (1.0 + e * angle.cos());
                        let (x, y) = (r * angle.cos(), r * angle.sin());
                        vec![x, y * inc.cos(), y * inc.sin()]
                    })
                    .collect();
                (key.to_string(), rows)
            })
            .collect();

        Self {
            layout: ArrayLayout::SampleMajor,
            bodies,
        }
    }
}

impl TrajectorySource for TrajectoryFile {
    fn keys(&self) -> Vec<String> {
        self.bodies.keys().cloned().collect()
    }

    fn fetch(&self, key: &str) -> Result<RawTrajectory, PlaybackError> {
        let rows = self
            .bodies
            .get(key)
            .ok_or_else(|| PlaybackError::UnknownTrajectory {
                key: key.to_string(),
            })?;
        Ok(RawTrajectory {
            layout: self.layout,
            rows: rows.clone(),
        })
    }
}
