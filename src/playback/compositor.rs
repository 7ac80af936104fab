//! Frame compositor - maps a frame index to per-body trail and marker state.
//!
//! Frame `num` shows, for every body, the trail `[0, num)` and the marker at
//! sample `num - 1`. Trail geometry is replaced wholesale on every call, so
//! the result depends only on `num` and the trajectory data.

use crate::render::RenderSurface;
use crate::schema::MarkerPolicy;

use super::{Body, PlaybackError, Point3, TrailSlice, Trajectory, TrajectoryStore};

/// What one body displays at a given frame index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame<'a> {
    /// Revealed samples `[0, num)`.
    pub trail: TrailSlice<'a>,
    /// Sample `num - 1`, absent at `num == 0`.
    pub last: Option<Point3>,
}

/// Stateless per-frame compositor.
#[derive(Debug, Clone, Copy)]
pub struct FrameCompositor {
    total_frames: usize,
    marker_at_zero: MarkerPolicy,
}

impl FrameCompositor {
    pub fn new(total_frames: usize, marker_at_zero: MarkerPolicy) -> Self {
        Self {
            total_frames,
            marker_at_zero,
        }
    }

    /// Compositor for every trajectory in `store`.
    pub fn for_store(store: &TrajectoryStore, marker_at_zero: MarkerPolicy) -> Self {
        Self::new(store.total_frames(), marker_at_zero)
    }

    /// Largest valid frame index.
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn marker_policy(&self) -> MarkerPolicy {
        self.marker_at_zero
    }

    #[inline]
    fn check(&self, num: usize) -> Result<(), PlaybackError> {
        if num > self.total_frames {
            return Err(PlaybackError::FrameIndexOutOfRange {
                num,
                total_frames: self.total_frames,
            });
        }
        Ok(())
    }

    /// Compute what `trajectory` shows at frame `num`.
    pub fn compose<'a>(
        &self,
        num: usize,
        trajectory: &'a Trajectory,
    ) -> Result<BodyFrame<'a>, PlaybackError> {
        self.check(num)?;
        let trail = trajectory.prefix(num);
        Ok(BodyFrame {
            trail,
            last: trail.last(),
        })
    }

    /// Update every body's trail and marker for frame `num`, in registry order.
    pub fn apply<S: RenderSurface + ?Sized>(
        &self,
        num: usize,
        bodies: &[Body],
        store: &TrajectoryStore,
        surface: &mut S,
    ) -> Result<(), PlaybackError> {
        self.check(num)?;

        for body in bodies {
            let trajectory = store
                .get(&body.key)
                .ok_or_else(|| PlaybackError::UnknownTrajectory {
                    key: body.key.clone(),
                })?;
            let frame = self.compose(num, trajectory)?;

            surface
                .set_trail(body.trail, frame.trail)
                .map_err(|e| PlaybackError::render(&body.name, e))?;

            let marker = match (frame.last, self.marker_at_zero) {
                (Some(last), _) => surface.set_marker(body.marker, last),
                (None, MarkerPolicy::Hide) => surface.clear_marker(body.marker),
                (None, MarkerPolicy::Keep) => Ok(()),
            };
            marker.map_err(|e| PlaybackError::render(&body.name, e))?;
        }

        Ok(())
    }
}
