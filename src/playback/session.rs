//! Playback session - a render surface with its scene and bodies bound.

use crate::render::RenderSurface;
use crate::schema::PlaybackConfig;

use super::{BodyRegistry, FrameCompositor, PlaybackDriver, PlaybackError, TrajectoryStore};

/// Trajectories, registered bodies and the surface they draw on.
///
/// Built once by [`PlaybackSession::setup`]; the driver borrows it for the
/// duration of a run.
pub struct PlaybackSession<S: RenderSurface> {
    pub(crate) store: TrajectoryStore,
    pub(crate) registry: BodyRegistry,
    pub(crate) surface: S,
}

impl<S: RenderSurface> PlaybackSession<S> {
    /// Draw the static scene and register every configured body in order.
    pub fn setup(
        config: &PlaybackConfig,
        store: TrajectoryStore,
        mut surface: S,
    ) -> Result<Self, PlaybackError> {
        config.validate()?;

        surface.configure_axes(&config.axes, &config.title);
        surface.add_focal_point(
            &config.focal.label,
            config.focal.position,
            config.focal.color,
            config.focal.marker_size,
        );

        let mut registry = BodyRegistry::new(config.style.trail_width, config.style.marker_size);
        for body in &config.bodies {
            registry.register(&mut surface, &store, body)?;
        }
        surface.show_legend(config.style.legend_location);

        log::info!(
            "Session ready: {} bodies, {} samples each",
            registry.len(),
            store.total_frames()
        );

        Ok(Self {
            store,
            registry,
            surface,
        })
    }

    /// Driver configured from `config.timing` and `config.export`.
    pub fn driver(&self, config: &PlaybackConfig) -> PlaybackDriver {
        let compositor = FrameCompositor::for_store(&self.store, config.timing.marker_at_zero);
        PlaybackDriver::new(compositor)
            .with_pacing(config.timing.pacing)
            .with_export_retries(config.export.retries)
    }

    pub fn store(&self) -> &TrajectoryStore {
        &self.store
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Split borrow for driving a compositor by hand.
    pub fn parts_mut(&mut self) -> (&TrajectoryStore, &BodyRegistry, &mut S) {
        (&self.store, &self.registry, &mut self.surface)
    }

    /// Release every body's render handles and hand back the surface.
    pub fn close(self) -> Result<S, PlaybackError> {
        let Self {
            registry,
            mut surface,
            ..
        } = self;
        registry.release(&mut surface)?;
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{ErrorKind, Point3, Trajectory};
    use crate::render::SceneBuffer;
    use crate::schema::BodyConfig;

    fn store(keys: &[&str]) -> TrajectoryStore {
        let traj = Trajectory::from_samples(&[Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)]);
        TrajectoryStore::from_trajectories(keys.iter().map(|k| (k.to_string(), traj.clone())))
            .unwrap()
    }

    #[test]
    fn test_setup_draws_scene_once() {
        let config = PlaybackConfig::default();
        let session = PlaybackSession::setup(
            &config,
            store(&["mercury", "venus", "earth", "mars"]),
            SceneBuffer::new(),
        )
        .unwrap();

        let scene = session.surface();
        assert_eq!(scene.title(), "A Capricorn's Solar Orbiters");
        assert_eq!(scene.axes().unwrap().z.min, -3.0);
        assert_eq!(scene.focal_points().len(), 1);
        assert_eq!(scene.focal_points()[0].label, "SUN");
        assert_eq!(scene.legend(), Some(2));

        let names: Vec<_> = session
            .registry()
            .bodies()
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, ["Mercury", "Venus", "Earth", "Mars"]);
        assert_eq!(scene.snapshot().trails.len(), 4);
    }

    #[test]
    fn test_setup_missing_trajectory() {
        let config = PlaybackConfig::default();
        let result = PlaybackSession::setup(&config, store(&["mercury"]), SceneBuffer::new());
        assert!(matches!(
            result,
            Err(PlaybackError::UnknownTrajectory { key }) if key == "venus"
        ));
    }

    #[test]
    fn test_setup_duplicate_body_name() {
        let config = PlaybackConfig {
            bodies: vec![BodyConfig::new("A", "a"), BodyConfig::new("A", "a")],
            ..Default::default()
        };
        let err = PlaybackSession::setup(&config, store(&["a"]), SceneBuffer::new())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::DuplicateBodyName);
        assert!(matches!(err, PlaybackError::DuplicateBodyName { name } if name == "A"));
    }

    #[test]
    fn test_setup_validates_config() {
        let config = PlaybackConfig {
            bodies: Vec::new(),
            ..Default::default()
        };
        let result = PlaybackSession::setup(&config, store(&["a"]), SceneBuffer::new());
        assert!(matches!(result, Err(PlaybackError::Config(_))));
    }

    #[test]
    fn test_close_releases_handles() {
        let config = PlaybackConfig {
            bodies: vec![BodyConfig::new("A", "a"), BodyConfig::new("B", "b")],
            ..Default::default()
        };
        let session = PlaybackSession::setup(&config, store(&["a", "b"]), SceneBuffer::new()).unwrap();
        assert_eq!(session.surface().live_artifacts(), 4);

        let scene = session.close().unwrap();
        assert_eq!(scene.live_artifacts(), 0);
        assert_eq!(scene.focal_points().len(), 1);
    }
}
