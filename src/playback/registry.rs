//! Body registry - stable identities bound once at startup.

use crate::render::{ArtifactStyle, Color, MarkerHandle, RenderSurface, TrailHandle};
use crate::schema::BodyConfig;

use super::{PlaybackError, TrajectoryStore};

/// An orbiting body bound to one trajectory and two render artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Display name (legend label).
    pub name: String,
    /// Trajectory key in the store.
    pub key: String,
    /// Color pinned at registration.
    pub color: Color,
    pub trail: TrailHandle,
    pub marker: MarkerHandle,
}

/// Ordered set of registered bodies.
///
/// Registration order is the canonical order used for every frame update.
#[derive(Debug)]
pub struct BodyRegistry {
    bodies: Vec<Body>,
    trail_width: f32,
    marker_size: f32,
}

impl BodyRegistry {
    pub fn new(trail_width: f32, marker_size: f32) -> Self {
        Self {
            bodies: Vec::new(),
            trail_width,
            marker_size,
        }
    }

    /// Bind a body to its trajectory and acquire its trail and marker.
    ///
    /// The trail starts empty; the marker starts at the first sample.
    pub fn register<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        store: &TrajectoryStore,
        config: &BodyConfig,
    ) -> Result<&Body, PlaybackError> {
        if self.get(&config.name).is_some() {
            return Err(PlaybackError::DuplicateBodyName {
                name: config.name.clone(),
            });
        }
        let trajectory = store
            .get(&config.key)
            .ok_or_else(|| PlaybackError::UnknownTrajectory {
                key: config.key.clone(),
            })?;

        let (trail, color) = surface
            .create_trail(
                &config.name,
                ArtifactStyle {
                    color: config.color,
                    size: self.trail_width,
                },
            )
            .map_err(|e| PlaybackError::render(&config.name, e))?;

        let marker = surface
            .create_marker(
                &config.name,
                ArtifactStyle {
                    color: Some(color),
                    size: self.marker_size,
                },
                trajectory.sample(0),
            )
            .map_err(|e| PlaybackError::render(&config.name, e))?;

        log::debug!(
            "Registered body '{}' (key '{}', color {})",
            config.name,
            config.key,
            color
        );

        self.bodies.push(Body {
            name: config.name.clone(),
            key: config.key.clone(),
            color,
            trail,
            marker,
        });
        Ok(&self.bodies[self.bodies.len() - 1])
    }

    /// Registered bodies in canonical order.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn get(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.name == name)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Return every trail and marker handle to the surface.
    pub fn release<S: RenderSurface + ?Sized>(self, surface: &mut S) -> Result<(), PlaybackError> {
        for body in self.bodies {
            surface
                .release_trail(body.trail)
                .map_err(|e| PlaybackError::render(&body.name, e))?;
            surface
                .release_marker(body.marker)
                .map_err(|e| PlaybackError::render(&body.name, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{Point3, Trajectory};
    use crate::render::SceneBuffer;

    fn store() -> TrajectoryStore {
        let a = Trajectory::from_samples(&[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)]);
        let b = Trajectory::from_samples(&[Point3::new(0.0, 0.0, 5.0), Point3::new(1.0, 1.0, 6.0)]);
        TrajectoryStore::from_trajectories(vec![("a".to_string(), a), ("b".to_string(), b)])
            .unwrap()
    }

    #[test]
    fn test_register_preserves_order_and_pins_colors() {
        let store = store();
        let mut scene = SceneBuffer::new();
        let mut registry = BodyRegistry::new(0.8, 6.0);

        registry
            .register(&mut scene, &store, &BodyConfig::new("B", "b"))
            .unwrap();
        registry
            .register(
                &mut scene,
                &store,
                &BodyConfig::new("A", "a").with_color(Color::rgb(9, 9, 9)),
            )
            .unwrap();

        let names: Vec<_> = registry.bodies().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
        assert_eq!(registry.bodies()[0].color, Color::palette(0));
        assert_eq!(registry.bodies()[1].color, Color::rgb(9, 9, 9));

        let b = registry.get("B").unwrap();
        let marker = scene.marker(b.marker).unwrap();
        assert_eq!(marker.color, b.color);
        assert_eq!(marker.position, Some(Point3::new(0.0, 0.0, 5.0)));
        assert!(scene.trail(b.trail).unwrap().points.is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let store = store();
        let mut scene = SceneBuffer::new();
        let mut registry = BodyRegistry::new(0.8, 6.0);

        registry
            .register(&mut scene, &store, &BodyConfig::new("A", "a"))
            .unwrap();
        let err = registry
            .register(&mut scene, &store, &BodyConfig::new("A", "b"))
            .unwrap_err();

        assert!(matches!(err, PlaybackError::DuplicateBodyName { name } if name == "A"));
        assert_eq!(registry.len(), 1);
        assert_eq!(scene.live_artifacts(), 2);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let store = store();
        let mut scene = SceneBuffer::new();
        let mut registry = BodyRegistry::new(0.8, 6.0);

        let err = registry
            .register(&mut scene, &store, &BodyConfig::new("C", "c"))
            .unwrap_err();
        assert!(matches!(err, PlaybackError::UnknownTrajectory { key } if key == "c"));
        assert!(registry.is_empty());
        assert_eq!(scene.live_artifacts(), 0);
    }

    #[test]
    fn test_release_returns_handles() {
        let store = store();
        let mut scene = SceneBuffer::new();
        let mut registry = BodyRegistry::new(0.8, 6.0);
        registry
            .register(&mut scene, &store, &BodyConfig::new("A", "a"))
            .unwrap();
        registry
            .register(&mut scene, &store, &BodyConfig::new("B", "b"))
            .unwrap();
        assert_eq!(scene.live_artifacts(), 4);

        registry.release(&mut scene).unwrap();
        assert_eq!(scene.live_artifacts(), 0);
    }
}
