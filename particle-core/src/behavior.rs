//! Steering behaviors. Each one is a pure function of particle state that
//! returns a force; the caller weights and accumulates them.

use crate::frame::{FlockStats, Viewport};
use crate::noise::NoiseSource;
use crate::particle::Body;
use crate::vector::{Falloff, Vector2D};

/// Linearly weighted push away from every neighbor closer than `range`.
///
/// Each neighbor at distance `d` contributes `(self - other) / d * (range - d)`,
/// so the push grows as `d` shrinks and vanishes at `range`. The particle
/// itself is skipped by id. A distinct neighbor at exactly the same position
/// has no defined direction and contributes nothing.
///
/// Cost is O(n) per particle, O(n²) per frame.
pub fn separation(me: &Body, neighbors: &[Body], range: f32) -> Vector2D {
    let mut force = Vector2D::zero();
    for other in neighbors.iter().filter(|other| other.id != me.id) {
        let d = me.position.distance_to(&other.position);
        if d > 0.0 && d < range {
            let offset = (me.position - other.position) * (1.0 / d);
            force.add_multiple(offset, range - d);
        }
    }
    force
}

/// Steer toward the flock's mean velocity.
pub fn alignment(velocity: Vector2D, flock: &FlockStats) -> Vector2D {
    flock.velocity - velocity
}

/// Steer toward the flock's mean position.
pub fn cohesion(position: Vector2D, flock: &FlockStats, strength: f32, falloff: Falloff) -> Vector2D {
    position.force_towards_point(flock.center, strength, falloff)
}

/// Noise-driven forward thrust.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Propulsion {
    /// Thrust every particle gets.
    pub base: f32,
    /// Extra thrust scaled by the particle's own noise value.
    pub extra: f32,
}

impl Default for Propulsion {
    fn default() -> Self {
        Self {
            base: 100.0,
            extra: 120.0,
        }
    }
}

/// Forward-biased wander.
///
/// Strength comes from `noise(id)`, constant per particle, and the turn from
/// `noise(id, time) - 0.5`, so a particle's path is stable between frames but
/// differs from its neighbors'.
pub fn propulsion(id: usize, heading: f32, time: f32, noise: &dyn NoiseSource, params: Propulsion) -> Vector2D {
    let key = id as f32;
    let strength = params.base + params.extra * noise.noise1(key);
    let turn = noise.noise2(key, time) - 0.5;
    Vector2D::polar(strength, heading + turn)
}

/// Soft wall: a pull toward the viewport center once the particle is farther
/// than `falloff.start_radius` from it.
pub fn boundary(position: Vector2D, viewport: &Viewport, strength: f32, falloff: Falloff) -> Vector2D {
    position.force_towards_point(viewport.center(), strength, falloff)
}

/// Per-axis distances to the nearest vertical and horizontal viewport edge.
pub fn distance_to_walls(position: Vector2D, viewport: &Viewport) -> (f32, f32) {
    let dx = position.x.min(viewport.width - position.x);
    let dy = position.y.min(viewport.height - position.y);
    (dx, dy)
}

/// Pull toward the viewport center while within `margin` of any edge, or
/// outside the viewport altogether. Zero elsewhere.
pub fn wall_attraction(
    position: Vector2D,
    viewport: &Viewport,
    margin: f32,
    strength: f32,
    falloff: Falloff,
) -> Vector2D {
    let (dx, dy) = distance_to_walls(position, viewport);
    if dx <= margin || dy <= margin {
        position.force_towards_point(viewport.center(), strength, falloff)
    } else {
        Vector2D::zero()
    }
}

/// Attraction to an arbitrary point such as the pointer. A negative
/// `strength` repels.
pub fn point_attraction(position: Vector2D, target: Vector2D, strength: f32, falloff: Falloff) -> Vector2D {
    position.force_towards_point(target, strength, falloff)
}

/// Heading of the noise wind at `position`, in radians.
///
/// Sampling position and time together keeps particles that share a spot
/// from locking into the same path forever.
pub fn wind_direction(noise: &dyn NoiseSource, position: Vector2D, scale: f32, time: f32) -> f32 {
    20.0 * noise.noise3(position.x * scale, position.y * scale, time * 0.1)
}

/// Static wind field: unit-speed wind whose heading follows the noise.
pub fn wind_at(noise: &dyn NoiseSource, x: f32, y: f32, scale: f32) -> Vector2D {
    Vector2D::polar(1.0, noise.noise2(x * scale, y * scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::FlatNoise;

    fn body(id: usize, x: f32, y: f32) -> Body {
        Body::new(id, Vector2D::new(x, y), Vector2D::zero())
    }

    #[test]
    fn test_separation_grows_as_distance_shrinks() {
        let me = body(0, 0.0, 0.0);
        let mut last = 0.0;
        for &d in &[99.0, 75.0, 50.0, 10.0, 1.0, 0.01] {
            let force = separation(&me, &[me, body(1, d, 0.0)], 100.0);
            let mag = force.magnitude();
            assert!(mag > last, "d {} gave {} after {}", d, mag, last);
            assert!(force.x < 0.0);
            last = mag;
        }
    }

    #[test]
    fn test_cohesion_points_to_flock_center() {
        let flock = FlockStats {
            center: Vector2D::new(100.0, 0.0),
            velocity: Vector2D::zero(),
        };
        let force = cohesion(Vector2D::zero(), &flock, 1.0, Falloff::new(0.0, 1.2));
        assert!(force.x > 0.0);
        assert_eq!(force.y, 0.0);
        assert!((force.magnitude() - 1.0 / 100f32.powf(1.2)).abs() < 1e-6);

        let at_center = cohesion(flock.center, &flock, 1.0, Falloff::new(0.0, 1.2));
        assert_eq!(at_center, Vector2D::zero());
    }

    #[test]
    fn test_separation_zero_at_and_beyond_range() {
        let me = body(0, 0.0, 0.0);
        assert_eq!(separation(&me, &[body(1, 100.0, 0.0)], 100.0), Vector2D::zero());
        assert_eq!(separation(&me, &[body(1, 0.0, 250.0)], 100.0), Vector2D::zero());
    }

    #[test]
    fn test_separation_near_coincident_is_finite() {
        let me = body(0, 5.0, 5.0);
        let force = separation(&me, &[body(1, 5.0 + 1e-4, 5.0)], 100.0);
        assert!(force.is_finite());
        assert!(force.magnitude() > 99.0);

        let stacked = separation(&me, &[body(1, 5.0, 5.0)], 100.0);
        assert_eq!(stacked, Vector2D::zero());
    }

    #[test]
    fn test_separation_ignores_self() {
        let me = body(3, 1.0, 1.0);
        assert_eq!(separation(&me, &[me], 100.0), Vector2D::zero());
    }

    #[test]
    fn test_alignment_points_to_mean_velocity() {
        let flock = FlockStats {
            center: Vector2D::zero(),
            velocity: Vector2D::new(10.0, 0.0),
        };
        assert_eq!(alignment(Vector2D::new(4.0, 2.0), &flock), Vector2D::new(6.0, -2.0));
    }

    #[test]
    fn test_propulsion_magnitude_from_noise() {
        let force = propulsion(4, 0.0, 1.0, &FlatNoise(0.5), Propulsion::default());
        assert!((force.magnitude() - 160.0).abs() < 1e-3);
        assert!(force.angle().abs() < 1e-6);
    }

    #[test]
    fn test_propulsion_is_repeatable() {
        let noise = |x: f32, y: f32, _z: f32| ((x * 0.37 + y * 0.11) % 1.0).abs();
        let a = propulsion(2, 0.4, 3.0, &noise, Propulsion::default());
        let b = propulsion(2, 0.4, 3.0, &noise, Propulsion::default());
        let c = propulsion(3, 0.4, 3.0, &noise, Propulsion::default());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_boundary_dead_zone() {
        let viewport = Viewport {
            width: 800.0,
            height: 600.0,
        };
        let falloff = Falloff::new(140.0, 1.2);
        assert_eq!(boundary(Vector2D::new(450.0, 300.0), &viewport, 10.0, falloff), Vector2D::zero());
        let pull = boundary(Vector2D::new(700.0, 300.0), &viewport, 10.0, falloff);
        assert!(pull.x < 0.0);
    }

    #[test]
    fn test_wall_attraction_per_axis() {
        let viewport = Viewport {
            width: 800.0,
            height: 600.0,
        };
        let falloff = Falloff::new(0.0, 1.2);
        assert_eq!(distance_to_walls(Vector2D::new(790.0, 300.0), &viewport), (10.0, 300.0));
        assert_eq!(
            wall_attraction(Vector2D::new(400.0, 300.0), &viewport, 20.0, 1.0, falloff),
            Vector2D::zero()
        );
        let near_left = wall_attraction(Vector2D::new(5.0, 300.0), &viewport, 20.0, 1.0, falloff);
        assert!(near_left.x > 0.0);
        let near_bottom = wall_attraction(Vector2D::new(400.0, 590.0), &viewport, 20.0, 1.0, falloff);
        assert!(near_bottom.y < 0.0);
    }

    #[test]
    fn test_point_attraction_repels_with_negative_strength() {
        let falloff = Falloff::default();
        let push = point_attraction(Vector2D::zero(), Vector2D::new(10.0, 0.0), -1.0, falloff);
        assert!(push.x < 0.0);
    }

    #[test]
    fn test_wind_direction_scales_noise() {
        let dir = wind_direction(&FlatNoise(0.25), Vector2D::new(10.0, 10.0), 0.0001, 5.0);
        assert_eq!(dir, 5.0);
        let wind = wind_at(&FlatNoise(0.0), 1.0, 1.0, 0.0001);
        assert_eq!(wind, Vector2D::new(1.0, 0.0));
    }
}
