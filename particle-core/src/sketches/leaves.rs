//! Wind-blown leaves steered by a noise field.

use rand::{Rng, RngCore};

use crate::behavior;
use crate::error::SimError;
use crate::frame::{DrawContext, ForceContext, Viewport};
use crate::math;
use crate::noise::NoiseSource;
use crate::particle::{Particle, ParticleKind};
use crate::render::{Canvas, Hsla, PathStyle};
use crate::vector::Vector2D;

#[derive(Debug, Clone)]
pub struct LeafState {
    /// Spin on top of the direction of travel.
    pub spin: f32,
    pub hue: f32,
    pub body_hue: f32,
    /// Last wind force, kept for debug drawing.
    pub wind: Vector2D,
}

#[derive(Debug, Clone)]
pub struct LeavesKind {
    pub wind_scale: f32,
    pub wind_strength: f32,
    pub gravity: Vector2D,
    pub drag: f32,
    pub initial_velocity: Vector2D,
}

impl Default for LeavesKind {
    fn default() -> Self {
        Self {
            wind_scale: 0.0001,
            wind_strength: 100.0,
            gravity: Vector2D::new(0.0, 40.0),
            drag: 0.95,
            initial_velocity: Vector2D::new(0.0, 100.0),
        }
    }
}

impl LeavesKind {
    /// Unit wind vector of the static field at `(x, y)`.
    pub fn wind_at(&self, noise: &dyn NoiseSource, x: f32, y: f32) -> Vector2D {
        behavior::wind_at(noise, x, y, self.wind_scale)
    }
}

impl ParticleKind for LeavesKind {
    type State = LeafState;

    fn label(&self) -> &'static str {
        "🍂"
    }

    fn default_population(&self) -> usize {
        100
    }

    fn spawn(&self, id: usize, viewport: &Viewport, rng: &mut dyn RngCore) -> Result<Particle<LeafState>, SimError> {
        let mut position = Vector2D::zero();
        position.set_to_random(0.0, viewport.width, 0.0, viewport.height, rng)?;
        let state = LeafState {
            spin: rng.gen_range(0.0..200.0),
            hue: rng.gen_range(0.0..60.0),
            body_hue: rng.gen_range(0.0..160.0),
            wind: Vector2D::zero(),
        };
        Ok(Particle::new(id, position, self.initial_velocity, state))
    }

    fn calculate_forces(&self, particle: &mut Particle<LeafState>, ctx: &ForceContext<'_>) -> Result<(), SimError> {
        particle.apply_drag(self.drag, ctx.dt);
        particle.apply_force(self.gravity);

        let direction = behavior::wind_direction(ctx.noise, particle.position, self.wind_scale, ctx.time);
        particle.state.spin += math::sin(direction) * 0.01;
        particle.state.wind = Vector2D::polar(self.wind_strength, direction);
        let wind = particle.state.wind;
        particle.apply_force(wind);
        Ok(())
    }

    fn move_particle(&self, particle: &mut Particle<LeafState>, ctx: &ForceContext<'_>) {
        particle.integrate(ctx.dt);
        particle
            .position
            .wrap_x(0.0, ctx.viewport.width)
            .wrap_y(0.0, ctx.viewport.height);
    }

    fn draw_background(&self, canvas: &mut dyn Canvas, _ctx: &DrawContext<'_>) {
        canvas.background(Hsla::opaque(170.0, 75.0, 75.0));
    }

    fn draw_particle(&self, particle: &Particle<LeafState>, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>, debug: bool) {
        let t = ctx.time;
        let id = particle.id as f32;
        let s = &particle.state;
        let rotation = particle.velocity.angle() + s.spin;

        canvas.stroke(Some(Hsla::new(0.0, 0.0, 0.0, 0.4)), 1.0);
        canvas.push();
        canvas.translate(particle.position);
        canvas.rotate(rotation);
        canvas.fill(Some(Hsla::opaque(
            s.hue,
            50.0 + 50.0 * ctx.noise.noise1(id + t + 50.0),
            30.0 + 30.0 * ctx.noise.noise1(id + t + 100.0),
        )));
        // thin/thick flutter reads as the leaf spinning
        canvas.scale(0.5 + 0.5 * math::sin(id + t * 10.0) + 0.1, 1.0);
        let (right, left) = leaf_lobes();
        canvas.polygon(&right, PathStyle::Smooth);
        canvas.polygon(&left, PathStyle::Smooth);
        canvas.pop();

        canvas.push();
        canvas.translate(particle.position);
        canvas.rotate(rotation);
        canvas.fill(Some(Hsla::opaque(s.body_hue, 100.0, 50.0)));
        for dy in [4.0, 0.0, -4.0] {
            canvas.circle(Vector2D::new(0.0, dy), 2.0);
        }
        canvas.pop();

        if debug {
            canvas.arrow(particle.position, s.wind, 0.2, Hsla::opaque(0.0, 0.0, 0.0));
            let field = self.wind_at(ctx.noise, particle.position.x, particle.position.y);
            canvas.arrow(particle.position, field, FIELD_ARROW, Hsla::new(0.0, 0.0, 100.0, 0.6));
        }
    }
}

const LEAF_WIDTH: f32 = 6.0;
/// Drawn length of the static wind field arrow.
const FIELD_ARROW: f32 = 15.0;
const LEAF_LENGTH: f32 = 20.0;

fn leaf_lobes() -> ([Vector2D; 4], [Vector2D; 4]) {
    let (w, l) = (LEAF_WIDTH, LEAF_LENGTH);
    let right = [
        Vector2D::new(l * 0.25 + w, 0.0),
        Vector2D::new(l * 0.2 + w, w),
        Vector2D::new(-l * 0.25 + w, 0.0),
        Vector2D::new(l * 0.2 + w, -w),
    ];
    let left = [
        Vector2D::new(-l * 0.25 - w, 0.0),
        Vector2D::new(-l * 0.2 - w, -w),
        Vector2D::new(l * 0.2 - w, 0.0),
        Vector2D::new(-l * 0.2 - w, w),
    ];
    (right, left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameInput;
    use crate::noise::FlatNoise;
    use crate::render::recording::{Op, RecordingCanvas};
    use crate::system::ParticleSystem;
    use alloc::boxed::Box;
    use rand::rngs::mock::StepRng;

    fn viewport() -> Viewport {
        Viewport {
            width: 400.0,
            height: 300.0,
        }
    }

    #[test]
    fn test_spawn_state() {
        let kind = LeavesKind::default();
        let mut rng = StepRng::new(11, 0x9E37_79B9_7F4A_7C15);
        let p = kind.spawn(7, &viewport(), &mut rng).unwrap();
        assert_eq!(p.id, 7);
        assert_eq!(p.velocity, Vector2D::new(0.0, 100.0));
        assert!(p.state.hue >= 0.0 && p.state.hue < 60.0);
        assert!(p.state.body_hue >= 0.0 && p.state.body_hue < 160.0);
    }

    #[test]
    fn test_forces_gravity_and_wind() {
        let kind = LeavesKind {
            drag: 1.0,
            ..LeavesKind::default()
        };
        let mut p = Particle::new(
            0,
            Vector2D::new(10.0, 10.0),
            Vector2D::zero(),
            LeafState {
                spin: 0.0,
                hue: 0.0,
                body_hue: 0.0,
                wind: Vector2D::zero(),
            },
        );
        let bodies = [p.body()];
        let noise = FlatNoise(0.0);
        let ctx = ForceContext {
            dt: 0.1,
            time: 0.0,
            viewport: viewport(),
            pointer: None,
            noise: &noise,
            flock: None,
            neighbors: &bodies,
        };
        kind.calculate_forces(&mut p, &ctx).unwrap();
        // wind heading 0 with flat zero noise
        assert!((p.force.x - 100.0).abs() < 1e-4);
        assert!((p.force.y - 40.0).abs() < 1e-4);
        assert_eq!(p.state.spin, 0.0);
    }

    #[test]
    fn test_leaves_wrap_around() {
        let mut rng = StepRng::new(11, 0x9E37_79B9_7F4A_7C15);
        let mut sys =
            ParticleSystem::new(LeavesKind::default(), 25, viewport(), Box::new(FlatNoise(0.3)), &mut rng).unwrap();
        for i in 0..300 {
            sys.update(&FrameInput::fixed(i, 1.0 / 60.0)).unwrap();
            for p in sys.particles() {
                assert!(p.position.x >= 0.0 && p.position.x < 400.0);
                assert!(p.position.y >= 0.0 && p.position.y < 300.0);
            }
        }
        assert!(sys.flock().is_none());
    }

    #[test]
    fn test_render_leaf_shapes() {
        let mut rng = StepRng::new(11, 0x9E37_79B9_7F4A_7C15);
        let sys = ParticleSystem::new(LeavesKind::default(), 2, viewport(), Box::new(FlatNoise(0.3)), &mut rng).unwrap();
        let mut canvas = RecordingCanvas::default();
        sys.render(&mut canvas, true);
        assert_eq!(canvas.ops[0], Op::Background(Hsla::opaque(170.0, 75.0, 75.0)));
        assert_eq!(canvas.count(|op| matches!(op, Op::Polygon(4, _))), 4);
        assert_eq!(canvas.count(|op| matches!(op, Op::Circle(..))), 6);
        assert_eq!(
            canvas.count(|op| matches!(op, Op::Push)),
            canvas.count(|op| matches!(op, Op::Pop))
        );
    }

    #[test]
    fn test_debug_overlay_draws_static_wind_field() {
        let mut rng = StepRng::new(11, 0x9E37_79B9_7F4A_7C15);
        let sys = ParticleSystem::new(LeavesKind::default(), 2, viewport(), Box::new(FlatNoise(0.3)), &mut rng).unwrap();
        let mut plain = RecordingCanvas::default();
        sys.render(&mut plain, false);
        assert_eq!(plain.count(|op| matches!(op, Op::Line(..))), 0);

        let mut canvas = RecordingCanvas::default();
        sys.render(&mut canvas, true);
        // per leaf: bare shaft for the not yet computed wind, full arrow for the field
        assert_eq!(canvas.count(|op| matches!(op, Op::Line(..))), 2 * 4);

        let kind = sys.kind();
        for p in sys.particles() {
            let field = kind.wind_at(&FlatNoise(0.3), p.position.x, p.position.y);
            let tip = p.position + field * FIELD_ARROW;
            assert_eq!(canvas.count(|op| *op == Op::Line(p.position, tip)), 1);
        }
    }

    #[test]
    fn test_wind_at_is_unit() {
        let kind = LeavesKind::default();
        let wind = kind.wind_at(&FlatNoise(0.7), 100.0, 50.0);
        assert!((wind.magnitude() - 1.0).abs() < 1e-6);
    }
}
