//! Flocking particles shared by the fish and robot sketches.

use core::f32::consts::PI;

use heapless::Deque;
use rand::{Rng, RngCore};

use crate::behavior::{self, Propulsion};
use crate::error::SimError;
use crate::frame::{DrawContext, ForceContext, Viewport};
use crate::math;
use crate::particle::{Particle, ParticleKind};
use crate::render::{Canvas, Hsla, PathStyle};
use crate::vector::{Falloff, Vector2D};

/// Ripples remembered per fish.
pub const TRAIL_LEN: usize = 20;

/// Weights and shape parameters of the flocking forces.
///
/// A weight of 0 switches the matching force off.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoidTuning {
    pub separation_range: f32,
    pub separation_weight: f32,
    /// Share of last frame's separation push kept before adding this frame's.
    pub separation_carry: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub cohesion_falloff: Falloff,
    pub propulsion: Propulsion,
    pub propulsion_weight: f32,
    pub boundary_strength: f32,
    pub boundary_falloff: Falloff,
    pub boundary_weight: f32,
    pub wall_margin: f32,
    pub wall_falloff: Falloff,
    pub wall_weight: f32,
    pub pointer_falloff: Falloff,
    /// Negative values repel from the pointer.
    pub pointer_weight: f32,
    /// Per-frame velocity retention, 1.0 means no drag.
    pub drag: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub initial_speed: f32,
}

impl BoidTuning {
    /// Schooling fish: separation and propulsion only.
    pub fn fish() -> Self {
        Self::default()
    }

    /// Flocking robots: fish tuning plus alignment with the flock and a
    /// gentle pull toward the pointer.
    pub fn robots() -> Self {
        Self {
            alignment_weight: 0.6,
            pointer_falloff: Falloff::new(0.0, 0.5),
            pointer_weight: 400.0,
            ..Self::default()
        }
    }
}

impl Default for BoidTuning {
    fn default() -> Self {
        Self {
            separation_range: 100.0,
            separation_weight: 0.8,
            separation_carry: 1.0,
            alignment_weight: 0.0,
            cohesion_weight: 0.0,
            cohesion_falloff: Falloff::new(0.0, 1.2),
            propulsion: Propulsion::default(),
            propulsion_weight: 1.0,
            boundary_strength: 10.0,
            boundary_falloff: Falloff::new(140.0, 1.2),
            boundary_weight: 1.0,
            wall_margin: 20.0,
            wall_falloff: Falloff::new(0.0, 1.2),
            wall_weight: 1.0,
            pointer_falloff: Falloff::new(0.0, 1.2),
            pointer_weight: 0.0,
            drag: 0.97,
            min_speed: 10.0,
            max_speed: 300.0,
            initial_speed: 10.0,
        }
    }
}

/// Which sketch a flock is drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoidLook {
    Fish,
    Robot,
}

/// Where a fish was when it left a ripple, and when.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub location: Vector2D,
    pub birth_time: f32,
}

#[derive(Debug, Clone)]
pub struct BoidState {
    pub heading: f32,
    pub separation: Vector2D,
    pub alignment: Vector2D,
    pub cohesion: Vector2D,
    pub propulsion: Vector2D,
    pub attraction: Vector2D,
    pub boundary: Vector2D,
    pub trail: Deque<Ripple, TRAIL_LEN>,
}

impl BoidState {
    fn new(heading: f32) -> Self {
        Self {
            heading,
            separation: Vector2D::zero(),
            alignment: Vector2D::zero(),
            cohesion: Vector2D::zero(),
            propulsion: Vector2D::zero(),
            attraction: Vector2D::zero(),
            boundary: Vector2D::zero(),
            trail: Deque::new(),
        }
    }

    fn remember(&mut self, ripple: Ripple) {
        if self.trail.is_full() {
            self.trail.pop_front();
        }
        // cannot fail: a slot was freed above
        let _ = self.trail.push_back(ripple);
    }
}

/// Boids with separation, alignment, cohesion, propulsion and soft walls.
#[derive(Debug, Clone)]
pub struct BoidKind {
    pub tuning: BoidTuning,
    pub look: BoidLook,
}

impl BoidKind {
    pub fn fish() -> Self {
        Self {
            tuning: BoidTuning::fish(),
            look: BoidLook::Fish,
        }
    }

    pub fn robots() -> Self {
        Self {
            tuning: BoidTuning::robots(),
            look: BoidLook::Robot,
        }
    }

    pub fn with_tuning(mut self, tuning: BoidTuning) -> Self {
        self.tuning = tuning;
        self
    }
}

impl ParticleKind for BoidKind {
    type State = BoidState;

    fn label(&self) -> &'static str {
        match self.look {
            BoidLook::Fish => "🐟",
            BoidLook::Robot => "🤖",
        }
    }

    fn default_population(&self) -> usize {
        match self.look {
            BoidLook::Fish => 10,
            BoidLook::Robot => 60,
        }
    }

    fn tracks_flock(&self) -> bool {
        true
    }

    fn spawn(&self, id: usize, viewport: &Viewport, rng: &mut dyn RngCore) -> Result<Particle<BoidState>, SimError> {
        let mut position = Vector2D::zero();
        position.set_to_random(0.0, viewport.width, 0.0, viewport.height, rng)?;
        let heading = rng.gen_range(0.0..100.0f32);
        let velocity = Vector2D::polar(self.tuning.initial_speed, heading);
        Ok(Particle::new(id, position, velocity, BoidState::new(heading)))
    }

    fn calculate_forces(&self, particle: &mut Particle<BoidState>, ctx: &ForceContext<'_>) -> Result<(), SimError> {
        let t = &self.tuning;
        let me = particle.body();
        let heading = particle.velocity.angle();

        let boundary = behavior::boundary(me.position, &ctx.viewport, t.boundary_strength, t.boundary_falloff);

        let push = behavior::separation(&me, ctx.neighbors, t.separation_range);
        let separation = (particle.state.separation * t.separation_carry + push) * t.separation_weight;

        let mut attraction = behavior::wall_attraction(me.position, &ctx.viewport, t.wall_margin, 1.0, t.wall_falloff)
            * t.wall_weight;
        if let Some(pointer) = ctx.pointer {
            attraction += behavior::point_attraction(me.position, pointer, 1.0, t.pointer_falloff) * t.pointer_weight;
        }

        let (alignment, cohesion) = match &ctx.flock {
            Some(flock) => (
                behavior::alignment(me.velocity, flock),
                behavior::cohesion(me.position, flock, 1.0, t.cohesion_falloff),
            ),
            None => (Vector2D::zero(), Vector2D::zero()),
        };

        let propulsion = behavior::propulsion(me.id, heading, ctx.time, ctx.noise, t.propulsion) * t.propulsion_weight;

        let state = &mut particle.state;
        state.heading = heading;
        state.boundary = boundary * t.boundary_weight;
        state.separation = separation;
        state.alignment = alignment * t.alignment_weight;
        state.cohesion = cohesion * t.cohesion_weight;
        state.propulsion = propulsion;
        state.attraction = attraction;

        let total = state.boundary + state.separation + state.alignment + state.cohesion + state.propulsion + state.attraction;
        particle.apply_force(total);
        particle.apply_drag(t.drag, ctx.dt);
        Ok(())
    }

    fn move_particle(&self, particle: &mut Particle<BoidState>, ctx: &ForceContext<'_>) {
        particle.integrate(ctx.dt);
        particle
            .velocity
            .constrain_magnitude(self.tuning.min_speed, self.tuning.max_speed);

        if self.look == BoidLook::Fish && (math::ceil(ctx.time) as i64) % 5 == 0 {
            let ripple = Ripple {
                location: particle.position,
                birth_time: ctx.time,
            };
            particle.state.remember(ripple);
        }
    }

    fn draw_background(&self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) {
        match self.look {
            BoidLook::Fish => draw_water(canvas, ctx),
            BoidLook::Robot => canvas.background(Hsla::BLACK),
        }
    }

    fn draw_particle(&self, particle: &Particle<BoidState>, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>, debug: bool) {
        match self.look {
            BoidLook::Fish => draw_fish(particle, canvas, ctx),
            BoidLook::Robot => draw_robot(particle, canvas, ctx),
        }
        if debug {
            draw_forces(particle, canvas);
        }
    }
}

const FISH_RADIUS: f32 = 10.0;
const WATER_TILES: usize = 90;

/// Noise-shaded tiles.
fn draw_water(canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) {
    let tile = ctx.viewport.width / WATER_TILES as f32;
    let scale = 0.01;
    canvas.stroke(None, 0.0);
    for i in 0..WATER_TILES {
        for j in 0..WATER_TILES {
            let x = tile * i as f32;
            let y = tile * j as f32;
            let depth = 500.0 * ctx.noise.noise3(x * scale, y * scale, ctx.time / 3.0);
            canvas.fill(Some(Hsla::opaque(197.0, 100.0, depth / 6.0 + 25.0)));
            canvas.rect(Vector2D::new(x, y), tile * 0.9, tile * 0.9);
        }
    }
}

fn draw_fish(particle: &Particle<BoidState>, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) {
    let t = ctx.time;
    let r = FISH_RADIUS;

    // fades in and out over a five second cycle
    let phase = math::rem_euclid(t, 5.0) * 0.2;
    let opacity = (math::sin(phase * PI) * 2.0).clamp(0.0, 1.0);

    canvas.stroke(Some(Hsla::new(0.0, 0.0, 0.0, 0.1)), 3.0);
    canvas.fill(Some(Hsla::new(160.0, 75.0, 80.0, opacity)));
    canvas.push();
    canvas.translate(particle.position);
    canvas.rotate(-particle.state.heading);
    let outline = [
        Vector2D::new(r, 0.0),
        Vector2D::new(-r, -r),
        Vector2D::new(-r * 2.0, 0.0),
        Vector2D::new(-r, r),
    ];
    canvas.polygon(&outline, PathStyle::Smooth);
    canvas.fill(Some(Hsla::BLACK));
    canvas.circle(Vector2D::new(-r, -r), 2.0);
    canvas.circle(Vector2D::new(-r, r), 2.0);
    canvas.pop();

    canvas.fill(None);
    canvas.stroke(Some(Hsla::new(0.0, 0.0, 100.0, 0.25)), 1.0);
    for ripple in particle.state.trail.iter() {
        canvas.circle(ripple.location, (t - ripple.birth_time) * 25.0);
    }
}

fn draw_robot(particle: &Particle<BoidState>, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) {
    let jitter = Vector2D::new(ctx.noise.noise1(1.0), 2.0 * ctx.noise.noise2(particle.id as f32, ctx.time * 10.0));
    canvas.stroke(None, 0.0);
    canvas.fill(Some(Hsla::gray(100.0)));
    canvas.push();
    canvas.translate(particle.position);
    canvas.rotate(particle.state.heading);
    canvas.text("🤖", jitter);
    canvas.pop();
}

fn draw_forces(particle: &Particle<BoidState>, canvas: &mut dyn Canvas) {
    let s = &particle.state;
    let pos = particle.position;
    canvas.arrow(pos, s.separation, 0.2, Hsla::opaque(30.0, 100.0, 50.0));
    canvas.arrow(pos, s.cohesion, 0.2, Hsla::opaque(60.0, 100.0, 50.0));
    canvas.arrow(pos, s.alignment, 0.2, Hsla::opaque(160.0, 100.0, 50.0));
    canvas.arrow(pos, s.attraction, 0.2, Hsla::opaque(220.0, 100.0, 50.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FlockStats, FrameInput};
    use crate::noise::FlatNoise;
    use crate::particle::Body;
    use crate::render::recording::{Op, RecordingCanvas};
    use crate::system::ParticleSystem;
    use alloc::boxed::Box;
    use alloc::vec::Vec;
    use rand::rngs::mock::StepRng;

    fn viewport() -> Viewport {
        Viewport {
            width: 800.0,
            height: 600.0,
        }
    }

    fn ctx<'a>(neighbors: &'a [Body], flock: Option<FlockStats>, noise: &'a FlatNoise) -> ForceContext<'a> {
        ForceContext {
            dt: 1.0 / 60.0,
            time: 1.0,
            viewport: viewport(),
            pointer: None,
            noise,
            flock,
            neighbors,
        }
    }

    #[test]
    fn test_spawn_inside_viewport() {
        let kind = BoidKind::fish();
        let mut rng = StepRng::new(3, 0x9E37_79B9_7F4A_7C15);
        for id in 0..20 {
            let p = kind.spawn(id, &viewport(), &mut rng).unwrap();
            assert!(p.position.x >= 0.0 && p.position.x < 800.0);
            assert!(p.position.y >= 0.0 && p.position.y < 600.0);
            assert!((p.velocity.magnitude() - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_zero_weights_switch_forces_off() {
        let tuning = BoidTuning {
            propulsion_weight: 0.0,
            boundary_weight: 0.0,
            wall_weight: 0.0,
            separation_weight: 0.0,
            alignment_weight: 0.0,
            drag: 1.0,
            ..BoidTuning::default()
        };
        let kind = BoidKind::robots().with_tuning(tuning);
        let mut p = Particle::new(0, Vector2D::new(400.0, 300.0), Vector2D::new(10.0, 0.0), BoidState::new(0.0));
        let bodies = [p.body(), Body::new(1, Vector2D::new(420.0, 300.0), Vector2D::zero())];
        let flock = FlockStats::measure(&bodies).unwrap();
        let noise = FlatNoise(0.5);

        kind.calculate_forces(&mut p, &ctx(&bodies, Some(flock), &noise)).unwrap();
        assert_eq!(p.force, Vector2D::zero());
        assert_eq!(p.state.alignment, Vector2D::zero());
        assert!(p.state.propulsion == Vector2D::zero());
    }

    #[test]
    fn test_robots_align_with_flock() {
        let tuning = BoidTuning {
            propulsion_weight: 0.0,
            boundary_weight: 0.0,
            wall_weight: 0.0,
            separation_weight: 0.0,
            drag: 1.0,
            ..BoidTuning::robots()
        };
        let kind = BoidKind::robots().with_tuning(tuning);
        let mut p = Particle::new(0, Vector2D::new(400.0, 300.0), Vector2D::zero(), BoidState::new(0.0));
        let flock = FlockStats {
            center: Vector2D::new(400.0, 300.0),
            velocity: Vector2D::new(10.0, 0.0),
        };
        let noise = FlatNoise(0.5);
        let bodies = [p.body()];

        kind.calculate_forces(&mut p, &ctx(&bodies, Some(flock), &noise)).unwrap();
        assert!((p.force.x - 6.0).abs() < 1e-5);
        assert_eq!(p.force.y, 0.0);
    }

    #[test]
    fn test_cohesion_weight_pulls_toward_flock_center() {
        let tuning = BoidTuning {
            propulsion_weight: 0.0,
            boundary_weight: 0.0,
            wall_weight: 0.0,
            separation_weight: 0.0,
            cohesion_weight: 1000.0,
            drag: 1.0,
            ..BoidTuning::fish()
        };
        let kind = BoidKind::fish().with_tuning(tuning);
        let mut p = Particle::new(0, Vector2D::new(400.0, 300.0), Vector2D::zero(), BoidState::new(0.0));
        let flock = FlockStats {
            center: Vector2D::new(400.0, 100.0),
            velocity: Vector2D::zero(),
        };
        let noise = FlatNoise(0.5);
        let bodies = [p.body()];

        kind.calculate_forces(&mut p, &ctx(&bodies, Some(flock), &noise)).unwrap();
        assert!(p.force.y < 0.0);
        assert!(p.force.x.abs() < 1e-5);
        assert_eq!(p.force, p.state.cohesion);
    }

    #[test]
    fn test_pointer_attraction() {
        let tuning = BoidTuning {
            propulsion_weight: 0.0,
            boundary_weight: 0.0,
            wall_weight: 0.0,
            pointer_weight: 50.0,
            drag: 1.0,
            ..BoidTuning::default()
        };
        let kind = BoidKind::fish().with_tuning(tuning);
        let mut p = Particle::new(0, Vector2D::new(400.0, 300.0), Vector2D::zero(), BoidState::new(0.0));
        let noise = FlatNoise(0.5);
        let bodies = [p.body()];
        let mut context = ctx(&bodies, None, &noise);
        context.pointer = Some(Vector2D::new(400.0, 100.0));

        kind.calculate_forces(&mut p, &context).unwrap();
        assert!(p.force.y < 0.0);
        assert!(p.force.x.abs() < 1e-5);
    }

    #[test]
    fn test_robots_follow_pointer_by_default() {
        let kind = BoidKind::robots();
        let noise = FlatNoise(0.5);
        let start = Particle::new(0, Vector2D::new(400.0, 300.0), Vector2D::zero(), BoidState::new(0.0));
        let bodies = [start.body()];

        let mut idle = start.clone();
        kind.calculate_forces(&mut idle, &ctx(&bodies, None, &noise)).unwrap();

        let mut chasing = start.clone();
        let mut context = ctx(&bodies, None, &noise);
        context.pointer = Some(Vector2D::new(400.0, 200.0));
        kind.calculate_forces(&mut chasing, &context).unwrap();

        let pull = chasing.force - idle.force;
        assert!((pull.y + 40.0).abs() < 1e-3);
        assert!(pull.x.abs() < 1e-3);
        assert_eq!(BoidTuning::fish().pointer_weight, 0.0);
    }

    #[test]
    fn test_speed_is_constrained_after_move() {
        let kind = BoidKind::fish();
        let mut p = Particle::new(0, Vector2D::new(400.0, 300.0), Vector2D::new(1000.0, 0.0), BoidState::new(0.0));
        let noise = FlatNoise(0.5);
        let bodies = [p.body()];
        kind.move_particle(&mut p, &ctx(&bodies, None, &noise));
        assert!((p.velocity.magnitude() - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut state = BoidState::new(0.0);
        for i in 0..50 {
            state.remember(Ripple {
                location: Vector2D::zero(),
                birth_time: i as f32,
            });
        }
        assert_eq!(state.trail.len(), TRAIL_LEN);
        assert_eq!(state.trail.front().map(|r| r.birth_time), Some(30.0));
    }

    #[test]
    fn test_fish_render_without_debug_draws_no_arrows() {
        let mut rng = StepRng::new(3, 0x9E37_79B9_7F4A_7C15);
        let mut sys = ParticleSystem::new(BoidKind::fish(), 3, viewport(), Box::new(FlatNoise(0.4)), &mut rng).unwrap();
        sys.update(&FrameInput::new(1.0 / 60.0, 5.0)).unwrap();
        let before: Vec<Body> = sys.bodies();

        let mut canvas = RecordingCanvas::default();
        sys.render(&mut canvas, false);
        assert_eq!(canvas.count(|op| matches!(op, Op::Rect(_))), WATER_TILES * WATER_TILES);
        assert_eq!(canvas.count(|op| matches!(op, Op::Polygon(4, PathStyle::Smooth))), 3);
        assert_eq!(canvas.count(|op| matches!(op, Op::Line(..))), 0);

        let mut debug_canvas = RecordingCanvas::default();
        sys.render(&mut debug_canvas, true);
        assert!(debug_canvas.count(|op| matches!(op, Op::Line(..))) >= 3 * 4);
        assert_eq!(sys.bodies(), before);
    }

    #[test]
    fn test_robot_render_uses_glyph() {
        let mut rng = StepRng::new(3, 0x9E37_79B9_7F4A_7C15);
        let sys = ParticleSystem::new(BoidKind::robots(), 4, viewport(), Box::new(FlatNoise(0.4)), &mut rng).unwrap();
        let mut canvas = RecordingCanvas::default();
        sys.render(&mut canvas, false);
        assert_eq!(canvas.ops[0], Op::Background(Hsla::BLACK));
        assert_eq!(canvas.count(|op| matches!(op, Op::Text(t) if t == "🤖")), 4);
    }
}
