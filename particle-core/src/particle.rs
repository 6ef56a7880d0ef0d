//! Simulated entities and the per-kind behavior contract.

use rand::RngCore;

use crate::error::SimError;
use crate::frame::{DrawContext, ForceContext, Viewport};
use crate::render::Canvas;
use crate::vector::Vector2D;

/// Kinematic state of a particle as seen by its neighbors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    pub id: usize,
    pub position: Vector2D,
    pub velocity: Vector2D,
}

impl Body {
    pub fn new(id: usize, position: Vector2D, velocity: Vector2D) -> Self {
        Self {
            id,
            position,
            velocity,
        }
    }
}

/// A single particle owned by a [`crate::ParticleSystem`].
///
/// `force` accumulates during force calculation and is cleared by
/// [`Particle::integrate`], so it never carries over between frames.
#[derive(Debug, Clone)]
pub struct Particle<S> {
    /// Sequential within the owning system, starting at 0.
    pub id: usize,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub force: Vector2D,
    pub state: S,
}

impl<S> Particle<S> {
    pub fn new(id: usize, position: Vector2D, velocity: Vector2D, state: S) -> Self {
        Self {
            id,
            position,
            velocity,
            force: Vector2D::zero(),
            state,
        }
    }

    pub fn body(&self) -> Body {
        Body::new(self.id, self.position, self.velocity)
    }

    pub fn apply_force(&mut self, force: Vector2D) {
        self.force += force;
    }

    /// Velocity damping expressed as a force: with semi-implicit Euler the
    /// next velocity is exactly `velocity * factor`.
    pub fn apply_drag(&mut self, factor: f32, dt: f32) {
        if dt > 0.0 {
            let drag = -self.velocity * ((1.0 - factor) / dt);
            self.apply_force(drag);
        }
    }

    /// Semi-implicit Euler with unit mass, then clears the accumulator.
    pub fn integrate(&mut self, dt: f32) {
        self.velocity.add_multiple(self.force, dt);
        self.position.add_multiple(self.velocity, dt);
        self.force = Vector2D::zero();
    }

    /// Other members of `bodies`, skipping this particle by identity.
    pub fn others<'a>(&self, bodies: &'a [Body]) -> impl Iterator<Item = &'a Body> + 'a {
        let id = self.id;
        bodies.iter().filter(move |body| body.id != id)
    }
}

/// Strategy implemented by every kind of particle.
///
/// A frame runs `calculate_forces` then `move_particle` for each particle,
/// and `draw_background` followed by `draw_particle` when rendering.
pub trait ParticleKind {
    /// Kind-specific per-particle state.
    type State: Clone;

    /// Human-readable label for sketch pickers.
    fn label(&self) -> &'static str;

    /// Population used when the host does not ask for a specific count.
    fn default_population(&self) -> usize;

    /// Whether `ForceContext::flock` should be measured every frame.
    fn tracks_flock(&self) -> bool {
        false
    }

    fn spawn(
        &self,
        id: usize,
        viewport: &Viewport,
        rng: &mut dyn RngCore,
    ) -> Result<Particle<Self::State>, SimError>;

    /// Add this frame's forces to `particle.force`. Never overwrites the
    /// accumulator and never writes position or velocity.
    fn calculate_forces(
        &self,
        particle: &mut Particle<Self::State>,
        ctx: &ForceContext<'_>,
    ) -> Result<(), SimError>;

    /// Integration followed by any boundary policy.
    fn move_particle(&self, particle: &mut Particle<Self::State>, ctx: &ForceContext<'_>) {
        particle.integrate(ctx.dt);
    }

    fn draw_background(&self, _canvas: &mut dyn Canvas, _ctx: &DrawContext<'_>) {}

    fn draw_particle(
        &self,
        particle: &Particle<Self::State>,
        canvas: &mut dyn Canvas,
        ctx: &DrawContext<'_>,
        debug: bool,
    );
}
