//! Fixed-size particle populations and the per-frame simulation loop.

use alloc::boxed::Box;
use alloc::vec::Vec;

use rand::RngCore;

use crate::error::{ConfigError, SimError};
use crate::frame::{DrawContext, FlockStats, ForceContext, FrameInput, Viewport};
use crate::noise::NoiseSource;
use crate::particle::{Body, Particle, ParticleKind};
use crate::render::Canvas;
use crate::vector::Vector2D;

/// How force calculation and integration interleave within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UpdateMode {
    /// Every particle's forces come from the start-of-frame state; nothing
    /// moves until all forces are known. Independent of population order.
    #[default]
    Snapshot,
    /// Each particle computes forces then moves before the next one runs, so
    /// later particles see earlier particles' new positions.
    Interleaved,
}

/// Owns one population of a single [`ParticleKind`] and steps it.
pub struct ParticleSystem<K: ParticleKind> {
    kind: K,
    particles: Vec<Particle<K::State>>,
    noise: Box<dyn NoiseSource>,
    viewport: Viewport,
    pointer: Option<Vector2D>,
    mode: UpdateMode,
    flock: Option<FlockStats>,
    elapsed: f32,
    frames: u64,
}

impl<K: ParticleKind> ParticleSystem<K> {
    /// Eagerly spawns `population` particles with ids `0..population`.
    pub fn new(
        kind: K,
        population: usize,
        viewport: Viewport,
        noise: Box<dyn NoiseSource>,
        rng: &mut dyn RngCore,
    ) -> Result<Self, SimError> {
        if population == 0 {
            return Err(ConfigError::EmptyPopulation.into());
        }
        viewport.validate()?;

        let particles = (0..population)
            .map(|id| kind.spawn(id, &viewport, rng))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "created {} system with {} particles in {}x{}",
            kind.label(),
            population,
            viewport.width,
            viewport.height
        );

        Ok(Self {
            kind,
            particles,
            noise,
            viewport,
            pointer: None,
            mode: UpdateMode::default(),
            flock: None,
            elapsed: 0.0,
            frames: 0,
        })
    }

    /// Seeded placement and seeded Perlin noise, for reproducible runs.
    #[cfg(feature = "std")]
    pub fn seeded(kind: K, population: usize, viewport: Viewport, seed: u64, noise_seed: u32) -> Result<Self, SimError> {
        use rand::SeedableRng;

        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let noise = Box::new(crate::noise::PerlinNoise::new(noise_seed));
        Self::new(kind, population, viewport, noise, &mut rng)
    }

    pub fn with_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn set_mode(&mut self, mode: UpdateMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> UpdateMode {
        self.mode
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut K {
        &mut self.kind
    }

    pub fn particles(&self) -> &[Particle<K::State>] {
        &self.particles
    }

    /// Population size, fixed at construction.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Always false; an empty system cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Flock means measured at the start of the last frame, if tracked.
    pub fn flock(&self) -> Option<FlockStats> {
        self.flock
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn set_pointer(&mut self, pointer: Option<Vector2D>) {
        self.pointer = pointer;
    }

    pub fn pointer(&self) -> Option<Vector2D> {
        self.pointer
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), SimError> {
        let viewport = Viewport::new(width, height)?;
        log::debug!("resized to {}x{}", width, height);
        self.viewport = viewport;
        Ok(())
    }

    pub fn bodies(&self) -> Vec<Body> {
        self.particles.iter().map(Particle::body).collect()
    }

    /// Recomputes flock aggregates from the previous frame's final state.
    pub fn before_move(&mut self) -> Result<(), SimError> {
        self.flock = if self.kind.tracks_flock() {
            Some(FlockStats::measure(&self.bodies())?)
        } else {
            None
        };
        Ok(())
    }

    /// Advance one frame.
    ///
    /// The frame runs on a working copy of the population, which replaces
    /// the live one only when every particle succeeded.
    pub fn update(&mut self, frame: &FrameInput) -> Result<(), SimError> {
        frame.validate()?;
        self.before_move()?;

        let mut bodies = self.bodies();
        let mut next = self.particles.clone();

        match self.mode {
            UpdateMode::Snapshot => {
                let ctx = self.force_context(frame, &bodies);
                for particle in next.iter_mut() {
                    particle.force = Vector2D::zero();
                    self.kind.calculate_forces(particle, &ctx)?;
                }
                for particle in next.iter_mut() {
                    self.kind.move_particle(particle, &ctx);
                }
            }
            UpdateMode::Interleaved => {
                for (i, particle) in next.iter_mut().enumerate() {
                    let ctx = self.force_context(frame, &bodies);
                    particle.force = Vector2D::zero();
                    self.kind.calculate_forces(particle, &ctx)?;
                    self.kind.move_particle(particle, &ctx);
                    bodies[i] = particle.body();
                }
            }
        }

        self.particles = next;
        self.elapsed = frame.time;
        self.frames += 1;
        log::trace!("frame {} at t={:.3}s", self.frames, frame.time);
        Ok(())
    }

    fn force_context<'a>(&'a self, frame: &FrameInput, bodies: &'a [Body]) -> ForceContext<'a> {
        ForceContext {
            dt: frame.dt,
            time: frame.time,
            viewport: self.viewport,
            pointer: self.pointer,
            noise: self.noise.as_ref(),
            flock: self.flock,
            neighbors: bodies,
        }
    }

    /// Background first, then every particle in population order.
    pub fn render(&self, canvas: &mut dyn Canvas, debug: bool) {
        let ctx = DrawContext {
            time: self.elapsed,
            viewport: self.viewport,
            noise: self.noise.as_ref(),
        };
        self.kind.draw_background(canvas, &ctx);
        for particle in &self.particles {
            self.kind.draw_particle(particle, canvas, &ctx, debug);
        }
    }
}

/// Object-safe view of a running system, for hosts that pick a sketch at
/// runtime.
pub trait Simulation {
    fn label(&self) -> &'static str;
    fn population(&self) -> usize;
    fn update(&mut self, frame: &FrameInput) -> Result<(), SimError>;
    fn render(&self, canvas: &mut dyn Canvas, debug: bool);
    fn bodies(&self) -> Vec<Body>;
    fn flock(&self) -> Option<FlockStats>;
    fn elapsed(&self) -> f32;
    fn frame_count(&self) -> u64;
    fn set_pointer(&mut self, pointer: Option<Vector2D>);
    fn pointer(&self) -> Option<Vector2D>;
    fn resize(&mut self, width: f32, height: f32) -> Result<(), SimError>;
    fn viewport(&self) -> Viewport;
}

impl<K: ParticleKind> Simulation for ParticleSystem<K> {
    fn label(&self) -> &'static str {
        self.kind.label()
    }

    fn population(&self) -> usize {
        self.len()
    }

    fn update(&mut self, frame: &FrameInput) -> Result<(), SimError> {
        ParticleSystem::update(self, frame)
    }

    fn render(&self, canvas: &mut dyn Canvas, debug: bool) {
        ParticleSystem::render(self, canvas, debug)
    }

    fn bodies(&self) -> Vec<Body> {
        ParticleSystem::bodies(self)
    }

    fn flock(&self) -> Option<FlockStats> {
        self.flock
    }

    fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn frame_count(&self) -> u64 {
        self.frames
    }

    fn set_pointer(&mut self, pointer: Option<Vector2D>) {
        ParticleSystem::set_pointer(self, pointer)
    }

    fn pointer(&self) -> Option<Vector2D> {
        self.pointer
    }

    fn resize(&mut self, width: f32, height: f32) -> Result<(), SimError> {
        ParticleSystem::resize(self, width, height)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
