//! The particle kinds behind each sketch, and runtime selection between them.

pub mod boids;
pub mod leaves;

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use rand::RngCore;

use crate::error::SimError;
use crate::frame::Viewport;
use crate::noise::NoiseSource;
use crate::particle::ParticleKind;
use crate::system::{ParticleSystem, Simulation, UpdateMode};

pub use boids::{BoidKind, BoidLook, BoidState, BoidTuning, Ripple};
pub use leaves::{LeafState, LeavesKind};

/// Sketches a host can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SketchKind {
    /// Wind-blown leaves.
    Leaves,
    /// Schooling fish.
    Fish,
    /// Flocking robots.
    #[default]
    Robots,
}

impl SketchKind {
    pub const ALL: [SketchKind; 3] = [SketchKind::Leaves, SketchKind::Fish, SketchKind::Robots];

    pub fn label(&self) -> &'static str {
        match self {
            SketchKind::Leaves => LeavesKind::default().label(),
            SketchKind::Fish => BoidKind::fish().label(),
            SketchKind::Robots => BoidKind::robots().label(),
        }
    }

    pub fn default_population(&self) -> usize {
        match self {
            SketchKind::Leaves => LeavesKind::default().default_population(),
            SketchKind::Fish => BoidKind::fish().default_population(),
            SketchKind::Robots => BoidKind::robots().default_population(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SketchKind::Leaves => "leaves",
            SketchKind::Fish => "fish",
            SketchKind::Robots => "robots",
        }
    }
}

impl fmt::Display for SketchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SketchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SketchKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s) || kind.label() == s)
            .ok_or_else(|| alloc::format!("unknown sketch '{}', expected leaves, fish or robots", s))
    }
}

/// Everything needed to start a sketch besides its randomness sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchOptions {
    pub kind: SketchKind,
    /// Falls back to the sketch's own population when `None`.
    pub population: Option<usize>,
    pub viewport: Viewport,
    pub mode: UpdateMode,
    /// Replaces the flocking tuning of the fish and robot sketches.
    pub tuning: Option<BoidTuning>,
}

impl SketchOptions {
    pub fn new(kind: SketchKind, viewport: Viewport) -> Self {
        Self {
            kind,
            population: None,
            viewport,
            mode: UpdateMode::default(),
            tuning: None,
        }
    }
}

/// Build the chosen sketch behind the object-safe [`Simulation`] interface.
pub fn build(
    options: &SketchOptions,
    noise: Box<dyn NoiseSource>,
    rng: &mut dyn RngCore,
) -> Result<Box<dyn Simulation>, SimError> {
    let population = options
        .population
        .unwrap_or_else(|| options.kind.default_population());

    let simulation: Box<dyn Simulation> = match options.kind {
        SketchKind::Leaves => Box::new(
            ParticleSystem::new(LeavesKind::default(), population, options.viewport, noise, rng)?
                .with_mode(options.mode),
        ),
        SketchKind::Fish => {
            let kind = BoidKind::fish();
            let kind = match options.tuning {
                Some(tuning) => kind.with_tuning(tuning),
                None => kind,
            };
            Box::new(ParticleSystem::new(kind, population, options.viewport, noise, rng)?.with_mode(options.mode))
        }
        SketchKind::Robots => {
            let kind = BoidKind::robots();
            let kind = match options.tuning {
                Some(tuning) => kind.with_tuning(tuning),
                None => kind,
            };
            Box::new(ParticleSystem::new(kind, population, options.viewport, noise, rng)?.with_mode(options.mode))
        }
    };
    Ok(simulation)
}

/// [`build`] with a seeded generator and seeded Perlin noise.
#[cfg(feature = "std")]
pub fn build_seeded(options: &SketchOptions, seed: u64, noise_seed: u32) -> Result<Box<dyn Simulation>, SimError> {
    use rand::SeedableRng;

    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    build(options, Box::new(crate::noise::PerlinNoise::new(noise_seed)), &mut rng)
}
