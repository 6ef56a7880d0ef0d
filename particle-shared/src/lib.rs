#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;

use particle_core::sketches::{BoidTuning, SketchKind, SketchOptions};
use particle_core::{Body, ConfigError, FlockStats, SimError, Simulation, UpdateMode, Viewport};
use serde::{Deserialize, Serialize};

/// Everything a host needs to start a sketch. Missing JSON fields take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub sketch: SketchKind,
    /// Overrides the sketch's own population.
    pub population: Option<usize>,
    pub viewport: Viewport,
    /// Fixed frame step in seconds.
    pub dt: f32,
    /// Seed for particle placement.
    pub seed: u64,
    /// Seed for the noise field.
    pub noise_seed: u32,
    pub mode: UpdateMode,
    /// Flocking tuning for the fish and robot sketches.
    pub tuning: Option<BoidTuning>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            sketch: SketchKind::default(),
            population: None,
            viewport: Viewport::default(),
            dt: 1.0 / 60.0,
            seed: 0,
            noise_seed: 0,
            mode: UpdateMode::default(),
            tuning: None,
        }
    }
}

impl SimulationSettings {
    pub fn new(sketch: SketchKind) -> Self {
        Self {
            sketch,
            ..Self::default()
        }
    }

    /// Reject settings the engine would refuse anyway, before building.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.population == Some(0) {
            return Err(ConfigError::EmptyPopulation.into());
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidTimeStep.into());
        }
        self.viewport.validate()
    }

    pub fn population(&self) -> usize {
        self.population
            .unwrap_or_else(|| self.sketch.default_population())
    }

    pub fn options(&self) -> SketchOptions {
        SketchOptions {
            kind: self.sketch,
            population: self.population,
            viewport: self.viewport,
            mode: self.mode,
            tuning: self.tuning,
        }
    }

    /// Seeded, reproducible simulation for these settings.
    #[cfg(feature = "std")]
    pub fn build(&self) -> Result<alloc::boxed::Box<dyn Simulation>, SimError> {
        self.validate()?;
        particle_core::sketches::build_seeded(&self.options(), self.seed, self.noise_seed)
    }

    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[cfg(feature = "std")]
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// State of a whole population at the end of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub sketch: SketchKind,
    pub frame: u64,
    pub time: f32,
    pub population: usize,
    /// Flock means measured at the start of the reported frame.
    pub flock: Option<FlockStats>,
    pub particles: Vec<Body>,
}

impl FrameReport {
    pub fn capture(sketch: SketchKind, simulation: &dyn Simulation) -> Self {
        Self {
            sketch,
            frame: simulation.frame_count(),
            time: simulation.elapsed(),
            population: simulation.population(),
            flock: simulation.flock(),
            particles: simulation.bodies(),
        }
    }

    /// Mean speed over the population.
    pub fn mean_speed(&self) -> f32 {
        if self.particles.is_empty() {
            return 0.0;
        }
        let total: f32 = self.particles.iter().map(|b| b.velocity.magnitude()).sum();
        total / self.particles.len() as f32
    }
}

/// Short status a host can show next to the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationStatus {
    pub label: alloc::string::String,
    pub population: usize,
    pub frame: u64,
    pub fps: u32,
    pub pointer_active: bool,
}
