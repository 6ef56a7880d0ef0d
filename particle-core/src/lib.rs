//! Particle simulation engine behind the leaves, fish and robots sketches.
//!
//! A [`ParticleSystem`] owns a fixed population of one [`ParticleKind`]. Every
//! frame it measures flock-wide means, asks each particle's kind for forces,
//! integrates with semi-implicit Euler and applies the kind's boundary policy.
//! Rendering goes through the [`Canvas`] trait and never feeds back into the
//! physics.
//!
//! ```
//! use particle_core::{FlatNoise, FrameInput, ParticleSystem, Viewport};
//! use particle_core::sketches::BoidKind;
//! use rand::rngs::mock::StepRng;
//!
//! let mut rng = StepRng::new(1, 0x9E37_79B9_7F4A_7C15);
//! let mut flock = ParticleSystem::new(
//!     BoidKind::robots(),
//!     12,
//!     Viewport::default(),
//!     Box::new(FlatNoise(0.5)),
//!     &mut rng,
//! )
//! .unwrap();
//!
//! flock.update(&FrameInput::new(1.0 / 60.0, 1.0 / 60.0)).unwrap();
//! assert_eq!(flock.frame_count(), 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod behavior;
pub mod error;
pub mod frame;
mod math;
pub mod noise;
pub mod particle;
pub mod render;
pub mod sketches;
pub mod system;
pub mod vector;

pub use error::{ConfigError, SimError};
pub use frame::{DrawContext, FlockStats, ForceContext, FrameInput, Viewport};
pub use noise::{FlatNoise, NoiseSource};
#[cfg(feature = "std")]
pub use noise::PerlinNoise;
pub use particle::{Body, Particle, ParticleKind};
pub use render::{Canvas, Hsla, PathStyle};
pub use sketches::{SketchKind, SketchOptions};
pub use system::{ParticleSystem, Simulation, UpdateMode};
pub use vector::{Falloff, Vector2D};
