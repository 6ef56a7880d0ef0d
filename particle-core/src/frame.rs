//! Per-frame inputs and the read-only views handed to particle kinds.

use crate::error::{ConfigError, SimError};
use crate::noise::NoiseSource;
use crate::particle::Body;
use crate::vector::Vector2D;

/// Timing supplied by the host for one animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Seconds since the simulation started. Monotonically increasing.
    pub time: f32,
}

impl FrameInput {
    pub fn new(dt: f32, time: f32) -> Self {
        Self { dt, time }
    }

    /// Input for frame `index` (0-based) of a fixed-step run.
    pub fn fixed(index: u64, dt: f32) -> Self {
        Self {
            dt,
            time: (index + 1) as f32 * dt,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !self.dt.is_finite() || self.dt < 0.0 || !self.time.is_finite() {
            return Err(ConfigError::InvalidTimeStep.into());
        }
        Ok(())
    }
}

/// Visible domain, `[0, width) x [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Result<Self, SimError> {
        let viewport = Self { width, height };
        viewport.validate()?;
        Ok(viewport)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let ok = self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidViewport {
                width: self.width,
                height: self.height,
            }
            .into())
        }
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Flock-wide means, valid only within the frame that measured them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlockStats {
    pub center: Vector2D,
    pub velocity: Vector2D,
}

impl FlockStats {
    /// Arithmetic mean of positions and velocities. Fails on an empty slice.
    pub fn measure(bodies: &[Body]) -> Result<Self, SimError> {
        let mut center = Vector2D::zero();
        let mut velocity = Vector2D::zero();
        for body in bodies {
            center.add_vec(body.position);
            velocity.add_vec(body.velocity);
        }
        let count = bodies.len() as f32;
        Ok(Self {
            center: center.checked_div(count)?,
            velocity: velocity.checked_div(count)?,
        })
    }
}

/// Everything force calculation may read. Nothing in here is mutable.
pub struct ForceContext<'a> {
    pub dt: f32,
    pub time: f32,
    pub viewport: Viewport,
    pub pointer: Option<Vector2D>,
    pub noise: &'a dyn NoiseSource,
    /// `None` unless the kind asked for flock tracking.
    pub flock: Option<FlockStats>,
    /// State of the whole population, including the particle being updated.
    pub neighbors: &'a [Body],
}

/// Everything a render step may read.
pub struct DrawContext<'a> {
    pub time: f32,
    pub viewport: Viewport,
    pub noise: &'a dyn NoiseSource,
}
