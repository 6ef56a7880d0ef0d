//! Error types for the simulation core.

use core::fmt;

/// Ways a configuration handed to the engine can be malformed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A particle system needs at least one particle.
    EmptyPopulation,
    /// A range `[lo, hi)` with `hi <= lo`.
    InvalidRange { lo: f32, hi: f32 },
    /// Viewport dimensions must be positive and finite.
    InvalidViewport { width: f32, height: f32 },
    /// Frame time step must be finite and non-negative.
    InvalidTimeStep,
}

/// Errors raised by vector math and the particle system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimError {
    /// A vector was divided by zero, or an aggregate was taken over nothing.
    DivisionByZero,
    /// Rejected at construction time, never deferred to the first frame.
    InvalidConfiguration(ConfigError),
}

impl SimError {
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, SimError::InvalidConfiguration(_))
    }
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        SimError::InvalidConfiguration(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyPopulation => write!(f, "population must contain at least one particle"),
            ConfigError::InvalidRange { lo, hi } => {
                write!(f, "range [{}, {}) is empty", lo, hi)
            }
            ConfigError::InvalidViewport { width, height } => {
                write!(f, "viewport {}x{} must be positive", width, height)
            }
            ConfigError::InvalidTimeStep => write!(f, "time step must be finite and non-negative"),
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::DivisionByZero => write!(f, "division by zero"),
            SimError::InvalidConfiguration(err) => write!(f, "invalid configuration: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SimError {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
