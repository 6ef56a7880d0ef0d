//! 2D vector used for positions, velocities and forces.
//!
//! `Vector2D` is `Copy`. Pure operations (`+`, `-`, `* f32`, [`Vector2D::sum`],
//! [`Vector2D::difference`], [`Vector2D::scaled`], [`Vector2D::quotient`],
//! [`Vector2D::checked_div`]) return a fresh value. In-place operations take
//! `&mut self` and hand back `&mut Self` so calls can be chained:
//!
//! ```
//! use particle_core::Vector2D;
//!
//! let mut f = Vector2D::zero();
//! f.add_xy(0.0, 40.0).mult(2.0);
//! assert_eq!(f, Vector2D::new(0.0, 80.0));
//! ```

use core::fmt;

use rand::Rng;

use crate::error::{ConfigError, SimError};
use crate::math;

/// A 2D vector used for position, velocity and force.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2D {
    pub x: f32,
    pub y: f32,
}

/// Dead-zone and decay parameters for [`Vector2D::force_towards_point`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Falloff {
    /// No force is produced while the distance is at or below this radius.
    pub start_radius: f32,
    /// Exponent applied to the distance: 1 is linear decay, 2 inverse-square.
    pub falloff: f32,
}

impl Falloff {
    pub fn new(start_radius: f32, falloff: f32) -> Self {
        Self {
            start_radius,
            falloff,
        }
    }
}

impl Default for Falloff {
    fn default() -> Self {
        Self {
            start_radius: 0.0,
            falloff: 1.0,
        }
    }
}

impl Vector2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Build from polar coordinates. Any angle is accepted.
    pub fn polar(radius: f32, angle: f32) -> Self {
        Self {
            x: radius * math::cos(angle),
            y: radius * math::sin(angle),
        }
    }

    pub fn magnitude(&self) -> f32 {
        math::sqrt(self.x * self.x + self.y * self.y)
    }

    /// Heading in radians, `atan2(y, x)`. The zero vector reports 0.
    pub fn angle(&self) -> f32 {
        if self.x == 0.0 && self.y == 0.0 {
            0.0
        } else {
            math::atan2(self.y, self.x)
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            Self::zero()
        }
    }

    pub fn limit(&self, max: f32) -> Self {
        let mag = self.magnitude();
        if mag > max {
            self.normalized() * max
        } else {
            *self
        }
    }

    pub fn distance_to(&self, other: &Vector2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        math::sqrt(dx * dx + dy * dy)
    }

    // ---------------------------------------------------------------------
    // Pure forms
    // ---------------------------------------------------------------------

    pub fn sum(a: Vector2D, b: Vector2D) -> Vector2D {
        a + b
    }

    pub fn difference(a: Vector2D, b: Vector2D) -> Vector2D {
        a - b
    }

    pub fn scaled(v: Vector2D, scalar: f32) -> Vector2D {
        v * scalar
    }

    pub fn quotient(v: Vector2D, divisor: f32) -> Result<Vector2D, SimError> {
        v.checked_div(divisor)
    }

    /// Divide by a scalar, failing on a zero divisor instead of yielding NaN.
    pub fn checked_div(self, divisor: f32) -> Result<Vector2D, SimError> {
        if divisor == 0.0 {
            return Err(SimError::DivisionByZero);
        }
        Ok(Self {
            x: self.x / divisor,
            y: self.y / divisor,
        })
    }

    /// Vector from `self` toward `target`.
    ///
    /// Magnitude is `strength / distance^falloff` once the distance exceeds
    /// `params.start_radius` and zero inside that dead-zone. Coincident points
    /// have no direction and produce zero.
    pub fn force_towards_point(&self, target: Vector2D, strength: f32, params: Falloff) -> Vector2D {
        let offset = target - *self;
        let distance = offset.magnitude();
        if distance <= params.start_radius || distance == 0.0 {
            return Vector2D::zero();
        }
        let magnitude = strength / math::powf(distance, params.falloff);
        offset * (magnitude / distance)
    }

    // ---------------------------------------------------------------------
    // In-place forms
    // ---------------------------------------------------------------------

    pub fn add_vec(&mut self, other: Vector2D) -> &mut Self {
        self.x += other.x;
        self.y += other.y;
        self
    }

    pub fn add_xy(&mut self, x: f32, y: f32) -> &mut Self {
        self.x += x;
        self.y += y;
        self
    }

    pub fn sub_vec(&mut self, other: Vector2D) -> &mut Self {
        self.x -= other.x;
        self.y -= other.y;
        self
    }

    pub fn mult(&mut self, scalar: f32) -> &mut Self {
        self.x *= scalar;
        self.y *= scalar;
        self
    }

    /// In-place scalar division. The receiver is untouched on error.
    pub fn div(&mut self, divisor: f32) -> Result<&mut Self, SimError> {
        *self = self.checked_div(divisor)?;
        Ok(self)
    }

    /// `self += vector * scalar`
    pub fn add_multiple(&mut self, vector: Vector2D, scalar: f32) -> &mut Self {
        self.x += vector.x * scalar;
        self.y += vector.y * scalar;
        self
    }

    pub fn set_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn set_to_polar(&mut self, radius: f32, angle: f32) -> &mut Self {
        *self = Self::polar(radius, angle);
        self
    }

    /// Uniform random point in `[x0, x1) x [y0, y1)`.
    pub fn set_to_random<R: Rng + ?Sized>(
        &mut self,
        x0: f32,
        x1: f32,
        y0: f32,
        y1: f32,
        rng: &mut R,
    ) -> Result<&mut Self, SimError> {
        if !(x1 > x0) {
            return Err(ConfigError::InvalidRange { lo: x0, hi: x1 }.into());
        }
        if !(y1 > y0) {
            return Err(ConfigError::InvalidRange { lo: y0, hi: y1 }.into());
        }
        self.x = rng.gen_range(x0..x1);
        self.y = rng.gen_range(y0..y1);
        Ok(self)
    }

    /// Clamp the magnitude into `[min, max]`, keeping the direction.
    ///
    /// A zero vector has no direction and is left at the origin even when
    /// `min > 0`.
    pub fn constrain_magnitude(&mut self, min: f32, max: f32) -> &mut Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            return self;
        }
        let target = if mag > max {
            max
        } else if mag < min {
            min
        } else {
            return self;
        };
        self.mult(target / mag)
    }

    /// Single-step wrap of `x` into `[lo, hi)`.
    pub fn wrap_x(&mut self, lo: f32, hi: f32) -> &mut Self {
        self.x = wrap(self.x, lo, hi);
        self
    }

    /// Single-step wrap of `y` into `[lo, hi)`.
    pub fn wrap_y(&mut self, lo: f32, hi: f32) -> &mut Self {
        self.y = wrap(self.y, lo, hi);
        self
    }
}

/// Assumes the coordinate moved less than one range width since the last wrap.
fn wrap(value: f32, lo: f32, hi: f32) -> f32 {
    let width = hi - lo;
    if value >= hi {
        value - width
    } else if value < lo {
        // tiny negatives round up to hi
        let wrapped = value + width;
        if wrapped >= hi {
            lo
        } else {
            wrapped
        }
    } else {
        value
    }
}

impl fmt::Display for Vector2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f32> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl core::ops::Neg for Vector2D {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl core::ops::AddAssign for Vector2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl core::ops::SubAssign for Vector2D {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl core::ops::MulAssign<f32> for Vector2D {
    fn mul_assign(&mut self, scalar: f32) {
        self.x *= scalar;
        self.y *= scalar;
    }
}
