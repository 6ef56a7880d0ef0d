//! Deterministic coherent noise consumed by wander and steering behaviors.

/// A smooth pseudo-random field sampled in up to three dimensions.
///
/// Implementations must return values in `[0, 1)` and the same value for the
/// same coordinates for the lifetime of the source.
pub trait NoiseSource {
    fn noise3(&self, x: f32, y: f32, z: f32) -> f32;

    fn noise1(&self, x: f32) -> f32 {
        self.noise3(x, 0.0, 0.0)
    }

    fn noise2(&self, x: f32, y: f32) -> f32 {
        self.noise3(x, y, 0.0)
    }
}

impl<F> NoiseSource for F
where
    F: Fn(f32, f32, f32) -> f32,
{
    fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        self(x, y, z)
    }
}

/// Constant field, handy when a test wants noise-driven forces pinned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatNoise(pub f32);

impl NoiseSource for FlatNoise {
    fn noise3(&self, _x: f32, _y: f32, _z: f32) -> f32 {
        self.0
    }
}

/// Perlin noise remapped from `[-1, 1]` to `[0, 1)`.
#[cfg(feature = "std")]
pub struct PerlinNoise {
    perlin: ::noise::Perlin,
}

#[cfg(feature = "std")]
impl PerlinNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: ::noise::Perlin::new(seed),
        }
    }
}

#[cfg(feature = "std")]
impl NoiseSource for PerlinNoise {
    fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        use ::noise::NoiseFn;

        // Integer lattice points are exactly 0 for Perlin; nudge off them so
        // noise(id) still varies between whole-number particle ids.
        let sample = self.perlin.get([x as f64 + 0.5, y as f64 + 0.5, z as f64 + 0.5]);
        let unit = ((sample + 1.0) * 0.5) as f32;
        unit.clamp(0.0, 0.999_999)
    }
}
