//! Float helpers that work with and without `std`.

#[inline]
pub(crate) fn sqrt(v: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        v.sqrt()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sqrtf(v)
    }
}

#[inline]
pub(crate) fn sin(v: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        v.sin()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sinf(v)
    }
}

#[inline]
pub(crate) fn cos(v: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        v.cos()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::cosf(v)
    }
}

#[inline]
pub(crate) fn atan2(y: f32, x: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        y.atan2(x)
    }
    #[cfg(not(feature = "std"))]
    {
        libm::atan2f(y, x)
    }
}

#[inline]
pub(crate) fn powf(base: f32, exp: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        base.powf(exp)
    }
    #[cfg(not(feature = "std"))]
    {
        libm::powf(base, exp)
    }
}

#[inline]
pub(crate) fn ceil(v: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        v.ceil()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::ceilf(v)
    }
}

/// Floored remainder, always in `[0, m)` for positive `m`.
#[inline]
pub(crate) fn rem_euclid(v: f32, m: f32) -> f32 {
    let r = libm::fmodf(v, m);
    if r < 0.0 {
        r + m
    } else {
        r
    }
}
