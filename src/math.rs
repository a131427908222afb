//! Scalar math routed through `libm`.
//!
//! `std`'s transcendental functions defer to the platform's C library, which
//! is not guaranteed to round identically everywhere. `libm` is a pure Rust
//! port and gives the same bits on every target, so seeded output does not
//! depend on where it was rendered.

#[inline(always)]
pub(crate) fn powf64(x: f64, y: f64) -> f64 {
    libm::pow(x, y)
}

#[inline(always)]
pub(crate) fn cbrt64(x: f64) -> f64 {
    libm::cbrt(x)
}

#[inline(always)]
pub(crate) fn round(x: f32) -> f32 {
    libm::roundf(x)
}

#[inline(always)]
pub(crate) fn sqrt(x: f32) -> f32 {
    libm::sqrtf(x)
}

#[inline(always)]
pub(crate) fn ln(x: f32) -> f32 {
    libm::logf(x)
}

#[inline(always)]
pub(crate) fn cos(x: f32) -> f32 {
    libm::cosf(x)
}

#[inline(always)]
pub(crate) fn sin(x: f32) -> f32 {
    libm::sinf(x)
}

/// Linear interpolation.
#[inline(always)]
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_inputs_have_fixed_bits() {
        // Values the Box–Muller transform depends on; a platform libm would
        // be free to round these differently.
        assert_eq!(ln(1.0), 0.0);
        assert_eq!(cos(0.0), 1.0);
        assert_eq!(sin(0.0), 0.0);
        assert_eq!(ln(0.5).to_bits(), libm::logf(0.5).to_bits());
        assert_eq!(cos(1.0).to_bits(), libm::cosf(1.0).to_bits());
        assert_eq!(round(2.5), 3.0);
        assert_eq!(round(-0.5), -1.0);
    }
}
