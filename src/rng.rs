//! Seeded, counter-based random number generation.
//!
//! The `k`-th value drawn from a [`SeededRng`] is a pure function of
//! `(seed, k)`, computed with integer hash mixing only. The stream is therefore
//! identical on every platform, and row-parallel kernels can jump straight to
//! the value a sequential row-major walk would have drawn.

use crate::{
    error::{Error, Result},
    math,
};
use rand::{Rng as _, RngCore};

/// A value produced by a stochastic kernel, together with the seed that
/// produced it.
///
/// When a kernel is called with seed `0` a fresh seed is drawn; storing
/// [`Seeded::seed`] lets the caller replay the result later.
#[derive(Debug, Clone, PartialEq)]
pub struct Seeded<T> {
    /// The kernel's output.
    pub output: T,
    /// The seed actually used (never `0`).
    pub seed: u32,
}

impl<T> Seeded<T> {
    /// Maps the output, keeping the seed.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Seeded<U> {
        Seeded {
            output: f(self.output),
            seed: self.seed,
        }
    }

    /// Discards the seed.
    pub fn into_output(self) -> T {
        self.output
    }
}

/// Replaces the sentinel seed `0` by a fresh non-zero seed from thread-local
/// entropy. Any other value is returned as is.
pub fn resolve_seed(seed: u32) -> u32 {
    if seed != 0 {
        return seed;
    }
    let fresh = rand::rng().random_range(1..=u32::MAX);
    tracing::debug!(seed = fresh, "drew fresh seed");
    fresh
}

/// Deterministic generator used by every stochastic kernel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeededRng {
    seed: u32,
    counter: u64,
}

impl SeededRng {
    /// Creates a generator. Seed `0` draws a fresh seed, see [`Self::seed`].
    pub fn new(seed: u32) -> Self {
        Self {
            seed: resolve_seed(seed),
            counter: 0,
        }
    }

    /// A generator positioned at `position` of the raw stream for `seed`.
    ///
    /// Unlike [`Self::new`] the seed is taken verbatim, `0` included; this is
    /// used for derived per-cell streams, not for caller seeds.
    pub(crate) fn stream(seed: u32, position: u64) -> Self {
        Self {
            seed,
            counter: position,
        }
    }

    /// The resolved seed, never `0`.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// How many 32-bit values have been drawn so far.
    pub fn position(&self) -> u64 {
        self.counter
    }

    /// The `index`-th 32-bit value of the stream for `seed`.
    #[inline(always)]
    pub fn value_at(seed: u32, index: u64) -> u32 {
        // SplitMix64 finalizer over the seed and the stream position.
        let mut z = (seed as u64)
            .wrapping_mul(0x9e37_79b9_7f4a_7c15)
            .wrapping_add(index.wrapping_mul(0xd1b5_4a32_d192_ed03))
            .wrapping_add(0x632b_e59b_d9b4_e019);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        (z >> 32) as u32
    }

    /// Maps a 32-bit value onto `[0, 1)` using its top 24 bits.
    #[inline(always)]
    pub fn unit_float(bits: u32) -> f32 {
        (bits >> 8) as f32 * (1.0 / 16_777_216.0)
    }

    /// The `index`-th float in `[0, 1)` of the stream for `seed`.
    #[inline(always)]
    pub fn float_at(seed: u32, index: u64) -> f32 {
        Self::unit_float(Self::value_at(seed, index))
    }

    #[inline(always)]
    pub fn next_u32(&mut self) -> u32 {
        let value = Self::value_at(self.seed, self.counter);
        self.counter = self.counter.wrapping_add(1);
        value
    }

    /// Uniform float in `[0, 1)`.
    #[inline(always)]
    pub fn next_float(&mut self) -> f32 {
        Self::unit_float(self.next_u32())
    }

    /// Uniform integer in `lo..=hi`, without modulo bias.
    ///
    /// # Panics
    /// If `lo > hi`.
    pub fn next_int(&mut self, lo: i32, hi: i32) -> i32 {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        let span = (hi as i64 - lo as i64 + 1) as u64;
        if span > u32::MAX as u64 {
            return lo.wrapping_add(self.next_u32() as i32);
        }

        // Lemire's multiply-and-reject.
        let span = span as u32;
        let threshold = span.wrapping_neg() % span;
        loop {
            let product = self.next_u32() as u64 * span as u64;
            if (product as u32) >= threshold {
                return (lo as i64 + (product >> 32) as i64) as i32;
            }
        }
    }

    /// Like [`Self::next_int`], but an empty range is an
    /// [`Error::InvalidParameter`] instead of a panic. Nothing is drawn on
    /// error.
    pub fn try_next_int(&mut self, lo: i32, hi: i32) -> Result<i32> {
        if lo > hi {
            return Err(Error::parameter(
                "range",
                format!("empty range {lo}..={hi}"),
            ));
        }
        Ok(self.next_int(lo, hi))
    }

    /// Normally distributed sample (Box–Muller).
    ///
    /// A non-positive or non-finite `std_dev` degenerates to `mean`; no values
    /// are drawn in that case.
    pub fn next_gaussian(&mut self, mean: f32, std_dev: f32) -> f32 {
        if !(std_dev > 0.0) || !std_dev.is_finite() {
            return mean;
        }
        // Shift into (0, 1] so the logarithm stays finite.
        let u1 = 1.0 - self.next_float();
        let u2 = self.next_float();
        let radius = math::sqrt(-2.0 * math::ln(u1));
        mean + std_dev * radius * math::cos(core::f32::consts::TAU * u2)
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        SeededRng::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let lo = SeededRng::next_u32(self) as u64;
        let hi = SeededRng::next_u32(self) as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = SeededRng::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn seed_zero_is_resolved() {
        let rng = SeededRng::new(0);
        assert_ne!(rng.seed(), 0);
        assert_eq!(resolve_seed(7), 7);
    }

    #[test]
    fn floats_are_half_open() {
        assert_eq!(SeededRng::unit_float(0), 0.0);
        assert!(SeededRng::unit_float(u32::MAX) < 1.0);
    }

    #[test]
    fn stream_matches_random_access() {
        let mut rng = SeededRng::new(9);
        for index in 0..64 {
            assert_eq!(rng.next_float(), SeededRng::float_at(9, index));
        }
        assert_eq!(rng.position(), 64);
    }

    #[test]
    fn int_bounds() {
        let mut rng = SeededRng::new(3);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let v = rng.next_int(-2, 2);
            assert!((-2..=2).contains(&v));
            seen[(v + 2) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(rng.next_int(5, 5), 5);
        // Full span takes the unrejected path.
        rng.next_int(i32::MIN, i32::MAX);
    }

    #[test]
    #[should_panic]
    fn int_empty_range_panics() {
        SeededRng::new(1).next_int(3, 2);
    }

    #[test]
    fn try_int_reports_empty_range() {
        let mut rng = SeededRng::new(1);
        let err = rng.try_next_int(3, 2).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidParameter);
        assert_eq!(rng.position(), 0);

        let mut a = SeededRng::new(4);
        let mut b = SeededRng::new(4);
        assert_eq!(a.try_next_int(-5, 5).unwrap(), b.next_int(-5, 5));
    }

    #[test]
    fn gaussian_degenerate_returns_mean() {
        let mut rng = SeededRng::new(5);
        assert_eq!(rng.next_gaussian(0.5, 0.0), 0.5);
        assert_eq!(rng.next_gaussian(0.5, -1.0), 0.5);
        assert_eq!(rng.position(), 0);
    }

    #[test]
    fn gaussian_moments() {
        let mut rng = SeededRng::new(11);
        let n = 20_000;
        let samples: Vec<f32> =
            (0..n).map(|_| rng.next_gaussian(0.5, 0.1)).collect();
        let mean = samples.iter().sum::<f32>() / n as f32;
        let var =
            samples.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / n as f32;
        assert!((mean - 0.5).abs() < 0.01, "mean {mean}");
        assert!((var.sqrt() - 0.1).abs() < 0.01, "std {}", var.sqrt());
    }

    #[test]
    fn drives_rand_distributions() {
        use rand::Rng;
        let mut a = SeededRng::new(77);
        let mut b = SeededRng::new(77);
        let x: f64 = a.random();
        let y: f64 = b.random();
        assert_eq!(x, y);

        let mut bytes = [0u8; 7];
        a.fill_bytes(&mut bytes);
        assert_ne!(bytes, [0u8; 7]);
    }
}
