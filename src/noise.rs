//! Scalar noise fields sampled on the pixel grid.
//!
//! Every field implements [`ScalarField`], mapping integer pixel coordinates
//! to a value in `[0, 1]`. [`NoiseField`] gathers the built-in fields behind a
//! closed enum so a caller can pick one at runtime and still get static
//! dispatch.
//!
//! All fields are pure functions of their seed and configuration, so rendering
//! them row-parallel gives exactly the same output as a sequential walk.

use crate::{
    cellular::CellularField,
    error::{Error, Result, check_range},
    image::{Image, Plane, check_dimensions, for_each_row},
    math::lerp,
    rng::{Seeded, SeededRng, resolve_seed},
};
use enum_dispatch::enum_dispatch;

/// A function from pixel coordinates to `[0, 1]`.
#[enum_dispatch]
pub trait ScalarField: Sync {
    /// Value at pixel `(x, y)`.
    fn value(&self, x: u32, y: u32) -> f32;
}

/// Runtime-selectable noise field.
///
/// All variants implement [`ScalarField`] through [`macro@enum_dispatch`].
///
/// ```
/// use xwave_kernels::{GradientConfig, GradientNoise, NoiseField, ScalarField};
///
/// let field: NoiseField = GradientNoise::new(42, &GradientConfig::default())
///     .unwrap()
///     .into();
/// let v = field.value(10, 20);
/// assert!((0.0..=1.0).contains(&v));
/// ```
#[derive(Debug, Clone)]
#[enum_dispatch(ScalarField)]
pub enum NoiseField {
    Uniform(UniformNoise),
    Gradient(GradientNoise),
    Fractal(FractalNoise),
    Cellular(CellularField),
}

/// Integer hash of a 2D lattice coordinate.
///
/// Combines `x`, `y` and the seed with multiply/xor-shift mixing so that
/// neighbouring coordinates decorrelate.
#[inline(always)]
pub(crate) fn spatial_hash(seed: u32, x: u32, y: u32) -> u32 {
    let mut hash = x;
    hash = hash.wrapping_mul(1_664_525).wrapping_add(y);
    hash = hash.wrapping_mul(1_664_525).wrapping_add(seed);
    hash ^= hash >> 16;
    hash = hash.wrapping_mul(0x85eb_ca6b);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(0xc2b2_ae35);
    hash ^= hash >> 16;
    hash
}

// -----------------------------------------------------------------------------
// Uniform
// -----------------------------------------------------------------------------

/// White noise with no spatial coherence.
///
/// `value(x, y)` is the `(y * width + x)`-th float of the [`SeededRng`] stream,
/// i.e. exactly what a row-major walk calling [`SeededRng::next_float`] once
/// per pixel would see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformNoise {
    seed: u32,
    width: u32,
}

impl UniformNoise {
    /// `width` is the row length used to linearize coordinates.
    pub fn new(seed: u32, width: u32) -> Self {
        Self {
            seed: resolve_seed(seed),
            width,
        }
    }

    /// The resolved seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl ScalarField for UniformNoise {
    #[inline(always)]
    fn value(&self, x: u32, y: u32) -> f32 {
        SeededRng::float_at(self.seed, y as u64 * self.width as u64 + x as u64)
    }
}

// -----------------------------------------------------------------------------
// Gradient (Perlin)
// -----------------------------------------------------------------------------

/// Parameters of [`GradientNoise`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GradientConfig {
    /// Lattice spacing in pixels. Larger is smoother.
    pub scale: f32,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self { scale: 32.0 }
    }
}

impl GradientConfig {
    /// Sets the lattice spacing in pixels.
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Fails unless the scale is finite and positive.
    pub fn validate(&self) -> Result<()> {
        check_range("scale", self.scale, 1.0e-3, 1.0e6)
    }
}

/// Unit gradient directions picked by the lattice hash.
const GRADIENTS: [(f32, f32); 8] = {
    const S: f32 = core::f32::consts::FRAC_1_SQRT_2;
    [
        (1.0, 0.0),
        (-1.0, 0.0),
        (0.0, 1.0),
        (0.0, -1.0),
        (S, S),
        (-S, S),
        (S, -S),
        (-S, -S),
    ]
};

/// Quintic smoothstep `6t⁵ − 15t⁴ + 10t³`; C2-continuous across cells.
#[inline(always)]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Classic 2D Perlin noise with a seed-shuffled permutation table.
///
/// Returns values in `[0, 1]`; integer lattice points map to exactly `0.5`.
#[derive(Debug, Clone)]
pub struct GradientNoise {
    perm: Box<[u8; 512]>,
    scale: f32,
    seed: u32,
}

impl GradientNoise {
    /// Creates the field, shuffling the permutation table from `seed`.
    pub fn new(seed: u32, config: &GradientConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = SeededRng::new(seed);

        let mut table: [u8; 256] = core::array::from_fn(|i| i as u8);
        for i in (1..256).rev() {
            let j = rng.next_int(0, i as i32) as usize;
            table.swap(i, j);
        }

        let mut perm = Box::new([0u8; 512]);
        for (i, p) in perm.iter_mut().enumerate() {
            *p = table[i & 255];
        }

        Ok(Self {
            perm,
            scale: config.scale,
            seed: rng.seed(),
        })
    }

    /// The resolved seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Lattice spacing in pixels.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline(always)]
    fn gradient(&self, xi: i32, yi: i32, dx: f32, dy: f32) -> f32 {
        let h = self.perm[self.perm[(xi & 255) as usize] as usize + (yi & 255) as usize];
        let (gx, gy) = GRADIENTS[(h & 7) as usize];
        gx * dx + gy * dy
    }

    /// Noise at continuous lattice coordinates.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let xi = x0 as i32;
        let yi = y0 as i32;
        let xf = x - x0;
        let yf = y - y0;

        let u = fade(xf);
        let v = fade(yf);

        let n00 = self.gradient(xi, yi, xf, yf);
        let n10 = self.gradient(xi.wrapping_add(1), yi, xf - 1.0, yf);
        let n01 = self.gradient(xi, yi.wrapping_add(1), xf, yf - 1.0);
        let n11 = self.gradient(xi.wrapping_add(1), yi.wrapping_add(1), xf - 1.0, yf - 1.0);

        let n = lerp(lerp(n00, n10, u), lerp(n01, n11, u), v);

        // |n| <= √2/2 for unit gradients.
        (0.5 + n * core::f32::consts::FRAC_1_SQRT_2).clamp(0.0, 1.0)
    }
}

impl ScalarField for GradientNoise {
    #[inline]
    fn value(&self, x: u32, y: u32) -> f32 {
        self.sample(x as f32 / self.scale, y as f32 / self.scale)
    }
}

// -----------------------------------------------------------------------------
// Fractal sum
// -----------------------------------------------------------------------------

/// Parameters of [`FractalNoise`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FractalConfig {
    /// Lattice spacing of the first octave, in pixels.
    pub scale: f32,
    /// Number of octaves, `1..=8`.
    pub octaves: u32,
    /// Frequency multiplier between octaves, `(0, 8]`.
    pub lacunarity: f32,
    /// Amplitude multiplier between octaves, `(0, 1]`.
    pub persistence: f32,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            scale: 32.0,
            octaves: 3,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

impl FractalConfig {
    /// Sets the lattice spacing of the first octave.
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the number of octaves.
    pub fn octaves(mut self, octaves: u32) -> Self {
        self.octaves = octaves;
        self
    }

    /// Sets the frequency multiplier between octaves.
    pub fn lacunarity(mut self, lacunarity: f32) -> Self {
        self.lacunarity = lacunarity;
        self
    }

    /// Sets the amplitude multiplier between octaves.
    pub fn persistence(mut self, persistence: f32) -> Self {
        self.persistence = persistence;
        self
    }

    /// Fails on out-of-range octaves, lacunarity or persistence.
    pub fn validate(&self) -> Result<()> {
        GradientConfig { scale: self.scale }.validate()?;
        if !(1..=8).contains(&self.octaves) {
            return Err(Error::parameter(
                "octaves",
                format!("{} is outside [1, 8]", self.octaves),
            ));
        }
        check_range("lacunarity", self.lacunarity, 0.0, 8.0)?;
        if self.lacunarity == 0.0 {
            return Err(Error::parameter("lacunarity", "must be greater than 0"));
        }
        check_range("persistence", self.persistence, 0.0, 1.0)?;
        if self.persistence == 0.0 {
            return Err(Error::parameter("persistence", "must be greater than 0"));
        }
        Ok(())
    }
}

/// Fractal Brownian motion over [`GradientNoise`], normalized to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct FractalNoise {
    base: GradientNoise,
    octaves: u32,
    lacunarity: f32,
    persistence: f32,
}

impl FractalNoise {
    /// Creates the field over a gradient base seeded with `seed`.
    pub fn new(seed: u32, config: &FractalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            base: GradientNoise::new(seed, &GradientConfig { scale: config.scale })?,
            octaves: config.octaves,
            lacunarity: config.lacunarity,
            persistence: config.persistence,
        })
    }

    /// The resolved seed.
    pub fn seed(&self) -> u32 {
        self.base.seed()
    }

    /// Normalized octave sum at continuous lattice coordinates.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let mut sum = 0.0;
        let mut norm = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for octave in 0..self.octaves {
            // Shift each octave off the shared lattice.
            let offset = octave as f32 * 17.137;
            sum += amplitude * self.base.sample(x * frequency + offset, y * frequency + offset);
            norm += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        (sum / norm).clamp(0.0, 1.0)
    }
}

impl ScalarField for FractalNoise {
    #[inline]
    fn value(&self, x: u32, y: u32) -> f32 {
        let scale = self.base.scale();
        self.sample(x as f32 / scale, y as f32 / scale)
    }
}

// -----------------------------------------------------------------------------
// Rendering
// -----------------------------------------------------------------------------

/// Selects a scalar noise generator for [`generate`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum NoiseKind {
    Uniform,
    Gradient(GradientConfig),
    Fractal(FractalConfig),
}

impl NoiseKind {
    /// Instantiates the field for one call.
    pub fn build(&self, seed: u32, width: u32) -> Result<NoiseField> {
        Ok(match self {
            NoiseKind::Uniform => UniformNoise::new(seed, width).into(),
            NoiseKind::Gradient(config) => GradientNoise::new(seed, config)?.into(),
            NoiseKind::Fractal(config) => FractalNoise::new(seed, config)?.into(),
        })
    }
}

impl NoiseField {
    /// The seed the field was built with.
    pub fn seed(&self) -> u32 {
        match self {
            NoiseField::Uniform(field) => field.seed(),
            NoiseField::Gradient(field) => field.seed(),
            NoiseField::Fractal(field) => field.seed(),
            NoiseField::Cellular(field) => field.seed(),
        }
    }
}

/// Samples `field` at every pixel of a `width × height` plane.
pub fn render_plane<F: ScalarField>(field: &F, width: usize, height: usize) -> Result<Plane> {
    check_dimensions(width, height)?;
    let mut data = vec![0.0; width * height];
    for_each_row(&mut data, width, |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            *out = field.value(x as u32, y as u32).clamp(0.0, 1.0);
        }
    });
    Ok(Plane::from_parts(width, height, data))
}

/// Renders `field` as a grayscale image layer. A fourth channel is set opaque.
pub fn render_layer<F: ScalarField>(
    field: &F,
    width: usize,
    height: usize,
    channels: usize,
) -> Result<Image> {
    let mut layer = Image::new(width, height, channels)?;
    for_each_row(layer.as_mut_slice(), width * channels, |y, row| {
        for (x, pixel) in row.chunks_exact_mut(channels).enumerate() {
            let v = field.value(x as u32, y as u32).clamp(0.0, 1.0);
            pixel[..3].fill(v);
            if channels == 4 {
                pixel[3] = 1.0;
            }
        }
    });
    Ok(layer)
}

/// Generates a noise plane. Seed `0` picks a fresh seed, which is reported.
#[tracing::instrument(level = "debug", skip(kind), fields(kind = ?kind))]
pub fn generate(kind: &NoiseKind, width: usize, height: usize, seed: u32) -> Result<Seeded<Plane>> {
    check_dimensions(width, height)?;
    let field = kind.build(seed, width as u32)?;
    let plane = render_plane(&field, width, height)?;
    Ok(Seeded {
        output: plane,
        seed: field.seed(),
    })
}
