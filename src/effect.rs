//! Grain-style noise applied over an image: film grain, digital, coloured,
//! salt-and-pepper and gaussian.
//!
//! A base pattern (white noise, a sinusoid stack or a smoothed cellular
//! automaton) is optionally resampled to a coarser grain, shaped into signed
//! per-channel noise by the [`EffectNoise`] type and blended onto the image
//! with an [`EffectBlend`]. Noise is a signed offset in normalized units, so
//! `0` leaves a pixel untouched under [`EffectBlend::Add`] and
//! [`EffectBlend::Overlay`].
//!
//! Every random plane is read from its own counter-based stream keyed by the
//! resolved seed, so rendering is row-parallel and reproducible.

use crate::{
    blend::BlendMode,
    error::{Error, Result, check_range},
    image::{Image, for_each_row},
    math,
    noise::spatial_hash,
    rng::{Seeded, SeededRng, resolve_seed},
};
use core::{fmt, str::FromStr};

const PATTERN_STREAM: u32 = 0;
const CHANNEL_STREAMS: [u32; 3] = [1, 2, 3];
const IMPULSE_STREAM: u32 = 4;

/// Rec. 601 luma weights, used to find mid-tones for film grain.
const LUMA_601: [f32; 3] = [0.299, 0.587, 0.114];

/// How the base pattern is turned into per-channel noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectNoise {
    /// Luminance-weighted grain, strongest in the mid-tones (`4·L·(1 − L)`).
    #[default]
    FilmGrain,
    /// Hard on/off specks where the pattern exceeds `1 − intensity`.
    Digital,
    /// Pattern noise tinted by the configured `noise_color`.
    Colored,
    /// Isolated black and white pixels, `intensity / 2` of each.
    SaltPepper,
    /// Normal noise; green and blue are scaled by the colour variation.
    Gaussian,
}

/// Base pattern the noise is shaped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectPattern {
    /// Uniform white noise.
    #[default]
    Random,
    /// Three octaves of `sin(x·s)·cos(y·s)`. Does not depend on the seed.
    Perlin,
    /// White noise smoothed by two rounds of a thresholded 3×3 box filter.
    Cellular,
}

/// How signed noise is combined with the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectBlend {
    /// [`BlendMode::Overlay`] against `noise + 0.5`.
    #[default]
    Overlay,
    /// `base + noise`.
    Add,
    /// [`BlendMode::Multiply`] against `(noise + 1) / 2`.
    Multiply,
    /// [`BlendMode::Screen`] against `(noise + 1) / 2`.
    Screen,
}

impl EffectBlend {
    /// Blends one channel, clamped into `[0, 1]`.
    #[inline]
    pub fn apply(self, base: f32, noise: f32) -> f32 {
        let value = match self {
            EffectBlend::Overlay => BlendMode::Overlay.apply(base, noise + 0.5),
            EffectBlend::Add => base + noise,
            EffectBlend::Multiply => BlendMode::Multiply.apply(base, (noise + 1.0) * 0.5),
            EffectBlend::Screen => BlendMode::Screen.apply(base, (noise + 1.0) * 0.5),
        };
        value.clamp(0.0, 1.0)
    }
}

macro_rules! selector {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// The snake_case name accepted by [`FromStr`].
            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| value.name() == s)
                    .ok_or_else(|| Error::UnknownSelector {
                        kind: $kind,
                        value: s.to_owned(),
                    })
            }
        }
    };
}

selector!(EffectNoise, "noise type", {
    FilmGrain => "film_grain",
    Digital => "digital",
    Colored => "colored",
    SaltPepper => "salt_pepper",
    Gaussian => "gaussian",
});

selector!(EffectPattern, "noise pattern", {
    Random => "random",
    Perlin => "perlin",
    Cellular => "cellular",
});

selector!(EffectBlend, "noise blend mode", {
    Overlay => "overlay",
    Add => "add",
    Multiply => "multiply",
    Screen => "screen",
});

/// Parses `#RRGGBB` or `RRGGBB`.
pub fn parse_hex_color(s: &str) -> Result<[u8; 3]> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::parameter(
            "noise_color",
            format!("`{s}` is not a #RRGGBB colour"),
        ));
    }
    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
            .map_err(|e| Error::parameter("noise_color", e.to_string()))?;
    }
    Ok(rgb)
}

/// Parameters of [`apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NoiseEffectConfig {
    pub noise: EffectNoise,
    /// Overall strength, `[0, 1]`.
    pub intensity: f32,
    /// Size of a noise particle in pixels, `[0.5, 5]`.
    pub grain_size: f32,
    /// Strength of the independent per-channel noise, `[0, 1]`.
    pub color_variation: f32,
    /// Tint of [`EffectNoise::Colored`].
    pub noise_color: [u8; 3],
    pub blend: EffectBlend,
    pub pattern: EffectPattern,
}

impl Default for NoiseEffectConfig {
    fn default() -> Self {
        Self {
            noise: EffectNoise::FilmGrain,
            intensity: 0.3,
            grain_size: 1.0,
            color_variation: 0.2,
            noise_color: [255; 3],
            blend: EffectBlend::Overlay,
            pattern: EffectPattern::Random,
        }
    }
}

impl NoiseEffectConfig {
    /// Creates the default config with noise type `noise`.
    pub fn new(noise: EffectNoise) -> Self {
        Self {
            noise,
            ..Self::default()
        }
    }

    /// Sets the overall strength.
    pub fn intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Sets the particle size in pixels.
    pub fn grain_size(mut self, grain_size: f32) -> Self {
        self.grain_size = grain_size;
        self
    }

    /// Sets the strength of the per-channel noise.
    pub fn color_variation(mut self, color_variation: f32) -> Self {
        self.color_variation = color_variation;
        self
    }

    /// Sets the tint used by [`EffectNoise::Colored`].
    pub fn noise_color(mut self, rgb: [u8; 3]) -> Self {
        self.noise_color = rgb;
        self
    }

    /// Sets the blend.
    pub fn blend(mut self, blend: EffectBlend) -> Self {
        self.blend = blend;
        self
    }

    /// Sets the base pattern.
    pub fn pattern(mut self, pattern: EffectPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Fails on out-of-range or non-finite amounts.
    pub fn validate(&self) -> Result<()> {
        check_range("intensity", self.intensity, 0.0, 1.0)?;
        check_range("grain_size", self.grain_size, 0.5, 5.0)?;
        check_range("color_variation", self.color_variation, 0.0, 1.0)
    }

    /// Signed noise for one pixel. `base` is the pattern value there and
    /// `pixel` the input image samples.
    fn noise_at(&self, streams: &Streams, base: f32, pixel: &[f32], index: u64) -> [f32; 3] {
        let intensity = self.intensity;
        let variation = self.color_variation;
        match self.noise {
            EffectNoise::FilmGrain => {
                let luma: f32 = LUMA_601.iter().zip(pixel).map(|(w, v)| w * v).sum();
                let strength = intensity * 4.0 * luma * (1.0 - luma);
                [
                    (base - 0.5) * strength,
                    (streams.uniform(1, index) - 0.5) * strength * variation,
                    (streams.uniform(2, index) - 0.5) * strength * variation,
                ]
            }
            EffectNoise::Digital => {
                let on = if base > 1.0 - intensity { 1.0 } else { 0.0 };
                core::array::from_fn(|c| on + streams.variation(c, index, variation))
            }
            EffectNoise::Colored => {
                let tint = self.noise_color;
                core::array::from_fn(|c| {
                    (base - 0.5) * intensity * (tint[c] as f32 / 255.0)
                        + streams.variation(c, index, variation)
                })
            }
            EffectNoise::SaltPepper => {
                let u = SeededRng::float_at(streams.impulse, index);
                // Pepper wins where both would apply.
                let value = if u < intensity * 0.5 {
                    -1.0
                } else if u > 1.0 - intensity * 0.5 {
                    1.0
                } else {
                    0.0
                };
                [value; 3]
            }
            EffectNoise::Gaussian => [
                streams.gaussian(0, index, intensity),
                streams.gaussian(1, index, intensity * variation),
                streams.gaussian(2, index, intensity * variation),
            ],
        }
    }
}

/// Per-call seeds of the random planes.
struct Streams {
    channels: [u32; 3],
    impulse: u32,
}

impl Streams {
    fn new(seed: u32) -> Self {
        Self {
            channels: CHANNEL_STREAMS.map(|stream| spatial_hash(seed, stream, 0)),
            impulse: spatial_hash(seed, IMPULSE_STREAM, 0),
        }
    }

    #[inline(always)]
    fn uniform(&self, channel: usize, index: u64) -> f32 {
        SeededRng::float_at(self.channels[channel], index)
    }

    #[inline(always)]
    fn variation(&self, channel: usize, index: u64, amount: f32) -> f32 {
        if amount > 0.0 {
            (self.uniform(channel, index) - 0.5) * amount
        } else {
            0.0
        }
    }

    /// Two draws per pixel, so pixel `index` starts at position `2·index`.
    #[inline(always)]
    fn gaussian(&self, channel: usize, index: u64, std_dev: f32) -> f32 {
        SeededRng::stream(self.channels[channel], index * 2).next_gaussian(0.0, std_dev)
    }
}

fn uniform_plane(seed: u32, width: usize, height: usize) -> Vec<f32> {
    let stream = spatial_hash(seed, PATTERN_STREAM, 0);
    let mut data = vec![0.0; width * height];
    for_each_row(&mut data, width, |y, row| {
        for (x, value) in row.iter_mut().enumerate() {
            *value = SeededRng::float_at(stream, (y * width + x) as u64);
        }
    });
    data
}

fn sinusoid_plane(grain_size: f32, width: usize, height: usize) -> Vec<f32> {
    let mut data = vec![0.0; width * height];
    for_each_row(&mut data, width, |y, row| {
        for (x, value) in row.iter_mut().enumerate() {
            let mut sum = 0.0;
            let mut amplitude = 1.0;
            let mut frequency = 0.1 * grain_size;
            for _ in 0..3 {
                sum += amplitude * math::sin(x as f32 * frequency) * math::cos(y as f32 * frequency);
                amplitude *= 0.5;
                frequency *= 2.0;
            }
            // The amplitudes sum to 1.75.
            *value = (sum / 1.75 + 1.0) * 0.5;
        }
    });
    data
}

/// White noise run through two rounds of "on if the 3×3 mean exceeds 0.5",
/// wrapping at the borders.
fn automaton_plane(seed: u32, width: usize, height: usize) -> Vec<f32> {
    let mut current = uniform_plane(seed, width, height);
    for _ in 0..2 {
        let source = current;
        let mut next = vec![0.0; width * height];
        for_each_row(&mut next, width, |y, row| {
            for (x, value) in row.iter_mut().enumerate() {
                let mut sum = 0.0;
                for dy in [height - 1, 0, 1] {
                    let sy = (y + dy) % height;
                    for dx in [width - 1, 0, 1] {
                        sum += source[sy * width + (x + dx) % width];
                    }
                }
                *value = if sum / 9.0 > 0.5 { 1.0 } else { 0.0 };
            }
        });
        current = next;
    }
    current
}

fn full_pattern(pattern: EffectPattern, grain_size: f32, seed: u32, width: usize, height: usize) -> Vec<f32> {
    match pattern {
        EffectPattern::Random => uniform_plane(seed, width, height),
        EffectPattern::Perlin => sinusoid_plane(grain_size, width, height),
        EffectPattern::Cellular => automaton_plane(seed, width, height),
    }
}

/// Source position of output sample `i` when stretching `src_len` samples
/// over `len`, first and last samples aligned.
#[inline]
fn source_position(i: usize, src_len: usize, len: usize) -> (usize, usize, f32) {
    if src_len <= 1 || len <= 1 {
        return (0, 0, 0.0);
    }
    let p = i as f32 * (src_len - 1) as f32 / (len - 1) as f32;
    let i0 = (p.floor() as usize).min(src_len - 1);
    let i1 = (i0 + 1).min(src_len - 1);
    (i0, i1, p - i0 as f32)
}

/// Bilinear resampling of a `src_width × src_height` plane.
fn resample(source: &[f32], src_width: usize, src_height: usize, width: usize, height: usize) -> Vec<f32> {
    let mut data = vec![0.0; width * height];
    for_each_row(&mut data, width, |y, row| {
        let (y0, y1, ty) = source_position(y, src_height, height);
        for (x, value) in row.iter_mut().enumerate() {
            let (x0, x1, tx) = source_position(x, src_width, width);
            let top = math::lerp(source[y0 * src_width + x0], source[y0 * src_width + x1], tx);
            let bottom = math::lerp(source[y1 * src_width + x0], source[y1 * src_width + x1], tx);
            *value = math::lerp(top, bottom, ty);
        }
    });
    data
}

/// The base pattern at `width × height`, rescaled to the grain size.
///
/// A grain size other than `1` renders the pattern at `1 / grain_size` of the
/// image size and stretches it back. White noise is drawn at the small size
/// directly; the other patterns are cropped from their top-left corner.
fn base_pattern(config: &NoiseEffectConfig, seed: u32, width: usize, height: usize) -> Vec<f32> {
    let grain = config.grain_size;
    if grain == 1.0 {
        return full_pattern(config.pattern, grain, seed, width, height);
    }

    let small_width = ((width as f32 / grain) as usize).max(1);
    let small_height = ((height as f32 / grain) as usize).max(1);
    let (small, src_width, src_height) = match config.pattern {
        EffectPattern::Random => (
            uniform_plane(seed, small_width, small_height),
            small_width,
            small_height,
        ),
        pattern => {
            let full = full_pattern(pattern, grain, seed, width, height);
            let crop_width = small_width.min(width);
            let crop_height = small_height.min(height);
            let cropped: Vec<f32> = full
                .chunks_exact(width)
                .take(crop_height)
                .flat_map(|row| &row[..crop_width])
                .copied()
                .collect();
            (cropped, crop_width, crop_height)
        }
    };
    resample(&small, src_width, src_height, width, height)
}

/// Adds noise to the colour channels of `image`; alpha passes through.
///
/// Seed `0` picks a fresh seed, which is reported.
///
/// ```
/// use xwave_kernels::{EffectNoise, Image, NoiseEffectConfig, effect};
///
/// let image = Image::filled(16, 16, &[0.5, 0.5, 0.5]).unwrap();
/// let config = NoiseEffectConfig::new(EffectNoise::Gaussian).intensity(0.1);
/// let result = effect::apply(&image, &config, 3).unwrap();
/// assert_eq!(result.seed, 3);
/// assert_eq!(result.output, effect::apply(&image, &config, 3).unwrap().output);
/// ```
#[tracing::instrument(
    level = "debug",
    skip(image, config),
    fields(width = image.width(), height = image.height(), noise = %config.noise, pattern = %config.pattern, blend = %config.blend)
)]
pub fn apply(image: &Image, config: &NoiseEffectConfig, seed: u32) -> Result<Seeded<Image>> {
    config.validate()?;
    let seed = resolve_seed(seed);
    let (width, _, channels) = image.shape();
    let pattern = base_pattern(config, seed, width, image.height());
    let streams = Streams::new(seed);

    let mut output = image.clone();
    for_each_row(output.as_mut_slice(), width * channels, |y, row| {
        for (x, pixel) in row.chunks_exact_mut(channels).enumerate() {
            let index = y * width + x;
            let noise = config.noise_at(&streams, pattern[index], pixel, index as u64);
            for (value, n) in pixel[..3].iter_mut().zip(noise) {
                *value = config.blend.apply(*value, n);
            }
        }
    });

    Ok(Seeded { output, seed })
}
