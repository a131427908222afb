//! Cellular circle fields.
//!
//! Circle centers sit on a square grid or a hexagonal lattice, `circle_size`
//! pixels apart. Each center owns a disc of radius `circle_size / 2`. A pixel
//! belongs to its nearest center; inside the disc it gets an amount from the
//! center-to-edge gradient profile and a colour from the center's noise
//! sub-generator. Pixels outside every disc keep the background: amount `0`
//! and no colour contribution.

use crate::{
    blend::{BlendMode, CompositeOptions, composite_with},
    error::{Error, Result, check_range},
    image::{ChannelMask, Image, Plane, check_dimensions, for_each_row_pair},
    math,
    noise::{ScalarField, spatial_hash},
    rng::{Seeded, SeededRng, resolve_seed},
};
use core::{fmt, str::FromStr};
use enum_dispatch::enum_dispatch;

/// Where circle centers are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Layout {
    /// Square grid, `circle_size` apart on both axes.
    #[default]
    Grid,
    /// Rows `circle_size · √3/2` apart, odd rows shifted by half a circle.
    Hex,
}

/// Shape of the center-to-edge profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Falloff {
    /// Proportional to the normalized distance `t`.
    #[default]
    Linear,
    /// Dome profile `1 − √(1 − t²)`: flat in the middle, steep at the rim.
    Radial,
}

/// Whether noise colours change per pixel or once per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NoiseGrain {
    #[default]
    PerPixel,
    PerCell,
}

/// A colour source for the noise inside a disc.
#[enum_dispatch]
pub trait CellSampler {
    /// Draws one normalized RGB colour from `rng`.
    fn draw(&self, rng: &mut SeededRng) -> [f32; 3];
}

/// Independent uniform noise per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RgbNoise;

impl CellSampler for RgbNoise {
    #[inline]
    fn draw(&self, rng: &mut SeededRng) -> [f32; 3] {
        [rng.next_float(), rng.next_float(), rng.next_float()]
    }
}

/// One uniform value replicated on all channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrayNoise;

impl CellSampler for GrayNoise {
    #[inline]
    fn draw(&self, rng: &mut SeededRng) -> [f32; 3] {
        let v = rng.next_float();
        [v, v, v]
    }
}

/// Uniform choice from a fixed list of 8-bit colours.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteNoise {
    colors: Vec<[u8; 3]>,
}

impl PaletteNoise {
    /// Fails on an empty palette.
    pub fn new(colors: Vec<[u8; 3]>) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::parameter("palette", "palette is empty"));
        }
        Ok(Self { colors })
    }

    /// The palette, in draw order.
    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }
}

impl CellSampler for PaletteNoise {
    fn draw(&self, rng: &mut SeededRng) -> [f32; 3] {
        // An empty palette is rejected by `CellularConfig::validate`.
        let last = self.colors.len().saturating_sub(1) as i32;
        let [r, g, b] = self.colors[rng.next_int(0, last) as usize];
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
    }
}

/// Normally distributed noise per channel, clamped into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaussianNoise {
    pub mean: f32,
    pub std_dev: f32,
}

impl Default for GaussianNoise {
    fn default() -> Self {
        Self {
            mean: 127.0 / 255.0,
            std_dev: 40.0 / 255.0,
        }
    }
}

impl CellSampler for GaussianNoise {
    fn draw(&self, rng: &mut SeededRng) -> [f32; 3] {
        core::array::from_fn(|_| {
            rng.next_gaussian(self.mean, self.std_dev).clamp(0.0, 1.0)
        })
    }
}

/// Runtime-selectable noise sub-generator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[enum_dispatch(CellSampler)]
pub enum CellNoise {
    Rgb(RgbNoise),
    Grayscale(GrayNoise),
    Palette(PaletteNoise),
    Gaussian(GaussianNoise),
}

impl Default for CellNoise {
    fn default() -> Self {
        CellNoise::Rgb(RgbNoise)
    }
}

impl CellNoise {
    /// Creates a palette sampler. Fails on an empty list.
    pub fn palette(colors: Vec<[u8; 3]>) -> Result<Self> {
        PaletteNoise::new(colors).map(CellNoise::Palette)
    }

    /// The snake_case name of the sampler.
    pub fn name(&self) -> &'static str {
        match self {
            CellNoise::Rgb(_) => "rgb",
            CellNoise::Grayscale(_) => "grayscale",
            CellNoise::Palette(_) => "palette",
            CellNoise::Gaussian(_) => "gaussian",
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            CellNoise::Palette(palette) if palette.colors.is_empty() => {
                Err(Error::parameter("palette", "palette is empty"))
            }
            CellNoise::Gaussian(gaussian) => {
                check_range("mean", gaussian.mean, 0.0, 1.0)?;
                check_range("std_dev", gaussian.std_dev, 0.0, 1.0)
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for CellNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CellNoise {
    type Err = Error;

    /// Parses the parameter-free generators. A palette needs its colours, use
    /// [`CellNoise::palette`].
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rgb" => Ok(RgbNoise.into()),
            "grayscale" => Ok(GrayNoise.into()),
            "gaussian" => Ok(GaussianNoise::default().into()),
            "palette" => Err(Error::parameter(
                "noise_type",
                "palette noise needs a colour list",
            )),
            _ => Err(Error::UnknownSelector {
                kind: "cell noise",
                value: s.to_owned(),
            }),
        }
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "grid" => Ok(Layout::Grid),
            "hex" => Ok(Layout::Hex),
            _ => Err(Error::UnknownSelector {
                kind: "layout",
                value: s.to_owned(),
            }),
        }
    }
}

impl FromStr for Falloff {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(Falloff::Linear),
            "radial" => Ok(Falloff::Radial),
            _ => Err(Error::UnknownSelector {
                kind: "gradient type",
                value: s.to_owned(),
            }),
        }
    }
}

/// Parameters of a [`CellularField`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CellularConfig {
    /// Distance between neighbouring centers in pixels, `8..=128`.
    pub circle_size: u32,
    pub layout: Layout,
    pub noise: CellNoise,
    /// Profile amount at the center, `[0, 1]`.
    pub center_amount: f32,
    /// Profile amount at the rim, `[0, 1]`.
    pub edge_amount: f32,
    pub falloff: Falloff,
    /// Runs the profile from rim to center instead.
    pub reverse_gradient: bool,
    /// Blend across the rim over a one pixel band.
    pub antialias: bool,
    pub grain: NoiseGrain,
}

impl Default for CellularConfig {
    fn default() -> Self {
        Self {
            circle_size: 32,
            layout: Layout::Grid,
            noise: CellNoise::default(),
            center_amount: 0.0,
            edge_amount: 1.0,
            falloff: Falloff::Linear,
            reverse_gradient: false,
            antialias: false,
            grain: NoiseGrain::PerPixel,
        }
    }
}

impl CellularConfig {
    /// Sets the spacing between centers in pixels.
    pub fn circle_size(mut self, circle_size: u32) -> Self {
        self.circle_size = circle_size;
        self
    }

    /// Sets the center layout.
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the colour sampler.
    pub fn noise(mut self, noise: CellNoise) -> Self {
        self.noise = noise;
        self
    }

    /// Sets the amounts at the center and at the rim.
    pub fn amounts(mut self, center: f32, edge: f32) -> Self {
        self.center_amount = center;
        self.edge_amount = edge;
        self
    }

    /// Sets the profile shape.
    pub fn falloff(mut self, falloff: Falloff) -> Self {
        self.falloff = falloff;
        self
    }

    /// Swaps the center and rim ends of the profile.
    pub fn reverse_gradient(mut self, reverse: bool) -> Self {
        self.reverse_gradient = reverse;
        self
    }

    /// Enables the 1-pixel soft rim.
    pub fn antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }

    /// Sets whether colours vary per pixel or per cell.
    pub fn grain(mut self, grain: NoiseGrain) -> Self {
        self.grain = grain;
        self
    }

    /// Fails on an out-of-range size or amount, or an invalid sampler.
    pub fn validate(&self) -> Result<()> {
        if !(8..=128).contains(&self.circle_size) {
            return Err(Error::parameter(
                "circle_size",
                format!("{} is outside [8, 128]", self.circle_size),
            ));
        }
        check_range("center_amount", self.center_amount, 0.0, 1.0)?;
        check_range("edge_amount", self.edge_amount, 0.0, 1.0)?;
        self.noise.validate()
    }
}

/// One evaluated point of a [`CellularField`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    /// Profile amount times disc coverage; `0` on the background.
    pub amount: f32,
    /// Noise colour; black on the background.
    pub color: [f32; 3],
}

impl CellSample {
    const BACKGROUND: Self = Self {
        amount: 0.0,
        color: [0.0; 3],
    };
}

/// Circle-pattern field over a grid or hexagonal lattice.
#[derive(Debug, Clone)]
pub struct CellularField {
    config: CellularConfig,
    seed: u32,
    spacing: f32,
    radius: f32,
    row_height: f32,
}

impl CellularField {
    /// Creates the field. Seed `0` picks a fresh seed.
    pub fn new(seed: u32, config: &CellularConfig) -> Result<Self> {
        config.validate()?;
        let spacing = config.circle_size as f32;
        let row_height = match config.layout {
            Layout::Grid => spacing,
            Layout::Hex => spacing * 0.866_025_4,
        };
        Ok(Self {
            config: config.clone(),
            seed: resolve_seed(seed),
            spacing,
            radius: (config.circle_size / 2) as f32,
            row_height,
        })
    }

    /// The resolved seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Disc radius, `circle_size / 2` in whole pixels.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// The validated config.
    pub fn config(&self) -> &CellularConfig {
        &self.config
    }

    /// Horizontal shift of row `row`.
    #[inline]
    fn row_offset(&self, row: i64) -> f32 {
        match self.config.layout {
            Layout::Hex if row.rem_euclid(2) == 1 => self.radius,
            _ => 0.0,
        }
    }

    /// Center of cell `(col, row)` in pixel coordinates.
    pub fn center(&self, col: i64, row: i64) -> (f32, f32) {
        (
            col as f32 * self.spacing + self.radius + self.row_offset(row),
            row as f32 * self.row_height + self.radius,
        )
    }

    /// Nearest center to `(px, py)`: `(col, row, distance)`.
    fn nearest(&self, px: f32, py: f32) -> (i64, i64, f32) {
        let row0 = ((py - self.radius) / self.row_height).floor() as i64;
        let mut best = (0, 0, f32::INFINITY);

        // The two bracketing rows always contain the nearest center, for the
        // hexagonal lattice as well as for the grid.
        for row in row0..=row0 + 1 {
            let offset = self.row_offset(row);
            let col0 = ((px - self.radius - offset) / self.spacing).floor() as i64;
            for col in col0..=col0 + 1 {
                let (cx, cy) = self.center(col, row);
                let (dx, dy) = (px - cx, py - cy);
                let distance = math::sqrt(dx * dx + dy * dy);
                if distance < best.2 {
                    best = (col, row, distance);
                }
            }
        }
        best
    }

    /// Profile amount at normalized distance `t ∈ [0, 1]` from the center.
    pub fn profile(&self, t: f32) -> f32 {
        let mut t = t.clamp(0.0, 1.0);
        if self.config.reverse_gradient {
            t = 1.0 - t;
        }
        let shaped = match self.config.falloff {
            Falloff::Linear => t,
            Falloff::Radial => 1.0 - math::sqrt((1.0 - t * t).max(0.0)),
        };
        math::lerp(self.config.center_amount, self.config.edge_amount, shaped)
    }

    /// Evaluates pixel `(x, y)`.
    pub fn sample(&self, x: u32, y: u32) -> CellSample {
        let (col, row, distance) = self.nearest(x as f32, y as f32);

        let coverage = if self.config.antialias {
            (self.radius + 0.5 - distance).clamp(0.0, 1.0)
        } else if distance <= self.radius {
            1.0
        } else {
            0.0
        };
        if coverage <= 0.0 {
            return CellSample::BACKGROUND;
        }

        let amount = self.profile(distance / self.radius) * coverage;

        let cell_seed = spatial_hash(self.seed, col as u32, row as u32);
        let position = match self.config.grain {
            NoiseGrain::PerPixel => (((y as u64) << 32) | x as u64).wrapping_mul(8),
            NoiseGrain::PerCell => 0,
        };
        let mut rng = SeededRng::stream(cell_seed, position);

        CellSample {
            amount,
            color: self.config.noise.draw(&mut rng),
        }
    }
}

impl ScalarField for CellularField {
    #[inline]
    fn value(&self, x: u32, y: u32) -> f32 {
        self.sample(x, y).amount
    }
}

/// Rendered cellular noise: colour layer plus amount mask.
#[derive(Debug, Clone, PartialEq)]
pub struct CellularLayer {
    /// Noise colours; a fourth channel, if present, is opaque.
    pub colors: Image,
    /// Per-pixel amount, `0` on the background.
    pub mask: Plane,
}

fn render(field: &CellularField, width: usize, height: usize, channels: usize) -> Result<CellularLayer> {
    let mut colors = Image::new(width, height, channels)?;
    let mut mask = Plane::new(width, height)?;

    for_each_row_pair(
        colors.as_mut_slice(),
        width * channels,
        mask.as_mut_slice(),
        width,
        |y, color_row, mask_row| {
            for (x, (pixel, amount)) in color_row
                .chunks_exact_mut(channels)
                .zip(mask_row.iter_mut())
                .enumerate()
            {
                let sample = field.sample(x as u32, y as u32);
                pixel[..3].copy_from_slice(&sample.color);
                if channels == 4 {
                    pixel[3] = 1.0;
                }
                *amount = sample.amount;
            }
        },
    );

    Ok(CellularLayer { colors, mask })
}

/// Renders a 3-channel cellular layer. Seed `0` picks a fresh seed.
#[tracing::instrument(level = "debug", skip(config), fields(circle_size = config.circle_size, layout = ?config.layout, noise = %config.noise))]
pub fn generate(
    config: &CellularConfig,
    width: usize,
    height: usize,
    seed: u32,
) -> Result<Seeded<CellularLayer>> {
    check_dimensions(width, height)?;
    let field = CellularField::new(seed, config)?;
    Ok(Seeded {
        output: render(&field, width, height, 3)?,
        seed: field.seed(),
    })
}

/// Blends cellular noise onto `image` through its amount mask.
///
/// Per pixel the effective opacity is `opacity × amount`; the alpha channel
/// of a 4-channel image is kept.
#[tracing::instrument(level = "debug", skip(image, config), fields(width = image.width(), height = image.height(), circle_size = config.circle_size))]
pub fn apply(
    image: &Image,
    config: &CellularConfig,
    mode: BlendMode,
    opacity: f32,
    seed: u32,
) -> Result<Seeded<Image>> {
    check_range("opacity", opacity, 0.0, 1.0)?;
    let field = CellularField::new(seed, config)?;
    let layer = render(&field, image.width(), image.height(), image.channels())?;

    let output = composite_with(
        image,
        &layer.colors,
        &CompositeOptions {
            mode,
            opacity,
            channels: ChannelMask::COLOR,
            mask: Some(&layer.mask),
        },
    )?;

    Ok(Seeded {
        output,
        seed: field.seed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(config: CellularConfig) -> CellularField {
        CellularField::new(17, &config).unwrap()
    }

    #[test]
    fn grid_centers() {
        let f = field(CellularConfig::default().circle_size(16));
        assert_eq!(f.center(0, 0), (8.0, 8.0));
        assert_eq!(f.center(2, 1), (40.0, 24.0));
        assert_eq!(f.radius(), 8.0);
    }

    #[test]
    fn hex_rows_are_shifted() {
        let f = field(CellularConfig::default().circle_size(20).layout(Layout::Hex));
        let (x0, y0) = f.center(0, 0);
        let (x1, y1) = f.center(0, 1);
        assert_eq!(x1 - x0, 10.0);
        assert!((y1 - y0 - 20.0 * 0.866_025_4).abs() < 1e-4);
        // Hex neighbours are one circle apart.
        let d = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        assert!((d - 20.0).abs() < 1e-3);
    }

    #[test]
    fn nearest_center_is_found_in_hex_layout() {
        let f = field(CellularConfig::default().circle_size(24).layout(Layout::Hex));
        for y in 0..80u32 {
            for x in 0..80u32 {
                let (_, _, d) = f.nearest(x as f32, y as f32);
                // Brute force over a generous neighbourhood.
                let mut best = f32::INFINITY;
                for row in -2..6 {
                    for col in -2..6 {
                        let (cx, cy) = f.center(col, row);
                        best = best.min(((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt());
                    }
                }
                assert!((d - best).abs() < 1e-4, "({x}, {y}): {d} vs {best}");
            }
        }
    }

    #[test]
    fn profile_shapes() {
        let linear = field(CellularConfig::default().amounts(0.2, 1.0));
        assert!((linear.profile(0.0) - 0.2).abs() < 1e-6);
        assert!((linear.profile(0.5) - 0.6).abs() < 1e-6);
        assert!((linear.profile(1.0) - 1.0).abs() < 1e-6);

        let reversed = field(CellularConfig::default().amounts(0.2, 1.0).reverse_gradient(true));
        assert!((reversed.profile(0.0) - 1.0).abs() < 1e-6);
        assert!((reversed.profile(1.0) - 0.2).abs() < 1e-6);

        let radial = field(CellularConfig::default().falloff(Falloff::Radial));
        assert_eq!(radial.profile(0.0), 0.0);
        assert!(radial.profile(0.5) < 0.5);
        assert!((radial.profile(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn antialias_softens_rim() {
        let hard = field(CellularConfig::default().circle_size(16).amounts(1.0, 1.0));
        let soft = field(CellularConfig::default().circle_size(16).amounts(1.0, 1.0).antialias(true));
        // (8, 16) sits on the rim shared by (8, 8) and (8, 24); (16, 14) is
        // 10 px from its nearest center.
        assert_eq!(hard.value(8, 16), 1.0);
        assert_eq!(soft.value(8, 16), 0.5);
        assert_eq!(hard.value(16, 14), 0.0);
        assert_eq!(soft.value(16, 14), 0.0);
    }

    #[test]
    fn per_cell_grain_is_flat() {
        let f = field(CellularConfig::default().circle_size(16).grain(NoiseGrain::PerCell));
        let a = f.sample(8, 8).color;
        let b = f.sample(10, 7).color;
        assert_eq!(a, b);

        let per_pixel = field(CellularConfig::default().circle_size(16));
        assert_ne!(per_pixel.sample(8, 8).color, per_pixel.sample(10, 7).color);
    }

    #[test]
    fn palette_colors_only() {
        let palette = vec![[255, 0, 0], [0, 0, 255]];
        let f = field(CellularConfig::default().noise(CellNoise::palette(palette).unwrap()));
        for y in 0..32 {
            for x in 0..32 {
                let sample = f.sample(x, y);
                if sample.amount > 0.0 {
                    assert!(sample.color == [1.0, 0.0, 0.0] || sample.color == [0.0, 0.0, 1.0]);
                }
            }
        }
    }

    #[test]
    fn config_validation() {
        assert!(CellularConfig::default().circle_size(7).validate().is_err());
        assert!(CellularConfig::default().circle_size(129).validate().is_err());
        assert!(CellularConfig::default().amounts(1.5, 0.0).validate().is_err());
        assert!(CellNoise::palette(Vec::new()).is_err());
        let bad_gaussian = CellularConfig::default().noise(
            GaussianNoise {
                mean: 0.5,
                std_dev: f32::NAN,
            }
            .into(),
        );
        assert!(bad_gaussian.validate().is_err());
    }

    #[test]
    fn zero_variance_gaussian_is_flat() {
        let f = field(CellularConfig::default().noise(
            GaussianNoise {
                mean: 0.25,
                std_dev: 0.0,
            }
            .into(),
        ));
        assert_eq!(f.sample(16, 16).color, [0.25; 3]);
    }

    #[test]
    fn selector_names() {
        assert_eq!("hex".parse::<Layout>().unwrap(), Layout::Hex);
        assert_eq!("radial".parse::<Falloff>().unwrap(), Falloff::Radial);
        assert_eq!("grayscale".parse::<CellNoise>().unwrap().name(), "grayscale");
        assert!("palette".parse::<CellNoise>().is_err());
        assert!("voronoi".parse::<Layout>().is_err());
    }

    #[test]
    fn layer_colors_and_mask_agree_per_pixel() {
        let f = field(CellularConfig::default().circle_size(12).layout(Layout::Hex));
        let layer = render(&f, 24, 20, 4).unwrap();
        for y in 0..20 {
            for x in 0..24 {
                let sample = f.sample(x as u32, y as u32);
                assert_eq!(layer.mask.get(x, y), sample.amount);
                assert_eq!(&layer.colors.pixel(x, y)[..3], &sample.color);
                assert_eq!(layer.colors.pixel(x, y)[3], 1.0);
            }
        }
    }

    #[test]
    fn apply_keeps_background_and_alpha() {
        let image = Image::filled(32, 32, &[0.5, 0.5, 0.5, 0.75]).unwrap();
        let config = CellularConfig::default().circle_size(16);
        let result = apply(&image, &config, BlendMode::Normal, 1.0, 5).unwrap();
        assert_eq!(result.seed, 5);
        // (16, 16) lies between four discs.
        assert_eq!(result.output.pixel(16, 16), image.pixel(16, 16));
        for y in 0..32 {
            for x in 0..32 {
                assert_eq!(result.output.pixel(x, y)[3], 0.75);
            }
        }
    }
}
