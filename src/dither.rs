//! Quantization of planes to `levels` evenly spaced values, with optional
//! dithering.
//!
//! Error diffusion ([`DitherAlgorithm::FloydSteinberg`],
//! [`DitherAlgorithm::Atkinson`]) walks the plane in raster order and is
//! always sequential. [`DitherAlgorithm::Ordered`] compares every pixel
//! against a tiled [`ThresholdMatrix`] and runs row-parallel with the `rayon`
//! feature.

use crate::{
    color::{Rgb, luminance},
    error::{Error, Result},
    image::{ChannelMask, Image, Plane, for_each_row},
    math,
};
use core::{fmt, str::FromStr};

/// Scaled values this close to an integer level are treated as on it.
const LEVEL_SNAP: f32 = 1.0e-4;

/// Error diffusion weights as `(dx, dy, weight)` relative to the current pixel.
const FLOYD_STEINBERG: &[(i32, i32, f32)] = &[
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

/// Six neighbours at 1/8 each; 2/8 of the error is dropped.
const ATKINSON: &[(i32, i32, f32)] = &[
    (1, 0, 1.0 / 8.0),
    (2, 0, 1.0 / 8.0),
    (-1, 1, 1.0 / 8.0),
    (0, 1, 1.0 / 8.0),
    (1, 1, 1.0 / 8.0),
    (0, 2, 1.0 / 8.0),
];

/// Selects how quantization error is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DitherAlgorithm {
    /// Round to the nearest level.
    #[default]
    None,
    FloydSteinberg,
    Atkinson,
    /// Threshold against a tiled [`ThresholdMatrix`].
    Ordered,
}

impl DitherAlgorithm {
    /// Every algorithm, in declaration order.
    pub const ALL: [DitherAlgorithm; 4] = [
        DitherAlgorithm::None,
        DitherAlgorithm::FloydSteinberg,
        DitherAlgorithm::Atkinson,
        DitherAlgorithm::Ordered,
    ];

    /// The snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            DitherAlgorithm::None => "none",
            DitherAlgorithm::FloydSteinberg => "floyd_steinberg",
            DitherAlgorithm::Atkinson => "atkinson",
            DitherAlgorithm::Ordered => "ordered",
        }
    }

    /// Whether pixels depend on previously processed pixels.
    pub fn is_sequential(self) -> bool {
        matches!(
            self,
            DitherAlgorithm::FloydSteinberg | DitherAlgorithm::Atkinson
        )
    }
}

impl fmt::Display for DitherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DitherAlgorithm {
    type Err = Error;

    /// Accepts `floyd_steinberg` as well as `floyd-steinberg`.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.replace('-', "_");
        DitherAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == normalized)
            .ok_or_else(|| Error::UnknownSelector {
                kind: "dither algorithm",
                value: s.to_owned(),
            })
    }
}

/// A `width × height` matrix of ranks `0..width·height`, tiled over the plane.
///
/// The rank `m` at `(x mod width, y mod height)` gives the threshold
/// `m / (width·height)`; a pixel moves to the upper of its two neighbouring
/// levels when its fractional position strictly exceeds it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdMatrix {
    width: usize,
    height: usize,
    ranks: Vec<u32>,
}

impl Default for ThresholdMatrix {
    /// The 4×4 Bayer matrix.
    fn default() -> Self {
        Self::bayer_unchecked(4)
    }
}

impl ThresholdMatrix {
    /// The `size × size` Bayer matrix, `size ∈ {2, 4, 8, 16}`.
    pub fn bayer(size: usize) -> Result<Self> {
        if !matches!(size, 2 | 4 | 8 | 16) {
            return Err(Error::parameter(
                "matrix_size",
                format!("{size} is not one of 2, 4, 8, 16"),
            ));
        }
        Ok(Self::bayer_unchecked(size))
    }

    /// Doubles `[0]` until `size` is reached:
    /// `M₂ₙ = [[4Mₙ, 4Mₙ + 2], [4Mₙ + 3, 4Mₙ + 1]]`.
    fn bayer_unchecked(size: usize) -> Self {
        let mut n = 1;
        let mut ranks = vec![0u32];
        while n < size {
            let m = 2 * n;
            let mut next = vec![0u32; m * m];
            for y in 0..n {
                for x in 0..n {
                    let r = 4 * ranks[y * n + x];
                    next[y * m + x] = r;
                    next[y * m + x + n] = r + 2;
                    next[(y + n) * m + x] = r + 3;
                    next[(y + n) * m + x + n] = r + 1;
                }
            }
            ranks = next;
            n = m;
        }
        Self {
            width: size,
            height: size,
            ranks,
        }
    }

    /// A custom matrix in row-major order.
    ///
    /// Every rank must be below `width · height`; ranks need not be unique.
    pub fn custom(width: usize, height: usize, ranks: Vec<u32>) -> Result<Self> {
        let matrix = Self {
            width,
            height,
            ranks,
        };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Fails on an empty matrix or a rank that does not fit it.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::parameter("matrix", "matrix is empty"));
        }
        let cells = self.width * self.height;
        if self.ranks.len() != cells {
            return Err(Error::parameter(
                "matrix",
                format!("{} ranks for {cells} cells", self.ranks.len()),
            ));
        }
        if let Some(rank) = self.ranks.iter().find(|&&r| r as usize >= cells) {
            return Err(Error::parameter(
                "matrix",
                format!("rank {rank} does not fit a {}×{} matrix", self.width, self.height),
            ));
        }
        Ok(())
    }

    /// Columns of the matrix.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows of the matrix.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Ranks in row-major order.
    pub fn ranks(&self) -> &[u32] {
        &self.ranks
    }

    /// Threshold in `[0, 1)` at pixel `(x, y)`.
    #[inline(always)]
    pub fn threshold(&self, x: usize, y: usize) -> f32 {
        let rank = self.ranks[(y % self.height) * self.width + x % self.width];
        rank as f32 / (self.width * self.height) as f32
    }
}

#[inline(always)]
fn check_levels(levels: u32) -> Result<()> {
    if !(2..=256).contains(&levels) {
        return Err(Error::parameter(
            "levels",
            format!("{levels} is outside [2, 256]"),
        ));
    }
    Ok(())
}

/// Nearest of `steps + 1` evenly spaced levels.
#[inline(always)]
fn nearest(value: f32, steps: f32) -> f32 {
    math::round(value.clamp(0.0, 1.0) * steps) / steps
}

/// Configured quantizer for single planes.
///
/// ```
/// use xwave_kernels::{DitherAlgorithm, Plane, Quantizer};
///
/// let plane = Plane::from_raw(4, 1, vec![0.1, 0.4, 0.6, 0.9]).unwrap();
/// let quantizer = Quantizer::new(2, DitherAlgorithm::None).unwrap();
/// assert_eq!(quantizer.quantize(&plane).as_slice(), &[0.0, 0.0, 1.0, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Quantizer {
    levels: u32,
    algorithm: DitherAlgorithm,
    serpentine: bool,
    matrix: ThresholdMatrix,
}

impl Quantizer {
    /// Fails unless `levels ∈ [2, 256]`.
    pub fn new(levels: u32, algorithm: DitherAlgorithm) -> Result<Self> {
        check_levels(levels)?;
        Ok(Self {
            levels,
            algorithm,
            serpentine: false,
            matrix: ThresholdMatrix::default(),
        })
    }

    /// Alternate the scan direction on odd rows (error diffusion only).
    pub fn serpentine(mut self, serpentine: bool) -> Self {
        self.serpentine = serpentine;
        self
    }

    /// Threshold matrix for [`DitherAlgorithm::Ordered`].
    pub fn matrix(mut self, matrix: ThresholdMatrix) -> Self {
        self.matrix = matrix;
        self
    }

    /// Number of output levels.
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// The dithering algorithm.
    pub fn algorithm(&self) -> DitherAlgorithm {
        self.algorithm
    }

    /// Quantizes a copy of `plane`.
    pub fn quantize(&self, plane: &Plane) -> Plane {
        let (width, height) = (plane.width(), plane.height());
        let mut data = plane.as_slice().to_vec();
        self.quantize_in_place(&mut data, width, height);
        Plane::from_parts(width, height, data)
    }

    fn quantize_in_place(&self, data: &mut [f32], width: usize, height: usize) {
        let steps = (self.levels - 1) as f32;
        match self.algorithm {
            DitherAlgorithm::None => {
                for_each_row(data, width, |_, row| {
                    row.iter_mut().for_each(|v| *v = nearest(*v, steps));
                });
            }
            DitherAlgorithm::FloydSteinberg => {
                self.diffuse(data, width, height, steps, FLOYD_STEINBERG)
            }
            DitherAlgorithm::Atkinson => self.diffuse(data, width, height, steps, ATKINSON),
            DitherAlgorithm::Ordered => {
                let matrix = &self.matrix;
                for_each_row(data, width, |y, row| {
                    for (x, v) in row.iter_mut().enumerate() {
                        *v = ordered(*v, steps, matrix.threshold(x, y));
                    }
                });
            }
        }
    }

    /// Raster-order error diffusion. Error pushed outside the plane is lost.
    fn diffuse(
        &self,
        data: &mut [f32],
        width: usize,
        height: usize,
        steps: f32,
        kernel: &[(i32, i32, f32)],
    ) {
        for y in 0..height {
            let mirrored = self.serpentine && y % 2 == 1;
            for i in 0..width {
                let x = if mirrored { width - 1 - i } else { i };
                let index = y * width + x;
                let old = data[index];
                let new = nearest(old, steps);
                data[index] = new;

                let error = old - new;
                if error != 0.0 {
                    push_error(data, width, height, (x, y), error, kernel, mirrored);
                }
            }
        }
    }
}

/// Adds `error × weight` to every kernel tap around `(x, y)` that lies inside
/// the plane. `mirrored` flips the kernel horizontally.
fn push_error(
    data: &mut [f32],
    width: usize,
    height: usize,
    (x, y): (usize, usize),
    error: f32,
    kernel: &[(i32, i32, f32)],
    mirrored: bool,
) {
    for &(dx, dy, weight) in kernel {
        let dx = if mirrored { -dx } else { dx };
        let nx = x as i64 + dx as i64;
        let ny = y + dy as usize;
        if nx >= 0 && (nx as usize) < width && ny < height {
            data[ny * width + nx as usize] += error * weight;
        }
    }
}

/// Lower or upper neighbouring level, picked by `threshold`.
#[inline(always)]
fn ordered(value: f32, steps: f32, threshold: f32) -> f32 {
    let mut scaled = value.clamp(0.0, 1.0) * steps;
    let rounded = math::round(scaled);
    if (scaled - rounded).abs() < LEVEL_SNAP {
        scaled = rounded;
    }
    let lower = scaled.floor();
    let level = if scaled - lower > threshold {
        lower + 1.0
    } else {
        lower
    };
    level.min(steps) / steps
}

/// Quantizes `plane` to `levels ∈ [2, 256]` levels.
pub fn quantize(plane: &Plane, levels: u32, algorithm: DitherAlgorithm) -> Result<Plane> {
    Ok(Quantizer::new(levels, algorithm)?.quantize(plane))
}

/// Parameters of [`quantize_image`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DitherOptions {
    /// Levels per channel, `[2, 256]`.
    pub levels: u32,
    pub algorithm: DitherAlgorithm,
    /// Channels to quantize. Defaults to the colour channels.
    pub channels: ChannelMask,
    /// Quantize Rec. 709 luma once and write it to every selected colour
    /// channel.
    pub joint_luminance: bool,
    pub serpentine: bool,
    pub matrix: ThresholdMatrix,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self {
            levels: 8,
            algorithm: DitherAlgorithm::None,
            channels: ChannelMask::COLOR,
            joint_luminance: false,
            serpentine: false,
            matrix: ThresholdMatrix::default(),
        }
    }
}

impl DitherOptions {
    /// Creates options for `levels` levels with the default channel mask.
    pub fn new(levels: u32, algorithm: DitherAlgorithm) -> Self {
        Self {
            levels,
            algorithm,
            ..Self::default()
        }
    }

    /// Sets the channels to quantize.
    pub fn channels(mut self, channels: ChannelMask) -> Self {
        self.channels = channels;
        self
    }

    /// Quantizes luma once for all colour channels.
    pub fn joint_luminance(mut self, joint: bool) -> Self {
        self.joint_luminance = joint;
        self
    }

    /// Alternates the scan direction on every row for error diffusion.
    pub fn serpentine(mut self, serpentine: bool) -> Self {
        self.serpentine = serpentine;
        self
    }

    /// Sets the threshold matrix for ordered dithering.
    pub fn matrix(mut self, matrix: ThresholdMatrix) -> Self {
        self.matrix = matrix;
        self
    }

    /// Fails on out-of-range levels or an invalid matrix.
    pub fn validate(&self) -> Result<()> {
        check_levels(self.levels)?;
        self.matrix.validate()
    }

    fn quantizer(&self) -> Result<Quantizer> {
        self.validate()?;
        Ok(Quantizer::new(self.levels, self.algorithm)?
            .serpentine(self.serpentine)
            .matrix(self.matrix.clone()))
    }
}

/// Quantizes the selected channels of `image`.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(levels = options.levels, algorithm = %options.algorithm, width = image.width(), height = image.height())
)]
pub fn quantize_image(image: &Image, options: &DitherOptions) -> Result<Image> {
    let quantizer = options.quantizer()?;
    let mut output = image.clone();

    if options.joint_luminance {
        let luma: Vec<f32> = image
            .as_slice()
            .chunks_exact(image.channels())
            .map(|pixel| luminance(Rgb::from_slice(pixel)).clamp(0.0, 1.0))
            .collect();
        let luma = quantizer.quantize(&Plane::from_parts(image.width(), image.height(), luma));
        for channel in (0..3).filter(|&c| options.channels.contains(c)) {
            output.set_plane(channel, &luma)?;
        }
        return Ok(output);
    }

    for channel in (0..image.channels()).filter(|&c| options.channels.contains(c)) {
        let plane = quantizer.quantize(&image.plane(channel)?);
        output.set_plane(channel, &plane)?;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> Plane {
        let n = (width * height) as f32;
        Plane::from_raw(
            width,
            height,
            (0..width * height).map(|i| i as f32 / (n - 1.0)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn bayer_matrices() {
        let b2 = ThresholdMatrix::bayer(2).unwrap();
        assert_eq!(b2.ranks(), &[0, 2, 3, 1]);

        let b4 = ThresholdMatrix::bayer(4).unwrap();
        assert_eq!(
            b4.ranks(),
            &[0, 8, 2, 10, 12, 4, 14, 6, 3, 11, 1, 9, 15, 7, 13, 5]
        );

        for size in [2, 4, 8, 16] {
            let matrix = ThresholdMatrix::bayer(size).unwrap();
            let mut ranks = matrix.ranks().to_vec();
            ranks.sort_unstable();
            assert!(ranks.iter().enumerate().all(|(i, &r)| r as usize == i));
        }
        assert!(ThresholdMatrix::bayer(3).is_err());
        assert!(ThresholdMatrix::bayer(32).is_err());
    }

    #[test]
    fn custom_matrix_validation() {
        assert!(ThresholdMatrix::custom(1, 1, vec![0]).is_ok());
        assert!(ThresholdMatrix::custom(2, 1, vec![0, 2]).is_err());
        assert!(ThresholdMatrix::custom(2, 2, vec![0, 1]).is_err());
        assert!(ThresholdMatrix::custom(0, 0, vec![]).is_err());
    }

    #[test]
    fn levels_are_validated() {
        let plane = ramp(4, 4);
        for levels in [0, 1, 257] {
            let err = quantize(&plane, levels, DitherAlgorithm::None).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::InvalidParameter);
        }
        assert!(quantize(&plane, 2, DitherAlgorithm::None).is_ok());
        assert!(quantize(&plane, 256, DitherAlgorithm::None).is_ok());
    }

    #[test]
    fn nearest_rounding() {
        let plane = Plane::from_raw(3, 1, vec![0.2, 0.5, 0.8]).unwrap();
        let q = quantize(&plane, 3, DitherAlgorithm::None).unwrap();
        assert_eq!(q.as_slice(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn ordered_zero_threshold_rounds_up() {
        let plane = Plane::from_u8(4, 1, &[0, 85, 170, 255]).unwrap();
        let q = Quantizer::new(2, DitherAlgorithm::Ordered)
            .unwrap()
            .matrix(ThresholdMatrix::custom(1, 1, vec![0]).unwrap())
            .quantize(&plane);
        assert_eq!(q.to_u8(), vec![0, 255, 255, 255]);
    }

    #[test]
    fn ordered_keeps_exact_levels() {
        let plane = Plane::from_u8(3, 1, &[0, 51, 255]).unwrap();
        let q = quantize(&plane, 6, DitherAlgorithm::Ordered).unwrap();
        assert_eq!(q.to_u8(), vec![0, 51, 255]);
    }

    #[test]
    fn ordered_mean_tracks_input() {
        // A flat 25 % gray over a 4×4 tile hits the upper level at 4 of 16
        // thresholds.
        let plane = Plane::from_raw(4, 4, vec![0.25; 16]).unwrap();
        let q = quantize(&plane, 2, DitherAlgorithm::Ordered).unwrap();
        let ones = q.as_slice().iter().filter(|&&v| v == 1.0).count();
        assert_eq!(ones, 4);
    }

    #[test]
    fn floyd_steinberg_spreads_error() {
        let plane = Plane::from_raw(8, 8, vec![0.5; 64]).unwrap();
        let q = quantize(&plane, 2, DitherAlgorithm::FloydSteinberg).unwrap();
        let ones = q.as_slice().iter().filter(|&&v| v == 1.0).count();
        assert!((28..=36).contains(&ones), "{ones} of 64");
    }

    #[test]
    fn atkinson_drops_error() {
        // A single pixel: nothing to diffuse into.
        let plane = Plane::from_raw(1, 1, vec![0.4]).unwrap();
        let q = quantize(&plane, 2, DitherAlgorithm::Atkinson).unwrap();
        assert_eq!(q.as_slice(), &[0.0]);

        let flat = Plane::from_raw(16, 16, vec![0.3; 256]).unwrap();
        let q = quantize(&flat, 2, DitherAlgorithm::Atkinson).unwrap();
        let mean = q.as_slice().iter().sum::<f32>() / 256.0;
        assert!((mean - 0.3).abs() < 0.1, "mean {mean}");
    }

    /// Runs one error push of `error` from `at` into a zeroed plane.
    fn pushed(
        width: usize,
        height: usize,
        at: (usize, usize),
        kernel: &[(i32, i32, f32)],
        mirrored: bool,
    ) -> Vec<f32> {
        let mut data = vec![0.0; width * height];
        push_error(&mut data, width, height, at, 1.0, kernel, mirrored);
        data
    }

    #[test]
    fn floyd_steinberg_weights() {
        let data = pushed(3, 2, (1, 0), FLOYD_STEINBERG, false);
        #[rustfmt::skip]
        assert_eq!(data, vec![
            0.0,        0.0,        7.0 / 16.0,
            3.0 / 16.0, 5.0 / 16.0, 1.0 / 16.0,
        ]);

        let mirrored = pushed(3, 2, (1, 0), FLOYD_STEINBERG, true);
        #[rustfmt::skip]
        assert_eq!(mirrored, vec![
            7.0 / 16.0, 0.0,        0.0,
            1.0 / 16.0, 5.0 / 16.0, 3.0 / 16.0,
        ]);
    }

    #[test]
    fn atkinson_taps() {
        let data = pushed(4, 3, (1, 0), ATKINSON, false);
        let e = 1.0 / 8.0;
        #[rustfmt::skip]
        assert_eq!(data, vec![
            0.0, 0.0, e,   e,
            e,   e,   e,   0.0,
            0.0, e,   0.0, 0.0,
        ]);
        // Six taps at 1/8 each; the remaining 2/8 is dropped.
        assert_eq!(data.iter().sum::<f32>(), 0.75);
    }

    #[test]
    fn error_outside_the_plane_is_lost() {
        let data = pushed(2, 1, (1, 0), FLOYD_STEINBERG, false);
        assert_eq!(data, vec![0.0, 0.0]);
        let data = pushed(2, 2, (0, 1), ATKINSON, false);
        assert_eq!(data, vec![0.0, 0.0, 0.0, 0.125]);
    }

    #[test]
    fn floyd_steinberg_exact_pattern() {
        // Error collected along the bottom row lifts the last pixel past 0.5.
        let plane = Plane::from_raw(3, 2, vec![0.1, 0.1, 0.1, 0.1, 0.2, 0.35]).unwrap();
        let q = quantize(&plane, 2, DitherAlgorithm::FloydSteinberg).unwrap();
        assert_eq!(q.as_slice(), &[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn atkinson_exact_pattern() {
        #[rustfmt::skip]
        let plane = Plane::from_raw(4, 3, vec![
            0.1, 0.1, 0.1, 0.1,
            0.1, 0.1, 0.1, 0.1,
            0.4, 0.4, 0.4, 0.4,
        ])
        .unwrap();
        let q = quantize(&plane, 2, DitherAlgorithm::Atkinson).unwrap();
        #[rustfmt::skip]
        assert_eq!(q.as_slice(), &[
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
        ]);
    }

    #[test]
    fn serpentine_changes_pattern() {
        let plane = ramp(16, 16);
        let raster = Quantizer::new(2, DitherAlgorithm::FloydSteinberg)
            .unwrap()
            .quantize(&plane);
        let serpentine = Quantizer::new(2, DitherAlgorithm::FloydSteinberg)
            .unwrap()
            .serpentine(true)
            .quantize(&plane);
        // First row is identical, later rows differ.
        assert_eq!(&raster.as_slice()[..16], &serpentine.as_slice()[..16]);
        assert_ne!(raster, serpentine);
    }

    #[test]
    fn algorithm_names() {
        assert_eq!(
            "floyd-steinberg".parse::<DitherAlgorithm>().unwrap(),
            DitherAlgorithm::FloydSteinberg
        );
        for algorithm in DitherAlgorithm::ALL {
            assert_eq!(algorithm.name().parse::<DitherAlgorithm>().unwrap(), algorithm);
        }
        assert!("random".parse::<DitherAlgorithm>().is_err());
    }

    #[test]
    fn image_channels_and_alpha() {
        let image = Image::filled(4, 4, &[0.3, 0.6, 0.9, 0.42]).unwrap();
        let q = quantize_image(&image, &DitherOptions::new(2, DitherAlgorithm::None)).unwrap();
        assert_eq!(q.pixel(0, 0), &[0.0, 1.0, 1.0, 0.42]);

        let red_only = DitherOptions::new(2, DitherAlgorithm::None)
            .channels(ChannelMask::NONE.with(0));
        let q = quantize_image(&image, &red_only).unwrap();
        assert_eq!(q.pixel(3, 3), &[0.0, 0.6, 0.9, 0.42]);
    }

    #[test]
    fn joint_luminance_is_gray() {
        let image = Image::filled(4, 4, &[1.0, 0.0, 0.0]).unwrap();
        let options = DitherOptions::new(4, DitherAlgorithm::None).joint_luminance(true);
        let q = quantize_image(&image, &options).unwrap();
        // Luma of pure red is 0.2126, nearest of 4 levels is 1/3.
        for y in 0..4 {
            for x in 0..4 {
                let p = q.pixel(x, y);
                assert_eq!(p[0], p[1]);
                assert_eq!(p[1], p[2]);
                assert!((p[0] - 1.0 / 3.0).abs() < 1e-6);
            }
        }
    }
}
