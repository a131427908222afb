//! Pixel buffers the kernels operate on.
//!
//! [`Image`] stores 3 or 4 interleaved channels per pixel as normalized `f32`
//! in `[0, 1]`, row-major. [`Plane`] is a single channel of the same layout and
//! is what the ditherer and the scalar noise fields work with.
//!
//! Every write clamps into `[0, 1]`; nothing wraps around.

use crate::error::{Error, Result};

/// An interleaved 3- or 4-channel image with normalized `f32` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<f32>,
}

/// A single-channel `f32` plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

/// Selects a subset of the (up to four) channels of an [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelMask(u8);

impl ChannelMask {
    /// Every channel, alpha included.
    pub const ALL: Self = Self(0b1111);
    /// The three colour channels; alpha is left alone.
    pub const COLOR: Self = Self(0b0111);
    /// No channel at all.
    pub const NONE: Self = Self(0);

    /// Builds a mask from channel indices. Indices above 3 are ignored.
    pub fn from_indices(indices: &[usize]) -> Self {
        indices
            .iter()
            .filter(|&&c| c < 4)
            .fold(Self::NONE, |mask, &c| mask.with(c))
    }

    /// Returns the mask with channel `channel` added.
    pub const fn with(self, channel: usize) -> Self {
        if channel < 4 {
            Self(self.0 | (1 << channel))
        } else {
            self
        }
    }

    /// Whether `channel` is selected.
    #[inline(always)]
    pub const fn contains(self, channel: usize) -> bool {
        channel < 4 && self.0 & (1 << channel) != 0
    }
}

impl Default for ChannelMask {
    fn default() -> Self {
        Self::ALL
    }
}

pub(crate) fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension { width, height });
    }
    Ok(())
}

fn check_channels(channels: usize) -> Result<()> {
    if channels == 3 || channels == 4 {
        Ok(())
    } else {
        Err(Error::parameter(
            "channels",
            format!("{channels} channels, expected 3 or 4"),
        ))
    }
}

fn sanitize(mut data: Vec<f32>) -> Result<Vec<f32>> {
    if let Some(bad) = data.iter().find(|v| !v.is_finite()) {
        return Err(Error::parameter(
            "pixel data",
            format!("non-finite sample {bad}"),
        ));
    }
    data.iter_mut().for_each(|v| *v = v.clamp(0.0, 1.0));
    Ok(data)
}

#[inline(always)]
pub(crate) fn to_byte(value: f32) -> u8 {
    crate::math::round(value.clamp(0.0, 1.0) * 255.0) as u8
}

impl Image {
    /// Creates a black, fully transparent (for 4 channels) image.
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self> {
        check_dimensions(width, height)?;
        check_channels(channels)?;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![0.0; width * height * channels],
        })
    }

    /// Creates an image where every pixel is `pixel`.
    pub fn filled(width: usize, height: usize, pixel: &[f32]) -> Result<Self> {
        check_dimensions(width, height)?;
        check_channels(pixel.len())?;
        let pixel = sanitize(pixel.to_vec())?;
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take(width * height * pixel.len())
            .collect();
        Ok(Self {
            width,
            height,
            channels: pixel.len(),
            data,
        })
    }

    /// Wraps normalized samples. Values are clamped into `[0, 1]`.
    pub fn from_raw(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self> {
        check_dimensions(width, height)?;
        check_channels(channels)?;
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data: sanitize(data)?,
        })
    }

    /// Converts 8-bit samples (`0..=255`) into a normalized image.
    pub fn from_u8(
        width: usize,
        height: usize,
        channels: usize,
        data: &[u8],
    ) -> Result<Self> {
        check_dimensions(width, height)?;
        check_channels(channels)?;
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data: data.iter().map(|&v| v as f32 / 255.0).collect(),
        })
    }

    /// Rounds every sample back to `0..=255`.
    pub fn to_u8(&self) -> Vec<u8> {
        self.data.iter().map(|&v| to_byte(v)).collect()
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples per pixel, 3 or 4.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(width, height, channels)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.channels)
    }

    /// The interleaved samples, row-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the image, returning its samples.
    pub fn into_raw(self) -> Vec<f32> {
        self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Samples of pixel `(x, y)`.
    ///
    /// # Panics
    /// If the coordinates are out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> &[f32] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Overwrites pixel `(x, y)`, clamping each sample.
    ///
    /// # Panics
    /// If the coordinates are out of bounds or `pixel` has the wrong length.
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: &[f32]) {
        assert_eq!(pixel.len(), self.channels, "pixel length");
        let start = (y * self.width + x) * self.channels;
        for (dst, &src) in self.data[start..start + self.channels]
            .iter_mut()
            .zip(pixel)
        {
            *dst = src.clamp(0.0, 1.0);
        }
    }

    /// Extracts one channel as a plane.
    pub fn plane(&self, channel: usize) -> Result<Plane> {
        self.check_channel(channel)?;
        Ok(Plane {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .skip(channel)
                .step_by(self.channels)
                .copied()
                .collect(),
        })
    }

    /// Writes `plane` into channel `channel`.
    pub fn set_plane(&mut self, channel: usize, plane: &Plane) -> Result<()> {
        self.check_channel(channel)?;
        if plane.width != self.width || plane.height != self.height {
            return Err(Error::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                expected_channels: 1,
                width: plane.width,
                height: plane.height,
                channels: 1,
            });
        }
        for (dst, &src) in self
            .data
            .iter_mut()
            .skip(channel)
            .step_by(self.channels)
            .zip(&plane.data)
        {
            *dst = src.clamp(0.0, 1.0);
        }
        Ok(())
    }

    /// Fails unless `other` has the same width, height and channel count.
    pub(crate) fn check_same_shape(&self, other: &Image) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                expected_channels: self.channels,
                width: other.width,
                height: other.height,
                channels: other.channels,
            });
        }
        Ok(())
    }

    pub(crate) fn check_plane(&self, plane: &Plane) -> Result<()> {
        if plane.width != self.width || plane.height != self.height {
            return Err(Error::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                expected_channels: 1,
                width: plane.width,
                height: plane.height,
                channels: 1,
            });
        }
        Ok(())
    }

    fn check_channel(&self, channel: usize) -> Result<()> {
        if channel >= self.channels {
            return Err(Error::parameter(
                "channel",
                format!(
                    "channel {channel} does not exist in a {}-channel image",
                    self.channels
                ),
            ));
        }
        Ok(())
    }
}

impl Plane {
    /// A plane of zeros.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0.0; width * height],
        })
    }

    /// Wraps normalized samples. Values are clamped into `[0, 1]`.
    pub fn from_raw(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        check_dimensions(width, height)?;
        if data.len() != width * height {
            return Err(Error::BufferLength {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: sanitize(data)?,
        })
    }

    /// Converts 8-bit samples into a normalized plane.
    pub fn from_u8(width: usize, height: usize, data: &[u8]) -> Result<Self> {
        check_dimensions(width, height)?;
        if data.len() != width * height {
            return Err(Error::BufferLength {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: data.iter().map(|&v| v as f32 / 255.0).collect(),
        })
    }

    /// Rounds every sample back to `0..=255`.
    pub fn to_u8(&self) -> Vec<u8> {
        self.data.iter().map(|&v| to_byte(v)).collect()
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at `(x, y)`.
    ///
    /// # Panics
    /// If the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// The samples, row-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the plane, returning its samples.
    pub fn into_raw(self) -> Vec<f32> {
        self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Builds a plane from already validated, already clamped samples.
    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }
}

/// Runs `f(y, row)` over every row of `data`; rows are `row_len` samples long.
///
/// With the `rayon` feature rows are processed in parallel. `f` must only
/// depend on its arguments, so both builds produce identical output.
pub(crate) fn for_each_row<F>(data: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        data.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }

    #[cfg(not(feature = "rayon"))]
    {
        data.chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
}

/// Like [`for_each_row`], but walks two buffers with the same row count in
/// lockstep.
pub(crate) fn for_each_row_pair<F>(
    a: &mut [f32],
    a_row_len: usize,
    b: &mut [f32],
    b_row_len: usize,
    f: F,
) where
    F: Fn(usize, &mut [f32], &mut [f32]) + Sync + Send,
{
    debug_assert_eq!(a.len() / a_row_len, b.len() / b_row_len);

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        a.par_chunks_mut(a_row_len)
            .zip(b.par_chunks_mut(b_row_len))
            .enumerate()
            .for_each(|(y, (row_a, row_b))| f(y, row_a, row_b));
    }

    #[cfg(not(feature = "rayon"))]
    {
        a.chunks_mut(a_row_len)
            .zip(b.chunks_mut(b_row_len))
            .enumerate()
            .for_each(|(y, (row_a, row_b))| f(y, row_a, row_b));
    }
}
