//! Blend-mode compositing of an effect layer onto a base image.
//!
//! Every mode is a per-channel function `f(base, layer)` on `[0, 1]`; the
//! composite is `base·(1 − opacity) + f(base, layer)·opacity`, clamped.

use crate::{
    error::{Error, Result, check_range},
    image::{ChannelMask, Image, Plane, for_each_row},
    math,
    noise::{ScalarField, render_layer},
};
use core::{fmt, str::FromStr};

/// Layer values this close to `0` or `1` hit the dodge/burn limits.
const EPSILON: f32 = 1.0e-6;

/// Per-channel blend function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BlendMode {
    /// The layer replaces the base.
    #[default]
    Normal,
    Multiply,
    Screen,
    /// Multiply or screen, branching on the base.
    Overlay,
    /// W3C soft light, branching on the layer.
    SoftLight,
    /// Overlay with base and layer swapped.
    HardLight,
    ColorDodge,
    ColorBurn,
    /// Clamped sum; parsed from `add` as well.
    #[cfg_attr(feature = "serde", serde(alias = "add"))]
    LinearDodge,
    LinearBurn,
    /// Color burn below a layer of `0.5`, color dodge above.
    VividLight,
    Difference,
}

impl BlendMode {
    /// Every mode, in declaration order.
    pub const ALL: [BlendMode; 12] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::SoftLight,
        BlendMode::HardLight,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::LinearDodge,
        BlendMode::LinearBurn,
        BlendMode::VividLight,
        BlendMode::Difference,
    ];

    /// The snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::SoftLight => "soft_light",
            BlendMode::HardLight => "hard_light",
            BlendMode::ColorDodge => "color_dodge",
            BlendMode::ColorBurn => "color_burn",
            BlendMode::LinearDodge => "linear_dodge",
            BlendMode::LinearBurn => "linear_burn",
            BlendMode::VividLight => "vivid_light",
            BlendMode::Difference => "difference",
        }
    }

    /// The raw mode output for one channel, before opacity.
    #[inline]
    pub fn apply(self, base: f32, layer: f32) -> f32 {
        match self {
            BlendMode::Normal => layer,
            BlendMode::Multiply => base * layer,
            BlendMode::Screen => screen(base, layer),
            BlendMode::Overlay => hard_light(layer, base),
            BlendMode::SoftLight => soft_light(base, layer),
            BlendMode::HardLight => hard_light(base, layer),
            BlendMode::ColorDodge => color_dodge(base, layer),
            BlendMode::ColorBurn => color_burn(base, layer),
            BlendMode::LinearDodge => (base + layer).min(1.0),
            BlendMode::LinearBurn => (base + layer - 1.0).max(0.0),
            BlendMode::VividLight => {
                if layer < 0.5 {
                    color_burn(base, 2.0 * layer)
                } else {
                    color_dodge(base, 2.0 * layer - 1.0)
                }
            }
            BlendMode::Difference => (base - layer).abs(),
        }
    }

    /// Blends one channel at `opacity`.
    #[inline]
    pub fn mix(self, base: f32, layer: f32, opacity: f32) -> f32 {
        (base * (1.0 - opacity) + self.apply(base, layer) * opacity).clamp(0.0, 1.0)
    }
}

#[inline(always)]
fn screen(base: f32, layer: f32) -> f32 {
    1.0 - (1.0 - base) * (1.0 - layer)
}

#[inline(always)]
fn hard_light(base: f32, layer: f32) -> f32 {
    if layer < 0.5 {
        2.0 * base * layer
    } else {
        screen(base, 2.0 * layer - 1.0)
    }
}

#[inline]
fn soft_light(base: f32, layer: f32) -> f32 {
    if layer <= 0.5 {
        base - (1.0 - 2.0 * layer) * base * (1.0 - base)
    } else {
        let d = if base <= 0.25 {
            ((16.0 * base - 12.0) * base + 4.0) * base
        } else {
            math::sqrt(base)
        };
        base + (2.0 * layer - 1.0) * (d - base)
    }
}

#[inline]
fn color_dodge(base: f32, layer: f32) -> f32 {
    if layer >= 1.0 - EPSILON {
        1.0
    } else {
        (base / (1.0 - layer)).min(1.0)
    }
}

#[inline]
fn color_burn(base: f32, layer: f32) -> f32 {
    if layer <= EPSILON {
        0.0
    } else {
        (1.0 - (1.0 - base) / layer).max(0.0)
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlendMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "add" {
            return Ok(BlendMode::LinearDodge);
        }
        BlendMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| Error::UnknownSelector {
                kind: "blend mode",
                value: s.to_owned(),
            })
    }
}

/// Everything [`composite_with`] needs besides the two images.
#[derive(Debug, Clone, Copy)]
pub struct CompositeOptions<'a> {
    pub mode: BlendMode,
    /// Global opacity, `[0, 1]`.
    pub opacity: f32,
    /// Channels to blend; the others are copied from the base.
    pub channels: ChannelMask,
    /// Optional per-pixel opacity multiplier.
    pub mask: Option<&'a Plane>,
}

impl Default for CompositeOptions<'_> {
    fn default() -> Self {
        Self {
            mode: BlendMode::Normal,
            opacity: 1.0,
            channels: ChannelMask::ALL,
            mask: None,
        }
    }
}

impl<'a> CompositeOptions<'a> {
    /// Creates options for every channel and no mask.
    pub fn new(mode: BlendMode, opacity: f32) -> Self {
        Self {
            mode,
            opacity,
            ..Self::default()
        }
    }

    /// Restricts blending to `channels`.
    pub fn channels(mut self, channels: ChannelMask) -> Self {
        self.channels = channels;
        self
    }

    /// Scales the opacity per pixel by `mask`.
    pub fn mask(mut self, mask: &'a Plane) -> Self {
        self.mask = Some(mask);
        self
    }
}

/// Composites `layer` onto `base` over every channel.
///
/// ```
/// use xwave_kernels::{BlendMode, Image, composite};
///
/// let gray = Image::from_u8(2, 2, 3, &[128; 12]).unwrap();
/// let result = composite(&gray, &gray, BlendMode::Multiply, 1.0).unwrap();
/// assert_eq!(result.to_u8(), vec![64; 12]);
/// ```
pub fn composite(base: &Image, layer: &Image, mode: BlendMode, opacity: f32) -> Result<Image> {
    composite_with(base, layer, &CompositeOptions::new(mode, opacity))
}

/// Composites `layer` onto `base` with a channel subset and an optional mask.
///
/// Fails before writing anything if the shapes differ or the opacity is
/// outside `[0, 1]`.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(mode = %options.mode, opacity = options.opacity, width = base.width(), height = base.height())
)]
pub fn composite_with(
    base: &Image,
    layer: &Image,
    options: &CompositeOptions<'_>,
) -> Result<Image> {
    base.check_same_shape(layer)?;
    check_range("opacity", options.opacity, 0.0, 1.0)?;
    if let Some(mask) = options.mask {
        base.check_plane(mask)?;
    }

    let (width, _, channels) = base.shape();
    let row_len = width * channels;
    let layer = layer.as_slice();
    let mask = options.mask.map(Plane::as_slice);
    let (mode, opacity, selected) = (options.mode, options.opacity, options.channels);

    let mut output = base.clone();
    for_each_row(output.as_mut_slice(), row_len, |y, row| {
        let top = &layer[y * row_len..(y + 1) * row_len];
        for (x, (pixel, top_pixel)) in row
            .chunks_exact_mut(channels)
            .zip(top.chunks_exact(channels))
            .enumerate()
        {
            let opacity = match mask {
                Some(mask) => opacity * mask[y * width + x],
                None => opacity,
            };
            for (c, (value, &over)) in pixel.iter_mut().zip(top_pixel).enumerate() {
                if selected.contains(c) {
                    *value = mode.mix(*value, over, opacity);
                }
            }
        }
    });

    Ok(output)
}

/// Composites a scalar field, rendered as a gray layer, onto `base`.
pub fn composite_field<F: ScalarField>(
    base: &Image,
    field: &F,
    options: &CompositeOptions<'_>,
) -> Result<Image> {
    let layer = render_layer(field, base.width(), base.height(), base.channels())?;
    composite_with(base, &layer, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn mode_formulas() {
        let (b, l) = (0.25, 0.75);
        assert_eq!(BlendMode::Normal.apply(b, l), 0.75);
        assert!(close(BlendMode::Multiply.apply(b, l), 0.1875));
        assert!(close(BlendMode::Screen.apply(b, l), 0.8125));
        // Base below half: multiply branch.
        assert!(close(BlendMode::Overlay.apply(b, l), 0.375));
        // Layer above half: screen branch.
        assert!(close(BlendMode::HardLight.apply(b, l), 0.625));
        assert!(close(BlendMode::LinearDodge.apply(b, l), 1.0));
        assert!(close(BlendMode::LinearBurn.apply(b, l), 0.0));
        assert!(close(BlendMode::Difference.apply(b, l), 0.5));
        assert!(close(BlendMode::ColorDodge.apply(b, l), 1.0));
        assert!(close(BlendMode::ColorBurn.apply(0.5, 0.5), 0.0));
        assert!(close(BlendMode::ColorBurn.apply(0.75, 0.5), 0.5));
    }

    #[test]
    fn soft_light_branches() {
        // A half layer is neutral.
        assert!(close(BlendMode::SoftLight.apply(0.3, 0.5), 0.3));
        assert!(close(BlendMode::SoftLight.apply(0.5, 0.0), 0.25));
        // Dark base uses the polynomial, light base the square root.
        assert!(close(BlendMode::SoftLight.apply(0.25, 1.0), 0.5));
        assert!(close(BlendMode::SoftLight.apply(0.64, 1.0), 0.8));
    }

    #[test]
    fn dodge_and_burn_limits() {
        assert_eq!(BlendMode::ColorDodge.apply(0.0, 1.0), 1.0);
        assert_eq!(BlendMode::ColorDodge.apply(0.4, 1.0), 1.0);
        assert_eq!(BlendMode::ColorBurn.apply(1.0, 0.0), 0.0);
        assert_eq!(BlendMode::ColorBurn.apply(0.4, 0.0), 0.0);
        assert_eq!(BlendMode::VividLight.apply(0.4, 0.0), 0.0);
        assert_eq!(BlendMode::VividLight.apply(0.4, 1.0), 1.0);
        for mode in BlendMode::ALL {
            for &b in &[0.0, 0.5, 1.0] {
                for &l in &[0.0, 0.5, 1.0] {
                    assert!(mode.apply(b, l).is_finite(), "{mode} at ({b}, {l})");
                }
            }
        }
    }

    #[test]
    fn vivid_light_halves() {
        // Layer 0.75 dodges with 0.5: base / 0.5.
        assert!(close(BlendMode::VividLight.apply(0.3, 0.75), 0.6));
        // Layer 0.25 burns with 0.5: 1 - (1 - base) / 0.5.
        assert!(close(BlendMode::VividLight.apply(0.8, 0.25), 0.6));
    }

    #[test]
    fn names_round_trip() {
        for mode in BlendMode::ALL {
            assert_eq!(mode.to_string().parse::<BlendMode>().unwrap(), mode);
        }
        assert_eq!("add".parse::<BlendMode>().unwrap(), BlendMode::LinearDodge);
        let err = "lighten".parse::<BlendMode>().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidParameter);
    }

    #[test]
    fn channel_subset_and_mask() {
        let base = Image::filled(2, 1, &[0.2, 0.2, 0.2, 0.5]).unwrap();
        let layer = Image::filled(2, 1, &[0.8, 0.8, 0.8, 1.0]).unwrap();
        let mask = Plane::from_raw(2, 1, vec![1.0, 0.0]).unwrap();
        let options = CompositeOptions::new(BlendMode::Normal, 1.0)
            .channels(ChannelMask::COLOR)
            .mask(&mask);
        let out = composite_with(&base, &layer, &options).unwrap();
        assert_eq!(out.pixel(0, 0), &[0.8, 0.8, 0.8, 0.5]);
        assert_eq!(out.pixel(1, 0), &[0.2, 0.2, 0.2, 0.5]);
    }

    #[test]
    fn rejects_bad_input() {
        let a = Image::new(2, 2, 3).unwrap();
        let b = Image::new(2, 3, 3).unwrap();
        let c = Image::new(2, 2, 4).unwrap();
        assert_eq!(
            composite(&a, &b, BlendMode::Normal, 1.0).unwrap_err().kind(),
            crate::ErrorKind::InvalidDimension
        );
        assert!(composite(&a, &c, BlendMode::Normal, 1.0).is_err());
        assert!(composite(&a, &a, BlendMode::Normal, 1.5).is_err());
        assert!(composite(&a, &a, BlendMode::Normal, f32::NAN).is_err());

        let mask = Plane::new(3, 2).unwrap();
        let options = CompositeOptions::default().mask(&mask);
        assert!(composite_with(&a, &a, &options).is_err());
    }

    #[test]
    fn field_as_layer() {
        struct Constant(f32);
        impl ScalarField for Constant {
            fn value(&self, _: u32, _: u32) -> f32 {
                self.0
            }
        }
        let base = Image::filled(3, 3, &[0.5, 0.5, 0.5]).unwrap();
        let out = composite_field(
            &base,
            &Constant(0.5),
            &CompositeOptions::new(BlendMode::Multiply, 1.0),
        )
        .unwrap();
        assert!(out.as_slice().iter().all(|&v| close(v, 0.25)));
    }
}
