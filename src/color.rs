//! Colour-space conversion between sRGB, HSV and CIE L\*a\*b\*.
//!
//! RGB components are normalized to `[0, 1]`. HSV hue is in degrees
//! `[0, 360)`, saturation and value in `[0, 1]`. Lab uses the D65 white point
//! with L\* in `[0, 100]` and a\*/b\* roughly in `[-128, 127]`.
//!
//! Conversions compute in `f64` internally so that RGB → HSV → RGB and
//! RGB → Lab → RGB round-trip well within 1/255 per channel.

use crate::{
    error::{Error, Result},
    image::{Image, for_each_row},
    math,
};
use core::{fmt, str::FromStr};

/// Normalized sRGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Hue (degrees), saturation, value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// CIE L\*a\*b\* relative to D65.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Rgb {
    /// Creates a colour from normalized channels.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Reads the first three samples of a pixel.
    pub fn from_slice(pixel: &[f32]) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }

    /// The channels as `[r, g, b]`.
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Converts to HSV.
    pub fn to_hsv(self) -> Hsv {
        to_hsv(self)
    }

    /// Converts to CIE Lab.
    pub fn to_lab(self) -> Lab {
        to_lab(self)
    }
}

impl From<[f32; 3]> for Rgb {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl Hsv {
    /// Creates a colour; hue is in degrees.
    pub const fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }

    /// Converts back to RGB.
    pub fn to_rgb(self) -> Rgb {
        to_rgb(self)
    }
}

impl Lab {
    /// Creates a colour from `L`, `a` and `b`.
    pub const fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Converts back to RGB.
    pub fn to_rgb(self) -> Rgb {
        to_rgb_from_lab(self)
    }
}

/// RGB → HSV. Hue is `0` when the colour has no chroma.
pub fn to_hsv(rgb: Rgb) -> Hsv {
    let (r, g, b) = (rgb.r as f64, rgb.g as f64, rgb.b as f64);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;

    let s = if max > 0.0 { chroma / max } else { 0.0 };
    if chroma <= 0.0 {
        return Hsv::new(0.0, s as f32, max as f32);
    }

    let sector = if max == r {
        ((g - b) / chroma).rem_euclid(6.0)
    } else if max == g {
        (b - r) / chroma + 2.0
    } else {
        (r - g) / chroma + 4.0
    };

    let mut h = (sector * 60.0) as f32;
    if h >= 360.0 {
        h -= 360.0;
    }
    Hsv::new(h.max(0.0), s as f32, max as f32)
}

/// HSV → RGB. Hue is taken modulo 360.
pub fn to_rgb(hsv: Hsv) -> Rgb {
    let h = (hsv.h as f64).rem_euclid(360.0) / 60.0;
    let s = (hsv.s as f64).clamp(0.0, 1.0);
    let v = (hsv.v as f64).clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb::new((r + m) as f32, (g + m) as f32, (b + m) as f32)
}

// D65 reference white.
const WHITE: [f64; 3] = [0.950_47, 1.0, 1.088_83];

const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.412_456_4, 0.357_576_1, 0.180_437_5],
    [0.212_672_9, 0.715_152_2, 0.072_175_0],
    [0.019_333_9, 0.119_192_0, 0.950_304_1],
];

const XYZ_TO_RGB: [[f64; 3]; 3] = [
    [3.240_454_2, -1.537_138_5, -0.498_531_4],
    [-0.969_266_0, 1.876_010_8, 0.041_556_0],
    [0.055_643_4, -0.204_025_9, 1.057_225_2],
];

// δ = 6/29
const DELTA: f64 = 6.0 / 29.0;

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        math::powf64((c + 0.055) / 1.055, 2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * math::powf64(c, 1.0 / 2.4) - 0.055
    }
}

fn lab_f(t: f64) -> f64 {
    if t > DELTA * DELTA * DELTA {
        math::cbrt64(t)
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

fn lab_f_inv(t: f64) -> f64 {
    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

fn mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// sRGB → linear light → XYZ → Lab (D65).
pub fn to_lab(rgb: Rgb) -> Lab {
    let linear = [
        srgb_to_linear((rgb.r as f64).clamp(0.0, 1.0)),
        srgb_to_linear((rgb.g as f64).clamp(0.0, 1.0)),
        srgb_to_linear((rgb.b as f64).clamp(0.0, 1.0)),
    ];
    let xyz = mul(&RGB_TO_XYZ, linear);

    let fx = lab_f(xyz[0] / WHITE[0]);
    let fy = lab_f(xyz[1] / WHITE[1]);
    let fz = lab_f(xyz[2] / WHITE[2]);

    Lab::new(
        (116.0 * fy - 16.0) as f32,
        (500.0 * (fx - fy)) as f32,
        (200.0 * (fy - fz)) as f32,
    )
}

/// Lab (D65) → XYZ → linear light → sRGB, clamped into gamut.
pub fn to_rgb_from_lab(lab: Lab) -> Rgb {
    let fy = (lab.l as f64 + 16.0) / 116.0;
    let fx = fy + lab.a as f64 / 500.0;
    let fz = fy - lab.b as f64 / 200.0;

    let xyz = [
        WHITE[0] * lab_f_inv(fx),
        WHITE[1] * lab_f_inv(fy),
        WHITE[2] * lab_f_inv(fz),
    ];
    let [r, g, b] = mul(&XYZ_TO_RGB, xyz);

    let encode = |c: f64| linear_to_srgb(c.clamp(0.0, 1.0)).clamp(0.0, 1.0) as f32;
    Rgb::new(encode(r), encode(g), encode(b))
}

/// Rec. 709 luma of a (gamma-encoded) RGB triple.
#[inline]
pub fn luminance(rgb: Rgb) -> f32 {
    0.2126 * rgb.r + 0.7152 * rgb.g + 0.0722 * rgb.b
}

/// The colour model an effect operates in.
///
/// [`ColorModel::encode`] maps each model onto three channels in `[0, 1]` so
/// that the result can be stored in an [`Image`] and fed to the ditherer or
/// compositor; [`ColorModel::decode`] undoes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ColorModel {
    #[default]
    Rgb,
    Hsv,
    Lab,
}

impl ColorModel {
    /// Encodes `rgb` as three normalized channels of this model.
    pub fn encode(self, rgb: Rgb) -> [f32; 3] {
        match self {
            ColorModel::Rgb => rgb.to_array(),
            ColorModel::Hsv => {
                let hsv = to_hsv(rgb);
                [hsv.h / 360.0, hsv.s, hsv.v]
            }
            ColorModel::Lab => {
                let lab = to_lab(rgb);
                [
                    lab.l / 100.0,
                    (lab.a + 128.0) / 255.0,
                    (lab.b + 128.0) / 255.0,
                ]
            }
        }
    }

    /// Inverse of [`Self::encode`].
    pub fn decode(self, [c0, c1, c2]: [f32; 3]) -> Rgb {
        match self {
            ColorModel::Rgb => Rgb::new(c0, c1, c2),
            ColorModel::Hsv => to_rgb(Hsv::new(c0 * 360.0, c1, c2)),
            ColorModel::Lab => to_rgb_from_lab(Lab::new(
                c0 * 100.0,
                c1 * 255.0 - 128.0,
                c2 * 255.0 - 128.0,
            )),
        }
    }

    /// The snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            ColorModel::Rgb => "rgb",
            ColorModel::Hsv => "hsv",
            ColorModel::Lab => "lab",
        }
    }
}

impl fmt::Display for ColorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rgb" => Ok(ColorModel::Rgb),
            "hsv" => Ok(ColorModel::Hsv),
            "lab" => Ok(ColorModel::Lab),
            _ => Err(Error::UnknownSelector {
                kind: "color model",
                value: s.to_owned(),
            }),
        }
    }
}

fn map_pixels(image: &Image, f: impl Fn(Rgb) -> [f32; 3] + Sync + Send) -> Image {
    let mut output = image.clone();
    let channels = image.channels();
    let row_len = image.width() * channels;
    for_each_row(output.as_mut_slice(), row_len, |_, row| {
        for pixel in row.chunks_exact_mut(channels) {
            let mapped = f(Rgb::from_slice(pixel));
            for (dst, src) in pixel.iter_mut().zip(mapped) {
                *dst = src.clamp(0.0, 1.0);
            }
        }
    });
    output
}

/// Re-encodes the colour channels of an RGB image in `model`; alpha passes
/// through.
#[tracing::instrument(level = "debug", skip(image), fields(width = image.width(), height = image.height()))]
pub fn convert_image(image: &Image, model: ColorModel) -> Image {
    if model == ColorModel::Rgb {
        return image.clone();
    }
    map_pixels(image, |rgb| model.encode(rgb))
}

/// Inverse of [`convert_image`].
#[tracing::instrument(level = "debug", skip(image), fields(width = image.width(), height = image.height()))]
pub fn restore_image(image: &Image, model: ColorModel) -> Image {
    if model == ColorModel::Rgb {
        return image.clone();
    }
    map_pixels(image, |encoded| model.decode(encoded.to_array()).to_array())
}
