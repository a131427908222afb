//! Colour-level reduction in a chosen colour model.

use crate::{
    color::{ColorModel, convert_image, restore_image},
    dither::{DitherAlgorithm, DitherOptions, quantize_image},
    error::Result,
    image::{ChannelMask, Image},
};

/// Reduces every colour channel of `image` to `levels` values.
///
/// The image is encoded in `model`, its three model channels are quantized
/// with `algorithm`, and the result is decoded back to RGB. Alpha passes
/// through unchanged.
///
/// ```
/// use xwave_kernels::{ColorModel, DitherAlgorithm, Image, posterize};
///
/// let image = Image::from_u8(1, 1, 3, &[30, 140, 220]).unwrap();
/// let out = posterize(&image, 2, DitherAlgorithm::None, ColorModel::Rgb).unwrap();
/// assert_eq!(out.to_u8(), vec![0, 255, 255]);
/// ```
#[tracing::instrument(level = "debug", skip(image), fields(width = image.width(), height = image.height()))]
pub fn posterize(
    image: &Image,
    levels: u32,
    algorithm: DitherAlgorithm,
    model: ColorModel,
) -> Result<Image> {
    let options = DitherOptions::new(levels, algorithm).channels(ChannelMask::COLOR);
    options.validate()?;

    if model == ColorModel::Rgb {
        return quantize_image(image, &options);
    }
    let encoded = convert_image(image, model);
    let quantized = quantize_image(&encoded, &options)?;
    Ok(restore_image(&quantized, model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_levels() {
        let image = Image::from_u8(2, 1, 4, &[10, 100, 200, 77, 250, 130, 60, 77]).unwrap();
        let out = posterize(&image, 3, DitherAlgorithm::None, ColorModel::Rgb).unwrap();
        assert_eq!(out.to_u8(), vec![0, 128, 255, 77, 255, 128, 0, 77]);
    }

    #[test]
    fn hsv_keeps_grays_gray() {
        let image = Image::from_u8(1, 1, 3, &[90, 90, 90]).unwrap();
        let out = posterize(&image, 4, DitherAlgorithm::None, ColorModel::Hsv).unwrap();
        let p = out.pixel(0, 0);
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
        // Value 90/255 rounds to the 1/3 level.
        assert!((p[0] - 1.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn lab_output_is_valid() {
        let bytes: Vec<u8> = (0..64u8).flat_map(|i| [i * 4, 255 - i * 4, i * 2]).collect();
        let image = Image::from_u8(8, 8, 3, &bytes).unwrap();
        for algorithm in DitherAlgorithm::ALL {
            let out = posterize(&image, 6, algorithm, ColorModel::Lab).unwrap();
            assert_eq!(out.shape(), image.shape());
            assert!(out.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn invalid_levels() {
        let image = Image::new(2, 2, 3).unwrap();
        assert!(posterize(&image, 1, DitherAlgorithm::None, ColorModel::Hsv).is_err());
        assert!(posterize(&image, 300, DitherAlgorithm::Ordered, ColorModel::Rgb).is_err());
    }
}
