//! Posterizes a colour gradient with every dither algorithm and colour model
//! and stacks the results into one image.
//!
//! ```text
//! cargo run --example posterize_gradient -- [output.png] [levels]
//! ```

use image::{ImageBuffer, Rgb};
use xwave_kernels::{ColorModel, DitherAlgorithm, Image, posterize};

const WIDTH: usize = 768;
const BAND: usize = 32;

fn gradient() -> Result<Image, xwave_kernels::Error> {
    let mut data = Vec::with_capacity(WIDTH * BAND * 3);
    for y in 0..BAND {
        for x in 0..WIDTH {
            let t = x as f32 / (WIDTH - 1) as f32;
            let s = y as f32 / (BAND - 1) as f32;
            data.extend_from_slice(&[t, 0.5 * (1.0 - t) + 0.25 * s, 1.0 - t * t]);
        }
    }
    Image::from_raw(WIDTH, BAND, 3, data)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "posterize.png".to_owned());
    let levels: u32 = args.next().map(|s| s.parse::<u32>()).transpose()?.unwrap_or(4);

    let source = gradient()?;
    let mut bytes = source.to_u8();
    for model in [ColorModel::Rgb, ColorModel::Hsv, ColorModel::Lab] {
        for algorithm in DitherAlgorithm::ALL {
            let band = posterize(&source, levels, algorithm, model)?;
            bytes.extend(band.to_u8());
        }
    }

    let height = bytes.len() / (WIDTH * 3);
    let buffer: ImageBuffer<Rgb<u8>, _> =
        ImageBuffer::from_raw(WIDTH as u32, height as u32, bytes).ok_or("buffer size mismatch")?;
    buffer.save(&output)?;

    println!("wrote {output}: source, then rgb/hsv/lab × none/floyd_steinberg/atkinson/ordered");
    Ok(())
}
