//! Renders a hexagonal cellular noise pattern over fractal noise.
//!
//! ```text
//! cargo run --example cellular_png -- [output.png] [seed]
//! ```

use image::{ImageBuffer, Rgb};
use xwave_kernels::{
    BlendMode, CellNoise, CellularConfig, Falloff, FractalConfig, Image, Layout, NoiseKind,
    cellular, noise,
};

const WIDTH: usize = 512;
const HEIGHT: usize = 256;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "cellular.png".to_owned());
    let seed: u32 = args.next().map(|s| s.parse::<u32>()).transpose()?.unwrap_or(0);

    // Fractal noise as a tinted base layer.
    let base = noise::generate(
        &NoiseKind::Fractal(FractalConfig::default().scale(64.0).octaves(5)),
        WIDTH,
        HEIGHT,
        seed,
    )?;
    let tinted: Vec<f32> = base
        .output
        .as_slice()
        .iter()
        .flat_map(|&v| [v * 0.3, v * 0.5, v])
        .collect();
    let base_image = Image::from_raw(WIDTH, HEIGHT, 3, tinted)?;

    let config = CellularConfig::default()
        .circle_size(28)
        .layout(Layout::Hex)
        .falloff(Falloff::Radial)
        .reverse_gradient(true)
        .antialias(true)
        .noise(CellNoise::palette(vec![
            [255, 64, 129],
            [0, 229, 255],
            [255, 234, 0],
        ])?);
    let result = cellular::apply(&base_image, &config, BlendMode::Screen, 0.85, base.seed)?;

    let buffer: ImageBuffer<Rgb<u8>, _> =
        ImageBuffer::from_raw(WIDTH as u32, HEIGHT as u32, result.output.to_u8())
            .ok_or("buffer size mismatch")?;
    buffer.save(&output)?;

    println!("wrote {output} (seed {})", result.seed);
    Ok(())
}
