//! Renders every kernel to `target/test_output` for visual inspection.

use std::path::{Path, PathBuf};
use xwave_kernels::{
    BlendMode, CellNoise, CellularConfig, ColorModel, DitherAlgorithm, DitherOptions,
    FractalConfig, GaussianNoise, Image, Layout, NoiseKind, Plane, cellular, noise, posterize,
    quantize, quantize_image,
};

const WIDTH: usize = 256;
const HEIGHT: usize = 128;

fn output_path(name: &str) -> PathBuf {
    let dir = PathBuf::from("target/test_output");
    std::fs::create_dir_all(&dir).ok();
    dir.join(format!("{name}.png"))
}

fn save_image(path: &Path, image: &Image) -> Result<(), Box<dyn std::error::Error>> {
    let color_type = match image.channels() {
        3 => ::image::ColorType::Rgb8,
        _ => ::image::ColorType::Rgba8,
    };
    ::image::save_buffer(
        path,
        &image.to_u8(),
        image.width() as u32,
        image.height() as u32,
        color_type,
    )?;
    Ok(())
}

fn save_plane(path: &Path, plane: &Plane) -> Result<(), Box<dyn std::error::Error>> {
    ::image::save_buffer(
        path,
        &plane.to_u8(),
        plane.width() as u32,
        plane.height() as u32,
        ::image::ColorType::L8,
    )?;
    Ok(())
}

fn gradient_image() -> Image {
    let mut data = Vec::with_capacity(WIDTH * HEIGHT * 3);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let fx = x as f32 / (WIDTH - 1) as f32;
            let fy = y as f32 / (HEIGHT - 1) as f32;
            data.extend_from_slice(&[fx, fy, (fx * fy).sqrt()]);
        }
    }
    Image::from_raw(WIDTH, HEIGHT, 3, data).unwrap()
}

fn check_written(path: &Path, channels: u8) {
    let loaded = ::image::open(path).unwrap();
    assert_eq!(loaded.width() as usize, WIDTH);
    assert_eq!(loaded.height() as usize, HEIGHT);
    assert_eq!(loaded.color().channel_count(), channels);
}

#[test]
fn test_render_noise_planes() {
    let kinds = [
        ("noise_uniform", NoiseKind::Uniform),
        (
            "noise_fractal",
            NoiseKind::Fractal(FractalConfig::default().scale(48.0).octaves(4)),
        ),
    ];
    for (name, kind) in kinds {
        let plane = noise::generate(&kind, WIDTH, HEIGHT, 11).unwrap().output;
        let path = output_path(name);
        save_plane(&path, &plane).unwrap();
        check_written(&path, 1);

        let dithered = quantize(&plane, 2, DitherAlgorithm::FloydSteinberg).unwrap();
        let path = output_path(&format!("{name}_dithered"));
        save_plane(&path, &dithered).unwrap();
        check_written(&path, 1);
    }
}

#[test]
fn test_render_cellular() {
    let base = gradient_image();
    let configs = [
        ("cellular_grid_rgb", CellularConfig::default().circle_size(32)),
        (
            "cellular_hex_gaussian",
            CellularConfig::default()
                .circle_size(24)
                .layout(Layout::Hex)
                .antialias(true)
                .noise(CellNoise::Gaussian(GaussianNoise::default())),
        ),
        (
            "cellular_hex_palette",
            CellularConfig::default()
                .circle_size(16)
                .layout(Layout::Hex)
                .amounts(1.0, 0.0)
                .noise(CellNoise::palette(vec![[255, 0, 128], [0, 255, 200], [20, 20, 20]]).unwrap()),
        ),
    ];
    for (name, config) in configs {
        let result = cellular::apply(&base, &config, BlendMode::Screen, 0.9, 5).unwrap();
        let path = output_path(name);
        save_image(&path, &result.output).unwrap();
        check_written(&path, 3);
    }
}

#[test]
fn test_render_posterize() {
    let base = gradient_image();
    for model in [ColorModel::Rgb, ColorModel::Hsv, ColorModel::Lab] {
        for algorithm in [DitherAlgorithm::Atkinson, DitherAlgorithm::Ordered] {
            let result = posterize(&base, 4, algorithm, model).unwrap();
            let path = output_path(&format!("posterize_{model}_{algorithm}"));
            save_image(&path, &result).unwrap();
            check_written(&path, 3);
        }
    }

    let gray = quantize_image(
        &base,
        &DitherOptions::new(2, DitherAlgorithm::FloydSteinberg)
            .joint_luminance(true)
            .serpentine(true),
    )
    .unwrap();
    let path = output_path("luma_floyd_steinberg");
    save_image(&path, &gray).unwrap();
    check_written(&path, 3);
}
