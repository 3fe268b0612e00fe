//! Test fixtures: small PNG images built in memory.

use png::{BitDepth, ColorType, Encoder};

/// Encode 8-bit pixel data as PNG
pub fn encode(width: u32, height: u32, color: ColorType, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header().expect("PNG header");
        writer.write_image_data(data).expect("PNG data");
    }
    out
}

/// Single-color RGB image
pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let data: Vec<u8> = (0..width * height).flat_map(|_| rgb).collect();
    encode(width, height, ColorType::Rgb, &data)
}

/// Black and white checkerboard, black at the origin
pub fn checker(size: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let v = if (x + y) % 2 == 0 { 0 } else { 255 };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    encode(size, size, ColorType::Rgba, &data)
}

/// Vertical stripes, one column per color, `height` rows tall
pub fn stripes(colors: &[[u8; 3]], height: u32) -> Vec<u8> {
    let width = colors.len() as u32;
    let data: Vec<u8> = (0..height)
        .flat_map(|_| colors.iter().flat_map(|c| *c))
        .collect();
    encode(width, height, ColorType::Rgb, &data)
}

/// Horizontal grayscale ramp, one gray level per column
pub fn gray_ramp(width: u32, height: u32) -> Vec<u8> {
    let data: Vec<u8> = (0..height)
        .flat_map(|_| (0..width).map(move |x| (x * 255 / width.max(2).saturating_sub(1)) as u8))
        .collect();
    encode(width, height, ColorType::Grayscale, &data)
}

/// Primary and secondary colors
pub const RAINBOW: [[u8; 3]; 6] = [
    [255, 0, 0],
    [255, 255, 0],
    [0, 255, 0],
    [0, 255, 255],
    [0, 0, 255],
    [255, 0, 255],
];
