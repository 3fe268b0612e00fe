//! PNG decode/encode at the edges of the tone engine.
//!
//! Decoding normalizes every PNG flavor (palette, grayscale, 16-bit) to
//! 8-bit RGBA rows, which is what the quantizer consumes.

use std::io::Cursor;

use crate::error::EngineError;

/// Decoded image, 4 bytes per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

/// Decode PNG bytes to RGBA8.
pub fn decode_png(bytes: &[u8]) -> Result<DecodedImage, EngineError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| EngineError::Decode(e.to_string()))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| EngineError::Decode(e.to_string()))?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != png::BitDepth::Eight {
        return Err(EngineError::Decode(format!(
            "unsupported bit depth {:?}",
            info.bit_depth
        )));
    }

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Indexed => {
            return Err(EngineError::Decode(
                "indexed PNG was not expanded".to_string(),
            ))
        }
    };

    Ok(DecodedImage {
        width: info.width as usize,
        height: info.height as usize,
        rgba,
    })
}

/// Encode an RGBA8 buffer as PNG.
pub fn encode_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, EngineError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder
            .write_header()
            .map_err(|e| EngineError::Encode(e.to_string()))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| EngineError::Encode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn test_rgba_round_trip() {
        let rgba = vec![255, 0, 0, 255, 0, 255, 0, 128, 0, 0, 255, 0, 9, 9, 9, 255];
        let png = encode_rgba(2, 2, &rgba).unwrap();
        let decoded = decode_png(&png).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 2));
        assert_eq!(decoded.rgba, rgba);
    }

    #[test]
    fn test_rgb_gets_opaque_alpha() {
        let png = encode(2, 1, png::ColorType::Rgb, &[1, 2, 3, 4, 5, 6]);
        let decoded = decode_png(&png).unwrap();
        assert_eq!(decoded.rgba, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn test_grayscale_expands() {
        let png = encode(3, 1, png::ColorType::Grayscale, &[0, 128, 255]);
        let decoded = decode_png(&png).unwrap();
        assert_eq!(
            decoded.rgba,
            vec![0, 0, 0, 255, 128, 128, 128, 255, 255, 255, 255, 255]
        );
    }

    #[test]
    fn test_grayscale_alpha_expands() {
        let png = encode(1, 1, png::ColorType::GrayscaleAlpha, &[77, 10]);
        assert_eq!(decode_png(&png).unwrap().rgba, vec![77, 77, 77, 10]);
    }

    #[test]
    fn test_indexed_is_expanded() {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 2, 1);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_palette(vec![10, 20, 30, 200, 210, 220]);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[1, 0]).unwrap();
        }
        let decoded = decode_png(&out).unwrap();
        assert_eq!(decoded.rgba, vec![200, 210, 220, 255, 10, 20, 30, 255]);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode_png(b"definitely not a png").unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[test]
    fn test_encode_wrong_length_is_error() {
        let err = encode_rgba(2, 2, &[0; 3]).unwrap_err();
        assert!(matches!(err, EngineError::Encode(_)));
    }
}
