//! Grid sampling of decoded RGBA buffers.
//!
//! Large images are reduced to at most roughly [`MAX_SAMPLES`] pixels by
//! taking every `step`-th pixel in both directions, where
//! `step = ceil(sqrt(width * height / max_samples))`. The alpha channel is
//! ignored.

use std::collections::HashSet;

use crate::color::Rgb;
use crate::palette::QuantizeError;

/// Default upper bound on the number of sampled pixels.
pub const MAX_SAMPLES: usize = 10_000;

/// Sampling stride for an image of the given size.
///
/// Always at least 1.
///
/// # Example
///
/// ```
/// use color_tones::sampler::sampling_step;
///
/// assert_eq!(sampling_step(100, 100, 10_000), 1);
/// assert_eq!(sampling_step(1000, 1000, 10_000), 10);
/// ```
pub fn sampling_step(width: usize, height: usize, max_samples: usize) -> usize {
    let ratio = (width as f64 * height as f64) / max_samples.max(1) as f64;
    (ratio.sqrt().ceil() as usize).max(1)
}

/// Colors sampled on a regular grid, in row-major grid order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    colors: Vec<Rgb>,
    columns: usize,
    rows: usize,
    step: usize,
}

impl SampleGrid {
    /// Sampled colors, row-major.
    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Number of sampled cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Cells per grid row.
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Grid rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Pixel stride used in both directions.
    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Distinct colors in order of first discovery.
    pub fn unique_colors(&self) -> Vec<Rgb> {
        let mut seen = HashSet::with_capacity(self.colors.len());
        self.colors
            .iter()
            .copied()
            .filter(|c| seen.insert(c.key()))
            .collect()
    }
}

/// Extracts a bounded grid sample from an RGBA8 buffer.
#[derive(Debug, Clone, Copy)]
pub struct PixelSampler {
    max_samples: usize,
}

impl PixelSampler {
    /// Create a sampler targeting at most about `max_samples` pixels.
    pub fn new(max_samples: usize) -> Self {
        Self {
            max_samples: max_samples.max(1),
        }
    }

    /// Sample `rgba` (4 bytes per pixel, row-major).
    ///
    /// # Errors
    ///
    /// Returns [`QuantizeError::InvalidImage`] if either dimension is zero or
    /// the buffer length is not `width * height * 4`.
    pub fn sample(
        &self,
        rgba: &[u8],
        width: usize,
        height: usize,
    ) -> Result<SampleGrid, QuantizeError> {
        if width == 0 || height == 0 {
            return Err(QuantizeError::invalid_image(format!(
                "empty dimensions {}x{}",
                width, height
            )));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                QuantizeError::invalid_image(format!("dimensions {}x{} overflow", width, height))
            })?;
        if rgba.len() != expected {
            return Err(QuantizeError::invalid_image(format!(
                "buffer has {} bytes, expected {} for {}x{} RGBA",
                rgba.len(),
                expected,
                width,
                height
            )));
        }

        let step = sampling_step(width, height, self.max_samples);
        let columns = width.div_ceil(step);
        let rows = height.div_ceil(step);

        let mut colors = Vec::with_capacity(columns * rows);
        for y in (0..height).step_by(step) {
            let row = y * width;
            for x in (0..width).step_by(step) {
                let offset = (row + x) * 4;
                colors.push(Rgb::from_u8(
                    rgba[offset],
                    rgba[offset + 1],
                    rgba[offset + 2],
                ));
            }
        }

        Ok(SampleGrid {
            colors,
            columns,
            rows,
            step,
        })
    }
}

impl Default for PixelSampler {
    fn default() -> Self {
        Self::new(MAX_SAMPLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, rgba: [u8; 4]) -> Vec<u8> {
        rgba.repeat(width * height)
    }

    #[test]
    fn test_step_small_image_is_one() {
        assert_eq!(sampling_step(1, 1, MAX_SAMPLES), 1);
        assert_eq!(sampling_step(50, 50, MAX_SAMPLES), 1);
    }

    #[test]
    fn test_step_rounds_up() {
        // 200*100 / 10000 = 2 -> sqrt = 1.41 -> 2
        assert_eq!(sampling_step(200, 100, MAX_SAMPLES), 2);
        // 4000*3000 / 10000 = 1200 -> sqrt = 34.6 -> 35
        assert_eq!(sampling_step(4000, 3000, MAX_SAMPLES), 35);
    }

    #[test]
    fn test_sample_bounds_count() {
        let sampler = PixelSampler::default();
        let grid = sampler.sample(&solid(640, 480, [1, 2, 3, 255]), 640, 480).unwrap();
        assert!(grid.len() <= MAX_SAMPLES, "sampled {}", grid.len());
        assert_eq!(grid.len(), grid.columns() * grid.rows());
        assert_eq!(grid.step(), 6);
    }

    #[test]
    fn test_sample_row_major_order() {
        // 2x2 image: red, green / blue, white
        let rgba = [
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ];
        let grid = PixelSampler::default().sample(&rgba, 2, 2).unwrap();
        assert_eq!(
            grid.colors(),
            &[
                Rgb::from_u8(255, 0, 0),
                Rgb::from_u8(0, 255, 0),
                Rgb::from_u8(0, 0, 255),
                Rgb::from_u8(255, 255, 255),
            ]
        );
    }

    #[test]
    fn test_sample_ignores_alpha() {
        let rgba = [10, 20, 30, 0, 10, 20, 30, 255];
        let grid = PixelSampler::default().sample(&rgba, 2, 1).unwrap();
        assert_eq!(grid.unique_colors().len(), 1);
    }

    #[test]
    fn test_sample_with_stride_picks_grid_pixels() {
        // 4x1 image, max 1 sample per 2 pixels -> step 2 -> pixels 0 and 2
        let rgba = [
            1, 0, 0, 255, 2, 0, 0, 255, 3, 0, 0, 255, 4, 0, 0, 255,
        ];
        let grid = PixelSampler::new(2).sample(&rgba, 4, 1).unwrap();
        assert_eq!(grid.step(), 2);
        assert_eq!(
            grid.colors(),
            &[Rgb::from_u8(1, 0, 0), Rgb::from_u8(3, 0, 0)]
        );
    }

    #[test]
    fn test_unique_colors_keep_discovery_order() {
        let rgba = [
            9, 9, 9, 255, 1, 1, 1, 255, 9, 9, 9, 255, 5, 5, 5, 255,
        ];
        let grid = PixelSampler::default().sample(&rgba, 4, 1).unwrap();
        assert_eq!(
            grid.unique_colors(),
            vec![
                Rgb::from_u8(9, 9, 9),
                Rgb::from_u8(1, 1, 1),
                Rgb::from_u8(5, 5, 5),
            ]
        );
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let result = PixelSampler::default().sample(&[], 0, 10);
        assert!(matches!(result, Err(QuantizeError::InvalidImage { .. })));
    }

    #[test]
    fn test_short_buffer_rejected() {
        let result = PixelSampler::default().sample(&[0, 0, 0, 255], 2, 2);
        assert!(matches!(result, Err(QuantizeError::InvalidImage { .. })));
    }
}
