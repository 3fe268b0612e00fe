//! Uniform quantization: K colors evenly spaced across the color bounds.

use super::CountAdjusted;
use crate::color::Rgb;

/// Per-channel minimum and maximum over `colors`.
fn channel_bounds(colors: &[Rgb]) -> (Rgb, Rgb) {
    let mut min = Rgb::new(f32::MAX, f32::MAX, f32::MAX);
    let mut max = Rgb::new(f32::MIN, f32::MIN, f32::MIN);
    for c in colors {
        min.r = min.r.min(c.r);
        min.g = min.g.min(c.g);
        min.b = min.b.min(c.b);
        max.r = max.r.max(c.r);
        max.g = max.g.max(c.g);
        max.b = max.b.max(c.b);
    }
    (min, max)
}

#[inline]
fn lerp_channel(min: f32, max: f32, i: usize, k: usize) -> f32 {
    // Endpoints are pinned so they equal the observed bounds bit for bit.
    if i + 1 == k {
        max
    } else {
        min + i as f32 * (max - min) / (k - 1) as f32
    }
}

/// Produce `k` colors linearly interpolated between the per-channel bounds.
///
/// When there are fewer unique colors than `k`, the unique colors are
/// returned unchanged together with a [`CountAdjusted`] notice. Channels are
/// interpolated independently, so intermediate entries are synthetic.
/// `k == 1` yields the per-channel minimum.
pub fn interpolate(unique: &[Rgb], k: usize) -> (Vec<Rgb>, Option<CountAdjusted>) {
    if unique.len() < k {
        let actual_k = unique.len();
        let adjustment = CountAdjusted {
            requested_k: k,
            actual_k,
            message: format!(
                "Image has only {} distinct colors; palette reduced from {} to {}",
                actual_k, k, actual_k
            ),
        };
        return (unique.to_vec(), Some(adjustment));
    }

    let (min, max) = channel_bounds(unique);
    if k <= 1 {
        return (vec![min], None);
    }

    let colors = (0..k)
        .map(|i| {
            Rgb::new(
                lerp_channel(min.r, max.r, i, k),
                lerp_channel(min.g, max.g, i, k),
                lerp_channel(min.b, max.b, i, k),
            )
        })
        .collect();
    (colors, None)
}
