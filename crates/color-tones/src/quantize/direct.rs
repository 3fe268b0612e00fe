//! Direct mapping: every unique color is a tone.

use crate::color::Rgb;

/// Unique colors ordered by ascending hue.
///
/// The sort is stable, so colors with equal hue (including all greys, whose
/// hue is 0) keep their discovery order.
pub fn sort_by_hue(unique: &[Rgb]) -> Vec<Rgb> {
    let mut colors = unique.to_vec();
    colors.sort_by(|a, b| a.hue().total_cmp(&b.hue()));
    colors
}
