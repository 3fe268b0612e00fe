//! Palette derivation strategies.
//!
//! Three strategies turn a set of unique sampled colors into a palette:
//!
//! | Method | Palette size | Entries drawn from input? |
//! |--------|--------------|---------------------------|
//! | [`Direct`](QuantizeMethod::Direct) | unique count (K ignored) | yes, sorted by hue |
//! | [`Uniform`](QuantizeMethod::Uniform) | `min(K, unique)` | only when unique < K |
//! | [`KMeans`](QuantizeMethod::KMeans) | exactly K | no, centroids |
//!
//! Direct deliberately ignores K and can exceed [`MAX_K`] entries.

mod direct;
mod kmeans;
mod uniform;

use std::fmt;
use std::str::FromStr;

use crate::color::Rgb;
use crate::palette::{ParseMethodError, QuantizeError};

pub use direct::sort_by_hue;
pub use kmeans::{cluster, KMeansResult, MAX_ITERATIONS};
pub use uniform::interpolate;

/// Smallest accepted palette size.
pub const MIN_K: usize = 1;
/// Largest accepted palette size for the K-bounded strategies.
pub const MAX_K: usize = 256;

/// Clamp a requested palette size into `MIN_K..=MAX_K`.
///
/// Accepts signed input so out-of-range requests from external surfaces
/// (including negative values) are clamped rather than rejected.
#[inline]
pub fn clamp_k(k: i64) -> usize {
    k.clamp(MIN_K as i64, MAX_K as i64) as usize
}

/// Strategy for deriving the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantizeMethod {
    /// Every unique color becomes a tone, ordered by hue
    Direct,
    /// K colors evenly spaced between per-channel min and max
    Uniform,
    /// K centroids from Lloyd's algorithm
    #[default]
    KMeans,
}

impl QuantizeMethod {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            QuantizeMethod::Direct => "direct",
            QuantizeMethod::Uniform => "uniform",
            QuantizeMethod::KMeans => "kmeans",
        }
    }
}

impl fmt::Display for QuantizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantizeMethod {
    type Err = ParseMethodError;

    /// Parse a method name, case-insensitively.
    ///
    /// ```
    /// use color_tones::QuantizeMethod;
    ///
    /// assert_eq!("K-Means".parse::<QuantizeMethod>().unwrap(), QuantizeMethod::KMeans);
    /// assert_eq!("uniform".parse::<QuantizeMethod>().unwrap(), QuantizeMethod::Uniform);
    /// assert!("octree".parse::<QuantizeMethod>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(QuantizeMethod::Direct),
            "uniform" => Ok(QuantizeMethod::Uniform),
            "kmeans" | "k-means" | "k_means" => Ok(QuantizeMethod::KMeans),
            _ => Err(ParseMethodError {
                input: s.to_string(),
            }),
        }
    }
}

/// Uniform quantization could not produce the requested number of colors.
///
/// The external configuration surface should reflect `actual_k` back to the
/// user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountAdjusted {
    /// K that was asked for
    pub requested_k: usize,
    /// Number of colors actually produced
    pub actual_k: usize,
    /// Human-readable explanation
    pub message: String,
}

/// Output of a quantization strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantized {
    /// Palette colors in tone order
    pub colors: Vec<Rgb>,
    /// Set when Uniform had to fall back to the unique colors
    pub adjustment: Option<CountAdjusted>,
}

/// Derive palette colors from `unique` with the given strategy.
///
/// `k` is clamped into `MIN_K..=MAX_K` before use.
///
/// # Errors
///
/// Returns [`QuantizeError::EmptyPalette`] if `unique` is empty.
pub fn quantize(
    unique: &[Rgb],
    k: usize,
    method: QuantizeMethod,
) -> Result<Quantized, QuantizeError> {
    if unique.is_empty() {
        return Err(QuantizeError::EmptyPalette);
    }
    let k = k.clamp(MIN_K, MAX_K);

    let quantized = match method {
        QuantizeMethod::Direct => Quantized {
            colors: sort_by_hue(unique),
            adjustment: None,
        },
        QuantizeMethod::Uniform => {
            let (colors, adjustment) = interpolate(unique, k);
            Quantized { colors, adjustment }
        }
        QuantizeMethod::KMeans => Quantized {
            colors: cluster(unique, k).centroids,
            adjustment: None,
        },
    };

    if quantized.colors.is_empty() {
        return Err(QuantizeError::EmptyPalette);
    }
    Ok(quantized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spread(n: usize) -> Vec<Rgb> {
        (0..n)
            .map(|i| Rgb::from_u8((i * 7 % 256) as u8, (i * 13 % 256) as u8, (i * 29 % 256) as u8))
            .collect()
    }

    #[test]
    fn test_clamp_k() {
        assert_eq!(clamp_k(-5), 1);
        assert_eq!(clamp_k(0), 1);
        assert_eq!(clamp_k(12), 12);
        assert_eq!(clamp_k(256), 256);
        assert_eq!(clamp_k(10_000), 256);
    }

    #[test]
    fn test_method_display_parse_agree() {
        for method in [
            QuantizeMethod::Direct,
            QuantizeMethod::Uniform,
            QuantizeMethod::KMeans,
        ] {
            assert_eq!(method.to_string().parse::<QuantizeMethod>(), Ok(method));
        }
    }

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!(" DIRECT ".parse::<QuantizeMethod>(), Ok(QuantizeMethod::Direct));
        assert_eq!("K_Means".parse::<QuantizeMethod>(), Ok(QuantizeMethod::KMeans));
    }

    #[test]
    fn test_default_method_is_kmeans() {
        assert_eq!(QuantizeMethod::default(), QuantizeMethod::KMeans);
    }

    #[test]
    fn test_quantize_empty_input() {
        for method in [
            QuantizeMethod::Direct,
            QuantizeMethod::Uniform,
            QuantizeMethod::KMeans,
        ] {
            assert_eq!(quantize(&[], 4, method), Err(QuantizeError::EmptyPalette));
        }
    }

    #[test]
    fn test_quantize_sizes_per_method() {
        let unique = spread(40);
        assert_eq!(quantize(&unique, 8, QuantizeMethod::Direct).unwrap().colors.len(), 40);
        assert_eq!(quantize(&unique, 8, QuantizeMethod::Uniform).unwrap().colors.len(), 8);
        assert_eq!(quantize(&unique, 8, QuantizeMethod::KMeans).unwrap().colors.len(), 8);
    }

    #[test]
    fn test_quantize_clamps_k() {
        let unique = spread(10);
        let result = quantize(&unique, 0, QuantizeMethod::KMeans).unwrap();
        assert_eq!(result.colors.len(), 1);
    }

    #[test]
    fn test_quantize_uniform_reports_adjustment() {
        let unique = spread(3);
        let result = quantize(&unique, 5, QuantizeMethod::Uniform).unwrap();
        let adjustment = result.adjustment.expect("adjustment expected");
        assert_eq!(adjustment.requested_k, 5);
        assert_eq!(adjustment.actual_k, 3);
    }
}
