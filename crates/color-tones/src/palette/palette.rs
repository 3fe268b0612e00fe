//! Palette and color→tone map.
//!
//! A [`Palette`] is the ordered list of representative colors; an entry's
//! position is its tone index. A [`ToneMap`] resolves colors to tone indices,
//! first by exact key lookup and then by a nearest-color scan whose result is
//! cached. The two are only meaningful together and are always rebuilt as a
//! pair.

use std::collections::HashMap;

use super::error::QuantizeError;
use crate::color::{ColorKey, Rgb};

/// Find the entry in `candidates` closest to `color` by squared RGB distance.
///
/// Ties go to the lowest index. Returns `(0, f32::MAX)` for an empty slice,
/// so callers must guarantee at least one candidate.
#[inline]
pub(crate) fn nearest(candidates: &[Rgb], color: Rgb) -> (usize, f32) {
    let mut best_idx = 0;
    let mut best_dist = f32::MAX;

    for (i, &candidate) in candidates.iter().enumerate() {
        let dist = color.distance_squared(candidate);
        if dist < best_dist {
            best_dist = dist;
            best_idx = i;
        }
    }

    (best_idx, best_dist)
}

/// An ordered, non-empty list of tone colors.
///
/// # Example
///
/// ```
/// use color_tones::{Palette, Rgb};
///
/// let palette = Palette::new(vec![Rgb::from_u8(0, 0, 0), Rgb::from_u8(255, 255, 255)]).unwrap();
/// let (idx, _) = palette.find_nearest(Rgb::from_u8(200, 200, 200));
/// assert_eq!(idx, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Create a palette from its colors.
    ///
    /// Duplicates are allowed (k-means may pad with repeated centroids).
    ///
    /// # Errors
    ///
    /// Returns [`QuantizeError::EmptyPalette`] if `colors` is empty.
    pub fn new(colors: Vec<Rgb>) -> Result<Self, QuantizeError> {
        if colors.is_empty() {
            return Err(QuantizeError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Number of tones.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; empty palettes are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color of the given tone.
    #[inline]
    pub fn color(&self, idx: usize) -> Rgb {
        self.colors[idx]
    }

    /// All colors in tone order.
    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Tone colors as `#rrggbb` strings.
    pub fn to_hex(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.to_hex()).collect()
    }

    /// Full scan for the closest entry; ties go to the lowest index.
    #[inline]
    pub fn find_nearest(&self, color: Rgb) -> (usize, f32) {
        nearest(&self.colors, color)
    }
}

/// How a color was resolved to a tone index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Found in the exact-match map
    Exact(usize),
    /// Found by scanning the palette; the mapping has been cached
    Nearest(usize),
}

impl Resolution {
    /// The resolved tone index.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Resolution::Exact(idx) | Resolution::Nearest(idx) => idx,
        }
    }
}

/// Exact color → tone index map with a nearest-color cache.
#[derive(Debug, Clone, Default)]
pub struct ToneMap {
    entries: HashMap<ColorKey, usize>,
}

impl ToneMap {
    /// Build the map from a palette; a repeated color keeps its first index.
    pub fn from_palette(palette: &Palette) -> Self {
        let mut entries = HashMap::with_capacity(palette.len());
        for (i, color) in palette.colors().iter().enumerate() {
            entries.entry(color.key()).or_insert(i);
        }
        Self { entries }
    }

    /// Exact lookup only.
    #[inline]
    pub fn get(&self, color: Rgb) -> Option<usize> {
        self.entries.get(&color.key()).copied()
    }

    /// Number of cached colors (palette entries plus learned mappings).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `color` against `palette`.
    ///
    /// An exact hit is returned as is. A miss scans the palette and stores
    /// the result so the next lookup for the same color is exact.
    /// `palette` must be the one this map was built from.
    pub fn resolve(&mut self, palette: &Palette, color: Rgb) -> Resolution {
        if let Some(idx) = self.get(color) {
            return Resolution::Exact(idx);
        }
        let (idx, _) = palette.find_nearest(color);
        self.entries.insert(color.key(), idx);
        Resolution::Nearest(idx)
    }
}
