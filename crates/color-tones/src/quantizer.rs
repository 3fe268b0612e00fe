//! The quantizer: sampled pixels in, palette and tone sequence out.
//!
//! [`ColorQuantizer`] owns everything a rebuild produces as a single
//! [`ToneState`] value. A rebuild computes a complete new state first and
//! swaps it in only on success, so the palette, tone map and sequence are
//! never observed out of step with each other.

use crate::color::Rgb;
use crate::motion::ToneSource;
use crate::palette::{Palette, QuantizeError, Resolution, ToneMap};
use crate::quantize::{self, clamp_k, CountAdjusted, QuantizeMethod};
use crate::sampler::{PixelSampler, SampleGrid};
use crate::sequencer::ToneSequencer;

/// Palette size used when nothing else is configured.
pub const DEFAULT_K: usize = 8;

/// Palette, tone map and re-projected pixel sequence from one rebuild.
#[derive(Debug, Clone)]
pub struct ToneState {
    palette: Palette,
    tone_map: ToneMap,
    sequence: Vec<Rgb>,
}

impl ToneState {
    /// Build the tone map for `palette` and re-project every sample onto it.
    ///
    /// Samples that are not palette colors are resolved by nearest match and
    /// the match is cached in the tone map.
    pub fn build(palette: Palette, samples: &[Rgb]) -> Self {
        let mut tone_map = ToneMap::from_palette(&palette);
        let sequence = samples
            .iter()
            .map(|&c| palette.color(tone_map.resolve(&palette, c).index()))
            .collect();
        Self {
            palette,
            tone_map,
            sequence,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn tone_map(&self) -> &ToneMap {
        &self.tone_map
    }

    /// Palette color for every sampled grid cell, row-major.
    pub fn sequence(&self) -> &[Rgb] {
        &self.sequence
    }

    /// Tone index for `color`, caching nearest-color fallbacks.
    pub fn resolve(&mut self, color: Rgb) -> Resolution {
        self.tone_map.resolve(&self.palette, color)
    }

    /// Square RGBA raster with one pixel per sequence entry.
    ///
    /// The side is `ceil(sqrt(n))`; cells past the end of the sequence are
    /// fully transparent. Returns `None` for an empty sequence.
    pub fn preview(&self) -> Option<PreviewImage> {
        let n = self.sequence.len();
        if n == 0 {
            return None;
        }
        let side = (n as f64).sqrt().ceil() as usize;
        let mut rgba = vec![0u8; side * side * 4];
        for (px, color) in rgba.chunks_exact_mut(4).zip(&self.sequence) {
            let [r, g, b] = color.to_bytes();
            px.copy_from_slice(&[r, g, b, 255]);
        }
        Some(PreviewImage { side, rgba })
    }
}

/// RGBA8 preview raster, `side` x `side` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub side: usize,
    pub rgba: Vec<u8>,
}

/// Summary of a successful rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    /// Number of palette entries (tones)
    pub palette_size: usize,
    /// Unique colors found in the sample grid
    pub unique_colors: usize,
    /// Length of the re-projected pixel sequence
    pub sequence_len: usize,
    /// Set when Uniform could not honor the requested K
    pub adjustment: Option<CountAdjusted>,
}

/// Pixels sampled by the last successful load.
#[derive(Debug, Clone)]
struct Loaded {
    samples: SampleGrid,
    unique: Vec<Rgb>,
}

/// Derives a palette from an image and serves tones from it.
///
/// Mutating calls are synchronous. Callers that need concurrency put the
/// quantizer behind a lock of their own.
#[derive(Debug, Clone)]
pub struct ColorQuantizer {
    k: usize,
    method: QuantizeMethod,
    sampler: PixelSampler,
    loaded: Option<Loaded>,
    state: Option<ToneState>,
    sequencer: ToneSequencer,
}

impl Default for ColorQuantizer {
    fn default() -> Self {
        Self::new(DEFAULT_K as i64, QuantizeMethod::default())
    }
}

impl ColorQuantizer {
    /// Create a quantizer with no image loaded. `k` is clamped.
    pub fn new(k: i64, method: QuantizeMethod) -> Self {
        Self {
            k: clamp_k(k),
            method,
            sampler: PixelSampler::default(),
            loaded: None,
            state: None,
            sequencer: ToneSequencer::new(),
        }
    }

    /// Replace the pixel sampler. Takes effect on the next load.
    pub fn with_sampler(mut self, sampler: PixelSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn method(&self) -> QuantizeMethod {
        self.method
    }

    /// Set the palette size and rebuild if an image is loaded.
    ///
    /// Out-of-range values are clamped to `1..=256`. Returns `Ok(None)` when
    /// there is nothing to rebuild.
    pub fn set_k(&mut self, k: i64) -> Result<Option<RebuildReport>, QuantizeError> {
        self.k = clamp_k(k);
        self.rebuild()
    }

    /// Set the strategy and rebuild if an image is loaded.
    pub fn set_method(
        &mut self,
        method: QuantizeMethod,
    ) -> Result<Option<RebuildReport>, QuantizeError> {
        self.method = method;
        self.rebuild()
    }

    /// Set palette size and strategy together with a single rebuild.
    pub fn configure(
        &mut self,
        k: i64,
        method: QuantizeMethod,
    ) -> Result<Option<RebuildReport>, QuantizeError> {
        self.k = clamp_k(k);
        self.method = method;
        self.rebuild()
    }

    /// Sample an RGBA8 buffer and rebuild palette, tone map and sequence.
    ///
    /// A successful load starts the walk from the first pixel again.
    ///
    /// # Errors
    ///
    /// [`QuantizeError::InvalidImage`] for malformed buffers and
    /// [`QuantizeError::EmptyPalette`] if quantization yields nothing. In
    /// both cases the previous state is kept.
    pub fn load_pixels(
        &mut self,
        rgba: &[u8],
        width: usize,
        height: usize,
    ) -> Result<RebuildReport, QuantizeError> {
        let samples = self.sampler.sample(rgba, width, height)?;
        let unique = samples.unique_colors();
        let (state, report) = build_state(self.k, self.method, &unique, samples.colors())?;
        self.loaded = Some(Loaded { samples, unique });
        self.state = Some(state);
        self.sequencer.reset();
        Ok(report)
    }

    fn rebuild(&mut self) -> Result<Option<RebuildReport>, QuantizeError> {
        let Some(loaded) = &self.loaded else {
            return Ok(None);
        };
        let (state, report) =
            build_state(self.k, self.method, &loaded.unique, loaded.samples.colors())?;
        self.state = Some(state);
        Ok(Some(report))
    }

    /// Resolve the pixel under the cursor to a tone index and advance.
    ///
    /// # Errors
    ///
    /// [`QuantizeError::EmptySequence`] before any successful load.
    pub fn next_tone(&mut self) -> Result<usize, QuantizeError> {
        match self.state.as_mut() {
            Some(state) => self.sequencer.next_tone(state),
            None => Err(QuantizeError::EmptySequence),
        }
    }

    /// Move the sequence cursor back to the first pixel.
    pub fn reset_sequence(&mut self) {
        self.sequencer.reset();
    }

    pub fn cursor(&self) -> usize {
        self.sequencer.cursor()
    }

    /// Current palette state, `None` before the first successful load.
    pub fn state(&self) -> Option<&ToneState> {
        self.state.as_ref()
    }

    /// Unique colors found by the last successful load, 0 before any load.
    pub fn unique_color_count(&self) -> usize {
        self.loaded.as_ref().map_or(0, |l| l.unique.len())
    }

    pub fn preview(&self) -> Option<PreviewImage> {
        self.state.as_ref().and_then(ToneState::preview)
    }
}

impl ToneSource for ColorQuantizer {
    type Error = QuantizeError;

    fn next_tone(&mut self) -> Result<usize, QuantizeError> {
        ColorQuantizer::next_tone(self)
    }
}

fn build_state(
    k: usize,
    method: QuantizeMethod,
    unique: &[Rgb],
    samples: &[Rgb],
) -> Result<(ToneState, RebuildReport), QuantizeError> {
    let quantized = quantize::quantize(unique, k, method)?;
    let palette = Palette::new(quantized.colors)?;
    let state = ToneState::build(palette, samples);
    let report = RebuildReport {
        palette_size: state.palette.len(),
        unique_colors: unique.len(),
        sequence_len: state.sequence.len(),
        adjustment: quantized.adjustment,
    };
    Ok((state, report))
}
