#![allow(clippy::module_inception)]

//! color-tones: turn an image into a walkable sequence of tones
//!
//! An image is sampled on a coarse grid, its colors are reduced to a palette,
//! and every sampled pixel is re-projected onto that palette. Walking then
//! steps through the pixels one at a time: each time enough distance has
//! been covered, the pixel under the cursor yields a tone index (its palette
//! position).
//!
//! # Quick Start
//!
//! ```
//! use color_tones::{ColorQuantizer, MovementAccumulator, QuantizeMethod, SampleOutcome};
//!
//! // 2x1 image: one black pixel, one white pixel
//! let rgba = [0, 0, 0, 255, 255, 255, 255, 255];
//!
//! let mut quantizer = ColorQuantizer::new(2, QuantizeMethod::Uniform);
//! let report = quantizer.load_pixels(&rgba, 2, 1).unwrap();
//! assert_eq!(report.palette_size, 2);
//!
//! let mut walker = MovementAccumulator::new(1.0);
//! let tone = (0..10)
//!     .find_map(|_| match walker.on_sample(0.5, &mut quantizer) {
//!         SampleOutcome::Tone(play) => Some(play.tone),
//!         _ => None,
//!     })
//!     .unwrap();
//! assert_eq!(tone, 0);
//! ```
//!
//! # Quantization Methods
//!
//! See [`QuantizeMethod`]:
//!
//! - Direct: every unique color is a tone, sorted by hue (K is ignored)
//! - Uniform: K colors spread between the per-channel bounds
//! - K-means: K centroids from Lloyd's algorithm (default)
//!
//! # Color Matching
//!
//! Colors are compared in plain RGB with squared Euclidean distance. Lookups
//! of colors that already are palette entries go through an exact,
//! bit-level map; anything else falls back to a nearest-color scan whose
//! result is cached.
//!
//! # Thread Safety
//!
//! Nothing here locks. [`ColorQuantizer`] is a plain owned value; services
//! that share it across threads wrap it in a mutex.

pub mod color;
pub mod motion;
pub mod palette;
pub mod quantize;
pub mod quantizer;
pub mod sampler;
pub mod sequencer;


pub use color::{ColorKey, Rgb};
pub use motion::{
    MovementAccumulator, MovementState, SampleOutcome, ThresholdScale, TonePlay, ToneSource,
};
pub use palette::{Palette, ParseMethodError, QuantizeError, Resolution, ToneMap};
pub use quantize::{clamp_k, CountAdjusted, QuantizeMethod, MAX_K, MIN_K};
pub use quantizer::{ColorQuantizer, PreviewImage, RebuildReport, ToneState, DEFAULT_K};
pub use sampler::{PixelSampler, SampleGrid};
pub use sequencer::ToneSequencer;
