//! Color type and exact-match keys
//!
//! Colors are plain RGB triples with channels in `0.0..=1.0`. All distance
//! math is squared Euclidean on the raw channels; there is no perceptual
//! color space in this crate.
//!
//! # Example
//!
//! ```
//! use color_tones::Rgb;
//!
//! let red = Rgb::from_u8(255, 0, 0);
//! assert_eq!(red.r, 1.0);
//! assert_eq!(red.to_hex(), "#ff0000");
//! ```

mod rgb;

pub use rgb::{ColorKey, Rgb};
