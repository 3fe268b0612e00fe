//! Palette types and utilities
//!
//! This module provides the tone palette, the exact-match color map with its
//! nearest-color cache, and the crate's error types.

mod error;
mod palette;

pub use error::{ParseMethodError, QuantizeError};
pub(crate) use palette::nearest;
pub use palette::{Palette, Resolution, ToneMap};
