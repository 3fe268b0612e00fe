//! Error types for sampling, quantization and sequencing
//!
//! Every failure in this crate is local and recoverable. Callers receive a
//! distinguishable variant and decide whether to retry, report or ignore it.

use std::fmt;

/// Error type for pixel loading, palette construction and tone queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantizeError {
    /// The pixel buffer does not describe a usable image
    InvalidImage {
        /// Why the buffer was rejected
        reason: String,
    },
    /// Quantization produced no colors; the rebuild was aborted
    EmptyPalette,
    /// A tone was requested before any successful load
    EmptySequence,
}

impl QuantizeError {
    pub(crate) fn invalid_image(reason: impl Into<String>) -> Self {
        QuantizeError::InvalidImage {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for QuantizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantizeError::InvalidImage { reason } => {
                write!(f, "invalid image: {}", reason)
            }
            QuantizeError::EmptyPalette => {
                write!(f, "quantization produced an empty palette")
            }
            QuantizeError::EmptySequence => {
                write!(f, "no tone sequence loaded")
            }
        }
    }
}

impl std::error::Error for QuantizeError {}

/// Error type for parsing a quantization method name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseMethodError {
    /// The rejected input
    pub input: String,
}

impl fmt::Display for ParseMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown quantization method '{}' (expected direct, uniform or kmeans)",
            self.input
        )
    }
}

impl std::error::Error for ParseMethodError {}
