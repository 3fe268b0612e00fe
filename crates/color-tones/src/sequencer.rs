//! Circular walk over the re-projected pixel sequence.

use crate::palette::QuantizeError;
use crate::quantizer::ToneState;

/// Cursor into a [`ToneState`]'s pixel sequence.
///
/// The cursor survives rebuilds. If a rebuild leaves a shorter sequence, the
/// stored cursor is read modulo the new length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToneSequencer {
    cursor: usize,
}

impl ToneSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor position.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor back to the first pixel.
    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Resolve the pixel under the cursor and advance.
    ///
    /// Resolution uses the state's tone map, so a color that was never seen
    /// before is matched to its nearest palette entry and cached.
    ///
    /// # Errors
    ///
    /// Returns [`QuantizeError::EmptySequence`] if the sequence is empty.
    pub fn next_tone(&mut self, state: &mut ToneState) -> Result<usize, QuantizeError> {
        let len = state.sequence().len();
        if len == 0 {
            return Err(QuantizeError::EmptySequence);
        }
        let position = self.cursor % len;
        let color = state.sequence()[position];
        let tone = state.resolve(color).index();
        self.cursor = (position + 1) % len;
        Ok(tone)
    }
}
