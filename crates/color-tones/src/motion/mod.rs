//! Movement accumulation and threshold mapping.
//!
//! [`MovementAccumulator`] turns a stream of movement magnitudes into tone
//! triggers. [`ThresholdScale`] maps a UI slider in `[0, 1]` onto the
//! geometric threshold range in feet.

mod accumulator;
mod threshold;

pub use accumulator::{
    MovementAccumulator, MovementState, SampleOutcome, TonePlay, ToneSource, METERS_TO_FEET,
    NOISE_FLOOR, STRIDE_SCALE,
};
pub use threshold::ThresholdScale;
