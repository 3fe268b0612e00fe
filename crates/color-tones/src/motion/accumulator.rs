//! Distance accumulation from movement magnitudes.

/// Magnitudes at or below this are sensor noise and are ignored.
pub const NOISE_FLOOR: f64 = 0.05;
/// Meters to feet.
pub const METERS_TO_FEET: f64 = 3.28084;
/// Fraction of a magnitude sample counted as distance travelled.
pub const STRIDE_SCALE: f64 = 0.25;

/// Anything that can hand out the next tone index.
pub trait ToneSource {
    type Error;

    fn next_tone(&mut self) -> Result<usize, Self::Error>;
}

/// Counter snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementState {
    /// Feet accumulated since the last trigger
    pub since_last_tone: f64,
    /// Feet accumulated since the session was last reset
    pub lifetime: f64,
    /// Distance of the most recent accepted sample
    pub current_movement: f64,
    pub threshold_feet: f64,
    pub running: bool,
}

/// A tone triggered by crossing the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonePlay {
    pub tone: usize,
    /// Distance covered since the previous trigger
    pub since_last_tone: f64,
    /// Lifetime distance at the moment of the trigger
    pub lifetime: f64,
}

/// What a single sample did.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome<E> {
    /// Intake is stopped; the sample was dropped
    Stopped,
    /// Magnitude at or below [`NOISE_FLOOR`]
    BelowNoiseFloor,
    /// Distance added, threshold not reached
    Accumulated { delta: f64 },
    /// Threshold reached and a tone was produced
    Tone(TonePlay),
    /// Threshold reached but the source had no tone to give
    Silent(E),
}

impl<E> SampleOutcome<E> {
    /// True if the threshold was crossed, with or without a tone.
    pub fn triggered(&self) -> bool {
        matches!(self, SampleOutcome::Tone(_) | SampleOutcome::Silent(_))
    }
}

/// Converts magnitudes into travelled distance and fires tones.
///
/// ```
/// use color_tones::motion::{MovementAccumulator, SampleOutcome, ToneSource};
///
/// struct Counter(usize);
/// impl ToneSource for Counter {
///     type Error = ();
///     fn next_tone(&mut self) -> Result<usize, ()> {
///         self.0 += 1;
///         Ok(self.0)
///     }
/// }
///
/// let mut acc = MovementAccumulator::new(1.0);
/// let mut tones = Counter(0);
/// let outcomes: Vec<_> = (0..7).map(|_| acc.on_sample(0.2, &mut tones)).collect();
/// assert!(!outcomes[5].triggered());
/// assert!(matches!(outcomes[6], SampleOutcome::Tone(_)));
/// ```
#[derive(Debug, Clone)]
pub struct MovementAccumulator {
    since_last_tone: f64,
    lifetime: f64,
    current_movement: f64,
    threshold_feet: f64,
    running: bool,
}

impl MovementAccumulator {
    /// New accumulator, accepting samples, with the given trigger distance.
    pub fn new(threshold_feet: f64) -> Self {
        Self {
            since_last_tone: 0.0,
            lifetime: 0.0,
            current_movement: 0.0,
            threshold_feet,
            running: true,
        }
    }

    /// Feed one magnitude sample.
    ///
    /// NaN magnitudes are treated like noise.
    pub fn on_sample<S: ToneSource>(
        &mut self,
        magnitude: f64,
        source: &mut S,
    ) -> SampleOutcome<S::Error> {
        if !self.running {
            return SampleOutcome::Stopped;
        }
        if magnitude.is_nan() || magnitude <= NOISE_FLOOR {
            return SampleOutcome::BelowNoiseFloor;
        }

        let delta = magnitude * METERS_TO_FEET * STRIDE_SCALE;
        self.current_movement = delta;
        self.since_last_tone += delta;
        self.lifetime += delta;

        if self.since_last_tone < self.threshold_feet {
            return SampleOutcome::Accumulated { delta };
        }

        let travelled = std::mem::take(&mut self.since_last_tone);
        match source.next_tone() {
            Ok(tone) => SampleOutcome::Tone(TonePlay {
                tone,
                since_last_tone: travelled,
                lifetime: self.lifetime,
            }),
            Err(e) => SampleOutcome::Silent(e),
        }
    }

    /// Begin a session: clear the since-last-tone counters and resume intake.
    pub fn start(&mut self) {
        self.reset();
        self.running = true;
    }

    /// Stop intake. Counters are kept.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Zero the since-last-tone distance and current movement.
    ///
    /// The lifetime total is untouched; see [`reset_lifetime`](Self::reset_lifetime).
    pub fn reset(&mut self) {
        self.since_last_tone = 0.0;
        self.current_movement = 0.0;
    }

    /// Zero every counter, lifetime included.
    pub fn reset_lifetime(&mut self) {
        self.reset();
        self.lifetime = 0.0;
    }

    pub fn set_threshold_feet(&mut self, feet: f64) {
        self.threshold_feet = feet;
    }

    pub fn threshold_feet(&self) -> f64 {
        self.threshold_feet
    }

    pub fn since_last_tone(&self) -> f64 {
        self.since_last_tone
    }

    pub fn lifetime(&self) -> f64 {
        self.lifetime
    }

    pub fn current_movement(&self) -> f64 {
        self.current_movement
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> MovementState {
        MovementState {
            since_last_tone: self.since_last_tone,
            lifetime: self.lifetime,
            current_movement: self.current_movement,
            threshold_feet: self.threshold_feet,
            running: self.running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out 0, 1, 2, ... or fails when empty.
    struct Seq {
        next: usize,
        empty: bool,
    }

    impl Seq {
        fn new() -> Self {
            Self { next: 0, empty: false }
        }
    }

    impl ToneSource for Seq {
        type Error = &'static str;

        fn next_tone(&mut self) -> Result<usize, Self::Error> {
            if self.empty {
                return Err("empty");
            }
            let t = self.next;
            self.next += 1;
            Ok(t)
        }
    }

    #[test]
    fn test_seventh_sample_triggers() {
        let mut acc = MovementAccumulator::new(1.0);
        let mut seq = Seq::new();
        for i in 0..6 {
            let outcome = acc.on_sample(0.2, &mut seq);
            assert!(matches!(outcome, SampleOutcome::Accumulated { .. }), "sample {}", i + 1);
        }
        assert!((acc.since_last_tone() - 0.984252).abs() < 1e-6);

        match acc.on_sample(0.2, &mut seq) {
            SampleOutcome::Tone(play) => {
                assert_eq!(play.tone, 0);
                assert!((play.since_last_tone - 1.148294).abs() < 1e-6);
                assert!((play.lifetime - 1.148294).abs() < 1e-6);
            }
            other => panic!("expected tone, got {:?}", other),
        }
        assert_eq!(acc.since_last_tone(), 0.0);
        assert!((acc.lifetime() - 1.148294).abs() < 1e-6);
    }

    #[test]
    fn test_delta() {
        let mut acc = MovementAccumulator::new(100.0);
        let outcome = acc.on_sample(0.2, &mut Seq::new());
        match outcome {
            SampleOutcome::Accumulated { delta } => assert!((delta - 0.164042).abs() < 1e-6),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(acc.current_movement(), acc.since_last_tone());
    }

    #[test]
    fn test_noise_floor_is_inclusive() {
        let mut acc = MovementAccumulator::new(1.0);
        let mut seq = Seq::new();
        assert_eq!(acc.on_sample(0.05, &mut seq), SampleOutcome::BelowNoiseFloor);
        assert_eq!(acc.on_sample(0.0, &mut seq), SampleOutcome::BelowNoiseFloor);
        assert_eq!(acc.on_sample(f64::NAN, &mut seq), SampleOutcome::BelowNoiseFloor);
        assert_eq!(acc.lifetime(), 0.0);
    }

    #[test]
    fn test_stop_drops_samples_and_keeps_counters() {
        let mut acc = MovementAccumulator::new(10.0);
        let mut seq = Seq::new();
        acc.on_sample(1.0, &mut seq);
        let before = acc.state();
        acc.stop();
        assert_eq!(acc.on_sample(1.0, &mut seq), SampleOutcome::Stopped);
        assert_eq!(acc.lifetime(), before.lifetime);
        assert_eq!(acc.since_last_tone(), before.since_last_tone);
        assert!(!acc.is_running());
    }

    #[test]
    fn test_start_clears_since_last_tone_only() {
        let mut acc = MovementAccumulator::new(10.0);
        let mut seq = Seq::new();
        acc.on_sample(1.0, &mut seq);
        acc.stop();
        acc.start();
        assert!(acc.is_running());
        assert_eq!(acc.since_last_tone(), 0.0);
        assert_eq!(acc.current_movement(), 0.0);
        assert!(acc.lifetime() > 0.0);
    }

    #[test]
    fn test_reset_keeps_lifetime() {
        let mut acc = MovementAccumulator::new(10.0);
        let mut seq = Seq::new();
        acc.on_sample(1.0, &mut seq);
        acc.reset();
        assert_eq!(acc.since_last_tone(), 0.0);
        assert!(acc.lifetime() > 0.0);
        acc.reset_lifetime();
        assert_eq!(acc.lifetime(), 0.0);
    }

    #[test]
    fn test_trigger_with_empty_source_still_resets() {
        let mut acc = MovementAccumulator::new(0.5);
        let mut seq = Seq { next: 0, empty: true };
        let outcome = acc.on_sample(1.0, &mut seq);
        assert_eq!(outcome, SampleOutcome::Silent("empty"));
        assert!(outcome.triggered());
        assert_eq!(acc.since_last_tone(), 0.0);
    }

    #[test]
    fn test_lifetime_unaffected_by_triggers() {
        let mut acc = MovementAccumulator::new(0.1);
        let mut seq = Seq::new();
        for _ in 0..10 {
            acc.on_sample(1.0, &mut seq);
        }
        assert!((acc.lifetime() - 10.0 * METERS_TO_FEET * STRIDE_SCALE).abs() < 1e-9);
        assert_eq!(seq.next, 10);
    }
}
