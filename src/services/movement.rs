//! Movement intake: magnitudes in, tone events out.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use color_tones::{MovementAccumulator, SampleOutcome, ThresholdScale};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::events::{EventBus, ToneEvent};
use crate::services::tone_engine::ToneEngine;

/// Result of one movement sample
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SampleResult {
    /// Intake is stopped
    Stopped,
    /// Magnitude at or below the noise floor
    BelowNoiseFloor,
    /// Distance added, no trigger
    Accumulated { delta: f64 },
    /// Threshold crossed and a tone played
    Tone { tone: usize },
    /// Threshold crossed but no image is loaded
    NoTone { error: String },
}

/// Movement counters and threshold
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MovementStatus {
    pub since_last_tone: f64,
    pub lifetime: f64,
    pub current_movement: f64,
    pub threshold_feet: f64,
    pub slider: f64,
    pub running: bool,
}

struct Walker {
    accumulator: MovementAccumulator,
    slider: f64,
}

/// Feeds movement samples into the accumulator and plays tones from the
/// shared [`ToneEngine`].
pub struct MovementService {
    walker: Mutex<Walker>,
    scale: ThresholdScale,
    engine: Arc<ToneEngine>,
    events: EventBus,
}

impl MovementService {
    pub fn new(engine: Arc<ToneEngine>, events: EventBus, slider: f64) -> Self {
        let scale = ThresholdScale::default();
        let slider = clamp_slider(slider);
        Self {
            walker: Mutex::new(Walker {
                accumulator: MovementAccumulator::new(scale.to_threshold(slider)),
                slider,
            }),
            scale,
            engine,
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Walker> {
        self.walker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Feed one magnitude sample.
    ///
    /// Blocks on the tone engine when the sample triggers a tone.
    pub fn on_sample(&self, magnitude: f64) -> SampleResult {
        let mut walker = self.lock();
        let mut source = &*self.engine;
        match walker.accumulator.on_sample(magnitude, &mut source) {
            SampleOutcome::Stopped => SampleResult::Stopped,
            SampleOutcome::BelowNoiseFloor => SampleResult::BelowNoiseFloor,
            SampleOutcome::Accumulated { delta } => SampleResult::Accumulated { delta },
            SampleOutcome::Tone(play) => {
                tracing::debug!(
                    tone = play.tone,
                    distance = play.since_last_tone,
                    lifetime = play.lifetime,
                    "Tone triggered"
                );
                self.events.publish(ToneEvent::TonePlay {
                    tone: play.tone,
                    since_last_tone: play.since_last_tone,
                    lifetime: play.lifetime,
                });
                SampleResult::Tone { tone: play.tone }
            }
            SampleOutcome::Silent(e) => {
                tracing::debug!(%e, "Threshold crossed without a tone");
                SampleResult::NoTone {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Begin a session: zero the since-last-tone distance and accept samples
    pub fn start(&self) {
        self.lock().accumulator.start();
        tracing::debug!("Movement session started");
    }

    /// Stop accepting samples; counters are kept
    pub fn stop(&self) {
        self.lock().accumulator.stop();
        tracing::debug!("Movement session stopped");
    }

    /// Zero all counters, lifetime included
    pub fn reset(&self) {
        self.lock().accumulator.reset_lifetime();
        tracing::debug!("Movement counters reset");
    }

    /// Apply a slider position and return the new threshold in feet
    pub fn set_slider(&self, slider: f64) -> f64 {
        let slider = clamp_slider(slider);
        let feet = self.scale.to_threshold(slider);
        let mut walker = self.lock();
        walker.slider = slider;
        walker.accumulator.set_threshold_feet(feet);
        tracing::debug!(slider, feet, "Movement threshold changed");
        feet
    }

    pub fn slider(&self) -> f64 {
        self.lock().slider
    }

    pub fn threshold_feet(&self) -> f64 {
        self.lock().accumulator.threshold_feet()
    }

    pub fn status(&self) -> MovementStatus {
        let walker = self.lock();
        let state = walker.accumulator.state();
        MovementStatus {
            since_last_tone: state.since_last_tone,
            lifetime: state.lifetime,
            current_movement: state.current_movement,
            threshold_feet: state.threshold_feet,
            slider: walker.slider,
            running: state.running,
        }
    }
}

fn clamp_slider(slider: f64) -> f64 {
    if slider.is_nan() {
        0.0
    } else {
        slider.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_tones::QuantizeMethod;

    fn service(slider: f64) -> (MovementService, Arc<ToneEngine>, EventBus) {
        let engine = Arc::new(ToneEngine::new(2, QuantizeMethod::Uniform));
        let events = EventBus::default();
        let svc = MovementService::new(engine.clone(), events.clone(), slider);
        (svc, engine, events)
    }

    #[test]
    fn test_slider_zero_is_one_foot() {
        let (svc, _, _) = service(0.0);
        assert!((svc.threshold_feet() - 1.0).abs() < 1e-9);
        let feet = svc.set_slider(1.0);
        assert!((feet - 200.0).abs() < 1e-9);
        assert_eq!(svc.slider(), 1.0);
    }

    #[test]
    fn test_slider_is_clamped() {
        let (svc, _, _) = service(3.0);
        assert_eq!(svc.slider(), 1.0);
        svc.set_slider(-2.0);
        assert_eq!(svc.slider(), 0.0);
    }

    #[test]
    fn test_no_image_trigger_reports_missing_tone() {
        let (svc, _, _) = service(0.0);
        let result = svc.on_sample(2.0);
        assert!(matches!(result, SampleResult::NoTone { .. }));
        assert_eq!(svc.status().since_last_tone, 0.0);
    }

    #[tokio::test]
    async fn test_seventh_sample_plays_and_publishes() {
        let (svc, engine, events) = service(0.0);
        engine
            .load_pixels(&[0, 0, 0, 255, 255, 255, 255, 255], 2, 1)
            .unwrap();
        let mut rx = events.subscribe();

        for _ in 0..6 {
            assert!(matches!(svc.on_sample(0.2), SampleResult::Accumulated { .. }));
        }
        assert_eq!(svc.on_sample(0.2), SampleResult::Tone { tone: 0 });

        let event = rx.recv().await.unwrap();
        match event.event {
            ToneEvent::TonePlay {
                tone,
                since_last_tone,
                lifetime,
            } => {
                assert_eq!(tone, 0);
                assert!((since_last_tone - 1.148294).abs() < 1e-6);
                assert!((lifetime - 1.148294).abs() < 1e-6);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_stop_start_reset() {
        let (svc, _, _) = service(1.0);
        svc.on_sample(1.0);
        svc.stop();
        assert_eq!(svc.on_sample(1.0), SampleResult::Stopped);
        assert!(!svc.status().running);

        svc.start();
        let status = svc.status();
        assert!(status.running);
        assert_eq!(status.since_last_tone, 0.0);
        assert!(status.lifetime > 0.0);

        svc.reset();
        assert_eq!(svc.status().lifetime, 0.0);
    }

    #[test]
    fn test_noise_is_ignored() {
        let (svc, _, _) = service(0.5);
        assert_eq!(svc.on_sample(0.01), SampleResult::BelowNoiseFloor);
    }
}
