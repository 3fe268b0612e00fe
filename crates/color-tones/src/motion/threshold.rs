//! Geometric slider-to-threshold mapping.

/// Maps a slider position in `[0, 1]` to a trigger distance in feet.
///
/// The threshold grows by `step_multiplier` per step, so equal slider
/// travel multiplies the distance by a constant factor.
///
/// ```
/// use color_tones::motion::ThresholdScale;
///
/// let scale = ThresholdScale::default();
/// assert!((scale.to_threshold(0.0) - 1.0).abs() < 1e-9);
/// assert!((scale.to_threshold(1.0) - 200.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdScale {
    pub min_feet: f64,
    pub max_feet: f64,
    pub step_multiplier: f64,
}

impl ThresholdScale {
    pub const DEFAULT: ThresholdScale = ThresholdScale {
        min_feet: 1.0,
        max_feet: 200.0,
        step_multiplier: 1.2,
    };

    /// Number of geometric steps between `min_feet` and `max_feet`.
    pub fn total_steps(&self) -> f64 {
        (self.max_feet / self.min_feet).ln() / self.step_multiplier.ln()
    }

    /// Threshold in feet for a slider position. NaN reads as 0.
    pub fn to_threshold(&self, slider: f64) -> f64 {
        let slider = if slider.is_nan() {
            0.0
        } else {
            slider.clamp(0.0, 1.0)
        };
        let feet = self.min_feet * self.step_multiplier.powf(slider * self.total_steps());
        feet.clamp(self.min_feet, self.max_feet)
    }

    /// Slider position for a threshold in feet. NaN reads as `min_feet`.
    pub fn to_slider(&self, feet: f64) -> f64 {
        let feet = if feet.is_nan() {
            self.min_feet
        } else {
            feet.clamp(self.min_feet, self.max_feet)
        };
        let step = (feet / self.min_feet).ln() / self.step_multiplier.ln();
        (step / self.total_steps()).clamp(0.0, 1.0)
    }
}

impl Default for ThresholdScale {
    fn default() -> Self {
        Self::DEFAULT
    }
}
