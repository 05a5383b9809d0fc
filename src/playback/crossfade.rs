//! Crossfade ramp planning
//!
//! Crossfades are time-based: a fixed-window exponential gain ramp, not
//! end-of-track detection, because placeholder content has no reliable
//! beat-aligned markers. The outgoing track ramps down over half the
//! window, the queue advances, and the incoming track ramps back up to the
//! pre-fade volume over the full window.

use std::time::Duration;

/// Gain floor the exponential ramp targets; an exponential ramp cannot
/// reach zero
pub const GAIN_FLOOR: f32 = 0.01;

/// Interval between gain updates while ramping
pub const STEP_INTERVAL: Duration = Duration::from_millis(50);

/// Exponential interpolation from `from` to `to` at `progress` in [0, 1].
/// Both endpoints are floored at `GAIN_FLOOR` so the ratio stays defined.
pub fn ramp_gain(from: f32, to: f32, progress: f32) -> f32 {
    let from = from.max(GAIN_FLOOR);
    let to = to.max(GAIN_FLOOR);
    let progress = progress.clamp(0.0, 1.0);
    from * (to / from).powf(progress)
}

/// Precomputed schedule for one crossfade
#[derive(Debug, Clone, Copy)]
pub struct CrossfadePlan {
    /// Full ramp window
    pub window: Duration,
    /// Steps in the fade-out phase (half window)
    pub fade_out_steps: u32,
    /// Steps in the fade-in phase (full window)
    pub fade_in_steps: u32,
}

impl CrossfadePlan {
    pub fn new(window_secs: f64) -> Self {
        let window = Duration::from_secs_f64(window_secs.max(0.1));
        let per_step = STEP_INTERVAL.as_secs_f64();
        let fade_out_steps = ((window.as_secs_f64() / 2.0) / per_step).ceil().max(1.0) as u32;
        let fade_in_steps = (window.as_secs_f64() / per_step).ceil().max(1.0) as u32;
        Self {
            window,
            fade_out_steps,
            fade_in_steps,
        }
    }

    /// Gain for fade-out step `i` (descending from `volume` toward the
    /// midpoint of the full-window ramp to the floor)
    pub fn fade_out_gain(&self, volume: f32, step: u32) -> f32 {
        // The advance happens at half-window, so the outgoing ramp only
        // covers the first half of the full exponential descent
        let progress = 0.5 * (step.min(self.fade_out_steps) as f32 / self.fade_out_steps as f32);
        ramp_gain(volume, GAIN_FLOOR, progress)
    }

    /// Gain for fade-in step `i` (ascending from the floor back to `volume`)
    pub fn fade_in_gain(&self, volume: f32, step: u32) -> f32 {
        let progress = step.min(self.fade_in_steps) as f32 / self.fade_in_steps as f32;
        ramp_gain(GAIN_FLOOR, volume, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        assert!((ramp_gain(0.8, GAIN_FLOOR, 0.0) - 0.8).abs() < 1e-6);
        assert!((ramp_gain(0.8, GAIN_FLOOR, 1.0) - GAIN_FLOOR).abs() < 1e-6);
        assert!((ramp_gain(GAIN_FLOOR, 0.8, 1.0) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_ramp_handles_zero_volume() {
        // A muted user volume must not produce NaN or negative gains
        let g = ramp_gain(0.0, GAIN_FLOOR, 0.5);
        assert!(g.is_finite());
        assert!(g >= GAIN_FLOOR * 0.99);
    }

    #[test]
    fn test_fade_out_is_monotonically_decreasing() {
        let plan = CrossfadePlan::new(3.0);
        let mut previous = f32::MAX;
        for step in 0..=plan.fade_out_steps {
            let gain = plan.fade_out_gain(0.8, step);
            assert!(gain <= previous);
            previous = gain;
        }
        // Half the descent remains for the incoming track to cover
        assert!(previous > GAIN_FLOOR);
        assert!(previous < 0.8);
    }

    #[test]
    fn test_fade_in_recovers_user_volume() {
        let plan = CrossfadePlan::new(3.0);
        let mut previous = 0.0f32;
        for step in 0..=plan.fade_in_steps {
            let gain = plan.fade_in_gain(0.8, step);
            assert!(gain >= previous);
            previous = gain;
        }
        assert!((previous - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_plan_step_counts() {
        let plan = CrossfadePlan::new(3.0);
        assert_eq!(plan.fade_out_steps, 30);
        assert_eq!(plan.fade_in_steps, 60);
    }
}
