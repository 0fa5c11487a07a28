//! Recognition settings value object.
//!
//! Settings are constructed with defaults, mutated through validated
//! setters, and take effect for the next recognition pass only. The
//! update-rate setter needs the frame window length because a rate that
//! does not evenly divide it would make recognition attempts drift
//! against window completion.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunable parameters of the recognition state machine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecognitionSettings {
    /// Sakoe-Chiba band half-width in frames for DTW matching.
    dtw_radius: f64,
    /// Lower exclusive bound on an acceptable DTW distance.
    min_dtw_threshold: f64,
    /// Upper exclusive bound on an acceptable DTW distance.
    max_dtw_threshold: f64,
    /// Frames between recognition attempts.
    update_rate: usize,
    /// Minimum gap between successive firings of a held gesture.
    min_time_separation_ms: u64,
    /// Vote count a winner must strictly exceed.
    match_number: usize,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            dtw_radius: 5.0,
            min_dtw_threshold: 0.0,
            max_dtw_threshold: 500.0,
            update_rate: 10,
            min_time_separation_ms: 0,
            match_number: 0,
        }
    }
}

impl RecognitionSettings {
    /// Sakoe-Chiba band half-width.
    #[must_use]
    pub fn dtw_radius(&self) -> f64 {
        self.dtw_radius
    }

    /// Lower exclusive acceptance bound. Guards against trivial
    /// zero-distance matches from near-static windows.
    #[must_use]
    pub fn min_dtw_threshold(&self) -> f64 {
        self.min_dtw_threshold
    }

    /// Upper exclusive acceptance bound.
    #[must_use]
    pub fn max_dtw_threshold(&self) -> f64 {
        self.max_dtw_threshold
    }

    /// Frames between recognition attempts.
    #[must_use]
    pub fn update_rate(&self) -> usize {
        self.update_rate
    }

    /// Minimum re-fire gap in milliseconds.
    #[must_use]
    pub fn min_time_separation_ms(&self) -> u64 {
        self.min_time_separation_ms
    }

    /// Vote count a winner must strictly exceed.
    #[must_use]
    pub fn match_number(&self) -> usize {
        self.match_number
    }

    /// Set the DTW band radius. Must be finite and non-negative.
    pub fn set_dtw_radius(&mut self, radius: f64) -> Result<(), ConfigError> {
        if !radius.is_finite() {
            return Err(ConfigError::NonFiniteValue {
                name: "dtw_radius",
                value: radius,
            });
        }
        if radius < 0.0 {
            return Err(ConfigError::NegativeRadius { radius });
        }
        self.dtw_radius = radius;
        Ok(())
    }

    /// Set the lower acceptance bound. Must stay below the upper bound.
    pub fn set_min_dtw_threshold(&mut self, min: f64) -> Result<(), ConfigError> {
        if !min.is_finite() {
            return Err(ConfigError::NonFiniteValue {
                name: "min_dtw_threshold",
                value: min,
            });
        }
        if min >= self.max_dtw_threshold {
            return Err(ConfigError::ThresholdOrder {
                min,
                max: self.max_dtw_threshold,
            });
        }
        self.min_dtw_threshold = min;
        Ok(())
    }

    /// Set the upper acceptance bound. Must stay above the lower bound.
    pub fn set_max_dtw_threshold(&mut self, max: f64) -> Result<(), ConfigError> {
        if !max.is_finite() {
            return Err(ConfigError::NonFiniteValue {
                name: "max_dtw_threshold",
                value: max,
            });
        }
        if self.min_dtw_threshold >= max {
            return Err(ConfigError::ThresholdOrder {
                min: self.min_dtw_threshold,
                max,
            });
        }
        self.max_dtw_threshold = max;
        Ok(())
    }

    /// Set the update rate, validated against the frame window length.
    ///
    /// The rate must be positive and evenly divide `window_length` so that
    /// recognition attempts align with buffer cycles.
    pub fn set_update_rate(
        &mut self,
        update_rate: usize,
        window_length: usize,
    ) -> Result<(), ConfigError> {
        if update_rate == 0 {
            return Err(ConfigError::ZeroUpdateRate);
        }
        if window_length == 0 {
            return Err(ConfigError::ZeroWindowLength);
        }
        if window_length % update_rate != 0 {
            return Err(ConfigError::UpdateRateNotDivisor {
                update_rate,
                window_length,
            });
        }
        self.update_rate = update_rate;
        Ok(())
    }

    /// Set the minimum re-fire gap. Unconstrained.
    pub fn set_min_time_separation_ms(&mut self, ms: u64) {
        self.min_time_separation_ms = ms;
    }

    /// Set the vote minimum. Unconstrained.
    pub fn set_match_number(&mut self, count: usize) {
        self.match_number = count;
    }

    /// Check the whole settings object against a window length.
    ///
    /// Used when settings arrive wholesale (profile load) rather than
    /// through individual setters.
    pub fn validate(&self, window_length: usize) -> Result<(), ConfigError> {
        if window_length == 0 {
            return Err(ConfigError::ZeroWindowLength);
        }
        if self.update_rate == 0 {
            return Err(ConfigError::ZeroUpdateRate);
        }
        if window_length % self.update_rate != 0 {
            return Err(ConfigError::UpdateRateNotDivisor {
                update_rate: self.update_rate,
                window_length,
            });
        }
        if !self.dtw_radius.is_finite() || self.dtw_radius < 0.0 {
            return Err(ConfigError::NegativeRadius {
                radius: self.dtw_radius,
            });
        }
        if self.min_dtw_threshold >= self.max_dtw_threshold {
            return Err(ConfigError::ThresholdOrder {
                min: self.min_dtw_threshold,
                max: self.max_dtw_threshold,
            });
        }
        Ok(())
    }
}
