//! Velocity-capped convergence of the alignment vector toward a target.

use crate::{
    axis::AlignmentVector,
    constants::{DEFAULT_MAX_STEP, DEFAULT_MIN_STEP, DEFAULT_SMOOTHING_FACTOR},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Step bounds of the smoother
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherParams {
    /// Smallest per-tick step
    pub min_step: f64,
    /// Largest per-tick step
    pub max_step: f64,
    /// Fraction of the remaining distance covered per tick
    pub smoothing_factor: f64,
}

impl Default for SmootherParams {
    fn default() -> Self {
        Self {
            min_step: DEFAULT_MIN_STEP,
            max_step: DEFAULT_MAX_STEP,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
        }
    }
}

impl SmootherParams {
    /// Check that the step bounds are usable
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive or inverted bounds
    pub fn validate(&self) -> Result<()> {
        if !(self.min_step > 0.0 && self.max_step > 0.0) {
            return Err(Error::ConfigError("Smoothing steps must be positive".to_string()));
        }
        if self.min_step > self.max_step {
            return Err(Error::ConfigError(
                "Smoothing min_step must not exceed max_step".to_string(),
            ));
        }
        if !(self.smoothing_factor > 0.0) {
            return Err(Error::ConfigError("Smoothing factor must be positive".to_string()));
        }
        Ok(())
    }
}

/// Holds the alignment vector and advances it one tick at a time
#[derive(Debug, Clone)]
pub struct AlignmentSmoother {
    alignment: AlignmentVector,
    params: SmootherParams,
}

impl AlignmentSmoother {
    #[must_use]
    pub const fn new(initial: AlignmentVector, params: SmootherParams) -> Self {
        Self {
            alignment: initial,
            params,
        }
    }

    /// Current alignment
    #[must_use]
    pub const fn alignment(&self) -> AlignmentVector {
        self.alignment
    }

    #[must_use]
    pub const fn params(&self) -> SmootherParams {
        self.params
    }

    /// Jump to `alignment` without smoothing
    pub fn reset(&mut self, alignment: AlignmentVector) {
        self.alignment = alignment;
    }

    /// Move each axis toward `target` by at most one clamped step.
    ///
    /// The step is `|distance| * smoothing_factor` clamped into
    /// `[min_step, max_step]`; an axis within one step of its target lands
    /// on it exactly, so the alignment never overshoots.
    pub fn step(&mut self, target: &AlignmentVector) -> AlignmentVector {
        let SmootherParams {
            min_step,
            max_step,
            smoothing_factor,
        } = self.params;

        for (current, goal) in self.alignment.iter_mut().zip(target.iter()) {
            if !goal.is_finite() {
                continue;
            }
            let distance = goal - *current;
            let step = (distance.abs() * smoothing_factor).clamp(min_step, max_step);

            if distance.abs() > step {
                *current += distance.signum() * step;
            } else {
                *current = *goal;
            }
        }

        self.alignment
    }
}
