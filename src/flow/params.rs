//! Tracker parameters.
//!
//! Defaults follow the classic KLT settings: a 15×15 window, up to 30
//! iterations, convergence once the per-iteration shift drops below 0.1 px and
//! a normalized minimum-eigenvalue gate of 0.01. One pyramid level above full
//! resolution is used unless configured otherwise.
//!
//! Both structs deserialize with `#[serde(default)]`, so a partial JSON
//! document only overrides the fields it names (see [`crate::config`]).

use crate::edges::GradientOperator;
use crate::error::{FlowError, FlowResult};
use serde::{Deserialize, Serialize};

/// Absolute floor applied to the normalized minimum eigenvalue.
pub const MIN_EIGEN_FLOOR: f32 = 1e-4;

/// Single-level Lucas-Kanade parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LkParams {
    /// Side of the square tracking window in pixels (>= 2).
    pub window_size: usize,
    /// Maximum Newton iterations per level.
    pub iterations: usize,
    /// Iteration stops once |dx| and |dy| are both below this shift (px).
    pub min_feature_shift: f32,
    /// Minimum normalized eigenvalue of the window Hessian. Values below
    /// [`MIN_EIGEN_FLOOR`] are raised to it.
    pub min_eigen_value: f32,
    /// Threshold for [`FlowEstimate::reject_large_errors`](crate::types::FlowEstimate::reject_large_errors).
    /// The tracker itself never applies it.
    pub max_error: f32,
}

impl Default for LkParams {
    fn default() -> Self {
        Self {
            window_size: 15,
            iterations: 30,
            min_feature_shift: 0.1,
            min_eigen_value: 0.01,
            max_error: 0.1,
        }
    }
}

impl LkParams {
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_min_feature_shift(mut self, min_feature_shift: f32) -> Self {
        self.min_feature_shift = min_feature_shift;
        self
    }

    pub fn with_min_eigen_value(mut self, min_eigen_value: f32) -> Self {
        self.min_eigen_value = min_eigen_value;
        self
    }

    pub fn with_max_error(mut self, max_error: f32) -> Self {
        self.max_error = max_error;
        self
    }

    /// Effective eigenvalue threshold: `max(1e-4, min_eigen_value)`.
    pub fn eigen_threshold(&self) -> f64 {
        f64::from(self.min_eigen_value.max(MIN_EIGEN_FLOOR))
    }

    pub fn validate(&self) -> FlowResult<()> {
        if self.window_size < 2 {
            return Err(FlowError::InvalidParams(format!(
                "window_size must be at least 2, got {}",
                self.window_size
            )));
        }
        if !(self.min_feature_shift.is_finite() && self.min_feature_shift > 0.0) {
            return Err(FlowError::InvalidParams(format!(
                "min_feature_shift must be positive and finite, got {}",
                self.min_feature_shift
            )));
        }
        if !(self.min_eigen_value.is_finite() && self.min_eigen_value >= 0.0) {
            return Err(FlowError::InvalidParams(format!(
                "min_eigen_value must be non-negative and finite, got {}",
                self.min_eigen_value
            )));
        }
        if self.max_error.is_nan() || self.max_error < 0.0 {
            return Err(FlowError::InvalidParams(format!(
                "max_error must be non-negative, got {}",
                self.max_error
            )));
        }
        Ok(())
    }
}

/// Pyramidal tracker configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowParams {
    /// Number of levels above full resolution; `0` disables the pyramid.
    pub pyr_levels: usize,
    pub lk: LkParams,
    /// Derivative operator applied on every level.
    pub gradient: GradientOperator,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self::new(1, LkParams::default())
    }
}

impl FlowParams {
    pub fn new(pyr_levels: usize, lk: LkParams) -> Self {
        Self {
            pyr_levels,
            lk,
            gradient: GradientOperator::default(),
        }
    }

    pub fn with_pyr_levels(mut self, pyr_levels: usize) -> Self {
        self.pyr_levels = pyr_levels;
        self
    }

    pub fn with_lk(mut self, lk: LkParams) -> Self {
        self.lk = lk;
        self
    }

    pub fn with_gradient(mut self, gradient: GradientOperator) -> Self {
        self.gradient = gradient;
        self
    }

    pub fn validate(&self) -> FlowResult<()> {
        // 2^pyr_levels must stay representable when scaling coordinates.
        if self.pyr_levels > 16 {
            return Err(FlowError::InvalidParams(format!(
                "pyr_levels must be at most 16, got {}",
                self.pyr_levels
            )));
        }
        self.lk.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_klt_settings() {
        let p = FlowParams::default();
        assert_eq!(p.pyr_levels, 1);
        assert_eq!(p.lk.window_size, 15);
        assert_eq!(p.lk.iterations, 30);
        assert_eq!(p.gradient, GradientOperator::Sobel);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn eigen_threshold_is_floored() {
        let lk = LkParams::default().with_min_eigen_value(0.0);
        assert_eq!(lk.eigen_threshold(), f64::from(MIN_EIGEN_FLOOR));
        let lk = LkParams::default().with_min_eigen_value(0.5);
        assert_eq!(lk.eigen_threshold(), 0.5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let base = LkParams::default();
        let bad = [
            base.with_window_size(1),
            base.with_min_feature_shift(0.0),
            base.with_min_feature_shift(f32::NAN),
            base.with_min_eigen_value(-1.0),
            base.with_min_eigen_value(f32::INFINITY),
            base.with_max_error(-0.5),
        ];
        for params in bad {
            assert!(
                matches!(params.validate(), Err(FlowError::InvalidParams(_))),
                "expected rejection for {params:?}"
            );
        }
        assert!(FlowParams::default().with_pyr_levels(40).validate().is_err());
    }
}
