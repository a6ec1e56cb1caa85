//! Directional derivatives consumed by the tracker.
//!
//! Each pyramid level gets a horizontal and a vertical gradient raster of the
//! same size; see [`grad`] for kernel normalization and sign conventions.

pub mod grad;

pub use grad::{scharr_gradients, sobel_gradients, Grad, GradientOperator};
