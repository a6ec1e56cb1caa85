//! Image pyramid with separable blur and 2× decimation.
//!
//! Level 0 is the input raster unchanged; every further level applies the
//! configured separable filter (5-tap binomial by default) and keeps every
//! other pixel. Borders clamp (replicate). All channels are filtered
//! independently.
//!
//! Complexity per level is O(W·H·C) with two 1D passes; total memory is about
//! 4/3 of the base raster.

mod build;
pub mod filters;
mod options;
mod scaling;

pub use build::Pyramid;
pub use filters::{SeparableFilter, StaticSeparableFilter, GAUSSIAN_5TAP};
pub use options::PyramidOptions;
pub use scaling::{LevelScaleMap, ScaleMap};
