//! Sparse Lucas-Kanade optical flow.
//!
//! - [`lk`] tracks points on a single level, optionally seeded with an
//!   initial offset per point.
//! - [`pyramidal`] runs the single-level tracker coarse-to-fine and owns the
//!   sequential-frame [`PyramidalTracker`].
//! - [`storage`] caches the pyramids and gradients of a frame pair.

pub mod hessian;
pub mod lk;
pub mod params;
pub mod pyramidal;
pub mod storage;

pub use hessian::Hessian;
pub use lk::{estimate_level_flow, track_feature, FeatureTrack};
pub use params::{FlowParams, LkParams};
pub use pyramidal::{
    estimate_flow, estimate_flow_traced, estimate_flow_with_storage, PyramidalTracker,
};
pub use storage::{LevelBundle, PyrLkStorage};
