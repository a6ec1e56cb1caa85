#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flow;
pub mod image;
pub mod types;

// Building blocks of the tracker; public for advanced use.
pub mod edges;
pub mod pyramid;

// --- High-level re-exports -------------------------------------------------

// Main entry points: pyramidal flow + session tracker.
pub use crate::flow::{
    estimate_flow, estimate_flow_traced, estimate_flow_with_storage, FlowParams, LkParams,
    PyrLkStorage, PyramidalTracker,
};
pub use crate::types::{FeatureStatus, FlowEstimate, Point2};

pub use crate::diagnostics::{FlowTrace, LevelTrace};
pub use crate::error::{FlowError, FlowResult};
pub use crate::image::{ImageF32, ImageU8};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use lk_flow::prelude::*;
///
/// # fn main() -> Result<(), FlowError> {
/// let (w, h) = (640usize, 480usize);
/// let gray_a = vec![0u8; w * h];
/// let gray_b = vec![0u8; w * h];
/// let a = ImageU8::from_slice(&gray_a, w, h)?.to_f32();
/// let b = ImageU8::from_slice(&gray_b, w, h)?.to_f32();
///
/// let mut tracker = PyramidalTracker::new(FlowParams::default().with_pyr_levels(3))?;
/// let est = tracker.track(&a, &b, &[[320.0, 240.0]])?;
/// println!("tracked={} of {}", est.success_count(), est.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageF32, ImageU8};
    pub use crate::{
        estimate_flow, FeatureStatus, FlowError, FlowEstimate, FlowParams, LkParams,
        PyramidalTracker,
    };
}
