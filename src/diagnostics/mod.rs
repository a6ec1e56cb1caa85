//! Diagnostics returned by the traced flow entry points.
//!
//! A [`FlowTrace`] records, per pyramid level, how many points were tracked and
//! how many succeeded, alongside the storage build timings. Everything here is
//! plain serde data so tools can dump it as JSON.

pub mod timing;
pub mod trace;

pub use timing::{StageTiming, TimingBreakdown};
pub use trace::{FlowTrace, LevelTrace};
