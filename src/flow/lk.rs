//! Single-level Lucas-Kanade feature tracking.
//!
//! For every point a `window_size × window_size` patch around its previous
//! position is the reference. The spatial Hessian of that patch (from the
//! previous frame's gradients) is fixed for the whole search; each iteration
//! samples the current frame at the running estimate, forms the mismatch
//! vector against the current frame's gradients and applies a Newton step.
//!
//! Rejections, in evaluation order:
//! - `OutOfBounds`: less than 99 % of the window lies inside the raster (or
//!   the window is larger than the raster), either at the start or at any
//!   running estimate;
//! - `SmallEigenValue`: the normalized minimum eigenvalue of the Hessian is
//!   below `max(1e-4, min_eigen_value)`;
//! - `Drifted`: the estimate moved more than `window_size` pixels away from
//!   where this level's search started (`position + estimate`) on either axis.
//!   The offset inherited from coarser levels is not counted, so the pyramid
//!   recovers motions up to about `window_size · 2^pyr_levels`.
//!
//! Sums run in f64 over all window pixels and channels; samples and positions
//! stay f32.
use super::hessian::{mismatch, Hessian};
use super::params::LkParams;
use super::storage::{LevelBundle, PyrLkStorage};
use crate::error::{FlowError, FlowResult};
use crate::image::{intersection_percent, sample_subpixel, ImageF32, Window};
use crate::types::{FeatureStatus, FlowEstimate, Point2};
use log::debug;

/// Minimum window/raster overlap is `1 - BOUNDS_TOLERANCE`.
pub const BOUNDS_TOLERANCE: f32 = 1e-2;

/// Outcome of tracking one point on one level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureTrack {
    /// Current-frame position on the tracked level. For rejected points this
    /// is the last estimate reached.
    pub position: Point2,
    pub status: FeatureStatus,
    /// Mean absolute patch difference of the last evaluated window / 255.
    pub error: f32,
    /// Newton iterations performed.
    pub iterations: usize,
}

impl FeatureTrack {
    fn rejected(position: Point2, status: FeatureStatus) -> Self {
        Self {
            position,
            status,
            error: 0.0,
            iterations: 0,
        }
    }
}

/// Reusable patch buffers; one per worker.
#[derive(Default)]
struct PatchScratch {
    reference: Vec<f32>,
    current: Vec<f32>,
    grad_x: Vec<f32>,
    grad_y: Vec<f32>,
}

/// The window must fit the raster; then the smaller-area overlap of
/// [`intersection_percent`] is the fraction of the window inside it.
fn within_raster(window: &Window, raster: &Window) -> bool {
    window.x.is_finite()
        && window.y.is_finite()
        && window.width <= raster.width
        && window.height <= raster.height
        && intersection_percent(window, raster) >= 1.0 - BOUNDS_TOLERANCE
}

impl PatchScratch {
    /// Sample image, gx and gy of `bundle` over `window`.
    fn sample_gradients(&mut self, bundle: &LevelBundle, window: &Window) -> FlowResult<()> {
        sample_subpixel(&bundle.grad_x, window, &mut self.grad_x)?;
        sample_subpixel(&bundle.grad_y, window, &mut self.grad_y)
    }

    fn track(
        &mut self,
        prev: &LevelBundle,
        curr: &LevelBundle,
        position: Point2,
        estimate: Point2,
        params: &LkParams,
    ) -> FeatureTrack {
        let size = params.window_size;
        let raster = Window::of_image(&prev.image);
        let seed = [position[0] + estimate[0], position[1] + estimate[1]];
        let mut current = seed;

        let start = Window::centered(position, size);
        if !within_raster(&start, &raster)
            || sample_subpixel(&prev.image, &start, &mut self.reference).is_err()
            || self.sample_gradients(prev, &start).is_err()
        {
            return FeatureTrack::rejected(current, FeatureStatus::OutOfBounds);
        }

        let hessian = Hessian::from_gradients(&self.grad_x, &self.grad_y);
        let kernel_weight = f64::from(prev.gradient.kernel_weight());
        if hessian.normalized_min_eigenvalue(size, kernel_weight) < params.eigen_threshold() {
            return FeatureTrack::rejected(current, FeatureStatus::SmallEigenValue);
        }

        let samples = self.reference.len().max(1) as f64;
        let mut error = 0.0f32;
        let mut iterations = 0;
        while iterations < params.iterations {
            let window = Window::centered(current, size);
            if !within_raster(&window, &raster)
                || sample_subpixel(&curr.image, &window, &mut self.current).is_err()
                || self.sample_gradients(curr, &window).is_err()
            {
                return FeatureTrack {
                    position: current,
                    status: FeatureStatus::OutOfBounds,
                    error,
                    iterations,
                };
            }

            let mut abs_sum = 0.0f64;
            for (cur, &reference) in self.current.iter_mut().zip(&self.reference) {
                *cur -= reference;
                abs_sum += f64::from(cur.abs());
            }
            error = (abs_sum / (samples * 255.0)) as f32;
            iterations += 1;

            let b = mismatch(&self.grad_x, &self.grad_y, &self.current);
            let Some(step) = hessian.solve(&b) else {
                return FeatureTrack {
                    position: current,
                    status: FeatureStatus::SmallEigenValue,
                    error,
                    iterations,
                };
            };
            // Gradients are positive derivatives, so the residual is reduced
            // by moving against the solved step.
            let (dx, dy) = (step.x as f32, step.y as f32);
            current[0] -= dx;
            current[1] -= dy;

            let limit = size as f32;
            if (current[0] - seed[0]).abs() > limit || (current[1] - seed[1]).abs() > limit {
                return FeatureTrack {
                    position: current,
                    status: FeatureStatus::Drifted,
                    error,
                    iterations,
                };
            }
            if dx.abs() < params.min_feature_shift && dy.abs() < params.min_feature_shift {
                break;
            }
        }

        FeatureTrack {
            position: current,
            status: FeatureStatus::Success,
            error,
            iterations,
        }
    }
}

/// Track one point between two bundles of the same level.
///
/// `estimate` is the initial offset of the current-frame position relative
/// to `position`.
pub fn track_feature(
    prev: &LevelBundle,
    curr: &LevelBundle,
    position: Point2,
    estimate: Point2,
    params: &LkParams,
) -> FeatureTrack {
    PatchScratch::default().track(prev, curr, position, estimate, params)
}

/// Track `points[i]` with offset `estimates[i]` for every `i` in `indices`,
/// returning results in `indices` order.
#[cfg(feature = "parallel")]
pub(crate) fn track_indices(
    prev: &LevelBundle,
    curr: &LevelBundle,
    points: &[Point2],
    estimates: &[Point2],
    indices: &[usize],
    params: &LkParams,
) -> Vec<FeatureTrack> {
    use rayon::prelude::*;

    indices
        .par_iter()
        .map_init(PatchScratch::default, |scratch, &i| {
            scratch.track(prev, curr, points[i], estimates[i], params)
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn track_indices(
    prev: &LevelBundle,
    curr: &LevelBundle,
    points: &[Point2],
    estimates: &[Point2],
    indices: &[usize],
    params: &LkParams,
) -> Vec<FeatureTrack> {
    let mut scratch = PatchScratch::default();
    indices
        .iter()
        .map(|&i| scratch.track(prev, curr, points[i], estimates[i], params))
        .collect()
}

/// Track every point on one level of a processed storage.
///
/// `prev_points` and `estimates` are in that level's coordinates and must have
/// the same length.
pub fn estimate_level_flow(
    storage: &PyrLkStorage,
    level: usize,
    prev_points: &[Point2],
    estimates: &[Point2],
    params: &LkParams,
) -> FlowResult<Vec<FeatureTrack>> {
    if estimates.len() != prev_points.len() {
        return Err(FlowError::LengthMismatch {
            what: "initial estimate",
            expected: prev_points.len(),
            actual: estimates.len(),
        });
    }
    let (prev, curr) = storage.level_pair(level)?;
    let indices: Vec<usize> = (0..prev_points.len()).collect();
    Ok(track_indices(
        prev,
        curr,
        prev_points,
        estimates,
        &indices,
        params,
    ))
}

/// Non-pyramidal flow between two full-resolution frames.
///
/// `initial_estimate`, when given, holds one offset per point that seeds the
/// search; otherwise every search starts at the previous position.
pub fn estimate_flow(
    prev: &ImageF32,
    curr: &ImageF32,
    prev_points: &[Point2],
    initial_estimate: Option<&[Point2]>,
    params: &LkParams,
) -> FlowResult<FlowEstimate> {
    params.validate()?;
    let zeros;
    let estimates = match initial_estimate {
        Some(estimates) => estimates,
        None => {
            zeros = vec![[0.0, 0.0]; prev_points.len()];
            &zeros
        }
    };
    if estimates.len() != prev_points.len() {
        return Err(FlowError::LengthMismatch {
            what: "initial estimate",
            expected: prev_points.len(),
            actual: estimates.len(),
        });
    }

    debug!(
        "lk::estimate_flow points={} window={} frame={}x{}",
        prev_points.len(),
        params.window_size,
        prev.w,
        prev.h
    );
    let mut storage = PyrLkStorage::new(0);
    storage.process(prev, curr)?;
    let tracks = estimate_level_flow(&storage, 0, prev_points, estimates, params)?;
    Ok(FlowEstimate {
        points: tracks.iter().map(|t| t.position).collect(),
        status: tracks.iter().map(|t| t.status).collect(),
        error: tracks.iter().map(|t| t.error).collect(),
    })
}
