//! Coarse-to-fine pyramidal tracking.
//!
//! Points are mapped onto the coarsest level and tracked there first. After
//! each level the tracked and reference positions are doubled and their
//! difference seeds the search on the next finer level. A point that fails on
//! some level is dropped from the finer levels and keeps that level's status
//! and error; its position is still carried to full resolution.
use super::lk::{track_indices, FeatureTrack};
use super::params::{FlowParams, LkParams};
use super::storage::PyrLkStorage;
use crate::diagnostics::{FlowTrace, LevelTrace};
use crate::error::{FlowError, FlowResult};
use crate::image::ImageF32;
use crate::pyramid::{LevelScaleMap, ScaleMap};
use crate::types::{FeatureStatus, FlowEstimate, Point2};
use log::{debug, warn};
use std::time::Instant;

fn track_storage(
    storage: &PyrLkStorage,
    prev_points: &[Point2],
    params: &LkParams,
) -> FlowResult<(FlowEstimate, FlowTrace)> {
    if !storage.is_processed() {
        return Err(FlowError::StorageNotProcessed);
    }
    let top = storage.pyr_levels();
    let coarsest = storage.prev_level(top)?;
    if coarsest.width() < params.window_size || coarsest.height() < params.window_size {
        warn!(
            "coarsest level {} is {}x{}, smaller than the {}px tracking window",
            top,
            coarsest.width(),
            coarsest.height(),
            params.window_size
        );
    }

    let n = prev_points.len();
    let map = LevelScaleMap::dyadic();
    let mut reference: Vec<Point2> = prev_points
        .iter()
        .map(|&p| map.down_levels(p, top))
        .collect();
    let mut tracked = reference.clone();
    let mut estimates: Vec<Point2> = vec![[0.0, 0.0]; n];
    let mut status = vec![FeatureStatus::Success; n];
    let mut error = vec![0.0f32; n];
    let mut active: Vec<usize> = (0..n).collect();

    let mut trace = FlowTrace {
        levels: Vec::with_capacity(top + 1),
        timings: storage.timings().clone(),
        reused_previous: storage.last_reused(),
    };
    let tracking_start = Instant::now();

    for level in (0..=top).rev() {
        let level_start = Instant::now();
        let (prev, curr) = storage.level_pair(level)?;
        let tracks = track_indices(prev, curr, &reference, &estimates, &active, params);

        let mut succeeded = 0;
        let mut iteration_sum = 0;
        for (&i, track) in active.iter().zip(&tracks) {
            let FeatureTrack {
                position,
                status: s,
                error: e,
                iterations,
            } = *track;
            tracked[i] = position;
            status[i] = s;
            error[i] = e;
            iteration_sum += iterations;
            if s.is_success() {
                succeeded += 1;
            }
        }

        let elapsed_ms = level_start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "level {} ({}x{}): {} active, {} succeeded",
            level,
            prev.width(),
            prev.height(),
            active.len(),
            succeeded
        );
        trace.levels.push(LevelTrace {
            level,
            width: prev.width(),
            height: prev.height(),
            active: active.len(),
            succeeded,
            mean_iterations: if active.is_empty() {
                0.0
            } else {
                iteration_sum as f32 / active.len() as f32
            },
            elapsed_ms,
        });
        trace.timings.push(format!("track_level_{level}"), elapsed_ms);

        if level > 0 {
            // Every position moves to the finer level so that dropped points
            // end up in full-resolution coordinates.
            for (p, r) in tracked.iter_mut().zip(reference.iter_mut()) {
                *p = map.up(*p);
                *r = map.up(*r);
            }
            for &i in &active {
                estimates[i] = [
                    tracked[i][0] - reference[i][0],
                    tracked[i][1] - reference[i][1],
                ];
            }
            active.retain(|&i| status[i].is_success());
        }
    }
    trace.timings.total_ms += tracking_start.elapsed().as_secs_f64() * 1000.0;

    Ok((
        FlowEstimate {
            points: tracked,
            status,
            error,
        },
        trace,
    ))
}

/// Track `prev_points` through a storage that has already processed a frame
/// pair. The pyramid depth is the storage's.
pub fn estimate_flow_with_storage(
    storage: &PyrLkStorage,
    prev_points: &[Point2],
    params: &LkParams,
) -> FlowResult<FlowEstimate> {
    params.validate()?;
    track_storage(storage, prev_points, params).map(|(estimate, _)| estimate)
}

/// Pyramidal flow between two frames with a one-shot storage.
pub fn estimate_flow(
    prev: &ImageF32,
    curr: &ImageF32,
    prev_points: &[Point2],
    params: &FlowParams,
) -> FlowResult<FlowEstimate> {
    estimate_flow_traced(prev, curr, prev_points, params).map(|(estimate, _)| estimate)
}

/// [`estimate_flow`] plus per-level diagnostics.
pub fn estimate_flow_traced(
    prev: &ImageF32,
    curr: &ImageF32,
    prev_points: &[Point2],
    params: &FlowParams,
) -> FlowResult<(FlowEstimate, FlowTrace)> {
    params.validate()?;
    debug!(
        "estimate_flow points={} pyr_levels={} frame={}x{}",
        prev_points.len(),
        params.pyr_levels,
        prev.w,
        prev.h
    );
    let mut storage = PyrLkStorage::new(params.pyr_levels).with_gradient(params.gradient);
    storage.process(prev, curr)?;
    track_storage(&storage, prev_points, &params.lk)
}

/// Tracker for frame sequences.
///
/// Keeps a [`PyrLkStorage`] between calls so that tracking `(A, B)` followed
/// by `(B, C)` builds only the pyramid of `C` on the second call.
///
/// ```
/// use lk_flow::{FlowParams, ImageF32, PyramidalTracker};
///
/// let mut tracker = PyramidalTracker::new(FlowParams::default())?;
/// let a = ImageF32::new(64, 48);
/// let b = a.clone();
/// let est = tracker.track(&a, &b, &[[32.0, 24.0]])?;
/// assert_eq!(est.len(), 1);
/// # Ok::<(), lk_flow::FlowError>(())
/// ```
#[derive(Clone, Debug)]
pub struct PyramidalTracker {
    params: FlowParams,
    storage: PyrLkStorage,
}

impl PyramidalTracker {
    pub fn new(params: FlowParams) -> FlowResult<Self> {
        params.validate()?;
        Ok(Self {
            storage: PyrLkStorage::new(params.pyr_levels).with_gradient(params.gradient),
            params,
        })
    }

    pub fn params(&self) -> &FlowParams {
        &self.params
    }

    pub fn storage(&self) -> &PyrLkStorage {
        &self.storage
    }

    pub fn track(
        &mut self,
        prev: &ImageF32,
        curr: &ImageF32,
        prev_points: &[Point2],
    ) -> FlowResult<FlowEstimate> {
        self.track_traced(prev, curr, prev_points)
            .map(|(estimate, _)| estimate)
    }

    pub fn track_traced(
        &mut self,
        prev: &ImageF32,
        curr: &ImageF32,
        prev_points: &[Point2],
    ) -> FlowResult<(FlowEstimate, FlowTrace)> {
        self.storage.process(prev, curr)?;
        track_storage(&self.storage, prev_points, &self.params.lk)
    }

    /// Free the cached pyramids; the tracker stays usable.
    pub fn release(&mut self) {
        self.storage.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unprocessed_storage_is_an_error() {
        let storage = PyrLkStorage::new(2);
        let err = estimate_flow_with_storage(&storage, &[[1.0, 1.0]], &LkParams::default())
            .expect_err("no frames yet");
        assert!(matches!(err, FlowError::StorageNotProcessed));
    }

    #[test]
    fn invalid_params_fail_before_tracking() {
        let img = ImageF32::new(32, 32);
        let params = FlowParams::default().with_lk(LkParams::default().with_window_size(1));
        assert!(matches!(
            estimate_flow(&img, &img, &[[16.0, 16.0]], &params),
            Err(FlowError::InvalidParams(_))
        ));
        assert!(PyramidalTracker::new(params).is_err());
    }

    #[test]
    fn empty_point_set_yields_empty_estimate() {
        let img = ImageF32::new(32, 32);
        let (est, trace) =
            estimate_flow_traced(&img, &img, &[], &FlowParams::default()).expect("valid input");
        assert!(est.is_empty());
        assert_eq!(trace.levels.len(), 2);
        assert!(trace.levels.iter().all(|l| l.active == 0));
    }

    #[test]
    fn failed_points_end_in_full_resolution_coordinates() {
        let mut flat = ImageF32::new(64, 64);
        flat.data.iter_mut().for_each(|v| *v = 90.0);
        let params = FlowParams::default()
            .with_pyr_levels(2)
            .with_lk(LkParams::default().with_window_size(7));
        let (est, trace) =
            estimate_flow_traced(&flat, &flat, &[[32.0, 20.0]], &params).expect("valid input");
        assert_eq!(est.status[0], FeatureStatus::SmallEigenValue);
        assert_eq!(est.points[0], [32.0, 20.0]);
        let active: Vec<_> = trace.levels.iter().map(|l| l.active).collect();
        assert_eq!(active, vec![1, 0, 0]);
    }
}
