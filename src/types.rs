use serde::{Deserialize, Serialize};

/// Image coordinate `[x, y]` in pixels of some pyramid level.
pub type Point2 = [f32; 2];

/// Outcome of tracking one point on one pyramid level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureStatus {
    /// Converged or exhausted the iteration budget with valid geometry.
    Success,
    /// Moved further than the window size from its start; usually low texture.
    Drifted,
    /// The search window left the usable image area.
    OutOfBounds,
    /// Window gradients too weak for a stable 2×2 solve.
    SmallEigenValue,
    /// Reserved for callers; never produced by the tracker.
    Failed,
    /// Tracking error above the caller's threshold; see
    /// [`FlowEstimate::reject_large_errors`].
    LargeError,
}

impl FeatureStatus {
    #[inline]
    pub fn is_success(self) -> bool {
        self == FeatureStatus::Success
    }
}

/// Per-point output of a flow estimation, in input order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEstimate {
    /// Tracked positions in full-resolution coordinates.
    pub points: Vec<Point2>,
    pub status: Vec<FeatureStatus>,
    /// Mean absolute patch difference on the last evaluated window, divided
    /// by 255. Zero for points rejected before the first iteration.
    pub error: Vec<f32>,
}

impl FlowEstimate {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.status.iter().filter(|s| s.is_success()).count()
    }

    /// Iterate `(point, status, error)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (Point2, FeatureStatus, f32)> + '_ {
        self.points
            .iter()
            .zip(&self.status)
            .zip(&self.error)
            .map(|((&p, &s), &e)| (p, s, e))
    }

    /// Downgrade successful points whose error exceeds `max_error` to
    /// [`FeatureStatus::LargeError`]. Returns the number of points downgraded.
    pub fn reject_large_errors(&mut self, max_error: f32) -> usize {
        let mut rejected = 0;
        for (status, &error) in self.status.iter_mut().zip(&self.error) {
            if status.is_success() && error > max_error {
                *status = FeatureStatus::LargeError;
                rejected += 1;
            }
        }
        rejected
    }
}
