//! Coordinate mapping between pyramid levels.
//!
//! Levels are built by 2× decimation that keeps even pixels, so a point at
//! `(x, y)` on level `l` sits at `(2x, 2y)` on level `l - 1`.
use crate::types::Point2;

/// Coordinate mapping between adjacent pyramid levels `l+1` (coarse) and `l`.
pub trait ScaleMap {
    fn up(&self, p_coarse: Point2) -> Point2;
    fn down(&self, p_fine: Point2) -> Point2;

    /// Map a full-resolution point onto level `levels`.
    fn down_levels(&self, p: Point2, levels: usize) -> Point2 {
        (0..levels).fold(p, |acc, _| self.down(acc))
    }

    /// Map a level-`levels` point back to full resolution.
    fn up_levels(&self, p: Point2, levels: usize) -> Point2 {
        (0..levels).fold(p, |acc, _| self.up(acc))
    }
}

/// Per-axis scale factors between a coarse level and the next finer one.
#[derive(Clone, Copy, Debug)]
pub struct LevelScaleMap {
    sx: f32,
    sy: f32,
}

impl LevelScaleMap {
    pub fn new(sx: f32, sy: f32) -> Self {
        Self { sx, sy }
    }

    /// Exact factor-of-two mapping used by [`Pyramid`](super::Pyramid).
    pub fn dyadic() -> Self {
        Self::new(2.0, 2.0)
    }
}

impl Default for LevelScaleMap {
    fn default() -> Self {
        Self::dyadic()
    }
}

impl ScaleMap for LevelScaleMap {
    #[inline]
    fn up(&self, p_coarse: Point2) -> Point2 {
        [p_coarse[0] * self.sx, p_coarse[1] * self.sy]
    }

    #[inline]
    fn down(&self, p_fine: Point2) -> Point2 {
        [p_fine[0] / self.sx, p_fine[1] / self.sy]
    }
}
