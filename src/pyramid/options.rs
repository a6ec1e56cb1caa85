use super::filters::{StaticSeparableFilter, GAUSSIAN_5TAP};

/// How many levels to build and which decimation steps are smoothed.
#[derive(Clone, Copy, Debug)]
pub struct PyramidOptions {
    /// Levels including full resolution (>= 1).
    pub levels: usize,
    /// Leading decimation steps preceded by the blur; `0` never blurs.
    pub blur_levels: usize,
    pub filter: StaticSeparableFilter,
}

impl PyramidOptions {
    /// `levels` total levels, 5-tap binomial blur before every decimation.
    pub fn new(levels: usize) -> Self {
        Self {
            levels,
            blur_levels: levels.saturating_sub(1),
            filter: GAUSSIAN_5TAP,
        }
    }

    pub fn with_blur_levels(mut self, blur_levels: usize) -> Self {
        self.blur_levels = blur_levels;
        self
    }
}
