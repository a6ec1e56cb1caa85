/// Separable 1D smoothing kernel applied before each 2× decimation.
pub trait SeparableFilter {
    /// Symmetric taps, left to right.
    fn taps(&self) -> &[f32];

    fn radius(&self) -> usize {
        self.taps().len() / 2
    }
}

/// Kernel with `'static` taps.
#[derive(Clone, Copy, Debug)]
pub struct StaticSeparableFilter {
    taps: &'static [f32],
}

impl StaticSeparableFilter {
    pub const fn new(taps: &'static [f32]) -> Self {
        Self { taps }
    }
}

impl SeparableFilter for StaticSeparableFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        self.taps
    }
}

/// Normalised 5-tap binomial `[1, 4, 6, 4, 1] / 16`, the classic `pyrDown` kernel.
pub const GAUSSIAN_5TAP: StaticSeparableFilter =
    StaticSeparableFilter::new(&[0.0625, 0.25, 0.375, 0.25, 0.0625]);
