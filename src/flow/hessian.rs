//! 2×2 structure tensor of a tracking window and its Cramer solve.
use nalgebra::{Matrix2, Vector2};

/// Spatial-gradient Hessian `[[Ixx, Ixy], [Ixy, Iyy]]` accumulated in f64.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hessian {
    pub m: Matrix2<f64>,
}

impl Default for Hessian {
    fn default() -> Self {
        Self {
            m: Matrix2::zeros(),
        }
    }
}

impl Hessian {
    /// Sum `gx·gx`, `gx·gy`, `gy·gy` over paired samples (all channels).
    pub fn from_gradients(gx: &[f32], gy: &[f32]) -> Self {
        let (mut xx, mut xy, mut yy) = (0.0f64, 0.0f64, 0.0f64);
        for (&ix, &iy) in gx.iter().zip(gy) {
            let (ix, iy) = (f64::from(ix), f64::from(iy));
            xx += ix * ix;
            xy += ix * iy;
            yy += iy * iy;
        }
        Self {
            m: Matrix2::new(xx, xy, xy, yy),
        }
    }

    #[inline]
    pub fn ixx(&self) -> f64 {
        self.m[(0, 0)]
    }

    #[inline]
    pub fn ixy(&self) -> f64 {
        self.m[(0, 1)]
    }

    #[inline]
    pub fn iyy(&self) -> f64 {
        self.m[(1, 1)]
    }

    /// Smaller eigenvalue, closed form for a symmetric 2×2 matrix.
    pub fn min_eigenvalue(&self) -> f64 {
        let (xx, xy, yy) = (self.ixx(), self.ixy(), self.iyy());
        let diff = xx - yy;
        let disc = (diff * diff + 4.0 * xy * xy).max(0.0);
        (xx + yy - disc.sqrt()) * 0.5
    }

    /// Minimum eigenvalue on the scale of the eigenvalue gate.
    ///
    /// The gate is expressed for raw (unnormalized) 3×3 kernel responses, so
    /// the eigenvalue is first multiplied by `kernel_weight²` and then divided
    /// by `window_size² · 255`.
    pub fn normalized_min_eigenvalue(&self, window_size: usize, kernel_weight: f64) -> f64 {
        let n = (window_size * window_size) as f64;
        self.min_eigenvalue() * kernel_weight * kernel_weight / (n * 255.0)
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.ixx() * self.iyy() - self.ixy() * self.ixy()
    }

    /// Solve `H · d = b` by Cramer's rule. `None` for a singular matrix or a
    /// non-finite result.
    pub fn solve(&self, b: &Vector2<f64>) -> Option<Vector2<f64>> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let dx = (self.iyy() * b.x - self.ixy() * b.y) / det;
        let dy = (self.ixx() * b.y - self.ixy() * b.x) / det;
        let d = Vector2::new(dx, dy);
        (dx.is_finite() && dy.is_finite()).then_some(d)
    }
}

/// Mismatch vector `(Σ gx·diff, Σ gy·diff)`.
pub fn mismatch(gx: &[f32], gy: &[f32], diff: &[f32]) -> Vector2<f64> {
    let (mut bx, mut by) = (0.0f64, 0.0f64);
    for ((&ix, &iy), &d) in gx.iter().zip(gy).zip(diff) {
        let d = f64::from(d);
        bx += f64::from(ix) * d;
        by += f64::from(iy) * d;
    }
    Vector2::new(bx, by)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_tensor_eigenvalue_is_smaller_entry() {
        let h = Hessian::from_gradients(&[2.0, 0.0], &[0.0, 1.0]);
        assert_eq!(h.ixx(), 4.0);
        assert_eq!(h.iyy(), 1.0);
        assert_eq!(h.ixy(), 0.0);
        assert!((h.min_eigenvalue() - 1.0).abs() < 1e-12);
        assert!((h.normalized_min_eigenvalue(2, 1.0) - 1.0 / (4.0 * 255.0)).abs() < 1e-12);
        assert!((h.normalized_min_eigenvalue(2, 8.0) - 64.0 / (4.0 * 255.0)).abs() < 1e-12);
    }

    #[test]
    fn collinear_gradients_are_degenerate() {
        let gx = [1.0, 2.0, 3.0];
        let gy = [2.0, 4.0, 6.0];
        let h = Hessian::from_gradients(&gx, &gy);
        assert!(h.min_eigenvalue().abs() < 1e-9, "eig={}", h.min_eigenvalue());
        assert!(h.determinant().abs() < 1e-9);
    }

    #[test]
    fn solve_matches_nalgebra_inverse() {
        let h = Hessian {
            m: Matrix2::new(5.0, 1.5, 1.5, 3.0),
        };
        let b = Vector2::new(2.0, -1.0);
        let d = h.solve(&b).expect("regular matrix");
        let expected = h.m.try_inverse().expect("invertible") * b;
        assert!((d - expected).norm() < 1e-12, "d={d:?} expected={expected:?}");
        assert!(Hessian::default().solve(&b).is_none());
    }

    #[test]
    fn mismatch_accumulates_weighted_differences() {
        let b = mismatch(&[1.0, 0.0, 2.0], &[0.0, 1.0, 1.0], &[3.0, -2.0, 0.5]);
        assert_eq!(b, Vector2::new(4.0, -1.5));
    }
}
