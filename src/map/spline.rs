// Natural cubic spline
//
// One-dimensional interpolant used by the road map to turn sparse track
// waypoints into a smooth function of the longitudinal coordinate.

use nalgebra::{DMatrix, DVector};

use crate::common::{PlannerError, PlannerResult};

#[derive(Debug, Clone)]
pub struct CubicSpline {
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
    x: Vec<f64>,
}

impl CubicSpline {
    /// Fit a natural cubic spline through `(x[i], y[i])`. `x` must be strictly
    /// increasing and hold at least two knots.
    pub fn new(x: &[f64], y: &[f64]) -> PlannerResult<Self> {
        let nx = x.len();
        if nx < 2 || nx != y.len() {
            return Err(PlannerError::InvalidMap(format!(
                "spline needs at least two knots with matching values, got {} and {}",
                x.len(),
                y.len()
            )));
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        if h.iter().any(|hi| !(*hi > 0.0)) {
            return Err(PlannerError::InvalidMap(
                "spline knots must be strictly increasing".to_string(),
            ));
        }

        let a = y.to_vec();
        let c_vec = Self::calc_a(&h)
            .lu()
            .solve(&Self::calc_b(&h, &a))
            .ok_or_else(|| PlannerError::InvalidMap("singular spline system".to_string()))?;
        let c: Vec<f64> = c_vec.iter().copied().collect();

        let mut b = Vec::with_capacity(nx - 1);
        let mut d = Vec::with_capacity(nx - 1);
        for i in 0..nx - 1 {
            d.push((c[i + 1] - c[i]) / (3.0 * h[i]));
            b.push((a[i + 1] - a[i]) / h[i] - h[i] * (c[i + 1] + 2.0 * c[i]) / 3.0);
        }

        Ok(CubicSpline { a, b, c, d, x: x.to_vec() })
    }

    /// Spline value; arguments outside the knot range extrapolate the end
    /// segments.
    pub fn calc(&self, t: f64) -> f64 {
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.a[i] + self.b[i] * dx + self.c[i] * dx.powi(2) + self.d[i] * dx.powi(3)
    }

    /// First derivative
    pub fn calc_d(&self, t: f64) -> f64 {
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.b[i] + 2.0 * self.c[i] * dx + 3.0 * self.d[i] * dx.powi(2)
    }

    fn search_index(&self, t: f64) -> usize {
        // index of the segment [x[i], x[i+1]) holding t
        let upper = self.x.partition_point(|&xi| xi <= t);
        upper.saturating_sub(1).min(self.x.len() - 2)
    }

    fn calc_a(h: &[f64]) -> DMatrix<f64> {
        let nx = h.len() + 1;
        let mut a = DMatrix::zeros(nx, nx);
        a[(0, 0)] = 1.0;
        for i in 0..nx - 1 {
            if i != nx - 2 {
                a[(i + 1, i + 1)] = 2.0 * (h[i] + h[i + 1]);
            }
            a[(i + 1, i)] = h[i];
            a[(i, i + 1)] = h[i];
        }
        a[(0, 1)] = 0.0;
        a[(nx - 1, nx - 2)] = 0.0;
        a[(nx - 1, nx - 1)] = 1.0;
        a
    }

    fn calc_b(h: &[f64], a: &[f64]) -> DVector<f64> {
        let nx = h.len() + 1;
        let mut b = DVector::zeros(nx);
        for i in 0..nx.saturating_sub(2) {
            b[i + 1] = 3.0 * (a[i + 2] - a[i + 1]) / h[i + 1] - 3.0 * (a[i + 1] - a[i]) / h[i];
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_spline_interpolates_knots() {
        let x = [0.0, 1.0, 2.5, 4.0, 6.0];
        let y = [0.0, 2.0, -1.0, 3.0, 0.5];
        let sp = CubicSpline::new(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(sp.calc(*xi), *yi, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_spline_reproduces_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let sp = CubicSpline::new(&x, &y).unwrap();
        assert_abs_diff_eq!(sp.calc(1.5), 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sp.calc_d(2.7), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spline_rejects_unsorted_knots() {
        assert!(CubicSpline::new(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]).is_err());
        assert!(CubicSpline::new(&[0.0], &[0.0]).is_err());
    }
}
