use nalgebra::DVector;

use crate::basis::{Basis, MAX_DERIVATIVE};

/// The output of [`crate::generate`]: a coefficient tensor indexed
/// `poly[deriv][dim][seg]`, each a length-`(n+1)` coefficient vector
/// (highest degree first) in normalized segment time.
#[derive(Debug, Clone)]
pub struct Trajectory {
    poly: Vec<Vec<Vec<DVector<f64>>>>,
    pub durations: Vec<f64>,
    pub keytimes: Vec<f64>,
}

impl Trajectory {
    pub(crate) fn new(
        poly: Vec<Vec<Vec<DVector<f64>>>>,
        durations: Vec<f64>,
        keytimes: Vec<f64>,
    ) -> Self {
        Self {
            poly,
            durations,
            keytimes,
        }
    }

    pub fn n_segments(&self) -> usize {
        self.durations.len()
    }

    pub fn ndim(&self) -> usize {
        self.poly[0].len()
    }

    /// Coefficients of the `k`-th derivative, dimension `j`, segment `s`,
    /// in normalized time (highest degree first).
    pub fn poly(&self, k: usize, j: usize, s: usize) -> &DVector<f64> {
        &self.poly[k][j][s]
    }

    /// Find the segment containing physical time `t` (clamping to the
    /// trajectory's span).
    fn segment_for_time(&self, t: f64) -> usize {
        let n = self.n_segments();
        for s in 0..n {
            if t <= self.keytimes[s + 1] || s == n - 1 {
                return s;
            }
        }
        n - 1
    }

    /// Evaluate the `k`-th physical-time derivative of dimension `j` at
    /// physical time `t`. Undoes the normalized-time scaling: the k-th
    /// derivative in normalized time must be divided by `dtᵏ` to recover
    /// physical units, since `d/dt = (1/dt)·d/dτ`.
    pub fn evaluate(&self, basis: &Basis, j: usize, k: usize, t: f64) -> f64 {
        assert!(k <= MAX_DERIVATIVE, "derivative order {k} exceeds 4");
        let s = self.segment_for_time(t);
        let dt = self.durations[s];
        let tau = (t - self.keytimes[s]) / dt;
        let row = basis.row(tau, 0).expect("k=0 is always valid");
        let coeffs = self.poly(k, j, s);
        let value: f64 = row.iter().zip(coeffs.iter()).map(|(a, b)| a * b).sum();
        value / dt.powi(k as i32)
    }
}
