use nalgebra::{DMatrix, RowDVector};

use crate::error::{TrajGenError, TrajGenResult};

/// Maximum derivative order the basis engine supports (position through snap).
pub const MAX_DERIVATIVE: usize = 4;

/// Monomial basis of fixed polynomial order `n`, together with the
/// differential operator matrices `D[0..=4]` used to take derivatives of a
/// coefficient vector without leaving the monomial representation.
///
/// Coefficients are ordered highest-degree first: `b(τ) = [τⁿ, τⁿ⁻¹, …, τ, 1]`.
#[derive(Debug, Clone)]
pub struct Basis {
    order: usize,
    diff_ops: [DMatrix<f64>; MAX_DERIVATIVE + 1],
}

impl Basis {
    /// Build the basis for polynomial order `n`, precomputing `D[0..=4]`.
    pub fn new(order: usize) -> Self {
        let dim = order + 1;
        let mut d1 = DMatrix::<f64>::zeros(dim, dim);
        for i in 0..order {
            d1[(i + 1, i)] = (order - i) as f64;
        }
        let d0 = DMatrix::<f64>::identity(dim, dim);
        let d2 = &d1 * &d1;
        let d3 = &d2 * &d1;
        let d4 = &d3 * &d1;
        Self {
            order,
            diff_ops: [d0, d1, d2, d3, d4],
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// The `(n+1)×(n+1)` differential operator for derivative order `k`.
    pub fn diff_op(&self, k: usize) -> TrajGenResult<&DMatrix<f64>> {
        self.diff_ops.get(k).ok_or(TrajGenError::BadDerivative(k))
    }

    fn monomial_row(&self, tau: f64) -> RowDVector<f64> {
        let n = self.order;
        RowDVector::from_iterator(n + 1, (0..=n).map(|j| tau.powi((n - j) as i32)))
    }

    /// Evaluate the order-`k` derivative of the monomial basis at `τ`, as a
    /// `1×(n+1)` row vector.
    pub fn row(&self, tau: f64, k: usize) -> TrajGenResult<RowDVector<f64>> {
        let d = self.diff_op(k)?;
        Ok(self.monomial_row(tau) * d)
    }

    /// Evaluate the order-`k` derivative of the monomial basis at every
    /// `τ` in `taus`, stacked into an `(m × (n+1))` block.
    pub fn rows(&self, taus: &[f64], k: usize) -> TrajGenResult<DMatrix<f64>> {
        let d = self.diff_op(k)?.clone();
        let mut block = DMatrix::<f64>::zeros(taus.len(), self.order + 1);
        for (r, &tau) in taus.iter().enumerate() {
            let row = self.monomial_row(tau) * &d;
            block.row_mut(r).copy_from(&row);
        }
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn identity_derivative_is_identity() {
        let basis = Basis::new(5);
        assert_eq!(basis.diff_op(0).unwrap(), &DMatrix::<f64>::identity(6, 6));
    }

    #[test]
    fn first_derivative_of_cubic() {
        // p(t) = t^3, coefficients [1,0,0,0] for order 3.
        let basis = Basis::new(3);
        let d1 = basis.diff_op(1).unwrap();
        let coeffs = nalgebra::DVector::from_vec(vec![1.0, 0.0, 0.0, 0.0]);
        let deriv = d1 * coeffs;
        // d/dt t^3 = 3t^2, represented as coefficients [0,3,0,0].
        assert!(approx_eq(deriv[0], 0.0, 1e-12));
        assert!(approx_eq(deriv[1], 3.0, 1e-12));
        assert!(approx_eq(deriv[2], 0.0, 1e-12));
        assert!(approx_eq(deriv[3], 0.0, 1e-12));
    }

    #[test]
    fn row_matches_direct_power_evaluation() {
        let basis = Basis::new(4);
        let row = basis.row(0.5, 0).unwrap();
        for (j, entry) in row.iter().enumerate() {
            let power = (4 - j) as i32;
            assert!(approx_eq(*entry, 0.5f64.powi(power), 1e-12));
        }
    }

    #[test]
    fn bad_derivative_order_is_rejected() {
        let basis = Basis::new(4);
        assert!(basis.diff_op(5).is_err());
    }
}
