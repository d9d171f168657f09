use nalgebra::{DMatrix, DVector};

use crate::basis::Basis;
use crate::error::TrajGenResult;
use crate::index::IndexMap;
use crate::waypoint::Waypoint;

/// Assemble waypoint constraint rows `(Aeq, beq)` from per-waypoint
/// position/velocity/acceleration/jerk/snap specifications, skipping any
/// cell left unconstrained and skipping any derivative order above the
/// dimension's continuity order.
pub fn build(
    waypoints: &[Waypoint],
    durations: &[f64],
    contderiv: &[usize],
    basis: &Basis,
    index: &IndexMap,
) -> TrajGenResult<(DMatrix<f64>, DVector<f64>)> {
    let n_segments = durations.len();
    let decision_len = index.decision_len();
    let mut rows: Vec<DVector<f64>> = Vec::new();
    let mut rhs: Vec<f64> = Vec::new();

    for (pt, waypoint) in waypoints.iter().enumerate() {
        let seg = pt.min(n_segments - 1);
        let dt = durations[seg];
        let tau = (pt - seg) as f64;

        for k in 0..=4 {
            let basis_row = basis.row(tau, k)?;
            for (j, dims) in waypoint.derivatives().iter().enumerate() {
                if k > contderiv[j] {
                    continue;
                }
                if let Some(value) = dims.get(k) {
                    let mut row = DVector::<f64>::zeros(decision_len);
                    for (c, col) in index.block_cols(j, seg).enumerate() {
                        row[col] = basis_row[c];
                    }
                    rows.push(row);
                    rhs.push(value * dt.powi(k as i32));
                }
            }
        }
    }

    let mut a_eq = DMatrix::<f64>::zeros(rows.len(), decision_len);
    for (r, row) in rows.iter().enumerate() {
        a_eq.row_mut(r).copy_from(&row.transpose());
    }
    let b_eq = DVector::from_vec(rhs);
    Ok((a_eq, b_eq))
}
