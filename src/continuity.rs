use nalgebra::{DMatrix, DVector};

use crate::basis::Basis;
use crate::error::TrajGenResult;
use crate::index::IndexMap;

/// Assemble interior-knot continuity rows `(Aeq, beq)`, enforcing that the
/// physical-time k-th derivative agrees across each interior knot up to
/// the per-dimension continuity order, despite the two adjoining segments
/// having distinct per-segment timescales.
pub fn build(
    durations: &[f64],
    contderiv: &[usize],
    basis: &Basis,
    index: &IndexMap,
) -> TrajGenResult<(DMatrix<f64>, DVector<f64>)> {
    let n_segments = durations.len();
    let decision_len = index.decision_len();
    let dim = index.dim();
    let max_cont = contderiv.iter().copied().max().unwrap_or(0);

    let mut rows: Vec<DVector<f64>> = Vec::new();

    for i in 1..n_segments {
        let dt1 = durations[i - 1];
        let dt2 = durations[i];

        for k in 0..=max_cont {
            let b_end = basis.row(1.0, k)? / dt1.powi(k as i32);
            let b_start = basis.row(0.0, k)? / dt2.powi(k as i32);

            for j in 0..dim {
                if k > contderiv[j] {
                    continue;
                }
                let mut row = DVector::<f64>::zeros(decision_len);
                for (c, col) in index.block_cols(j, i - 1).enumerate() {
                    row[col] += b_end[c];
                }
                for (c, col) in index.block_cols(j, i).enumerate() {
                    row[col] -= b_start[c];
                }
                rows.push(row);
            }
        }
    }

    let mut a_eq = DMatrix::<f64>::zeros(rows.len(), decision_len);
    for (r, row) in rows.iter().enumerate() {
        a_eq.row_mut(r).copy_from(&row.transpose());
    }
    let b_eq = DVector::<f64>::zeros(rows.len());
    Ok((a_eq, b_eq))
}
