use std::collections::VecDeque;

use nalgebra::{DMatrix, DVector};

use crate::basis::Basis;
use crate::bound::{Bound, BoundTime};
use crate::error::{TrajGenError, TrajGenResult};
use crate::index::IndexMap;

/// A bound narrowed to a single segment, with concrete absolute sample
/// times within that segment.
struct SingleSegmentBound {
    seg: usize,
    bound: Bound,
    samples: Vec<f64>,
}

fn greatest_index_le(keytimes: &[f64], value: f64) -> usize {
    keytimes
        .iter()
        .rposition(|&kt| kt <= value)
        .unwrap_or(0)
}

fn greatest_index_lt(keytimes: &[f64], value: f64) -> usize {
    keytimes
        .iter()
        .rposition(|&kt| kt < value)
        .unwrap_or(0)
}

/// Sample `t0..t1` at the density of `constraints_per_seg` points per full
/// segment `[seg_start, seg_end]`. The range is half-open (`t1` itself is
/// never sampled): a full segment therefore yields exactly
/// `constraints_per_seg` samples, and two pieces sharing an interior knot
/// only have that knot sampled once, by the piece starting there.
fn sample_times(t0: f64, t1: f64, seg_start: f64, seg_end: f64, constraints_per_seg: usize) -> Vec<f64> {
    if (t1 - t0).abs() < 1e-12 {
        return vec![t0];
    }
    let step = (seg_end - seg_start) / constraints_per_seg as f64;
    let n_steps = ((t1 - t0) / step).round().max(1.0) as usize;
    (0..n_steps).map(|i| t0 + i as f64 * step).collect()
}

/// Stage A: split a (possibly multi-segment) bound into single-segment
/// bounds with concrete sample times.
fn split_and_sample(
    bound: &Bound,
    keytimes: &[f64],
    durations: &[f64],
    constraints_per_seg: usize,
) -> TrajGenResult<Vec<SingleSegmentBound>> {
    let n_segments = durations.len();
    let (t0, t1) = bound.time.resolve(keytimes);
    if t0 < keytimes[0] || t1 > keytimes[n_segments] {
        return Err(TrajGenError::OutOfRange(t0, t1));
    }

    let mut queue: VecDeque<(f64, f64)> = VecDeque::new();
    queue.push_back((t0, t1));
    let mut result = Vec::new();

    while let Some((t0, t1)) = queue.pop_front() {
        let mut start_seg = greatest_index_le(keytimes, t0);
        let mut end_seg = greatest_index_lt(keytimes, t1).min(n_segments - 1);
        if (t0 - keytimes[0]).abs() < 1e-12 {
            start_seg = 0;
        }
        if (t1 - keytimes[n_segments]).abs() < 1e-12 {
            end_seg = n_segments - 1;
        }
        start_seg = start_seg.min(n_segments - 1);

        if start_seg != end_seg {
            let split_t = keytimes[start_seg + 1];
            queue.push_back((t0, split_t));
            queue.push_back((split_t, t1));
        } else {
            let seg = start_seg;
            let samples = sample_times(t0, t1, keytimes[seg], keytimes[seg + 1], constraints_per_seg);
            let narrowed = bound.with_time(BoundTime::Interval(t0, t1));
            result.push(SingleSegmentBound { seg, bound: narrowed, samples });
        }
    }

    Ok(result)
}

/// Stage B: emit inequality rows for a single-segment bound.
fn emit_rows(
    piece: &SingleSegmentBound,
    keytimes: &[f64],
    durations: &[f64],
    basis: &Basis,
    index: &IndexMap,
) -> TrajGenResult<(Vec<DVector<f64>>, Vec<f64>)> {
    let seg = piece.seg;
    let dt = durations[seg];
    let n = basis.order();

    let taus: Vec<f64> = piece.samples.iter().map(|&t| t - keytimes[seg]).collect();
    let mut block = basis.rows(&taus, piece.bound.derivative)?;

    // Scale each column by duration^-(n-c), independent of derivative
    // order k — reproduced as specified (see open question in design notes).
    for c in 0..=n {
        let power = (n - c) as i32;
        let scale = dt.powi(-power);
        for r in 0..block.nrows() {
            block[(r, c)] *= scale;
        }
    }

    let sign = match piece.bound.kind {
        crate::bound::BoundKind::Ub => 1.0,
        crate::bound::BoundKind::Lb => -1.0,
        crate::bound::BoundKind::OneNorm | crate::bound::BoundKind::InfNorm => 0.0,
    };

    let decision_len = index.decision_len();
    let mut rows = Vec::new();
    let mut rhs = Vec::new();
    for (j, arg_j) in piece.bound.arg().iter().enumerate() {
        let Some(value) = arg_j else { continue };
        for r in 0..block.nrows() {
            let mut row = DVector::<f64>::zeros(decision_len);
            for (c, col) in index.block_cols(j, seg).enumerate() {
                row[col] = sign * block[(r, c)];
            }
            rows.push(row);
            rhs.push(sign * value);
        }
    }
    Ok((rows, rhs))
}

/// Assemble `(Aineq, bineq)` from the bound list. `1norm` and `infnorm`
/// bounds are skipped entirely (no-ops, reserved taxonomy slots).
pub fn build(
    bounds: &[Bound],
    keytimes: &[f64],
    durations: &[f64],
    constraints_per_seg: usize,
    basis: &Basis,
    index: &IndexMap,
) -> TrajGenResult<(DMatrix<f64>, DVector<f64>)> {
    let decision_len = index.decision_len();
    let mut rows: Vec<DVector<f64>> = Vec::new();
    let mut rhs: Vec<f64> = Vec::new();

    for bound in bounds {
        if bound.is_noop() {
            continue;
        }
        let pieces = split_and_sample(bound, keytimes, durations, constraints_per_seg)?;
        for piece in &pieces {
            let (piece_rows, piece_rhs) = emit_rows(piece, keytimes, durations, basis, index)?;
            rows.extend(piece_rows);
            rhs.extend(piece_rhs);
        }
    }

    let mut a_ineq = DMatrix::<f64>::zeros(rows.len(), decision_len);
    for (r, row) in rows.iter().enumerate() {
        a_ineq.row_mut(r).copy_from(&row.transpose());
    }
    let b_ineq = DVector::from_vec(rhs);
    Ok((a_ineq, b_ineq))
}
