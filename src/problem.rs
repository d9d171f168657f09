use nalgebra::{DMatrix, DVector};

/// The assembled quadratic program: `minimize xᵀHx` subject to
/// `Aeq·x = beq` and `Aineq·x ≤ bineq`.
#[derive(Debug, Clone)]
pub struct Problem {
    pub h: DMatrix<f64>,
    pub a_eq: DMatrix<f64>,
    pub b_eq: DVector<f64>,
    pub a_ineq: DMatrix<f64>,
    pub b_ineq: DVector<f64>,
}
