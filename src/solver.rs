use nalgebra::{DMatrix, DVector};

use crate::problem::Problem;

/// Options threaded through to a [`QPSolver`] backend.
#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    pub convergetol: f64,
    pub max_iter: usize,
    pub verbose: bool,
    pub time_limit: Option<std::time::Duration>,
}

/// Abstraction over a QP solver backend, unifying the "direct KKT solve,
/// commercial interior-point QP, general-purpose QP" taxonomy behind one
/// capability. `exitflag` is `1` for optimal, any other value an
/// implementation-defined diagnostic surfaced verbatim.
pub trait QPSolver {
    fn solve(
        &self,
        h: &DMatrix<f64>,
        a_eq: &DMatrix<f64>,
        b_eq: &DVector<f64>,
        a_ineq: &DMatrix<f64>,
        b_ineq: &DVector<f64>,
        options: &SolverOptions,
    ) -> (DVector<f64>, i32);
}

/// Solve the equality-constrained KKT system directly:
/// `[2H  Aeqᵀ; Aeq  0] [x; λ] = [0; beq]`.
///
/// Returns `None` if the system is singular or its condition number
/// exceeds `1e8` (ill-conditioned); the caller falls back to a numerical
/// backend in that case rather than treating it as fatal.
pub fn solve_kkt(h: &DMatrix<f64>, a_eq: &DMatrix<f64>, b_eq: &DVector<f64>) -> Option<DVector<f64>> {
    let n = h.nrows();
    let m = a_eq.nrows();
    let total = n + m;

    let mut kkt = DMatrix::<f64>::zeros(total, total);
    kkt.view_mut((0, 0), (n, n)).copy_from(&(2.0 * h));
    kkt.view_mut((0, n), (n, m)).copy_from(&a_eq.transpose());
    kkt.view_mut((n, 0), (m, n)).copy_from(a_eq);

    let mut rhs = DVector::<f64>::zeros(total);
    rhs.rows_mut(n, m).copy_from(b_eq);

    let svd = kkt.clone().svd(false, false);
    let singular_values = svd.singular_values;
    let max_sv = singular_values.max();
    let min_sv = singular_values.min();
    let condition = if min_sv > 0.0 {
        max_sv / min_sv
    } else {
        f64::INFINITY
    };
    if condition > 1e8 {
        log::warn!("KKT system ill-conditioned (cond={condition:.3e}); falling back to numerical solver");
        return None;
    }

    let lu = kkt.lu();
    lu.solve(&rhs).map(|sol| sol.rows(0, n).into_owned())
}

/// Minimum-norm solve of the same KKT system via a pseudo-inverse, for
/// equality sets that are rank-deficient but consistent (e.g. a derivative
/// pinned twice by waypoint and continuity rows alike). [`solve_kkt`]'s LU
/// factorization has no recourse there; this is the numerical path's
/// fallback of last resort rather than the default, since it silently
/// accepts any consistent redundancy instead of surfacing it.
fn solve_kkt_lstsq(h: &DMatrix<f64>, a_eq: &DMatrix<f64>, b_eq: &DVector<f64>) -> DVector<f64> {
    let n = h.nrows();
    let m = a_eq.nrows();
    let total = n + m;

    let mut kkt = DMatrix::<f64>::zeros(total, total);
    kkt.view_mut((0, 0), (n, n)).copy_from(&(2.0 * h));
    kkt.view_mut((0, n), (n, m)).copy_from(&a_eq.transpose());
    kkt.view_mut((n, 0), (m, n)).copy_from(a_eq);

    let mut rhs = DVector::<f64>::zeros(total);
    rhs.rows_mut(n, m).copy_from(b_eq);

    let svd = kkt.svd(true, true);
    match svd.pseudo_inverse(1e-10) {
        Ok(pinv) => (pinv * rhs).rows(0, n).into_owned(),
        Err(_) => DVector::<f64>::zeros(n),
    }
}

/// Default numerical backend: a dense quadratic-penalty active-set method.
/// Violated inequality rows are folded into the objective as a quadratic
/// penalty with geometrically growing weight, while equality constraints
/// remain hard (solved via [`solve_kkt`] each outer iteration against the
/// penalty-augmented Hessian and linear term).
#[derive(Debug, Clone, Copy, Default)]
pub struct PenaltyQpSolver;

impl QPSolver for PenaltyQpSolver {
    fn solve(
        &self,
        h: &DMatrix<f64>,
        a_eq: &DMatrix<f64>,
        b_eq: &DVector<f64>,
        a_ineq: &DMatrix<f64>,
        b_ineq: &DVector<f64>,
        options: &SolverOptions,
    ) -> (DVector<f64>, i32) {
        let n = h.nrows();
        let mut rho = 10.0;
        let mut x = DVector::<f64>::zeros(n);

        if a_ineq.nrows() == 0 {
            if let Some(sol) = solve_kkt(h, a_eq, b_eq) {
                return (sol, 1);
            }
            let sol = solve_kkt_lstsq(h, a_eq, b_eq);
            let residual = (a_eq * &sol - b_eq).amax();
            if residual <= options.convergetol.sqrt() {
                log::debug!("redundant equality set solved via pseudo-inverse (residual={residual:.3e})");
                return (sol, 1);
            }
            log::warn!("equality constraints inconsistent (residual={residual:.3e})");
            return (sol, -1);
        }

        for iter in 0..options.max_iter {
            let residual = a_ineq * &x - b_ineq;
            let active: Vec<usize> = residual
                .iter()
                .enumerate()
                .filter(|(_, &r)| r > 0.0)
                .map(|(i, _)| i)
                .collect();

            let (x_new, ok) = if active.is_empty() {
                (solve_kkt(h, a_eq, b_eq), true)
            } else {
                let a_active = a_ineq.select_rows(&active);
                let b_active = b_ineq.select_rows(&active);
                let h_aug = h + rho * a_active.transpose() * &a_active;

                // The penalty linear term rho*A'b shifts the KKT right-hand
                // side; fold it in by solving the augmented system directly
                // rather than reusing solve_kkt's zero-RHS assumption for x.
                let m = a_eq.nrows();
                let total = n + m;
                let mut kkt = DMatrix::<f64>::zeros(total, total);
                kkt.view_mut((0, 0), (n, n)).copy_from(&(2.0 * &h_aug));
                kkt.view_mut((0, n), (n, m)).copy_from(&a_eq.transpose());
                kkt.view_mut((n, 0), (m, n)).copy_from(a_eq);
                let mut rhs = DVector::<f64>::zeros(total);
                rhs.rows_mut(0, n)
                    .copy_from(&(2.0 * rho * a_active.transpose() * &b_active));
                rhs.rows_mut(n, m).copy_from(b_eq);
                (
                    kkt.lu().solve(&rhs).map(|sol| sol.rows(0, n).into_owned()),
                    true,
                )
            };

            match x_new {
                Some(sol) => x = sol,
                None => return (x, -1),
            }

            let residual = a_ineq * &x - b_ineq;
            let max_violation = residual.iter().cloned().fold(0.0, f64::max);
            if ok && max_violation <= options.convergetol {
                if options.verbose {
                    log::debug!("penalty QP converged after {} iterations", iter + 1);
                }
                return (x, 1);
            }
            rho *= 10.0;
        }

        log::warn!("penalty QP did not converge within max_iter");
        (x, -1)
    }
}

struct PenaltyObjective<'a> {
    h: &'a DMatrix<f64>,
    a_eq: &'a DMatrix<f64>,
    b_eq: &'a DVector<f64>,
    a_ineq: &'a DMatrix<f64>,
    b_ineq: &'a DVector<f64>,
    rho_eq: f64,
    rho_ineq: f64,
}

impl PenaltyObjective<'_> {
    fn eval_cost(&self, x: &DVector<f64>) -> f64 {
        let quad = 0.5 * (x.transpose() * self.h * x)[(0, 0)];
        let eq_res = self.a_eq * x - self.b_eq;
        let eq_term = 0.5 * self.rho_eq * eq_res.norm_squared();
        let ineq_res = self.a_ineq * x - self.b_ineq;
        let ineq_term: f64 = ineq_res.iter().map(|&r| 0.5 * self.rho_ineq * r.max(0.0).powi(2)).sum();
        quad + eq_term + ineq_term
    }

    fn eval_gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        let mut grad = self.h * x;
        let eq_res = self.a_eq * x - self.b_eq;
        grad += self.rho_eq * self.a_eq.transpose() * eq_res;
        let ineq_res = self.a_ineq * x - self.b_ineq;
        let active: DVector<f64> = ineq_res.map(|r| r.max(0.0));
        grad += self.rho_ineq * self.a_ineq.transpose() * active;
        grad
    }
}

impl argmin::core::CostFunction for PenaltyObjective<'_> {
    type Param = DVector<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok(self.eval_cost(param))
    }
}

impl argmin::core::Gradient for PenaltyObjective<'_> {
    type Param = DVector<f64>;
    type Gradient = DVector<f64>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        Ok(self.eval_gradient(param))
    }
}

/// Alternative numerical backend built on `argmin`'s `L-BFGS`, minimizing
/// a smooth quadratic-penalty reformulation (hard equality approximated
/// by a very large penalty weight) instead of repeated KKT solves.
/// Demonstrates that the [`QPSolver`] abstraction is real: a different,
/// heavier optimization crate slots in behind the same trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgminQpSolver;

impl QPSolver for ArgminQpSolver {
    fn solve(
        &self,
        h: &DMatrix<f64>,
        a_eq: &DMatrix<f64>,
        b_eq: &DVector<f64>,
        a_ineq: &DMatrix<f64>,
        b_ineq: &DVector<f64>,
        options: &SolverOptions,
    ) -> (DVector<f64>, i32) {
        use argmin::core::Executor;
        use argmin::solver::linesearch::MoreThuenteLineSearch;
        use argmin::solver::quasinewton::LBFGS;

        let n = h.nrows();
        let objective = PenaltyObjective {
            h,
            a_eq,
            b_eq,
            a_ineq,
            b_ineq,
            rho_eq: 1e6,
            rho_ineq: 1e4,
        };
        let init = DVector::<f64>::zeros(n);
        let linesearch = MoreThuenteLineSearch::new();
        let solver = LBFGS::new(linesearch, 7);

        let result = Executor::new(objective, solver)
            .configure(|state| state.param(init).max_iters(options.max_iter as u64))
            .run();

        match result {
            Ok(res) => {
                let x = res
                    .state()
                    .best_param
                    .clone()
                    .unwrap_or_else(|| DVector::<f64>::zeros(n));
                let residual_eq = (a_eq * &x - b_eq).amax();
                let residual_ineq = (a_ineq * &x - b_ineq).iter().cloned().fold(0.0, f64::max);
                if residual_eq <= options.convergetol.sqrt() && residual_ineq <= options.convergetol.sqrt() {
                    (x, 1)
                } else {
                    log::warn!("argmin QP backend did not reach feasibility within tolerance");
                    (x, -1)
                }
            }
            Err(err) => {
                log::warn!("argmin QP backend failed: {err}");
                (DVector::<f64>::zeros(n), -2)
            }
        }
    }
}

/// Dispatch a [`Problem`] to either the analytic KKT solve (when no
/// inequality rows are present and the caller hasn't forced a numerical
/// solve) or the numerical `backend`. Falls back to `backend` if the
/// analytic solve is singular or ill-conditioned.
pub fn dispatch(
    problem: &Problem,
    force_numerical: bool,
    backend: &dyn QPSolver,
    options: &SolverOptions,
) -> (DVector<f64>, i32) {
    if problem.a_ineq.nrows() == 0 && !force_numerical {
        if let Some(x) = solve_kkt(&problem.h, &problem.a_eq, &problem.b_eq) {
            return (x, 1);
        }
        log::warn!("analytic KKT solve failed; falling back to numerical backend");
    }
    let (x, flag) = backend.solve(
        &problem.h,
        &problem.a_eq,
        &problem.b_eq,
        &problem.a_ineq,
        &problem.b_ineq,
        options,
    );
    if flag != 1 {
        log::warn!("numerical solver returned non-optimal exit flag {flag}");
    }
    (x, flag)
}
