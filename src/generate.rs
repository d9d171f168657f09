use nalgebra::DVector;

use crate::basis::Basis;
use crate::bound::Bound;
use crate::continuity;
use crate::cost;
use crate::decouple;
use crate::equality;
use crate::error::{TrajGenError, TrajGenResult};
use crate::index::IndexMap;
use crate::inequality;
use crate::options::Options;
use crate::problem::Problem;
use crate::solver::{self, PenaltyQpSolver, SolverOptions};
use crate::trajectory::Trajectory;
use crate::waypoint::{self, Waypoint};

/// Exit status of [`generate`]: a single code for a coupled solve, or one
/// per dimension when the decoupling wrapper was used.
#[derive(Debug, Clone, PartialEq)]
pub enum ExitFlag {
    Coupled(i32),
    Decoupled(Vec<i32>),
}

fn validate_shapes(waypoints: &[Waypoint], options: &Options, bounds: &[Bound]) -> TrajGenResult<()> {
    if waypoints.len() < 2 {
        return Err(TrajGenError::ShapeMismatch(
            "at least two waypoints are required".to_string(),
        ));
    }
    for (i, w) in waypoints.iter().enumerate() {
        if w.ndim() != options.ndim {
            return Err(TrajGenError::ShapeMismatch(format!(
                "waypoint {i} has {} dimensions but ndim is {}",
                w.ndim(),
                options.ndim
            )));
        }
    }
    for (i, b) in bounds.iter().enumerate() {
        if b.ndim() != options.ndim {
            return Err(TrajGenError::ShapeMismatch(format!(
                "bound {i} has {} dimensions but ndim is {}",
                b.ndim(),
                options.ndim
            )));
        }
    }
    if options.contderiv.len() != options.minderiv.len() {
        return Err(TrajGenError::ShapeMismatch(
            "contderiv length must match minderiv length".to_string(),
        ));
    }
    waypoint::validate_monotonic(waypoints)?;
    Ok(())
}

fn package(
    x: &DVector<f64>,
    n_segments: usize,
    ndim: usize,
    index: &IndexMap,
    basis: &Basis,
    durations: Vec<f64>,
    keytimes: Vec<f64>,
) -> TrajGenResult<Trajectory> {
    let order = index.order();
    let mut poly = vec![vec![vec![DVector::<f64>::zeros(order + 1); n_segments]; ndim]; 5];

    for s in 0..n_segments {
        for j in 0..ndim {
            let cols = index.block_cols(j, s);
            let coeffs = DVector::<f64>::from_iterator(order + 1, cols.map(|c| x[c]));
            poly[0][j][s] = coeffs.clone();
            for k in 1..=4 {
                let d = basis.diff_op(k)?;
                poly[k][j][s] = d * &coeffs;
            }
        }
    }

    Ok(Trajectory::new(poly, durations, keytimes))
}

/// Assemble and solve a single coupled QP (no decoupling). Used both
/// directly and, once per dimension, by the decoupling wrapper.
fn generate_coupled(
    waypoints: &[Waypoint],
    options: &Options,
    bounds: &[Bound],
    backend: &dyn solver::QPSolver,
) -> TrajGenResult<(Trajectory, Problem, i32)> {
    let n_segments = waypoints.len() - 1;
    let durations: Vec<f64> = (0..n_segments)
        .map(|i| waypoints[i + 1].time - waypoints[i].time)
        .collect();
    let keytimes: Vec<f64> = waypoints.iter().map(|w| w.time).collect();

    let basis = Basis::new(options.order);
    let index = IndexMap::new(options.ndim, n_segments, options.order);

    let (a_eq_wp, b_eq_wp) = equality::build(waypoints, &durations, &options.contderiv, &basis, &index)?;
    let (a_eq_cont, b_eq_cont) = continuity::build(&durations, &options.contderiv, &basis, &index)?;

    let mut a_eq = nalgebra::DMatrix::<f64>::zeros(a_eq_wp.nrows() + a_eq_cont.nrows(), index.decision_len());
    a_eq.view_mut((0, 0), (a_eq_wp.nrows(), index.decision_len())).copy_from(&a_eq_wp);
    a_eq.view_mut((a_eq_wp.nrows(), 0), (a_eq_cont.nrows(), index.decision_len()))
        .copy_from(&a_eq_cont);
    let b_eq = DVector::<f64>::from_iterator(
        b_eq_wp.len() + b_eq_cont.len(),
        b_eq_wp.iter().chain(b_eq_cont.iter()).copied(),
    );

    let h = cost::build(n_segments, &options.minderiv, &basis, &index)?;
    let (a_ineq, b_ineq) = inequality::build(
        bounds,
        &keytimes,
        &durations,
        options.constraints_per_seg,
        &basis,
        &index,
    )?;

    let problem = Problem {
        h,
        a_eq,
        b_eq,
        a_ineq,
        b_ineq,
    };

    let solver_options = SolverOptions {
        convergetol: options.convergetol,
        max_iter: 200,
        verbose: options.verbose,
        time_limit: None,
    };
    let (x, flag) = solver::dispatch(&problem, options.numerical, backend, &solver_options);

    let trajectory = package(&x, n_segments, options.ndim, &index, &basis, durations, keytimes)?;
    Ok((trajectory, problem, flag))
}

fn merge_decoupled(per_dim: Vec<Trajectory>, index_order: usize) -> Trajectory {
    let n_segments = per_dim[0].n_segments();
    let durations = per_dim[0].durations.clone();
    let keytimes = per_dim[0].keytimes.clone();
    let ndim = per_dim.len();
    let mut poly = vec![vec![vec![DVector::<f64>::zeros(index_order + 1); n_segments]; ndim]; 5];
    for (j, traj) in per_dim.iter().enumerate() {
        for k in 0..=4 {
            for s in 0..n_segments {
                poly[k][j][s] = traj.poly(k, 0, s).clone();
            }
        }
    }
    Trajectory::new(poly, durations, keytimes)
}

/// Entry point: assemble the QP from `waypoints`, `options` and `bounds`
/// and solve it, returning the coefficient tensor, segment durations, the
/// assembled `Problem`, and the solver's exit flag.
///
/// When `options.ndim > 1` and every bound is axis-aligned or a no-op,
/// the decoupling wrapper solves `d` independent 1-D problems instead of
/// one coupled problem; the returned `Problem` is then the one
/// assembled for dimension 0, included for inspection even though each
/// dimension solved its own.
pub fn generate(
    waypoints: &[Waypoint],
    options: &Options,
    bounds: &[Bound],
) -> TrajGenResult<(Trajectory, Vec<f64>, Problem, ExitFlag)> {
    validate_shapes(waypoints, options, bounds)?;

    let backend = PenaltyQpSolver;

    if decouple::eligible(options, bounds) {
        log::debug!("decoupling wrapper engaged for {} dimensions", options.ndim);
        let mut trajectories = Vec::with_capacity(options.ndim);
        let mut flags = Vec::with_capacity(options.ndim);
        let mut representative_problem = None;

        for j in 0..options.ndim {
            let sub_waypoints = decouple::project_waypoints(waypoints, j);
            let sub_bounds = decouple::project_bounds(bounds, j);
            let sub_options = options.project(j);
            let (traj, problem, flag) = generate_coupled(&sub_waypoints, &sub_options, &sub_bounds, &backend)?;
            if j == 0 {
                representative_problem = Some(problem);
            }
            trajectories.push(traj);
            flags.push(flag);
        }

        let durations = trajectories[0].durations.clone();
        let trajectory = merge_decoupled(trajectories, options.order);
        return Ok((
            trajectory,
            durations,
            representative_problem.expect("ndim > 1 guarantees at least one dimension"),
            ExitFlag::Decoupled(flags),
        ));
    }

    let (trajectory, problem, flag) = generate_coupled(waypoints, options, bounds, &backend)?;
    let durations = trajectory.durations.clone();
    Ok((trajectory, durations, problem, ExitFlag::Coupled(flag)))
}
