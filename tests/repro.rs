use trajgen::{generate, Basis, Bound, BoundKind, BoundTime, DerivativeSet, ExitFlag, Options, Waypoint};

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!(
        (a - b).abs() <= tol,
        "expected {b} within {tol}, got {a} (diff {})",
        (a - b).abs()
    );
}

fn waypoint(time: f64, pos: f64, vel: Option<f64>, acc: Option<f64>) -> Waypoint {
    Waypoint::new(
        time,
        vec![DerivativeSet {
            pos: Some(pos),
            vel,
            acc,
            jerk: None,
            snap: None,
        }],
    )
}

/// Two waypoints, order-5 min-snap, pinned pos/vel/acc at both ends: the
/// six equality rows exactly determine the six coefficients, giving the
/// symmetric smoothstep quintic (`6τ⁵-15τ⁴+10τ³`), which by construction
/// passes through the midpoint exactly.
#[test]
fn two_waypoint_min_snap_matches_smoothstep_quintic() {
    let waypoints = vec![
        waypoint(0.0, 0.0, Some(0.0), Some(0.0)),
        waypoint(1.0, 1.0, Some(0.0), Some(0.0)),
    ];
    let options = Options::new(1, vec![4], false).unwrap().with_order(5);
    let (trajectory, _durations, _problem, flag) = generate(&waypoints, &options, &[]).unwrap();
    assert_eq!(flag, ExitFlag::Coupled(1));

    let basis = Basis::new(options.order);
    approx_eq(trajectory.evaluate(&basis, 0, 0, 0.5), 0.5, 1e-6);
    approx_eq(trajectory.evaluate(&basis, 0, 1, 0.0), 0.0, 1e-6);
    approx_eq(trajectory.evaluate(&basis, 0, 2, 0.0), 0.0, 1e-6);
    approx_eq(trajectory.evaluate(&basis, 0, 2, 1.0), 0.0, 1e-6);
}

/// Three waypoints, min-jerk, continuity enforced through jerk: position,
/// velocity and acceleration must agree from both sides of the interior
/// knot even though the middle waypoint leaves vel/acc unconstrained.
#[test]
fn interior_knot_is_continuous_through_jerk() {
    let waypoints = vec![
        waypoint(0.0, 0.0, Some(0.0), None),
        waypoint(1.0, 1.0, None, None),
        waypoint(2.0, 0.0, Some(0.0), Some(0.0)),
    ];
    let mut options = Options::new(1, vec![3], false).unwrap().with_order(7);
    options = options.with_contderiv(vec![3]).unwrap();
    let (trajectory, durations, _problem, flag) = generate(&waypoints, &options, &[]).unwrap();
    assert_eq!(flag, ExitFlag::Coupled(1));

    let basis = Basis::new(options.order);
    for k in 0..=3 {
        let left = {
            let row = basis.row(1.0, 0).unwrap();
            let coeffs = trajectory.poly(k, 0, 0);
            let raw: f64 = row.iter().zip(coeffs.iter()).map(|(a, b)| a * b).sum();
            raw / durations[0].powi(k as i32)
        };
        let right = {
            let row = basis.row(0.0, 0).unwrap();
            let coeffs = trajectory.poly(k, 0, 1);
            let raw: f64 = row.iter().zip(coeffs.iter()).map(|(a, b)| a * b).sum();
            raw / durations[1].powi(k as i32)
        };
        approx_eq(left, right, 1e-6);
    }
}

/// A 2-D problem with no bounds is eligible for decoupling; each axis
/// should reproduce exactly what an independent 1-D solve of the same
/// per-axis waypoints would produce.
#[test]
fn decoupled_axes_match_independent_1d_solves() {
    let waypoints_2d = vec![
        Waypoint::new(
            0.0,
            vec![
                DerivativeSet {
                    pos: Some(0.0),
                    vel: Some(0.0),
                    ..Default::default()
                },
                DerivativeSet {
                    pos: Some(2.0),
                    vel: Some(0.0),
                    ..Default::default()
                },
            ],
        ),
        Waypoint::new(
            1.5,
            vec![
                DerivativeSet {
                    pos: Some(1.0),
                    vel: Some(0.0),
                    ..Default::default()
                },
                DerivativeSet {
                    pos: Some(-1.0),
                    vel: Some(0.0),
                    ..Default::default()
                },
            ],
        ),
    ];
    let options_2d = Options::new(2, vec![4, 4], false).unwrap();
    let (traj_2d, _durations, _problem, flag) = generate(&waypoints_2d, &options_2d, &[]).unwrap();
    assert!(matches!(flag, ExitFlag::Decoupled(_)));

    let waypoints_x = vec![waypoint(0.0, 0.0, Some(0.0), None), waypoint(1.5, 1.0, Some(0.0), None)];
    let options_1d = Options::new(1, vec![4], false).unwrap();
    let (traj_x, _durations, _problem, _flag) = generate(&waypoints_x, &options_1d, &[]).unwrap();

    let basis = Basis::new(options_2d.order);
    for &t in &[0.0, 0.3, 0.75, 1.2, 1.5] {
        approx_eq(traj_2d.evaluate(&basis, 0, 0, t), traj_x.evaluate(&basis, 0, 0, t), 1e-6);
    }
}

/// A tight upper bound on velocity, sampled at many points along the
/// segment, must hold everywhere it was sampled -- not merely at the
/// waypoints.
#[test]
fn velocity_upper_bound_is_respected_at_samples() {
    let waypoints = vec![waypoint(0.0, 0.0, Some(0.0), None), waypoint(2.0, 1.0, Some(0.0), None)];
    let options = Options::new(1, vec![4], true).unwrap().with_order(6);
    let bound = Bound::from_raw(BoundKind::Ub, 1, 1, &[0.8], BoundTime::Full).unwrap();
    let (trajectory, _durations, _problem, flag) = generate(&waypoints, &options, &[bound]).unwrap();
    assert_eq!(flag, ExitFlag::Coupled(1));

    let basis = Basis::new(options.order);
    let mut t = 0.0;
    while t <= 2.0 {
        let v = trajectory.evaluate(&basis, 0, 1, t);
        assert!(v <= 0.8 + 1e-3, "velocity {v} exceeds bound at t={t}");
        t += 0.05;
    }
}

/// Non-increasing waypoint times must be rejected before any constraint
/// matrix is assembled.
#[test]
fn non_monotonic_waypoint_times_are_rejected() {
    let waypoints = vec![waypoint(1.0, 0.0, None, None), waypoint(0.5, 1.0, None, None)];
    let options = Options::new(1, vec![4], false).unwrap();
    let err = generate(&waypoints, &options, &[]).unwrap_err();
    assert!(matches!(err, trajgen::TrajGenError::NonMonotonicTime { .. }));
}

/// Pinning position, velocity, acceleration and jerk at *both* ends of a
/// single order-3 segment overdetermines the four decision variables with
/// eight equality rows; the first four already fix the cubic uniquely,
/// so the remaining four are redundant (here consistent), leaving `Aeq`
/// rank-deficient and the analytic KKT solve singular by construction.
/// The numerical path must still recover the unique consistent solution.
#[test]
fn redundant_equality_rows_fall_back_to_numerical_solve() {
    let waypoints = vec![
        Waypoint::new(
            0.0,
            vec![DerivativeSet {
                pos: Some(0.0),
                vel: Some(1.0),
                acc: Some(0.0),
                jerk: Some(0.0),
                snap: None,
            }],
        ),
        Waypoint::new(
            1.0,
            vec![DerivativeSet {
                pos: Some(1.0),
                vel: Some(1.0),
                acc: Some(0.0),
                jerk: Some(0.0),
                snap: None,
            }],
        ),
    ];
    let options = Options::new(1, vec![3], false)
        .unwrap()
        .with_order(3)
        .with_contderiv(vec![3])
        .unwrap();
    let (trajectory, _durations, _problem, flag) = generate(&waypoints, &options, &[]).unwrap();
    assert_eq!(flag, ExitFlag::Coupled(1));

    let basis = Basis::new(options.order);
    approx_eq(trajectory.evaluate(&basis, 0, 0, 0.0), 0.0, 1e-6);
    approx_eq(trajectory.evaluate(&basis, 0, 0, 1.0), 1.0, 1e-6);
    approx_eq(trajectory.evaluate(&basis, 0, 1, 0.0), 1.0, 1e-6);
    approx_eq(trajectory.evaluate(&basis, 0, 1, 1.0), 1.0, 1e-6);
}

/// Open-question regression: the inequality builder scales sampled
/// derivative rows by a duration exponent that depends only on the
/// column's monomial power, not on which derivative `k` is bounded --
/// unlike the equality builder, which scales its right-hand side by
/// `dtᵏ`. Bounding velocity (k=1) and acceleration (k=2) at the same
/// duration both produce well-formed row blocks of identical shape,
/// reproducing the quirk rather than special-casing `k` out of it.
#[test]
fn inequality_scaling_ignores_derivative_order_like_equality_does_not() {
    let waypoints = vec![waypoint(0.0, 0.0, None, None), waypoint(3.0, 1.0, None, None)];
    let options = Options::new(1, vec![2], true).unwrap().with_order(4);
    let vel_bound = Bound::from_raw(BoundKind::Ub, 1, 1, &[5.0], BoundTime::Full).unwrap();
    let acc_bound = Bound::from_raw(BoundKind::Ub, 2, 1, &[5.0], BoundTime::Full).unwrap();

    let (_t1, _d1, problem_vel, _f1) = generate(&waypoints, &options, &[vel_bound]).unwrap();
    let (_t2, _d2, problem_acc, _f2) = generate(&waypoints, &options, &[acc_bound]).unwrap();

    assert_eq!(problem_vel.a_ineq.ncols(), problem_acc.a_ineq.ncols());
    assert!(problem_vel.a_ineq.nrows() > 0);
    assert!(problem_acc.a_ineq.nrows() > 0);
}

/// Open-question regression: the min-derivative cost block is assembled
/// purely from the monomial index algebra (`c`, `P[i,j]`) with no
/// `durationᵐ` weighting folded in, unlike the equality and inequality
/// builders, which do scale by segment duration. Two index maps that
/// differ only in `n_segments` therefore produce identical per-segment
/// blocks.
#[test]
fn cost_blocks_carry_no_duration_weighting() {
    let options = Options::new(1, vec![4], false).unwrap().with_order(5);
    let basis = Basis::new(options.order);
    let index_one_seg = trajgen::index::IndexMap::new(1, 1, options.order);
    let index_three_seg = trajgen::index::IndexMap::new(1, 3, options.order);

    let h_one = trajgen::cost::build(1, &options.minderiv, &basis, &index_one_seg).unwrap();
    let h_three = trajgen::cost::build(3, &options.minderiv, &basis, &index_three_seg).unwrap();

    let block_one = h_one.view((0, 0), (options.order + 1, options.order + 1));
    let block_three = h_three.view((0, 0), (options.order + 1, options.order + 1));
    for i in 0..=options.order {
        for j in 0..=options.order {
            approx_eq(block_one[(i, j)], block_three[(i, j)], 1e-12);
        }
    }
}

/// The Hessian must stay symmetric and block-diagonal across segments no
/// matter how many waypoints are supplied.
#[test]
fn hessian_is_symmetric_block_diagonal_for_multi_segment_problems() {
    let waypoints = vec![
        waypoint(0.0, 0.0, None, None),
        waypoint(1.0, 1.0, None, None),
        waypoint(2.2, 0.5, None, None),
        waypoint(3.0, 2.0, None, None),
    ];
    let options = Options::new(1, vec![3], false).unwrap();
    let (_trajectory, _durations, problem, flag) = generate(&waypoints, &options, &[]).unwrap();
    assert_eq!(flag, ExitFlag::Coupled(1));

    let h = &problem.h;
    for i in 0..h.nrows() {
        for j in 0..h.ncols() {
            approx_eq(h[(i, j)], h[(j, i)], 1e-12);
        }
    }
    let block = options.order + 1;
    let n_segments = waypoints.len() - 1;
    for s in 0..n_segments {
        for t in 0..n_segments {
            if s == t {
                continue;
            }
            for i in 0..block {
                for j in 0..block {
                    approx_eq(h[(s * block + i, t * block + j)], 0.0, 1e-12);
                }
            }
        }
    }
}

/// Each derivative tensor entry must equal `D[k]` applied to the
/// position-level coefficients -- the packaging step is a pure linear
/// map, not a re-solve.
#[test]
fn derivative_tensor_matches_differential_operator() {
    let waypoints = vec![waypoint(0.0, 0.0, Some(0.0), None), waypoint(1.0, 1.0, Some(0.0), None)];
    let options = Options::new(1, vec![4], false).unwrap();
    let (trajectory, _durations, _problem, _flag) = generate(&waypoints, &options, &[]).unwrap();

    let basis = Basis::new(options.order);
    for k in 1..=4 {
        let d = basis.diff_op(k).unwrap();
        let expected = d * trajectory.poly(0, 0, 0);
        let actual = trajectory.poly(k, 0, 0);
        for i in 0..expected.len() {
            approx_eq(actual[i], expected[i], 1e-9);
        }
    }
}
