use std::time::Instant;

use trajgen::{generate, Bound, BoundKind, BoundTime, DerivativeSet, Options, Waypoint};

fn time_operation(label: &str, mut f: impl FnMut()) {
    let start = Instant::now();
    f();
    let elapsed = start.elapsed();
    println!("{label}: {:.2?}", elapsed);
}

fn waypoint(time: f64, pos: f64, vel: Option<f64>) -> Waypoint {
    Waypoint::new(
        time,
        vec![DerivativeSet {
            pos: Some(pos),
            vel,
            acc: None,
            jerk: None,
            snap: None,
        }],
    )
}

fn main() {
    env_logger::init();

    let waypoints_analytic = vec![
        waypoint(0.0, 0.0, Some(0.0)),
        waypoint(1.0, 1.0, Some(0.0)),
        waypoint(2.0, 0.5, None),
        waypoint(3.0, 2.0, Some(0.0)),
    ];
    let options_analytic = Options::new(1, vec![4], false).unwrap();

    let waypoints_bounded = waypoints_analytic.clone();
    let options_bounded = Options::new(1, vec![4], true).unwrap();
    let bound = Bound::from_raw(BoundKind::Ub, 1, 1, &[2.0], BoundTime::Full).unwrap();

    let iterations = 2_000;

    time_operation("generate (analytic KKT)", || {
        for _ in 0..iterations {
            let (trajectory, ..) = generate(&waypoints_analytic, &options_analytic, &[]).unwrap();
            assert!(trajectory.n_segments() > 0);
        }
    });

    time_operation("generate (numerical, bounded)", || {
        for _ in 0..iterations {
            let (trajectory, ..) = generate(&waypoints_bounded, &options_bounded, &[bound.clone()]).unwrap();
            assert!(trajectory.n_segments() > 0);
        }
    });
}
