use crate::bound::{Bound, BoundKind};
use crate::options::Options;
use crate::waypoint::Waypoint;

/// Whether the coupled problem is eligible for the decoupling wrapper:
/// more than one dimension, and either no bounds at all or every bound's
/// *kind* is axis-aligned (`lb`/`ub`) or a no-op (`1norm`/`infnorm`).
///
/// Note: `1norm`/`infnorm` bounds never emit rows, so their presence
/// can't actually couple dimensions together — but per the documented
/// quirk in the bound taxonomy, their mere presence still counts as
/// "not disqualifying", which this check reproduces faithfully rather
/// than special-casing away.
pub fn eligible(options: &Options, bounds: &[Bound]) -> bool {
    options.ndim > 1
        && bounds.iter().all(|b| {
            matches!(
                b.kind,
                BoundKind::Lb | BoundKind::Ub | BoundKind::OneNorm | BoundKind::InfNorm
            )
        })
}

/// Project the full-dimensional waypoints down to dimension `j`.
pub fn project_waypoints(waypoints: &[Waypoint], j: usize) -> Vec<Waypoint> {
    waypoints.iter().map(|w| w.project(j)).collect()
}

/// Project the full-dimensional bounds down to dimension `j`.
pub fn project_bounds(bounds: &[Bound], j: usize) -> Vec<Bound> {
    bounds.iter().map(|b| b.project(j)).collect()
}
