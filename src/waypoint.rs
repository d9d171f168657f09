use serde::{Deserialize, Serialize};

use crate::error::{TrajGenError, TrajGenResult};

/// Converts the external NaN-as-unconstrained convention into the internal
/// `Option<f64>` representation.
fn nan_to_option(value: f64) -> Option<f64> {
    if value.is_nan() { None } else { Some(value) }
}

/// Per-dimension derivative specification at a single waypoint: position
/// through snap, each optionally constrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivativeSet {
    pub pos: Option<f64>,
    pub vel: Option<f64>,
    pub acc: Option<f64>,
    pub jerk: Option<f64>,
    pub snap: Option<f64>,
}

impl DerivativeSet {
    /// Fetch the constraint for derivative order `k` (0=pos .. 4=snap).
    pub fn get(&self, k: usize) -> Option<f64> {
        match k {
            0 => self.pos,
            1 => self.vel,
            2 => self.acc,
            3 => self.jerk,
            4 => self.snap,
            _ => None,
        }
    }
}

/// A time-stamped boundary condition specifying some subset of a
/// trajectory's derivatives per dimension. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub time: f64,
    dims: Vec<DerivativeSet>,
}

impl Waypoint {
    /// Construct a waypoint directly from canonicalized per-dimension
    /// derivative sets.
    pub fn new(time: f64, dims: Vec<DerivativeSet>) -> Self {
        Self { time, dims }
    }

    /// Construct a waypoint from the external NaN-sentinel convention.
    /// Each slice is either empty (no constraint on that derivative, any
    /// dimension) or exactly `ndim` long, with `NaN` meaning "unconstrained
    /// in this dimension".
    pub fn from_raw(
        time: f64,
        ndim: usize,
        pos: &[f64],
        vel: &[f64],
        acc: &[f64],
        jerk: &[f64],
        snap: &[f64],
    ) -> TrajGenResult<Self> {
        let slot = |values: &[f64], name: &'static str| -> TrajGenResult<Vec<Option<f64>>> {
            if values.is_empty() {
                Ok(vec![None; ndim])
            } else if values.len() == ndim {
                Ok(values.iter().map(|&v| nan_to_option(v)).collect())
            } else {
                Err(TrajGenError::ShapeMismatch(format!(
                    "waypoint `{name}` has length {} but ndim is {ndim}",
                    values.len()
                )))
            }
        };

        let pos = slot(pos, "pos")?;
        let vel = slot(vel, "vel")?;
        let acc = slot(acc, "acc")?;
        let jerk = slot(jerk, "jerk")?;
        let snap = slot(snap, "snap")?;

        let dims = (0..ndim)
            .map(|j| DerivativeSet {
                pos: pos[j],
                vel: vel[j],
                acc: acc[j],
                jerk: jerk[j],
                snap: snap[j],
            })
            .collect();

        Ok(Self { time, dims })
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn derivatives(&self) -> &[DerivativeSet] {
        &self.dims
    }

    /// Project a single dimension out of this waypoint, used by the
    /// decoupling wrapper.
    pub fn project(&self, j: usize) -> Waypoint {
        Waypoint {
            time: self.time,
            dims: vec![self.dims[j]],
        }
    }
}

/// Validate that waypoint times are strictly increasing.
pub fn validate_monotonic(waypoints: &[Waypoint]) -> TrajGenResult<()> {
    for i in 1..waypoints.len() {
        if waypoints[i].time <= waypoints[i - 1].time {
            return Err(TrajGenError::NonMonotonicTime {
                index: i,
                time: waypoints[i].time,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_canonicalizes_nan_to_none() {
        let wp = Waypoint::from_raw(0.0, 2, &[0.0, f64::NAN], &[], &[], &[], &[]).unwrap();
        assert_eq!(wp.derivatives()[0].pos, Some(0.0));
        assert_eq!(wp.derivatives()[1].pos, None);
        assert_eq!(wp.derivatives()[0].vel, None);
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = Waypoint::from_raw(0.0, 2, &[0.0], &[], &[], &[], &[]);
        assert!(err.is_err());
    }

    #[test]
    fn validate_monotonic_rejects_non_increasing_times() {
        let waypoints = vec![
            Waypoint::new(1.0, vec![DerivativeSet::default()]),
            Waypoint::new(0.5, vec![DerivativeSet::default()]),
        ];
        assert!(validate_monotonic(&waypoints).is_err());
    }
}
