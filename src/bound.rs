use serde::{Deserialize, Serialize};

use crate::error::{TrajGenError, TrajGenResult};

/// Kind of affine inequality a [`Bound`] imposes. `OneNorm`/`InfNorm` are
/// reserved slots — accepted as input but currently no-ops, per the
/// taxonomy's documented "unimplemented bound types" design note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundKind {
    Lb,
    Ub,
    OneNorm,
    InfNorm,
}

/// The time span a bound applies over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundTime {
    Instant(f64),
    Interval(f64, f64),
    Full,
}

impl BoundTime {
    /// Resolve this time specification to a concrete `[t0, t1]` interval
    /// given the trajectory's key times.
    pub fn resolve(&self, keytimes: &[f64]) -> (f64, f64) {
        match *self {
            BoundTime::Instant(t) => (t, t),
            BoundTime::Interval(t0, t1) => (t0, t1),
            BoundTime::Full => (keytimes[0], keytimes[keytimes.len() - 1]),
        }
    }
}

/// An affine inequality bound on a derivative over a time span, optionally
/// per-dimension (`None` in `arg[j]` means unconstrained in dimension `j`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub kind: BoundKind,
    pub derivative: usize,
    arg: Vec<Option<f64>>,
    pub time: BoundTime,
}

impl Bound {
    pub fn new(kind: BoundKind, derivative: usize, arg: Vec<Option<f64>>, time: BoundTime) -> Self {
        Self {
            kind,
            derivative,
            arg,
            time,
        }
    }

    /// Construct a bound from the external NaN-sentinel convention.
    pub fn from_raw(
        kind: BoundKind,
        derivative: usize,
        ndim: usize,
        arg: &[f64],
        time: BoundTime,
    ) -> TrajGenResult<Self> {
        if arg.len() != ndim {
            return Err(TrajGenError::ShapeMismatch(format!(
                "bound `arg` has length {} but ndim is {ndim}",
                arg.len()
            )));
        }
        let arg = arg
            .iter()
            .map(|&v| if v.is_nan() { None } else { Some(v) })
            .collect();
        Ok(Self::new(kind, derivative, arg, time))
    }

    pub fn ndim(&self) -> usize {
        self.arg.len()
    }

    pub fn arg(&self) -> &[Option<f64>] {
        &self.arg
    }

    /// `true` for bound kinds that never emit a row (reserved extensions).
    pub fn is_noop(&self) -> bool {
        matches!(self.kind, BoundKind::OneNorm | BoundKind::InfNorm)
    }

    /// Project a single dimension out of this bound, used by the
    /// decoupling wrapper.
    pub fn project(&self, j: usize) -> Bound {
        Bound {
            kind: self.kind,
            derivative: self.derivative,
            arg: vec![self.arg[j]],
            time: self.time,
        }
    }

    /// A clone of this bound with a narrowed time span, used while
    /// splitting a multi-segment bound into single-segment pieces.
    pub fn with_time(&self, time: BoundTime) -> Bound {
        Bound {
            kind: self.kind,
            derivative: self.derivative,
            arg: self.arg.clone(),
            time,
        }
    }
}
