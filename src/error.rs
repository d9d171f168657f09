use thiserror::Error;

/// Errors surfaced by the trajectory generator. Configuration and shape
/// problems are fatal before assembly begins; a non-optimal solver
/// termination is never represented here — it is reported through the
/// exit flag returned by [`crate::generate`] instead.
#[derive(Debug, Error)]
pub enum TrajGenError {
    #[error("required option `{0}` was not supplied")]
    ConfigMissing(&'static str),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error(
        "waypoint times must be strictly increasing (waypoint {index} has time {time} which is not greater than the previous waypoint's time)"
    )]
    NonMonotonicTime { index: usize, time: f64 },

    #[error("minimum-derivative order {0} exceeds the supported maximum of 4")]
    DerivativeUnsupported(usize),

    #[error("requested derivative order {0} exceeds the supported maximum of 4")]
    BadDerivative(usize),

    #[error("bound time interval [{0}, {1}] lies outside the trajectory span")]
    OutOfRange(f64, f64),

    #[error("the analytic KKT system is singular and the numerical fallback also failed")]
    SolverSingular,
}

pub type TrajGenResult<T> = Result<T, TrajGenError>;
