//! Piecewise-polynomial trajectory generation for multi-dimensional
//! kinematic systems (e.g. quadrotor flat outputs x/y/z/yaw): assembles a
//! quadratic program from waypoints, derivative continuity requirements
//! and inequality bounds, then dispatches it to an analytic KKT solve or
//! a pluggable numerical QP backend.

pub mod basis;
pub mod bound;
pub mod continuity;
pub mod cost;
pub mod decouple;
pub mod equality;
pub mod error;
pub mod generate;
pub mod index;
pub mod inequality;
pub mod options;
pub mod problem;
pub mod solver;
pub mod trajectory;
pub mod waypoint;

pub use basis::Basis;
pub use bound::{Bound, BoundKind, BoundTime};
pub use error::{TrajGenError, TrajGenResult};
pub use generate::{ExitFlag, generate};
pub use options::Options;
pub use problem::Problem;
pub use solver::{ArgminQpSolver, PenaltyQpSolver, QPSolver, SolverOptions};
pub use trajectory::Trajectory;
pub use waypoint::{DerivativeSet, Waypoint};
