use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use trajgen as core;

fn to_py_err(err: core::TrajGenError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_bound_kind(kind: &str) -> PyResult<core::BoundKind> {
    match kind {
        "lb" => Ok(core::BoundKind::Lb),
        "ub" => Ok(core::BoundKind::Ub),
        "1norm" => Ok(core::BoundKind::OneNorm),
        "infnorm" => Ok(core::BoundKind::InfNorm),
        other => Err(PyValueError::new_err(format!("unknown bound kind `{other}`"))),
    }
}

#[pymodule]
pub fn trajgen_py(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyWaypoint>()?;
    module.add_class::<PyBound>()?;
    module.add_class::<PyOptions>()?;
    module.add_class::<PyTrajectory>()?;
    module.add_function(wrap_pyfunction!(generate_trajectory, module)?)?;
    Ok(())
}

#[pyclass(name = "Waypoint")]
#[derive(Clone)]
pub struct PyWaypoint {
    inner: core::Waypoint,
}

#[pymethods]
impl PyWaypoint {
    /// Each derivative slice is either empty (unconstrained in every
    /// dimension) or exactly `ndim` long, with NaN meaning "unconstrained
    /// in this dimension" -- the same sentinel convention the Rust side uses.
    #[new]
    #[pyo3(signature = (time, ndim, pos, vel=vec![], acc=vec![], jerk=vec![], snap=vec![]))]
    pub fn new(
        time: f64,
        ndim: usize,
        pos: Vec<f64>,
        vel: Vec<f64>,
        acc: Vec<f64>,
        jerk: Vec<f64>,
        snap: Vec<f64>,
    ) -> PyResult<Self> {
        let inner = core::Waypoint::from_raw(time, ndim, &pos, &vel, &acc, &jerk, &snap).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    pub fn ndim(&self) -> usize {
        self.inner.ndim()
    }
}

#[pyclass(name = "Bound")]
#[derive(Clone)]
pub struct PyBound {
    inner: core::Bound,
}

#[pymethods]
impl PyBound {
    /// `kind` is one of `"lb"`, `"ub"`, `"1norm"`, `"infnorm"`. A time span
    /// of `t0=None` means "full trajectory"; `t0` alone means an instant;
    /// both `t0`/`t1` mean the closed interval between them.
    #[new]
    #[pyo3(signature = (kind, derivative, ndim, arg, t0=None, t1=None))]
    pub fn new(kind: &str, derivative: usize, ndim: usize, arg: Vec<f64>, t0: Option<f64>, t1: Option<f64>) -> PyResult<Self> {
        let kind = parse_bound_kind(kind)?;
        let time = match (t0, t1) {
            (Some(a), Some(b)) => core::BoundTime::Interval(a, b),
            (Some(a), None) => core::BoundTime::Instant(a),
            _ => core::BoundTime::Full,
        };
        let inner = core::Bound::from_raw(kind, derivative, ndim, &arg, time).map_err(to_py_err)?;
        Ok(Self { inner })
    }
}

#[pyclass(name = "Options")]
#[derive(Clone)]
pub struct PyOptions {
    inner: core::Options,
}

#[pymethods]
impl PyOptions {
    #[new]
    #[pyo3(signature = (ndim, minderiv, has_bounds=false))]
    pub fn new(ndim: usize, minderiv: Vec<usize>, has_bounds: bool) -> PyResult<Self> {
        let inner = core::Options::new(ndim, minderiv, has_bounds).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    pub fn with_order(&mut self, order: usize) {
        self.inner = self.inner.clone().with_order(order);
    }

    pub fn with_contderiv(&mut self, contderiv: Vec<usize>) -> PyResult<()> {
        self.inner = self.inner.clone().with_contderiv(contderiv).map_err(to_py_err)?;
        Ok(())
    }

    pub fn with_numerical(&mut self, numerical: bool) {
        self.inner = self.inner.clone().with_numerical(numerical);
    }

    pub fn with_convergetol(&mut self, tol: f64) {
        self.inner = self.inner.clone().with_convergetol(tol);
    }

    pub fn with_verbose(&mut self, verbose: bool) {
        self.inner = self.inner.clone().with_verbose(verbose);
    }
}

#[pyclass(name = "Trajectory")]
pub struct PyTrajectory {
    inner: core::Trajectory,
    basis: core::Basis,
}

#[pymethods]
impl PyTrajectory {
    pub fn n_segments(&self) -> usize {
        self.inner.n_segments()
    }

    pub fn ndim(&self) -> usize {
        self.inner.ndim()
    }

    pub fn durations(&self) -> Vec<f64> {
        self.inner.durations.clone()
    }

    /// Evaluate the `deriv`-th physical-time derivative of dimension `dim`
    /// at physical time `t`.
    pub fn evaluate(&self, dim: usize, deriv: usize, t: f64) -> f64 {
        self.inner.evaluate(&self.basis, dim, deriv, t)
    }
}

/// Assemble and solve the trajectory QP, returning the resulting
/// trajectory, the segment durations, and one exit flag per dimension
/// (a single-element list for a coupled solve).
#[pyfunction]
pub fn generate_trajectory(
    py: Python<'_>,
    waypoints: Vec<Py<PyWaypoint>>,
    options: Py<PyOptions>,
    bounds: Vec<Py<PyBound>>,
) -> PyResult<(PyTrajectory, Vec<f64>, Vec<i32>)> {
    let waypoints: Vec<core::Waypoint> = waypoints.iter().map(|w| w.borrow(py).inner.clone()).collect();
    let bounds: Vec<core::Bound> = bounds.iter().map(|b| b.borrow(py).inner.clone()).collect();
    let options = options.borrow(py).inner.clone();

    let (trajectory, durations, _problem, flag) = core::generate(&waypoints, &options, &bounds).map_err(to_py_err)?;

    let flags = match flag {
        core::ExitFlag::Coupled(f) => vec![f],
        core::ExitFlag::Decoupled(fs) => fs,
    };

    let basis = core::Basis::new(options.order);
    Ok((
        PyTrajectory {
            inner: trajectory,
            basis,
        },
        durations,
        flags,
    ))
}
