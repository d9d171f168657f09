use crate::basis::MAX_DERIVATIVE;
use crate::error::{TrajGenError, TrajGenResult};

/// Typed configuration for [`crate::generate`]. Deliberately a struct with
/// explicit fields rather than a key/value bag: malformed or missing
/// required fields are rejected at construction, not at first use.
#[derive(Debug, Clone)]
pub struct Options {
    pub order: usize,
    pub minderiv: Vec<usize>,
    pub contderiv: Vec<usize>,
    pub ndim: usize,
    pub constraints_per_seg: usize,
    pub numerical: bool,
    pub convergetol: f64,
    pub verbose: bool,
}

impl Options {
    /// Build options with the documented defaults, validating `ndim` and
    /// `minderiv` eagerly. `contderiv` defaults to `minderiv`;
    /// `constraints_per_seg` defaults to `2*(order+1)`; `numerical`
    /// defaults to `has_bounds`.
    pub fn new(ndim: usize, minderiv: Vec<usize>, has_bounds: bool) -> TrajGenResult<Self> {
        if ndim == 0 {
            return Err(TrajGenError::ConfigMissing("ndim"));
        }
        if minderiv.is_empty() {
            return Err(TrajGenError::ConfigMissing("minderiv"));
        }
        if minderiv.len() != ndim {
            return Err(TrajGenError::ShapeMismatch(format!(
                "minderiv has length {} but ndim is {ndim}",
                minderiv.len()
            )));
        }
        if let Some(&bad) = minderiv.iter().find(|&&m| m > MAX_DERIVATIVE) {
            return Err(TrajGenError::DerivativeUnsupported(bad));
        }

        let order = 12;
        let contderiv = minderiv.clone();
        Ok(Self {
            order,
            constraints_per_seg: 2 * (order + 1),
            contderiv,
            ndim,
            numerical: has_bounds,
            convergetol: 1e-8,
            verbose: true,
            minderiv,
        })
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    pub fn with_contderiv(mut self, contderiv: Vec<usize>) -> TrajGenResult<Self> {
        if contderiv.len() != self.ndim {
            return Err(TrajGenError::ShapeMismatch(format!(
                "contderiv has length {} but ndim is {}",
                contderiv.len(),
                self.ndim
            )));
        }
        self.contderiv = contderiv;
        Ok(self)
    }

    pub fn with_constraints_per_seg(mut self, n: usize) -> Self {
        self.constraints_per_seg = n;
        self
    }

    pub fn with_numerical(mut self, numerical: bool) -> Self {
        self.numerical = numerical;
        self
    }

    pub fn with_convergetol(mut self, tol: f64) -> Self {
        self.convergetol = tol;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Project the options for a single dimension, used by the decoupling
    /// wrapper.
    pub fn project(&self, j: usize) -> Options {
        Options {
            order: self.order,
            minderiv: vec![self.minderiv[j]],
            contderiv: vec![self.contderiv[j]],
            ndim: 1,
            constraints_per_seg: self.constraints_per_seg,
            numerical: self.numerical,
            convergetol: self.convergetol,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let options = Options::new(2, vec![4, 4], false).unwrap();
        assert_eq!(options.order, 12);
        assert_eq!(options.contderiv, vec![4, 4]);
        assert_eq!(options.constraints_per_seg, 26);
        assert!(!options.numerical);
    }

    #[test]
    fn rejects_unsupported_minderiv() {
        assert!(Options::new(1, vec![5], false).is_err());
    }

    #[test]
    fn rejects_shape_mismatch() {
        assert!(Options::new(2, vec![4], false).is_err());
    }
}
