//! rust_plmdca — pseudolikelihood-maximization DCA in Rust with optional
//! Python bindings.
//!
//! Purpose
//! -------
//! Provide the numerical core of plmDCA: estimate per-site fields and
//! pairwise couplings of a Potts model from an encoded multiple sequence
//! alignment by minimizing a regularized negative log-pseudolikelihood
//! with L-BFGS. Optionally expose the same entry point to Python through
//! PyO3 when the `python-bindings` feature is enabled.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules:
//!   - [`alignment`] for encoded alignments, biomolecule kinds,
//!     regularization strengths, and the reference [`PseudoLikelihood`]
//!     model.
//!   - [`optimization`] for the parameter layout, run configuration, the
//!     L-BFGS driver ([`plmdca`]) and the [`FieldsAndCouplings`] result
//!     handle.
//!   - [`logging`] for the stderr `tracing` subscriber used by front-ends.
//!   - [`utils`] for Python-side input conversion.
//! - Define the `#[pyclass]` result wrapper, the `plmdca_backend`
//!   function, and the `#[pymodule]` initializer for the `_rust_plmdca`
//!   Python extension.
//!
//! Invariants & assumptions
//! ------------------------
//! - All heavy numerical work is implemented in the inner Rust modules; the
//!   PyO3 items perform only FFI glue, input conversion, and error mapping.
//! - A returned parameter vector always has length
//!   `L·Q + L(L−1)/2·Q²`, fields first, then one `Q×Q` block per site pair
//!   `i < j` in lexicographic order.
//!
//! Conventions
//! -----------
//! - States are 0-based `u8` values below the alphabet size (21 for
//!   proteins, 5 for RNA, gap included).
//! - Optimizer non-convergence is reported through
//!   [`Termination`](optimization::plm_optimizer::Termination), never as
//!   an error. Errors from core Rust code become Python `ValueError`s at
//!   the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! ```ignore
//! use rust_plmdca::prelude::*;
//!
//! let alignment = EncodedAlignment::uniform(Biomolecule::Rna, sequences)?;
//! let model = PseudoLikelihood::new(alignment, Regularization::new(1.0, 0.2)?)?;
//! let config = PlmConfig::new(model.dims(), 500, 1, false)?;
//! let mut outcome = plmdca(&model, &config)?;
//! let couplings_01 = outcome.fields_and_couplings.coupling(0, 1);
//! outcome.fields_and_couplings.release();
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; end-to-end runs on small
//!   synthetic alignments live under `tests/`.
//! - The PyO3 surface is exercised from Python.

pub mod alignment;
pub mod logging;
pub mod optimization;
pub mod utils;

pub use crate::alignment::{
    Biomolecule, EncodedAlignment, PseudoLikelihood, Regularization,
};
pub use crate::optimization::plm_optimizer::{FieldsAndCouplings, plmdca};

pub mod prelude {
    pub use crate::alignment::prelude::*;
    pub use crate::optimization::prelude::*;
}

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::plm_optimizer::{PlmConfig, PlmOutcome},
    utils::build_alignment,
};

/// PlmResult — Python-facing wrapper around a finished plmDCA run.
///
/// Purpose
/// -------
/// Hand the fitted fields and couplings plus the run diagnostics to Python
/// while keeping ownership of the parameter vector on the Rust side until
/// the caller releases it.
///
/// Fields
/// ------
/// - `inner`: [`PlmOutcome`]
///   Full outcome of the run, including the result handle.
///
/// Invariants
/// ----------
/// - After `release()` the `fields_and_couplings` property is `None`;
///   scalar diagnostics stay available. Releasing twice is a no-op.
///
/// Performance
/// -----------
/// - `fields_and_couplings` copies the vector into a Python list on every
///   access; cache it on the Python side.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_plmdca")]
pub struct PlmResult {
    inner: PlmOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PlmResult {
    #[getter]
    pub fn fields_and_couplings(&self) -> Option<Vec<f64>> {
        self.inner.fields_and_couplings.as_slice().map(<[f64]>::to_vec)
    }

    #[getter]
    pub fn num_params(&self) -> usize {
        self.inner.fields_and_couplings.dims().total_num_params()
    }

    #[getter]
    pub fn termination_code(&self) -> i32 {
        self.inner.termination_code()
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.termination.is_converged()
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.termination.to_string()
    }

    #[getter]
    pub fn iterations(&self) -> u64 {
        self.inner.iterations
    }

    #[getter]
    pub fn value(&self) -> f64 {
        self.inner.value
    }

    #[getter]
    pub fn grad_norm(&self) -> Option<f64> {
        self.inner.grad_norm
    }

    #[getter]
    pub fn fn_evals(&self) -> Vec<(String, u64)> {
        let mut evals: Vec<(String, u64)> =
            self.inner.fn_evals.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        evals.sort();
        evals
    }

    /// Free the parameter vector. Safe to call more than once.
    pub fn release(&mut self) {
        self.inner.fields_and_couplings.release();
    }
}

/// Run plmDCA on an encoded alignment and return a [`PlmResult`].
///
/// Parameters
/// ----------
/// - `biomolecule`: `"protein"`/`"rna"` or the integer codes `1`/`2`.
/// - `msa`: 2-D array of `uint8` states, one row per sequence.
/// - `weights`: one non-negative weight per sequence; uniform `1/M` when
///   omitted.
/// - `lambda_h`, `lambda_j`: L2 strengths; default `1.0` and
///   `0.2·(L−1)`.
/// - `max_iteration`, `num_threads`, `verbose`: run configuration.
///
/// The GIL is released while optimizing.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (
        biomolecule,
        msa,
        weights = None,
        lambda_h = None,
        lambda_j = None,
        max_iteration = 500,
        num_threads = 1,
        verbose = false,
    ),
    text_signature = "(biomolecule, msa, /, weights=None, lambda_h=None, lambda_j=None, \
                      max_iteration=500, num_threads=1, verbose=False)"
)]
#[allow(clippy::too_many_arguments)]
pub fn plmdca_backend<'py>(
    py: Python<'py>, biomolecule: &Bound<'py, PyAny>, msa: &Bound<'py, PyAny>,
    weights: Option<&Bound<'py, PyAny>>, lambda_h: Option<f64>, lambda_j: Option<f64>,
    max_iteration: usize, num_threads: usize, verbose: bool,
) -> PyResult<PlmResult> {
    logging::init_stderr(verbose);

    let (alignment, regularization) =
        build_alignment(py, biomolecule, msa, weights, lambda_h, lambda_j)?;
    let model = PseudoLikelihood::new(alignment, regularization)?;
    let config = PlmConfig::new(model.dims(), max_iteration, num_threads, verbose)?;

    let inner = py.allow_threads(|| plmdca(&model, &config))?;
    Ok(PlmResult { inner })
}

/// _rust_plmdca — PyO3 module initializer for the Python extension.
///
/// Registers [`PlmResult`] and [`plmdca_backend`]; invoked by Python when
/// the compiled extension is imported.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_plmdca<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PlmResult>()?;
    m.add_function(wrap_pyfunction!(plmdca_backend, m)?)?;
    Ok(())
}
