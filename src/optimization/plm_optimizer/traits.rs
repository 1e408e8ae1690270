//! Public API surface for pseudolikelihood maximization.
//!
//! - [`AlignmentModel`]: trait a model of the alignment implements.
//! - [`PlmConfig`] and [`LbfgsSettings`]: run configuration.
//! - [`Termination`]: how a finished run stopped.
//! - [`PlmOutcome`]: normalized result returned by [`plmdca`].
//!
//! Convention: we *maximize* the regularized log-pseudolikelihood by
//! minimizing its negative. Models return that negative value and its
//! gradient directly; nothing in the optimizer flips signs.
//!
//! [`plmdca`]: crate::optimization::plm_optimizer::plmdca
use argmin::core::{TerminationReason, TerminationStatus};
use std::fmt;

use crate::optimization::{
    errors::{OptError, OptResult},
    plm_optimizer::{
        handle::FieldsAndCouplings,
        layout::ProblemDims,
        monitor::IterationReport,
        types::{
            Cost, DEFAULT_EPSILON, DEFAULT_FTOL, DEFAULT_LBFGS_MEM, DEFAULT_MAX_LINESEARCH,
            DEFAULT_WOLFE, FnEvalMap, Grad, Theta,
        },
        validation::{
            validate_num_threads, validate_value, verify_ftol, verify_lbfgs_mem, verify_max_iter,
            verify_max_linesearch, verify_tol_grad, verify_wolfe,
        },
    },
};

/// Objective/gradient provider for one alignment.
///
/// The optimizer drives implementations through three calls:
/// - `check(&dims)`: called once before any allocation; reject dimensions
///   the model cannot serve.
/// - `initialize(&mut buffer)`: fill every entry of the freshly allocated
///   parameter vector with the starting point.
/// - `gradient(&x, &mut g)`: overwrite `g` with the gradient at `x` and
///   return the objective value (regularized negative
///   log-pseudolikelihood).
///
/// Implementations must be stateless between `gradient` calls and `Sync`,
/// since evaluation runs inside the run's worker pool.
pub trait AlignmentModel: Sync {
    fn check(&self, dims: &ProblemDims) -> OptResult<()>;
    fn initialize(&self, buffer: &mut Theta) -> OptResult<()>;
    fn gradient(&self, x: &Theta, grad: &mut Grad) -> OptResult<Cost>;
}

/// L-BFGS and line-search settings.
///
/// `LbfgsSettings::default()` is the fixed configuration of a plmDCA run:
///
/// | field            | value |
/// |------------------|-------|
/// | `epsilon`        | 1e-3  |
/// | `ftol`           | 1e-4  |
/// | `wolfe`          | 0.9   |
/// | `max_linesearch` | 5     |
/// | `memory`         | 5     |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LbfgsSettings {
    /// Gradient-norm convergence threshold.
    pub epsilon: f64,
    /// Sufficient-decrease coefficient of the line search.
    pub ftol: f64,
    /// Curvature coefficient of the line search.
    pub wolfe: f64,
    pub max_linesearch: usize,
    pub memory: usize,
}

impl LbfgsSettings {
    /// Construct validated settings.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolGrad`] for a non-positive or non-finite epsilon.
    /// - [`OptError::InvalidFtol`] unless `0 < ftol < 0.5`.
    /// - [`OptError::InvalidWolfe`] unless `ftol < wolfe < 1`.
    /// - [`OptError::InvalidMaxLineSearch`] / [`OptError::InvalidLBFGSMem`] for zero counts.
    pub fn new(
        epsilon: f64, ftol: f64, wolfe: f64, max_linesearch: usize, memory: usize,
    ) -> OptResult<Self> {
        let settings = Self { epsilon, ftol, wolfe, max_linesearch, memory };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> OptResult<()> {
        verify_tol_grad(self.epsilon)?;
        verify_ftol(self.ftol)?;
        verify_wolfe(self.wolfe, self.ftol)?;
        verify_max_linesearch(self.max_linesearch)?;
        verify_lbfgs_mem(self.memory)
    }
}

impl Default for LbfgsSettings {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            ftol: DEFAULT_FTOL,
            wolfe: DEFAULT_WOLFE,
            max_linesearch: DEFAULT_MAX_LINESEARCH,
            memory: DEFAULT_LBFGS_MEM,
        }
    }
}

/// Configuration of one plmDCA run.
///
/// Fields:
/// - `dims`: problem dimensions `(L, Q)`.
/// - `max_iterations`: ceiling on outer optimizer iterations (> 0).
/// - `num_threads`: worker count for objective evaluation (≥ 1).
/// - `verbose`: log per-iteration progress through `tracing`.
/// - `lbfgs`: solver settings, [`LbfgsSettings::default`] unless
///   experimenting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlmConfig {
    pub dims: ProblemDims,
    pub max_iterations: usize,
    pub num_threads: usize,
    pub verbose: bool,
    pub lbfgs: LbfgsSettings,
}

impl PlmConfig {
    /// Build a configuration with the fixed solver settings.
    ///
    /// The worker count is checked first, so a build without multithreading
    /// rejects `num_threads > 1` before anything else.
    pub fn new(
        dims: ProblemDims, max_iterations: usize, num_threads: usize, verbose: bool,
    ) -> OptResult<Self> {
        let config =
            Self { dims, max_iterations, num_threads, verbose, lbfgs: LbfgsSettings::default() };
        config.validate()?;
        Ok(config)
    }

    pub fn with_lbfgs(mut self, lbfgs: LbfgsSettings) -> OptResult<Self> {
        lbfgs.validate()?;
        self.lbfgs = lbfgs;
        Ok(self)
    }

    pub fn validate(&self) -> OptResult<()> {
        validate_num_threads(self.num_threads)?;
        verify_max_iter(self.max_iterations)?;
        self.lbfgs.validate()
    }
}

/// Terminal state of a run that produced a parameter vector.
///
/// Aborted runs never reach this type; they surface as `Err(OptError)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The gradient-norm criterion was met.
    Converged,
    IterationLimitReached,
    /// A line search ran out of trials or hit a numerical condition; the
    /// best iterate seen so far is returned.
    LineSearchFailed,
    /// Any other solver-reported stop.
    Stopped { reason: String },
}

impl Termination {
    /// Status code compatible with liblbfgs (`LBFGS_SUCCESS`,
    /// `LBFGSERR_MAXIMUMITERATION`, `LBFGSERR_MAXIMUMLINESEARCH`,
    /// `LBFGSERR_UNKNOWNERROR`).
    pub fn code(&self) -> i32 {
        match self {
            Termination::Converged => 0,
            Termination::IterationLimitReached => -997,
            Termination::LineSearchFailed => -996,
            Termination::Stopped { .. } => -1024,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, Termination::Converged)
    }
}

impl From<&TerminationStatus> for Termination {
    fn from(status: &TerminationStatus) -> Self {
        match status {
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                Termination::IterationLimitReached
            }
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached,
            ) => Termination::Converged,
            other => Termination::Stopped { reason: format!("{other:?}") },
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Converged => write!(f, "converged"),
            Termination::IterationLimitReached => write!(f, "maximum number of iterations reached"),
            Termination::LineSearchFailed => write!(f, "line search failed"),
            Termination::Stopped { reason } => write!(f, "stopped: {reason}"),
        }
    }
}

/// Canonical result returned by [`plmdca`].
///
/// - `fields_and_couplings`: handle owning the returned parameter vector.
/// - `value`: objective value at the returned vector.
/// - `termination`: how the run stopped.
/// - `iterations`: completed outer iterations.
/// - `fn_evals`: solver counters (e.g. `"cost_count"`, `"gradient_count"`).
/// - `grad_norm`: last available gradient norm, if any.
/// - `history`: one [`IterationReport`] per completed iteration.
///
/// [`plmdca`]: crate::optimization::plm_optimizer::plmdca
#[derive(Debug, Clone, PartialEq)]
pub struct PlmOutcome {
    pub fields_and_couplings: FieldsAndCouplings,
    pub value: Cost,
    pub termination: Termination,
    pub iterations: u64,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
    pub history: Vec<IterationReport>,
}

impl PlmOutcome {
    /// Assemble an outcome, validating the vector and the value.
    ///
    /// # Errors
    /// - [`OptError::MissingParams`] if no vector is available.
    /// - Length/finiteness errors from [`FieldsAndCouplings::new`].
    /// - [`OptError::NonFiniteCost`] for a non-finite value.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dims: ProblemDims, params: Option<Theta>, value: Cost, termination: Termination,
        iterations: u64, fn_evals: FnEvalMap, grad_norm: Option<f64>,
        history: Vec<IterationReport>,
    ) -> OptResult<Self> {
        let params = params.ok_or(OptError::MissingParams)?;
        validate_value(value)?;
        let fields_and_couplings = FieldsAndCouplings::new(dims, params)?;
        Ok(Self {
            fields_and_couplings,
            value,
            termination,
            iterations,
            fn_evals,
            grad_norm,
            history,
        })
    }

    pub fn termination_code(&self) -> i32 {
        self.termination.code()
    }
}
