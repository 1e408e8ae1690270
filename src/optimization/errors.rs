//! optimization::errors — unified error surface for the plmDCA engine.
//!
//! Every fallible path in the optimizer layer returns [`OptResult<T>`].
//! Configuration problems, allocation failures, model failures and backend
//! (argmin) errors are all normalized into [`OptError`]; optimizer
//! non-convergence is *not* an error and is reported through
//! [`Termination`](crate::optimization::plm_optimizer::Termination) instead.
use argmin::core::{ArgminError, Error};
use thiserror::Error;

use crate::alignment::errors::AlignmentError;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptError {
    // ---- Gradient ----
    /// Gradient dimensions do not match parameter dimensions.
    #[error("Gradient dimension mismatch: expected {expected}, found {found}")]
    GradientDimMismatch { expected: usize, found: usize },

    /// Gradient elements need to be finite.
    #[error("Invalid gradient at index {index}: {value}: {reason}")]
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- Configuration ----
    #[error("Invalid gradient tolerance {tol}: {reason}")]
    InvalidTolGrad { tol: f64, reason: &'static str },

    #[error("Invalid line-search sufficient decrease tolerance {tol}: {reason}")]
    InvalidFtol { tol: f64, reason: &'static str },

    #[error("Invalid line-search curvature coefficient {value}: {reason}")]
    InvalidWolfe { value: f64, reason: &'static str },

    #[error("Invalid maximum iterations {max_iter}: {reason}")]
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    #[error("Invalid maximum line-search trials {max_trials}: {reason}")]
    InvalidMaxLineSearch { max_trials: usize, reason: &'static str },

    /// lbfgs_mem needs to be at least 1.
    #[error("Invalid L-BFGS memory {mem}: {reason}")]
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    #[error(
        "Invalid problem dimensions (sequence_length = {sequence_length}, \
         num_site_states = {num_site_states}): {reason}"
    )]
    InvalidDimensions { sequence_length: usize, num_site_states: usize, reason: &'static str },

    #[error("Invalid number of threads {num_threads}: {reason}")]
    InvalidThreadCount { num_threads: usize, reason: &'static str },

    /// More than one worker requested in a build without the `parallel` feature.
    #[error(
        "Cannot use {num_threads} threads: multithreading is not supported by this build"
    )]
    MultithreadingUnsupported { num_threads: usize },

    #[error("Failed to build worker thread pool: {text}")]
    ThreadPool { text: String },

    // ---- Allocation ----
    #[error("Failed to allocate a parameter buffer of {num_params} elements")]
    AllocationFailed { num_params: usize },

    #[error(
        "Parameter count overflows usize for sequence_length = {sequence_length}, \
         num_site_states = {num_site_states}"
    )]
    ParameterCountOverflow { sequence_length: usize, num_site_states: usize },

    // ---- Cost function ----
    #[error("Non-finite cost value: {value}")]
    NonFiniteCost { value: f64 },

    // ---- Parameter vector ----
    #[error("Parameter vector length mismatch: expected {expected}, found {found}")]
    ParamLengthMismatch { expected: usize, found: usize },

    #[error("Invalid parameter at index {index}: {value}: {reason}")]
    InvalidParams { index: usize, value: f64, reason: &'static str },

    #[error("Missing estimated parameters")]
    MissingParams,

    // ---- Line search ----
    /// The bounded line search used up its trials without meeting the
    /// Wolfe conditions.
    #[error("Line search exceeded {max_trials} trials")]
    LineSearchExhausted { max_trials: usize },

    // ---- Monitor ----
    #[error("Iteration record is unavailable (poisoned lock)")]
    RecordUnavailable,

    // ---- Alignment model ----
    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    #[error("Invalid parameter: {text}")]
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    #[error("Not implemented: {text}")]
    NotImplemented { text: String },
    /// Wrapper for argmin::NotInitialized
    #[error("Not initialized: {text}")]
    NotInitialized { text: String },
    /// Wrapper for argmin::ConditionViolated
    #[error("Condition violated: {text}")]
    ConditionViolated { text: String },
    /// Wrapper for argmin::CheckPointNotFound
    #[error("Checkpoint not found: {text}")]
    CheckPointNotFound { text: String },
    /// Wrapper for argmin::PotentialBug
    #[error("Potential bug: {text}")]
    PotentialBug { text: String },
    /// Wrapper for argmin::ImpossibleError
    #[error("Impossible error: {text}")]
    ImpossibleError { text: String },
    /// Wrapper for other argmin::Error types
    #[error("Backend error: {text}")]
    BackendError { text: String },

    // ---- Fallback ----
    #[error("Unknown error")]
    UnknownError,
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Our own errors travel through argmin boxed; unwrap those first.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<OptError> for PyErr {
    fn from(err: OptError) -> PyErr {
        PyValueError::new_err(format!("OptError: {err}"))
    }
}
