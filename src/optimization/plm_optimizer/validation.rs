//! Validation helpers for pseudolikelihood optimization.
//!
//! This module centralizes the consistency checks used across the optimizer
//! interface:
//!
//! - **Solver settings**: [`verify_tol_grad`], [`verify_ftol`],
//!   [`verify_wolfe`], [`verify_max_linesearch`], [`verify_lbfgs_mem`].
//! - **Run settings**: [`verify_max_iter`] and [`check_thread_support`].
//! - **Model output**: [`validate_grad`] and [`validate_value`].
//! - **Parameter vectors**: [`validate_params`] enforces the expected length
//!   and finite entries.
//!
//! Every helper reports failures through a dedicated [`OptError`] variant.
use crate::optimization::{
    errors::{OptError, OptResult},
    plm_optimizer::types::{Grad, Theta},
};

/// Validate the gradient-norm convergence threshold.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: f64) -> OptResult<()> {
    if !tol.is_finite() {
        return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
    }
    Ok(())
}

/// Validate the line-search sufficient-decrease coefficient.
///
/// Must lie strictly inside `(0, 0.5)`.
///
/// # Errors
/// Returns [`OptError::InvalidFtol`] otherwise.
pub fn verify_ftol(tol: f64) -> OptResult<()> {
    if !tol.is_finite() {
        return Err(OptError::InvalidFtol { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 || tol >= 0.5 {
        return Err(OptError::InvalidFtol { tol, reason: "Tolerance must lie in (0, 0.5)." });
    }
    Ok(())
}

/// Validate the line-search curvature coefficient against `ftol`.
///
/// # Errors
/// Returns [`OptError::InvalidWolfe`] unless `ftol < wolfe < 1`.
pub fn verify_wolfe(wolfe: f64, ftol: f64) -> OptResult<()> {
    if !wolfe.is_finite() {
        return Err(OptError::InvalidWolfe { value: wolfe, reason: "Coefficient must be finite." });
    }
    if wolfe <= ftol || wolfe >= 1.0 {
        return Err(OptError::InvalidWolfe {
            value: wolfe,
            reason: "Coefficient must lie strictly between ftol and 1.",
        });
    }
    Ok(())
}

pub fn verify_max_linesearch(max_trials: usize) -> OptResult<()> {
    if max_trials == 0 {
        return Err(OptError::InvalidMaxLineSearch {
            max_trials,
            reason: "At least one line-search trial is required.",
        });
    }
    Ok(())
}

pub fn verify_lbfgs_mem(mem: usize) -> OptResult<()> {
    if mem == 0 {
        return Err(OptError::InvalidLBFGSMem {
            mem,
            reason: "L-BFGS memory must be greater than zero.",
        });
    }
    Ok(())
}

pub fn verify_max_iter(max_iter: usize) -> OptResult<()> {
    if max_iter == 0 {
        return Err(OptError::InvalidMaxIter {
            max_iter,
            reason: "Maximum iterations must be greater than zero.",
        });
    }
    Ok(())
}

/// Validate a requested worker count against this build's capabilities.
///
/// - `0` workers is never valid.
/// - More than one worker requires multithreading support (`supported`).
/// - Counts above the host's available parallelism are accepted unchanged;
///   [`WorkerPool::new`] reports them once when it builds the pool.
///
/// [`WorkerPool::new`]: crate::optimization::plm_optimizer::workers::WorkerPool::new
///
/// # Errors
/// - [`OptError::InvalidThreadCount`] for `num_threads == 0`.
/// - [`OptError::MultithreadingUnsupported`] for `num_threads > 1` when
///   `supported` is false.
pub fn check_thread_support(num_threads: usize, supported: bool) -> OptResult<()> {
    if num_threads == 0 {
        return Err(OptError::InvalidThreadCount {
            num_threads,
            reason: "At least one worker thread is required.",
        });
    }
    if num_threads > 1 && !supported {
        return Err(OptError::MultithreadingUnsupported { num_threads });
    }
    Ok(())
}

/// [`check_thread_support`] against the capabilities of this build.
pub fn validate_num_threads(num_threads: usize) -> OptResult<()> {
    check_thread_support(num_threads, cfg!(feature = "parallel"))
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate a parameter vector: expected length, finite entries.
///
/// # Errors
/// - [`OptError::ParamLengthMismatch`] on a length mismatch.
/// - [`OptError::InvalidParams`] for the first non-finite entry.
pub fn validate_params(params: &Theta, dim: usize) -> OptResult<()> {
    if params.len() != dim {
        return Err(OptError::ParamLengthMismatch { expected: dim, found: params.len() });
    }
    for (index, &value) in params.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidParams {
                index,
                value,
                reason: "Parameter entries must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate that an objective value is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
