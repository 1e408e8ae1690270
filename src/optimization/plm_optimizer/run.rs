//! Execution helper that runs the L-BFGS solver on a pseudolikelihood
//! problem and returns a crate-friendly [`PlmOutcome`].
use std::sync::{Arc, Mutex};

use argmin::core::{Executor, OptimizationResult, State, observers::ObserverMode};
use argmin_math::ArgminL2Norm;
use tracing::{debug, info, warn};

use crate::optimization::{
    errors::OptResult,
    plm_optimizer::{
        adapter::PlmAdapter,
        layout::ProblemDims,
        monitor::{IterationMonitor, RunRecord, SharedRecord, lock_record},
        traits::{AlignmentModel, PlmOutcome, Termination},
        types::{PlmLbfgs, Theta},
    },
};

/// Run L-BFGS from `theta0` until convergence, the iteration ceiling, or a
/// failed line search.
///
/// This wires up:
/// - the model via [`PlmAdapter`],
/// - the configured solver from
///   [`build_optimizer`](crate::optimization::plm_optimizer::builders::build_optimizer),
/// - an [`IterationMonitor`] observing every iteration,
/// - the iteration ceiling `max_iterations`,
///
/// then executes the solver and converts the result into [`PlmOutcome`].
///
/// The objective is evaluated once at `theta0` before the first iteration
/// for the starting diagnostics. The adapter's cache makes it free for the
/// solver's own first evaluation.
///
/// # Returns
/// - `Termination::Converged` / `IterationLimitReached` /
///   `Stopped { .. }` as reported by argmin, with the best parameter found.
/// - `Termination::LineSearchFailed` when an iteration's line search gave
///   up. argmin keeps the best point seen before that iteration, which is
///   the vector returned.
///
/// # Errors
/// Model and backend errors abort the run and are returned as
/// [`OptError`](crate::optimization::errors::OptError); no partial result
/// is produced.
pub fn run_lbfgs<M: AlignmentModel>(
    theta0: Theta, dims: ProblemDims, max_iterations: usize, verbose: bool,
    problem: PlmAdapter<'_, M>, solver: PlmLbfgs,
) -> OptResult<PlmOutcome> {
    let (value0, grad0) = problem.evaluate(&theta0)?;
    let grad_norm0 = grad0.l2_norm();
    if verbose {
        info!(fx = value0, gnorm = grad_norm0, "initial objective");
    }
    let record: SharedRecord = Arc::new(Mutex::new(RunRecord::default()));
    let monitor = IterationMonitor::new(record.clone(), verbose);

    let optimizer = Executor::new(problem, solver)
        .configure(|state| state.param(theta0).max_iters(max_iterations as u64))
        .add_observer(monitor, ObserverMode::Always);

    let OptimizationResult { solver, mut state, .. } = optimizer.run()?;
    let history = lock_record(&record)?.history.clone();

    let termination = match solver.line_search_failure() {
        Some(_) => Termination::LineSearchFailed,
        None => Termination::from(state.get_termination_status()),
    };
    let value = state.get_best_cost();
    match termination {
        Termination::LineSearchFailed => warn!(
            reason = solver.line_search_failure().unwrap_or_default(),
            iterations = history.len(),
            fx = value,
            "line search failed; returning best iterate"
        ),
        Termination::IterationLimitReached => {
            info!(max_iterations, "iteration limit reached before convergence")
        }
        Termination::Stopped { ref reason } => warn!(%reason, "solver stopped"),
        Termination::Converged => debug!(iterations = history.len(), "L-BFGS converged"),
    }
    if verbose {
        info!(
            code = termination.code(),
            status = %termination,
            fx = value,
            "L-BFGS optimization terminated"
        );
    }

    let grad_norm = state
        .take_gradient()
        .map(|g| g.l2_norm())
        .or_else(|| history.last().map(|report| report.grad_norm))
        .or(Some(grad_norm0));
    PlmOutcome::new(
        dims,
        state.take_best_param(),
        value,
        termination,
        history.len() as u64,
        state.get_func_counts().clone(),
        grad_norm,
        history,
    )
}
