//! plm_optimizer::solver — L-BFGS with plmDCA's stopping rules.
//!
//! [`PlmSolver`] wraps an argmin solver (in practice L-BFGS with a bounded
//! More–Thuente search) and changes two things about how a run ends:
//!
//! - Convergence uses the relative gradient test
//!   `‖g‖ / max(1, ‖x‖) <= ε`. argmin's own absolute `tol_grad` test and
//!   its cost-stall `tol_cost` stop are never consulted.
//! - argmin's L-BFGS swallows line-search errors and ends the run with
//!   `TerminationReason::SolverExit`. The wrapper keeps that message, so
//!   the runner can report [`Termination::LineSearchFailed`] instead of a
//!   generic stop.
//!
//! The iteration ceiling and the target cost are still handled by argmin's
//! default `terminate_internal`.
//!
//! [`Termination::LineSearchFailed`]: crate::optimization::plm_optimizer::traits::Termination::LineSearchFailed
use argmin::core::{
    Error, KV, Problem, Solver, State, TerminationReason, TerminationStatus,
};
use argmin_math::ArgminL2Norm;

use crate::optimization::plm_optimizer::types::{Grad, PlmState, Theta};

/// `‖g‖ / max(1, ‖x‖)`.
pub fn relative_gradient_norm(x: &Theta, g: &Grad) -> f64 {
    g.l2_norm() / x.l2_norm().max(1.0)
}

#[derive(Debug, Clone)]
pub struct PlmSolver<S> {
    inner: S,
    epsilon: f64,
    line_search_failure: Option<String>,
}

impl<S> PlmSolver<S> {
    pub fn new(inner: S, epsilon: f64) -> Self {
        Self { inner, epsilon, line_search_failure: None }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Message of the line-search failure that ended the run, if any.
    pub fn line_search_failure(&self) -> Option<&str> {
        self.line_search_failure.as_deref()
    }
}

impl<O, S> Solver<O, PlmState> for PlmSolver<S>
where
    S: Solver<O, PlmState>,
{
    const NAME: &'static str = "plmDCA L-BFGS";

    fn init(
        &mut self, problem: &mut Problem<O>, state: PlmState,
    ) -> Result<(PlmState, Option<KV>), Error> {
        self.line_search_failure = None;
        self.inner.init(problem, state)
    }

    /// One inner iteration. L-BFGS only ends a run from inside an
    /// iteration when its line search failed, so any `SolverExit` seen here
    /// is recorded as such.
    fn next_iter(
        &mut self, problem: &mut Problem<O>, state: PlmState,
    ) -> Result<(PlmState, Option<KV>), Error> {
        let (state, kv) = self.inner.next_iter(problem, state)?;
        if let TerminationStatus::Terminated(TerminationReason::SolverExit(reason)) =
            state.get_termination_status()
        {
            self.line_search_failure = Some(reason.clone());
        }
        Ok((state, kv))
    }

    fn terminate(&mut self, state: &PlmState) -> TerminationStatus {
        match (state.get_param(), state.get_gradient()) {
            (Some(x), Some(g)) if relative_gradient_norm(x, g) <= self.epsilon => {
                TerminationStatus::Terminated(TerminationReason::SolverConverged)
            }
            _ => TerminationStatus::NotTerminated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::{CostFunction, Executor, Gradient};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The relative gradient test, including the max(1, ‖x‖) floor.
    // - Recording of a `SolverExit` raised inside an iteration.
    //
    // A stub inner solver shrinks the gradient by a fixed factor each
    // iteration and leaves ‖x‖ at a chosen value, so stop points are exact.
    // -------------------------------------------------------------------------

    struct Unused;

    impl CostFunction for Unused {
        type Param = Theta;
        type Output = f64;
        fn cost(&self, _p: &Theta) -> Result<f64, Error> {
            Ok(0.0)
        }
    }

    impl Gradient for Unused {
        type Param = Theta;
        type Gradient = Grad;
        fn gradient(&self, _p: &Theta) -> Result<Grad, Error> {
            Ok(array![0.0])
        }
    }

    /// Halves the gradient every iteration; exits after `exit_after`
    /// iterations when set.
    #[derive(Clone)]
    struct Halving {
        exit_after: Option<u64>,
        calls: u64,
    }

    impl Solver<Unused, PlmState> for Halving {
        const NAME: &'static str = "halving";

        fn next_iter(
            &mut self, _problem: &mut Problem<Unused>, mut state: PlmState,
        ) -> Result<(PlmState, Option<KV>), Error> {
            self.calls += 1;
            if self.exit_after == Some(self.calls) {
                let reason = "Line search terminated with: 'exhausted'".to_string();
                return Ok((state.terminate_with(TerminationReason::SolverExit(reason)), None));
            }
            let g = state.take_gradient().unwrap_or_else(|| array![0.0]);
            Ok((state.gradient(g * 0.5).cost(1.0), None))
        }

        // Stands in for argmin's own stopping rules (absolute `tol_grad`,
        // cost stall); the wrapper must not consult it.
        fn terminate(&mut self, _state: &PlmState) -> TerminationStatus {
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        }
    }

    fn run(
        x0: Theta, g0: Grad, exit_after: Option<u64>,
    ) -> (PlmSolver<Halving>, PlmState) {
        let solver = PlmSolver::new(Halving { exit_after, calls: 0 }, 1e-3);
        let result = Executor::new(Unused, solver)
            .configure(|state| state.param(x0).gradient(g0).cost(2.0).max_iters(100))
            .run()
            .unwrap();
        (result.solver, result.state)
    }

    #[test]
    // Purpose
    // -------
    // The gradient threshold scales with ‖x‖ once ‖x‖ > 1.
    //
    // Given
    // -----
    // - ‖x‖ = 100, ‖g_0‖ = 1, gradient halved per iteration, ε = 1e-3.
    //
    // Expect
    // ------
    // - Stops as soon as ‖g‖ <= 0.1: 0.5^4 = 0.0625 after 4 iterations,
    //   long before an absolute 1e-3 test (10 iterations) would.
    // - The inner solver's own stop, which fires unconditionally, is
    //   ignored.
    fn relative_test_stops_before_absolute_one() {
        // Act
        let (solver, state) = run(array![60.0, 80.0], array![1.0], None);

        // Assert
        assert_eq!(state.get_iter(), 4);
        assert_eq!(
            state.get_termination_status(),
            &TerminationStatus::Terminated(TerminationReason::SolverConverged)
        );
        assert!(solver.line_search_failure().is_none());
    }

    #[test]
    // Purpose
    // -------
    // Small parameter vectors fall back to the absolute threshold.
    //
    // Given
    // -----
    // - ‖x‖ = 0.5, ‖g_0‖ = 1, ε = 1e-3.
    //
    // Expect
    // ------
    // - Stops after 10 iterations (0.5^10 < 1e-3 <= 0.5^9), with the
    //   final gradient norm just below ε.
    fn small_vectors_use_unit_floor() {
        // Act
        let (_, state) = run(array![0.3, 0.4], array![1.0], None);

        // Assert
        assert_eq!(state.get_iter(), 10);
        let g = state.get_gradient().map(|g| g.l2_norm()).unwrap_or(f64::NAN);
        assert!(g <= 1e-3 && g > 5e-4);
    }

    #[test]
    // Purpose
    // -------
    // A line-search exit inside an iteration is kept for the runner.
    //
    // Given
    // -----
    // - The stub exits with a `SolverExit` on its second iteration.
    //
    // Expect
    // ------
    // - `line_search_failure()` carries the message; the run ends there.
    fn solver_exit_is_recorded() {
        // Act
        let (solver, state) = run(array![1.0, 1.0], array![1.0], Some(2));

        // Assert
        assert_eq!(state.get_iter(), 2);
        assert!(solver.line_search_failure().is_some_and(|m| m.contains("exhausted")));
    }

    #[test]
    // Purpose
    // -------
    // The relative norm uses max(1, ‖x‖) as denominator.
    fn relative_norm_floor() {
        assert_eq!(relative_gradient_norm(&array![0.0, 0.0], &array![3.0, 4.0]), 5.0);
        assert_eq!(relative_gradient_norm(&array![6.0, 8.0], &array![3.0, 4.0]), 0.5);
    }
}
