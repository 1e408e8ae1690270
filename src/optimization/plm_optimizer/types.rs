//! plm_optimizer::types — shared numeric aliases, solver wiring and the
//! fixed L-BFGS constants.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and solver aliases used by the
//! pseudolikelihood optimizer so the rest of the code stays agnostic to
//! `ndarray` and argmin generics.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameter vectors and gradients are `ndarray::Array1<f64>` with length
//!   `total_num_params(L, Q)`.
//! - `Cost` is the regularized *negative* log-pseudolikelihood; the
//!   optimizer minimizes it directly, no sign flips are involved.
//! - The `DEFAULT_*` constants are the fixed configuration of a plmDCA run.
//!   They are tuned for this objective class and are not per-call knobs.
use argmin::{
    core::IterState,
    solver::{linesearch::MoreThuenteLineSearch, quasinewton::LBFGS},
};
use ndarray::Array1;
use std::collections::HashMap;

use crate::optimization::plm_optimizer::{linesearch::BoundedLineSearch, solver::PlmSolver};

/// Flat fields-and-couplings vector.
pub type Theta = Array1<f64>;

/// Gradient of the objective, same shape as [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar objective value: regularized negative log-pseudolikelihood.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Relative gradient-norm threshold, `‖g‖ / max(1, ‖x‖) <= ε`.
pub const DEFAULT_EPSILON: f64 = 1e-3;

/// Sufficient-decrease (Armijo) coefficient of the line search.
pub const DEFAULT_FTOL: f64 = 1e-4;

/// Curvature (Wolfe) coefficient of the line search.
pub const DEFAULT_WOLFE: f64 = 0.9;

/// Line-search trials allowed per outer iteration.
pub const DEFAULT_MAX_LINESEARCH: usize = 5;

/// History size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 5;

/// More–Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// More–Thuente search capped at a fixed number of trials.
pub type BoundedMoreThuente = BoundedLineSearch<MoreThuenteLS>;

/// argmin's L-BFGS over the bounded More–Thuente search.
pub type InnerLbfgs = LBFGS<BoundedMoreThuente, Theta, Grad, Cost>;

/// The solver used by every plmDCA run: L-BFGS under plmDCA's stopping rules.
pub type PlmLbfgs = PlmSolver<InnerLbfgs>;

/// Optimizer state seen by observers and returned by the executor.
pub type PlmState = IterState<Theta, Grad, (), (), (), Cost>;
