//! plm_optimizer — argmin-powered pseudolikelihood maximization.
//!
//! Purpose
//! -------
//! Estimate the fields and couplings of a Potts model from an alignment by
//! minimizing a regularized negative log-pseudolikelihood with L-BFGS.
//! Callers implement a single trait, [`AlignmentModel`], and invoke
//! [`plmdca`] (or build a [`PlmRun`]) with a [`PlmConfig`].
//!
//! Key behaviors
//! -------------
//! - Pack fields and couplings into one flat vector ([`layout`]).
//! - Bridge the model into argmin through [`adapter::PlmAdapter`], which
//!   evaluates inside a run-scoped [`workers::WorkerPool`] and evaluates the
//!   model once per distinct point.
//! - Record per-iteration diagnostics with [`monitor::IterationMonitor`].
//! - Run L-BFGS with a trial-bounded More–Thuente line search
//!   ([`builders`], [`linesearch`], [`run`]), stopping on the relative
//!   gradient test `‖g‖ / max(1, ‖x‖) <= ε` ([`solver`]).
//! - Hand the result back in an owned [`FieldsAndCouplings`] handle.
//!
//! Invariants & assumptions
//! ------------------------
//! - The parameter vector has exactly `total_num_params(L, Q)` entries for
//!   the whole run.
//! - Optimizer non-convergence is not an error; it is reported through
//!   [`Termination`]. Only aborted runs return `Err(OptError)`.
//! - Identical inputs produce bit-identical results for any worker count.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover layout arithmetic, validation, the
//!   bounded line search, the adapter cache and the driver on toy
//!   objectives.
//! - Integration tests fit [`PseudoLikelihood`] models end to end.
//!
//! [`PseudoLikelihood`]: crate::alignment::models::PseudoLikelihood

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod handle;
pub mod layout;
pub mod linesearch;
pub mod monitor;
pub mod run;
pub mod solver;
pub mod traits;
pub mod types;
pub mod validation;
pub mod workers;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{PlmRun, plmdca};
pub use self::handle::FieldsAndCouplings;
pub use self::layout::{ParamLayout, ProblemDims, checked_total_num_params, total_num_params};
pub use self::monitor::IterationReport;
pub use self::solver::PlmSolver;
pub use self::traits::{AlignmentModel, LbfgsSettings, PlmConfig, PlmOutcome, Termination};
pub use self::types::{Cost, FnEvalMap, Grad, Theta};

pub mod prelude {
    pub use super::api::plmdca;
    pub use super::handle::FieldsAndCouplings;
    pub use super::layout::ProblemDims;
    pub use super::traits::{AlignmentModel, PlmConfig, PlmOutcome, Termination};
    pub use super::types::{Cost, Grad, Theta};
}
