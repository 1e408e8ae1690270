//! optimization — plmDCA optimizer stack, numerical helpers, and unified
//! error surface.
//!
//! Purpose
//! -------
//! Provide the parameter-optimization engine of the crate: the flat
//! fields-and-couplings layout, an argmin-backed L-BFGS driver for
//! pseudolikelihood maximization, stable softmax helpers, and a single
//! error/result surface.
//!
//! Key behaviors
//! -------------
//! - [`plm_optimizer`]: configuration, run driver, adapter, monitor and
//!   result handle.
//! - [`numerical_stability`]: max-shifted log-sum-exp and softmax used by
//!   alignment models.
//! - [`errors`]: configuration issues, allocation failures, model failures
//!   and backend solver errors normalized into [`errors::OptError`] with
//!   the alias [`errors::OptResult`].
//!
//! Conventions
//! -----------
//! - The optimizer minimizes a regularized negative log-pseudolikelihood
//!   directly; there are no sign flips between model and solver.
//! - Public entry points that can fail return `OptResult<T>`; callers never
//!   see raw argmin errors.
//! - Progress reporting goes through `tracing` events only; installing a
//!   subscriber is left to the front-end (see [`crate::logging`]).

pub mod errors;
pub mod numerical_stability;
pub mod plm_optimizer;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_plmdca::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::plm_optimizer::prelude::*;
}
