//! plm_optimizer::builders — L-BFGS solver construction.
//!
//! Purpose
//! -------
//! Turn an [`LbfgsSettings`] into a configured [`PlmLbfgs`] solver: a
//! More–Thuente line search with the requested sufficient-decrease and
//! curvature coefficients, capped at `max_linesearch` trials, inside an
//! L-BFGS solver with `memory` correction pairs, wrapped in [`PlmSolver`]
//! with the relative gradient threshold `epsilon`.
//!
//! Conventions
//! -----------
//! - The builder does not set the initial parameter vector or the
//!   iteration ceiling; those are runtime concerns applied by
//!   [`run_lbfgs`](crate::optimization::plm_optimizer::run::run_lbfgs).
//! - argmin rejects invalid coefficients with its own errors; they are
//!   surfaced as [`OptError`](crate::optimization::errors::OptError)
//!   through the crate's `From<argmin::core::Error>` conversion.
use crate::optimization::{
    errors::OptResult,
    plm_optimizer::{
        linesearch::BoundedLineSearch,
        solver::PlmSolver,
        traits::LbfgsSettings,
        types::{InnerLbfgs, MoreThuenteLS, PlmLbfgs},
    },
};

/// Build the L-BFGS solver used by every plmDCA run.
///
/// # Errors
/// - Validation errors from [`LbfgsSettings::validate`].
/// - argmin configuration errors, converted into `OptError`.
pub fn build_optimizer(settings: &LbfgsSettings) -> OptResult<PlmLbfgs> {
    settings.validate()?;
    let more_thuente = MoreThuenteLS::new().with_c(settings.ftol, settings.wolfe)?;
    let linesearch = BoundedLineSearch::new(more_thuente, settings.max_linesearch);
    let lbfgs = InnerLbfgs::new(linesearch, settings.memory);
    Ok(PlmSolver::new(lbfgs, settings.epsilon))
}
