//! numerical_stability — overflow-safe normalizations for Potts energies.
//!
//! Purpose
//! -------
//! Conditional site distributions of the pseudolikelihood are softmaxes of
//! local energies. Fitted couplings can drive those energies far outside
//! the range where `exp` is well-conditioned in `f64`, so every
//! normalization goes through the max-shifted helpers in
//! [`transformations`].
//!
//! Conventions
//! -----------
//! - Helpers work on plain slices and never allocate.
//! - Inputs are assumed finite; a slice whose maximum is not finite is
//!   returned unchanged with that maximum as its log-partition value.

pub mod transformations;

pub use self::transformations::{log_sum_exp, softmax_in_place};
