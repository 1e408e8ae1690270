//! models — alignment models plugged into the plmDCA optimizer.
//!
//! [`PseudoLikelihood`] is the reference [`AlignmentModel`]: a Potts model
//! scored by its regularized negative log-pseudolikelihood over an
//! [`EncodedAlignment`].
//!
//! [`AlignmentModel`]: crate::optimization::plm_optimizer::AlignmentModel
//! [`EncodedAlignment`]: crate::alignment::core::EncodedAlignment

pub mod pseudolikelihood;

pub use self::pseudolikelihood::PseudoLikelihood;
