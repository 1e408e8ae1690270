//! alignment — encoded multiple sequence alignments and the models fitted
//! to them.
//!
//! Purpose
//! -------
//! Provide the data side of a plmDCA fit: validated integer-encoded
//! alignments with sequence weights, regularization options, and the
//! pseudolikelihood model that the optimizer in
//! [`crate::optimization::plm_optimizer`] minimizes.
//!
//! Key behaviors
//! -------------
//! - [`core`]: [`Biomolecule`], [`EncodedAlignment`], [`Regularization`].
//! - [`models`]: [`PseudoLikelihood`], implementing
//!   [`AlignmentModel`](crate::optimization::plm_optimizer::AlignmentModel).
//! - [`errors`]: [`AlignmentError`], which converts into
//!   [`OptError`](crate::optimization::errors::OptError).
//!
//! Non-goals
//! ---------
//! - Reading FASTA files, computing sequence weights from an identity
//!   threshold, and scoring contacts from fitted couplings happen outside
//!   this crate.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{Biomolecule, EncodedAlignment, Regularization};
pub use self::errors::{AlignmentError, AlignmentResult};
pub use self::models::PseudoLikelihood;

pub mod prelude {
    pub use super::{
        AlignmentError, AlignmentResult, Biomolecule, EncodedAlignment, PseudoLikelihood,
        Regularization,
    };
}
