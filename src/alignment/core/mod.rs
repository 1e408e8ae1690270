//! core — encoded alignments and model options.
//!
//! Purpose
//! -------
//! Collect the validated inputs of a pseudolikelihood fit: the biomolecule
//! kind ([`Biomolecule`]), the integer-encoded alignment with its sequence
//! weights ([`EncodedAlignment`]), and the L2 regularization strengths
//! ([`Regularization`]).
//!
//! Conventions
//! -----------
//! - States are `u8` values in `0..Q`, gap included.
//! - Construction validates; downstream models rely on these invariants
//!   without re-checking.

pub mod biomolecule;
pub mod data;
pub mod options;

pub use self::biomolecule::Biomolecule;
pub use self::data::EncodedAlignment;
pub use self::options::Regularization;
