//! Errors for encoded alignments and the pseudolikelihood model (input
//! validation, biomolecule parsing, regularization checks, and dimension
//! agreement with the optimizer).
//!
//! ## Conventions
//! - **Indices are 0-based**: `sequence` counts rows of the alignment and
//!   `site` counts columns.
//! - Errors raised while the optimizer is running reach callers as
//!   [`OptError::Alignment`](crate::optimization::errors::OptError::Alignment).
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for alignment construction and model checks.
pub type AlignmentResult<T> = Result<T, AlignmentError>;

#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentError {
    // ---- Input/data validation ----
    /// The alignment has no sequences.
    EmptyAlignment,

    /// The alignment has no columns.
    NoSites,

    /// One weight per sequence is required.
    WeightCountMismatch { expected: usize, found: usize },

    /// Sequence weights must be finite and non-negative.
    InvalidWeight { index: usize, value: f64, reason: &'static str },

    /// At least one sequence must carry weight.
    ZeroTotalWeight,

    /// An encoded state is not below the alphabet size.
    StateOutOfRange { sequence: usize, site: usize, state: u8, num_site_states: usize },

    // ---- Options ----
    /// Regularization strengths must be finite and non-negative.
    InvalidRegularization { name: &'static str, value: f64, reason: &'static str },

    /// Unknown biomolecule name or code.
    UnknownBiomolecule { name: String },

    // ---- Optimizer agreement ----
    /// Problem dimensions requested by the optimizer differ from the
    /// alignment's.
    DimensionMismatch {
        expected_length: usize,
        expected_states: usize,
        found_length: usize,
        found_states: usize,
    },
}

impl std::error::Error for AlignmentError {}

impl std::fmt::Display for AlignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentError::EmptyAlignment => write!(f, "Alignment contains no sequences."),
            AlignmentError::NoSites => write!(f, "Alignment contains no sites."),
            AlignmentError::WeightCountMismatch { expected, found } => {
                write!(f, "Expected {expected} sequence weights, found {found}.")
            }
            AlignmentError::InvalidWeight { index, value, reason } => {
                write!(f, "Invalid weight at sequence {index}: {value}. {reason}")
            }
            AlignmentError::ZeroTotalWeight => write!(f, "Sequence weights sum to zero."),
            AlignmentError::StateOutOfRange { sequence, site, state, num_site_states } => {
                write!(
                    f,
                    "State {state} at sequence {sequence}, site {site} is out of range for \
                     {num_site_states} site states."
                )
            }
            AlignmentError::InvalidRegularization { name, value, reason } => {
                write!(f, "Invalid regularization {name} = {value}: {reason}")
            }
            AlignmentError::UnknownBiomolecule { name } => {
                write!(
                    f,
                    "Unknown biomolecule '{name}'. Valid options are case insensitive 'protein' \
                     or 'rna', or the codes 1 and 2."
                )
            }
            AlignmentError::DimensionMismatch {
                expected_length,
                expected_states,
                found_length,
                found_states,
            } => write!(
                f,
                "Dimension mismatch: optimizer expects L = {expected_length}, \
                 Q = {expected_states}; alignment has L = {found_length}, Q = {found_states}."
            ),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<AlignmentError> for PyErr {
    fn from(err: AlignmentError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
