//! Encoded alignment container.
//!
//! Purpose
//! -------
//! Hold a multiple sequence alignment that has already been translated into
//! integer states, together with one precomputed weight per sequence.
//! Parsing FASTA files and computing weights from a sequence-identity
//! threshold happen upstream; this type only validates what it receives.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one sequence and one site.
//! - Every state is `< Q`, where `Q` is the biomolecule's alphabet size.
//! - Exactly one weight per sequence; weights are finite, non-negative,
//!   and not all zero.
//!
//! Conventions
//! -----------
//! - `sequences[[n, i]]` is the state of sequence `n` at site `i`.
//! - `effective_count()` is the sum of weights, the usual `M_eff`.
use ndarray::{Array1, Array2, ArrayView1};

use crate::{
    alignment::{
        core::biomolecule::Biomolecule,
        errors::{AlignmentError, AlignmentResult},
    },
    optimization::{errors::OptResult, plm_optimizer::layout::ProblemDims},
};

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAlignment {
    biomolecule: Biomolecule,
    sequences: Array2<u8>,
    weights: Array1<f64>,
}

impl EncodedAlignment {
    /// Construct a validated alignment.
    ///
    /// # Errors
    /// - [`AlignmentError::EmptyAlignment`] / [`AlignmentError::NoSites`].
    /// - [`AlignmentError::WeightCountMismatch`] if `weights.len()` differs
    ///   from the number of sequences.
    /// - [`AlignmentError::InvalidWeight`] for a negative or non-finite
    ///   weight, [`AlignmentError::ZeroTotalWeight`] if all are zero.
    /// - [`AlignmentError::StateOutOfRange`] for a state `≥ Q`.
    pub fn new(
        biomolecule: Biomolecule, sequences: Array2<u8>, weights: Array1<f64>,
    ) -> AlignmentResult<Self> {
        let (num_sequences, num_sites) = sequences.dim();
        if num_sequences == 0 {
            return Err(AlignmentError::EmptyAlignment);
        }
        if num_sites == 0 {
            return Err(AlignmentError::NoSites);
        }
        if weights.len() != num_sequences {
            return Err(AlignmentError::WeightCountMismatch {
                expected: num_sequences,
                found: weights.len(),
            });
        }
        for (index, &value) in weights.iter().enumerate() {
            if !value.is_finite() {
                return Err(AlignmentError::InvalidWeight {
                    index,
                    value,
                    reason: "Weights must be finite.",
                });
            }
            if value < 0.0 {
                return Err(AlignmentError::InvalidWeight {
                    index,
                    value,
                    reason: "Weights must be non-negative.",
                });
            }
        }
        if weights.sum() <= 0.0 {
            return Err(AlignmentError::ZeroTotalWeight);
        }

        let num_site_states = biomolecule.num_site_states();
        for ((sequence, site), &state) in sequences.indexed_iter() {
            if usize::from(state) >= num_site_states {
                return Err(AlignmentError::StateOutOfRange {
                    sequence,
                    site,
                    state,
                    num_site_states,
                });
            }
        }

        Ok(Self { biomolecule, sequences, weights })
    }

    /// Alignment with every sequence weighted `1 / M`.
    pub fn uniform(biomolecule: Biomolecule, sequences: Array2<u8>) -> AlignmentResult<Self> {
        let num_sequences = sequences.nrows();
        if num_sequences == 0 {
            return Err(AlignmentError::EmptyAlignment);
        }
        let weights = Array1::from_elem(num_sequences, 1.0 / num_sequences as f64);
        Self::new(biomolecule, sequences, weights)
    }

    pub fn biomolecule(&self) -> Biomolecule {
        self.biomolecule
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.nrows()
    }

    pub fn sequence_length(&self) -> usize {
        self.sequences.ncols()
    }

    pub fn num_site_states(&self) -> usize {
        self.biomolecule.num_site_states()
    }

    pub fn sequences(&self) -> &Array2<u8> {
        &self.sequences
    }

    pub fn sequence(&self, n: usize) -> ArrayView1<'_, u8> {
        self.sequences.row(n)
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Effective number of sequences, `Σ_n w_n`.
    pub fn effective_count(&self) -> f64 {
        self.weights.sum()
    }

    pub fn dims(&self) -> OptResult<ProblemDims> {
        ProblemDims::for_biomolecule(self.biomolecule, self.sequence_length())
    }
}
