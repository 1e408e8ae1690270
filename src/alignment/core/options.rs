//! Regularization strengths of the pseudolikelihood objective.
use crate::alignment::errors::{AlignmentError, AlignmentResult};

/// L2 penalty weights: `λ_h Σ h² + λ_J Σ J²`.
///
/// Both strengths are finite and non-negative. Zero disables the
/// corresponding penalty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regularization {
    pub lambda_h: f64,
    pub lambda_j: f64,
}

impl Regularization {
    /// # Errors
    /// [`AlignmentError::InvalidRegularization`] for a negative or
    /// non-finite strength.
    pub fn new(lambda_h: f64, lambda_j: f64) -> AlignmentResult<Self> {
        verify_strength("lambda_h", lambda_h)?;
        verify_strength("lambda_j", lambda_j)?;
        Ok(Self { lambda_h, lambda_j })
    }

    /// Customary defaults for an alignment of width `L`:
    /// `λ_h = 1`, `λ_J = 0.2 (L − 1)`.
    pub fn scaled_for(sequence_length: usize) -> Self {
        Self { lambda_h: 1.0, lambda_j: 0.2 * sequence_length.saturating_sub(1) as f64 }
    }

    pub fn none() -> Self {
        Self { lambda_h: 0.0, lambda_j: 0.0 }
    }
}

fn verify_strength(name: &'static str, value: f64) -> AlignmentResult<()> {
    if !value.is_finite() {
        return Err(AlignmentError::InvalidRegularization {
            name,
            value,
            reason: "Strength must be finite.",
        });
    }
    if value < 0.0 {
        return Err(AlignmentError::InvalidRegularization {
            name,
            value,
            reason: "Strength must be non-negative.",
        });
    }
    Ok(())
}
