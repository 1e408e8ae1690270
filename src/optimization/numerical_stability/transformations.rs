//! Numerically stable log-sum-exp and softmax.
//!
//! The naïve `ln Σ exp(e_a)` overflows once any energy exceeds ~709 and
//! loses all precision when every energy is very negative. Both helpers here
//! shift by the maximum energy first, so every exponent is `≤ 0` and at
//! least one term equals `1`.
//!
//! # Provided items
//! - [`log_sum_exp`]: `ln Σ_a exp(e_a)` of a slice.
//! - [`softmax_in_place`]: overwrite energies with their probabilities and
//!   return the log-partition function from the same pass.

/// Stable `ln Σ_a exp(e_a)`.
///
/// Returns `-∞` for an empty slice (an empty sum is zero).
pub fn log_sum_exp(energies: &[f64]) -> f64 {
    let max = energies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = energies.iter().map(|&e| (e - max).exp()).sum();
    max + sum.ln()
}

/// Replace `energies` by `softmax(energies)` and return `ln Z`.
///
/// # Parameters
/// - `energies`: finite values; overwritten with probabilities summing to 1.
///
/// # Returns
/// - `ln Σ_a exp(e_a)` of the original energies.
pub fn softmax_in_place(energies: &mut [f64]) -> f64 {
    let max = energies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let mut sum = 0.0;
    for e in energies.iter_mut() {
        *e = (*e - max).exp();
        sum += *e;
    }
    for p in energies.iter_mut() {
        *p /= sum;
    }
    max + sum.ln()
}
