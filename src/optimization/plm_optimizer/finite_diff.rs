//! plm_optimizer::finite_diff — finite-difference checks of model gradients.
//!
//! Purpose
//! -------
//! Validate an [`AlignmentModel`]'s analytic gradient against a
//! central-difference approximation of its objective, without callers
//! depending directly on the `finitediff` API.
//!
//! Key behaviors
//! -------------
//! - [`numerical_gradient`] approximates `∇f(x)` with central differences,
//!   capturing the first model error raised inside the difference closure
//!   and returning it as a hard failure.
//! - [`max_gradient_error`] compares analytic and numerical gradients and
//!   reports the largest absolute deviation with its index.
//!
//! Conventions
//! -----------
//! - Each numerical gradient costs `2n` full objective evaluations; the
//!   helpers are meant for tests and diagnostics on small problems.
use std::cell::RefCell;

use finitediff::FiniteDiff;

use crate::optimization::{
    errors::{OptError, OptResult},
    plm_optimizer::{
        traits::AlignmentModel,
        types::{Grad, Theta},
        validation::{validate_grad, validate_value},
    },
};

/// Largest deviation between an analytic and a numerical gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientCheck {
    pub index: usize,
    pub analytic: f64,
    pub numerical: f64,
    pub abs_error: f64,
}

/// Central-difference gradient of the model's objective at `x`.
///
/// # Errors
/// - The first error the model raised while differencing.
/// - [`OptError::InvalidGradient`] if the approximation is not finite.
pub fn numerical_gradient<M: AlignmentModel>(model: &M, x: &Theta) -> OptResult<Grad> {
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let scratch = RefCell::new(Grad::zeros(x.len()));
    let cost = |theta: &Theta| -> f64 {
        let result = model
            .gradient(theta, &mut scratch.borrow_mut())
            .and_then(|value| validate_value(value).map(|_| value));
        match result {
            Ok(value) => value,
            Err(err) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(err);
                }
                f64::NAN
            }
        }
    };
    let fd_grad = x.central_diff(&cost);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, x.len())?;
    Ok(fd_grad)
}

/// Compare the model's analytic gradient at `x` with central differences.
///
/// # Errors
/// Propagates model errors and validation failures of either gradient.
pub fn max_gradient_error<M: AlignmentModel>(model: &M, x: &Theta) -> OptResult<GradientCheck> {
    let mut analytic = Grad::zeros(x.len());
    model.gradient(x, &mut analytic)?;
    validate_grad(&analytic, x.len())?;
    let numerical = numerical_gradient(model, x)?;

    let mut worst = GradientCheck { index: 0, analytic: 0.0, numerical: 0.0, abs_error: 0.0 };
    for (index, (&a, &n)) in analytic.iter().zip(numerical.iter()).enumerate() {
        let abs_error = (a - n).abs();
        if abs_error > worst.abs_error {
            worst = GradientCheck { index, analytic: a, numerical: n, abs_error };
        }
    }
    Ok(worst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::plm_optimizer::{layout::ProblemDims, types::Cost};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of the central difference with a known gradient.
    // - Detection of a wrong analytic gradient.
    // - Propagation of model errors raised inside the difference closure.
    // -------------------------------------------------------------------------

    /// `f(x) = Σ k·x_k³`; `wrong` halves the reported gradient.
    struct Cubic {
        wrong: bool,
        fail: bool,
    }

    impl AlignmentModel for Cubic {
        fn check(&self, _dims: &ProblemDims) -> OptResult<()> {
            Ok(())
        }

        fn initialize(&self, buffer: &mut Theta) -> OptResult<()> {
            buffer.fill(0.0);
            Ok(())
        }

        fn gradient(&self, x: &Theta, grad: &mut Grad) -> OptResult<Cost> {
            if self.fail {
                return Err(OptError::NonFiniteCost { value: f64::NAN });
            }
            let scale = if self.wrong { 0.5 } else { 1.0 };
            let mut value = 0.0;
            for (k, (&xk, g)) in x.iter().zip(grad.iter_mut()).enumerate() {
                value += k as f64 * xk.powi(3);
                *g = scale * 3.0 * k as f64 * xk * xk;
            }
            Ok(value)
        }
    }

    #[test]
    // Purpose
    // -------
    // A correct gradient agrees with central differences.
    //
    // Given
    // -----
    // - `f(x) = Σ k·x_k³` at x = [0.5, -1.0, 2.0].
    //
    // Expect
    // ------
    // - Maximum absolute error below 1e-5.
    fn correct_gradient_passes() {
        // Arrange
        let model = Cubic { wrong: false, fail: false };

        // Act
        let check = max_gradient_error(&model, &array![0.5, -1.0, 2.0]).unwrap();

        // Assert
        assert!(check.abs_error < 1e-5, "unexpected deviation: {check:?}");
    }

    #[test]
    // Purpose
    // -------
    // A scaled gradient is caught at the entry with the largest slope.
    //
    // Given
    // -----
    // - The same cubic with the gradient halved.
    //
    // Expect
    // ------
    // - Worst index 2 (gradient 24 vs. 12), error ≈ 12.
    fn wrong_gradient_is_located() {
        // Arrange
        let model = Cubic { wrong: true, fail: false };

        // Act
        let check = max_gradient_error(&model, &array![0.5, -1.0, 2.0]).unwrap();

        // Assert
        assert_eq!(check.index, 2);
        assert!((check.abs_error - 12.0).abs() < 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // Errors raised inside the difference closure surface unchanged.
    //
    // Expect
    // ------
    // - `numerical_gradient` returns the model's `NonFiniteCost`.
    fn model_errors_propagate() {
        // Arrange
        let model = Cubic { wrong: false, fail: true };

        // Act
        let err = numerical_gradient(&model, &array![1.0, 2.0]).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::NonFiniteCost { .. }));
    }
}
