//! Adapter that exposes an [`AlignmentModel`] as an `argmin` problem.
//!
//! The model computes the objective and its gradient in one pass, while
//! argmin asks for them separately (`cost`, then `gradient`, usually at the
//! same point). [`PlmAdapter`] evaluates the model once per distinct point,
//! inside the run's worker pool, and serves both requests from a one-entry
//! cache.
//!
//! The adapter performs no mathematics of its own. It only validates what
//! the model returns: a finite value and a finite gradient of the right
//! length.
use std::cell::RefCell;

use argmin::core::{CostFunction, Error, Gradient};

use crate::optimization::{
    errors::OptResult,
    plm_optimizer::{
        traits::AlignmentModel,
        types::{Cost, Grad, Theta},
        validation::{validate_grad, validate_value},
        workers::WorkerPool,
    },
};

#[derive(Debug, Clone)]
struct Evaluation {
    x: Theta,
    value: Cost,
    grad: Grad,
}

pub struct PlmAdapter<'a, M: AlignmentModel> {
    model: &'a M,
    workers: &'a WorkerPool,
    last: RefCell<Option<Evaluation>>,
    model_calls: RefCell<u64>,
}

impl<'a, M: AlignmentModel> PlmAdapter<'a, M> {
    pub fn new(model: &'a M, workers: &'a WorkerPool) -> Self {
        Self { model, workers, last: RefCell::new(None), model_calls: RefCell::new(0) }
    }

    /// Objective value and gradient at `x`.
    ///
    /// # Errors
    /// - Any error returned by the model.
    /// - [`OptError::NonFiniteCost`] for a non-finite value.
    /// - [`OptError::GradientDimMismatch`] / [`OptError::InvalidGradient`]
    ///   for a malformed gradient.
    ///
    /// [`OptError::NonFiniteCost`]: crate::optimization::errors::OptError::NonFiniteCost
    /// [`OptError::GradientDimMismatch`]: crate::optimization::errors::OptError::GradientDimMismatch
    /// [`OptError::InvalidGradient`]: crate::optimization::errors::OptError::InvalidGradient
    pub fn evaluate(&self, x: &Theta) -> OptResult<(Cost, Grad)> {
        if let Some(hit) = self.last.borrow().as_ref().filter(|e| e.x == *x) {
            return Ok((hit.value, hit.grad.clone()));
        }

        let mut grad = Grad::zeros(x.len());
        let model = self.model;
        let value = self.workers.install(|| model.gradient(x, &mut grad))?;
        *self.model_calls.borrow_mut() += 1;
        validate_value(value)?;
        validate_grad(&grad, x.len())?;

        self.last.replace(Some(Evaluation { x: x.clone(), value, grad: grad.clone() }));
        Ok((value, grad))
    }

    /// Number of times the model's gradient routine has been invoked.
    pub fn model_calls(&self) -> u64 {
        *self.model_calls.borrow()
    }
}

impl<M: AlignmentModel> CostFunction for PlmAdapter<'_, M> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        let (value, _) = self.evaluate(x)?;
        Ok(value)
    }
}

impl<M: AlignmentModel> Gradient for PlmAdapter<'_, M> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, Error> {
        let (_, grad) = self.evaluate(x)?;
        Ok(grad)
    }
}
