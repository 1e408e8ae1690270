//! plm_optimizer::handle — owned result of a plmDCA run.
//!
//! [`FieldsAndCouplings`] owns the optimized parameter vector and exposes it
//! through the packing described in
//! [`layout`](crate::optimization::plm_optimizer::layout). The vector is
//! released exactly once, either explicitly through
//! [`FieldsAndCouplings::release`] or when the handle is dropped. After a
//! release every accessor returns `None`.
use ndarray::{ArrayView1, ArrayView2};

use crate::optimization::{
    errors::OptResult,
    plm_optimizer::{
        layout::{ParamLayout, ProblemDims},
        types::Theta,
        validation::validate_params,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldsAndCouplings {
    dims: ProblemDims,
    params: Option<Theta>,
}

impl FieldsAndCouplings {
    /// Wrap a finished parameter vector.
    ///
    /// # Errors
    /// - [`OptError::ParamLengthMismatch`] if the length is not
    ///   `total_num_params(L, Q)`.
    /// - [`OptError::InvalidParams`] for a non-finite entry.
    ///
    /// [`OptError::ParamLengthMismatch`]: crate::optimization::errors::OptError::ParamLengthMismatch
    /// [`OptError::InvalidParams`]: crate::optimization::errors::OptError::InvalidParams
    pub fn new(dims: ProblemDims, params: Theta) -> OptResult<Self> {
        validate_params(&params, dims.total_num_params())?;
        Ok(Self { dims, params: Some(params) })
    }

    pub fn dims(&self) -> ProblemDims {
        self.dims
    }

    pub fn layout(&self) -> ParamLayout {
        self.dims.layout()
    }

    pub fn params(&self) -> Option<&Theta> {
        self.params.as_ref()
    }

    pub fn as_slice(&self) -> Option<&[f64]> {
        self.params.as_ref().and_then(|p| p.as_slice())
    }

    /// Number of stored entries; zero once released.
    pub fn len(&self) -> usize {
        self.params.as_ref().map_or(0, |p| p.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fields `h_i(·)` of site `i`.
    pub fn fields(&self, site: usize) -> Option<ArrayView1<'_, f64>> {
        let params = self.params.as_ref()?;
        self.layout().fields(params, site)
    }

    /// Coupling block `J_ij(a, b)` indexed `[a, b]`, for either site order.
    pub fn coupling(&self, site_i: usize, site_j: usize) -> Option<ArrayView2<'_, f64>> {
        let params = self.params.as_ref()?;
        self.layout().coupling_block(params, site_i, site_j)
    }

    /// Take the raw vector out of the handle.
    pub fn into_inner(mut self) -> Option<Theta> {
        self.params.take()
    }

    /// Drop the stored vector. Releasing an already released handle is a
    /// no-op.
    pub fn release(&mut self) {
        self.params = None;
    }

    pub fn is_released(&self) -> bool {
        self.params.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use ndarray::Array1;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation on construction.
    // - Views through the layout and the release lifecycle.
    // -------------------------------------------------------------------------

    fn dims_2x5() -> ProblemDims {
        ProblemDims::new(2, 5).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A handle only accepts a vector of the exact parameter count.
    //
    // Given
    // -----
    // - L = 2, Q = 5 (35 parameters) and a vector of length 34.
    //
    // Expect
    // ------
    // - `ParamLengthMismatch { expected: 35, found: 34 }`.
    fn new_rejects_wrong_length() {
        // Act
        let err = FieldsAndCouplings::new(dims_2x5(), Array1::zeros(34)).unwrap_err();

        // Assert
        assert_eq!(err, OptError::ParamLengthMismatch { expected: 35, found: 34 });
    }

    #[test]
    // Purpose
    // -------
    // Views read the packed vector.
    //
    // Given
    // -----
    // - L = 2, Q = 5 with entry k set to k.
    //
    // Expect
    // ------
    // - fields(1) starts at 5; coupling(0, 1)[[1, 2]] = 10 + 1*5 + 2 = 17;
    //   coupling(1, 0) is its transpose.
    fn views_follow_layout() {
        // Arrange
        let params = Array1::from_iter((0..35).map(|k| k as f64));
        let handle = FieldsAndCouplings::new(dims_2x5(), params).unwrap();

        // Act
        let fields = handle.fields(1).unwrap();
        let block = handle.coupling(0, 1).unwrap();
        let flipped = handle.coupling(1, 0).unwrap();

        // Assert
        assert_eq!(handle.len(), 35);
        assert_eq!(fields[0], 5.0);
        assert_eq!(block[[1, 2]], 17.0);
        assert_eq!(flipped[[2, 1]], 17.0);
        assert!(handle.fields(2).is_none());
    }

    #[test]
    // Purpose
    // -------
    // Release empties the handle and may be repeated.
    //
    // Given
    // -----
    // - A valid handle released twice.
    //
    // Expect
    // ------
    // - No panic; accessors return None; len() is 0.
    fn release_is_idempotent() {
        // Arrange
        let mut handle = FieldsAndCouplings::new(dims_2x5(), Array1::zeros(35)).unwrap();

        // Act
        handle.release();
        handle.release();

        // Assert
        assert!(handle.is_released());
        assert!(handle.params().is_none());
        assert!(handle.as_slice().is_none());
        assert!(handle.coupling(0, 1).is_none());
        assert_eq!(handle.len(), 0);
        assert!(handle.into_inner().is_none());
    }
}
