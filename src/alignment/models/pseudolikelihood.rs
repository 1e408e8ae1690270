//! Regularized negative log-pseudolikelihood of a Potts model.
//!
//! Purpose
//! -------
//! Implement [`AlignmentModel`] for an [`EncodedAlignment`]: the objective
//! minimized by plmDCA and its analytic gradient with respect to the flat
//! fields-and-couplings vector.
//!
//! Objective
//! ---------
//! For sequence `s` with weight `w`, site `i` and state `a`, the local
//! energy is
//!
//! ```text
//! e_i(a | s) = h_i(a) + Σ_{j ≠ i} J_ij(a, s_j)
//! ```
//!
//! and the objective is
//!
//! ```text
//! f(x) = Σ_s w_s Σ_i [ ln Σ_a exp e_i(a | s) − e_i(s_i | s) ] + λ_h Σ h² + λ_J Σ J²
//! ```
//!
//! With `P_i(a | s)` the softmax of the energies, the gradient collects
//! `w_s (P_i(a | s) − δ(a, s_i))` into `h_i(a)` and into every coupling
//! `J_ij(a, s_j)`, plus `2 λ x` from the penalties.
//!
//! Parallelism & determinism
//! -------------------------
//! Sequences are processed in fixed blocks of [`SEQUENCE_BLOCK`] rows. For
//! each block, the workers of the ambient rayon pool first compute every
//! sequence's residuals `w (P_i(·|s) − δ)` into a buffer of
//! `SEQUENCE_BLOCK · L · Q` values. The workers then scatter the residuals
//! into the gradient by owner site: site `i` owns its fields and the
//! coupling blocks `(i, j > i)`, which are contiguous and disjoint from
//! every other site's. Each entry therefore receives its contributions in
//! sequence order, whatever the worker count, and memory beyond `x` and the
//! gradient stays at one residual buffer.
use std::ops::Range;

use ndarray::ArrayView1;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::{
    alignment::{
        core::{data::EncodedAlignment, options::Regularization},
        errors::AlignmentError,
    },
    optimization::{
        errors::{OptError, OptResult},
        numerical_stability::softmax_in_place,
        plm_optimizer::{
            layout::{ParamLayout, ProblemDims},
            traits::AlignmentModel,
            types::{Cost, Grad, Theta},
        },
    },
};

/// Sequences whose residuals are held in memory at once.
pub const SEQUENCE_BLOCK: usize = 64;

#[derive(Debug, Clone)]
pub struct PseudoLikelihood {
    alignment: EncodedAlignment,
    regularization: Regularization,
    layout: ParamLayout,
}

impl PseudoLikelihood {
    /// # Errors
    /// Propagates dimension errors for the alignment's `(L, Q)`.
    pub fn new(alignment: EncodedAlignment, regularization: Regularization) -> OptResult<Self> {
        let layout = alignment.dims()?.layout();
        debug!(
            num_sequences = alignment.num_sequences(),
            sequence_length = layout.sequence_length(),
            num_site_states = layout.num_site_states(),
            effective_count = alignment.effective_count(),
            lambda_h = regularization.lambda_h,
            lambda_j = regularization.lambda_j,
            "pseudolikelihood model ready"
        );
        Ok(Self { alignment, regularization, layout })
    }

    pub fn alignment(&self) -> &EncodedAlignment {
        &self.alignment
    }

    pub fn regularization(&self) -> Regularization {
        self.regularization
    }

    pub fn dims(&self) -> ProblemDims {
        self.layout.dims()
    }

    /// Objective value only.
    pub fn value(&self, x: &Theta) -> OptResult<Cost> {
        let mut grad = Grad::zeros(self.layout.total());
        self.gradient(x, &mut grad)
    }

    /// Objective contribution of sequence `n`, with its residuals
    /// `w (P_i(a | s) − δ(a, s_i))` written to `out[i * Q + a]`.
    fn site_residuals(&self, x: &[f64], n: usize, out: &mut [f64]) -> f64 {
        let layout = &self.layout;
        let q = layout.num_site_states();
        let w = self.alignment.weights()[n];
        if w == 0.0 {
            out.fill(0.0);
            return 0.0;
        }
        let seq = self.alignment.sequence(n);

        let mut value = 0.0;
        for (i, energies) in out.chunks_mut(q).enumerate() {
            let si = usize::from(seq[i]);
            let field = layout.field_index(i, 0);
            energies.copy_from_slice(&x[field..field + q]);
            for (j, &sj) in seq.iter().enumerate() {
                let sj = usize::from(sj);
                if j < i {
                    let base = layout.coupling_offset(j, i) + sj * q;
                    for (a, e) in energies.iter_mut().enumerate() {
                        *e += x[base + a];
                    }
                } else if j > i {
                    let base = layout.coupling_offset(i, j) + sj;
                    for (a, e) in energies.iter_mut().enumerate() {
                        *e += x[base + a * q];
                    }
                }
            }

            let own = energies[si];
            let log_z = softmax_in_place(energies);
            value += w * (log_z - own);

            // energies now hold P_i(a | s); turn them into residuals.
            for e in energies.iter_mut() {
                *e *= w;
            }
            energies[si] -= w;
        }
        value
    }

    /// Add the residuals of the sequences `rows` to the parameters owned by
    /// site `i`: its fields and its coupling blocks `(i, j)` for `j > i`.
    fn scatter_site(
        &self, i: usize, field: &mut [f64], couplings: &mut [f64], rows: Range<usize>,
        residuals: &[f64],
    ) {
        let l = self.layout.sequence_length();
        let q = self.layout.num_site_states();
        let q2 = self.layout.block_len();

        for (r, n) in residuals.chunks(l * q).zip(rows) {
            let seq = self.alignment.sequence(n);
            let si = usize::from(seq[i]);
            let ri = &r[i * q..(i + 1) * q];
            for (g, v) in field.iter_mut().zip(ri) {
                *g += v;
            }
            for (j, block) in (i + 1..l).zip(couplings.chunks_mut(q2)) {
                let sj = usize::from(seq[j]);
                let rj = &r[j * q..(j + 1) * q];
                for (a, v) in ri.iter().enumerate() {
                    block[a * q + sj] += v;
                }
                for (g, v) in block[si * q..(si + 1) * q].iter_mut().zip(rj) {
                    *g += v;
                }
            }
        }
    }

    /// Data term over all sequences, accumulated into the zeroed `grad`.
    fn accumulate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let num_sequences = self.alignment.num_sequences();
        let site_len = self.layout.sequence_length() * self.layout.num_site_states();
        let mut residuals = vec![0.0; SEQUENCE_BLOCK.min(num_sequences) * site_len];
        let mut sites = self.split_by_site(grad);

        let mut value = 0.0;
        for start in (0..num_sequences).step_by(SEQUENCE_BLOCK) {
            let rows = start..(start + SEQUENCE_BLOCK).min(num_sequences);
            let block = &mut residuals[..rows.len() * site_len];

            #[cfg(feature = "parallel")]
            let values: Vec<f64> = block
                .par_chunks_mut(site_len)
                .enumerate()
                .map(|(k, out)| self.site_residuals(x, start + k, out))
                .collect();
            #[cfg(not(feature = "parallel"))]
            let values: Vec<f64> = block
                .chunks_mut(site_len)
                .enumerate()
                .map(|(k, out)| self.site_residuals(x, start + k, out))
                .collect();
            value += values.iter().sum::<f64>();

            let block: &[f64] = block;
            #[cfg(feature = "parallel")]
            sites.par_iter_mut().for_each(|(i, field, couplings)| {
                self.scatter_site(*i, field, couplings, rows.clone(), block)
            });
            #[cfg(not(feature = "parallel"))]
            sites.iter_mut().for_each(|(i, field, couplings)| {
                self.scatter_site(*i, field, couplings, rows.clone(), block)
            });
        }
        value
    }

    /// Split the gradient into each site's fields and owned coupling blocks.
    fn split_by_site<'g>(
        &self, grad: &'g mut [f64],
    ) -> Vec<(usize, &'g mut [f64], &'g mut [f64])> {
        let l = self.layout.sequence_length();
        let q = self.layout.num_site_states();
        let q2 = self.layout.block_len();
        let (fields, mut couplings) = grad.split_at_mut(self.layout.num_fields());
        fields
            .chunks_mut(q)
            .enumerate()
            .map(|(i, field)| {
                let (own, rest) = std::mem::take(&mut couplings).split_at_mut((l - 1 - i) * q2);
                couplings = rest;
                (i, field, own)
            })
            .collect()
    }

    /// Add `λ_h Σ h² + λ_J Σ J²` and its gradient.
    fn regularize(&self, x: &Theta, grad: &mut Grad) -> f64 {
        let num_fields = self.layout.num_fields();
        let Regularization { lambda_h, lambda_j } = self.regularization;
        let mut penalty = 0.0;
        for (k, (&xk, gk)) in x.iter().zip(grad.iter_mut()).enumerate() {
            let lambda = if k < num_fields { lambda_h } else { lambda_j };
            penalty += lambda * xk * xk;
            *gk += 2.0 * lambda * xk;
        }
        penalty
    }
}

impl AlignmentModel for PseudoLikelihood {
    fn check(&self, dims: &ProblemDims) -> OptResult<()> {
        let own = self.layout.dims();
        if *dims != own {
            return Err(AlignmentError::DimensionMismatch {
                expected_length: dims.sequence_length,
                expected_states: dims.num_site_states,
                found_length: own.sequence_length,
                found_states: own.num_site_states,
            }
            .into());
        }
        Ok(())
    }

    /// Every field and coupling starts at zero.
    fn initialize(&self, buffer: &mut Theta) -> OptResult<()> {
        let expected = self.layout.total();
        if buffer.len() != expected {
            return Err(OptError::ParamLengthMismatch { expected, found: buffer.len() });
        }
        buffer.fill(0.0);
        Ok(())
    }

    fn gradient(&self, x: &Theta, grad: &mut Grad) -> OptResult<Cost> {
        let total = self.layout.total();
        if x.len() != total {
            return Err(OptError::ParamLengthMismatch { expected: total, found: x.len() });
        }
        if grad.len() != total {
            return Err(OptError::GradientDimMismatch { expected: total, found: grad.len() });
        }
        let owned;
        let xs: &[f64] = match x.as_slice() {
            Some(xs) => xs,
            None => {
                owned = x.to_vec();
                owned.as_slice()
            }
        };

        grad.fill(0.0);
        let mut value = match grad.as_slice_mut() {
            Some(gs) => self.accumulate(xs, gs),
            None => {
                let mut gs = vec![0.0; total];
                let value = self.accumulate(xs, &mut gs);
                grad.assign(&ArrayView1::from(&gs[..]));
                value
            }
        };
        value += self.regularize(x, grad);
        Ok(value)
    }
}
