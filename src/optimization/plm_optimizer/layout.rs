//! plm_optimizer::layout — packing of fields and couplings into one vector.
//!
//! Purpose
//! -------
//! Define the one and only mapping between `(site, state)` fields,
//! `(site pair, state pair)` couplings and positions in the flat parameter
//! vector [`Theta`]. Initialization, gradient computation and result readout
//! all go through [`ParamLayout`], so they cannot disagree.
//!
//! Layout
//! ------
//! For `L = sequence_length` and `Q = num_site_states`:
//! - `[0, L*Q)`: fields, one block of `Q` values per site, site-major.
//!   `h_i(a)` lives at `i*Q + a`.
//! - `[L*Q, total)`: couplings, one `Q*Q` block per unordered pair
//!   `(i, j), i < j`, pairs in lexicographic order
//!   `(0,1), (0,2), …, (0,L-1), (1,2), …, (L-2,L-1)`. Inside a block,
//!   `J_ij(a, b)` (state `a` at `i`, state `b` at `j`) lives at `a*Q + b`.
//!
//! `total = L*Q + L*(L-1)/2 * Q*Q`; the pair count is zero for `L <= 1`.
use ndarray::{ArrayView1, ArrayView2, s};

use crate::{
    alignment::core::biomolecule::Biomolecule,
    optimization::{
        errors::{OptError, OptResult},
        plm_optimizer::types::Theta,
    },
};

/// Number of unordered site pairs `L*(L-1)/2`; zero when `L <= 1`.
pub fn num_site_pairs(sequence_length: usize) -> usize {
    sequence_length * sequence_length.saturating_sub(1) / 2
}

/// Total number of fields and couplings, `L*Q + L*(L-1)/2 * Q*Q`.
///
/// Panics on `usize` overflow in debug builds; use
/// [`checked_total_num_params`] when the dimensions are untrusted.
pub fn total_num_params(sequence_length: usize, num_site_states: usize) -> usize {
    sequence_length * num_site_states
        + num_site_pairs(sequence_length) * num_site_states * num_site_states
}

/// Overflow-checked [`total_num_params`].
pub fn checked_total_num_params(sequence_length: usize, num_site_states: usize) -> Option<usize> {
    let fields = sequence_length.checked_mul(num_site_states)?;
    let pairs = sequence_length.checked_mul(sequence_length.saturating_sub(1))? / 2;
    let block = num_site_states.checked_mul(num_site_states)?;
    fields.checked_add(pairs.checked_mul(block)?)
}

/// Problem dimensions of one run: alignment width `L` and alphabet size `Q`
/// (gap included). Both are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProblemDims {
    pub sequence_length: usize,
    pub num_site_states: usize,
}

impl ProblemDims {
    /// Construct validated dimensions.
    ///
    /// # Errors
    /// - [`OptError::InvalidDimensions`] if either dimension is zero.
    /// - [`OptError::ParameterCountOverflow`] if the parameter count does
    ///   not fit in `usize`.
    pub fn new(sequence_length: usize, num_site_states: usize) -> OptResult<Self> {
        if sequence_length == 0 {
            return Err(OptError::InvalidDimensions {
                sequence_length,
                num_site_states,
                reason: "Sequence length must be greater than zero.",
            });
        }
        if num_site_states == 0 {
            return Err(OptError::InvalidDimensions {
                sequence_length,
                num_site_states,
                reason: "Number of site states must be greater than zero.",
            });
        }
        if checked_total_num_params(sequence_length, num_site_states).is_none() {
            return Err(OptError::ParameterCountOverflow { sequence_length, num_site_states });
        }
        Ok(Self { sequence_length, num_site_states })
    }

    /// Dimensions for an alignment of `biomolecule` sequences of width
    /// `sequence_length`.
    pub fn for_biomolecule(biomolecule: Biomolecule, sequence_length: usize) -> OptResult<Self> {
        Self::new(sequence_length, biomolecule.num_site_states())
    }

    /// Total number of parameters for these dimensions.
    pub fn total_num_params(&self) -> usize {
        total_num_params(self.sequence_length, self.num_site_states)
    }

    pub fn layout(&self) -> ParamLayout {
        ParamLayout::new(*self)
    }
}

/// Index arithmetic over the flat parameter vector.
///
/// Index helpers assume in-range arguments (`i < j < L`, `a, b < Q`) and
/// are meant for hot loops; the view accessors check ranges and return
/// `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamLayout {
    dims: ProblemDims,
}

impl ParamLayout {
    pub fn new(dims: ProblemDims) -> Self {
        Self { dims }
    }

    pub fn dims(&self) -> ProblemDims {
        self.dims
    }

    pub fn sequence_length(&self) -> usize {
        self.dims.sequence_length
    }

    pub fn num_site_states(&self) -> usize {
        self.dims.num_site_states
    }

    /// Number of field entries, `L*Q`.
    pub fn num_fields(&self) -> usize {
        self.dims.sequence_length * self.dims.num_site_states
    }

    pub fn num_pairs(&self) -> usize {
        num_site_pairs(self.dims.sequence_length)
    }

    /// Number of coupling entries, `L*(L-1)/2 * Q*Q`.
    pub fn num_couplings(&self) -> usize {
        self.num_pairs() * self.block_len()
    }

    pub fn total(&self) -> usize {
        self.num_fields() + self.num_couplings()
    }

    /// Length of one coupling block, `Q*Q`.
    pub fn block_len(&self) -> usize {
        self.dims.num_site_states * self.dims.num_site_states
    }

    /// Position of `h_i(a)`.
    #[inline]
    pub fn field_index(&self, i: usize, a: usize) -> usize {
        i * self.dims.num_site_states + a
    }

    /// Rank of pair `(i, j)`, `i < j`, in lexicographic enumeration.
    #[inline]
    pub fn pair_index(&self, i: usize, j: usize) -> usize {
        let l = self.dims.sequence_length;
        i * (2 * l - i - 1) / 2 + (j - i - 1)
    }

    /// First position of the `(i, j)` coupling block, `i < j`.
    #[inline]
    pub fn coupling_offset(&self, i: usize, j: usize) -> usize {
        self.num_fields() + self.pair_index(i, j) * self.block_len()
    }

    /// Position of `J_ij(a, b)`, `i < j`.
    #[inline]
    pub fn coupling_index(&self, i: usize, j: usize, a: usize, b: usize) -> usize {
        self.coupling_offset(i, j) + a * self.dims.num_site_states + b
    }

    /// Site pairs `(i, j)`, `i < j`, in storage order.
    pub fn site_pairs(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let l = self.dims.sequence_length;
        (0..l).flat_map(move |i| (i + 1..l).map(move |j| (i, j)))
    }

    /// Fields of site `i` (length `Q`).
    pub fn fields<'a>(&self, params: &'a Theta, i: usize) -> Option<ArrayView1<'a, f64>> {
        if i >= self.dims.sequence_length || params.len() != self.total() {
            return None;
        }
        let start = self.field_index(i, 0);
        Some(params.slice(s![start..start + self.dims.num_site_states]))
    }

    /// Coupling block of pair `(i, j)` as a `Q×Q` view, rows indexed by the
    /// state at the lower site. Accepts either order of `i` and `j`; the
    /// view is transposed when `i > j` so rows always follow `i`.
    pub fn coupling_block<'a>(
        &self, params: &'a Theta, i: usize, j: usize,
    ) -> Option<ArrayView2<'a, f64>> {
        let l = self.dims.sequence_length;
        if i == j || i >= l || j >= l || params.len() != self.total() {
            return None;
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        let q = self.dims.num_site_states;
        let start = self.coupling_offset(lo, hi);
        let block = params.slice(s![start..start + q * q]).into_shape((q, q)).ok()?;
        Some(if i < j { block } else { block.reversed_axes() })
    }
}
