//! Conversion helpers for the Python entry point.
//!
//! Each helper accepts the loose inputs a Python caller typically has
//! (numpy arrays, pandas objects, nested lists, strings or integer codes)
//! and returns validated crate types. Non-contiguous or wrongly typed
//! arrays are copied through a Rust buffer instead of being rejected.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
    PyReadonlyArray2,
};

#[cfg(feature = "python-bindings")]
use crate::alignment::{Biomolecule, EncodedAlignment, Regularization};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy an encoded alignment (sequences × sites, `uint8` states) into an
/// owned `Array2<u8>`.
///
/// Accepts a 2-D `uint8` numpy array, anything with `to_numpy()` returning
/// one, or a rectangular nested sequence of small integers.
#[cfg(feature = "python-bindings")]
pub fn extract_msa<'py>(raw_msa: &Bound<'py, PyAny>) -> PyResult<Array2<u8>> {
    if let Ok(arr_ro) = raw_msa.extract::<PyReadonlyArray2<u8>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    if let Ok(obj) = raw_msa.call_method("to_numpy", (), None) {
        if let Ok(frame_ro) = obj.extract::<PyReadonlyArray2<u8>>() {
            return Ok(frame_ro.as_array().to_owned());
        }
    }

    let rows: Vec<Vec<u8>> = raw_msa.extract().map_err(|_| {
        PyTypeError::new_err("msa must be a 2-D uint8 numpy.ndarray or a list of integer rows")
    })?;
    let num_sequences = rows.len();
    let num_sites = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != num_sites) {
        return Err(PyValueError::new_err("msa rows must all have the same length"));
    }
    let flat: Vec<u8> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((num_sequences, num_sites), flat)
        .map_err(|e| PyValueError::new_err(format!("msa has an invalid shape: {e}")))
}

/// Parse a biomolecule given either by name (`"protein"`, `"rna"`) or by
/// integer code (`1`, `2`).
#[cfg(feature = "python-bindings")]
pub fn extract_biomolecule<'py>(raw: &Bound<'py, PyAny>) -> PyResult<Biomolecule> {
    if let Ok(name) = raw.extract::<String>() {
        return Ok(name.parse::<Biomolecule>()?);
    }
    if let Ok(code) = raw.extract::<i64>() {
        return Ok(Biomolecule::from_code(code)?);
    }
    Err(PyTypeError::new_err("biomolecule must be a string ('protein', 'rna') or an integer code"))
}

/// Build the validated alignment and regularization for one backend call.
///
/// `weights = None` weights every sequence `1 / M`. Missing strengths
/// fall back to [`Regularization::scaled_for`] on the alignment width.
#[cfg(feature = "python-bindings")]
pub fn build_alignment<'py>(
    py: Python<'py>, biomolecule: &Bound<'py, PyAny>, msa: &Bound<'py, PyAny>,
    weights: Option<&Bound<'py, PyAny>>, lambda_h: Option<f64>, lambda_j: Option<f64>,
) -> PyResult<(EncodedAlignment, Regularization)> {
    let biomolecule = extract_biomolecule(biomolecule)?;
    let sequences = extract_msa(msa)?;
    let sequence_length = sequences.ncols();

    let alignment = match weights {
        Some(raw) => {
            let arr = extract_f64_array(py, raw)?;
            let slice = arr.as_slice().map_err(|_| {
                PyValueError::new_err("weights must be a 1-D contiguous float64 array or sequence")
            })?;
            EncodedAlignment::new(biomolecule, sequences, Array1::from(slice.to_vec()))?
        }
        None => EncodedAlignment::uniform(biomolecule, sequences)?,
    };

    let defaults = Regularization::scaled_for(sequence_length);
    let regularization = Regularization::new(
        lambda_h.unwrap_or(defaults.lambda_h),
        lambda_j.unwrap_or(defaults.lambda_j),
    )?;
    Ok((alignment, regularization))
}
