use ndarray::{Array, ArrayBase, Data, Dimension};
use num_traits::AsPrimitive;
use pbx_core::errors::{ErrorInfo, PbxError};
use tracing::trace;

/// Checks the rank of an array against an optional expectation.
///
/// `None` accepts any rank. A mismatch is reported as [`PbxError::Shape`]; no
/// attempt is made to add or squeeze axes.
pub fn check_rank(ndim: usize, dimensions: Option<usize>) -> Result<(), PbxError> {
    match dimensions {
        Some(expected) if expected != ndim => Err(PbxError::Shape(
            ErrorInfo::new(
                "rank-mismatch",
                format!("array.ndim = {ndim}; expected ndim = {expected}"),
            )
            .with_context("ndim", ndim.to_string())
            .with_context("expected", expected.to_string()),
        )),
        _ => Ok(()),
    }
}

/// Converts `array` to a row-major array with element type `T`.
///
/// The rank is validated first, so a mismatch fails before any element is
/// touched. Elements are cast with `as` semantics, which permits narrowing
/// (for example `f64 -> f32`) without error. The result always has standard
/// layout, whatever the layout of the input. Converting an already canonical
/// array returns a bit-identical copy.
pub fn convert_array<A, T, S, D>(
    array: &ArrayBase<S, D>,
    dimensions: Option<usize>,
) -> Result<Array<T, D>, PbxError>
where
    S: Data<Elem = A>,
    D: Dimension,
    A: AsPrimitive<T>,
    T: Copy + 'static,
{
    check_rank(array.ndim(), dimensions)?;
    let values: Vec<T> = array.iter().map(|&value| value.as_()).collect();
    Array::from_shape_vec(array.raw_dim(), values).map_err(|err| {
        PbxError::Shape(
            ErrorInfo::new("layout", err.to_string())
                .with_context("shape", format!("{:?}", array.shape())),
        )
    })
}

/// Shorthand for [`convert_array`] with the default `f32` element type.
pub fn convert_array_f32<A, S, D>(
    array: &ArrayBase<S, D>,
    dimensions: Option<usize>,
) -> Result<Array<f32, D>, PbxError>
where
    S: Data<Elem = A>,
    D: Dimension,
    A: AsPrimitive<f32>,
{
    convert_array(array, dimensions)
}

/// Returns a standard-layout copy of `array` without changing the element type.
pub fn require_contiguous<A, S, D>(
    array: &ArrayBase<S, D>,
    dimensions: Option<usize>,
) -> Result<Array<A, D>, PbxError>
where
    S: Data<Elem = A>,
    D: Dimension,
    A: Clone,
{
    check_rank(array.ndim(), dimensions)?;
    if !array.is_standard_layout() {
        trace!(shape = ?array.shape(), "copying array into standard layout");
    }
    Ok(array.as_standard_layout().into_owned())
}
