use ndarray::{Array2, ArrayBase, Data, Dimension, Ix2};
use num_traits::AsPrimitive;
use pbx_core::errors::{ErrorInfo, PbxError};

use crate::convert::convert_array;

/// Canonicalizes an `N x 3` point array.
///
/// The input must have rank 2 and exactly three columns.
pub fn convert_points_array<A, T, S, D>(array: &ArrayBase<S, D>) -> Result<Array2<T>, PbxError>
where
    S: Data<Elem = A>,
    D: Dimension,
    A: AsPrimitive<T>,
    T: Copy + 'static,
{
    let converted = convert_array(array, Some(2))?;
    if converted.shape()[1] != 3 {
        return Err(PbxError::Shape(
            ErrorInfo::new("points-columns", "point arrays must have shape (N, 3)")
                .with_context("shape", format!("{:?}", converted.shape())),
        ));
    }
    converted.into_dimensionality::<Ix2>().map_err(|err| {
        PbxError::Shape(ErrorInfo::new("points-rank", err.to_string()))
    })
}

/// Builds a canonical `N x 3` array from a slice of 3-vectors.
pub fn convert_points<A, T>(points: &[[A; 3]]) -> Result<Array2<T>, PbxError>
where
    A: AsPrimitive<T>,
    T: Copy + 'static,
{
    let flat: Vec<T> = points.iter().flatten().map(|&value| value.as_()).collect();
    Array2::from_shape_vec((points.len(), 3), flat).map_err(|err| {
        PbxError::Shape(
            ErrorInfo::new("points-layout", err.to_string())
                .with_context("points", points.len().to_string()),
        )
    })
}
