use nalgebra::Matrix3;
use pbx_core::errors::PbxError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::params::BoxParameters;
use crate::periodic::PeriodicBox;

/// Every value accepted where a periodic box is expected.
///
/// Matrix forms are written row by row, with the lattice vectors as columns,
/// so `Matrix3x3([[a1x, a2x, a3x], [a1y, a2y, a3y], [a1z, a2z, a3z]])`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoxLikeRepr", into = "BoxLikeRepr")]
pub enum BoxLike {
    /// Cube with the given edge length.
    Scalar(f64),
    /// 2D rectangle `[lx, ly]`.
    AxisLengths2([f64; 2]),
    /// Orthorhombic box `[lx, ly, lz]`; `lz == 0` yields a 2D box.
    AxisLengths3([f64; 3]),
    /// 2D lattice vectors as the columns of a 2x2 matrix.
    Matrix2x2([[f64; 2]; 2]),
    /// Lattice vectors as the columns of a 3x3 matrix.
    Matrix3x3([[f64; 3]; 3]),
    /// Explicit lengths, tilts and flags.
    Parameters(BoxParameters),
    /// An already canonical box.
    Canonical(PeriodicBox),
}

impl BoxLike {
    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            BoxLike::Scalar(_) => "scalar",
            BoxLike::AxisLengths2(_) => "axis-lengths-2",
            BoxLike::AxisLengths3(_) => "axis-lengths-3",
            BoxLike::Matrix2x2(_) => "matrix-2x2",
            BoxLike::Matrix3x3(_) => "matrix-3x3",
            BoxLike::Parameters(_) => "parameters",
            BoxLike::Canonical(_) => "canonical",
        }
    }
}

impl PeriodicBox {
    /// Converts any [`BoxLike`] value into a box.
    pub fn from_box(like: BoxLike) -> Result<Self, PbxError> {
        match like {
            BoxLike::Scalar(length) => Self::cube(length),
            BoxLike::AxisLengths2([lx, ly]) => Self::from_lengths(lx, ly, 0.0),
            BoxLike::AxisLengths3([lx, ly, lz]) => Self::from_lengths(lx, ly, lz),
            BoxLike::Matrix2x2(rows) => Self::from_matrix(&Matrix3::new(
                rows[0][0], rows[0][1], 0.0, rows[1][0], rows[1][1], 0.0, 0.0, 0.0, 0.0,
            )),
            BoxLike::Matrix3x3(rows) => Self::from_matrix(&Matrix3::from_fn(|r, c| rows[r][c])),
            BoxLike::Parameters(params) => Self::from_parameters(&params),
            BoxLike::Canonical(sim_box) => Ok(sim_box),
        }
    }
}

/// Coerces a box-like value into a [`PeriodicBox`].
///
/// Canonical boxes are returned unchanged. Every other form is built through
/// [`PeriodicBox::from_box`] and its error, if any, is returned as is.
pub fn convert_box(like: impl Into<BoxLike>) -> Result<PeriodicBox, PbxError> {
    let like = like.into();
    if let BoxLike::Canonical(sim_box) = like {
        return Ok(sim_box);
    }
    debug!(kind = like.kind(), "building box from box-like value");
    PeriodicBox::from_box(like)
}

impl From<f64> for BoxLike {
    fn from(value: f64) -> Self {
        BoxLike::Scalar(value)
    }
}

impl From<[f64; 2]> for BoxLike {
    fn from(value: [f64; 2]) -> Self {
        BoxLike::AxisLengths2(value)
    }
}

impl From<[f64; 3]> for BoxLike {
    fn from(value: [f64; 3]) -> Self {
        BoxLike::AxisLengths3(value)
    }
}

impl From<[[f64; 2]; 2]> for BoxLike {
    fn from(value: [[f64; 2]; 2]) -> Self {
        BoxLike::Matrix2x2(value)
    }
}

impl From<[[f64; 3]; 3]> for BoxLike {
    fn from(value: [[f64; 3]; 3]) -> Self {
        BoxLike::Matrix3x3(value)
    }
}

impl From<Matrix3<f64>> for BoxLike {
    fn from(value: Matrix3<f64>) -> Self {
        BoxLike::Matrix3x3(std::array::from_fn(|r| std::array::from_fn(|c| value[(r, c)])))
    }
}

impl From<BoxParameters> for BoxLike {
    fn from(value: BoxParameters) -> Self {
        BoxLike::Parameters(value)
    }
}

impl From<PeriodicBox> for BoxLike {
    fn from(value: PeriodicBox) -> Self {
        BoxLike::Canonical(value)
    }
}

impl From<&PeriodicBox> for BoxLike {
    fn from(value: &PeriodicBox) -> Self {
        BoxLike::Canonical(*value)
    }
}

/// Untagged wire form; canonical boxes travel as parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum BoxLikeRepr {
    Scalar(f64),
    AxisLengths2([f64; 2]),
    AxisLengths3([f64; 3]),
    Matrix2x2([[f64; 2]; 2]),
    Matrix3x3([[f64; 3]; 3]),
    Parameters(BoxParameters),
}

impl From<BoxLikeRepr> for BoxLike {
    fn from(value: BoxLikeRepr) -> Self {
        match value {
            BoxLikeRepr::Scalar(v) => BoxLike::Scalar(v),
            BoxLikeRepr::AxisLengths2(v) => BoxLike::AxisLengths2(v),
            BoxLikeRepr::AxisLengths3(v) => BoxLike::AxisLengths3(v),
            BoxLikeRepr::Matrix2x2(v) => BoxLike::Matrix2x2(v),
            BoxLikeRepr::Matrix3x3(v) => BoxLike::Matrix3x3(v),
            BoxLikeRepr::Parameters(v) => BoxLike::Parameters(v),
        }
    }
}

impl From<BoxLike> for BoxLikeRepr {
    fn from(value: BoxLike) -> Self {
        match value {
            BoxLike::Scalar(v) => BoxLikeRepr::Scalar(v),
            BoxLike::AxisLengths2(v) => BoxLikeRepr::AxisLengths2(v),
            BoxLike::AxisLengths3(v) => BoxLikeRepr::AxisLengths3(v),
            BoxLike::Matrix2x2(v) => BoxLikeRepr::Matrix2x2(v),
            BoxLike::Matrix3x3(v) => BoxLikeRepr::Matrix3x3(v),
            BoxLike::Parameters(v) => BoxLikeRepr::Parameters(v),
            BoxLike::Canonical(sim_box) => BoxLikeRepr::Parameters(sim_box.parameters()),
        }
    }
}
