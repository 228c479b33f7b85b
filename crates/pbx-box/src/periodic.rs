use nalgebra::{Matrix3, Vector3};
use num_traits::ToPrimitive;
use pbx_core::errors::{ErrorInfo, PbxError};
use serde::{Deserialize, Serialize};

use crate::params::BoxParameters;

/// Periodic parallelepiped simulation cell in two or three dimensions.
///
/// The lattice matrix has the lattice vectors as columns:
///
/// ```text
/// a1 = (lx, 0, 0)
/// a2 = (xy * ly, ly, 0)
/// a3 = (xz * lz, yz * lz, lz)
/// ```
///
/// The box is centered on the origin, so fractional coordinate `f` maps to
/// `M * (f - 1/2)`. A 2D box has `lz == 0` and every absolute z coordinate it
/// produces is 0. Boxes are immutable values; every transformation returns a
/// new box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoxParameters", into = "BoxParameters")]
pub struct PeriodicBox {
    lx: f64,
    ly: f64,
    lz: f64,
    xy: f64,
    xz: f64,
    yz: f64,
    is_2d: bool,
    periodic: [bool; 3],
}

fn invalid_box(code: &str, message: &str) -> PbxError {
    PbxError::Box(ErrorInfo::new(code, message))
}

impl PeriodicBox {
    /// Creates a box from edge lengths and tilt factors.
    ///
    /// For a 2D box `lz`, `xz` and `yz` are ignored and stored as 0.
    pub fn new(
        lx: f64,
        ly: f64,
        lz: f64,
        xy: f64,
        xz: f64,
        yz: f64,
        is_2d: bool,
    ) -> Result<Self, PbxError> {
        let params = BoxParameters {
            is_2d: Some(is_2d),
            ..BoxParameters::orthorhombic(lx, ly, lz).with_tilts(xy, xz, yz)
        };
        Self::from_parameters(&params)
    }

    /// Validates `params` and builds the box.
    pub fn from_parameters(params: &BoxParameters) -> Result<Self, PbxError> {
        let is_2d = params.resolved_is_2d();
        let values = [params.lx, params.ly, params.lz, params.xy, params.xz, params.yz];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(PbxError::Box(
                ErrorInfo::new("box-non-finite", "box parameters must be finite")
                    .with_context("parameters", format!("{values:?}")),
            ));
        }
        if params.lx <= 0.0 || params.ly <= 0.0 {
            return Err(PbxError::Box(
                ErrorInfo::new("box-length", "box lengths lx and ly must be positive")
                    .with_context("lx", params.lx.to_string())
                    .with_context("ly", params.ly.to_string()),
            ));
        }
        if !is_2d && params.lz <= 0.0 {
            return Err(PbxError::Box(
                ErrorInfo::new("box-length", "a 3D box requires a positive lz")
                    .with_context("lz", params.lz.to_string())
                    .with_hint("use lz = 0 for a 2D box"),
            ));
        }
        let (lz, xz, yz) = if is_2d {
            (0.0, 0.0, 0.0)
        } else {
            (params.lz, params.xz, params.yz)
        };
        let mut periodic = params.periodic;
        if is_2d {
            periodic[2] = false;
        }
        Ok(Self {
            lx: params.lx,
            ly: params.ly,
            lz,
            xy: params.xy,
            xz,
            yz,
            is_2d,
            periodic,
        })
    }

    /// Unit cube, the lattice of the cubic unit cells.
    pub fn unit_cube() -> Self {
        Self {
            lx: 1.0,
            ly: 1.0,
            lz: 1.0,
            xy: 0.0,
            xz: 0.0,
            yz: 0.0,
            is_2d: false,
            periodic: [true, true, true],
        }
    }

    /// Unit square.
    pub fn unit_square() -> Self {
        Self {
            lz: 0.0,
            is_2d: true,
            periodic: [true, true, false],
            ..Self::unit_cube()
        }
    }

    /// Cube with edge length `length`.
    pub fn cube(length: f64) -> Result<Self, PbxError> {
        Self::from_parameters(&BoxParameters::orthorhombic(length, length, length))
    }

    /// 2D square with edge length `length`.
    pub fn square(length: f64) -> Result<Self, PbxError> {
        Self::from_parameters(&BoxParameters::orthorhombic(length, length, 0.0))
    }

    /// Orthorhombic box; `lz == 0` yields a 2D box.
    pub fn from_lengths(lx: f64, ly: f64, lz: f64) -> Result<Self, PbxError> {
        Self::from_parameters(&BoxParameters::orthorhombic(lx, ly, lz))
    }

    /// Builds a box from a matrix whose columns are the lattice vectors.
    ///
    /// The matrix may be rotated; only the lengths and relative orientation of
    /// the lattice vectors matter. A zero third column yields a 2D box.
    pub fn from_matrix(matrix: &Matrix3<f64>) -> Result<Self, PbxError> {
        if matrix.iter().any(|value| !value.is_finite()) {
            return Err(invalid_box("box-non-finite", "box matrix must be finite"));
        }
        let a1: Vector3<f64> = matrix.column(0).into_owned();
        let a2: Vector3<f64> = matrix.column(1).into_owned();
        let a3: Vector3<f64> = matrix.column(2).into_owned();

        let lx = a1.norm();
        if lx == 0.0 {
            return Err(invalid_box("box-degenerate", "first lattice vector is zero"));
        }
        let a2x = a1.dot(&a2) / lx;
        let ly_sq = a2.norm_squared() - a2x * a2x;
        if ly_sq <= 0.0 {
            return Err(invalid_box(
                "box-degenerate",
                "second lattice vector is parallel to the first",
            ));
        }
        let ly = ly_sq.sqrt();
        let xy = a2x / ly;

        let normal = a1.cross(&a2);
        let lz = a3.dot(&normal) / normal.norm();
        if lz < 0.0 {
            return Err(PbxError::Box(
                ErrorInfo::new("box-handedness", "box matrix must be right-handed")
                    .with_context("lz", lz.to_string()),
            ));
        }
        if lz == 0.0 {
            if a3.norm() > 0.0 {
                return Err(invalid_box(
                    "box-degenerate",
                    "third lattice vector lies in the plane of the first two",
                ));
            }
            return Self::new(lx, ly, 0.0, xy, 0.0, 0.0, true);
        }
        let a3x = a1.dot(&a3) / lx;
        let xz = a3x / lz;
        let yz = (a2.dot(&a3) - a2x * a3x) / (ly * lz);
        Self::new(lx, ly, lz, xy, xz, yz, false)
    }

    /// Lattice matrix with the lattice vectors as columns.
    pub fn to_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.lx,
            self.xy * self.ly,
            self.xz * self.lz,
            0.0,
            self.ly,
            self.yz * self.lz,
            0.0,
            0.0,
            self.lz,
        )
    }

    /// Parameters describing this box.
    pub fn parameters(&self) -> BoxParameters {
        BoxParameters {
            lx: self.lx,
            ly: self.ly,
            lz: self.lz,
            xy: self.xy,
            xz: self.xz,
            yz: self.yz,
            is_2d: Some(self.is_2d),
            periodic: self.periodic,
        }
    }

    /// Edge lengths `(lx, ly, lz)`.
    pub fn lengths(&self) -> Vector3<f64> {
        Vector3::new(self.lx, self.ly, self.lz)
    }

    /// Tilt factors `(xy, xz, yz)`.
    pub fn tilts(&self) -> [f64; 3] {
        [self.xy, self.xz, self.yz]
    }

    /// The three lattice vectors.
    pub fn lattice_vectors(&self) -> [Vector3<f64>; 3] {
        let matrix = self.to_matrix();
        [
            matrix.column(0).into_owned(),
            matrix.column(1).into_owned(),
            matrix.column(2).into_owned(),
        ]
    }

    /// Whether the box is two dimensional.
    pub fn is_2d(&self) -> bool {
        self.is_2d
    }

    /// Dimensionality, 2 or 3.
    pub fn dimensions(&self) -> usize {
        if self.is_2d {
            2
        } else {
            3
        }
    }

    /// Periodicity along each lattice vector. z is never periodic in 2D.
    pub fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// Returns a copy with the given periodicity flags.
    pub fn with_periodic(mut self, periodic: [bool; 3]) -> Self {
        self.periodic = periodic;
        if self.is_2d {
            self.periodic[2] = false;
        }
        self
    }

    /// Volume of the box, or its area in 2D.
    pub fn volume(&self) -> f64 {
        if self.is_2d {
            self.lx * self.ly
        } else {
            self.lx * self.ly * self.lz
        }
    }

    /// Maps fractional coordinates to absolute coordinates.
    pub fn make_absolute(&self, fractional: &Vector3<f64>) -> Vector3<f64> {
        let centered = fractional - Vector3::repeat(0.5);
        let mut absolute = self.to_matrix() * centered;
        if self.is_2d {
            absolute.z = 0.0;
        }
        absolute
    }

    /// Maps absolute coordinates to fractional coordinates.
    ///
    /// The fractional z coordinate of a 2D box is always 0.
    pub fn make_fractional(&self, absolute: &Vector3<f64>) -> Vector3<f64> {
        let cz = if self.is_2d { 0.0 } else { absolute.z / self.lz };
        let cy = (absolute.y - self.yz * self.lz * cz) / self.ly;
        let cx = (absolute.x - self.xy * self.ly * cy - self.xz * self.lz * cz) / self.lx;
        let fz = if self.is_2d { 0.0 } else { cz + 0.5 };
        Vector3::new(cx + 0.5, cy + 0.5, fz)
    }

    /// Periodic image containing `absolute`; 0 along non-periodic axes.
    ///
    /// Points more than `i32::MAX` box lengths away, or with non-finite
    /// coordinates, have no representable image and fail with a box error.
    pub fn image(&self, absolute: &Vector3<f64>) -> Result<[i32; 3], PbxError> {
        let fractional = self.make_fractional(absolute);
        let mut image = [0i32; 3];
        for (axis, slot) in image.iter_mut().enumerate() {
            if self.periodic[axis] {
                *slot = fractional[axis].floor().to_i32().ok_or_else(|| {
                    PbxError::Box(
                        ErrorInfo::new("image-out-of-range", "periodic image does not fit in i32")
                            .with_context("axis", axis.to_string())
                            .with_context("fractional", fractional[axis].to_string()),
                    )
                })?;
            }
        }
        Ok(image)
    }

    /// Wraps `absolute` into the home image of the box.
    ///
    /// Coordinates along non-periodic axes are left untouched.
    pub fn wrap(&self, absolute: &Vector3<f64>) -> Vector3<f64> {
        let mut fractional = self.make_fractional(absolute);
        for axis in 0..3 {
            if self.periodic[axis] {
                let mut folded = fractional[axis] - fractional[axis].floor();
                // floor of a tiny negative value can round the fold up to 1.0
                if folded >= 1.0 {
                    folded = 0.0;
                }
                fractional[axis] = folded;
            }
        }
        let mut wrapped = self.make_absolute(&fractional);
        for axis in 0..3 {
            if !self.periodic[axis] {
                wrapped[axis] = absolute[axis];
            }
        }
        wrapped
    }

    /// Undoes a wrap by translating `absolute` by `image` lattice vectors.
    pub fn unwrap(&self, absolute: &Vector3<f64>, image: [i32; 3]) -> Vector3<f64> {
        let shift = Vector3::new(image[0] as f64, image[1] as f64, image[2] as f64);
        absolute + self.to_matrix() * shift
    }

    /// Box with the lattice matrix multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Result<Self, PbxError> {
        Ok(Self::from_matrix(&(self.to_matrix() * factor))?.with_periodic(self.periodic))
    }

    /// Box whose lattice vectors are repeated `counts` times.
    pub fn replicated(&self, counts: [u32; 3]) -> Result<Self, PbxError> {
        let diagonal = Vector3::new(counts[0] as f64, counts[1] as f64, counts[2] as f64);
        let matrix = self.to_matrix() * Matrix3::from_diagonal(&diagonal);
        Ok(Self::from_matrix(&matrix)?.with_periodic(self.periodic))
    }
}

impl TryFrom<BoxParameters> for PeriodicBox {
    type Error = PbxError;

    fn try_from(params: BoxParameters) -> Result<Self, Self::Error> {
        Self::from_parameters(&params)
    }
}

impl From<PeriodicBox> for BoxParameters {
    fn from(value: PeriodicBox) -> Self {
        value.parameters()
    }
}
