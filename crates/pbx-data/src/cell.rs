use nalgebra::{Matrix3, Vector3};
use pbx_box::{convert_box, BoxLike, PeriodicBox};
use pbx_core::errors::{ErrorInfo, PbxError};
use serde::{Deserialize, Serialize};

/// Unit cell of a crystal: a lattice and a basis in fractional coordinates.
///
/// Cells are immutable once built. Basis positions are conventionally in
/// `[0, 1)` but this is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCell {
    #[serde(rename = "box")]
    sim_box: PeriodicBox,
    basis_positions: Vec<Vector3<f64>>,
}

impl UnitCell {
    /// Builds a cell from a box-like lattice and an owned basis.
    pub fn new(
        lattice: impl Into<BoxLike>,
        basis_positions: Vec<[f64; 3]>,
    ) -> Result<Self, PbxError> {
        let sim_box = convert_box(lattice)?;
        Self::from_parts(sim_box, basis_positions.into_iter().map(Vector3::from).collect())
    }

    /// Builds a cell with a single basis site at the origin.
    pub fn with_origin_basis(lattice: impl Into<BoxLike>) -> Result<Self, PbxError> {
        Self::new(lattice, vec![[0.0, 0.0, 0.0]])
    }

    /// Builds a cell from an existing box and basis.
    pub fn from_parts(
        sim_box: PeriodicBox,
        basis_positions: Vec<Vector3<f64>>,
    ) -> Result<Self, PbxError> {
        if let Some(index) = basis_positions
            .iter()
            .position(|site| site.iter().any(|value| !value.is_finite()))
        {
            return Err(PbxError::Geometry(
                ErrorInfo::new("basis-non-finite", "basis positions must be finite")
                    .with_context("index", index.to_string()),
            ));
        }
        Ok(Self {
            sim_box,
            basis_positions,
        })
    }

    /// Face-centered cubic cell on the unit cube.
    pub fn fcc() -> Self {
        Self::cubic(vec![
            Vector3::new(0.5, 0.5, 0.0),
            Vector3::new(0.5, 0.0, 0.5),
            Vector3::new(0.0, 0.5, 0.5),
            Vector3::new(0.0, 0.0, 0.0),
        ])
    }

    /// Body-centered cubic cell on the unit cube.
    pub fn bcc() -> Self {
        Self::cubic(vec![Vector3::new(0.5, 0.5, 0.5), Vector3::new(0.0, 0.0, 0.0)])
    }

    /// Simple cubic cell on the unit cube.
    pub fn sc() -> Self {
        Self::cubic(vec![Vector3::zeros()])
    }

    /// Square cell on the unit square.
    pub fn square() -> Self {
        Self {
            sim_box: PeriodicBox::unit_square(),
            basis_positions: vec![Vector3::zeros()],
        }
    }

    fn cubic(basis_positions: Vec<Vector3<f64>>) -> Self {
        Self {
            sim_box: PeriodicBox::unit_cube(),
            basis_positions,
        }
    }

    /// The lattice as a periodic box.
    pub fn sim_box(&self) -> &PeriodicBox {
        &self.sim_box
    }

    /// Matrix of lattice vectors (as columns).
    pub fn lattice_vectors(&self) -> Matrix3<f64> {
        self.sim_box.to_matrix()
    }

    /// First lattice vector.
    pub fn a1(&self) -> Vector3<f64> {
        self.sim_box.lattice_vectors()[0]
    }

    /// Second lattice vector.
    pub fn a2(&self) -> Vector3<f64> {
        self.sim_box.lattice_vectors()[1]
    }

    /// Third lattice vector.
    pub fn a3(&self) -> Vector3<f64> {
        self.sim_box.lattice_vectors()[2]
    }

    /// Basis positions in fractional coordinates.
    pub fn basis_positions(&self) -> &[Vector3<f64>] {
        &self.basis_positions
    }

    /// Number of basis sites.
    pub fn num_basis(&self) -> usize {
        self.basis_positions.len()
    }

    /// Dimensionality of the cell, 2 or 3.
    pub fn dimensions(&self) -> usize {
        self.sim_box.dimensions()
    }
}
