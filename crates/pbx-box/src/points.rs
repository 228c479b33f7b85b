use nalgebra::Vector3;
use ndarray::{Array2, ArrayBase, Data, Dimension};
use num_traits::AsPrimitive;
use pbx_array::convert_points_array;
use pbx_core::errors::PbxError;

use crate::periodic::PeriodicBox;

impl PeriodicBox {
    /// Applies [`make_absolute`](Self::make_absolute) to every row of an `N x 3` array.
    pub fn make_absolute_points<A, S, D>(
        &self,
        fractional: &ArrayBase<S, D>,
    ) -> Result<Array2<f64>, PbxError>
    where
        S: Data<Elem = A>,
        D: Dimension,
        A: AsPrimitive<f64>,
    {
        self.map_rows(fractional, |point| self.make_absolute(point))
    }

    /// Applies [`make_fractional`](Self::make_fractional) to every row.
    pub fn make_fractional_points<A, S, D>(
        &self,
        absolute: &ArrayBase<S, D>,
    ) -> Result<Array2<f64>, PbxError>
    where
        S: Data<Elem = A>,
        D: Dimension,
        A: AsPrimitive<f64>,
    {
        self.map_rows(absolute, |point| self.make_fractional(point))
    }

    /// Applies [`wrap`](Self::wrap) to every row.
    pub fn wrap_points<A, S, D>(&self, absolute: &ArrayBase<S, D>) -> Result<Array2<f64>, PbxError>
    where
        S: Data<Elem = A>,
        D: Dimension,
        A: AsPrimitive<f64>,
    {
        self.map_rows(absolute, |point| self.wrap(point))
    }

    fn map_rows<A, S, D, F>(&self, points: &ArrayBase<S, D>, op: F) -> Result<Array2<f64>, PbxError>
    where
        S: Data<Elem = A>,
        D: Dimension,
        A: AsPrimitive<f64>,
        F: Fn(&Vector3<f64>) -> Vector3<f64>,
    {
        let mut out: Array2<f64> = convert_points_array(points)?;
        for mut row in out.rows_mut() {
            let mapped = op(&Vector3::new(row[0], row[1], row[2]));
            row[0] = mapped.x;
            row[1] = mapped.y;
            row[2] = mapped.z;
        }
        Ok(out)
    }
}
