use std::fmt;

use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Edge lengths, tilt factors and flags describing a periodic box.
///
/// This is the serialized form of [`PeriodicBox`](crate::PeriodicBox) and the
/// payload of [`BoxLike::Parameters`](crate::BoxLike::Parameters). Values are
/// not validated until they are turned into a box.
///
/// Only the map form `{ lx, ly, ... }` deserializes; a bare sequence of
/// numbers is rejected so it cannot be mistaken for a list of lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxParameters {
    /// Length of the first lattice vector.
    pub lx: f64,
    /// Extent of the second lattice vector along y.
    pub ly: f64,
    /// Extent of the third lattice vector along z (0 for 2D boxes).
    #[serde(default)]
    pub lz: f64,
    /// Tilt of the second lattice vector along x, in units of `ly`.
    #[serde(default)]
    pub xy: f64,
    /// Tilt of the third lattice vector along x, in units of `lz`.
    #[serde(default)]
    pub xz: f64,
    /// Tilt of the third lattice vector along y, in units of `lz`.
    #[serde(default)]
    pub yz: f64,
    /// Explicit dimensionality flag. `None` infers 2D from `lz == 0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_2d: Option<bool>,
    /// Periodicity along each lattice vector.
    #[serde(default = "all_periodic")]
    pub periodic: [bool; 3],
}

impl<'de> Deserialize<'de> for BoxParameters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ParametersVisitor)
    }
}

struct ParametersVisitor;

impl<'de> Visitor<'de> for ParametersVisitor {
    type Value = BoxParameters;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of box parameters")
    }

    fn visit_map<M: MapAccess<'de>>(self, map: M) -> Result<Self::Value, M::Error> {
        ParameterFields::deserialize(MapAccessDeserializer::new(map)).map(Into::into)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterFields {
    lx: f64,
    ly: f64,
    #[serde(default)]
    lz: f64,
    #[serde(default)]
    xy: f64,
    #[serde(default)]
    xz: f64,
    #[serde(default)]
    yz: f64,
    #[serde(default)]
    is_2d: Option<bool>,
    #[serde(default = "all_periodic")]
    periodic: [bool; 3],
}

impl From<ParameterFields> for BoxParameters {
    fn from(fields: ParameterFields) -> Self {
        Self {
            lx: fields.lx,
            ly: fields.ly,
            lz: fields.lz,
            xy: fields.xy,
            xz: fields.xz,
            yz: fields.yz,
            is_2d: fields.is_2d,
            periodic: fields.periodic,
        }
    }
}

pub(crate) fn all_periodic() -> [bool; 3] {
    [true, true, true]
}

impl BoxParameters {
    /// Orthorhombic parameters with no tilt.
    pub fn orthorhombic(lx: f64, ly: f64, lz: f64) -> Self {
        Self {
            lx,
            ly,
            lz,
            xy: 0.0,
            xz: 0.0,
            yz: 0.0,
            is_2d: None,
            periodic: all_periodic(),
        }
    }

    /// Sets the three tilt factors.
    pub fn with_tilts(mut self, xy: f64, xz: f64, yz: f64) -> Self {
        self.xy = xy;
        self.xz = xz;
        self.yz = yz;
        self
    }

    /// Whether these parameters describe a 2D box.
    pub fn resolved_is_2d(&self) -> bool {
        self.is_2d.unwrap_or(self.lz == 0.0)
    }
}
