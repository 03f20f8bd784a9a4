//! Four-coordinate bounding box

use super::format::BoxFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Four box coordinates. Their meaning depends on the [`BoxFormat`] they are used with.
///
/// Coordinate ordering (`x1 <= x2`, `w >= 0`) is expected but not enforced; area and
/// overlap computations degrade toward zero on malformed input instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox(pub [f64; 4]);

impl BBox {
    /// Create a new bounding box
    pub fn new(c0: f64, c1: f64, c2: f64, c3: f64) -> Self {
        Self([c0, c1, c2, c3])
    }

    /// Build from a coordinate slice, which must hold exactly four values
    pub fn from_slice(coords: &[f64]) -> Result<Self> {
        let coords: [f64; 4] = coords.try_into().map_err(|_| {
            Error::invalid(format!(
                "a box needs exactly 4 coordinates, got {}",
                coords.len()
            ))
        })?;
        Ok(Self(coords))
    }

    pub fn coords(&self) -> [f64; 4] {
        self.0
    }

    /// Corner coordinates `(x1, y1, x2, y2)` of this box read as `format`
    pub fn to_corners(&self, format: BoxFormat) -> [f64; 4] {
        let [a, b, c, d] = self.0;
        match format {
            BoxFormat::Corners => [a, b, c, d],
            BoxFormat::Midpoint => [a - c / 2.0, b - d / 2.0, a + c / 2.0, b + d / 2.0],
        }
    }

    /// Re-encode a box given in `from` as `to`
    pub fn convert(&self, from: BoxFormat, to: BoxFormat) -> Self {
        let [x1, y1, x2, y2] = self.to_corners(from);
        match to {
            BoxFormat::Corners => Self([x1, y1, x2, y2]),
            BoxFormat::Midpoint => Self([(x1 + x2) / 2.0, (y1 + y2) / 2.0, x2 - x1, y2 - y1]),
        }
    }

    /// Area `|x2 - x1| * |y2 - y1|`
    pub fn area(&self, format: BoxFormat) -> f64 {
        let [x1, y1, x2, y2] = self.to_corners(format);
        ((x2 - x1) * (y2 - y1)).abs()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl From<[f64; 4]> for BBox {
    fn from(coords: [f64; 4]) -> Self {
        Self(coords)
    }
}
