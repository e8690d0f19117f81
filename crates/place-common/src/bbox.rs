//! Bounding box and point types.

use serde::{Deserialize, Serialize};

use crate::error::{PlaceError, PlaceResult};

/// A geographic bounding box in (lon, lat) degrees.
///
/// Invariant: `xmin <= xmax` and `ymin <= ymax`, all coordinates finite.
/// Derived fresh from the current viewport on each refresh; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Create a bounding box from corner coordinates.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> PlaceResult<Self> {
        for (name, v) in [("xmin", xmin), ("ymin", ymin), ("xmax", xmax), ("ymax", ymax)] {
            if !v.is_finite() {
                return Err(PlaceError::InvalidArgument(format!(
                    "{} must be finite, got {}",
                    name, v
                )));
            }
        }
        if xmin > xmax {
            return Err(PlaceError::InvalidArgument(format!(
                "xmin {} exceeds xmax {}",
                xmin, xmax
            )));
        }
        if ymin > ymax {
            return Err(PlaceError::InvalidArgument(format!(
                "ymin {} exceeds ymax {}",
                ymin, ymax
            )));
        }

        Ok(Self {
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    /// Width of the bounding box in degrees.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height of the bounding box in degrees.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Check if a point is contained within this bbox.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
}

/// A single geographic coordinate in (lon, lat) degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a point, rejecting non-finite coordinates.
    pub fn new(x: f64, y: f64) -> PlaceResult<Self> {
        if !x.is_finite() || !y.is_finite() {
            return Err(PlaceError::InvalidArgument(format!(
                "point coordinates must be finite, got ({}, {})",
                x, y
            )));
        }
        Ok(Self { x, y })
    }
}
