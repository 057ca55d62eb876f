//! Grid-to-world affine transform.
//!
//! Coefficients follow the rasterio/GDAL row convention:
//!
//! ```text
//! world_x = a * col + b * row + c
//! world_y = d * col + e * row + f
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D affine transform mapping pixel grid coordinates to world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    /// Pixel width (x scale)
    pub a: f64,
    /// Row rotation
    pub b: f64,
    /// X translation
    pub c: f64,
    /// Column rotation
    pub d: f64,
    /// Pixel height (y scale, usually negative for north-up grids)
    pub e: f64,
    /// Y translation
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 1.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform from an origin and pixel size.
    pub fn from_origin(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new(pixel_width, 0.0, origin_x, 0.0, -pixel_height, origin_y)
    }

    /// Concatenate a scale applied in grid space before this transform.
    ///
    /// The result maps `(col, row)` to `self.apply(col * sx, row * sy)`.
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self {
            a: self.a * sx,
            b: self.b * sy,
            c: self.c,
            d: self.d * sx,
            e: self.e * sy,
            f: self.f,
        }
    }

    /// Concatenate a translation applied in grid space before this transform.
    ///
    /// The result maps `(col, row)` to `self.apply(col + tx, row + ty)`.
    pub fn translate(&self, tx: f64, ty: f64) -> Self {
        Self {
            c: self.a * tx + self.b * ty + self.c,
            f: self.d * tx + self.e * ty + self.f,
            ..*self
        }
    }

    /// Map a grid coordinate to world coordinates.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Compare every coefficient within `tolerance`.
    pub fn approx_eq(&self, other: &Affine, tolerance: f64) -> bool {
        (self.a - other.a).abs() <= tolerance
            && (self.b - other.b).abs() <= tolerance
            && (self.c - other.c).abs() <= tolerance
            && (self.d - other.d).abs() <= tolerance
            && (self.e - other.e).abs() <= tolerance
            && (self.f - other.f).abs() <= tolerance
    }

    /// True when the transform has no rotation terms.
    pub fn is_rectilinear(&self) -> bool {
        self.b == 0.0 && self.d == 0.0
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}; {}, {}, {}]",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}
