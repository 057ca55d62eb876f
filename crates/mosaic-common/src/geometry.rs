//! Pixel geometry in a mosaic's destination grid.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{MosaicError, MosaicResult};

/// An integer pixel location in the destination grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Add `delta` to a coordinate, rejecting results outside `i32`.
pub fn checked_offset(name: &'static str, value: i32, delta: i32) -> MosaicResult<i32> {
    value
        .checked_add(delta)
        .ok_or(MosaicError::ValueOutOfBounds {
            name,
            value: value as i64 + delta as i64,
            max: i32::MAX as i64,
        })
}

/// A rectangle of pixels: upper-left corner plus size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Create a region from its upper-left corner and size.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Upper-left corner.
    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// A region is empty when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Exclusive right edge.
    pub fn max_x(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn max_y(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Return a copy moved by the given offset.
    ///
    /// Fails when the moved corner no longer fits in `i32`.
    pub fn translated(&self, dx: i32, dy: i32) -> MosaicResult<Self> {
        Ok(Self {
            x: checked_offset("x", self.x, dx)?,
            y: checked_offset("y", self.y, dy)?,
            ..*self
        })
    }

    /// Check whether two regions share at least one pixel.
    pub fn intersects(&self, other: &Region) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && (self.x as i64) < other.max_x()
            && (other.x as i64) < self.max_x()
            && (self.y as i64) < other.max_y()
            && (other.y as i64) < self.max_y()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{}) {}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Integer stride per axis relative to the finest resolution.
///
/// A subsampling of (1,1) is the finest level. The value can also be read as a
/// relative pixel size. Both strides are at least 1, including for values
/// deserialized from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSubsampling")]
pub struct Subsampling {
    x: u32,
    y: u32,
}

#[derive(Deserialize)]
struct RawSubsampling {
    x: u32,
    y: u32,
}

impl TryFrom<RawSubsampling> for Subsampling {
    type Error = MosaicError;

    fn try_from(raw: RawSubsampling) -> Result<Self, Self::Error> {
        Subsampling::new(raw.x, raw.y)
    }
}

impl Subsampling {
    /// Subsampling of the finest level.
    pub const ONE: Subsampling = Subsampling { x: 1, y: 1 };

    /// Create a subsampling, rejecting zero strides.
    pub fn new(x: u32, y: u32) -> MosaicResult<Self> {
        if x == 0 || y == 0 {
            return Err(MosaicError::invariant(format!(
                "subsampling must be strictly positive, got ({}, {})",
                x, y
            )));
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    /// True when this stride is finer than `other` on at least one axis.
    pub fn is_finer_than(&self, other: &Subsampling) -> bool {
        self.x < other.x || self.y < other.y
    }
}

impl Default for Subsampling {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Subsampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_edges() {
        let region = Region::new(-10, 5, 20, 30);
        assert_eq!(region.max_x(), 10);
        assert_eq!(region.max_y(), 35);
        assert_eq!(region.area(), 600);
        assert_eq!(region.location(), Point::new(-10, 5));
    }

    #[test]
    fn test_region_translated() {
        let region = Region::new(0, 0, 4, 4).translated(3, -2).unwrap();
        assert_eq!(region, Region::new(3, -2, 4, 4));
    }

    #[test]
    fn test_region_translated_overflow() {
        let region = Region::new(i32::MAX - 1, 0, 4, 4);
        let err = region.translated(5, 0).unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(Region::new(i32::MIN, 0, 1, 1).translated(0, -1).is_ok());
        assert!(Region::new(0, i32::MIN, 1, 1).translated(0, -1).is_err());
    }

    #[test]
    fn test_region_intersects() {
        let a = Region::new(0, 0, 10, 10);
        assert!(a.intersects(&Region::new(9, 9, 5, 5)));
        assert!(!a.intersects(&Region::new(10, 0, 5, 5)));
        assert!(!a.intersects(&Region::new(2, 2, 0, 5)));
    }

    #[test]
    fn test_subsampling_rejects_zero() {
        assert!(Subsampling::new(0, 1).is_err());
        assert!(Subsampling::new(1, 0).is_err());
        let s = Subsampling::new(2, 3).unwrap();
        assert_eq!((s.x(), s.y()), (2, 3));
    }

    #[test]
    fn test_subsampling_deserialize_validates() {
        let err = serde_json::from_str::<Subsampling>(r#"{"x":0,"y":1}"#).unwrap_err();
        assert!(err.to_string().contains("subsampling"), "{err}");
        let s: Subsampling = serde_json::from_str(r#"{"x":4,"y":2}"#).unwrap();
        assert_eq!(s, Subsampling::new(4, 2).unwrap());
        assert_eq!(serde_json::to_string(&s).unwrap(), r#"{"x":4,"y":2}"#);
    }

    #[test]
    fn test_subsampling_finer() {
        let coarse = Subsampling::new(4, 4).unwrap();
        assert!(Subsampling::ONE.is_finer_than(&coarse));
        assert!(!coarse.is_finer_than(&Subsampling::ONE));
        assert!(Subsampling::new(4, 2).unwrap().is_finer_than(&coarse));
    }
}
