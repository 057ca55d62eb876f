//! Grid-to-world transforms for subsampled tiles.

use mosaic_common::{Affine, MosaicResult, Point, Subsampling};

use crate::tile::Tile;

/// Transform of a tile moved by a pixel offset at a given subsampling.
///
/// `reference` maps finest level pixels to world coordinates. A translation
/// `d` in finest level pixels is split per axis into `q = d div s` and
/// `r = d mod s` (Euclidean, so `0 <= r < s`). The tile moves by `q` level
/// pixels and the remainder is folded into the transform:
///
/// ```text
/// grid_to_crs(p) = reference(p * s + r)
/// ```
///
/// so the moved tile origin lands exactly where the unsubsampled translation
/// would put it: `grid_to_crs(q) == reference(d)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslatedTransform {
    pub subsampling: Subsampling,
    pub quotient: Point,
    pub remainder: Point,
    pub grid_to_crs: Affine,
}

impl TranslatedTransform {
    pub fn derive(reference: &Affine, subsampling: Subsampling, dx: i32, dy: i32) -> Self {
        let sx = subsampling.x() as i64;
        let sy = subsampling.y() as i64;
        let (dx, dy) = (dx as i64, dy as i64);
        // |d| / s with s >= 1 always fits back in i32, and 0 <= r < s.
        let quotient = Point::new(dx.div_euclid(sx) as i32, dy.div_euclid(sy) as i32);
        let remainder = Point::new(dx.rem_euclid(sx) as i32, dy.rem_euclid(sy) as i32);
        let grid_to_crs = reference
            .translate(remainder.x as f64, remainder.y as f64)
            .scale(sx as f64, sy as f64);
        Self {
            subsampling,
            quotient,
            remainder,
            grid_to_crs,
        }
    }

    /// Move the tile by the quotient and install the derived transform.
    ///
    /// The translation drops any previous transform, so installing the new one
    /// cannot conflict. A tile whose location would overflow is left as is.
    pub fn apply_to(&self, tile: &mut Tile) -> MosaicResult<()> {
        tile.translate(self.quotient.x, self.quotient.y)?;
        tile.set_grid_to_crs(self.grid_to_crs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(x: u32, y: u32) -> Subsampling {
        Subsampling::new(x, y).unwrap()
    }

    #[test]
    fn test_identity_example() {
        let t = TranslatedTransform::derive(&Affine::IDENTITY, s(3, 3), 7, -4);
        assert_eq!(t.quotient, Point::new(2, -2));
        assert_eq!(t.remainder, Point::new(1, 2));
        assert_eq!(t.grid_to_crs.apply(2.0, -2.0), (7.0, -4.0));
        assert_eq!(t.grid_to_crs.apply(0.0, 0.0), (1.0, 2.0));
    }

    #[test]
    fn test_remainder_always_non_negative() {
        for d in -20..20 {
            let t = TranslatedTransform::derive(&Affine::IDENTITY, s(4, 5), d, d);
            assert!((0..4).contains(&t.remainder.x));
            assert!((0..5).contains(&t.remainder.y));
            assert_eq!(t.quotient.x * 4 + t.remainder.x, d);
            assert_eq!(t.quotient.y * 5 + t.remainder.y, d);
        }
    }

    #[test]
    fn test_unit_subsampling_keeps_reference() {
        let reference = Affine::from_origin(-180.0, 90.0, 0.25, 0.25);
        let t = TranslatedTransform::derive(&reference, Subsampling::ONE, 13, 9);
        assert_eq!(t.remainder, Point::new(0, 0));
        assert_eq!(t.quotient, Point::new(13, 9));
        assert!(t.grid_to_crs.approx_eq(&reference, 1e-12));
    }

    #[test]
    fn test_georeferenced_origin() {
        let reference = Affine::from_origin(-180.0, 90.0, 0.5, 0.5);
        let t = TranslatedTransform::derive(&reference, s(2, 4), 5, 7);
        let (x, y) = t.grid_to_crs.apply(t.quotient.x as f64, t.quotient.y as f64);
        let (ex, ey) = reference.apply(5.0, 7.0);
        assert!((x - ex).abs() < 1e-9);
        assert!((y - ey).abs() < 1e-9);
        // One level pixel spans two finest pixels horizontally.
        assert!((t.grid_to_crs.a - 1.0).abs() < 1e-12);
        assert!((t.grid_to_crs.e + 2.0).abs() < 1e-12);
    }
}
