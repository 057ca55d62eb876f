//! Chains grid levels into a pyramid.

use mosaic_common::{MosaicError, MosaicResult, Subsampling};
use tracing::debug;

use super::{GridLevel, OverviewLevel};
use crate::traversal::LevelTraversal;

/// A validated chain of grid levels, coarsest first.
#[derive(Debug, Clone)]
pub struct Pyramid {
    root: GridLevel,
    num_levels: usize,
}

impl Pyramid {
    /// Link `levels`, given coarsest first.
    ///
    /// Subsampling must strictly decrease from one level to the next without
    /// increasing on either axis, and the last level must be at (1,1). Ordinals
    /// are assigned from the finest level (0) upwards.
    pub fn from_levels(levels: Vec<GridLevel>) -> MosaicResult<Self> {
        if levels.is_empty() {
            return Err(MosaicError::invalid_pyramid("a pyramid needs at least one level"));
        }
        for pair in levels.windows(2) {
            let (coarse, fine) = (pair[0].subsampling(), pair[1].subsampling());
            if !fine.is_finer_than(&coarse) || coarse.is_finer_than(&fine) {
                return Err(MosaicError::invalid_pyramid(format!(
                    "subsampling {} cannot follow {}",
                    fine, coarse
                )));
            }
        }
        let finest = levels[levels.len() - 1].subsampling();
        if finest != Subsampling::ONE {
            return Err(MosaicError::invalid_pyramid(format!(
                "finest level must have subsampling 1:1, got {}",
                finest
            )));
        }
        for level in &levels {
            if let Some(pattern) = level.pattern() {
                pattern
                    .validate()
                    .map_err(|e| MosaicError::invalid_pyramid(e.to_string()))?;
            }
        }

        let num_levels = levels.len();
        let mut finer: Option<GridLevel> = None;
        for (ordinal, mut level) in levels.into_iter().rev().enumerate() {
            level.set_ordinal(ordinal as u32);
            level.set_finer(finer.take());
            finer = Some(level);
        }
        let root = finer.ok_or_else(|| MosaicError::invalid_pyramid("no root level"))?;
        debug!(
            levels = num_levels,
            root_subsampling = %root.subsampling(),
            "Pyramid linked"
        );
        Ok(Self { root, num_levels })
    }

    pub fn root(&self) -> &GridLevel {
        &self.root
    }

    pub fn num_levels(&self) -> usize {
        self.num_levels
    }

    /// Levels from coarsest to finest.
    pub fn levels(&self) -> impl Iterator<Item = &GridLevel> {
        std::iter::successors(Some(&self.root), |level| level.finer_level())
    }

    /// Total number of grid cells, holes included.
    pub fn num_cells(&self) -> u64 {
        self.levels().map(GridLevel::num_cells).sum()
    }

    /// A fresh traversal over every tile, coarsest level first.
    pub fn traverse(&self) -> LevelTraversal<'_, GridLevel> {
        LevelTraversal::new(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::TilePattern;
    use crate::reader::{ProviderId, ReaderProvider, TileInput};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Square;

    impl ReaderProvider for Square {
        fn id(&self) -> ProviderId {
            ProviderId::new("square")
        }

        fn format_name(&self) -> &str {
            "raw"
        }

        fn image_size(&self, _input: &TileInput, _index: u16) -> MosaicResult<(u32, u32)> {
            Ok((16, 16))
        }
    }

    fn level(sx: u32, sy: u32, n: u32) -> GridLevel {
        GridLevel::new(
            Arc::new(Square),
            Subsampling::new(sx, sy).unwrap(),
            (16, 16),
            n,
            n,
        )
        .unwrap()
        .with_pattern(TilePattern::file("L{level}_{x}_{y}"))
    }

    #[test]
    fn test_ordinals_and_chain() {
        let pyramid = Pyramid::from_levels(vec![level(4, 4, 1), level(2, 2, 2), level(1, 1, 4)])
            .unwrap();
        assert_eq!(pyramid.num_levels(), 3);
        let ordinals: Vec<u32> = pyramid.levels().map(|l| l.ordinal()).collect();
        assert_eq!(ordinals, vec![2, 1, 0]);
        assert_eq!(pyramid.num_cells(), 1 + 4 + 16);
        assert_eq!(pyramid.root().subsampling(), Subsampling::new(4, 4).unwrap());
    }

    #[test]
    fn test_traverse_counts_every_tile() {
        let pyramid = Pyramid::from_levels(vec![level(2, 2, 2), level(1, 1, 3)]).unwrap();
        let tiles: Vec<_> = pyramid.traverse().collect::<MosaicResult<_>>().unwrap();
        assert_eq!(tiles.len(), 4 + 9);
        assert_eq!(tiles[0].input(), &TileInput::file("L1_0_0"));
        assert_eq!(tiles[4].input(), &TileInput::file("L0_0_0"));
    }

    #[test]
    fn test_anisotropic_steps_allowed() {
        assert!(Pyramid::from_levels(vec![level(4, 2, 1), level(2, 2, 1), level(1, 1, 1)]).is_ok());
    }

    #[test]
    fn test_rejects_bad_ordering() {
        let err = Pyramid::from_levels(vec![level(1, 1, 4), level(2, 2, 2)]).unwrap_err();
        assert!(matches!(err, MosaicError::InvalidPyramid(_)));
        assert!(Pyramid::from_levels(vec![level(2, 2, 1), level(2, 2, 1), level(1, 1, 1)]).is_err());
        assert!(Pyramid::from_levels(vec![level(4, 1, 1), level(2, 2, 1), level(1, 1, 1)]).is_err());
    }

    #[test]
    fn test_rejects_coarse_finest() {
        assert!(Pyramid::from_levels(vec![level(4, 4, 1), level(2, 2, 1)]).is_err());
        assert!(Pyramid::from_levels(Vec::new()).is_err());
    }

    #[test]
    fn test_rejects_bad_pattern() {
        let bad = level(1, 1, 1).with_pattern(TilePattern::file("t_{q}"));
        assert!(Pyramid::from_levels(vec![bad]).is_err());
    }
}
