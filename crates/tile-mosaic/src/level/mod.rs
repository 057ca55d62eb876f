//! Overview levels of a mosaic pyramid.
//!
//! A pyramid is a linear chain of levels, from the coarsest (the root) down to
//! the finest at subsampling (1,1). Each level is a grid of tiles that may
//! contain holes.

mod pattern;
mod pyramid;

pub use pattern::{PatternKind, TilePattern};
pub use pyramid::Pyramid;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use mosaic_common::{Affine, MosaicError, MosaicResult, Point, Region, Subsampling};

use crate::reader::ReaderProvider;
use crate::tile::Tile;
use crate::transform::TranslatedTransform;

/// A node of a mosaic pyramid, as seen by traversal.
pub trait OverviewLevel {
    fn num_tile_columns(&self) -> u32;

    fn num_tile_rows(&self) -> u32;

    /// The tile at a grid cell.
    ///
    /// `Ok(None)` is a hole. An error is a failed lookup of this cell only.
    fn tile_at(&self, column: u32, row: u32) -> MosaicResult<Option<Tile>>;

    /// The next finer level, or `None` at the finest level.
    fn finer_level(&self) -> Option<&Self>;
}

/// Regular grid of equally sized tiles.
///
/// Tiles are either inserted explicitly per cell or generated on demand from a
/// [`TilePattern`]. The grid origin is given in finest level pixels so that a
/// coarse level can start at an offset that is not a multiple of its
/// subsampling; generated tiles get their location and, when the level has a
/// reference transform, their grid-to-world transform through
/// [`TranslatedTransform`].
#[derive(Debug, Clone)]
pub struct GridLevel {
    ordinal: u32,
    subsampling: Subsampling,
    tile_size: (u32, u32),
    offset: Point,
    columns: u32,
    rows: u32,
    provider: Arc<dyn ReaderProvider>,
    image_index: u32,
    pattern: Option<TilePattern>,
    tiles: HashMap<(u32, u32), Tile>,
    holes: HashSet<(u32, u32)>,
    reference: Option<Affine>,
    finer: Option<Box<GridLevel>>,
}

impl GridLevel {
    /// Create a level of `columns` x `rows` tiles of `tile_size` level pixels.
    pub fn new(
        provider: Arc<dyn ReaderProvider>,
        subsampling: Subsampling,
        tile_size: (u32, u32),
        columns: u32,
        rows: u32,
    ) -> MosaicResult<Self> {
        if tile_size.0 == 0 || tile_size.1 == 0 {
            return Err(MosaicError::invariant(format!(
                "tile size must be strictly positive, got {}x{}",
                tile_size.0, tile_size.1
            )));
        }
        Ok(Self {
            ordinal: 0,
            subsampling,
            tile_size,
            offset: Point::default(),
            columns,
            rows,
            provider,
            image_index: 0,
            pattern: None,
            tiles: HashMap::new(),
            holes: HashSet::new(),
            reference: None,
            finer: None,
        })
    }

    /// Grid origin in finest level pixels.
    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_pattern(mut self, pattern: TilePattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn with_image_index(mut self, image_index: u32) -> Self {
        self.image_index = image_index;
        self
    }

    /// Grid-to-world transform of the finest level pixels.
    pub fn with_reference(mut self, reference: Affine) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Mark a cell as having no tile, even if the pattern would name one.
    pub fn with_hole(mut self, column: u32, row: u32) -> Self {
        self.holes.insert((column, row));
        self
    }

    /// Put an explicit tile at a cell, taking precedence over the pattern.
    pub fn insert_tile(&mut self, column: u32, row: u32, tile: Tile) -> MosaicResult<()> {
        self.check_cell(column, row)?;
        self.holes.remove(&(column, row));
        self.tiles.insert((column, row), tile);
        Ok(())
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn subsampling(&self) -> Subsampling {
        self.subsampling
    }

    pub fn tile_size(&self) -> (u32, u32) {
        self.tile_size
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn pattern(&self) -> Option<&TilePattern> {
        self.pattern.as_ref()
    }

    pub fn provider(&self) -> &Arc<dyn ReaderProvider> {
        &self.provider
    }

    /// Number of cells, holes included.
    pub fn num_cells(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    pub(crate) fn set_ordinal(&mut self, ordinal: u32) {
        self.ordinal = ordinal;
    }

    pub(crate) fn set_finer(&mut self, finer: Option<GridLevel>) {
        self.finer = finer.map(Box::new);
    }

    fn check_cell(&self, column: u32, row: u32) -> MosaicResult<()> {
        if column >= self.columns {
            return Err(MosaicError::ValueOutOfBounds {
                name: "column",
                value: column as i64,
                max: self.columns as i64 - 1,
            });
        }
        if row >= self.rows {
            return Err(MosaicError::ValueOutOfBounds {
                name: "row",
                value: row as i64,
                max: self.rows as i64 - 1,
            });
        }
        Ok(())
    }

    /// Translation of a cell's upper-left corner in finest level pixels.
    fn cell_translation(&self, column: u32, row: u32) -> MosaicResult<(i32, i32)> {
        let dx = self.offset.x as i64
            + column as i64 * self.tile_size.0 as i64 * self.subsampling.x() as i64;
        let dy = self.offset.y as i64
            + row as i64 * self.tile_size.1 as i64 * self.subsampling.y() as i64;
        let fit = |name: &'static str, value: i64| {
            i32::try_from(value).map_err(|_| MosaicError::ValueOutOfBounds {
                name,
                value,
                max: i32::MAX as i64,
            })
        };
        Ok((fit("dx", dx)?, fit("dy", dy)?))
    }

    fn generate(&self, pattern: &TilePattern, column: u32, row: u32) -> MosaicResult<Tile> {
        let input = pattern.format(self.ordinal, column, row)?;
        let (width, height) = self.tile_size;
        let mut tile = Tile::with_region(
            Arc::clone(&self.provider),
            input,
            self.image_index,
            Region::new(0, 0, width, height),
            Some(self.subsampling),
        )?;
        let (dx, dy) = self.cell_translation(column, row)?;
        let derived = TranslatedTransform::derive(
            &self.reference.unwrap_or_default(),
            self.subsampling,
            dx,
            dy,
        );
        match self.reference {
            Some(_) => derived.apply_to(&mut tile)?,
            None => tile.translate(derived.quotient.x, derived.quotient.y)?,
        }
        Ok(tile)
    }
}

impl OverviewLevel for GridLevel {
    fn num_tile_columns(&self) -> u32 {
        self.columns
    }

    fn num_tile_rows(&self) -> u32 {
        self.rows
    }

    fn tile_at(&self, column: u32, row: u32) -> MosaicResult<Option<Tile>> {
        self.check_cell(column, row)?;
        if let Some(tile) = self.tiles.get(&(column, row)) {
            return Ok(Some(tile.clone()));
        }
        if self.holes.contains(&(column, row)) {
            return Ok(None);
        }
        match &self.pattern {
            Some(pattern) => self.generate(pattern, column, row).map(Some),
            None => Ok(None),
        }
    }

    fn finer_level(&self) -> Option<&Self> {
        self.finer.as_deref()
    }
}
