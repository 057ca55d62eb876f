//! Forward-only enumeration of every tile of a pyramid.
//!
//! The traversal scans the root level column by column, then row by row, then
//! moves to the next finer level, until the finest level is exhausted. It holds
//! one lookahead tile and the current cell, nothing else.
//!
//! Cells fall in three cases, see [`CellLookup`]. A failed lookup of a single
//! cell (an unreadable or malformed input) is handed to a failure handler and
//! the cell is skipped. A contract breach raised by a level (see
//! [`MosaicError::is_invariant_violation`]) ends the traversal and is returned
//! by the next call to [`LevelTraversal::next_tile`].

use std::fmt;
use std::iter::FusedIterator;

use mosaic_common::{MosaicError, MosaicResult};
use tracing::{debug, warn};

use crate::level::OverviewLevel;
use crate::tile::Tile;

/// Outcome of looking up one grid cell.
#[derive(Debug)]
pub enum CellLookup {
    Tile(Tile),
    Empty,
    Failed(MosaicError),
}

impl From<MosaicResult<Option<Tile>>> for CellLookup {
    fn from(result: MosaicResult<Option<Tile>>) -> Self {
        match result {
            Ok(Some(tile)) => CellLookup::Tile(tile),
            Ok(None) => CellLookup::Empty,
            Err(e) => CellLookup::Failed(e),
        }
    }
}

/// A grid cell: depth below the root level, column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPosition {
    pub depth: usize,
    pub column: u32,
    pub row: u32,
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {} cell ({},{})", self.depth, self.column, self.row)
    }
}

type FailureHandler<'a> = Box<dyn FnMut(CellPosition, &MosaicError) + 'a>;

/// Iterator over the tiles of a level and all its finer levels.
pub struct LevelTraversal<'a, L: OverviewLevel> {
    level: Option<&'a L>,
    depth: usize,
    x: u32,
    y: u32,
    pending: Option<Tile>,
    fault: Option<MosaicError>,
    on_failure: FailureHandler<'a>,
    skipped: usize,
}

impl<'a, L: OverviewLevel> LevelTraversal<'a, L> {
    /// Start at `root`, logging skipped cells at `warn` level.
    pub fn new(root: &'a L) -> Self {
        Self::with_failure_handler(root, |position, error| {
            warn!(
                depth = position.depth,
                column = position.column,
                row = position.row,
                error = %error,
                "Skipping tile that could not be looked up"
            );
        })
    }

    /// Start at `root`, reporting skipped cells to `on_failure`.
    pub fn with_failure_handler<F>(root: &'a L, on_failure: F) -> Self
    where
        F: FnMut(CellPosition, &MosaicError) + 'a,
    {
        let mut traversal = Self {
            level: Some(root),
            depth: 0,
            x: 0,
            y: 0,
            pending: None,
            fault: None,
            on_failure: Box::new(on_failure),
            skipped: 0,
        };
        traversal.pending = traversal.advance();
        traversal
    }

    pub fn has_next(&self) -> bool {
        self.pending.is_some() || self.fault.is_some()
    }

    /// Return the lookahead tile and look the following one up.
    pub fn next_tile(&mut self) -> MosaicResult<Tile> {
        if let Some(tile) = self.pending.take() {
            self.pending = self.advance();
            return Ok(tile);
        }
        match self.fault.take() {
            Some(fault) => Err(fault),
            None => Err(MosaicError::ExhaustedTraversal),
        }
    }

    /// Tiles cannot be removed from a pyramid through its traversal.
    pub fn remove(&mut self) -> MosaicResult<()> {
        Err(MosaicError::Unsupported("removing tiles during traversal"))
    }

    /// Number of cells whose lookup failed so far.
    pub fn skipped_cells(&self) -> usize {
        self.skipped
    }

    fn advance(&mut self) -> Option<Tile> {
        while let Some(level) = self.level {
            let columns = level.num_tile_columns();
            let rows = level.num_tile_rows();
            while self.y < rows {
                while self.x < columns {
                    let position = CellPosition {
                        depth: self.depth,
                        column: self.x,
                        row: self.y,
                    };
                    self.x += 1;
                    match CellLookup::from(level.tile_at(position.column, position.row)) {
                        CellLookup::Tile(tile) => return Some(tile),
                        CellLookup::Empty => {}
                        CellLookup::Failed(error) if error.is_invariant_violation() => {
                            debug!(%position, error = %error, "Traversal aborted");
                            self.fault = Some(error);
                            self.level = None;
                            return None;
                        }
                        CellLookup::Failed(error) => {
                            self.skipped += 1;
                            (self.on_failure)(position, &error);
                        }
                    }
                }
                self.x = 0;
                self.y += 1;
            }
            self.y = 0;
            self.level = level.finer_level();
            self.depth += 1;
            if let Some(finer) = self.level {
                debug!(
                    depth = self.depth,
                    columns = finer.num_tile_columns(),
                    rows = finer.num_tile_rows(),
                    "Traversal entering finer level"
                );
            }
        }
        None
    }
}

impl<'a, L: OverviewLevel> Iterator for LevelTraversal<'a, L> {
    type Item = MosaicResult<Tile>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            Some(self.next_tile())
        } else {
            None
        }
    }
}

impl<'a, L: OverviewLevel> FusedIterator for LevelTraversal<'a, L> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{ProviderId, ReaderProvider, TileInput};
    use mosaic_common::{MosaicResult, Region};
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Noop;

    impl ReaderProvider for Noop {
        fn id(&self) -> ProviderId {
            ProviderId::new("noop")
        }

        fn format_name(&self) -> &str {
            "noop"
        }

        fn image_size(&self, _input: &TileInput, _index: u16) -> MosaicResult<(u32, u32)> {
            Ok((1, 1))
        }
    }

    enum Cell {
        Tile,
        Fail,
        Breach,
    }

    struct Grid {
        columns: u32,
        rows: u32,
        cells: HashMap<(u32, u32), Cell>,
        finer: Option<Box<Grid>>,
    }

    impl Grid {
        fn full(columns: u32, rows: u32) -> Self {
            let mut cells = HashMap::new();
            for y in 0..rows {
                for x in 0..columns {
                    cells.insert((x, y), Cell::Tile);
                }
            }
            Self {
                columns,
                rows,
                cells,
                finer: None,
            }
        }
    }

    impl OverviewLevel for Grid {
        fn num_tile_columns(&self) -> u32 {
            self.columns
        }

        fn num_tile_rows(&self) -> u32 {
            self.rows
        }

        fn tile_at(&self, column: u32, row: u32) -> MosaicResult<Option<Tile>> {
            match self.cells.get(&(column, row)) {
                Some(Cell::Tile) => Tile::with_region(
                    Arc::new(Noop),
                    TileInput::named(format!("{}-{}", column, row)),
                    0,
                    Region::new(column as i32, row as i32, 1, 1),
                    None,
                )
                .map(Some),
                Some(Cell::Fail) => Err(MosaicError::Io("unreadable".to_string())),
                Some(Cell::Breach) => Err(MosaicError::invariant("corrupt layout")),
                None => Ok(None),
            }
        }

        fn finer_level(&self) -> Option<&Self> {
            self.finer.as_deref()
        }
    }

    fn names(traversal: LevelTraversal<'_, Grid>) -> Vec<String> {
        traversal
            .map(|tile| tile.unwrap().input().to_string())
            .collect()
    }

    #[test]
    fn test_row_major_then_finer() {
        let mut root = Grid::full(2, 1);
        root.finer = Some(Box::new(Grid::full(1, 2)));
        assert_eq!(
            names(LevelTraversal::new(&root)),
            vec!["0-0", "1-0", "0-0", "0-1"]
        );
    }

    #[test]
    fn test_failures_are_skipped_and_reported() {
        let mut root = Grid::full(3, 1);
        root.cells.insert((1, 0), Cell::Fail);
        let mut reported = Vec::new();
        let mut traversal =
            LevelTraversal::with_failure_handler(&root, |position, _| reported.push(position));
        let mut seen = Vec::new();
        while traversal.has_next() {
            seen.push(traversal.next_tile().unwrap().input().to_string());
        }
        assert_eq!(traversal.skipped_cells(), 1);
        drop(traversal);
        assert_eq!(seen, vec!["0-0", "2-0"]);
        assert_eq!(
            reported,
            vec![CellPosition {
                depth: 0,
                column: 1,
                row: 0
            }]
        );
    }

    #[test]
    fn test_exhaustion() {
        let root = Grid::full(1, 1);
        let mut traversal = LevelTraversal::new(&root);
        assert!(traversal.next_tile().is_ok());
        assert!(!traversal.has_next());
        assert!(matches!(
            traversal.next_tile(),
            Err(MosaicError::ExhaustedTraversal)
        ));
        assert!(traversal.next().is_none());
    }

    #[test]
    fn test_zero_sized_levels_skipped() {
        let mut root = Grid::full(0, 5);
        let mut middle = Grid::full(3, 0);
        middle.finer = Some(Box::new(Grid::full(1, 1)));
        root.finer = Some(Box::new(middle));
        assert_eq!(names(LevelTraversal::new(&root)), vec!["0-0"]);
    }

    #[test]
    fn test_breach_ends_traversal() {
        let mut root = Grid::full(3, 1);
        root.cells.insert((1, 0), Cell::Breach);
        root.finer = Some(Box::new(Grid::full(1, 1)));
        let results: Vec<_> = LevelTraversal::new(&root).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].as_ref().unwrap_err().is_invariant_violation());
    }

    #[test]
    fn test_remove_unsupported() {
        let root = Grid::full(1, 1);
        let mut traversal = LevelTraversal::new(&root);
        assert!(matches!(traversal.remove(), Err(MosaicError::Unsupported(_))));
        assert!(traversal.has_next());
    }
}
