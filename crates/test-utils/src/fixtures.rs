//! Reader providers and overview levels for traversal tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mosaic_common::{MosaicError, MosaicResult, Region};
use tile_mosaic::{OverviewLevel, ProviderId, ReaderProvider, Tile, TileInput};

/// Provider answering image sizes from a table.
///
/// Inputs not in the table get `default_size` if set, an I/O error otherwise.
#[derive(Debug)]
pub struct MemoryProvider {
    id: String,
    sizes: HashMap<TileInput, (u32, u32)>,
    default_size: Option<(u32, u32)>,
    size_lookups: AtomicUsize,
}

impl MemoryProvider {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            sizes: HashMap::new(),
            default_size: None,
            size_lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_image(mut self, input: TileInput, width: u32, height: u32) -> Self {
        self.sizes.insert(input, (width, height));
        self
    }

    pub fn with_default_size(mut self, width: u32, height: u32) -> Self {
        self.default_size = Some((width, height));
        self
    }

    /// Number of `image_size` calls so far.
    pub fn size_lookups(&self) -> usize {
        self.size_lookups.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl ReaderProvider for MemoryProvider {
    fn id(&self) -> ProviderId {
        ProviderId::new(&self.id)
    }

    fn format_name(&self) -> &str {
        "memory"
    }

    fn image_size(&self, input: &TileInput, _image_index: u16) -> MosaicResult<(u32, u32)> {
        self.size_lookups.fetch_add(1, Ordering::SeqCst);
        self.sizes
            .get(input)
            .copied()
            .or(self.default_size)
            .ok_or_else(|| MosaicError::Io(format!("no such image: {}", input)))
    }
}

/// What a scripted cell answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedCell {
    Tile,
    Empty,
    /// A recoverable lookup failure.
    Fail(String),
    /// An invariant violation.
    Breach(String),
}

/// Overview level whose cells answer from a script.
///
/// Tiles are named `"{label}/{column}_{row}"` and are one pixel wide.
#[derive(Debug)]
pub struct ScriptedLevel {
    label: String,
    columns: u32,
    rows: u32,
    cells: HashMap<(u32, u32), ScriptedCell>,
    finer: Option<Box<ScriptedLevel>>,
    provider: Arc<MemoryProvider>,
    lookups: AtomicUsize,
}

impl ScriptedLevel {
    /// A level where every cell holds a tile.
    pub fn full(label: &str, columns: u32, rows: u32) -> Self {
        let mut cells = HashMap::new();
        for row in 0..rows {
            for column in 0..columns {
                cells.insert((column, row), ScriptedCell::Tile);
            }
        }
        Self {
            label: label.to_string(),
            columns,
            rows,
            cells,
            finer: None,
            provider: MemoryProvider::new("scripted").with_default_size(1, 1).shared(),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_cell(mut self, column: u32, row: u32, cell: ScriptedCell) -> Self {
        self.cells.insert((column, row), cell);
        self
    }

    pub fn with_finer(mut self, finer: ScriptedLevel) -> Self {
        self.finer = Some(Box::new(finer));
        self
    }

    /// Link `levels`, given coarsest first.
    pub fn chain(levels: Vec<ScriptedLevel>) -> Option<ScriptedLevel> {
        levels
            .into_iter()
            .rev()
            .fold(None, |finer, level| match finer {
                Some(finer) => Some(level.with_finer(finer)),
                None => Some(level),
            })
    }

    /// Total `tile_at` calls on this level.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Input name of the tile at a cell.
    pub fn tile_name(&self, column: u32, row: u32) -> String {
        format!("{}/{}_{}", self.label, column, row)
    }

    /// Names of the cells holding a tile, in row-major order.
    pub fn expected_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for row in 0..self.rows {
            for column in 0..self.columns {
                if self.cells.get(&(column, row)) == Some(&ScriptedCell::Tile) {
                    names.push(self.tile_name(column, row));
                }
            }
        }
        if let Some(finer) = &self.finer {
            names.extend(finer.expected_names());
        }
        names
    }
}

impl OverviewLevel for ScriptedLevel {
    fn num_tile_columns(&self) -> u32 {
        self.columns
    }

    fn num_tile_rows(&self) -> u32 {
        self.rows
    }

    fn tile_at(&self, column: u32, row: u32) -> MosaicResult<Option<Tile>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.cells.get(&(column, row)) {
            Some(ScriptedCell::Tile) => Tile::with_region(
                self.provider.clone(),
                TileInput::named(self.tile_name(column, row)),
                0,
                Region::new(column as i32, row as i32, 1, 1),
                None,
            )
            .map(Some),
            Some(ScriptedCell::Empty) | None => Ok(None),
            Some(ScriptedCell::Fail(reason)) => Err(MosaicError::malformed(reason.clone())),
            Some(ScriptedCell::Breach(reason)) => Err(MosaicError::invariant(reason.clone())),
        }
    }

    fn finer_level(&self) -> Option<&Self> {
        self.finer.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_provider_sizes() {
        let provider = MemoryProvider::new("mem").with_image(TileInput::named("a"), 3, 4);
        assert_eq!(provider.image_size(&TileInput::named("a"), 0).unwrap(), (3, 4));
        assert!(provider.image_size(&TileInput::named("b"), 0).is_err());
        assert_eq!(provider.size_lookups(), 2);
    }

    #[test]
    fn test_chain_and_expected_names() {
        let root = ScriptedLevel::chain(vec![
            ScriptedLevel::full("c", 1, 1),
            ScriptedLevel::full("f", 2, 1).with_cell(0, 0, ScriptedCell::Empty),
        ])
        .unwrap();
        assert_eq!(root.expected_names(), vec!["c/0_0", "f/1_0"]);
        assert!(root.finer_level().is_some());
    }
}
