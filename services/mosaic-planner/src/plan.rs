//! Builds the pyramid described on the command line and plans its tiles.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use mosaic_common::{Affine, MosaicError, MosaicResult, Point, Subsampling};
use rayon::prelude::*;
use serde::Serialize;
use tile_mosaic::{
    GridLevel, OverviewLevel, ProviderId, Pyramid, ReaderKey, ReaderProvider, TileInput,
    TilePattern, TileWritingPolicy, WriteDecision,
};
use tracing::{debug, info};

/// One `--level SX:SY:COLS:ROWS` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSpec {
    pub subsampling: Subsampling,
    pub columns: u32,
    pub rows: u32,
}

impl FromStr for LevelSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 4 {
            return Err(format!("expected SX:SY:COLS:ROWS, got '{}'", s));
        }
        let mut values = [0u32; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part
                .trim()
                .parse()
                .map_err(|_| format!("'{}' is not a non-negative integer in '{}'", part, s))?;
        }
        let subsampling = Subsampling::new(values[0], values[1]).map_err(|e| e.to_string())?;
        Ok(Self {
            subsampling,
            columns: values[2],
            rows: values[3],
        })
    }
}

/// Parse `WxH` (or `W,H`) into a pair.
pub fn parse_pair<T: FromStr>(s: &str) -> Result<(T, T), String> {
    let (a, b) = s
        .split_once(['x', ','])
        .ok_or_else(|| format!("expected two values like 256x256, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<T>()
            .map_err(|_| format!("'{}' is not a valid value in '{}'", v, s))
    };
    Ok((parse(a)?, parse(b)?))
}

/// Provider for planned tiles. Sizes come from the level layout, so nothing is
/// ever opened.
#[derive(Debug)]
pub struct PlannedProvider {
    format: String,
}

impl PlannedProvider {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
        }
    }
}

impl ReaderProvider for PlannedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::new(&self.format)
    }

    fn format_name(&self) -> &str {
        &self.format
    }

    fn image_size(&self, _input: &TileInput, _image_index: u16) -> MosaicResult<(u32, u32)> {
        Err(MosaicError::Unsupported("planned tiles are never opened"))
    }
}

/// Everything needed to lay the pyramid out.
#[derive(Debug, Clone)]
pub struct Layout {
    pub levels: Vec<LevelSpec>,
    pub pattern: TilePattern,
    pub tile_size: (u32, u32),
    pub offset: Point,
    pub reference: Option<Affine>,
    pub format: String,
}

impl Layout {
    pub fn build(&self) -> MosaicResult<Pyramid> {
        let provider: Arc<dyn ReaderProvider> = Arc::new(PlannedProvider::new(&self.format));
        let levels = self
            .levels
            .iter()
            .map(|spec| -> MosaicResult<GridLevel> {
                let level = GridLevel::new(
                    Arc::clone(&provider),
                    spec.subsampling,
                    self.tile_size,
                    spec.columns,
                    spec.rows,
                )?
                .with_pattern(self.pattern.clone())
                .with_offset(self.offset);
                Ok(match self.reference {
                    Some(reference) => level.with_reference(reference),
                    None => level,
                })
            })
            .collect::<MosaicResult<Vec<_>>>()?;
        Pyramid::from_levels(levels)
    }
}

/// Counts for one level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LevelPlan {
    pub ordinal: u32,
    pub subsampling: String,
    pub columns: u32,
    pub rows: u32,
    pub tiles: usize,
    pub to_write: usize,
    pub skip_existing: usize,
    pub disabled: usize,
}

/// Planning outcome for the whole pyramid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub policy: TileWritingPolicy,
    pub levels: Vec<LevelPlan>,
    pub total_tiles: usize,
    pub total_to_write: usize,
    pub distinct_inputs: usize,
    pub skipped_cells: usize,
}

/// Traverse `pyramid` and decide, before any encoding, which tiles are due.
///
/// Emptiness is only known after decoding, so `SkipEmpty` never shows up here.
pub fn plan(pyramid: &Pyramid, policy: TileWritingPolicy) -> MosaicResult<Plan> {
    let mut traversal = pyramid.traverse();
    let tiles = traversal.by_ref().collect::<MosaicResult<Vec<_>>>()?;
    let skipped_cells = traversal.skipped_cells();
    debug!(tiles = tiles.len(), skipped_cells, "Pyramid traversed");

    let index: HashMap<Subsampling, usize> = pyramid
        .levels()
        .enumerate()
        .map(|(i, level)| (level.subsampling(), i))
        .collect();
    let mut levels: Vec<LevelPlan> = pyramid
        .levels()
        .map(|level| LevelPlan {
            ordinal: level.ordinal(),
            subsampling: level.subsampling().to_string(),
            columns: level.num_tile_columns(),
            rows: level.num_tile_rows(),
            ..LevelPlan::default()
        })
        .collect();

    let decisions: Vec<WriteDecision> = tiles
        .par_iter()
        .map(|tile| policy.check_output(tile.input()))
        .collect();

    let mut distinct = HashSet::with_capacity(tiles.len());
    for (tile, decision) in tiles.iter().zip(&decisions) {
        distinct.insert(tile.reader_key());
        let Some(&i) = index.get(&tile.subsampling()) else {
            continue;
        };
        let level = &mut levels[i];
        level.tiles += 1;
        match decision {
            WriteDecision::Write => level.to_write += 1,
            WriteDecision::SkipExisting => level.skip_existing += 1,
            WriteDecision::Disabled => level.disabled += 1,
            WriteDecision::SkipEmpty => {}
        }
    }

    let plan = Plan {
        policy,
        total_tiles: tiles.len(),
        total_to_write: levels.iter().map(|l| l.to_write).sum(),
        distinct_inputs: distinct.len(),
        skipped_cells,
        levels,
    };
    info!(
        policy = %plan.policy,
        total_tiles = plan.total_tiles,
        to_write = plan.total_to_write,
        "Plan complete"
    );
    Ok(plan)
}

/// Distinct reader keys, for callers that only need deduplication.
pub fn distinct_keys(pyramid: &Pyramid) -> MosaicResult<HashSet<ReaderKey>> {
    pyramid
        .traverse()
        .map(|tile| tile.map(|t| t.reader_key()))
        .collect()
}

/// Human readable report.
pub fn render_text(plan: &Plan) -> String {
    let mut out = format!("Tile writing policy: {}\n", plan.policy);
    out.push_str("level  subsampling  grid        tiles   write    exists   disabled\n");
    for level in &plan.levels {
        out.push_str(&format!(
            "{:<6} {:<12} {:<11} {:<7} {:<8} {:<8} {}\n",
            level.ordinal,
            level.subsampling,
            format!("{}x{}", level.columns, level.rows),
            level.tiles,
            level.to_write,
            level.skip_existing,
            level.disabled
        ));
    }
    out.push_str(&format!(
        "total: {} tiles, {} to write, {} distinct inputs, {} unreadable cells\n",
        plan.total_tiles, plan.total_to_write, plan.distinct_inputs, plan.skipped_cells
    ));
    out
}
