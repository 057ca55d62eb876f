//! Multi-Resolution Tile Mosaic Core
//!
//! This crate manages a large logical raster assembled from many small tile
//! files organized into a pyramid of overview levels. It does not decode
//! pixels; it provides:
//!
//! - **Compact addressing**: tile size packed in 16 bits fields, with an
//!   escape path for oversized tiles
//! - **Pyramid traversal**: every tile of every level, coarsest first,
//!   tolerant of unreadable cells
//! - **Transform derivation**: exact grid-to-world transforms for subsampled
//!   tiles
//! - **Reader caching**: each (provider, input) pair opened at most once
//! - **Write policies**: resumable bulk generation that skips existing or
//!   empty tiles
//!
//! # Architecture
//!
//! ```text
//! Pyramid::from_levels(levels)
//!      │
//!      ▼
//! LevelTraversal (root level, row-major, then finer levels)
//!      │
//!      ├─► OverviewLevel::tile_at(col, row)
//!      │         │
//!      │         ├─► Tile: yielded
//!      │         ├─► Empty: skipped
//!      │         └─► Failed: reported to the failure handler, skipped
//!      │
//!      ▼
//! Tile ──► reader_key() ──► ReaderCache::get_or_open
//!      │
//!      ├─► TranslatedTransform::apply_to (location + grid_to_crs)
//!      │
//!      └─► TileWritingPolicy::decide (write / skip existing / skip empty)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tile_mosaic::{GridLevel, Pyramid, TilePattern, TileWritingPolicy};
//!
//! let levels = vec![
//!     GridLevel::new(provider.clone(), Subsampling::new(2, 2)?, (256, 256), 2, 2)?
//!         .with_pattern(TilePattern::file("tiles/L{level}_{x}_{y}.png")),
//!     GridLevel::new(provider, Subsampling::ONE, (256, 256), 4, 4)?
//!         .with_pattern(TilePattern::file("tiles/L{level}_{x}_{y}.png")),
//! ];
//! let pyramid = Pyramid::from_levels(levels)?;
//!
//! for tile in pyramid.traverse() {
//!     let tile = tile?;
//!     if TileWritingPolicy::WriteNewsOnly.needs_write(tile.input()) {
//!         // encode the tile
//!     }
//! }
//! ```

pub mod address;
pub mod config;
pub mod level;
pub mod policy;
pub mod reader;
pub mod tile;
pub mod transform;
pub mod traversal;

// Re-export commonly used types at crate root
pub use address::{CompactAddress, TileAddress, MASK};
pub use config::MosaicConfig;
pub use level::{GridLevel, OverviewLevel, PatternKind, Pyramid, TilePattern};
pub use policy::{
    is_empty, supported_by_all, supported_by_one, validate_supported_by_one, ImageType,
    ImageTypePolicy, SampleType, TileImageTypes, TileWritingPolicy, WriteDecision, FILL_VALUE,
};
pub use reader::{ProviderId, ReaderCache, ReaderCacheStats, ReaderKey, ReaderProvider, TileInput};
pub use tile::Tile;
pub use transform::TranslatedTransform;
pub use traversal::{CellLookup, CellPosition, LevelTraversal};

pub use mosaic_common::{Affine, MosaicError, MosaicResult, Point, Region, Subsampling};
