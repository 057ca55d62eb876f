//! Common types shared across the tile mosaic crates.
//!
//! Everything here is plain data with no I/O: pixel geometry in a mosaic's
//! destination grid, the grid-to-world affine transform, and the error type
//! used by every crate in the workspace.

pub mod affine;
pub mod error;
pub mod geometry;

pub use affine::Affine;
pub use error::{MosaicError, MosaicResult};
pub use geometry::{checked_offset, Point, Region, Subsampling};
