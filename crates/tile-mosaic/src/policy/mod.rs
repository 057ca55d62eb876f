//! Mosaic-wide policies: what gets written, and which image type is advertised.

mod image_type;
mod writing;

pub use image_type::{
    supported_by_all, supported_by_one, validate_supported_by_one, ImageType, ImageTypePolicy,
    SampleType, TileImageTypes,
};
pub use writing::{is_empty, TileWritingPolicy, WriteDecision, FILL_VALUE};
