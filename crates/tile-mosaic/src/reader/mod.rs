//! Reader identity: tile inputs, reader providers and the reader cache.
//!
//! Decoding pixels is left to format specific readers outside this crate. What
//! lives here is the part every mosaic driver needs regardless of format:
//! naming an input, naming the provider that can open it, and making sure the
//! same (provider, input) pair is only opened once.

mod cache;
mod key;

pub use cache::{ReaderCache, ReaderCacheStats};
pub use key::ReaderKey;

use mosaic_common::MosaicResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opaque input handle given to a tile reader.
///
/// Equality and hashing are structural, so two independently built inputs
/// naming the same file compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileInput {
    /// A file on the local filesystem.
    File(PathBuf),
    /// A remote resource.
    Url(String),
    /// Any other named resource (in-memory stores, database keys...).
    Named(String),
}

impl TileInput {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        TileInput::File(path.into())
    }

    pub fn url(url: impl Into<String>) -> Self {
        TileInput::Url(url.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        TileInput::Named(name.into())
    }

    /// The filesystem path, for file-backed inputs only.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            TileInput::File(path) => Some(path),
            _ => None,
        }
    }

    /// Short name for logs: the last path or URL segment.
    pub fn short_name(&self) -> &str {
        match self {
            TileInput::File(path) => path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default(),
            TileInput::Url(url) => url.rsplit('/').next().unwrap_or(url),
            TileInput::Named(name) => name,
        }
    }
}

impl fmt::Display for TileInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileInput::File(path) => write!(f, "{}", path.display()),
            TileInput::Url(url) => f.write_str(url),
            TileInput::Named(name) => f.write_str(name),
        }
    }
}

/// Stable identity of a reader provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(Arc<str>);

impl ProviderId {
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A factory of format specific tile readers.
///
/// The same provider is typically shared by every tile of a mosaic, but this
/// is not required.
pub trait ReaderProvider: fmt::Debug + Send + Sync {
    /// Identity used in reader cache keys.
    fn id(&self) -> ProviderId;

    /// Human readable format name ("png", "tiff"...).
    fn format_name(&self) -> &str;

    /// Size of the image at `image_index` in `input`, in pixels.
    ///
    /// Invoked lazily for tiles created without an explicit size.
    fn image_size(&self, input: &TileInput, image_index: u16) -> MosaicResult<(u32, u32)>;
}
