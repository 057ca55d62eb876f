//! Image type advertised by a mosaic as a whole.
//!
//! Every tile reader reports one raw type (its native storage layout) and the
//! list of types it can decode to. The mosaic must pick a type that all tiles
//! can be decoded into, or fall back to a fixed ARGB type without asking the
//! tiles at all.

use std::fmt;
use std::str::FromStr;

use mosaic_common::{MosaicError, MosaicResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    U8,
    U16,
    I16,
    I32,
    F32,
    F64,
}

/// Pixel layout of a decoded tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageType {
    pub sample_type: SampleType,
    pub bands: u16,
    pub has_alpha: bool,
}

impl ImageType {
    /// Four 8 bits bands, alpha included.
    pub const ARGB32: ImageType = ImageType {
        sample_type: SampleType::U8,
        bands: 4,
        has_alpha: true,
    };

    pub fn new(sample_type: SampleType, bands: u16, has_alpha: bool) -> Self {
        Self {
            sample_type,
            bands,
            has_alpha,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.has_alpha
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}x{}", self.sample_type, self.bands)?;
        if self.has_alpha {
            f.write_str("+alpha")?;
        }
        Ok(())
    }
}

/// Types reported by the reader of one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileImageTypes {
    pub raw: ImageType,
    pub supported: Vec<ImageType>,
}

impl TileImageTypes {
    pub fn new(raw: ImageType, supported: Vec<ImageType>) -> Self {
        Self { raw, supported }
    }
}

/// How the mosaic image type is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageTypePolicy {
    /// A type every tile supports.
    SupportedByAll,
    /// The type of one arbitrary tile, assumed to hold for every tile.
    SupportedByOne,
    /// Always [`ImageType::ARGB32`].
    AlwaysArgb,
}

impl ImageTypePolicy {
    pub const ALL: [ImageTypePolicy; 3] = [
        ImageTypePolicy::SupportedByAll,
        ImageTypePolicy::SupportedByOne,
        ImageTypePolicy::AlwaysArgb,
    ];

    /// Whether the choice is delegated to the tile readers.
    pub fn can_delegate(&self) -> bool {
        !matches!(self, ImageTypePolicy::AlwaysArgb)
    }

    /// The policy used when none is configured, after the number of distinct
    /// reader providers in the mosaic.
    pub fn default_for(provider_count: usize) -> Self {
        match provider_count {
            0 => ImageTypePolicy::AlwaysArgb,
            1 => ImageTypePolicy::SupportedByOne,
            _ => ImageTypePolicy::SupportedByAll,
        }
    }

    /// The fixed type of a non-delegating policy.
    pub fn predefined_type(&self) -> Option<ImageType> {
        match self {
            ImageTypePolicy::AlwaysArgb => Some(ImageType::ARGB32),
            _ => None,
        }
    }

    /// Raw type of the mosaic, `None` when the tiles share none.
    ///
    /// With `check_consistency`, a `SupportedByOne` answer is compared against
    /// the `SupportedByAll` one; see [`validate_supported_by_one`].
    pub fn raw_type(
        &self,
        tiles: &[TileImageTypes],
        check_consistency: bool,
    ) -> MosaicResult<Option<ImageType>> {
        let chosen = match self {
            ImageTypePolicy::AlwaysArgb => self.predefined_type(),
            ImageTypePolicy::SupportedByAll => supported_by_all(tiles),
            ImageTypePolicy::SupportedByOne if check_consistency => {
                validate_supported_by_one(tiles)?
            }
            ImageTypePolicy::SupportedByOne => supported_by_one(tiles),
        };
        debug!(policy = %self, tiles = tiles.len(), chosen = ?chosen, "Resolved mosaic image type");
        Ok(chosen)
    }

    /// Types the mosaic can be decoded to.
    pub fn image_types(
        &self,
        tiles: &[TileImageTypes],
        check_consistency: bool,
    ) -> MosaicResult<Vec<ImageType>> {
        match self {
            ImageTypePolicy::AlwaysArgb => Ok(vec![ImageType::ARGB32]),
            ImageTypePolicy::SupportedByAll => Ok(common_types(tiles)),
            ImageTypePolicy::SupportedByOne => {
                let types = tiles
                    .first()
                    .map(|tile| tile.supported.clone())
                    .unwrap_or_default();
                if check_consistency {
                    let common = common_types(tiles);
                    if let Some(missing) = types.iter().find(|t| !common.contains(t)) {
                        return Err(MosaicError::IncompatibleImageType(format!(
                            "type {} of the first tile is not supported by every tile",
                            missing
                        )));
                    }
                }
                Ok(types)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageTypePolicy::SupportedByAll => "SUPPORTED_BY_ALL",
            ImageTypePolicy::SupportedByOne => "SUPPORTED_BY_ONE",
            ImageTypePolicy::AlwaysArgb => "ALWAYS_ARGB",
        }
    }
}

impl fmt::Display for ImageTypePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageTypePolicy {
    type Err = MosaicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        ImageTypePolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str() == normalized)
            .ok_or_else(|| MosaicError::invalid_config(format!("unknown image type policy '{}'", s)))
    }
}

/// Supported types shared by every tile, in the order the first tile lists them.
fn common_types(tiles: &[TileImageTypes]) -> Vec<ImageType> {
    let Some((first, rest)) = tiles.split_first() else {
        return Vec::new();
    };
    let mut common: Vec<ImageType> = Vec::with_capacity(first.supported.len());
    for candidate in &first.supported {
        if !common.contains(candidate)
            && rest.iter().all(|tile| tile.supported.contains(candidate))
        {
            common.push(*candidate);
        }
    }
    common
}

/// Pick a raw type every tile can be decoded to.
///
/// Raw types are tried by decreasing frequency among the tiles, then the other
/// common types. Types with transparency are preferred over opaque ones, since
/// areas without tiles should stay transparent.
pub fn supported_by_all(tiles: &[TileImageTypes]) -> Option<ImageType> {
    let allowed = common_types(tiles);
    if allowed.is_empty() {
        return None;
    }

    let mut by_frequency: Vec<(ImageType, usize)> = Vec::new();
    for tile in tiles {
        match by_frequency.iter_mut().find(|(t, _)| *t == tile.raw) {
            Some((_, count)) => *count += 1,
            None => by_frequency.push((tile.raw, 1)),
        }
    }
    // Stable: ties keep first-seen order.
    by_frequency.sort_by(|a, b| b.1.cmp(&a.1));

    for transparent_only in [true, false] {
        let accepts = |t: &ImageType| !transparent_only || t.is_transparent();
        let raw = by_frequency
            .iter()
            .map(|(t, _)| *t)
            .find(|t| accepts(t) && allowed.contains(t));
        if raw.is_some() {
            return raw;
        }
        if let Some(t) = allowed.iter().copied().find(|t| accepts(t)) {
            return Some(t);
        }
    }
    None
}

/// Raw type of the first tile, trusted to be valid for every tile.
pub fn supported_by_one(tiles: &[TileImageTypes]) -> Option<ImageType> {
    tiles.first().map(|tile| tile.raw)
}

/// Like [`supported_by_one`], failing unless it agrees with [`supported_by_all`].
pub fn validate_supported_by_one(tiles: &[TileImageTypes]) -> MosaicResult<Option<ImageType>> {
    let one = supported_by_one(tiles);
    let all = supported_by_all(tiles);
    if one != all {
        let describe = |t: Option<ImageType>| t.map(|t| t.to_string()).unwrap_or_else(|| "none".into());
        return Err(MosaicError::IncompatibleImageType(format!(
            "{} chose {} but {} chose {}",
            ImageTypePolicy::SupportedByOne,
            describe(one),
            ImageTypePolicy::SupportedByAll,
            describe(all)
        )));
    }
    Ok(one)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAY: ImageType = ImageType {
        sample_type: SampleType::U8,
        bands: 1,
        has_alpha: false,
    };
    const RGB: ImageType = ImageType {
        sample_type: SampleType::U8,
        bands: 3,
        has_alpha: false,
    };
    const GRAY_ALPHA: ImageType = ImageType {
        sample_type: SampleType::U8,
        bands: 2,
        has_alpha: true,
    };

    fn tile(raw: ImageType, supported: &[ImageType]) -> TileImageTypes {
        TileImageTypes::new(raw, supported.to_vec())
    }

    #[test]
    fn test_default_for() {
        assert_eq!(ImageTypePolicy::default_for(0), ImageTypePolicy::AlwaysArgb);
        assert_eq!(ImageTypePolicy::default_for(1), ImageTypePolicy::SupportedByOne);
        assert_eq!(ImageTypePolicy::default_for(5), ImageTypePolicy::SupportedByAll);
    }

    #[test]
    fn test_can_delegate() {
        assert!(ImageTypePolicy::SupportedByAll.can_delegate());
        assert!(ImageTypePolicy::SupportedByOne.can_delegate());
        assert!(!ImageTypePolicy::AlwaysArgb.can_delegate());
        assert_eq!(
            ImageTypePolicy::AlwaysArgb.raw_type(&[], false).unwrap(),
            Some(ImageType::ARGB32)
        );
    }

    #[test]
    fn test_most_frequent_raw_wins() {
        let tiles = vec![
            tile(GRAY, &[GRAY, RGB]),
            tile(RGB, &[GRAY, RGB]),
            tile(RGB, &[RGB, GRAY]),
        ];
        assert_eq!(supported_by_all(&tiles), Some(RGB));
    }

    #[test]
    fn test_transparency_preferred() {
        let tiles = vec![
            tile(RGB, &[RGB, ImageType::ARGB32]),
            tile(RGB, &[ImageType::ARGB32, RGB]),
        ];
        assert_eq!(supported_by_all(&tiles), Some(ImageType::ARGB32));
    }

    #[test]
    fn test_transparent_raw_before_transparent_allowed() {
        let tiles = vec![
            tile(GRAY_ALPHA, &[ImageType::ARGB32, GRAY_ALPHA]),
            tile(GRAY, &[ImageType::ARGB32, GRAY_ALPHA, GRAY]),
            tile(GRAY, &[GRAY_ALPHA, ImageType::ARGB32]),
        ];
        assert_eq!(supported_by_all(&tiles), Some(GRAY_ALPHA));
    }

    #[test]
    fn test_no_common_type() {
        let tiles = vec![tile(GRAY, &[GRAY]), tile(RGB, &[RGB])];
        assert_eq!(supported_by_all(&tiles), None);
        assert_eq!(supported_by_all(&[]), None);
    }

    #[test]
    fn test_supported_by_one_consistency() {
        let consistent = vec![tile(RGB, &[RGB]), tile(RGB, &[RGB, GRAY])];
        assert_eq!(validate_supported_by_one(&consistent).unwrap(), Some(RGB));

        let inconsistent = vec![tile(GRAY, &[GRAY, RGB]), tile(RGB, &[RGB])];
        assert_eq!(supported_by_one(&inconsistent), Some(GRAY));
        let err = ImageTypePolicy::SupportedByOne
            .raw_type(&inconsistent, true)
            .unwrap_err();
        assert!(matches!(err, MosaicError::IncompatibleImageType(_)));
        assert_eq!(
            ImageTypePolicy::SupportedByOne
                .raw_type(&inconsistent, false)
                .unwrap(),
            Some(GRAY)
        );
    }

    #[test]
    fn test_image_types_lists() {
        let tiles = vec![tile(RGB, &[RGB, GRAY]), tile(RGB, &[GRAY, RGB])];
        assert_eq!(
            ImageTypePolicy::SupportedByAll.image_types(&tiles, false).unwrap(),
            vec![RGB, GRAY]
        );
        let partial = vec![tile(RGB, &[RGB, GRAY]), tile(RGB, &[RGB])];
        assert!(ImageTypePolicy::SupportedByOne.image_types(&partial, true).is_err());
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(
            "always-argb".parse::<ImageTypePolicy>().unwrap(),
            ImageTypePolicy::AlwaysArgb
        );
        assert!("any".parse::<ImageTypePolicy>().is_err());
    }
}
