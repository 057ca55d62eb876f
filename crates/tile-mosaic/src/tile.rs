//! A single tile of a mosaic.

use std::fmt;
use std::sync::Arc;

use mosaic_common::{Affine, MosaicError, MosaicResult, Point, Region, Subsampling};

use crate::address::{TileAddress, MASK};
use crate::reader::{ReaderKey, ReaderProvider, TileInput};

/// A rectangular region of the destination mosaic backed by one image.
///
/// Locations and sizes are expressed in pixels of the tile's own level, that is
/// in units of its subsampling. A tile built from a location only learns its
/// size from its provider the first time it is asked for its region.
#[derive(Clone)]
pub struct Tile {
    provider: Arc<dyn ReaderProvider>,
    input: TileInput,
    image_index: u16,
    subsampling: Subsampling,
    address: TileAddress,
    grid_to_crs: Option<Affine>,
}

impl Tile {
    /// Create a tile whose size is read lazily from the provider.
    pub fn at_location(
        provider: Arc<dyn ReaderProvider>,
        input: TileInput,
        image_index: u32,
        location: Point,
        subsampling: Option<Subsampling>,
    ) -> MosaicResult<Self> {
        Ok(Self {
            provider,
            input,
            image_index: check_u16("image_index", image_index)?,
            subsampling: check_subsampling(subsampling.unwrap_or_default())?,
            address: TileAddress::at(location),
            grid_to_crs: None,
        })
    }

    /// Create a tile covering an explicit region.
    pub fn with_region(
        provider: Arc<dyn ReaderProvider>,
        input: TileInput,
        image_index: u32,
        region: Region,
        subsampling: Option<Subsampling>,
    ) -> MosaicResult<Self> {
        let mut tile = Self::at_location(
            provider,
            input,
            image_index,
            region.location(),
            subsampling,
        )?;
        tile.address = TileAddress::from_region(&region)?;
        Ok(tile)
    }

    /// Create a tile sized after its backing image.
    ///
    /// When `declared` is given its size must match the image exactly; a
    /// mismatch means the mosaic layout and the file disagree and is reported as
    /// an invariant violation.
    pub fn from_image(
        provider: Arc<dyn ReaderProvider>,
        input: TileInput,
        image_index: u32,
        declared: Option<Region>,
    ) -> MosaicResult<Self> {
        let index = check_u16("image_index", image_index)?;
        let (width, height) = provider.image_size(&input, index)?;
        let location = declared.map(|r| r.location()).unwrap_or_default();
        let actual = Region::new(location.x, location.y, width, height);
        if let Some(declared) = declared {
            if declared != actual {
                return Err(MosaicError::invariant(format!(
                    "declared region {} does not match image region {} for {}",
                    declared, actual, input
                )));
            }
        }
        Self::with_region(provider, input, image_index, actual, None)
    }

    /// Copy of this tile with another input and/or region.
    ///
    /// The grid-to-world transform is kept only when the region is unchanged.
    pub fn derive(&self, input: Option<TileInput>, region: Option<Region>) -> MosaicResult<Self> {
        let mut tile = self.clone();
        if let Some(input) = input {
            tile.input = input;
        }
        if let Some(region) = region {
            tile.address = TileAddress::from_region(&region)?;
            tile.grid_to_crs = None;
        }
        Ok(tile)
    }

    pub fn provider(&self) -> &Arc<dyn ReaderProvider> {
        &self.provider
    }

    pub fn input(&self) -> &TileInput {
        &self.input
    }

    pub fn image_index(&self) -> u16 {
        self.image_index
    }

    pub fn subsampling(&self) -> Subsampling {
        self.subsampling
    }

    pub fn address(&self) -> &TileAddress {
        &self.address
    }

    pub fn location(&self) -> Point {
        self.address.location()
    }

    pub fn grid_to_crs(&self) -> Option<&Affine> {
        self.grid_to_crs.as_ref()
    }

    /// Whether the size is known without asking the provider.
    pub fn is_sized(&self) -> bool {
        self.address.size().is_some()
    }

    /// The tile region, asking the provider for the size if not known yet.
    ///
    /// The lookup result is not stored; see [`Tile::resolve_region`].
    pub fn region(&self) -> MosaicResult<Region> {
        if let Some(region) = self.address.region() {
            return Ok(region);
        }
        let (width, height) = self.provider.image_size(&self.input, self.image_index)?;
        let location = self.location();
        Ok(Region::new(location.x, location.y, width, height))
    }

    /// Like [`Tile::region`], caching the looked up size in the address.
    pub fn resolve_region(&mut self) -> MosaicResult<Region> {
        if let Some(region) = self.address.region() {
            return Ok(region);
        }
        let region = self.region()?;
        self.address
            .set_size(region.width as i64, region.height as i64)?;
        Ok(region)
    }

    /// The region in finest level pixels (region times subsampling).
    pub fn absolute_region(&self) -> MosaicResult<Region> {
        let region = self.region()?;
        let sx = self.subsampling.x() as i64;
        let sy = self.subsampling.y() as i64;
        Ok(Region::new(
            fit_i32("x", region.x as i64 * sx)?,
            fit_i32("y", region.y as i64 * sy)?,
            fit_u32("width", region.width as i64 * sx)?,
            fit_u32("height", region.height as i64 * sy)?,
        ))
    }

    /// Move the tile. Any assigned transform no longer matches and is dropped.
    ///
    /// A move that would overflow the location fails and changes nothing.
    pub fn translate(&mut self, dx: i32, dy: i32) -> MosaicResult<()> {
        self.address.translate(dx, dy)?;
        self.grid_to_crs = None;
        Ok(())
    }

    /// Assign the grid-to-world transform.
    ///
    /// Assigning the transform already held is a no-op; replacing a different
    /// one is rejected.
    pub fn set_grid_to_crs(&mut self, transform: Affine) -> MosaicResult<()> {
        match self.grid_to_crs {
            Some(current) if current != transform => Err(MosaicError::TransformConflict),
            _ => {
                self.grid_to_crs = Some(transform);
                Ok(())
            }
        }
    }

    /// Resize the tile. Negative dimensions are rejected.
    pub fn set_size(&mut self, dx: i64, dy: i64) -> MosaicResult<()> {
        self.address.set_size(dx, dy)
    }

    /// Key identifying the reader this tile is decoded with.
    pub fn reader_key(&self) -> ReaderKey {
        ReaderKey::new(self.provider.id(), self.input.clone())
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tile")
            .field("provider", &self.provider.id())
            .field("input", &self.input)
            .field("image_index", &self.image_index)
            .field("subsampling", &self.subsampling)
            .field("address", &self.address)
            .field("grid_to_crs", &self.grid_to_crs)
            .finish()
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self.location();
        write!(
            f,
            "{}[{}] @ ({},{}) s={}",
            self.input.short_name(),
            self.image_index,
            location.x,
            location.y,
            self.subsampling
        )
    }
}

fn check_u16(name: &'static str, value: u32) -> MosaicResult<u16> {
    if value > MASK {
        return Err(MosaicError::ValueOutOfBounds {
            name,
            value: value as i64,
            max: MASK as i64,
        });
    }
    Ok(value as u16)
}

fn check_subsampling(subsampling: Subsampling) -> MosaicResult<Subsampling> {
    check_u16("xSubsampling", subsampling.x())?;
    check_u16("ySubsampling", subsampling.y())?;
    Ok(subsampling)
}

fn fit_i32(name: &'static str, value: i64) -> MosaicResult<i32> {
    i32::try_from(value).map_err(|_| MosaicError::ValueOutOfBounds {
        name,
        value,
        max: i32::MAX as i64,
    })
}

fn fit_u32(name: &'static str, value: i64) -> MosaicResult<u32> {
    u32::try_from(value).map_err(|_| MosaicError::ValueOutOfBounds {
        name,
        value,
        max: u32::MAX as i64,
    })
}
