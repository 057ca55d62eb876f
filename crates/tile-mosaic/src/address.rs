//! Packed tile position and size.
//!
//! Big mosaics hold millions of tiles, so the size of each tile is stored in
//! two unsigned 16 bits fields. The few tiles that need more (typically the
//! single oversized seed tile a mosaic is cut from) use the `Oversized`
//! variant, which keeps the true size next to the capped packed fields.

use mosaic_common::{checked_offset, MosaicError, MosaicResult, Point, Region};

/// Largest width or height the packed encoding can hold.
pub const MASK: u32 = 0xFFFF;

/// Position plus 16 bits size. A size of (0,0) means "not yet known".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CompactAddress {
    x: i32,
    y: i32,
    width: u16,
    height: u16,
}

impl CompactAddress {
    /// An address with a location and no size yet.
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            width: 0,
            height: 0,
        }
    }

    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The raw packed size, capped at `MASK`.
    pub fn packed_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    pub fn is_sized(&self) -> bool {
        self.width != 0 || self.height != 0
    }

    /// Leaves the address unchanged when either axis would overflow.
    fn translate(&mut self, dx: i32, dy: i32) -> MosaicResult<()> {
        let x = checked_offset("x", self.x, dx)?;
        let y = checked_offset("y", self.y, dy)?;
        self.x = x;
        self.y = y;
        Ok(())
    }

    fn store_size(&mut self, width: u32, height: u32) {
        self.width = width.min(MASK) as u16;
        self.height = height.min(MASK) as u16;
    }
}

/// Tile address with an escape path for sizes above `MASK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileAddress {
    Compact(CompactAddress),
    Oversized {
        packed: CompactAddress,
        width: u32,
        height: u32,
    },
}

impl TileAddress {
    /// An unsized address at the given location.
    pub fn at(location: Point) -> Self {
        TileAddress::Compact(CompactAddress::new(location.x, location.y))
    }

    /// An address covering the given region. The region must not be empty.
    pub fn from_region(region: &Region) -> MosaicResult<Self> {
        if region.is_empty() {
            return Err(MosaicError::invariant(format!(
                "tile region must not be empty: {}",
                region
            )));
        }
        let mut address = Self::at(region.location());
        address.set_size(region.width as i64, region.height as i64)?;
        Ok(address)
    }

    /// The packed fields, shared by both variants.
    pub fn packed(&self) -> &CompactAddress {
        match self {
            TileAddress::Compact(packed) => packed,
            TileAddress::Oversized { packed, .. } => packed,
        }
    }

    pub fn location(&self) -> Point {
        self.packed().location()
    }

    pub fn is_oversized(&self) -> bool {
        matches!(self, TileAddress::Oversized { .. })
    }

    /// The true size, or `None` when it has not been set yet.
    pub fn size(&self) -> Option<(u32, u32)> {
        match self {
            TileAddress::Compact(packed) if packed.is_sized() => Some(packed.packed_size()),
            TileAddress::Compact(_) => None,
            TileAddress::Oversized { width, height, .. } => Some((*width, *height)),
        }
    }

    /// The region with the true size substituted, or `None` when unsized.
    pub fn region(&self) -> Option<Region> {
        let location = self.location();
        self.size()
            .map(|(width, height)| Region::new(location.x, location.y, width, height))
    }

    /// Set the tile size, switching variant when a dimension exceeds `MASK`.
    ///
    /// Negative sizes are a contract breach and are rejected without touching
    /// the current address.
    pub fn set_size(&mut self, dx: i64, dy: i64) -> MosaicResult<()> {
        if dx < 0 || dy < 0 {
            return Err(MosaicError::NegativeSize {
                width: dx,
                height: dy,
            });
        }
        for (name, value) in [("width", dx), ("height", dy)] {
            if value > u32::MAX as i64 {
                return Err(MosaicError::ValueOutOfBounds {
                    name,
                    value,
                    max: u32::MAX as i64,
                });
            }
        }
        let (width, height) = (dx as u32, dy as u32);
        let mut packed = *self.packed();
        packed.store_size(width, height);
        *self = if width > MASK || height > MASK {
            TileAddress::Oversized {
                packed,
                width,
                height,
            }
        } else {
            TileAddress::Compact(packed)
        };
        Ok(())
    }

    pub fn translate(&mut self, dx: i32, dy: i32) -> MosaicResult<()> {
        match self {
            TileAddress::Compact(packed) => packed.translate(dx, dy),
            TileAddress::Oversized { packed, .. } => packed.translate(dx, dy),
        }
    }
}

impl Default for TileAddress {
    fn default() -> Self {
        TileAddress::Compact(CompactAddress::default())
    }
}
