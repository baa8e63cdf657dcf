//! Pixel mapping
//!
//! Where a canvas pixel lands in the chain depends on how the cells are
//! wired, which differs from build to build. The canvas only knows the
//! [`PixelMapping`] trait; [`PixelMap`] covers the stock wirings.

use dotclock_core::config::{ConfigError, DisplayConfig, Tiling, CELL_SIZE, MAX_DEVICES};

/// Physical location of one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CellAddress {
    /// Device index in the chain
    pub device: usize,
    /// Row register (0-7)
    pub row: u8,
    /// Bit within the row byte (7 = leftmost LED)
    pub bit: u8,
}

impl CellAddress {
    /// Row byte with only this pixel set
    pub const fn mask(&self) -> u8 {
        1 << self.bit
    }
}

/// Canvas pixel to device mapping
pub trait PixelMapping {
    /// Number of devices the mapping addresses
    fn device_count(&self) -> usize;

    /// Locate a canvas pixel
    ///
    /// Returns `None` for pixels outside the canvas or in a cell past the
    /// end of the chain.
    fn locate(&self, x: u16, y: u16) -> Option<CellAddress>;
}

/// Stock mapping for a single linear chain
///
/// Device `N-1` is the first cell in tiling order (top-left), because the
/// first word shifted out ends up in the farthest device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelMap {
    devices: usize,
    width: u16,
    height: u16,
    tiling: Tiling,
}

impl PixelMap {
    pub fn new(devices: usize, width: u16, height: u16, tiling: Tiling) -> Result<Self, ConfigError> {
        if devices == 0 || devices > MAX_DEVICES {
            return Err(ConfigError::InvalidChainLength);
        }
        if width == 0 || height == 0 || width % CELL_SIZE != 0 || height % CELL_SIZE != 0 {
            return Err(ConfigError::CanvasNotAligned);
        }
        Ok(Self {
            devices,
            width,
            height,
            tiling,
        })
    }

    pub fn from_config(config: &DisplayConfig) -> Result<Self, ConfigError> {
        Self::new(config.chain_length as usize, config.width, config.height, config.tiling)
    }

    pub fn tiling(&self) -> Tiling {
        self.tiling
    }
}

impl PixelMapping for PixelMap {
    fn device_count(&self) -> usize {
        self.devices
    }

    fn locate(&self, x: u16, y: u16) -> Option<CellAddress> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let (cell_x, cell_y) = ((x / CELL_SIZE) as usize, (y / CELL_SIZE) as usize);
        let (in_x, in_y) = ((x % CELL_SIZE) as u8, (y % CELL_SIZE) as u8);

        let cell = match self.tiling {
            Tiling::Horizontal => cell_y * (self.width / CELL_SIZE) as usize + cell_x,
            Tiling::Vertical | Tiling::VerticalFlip => {
                cell_x * (self.height / CELL_SIZE) as usize + cell_y
            }
        };
        if cell >= self.devices {
            return None;
        }

        // Flipped cells are rotated half a turn
        let (row, bit) = match self.tiling {
            Tiling::Horizontal | Tiling::Vertical => (in_y, 7 - in_x),
            Tiling::VerticalFlip => (7 - in_y, in_x),
        };

        Some(CellAddress {
            device: self.devices - 1 - cell,
            row,
            bit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    extern crate std;
    use std::collections::HashSet;

    const TILINGS: [Tiling; 3] = [Tiling::Horizontal, Tiling::Vertical, Tiling::VerticalFlip];

    #[test]
    fn test_origin_lands_in_last_device() {
        let map = PixelMap::new(4, 32, 16, Tiling::Horizontal).unwrap();
        assert_eq!(
            map.locate(0, 0),
            Some(CellAddress {
                device: 3,
                row: 0,
                bit: 7
            })
        );
        assert_eq!(map.locate(0, 0).unwrap().mask(), 0x80);
    }

    #[test]
    fn test_horizontal_layout() {
        let map = PixelMap::new(8, 32, 16, Tiling::Horizontal).unwrap();
        // Second cell of the top row
        assert_eq!(map.locate(8, 0).map(|a| a.device), Some(6));
        // First cell of the bottom row
        assert_eq!(map.locate(0, 8).map(|a| a.device), Some(3));
        // Bottom-right corner
        assert_eq!(
            map.locate(31, 15),
            Some(CellAddress {
                device: 0,
                row: 7,
                bit: 0
            })
        );
    }

    #[test]
    fn test_vertical_layout() {
        let map = PixelMap::new(8, 32, 16, Tiling::Vertical).unwrap();
        assert_eq!(map.locate(0, 8).map(|a| a.device), Some(6));
        assert_eq!(map.locate(8, 0).map(|a| a.device), Some(5));
    }

    #[test]
    fn test_vertical_flip_rotates_cell() {
        let map = PixelMap::new(8, 32, 16, Tiling::VerticalFlip).unwrap();
        assert_eq!(
            map.locate(0, 0),
            Some(CellAddress {
                device: 7,
                row: 7,
                bit: 0
            })
        );
        assert_eq!(
            map.locate(7, 7),
            Some(CellAddress {
                device: 7,
                row: 0,
                bit: 7
            })
        );
    }

    #[test]
    fn test_cells_past_chain_are_hidden() {
        let map = PixelMap::new(4, 32, 16, Tiling::Horizontal).unwrap();
        assert!(map.locate(31, 7).is_some());
        assert_eq!(map.locate(0, 8), None);
        assert_eq!(map.locate(32, 0), None);
        assert_eq!(map.locate(0, 16), None);
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert_eq!(
            PixelMap::new(0, 8, 8, Tiling::Horizontal),
            Err(ConfigError::InvalidChainLength)
        );
        assert_eq!(
            PixelMap::new(2, 12, 8, Tiling::Horizontal),
            Err(ConfigError::CanvasNotAligned)
        );
    }

    #[test]
    fn test_bijection_when_chain_covers_canvas() {
        for tiling in TILINGS {
            for (devices, width, height) in [(8, 32, 16), (4, 8, 32), (6, 48, 8), (16, 64, 16)] {
                let map = PixelMap::new(devices, width, height, tiling).unwrap();
                let mut seen = HashSet::new();
                for y in 0..height {
                    for x in 0..width {
                        let addr = map.locate(x, y).unwrap();
                        assert!(addr.device < devices && addr.row < 8 && addr.bit < 8);
                        assert!(seen.insert(addr), "{:?} mapped twice", addr);
                    }
                }
                assert_eq!(seen.len(), 64 * devices);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_locate_in_range(
            devices in 1usize..=16,
            cols in 1u16..=8,
            rows in 1u16..=4,
            x in 0u16..80,
            y in 0u16..40,
            tiling in 0usize..3,
        ) {
            let map = PixelMap::new(devices, cols * 8, rows * 8, TILINGS[tiling]).unwrap();
            if let Some(addr) = map.locate(x, y) {
                prop_assert!(x < cols * 8 && y < rows * 8);
                prop_assert!(addr.device < devices);
                prop_assert!(addr.row < 8);
                prop_assert!(addr.bit < 8);
            }
        }
    }
}
