//! Tile type descriptors and variant resolution

use crate::bitmask::NeighborMode;
use farm_map_core::{LayerIndex, LayerSet, RegistryKind, TileCode, TileCoord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pixel rectangle inside a sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The sprite sheet backing a tile type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSheet {
    /// Path to the image file (relative to the asset root)
    pub path: String,
    pub cell_width: u32,
    pub cell_height: u32,
    /// Total sheet size in pixels
    pub width: u32,
    pub height: u32,
}

impl SpriteSheet {
    pub fn new(path: impl Into<String>, cell_size: u32, columns: u32, rows: u32) -> Self {
        Self {
            path: path.into(),
            cell_width: cell_size,
            cell_height: cell_size,
            width: cell_size * columns,
            height: cell_size * rows,
        }
    }

    pub fn columns(&self) -> u32 {
        if self.cell_width == 0 {
            0
        } else {
            self.width / self.cell_width
        }
    }

    pub fn rows(&self) -> u32 {
        if self.cell_height == 0 {
            0
        } else {
            self.height / self.cell_height
        }
    }

    pub fn cell_count(&self) -> u32 {
        self.columns() * self.rows()
    }

    /// Pixel rectangle of a sheet cell, `None` if the index is past the sheet
    pub fn cell_rect(&self, index: u32) -> Option<SheetRect> {
        let columns = self.columns();
        if columns == 0 || index >= self.cell_count() {
            return None;
        }
        Some(SheetRect {
            x: (index % columns) * self.cell_width,
            y: (index / columns) * self.cell_height,
            width: self.cell_width,
            height: self.cell_height,
        })
    }
}

/// Weighted alternate sheet cells for one bitmask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    /// Candidate cells, one of which is picked when the variation triggers
    pub cells: Vec<u32>,
    /// Chance in `[0, 1]` that a position uses a candidate instead of the base cell
    pub probability: f32,
}

impl Variation {
    pub fn new(cells: Vec<u32>, probability: f32) -> Self {
        Self { cells, probability }
    }
}

/// A paintable kind of tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileType {
    pub code: TileCode,
    pub name: String,
    pub kind: RegistryKind,
    /// Layers this type may be painted on
    pub layers: LayerSet,
    #[serde(default)]
    pub mode: NeighborMode,
    /// Bitmask -> sheet cell. Ordered, so nearest-match scans are stable.
    pub base: BTreeMap<u8, u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variations: BTreeMap<u8, Variation>,
    pub sheet: SpriteSheet,
}

impl TileType {
    pub fn new(
        code: TileCode,
        name: impl Into<String>,
        kind: RegistryKind,
        sheet: SpriteSheet,
    ) -> Self {
        Self {
            code,
            name: name.into(),
            kind,
            layers: LayerSet::EMPTY,
            mode: NeighborMode::Full,
            base: BTreeMap::new(),
            variations: BTreeMap::new(),
            sheet,
        }
    }

    /// Allow painting on `layer`
    pub fn with_layer(mut self, layer: LayerIndex) -> Self {
        self.layers = self.layers.with(layer);
        self
    }

    pub fn with_mode(mut self, mode: NeighborMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the base bitmask table
    pub fn with_base(mut self, base: BTreeMap<u8, u32>) -> Self {
        self.base = base;
        self
    }

    pub fn with_variation(mut self, bitmask: u8, variation: Variation) -> Self {
        self.variations.insert(bitmask, variation);
        self
    }

    pub fn allows_layer(&self, layer: LayerIndex) -> bool {
        self.layers.contains(layer)
    }

    /// Sheet cell shown for an isolated tile (bitmask 0)
    pub fn default_cell(&self) -> u32 {
        self.resolve_base(0)
    }

    /// Resolve a bitmask at a position to a sheet cell.
    ///
    /// Order: position-seeded variation, exact base entry, nearest base entry.
    pub fn resolve(&self, bitmask: u8, coord: TileCoord) -> u32 {
        if let Some(variation) = self.variations.get(&bitmask) {
            if !variation.cells.is_empty() {
                let hash = position_hash(coord.x, coord.y);
                if unit_interval(hash) < variation.probability as f64 {
                    return variation.cells[hash as usize % variation.cells.len()];
                }
            }
        }
        self.resolve_base(bitmask)
    }

    fn resolve_base(&self, bitmask: u8) -> u32 {
        if let Some(&cell) = self.base.get(&bitmask) {
            return cell;
        }
        nearest_cell(&self.base, bitmask).unwrap_or(0)
    }
}

/// Best-effort match for an undefined bitmask: the entry sharing the most
/// bits with `bitmask`. Ties go to the lowest bitmask.
pub fn nearest_cell(table: &BTreeMap<u8, u32>, bitmask: u8) -> Option<u32> {
    let mut best: Option<(u32, u32)> = None;
    for (&mask, &cell) in table {
        let score = (!(mask ^ bitmask)).count_ones();
        match best {
            Some((best_score, _)) if score <= best_score => {}
            _ => best = Some((score, cell)),
        }
    }
    best.map(|(_, cell)| cell)
}

/// Deterministic 32-bit hash of a cell position.
///
/// Depends on nothing but `(x, y)`, so a cell keeps its variation across
/// repaints without storing the choice.
pub fn position_hash(x: i32, y: i32) -> u32 {
    let mut h = (x as u32).wrapping_mul(0x27d4_eb2d) ^ (y as u32).wrapping_mul(0x1656_67b1);
    h ^= 0x9e37_79b9;
    for _ in 0..2 {
        h = ((h >> 16) ^ h).wrapping_mul(0x45d9_f3b);
    }
    (h >> 16) ^ h
}

fn unit_interval(hash: u32) -> f64 {
    hash as f64 / (u32::MAX as f64 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> SpriteSheet {
        SpriteSheet::new("tiles/test.png", 16, 8, 8)
    }

    fn simple_type() -> TileType {
        let base = BTreeMap::from([(0u8, 10u32), (0b0001, 11), (0b0101, 12), (0b1111, 13)]);
        TileType::new(TileCode(5), "Test", RegistryKind::Ground, sheet())
            .with_layer(LayerIndex::GROUND)
            .with_mode(NeighborMode::Cardinal)
            .with_base(base)
    }

    #[test]
    fn test_exact_match() {
        let tile = simple_type();
        assert_eq!(tile.resolve(0b0101, TileCoord::new(3, 3)), 12);
        assert_eq!(tile.default_cell(), 10);
    }

    #[test]
    fn test_nearest_match_fallback() {
        let tile = simple_type();
        // 0b0111 shares 7 bits with both 0b0101 and 0b1111; lowest mask wins
        assert_eq!(tile.resolve(0b0111, TileCoord::new(0, 0)), 12);
        // 0b0011 is closest to 0b0001
        assert_eq!(tile.resolve(0b0011, TileCoord::new(0, 0)), 11);
    }

    #[test]
    fn test_nearest_cell_ties_lowest_mask() {
        let table = BTreeMap::from([(0b0010u8, 2u32), (0b0001, 1)]);
        assert_eq!(nearest_cell(&table, 0b0011), Some(1));
        assert_eq!(nearest_cell(&BTreeMap::new(), 0b0011), None);
    }

    #[test]
    fn test_empty_table_resolves_to_zero() {
        let tile = TileType::new(TileCode(9), "Empty", RegistryKind::Dirt, sheet());
        assert_eq!(tile.resolve(0xFF, TileCoord::new(1, 1)), 0);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let tile = simple_type().with_variation(0b1111, Variation::new(vec![40, 41, 42], 0.5));
        for y in -5..20 {
            for x in -5..20 {
                let coord = TileCoord::new(x, y);
                assert_eq!(tile.resolve(0b1111, coord), tile.resolve(0b1111, coord));
            }
        }
    }

    #[test]
    fn test_variation_probability_bounds() {
        let always = simple_type().with_variation(0b1111, Variation::new(vec![40, 41], 1.0));
        let never = simple_type().with_variation(0b1111, Variation::new(vec![40, 41], 0.0));
        let mut seen = std::collections::HashSet::new();
        for y in 0..16 {
            for x in 0..16 {
                let coord = TileCoord::new(x, y);
                let cell = always.resolve(0b1111, coord);
                assert!(cell == 40 || cell == 41);
                seen.insert(cell);
                assert_eq!(never.resolve(0b1111, coord), 13);
            }
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_variation_rate_roughly_matches_probability() {
        let tile = simple_type().with_variation(0b1111, Variation::new(vec![40], 0.25));
        let varied = (0..64)
            .flat_map(|y| (0..64).map(move |x| TileCoord::new(x, y)))
            .filter(|&coord| tile.resolve(0b1111, coord) == 40)
            .count();
        let rate = varied as f64 / 4096.0;
        assert!((0.18..0.32).contains(&rate), "variation rate {rate}");
    }

    #[test]
    fn test_position_hash_is_pure() {
        assert_eq!(position_hash(7, -3), position_hash(7, -3));
        assert_ne!(position_hash(1, 2), position_hash(2, 1));
    }

    #[test]
    fn test_sheet_cell_rect() {
        let sheet = sheet();
        assert_eq!(sheet.columns(), 8);
        assert_eq!(
            sheet.cell_rect(9),
            Some(SheetRect {
                x: 16,
                y: 16,
                width: 16,
                height: 16
            })
        );
        assert_eq!(sheet.cell_rect(64), None);
    }
}
