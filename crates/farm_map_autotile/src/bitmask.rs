//! Neighbor bitmask calculation
//!
//! Two classifications exist. `Cardinal` looks at the 4 edge neighbors and
//! yields one of 16 masks. `Full` also looks at the diagonals and then runs
//! [`refine_bitmask`], leaving the 47 masks of the classic blob layout.

use farm_map_core::{LayerIndex, TileCode, TileCoord, TileGrid};
use serde::{Deserialize, Serialize};

/// Neighbor direction flags for 8-direction masks
pub mod neighbors {
    pub const N: u8 = 0b0000_0001; // North
    pub const NE: u8 = 0b0000_0010; // Northeast (corner)
    pub const E: u8 = 0b0000_0100; // East
    pub const SE: u8 = 0b0000_1000; // Southeast (corner)
    pub const S: u8 = 0b0001_0000; // South
    pub const SW: u8 = 0b0010_0000; // Southwest (corner)
    pub const W: u8 = 0b0100_0000; // West
    pub const NW: u8 = 0b1000_0000; // Northwest (corner)

    pub const CARDINALS: u8 = N | E | S | W;
    pub const DIAGONALS: u8 = NE | SE | SW | NW;
    pub const ALL: u8 = 0xFF;
}

/// Neighbor direction flags for 4-direction masks
pub mod cardinal {
    pub const N: u8 = 0b0001;
    pub const E: u8 = 0b0010;
    pub const S: u8 = 0b0100;
    pub const W: u8 = 0b1000;

    pub const ALL: u8 = N | E | S | W;
}

/// How many neighbors a tile type looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborMode {
    /// North, east, south, west (16 masks)
    Cardinal,
    /// Cardinals plus refined diagonals (47 masks)
    #[default]
    Full,
}

impl NeighborMode {
    /// Mask of a cell whose every neighbor matches
    pub fn full_mask(self) -> u8 {
        match self {
            NeighborMode::Cardinal => cardinal::ALL,
            NeighborMode::Full => neighbors::ALL,
        }
    }
}

/// Clear every diagonal bit whose two flanking cardinal bits are not both set
pub fn refine_bitmask(bitmask: u8) -> u8 {
    use neighbors::*;

    let mut result = bitmask;

    // NW corner requires N and W
    if (bitmask & (N | W)) != (N | W) {
        result &= !NW;
    }
    // NE corner requires N and E
    if (bitmask & (N | E)) != (N | E) {
        result &= !NE;
    }
    // SE corner requires S and E
    if (bitmask & (S | E)) != (S | E) {
        result &= !SE;
    }
    // SW corner requires S and W
    if (bitmask & (S | W)) != (S | W) {
        result &= !SW;
    }

    result
}

/// Every mask `refine_bitmask` can produce, ascending (47 entries)
pub fn refined_masks() -> Vec<u8> {
    (0..=u8::MAX).filter(|&m| refine_bitmask(m) == m).collect()
}

/// Calculate the neighbor bitmask of `(x, y)`.
///
/// `is_same` is asked about each neighbor position and decides both bounds
/// and type matching.
pub fn calculate_bitmask<F>(x: i32, y: i32, mode: NeighborMode, is_same: F) -> u8
where
    F: Fn(i32, i32) -> bool,
{
    match mode {
        NeighborMode::Cardinal => {
            let mut bitmask = 0u8;
            if is_same(x, y - 1) {
                bitmask |= cardinal::N;
            }
            if is_same(x + 1, y) {
                bitmask |= cardinal::E;
            }
            if is_same(x, y + 1) {
                bitmask |= cardinal::S;
            }
            if is_same(x - 1, y) {
                bitmask |= cardinal::W;
            }
            bitmask
        }
        NeighborMode::Full => {
            use neighbors::*;

            let mut bitmask = 0u8;
            if is_same(x, y - 1) {
                bitmask |= N;
            }
            if is_same(x + 1, y - 1) {
                bitmask |= NE;
            }
            if is_same(x + 1, y) {
                bitmask |= E;
            }
            if is_same(x + 1, y + 1) {
                bitmask |= SE;
            }
            if is_same(x, y + 1) {
                bitmask |= S;
            }
            if is_same(x - 1, y + 1) {
                bitmask |= SW;
            }
            if is_same(x - 1, y) {
                bitmask |= W;
            }
            if is_same(x - 1, y - 1) {
                bitmask |= NW;
            }

            refine_bitmask(bitmask)
        }
    }
}

/// Bitmask of `coord` on `layer` for tile `code`, read from the grid.
///
/// Only same-layer records with the same code count; out-of-bounds neighbors
/// contribute nothing.
pub fn grid_bitmask(
    grid: &TileGrid,
    coord: TileCoord,
    code: TileCode,
    layer: LayerIndex,
    mode: NeighborMode,
) -> u8 {
    calculate_bitmask(coord.x, coord.y, mode, |nx, ny| {
        let neighbor = TileCoord::new(nx, ny);
        grid.in_bounds(neighbor) && grid.code_at(neighbor, layer) == Some(code)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_map_core::{RegistryKind, TileRecord};

    #[test]
    fn test_lone_diagonal_refines_to_zero() {
        assert_eq!(refine_bitmask(neighbors::NE), 0);
        assert_eq!(refine_bitmask(neighbors::DIAGONALS), 0);
        assert_eq!(refine_bitmask(neighbors::NE | neighbors::N), neighbors::N);
        assert_eq!(
            refine_bitmask(neighbors::NE | neighbors::N | neighbors::E),
            neighbors::NE | neighbors::N | neighbors::E
        );
    }

    #[test]
    fn test_refinement_law_for_all_masks() {
        use neighbors::*;
        let corners = [(NE, N, E), (SE, S, E), (SW, S, W), (NW, N, W)];
        for raw in 0..=u8::MAX {
            let refined = refine_bitmask(raw);
            assert_eq!(refine_bitmask(refined), refined);
            assert_eq!(refined & CARDINALS, raw & CARDINALS);
            for (diag, a, b) in corners {
                if raw & a == 0 || raw & b == 0 {
                    assert_eq!(refined & diag, 0, "raw mask {raw:#010b}");
                }
            }
        }
    }

    #[test]
    fn test_47_refined_masks() {
        let masks = refined_masks();
        assert_eq!(masks.len(), 47);
        assert_eq!(masks.first(), Some(&0));
        assert_eq!(masks.last(), Some(&255));
    }

    #[test]
    fn test_cardinal_mask() {
        let mask = calculate_bitmask(0, 0, NeighborMode::Cardinal, |x, y| {
            (x, y) == (0, -1) || (x, y) == (-1, 0) || (x, y) == (1, 1)
        });
        assert_eq!(mask, cardinal::N | cardinal::W);
    }

    #[test]
    fn test_grid_bitmask_respects_layer_and_code() {
        let mut grid = TileGrid::new(3, 3);
        let grass = TileRecord::new(RegistryKind::Terrain, TileCode(0));
        let water = TileRecord::new(RegistryKind::Terrain, TileCode(1));
        let center = TileCoord::new(1, 1);
        grid.set_record(center, LayerIndex::TERRAIN, Some(grass));
        grid.set_record(TileCoord::new(1, 0), LayerIndex::TERRAIN, Some(grass));
        grid.set_record(TileCoord::new(2, 1), LayerIndex::TERRAIN, Some(water));
        grid.set_record(TileCoord::new(1, 2), LayerIndex::GROUND, Some(grass));

        let mask = grid_bitmask(&grid, center, TileCode(0), LayerIndex::TERRAIN, NeighborMode::Full);
        assert_eq!(mask, neighbors::N);
    }

    #[test]
    fn test_corner_cell_of_filled_grid() {
        let mut grid = TileGrid::new(4, 4);
        let grass = TileRecord::new(RegistryKind::Terrain, TileCode(0));
        for y in 0..4 {
            for x in 0..4 {
                grid.set_record(TileCoord::new(x, y), LayerIndex::TERRAIN, Some(grass));
            }
        }
        let corner = grid_bitmask(
            &grid,
            TileCoord::new(0, 0),
            TileCode(0),
            LayerIndex::TERRAIN,
            NeighborMode::Full,
        );
        assert_eq!(corner, neighbors::E | neighbors::SE | neighbors::S);
        let cardinal_corner = grid_bitmask(
            &grid,
            TileCoord::new(3, 3),
            TileCode(0),
            LayerIndex::TERRAIN,
            NeighborMode::Cardinal,
        );
        assert_eq!(cardinal_corner, cardinal::N | cardinal::W);
    }
}
