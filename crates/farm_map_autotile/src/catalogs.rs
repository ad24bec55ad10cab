//! Built-in farm tile catalogs
//!
//! Terrain sheets use the 47-cell blob layout (one cell per refined
//! 8-direction mask, in ascending mask order) followed by decoration cells.
//! Overlay sheets that only care about edges use the 16-cell layout.

use crate::bitmask::{cardinal, neighbors, refined_masks, NeighborMode};
use crate::registry::{CatalogError, TileCatalog, TileRegistry};
use crate::tile_type::{SpriteSheet, TileType, Variation};
use farm_map_core::{LayerIndex, RegistryKind, TileCode};
use std::collections::BTreeMap;

/// Codes of the built-in tile types
pub mod codes {
    use farm_map_core::TileCode;

    pub const GRASS: TileCode = TileCode(0);
    pub const WATER: TileCode = TileCode(1);
    pub const SAND: TileCode = TileCode(2);

    pub const STONE_PATH: TileCode = TileCode(100);
    pub const WOOD_FLOOR: TileCode = TileCode(101);

    pub const HILL: TileCode = TileCode(200);
    pub const CLIFF: TileCode = TileCode(201);

    pub const TILLED_SOIL: TileCode = TileCode(300);
    pub const WATERED_SOIL: TileCode = TileCode(301);
}

/// Pixel size of every built-in sheet cell
pub const BUILTIN_CELL_SIZE: u32 = 16;

/// Number of cells in a blob layout
pub const BLOB_CELLS: u32 = 47;

/// Base table for a blob sheet: refined mask `n`-th in ascending order -> cell `first + n`
pub fn blob47_table(first: u32) -> BTreeMap<u8, u32> {
    refined_masks()
        .into_iter()
        .enumerate()
        .map(|(i, mask)| (mask, first + i as u32))
        .collect()
}

/// Base table for a 16-cell edge sheet: mask `m` -> cell `first + m`
pub fn cardinal16_table(first: u32) -> BTreeMap<u8, u32> {
    (0..=cardinal::ALL).map(|mask| (mask, first + mask as u32)).collect()
}

fn blob_sheet(path: &str) -> SpriteSheet {
    // 47 blob cells + decorations, 8 columns x 7 rows
    SpriteSheet::new(path, BUILTIN_CELL_SIZE, 8, 7)
}

fn edge_sheet(path: &str) -> SpriteSheet {
    // 16 edge cells + decorations, 4 columns x 5 rows
    SpriteSheet::new(path, BUILTIN_CELL_SIZE, 4, 5)
}

/// Base terrain: grass, water, sand
pub fn terrain_registry() -> Result<TileRegistry, CatalogError> {
    let mut registry = TileRegistry::new(RegistryKind::Terrain);

    registry.insert(
        TileType::new(
            codes::GRASS,
            "Grass",
            RegistryKind::Terrain,
            blob_sheet("tiles/terrain/grass.png"),
        )
        .with_layer(LayerIndex::TERRAIN)
        .with_base(blob47_table(0))
        // Flowers and tufts scattered over open grass
        .with_variation(
            neighbors::ALL,
            Variation::new(vec![BLOB_CELLS, BLOB_CELLS + 1, BLOB_CELLS + 2, BLOB_CELLS + 3], 0.2),
        ),
    )?;

    registry.insert(
        TileType::new(
            codes::WATER,
            "Water",
            RegistryKind::Terrain,
            blob_sheet("tiles/terrain/water.png"),
        )
        .with_layer(LayerIndex::TERRAIN)
        .with_base(blob47_table(0))
        .with_variation(
            neighbors::ALL,
            Variation::new(vec![BLOB_CELLS, BLOB_CELLS + 1], 0.1),
        ),
    )?;

    registry.insert(
        TileType::new(
            codes::SAND,
            "Sand",
            RegistryKind::Terrain,
            blob_sheet("tiles/terrain/sand.png"),
        )
        .with_layer(LayerIndex::TERRAIN)
        .with_base(blob47_table(0)),
    )?;

    Ok(registry)
}

/// Ground overlays: paths and floors
pub fn ground_registry() -> Result<TileRegistry, CatalogError> {
    let mut registry = TileRegistry::new(RegistryKind::Ground);

    registry.insert(
        TileType::new(
            codes::STONE_PATH,
            "Stone Path",
            RegistryKind::Ground,
            edge_sheet("tiles/ground/stone_path.png"),
        )
        .with_layer(LayerIndex::GROUND)
        .with_mode(NeighborMode::Cardinal)
        .with_base(cardinal16_table(0)),
    )?;

    registry.insert(
        TileType::new(
            codes::WOOD_FLOOR,
            "Wood Floor",
            RegistryKind::Ground,
            edge_sheet("tiles/ground/wood_floor.png"),
        )
        .with_layer(LayerIndex::GROUND)
        .with_mode(NeighborMode::Cardinal)
        .with_base(cardinal16_table(0))
        .with_variation(cardinal::ALL, Variation::new(vec![16, 17], 0.3)),
    )?;

    Ok(registry)
}

/// Raised ground: hills and cliffs
pub fn hills_registry() -> Result<TileRegistry, CatalogError> {
    let mut registry = TileRegistry::new(RegistryKind::Hills);

    registry.insert(
        TileType::new(
            codes::HILL,
            "Hill",
            RegistryKind::Hills,
            blob_sheet("tiles/hills/hill.png"),
        )
        .with_layer(LayerIndex::HILLS)
        .with_base(blob47_table(0)),
    )?;

    // Cliffs only ship the cells painters actually use; everything else
    // goes through the nearest-match fallback.
    let cliff_cells = [
        0u8,
        neighbors::N,
        neighbors::S,
        neighbors::N | neighbors::S,
        neighbors::E | neighbors::W,
        neighbors::CARDINALS,
        neighbors::ALL,
    ];
    registry.insert(
        TileType::new(
            codes::CLIFF,
            "Cliff",
            RegistryKind::Hills,
            blob_sheet("tiles/hills/cliff.png"),
        )
        .with_layer(LayerIndex::HILLS)
        .with_base(
            cliff_cells
                .iter()
                .enumerate()
                .map(|(i, &mask)| (mask, i as u32))
                .collect(),
        ),
    )?;

    Ok(registry)
}

/// Dirt-like overlays: tilled and watered soil
pub fn dirt_registry() -> Result<TileRegistry, CatalogError> {
    let mut registry = TileRegistry::new(RegistryKind::Dirt);

    registry.insert(
        TileType::new(
            codes::TILLED_SOIL,
            "Tilled Soil",
            RegistryKind::Dirt,
            blob_sheet("tiles/dirt/tilled.png"),
        )
        .with_layer(LayerIndex::GROUND)
        .with_layer(LayerIndex::DIRT)
        .with_base(blob47_table(0)),
    )?;

    registry.insert(
        TileType::new(
            codes::WATERED_SOIL,
            "Watered Soil",
            RegistryKind::Dirt,
            edge_sheet("tiles/dirt/watered.png"),
        )
        .with_layer(LayerIndex::DIRT)
        .with_mode(NeighborMode::Cardinal)
        .with_base(cardinal16_table(0)),
    )?;

    Ok(registry)
}

/// The default farm catalog with every built-in registry
pub fn farm_catalog() -> Result<TileCatalog, CatalogError> {
    TileCatalog::from_registries([
        terrain_registry()?,
        ground_registry()?,
        hills_registry()?,
        dirt_registry()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_map_core::TileCoord;

    #[test]
    fn test_farm_catalog_builds() {
        let catalog = farm_catalog().unwrap();
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.owner(codes::HILL), Some(RegistryKind::Hills));
        assert_eq!(catalog.owner(codes::WATERED_SOIL), Some(RegistryKind::Dirt));
        assert_eq!(catalog.find_by_name("wood floor").unwrap().code, codes::WOOD_FLOOR);
    }

    #[test]
    fn test_blob_table_covers_every_refined_mask() {
        let table = blob47_table(0);
        assert_eq!(table.len(), 47);
        assert_eq!(table.get(&0), Some(&0));
        assert_eq!(table.get(&neighbors::ALL), Some(&46));
        assert!(table.values().all(|&cell| cell < BLOB_CELLS));
    }

    #[test]
    fn test_builtin_cells_fit_their_sheets() {
        let catalog = farm_catalog().unwrap();
        for tile_type in catalog.tile_types() {
            let cells = tile_type
                .base
                .values()
                .chain(tile_type.variations.values().flat_map(|v| v.cells.iter()));
            for &cell in cells {
                assert!(
                    tile_type.sheet.cell_rect(cell).is_some(),
                    "{} cell {} outside sheet",
                    tile_type.name,
                    cell
                );
            }
        }
    }

    #[test]
    fn test_cliff_falls_back_to_nearest_cell() {
        let catalog = farm_catalog().unwrap();
        let cliff = catalog.get(codes::CLIFF).unwrap();
        // N|E has no dedicated cliff cell; N is the closest entry
        let cell = cliff.resolve(neighbors::N | neighbors::E, TileCoord::new(0, 0));
        assert_eq!(cell, 1);
    }
}
