//! Bitmask autotiling for farm_map
//!
//! This crate derives the displayed sprite of every tile from its neighbors
//! and keeps the grid consistent on every edit.
//!
//! # Features
//! - 4-direction (16 cell) and 8-direction (47 cell blob) bitmasks
//! - Position-seeded deterministic variations for visual variety
//! - Nearest-match fallback for bitmasks a sheet does not define
//! - Tile type registries with a global code -> registry lookup
//! - Single-tile and brush paint/erase with neighbor recalculation
//!
//! # Example
//!
//! ```rust,ignore
//! use farm_map_autotile::{apply_brush, catalogs::{codes, farm_catalog}, BrushStroke};
//! use farm_map_core::{LayerIndex, TileCoord, TileGrid};
//!
//! let catalog = farm_catalog()?;
//! let mut grid = TileGrid::new(32, 32);
//!
//! // Paint a 5x5 patch of grass centered on (8, 8)
//! let stroke = BrushStroke::paint(TileCoord::new(8, 8), 2, codes::GRASS, LayerIndex::TERRAIN);
//! apply_brush(&mut grid, &catalog, &stroke);
//! ```

pub mod bitmask;
pub mod catalogs;
pub mod paint;
pub mod registry;
pub mod tile_type;

// Re-export main types at crate root
pub use bitmask::{calculate_bitmask, grid_bitmask, refine_bitmask, NeighborMode};
pub use paint::{
    apply_brush, erase_tile, paint_tile, preview_brush, recalculate, recalculate_all,
    repair_kinds, stale_records, BrushStroke, BrushTile, PaintReport,
};
pub use registry::{CatalogError, TileCatalog, TileRegistry};
pub use tile_type::{nearest_cell, position_hash, SheetRect, SpriteSheet, TileType, Variation};

// Re-export farm_map_core
pub use farm_map_core;
