//! Core data structures for farm_map
//!
//! This crate provides the fundamental types for representing a farm world:
//! - `TileCoord` - Integer cell coordinate with a canonical `"x,y"` key form
//! - `LayerIndex` / `LayerSet` - The four fixed compositing layers
//! - `TileRecord` / `Cell` - Per-layer tile content of a single cell
//! - `TileGrid` - The sparse, copy-on-write multi-layer grid
//! - `GridSnapshot` - Ordered persistence form of a grid
//!
//! This crate has no knowledge of tile registries or rendering. Sprite indices
//! stored here are resolved by `farm_map_autotile`.

mod cell;
mod coord;
mod grid;
mod layer;
mod snapshot;

pub use cell::{Cell, RegistryKind, TileCode, TileRecord};
pub use coord::{CoordParseError, TileCoord};
pub use grid::TileGrid;
pub use layer::{LayerIndex, LayerSet, LAYER_COUNT};
pub use snapshot::{load_grid, save_grid, GridSnapshot, SnapshotError, SNAPSHOT_VERSION};
