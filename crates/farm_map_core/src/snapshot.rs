//! Grid persistence form
//!
//! A grid is persisted as an ordered list of `(coordinate key, layer array)`
//! pairs. Loading does nothing beyond parsing the keys; sprite indices are
//! stored as they were resolved when saving.

use crate::cell::{Cell, TileRecord};
use crate::coord::{CoordParseError, TileCoord};
use crate::grid::TileGrid;
use crate::layer::LAYER_COUNT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Current persistence format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur when loading or saving a grid
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read or write grid file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse grid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid cell key: {0}")]
    InvalidKey(#[from] CoordParseError),
    #[error("Unsupported grid format version {0}")]
    UnsupportedVersion(u32),
}

/// Serializable, ordered form of a `TileGrid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<(String, [Option<TileRecord>; LAYER_COUNT])>,
}

impl TileGrid {
    /// Build the persistence form, cells in row-major order
    pub fn to_snapshot(&self) -> GridSnapshot {
        let cells = self
            .coords()
            .into_iter()
            .filter_map(|coord| self.get(coord).map(|cell| (coord.key(), cell.layers)))
            .collect();
        GridSnapshot {
            version: SNAPSHOT_VERSION,
            width: self.width(),
            height: self.height(),
            cells,
        }
    }

    /// Rebuild a grid from its persistence form.
    ///
    /// Entries outside the world or with no occupied layer are skipped.
    pub fn from_snapshot(snapshot: &GridSnapshot) -> Result<TileGrid, SnapshotError> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }

        let mut grid = TileGrid::new(snapshot.width, snapshot.height);
        let mut skipped = 0usize;
        for (key, layers) in &snapshot.cells {
            let coord: TileCoord = key.parse()?;
            if !grid.set_cell(coord, Cell { layers: *layers }) {
                skipped += 1;
            }
        }
        if skipped > 0 {
            tracing::debug!("Skipped {} empty or out-of-bounds cells while loading grid", skipped);
        }
        Ok(grid)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<TileGrid, SnapshotError> {
        let snapshot: GridSnapshot = serde_json::from_str(json)?;
        TileGrid::from_snapshot(&snapshot)
    }
}

/// Save a grid to a JSON file
pub fn save_grid(grid: &TileGrid, path: &Path) -> Result<(), SnapshotError> {
    std::fs::write(path, grid.to_json()?)?;
    tracing::info!("Saved {} cells to {}", grid.len(), path.display());
    Ok(())
}

/// Load a grid from a JSON file
pub fn load_grid(path: &Path) -> Result<TileGrid, SnapshotError> {
    let content = std::fs::read_to_string(path)?;
    let grid = TileGrid::from_json(&content)?;
    tracing::info!(
        "Loaded {}x{} grid with {} cells from {}",
        grid.width(),
        grid.height(),
        grid.len(),
        path.display()
    );
    Ok(grid)
}
