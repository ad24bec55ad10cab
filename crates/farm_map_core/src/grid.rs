//! The sparse multi-layer tile grid
//!
//! `TileGrid` stores only occupied cells, keyed by coordinate. The map sits
//! behind an `Arc`, so cloning a grid is O(1) and every mutating method goes
//! through `Arc::make_mut`: a clone held by a renderer or by the undo history
//! keeps seeing exactly the state it was cloned from.

use crate::cell::{Cell, TileCode, TileRecord};
use crate::coord::TileCoord;
use crate::layer::LayerIndex;
use std::collections::HashMap;
use std::sync::Arc;

/// Sparse copy-on-write grid of four-layer cells
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    width: u32,
    height: u32,
    cells: Arc<HashMap<TileCoord, Cell>>,
}

impl TileGrid {
    /// Create an empty grid of the given world size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: Arc::new(HashMap::new()),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if a coordinate lies inside the world
    pub fn in_bounds(&self, coord: TileCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    pub fn get(&self, coord: TileCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// Record on a single layer of a cell
    pub fn record(&self, coord: TileCoord, layer: LayerIndex) -> Option<&TileRecord> {
        self.cells.get(&coord).and_then(|cell| cell.get(layer))
    }

    /// Tile code on a single layer of a cell
    pub fn code_at(&self, coord: TileCoord, layer: LayerIndex) -> Option<TileCode> {
        self.record(coord, layer).map(|r| r.code)
    }

    /// Write or clear one layer of a cell.
    ///
    /// Out-of-bounds writes are dropped. Clearing the last occupied layer
    /// removes the cell from the grid. Returns `true` if the grid changed.
    pub fn set_record(
        &mut self,
        coord: TileCoord,
        layer: LayerIndex,
        record: Option<TileRecord>,
    ) -> bool {
        if !self.in_bounds(coord) {
            return false;
        }
        if self.record(coord, layer) == record.as_ref() {
            return false;
        }

        let cells = Arc::make_mut(&mut self.cells);
        match record {
            Some(record) => {
                cells.entry(coord).or_default().set(layer, Some(record));
            }
            None => {
                if let Some(cell) = cells.get_mut(&coord) {
                    cell.set(layer, None);
                    if cell.is_empty() {
                        cells.remove(&coord);
                    }
                }
            }
        }
        true
    }

    /// Update the resolved sprite index of an existing record.
    ///
    /// Returns `true` if the index changed. Missing records are left alone.
    pub fn set_sprite_index(&mut self, coord: TileCoord, layer: LayerIndex, index: u32) -> bool {
        match self.record(coord, layer) {
            Some(record) if record.sprite_index != index => {}
            _ => return false,
        }
        if let Some(record) = Arc::make_mut(&mut self.cells)
            .get_mut(&coord)
            .and_then(|cell| cell.get_mut(layer))
        {
            record.sprite_index = index;
        }
        true
    }

    /// Replace a whole cell. An empty cell removes the coordinate.
    pub fn set_cell(&mut self, coord: TileCoord, cell: Cell) -> bool {
        if !self.in_bounds(coord) || self.get(coord) == Some(&cell) {
            return false;
        }
        let cells = Arc::make_mut(&mut self.cells);
        if cell.is_empty() {
            cells.remove(&coord).is_some()
        } else {
            cells.insert(coord, cell);
            true
        }
    }

    /// Number of stored (non-empty) cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Iterate stored cells in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &Cell)> + '_ {
        self.cells.iter().map(|(coord, cell)| (*coord, cell))
    }

    /// Stored coordinates in row-major order
    pub fn coords(&self) -> Vec<TileCoord> {
        let mut coords: Vec<TileCoord> = self.cells.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Stored records on one layer, in arbitrary order
    pub fn layer_records(
        &self,
        layer: LayerIndex,
    ) -> impl Iterator<Item = (TileCoord, &TileRecord)> + '_ {
        self.cells
            .iter()
            .filter_map(move |(coord, cell)| cell.get(layer).map(|r| (*coord, r)))
    }

    /// A copy of this grid with a new world size.
    ///
    /// Cells outside the new bounds are dropped. Sprite indices are left as
    /// they were; callers recalculate the grid afterwards.
    pub fn resized(&self, width: u32, height: u32) -> TileGrid {
        let mut grid = TileGrid::new(width, height);
        let cells: HashMap<TileCoord, Cell> = self
            .cells
            .iter()
            .filter(|(coord, _)| grid.in_bounds(**coord))
            .map(|(coord, cell)| (*coord, *cell))
            .collect();
        grid.cells = Arc::new(cells);
        grid
    }

    /// True when both grids share the same storage (no edit since cloning)
    pub fn ptr_eq(&self, other: &TileGrid) -> bool {
        Arc::ptr_eq(&self.cells, &other.cells)
    }
}

impl PartialEq for TileGrid {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && (self.ptr_eq(other) || self.cells == other.cells)
    }
}

impl Eq for TileGrid {}
