//! Tile records and the per-cell layer stack

use crate::layer::{LayerIndex, LAYER_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric tile type code, unique across every registry sharing a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileCode(pub u16);

impl fmt::Display for TileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which registry owns a tile code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryKind {
    /// Base terrain (grass, water, sand)
    Terrain,
    /// Ground overlays (paths, floors)
    Ground,
    /// Raised hills and cliffs
    Hills,
    /// Tilled soil and other dirt-like overlays
    Dirt,
}

impl RegistryKind {
    pub const ALL: [RegistryKind; 4] = [
        RegistryKind::Terrain,
        RegistryKind::Ground,
        RegistryKind::Hills,
        RegistryKind::Dirt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RegistryKind::Terrain => "terrain",
            RegistryKind::Ground => "ground",
            RegistryKind::Hills => "hills",
            RegistryKind::Dirt => "dirt",
        }
    }
}

/// Content of one layer of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRecord {
    /// Owning registry of `code`
    pub kind: RegistryKind,
    pub code: TileCode,
    /// Resolved cell in the tile type's sprite sheet
    pub sprite_index: u32,
}

impl TileRecord {
    /// A freshly painted record; the sprite index is resolved afterwards
    pub fn new(kind: RegistryKind, code: TileCode) -> Self {
        Self {
            kind,
            code,
            sprite_index: 0,
        }
    }

    pub fn with_sprite(mut self, sprite_index: u32) -> Self {
        self.sprite_index = sprite_index;
        self
    }
}

/// The four-layer stack of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cell {
    pub layers: [Option<TileRecord>; LAYER_COUNT],
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell holding a single record on `layer`
    pub fn with_record(layer: LayerIndex, record: TileRecord) -> Self {
        let mut cell = Self::new();
        cell.set(layer, Some(record));
        cell
    }

    pub fn get(&self, layer: LayerIndex) -> Option<&TileRecord> {
        self.layers[layer.index()].as_ref()
    }

    pub fn get_mut(&mut self, layer: LayerIndex) -> Option<&mut TileRecord> {
        self.layers[layer.index()].as_mut()
    }

    pub fn set(&mut self, layer: LayerIndex, record: Option<TileRecord>) {
        self.layers[layer.index()] = record;
    }

    /// True when no layer holds content; such cells are never stored
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Option::is_none)
    }

    /// Occupied layers with their records, bottom to top
    pub fn occupied(&self) -> impl Iterator<Item = (LayerIndex, &TileRecord)> + '_ {
        LayerIndex::ALL
            .into_iter()
            .filter_map(move |layer| self.get(layer).map(|record| (layer, record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_empty_tracking() {
        let record = TileRecord::new(RegistryKind::Terrain, TileCode(0));
        let mut cell = Cell::with_record(LayerIndex::TERRAIN, record);
        assert!(!cell.is_empty());
        assert_eq!(cell.occupied().count(), 1);

        cell.set(LayerIndex::TERRAIN, None);
        assert!(cell.is_empty());
    }

    #[test]
    fn test_cell_serializes_as_layer_array() {
        let record = TileRecord::new(RegistryKind::Dirt, TileCode(300)).with_sprite(7);
        let cell = Cell::with_record(LayerIndex::DIRT, record);
        let json = serde_json::to_string(&cell).unwrap();
        assert!(json.starts_with("[null,null,null,{"));
        assert!(json.contains("\"kind\":\"dirt\""));

        let back: Cell = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cell);
    }
}
