//! Tile type registries and the catalog that joins them
//!
//! Each `TileRegistry` holds the tile types of one `RegistryKind`. A
//! `TileCatalog` owns every registry sharing a grid plus the reverse map from
//! tile code to owning registry, and rejects code collisions up front.

use crate::bitmask::NeighborMode;
use crate::tile_type::TileType;
use farm_map_core::{LayerIndex, RegistryKind, TileCode, TileCoord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when building a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Tile code {code} is already registered by the {existing:?} registry")]
    DuplicateCode { code: TileCode, existing: RegistryKind },
    #[error("Tile code {code} declares kind {declared:?} but was added to the {registry:?} registry")]
    KindMismatch {
        code: TileCode,
        declared: RegistryKind,
        registry: RegistryKind,
    },
    #[error("Tile type '{0}' may not be painted on any layer")]
    NoLegalLayers(String),
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The tile types of one kind (terrain, ground, hills or dirt)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRegistry {
    pub kind: RegistryKind,
    types: BTreeMap<TileCode, TileType>,
}

impl TileRegistry {
    pub fn new(kind: RegistryKind) -> Self {
        Self {
            kind,
            types: BTreeMap::new(),
        }
    }

    /// Add a tile type to this registry
    pub fn insert(&mut self, tile_type: TileType) -> Result<(), CatalogError> {
        if tile_type.kind != self.kind {
            return Err(CatalogError::KindMismatch {
                code: tile_type.code,
                declared: tile_type.kind,
                registry: self.kind,
            });
        }
        if tile_type.layers.is_empty() {
            return Err(CatalogError::NoLegalLayers(tile_type.name));
        }
        if self.types.contains_key(&tile_type.code) {
            return Err(CatalogError::DuplicateCode {
                code: tile_type.code,
                existing: self.kind,
            });
        }
        self.types.insert(tile_type.code, tile_type);
        Ok(())
    }

    pub fn get(&self, code: TileCode) -> Option<&TileType> {
        self.types.get(&code)
    }

    /// Tile types ordered by code
    pub fn iter(&self) -> impl Iterator<Item = &TileType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// All registries sharing one grid, with a global code -> registry map
#[derive(Debug, Clone, Default)]
pub struct TileCatalog {
    registries: BTreeMap<RegistryKind, TileRegistry>,
    owners: HashMap<TileCode, RegistryKind>,
}

impl TileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from registries, checking code uniqueness across them
    pub fn from_registries(
        registries: impl IntoIterator<Item = TileRegistry>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for registry in registries {
            for tile_type in registry.types.into_values() {
                catalog.register(tile_type)?;
            }
        }
        Ok(catalog)
    }

    /// Register a tile type in the registry of its kind
    pub fn register(&mut self, tile_type: TileType) -> Result<(), CatalogError> {
        if let Some(&existing) = self.owners.get(&tile_type.code) {
            return Err(CatalogError::DuplicateCode {
                code: tile_type.code,
                existing,
            });
        }
        let kind = tile_type.kind;
        let code = tile_type.code;
        self.registries
            .entry(kind)
            .or_insert_with(|| TileRegistry::new(kind))
            .insert(tile_type)?;
        self.owners.insert(code, kind);
        Ok(())
    }

    /// Parse a catalog from a JSON list of registries
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let registries: Vec<TileRegistry> = serde_json::from_str(json)?;
        Self::from_registries(registries)
    }

    /// Load a catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(
            "Loaded {} tile types from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        let registries: Vec<&TileRegistry> = self.registries.values().collect();
        Ok(serde_json::to_string_pretty(&registries)?)
    }

    /// Which registry owns `code`
    pub fn owner(&self, code: TileCode) -> Option<RegistryKind> {
        self.owners.get(&code).copied()
    }

    pub fn registry(&self, kind: RegistryKind) -> Option<&TileRegistry> {
        self.registries.get(&kind)
    }

    /// Look up a tile type through the owning registry
    pub fn get(&self, code: TileCode) -> Option<&TileType> {
        self.owner(code)
            .and_then(|kind| self.registries.get(&kind))
            .and_then(|registry| registry.get(code))
    }

    /// Find a tile type by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<&TileType> {
        self.tile_types()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Every tile type, grouped by registry then ordered by code
    pub fn tile_types(&self) -> impl Iterator<Item = &TileType> {
        self.registries.values().flat_map(|r| r.iter())
    }

    /// Neighbor mode of a code; unknown codes use the 8-direction mode
    pub fn mode(&self, code: TileCode) -> NeighborMode {
        self.get(code).map(|t| t.mode).unwrap_or_default()
    }

    /// Check whether `code` exists and may be painted on `layer`
    pub fn allows(&self, code: TileCode, layer: LayerIndex) -> bool {
        self.get(code).is_some_and(|t| t.allows_layer(layer))
    }

    /// Resolve a bitmask for a tile code.
    ///
    /// Unknown codes fall back to sheet cell 0, the isolated-tile appearance,
    /// so stale data degrades visually instead of failing.
    pub fn resolve(&self, code: TileCode, bitmask: u8, coord: TileCoord) -> u32 {
        match self.get(code) {
            Some(tile_type) => tile_type.resolve(bitmask, coord),
            None => {
                tracing::debug!("Unknown tile code {} at {}, using default cell", code, coord);
                0
            }
        }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
