//! Paint and erase operations with neighbor recalculation
//!
//! Every operation leaves the grid consistent: each record touched by the
//! edit, and each same-layer neighbor of a changed cell, holds the sprite
//! index resolved from the post-edit grid.

use crate::bitmask::grid_bitmask;
use crate::registry::TileCatalog;
use farm_map_core::{Cell, LayerIndex, TileCode, TileCoord, TileGrid, TileRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a brush puts down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushTile {
    Paint(TileCode),
    Erase,
}

/// One discrete brush action from the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrushStroke {
    pub center: TileCoord,
    /// Footprint is the `(2 * radius + 1)` square around `center`
    #[serde(default)]
    pub radius: u32,
    pub tile: BrushTile,
    pub layer: LayerIndex,
}

impl BrushStroke {
    pub fn paint(center: TileCoord, radius: u32, code: TileCode, layer: LayerIndex) -> Self {
        Self {
            center,
            radius,
            tile: BrushTile::Paint(code),
            layer,
        }
    }

    pub fn erase(center: TileCoord, radius: u32, layer: LayerIndex) -> Self {
        Self {
            center,
            radius,
            tile: BrushTile::Erase,
            layer,
        }
    }

    /// In-bounds cells covered by the brush, row-major.
    ///
    /// The square is clipped to the grid before iterating, so the cost is
    /// bounded by the grid area whatever the radius.
    pub fn footprint(&self, grid: &TileGrid) -> Vec<TileCoord> {
        let (Some((x0, x1)), Some((y0, y1))) = (
            clip_span(self.center.x, self.radius, grid.width()),
            clip_span(self.center.y, self.radius, grid.height()),
        ) else {
            return Vec::new();
        };
        let mut cells = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                cells.push(TileCoord::new(x, y));
            }
        }
        cells
    }
}

/// `center ± radius` intersected with `0..size`, or `None` if they miss
fn clip_span(center: i32, radius: u32, size: u32) -> Option<(i32, i32)> {
    let max = (i64::from(size) - 1).min(i64::from(i32::MAX));
    let lo = (i64::from(center) - i64::from(radius)).max(0);
    let hi = (i64::from(center) + i64::from(radius)).min(max);
    // both ends lie in 0..=i32::MAX here
    (lo <= hi).then(|| (lo as i32, hi as i32))
}

/// Summary of a paint operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintReport {
    /// Cells whose layer record was written or cleared
    pub written: usize,
    /// Records whose sprite index was recomputed
    pub recalculated: usize,
}

impl PaintReport {
    pub fn is_noop(&self) -> bool {
        self.written == 0
    }
}

/// Paint `code` on one layer of one cell and update its neighborhood
pub fn paint_tile(
    grid: &mut TileGrid,
    catalog: &TileCatalog,
    coord: TileCoord,
    code: TileCode,
    layer: LayerIndex,
) -> PaintReport {
    let Some(record) = paintable_record(catalog, code, layer) else {
        return PaintReport::default();
    };
    if grid.code_at(coord, layer) == Some(code) {
        return PaintReport::default();
    }
    if !grid.set_record(coord, layer, Some(record)) {
        return PaintReport::default();
    }
    PaintReport {
        written: 1,
        recalculated: recalculate(grid, catalog, &neighborhood(grid, &[coord]), layer),
    }
}

/// Erase one layer of one cell and update its neighborhood
pub fn erase_tile(
    grid: &mut TileGrid,
    catalog: &TileCatalog,
    coord: TileCoord,
    layer: LayerIndex,
) -> PaintReport {
    if !grid.set_record(coord, layer, None) {
        return PaintReport::default();
    }
    PaintReport {
        written: 1,
        recalculated: recalculate(grid, catalog, &neighborhood(grid, &[coord]), layer),
    }
}

/// Apply a brush stroke.
///
/// All cells in the footprint are written first; then every changed cell
/// and its neighbors is recalculated exactly once. Radius 0 is the
/// single-tile path.
pub fn apply_brush(grid: &mut TileGrid, catalog: &TileCatalog, stroke: &BrushStroke) -> PaintReport {
    if stroke.radius == 0 {
        return match stroke.tile {
            BrushTile::Paint(code) => paint_tile(grid, catalog, stroke.center, code, stroke.layer),
            BrushTile::Erase => erase_tile(grid, catalog, stroke.center, stroke.layer),
        };
    }

    let record = match stroke.tile {
        BrushTile::Paint(code) => match paintable_record(catalog, code, stroke.layer) {
            Some(record) => Some(record),
            None => return PaintReport::default(),
        },
        BrushTile::Erase => None,
    };

    let mut changed = Vec::new();
    for coord in stroke.footprint(grid) {
        let current = grid.code_at(coord, stroke.layer);
        if current == record.map(|r| r.code) {
            continue;
        }
        if grid.set_record(coord, stroke.layer, record) {
            changed.push(coord);
        }
    }

    if changed.is_empty() {
        return PaintReport::default();
    }

    let targets = neighborhood(grid, &changed);
    let recalculated = recalculate(grid, catalog, &targets, stroke.layer);
    tracing::trace!(
        "Brush at {} r={} wrote {} cells, recalculated {}",
        stroke.center,
        stroke.radius,
        changed.len(),
        recalculated
    );
    PaintReport {
        written: changed.len(),
        recalculated,
    }
}

/// Cells a brush stroke would change, without touching `grid`.
///
/// Each entry holds the cell as it would be after the stroke (`None` when
/// the cell would be removed).
pub fn preview_brush(
    grid: &TileGrid,
    catalog: &TileCatalog,
    stroke: &BrushStroke,
) -> Vec<(TileCoord, Option<Cell>)> {
    let mut preview = grid.clone();
    if apply_brush(&mut preview, catalog, stroke).is_noop() {
        return Vec::new();
    }

    let region = neighborhood(grid, &stroke.footprint(grid));
    region
        .into_iter()
        .filter(|&coord| grid.get(coord) != preview.get(coord))
        .map(|coord| (coord, preview.get(coord).copied()))
        .collect()
}

/// Recompute the sprite index of every record on `layer` at `coords`.
///
/// Returns how many records were recomputed (coordinates without a record on
/// that layer are skipped).
pub fn recalculate(
    grid: &mut TileGrid,
    catalog: &TileCatalog,
    coords: &BTreeSet<TileCoord>,
    layer: LayerIndex,
) -> usize {
    let mut count = 0;
    for &coord in coords {
        if let Some(sprite) = resolved_sprite(grid, catalog, coord, layer) {
            grid.set_sprite_index(coord, layer, sprite);
            count += 1;
        }
    }
    count
}

/// Recompute every stored record on every layer (after load or resize)
pub fn recalculate_all(grid: &mut TileGrid, catalog: &TileCatalog) -> usize {
    let coords: BTreeSet<TileCoord> = grid.coords().into_iter().collect();
    LayerIndex::ALL
        .into_iter()
        .map(|layer| recalculate(grid, catalog, &coords, layer))
        .sum()
}

/// Records whose stored sprite index differs from what the current grid
/// resolves to. Empty for a consistent grid.
pub fn stale_records(grid: &TileGrid, catalog: &TileCatalog) -> Vec<(TileCoord, LayerIndex)> {
    let mut stale = Vec::new();
    for coord in grid.coords() {
        for layer in LayerIndex::ALL {
            let Some(record) = grid.record(coord, layer) else {
                continue;
            };
            if resolved_sprite(grid, catalog, coord, layer) != Some(record.sprite_index) {
                stale.push((coord, layer));
            }
        }
    }
    stale
}

/// Rewrite records whose stored kind disagrees with the catalog's owner of
/// their code. Codes the catalog does not know are left alone. Returns how
/// many records changed.
pub fn repair_kinds(grid: &mut TileGrid, catalog: &TileCatalog) -> usize {
    let mut mismatched = Vec::new();
    for layer in LayerIndex::ALL {
        for (coord, record) in grid.layer_records(layer) {
            match catalog.owner(record.code) {
                Some(owner) if owner != record.kind => {
                    mismatched.push((coord, layer, TileRecord { kind: owner, ..*record }));
                }
                _ => {}
            }
        }
    }
    for &(coord, layer, record) in &mismatched {
        tracing::debug!("Record {} on layer {} now owned by {}", coord, layer, record.kind.name());
        grid.set_record(coord, layer, Some(record));
    }
    mismatched.len()
}

/// Sprite index the current grid implies for one record
fn resolved_sprite(
    grid: &TileGrid,
    catalog: &TileCatalog,
    coord: TileCoord,
    layer: LayerIndex,
) -> Option<u32> {
    let code = grid.code_at(coord, layer)?;
    let sprite = match catalog.get(code) {
        Some(tile_type) => {
            let bitmask = grid_bitmask(grid, coord, code, layer, tile_type.mode);
            tile_type.resolve(bitmask, coord)
        }
        None => catalog.resolve(code, 0, coord),
    };
    Some(sprite)
}

/// The given cells plus their in-bounds 8-neighbors
fn neighborhood(grid: &TileGrid, cells: &[TileCoord]) -> BTreeSet<TileCoord> {
    let mut set = BTreeSet::new();
    for &coord in cells {
        set.insert(coord);
        set.extend(coord.neighbors().into_iter().filter(|n| grid.in_bounds(*n)));
    }
    set
}

/// Record for painting `code`, or `None` (logged) if it cannot go on `layer`
fn paintable_record(catalog: &TileCatalog, code: TileCode, layer: LayerIndex) -> Option<TileRecord> {
    match catalog.get(code) {
        Some(tile_type) if tile_type.allows_layer(layer) => {
            Some(TileRecord::new(tile_type.kind, code))
        }
        Some(tile_type) => {
            tracing::warn!(
                "Tile type '{}' cannot be painted on layer {}",
                tile_type.name,
                layer
            );
            None
        }
        None => {
            tracing::warn!("Ignoring paint with unknown tile code {}", code);
            None
        }
    }
}
