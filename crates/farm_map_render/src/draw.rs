//! Full and per-cell layer drawing

use crate::sheets::SheetCache;
use crate::surface::{DrawSurface, PixelRect};
use farm_map_autotile::TileCatalog;
use farm_map_core::{LayerIndex, TileCoord, TileGrid};
use std::collections::BTreeSet;

/// Outcome of drawing one layer or a set of cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Cells blitted to the surface
    pub drawn: usize,
    /// Cells skipped because their sprite sheet is still loading
    pub deferred: Vec<TileCoord>,
}

enum CellDraw {
    Empty,
    Drawn,
    Deferred,
}

/// Pixel rectangle a cell covers on a layer surface, or `None` if it has no
/// position in `u32` pixel space
pub fn cell_pixel_rect(coord: TileCoord, tile_size: u32) -> Option<PixelRect> {
    let x = u32::try_from(coord.x).ok()?.checked_mul(tile_size)?;
    let y = u32::try_from(coord.y).ok()?.checked_mul(tile_size)?;
    Some(PixelRect::new(x, y, tile_size, tile_size))
}

/// Redraw a whole layer
pub fn draw_layer<S: DrawSurface + ?Sized>(
    surface: &mut S,
    grid: &TileGrid,
    layer: LayerIndex,
    catalog: &TileCatalog,
    sheets: &mut SheetCache,
    tile_size: u32,
) -> DrawStats {
    surface.clear();
    let mut coords: Vec<TileCoord> = grid.layer_records(layer).map(|(c, _)| c).collect();
    coords.sort_unstable();

    let mut stats = DrawStats::default();
    for coord in coords {
        record_draw(
            &mut stats,
            coord,
            draw_cell(surface, grid, coord, layer, catalog, sheets, tile_size),
        );
    }
    stats
}

/// Clear and redraw only `changed` cells of a layer
pub fn update_cells<S: DrawSurface + ?Sized>(
    surface: &mut S,
    changed: &BTreeSet<TileCoord>,
    grid: &TileGrid,
    layer: LayerIndex,
    catalog: &TileCatalog,
    sheets: &mut SheetCache,
    tile_size: u32,
) -> DrawStats {
    let mut stats = DrawStats::default();
    for &coord in changed {
        let Some(rect) = cell_pixel_rect(coord, tile_size) else {
            continue;
        };
        surface.clear_rect(rect);
        record_draw(
            &mut stats,
            coord,
            draw_cell(surface, grid, coord, layer, catalog, sheets, tile_size),
        );
    }
    stats
}

fn record_draw(stats: &mut DrawStats, coord: TileCoord, result: CellDraw) {
    match result {
        CellDraw::Drawn => stats.drawn += 1,
        CellDraw::Deferred => stats.deferred.push(coord),
        CellDraw::Empty => {}
    }
}

fn draw_cell<S: DrawSurface + ?Sized>(
    surface: &mut S,
    grid: &TileGrid,
    coord: TileCoord,
    layer: LayerIndex,
    catalog: &TileCatalog,
    sheets: &mut SheetCache,
    tile_size: u32,
) -> CellDraw {
    let Some(record) = grid.record(coord, layer) else {
        return CellDraw::Empty;
    };
    let Some(tile_type) = catalog.get(record.code) else {
        return CellDraw::Empty;
    };
    let (Some(src), Some(dst)) = (
        tile_type.sheet.cell_rect(record.sprite_index),
        cell_pixel_rect(coord, tile_size),
    ) else {
        tracing::debug!(
            "Cell {} of '{}' has no drawable sheet cell {}",
            coord,
            tile_type.name,
            record.sprite_index
        );
        return CellDraw::Empty;
    };

    match sheets.get(&tile_type.sheet.path) {
        Some(image) => {
            surface.blit(&image, src, dst);
            CellDraw::Drawn
        }
        None if sheets.is_failed(&tile_type.sheet.path) => CellDraw::Empty,
        None => {
            sheets.request(&tile_type.sheet.path);
            CellDraw::Deferred
        }
    }
}
