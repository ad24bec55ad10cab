//! Layer export to PNG

use crate::config::RenderConfig;
use farm_map_autotile::TileCatalog;
use farm_map_core::{LayerIndex, TileGrid, LAYER_COUNT};
use farm_map_render::{ImageSurface, RenderPass, SheetCache};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Render every layer of `grid` to its own image.
///
/// Waits up to `sheet_timeout` for sprite sheets to load; cells whose sheet is
/// still missing after that stay transparent.
pub fn render_layers(
    grid: &TileGrid,
    catalog: &TileCatalog,
    sheets: &mut SheetCache,
    settings: &RenderConfig,
    sheet_timeout: Duration,
) -> Vec<RgbaImage> {
    let width = grid.width().saturating_mul(settings.tile_size);
    let height = grid.height().saturating_mul(settings.tile_size);
    let mut surfaces: Vec<ImageSurface> = (0..LAYER_COUNT)
        .map(|_| ImageSurface::new(width, height))
        .collect();

    let mut renderer = settings.renderer();
    renderer.render(&mut surfaces, grid, catalog, sheets);
    if sheets.pending() > 0 {
        if !sheets.wait_idle(sheet_timeout) {
            tracing::warn!("Timed out waiting for {} sprite sheets", sheets.pending());
        }
        // Second pass draws the cells deferred while sheets loaded
        if let RenderPass::Partial(count) = renderer.render(&mut surfaces, grid, catalog, sheets) {
            tracing::debug!("Drew {} deferred cells", count);
        }
    }

    surfaces.into_iter().map(ImageSurface::into_image).collect()
}

/// Write layer images as `<dir>/layer_<index>.png`, returning the paths
pub fn save_layers(images: &[RgbaImage], dir: &Path) -> Result<Vec<PathBuf>, image::ImageError> {
    std::fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(images.len());
    for (layer, image) in LayerIndex::ALL.into_iter().zip(images) {
        let path = dir.join(format!("layer_{}.png", layer.index()));
        image.save(&path)?;
        tracing::info!("Wrote {:?}", path);
        paths.push(path);
    }
    Ok(paths)
}
