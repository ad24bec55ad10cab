//! Incremental frame rendering
//!
//! `IncrementalRenderer` keeps the grid it last drew. Each frame it diffs the
//! new grid against it and redraws only the changed cells, or the whole of
//! every layer once the change count reaches the full-redraw threshold.

use crate::diff::diff_grids;
use crate::draw::{draw_layer, update_cells, DrawStats};
use crate::sheets::SheetCache;
use crate::surface::DrawSurface;
use farm_map_autotile::TileCatalog;
use farm_map_core::{LayerIndex, TileCoord, TileGrid};
use std::collections::BTreeSet;

/// Change count at which a full redraw replaces per-cell updates
pub const DEFAULT_FULL_REDRAW_THRESHOLD: usize = 256;

/// What a `render` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    /// Nothing changed since the last frame
    Unchanged,
    /// This many cells were redrawn individually
    Partial(usize),
    /// Every layer was redrawn
    Full,
}

/// Redraws only what changed between successive grids
#[derive(Debug, Clone)]
pub struct IncrementalRenderer {
    previous: Option<TileGrid>,
    /// Cells skipped last frame because their sheet was still loading
    deferred: BTreeSet<TileCoord>,
    pub tile_size: u32,
    pub full_redraw_threshold: usize,
}

impl IncrementalRenderer {
    pub fn new(tile_size: u32) -> Self {
        Self {
            previous: None,
            deferred: BTreeSet::new(),
            tile_size,
            full_redraw_threshold: DEFAULT_FULL_REDRAW_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.full_redraw_threshold = threshold;
        self
    }

    /// Forget the previous frame; the next `render` redraws everything.
    ///
    /// Sheets that failed to load stay failed until `SheetCache::retry_failed`.
    pub fn invalidate(&mut self) {
        self.previous = None;
        self.deferred.clear();
    }

    /// The grid drawn by the last `render`
    pub fn previous(&self) -> Option<&TileGrid> {
        self.previous.as_ref()
    }

    /// Draw `grid` onto one surface per layer (`surfaces[i]` is layer `i`)
    pub fn render<S: DrawSurface>(
        &mut self,
        surfaces: &mut [S],
        grid: &TileGrid,
        catalog: &TileCatalog,
        sheets: &mut SheetCache,
    ) -> RenderPass {
        sheets.poll();

        let changed = match &self.previous {
            Some(previous)
                if previous.width() == grid.width() && previous.height() == grid.height() =>
            {
                let mut changed = diff_grids(previous, grid);
                changed.extend(std::mem::take(&mut self.deferred));
                Some(changed)
            }
            _ => None,
        };

        let pass = match changed {
            Some(changed) if changed.is_empty() => RenderPass::Unchanged,
            Some(changed) if changed.len() < self.full_redraw_threshold => {
                let count = changed.len();
                self.draw_layers(surfaces, sheets, |surface, layer, sheets, tile_size| {
                    update_cells(surface, &changed, grid, layer, catalog, sheets, tile_size)
                });
                tracing::trace!("Partial redraw of {} cells", count);
                RenderPass::Partial(count)
            }
            _ => {
                self.deferred.clear();
                self.draw_layers(surfaces, sheets, |surface, layer, sheets, tile_size| {
                    draw_layer(surface, grid, layer, catalog, sheets, tile_size)
                });
                tracing::debug!("Full redraw of {} cells", grid.len());
                RenderPass::Full
            }
        };

        self.previous = Some(grid.clone());
        pass
    }

    fn draw_layers<S, F>(&mut self, surfaces: &mut [S], sheets: &mut SheetCache, mut draw: F)
    where
        S: DrawSurface,
        F: FnMut(&mut S, LayerIndex, &mut SheetCache, u32) -> DrawStats,
    {
        for (layer, surface) in LayerIndex::ALL.into_iter().zip(surfaces.iter_mut()) {
            let stats = draw(surface, layer, sheets, self.tile_size);
            self.deferred.extend(stats.deferred);
        }
    }
}
