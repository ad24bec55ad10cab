//! Editor session
//!
//! `EditorSession` owns the one `TileGrid` being edited together with its
//! undo history. Every brush application goes through `apply_brush`; brush
//! applications between `begin_stroke` and `end_stroke` form a single undo
//! entry, the way a mouse-down..mouse-up drag does in the editor.

use crate::commands::{CellChangesCommand, CommandHistory, ReplaceGridCommand};
use crate::config::EditorConfig;
use farm_map_autotile::{
    apply_brush, preview_brush, recalculate_all, repair_kinds, stale_records, BrushStroke,
    BrushTile, TileCatalog,
};
use farm_map_core::{load_grid, save_grid, Cell, SnapshotError, TileCoord, TileGrid};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by session operations
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("Invalid grid size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Grid captured when a stroke began
struct OpenStroke {
    before: TileGrid,
    description: String,
}

/// One editing session over one grid
pub struct EditorSession {
    grid: TileGrid,
    catalog: Arc<TileCatalog>,
    history: CommandHistory,
    stroke: Option<OpenStroke>,
    dirty: bool,
}

impl EditorSession {
    pub fn new(catalog: Arc<TileCatalog>, width: u32, height: u32) -> Self {
        Self::with_grid(catalog, TileGrid::new(width, height), CommandHistory::default())
    }

    pub fn from_config(catalog: Arc<TileCatalog>, config: &EditorConfig) -> Self {
        Self::with_grid(
            catalog,
            TileGrid::new(config.world.width, config.world.height),
            CommandHistory::new(config.history_limit),
        )
    }

    fn with_grid(catalog: Arc<TileCatalog>, grid: TileGrid, history: CommandHistory) -> Self {
        Self {
            grid,
            catalog,
            history,
            stroke: None,
            dirty: false,
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// True when the grid changed since it was created, loaded or saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Apply one brush action and return the updated grid.
    ///
    /// Outside a stroke each effective call becomes its own undo entry.
    pub fn apply_brush(&mut self, stroke: BrushStroke) -> &TileGrid {
        let before = self.grid.clone();
        let report = apply_brush(&mut self.grid, &self.catalog, &stroke);
        if !report.is_noop() {
            self.dirty = true;
            if self.stroke.is_none() {
                let description = stroke_description(&stroke);
                let command = CellChangesCommand::from_diff(&before, &self.grid, description);
                self.history.push_undo(Box::new(command));
            }
        }
        &self.grid
    }

    /// Start grouping brush actions into one undo entry
    pub fn begin_stroke(&mut self, description: impl Into<String>) {
        if self.stroke.is_some() {
            self.end_stroke();
        }
        self.stroke = Some(OpenStroke {
            before: self.grid.clone(),
            description: description.into(),
        });
    }

    /// Close the open stroke. Returns `true` if it produced an undo entry.
    pub fn end_stroke(&mut self) -> bool {
        let Some(open) = self.stroke.take() else {
            return false;
        };
        let command = CellChangesCommand::from_diff(&open.before, &self.grid, open.description);
        if command.is_empty() {
            return false;
        }
        self.history.push_undo(Box::new(command));
        true
    }

    pub fn is_stroke_open(&self) -> bool {
        self.stroke.is_some()
    }

    /// Cells a brush action would produce, without applying it
    pub fn preview(&self, stroke: &BrushStroke) -> Vec<(TileCoord, Option<Cell>)> {
        preview_brush(&self.grid, &self.catalog, stroke)
    }

    pub fn undo(&mut self) -> bool {
        self.end_stroke();
        let undone = self.history.undo(&mut self.grid);
        self.dirty |= undone;
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.end_stroke();
        let redone = self.history.redo(&mut self.grid);
        self.dirty |= redone;
        redone
    }

    /// Replace the grid with an empty one of the same size
    pub fn reset(&mut self) {
        let empty = TileGrid::new(self.grid.width(), self.grid.height());
        self.replace(empty, "Reset".to_string());
    }

    /// Change the grid size, dropping cells outside the new bounds
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EditorError> {
        if width == 0 || height == 0 {
            return Err(EditorError::InvalidSize { width, height });
        }
        let mut resized = self.grid.resized(width, height);
        // cells along the new border lost neighbors
        recalculate_all(&mut resized, &self.catalog);
        self.replace(resized, format!("Resize to {width}x{height}"));
        Ok(())
    }

    /// Load a grid from a snapshot file, replacing the session's grid and history
    pub fn load(&mut self, path: &Path) -> Result<(), EditorError> {
        let mut grid = load_grid(path)?;
        let rekinded = repair_kinds(&mut grid, &self.catalog);
        if rekinded > 0 {
            tracing::warn!("{} records in {:?} had the wrong registry kind", rekinded, path);
        }
        let stale = stale_records(&grid, &self.catalog).len();
        if stale > 0 {
            tracing::warn!("{} stale sprite indices in {:?}, recalculating", stale, path);
            recalculate_all(&mut grid, &self.catalog);
        }
        self.stroke = None;
        self.grid = grid;
        self.history.clear();
        self.dirty = false;
        Ok(())
    }

    pub fn save(&mut self, path: &Path) -> Result<(), EditorError> {
        self.end_stroke();
        save_grid(&self.grid, path)?;
        self.dirty = false;
        Ok(())
    }

    fn replace(&mut self, grid: TileGrid, description: String) {
        self.end_stroke();
        if grid == self.grid {
            return;
        }
        let command = ReplaceGridCommand::new(self.grid.clone(), grid, description);
        self.history.execute(Box::new(command), &mut self.grid);
        self.dirty = true;
    }
}

fn stroke_description(stroke: &BrushStroke) -> String {
    match stroke.tile {
        BrushTile::Paint(code) => format!("Paint {} at {}", code, stroke.center),
        BrushTile::Erase => format!("Erase at {}", stroke.center),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_map_autotile::catalogs::{codes, farm_catalog};
    use farm_map_core::{LayerIndex, RegistryKind, TileRecord};

    fn session(width: u32, height: u32) -> EditorSession {
        EditorSession::new(Arc::new(farm_catalog().unwrap()), width, height)
    }

    fn grass(x: i32, y: i32, radius: u32) -> BrushStroke {
        BrushStroke::paint(TileCoord::new(x, y), radius, codes::GRASS, LayerIndex::TERRAIN)
    }

    #[test]
    fn test_apply_brush_returns_updated_grid() {
        let mut session = session(8, 8);
        let grid = session.apply_brush(grass(3, 3, 1));
        assert_eq!(grid.len(), 9);
        assert_eq!(
            grid.record(TileCoord::new(3, 3), LayerIndex::TERRAIN).map(|r| r.code),
            Some(codes::GRASS)
        );
        assert!(session.is_dirty());
        assert_eq!(session.history().undo_len(), 1);
    }

    #[test]
    fn test_noop_brush_adds_no_history() {
        let mut session = session(8, 8);
        session.apply_brush(grass(3, 3, 0));
        session.apply_brush(grass(3, 3, 0));
        session.apply_brush(BrushStroke::erase(TileCoord::new(6, 6), 0, LayerIndex::TERRAIN));
        assert_eq!(session.history().undo_len(), 1);
    }

    #[test]
    fn test_undo_redo_restores_exactly() {
        let mut session = session(8, 8);
        session.apply_brush(grass(2, 2, 1));
        let after_first = session.grid().clone();
        session.apply_brush(grass(4, 2, 1));
        let after_second = session.grid().clone();

        assert!(session.undo());
        assert_eq!(session.grid(), &after_first);
        assert!(session.undo());
        assert!(session.grid().is_empty());
        assert!(!session.undo());

        assert!(session.redo());
        assert!(session.redo());
        assert_eq!(session.grid(), &after_second);
    }

    #[test]
    fn test_stroke_is_one_history_entry() {
        let mut session = session(16, 16);
        session.begin_stroke("Drag grass");
        for x in 2..8 {
            session.apply_brush(grass(x, 5, 0));
        }
        assert!(session.is_stroke_open());
        assert!(session.end_stroke());
        assert_eq!(session.history().undo_len(), 1);
        assert_eq!(session.history().undo_description(), Some("Drag grass"));

        assert!(session.undo());
        assert!(session.grid().is_empty());
    }

    #[test]
    fn test_empty_stroke_is_dropped() {
        let mut session = session(4, 4);
        session.begin_stroke("Nothing");
        assert!(!session.end_stroke());
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_preview_leaves_grid_untouched() {
        let session = session(4, 4);
        let preview = session.preview(&grass(1, 1, 1));
        assert!(!preview.is_empty());
        assert!(session.grid().is_empty());
    }

    #[test]
    fn test_resize_recalculates_and_undoes() {
        let mut session = session(8, 8);
        session.apply_brush(grass(4, 4, 4));
        let full = session.grid().clone();

        session.resize(4, 4).unwrap();
        assert_eq!(session.grid().width(), 4);
        assert_eq!(session.grid().len(), 16);
        assert!(stale_records(session.grid(), session.catalog()).is_empty());

        assert!(session.undo());
        assert_eq!(session.grid(), &full);
        assert!(matches!(
            session.resize(0, 3),
            Err(EditorError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_reset_is_undoable() {
        let mut session = session(8, 8);
        session.apply_brush(grass(1, 1, 1));
        let painted = session.grid().clone();
        session.reset();
        assert!(session.grid().is_empty());
        session.undo();
        assert_eq!(session.grid(), &painted);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("farm.json");

        let mut session = session(8, 8);
        session.apply_brush(grass(2, 2, 1));
        session.save(&path).unwrap();
        assert!(!session.is_dirty());

        let mut other = EditorSession::new(Arc::new(farm_catalog().unwrap()), 1, 1);
        other.load(&path).unwrap();
        assert_eq!(other.grid(), session.grid());
        assert!(!other.history().can_undo());
    }

    #[test]
    fn test_load_repairs_stale_sprites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stale.json");

        let mut session = session(8, 8);
        session.apply_brush(grass(2, 2, 1));
        let mut broken = session.grid().clone();
        broken.set_sprite_index(TileCoord::new(2, 2), LayerIndex::TERRAIN, 3);
        save_grid(&broken, &path).unwrap();

        let mut other = EditorSession::new(Arc::new(farm_catalog().unwrap()), 8, 8);
        other.load(&path).unwrap();
        assert_eq!(other.grid(), session.grid());
    }

    #[test]
    fn test_load_repairs_registry_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kinds.json");

        let mut session = session(8, 8);
        session.apply_brush(grass(2, 2, 1));
        let center = TileCoord::new(2, 2);
        let mut broken = session.grid().clone();
        let record = *broken.record(center, LayerIndex::TERRAIN).unwrap();
        broken.set_record(
            center,
            LayerIndex::TERRAIN,
            Some(TileRecord {
                kind: RegistryKind::Ground,
                ..record
            }),
        );
        save_grid(&broken, &path).unwrap();

        let mut other = EditorSession::new(Arc::new(farm_catalog().unwrap()), 8, 8);
        other.load(&path).unwrap();
        assert_eq!(
            other.grid().record(center, LayerIndex::TERRAIN).map(|r| r.kind),
            Some(RegistryKind::Terrain)
        );
        assert_eq!(other.grid(), session.grid());
    }

    #[test]
    fn test_load_missing_file() {
        let mut session = session(4, 4);
        let err = session.load(Path::new("/nonexistent/farm.json")).unwrap_err();
        assert!(matches!(err, EditorError::Snapshot(SnapshotError::Io(_))));
    }
}
