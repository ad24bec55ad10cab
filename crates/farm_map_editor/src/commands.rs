//! Command pattern for undo/redo

use farm_map_core::{Cell, TileCoord, TileGrid};
use farm_map_render::diff_grids;
use std::collections::{BTreeMap, VecDeque};

/// A grid edit that can be undone/redone
pub trait Command: Send + Sync {
    /// Execute the command (do/redo)
    fn execute(&self, grid: &mut TileGrid);
    /// Undo the command
    fn undo(&self, grid: &mut TileGrid);
    /// Get a description of the command
    fn description(&self) -> &str;
}

/// Cell changes of a paint stroke, sprite recalculations included
pub struct CellChangesCommand {
    /// Changes: coord -> (old_cell, new_cell); an empty cell means absent
    pub changes: BTreeMap<TileCoord, (Cell, Cell)>,
    description: String,
}

impl CellChangesCommand {
    pub fn new(changes: BTreeMap<TileCoord, (Cell, Cell)>, description: impl Into<String>) -> Self {
        Self {
            changes,
            description: description.into(),
        }
    }

    /// Create from before/after grids of the same size
    pub fn from_diff(before: &TileGrid, after: &TileGrid, description: impl Into<String>) -> Self {
        let changes = diff_grids(before, after)
            .into_iter()
            .map(|coord| {
                let old = before.get(coord).copied().unwrap_or_default();
                let new = after.get(coord).copied().unwrap_or_default();
                (coord, (old, new))
            })
            .collect();
        Self::new(changes, description)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl Command for CellChangesCommand {
    fn execute(&self, grid: &mut TileGrid) {
        for (coord, (_, new_cell)) in &self.changes {
            grid.set_cell(*coord, *new_cell);
        }
    }

    fn undo(&self, grid: &mut TileGrid) {
        for (coord, (old_cell, _)) in &self.changes {
            grid.set_cell(*coord, *old_cell);
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Whole-grid replacement (resize, reset, load).
///
/// Grids share storage until edited, so holding both sides is cheap.
pub struct ReplaceGridCommand {
    before: TileGrid,
    after: TileGrid,
    description: String,
}

impl ReplaceGridCommand {
    pub fn new(before: TileGrid, after: TileGrid, description: impl Into<String>) -> Self {
        Self {
            before,
            after,
            description: description.into(),
        }
    }
}

impl Command for ReplaceGridCommand {
    fn execute(&self, grid: &mut TileGrid) {
        *grid = self.after.clone();
    }

    fn undo(&self, grid: &mut TileGrid) {
        *grid = self.before.clone();
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Undo/redo stacks with a bounded undo depth
pub struct CommandHistory {
    /// Commands that have been executed, oldest first
    undo_stack: VecDeque<Box<dyn Command>>,
    /// Commands that have been undone
    redo_stack: Vec<Box<dyn Command>>,
    limit: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl CommandHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Execute a command and add it to history
    pub fn execute(&mut self, command: Box<dyn Command>, grid: &mut TileGrid) {
        command.execute(grid);
        self.push_undo(command);
    }

    /// Undo the last command. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self, grid: &mut TileGrid) -> bool {
        let Some(command) = self.undo_stack.pop_back() else {
            return false;
        };
        command.undo(grid);
        tracing::debug!("Undo: {}", command.description());
        self.redo_stack.push(command);
        true
    }

    /// Redo the last undone command. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self, grid: &mut TileGrid) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        command.execute(grid);
        tracing::debug!("Redo: {}", command.description());
        self.undo_stack.push_back(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get description of command to undo
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description())
    }

    /// Get description of command to redo
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Push a command directly onto the undo stack without executing it.
    /// Use this when the changes have already been applied (e.g., during painting).
    pub fn push_undo(&mut self, command: Box<dyn Command>) {
        self.undo_stack.push_back(command);
        self.redo_stack.clear();
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_map_core::{LayerIndex, RegistryKind, TileCode, TileRecord};

    fn record(code: u16) -> Option<TileRecord> {
        Some(TileRecord::new(RegistryKind::Terrain, TileCode(code)))
    }

    fn edited(grid: &TileGrid, x: i32, code: u16) -> TileGrid {
        let mut next = grid.clone();
        next.set_record(TileCoord::new(x, 0), LayerIndex::TERRAIN, record(code));
        next
    }

    #[test]
    fn test_cell_changes_round_trip() {
        let mut grid = TileGrid::new(4, 4);
        grid.set_record(TileCoord::new(0, 0), LayerIndex::TERRAIN, record(1));
        let before = grid.clone();
        let mut after = edited(&grid, 1, 2);
        after.set_record(TileCoord::new(0, 0), LayerIndex::TERRAIN, None);

        let command = CellChangesCommand::from_diff(&before, &after, "Paint");
        assert_eq!(command.changes.len(), 2);

        command.execute(&mut grid);
        assert_eq!(grid, after);
        command.undo(&mut grid);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_history_undo_redo() {
        let mut grid = TileGrid::new(4, 4);
        let mut history = CommandHistory::new(10);
        assert!(!history.undo(&mut grid));

        let first = edited(&grid, 0, 1);
        history.execute(Box::new(ReplaceGridCommand::new(grid.clone(), first.clone(), "One")), &mut grid);
        let second = edited(&grid, 1, 1);
        history.execute(Box::new(ReplaceGridCommand::new(grid.clone(), second.clone(), "Two")), &mut grid);
        assert_eq!(history.undo_description(), Some("Two"));

        assert!(history.undo(&mut grid));
        assert_eq!(grid, first);
        assert_eq!(history.redo_description(), Some("Two"));
        assert!(history.redo(&mut grid));
        assert_eq!(grid, second);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_command_clears_redo() {
        let mut grid = TileGrid::new(4, 4);
        let mut history = CommandHistory::default();
        let next = edited(&grid, 0, 1);
        history.execute(Box::new(ReplaceGridCommand::new(grid.clone(), next, "One")), &mut grid);
        history.undo(&mut grid);
        assert!(history.can_redo());

        let other = edited(&grid, 2, 1);
        history.execute(Box::new(ReplaceGridCommand::new(grid.clone(), other, "Other")), &mut grid);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut grid = TileGrid::new(8, 1);
        let mut history = CommandHistory::new(3);
        for x in 0..5 {
            let next = edited(&grid, x, 1);
            history.execute(
                Box::new(ReplaceGridCommand::new(grid.clone(), next, format!("Paint {x}"))),
                &mut grid,
            );
        }
        assert_eq!(history.undo_len(), 3);
        while history.undo(&mut grid) {}
        // the first two edits can no longer be undone
        assert_eq!(grid.len(), 2);
    }
}
