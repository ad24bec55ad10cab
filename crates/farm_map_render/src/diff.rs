//! Grid diffing

use farm_map_core::{TileCoord, TileGrid};
use std::collections::BTreeSet;

/// Coordinates whose cells differ between two grids.
///
/// Cells match only if every layer holds the same code and sprite index. A
/// coordinate stored in one grid but not the other always counts as changed.
pub fn diff_grids(prev: &TileGrid, next: &TileGrid) -> BTreeSet<TileCoord> {
    if prev.ptr_eq(next) {
        return BTreeSet::new();
    }

    let mut changed: BTreeSet<TileCoord> = next
        .iter()
        .filter(|(coord, cell)| prev.get(*coord) != Some(*cell))
        .map(|(coord, _)| coord)
        .collect();
    changed.extend(
        prev.iter()
            .filter(|(coord, _)| !next.contains(*coord))
            .map(|(coord, _)| coord),
    );
    changed
}
