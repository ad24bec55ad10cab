//! Cell coordinates and their canonical string key

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Integer cell coordinate. `y` grows downward, matching sprite sheet rows.
///
/// The canonical key form is `"x,y"` (see the `Display` and `FromStr` impls),
/// which is what the persistence format stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate shifted by `(dx, dy)`, wrapping at the `i32` limits.
    ///
    /// A wrapped result lands on the far side of the plane and is out of
    /// bounds for any grid, so neighbor lookups at the extremes find nothing.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// Coordinate shifted by `(dx, dy)`, or `None` if it leaves the `i32` range
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// The 8 surrounding coordinates, clockwise from north.
    ///
    /// Bounds are not checked here; the grid decides which of them exist.
    pub fn neighbors(self) -> [TileCoord; 8] {
        [
            self.offset(0, -1),
            self.offset(1, -1),
            self.offset(1, 0),
            self.offset(1, 1),
            self.offset(0, 1),
            self.offset(-1, 1),
            self.offset(-1, 0),
            self.offset(-1, -1),
        ]
    }

    /// Canonical storage key, `"x,y"`
    pub fn key(&self) -> String {
        self.to_string()
    }
}

// Row-major order so that persisted grids and diffs list cells top to bottom.
impl Ord for TileCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for TileCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Error parsing a `"x,y"` coordinate key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordParseError {
    #[error("coordinate key '{0}' is missing a ',' separator")]
    MissingSeparator(String),
    #[error("coordinate key '{0}' has a non-integer component")]
    InvalidComponent(String),
}

impl FromStr for TileCoord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| CoordParseError::MissingSeparator(s.to_string()))?;
        let x = x
            .trim()
            .parse()
            .map_err(|_| CoordParseError::InvalidComponent(s.to_string()))?;
        let y = y
            .trim()
            .parse()
            .map_err(|_| CoordParseError::InvalidComponent(s.to_string()))?;
        Ok(Self { x, y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roundtrip() {
        let coord = TileCoord::new(-3, 12);
        assert_eq!(coord.key(), "-3,12");
        assert_eq!("-3,12".parse::<TileCoord>().unwrap(), coord);
        assert_eq!(" 4 , 5".parse::<TileCoord>().unwrap(), TileCoord::new(4, 5));
    }

    #[test]
    fn test_invalid_keys() {
        assert_eq!(
            "12".parse::<TileCoord>(),
            Err(CoordParseError::MissingSeparator("12".to_string()))
        );
        assert!(matches!(
            "a,1".parse::<TileCoord>(),
            Err(CoordParseError::InvalidComponent(_))
        ));
    }

    #[test]
    fn test_row_major_ordering() {
        let mut coords = vec![
            TileCoord::new(1, 1),
            TileCoord::new(5, 0),
            TileCoord::new(0, 1),
        ];
        coords.sort();
        assert_eq!(
            coords,
            vec![
                TileCoord::new(5, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_neighbors_clockwise_from_north() {
        let n = TileCoord::new(0, 0).neighbors();
        assert_eq!(n[0], TileCoord::new(0, -1));
        assert_eq!(n[2], TileCoord::new(1, 0));
        assert_eq!(n[4], TileCoord::new(0, 1));
        assert_eq!(n[6], TileCoord::new(-1, 0));
        assert_eq!(n[7], TileCoord::new(-1, -1));
    }

    #[test]
    fn test_offset_at_i32_limits() {
        let edge = TileCoord::new(i32::MAX, 0);
        assert_eq!(edge.checked_offset(1, 0), None);
        assert_eq!(edge.checked_offset(-1, 2), Some(TileCoord::new(i32::MAX - 1, 2)));
        // wrapped neighbors stay out of bounds instead of panicking
        assert_eq!(edge.neighbors()[2], TileCoord::new(i32::MIN, 0));
    }
}
