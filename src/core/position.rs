//! Board coordinates.
//!
//! Distances use the Chebyshev metric (king moves): diagonal steps cost
//! the same as orthogonal ones. Ranges, movement allowances, shield
//! proximity and AoE radii are all measured this way.

use serde::{Deserialize, Serialize};

/// A square on the board. `(0, 0)` is the bottom-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance to another square.
    ///
    /// ```
    /// use tactics_engine::core::Position;
    ///
    /// assert_eq!(Position::new(0, 0).distance(Position::new(2, 1)), 2);
    /// assert_eq!(Position::new(3, 3).distance(Position::new(3, 3)), 0);
    /// ```
    #[must_use]
    pub fn distance(self, other: Position) -> u32 {
        (self.x - other.x).unsigned_abs().max((self.y - other.y).unsigned_abs())
    }

    /// Check if the square lies on a `width` x `height` board.
    #[must_use]
    pub fn in_bounds(self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as u32) < width && (self.y as u32) < height
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_chebyshev() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.distance(Position::new(1, 1)), 1);
        assert_eq!(origin.distance(Position::new(-3, 1)), 3);
        assert_eq!(origin.distance(Position::new(2, 5)), 5);
    }

    #[test]
    fn test_in_bounds() {
        assert!(Position::new(0, 0).in_bounds(8, 8));
        assert!(Position::new(7, 7).in_bounds(8, 8));
        assert!(!Position::new(8, 0).in_bounds(8, 8));
        assert!(!Position::new(0, -1).in_bounds(8, 8));
    }
}
