use serde::Deserialize;
use serde::Serialize;

/// A coordinate on the battle field.
/// Signed so that neighbor expansion can step off-grid and get rejected
/// by bounds checks instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
    /// Chebyshev distance, the grid metric for attack range.
    /// Diagonal steps count the same as orthogonal ones.
    pub fn cheb(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
    /// Melee reach is exactly one king-move away.
    pub fn touches(self, other: Self) -> bool {
        self.cheb(other) == 1
    }
    /// The eight king-move neighbors, unbounded.
    pub fn neighbors(self) -> impl Iterator<Item = Cell> {
        const STEPS: [(i32, i32); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];
        STEPS
            .into_iter()
            .map(move |(dx, dy)| Cell::new(self.x + dx, self.y + dy))
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
