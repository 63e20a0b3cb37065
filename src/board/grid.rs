use super::*;
use std::collections::HashSet;
use std::collections::VecDeque;

/// The field rectangle plus the match's obstacle set.
/// Stack positions live in the match state; the grid answers pure
/// geometry questions against a caller-supplied occupancy set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    obstacles: HashSet<Cell>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            obstacles: HashSet::new(),
        }
    }
    pub fn width(&self) -> i32 {
        self.width
    }
    pub fn height(&self) -> i32 {
        self.height
    }
    pub fn cells(&self) -> i32 {
        self.width * self.height
    }
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }
    pub fn obstacle(&self, cell: Cell) -> bool {
        self.obstacles.contains(&cell)
    }
    pub fn obstacles(&self) -> impl Iterator<Item = Cell> + '_ {
        self.obstacles.iter().copied()
    }
    pub fn block(&mut self, cell: Cell) {
        self.obstacles.insert(cell);
    }

    /// Whether a stack may stand on this cell: on the grid, not an
    /// obstacle, not occupied. Holds for flying and grounded units alike.
    pub fn standable(&self, cell: Cell, occupied: &HashSet<Cell>) -> bool {
        self.contains(cell) && !self.obstacle(cell) && !occupied.contains(&cell)
    }

    /// Legal move destinations within `speed` steps of `from`.
    ///
    /// Grounded units expand breadth-first over the eight neighbors with
    /// unit cost; obstacles and occupied cells block the path. Diagonals
    /// squeeze through blocked corners. Flying units ignore blockers along
    /// the way, so their reach collapses to the Chebyshev disc. Either way
    /// the destination must be standable, and `from` is never returned.
    pub fn reach(&self, from: Cell, speed: i32, flying: bool, occupied: &HashSet<Cell>) -> Vec<Cell> {
        let mut out = if flying {
            self.disc(from, speed)
                .filter(|c| self.standable(*c, occupied))
                .collect::<Vec<_>>()
        } else {
            self.flood(from, speed, occupied)
        };
        out.sort_unstable();
        out
    }

    fn disc(&self, from: Cell, radius: i32) -> impl Iterator<Item = Cell> + '_ {
        (0..self.width)
            .flat_map(|x| (0..self.height).map(move |y| Cell::new(x, y)))
            .filter(move |c| *c != from && from.cheb(*c) <= radius)
    }

    fn flood(&self, from: Cell, speed: i32, occupied: &HashSet<Cell>) -> Vec<Cell> {
        let mut seen = HashSet::from([from]);
        let mut frontier = VecDeque::from([(from, 0)]);
        let mut out = Vec::new();
        while let Some((cell, cost)) = frontier.pop_front() {
            if cost == speed {
                continue;
            }
            for next in cell.neighbors() {
                if seen.contains(&next) || !self.standable(next, occupied) {
                    continue;
                }
                seen.insert(next);
                out.push(next);
                frontier.push_back((next, cost + 1));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(pairs: &[(i32, i32)]) -> HashSet<Cell> {
        pairs.iter().map(|p| Cell::from(*p)).collect()
    }

    #[test]
    fn bounds() {
        let grid = Grid::new(5, 5);
        assert!(grid.contains(Cell::new(0, 0)));
        assert!(grid.contains(Cell::new(4, 4)));
        assert!(!grid.contains(Cell::new(5, 0)));
        assert!(!grid.contains(Cell::new(0, -1)));
    }

    #[test]
    fn reach_open_field() {
        let grid = Grid::new(5, 5);
        let out = grid.reach(Cell::new(2, 2), 1, false, &HashSet::new());
        assert_eq!(out.len(), 8);
        let out = grid.reach(Cell::new(2, 2), 2, false, &HashSet::new());
        assert_eq!(out.len(), 24);
    }

    #[test]
    fn reach_excludes_own_cell() {
        let grid = Grid::new(5, 5);
        let from = Cell::new(2, 2);
        assert!(!grid.reach(from, 3, false, &HashSet::new()).contains(&from));
        assert!(!grid.reach(from, 3, true, &HashSet::new()).contains(&from));
    }

    #[test]
    fn zero_speed_cannot_move() {
        let grid = Grid::new(5, 5);
        assert!(grid.reach(Cell::new(2, 2), 0, false, &HashSet::new()).is_empty());
        assert!(grid.reach(Cell::new(2, 2), 0, true, &HashSet::new()).is_empty());
    }

    #[test]
    fn walls_block_grounded_paths() {
        // wall splits the field; a grounded unit with speed 2 cannot cross
        let mut grid = Grid::new(5, 3);
        grid.block(Cell::new(2, 0));
        grid.block(Cell::new(2, 1));
        grid.block(Cell::new(2, 2));
        let out = grid.reach(Cell::new(1, 1), 2, false, &HashSet::new());
        assert!(out.iter().all(|c| c.x < 2));
    }

    #[test]
    fn flying_crosses_walls_but_lands_clear() {
        let mut grid = Grid::new(5, 3);
        grid.block(Cell::new(2, 0));
        grid.block(Cell::new(2, 1));
        grid.block(Cell::new(2, 2));
        let out = grid.reach(Cell::new(1, 1), 2, true, &HashSet::new());
        assert!(out.contains(&Cell::new(3, 1)));
        assert!(!out.contains(&Cell::new(2, 1)));
    }

    #[test]
    fn stacks_block_grounded_not_flying() {
        let grid = Grid::new(5, 1);
        let occupied = cells(&[(1, 0)]);
        let grounded = grid.reach(Cell::new(0, 0), 3, false, &occupied);
        assert!(grounded.is_empty());
        let flying = grid.reach(Cell::new(0, 0), 3, true, &occupied);
        assert!(flying.contains(&Cell::new(2, 0)));
        assert!(!flying.contains(&Cell::new(1, 0)));
    }

    #[test]
    fn diagonal_squeeze_is_legal() {
        // both orthogonal neighbors blocked, diagonal still passes
        let mut grid = Grid::new(3, 3);
        grid.block(Cell::new(1, 0));
        grid.block(Cell::new(0, 1));
        let out = grid.reach(Cell::new(0, 0), 1, false, &HashSet::new());
        assert_eq!(out, vec![Cell::new(1, 1)]);
    }
}
