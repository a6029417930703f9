/// Grid model: fixed-size 2D array of tiles plus the coordinate types
/// every other module speaks in.
///
/// Coordinates: `x` = column, `y` = row, both 0-based.
/// Anything outside `[0, cols) × [0, rows)` reads as a wall, so callers
/// never have to bounds-check before asking "is this open?".

use std::collections::VecDeque;

use super::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }
}

/// Cardinal direction. Used both as a player move intent and as an
/// enemy heading.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    /// Unit vector (dx, dy); y grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Tile>>,
}

impl Grid {
    /// A `rows × cols` grid with every cell set to `tile`.
    pub fn filled(rows: usize, cols: usize, tile: Tile) -> Self {
        Grid { rows, cols, cells: vec![vec![tile; cols]; rows] }
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.cols && (y as usize) < self.rows
    }

    /// Tile at (x, y). Out of bounds = wall.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        if x < self.cols && y < self.rows {
            self.cells[y][x]
        } else {
            Tile::Wall
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if x < self.cols && y < self.rows {
            self.cells[y][x] = tile;
        }
    }

    #[inline]
    pub fn is_open(&self, pos: Position) -> bool {
        self.tile_at(pos.x, pos.y).is_open()
    }

    /// The in-bounds neighbour of `pos` in direction `dir`, open or not.
    pub fn neighbor(&self, pos: Position, dir: Dir) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let nx = pos.x as i64 + dx as i64;
        let ny = pos.y as i64 + dy as i64;
        if !self.in_bounds(nx, ny) { return None; }
        Some(Position::new(nx as usize, ny as usize))
    }

    /// The neighbour of `pos` in direction `dir`, only if it is an open cell.
    pub fn open_neighbor(&self, pos: Position, dir: Dir) -> Option<Position> {
        self.neighbor(pos, dir).filter(|&n| self.is_open(n))
    }

    /// All open cells in row-major order.
    pub fn open_cells(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if tile.is_open() {
                    cells.push(Position::new(x, y));
                }
            }
        }
        cells
    }

    pub fn open_count(&self) -> usize {
        self.cells.iter().flatten().filter(|t| t.is_open()).count()
    }

    /// Flood fill over open cells. `result[y][x]` is true when (x, y)
    /// can be reached from `start` walking only through open cells.
    pub fn reachable_from(&self, start: Position) -> Vec<Vec<bool>> {
        let mut seen = vec![vec![false; self.cols]; self.rows];
        if !self.is_open(start) { return seen; }

        let mut queue = VecDeque::new();
        seen[start.y][start.x] = true;
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            for dir in Dir::ALL {
                if let Some(next) = self.open_neighbor(pos, dir) {
                    if !seen[next.y][next.x] {
                        seen[next.y][next.x] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        seen
    }

    /// Count of open cells NOT reachable from `start`.
    pub fn unreachable_count(&self, start: Position) -> usize {
        let seen = self.reachable_from(start);
        self.open_cells()
            .into_iter()
            .filter(|p| !seen[p.y][p.x])
            .count()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a Grid from a string diagram.
    /// Legend: '#' = wall, anything else = open.
    pub(crate) fn grid_from(rows: &[&str]) -> Grid {
        let h = rows.len();
        let w = rows[0].len();
        let mut g = Grid::filled(h, w, Tile::Wall);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch != '#' {
                    g.set(x, y, Tile::Open);
                }
            }
        }
        g
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let g = grid_from(&["  ", "  "]);
        assert_eq!(g.tile_at(2, 0), Tile::Wall);
        assert_eq!(g.tile_at(0, 2), Tile::Wall);
        assert!(!g.is_open(Position::new(5, 5)));
    }

    #[test]
    fn neighbor_respects_bounds() {
        let g = grid_from(&["   ", "   "]);
        assert_eq!(g.neighbor(Position::new(0, 0), Dir::Left), None);
        assert_eq!(g.neighbor(Position::new(0, 0), Dir::Up), None);
        assert_eq!(g.neighbor(Position::new(2, 1), Dir::Right), None);
        assert_eq!(g.neighbor(Position::new(2, 1), Dir::Down), None);
        assert_eq!(g.neighbor(Position::new(1, 1), Dir::Up), Some(Position::new(1, 0)));
    }

    #[test]
    fn open_neighbor_skips_walls() {
        let g = grid_from(&[
            " # ",
            "   ",
        ]);
        assert_eq!(g.open_neighbor(Position::new(0, 0), Dir::Right), None);
        assert_eq!(g.open_neighbor(Position::new(0, 0), Dir::Down), Some(Position::new(0, 1)));
    }

    #[test]
    fn open_cells_row_major() {
        let g = grid_from(&[
            "# ",
            " #",
        ]);
        assert_eq!(g.open_cells(), vec![Position::new(1, 0), Position::new(0, 1)]);
        assert_eq!(g.open_count(), 2);
    }

    #[test]
    fn flood_fill_stops_at_walls() {
        let g = grid_from(&[
            "  # ",
            "  # ",
            "### ",
        ]);
        let seen = g.reachable_from(Position::new(0, 0));
        assert!(seen[1][1]);
        assert!(!seen[0][3]);
        assert_eq!(g.unreachable_count(Position::new(0, 0)), 3);
    }

    #[test]
    fn flood_fill_from_wall_is_empty() {
        let g = grid_from(&["# "]);
        let seen = g.reachable_from(Position::new(0, 0));
        assert!(!seen[0][1]);
    }
}
