/// Maze generator: randomized depth-first carving on a 2-step lattice.
///
/// Carve points are the cells with odd (x, y). Starting at (1, 1), each
/// carve point visits its four 2-step neighbours in shuffled order; an
/// unvisited neighbour gets its connecting midpoint and itself opened,
/// then becomes the current point. The result is a spanning tree over
/// every carve point, with 1-cell walls between corridors and a 1-cell
/// wall border all around.
///
/// The walk uses an explicit stack of frames instead of recursion, so
/// memory stays bounded by the number of carve points. Each frame
/// shuffles its directions on entry, which keeps the random draw order
/// identical to the recursive formulation.

use rand::seq::SliceRandom;
use rand::Rng;

use super::grid::{Dir, Grid, Position};
use super::tile::Tile;
use crate::error::SetupError;

pub const MIN_SIDE: usize = 5;

/// Start cell of every generated maze.
pub const START: Position = Position::new(1, 1);

struct Frame {
    pos: Position,
    dirs: [Dir; 4],
    next: usize,
}

impl Frame {
    fn enter(pos: Position, rng: &mut impl Rng) -> Self {
        let mut dirs = Dir::ALL;
        dirs.shuffle(rng);
        Frame { pos, dirs, next: 0 }
    }
}

/// Check that `rows × cols` can host a lattice maze.
pub fn validate_dimensions(rows: usize, cols: usize) -> Result<(), SetupError> {
    if rows < MIN_SIDE || cols < MIN_SIDE || rows % 2 == 0 || cols % 2 == 0 {
        return Err(SetupError::InvalidDimensions { rows, cols });
    }
    Ok(())
}

/// Generate a `rows × cols` maze whose open cells form a tree rooted at
/// [`START`].
pub fn generate(rows: usize, cols: usize, rng: &mut impl Rng) -> Result<Grid, SetupError> {
    validate_dimensions(rows, cols)?;

    let mut grid = Grid::filled(rows, cols, Tile::Wall);
    grid.set(START.x, START.y, Tile::Open);

    let mut stack = vec![Frame::enter(START, rng)];

    while let Some(top) = stack.last_mut() {
        if top.next >= top.dirs.len() {
            stack.pop();
            continue;
        }
        let dir = top.dirs[top.next];
        top.next += 1;
        let here = top.pos;

        let (dx, dy) = dir.delta();
        let tx = here.x as i64 + 2 * dx as i64;
        let ty = here.y as i64 + 2 * dy as i64;
        if !is_interior(&grid, tx, ty) { continue; }

        let (tx, ty) = (tx as usize, ty as usize);
        if grid.tile_at(tx, ty).is_open() { continue; }

        let mx = (here.x + tx) / 2;
        let my = (here.y + ty) / 2;
        grid.set(mx, my, Tile::Open);
        grid.set(tx, ty, Tile::Open);
        stack.push(Frame::enter(Position::new(tx, ty), rng));
    }

    Ok(grid)
}

/// Inside the 1-cell wall border?
fn is_interior(grid: &Grid, x: i64, y: i64) -> bool {
    x >= 1 && y >= 1 && x <= grid.cols() as i64 - 2 && y <= grid.rows() as i64 - 2
}
