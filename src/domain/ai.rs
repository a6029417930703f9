/// Enemy AI: memoryless local wandering.
///
/// An enemy keeps its heading while the next cell is open. When blocked,
/// it picks uniformly among the open directions around it (reversing is
/// allowed) and steps that way. Fully boxed in: it stays put and keeps
/// its heading. No pathfinding, no knowledge of where the player is.

use rand::seq::SliceRandom;
use rand::Rng;

use super::entity::Enemy;
use super::grid::{Dir, Grid, Position};

/// Where `enemy` goes this tick and which way it faces afterwards.
pub fn next_step(grid: &Grid, enemy: &Enemy, rng: &mut impl Rng) -> (Position, Dir) {
    if let Some(next) = grid.open_neighbor(enemy.pos, enemy.heading) {
        return (next, enemy.heading);
    }

    let options: Vec<(Dir, Position)> = Dir::ALL
        .iter()
        .filter_map(|&d| grid.open_neighbor(enemy.pos, d).map(|p| (d, p)))
        .collect();

    match options.choose(rng) {
        Some(&(dir, pos)) => (pos, dir),
        None => (enemy.pos, enemy.heading),
    }
}
