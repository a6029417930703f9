/// Entity placement: collectibles and enemies on a finished grid.
///
/// Collectibles: every open cell except the player start is classified
/// exactly once, in row-major order. First a bonus draw (`p_bonus`);
/// only if that misses, an independent dot draw (`p_dot`). The two draws
/// are not complements, so observed dot density is `(1 - p_bonus) * p_dot`.
///
/// Enemies: rejection sampling of uniform random cells until `count`
/// distinct open cells (never the player start) are found, each with a
/// uniform random heading. Attempts are capped; running out is an error
/// rather than an endless loop.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::warn;

use super::entity::Enemy;
use super::grid::{Dir, Grid, Position};
use crate::error::SetupError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Collectibles {
    pub dots: BTreeSet<Position>,
    pub bonus: BTreeSet<Position>,
}

pub fn scatter_collectibles(
    grid: &Grid,
    start: Position,
    p_bonus: f64,
    p_dot: f64,
    rng: &mut impl Rng,
) -> Collectibles {
    let mut out = Collectibles::default();
    for pos in grid.open_cells() {
        if pos == start { continue; }
        if rng.gen::<f64>() < p_bonus {
            out.bonus.insert(pos);
        } else if rng.gen::<f64>() < p_dot {
            out.dots.insert(pos);
        }
    }
    out
}

pub fn random_heading(rng: &mut impl Rng) -> Dir {
    Dir::ALL[rng.gen_range(0..Dir::ALL.len())]
}

pub fn place_enemies(
    grid: &Grid,
    start: Position,
    count: usize,
    max_attempts: u32,
    rng: &mut impl Rng,
) -> Result<Vec<Enemy>, SetupError> {
    let mut enemies: Vec<Enemy> = Vec::with_capacity(count);
    let mut attempts = 0;

    while enemies.len() < count {
        if attempts >= max_attempts {
            warn!(placed = enemies.len(), wanted = count, attempts, "enemy placement gave up");
            return Err(SetupError::EnemyPlacementExhausted {
                placed: enemies.len(),
                wanted: count,
                attempts,
            });
        }
        attempts += 1;

        let pos = Position::new(rng.gen_range(0..grid.cols()), rng.gen_range(0..grid.rows()));
        if !grid.is_open(pos) || pos == start { continue; }
        if enemies.iter().any(|e| e.pos == pos) { continue; }

        let heading = random_heading(rng);
        enemies.push(Enemy::new(enemies.len(), pos, heading));
    }

    Ok(enemies)
}
