/// Entities: Player, Enemy, collectible kinds, and the input intents
/// the front end feeds into the game.

use super::grid::{Dir, Position};

/// Score value of a regular dot.
pub const DOT_VALUE: u32 = 1;
/// Score value of a bonus dot.
pub const BONUS_VALUE: u32 = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Collectible {
    Dot,
    Bonus,
}

impl Collectible {
    pub fn value(self) -> u32 {
        match self {
            Collectible::Dot => DOT_VALUE,
            Collectible::Bonus => BONUS_VALUE,
        }
    }
}

/// Discrete input intent. Carries no payload beyond its kind
/// (and the direction for moves).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Move(Dir),
    Reset,
    Cheat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub pos: Position,
    /// Last successful move direction; only the renderer cares.
    pub facing: Dir,
}

impl Player {
    pub fn new(pos: Position) -> Self {
        Player { pos, facing: Dir::Right }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    pub id: usize,
    pub pos: Position,
    /// Kept between ticks until the enemy is blocked.
    pub heading: Dir,
}

impl Enemy {
    pub fn new(id: usize, pos: Position, heading: Dir) -> Self {
        Enemy { id, pos, heading }
    }
}
