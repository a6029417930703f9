/// Game: the complete state of one running game, plus the settings it
/// was built from.
///
/// ## Topology vs. gameplay state
///
/// The `Grid` holds walls and open cells only and is replaced wholesale on
/// reset. Dots and bonus dots live in their own ordered sets; collecting
/// one removes it from its set and never touches the grid.
///
/// ## Randomness
///
/// A game owns two generators. `seeder` is seeded once from the game seed
/// and only hands out one round seed per reset. `rng` is re-seeded from
/// that round seed and drives the maze, placement and enemy wandering of
/// the round. The same game seed therefore replays the same sequence of
/// mazes regardless of how each round was played.
///
/// Operations live in `step.rs` (play) and `level.rs` (reset).

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::config::{MazeConfig, Mode, PlacementConfig};
use crate::domain::entity::{Enemy, Player};
use crate::domain::grid::{Grid, Position};
use crate::domain::maze;
use crate::domain::tile::Tile;
use crate::error::SetupError;
use super::level::Layout;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

/// Where each round's maze comes from.
#[derive(Clone, Debug)]
pub enum MazeSource {
    /// Fresh randomized maze per reset.
    Generated,
    /// Same layout every reset (embedded classic or a layout file).
    Fixed(Layout),
}

#[derive(Clone, Debug)]
pub struct GameSettings {
    pub source: MazeSource,
    pub maze: MazeConfig,
    pub placement: PlacementConfig,
    /// Enemies step once every this many frames.
    pub enemy_move_frames: u32,
}

impl GameSettings {
    pub fn mode(&self) -> Mode {
        match self.source {
            MazeSource::Generated => Mode::Generated,
            MazeSource::Fixed(_) => Mode::Classic,
        }
    }

    /// Reject settings that could only produce a degenerate game.
    pub fn validate(&self) -> Result<(), SetupError> {
        if let MazeSource::Generated = self.source {
            maze::validate_dimensions(self.maze.rows, self.maze.cols)?;
        }
        check_probability("bonus_chance", self.placement.bonus_chance)?;
        check_probability("dot_chance", self.placement.dot_chance)?;
        if self.enemy_move_frames == 0 {
            return Err(SetupError::ZeroEnemyCadence);
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), SetupError> {
    // NaN fails `contains` as well.
    if !(0.0..=1.0).contains(&value) {
        return Err(SetupError::InvalidProbability { name, value });
    }
    Ok(())
}

pub struct Game {
    pub(super) settings: GameSettings,

    // ── Randomness ──
    pub(super) seed: u64,
    pub(super) seeder: StdRng,
    pub(super) round_seed: u64,
    pub(super) rng: StdRng,

    // ── Round state (rebuilt by reset) ──
    pub(super) grid: Grid,
    pub(super) player: Player,
    pub(super) dots: BTreeSet<Position>,
    pub(super) bonus: BTreeSet<Position>,
    pub(super) enemies: Vec<Enemy>,
    pub(super) score: u32,
    pub(super) status: Status,

    // ── Frame counters ──
    pub(super) frames: u64,
    pub(super) enemy_move_counter: u32,
}

// ── Construction ──

impl Game {
    /// Validate `settings`, seed the generators and build the first round.
    /// Without a seed, one is drawn from the OS and logged so the game can
    /// be replayed.
    pub fn new(settings: GameSettings, seed: Option<u64>) -> Result<Game, SetupError> {
        settings.validate()?;
        let seed = seed.unwrap_or_else(rand::random);
        info!(seed, mode = ?settings.mode(), "new game");

        let mut game = Game {
            settings,
            seed,
            seeder: StdRng::seed_from_u64(seed),
            round_seed: seed,
            rng: StdRng::seed_from_u64(seed),
            grid: Grid::filled(0, 0, Tile::Wall),
            player: Player::new(maze::START),
            dots: BTreeSet::new(),
            bonus: BTreeSet::new(),
            enemies: vec![],
            score: 0,
            status: Status::Playing,
            frames: 0,
            enemy_move_counter: 0,
        };
        game.reset()?;
        Ok(game)
    }
}

// ── Read-only accessors ──

impl Game {
    pub fn mode(&self) -> Mode { self.settings.mode() }
    pub fn grid(&self) -> &Grid { &self.grid }
    pub fn player(&self) -> &Player { &self.player }
    pub fn dots(&self) -> &BTreeSet<Position> { &self.dots }
    pub fn bonus(&self) -> &BTreeSet<Position> { &self.bonus }
    pub fn enemies(&self) -> &[Enemy] { &self.enemies }
    pub fn score(&self) -> u32 { self.score }
    pub fn status(&self) -> Status { self.status }

    /// Seed the game was created with.
    pub fn seed(&self) -> u64 { self.seed }
    /// Seed of the current round.
    #[cfg(test)]
    pub fn round_seed(&self) -> u64 { self.round_seed }

    pub fn frames(&self) -> u64 { self.frames }
    #[cfg(test)]
    pub fn enemy_move_counter(&self) -> u32 { self.enemy_move_counter }

    pub fn enemy_at(&self, pos: Position) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.pos == pos)
    }
}
