/// Typed errors for game construction.
///
/// Play itself never fails: blocked moves are no-ops and losing is a
/// normal outcome. Only building a game (settings validation, layout
/// parsing, entity placement) can go wrong.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("maze dimensions {rows}x{cols} are invalid: both must be odd and at least 5")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("enemy_move_frames must be at least 1")]
    ZeroEnemyCadence,

    #[error("placed only {placed} of {wanted} enemies after {attempts} attempts")]
    EnemyPlacementExhausted { placed: usize, wanted: usize, attempts: u32 },

    #[error(transparent)]
    Level(#[from] LevelError),
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read layout {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("layout has no rows")]
    Empty,

    #[error("unknown glyph {glyph:?} at line {line}, column {column}")]
    UnknownGlyph { glyph: char, line: usize, column: usize },

    #[error("layout has more than one player start")]
    MultipleStarts,

    #[error("layout has no player start ('P')")]
    MissingStart,

    #[error("player start ({x}, {y}) is not an open cell")]
    StartNotOpen { x: usize, y: usize },
}
