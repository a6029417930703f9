/// Events emitted by game operations.
/// The front end consumes these for sounds and status messages.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    DotCollected { x: usize, y: usize },
    BonusCollected { x: usize, y: usize },
    /// Both collectible sets ran empty on a move.
    AllCleared,
    PlayerCaught { x: usize, y: usize },
    CheatUsed { awarded: u32 },
    EnemiesMoved,
    GameReset { seed: u64 },
}
