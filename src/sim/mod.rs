/// Game state and the operations that advance it.

pub mod event;
pub mod game;
pub mod level;
pub mod step;
