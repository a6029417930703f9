/// Pure game model: grid topology, entities, maze generation, placement
/// and enemy AI. No I/O lives here.

pub mod ai;
pub mod entity;
pub mod grid;
pub mod maze;
pub mod placement;
pub mod tile;
