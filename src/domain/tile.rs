/// Cell kinds of the maze topology.
/// Collectibles are NOT tiles: they live in the game's dot sets,
/// so the grid stays immutable for the whole life of a game.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Wall,
    Open,
}

impl Tile {
    /// Can the player or an enemy occupy this cell?
    pub fn is_open(self) -> bool {
        matches!(self, Tile::Open)
    }

    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Wall
    }
}
