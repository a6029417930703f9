/// Level loader and round reset.
///
/// ## Sources
///   - Generated: a fresh maze from `domain::maze` per reset, with
///     collectibles and enemies placed by `domain::placement`.
///   - Fixed: the embedded classic maze, or a layout file.
///
/// ## Layout format (`.txt`):
///   One text row per grid row. Lines starting with `;` are comments.
///   Shorter rows are padded with walls to the longest row.
///
/// ## Tile legend:
///   '#' = Wall          ' ' = Open
///   '.' = Dot           'o' = Bonus dot
///   'E' = Enemy spawn   'P' = Player start

use std::collections::BTreeSet;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::{GameConfig, Mode};
use crate::domain::entity::{Enemy, Player};
use crate::domain::grid::{Grid, Position};
use crate::domain::maze;
use crate::domain::placement::{self, Collectibles};
use crate::domain::tile::Tile;
use crate::error::{LevelError, SetupError};
use super::event::GameEvent;
use super::game::{Game, GameSettings, MazeSource, Status};

/// A parsed fixed layout. Reset copies it into the running game.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub grid: Grid,
    pub start: Position,
    pub dots: BTreeSet<Position>,
    pub bonus: BTreeSet<Position>,
    /// Enemy spawn cells; headings are rolled on every reset.
    pub enemies: Vec<Position>,
}

/// Player start of the embedded classic maze, which has no 'P'.
pub const CLASSIC_START: Position = Position::new(9, 9);

const CLASSIC_MAP: [&str; 21] = [
    "####################",
    "#........##........#",
    "#.##.###.##.###.##.#",
    "#..................#",
    "#.##.#.######.#.##.#",
    "#....#...##...#....#",
    "####.### ## ###.####",
    "   #.#        #.#   ",
    "####.# ##  ## #.####",
    "    .  #    #  .    ",
    "####.# ###### #.####",
    "   #.#        #.#   ",
    "####.### ## ###.####",
    "#........##........#",
    "#.##.###.##.###.##.#",
    "#..#............#..#",
    "##.#.#.######.#.#.##",
    "#....#...##...#....#",
    "#.######.##.######.#",
    "#..................#",
    "####################",
];

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// The embedded classic maze.
pub fn classic() -> Result<Layout, LevelError> {
    parse_layout(&CLASSIC_MAP.join("\n"), Some(CLASSIC_START))
}

/// Read and parse a layout file.
pub fn load_layout(path: &Path) -> Result<Layout, LevelError> {
    let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let layout = parse_layout(&text, None)?;
    info!(path = %path.display(), rows = layout.grid.rows(), cols = layout.grid.cols(), "layout loaded");
    Ok(layout)
}

/// Parse a layout document. `fallback_start` is used when the layout
/// has no 'P'.
pub fn parse_layout(text: &str, fallback_start: Option<Position>) -> Result<Layout, LevelError> {
    // (file line number, row text)
    let mut rows: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.starts_with(';'))
        .collect();

    while rows.first().map_or(false, |(_, l)| l.is_empty()) { rows.remove(0); }
    while rows.last().map_or(false, |(_, l)| l.is_empty()) { rows.pop(); }
    if rows.is_empty() { return Err(LevelError::Empty); }

    let height = rows.len();
    let width = rows.iter().map(|(_, l)| l.chars().count()).max().unwrap_or(0);
    if width == 0 { return Err(LevelError::Empty); }

    let mut grid = Grid::filled(height, width, Tile::Wall);
    let mut dots = BTreeSet::new();
    let mut bonus = BTreeSet::new();
    let mut enemies = vec![];
    let mut start = None;

    for (y, (line_no, row)) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            let pos = Position::new(x, y);
            match ch {
                '#' => continue,
                ' ' => {}
                '.' => { dots.insert(pos); }
                'o' => { bonus.insert(pos); }
                'E' => enemies.push(pos),
                'P' => {
                    if start.is_some() { return Err(LevelError::MultipleStarts); }
                    start = Some(pos);
                }
                other => {
                    return Err(LevelError::UnknownGlyph { glyph: other, line: *line_no, column: x + 1 });
                }
            }
            grid.set(x, y, Tile::Open);
        }
    }

    let start = start.or(fallback_start).ok_or(LevelError::MissingStart)?;
    if !grid.is_open(start) {
        return Err(LevelError::StartNotOpen { x: start.x, y: start.y });
    }

    Ok(Layout { grid, start, dots, bonus, enemies })
}

/// Turn the loaded configuration into game settings, loading the fixed
/// layout when classic mode is selected.
pub fn settings_from_config(cfg: &GameConfig) -> Result<GameSettings, SetupError> {
    let source = match cfg.mode {
        Mode::Generated => MazeSource::Generated,
        Mode::Classic => match &cfg.layout_file {
            Some(path) => MazeSource::Fixed(load_layout(path)?),
            None => MazeSource::Fixed(classic()?),
        },
    };
    if let MazeSource::Fixed(layout) = &source {
        let stranded = layout.grid.unreachable_count(layout.start);
        if stranded > 0 {
            warn!(stranded, "layout has open cells the player cannot reach");
        }
    }
    Ok(GameSettings {
        source,
        maze: cfg.maze,
        placement: cfg.placement,
        enemy_move_frames: cfg.speed.enemy_move_frames,
    })
}

// ══════════════════════════════════════════════════════════════
// Reset
// ══════════════════════════════════════════════════════════════

struct Round {
    grid: Grid,
    start: Position,
    collectibles: Collectibles,
    enemies: Vec<Enemy>,
}

impl Game {
    /// Start a new round: fresh maze (or the fixed layout again), fresh
    /// collectibles and enemies, player at the start, score zero, Playing.
    ///
    /// No win check happens here; the first successful move does it.
    /// On error the current round is left untouched.
    pub fn reset(&mut self) -> Result<Vec<GameEvent>, SetupError> {
        let round_seed = self.seeder.gen::<u64>();
        let mut rng = StdRng::seed_from_u64(round_seed);

        let round = build_round(&self.settings, &mut rng)?;

        self.round_seed = round_seed;
        self.rng = rng;
        self.grid = round.grid;
        self.player = Player::new(round.start);
        self.dots = round.collectibles.dots;
        self.bonus = round.collectibles.bonus;
        self.enemies = round.enemies;
        self.score = 0;
        self.status = Status::Playing;
        self.frames = 0;
        self.enemy_move_counter = 0;

        info!(
            round_seed,
            mode = ?self.settings.mode(),
            rows = self.grid.rows(),
            cols = self.grid.cols(),
            dots = self.dots.len(),
            bonus = self.bonus.len(),
            enemies = self.enemies.len(),
            "round ready"
        );
        Ok(vec![GameEvent::GameReset { seed: round_seed }])
    }
}

fn build_round(settings: &GameSettings, rng: &mut StdRng) -> Result<Round, SetupError> {
    match &settings.source {
        MazeSource::Generated => {
            let (rows, cols) = (settings.maze.rows, settings.maze.cols);
            let grid = maze::generate(rows, cols, rng)?;
            debug!(open = grid.open_count(), "maze carved");

            let p = &settings.placement;
            let collectibles =
                placement::scatter_collectibles(&grid, maze::START, p.bonus_chance, p.dot_chance, rng);
            let enemies =
                placement::place_enemies(&grid, maze::START, p.enemy_count, p.max_attempts, rng)?;
            Ok(Round { grid, start: maze::START, collectibles, enemies })
        }
        MazeSource::Fixed(layout) => {
            let enemies = layout
                .enemies
                .iter()
                .enumerate()
                .map(|(id, &pos)| Enemy::new(id, pos, placement::random_heading(rng)))
                .collect();
            Ok(Round {
                grid: layout.grid.clone(),
                start: layout.start,
                collectibles: Collectibles {
                    dots: layout.dots.clone(),
                    bonus: layout.bonus.clone(),
                },
                enemies,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::game::tests::{game_from, generated_settings};
    use crate::domain::grid::Dir;

    #[test]
    fn classic_maze_shape() {
        let layout = classic().unwrap();
        assert_eq!(layout.grid.rows(), 21);
        assert_eq!(layout.grid.cols(), 20);
        assert_eq!(layout.start, CLASSIC_START);
        assert!(layout.grid.is_open(CLASSIC_START));
        assert!(layout.bonus.is_empty());
        assert!(layout.enemies.is_empty());

        let expected: usize = CLASSIC_MAP.iter().map(|r| r.matches('.').count()).sum();
        assert_eq!(layout.dots.len(), expected);
        assert!(!layout.dots.contains(&CLASSIC_START));
    }

    #[test]
    fn classic_dots_reachable_from_start() {
        let layout = classic().unwrap();
        let seen = layout.grid.reachable_from(layout.start);
        for d in &layout.dots {
            assert!(seen[d.y][d.x], "dot at {d:?} unreachable");
        }
    }

    #[test]
    fn classic_side_openings_are_walled_off_by_bounds() {
        let layout = classic().unwrap();
        // Row 9 is open at both edges; leaving the grid is still blocked.
        assert!(layout.grid.is_open(Position::new(0, 9)));
        assert_eq!(layout.grid.open_neighbor(Position::new(0, 9), Dir::Left), None);
    }

    #[test]
    fn parse_full_legend() {
        let layout = parse_layout(
            "#####\n\
             #P.o#\n\
             # E #\n\
             #####",
            None,
        )
        .unwrap();
        assert_eq!(layout.start, Position::new(1, 1));
        assert_eq!(layout.dots, BTreeSet::from([Position::new(2, 1)]));
        assert_eq!(layout.bonus, BTreeSet::from([Position::new(3, 1)]));
        assert_eq!(layout.enemies, vec![Position::new(2, 2)]);
        assert!(layout.grid.is_open(Position::new(1, 2)));
        assert!(layout.grid.tile_at(0, 0).is_wall());
    }

    #[test]
    fn comments_and_crlf_are_skipped() {
        let layout = parse_layout("; a comment\r\n###\r\n#P#\r\n###\r\n", None).unwrap();
        assert_eq!(layout.grid.rows(), 3);
        assert_eq!(layout.start, Position::new(1, 1));
    }

    #[test]
    fn short_rows_padded_with_walls() {
        let layout = parse_layout("#####\n#P\n#####", None).unwrap();
        assert_eq!(layout.grid.cols(), 5);
        assert!(layout.grid.tile_at(3, 1).is_wall());
        assert!(layout.grid.tile_at(4, 1).is_wall());
    }

    #[test]
    fn unknown_glyph_reports_position() {
        // Line numbers count comment lines too.
        let err = parse_layout(";hdr\n###\n#P$\n", None).unwrap_err();
        assert!(matches!(err, LevelError::UnknownGlyph { glyph: '$', line: 3, column: 3 }));
    }

    #[test]
    fn start_errors() {
        assert!(matches!(parse_layout("P P", None), Err(LevelError::MultipleStarts)));
        assert!(matches!(parse_layout(" . ", None), Err(LevelError::MissingStart)));
        assert!(matches!(
            parse_layout("# .", Some(Position::new(0, 0))),
            Err(LevelError::StartNotOpen { x: 0, y: 0 })
        ));
        assert!(matches!(parse_layout("; only\n\n", None), Err(LevelError::Empty)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_layout(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
    }

    #[test]
    fn settings_follow_mode() {
        let mut cfg = GameConfig::default();
        assert!(matches!(settings_from_config(&cfg).unwrap().source, MazeSource::Generated));

        cfg.mode = Mode::Classic;
        match settings_from_config(&cfg).unwrap().source {
            MazeSource::Fixed(layout) => assert_eq!(layout.start, CLASSIC_START),
            MazeSource::Generated => panic!("expected the classic layout"),
        }

        cfg.layout_file = Some("/definitely/not/here.txt".into());
        assert!(matches!(settings_from_config(&cfg), Err(SetupError::Level(LevelError::Io { .. }))));
    }

    #[test]
    fn reset_restores_fixed_layout() {
        let mut g = game_from(&["#####", "#P..#", "#####"], 10);
        g.move_player(Dir::Right);
        assert_eq!(g.dots().len(), 1);
        assert_eq!(g.score(), 1);

        let events = g.reset().unwrap();
        assert!(matches!(events.as_slice(), [GameEvent::GameReset { .. }]));
        assert_eq!(g.dots().len(), 2);
        assert_eq!(g.score(), 0);
        assert_eq!(g.player().pos, Position::new(1, 1));
        assert_eq!(g.status(), Status::Playing);
    }

    #[test]
    fn reset_yields_fresh_connected_round() {
        let mut g = Game::new(generated_settings(15, 21), Some(3)).unwrap();
        for _ in 0..25 {
            let before = g.round_seed();
            g.reset().unwrap();
            assert_ne!(g.round_seed(), before);
            assert_eq!(g.status(), Status::Playing);
            assert_eq!(g.score(), 0);
            assert_eq!(g.player().pos, maze::START);
            assert_eq!(g.grid().unreachable_count(maze::START), 0);
            assert!(g.enemies().iter().all(|e| e.pos != maze::START));
            assert!(!g.dots().contains(&maze::START));
            assert!(!g.bonus().contains(&maze::START));
        }
    }

    #[test]
    fn failed_reset_keeps_current_round() {
        // Generated mode with more enemies than a 5x5 maze can hold.
        let mut s = generated_settings(5, 5);
        s.placement.enemy_count = 3;
        s.placement.max_attempts = 2_000;
        let mut g = Game::new(s, Some(0)).unwrap();
        let grid = g.grid().clone();
        let seed = g.round_seed();

        g.settings.placement.enemy_count = 10;
        let err = g.reset().unwrap_err();
        assert!(matches!(err, SetupError::EnemyPlacementExhausted { wanted: 10, .. }));
        assert_eq!(g.grid(), &grid);
        assert_eq!(g.round_seed(), seed);
    }
}
