/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD), or from
/// an explicit `--config` path. Falls back to sensible defaults if the
/// file is missing or incomplete; command-line flags are applied on top
/// by `main`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    /// Fresh random maze on every reset.
    Generated,
    /// The fixed maze (embedded, or a layout file).
    Classic,
}

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub mode: Mode,
    pub layout_file: Option<PathBuf>,
    pub seed: Option<u64>,
    pub maze: MazeConfig,
    pub placement: PlacementConfig,
    pub speed: SpeedConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MazeConfig {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementConfig {
    pub bonus_chance: f64,
    pub dot_chance: f64,
    pub enemy_count: usize,
    pub max_attempts: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedConfig {
    pub frame_ms: u64,
    pub enemy_move_frames: u32, // enemies step once every N frames
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub cheat: Vec<String>,   // all must be held together
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    maze: TomlMaze,
    #[serde(default)]
    placement: TomlPlacement,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_mode")]
    mode: String,
    #[serde(default)]
    layout_file: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlMaze {
    #[serde(default = "default_rows")]
    rows: usize,
    #[serde(default = "default_cols")]
    cols: usize,
}

#[derive(Deserialize, Debug)]
struct TomlPlacement {
    #[serde(default = "default_bonus_chance")]
    bonus_chance: f64,
    #[serde(default = "default_dot_chance")]
    dot_chance: f64,
    #[serde(default = "default_enemy_count")]
    enemy_count: usize,
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_enemy_move_frames")]
    enemy_move_frames: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_cheat")]
    cheat: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default)]
    file: Option<String>,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_mode() -> String { "generated".into() }
fn default_rows() -> usize { 21 }
fn default_cols() -> usize { 31 }
fn default_bonus_chance() -> f64 { 0.05 }
fn default_dot_chance() -> f64 { 0.7 }
fn default_enemy_count() -> usize { 3 }
fn default_max_attempts() -> u32 { 10_000 }
fn default_frame_ms() -> u64 { 16 }           // ~60 fps
fn default_enemy_move_frames() -> u32 { 20 }  // ~3 enemy steps per second

fn default_cheat() -> Vec<String> { vec!["L2".into(), "R2".into()] }
fn default_restart() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_level() -> String { "info".into() }

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame { mode: default_mode(), layout_file: None, seed: None }
    }
}

impl Default for TomlMaze {
    fn default() -> Self {
        TomlMaze { rows: default_rows(), cols: default_cols() }
    }
}

impl Default for TomlPlacement {
    fn default() -> Self {
        TomlPlacement {
            bonus_chance: default_bonus_chance(),
            dot_chance: default_dot_chance(),
            enemy_count: default_enemy_count(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            frame_ms: default_frame_ms(),
            enemy_move_frames: default_enemy_move_frames(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            cheat: default_cheat(),
            restart: default_restart(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: None, level: default_log_level() }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// With `explicit` set, only that file is read. Otherwise the search
    /// order is (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let toml_cfg = match explicit {
            Some(path) => load_file(path).unwrap_or_default(),
            None => load_toml(&candidate_dirs()),
        };
        GameConfig::from_toml(toml_cfg)
    }

    /// Parse a config document. Errors fall back to defaults with a warning.
    pub fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig::from_toml(cfg),
            Err(e) => {
                eprintln!("Warning: config.toml parse error: {e}");
                eprintln!("Using default settings.");
                GameConfig::default()
            }
        }
    }

    fn from_toml(t: TomlConfig) -> Self {
        let mode = match t.game.mode.to_lowercase().as_str() {
            "classic" | "fixed" => Mode::Classic,
            "generated" | "random" => Mode::Generated,
            other => {
                eprintln!("Warning: unknown mode {other:?}, using generated");
                Mode::Generated
            }
        };

        GameConfig {
            mode,
            layout_file: t.game.layout_file.map(PathBuf::from),
            seed: t.game.seed,
            maze: MazeConfig { rows: t.maze.rows, cols: t.maze.cols },
            placement: PlacementConfig {
                bonus_chance: t.placement.bonus_chance,
                dot_chance: t.placement.dot_chance,
                enemy_count: t.placement.enemy_count,
                max_attempts: t.placement.max_attempts,
            },
            speed: SpeedConfig {
                frame_ms: t.speed.frame_ms.max(1),
                enemy_move_frames: t.speed.enemy_move_frames,
            },
            gamepad: GamepadConfig {
                cheat: t.gamepad.cheat,
                restart: t.gamepad.restart,
                quit: t.gamepad.quit,
            },
            log: LogConfig {
                file: t.log.file.map(PathBuf::from),
                level: t.log.level,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            if let Some(cfg) = load_file(&path) {
                return cfg;
            }
            return TomlConfig::default();
        }
    }
    TomlConfig::default()
}

fn load_file(path: &Path) -> Option<TomlConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                eprintln!("Warning: {} parse error: {e}", path.display());
                eprintln!("Using default settings.");
                None
            }
        },
        Err(e) => {
            eprintln!("Warning: could not read {}: {e}", path.display());
            None
        }
    }
}
