/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info, warn, Level};

use config::{GameConfig, LogConfig, Mode};
use domain::entity::Intent;
use sim::event::GameEvent;
use sim::game::{Game, Status};
use sim::level;
use ui::gamepad::GamepadState;
use ui::input::{Action, InputState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
/// How long a status message stays up, in game frames.
const MESSAGE_FRAMES: u32 = 120;

#[derive(Parser, Debug)]
#[command(name = "dotmaze", version, about = "Eat every dot, dodge the wanderers")]
struct Cli {
    /// Config file (default: config.toml next to the binary or in the CWD)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Game seed; the same seed replays the same mazes
    #[arg(long)]
    seed: Option<u64>,
    /// Play the fixed classic maze instead of a generated one
    #[arg(long)]
    classic: bool,
    /// Fixed layout file (implies --classic)
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Generated maze rows (odd, >= 5)
    #[arg(long)]
    rows: Option<usize>,
    /// Generated maze columns (odd, >= 5)
    #[arg(long)]
    cols: Option<usize>,
    /// Number of enemies in generated mazes
    #[arg(long)]
    enemies: Option<usize>,
    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Log level: error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = GameConfig::load(cli.config.as_deref());
    apply_cli(&mut config, &cli);
    init_logging(&config.log);

    let mut game = match level::settings_from_config(&config).and_then(|s| Game::new(s, config.seed)) {
        Ok(g) => g,
        Err(e) => {
            error!(error = %e, "setup failed");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        // Raw mode may already be on.
        let _ = renderer.cleanup();
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut game, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "game loop failed");
        eprintln!("Game error: {e}");
        return ExitCode::FAILURE;
    }

    info!(score = game.score(), seed = game.seed(), "quit");
    println!();
    println!("Thanks for playing!");
    println!("Final Score: {}  (replay with --seed {})", game.score(), game.seed());
    ExitCode::SUCCESS
}

/// Command-line flags override config.toml.
fn apply_cli(config: &mut GameConfig, cli: &Cli) {
    if cli.seed.is_some() { config.seed = cli.seed; }
    if cli.classic { config.mode = Mode::Classic; }
    if let Some(path) = &cli.layout {
        config.mode = Mode::Classic;
        config.layout_file = Some(path.clone());
    }
    if let Some(rows) = cli.rows { config.maze.rows = rows; }
    if let Some(cols) = cli.cols { config.maze.cols = cols; }
    if let Some(n) = cli.enemies { config.placement.enemy_count = n; }
    if cli.log_file.is_some() { config.log.file = cli.log_file.clone(); }
    if let Some(level) = &cli.log_level { config.log.level = level.clone(); }
}

/// The terminal owns stdout/stderr, so logs only go to a file.
/// Without one, tracing macros are no-ops.
fn init_logging(cfg: &LogConfig) {
    let path = match &cfg.file {
        Some(p) => p,
        None => return,
    };
    let level = cfg.level.parse::<Level>().unwrap_or_else(|_| {
        eprintln!("Warning: unknown log level {:?}, using info", cfg.level);
        Level::INFO
    });
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", path.display());
            return;
        }
    };
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
}

// ── Status message ──

#[derive(Default)]
struct Message {
    text: String,
    frames_left: u32,
}

impl Message {
    fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.frames_left = MESSAGE_FRAMES;
    }

    fn tick(&mut self) {
        if self.frames_left > 0 {
            self.frames_left -= 1;
            if self.frames_left == 0 { self.text.clear(); }
        }
    }
}

fn game_loop(
    game: &mut Game,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected { info!("gamepad connected"); }
    let mut message = Message::default();
    let mut last_frame = Instant::now();
    let frame_rate = Duration::from_millis(config.speed.frame_ms);

    loop {
        let mut actions = kb.drain_events().to_vec();
        actions.extend(gp.update());

        for action in actions {
            let intent = match action {
                Action::Quit => return Ok(()),
                // Enter only restarts a finished round.
                Action::Confirm if game.status() == Status::Playing => continue,
                Action::Confirm | Action::Restart => Intent::Reset,
                Action::Cheat => Intent::Cheat,
                Action::Move(dir) => Intent::Move(dir),
            };
            match game.apply(intent) {
                Ok(events) => process_events(game, sound, &mut message, &events),
                Err(e) => {
                    warn!(error = %e, "reset failed");
                    message.set(format!("Reset failed: {e}"));
                }
            }
        }

        if last_frame.elapsed() >= frame_rate {
            let events = game.frame();
            process_events(game, sound, &mut message, &events);
            message.tick();
            last_frame = Instant::now();
        }

        renderer.render(game, &message.text)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}

fn process_events(game: &Game, sound: Option<&SoundEngine>, message: &mut Message, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::AllCleared => message.set("All clear!"),
            GameEvent::PlayerCaught { .. } => message.set("Caught!"),
            GameEvent::CheatUsed { awarded } => message.set(format!("Cheat: +{awarded}")),
            GameEvent::GameReset { seed } => match game.mode() {
                Mode::Generated => message.set(format!("New maze (round seed {seed})")),
                Mode::Classic => message.set("Reset"),
            },
            _ => {}
        }
    }

    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::DotCollected { .. } => sfx.play_dot(),
            GameEvent::BonusCollected { .. } => sfx.play_bonus(),
            GameEvent::AllCleared => sfx.play_win(),
            GameEvent::PlayerCaught { .. } => sfx.play_caught(),
            GameEvent::CheatUsed { .. } => sfx.play_cheat(),
            GameEvent::GameReset { .. } => sfx.play_reset(),
            GameEvent::EnemiesMoved => {}
        }
    }
}
