/// Keyboard input: turns terminal key events into discrete actions.
///
/// Every Press or Repeat event yields at most one action, kept in arrival
/// order so the game sees each key exactly once. Release events (only
/// reported on terminals with keyboard enhancement) are ignored.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::grid::Dir;

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A'), KeyCode::Char('h')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D'), KeyCode::Char('l')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char('k')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S'), KeyCode::Char('j')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Dir),
    /// Reset any time.
    Restart,
    /// Reset, but only once the round is over.
    Confirm,
    Cheat,
    Quit,
}

/// Map one key event to an action. Ctrl combinations are checked first so
/// Ctrl+W never reads as a plain `w` move.
pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release { return None; }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Quit),
            KeyCode::Char('w') | KeyCode::Char('W') => Some(Action::Cheat),
            _ => None,
        };
    }

    let code = key.code;
    if KEYS_UP.contains(&code) { return Some(Action::Move(Dir::Up)); }
    if KEYS_DOWN.contains(&code) { return Some(Action::Move(Dir::Down)); }
    if KEYS_LEFT.contains(&code) { return Some(Action::Move(Dir::Left)); }
    if KEYS_RIGHT.contains(&code) { return Some(Action::Move(Dir::Right)); }
    if KEYS_RESTART.contains(&code) { return Some(Action::Restart); }
    if KEYS_CONFIRM.contains(&code) { return Some(Action::Confirm); }
    if KEYS_QUIT.contains(&code) { return Some(Action::Quit); }
    None
}

pub struct InputState {
    /// Actions collected during the most recent `drain_events()`.
    actions: Vec<Action>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { actions: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per loop iteration.
    pub fn drain_events(&mut self) -> &[Action] {
        self.actions.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if let Some(action) = action_for(&key) {
                    self.actions.push(action);
                }
            }
        }
        &self.actions
    }
}
