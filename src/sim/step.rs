/// Play operations: player moves, the per-frame enemy tick, collisions
/// and the cheat.
///
/// Every operation is a no-op unless the game is Playing, and none of
/// them can fail: a blocked move simply does nothing.
///
/// Frame order:
///   1. Advance the enemy-move counter
///   2. Move enemies when the counter reaches `enemy_move_frames`
///   3. Collision check (every frame, moved or not)

use tracing::info;

use crate::domain::ai;
use crate::domain::entity::{Collectible, Intent};
use crate::domain::grid::Dir;
use crate::error::SetupError;
use super::event::GameEvent;
use super::game::{Game, Status};

// ══════════════════════════════════════════════════════════════
// Intent routing
// ══════════════════════════════════════════════════════════════

impl Game {
    /// Apply one discrete input intent. Only reset can fail.
    pub fn apply(&mut self, intent: Intent) -> Result<Vec<GameEvent>, SetupError> {
        match intent {
            Intent::Move(dir) => Ok(self.move_player(dir)),
            Intent::Reset => self.reset(),
            Intent::Cheat => Ok(self.cheat()),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

impl Game {
    pub fn move_player(&mut self, dir: Dir) -> Vec<GameEvent> {
        if self.status != Status::Playing { return vec![]; }
        let next = match self.grid.open_neighbor(self.player.pos, dir) {
            Some(p) => p,
            None => return vec![],
        };

        let mut events = Vec::new();
        self.player.pos = next;
        self.player.facing = dir;

        if self.dots.remove(&next) {
            self.score += Collectible::Dot.value();
            events.push(GameEvent::DotCollected { x: next.x, y: next.y });
        }
        if self.bonus.remove(&next) {
            self.score += Collectible::Bonus.value();
            events.push(GameEvent::BonusCollected { x: next.x, y: next.y });
        }

        if self.dots.is_empty() && self.bonus.is_empty() {
            self.status = Status::Won;
            info!(score = self.score, round_seed = self.round_seed, "all dots cleared");
            events.push(GameEvent::AllCleared);
        }
        events
    }
}

// ══════════════════════════════════════════════════════════════
// Frame tick: enemies + collisions
// ══════════════════════════════════════════════════════════════

impl Game {
    pub fn frame(&mut self) -> Vec<GameEvent> {
        if self.status != Status::Playing { return vec![]; }

        let mut events = Vec::new();
        self.frames += 1;
        self.enemy_move_counter += 1;

        if self.enemy_move_counter >= self.settings.enemy_move_frames {
            self.enemy_move_counter = 0;
            events.extend(self.move_enemies());
        }
        events.extend(self.check_collisions());
        events
    }

    /// Step every enemy once, in id order.
    pub fn move_enemies(&mut self) -> Vec<GameEvent> {
        if self.status != Status::Playing { return vec![]; }
        if self.enemies.is_empty() { return vec![]; }

        for enemy in self.enemies.iter_mut() {
            let (pos, heading) = ai::next_step(&self.grid, enemy, &mut self.rng);
            enemy.pos = pos;
            enemy.heading = heading;
        }
        vec![GameEvent::EnemiesMoved]
    }

    pub fn check_collisions(&mut self) -> Vec<GameEvent> {
        if self.status != Status::Playing { return vec![]; }

        let pos = self.player.pos;
        if let Some(enemy) = self.enemies.iter().find(|e| e.pos == pos) {
            info!(enemy = enemy.id, x = pos.x, y = pos.y, score = self.score, round_seed = self.round_seed, "player caught");
            self.status = Status::Lost;
            return vec![GameEvent::PlayerCaught { x: pos.x, y: pos.y }];
        }
        vec![]
    }
}

// ══════════════════════════════════════════════════════════════
// Cheat
// ══════════════════════════════════════════════════════════════

impl Game {
    /// Collect everything left at face value and win on the spot.
    pub fn cheat(&mut self) -> Vec<GameEvent> {
        if self.status != Status::Playing { return vec![]; }

        let awarded = self.dots.len() as u32 * Collectible::Dot.value()
            + self.bonus.len() as u32 * Collectible::Bonus.value();
        self.score += awarded;
        self.dots.clear();
        self.bonus.clear();
        self.status = Status::Won;

        info!(awarded, score = self.score, "cheat used");
        vec![GameEvent::CheatUsed { awarded }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Position;
    use crate::domain::maze;
    use crate::sim::game::tests::{game_from, generated_settings};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn corridor_with_enemy() -> Game {
        // Enemy at (7,1) can only ever head left.
        game_from(&[
            "#########",
            "#P.    E#",
            "#########",
        ], 3)
    }

    // ── Player movement ──

    #[test]
    fn wall_move_is_a_noop() {
        let mut g = game_from(&[
            "#####",
            "#P.##",
            "#####",
        ], 10);
        assert!(g.move_player(Dir::Up).is_empty());
        assert!(g.move_player(Dir::Left).is_empty());
        assert_eq!(g.player().pos, Position::new(1, 1));
        assert_eq!(g.score(), 0);
        assert_eq!(g.dots().len(), 1);
    }

    #[test]
    fn out_of_bounds_move_is_a_noop() {
        let mut g = game_from(&["P.."], 10);
        assert!(g.move_player(Dir::Left).is_empty());
        assert!(g.move_player(Dir::Up).is_empty());
        assert!(g.move_player(Dir::Down).is_empty());
        assert_eq!(g.player().pos, Position::new(0, 0));
    }

    #[test]
    fn open_move_without_dot_changes_nothing_else() {
        let mut g = game_from(&["P .."], 10);
        assert!(g.move_player(Dir::Right).is_empty());
        assert_eq!(g.player().pos, Position::new(1, 0));
        assert_eq!(g.player().facing, Dir::Right);
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn dot_worth_one() {
        let mut g = game_from(&["P.."], 10);
        let events = g.move_player(Dir::Right);
        assert_eq!(events, vec![GameEvent::DotCollected { x: 1, y: 0 }]);
        assert_eq!(g.score(), 1);
        assert_eq!(g.dots().len(), 1);
        assert_eq!(g.status(), Status::Playing);
    }

    #[test]
    fn bonus_worth_five() {
        let mut g = game_from(&["Po."], 10);
        let events = g.move_player(Dir::Right);
        assert_eq!(events, vec![GameEvent::BonusCollected { x: 1, y: 0 }]);
        assert_eq!(g.score(), 5);
        assert!(g.bonus().is_empty());
        assert_eq!(g.status(), Status::Playing);
    }

    #[test]
    fn revisiting_a_cleared_cell_scores_nothing() {
        let mut g = game_from(&["P.."], 10);
        g.move_player(Dir::Right);
        g.move_player(Dir::Left);
        assert!(g.move_player(Dir::Right).is_empty());
        assert_eq!(g.score(), 1);
    }

    #[test]
    fn win_needs_both_sets_empty() {
        let mut g = game_from(&["P.o"], 10);
        g.move_player(Dir::Right);
        assert_eq!(g.status(), Status::Playing);
        let events = g.move_player(Dir::Right);
        assert_eq!(events, vec![
            GameEvent::BonusCollected { x: 2, y: 0 },
            GameEvent::AllCleared,
        ]);
        assert_eq!(g.status(), Status::Won);
        assert_eq!(g.score(), 6);
    }

    #[test]
    fn moves_ignored_once_won() {
        let mut g = game_from(&["P. "], 10);
        g.move_player(Dir::Right);
        assert_eq!(g.status(), Status::Won);
        assert!(g.move_player(Dir::Right).is_empty());
        assert_eq!(g.player().pos, Position::new(1, 0));
    }

    #[test]
    fn empty_round_wins_on_first_move() {
        let mut g = game_from(&[
            "#########",
            "#P   E  #",
            "# E   E #",
            "#########",
        ], 10);
        assert_eq!(g.enemies().len(), 3);
        assert_eq!(g.status(), Status::Playing);
        let events = g.move_player(Dir::Right);
        assert_eq!(events, vec![GameEvent::AllCleared]);
        assert_eq!(g.status(), Status::Won);
    }

    #[test]
    fn blocked_first_move_does_not_win() {
        let mut g = game_from(&["###", "#P#", "# #"], 10);
        g.move_player(Dir::Up);
        assert_eq!(g.status(), Status::Playing);
        g.move_player(Dir::Down);
        assert_eq!(g.status(), Status::Won);
    }

    // ── Cheat ──

    #[test]
    fn cheat_awards_remaining_and_wins() {
        let mut g = game_from(&[
            "#######",
            "#P. .o#",
            "#######",
        ], 10);
        assert_eq!(g.dots().len(), 2);
        assert_eq!(g.bonus().len(), 1);
        let events = g.cheat();
        assert_eq!(events, vec![GameEvent::CheatUsed { awarded: 7 }]);
        assert_eq!(g.score(), 7);
        assert!(g.dots().is_empty());
        assert!(g.bonus().is_empty());
        assert_eq!(g.status(), Status::Won);
    }

    #[test]
    fn cheat_adds_to_existing_score() {
        let mut g = game_from(&["P..o"], 10);
        g.move_player(Dir::Right);
        g.cheat();
        assert_eq!(g.score(), 1 + 1 + 5);
    }

    #[test]
    fn cheat_ignored_unless_playing() {
        let mut g = game_from(&["P. "], 10);
        g.move_player(Dir::Right);
        assert!(g.cheat().is_empty());
        assert_eq!(g.score(), 1);
    }

    // ── Enemies and collisions ──

    #[test]
    fn enemies_move_on_cadence_only() {
        let mut g = corridor_with_enemy();
        assert!(g.frame().is_empty());
        assert!(g.frame().is_empty());
        assert_eq!(g.enemies()[0].pos, Position::new(7, 1));

        assert_eq!(g.frame(), vec![GameEvent::EnemiesMoved]);
        assert_eq!(g.enemies()[0].pos, Position::new(6, 1));
        assert_eq!(g.enemies()[0].heading, Dir::Left);
        assert_eq!(g.enemy_move_counter(), 0);
        assert_eq!(g.frames(), 3);
    }

    #[test]
    fn enemy_walks_into_player() {
        let mut g = game_from(&[
            "#####",
            "#P E#",
            "#####",
        ], 1);
        assert_eq!(g.frame(), vec![GameEvent::EnemiesMoved]);
        assert_eq!(g.status(), Status::Playing);
        let events = g.frame();
        assert_eq!(events, vec![
            GameEvent::EnemiesMoved,
            GameEvent::PlayerCaught { x: 1, y: 1 },
        ]);
        assert_eq!(g.status(), Status::Lost);
    }

    #[test]
    fn collision_checked_without_enemy_move() {
        let mut g = game_from(&[
            "#####",
            "#PE.#",
            "#####",
        ], 100);
        // Walking into an enemy is caught by the next frame's check.
        g.move_player(Dir::Right);
        assert_eq!(g.status(), Status::Playing);
        assert_eq!(g.frame(), vec![GameEvent::PlayerCaught { x: 2, y: 1 }]);
        assert_eq!(g.status(), Status::Lost);
    }

    #[test]
    fn nothing_ticks_after_loss() {
        let mut g = game_from(&["#####", "#PE.#", "#####"], 100);
        g.move_player(Dir::Right);
        g.frame();
        let frames = g.frames();
        assert!(g.frame().is_empty());
        assert!(g.move_enemies().is_empty());
        assert!(g.move_player(Dir::Right).is_empty());
        assert!(g.cheat().is_empty());
        assert_eq!(g.frames(), frames);
    }

    #[test]
    fn no_enemies_no_move_event() {
        let mut g = game_from(&["P.."], 1);
        assert!(g.frame().is_empty());
    }

    // ── Intents ──

    #[test]
    fn apply_routes_intents() {
        let mut g = game_from(&["P..o"], 10);
        assert_eq!(
            g.apply(Intent::Move(Dir::Right)).unwrap(),
            vec![GameEvent::DotCollected { x: 1, y: 0 }]
        );
        assert_eq!(g.apply(Intent::Cheat).unwrap(), vec![GameEvent::CheatUsed { awarded: 6 }]);
        assert_eq!(g.status(), Status::Won);

        let events = g.apply(Intent::Reset).unwrap();
        assert!(matches!(events.as_slice(), [GameEvent::GameReset { .. }]));
        assert_eq!(g.status(), Status::Playing);
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn reset_after_loss_plays_again() {
        let mut g = game_from(&["#####", "#PE.#", "#####"], 100);
        g.move_player(Dir::Right);
        g.frame();
        assert_eq!(g.status(), Status::Lost);
        g.reset().unwrap();
        assert_eq!(g.status(), Status::Playing);
        assert_eq!(g.player().pos, Position::new(1, 1));
        assert_eq!(g.dots().len(), 1);
    }

    // ── Properties over random play ──

    #[test]
    fn random_play_keeps_score_and_status_consistent() {
        for seed in 0..30 {
            let mut settings = generated_settings(11, 15);
            settings.enemy_move_frames = 2;
            let mut g = Game::new(settings, Some(seed)).unwrap();
            let dots0 = g.dots().len() as u32;
            let bonus0 = g.bonus().len() as u32;
            let mut input = StdRng::seed_from_u64(seed + 1000);

            for _ in 0..400 {
                let dir = Dir::ALL[input.gen_range(0..4)];
                let before = g.player().pos;
                g.move_player(dir);
                let after = g.player().pos;

                assert!(g.grid().is_open(after));
                assert!(before == after || g.grid().open_neighbor(before, dir) == Some(after));

                let taken = (dots0 - g.dots().len() as u32) + 5 * (bonus0 - g.bonus().len() as u32);
                assert_eq!(g.score(), taken, "seed {seed}");

                if g.status() == Status::Won {
                    assert!(g.dots().is_empty() && g.bonus().is_empty());
                }
                g.frame();
                if g.status() == Status::Lost {
                    assert!(g.enemies().iter().any(|e| e.pos == g.player().pos));
                }
                for e in g.enemies() {
                    assert!(g.grid().is_open(e.pos));
                }
                if g.status() != Status::Playing { break; }
            }
        }
    }

    #[test]
    fn enemies_never_start_on_player() {
        for seed in 0..50 {
            let g = Game::new(generated_settings(7, 7), Some(seed)).unwrap();
            assert!(g.enemy_at(maze::START).is_none());
        }
    }

    #[test]
    fn same_seed_same_enemy_walk() {
        let mut a = Game::new(generated_settings(21, 31), Some(5)).unwrap();
        let mut b = Game::new(generated_settings(21, 31), Some(5)).unwrap();
        for _ in 0..200 {
            a.frame();
            b.frame();
        }
        assert_eq!(a.enemies(), b.enemies());
        assert_eq!(a.status(), b.status());
    }
}
