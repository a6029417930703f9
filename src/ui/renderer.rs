/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::Mode;
use crate::domain::grid::{Dir, Position};
use crate::sim::game::{Game, Status};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gaps between rows match the cell colour on every terminal.
    const BASE_BG: Color = Color::Rgb { r: 10, g: 10, b: 20 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).as_str().to_string()).collect()
    }
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const WALL_FG: Color = Color::Rgb { r: 33, g: 33, b: 222 };
const WALL_BG: Color = Color::Rgb { r: 20, g: 20, b: 120 };
const DOT_FG: Color = Color::Rgb { r: 255, g: 184, b: 151 };
const BONUS_FG: Color = Color::Rgb { r: 255, g: 220, b: 120 };
const PLAYER_FG: Color = Color::Rgb { r: 255, g: 255, b: 0 };
const ENEMY_FG: [Color; 4] = [
    Color::Rgb { r: 255, g: 0, b: 0 },
    Color::Rgb { r: 255, g: 184, b: 255 },
    Color::Rgb { r: 0, g: 255, b: 255 },
    Color::Rgb { r: 255, g: 184, b: 82 },
];
const WIN_FG: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const LOSE_FG: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const OVERLAY_BG: Color = Color::Rgb { r: 30, g: 30, b: 30 };

// ── Renderer ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// Rows below the map: gap + message + help.
const FOOTER_ROWS: usize = 3;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_status: Option<Status>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_status: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, game: &Game, message: &str) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Status change → clear for clean transition
        if self.last_status != Some(game.status()) {
            self.back.cells.fill(Cell::INVALID);
            self.last_status = Some(game.status());
        }

        self.compose(game, message);

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors, not ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, game: &Game, message: &str) {
        self.front.clear();

        let grid = game.grid();
        let map_w = grid.cols() * CELL_W;
        let need_w = map_w.max(40);
        let need_h = MAP_ROW + grid.rows() + FOOTER_ROWS;
        if self.term_w < need_w || self.term_h < need_h {
            self.compose_too_small(need_w, need_h);
            return;
        }

        let map_x = (self.term_w - map_w) / 2;

        self.compose_hud(game);
        self.compose_map(game, map_x);

        let msg_row = MAP_ROW + grid.rows() + 1;
        if !message.is_empty() {
            let msg = format!(" ◈ {message} ");
            let bg = Color::Rgb { r: 200, g: 180, b: 50 };
            self.front.fill_row(msg_row, bg);
            self.front.put_str(0, msg_row, &msg, Color::Black, bg);
        }

        let help = " ←↑↓→/WASD/HJKL: Move   R: Reset   Q/Esc: Quit";
        self.front.put_str(0, msg_row + 1, help, Color::DarkGrey, Color::Reset);

        match game.status() {
            Status::Playing => {}
            Status::Won => self.compose_end_overlay(game, map_x, true),
            Status::Lost => self.compose_end_overlay(game, map_x, false),
        }
    }

    fn compose_hud(&mut self, game: &Game) {
        let mode = match game.mode() {
            Mode::Generated => "Generated",
            Mode::Classic => "Classic",
        };
        let hud = format!(
            " Score:{:<6} Dots:{:<4} Bonus:{:<3} {}  seed:{} ",
            game.score(),
            game.dots().len(),
            game.bonus().len(),
            mode,
            game.seed(),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_map(&mut self, game: &Game, map_x: usize) {
        let grid = game.grid();
        for gy in 0..grid.rows() {
            for gx in 0..grid.cols() {
                let col = map_x + gx * CELL_W;
                let row = MAP_ROW + gy;
                let (c0, c1, fg, bg) = cell_visual(game, Position::new(gx, gy));
                self.front.set(col, row, Cell::from_char(c0, fg, bg));
                self.front.set(col + 1, row, Cell::from_char(c1, fg, bg));
            }
        }
    }

    /// Won/Lost box centred over the map.
    fn compose_end_overlay(&mut self, game: &Game, map_x: usize, won: bool) {
        let (title, fg) = if won {
            ("★  ALL CLEAR!  ★", WIN_FG)
        } else {
            ("✕  CAUGHT!  ✕", LOSE_FG)
        };
        let score = format!("Final Score: {}", game.score());
        let lines = [title, "", score.as_str(), "", "R: play again   Q: quit"];

        let box_w = 32;
        let box_h = lines.len() + 2;
        let map_w = game.grid().cols() * CELL_W;
        let box_x = map_x + map_w.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + game.grid().rows().saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::from_char(' ', Color::White, OVERLAY_BG));
            }
        }
        for (i, line) in lines.iter().enumerate() {
            let len = line.chars().count();
            let x = box_x + box_w.saturating_sub(len) / 2;
            let color = if i == 0 { fg } else { Color::White };
            self.front.put_str(x, box_y + 1 + i, line, color, OVERLAY_BG);
        }
    }

    fn compose_too_small(&mut self, need_w: usize, need_h: usize) {
        let lines = [
            "Terminal too small".to_string(),
            format!("need {need_w}x{need_h}, have {}x{}", self.term_w, self.term_h),
        ];
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(0, i, line, LOSE_FG, Color::Reset);
        }
    }
}

/// Glyphs and colours for one map cell. Entities draw over collectibles.
fn cell_visual(game: &Game, pos: Position) -> (char, char, Color, Color) {
    if game.player().pos == pos {
        let ch = match game.player().facing {
            Dir::Right => 'ᗧ',
            Dir::Left => 'ᗤ',
            Dir::Up => 'ᗢ',
            Dir::Down => 'ᗜ',
        };
        return (ch, ' ', PLAYER_FG, Color::Reset);
    }
    if let Some(e) = game.enemy_at(pos) {
        return ('ᗣ', ' ', ENEMY_FG[e.id % ENEMY_FG.len()], Color::Reset);
    }
    if game.bonus().contains(&pos) {
        // Slow blink while playing.
        let lit = game.status() != Status::Playing || (game.frames() / 15) % 2 == 0;
        let ch = if lit { '●' } else { ' ' };
        return (ch, ' ', BONUS_FG, Color::Reset);
    }
    if game.dots().contains(&pos) {
        return ('·', ' ', DOT_FG, Color::Reset);
    }
    if game.grid().is_open(pos) {
        (' ', ' ', Color::Reset, Color::Reset)
    } else {
        ('█', '█', WALL_FG, WALL_BG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::game::tests::game_from;

    fn sized(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.term_w = w;
        r.term_h = h;
        r.front.resize(w, h);
        r.back.resize(w, h);
        r
    }

    fn small_game() -> Game {
        game_from(&[
            "#######",
            "#P. .o#",
            "#######",
        ], 10)
    }

    #[test]
    fn hud_shows_counts() {
        let g = small_game();
        let mut r = sized(60, 12);
        r.compose(&g, "");
        let hud = r.front.row_text(HUD_ROW);
        assert!(hud.contains("Score:0"));
        assert!(hud.contains("Dots:2"));
        assert!(hud.contains("Bonus:1"));
        assert!(hud.contains("Classic"));
        assert!(hud.contains("seed:1"));
    }

    #[test]
    fn map_draws_player_and_walls() {
        let g = small_game();
        let mut r = sized(60, 12);
        r.compose(&g, "hello");
        let map_x = (60 - 7 * CELL_W) / 2;
        let row1 = r.front.row_text(MAP_ROW + 1);
        let cells: Vec<char> = row1.chars().collect();
        assert_eq!(cells[map_x], '█');
        assert_eq!(cells[map_x + CELL_W], 'ᗧ');
        assert_eq!(cells[map_x + 2 * CELL_W], '·');
        assert!(r.front.row_text(MAP_ROW + 3 + 1).contains("hello"));
    }

    #[test]
    fn won_overlay_offers_replay() {
        let mut g = game_from(&[
            "###########",
            "#P.       #",
            "#         #",
            "#         #",
            "#         #",
            "#         #",
            "#         #",
            "#         #",
            "###########",
        ], 10);
        g.move_player(Dir::Right);
        assert_eq!(g.status(), Status::Won);
        let mut r = sized(60, 20);
        r.compose(&g, "");
        let text: String = (0..20).map(|y| r.front.row_text(y)).collect::<Vec<_>>().join("\n");
        assert!(text.contains("ALL CLEAR!"));
        assert!(text.contains("Final Score: 1"));
        assert!(text.contains("R: play again"));
    }

    #[test]
    fn too_small_terminal_shows_notice() {
        let g = small_game();
        let mut r = sized(20, 4);
        r.compose(&g, "");
        assert!(r.front.row_text(0).starts_with("Terminal too small"));
        assert!(r.front.row_text(1).contains("have 20x4"));
    }
}
