/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads a published `GameState`; it never mutates it.
///
/// ## Board cell precedence (top wins)
///
///   explosion > player > enemy > bomb > item > revealed door > tile
///
/// Particles are drawn last, only over bare floor.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use gridblast::domain::entity::{Coord, ItemKind, Millis, Tint};
use gridblast::domain::tile::{self, GRID_HEIGHT, GRID_WIDTH};
use gridblast::sim::world::{GameState, Status};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the same RGB for `Clear(ClearType::All)` and every cell keeps
    /// VTE terminals from showing gap lines between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
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
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Fill one board cell (two terminal columns).
    fn put_tile(&mut self, at: Coord, glyph: [char; 2], fg: Color, bg: Color) {
        if at.x < 0 || at.y < 0 { return; }
        let col = MAP_COL + at.x as usize * CELL_W;
        let row = MAP_ROW + at.y as usize;
        self.set(col, row, Cell::new(glyph[0], fg, bg));
        self.set(col + 1, row, Cell::new(glyph[1], fg, bg));
    }

    /// Centered box with a title line and hint lines under it.
    fn put_banner(&mut self, lines: &[&str], fg: Color, bg: Color) {
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let board_w = GRID_WIDTH * CELL_W;
        let x0 = MAP_COL + board_w.saturating_sub(inner + 2) / 2;
        let y0 = MAP_ROW + GRID_HEIGHT.saturating_sub(lines.len() + 2) / 2;

        let rule = "═".repeat(inner);
        self.put_str(x0, y0, &format!("╔{rule}╗"), fg, bg);
        for (i, line) in lines.iter().enumerate() {
            let pad = inner - line.chars().count();
            let text = format!("║{}{}{}║", " ".repeat(pad / 2), line, " ".repeat(pad - pad / 2));
            self.put_str(x0, y0 + 1 + i, &text, fg, bg);
        }
        self.put_str(x0, y0 + 1 + lines.len(), &format!("╚{rule}╝"), fg, bg);
    }
}

// ── Layout ──

/// Each board cell is 2 terminal columns wide.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 2;
const HELP_ROW: usize = MAP_ROW + GRID_HEIGHT + 1;

const FG_DIM: Color = Color::DarkGrey;
const FG_HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const FG_GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };

fn tint(t: Tint) -> Color {
    Color::Rgb { r: t.r, g: t.g, b: t.b }
}

/// Scale a tint toward black as a particle fades.
fn faded(t: Tint, life: f32) -> Color {
    let k = life.clamp(0.2, 1.0);
    Color::Rgb {
        r: (t.r as f32 * k) as u8,
        g: (t.g as f32 * k) as u8,
        b: (t.b as f32 * k) as u8,
    }
}

/// What to draw this frame.
pub enum View<'a> {
    Menu { last_score: Option<u32> },
    Game { state: &'a GameState, now: Millis, frame: u64 },
}

impl View<'_> {
    /// Screen identity; a change forces a full repaint.
    fn key(&self) -> Option<Status> {
        match self {
            View::Menu { .. } => None,
            View::Game { state, .. } => Some(state.status()),
        }
    }
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_key: Option<Option<Status>>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_key: None,
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
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

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

    pub fn render(&mut self, view: &View) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Screen change → clear for clean transition
        let key = view.key();
        if self.last_key != Some(key) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_key = Some(key);
        }

        self.front.clear();
        compose(&mut self.front, view);

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

        // Explicit base colors, never ResetColor: the terminal default may
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

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

// ══════════════════════════════════════════════════════════════
// Compose: build front buffer content
// ══════════════════════════════════════════════════════════════

fn compose(buf: &mut FrameBuffer, view: &View) {
    match *view {
        View::Menu { last_score } => compose_menu(buf, last_score),
        View::Game { state, now, frame } => {
            compose_hud(buf, state);
            compose_board(buf, state, now, frame);
            compose_help(buf);
            compose_overlay(buf, state);
        }
    }
}

fn compose_menu(buf: &mut FrameBuffer, last_score: Option<u32>) {
    let title = [
        r"   ___      _    _ ___  _            _   ",
        r"  / __|_ _ (_)__| | _ )| | __ _  ___| |_ ",
        r" | (_ | '_|| / _` | _ \| |/ _` |(_-<|  _|",
        r"  \___|_|  |_\__,_|___/|_|\__,_|/__/ \__|",
    ];
    for (i, line) in title.iter().enumerate() {
        buf.put_str(2, 2 + i, line, FG_GOLD, Color::Reset);
    }

    buf.put_str(6, 8, "ENTER   Start", FG_HI, Color::Reset);
    buf.put_str(6, 9, "  Q     Quit", Color::White, Color::Reset);

    if let Some(score) = last_score {
        buf.put_str(6, 11, &format!("Last score: {score}"), Color::White, Color::Reset);
    }

    let help = [
        "Controls",
        "  ←→↑↓ / WASD   Move        SPACE  Bomb",
        "  ESC / P       Pause       R      Restart",
        "  N             Next level  X      Menu",
    ];
    for (i, line) in help.iter().enumerate() {
        let color = if i == 0 { FG_GOLD } else { Color::White };
        buf.put_str(6, 13 + i, line, color, Color::Reset);
    }
}

fn door_label(state: &GameState) -> (&'static str, Color) {
    if !state.door.revealed {
        ("HIDDEN", FG_DIM)
    } else if !state.enemies.is_empty() {
        ("LOCKED", Color::Rgb { r: 239, g: 68, b: 68 })
    } else {
        ("OPEN", FG_HI)
    }
}

fn compose_hud(buf: &mut FrameBuffer, state: &GameState) {
    let hud = format!(
        " Level {:<3} Score {:<7} Time {}:{:02}  Range {}  Speed {}ms  Exit ",
        state.level,
        state.score,
        state.time_left / 60,
        state.time_left % 60,
        state.player.stats.range,
        state.player.stats.speed_ms,
    );
    buf.put_str(0, HUD_ROW, &hud, Color::White, Color::Reset);
    let (label, color) = door_label(state);
    buf.put_str(hud.chars().count(), HUD_ROW, label, color, Color::Reset);
}

fn compose_board(buf: &mut FrameBuffer, state: &GameState, now: Millis, frame: u64) {
    for (x, y, cell) in state.grid.iter() {
        let at = Coord::new(x, y);
        match cell {
            tile::Cell::Wall => buf.put_tile(at, ['█', '█'], Color::Rgb { r: 110, g: 110, b: 130 }, Color::Reset),
            tile::Cell::Brick => buf.put_tile(at, ['▒', '▒'], Color::Rgb { r: 200, g: 120, b: 60 }, Color::Rgb { r: 90, g: 45, b: 20 }),
            tile::Cell::Empty => buf.put_tile(at, [' ', ' '], Color::Reset, Color::Reset),
        }
    }

    // Particles first so every entity draws over them.
    for p in &state.particles {
        let at = Coord::new(p.x.round() as i32, p.y.round() as i32);
        if state.grid.get(at.x, at.y) != Some(tile::Cell::Empty) { continue; }
        let glyph = if p.life > 0.6 { '*' } else { '·' };
        buf.put_tile(at, [glyph, ' '], faded(p.tint, p.life), Color::Reset);
    }

    let door = state.door;
    if door.revealed {
        let color = if state.enemies.is_empty() { FG_HI } else { FG_DIM };
        buf.put_tile(door.pos, ['[', ']'], color, Color::Reset);
    }

    for item in &state.items {
        let (glyph, color) = match item.kind {
            ItemKind::RangeUp => (['R', '+'], tint(Tint::YELLOW)),
            ItemKind::SpeedUp => (['S', '+'], tint(Tint::CYAN)),
        };
        buf.put_tile(item.pos, glyph, Color::Black, color);
    }

    for bomb in &state.bombs {
        let left = bomb.fuse_at.saturating_sub(now);
        let color = if left > 1000 {
            Color::White
        } else if left > 500 {
            tint(Tint::YELLOW)
        } else if frame % 2 == 0 {
            tint(Tint::RED)
        } else {
            Color::White
        };
        buf.put_tile(bomb.pos, ['(', ')'], color, Color::Reset);
    }

    for enemy in &state.enemies {
        buf.put_tile(enemy.pos, ['◣', '◢'], tint(Tint::PURPLE), Color::Reset);
    }

    if state.player.alive {
        buf.put_tile(state.player.pos, ['◖', '◗'], tint(Tint::CYAN), Color::Reset);
    } else {
        buf.put_tile(state.player.pos, ['x', 'x'], tint(Tint::RED), Color::Reset);
    }

    let flame = if frame % 4 < 2 {
        Color::Rgb { r: 255, g: 140, b: 0 }
    } else {
        Color::Rgb { r: 255, g: 210, b: 60 }
    };
    for e in &state.explosions {
        buf.put_tile(e.pos, ['▓', '▓'], flame, Color::Rgb { r: 120, g: 30, b: 0 });
    }
}

fn compose_help(buf: &mut FrameBuffer) {
    buf.put_str(
        MAP_COL,
        HELP_ROW,
        "Move ←→↑↓/WASD  Bomb SPACE  Pause ESC/P  Restart R  Menu X",
        FG_DIM,
        Color::Reset,
    );
}

fn compose_overlay(buf: &mut FrameBuffer, state: &GameState) {
    let bg = Color::Rgb { r: 30, g: 30, b: 45 };
    match state.status() {
        Status::Running => {}
        Status::Paused => buf.put_banner(&["PAUSED", "ESC / P  resume"], FG_GOLD, bg),
        Status::GameOver => {
            let score = format!("Score {}", state.score);
            buf.put_banner(&["GAME OVER", score.as_str(), "R  restart   X  menu"], tint(Tint::RED), bg)
        }
        Status::Won => {
            let title = format!("LEVEL {} CLEAR", state.level);
            let score = format!("Score {}", state.score);
            buf.put_banner(&[title.as_str(), score.as_str(), "N  next   X  menu"], FG_HI, bg)
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
