/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The world uses +y up; `Camera` flips it so higher rows draw nearer the top.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::jump::JumpState;
use crate::domain::tile::TileKind;
use crate::sim::world::Session;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: [u8; 16],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool, // occupies 2 terminal columns
    cont: bool, // right half of a wide char (skip render)
}

impl Cell {
    /// Every cell gets this explicit background so row gaps match on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 16],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Differs from any real cell, so an invalidated back buffer repaints everything.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::from_char(c, fg, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or("?")
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
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
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

    /// Write a string at (x, y). Each char occupies 1 column; overflow is clipped.
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

    /// Two-column game cell: either a wide glyph or a pair of narrow ones.
    fn put_sprite(&mut self, col: usize, row: usize, sprite: Sprite) {
        match sprite {
            Sprite::Wide(ch) => {
                self.set(col, row, Cell::from_char_wide(ch, Color::Reset, Color::Reset));
                self.set(col + 1, row, Cell::WIDE_CONT);
            }
            Sprite::Pair(c0, c1, fg, bg) => {
                self.set(col, row, Cell::from_char(c0, fg, bg));
                self.set(col + 1, row, Cell::from_char(c1, fg, bg));
            }
        }
    }
}

// ── Sprites ──

#[derive(Clone, Copy, Debug, PartialEq)]
enum Sprite {
    Wide(char),
    Pair(char, char, Color, Color),
}

const FLOOR: Sprite = Sprite::Pair(' ', ' ', Color::White, Color::Rgb { r: 30, g: 30, b: 45 });
const VOID: Sprite = Sprite::Pair(' ', ' ', Color::White, Color::Reset);

/// Static look of a tile; pickups and actors are drawn on top.
fn tile_sprite(kind: TileKind, door_open: bool) -> Sprite {
    match kind {
        TileKind::Wall => Sprite::Pair('█', '█', Color::Rgb { r: 90, g: 90, b: 130 }, Color::Reset),
        TileKind::Door if door_open => Sprite::Pair('░', '░', Color::Rgb { r: 80, g: 220, b: 80 }, Color::Reset),
        TileKind::Door => Sprite::Pair('▒', '▒', Color::Rgb { r: 200, g: 140, b: 40 }, Color::Reset),
        TileKind::Obstacle => Sprite::Pair('^', '^', Color::Rgb { r: 255, g: 70, b: 70 }, Color::Rgb { r: 30, g: 30, b: 45 }),
        TileKind::Platform => Sprite::Pair('▀', '▀', Color::Rgb { r: 160, g: 120, b: 60 }, Color::Rgb { r: 30, g: 30, b: 45 }),
        TileKind::SpawnPoint => Sprite::Pair('·', '·', Color::DarkGrey, Color::Rgb { r: 30, g: 30, b: 45 }),
        // Keys and enemies are entities; their tiles are plain floor.
        TileKind::Empty | TileKind::Key | TileKind::Enemy => FLOOR,
    }
}

// ── Renderer ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// Rows the camera may scroll past the maze edge, so the escape is visible.
const EDGE_MARGIN: i32 = 3;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Screen {
    Playing,
    Paused,
    Won,
    Lost,
}

impl Screen {
    fn of(s: &Session) -> Screen {
        if s.is_winner() {
            Screen::Won
        } else if s.is_dead() {
            Screen::Lost
        } else if s.paused {
            Screen::Paused
        } else {
            Screen::Playing
        }
    }
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
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
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Drop the camera onto the hero (level start / restart).
    pub fn snap_camera(&mut self, s: &mut Session) {
        self.fit_camera(s);
        let (hx, hy) = hero_tile(s);
        let bounds = s.grid.extent().padded(EDGE_MARGIN);
        s.camera.center_on(hx, hy, bounds);
    }

    pub fn render(&mut self, s: &mut Session) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        let screen = Screen::of(s);
        if self.last_screen != Some(screen) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(screen);
        }

        self.fit_camera(s);
        let (hx, hy) = hero_tile(s);
        s.camera.follow(hx, hy, s.grid.extent().padded(EDGE_MARGIN));

        self.front.clear();
        self.compose_game(s);
        match screen {
            Screen::Playing => {}
            Screen::Paused => self.compose_banner(s, &["PAUSED", "P / F1: resume   R: restart   ESC: quit"], Color::Rgb { r: 80, g: 200, b: 255 }),
            Screen::Won => {
                let score = format!("Score: {}   Time: {:.0}s", s.score, s.elapsed);
                self.compose_banner(s, &["YOU ESCAPED!", &score, "R: play again   ESC: quit"], Color::Rgb { r: 255, g: 220, b: 50 });
            }
            Screen::Lost => self.compose_banner(s, &["CAUGHT IN THE MAZE", "R: try again   ESC: quit"], Color::Rgb { r: 255, g: 60, b: 60 }),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// Viewport = terminal minus HUD/message/help rows, capped to the padded maze.
    fn fit_camera(&self, s: &mut Session) {
        let reserved_rows = MAP_ROW + 4;
        let bounds = s.grid.extent().padded(EDGE_MARGIN);
        let max_w = (self.term_w / CELL_W).max(1);
        let max_h = self.term_h.saturating_sub(reserved_rows).max(1);
        s.camera.view_w = max_w.min(bounds.width().max(1) as usize);
        s.camera.view_h = max_h.min(bounds.height().max(1) as usize);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Never ResetColor here: the terminal default may differ from BASE_BG.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
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

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, s: &Session) {
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud_line(s), Color::White, HUD_BG);

        let cam = s.camera.clone();
        for vy in 0..cam.view_h {
            let row = MAP_ROW + vy;
            if row >= self.front.height { break; }
            let wy = cam.top - vy as i32;
            for vx in 0..cam.view_w {
                let col = vx * CELL_W;
                if col + 1 >= self.front.width { break; }
                let wx = cam.x + vx as i32;
                self.front.put_sprite(col, row, cell_sprite(s, wx, wy));
            }
        }
        for (tile, sprite) in actor_sprites(s) {
            if let Some((vx, vy)) = cam.world_to_view(tile.0, tile.1) {
                let col = vx * CELL_W;
                if col + 1 < self.front.width {
                    self.front.put_sprite(col, MAP_ROW + vy, sprite);
                }
            }
        }

        let msg_row = MAP_ROW + cam.view_h + 1;
        if msg_row < self.front.height && !s.message.is_empty() {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", s.message), Color::Black, MSG_BG);
        }

        let help_row = MAP_ROW + cam.view_h + 3;
        if help_row < self.front.height {
            let help = " Arrows/WASD:Move  Space:Jump  Tab:Sprint  P:Pause  R:Restart  Esc:Quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// Centered box over the map area.
    fn compose_banner(&mut self, s: &Session, lines: &[&str], accent: Color) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let view_cols = (s.camera.view_w * CELL_W).max(inner);
        let box_x = view_cols.saturating_sub(inner) / 2;
        let box_y = MAP_ROW + s.camera.view_h.saturating_sub(lines.len() + 2) / 2;

        for y in box_y..box_y + lines.len() + 2 {
            for x in box_x..box_x + inner {
                self.front.set(x, y, Cell::from_char(' ', Color::White, dim));
            }
        }
        for (i, line) in lines.iter().enumerate() {
            let fg = if i == 0 { accent } else { Color::White };
            let pad = (inner - line.chars().count()) / 2;
            self.front.put_str(box_x + pad, box_y + 1 + i, line, fg, dim);
        }
    }
}

/// Tile nearest to the hero's center.
fn hero_tile(s: &Session) -> (i32, i32) {
    let p = s.hero.body.pos;
    (p.x.round() as i32, p.y.round() as i32)
}

fn hud_line(s: &Session) -> String {
    let hearts: String = "♥".repeat(s.lives() as usize);
    let key = if s.has_key() { "KEY" } else { "---" };
    let shield = if s.is_vulnerable() { "" } else { " SHIELD" };
    let air = match s.hero.jump.state() {
        JumpState::Grounded => "",
        JumpState::Ascending => " ↑",
        JumpState::Descending => " ↓",
    };
    format!(
        " {:<10} Lives:{:<6} {}{}{}  Score:{:<5} Time:{:>4.0}s ",
        s.level_name, hearts, key, shield, air, s.score, s.elapsed
    )
}

/// Enemies then the hero, each on its nearest tile. Later entries draw on top.
fn actor_sprites(s: &Session) -> Vec<((i32, i32), Sprite)> {
    let mut out: Vec<_> = s.enemies.iter()
        .map(|e| {
            let tile = (e.body.pos.x.round() as i32, e.body.pos.y.round() as i32);
            (tile, Sprite::Wide(if e.is_chaser() { '👹' } else { '👾' }))
        })
        .collect();
    if !s.is_dead() {
        let glyph = if s.hero.jump.is_airborne() { '🤸' } else { '🏃' };
        out.push((hero_tile(s), Sprite::Wide(glyph)));
    }
    out
}

/// What to draw at world cell (wx, wy): pickups over tiles.
fn cell_sprite(s: &Session, wx: i32, wy: i32) -> Sprite {
    if s.keys.iter().any(|k| k.visible() && k.tile == (wx, wy)) {
        return Sprite::Wide('🔑');
    }
    if s.hearts.iter().any(|h| h.visible() && h.tile == (wx, wy)) {
        return Sprite::Pair('♥', ' ', Color::Rgb { r: 255, g: 90, b: 120 }, Color::Rgb { r: 30, g: 30, b: 45 });
    }
    match s.grid.lookup(wx, wy) {
        Some(kind) => {
            let open = kind.is_door() && s.exits.iter().any(|e| e.open && e.tile == (wx, wy));
            tile_sprite(kind, open)
        }
        None => {
            let e = s.grid.extent();
            let inside = wx >= e.min_x && wx <= e.max_x && wy >= e.min_y && wy <= e.max_y;
            if inside { FLOOR } else { VOID }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::test_session;

    #[test]
    fn put_str_clips_at_the_edge() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.put_str(2, 0, "abc", Color::White, Color::Reset);
        assert_eq!(fb.get(2, 0).as_str(), "a");
        assert_eq!(fb.get(3, 0).as_str(), "b");
        assert_eq!(fb.get(4, 0), Cell::BLANK);
    }

    #[test]
    fn doors_look_different_once_open() {
        assert_ne!(tile_sprite(TileKind::Door, false), tile_sprite(TileKind::Door, true));
        assert_eq!(tile_sprite(TileKind::Key, false), FLOOR);
    }

    #[test]
    fn hero_draws_last() {
        let s = test_session(&[(0, 0, TileKind::SpawnPoint), (2, 0, TileKind::Enemy)], "");
        let actors = actor_sprites(&s);
        assert_eq!(actors, vec![((2, 0), Sprite::Wide('👾')), ((0, 0), Sprite::Wide('🏃'))]);
    }

    #[test]
    fn pickups_draw_over_tiles() {
        let mut s = test_session(
            &[(0, 0, TileKind::SpawnPoint), (3, 0, TileKind::Key), (4, 0, TileKind::Wall)],
            "",
        );
        assert_eq!(cell_sprite(&s, 0, 0), tile_sprite(TileKind::SpawnPoint, false));
        assert_eq!(cell_sprite(&s, 3, 0), Sprite::Wide('🔑'));
        assert_eq!(cell_sprite(&s, 9, 9), VOID);
        s.keys[0].collected = true;
        assert_eq!(cell_sprite(&s, 3, 0), FLOOR);
    }

    #[test]
    fn hud_reports_key_and_lives() {
        let mut s = test_session(&[(0, 0, TileKind::SpawnPoint)], "[rules]\nstart_lives = 2\n");
        assert!(hud_line(&s).contains("♥♥ "));
        assert!(hud_line(&s).contains("---"));
        s.hero.has_key = true;
        assert!(hud_line(&s).contains("KEY"));
    }
}
