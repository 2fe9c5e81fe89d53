/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into the `front` buffer (array of Cell)
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The play field is drawn purely from the draw list the core emits
/// (`sim::scene`); this module never reads the grid directly. One grid
/// cell maps to two terminal columns, and interpolated positions are
/// rounded per frame, which is what makes slides visible.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::tile::BorderStyle;
use crate::sim::game::{Game, Screen, MENU_COLS};
use crate::sim::scene::{self, ModelKind, SceneItem, TILE_SIZE};

/// Terminal columns per grid cell.
const CELL_W: usize = 2;

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const WALL_FG: Color = Color::Rgb { r: 125, g: 135, b: 160 };
const FLOOR_FG: Color = Color::Rgb { r: 62, g: 68, b: 90 };
const GOAL_FG: Color = Color::Rgb { r: 240, g: 200, b: 90 };
const CRATE_FG: Color = Color::Rgb { r: 212, g: 145, b: 72 };
const PLAYER_FG: Color = Color::Rgb { r: 122, g: 220, b: 145 };
const HUD_FG: Color = Color::Rgb { r: 170, g: 180, b: 200 };
const TITLE_FG: Color = Color::Rgb { r: 242, g: 92, b: 84 };
const SOLVED_BG: Color = Color::Rgb { r: 98, g: 156, b: 111 };
const UNSOLVED_BG: Color = Color::Rgb { r: 58, g: 180, b: 172 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: HUD_FG, bg: BASE_BG };
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

    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            self.set(cx, y, Cell { ch, fg, bg });
            cx += 1;
        }
    }

    fn put_centered(&mut self, y: i32, s: &str, fg: Color, bg: Color) {
        let x = (self.width as i32 - s.chars().count() as i32) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All),
        )
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, game: &Game) -> io::Result<()> {
        let (tw, th) = terminal::size()?;
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.term_w || th != self.term_h {
            self.term_w = tw;
            self.term_h = th;
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.back.clear();
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        match game.screen {
            Screen::Menu => self.draw_menu(game),
            Screen::Playing => self.draw_play(game),
        }
        self.apply_fade(game.fade_alpha());
        self.flush_diff()
    }

    // ── Play screen ──

    fn draw_play(&mut self, game: &Game) {
        let level = game.current_level();

        // The camera rig centers the level footprint; convert its
        // world-unit center back to grid cells, then to terminal cells.
        let (cx, cy) = game.camera.center;
        let x0 = self.term_w as i32 / 2 - (cx / TILE_SIZE * CELL_W as f32).round() as i32;
        let y0 = self.term_h as i32 / 2 - (cy / TILE_SIZE).round() as i32;
        let x0 = x0.max(1);
        let y0 = y0.max(2);

        // Ground layer first, elevated items (crates, player) on top —
        // a sliding crate straddles two cells and must not be overdrawn
        // by its neighbor's floor.
        let items = scene::build_scene(level, &game.player);
        for item in items.iter().filter(|i| !i.elevated) {
            self.draw_item(item, x0, y0);
        }
        for item in items.iter().filter(|i| i.elevated) {
            self.draw_item(item, x0, y0);
        }

        // Window frame unless the fullscreen preference is set
        if !game.save.fullscreen {
            let w = (level.width * CELL_W) as i32;
            let h = level.height as i32;
            self.draw_frame(x0 - 1, y0 - 1, w + 2, h + 2);
        }

        let hud = format!(
            " Level {}/{}   Moves {}   Crates {}/{} ",
            game.level + 1,
            game.levels.len(),
            game.player.num_moves,
            level.completed_goals(),
            level.num_goals(),
        );
        self.front.put_str(1, 0, &hud, HUD_FG, BASE_BG);

        let help = " arrows move · r restart · m music · f frame · esc menu ";
        let hy = self.term_h as i32 - 1;
        self.front.put_str(1, hy, help, FLOOR_FG, BASE_BG);
    }

    fn draw_item(&mut self, item: &SceneItem, x0: i32, y0: i32) {
        let col = x0 + (item.pos.0 * CELL_W as f32).round() as i32;
        let row = y0 + item.pos.1.round() as i32;

        let ((a, b), fg) = match item.model {
            ModelKind::Floor => (('·', ' '), FLOOR_FG),
            ModelKind::Goal => (('◇', ' '), GOAL_FG),
            ModelKind::Wall(style) => (wall_glyphs(style, item.rotation), WALL_FG),
            ModelKind::Crate => (('[', ']'), CRATE_FG),
            ModelKind::Player => (('@', facing_glyph(item.rotation)), PLAYER_FG),
        };
        self.front.set(col, row, Cell { ch: a, fg, bg: BASE_BG });
        self.front.set(col + 1, row, Cell { ch: b, fg, bg: BASE_BG });
    }

    fn draw_frame(&mut self, x: i32, y: i32, w: i32, h: i32) {
        for i in 1..w - 1 {
            self.front.set(x + i, y, Cell { ch: '─', fg: FLOOR_FG, bg: BASE_BG });
            self.front.set(x + i, y + h - 1, Cell { ch: '─', fg: FLOOR_FG, bg: BASE_BG });
        }
        for i in 1..h - 1 {
            self.front.set(x, y + i, Cell { ch: '│', fg: FLOOR_FG, bg: BASE_BG });
            self.front.set(x + w - 1, y + i, Cell { ch: '│', fg: FLOOR_FG, bg: BASE_BG });
        }
        self.front.set(x, y, Cell { ch: '┌', fg: FLOOR_FG, bg: BASE_BG });
        self.front.set(x + w - 1, y, Cell { ch: '┐', fg: FLOOR_FG, bg: BASE_BG });
        self.front.set(x, y + h - 1, Cell { ch: '└', fg: FLOOR_FG, bg: BASE_BG });
        self.front.set(x + w - 1, y + h - 1, Cell { ch: '┘', fg: FLOOR_FG, bg: BASE_BG });
    }

    // ── Menu screen ──

    fn draw_menu(&mut self, game: &Game) {
        self.front.put_centered(2, "C R A T E B O U N D", TITLE_FG, BASE_BG);

        let total = game.levels.len();
        let rows = total.div_ceil(MENU_COLS);
        let cols = total.min(MENU_COLS);
        let grid_w = (cols * 5 - 1) as i32;
        let gx = (self.term_w as i32 - grid_w) / 2;
        let gy = 5;

        for i in 0..total {
            let row = (i / MENU_COLS) as i32;
            let col = (i % MENU_COLS) as i32;
            let x = gx + col * 5;
            let y = gy + row * 2;

            let bg = if game.save.is_solved(i) { SOLVED_BG } else { UNSOLVED_BG };
            let (fg, bg) = if i == game.menu_cursor {
                (Color::Black, Color::White)
            } else {
                (Color::Black, bg)
            };
            self.front.put_str(x, y, &format!(" {:>2} ", i + 1), fg, bg);
        }

        let status = format!("{}/{} solved", game.save.solved_count(), total);
        self.front.put_centered(gy + rows as i32 * 2 + 1, &status, HUD_FG, BASE_BG);

        let music = if game.save.music { "on" } else { "off" };
        let help = format!("enter play · arrows select · m music: {music} · q quit");
        self.front.put_centered(self.term_h as i32 - 2, &help, FLOOR_FG, BASE_BG);
    }

    // ── Fade overlay ──

    /// Blend the whole frame toward the background; alpha 1 hides it.
    fn apply_fade(&mut self, alpha: f32) {
        if alpha <= 0.001 {
            return;
        }
        for cell in &mut self.front.cells {
            cell.fg = mix(cell.fg, BASE_BG, alpha);
            cell.bg = mix(cell.bg, BASE_BG, alpha);
        }
    }

    // ── Diff + flush ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let i = y * self.front.width + x;
                let cell = self.front.cells[i];
                if self.back.cells[i] == cell {
                    continue;
                }
                queue!(self.writer, MoveTo(x as u16, y as u16))?;
                if last_fg != Some(cell.fg) {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = Some(cell.bg);
                }
                queue!(self.writer, Print(cell.ch))?;
            }
        }

        self.writer.flush()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}

// ── Glyphs ──

/// Box-drawing glyph pair for a wall piece. The second column carries
/// the horizontal arm when the style has one on its right side.
fn wall_glyphs(style: BorderStyle, rotation: f32) -> (char, char) {
    let rot = norm_rotation(rotation);
    match (style, rot) {
        (BorderStyle::Straight, 90) => ('║', ' '),
        (BorderStyle::Straight, _) => ('═', '═'),
        (BorderStyle::Corner, 0) => ('╔', '═'),
        (BorderStyle::Corner, 90) => ('╗', ' '),
        (BorderStyle::Corner, 180) => ('╝', ' '),
        (BorderStyle::Corner, _) => ('╚', '═'),
        (BorderStyle::Split, 0) => ('╦', '═'),
        (BorderStyle::Split, 90) => ('╣', ' '),
        (BorderStyle::Split, 180) => ('╩', '═'),
        (BorderStyle::Split, _) => ('╠', '═'),
    }
}

/// Player facing: down 0 → v, right 90 → >, up 180 → ^, left 270 → <.
fn facing_glyph(rotation: f32) -> char {
    match norm_rotation(rotation) {
        90 => '>',
        180 => '^',
        270 => '<',
        _ => 'v',
    }
}

/// Snap a (possibly mid-animation) angle to the nearest quarter turn.
fn norm_rotation(rotation: f32) -> i32 {
    (((rotation / 90.0).round() as i32 % 4) + 4) % 4 * 90
}

fn mix(color: Color, toward: Color, t: f32) -> Color {
    match (color, toward) {
        (Color::Rgb { r, g, b }, Color::Rgb { r: tr, g: tg, b: tb }) => Color::Rgb {
            r: blend(r, tr, t),
            g: blend(g, tg, t),
            b: blend(b, tb, t),
        },
        _ => color,
    }
}

fn blend(from: u8, to: u8, t: f32) -> u8 {
    (from as f32 + (to as f32 - from as f32) * t).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_snaps_to_quarter_turns() {
        assert_eq!(norm_rotation(0.0), 0);
        assert_eq!(norm_rotation(89.0), 90);
        assert_eq!(norm_rotation(269.9), 270);
        assert_eq!(norm_rotation(360.0), 0);
        assert_eq!(norm_rotation(-90.0), 270);
    }

    #[test]
    fn facing_glyphs_follow_the_angle_convention() {
        assert_eq!(facing_glyph(0.0), 'v');
        assert_eq!(facing_glyph(90.0), '>');
        assert_eq!(facing_glyph(180.0), '^');
        assert_eq!(facing_glyph(270.0), '<');
    }

    #[test]
    fn fade_blends_toward_background() {
        let mid = mix(Color::Rgb { r: 200, g: 100, b: 0 }, BASE_BG, 0.5);
        match mid {
            Color::Rgb { r, g, b } => {
                assert_eq!(r, 111);
                assert_eq!(g, 61);
                assert_eq!(b, 18);
            }
            _ => panic!("expected rgb"),
        }
        // full alpha lands exactly on the background
        assert_eq!(mix(Color::Rgb { r: 200, g: 100, b: 0 }, BASE_BG, 1.0), BASE_BG);
    }
}
