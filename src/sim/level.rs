/// Level parsing and the level records.
///
/// ## Source format
///
/// Puzzles are separated by a blank line, terminated by a trailing
/// newline. Symbols:
///   `#` wall        `@` player start   `$` crate
///   `.` goal floor  `*` crate on goal  anything else = floor
///
/// Lines within a puzzle may differ in length; short lines pad as
/// floor. Multiple `@` in one puzzle is not validated — the last one
/// wins. The parsed puzzle count must match the expected count exactly;
/// a mismatch is fatal at startup, there is no degraded mode for a
/// puzzle game with the wrong puzzles.

use std::fmt;

use crate::domain::tile::{BorderStyle, Piece, PieceKind};

/// Default set shipped with the binary, used when no levels file is
/// found next to the executable.
pub const EMBEDDED_LEVELS: &str = include_str!("../../assets/levels.txt");

/// Default duration for a crate slide; the movement resolver overrides
/// it from config whenever it starts a slide.
const SLIDE_SECS: f32 = 0.18;

#[derive(Debug, PartialEq, Eq)]
pub enum LevelError {
    CountMismatch { expected: usize, found: usize },
    MissingPlayer { level: usize },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::CountMismatch { expected, found } => {
                write!(f, "expected {expected} levels, found {found}")
            }
            LevelError::MissingPlayer { level } => {
                write!(f, "level {} has no player start (@)", level + 1)
            }
        }
    }
}

impl std::error::Error for LevelError {}

#[derive(Debug)]
pub struct Level {
    pub width: usize,
    pub height: usize,
    pub player_start: (usize, usize),
    /// Flat indices of every goal cell, in parse order. Computed once,
    /// never mutated.
    pub goal_indexes: Vec<usize>,
    /// Live grid, mutated by play.
    pub pieces: Vec<Piece>,
    /// Parse-time snapshot, restored on restart.
    original: Vec<Piece>,
}

impl Level {
    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn piece(&self, x: usize, y: usize) -> &Piece {
        &self.pieces[self.idx(x, y)]
    }

    pub fn num_goals(&self) -> usize {
        self.goal_indexes.len()
    }

    /// Copy the parse-time snapshot back over the live grid.
    pub fn restart(&mut self) {
        self.pieces.clone_from(&self.original);
    }

    /// Solved when every goal cell holds a crate.
    pub fn is_solved(&self) -> bool {
        self.goal_indexes.iter().all(|&i| self.pieces[i].kind == PieceKind::Box)
    }

    /// How many goal cells currently hold a crate.
    pub fn completed_goals(&self) -> usize {
        self.goal_indexes
            .iter()
            .filter(|&&i| self.pieces[i].kind == PieceKind::Box)
            .count()
    }
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

pub fn parse_levels(source: &str, expected: usize) -> Result<Vec<Level>, LevelError> {
    let mut levels = vec![];
    let mut rows: Vec<&str> = vec![];

    for line in source.lines() {
        if line.trim().is_empty() {
            if !rows.is_empty() {
                levels.push(parse_one(&rows, levels.len())?);
                rows.clear();
            }
        } else {
            rows.push(line);
        }
    }
    if !rows.is_empty() {
        levels.push(parse_one(&rows, levels.len())?);
    }

    if levels.len() != expected {
        return Err(LevelError::CountMismatch { expected, found: levels.len() });
    }
    Ok(levels)
}

fn parse_one(rows: &[&str], index: usize) -> Result<Level, LevelError> {
    let height = rows.len();
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);

    let mut pieces = Vec::with_capacity(width * height);
    let mut goal_indexes = vec![];
    let mut player_start = None;

    for (y, row) in rows.iter().enumerate() {
        let mut chars = row.chars();
        for x in 0..width {
            let c = chars.next().unwrap_or(' '); // ragged lines pad as floor
            let mut piece = Piece::floor(x, y, SLIDE_SECS);
            match c {
                '#' => piece.kind = PieceKind::Border,
                '@' => player_start = Some((x, y)), // last one wins
                '$' => piece.kind = PieceKind::Box,
                '.' => piece.is_goal = true,
                '*' => {
                    piece.kind = PieceKind::Box;
                    piece.is_goal = true;
                }
                _ => {}
            }
            if piece.is_goal {
                goal_indexes.push(y * width + x);
            }
            pieces.push(piece);
        }
    }

    classify_borders(&mut pieces, width, height);

    let player_start = player_start.ok_or(LevelError::MissingPlayer { level: index })?;
    let original = pieces.clone();
    Ok(Level { width, height, player_start, goal_indexes, pieces, original })
}

// ══════════════════════════════════════════════════════════════
// Border classification (cosmetic)
// ══════════════════════════════════════════════════════════════

/// Assign each wall its style and rotation from the wall-ness of its
/// four neighbors. Out of bounds counts as open.
fn classify_borders(pieces: &mut [Piece], width: usize, height: usize) {
    let is_wall = |x: isize, y: isize| -> bool {
        if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
            return false;
        }
        pieces[y as usize * width + x as usize].kind == PieceKind::Border
    };

    let mut styles = Vec::with_capacity(pieces.len());
    for y in 0..height as isize {
        for x in 0..width as isize {
            styles.push(classify_wall(
                is_wall(x, y - 1),
                is_wall(x, y + 1),
                is_wall(x - 1, y),
                is_wall(x + 1, y),
            ));
        }
    }
    for (piece, (style, rotation)) in pieces.iter_mut().zip(styles) {
        if piece.kind == PieceKind::Border {
            piece.border = style;
            piece.rotation = rotation;
        }
    }
}

/// The 8-case truth table: exactly two perpendicular wall neighbors
/// form an L corner, exactly three form a T junction, everything else
/// falls back to a straight wall (rotated upright for vertical runs).
fn classify_wall(up: bool, down: bool, left: bool, right: bool) -> (BorderStyle, f32) {
    match (up, down, left, right) {
        (false, true, false, true) => (BorderStyle::Corner, 0.0),
        (false, true, true, false) => (BorderStyle::Corner, 90.0),
        (true, false, true, false) => (BorderStyle::Corner, 180.0),
        (true, false, false, true) => (BorderStyle::Corner, 270.0),

        (false, true, true, true) => (BorderStyle::Split, 0.0),
        (true, true, true, false) => (BorderStyle::Split, 90.0),
        (true, false, true, true) => (BorderStyle::Split, 180.0),
        (true, true, false, true) => (BorderStyle::Split, 270.0),

        (u, d, l, r) => {
            let vertical = (u || d) && !(l || r);
            (BorderStyle::Straight, if vertical { 90.0 } else { 0.0 })
        }
    }
}
