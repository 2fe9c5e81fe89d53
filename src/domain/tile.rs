/// Piece: one grid cell's semantic content.
/// A cell's kind and its goal flag are independent — a goal cell can be
/// uncovered (Empty) or covered (Box). Border cells never carry a goal.

use crate::domain::animation::{Vec2, VectorAnim};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceKind {
    Empty,
    Border,
    Box,
}

/// Cosmetic wall classification, computed once at parse time from the
/// four neighbors' wall-ness. Straight is the fallback for every
/// neighbor pattern that is not an L corner or a T junction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BorderStyle {
    Straight,
    Corner,
    Split,
}

#[derive(Clone, Copy, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub is_goal: bool,
    pub border: BorderStyle,
    /// Model rotation in degrees, one of {0, 90, 180, 270}. Only
    /// meaningful for Border pieces; rendering hint, no gameplay effect.
    pub rotation: f32,
    /// Slide animation for Box pieces; parked at the cell otherwise.
    pub slide: VectorAnim,
}

impl Piece {
    /// Plain floor resting at its own cell.
    pub fn floor(x: usize, y: usize, slide_secs: f32) -> Self {
        Piece {
            kind: PieceKind::Empty,
            is_goal: false,
            border: BorderStyle::Straight,
            rotation: 0.0,
            slide: VectorAnim::parked(Vec2::new(x as f32, y as f32), slide_secs),
        }
    }

    pub fn is_box(&self) -> bool {
        self.kind == PieceKind::Box
    }

    pub fn is_border(&self) -> bool {
        self.kind == PieceKind::Border
    }

    /// Uncovered goal still waiting for a crate?
    #[allow(dead_code)]
    pub fn is_open_goal(&self) -> bool {
        self.is_goal && self.kind != PieceKind::Box
    }
}
