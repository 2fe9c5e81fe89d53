/// The player. Position and rotation are animations, so the
/// authoritative grid cell is always the position animation's endpoint,
/// never its currently interpolated value.

use crate::domain::animation::{ScalarAnim, Vec2, VectorAnim};

#[derive(Clone, Copy, Debug)]
pub struct Player {
    pub position: VectorAnim,
    pub rotation: ScalarAnim,
    pub num_moves: u32,
}

impl Player {
    pub fn spawn(x: usize, y: usize, speed: f32) -> Self {
        Player {
            position: VectorAnim::parked(Vec2::new(x as f32, y as f32), speed),
            rotation: ScalarAnim::parked(0.0, speed),
            num_moves: 0,
        }
    }

    /// Authoritative grid cell: the position endpoint, rounded.
    pub fn cell(&self) -> (i32, i32) {
        self.position.end.round()
    }

    pub fn is_idle(&self) -> bool {
        !self.position.active() && !self.rotation.active()
    }
}

/// Facing angle for a unit step, in degrees: right 90, left 270,
/// down 0, up 180. Fixed convention the models are authored against.
pub fn facing_angle(dx: i32, dy: i32) -> f32 {
    match (dx, dy) {
        (1, 0) => 90.0,
        (-1, 0) => 270.0,
        (0, -1) => 180.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_is_animation_endpoint_not_current_value() {
        let mut p = Player::spawn(2, 3, 0.2);
        p.position.start_to(Vec2::new(3.0, 3.0));
        p.position.update(0.05); // mid-slide, fractional value
        assert!(p.position.active());
        assert_eq!(p.cell(), (3, 3));
    }

    #[test]
    fn facing_angles_match_convention() {
        assert_eq!(facing_angle(1, 0), 90.0);
        assert_eq!(facing_angle(-1, 0), 270.0);
        assert_eq!(facing_angle(0, 1), 0.0);
        assert_eq!(facing_angle(0, -1), 180.0);
    }
}
