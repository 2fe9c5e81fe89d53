/// The core→render contract: a draw list of model categories at
/// (possibly interpolated) grid positions, plus the camera orientation
/// for the active level. The renderer only ever reads these; it never
/// touches the grid.

use crate::domain::player::Player;
use crate::domain::tile::{BorderStyle, PieceKind};
use crate::sim::level::Level;

/// World-unit edge length of one grid cell.
pub const TILE_SIZE: f32 = 2.5;

pub const CAMERA_FOV_DEG: f32 = 45.0;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ModelKind {
    Floor,
    Goal,
    Wall(BorderStyle),
    Crate,
    Player,
}

#[derive(Clone, Copy, Debug)]
pub struct SceneItem {
    pub model: ModelKind,
    /// Grid coordinates; fractional while a slide or step is in flight.
    pub pos: (f32, f32),
    /// Degrees around the up axis.
    pub rotation: f32,
    /// Sits on top of a floor tile (crates, the player).
    pub elevated: bool,
}

/// Top-down perspective camera request, recomputed whenever the active
/// level changes: centered over the level, eye high enough to fit the
/// longer side at the configured field of view.
#[derive(Clone, Copy, Debug)]
pub struct CameraRig {
    /// World-unit center of the level footprint.
    pub center: (f32, f32),
    pub eye_height: f32,
    pub fov_deg: f32,
}

impl CameraRig {
    pub fn for_level(level: &Level) -> Self {
        let w = level.width as f32 * TILE_SIZE;
        let h = level.height as f32 * TILE_SIZE;
        let longer = w.max(h);
        let eye_height = (longer / 2.0) / (CAMERA_FOV_DEG.to_radians() / 2.0).tan();
        CameraRig { center: (w / 2.0, h / 2.0), eye_height, fov_deg: CAMERA_FOV_DEG }
    }
}

/// Build the frame's draw list, row by row. Cells outside a row's
/// outermost walls are not part of the level interior and are skipped.
/// Non-empty cells get their floor (or goal marker) drawn beneath them;
/// crates and the player are placed at their interpolated positions.
pub fn build_scene(level: &Level, player: &Player) -> Vec<SceneItem> {
    let mut items = vec![];

    for y in 0..level.height {
        let (first, last) = match first_and_last_walls(level, y) {
            Some(span) => span,
            None => continue,
        };

        for x in first..=last {
            let piece = level.piece(x, y);
            let under = if piece.is_goal { ModelKind::Goal } else { ModelKind::Floor };
            let cell = (x as f32, y as f32);

            if piece.kind != PieceKind::Empty {
                items.push(SceneItem { model: under, pos: cell, rotation: 0.0, elevated: false });
            }

            match piece.kind {
                PieceKind::Border => items.push(SceneItem {
                    model: ModelKind::Wall(piece.border),
                    pos: cell,
                    rotation: piece.rotation,
                    elevated: false,
                }),
                PieceKind::Box => {
                    let v = piece.slide.value();
                    items.push(SceneItem {
                        model: ModelKind::Crate,
                        pos: (v.x, v.y),
                        rotation: 0.0,
                        elevated: true,
                    });
                }
                PieceKind::Empty => {
                    items.push(SceneItem { model: under, pos: cell, rotation: 0.0, elevated: false });
                }
            }
        }
    }

    let pos = player.position.value();
    items.push(SceneItem {
        model: ModelKind::Player,
        pos: (pos.x, pos.y),
        rotation: player.rotation.value(),
        elevated: true,
    });
    items
}

fn first_and_last_walls(level: &Level, y: usize) -> Option<(usize, usize)> {
    let mut span = None;
    for x in 0..level.width {
        if level.piece(x, y).is_border() {
            span = match span {
                None => Some((x, x)),
                Some((first, _)) => Some((first, x)),
            };
        }
    }
    span
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::Player;
    use crate::sim::level::parse_levels;

    fn scene_for(source: &str) -> (Vec<SceneItem>, Level) {
        let mut levels = parse_levels(source, 1).unwrap();
        let level = levels.remove(0);
        let (px, py) = level.player_start;
        let player = Player::spawn(px, py, 0.1);
        (build_scene(&level, &player), level)
    }

    #[test]
    fn crates_draw_over_their_floor() {
        let (items, level) = scene_for("#####\n#@$.#\n#####\n");
        let _ = level;
        let crates: Vec<_> = items.iter().filter(|i| i.model == ModelKind::Crate).collect();
        assert_eq!(crates.len(), 1);
        assert_eq!(crates[0].pos, (2.0, 1.0));
        assert!(crates[0].elevated);
        // the crate's cell still has a floor under it, drawn earlier
        let under = items
            .iter()
            .position(|i| i.model == ModelKind::Floor && i.pos == (2.0, 1.0))
            .unwrap();
        let on_top = items.iter().position(|i| i.model == ModelKind::Crate).unwrap();
        assert!(under < on_top);
    }

    #[test]
    fn goal_marker_shows_through() {
        let (items, _) = scene_for("#####\n#@$.#\n#####\n");
        assert!(items.iter().any(|i| i.model == ModelKind::Goal && i.pos == (3.0, 1.0)));
    }

    #[test]
    fn padded_cells_outside_walls_are_skipped() {
        // first row is 4 wide in a 6-wide level; nothing renders in the pad
        let (items, _) = scene_for("####\n# .#\n#  ###\n#*@  #\n#  $ #\n#  ###\n####\n");
        assert!(!items.iter().any(|i| !i.elevated && i.pos.0 > 3.0 && i.pos.1 == 0.0));
    }

    #[test]
    fn player_is_last_and_rotated() {
        let (items, _) = scene_for("#####\n#@$.#\n#####\n");
        let last = items.last().unwrap();
        assert_eq!(last.model, ModelKind::Player);
        assert_eq!(last.pos, (1.0, 1.0));
        assert!(last.elevated);
    }

    #[test]
    fn camera_fits_longer_side() {
        let mut levels = parse_levels("#####\n#@$.#\n#####\n", 1).unwrap();
        let rig = CameraRig::for_level(&levels.remove(0));
        assert_eq!(rig.center, (5.0 * TILE_SIZE / 2.0, 3.0 * TILE_SIZE / 2.0));
        let expected = (5.0 * TILE_SIZE / 2.0) / (CAMERA_FOV_DEG.to_radians() / 2.0).tan();
        assert!((rig.eye_height - expected).abs() < 1e-4);
        assert_eq!(rig.fov_deg, CAMERA_FOV_DEG);
    }
}
