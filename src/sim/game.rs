/// Game state machine: which screen is showing, which level is active,
/// solve detection and the transition to the next level.
///
/// Entering a level repositions the player and recomputes the camera
/// request but leaves the grid as-is; only an explicit restart rolls
/// the pieces back to the parse-time snapshot.
///
/// Per frame: input is handled first (`handle_move`), then `update`
/// advances every animation, commits drained slides and re-evaluates
/// completion. Completion is never evaluated mid-slide.

use crate::config::AnimConfig;
use crate::domain::animation::ScalarAnim;
use crate::domain::player::Player;
use crate::sim::event::GameEvent;
use crate::sim::level::Level;
use crate::sim::movement::{self, MoveOutcome, SlideQueue};
use crate::sim::save::SaveData;
use crate::sim::scene::CameraRig;

/// Entries per menu-grid row on the level-select screen.
pub const MENU_COLS: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Menu,
    Playing,
}

pub struct Game {
    pub levels: Vec<Level>,
    pub level: usize,
    pub player: Player,
    pub screen: Screen,
    /// Fade overlay; runs 0 → 1 after every transition, the scene
    /// showing through as it progresses.
    pub fade: ScalarAnim,
    pub camera: CameraRig,
    pub save: SaveData,
    pub menu_cursor: usize,
    queue: SlideQueue,
    anim: AnimConfig,
    /// Set while the active level counts as solved, so a solve fires
    /// exactly once — and never re-fires on the clamped last level.
    solved_latch: bool,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(levels: Vec<Level>, save: SaveData, anim: AnimConfig) -> Self {
        let camera = CameraRig::for_level(&levels[0]);
        let (px, py) = levels[0].player_start;
        Game {
            player: Player::spawn(px, py, anim.player_speed),
            fade: ScalarAnim::parked(1.0, anim.transition_speed),
            camera,
            levels,
            level: 0,
            screen: Screen::Menu,
            save,
            menu_cursor: 0,
            queue: SlideQueue::new(),
            anim,
            solved_latch: false,
            events: vec![],
        }
    }

    pub fn current_level(&self) -> &Level {
        &self.levels[self.level]
    }

    /// Overlay strength: 1 = scene fully covered, 0 = clear.
    pub fn fade_alpha(&self) -> f32 {
        1.0 - self.fade.value()
    }

    fn start_fade(&mut self) {
        self.fade.duration = self.anim.transition_speed;
        self.fade.restart_from_zero(1.0);
    }

    /// Make `index` the active level, clamped to the valid range —
    /// advancing past the last level stays on the last level.
    fn change_level(&mut self, index: usize) {
        self.level = index.min(self.levels.len() - 1);
        let level = &self.levels[self.level];
        self.camera = CameraRig::for_level(level);
        let (px, py) = level.player_start;
        self.player = Player::spawn(px, py, self.anim.player_speed);
        self.queue.clear();
        self.solved_latch = level.is_solved();
    }

    /// Level picked from the menu.
    pub fn enter_level(&mut self, index: usize) {
        self.change_level(index);
        self.screen = Screen::Playing;
        self.start_fade();
    }

    pub fn restart_level(&mut self) {
        self.levels[self.level].restart();
        self.change_level(self.level);
    }

    pub fn back_to_menu(&mut self) {
        self.menu_cursor = self.level;
        self.screen = Screen::Menu;
        self.start_fade();
    }

    /// Feed a directional input to the movement resolver. A rejection
    /// is not an error; the caller does nothing further with it.
    pub fn handle_move(&mut self, dx: i32, dy: i32) -> MoveOutcome {
        if self.screen != Screen::Playing {
            return MoveOutcome::Rejected;
        }
        let level = &mut self.levels[self.level];
        let outcome =
            movement::attempt_move(level, &mut self.player, &mut self.queue, dx, dy, self.anim.player_speed);
        if outcome == MoveOutcome::Accepted {
            if self.queue.is_empty() {
                self.events.push(GameEvent::PlayerMoved);
            } else {
                self.events.push(GameEvent::BoxPushed { crates: self.queue.len() });
            }
        }
        outcome
    }

    /// Advance all animations by `dt` seconds and drain the frame's
    /// events for the presentation layer.
    pub fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        self.fade.update(dt);
        if self.screen == Screen::Playing {
            self.player.position.update(dt);
            self.player.rotation.update(dt);
            let level = &mut self.levels[self.level];
            movement::update_slides(level, &mut self.queue, dt);
            self.check_solved();
        }
        std::mem::take(&mut self.events)
    }

    fn check_solved(&mut self) {
        if self.solved_latch || !self.queue.is_empty() || !self.player.is_idle() {
            return;
        }
        if !self.levels[self.level].is_solved() {
            return;
        }
        self.solved_latch = true;
        self.save.mark_solved(self.level); // idempotent
        self.events.push(GameEvent::LevelSolved { index: self.level });
        self.change_level(self.level + 1);
        self.start_fade();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::parse_levels;

    const TWO_LEVELS: &str = "#####\n#@$.#\n#####\n\n######\n#@ $.#\n######\n";

    fn game() -> Game {
        let levels = parse_levels(TWO_LEVELS, 2).unwrap();
        let save = SaveData::defaults(2);
        Game::new(levels, save, AnimConfig { player_speed: 0.05, transition_speed: 0.1 })
    }

    /// Run enough frames for every animation to settle.
    fn run_frames(game: &mut Game, n: usize) -> Vec<GameEvent> {
        let mut events = vec![];
        for _ in 0..n {
            events.extend(game.update(0.05));
        }
        events
    }

    #[test]
    fn solving_advances_and_persists() {
        let mut game = game();
        game.enter_level(0);
        assert_eq!(game.handle_move(1, 0), MoveOutcome::Accepted);
        let events = run_frames(&mut game, 20);

        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelSolved { index: 0 })));
        assert!(game.save.is_solved(0));
        assert_eq!(game.level, 1);
        assert_eq!(game.player.num_moves, 0);
        assert!(game.fade.active() || game.fade_alpha() == 0.0);
    }

    #[test]
    fn solve_fires_once() {
        let mut game = game();
        game.enter_level(0);
        game.handle_move(1, 0);
        run_frames(&mut game, 20);
        // now on level 1, still unsolved; more frames produce no events
        let events = run_frames(&mut game, 20);
        assert!(events.is_empty());
        assert!(!game.save.is_solved(1));
    }

    #[test]
    fn last_level_clamps_instead_of_wrapping() {
        let mut game = game();
        game.enter_level(1);
        assert_eq!(game.handle_move(1, 0), MoveOutcome::Accepted); // step
        run_frames(&mut game, 20);
        assert_eq!(game.handle_move(1, 0), MoveOutcome::Accepted); // push onto goal
        let events = run_frames(&mut game, 20);

        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelSolved { index: 1 })));
        assert!(game.save.is_solved(1));
        assert_eq!(game.level, 1); // clamped, not wrapped

        // the still-solved board must not re-fire every frame
        let events = run_frames(&mut game, 20);
        assert!(events.is_empty());
    }

    #[test]
    fn restart_resets_grid_and_counter() {
        let mut game = game();
        game.enter_level(0);
        game.handle_move(1, 0);
        // restart mid-slide: pending moves are dropped, grid rolls back
        game.restart_level();
        run_frames(&mut game, 20);

        let level = game.current_level();
        assert!(!level.is_solved());
        assert!(level.piece(2, 1).is_box());
        assert_eq!(game.player.num_moves, 0);
        assert_eq!(game.player.cell(), (1, 1));
    }

    #[test]
    fn entering_an_already_solved_board_does_not_advance() {
        let mut game = game();
        game.enter_level(0);
        game.handle_move(1, 0);
        run_frames(&mut game, 20);
        assert_eq!(game.level, 1);

        // level 0's board was left solved; revisiting it is a dead end,
        // not an instant re-solve
        game.back_to_menu();
        game.enter_level(0);
        let events = run_frames(&mut game, 20);
        assert!(events.is_empty());
        assert_eq!(game.level, 0);
    }

    #[test]
    fn moves_are_ignored_on_the_menu() {
        let mut game = game();
        assert_eq!(game.screen, Screen::Menu);
        assert_eq!(game.handle_move(1, 0), MoveOutcome::Rejected);
        assert_eq!(game.player.num_moves, 0);
    }

    #[test]
    fn push_event_reports_chain_length() {
        let levels = parse_levels("########\n# @$$..#\n########\n", 1).unwrap();
        let mut game = Game::new(
            levels,
            SaveData::defaults(1),
            AnimConfig { player_speed: 0.05, transition_speed: 0.1 },
        );
        game.enter_level(0);
        game.handle_move(1, 0);
        let events = run_frames(&mut game, 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::BoxPushed { crates: 2 })));
    }
}
