/// Move validation and the crate push chain.
///
/// Moves are strictly turn-based despite the continuous visuals: a new
/// move is rejected outright while any animation from the previous one
/// is in flight — no input queueing. Crate occupancy in the grid is
/// committed only after every queued slide finishes, so a later push
/// can never read a half-moved board.

use crate::domain::animation::{Vec2, VectorAnim};
use crate::domain::player::{facing_angle, Player};
use crate::domain::tile::PieceKind;
use crate::sim::level::Level;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Accepted,
    Rejected,
}

/// Flat indices of pieces whose slide animation is in flight, in commit
/// order (farthest crate first, so no two grid writes collide). The
/// queue drains all-at-once or not at all.
#[derive(Default)]
pub struct SlideQueue {
    moves: Vec<usize>,
}

impl SlideQueue {
    pub fn new() -> Self {
        SlideQueue { moves: vec![] }
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Drop pending moves without committing them (level change/restart).
    pub fn clear(&mut self) {
        self.moves.clear();
    }
}

/// Attempt a single-cell move. `(dx, dy)` is one of the four unit steps.
///
/// The facing animation starts even when the step itself is rejected by
/// a wall or a blocked push — the player turns to look at the obstacle.
pub fn attempt_move(
    level: &mut Level,
    player: &mut Player,
    queue: &mut SlideQueue,
    dx: i32,
    dy: i32,
    speed: f32,
) -> MoveOutcome {
    // Lock until every animation from the previous move has resolved.
    if player.position.active() || player.rotation.active() || !queue.is_empty() {
        return MoveOutcome::Rejected;
    }

    player.rotation.duration = speed;
    player.rotation.start_to(facing_angle(dx, dy));

    let (cx, cy) = player.cell();
    let (nx, ny) = (cx + dx, cy + dy);

    match kind_at(level, nx, ny) {
        PieceKind::Border => return MoveOutcome::Rejected,
        PieceKind::Box => {
            if !push_chain(level, queue, nx, ny, dx, dy, speed) {
                return MoveOutcome::Rejected;
            }
        }
        PieceKind::Empty => {}
    }

    player.num_moves += 1;
    player.position.duration = speed;
    player.position.start_to(Vec2::new(nx as f32, ny as f32));
    MoveOutcome::Accepted
}

/// Out of bounds counts as a wall.
fn kind_at(level: &Level, x: i32, y: i32) -> PieceKind {
    if x < 0 || y < 0 || x as usize >= level.width || y as usize >= level.height {
        return PieceKind::Border;
    }
    level.pieces[level.idx(x as usize, y as usize)].kind
}

/// Set a contiguous run of crates sliding one cell along `(dx, dy)`.
///
/// Walks forward from the pushed cell past every crate. If the run ends
/// on a wall the whole chain is blocked and nothing mutates. Otherwise
/// every crate in the run starts its slide, queued from the crate next
/// to the free cell back to the first one pushed.
fn push_chain(
    level: &mut Level,
    queue: &mut SlideQueue,
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    speed: f32,
) -> bool {
    let (mut ex, mut ey) = (x, y);
    loop {
        match kind_at(level, ex, ey) {
            PieceKind::Box => {
                ex += dx;
                ey += dy;
            }
            PieceKind::Border => return false,
            PieceKind::Empty => break,
        }
    }

    let (mut px, mut py) = (ex - dx, ey - dy);
    while (px, py) != (x - dx, y - dy) {
        let current = level.idx(px as usize, py as usize);
        let target = Vec2::new((px + dx) as f32, (py + dy) as f32);
        queue.moves.push(current);
        level.pieces[current].slide.duration = speed;
        level.pieces[current].slide.start_to(target);
        px -= dx;
        py -= dy;
    }
    true
}

/// Advance queued slides by `dt` and, once every one of them has
/// finished in the same frame, commit the whole batch: each crate is
/// written into its target cell and cleared from its source cell, with
/// fresh parked animations on both. Goal flags live on the cells and
/// are untouched. Partial commits never happen.
///
/// Returns true when a batch was committed this frame.
pub fn update_slides(level: &mut Level, queue: &mut SlideQueue, dt: f32) -> bool {
    if queue.moves.is_empty() {
        return false;
    }

    let mut all_done = true;
    for &index in &queue.moves {
        let slide = &mut level.pieces[index].slide;
        slide.update(dt);
        if slide.active() {
            all_done = false;
        }
    }
    if !all_done {
        return false;
    }

    for &index in &queue.moves {
        let slide = level.pieces[index].slide;
        let (fx, fy) = slide.start.round();
        let (tx, ty) = slide.end.round();
        let source = level.idx(fx as usize, fy as usize);
        let target = level.idx(tx as usize, ty as usize);

        level.pieces[target].kind = PieceKind::Box;
        level.pieces[target].slide = VectorAnim::parked(slide.end, slide.duration);
        level.pieces[source].kind = PieceKind::Empty;
        level.pieces[source].slide = VectorAnim::parked(slide.start, slide.duration);
    }
    queue.moves.clear();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::parse_levels;

    const SPEED: f32 = 0.1;

    fn setup(source: &str) -> (Level, Player, SlideQueue) {
        let mut levels = parse_levels(source, 1).unwrap();
        let level = levels.remove(0);
        let (px, py) = level.player_start;
        let player = Player::spawn(px, py, SPEED);
        (level, player, SlideQueue::new())
    }

    /// Run animations to completion, as the frame loop would.
    fn settle(level: &mut Level, player: &mut Player, queue: &mut SlideQueue) {
        for _ in 0..100 {
            player.position.update(0.05);
            player.rotation.update(0.05);
            update_slides(level, queue, 0.05);
        }
        assert!(queue.is_empty());
    }

    fn kinds(level: &Level) -> Vec<PieceKind> {
        level.pieces.iter().map(|p| p.kind).collect()
    }

    #[test]
    fn walk_into_empty_cell() {
        let (mut level, mut player, mut queue) = setup("#######\n#@    #\n#######\n");
        let outcome = attempt_move(&mut level, &mut player, &mut queue, 1, 0, SPEED);
        assert_eq!(outcome, MoveOutcome::Accepted);
        assert_eq!(player.cell(), (2, 1));
        assert_eq!(player.num_moves, 1);
        assert_eq!(player.rotation.end, 90.0);
    }

    #[test]
    fn wall_rejects_but_still_turns() {
        let (mut level, mut player, mut queue) = setup("#####\n#@$.#\n#####\n");
        let outcome = attempt_move(&mut level, &mut player, &mut queue, 0, -1, SPEED);
        assert_eq!(outcome, MoveOutcome::Rejected);
        assert_eq!(player.cell(), (1, 1));
        assert_eq!(player.num_moves, 0);
        // facing updated anyway
        assert_eq!(player.rotation.end, 180.0);
        assert!(player.rotation.active());
    }

    #[test]
    fn no_move_while_animating() {
        let (mut level, mut player, mut queue) = setup("#######\n#@    #\n#######\n");
        assert_eq!(attempt_move(&mut level, &mut player, &mut queue, 1, 0, SPEED), MoveOutcome::Accepted);
        // second input lands mid-animation and is dropped, not queued
        assert_eq!(attempt_move(&mut level, &mut player, &mut queue, 1, 0, SPEED), MoveOutcome::Rejected);
        assert_eq!(player.cell(), (2, 1));

        settle(&mut level, &mut player, &mut queue);
        assert_eq!(attempt_move(&mut level, &mut player, &mut queue, 1, 0, SPEED), MoveOutcome::Accepted);
        assert_eq!(player.cell(), (3, 1));
    }

    #[test]
    fn push_single_box_onto_goal() {
        // one push right solves; a second push hits the wall
        let (mut level, mut player, mut queue) = setup("#####\n#@$.#\n#####\n");

        let outcome = attempt_move(&mut level, &mut player, &mut queue, 1, 0, SPEED);
        assert_eq!(outcome, MoveOutcome::Accepted);
        assert_eq!(queue.len(), 1);
        // occupancy unchanged until the slide commits
        assert_eq!(level.piece(2, 1).kind, PieceKind::Box);
        assert_eq!(level.piece(3, 1).kind, PieceKind::Empty);

        settle(&mut level, &mut player, &mut queue);
        assert_eq!(level.piece(2, 1).kind, PieceKind::Empty);
        assert_eq!(level.piece(3, 1).kind, PieceKind::Box);
        assert!(level.piece(3, 1).is_goal);
        assert!(level.is_solved());

        // crate now sits against the wall: pushing again moves nothing
        let before = kinds(&level);
        let outcome = attempt_move(&mut level, &mut player, &mut queue, 1, 0, SPEED);
        assert_eq!(outcome, MoveOutcome::Rejected);
        assert_eq!(kinds(&level), before);
        assert_eq!(player.cell(), (2, 1));
    }

    #[test]
    fn chain_of_two_moves_together() {
        let (mut level, mut player, mut queue) = setup("########\n# @$$..#\n########\n");

        assert_eq!(attempt_move(&mut level, &mut player, &mut queue, 1, 0, SPEED), MoveOutcome::Accepted);
        assert_eq!(queue.len(), 2);
        settle(&mut level, &mut player, &mut queue);

        // both crates advanced exactly one cell
        assert_eq!(level.piece(3, 1).kind, PieceKind::Empty);
        assert_eq!(level.piece(4, 1).kind, PieceKind::Box);
        assert_eq!(level.piece(5, 1).kind, PieceKind::Box);
        assert_eq!(level.piece(6, 1).kind, PieceKind::Empty);
        assert_eq!(level.completed_goals(), 1);

        assert_eq!(attempt_move(&mut level, &mut player, &mut queue, 1, 0, SPEED), MoveOutcome::Accepted);
        settle(&mut level, &mut player, &mut queue);
        assert!(level.is_solved());
    }

    #[test]
    fn blocked_chain_leaves_grid_unchanged() {
        // two crates with a wall immediately after the run, no gap:
        // the chain has nowhere to go and nothing may mutate
        let (mut level, mut player, mut queue) = setup("#####\n#@$$#\n#####\n");
        let before = kinds(&level);

        let outcome = attempt_move(&mut level, &mut player, &mut queue, 1, 0, SPEED);
        assert_eq!(outcome, MoveOutcome::Rejected);
        assert_eq!(kinds(&level), before);
        assert!(queue.is_empty());
        assert_eq!(player.cell(), (1, 1));
        assert_eq!(player.num_moves, 0);
    }

    #[test]
    fn commit_is_all_at_once() {
        let (mut level, mut player, mut queue) = setup("########\n# @$$..#\n########\n");
        attempt_move(&mut level, &mut player, &mut queue, 1, 0, SPEED);

        // halfway through: nothing committed, queue still pending
        update_slides(&mut level, &mut queue, SPEED / 2.0);
        assert_eq!(queue.len(), 2);
        assert_eq!(level.piece(3, 1).kind, PieceKind::Box);
        assert_eq!(level.piece(4, 1).kind, PieceKind::Box);

        // the frame where every slide finishes commits the whole batch
        let committed = update_slides(&mut level, &mut queue, SPEED);
        assert!(committed);
        assert!(queue.is_empty());
        assert_eq!(level.piece(3, 1).kind, PieceKind::Empty);
        assert_eq!(level.piece(4, 1).kind, PieceKind::Box);
        assert_eq!(level.piece(5, 1).kind, PieceKind::Box);
    }

    #[test]
    fn committed_crate_parks_at_its_new_cell() {
        let (mut level, mut player, mut queue) = setup("#####\n#@$.#\n#####\n");
        attempt_move(&mut level, &mut player, &mut queue, 1, 0, SPEED);
        settle(&mut level, &mut player, &mut queue);

        let piece = level.piece(3, 1);
        assert!(!piece.slide.active());
        assert_eq!(piece.slide.value(), Vec2::new(3.0, 1.0));
        // vacated cell's animation rests at the source
        assert_eq!(level.piece(2, 1).slide.value(), Vec2::new(2.0, 1.0));
    }
}
