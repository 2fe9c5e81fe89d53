/// Events emitted by the simulation.
/// The presentation layer consumes these for sound.

#[derive(Clone, Copy, Debug)]
pub enum GameEvent {
    PlayerMoved,
    BoxPushed { crates: usize },
    LevelSolved { index: usize },
}
