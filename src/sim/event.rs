/// Events emitted during a tick.
/// The presentation layer consumes these for sound and the message bar.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HazardKind {
    Obstacle,
    Enemy,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    KeyCollected,
    HeartCollected { index: usize },
    LifeLost { cause: HazardKind },
    ExitOpened { index: usize },
    ExitBlocked,
    JumpStarted,
    Landed,
    Won { score: u32 },
    Lost,
}
