/// Events emitted by ticks, countdowns and commands.
/// The presentation layer consumes these for sound and effects.

use crate::domain::entity::{Coord, ItemKind};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeathCause {
    Blast,
    Enemy,
    Timeout,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    BombArmed { at: Coord },
    /// Once per tick in which at least one bomb went off.
    Explosion { bombs: usize },
    /// Once per tick in which at least one brick was destroyed.
    BrickBreak { count: usize },
    Powerup { kind: ItemKind },
    /// Once per tick in which at least one enemy died.
    EnemyKill { count: usize },
    LevelStart { level: u32 },
    Win { level: u32 },
    Death { cause: DeathCause },
}
