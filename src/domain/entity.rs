/// Entities: Player, Enemy, Bomb, Explosion, Item, Particle, Door.
/// Plain data. Behavior lives in `rules`, `blast`, `ai` and `particle`;
/// mutation happens in `sim::step` and `sim::command`.

/// Milliseconds on the engine's monotonic clock.
pub type Millis = u64;

/// Entity identity. Unique within one `GameState`.
pub type EntityId = u32;

/// Monotonic id source. One per `GameState`; ids start at 1.
#[derive(Clone, Debug, Default)]
pub struct IdCounter(EntityId);

impl IdCounter {
    pub fn next(&mut self) -> EntityId {
        self.0 += 1;
        self.0
    }
}

/// A grid cell address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// The cell `steps` cells away in `dir`.
    pub fn step(self, dir: Direction, steps: i32) -> Coord {
        let (dx, dy) = dir.delta();
        Coord { x: self.x + dx * steps, y: self.y + dy * steps }
    }
}

/// Cardinal direction (movement, facing, blast rays).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Fixed iteration order for blast rays and AI candidates.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PlayerStats {
    /// Blast radius in cells.
    pub range: u32,
    /// Minimum ms between accepted moves. Lower is faster.
    pub speed_ms: u64,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Coord,
    pub alive: bool,
    /// `None` until the first accepted move.
    pub last_move_at: Option<Millis>,
    pub stats: PlayerStats,
}

impl Player {
    pub fn new(pos: Coord, stats: PlayerStats) -> Self {
        Player { pos, alive: true, last_move_at: None, stats }
    }

    /// Has the move cooldown elapsed at `now`?
    pub fn can_move_at(&self, now: Millis) -> bool {
        match self.last_move_at {
            None => true,
            Some(t) => now.saturating_sub(t) >= self.stats.speed_ms,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Coord,
    pub facing: Direction,
    /// Earliest time the AI may move this enemy again.
    pub next_move_at: Millis,
}

#[derive(Clone, Debug)]
pub struct Bomb {
    pub id: EntityId,
    pub pos: Coord,
    /// Absolute detonation time.
    pub fuse_at: Millis,
    /// Captured from the placing player's stats; never updated afterwards.
    pub range: u32,
}

impl Bomb {
    pub fn is_due(&self, now: Millis) -> bool {
        self.fuse_at <= now
    }

    /// Chain reaction: pull the fuse forward so the next tick after `now`
    /// detonates it. Never detonates within the current tick.
    pub fn trigger(&mut self, now: Millis) {
        self.fuse_at = self.fuse_at.min(now);
    }
}

/// One hazard instance on one cell. Several may overlap.
#[derive(Clone, Debug)]
pub struct Explosion {
    pub id: EntityId,
    pub pos: Coord,
    pub expires_at: Millis,
}

impl Explosion {
    pub fn is_active(&self, now: Millis) -> bool {
        self.expires_at > now
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ItemKind {
    RangeUp,
    SpeedUp,
}

#[derive(Clone, Debug)]
pub struct Item {
    pub id: EntityId,
    pub pos: Coord,
    pub kind: ItemKind,
}

/// RGB color hint for renderers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Tint {
    pub const YELLOW: Tint = Tint { r: 250, g: 204, b: 21 };
    pub const CYAN: Tint = Tint { r: 34, g: 211, b: 238 };
    pub const PURPLE: Tint = Tint { r: 162, g: 28, b: 175 };
    pub const WHITE: Tint = Tint { r: 255, g: 255, b: 255 };
    pub const RED: Tint = Tint { r: 239, g: 68, b: 68 };
}

/// Cosmetic particle. Position is continuous, in cell units.
#[derive(Clone, Debug)]
pub struct Particle {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// 1.0 (fresh) → 0.0 (gone). Door bursts start above 1.0.
    pub life: f32,
    pub tint: Tint,
    pub size: f32,
}

/// Level exit. Hidden under a brick until that brick is destroyed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Door {
    pub pos: Coord,
    pub revealed: bool,
}
