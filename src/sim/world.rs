/// GameState: the complete state of one level in play.
///
/// One live instance, owned by the `Engine`. Restart and level change
/// replace it wholesale; nothing carries over except what `new_level`
/// is handed explicitly (score and player stats).
///
/// ## Status
///
/// Status is derived from three flags, never stored:
///
///   game_over  won    paused   →  Status
///   ─────────  ─────  ──────      ─────────
///   true       *      *           GameOver
///   false      true   *           Won
///   false      false  true        Paused
///   false      false  false       Running
///
/// Ticks, countdowns and gameplay commands only act while `Running`.

use crate::config::RulesConfig;
use crate::domain::entity::{
    Bomb, Coord, Door, Enemy, Explosion, IdCounter, Item, Particle, Player, PlayerStats,
};
use crate::domain::tile::Grid;

pub const PLAYER_START: Coord = Coord::new(1, 1);

pub const SCORE_BRICK: u32 = 10;
pub const SCORE_ITEM: u32 = 50;
pub const SCORE_ENEMY: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Running,
    Paused,
    GameOver,
    Won,
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub level: u32,
    pub grid: Grid,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bombs: Vec<Bomb>,
    pub explosions: Vec<Explosion>,
    pub items: Vec<Item>,
    pub particles: Vec<Particle>,
    pub door: Door,

    // ── Progress ──
    pub score: u32,
    /// Seconds left on the level clock.
    pub time_left: u32,

    // ── Flags ──
    pub game_over: bool,
    pub won: bool,
    pub paused: bool,

    pub ids: IdCounter,
    pub rules: RulesConfig,
}

impl GameState {
    /// A fresh level on `grid`: player at the start, no enemies, nothing
    /// armed. `sim::level::new_level` fills in enemies.
    pub fn new(level: u32, grid: Grid, door: Door, score: u32, stats: PlayerStats, rules: RulesConfig) -> Self {
        GameState {
            level,
            grid,
            player: Player::new(PLAYER_START, stats),
            enemies: vec![],
            bombs: vec![],
            explosions: vec![],
            items: vec![],
            particles: vec![],
            door,
            score,
            time_left: rules.level_time_secs,
            game_over: false,
            won: false,
            paused: false,
            ids: IdCounter::default(),
            rules,
        }
    }

    pub fn status(&self) -> Status {
        if self.game_over {
            Status::GameOver
        } else if self.won {
            Status::Won
        } else if self.paused {
            Status::Paused
        } else {
            Status::Running
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.status() == Status::Running
    }

    /// Stats a player starts the game with.
    pub fn base_stats(rules: &RulesConfig) -> PlayerStats {
        PlayerStats { range: rules.base_range, speed_ms: rules.base_speed_ms }
    }

    pub fn item_index_at(&self, at: Coord) -> Option<usize> {
        self.items.iter().position(|i| i.pos == at)
    }

    pub fn has_explosion_at(&self, at: Coord) -> bool {
        self.explosions.iter().any(|e| e.pos == at)
    }

    pub fn has_enemy_at(&self, at: Coord) -> bool {
        self.enemies.iter().any(|e| e.pos == at)
    }
}
