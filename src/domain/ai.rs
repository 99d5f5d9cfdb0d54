/// Enemy AI: wandering with momentum.
///
/// No pathfinding: an enemy picks among the cardinal directions the
/// movement rules allow, preferring to keep its heading.
///
///   1. **Stuck**: no legal direction. Stay put, retry after 500 ms.
///   2. **Wander**: pick uniformly among legal directions; if the current
///      heading is legal, keep it instead with 70% probability.
///
/// The cooldown after a move shrinks with the level and carries a random
/// jitter so enemies never step in lockstep.

use rand::Rng;

use super::entity::{Bomb, Coord, Direction, Enemy, Millis};
use super::rules;
use super::tile::Grid;

/// Retry delay when an enemy is boxed in.
pub const STUCK_RETRY_MS: Millis = 500;
/// Chance to keep the current heading when it is legal.
pub const KEEP_HEADING_CHANCE: f64 = 0.7;
/// Upper bound (exclusive) of the per-move random delay.
pub const JITTER_MS: Millis = 200;

const BASE_COOLDOWN_MS: Millis = 800;
const COOLDOWN_STEP_MS: Millis = 50;
const MIN_COOLDOWN_MS: Millis = 200;

/// Base delay between enemy moves for a level: `max(200, 800 - 50·level)`.
pub fn move_cooldown(level: u32) -> Millis {
    BASE_COOLDOWN_MS
        .saturating_sub(COOLDOWN_STEP_MS * level as Millis)
        .max(MIN_COOLDOWN_MS)
}

/// What an enemy does when its timer fires.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Decision {
    Move { dir: Direction, to: Coord },
    Wait,
}

/// Legal directions out of `from`, in `Direction::ALL` order.
pub fn legal_directions(grid: &Grid, bombs: &[Bomb], from: Coord) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|&d| rules::can_enter(grid, from.step(d, 1), bombs))
        .collect()
}

/// Pick a direction from `legal`. See module docs for the policy.
pub fn choose_direction(legal: &[Direction], facing: Direction, rng: &mut impl Rng) -> Option<Direction> {
    if legal.is_empty() {
        return None;
    }
    let random = legal[rng.gen_range(0..legal.len())];
    if legal.contains(&facing) && rng.gen_bool(KEEP_HEADING_CHANCE) {
        return Some(facing);
    }
    Some(random)
}

/// Decide this enemy's action and when it may act again.
/// Callers only ask when `now >= enemy.next_move_at`.
pub fn decide(
    grid: &Grid,
    bombs: &[Bomb],
    enemy: &Enemy,
    level: u32,
    now: Millis,
    rng: &mut impl Rng,
) -> (Decision, Millis) {
    let legal = legal_directions(grid, bombs, enemy.pos);
    match choose_direction(&legal, enemy.facing, rng) {
        Some(dir) => {
            let next = now + move_cooldown(level) + rng.gen_range(0..JITTER_MS);
            (Decision::Move { dir, to: enemy.pos.step(dir, 1) }, next)
        }
        None => (Decision::Wait, now + STUCK_RETRY_MS),
    }
}
