/// Level generation and setup.
///
/// ## Wall patterns (cycle every 5 levels, `(level - 1) % 5`)
///
///   0  Checkerboard  wall where x and y are both even
///   1  Arena         four pillars at x ∈ {4, W-5}, y ∈ {3, H-4}
///   2  Trenches      even rows, gaps where x % 3 == 0
///   3  Corridors     even columns, gap on the middle row
///   4  Ruins         random walls (p = 0.12), never where x and y are both even
///
/// Borders are always wall. The safe zone around the start stays empty.
/// Every other open cell becomes a brick with probability
/// `min(0.30 + 0.05·level, 0.65)`, plus 0.15 on the arena pattern.
///
/// ## Level setup order (each step draws from the same RNG)
///   1. Terrain
///   2. Door: a random brick, else the far corner
///   3. Enemies: up to `2 + level`, away from the start

use std::collections::VecDeque;

use rand::Rng;

use crate::config::{GeneratorConfig, RulesConfig};
use crate::domain::entity::{Coord, Direction, Door, Enemy, IdCounter, PlayerStats};
use crate::domain::tile::{Cell, Grid, GRID_HEIGHT, GRID_WIDTH};
use super::world::{GameState, PLAYER_START};

const W: i32 = GRID_WIDTH as i32;
const H: i32 = GRID_HEIGHT as i32;

const RUINS_WALL_CHANCE: f64 = 0.12;
const ARENA_EXTRA_DENSITY: f64 = 0.15;
const ENEMY_PLACEMENT_ATTEMPTS: u32 = 100;
/// Enemies spawn only where `x + y` exceeds this.
const ENEMY_MIN_SPAWN_SUM: i32 = 6;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pattern {
    Checkerboard,
    Arena,
    Trenches,
    Corridors,
    Ruins,
}

impl Pattern {
    pub fn for_level(level: u32) -> Pattern {
        match level.saturating_sub(1) % 5 {
            0 => Pattern::Checkerboard,
            1 => Pattern::Arena,
            2 => Pattern::Trenches,
            3 => Pattern::Corridors,
            _ => Pattern::Ruins,
        }
    }

    /// Does this pattern put a wall at interior cell (x, y)?
    /// Only `Ruins` consumes randomness.
    fn wall_at(self, x: i32, y: i32, rng: &mut impl Rng) -> bool {
        match self {
            Pattern::Checkerboard => x % 2 == 0 && y % 2 == 0,
            Pattern::Arena => (x == 4 || x == W - 5) && (y == 3 || y == H - 4),
            Pattern::Trenches => y % 2 == 0 && x % 3 != 0,
            Pattern::Corridors => x % 2 == 0 && y != H / 2,
            Pattern::Ruins => rng.gen_bool(RUINS_WALL_CHANCE) && (x % 2 != 0 || y % 2 != 0),
        }
    }
}

pub fn brick_density(level: u32) -> f64 {
    let base = (0.30 + 0.05 * level as f64).min(0.65);
    match Pattern::for_level(level) {
        Pattern::Arena => base + ARENA_EXTRA_DENSITY,
        _ => base,
    }
}

/// Cells next to the start that never hold a wall or brick.
pub fn is_safe_zone(x: i32, y: i32) -> bool {
    matches!((x, y), (1, 1) | (1, 2) | (2, 1))
}

fn is_border(x: i32, y: i32) -> bool {
    x == 0 || y == 0 || x == W - 1 || y == H - 1
}

// ══════════════════════════════════════════════════════════════
// Terrain
// ══════════════════════════════════════════════════════════════

pub fn generate(level: u32, rng: &mut impl Rng) -> Grid {
    let pattern = Pattern::for_level(level);
    let density = brick_density(level).min(1.0);
    let mut grid = Grid::empty();

    for y in 0..H {
        for x in 0..W {
            if is_border(x, y) {
                grid.set(x, y, Cell::Wall);
                continue;
            }
            if is_safe_zone(x, y) {
                continue;
            }
            if pattern.wall_at(x, y, rng) {
                grid.set(x, y, Cell::Wall);
                continue;
            }
            if rng.gen_bool(density) {
                grid.set(x, y, Cell::Brick);
            }
        }
    }

    grid
}

// ══════════════════════════════════════════════════════════════
// Door and enemies
// ══════════════════════════════════════════════════════════════

/// Hide the door under a random brick. With no bricks it sits in the far
/// corner, revealed only if that cell is open.
pub fn place_door(grid: &Grid, rng: &mut impl Rng) -> Door {
    let bricks: Vec<Coord> = grid
        .iter()
        .filter(|&(_, _, c)| c == Cell::Brick)
        .map(|(x, y, _)| Coord::new(x, y))
        .collect();

    let pos = if bricks.is_empty() {
        Coord::new(W - 2, H - 2)
    } else {
        bricks[rng.gen_range(0..bricks.len())]
    };
    let revealed = grid.get(pos.x, pos.y) == Some(Cell::Empty);
    Door { pos, revealed }
}

/// Scatter up to `2 + level` enemies over open cells away from the start.
/// Gives up after a fixed number of attempts, so crowded maps get fewer.
pub fn place_enemies(grid: &Grid, level: u32, ids: &mut IdCounter, rng: &mut impl Rng) -> Vec<Enemy> {
    let target = 2 + level as usize;
    let mut enemies = Vec::with_capacity(target);
    let mut attempts = 0;

    while enemies.len() < target && attempts < ENEMY_PLACEMENT_ATTEMPTS {
        attempts += 1;
        let x = rng.gen_range(1..W - 1);
        let y = rng.gen_range(1..H - 1);
        if grid.get(x, y) != Some(Cell::Empty) || x + y <= ENEMY_MIN_SPAWN_SUM {
            continue;
        }
        let facing = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        enemies.push(Enemy { id: ids.next(), pos: Coord::new(x, y), facing, next_move_at: 0 });
    }

    if enemies.len() < target {
        log::debug!("level {level}: placed {} of {target} enemies", enemies.len());
    }
    enemies
}

/// Flood fill over non-wall cells. Bricks count as open: they can be blasted.
pub fn door_reachable(grid: &Grid, from: Coord, door: Coord) -> bool {
    let mut visited = vec![vec![false; GRID_WIDTH]; GRID_HEIGHT];
    let mut queue: VecDeque<Coord> = VecDeque::with_capacity(GRID_WIDTH * GRID_HEIGHT);

    let open = |c: Coord| matches!(grid.get(c.x, c.y), Some(cell) if !cell.blocks_blast());
    if !open(from) {
        return false;
    }
    visited[from.y as usize][from.x as usize] = true;
    queue.push_back(from);

    while let Some(cur) = queue.pop_front() {
        if cur == door {
            return true;
        }
        for dir in Direction::ALL {
            let next = cur.step(dir, 1);
            if open(next) && !visited[next.y as usize][next.x as usize] {
                visited[next.y as usize][next.x as usize] = true;
                queue.push_back(next);
            }
        }
    }
    false
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Build the state for `level`, carrying `score` and `stats` over.
pub fn new_level(
    level: u32,
    score: u32,
    stats: PlayerStats,
    rules: &RulesConfig,
    gen: &GeneratorConfig,
    rng: &mut impl Rng,
) -> GameState {
    let attempts = if gen.ensure_reachable { gen.reachability_attempts.max(1) } else { 1 };

    let mut grid = generate(level, rng);
    let mut door = place_door(&grid, rng);
    for attempt in 1..attempts {
        if door_reachable(&grid, PLAYER_START, door.pos) {
            break;
        }
        log::debug!("level {level}: door unreachable, regenerating (attempt {attempt})");
        grid = generate(level, rng);
        door = place_door(&grid, rng);
    }
    if gen.ensure_reachable && !door_reachable(&grid, PLAYER_START, door.pos) {
        log::warn!("level {level}: door still unreachable after {attempts} attempts");
    }

    let mut state = GameState::new(level, grid, door, score, stats, rules.clone());
    state.enemies = place_enemies(&state.grid, level, &mut state.ids, rng);

    log::info!(
        "level {level} ({:?}): {} enemies, {} bricks",
        Pattern::for_level(level),
        state.enemies.len(),
        state.grid.count(Cell::Brick),
    );
    state
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn interior() -> impl Iterator<Item = (i32, i32)> {
        (1..H - 1).flat_map(|y| (1..W - 1).map(move |x| (x, y)))
    }

    #[test]
    fn pattern_cycles_every_five_levels() {
        assert_eq!(Pattern::for_level(1), Pattern::Checkerboard);
        assert_eq!(Pattern::for_level(2), Pattern::Arena);
        assert_eq!(Pattern::for_level(5), Pattern::Ruins);
        assert_eq!(Pattern::for_level(6), Pattern::Checkerboard);
        assert_eq!(Pattern::for_level(12), Pattern::Arena);
    }

    #[test]
    fn density_is_capped() {
        assert!((brick_density(1) - 0.35).abs() < 1e-9);
        assert!((brick_density(2) - 0.55).abs() < 1e-9);
        assert!((brick_density(11) - 0.65).abs() < 1e-9);
        assert!((brick_density(12) - 0.80).abs() < 1e-9);
    }

    #[test]
    fn fixed_patterns_place_walls_exactly() {
        for level in 1..=4u32 {
            let g = generate(level, &mut rng(level as u64));
            let p = Pattern::for_level(level);
            for (x, y) in interior() {
                if is_safe_zone(x, y) {
                    continue;
                }
                let expect = match p {
                    Pattern::Checkerboard => x % 2 == 0 && y % 2 == 0,
                    Pattern::Arena => (x == 4 || x == 10) && (y == 3 || y == 7),
                    Pattern::Trenches => y % 2 == 0 && x % 3 != 0,
                    Pattern::Corridors => x % 2 == 0 && y != 5,
                    Pattern::Ruins => unreachable!(),
                };
                assert_eq!(g.get(x, y) == Some(Cell::Wall), expect, "level {level} at ({x},{y})");
            }
        }
    }

    #[test]
    fn ruins_skip_even_even_cells() {
        for seed in 0..10 {
            let g = generate(5, &mut rng(seed));
            for (x, y) in interior() {
                if x % 2 == 0 && y % 2 == 0 {
                    assert_ne!(g.get(x, y), Some(Cell::Wall));
                }
            }
        }
    }

    #[test]
    fn door_sits_on_a_brick() {
        let g = generate(1, &mut rng(3));
        let d = place_door(&g, &mut rng(4));
        assert_eq!(g.get(d.pos.x, d.pos.y), Some(Cell::Brick));
        assert!(!d.revealed);
    }

    #[test]
    fn door_without_bricks_uses_far_corner() {
        let g = Grid::walled();
        let d = place_door(&g, &mut rng(0));
        assert_eq!(d.pos, Coord::new(13, 9));
        assert!(d.revealed);
    }

    #[test]
    fn enemies_spawn_away_from_start() {
        let g = generate(3, &mut rng(9));
        let mut ids = IdCounter::default();
        let es = place_enemies(&g, 3, &mut ids, &mut rng(10));
        assert!(es.len() <= 5);
        for e in &es {
            assert_eq!(g.get(e.pos.x, e.pos.y), Some(Cell::Empty));
            assert!(e.pos.x + e.pos.y > 6);
            assert_eq!(e.next_move_at, 0);
        }
        let mut seen: Vec<_> = es.iter().map(|e| e.id).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), es.len());
    }

    #[test]
    fn open_arena_gets_full_enemy_count() {
        let g = Grid::walled();
        let mut ids = IdCounter::default();
        let es = place_enemies(&g, 4, &mut ids, &mut rng(1));
        assert_eq!(es.len(), 6);
    }

    #[test]
    fn flood_fill_sees_through_bricks_not_walls() {
        let g = Grid::from_rows(&[
            "=======",
            "=  #  =",
            "=======",
        ]);
        assert!(door_reachable(&g, Coord::new(1, 1), Coord::new(5, 1)));

        let g = Grid::from_rows(&[
            "=======",
            "=  =  =",
            "=======",
        ]);
        assert!(!door_reachable(&g, Coord::new(1, 1), Coord::new(5, 1)));
    }

    #[test]
    fn reachability_pass_finds_a_reachable_door() {
        let cfg = GameConfig::default();
        let gen = GeneratorConfig { ensure_reachable: true, reachability_attempts: 50 };
        for seed in 0..10 {
            let stats = GameState::base_stats(&cfg.rules);
            let s = new_level(5, 0, stats, &cfg.rules, &gen, &mut rng(seed));
            assert!(door_reachable(&s.grid, PLAYER_START, s.door.pos));
        }
    }

    #[test]
    fn new_level_carries_score_and_stats() {
        let cfg = GameConfig::default();
        let stats = PlayerStats { range: 4, speed_ms: 150 };
        let s = new_level(3, 1234, stats, &cfg.rules, &cfg.generator, &mut rng(2));
        assert_eq!(s.level, 3);
        assert_eq!(s.score, 1234);
        assert_eq!(s.player.stats, stats);
        assert_eq!(s.player.pos, PLAYER_START);
        assert_eq!(s.time_left, cfg.rules.level_time_secs);
        assert!(s.bombs.is_empty() && s.items.is_empty() && s.explosions.is_empty());
    }

    proptest! {
        #[test]
        fn borders_are_walls_and_safe_zone_is_empty(level in 1u32..40, seed in any::<u64>()) {
            let g = generate(level, &mut rng(seed));
            for (x, y, c) in g.iter() {
                if is_border(x, y) {
                    prop_assert_eq!(c, Cell::Wall);
                }
                if is_safe_zone(x, y) {
                    prop_assert_eq!(c, Cell::Empty);
                }
            }
        }
    }
}
