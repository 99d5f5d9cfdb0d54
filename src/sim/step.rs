/// The scheduled update: one tick and one countdown second.
///
/// Tick processing order:
///   1. Bombs: due bombs detonate against one grid snapshot
///   2. Explosion expiry
///   3. Enemies caught in an explosion die
///   4. Enemy movement
///   5. Particle decay
///   6. Player death check (explosion or enemy on the player's cell)
///
/// Both entry points are no-ops unless the game is running.
/// Neither ever ends the game by running out of time: only `countdown`
/// does that, one call after the clock has reached zero.

use rand::Rng;

use crate::domain::ai::{self, Decision};
use crate::domain::blast;
use crate::domain::entity::{Bomb, Explosion, Item, ItemKind, Millis};
use crate::domain::particle::{self, Burst};
use crate::domain::tile::Cell;
use super::event::{DeathCause, GameEvent};
use super::world::{GameState, SCORE_BRICK, SCORE_ENEMY};

// ══════════════════════════════════════════════════════════════
// Main entry points
// ══════════════════════════════════════════════════════════════

pub fn tick(state: &mut GameState, now: Millis, rng: &mut impl Rng) -> Vec<GameEvent> {
    if !state.is_running() { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();

    resolve_bombs(state, now, rng, &mut events);
    state.explosions.retain(|e| e.is_active(now));
    resolve_enemy_deaths(state, rng, &mut events);
    resolve_enemy_movement(state, now, rng);
    particle::update(&mut state.particles);
    resolve_player_death(state, &mut events);

    events
}

/// One second of level time. At zero the next call ends the game.
pub fn countdown(state: &mut GameState) -> Vec<GameEvent> {
    if !state.is_running() { return vec![]; }

    if state.time_left == 0 {
        state.game_over = true;
        state.player.alive = false;
        log::info!("level {}: time up, score {}", state.level, state.score);
        return vec![GameEvent::Death { cause: DeathCause::Timeout }];
    }
    state.time_left -= 1;
    vec![]
}

// ══════════════════════════════════════════════════════════════
// Bombs and blasts
// ══════════════════════════════════════════════════════════════

fn resolve_bombs(state: &mut GameState, now: Millis, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    if !state.bombs.iter().any(|b| b.is_due(now)) { return; }

    let (due, stable): (Vec<Bomb>, Vec<Bomb>) =
        std::mem::take(&mut state.bombs).into_iter().partition(|b| b.is_due(now));
    let plan = blast::plan(&state.grid, &due, &stable);
    state.bombs = stable;

    // Chained bombs go off next tick.
    for b in state.bombs.iter_mut().filter(|b| plan.chained.contains(&b.id)) {
        b.trigger(now);
    }

    let expires_at = now + state.rules.explosion_ms;
    for &pos in &plan.hazards {
        let id = state.ids.next();
        state.explosions.push(Explosion { id, pos, expires_at });
    }

    // Sweep items before bricks drop new ones.
    state.items.retain(|i| !plan.swept.contains(&i.pos));

    for &at in &plan.bricks {
        state.grid.set(at.x, at.y, Cell::Empty);
        state.score += SCORE_BRICK;
        particle::spawn(&mut state.particles, Burst::Debris, at, &mut state.ids, rng);

        if at == state.door.pos {
            state.door.revealed = true;
            particle::spawn(&mut state.particles, Burst::DoorReveal, at, &mut state.ids, rng);
            log::debug!("door revealed at ({}, {})", at.x, at.y);
        } else if rng.gen_bool(state.rules.item_drop_chance) {
            let kind = if rng.gen_bool(0.5) { ItemKind::RangeUp } else { ItemKind::SpeedUp };
            let id = state.ids.next();
            state.items.push(Item { id, pos: at, kind });
        }
    }

    log::debug!(
        "t={now}: {} bombs detonated, {} chained, {} bricks",
        due.len(),
        plan.chained.len(),
        plan.bricks.len(),
    );
    events.push(GameEvent::Explosion { bombs: due.len() });
    if !plan.bricks.is_empty() {
        events.push(GameEvent::BrickBreak { count: plan.bricks.len() });
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn resolve_enemy_deaths(state: &mut GameState, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    if state.enemies.is_empty() || state.explosions.is_empty() { return; }

    let (dead, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(|e| state.explosions.iter().any(|x| x.pos == e.pos));
    state.enemies = alive;
    if dead.is_empty() { return; }

    for e in &dead {
        state.score += SCORE_ENEMY;
        particle::spawn(&mut state.particles, Burst::EnemyDeath, e.pos, &mut state.ids, rng);
    }
    log::debug!("{} enemies killed, {} left", dead.len(), state.enemies.len());
    events.push(GameEvent::EnemyKill { count: dead.len() });
}

fn resolve_enemy_movement(state: &mut GameState, now: Millis, rng: &mut impl Rng) {
    for i in 0..state.enemies.len() {
        if now < state.enemies[i].next_move_at { continue; }

        let (decision, next_move_at) =
            ai::decide(&state.grid, &state.bombs, &state.enemies[i], state.level, now, rng);
        let enemy = &mut state.enemies[i];
        if let Decision::Move { dir, to } = decision {
            enemy.pos = to;
            enemy.facing = dir;
        }
        enemy.next_move_at = next_move_at;
    }
}

// ══════════════════════════════════════════════════════════════
// Player death
// ══════════════════════════════════════════════════════════════

fn resolve_player_death(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let pos = state.player.pos;
    let cause = if state.has_explosion_at(pos) {
        DeathCause::Blast
    } else if state.has_enemy_at(pos) {
        DeathCause::Enemy
    } else {
        return;
    };

    state.player.alive = false;
    state.game_over = true;
    log::info!("level {}: player died ({cause:?}), score {}", state.level, state.score);
    events.push(GameEvent::Death { cause });
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
