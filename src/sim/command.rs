/// Player commands: the only way outside code changes a running game.
///
/// Each command is one atomic transition. A rejected command changes
/// nothing and reports `false`; rejection is not an error.
///
/// ## Acceptance
///
///   Command       Running  Paused  GameOver  Won
///   ───────────   ───────  ──────  ────────  ───
///   Move          rules    no      no        no
///   PlaceBomb     rules    no      no        no
///   TogglePause   yes      yes     no        no
///   Restart       yes      yes     yes       yes
///   NextLevel     yes      yes     yes       yes

use rand::Rng;

use crate::config::GeneratorConfig;
use crate::domain::entity::{Bomb, Direction, ItemKind, Millis};
use crate::domain::particle::{self, Burst};
use crate::domain::rules;
use super::event::GameEvent;
use super::level;
use super::world::{GameState, Status, SCORE_ITEM};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Direction),
    PlaceBomb,
    TogglePause,
    Restart,
    NextLevel,
}

/// Apply one command at time `now`. Returns whether it was accepted.
pub fn apply(
    state: &mut GameState,
    cmd: Command,
    now: Millis,
    gen: &GeneratorConfig,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> bool {
    let accepted = match cmd {
        Command::Move(dir) => move_player(state, dir, now, rng, events),
        Command::PlaceBomb => place_bomb(state, now, events),
        Command::TogglePause => toggle_pause(state),
        Command::Restart => {
            restart(state, gen, rng, events);
            true
        }
        Command::NextLevel => {
            next_level(state, gen, rng, events);
            true
        }
    };
    if !accepted {
        log::trace!("t={now}: rejected {cmd:?} in {:?}", state.status());
    }
    accepted
}

// ══════════════════════════════════════════════════════════════
// Gameplay commands
// ══════════════════════════════════════════════════════════════

/// Step one cell. Pickup and the win check happen in the same transition.
pub fn move_player(
    state: &mut GameState,
    dir: Direction,
    now: Millis,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> bool {
    if !state.is_running() { return false; }
    if !state.player.can_move_at(now) { return false; }

    let to = state.player.pos.step(dir, 1);
    if !rules::can_enter(&state.grid, to, &state.bombs) { return false; }

    state.player.pos = to;
    state.player.last_move_at = Some(now);

    if let Some(idx) = state.item_index_at(to) {
        let item = state.items.remove(idx);
        state.score += SCORE_ITEM;
        let stats = &mut state.player.stats;
        match item.kind {
            ItemKind::RangeUp => stats.range += 1,
            ItemKind::SpeedUp => {
                stats.speed_ms = stats
                    .speed_ms
                    .saturating_sub(state.rules.speed_step_ms)
                    .max(state.rules.min_speed_ms);
            }
        }
        particle::spawn(&mut state.particles, Burst::Pickup(item.kind), to, &mut state.ids, rng);
        events.push(GameEvent::Powerup { kind: item.kind });
    }

    if state.door.revealed && to == state.door.pos && state.enemies.is_empty() {
        state.won = true;
        state.paused = true;
        log::info!("level {} cleared, score {}", state.level, state.score);
        events.push(GameEvent::Win { level: state.level });
    }
    true
}

/// Arm a bomb under the player with the player's current range.
pub fn place_bomb(state: &mut GameState, now: Millis, events: &mut Vec<GameEvent>) -> bool {
    if !state.is_running() { return false; }
    let at = state.player.pos;
    if rules::has_bomb(&state.bombs, at) { return false; }
    if state.bombs.len() >= state.rules.max_bombs { return false; }

    let id = state.ids.next();
    state.bombs.push(Bomb {
        id,
        pos: at,
        fuse_at: now + state.rules.bomb_fuse_ms,
        range: state.player.stats.range,
    });
    events.push(GameEvent::BombArmed { at });
    true
}

pub fn toggle_pause(state: &mut GameState) -> bool {
    match state.status() {
        Status::Running => state.paused = true,
        Status::Paused => state.paused = false,
        Status::GameOver | Status::Won => return false,
    }
    true
}

// ══════════════════════════════════════════════════════════════
// Level transitions
// ══════════════════════════════════════════════════════════════

/// Back to level 1 with score 0 and base stats.
pub fn restart(state: &mut GameState, gen: &GeneratorConfig, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    let rules = state.rules.clone();
    let stats = GameState::base_stats(&rules);
    log::info!("restart from level {}", state.level);
    *state = level::new_level(1, 0, stats, &rules, gen, rng);
    events.push(GameEvent::LevelStart { level: 1 });
}

/// Advance one level, keeping score and stats.
pub fn next_level(state: &mut GameState, gen: &GeneratorConfig, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    let rules = state.rules.clone();
    let next = state.level + 1;
    *state = level::new_level(next, state.score, state.player.stats, &rules, gen, rng);
    events.push(GameEvent::LevelStart { level: next });
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
