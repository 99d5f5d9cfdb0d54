/// Engine: single owner of the live game, its clocks and its RNG.
///
/// ## Time sources
///
///   tick        every `tick_ms`       → step::tick
///   countdown   every `countdown_ms`  → step::countdown
///   commands    whenever the host has one → command::apply
///
/// All three are `&mut self` calls that run to completion, so each one
/// sees and leaves a consistent state. `advance(now)` fires every deadline
/// at or before `now` in time order (a tick before a countdown on a tie).
/// After a stall, at most `max_catchup_ticks` ticks are replayed; the rest
/// are skipped and the tick schedule resyncs to `now`. Countdowns are never
/// skipped: every elapsed second is charged to the level clock. Deadlines
/// keep moving while paused; the handlers simply do nothing.
///
/// ## Snapshots
///
/// Every accepted mutation republishes the state as an `Arc<GameState>`
/// and bumps `revision`. Readers never see a half-applied transition.

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;

use crate::config::{GameConfig, GeneratorConfig, TimingConfig};
use crate::domain::entity::Millis;
use super::command::{self, Command};
use super::event::GameEvent;
use super::level;
use super::step;
use super::world::GameState;

/// Monotonic millisecond clock anchored at construction.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Clock { start: Instant::now() }
    }

    pub fn now(&self) -> Millis {
        self.start.elapsed().as_millis() as Millis
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::new()
    }
}

pub struct Engine<R: Rng> {
    state: GameState,
    rng: R,
    timing: TimingConfig,
    generator: GeneratorConfig,

    next_tick_at: Millis,
    next_countdown_at: Millis,

    events: Vec<GameEvent>,
    published: Arc<GameState>,
    revision: u64,
}

impl<R: Rng> Engine<R> {
    /// Start a new game at level 1 at time `now`.
    pub fn new(config: &GameConfig, mut rng: R, now: Millis) -> Self {
        let stats = GameState::base_stats(&config.rules);
        let state = level::new_level(1, 0, stats, &config.rules, &config.generator, &mut rng);
        let mut engine = Engine::from_state(state, config, rng, now);
        engine.events.push(GameEvent::LevelStart { level: 1 });
        engine
    }

    /// Take over an existing state. Used by tests and tools that build
    /// a level by hand.
    pub fn from_state(state: GameState, config: &GameConfig, rng: R, now: Millis) -> Self {
        let published = Arc::new(state.clone());
        Engine {
            state,
            rng,
            timing: config.timing.clone(),
            generator: config.generator.clone(),
            next_tick_at: now + config.timing.tick_ms,
            next_countdown_at: now + config.timing.countdown_ms,
            events: Vec::new(),
            published,
            revision: 0,
        }
    }

    // ── Scheduling ──

    /// Run every tick and countdown due at or before `now`.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, now: Millis) -> u32 {
        let tick_ms = self.timing.tick_ms;
        let countdown_ms = self.timing.countdown_ms;
        let cap = self.timing.max_catchup_ticks;

        let mut ticks = 0u32;
        let mut changed = false;

        loop {
            if ticks >= cap && self.next_tick_at <= now {
                let skipped = (now - self.next_tick_at) / tick_ms + 1;
                log::debug!("t={now}: skipping {skipped} overdue ticks");
                self.next_tick_at = now + tick_ms;
            }

            let due = self.next_tick_at.min(self.next_countdown_at);
            if due > now { break; }

            let running = self.state.is_running();
            if self.next_tick_at <= self.next_countdown_at {
                let at = self.next_tick_at;
                self.next_tick_at += tick_ms;
                ticks += 1;
                let ev = step::tick(&mut self.state, at, &mut self.rng);
                self.events.extend(ev);
            } else {
                self.next_countdown_at += countdown_ms;
                let ev = step::countdown(&mut self.state);
                self.events.extend(ev);
            }
            changed |= running;
        }

        if changed {
            self.publish();
        }
        ticks
    }

    // ── Commands ──

    /// Apply one command at `now`. `false` means rejected, nothing changed.
    pub fn handle(&mut self, cmd: Command, now: Millis) -> bool {
        let accepted = command::apply(
            &mut self.state,
            cmd,
            now,
            &self.generator,
            &mut self.rng,
            &mut self.events,
        );
        if accepted {
            if matches!(cmd, Command::Restart | Command::NextLevel) {
                // A new level gets a full second before its first countdown.
                self.next_tick_at = now + self.timing.tick_ms;
                self.next_countdown_at = now + self.timing.countdown_ms;
            }
            self.publish();
        }
        accepted
    }

    // ── Output ──

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// The last published state.
    pub fn snapshot(&self) -> Arc<GameState> {
        Arc::clone(&self.published)
    }

    /// Incremented on every publish.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The live state. Equal to the snapshot between calls.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn next_tick_at(&self) -> Millis {
        self.next_tick_at
    }

    pub fn next_countdown_at(&self) -> Millis {
        self.next_countdown_at
    }

    fn publish(&mut self) {
        self.published = Arc::new(self.state.clone());
        self.revision += 1;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
