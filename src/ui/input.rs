/// Keyboard input: key state tracking and the host key map.
///
/// Movement is continuous: a held arrow key keeps asking to move, and the
/// engine's per-player speed throttle decides how often that succeeds.
/// Everything else is edge-triggered and fires once per press.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't
/// report releases.
///
/// ## Key map
///
///   Game:  arrows / WASD   move          Space / Enter  bomb
///          Esc / P         pause         R              restart
///          N               next level    X              menu
///   Menu:  Enter           start         Q / Esc        quit
///   Any:   Ctrl-C          quit

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use gridblast::domain::entity::Direction;

/// After this long without a Press/Repeat event, a key counts as released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// What the host does with a key press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Direction),
    Bomb,
    Pause,
    Restart,
    NextLevel,
    ToMenu,
    Start,
    Quit,
}

/// Which screen the key map applies to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Context {
    Menu,
    Game,
}

const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];

/// Direction bound to `code`, if any.
pub fn key_direction(code: KeyCode) -> Option<Direction> {
    if KEYS_UP.contains(&code) {
        Some(Direction::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Direction::Down)
    } else if KEYS_LEFT.contains(&code) {
        Some(Direction::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Direction::Right)
    } else {
        None
    }
}

/// Map one key press to an action. See the key map above.
pub fn map_key(key: KeyEvent, ctx: Context) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(Action::Quit);
    }

    match ctx {
        Context::Menu => match key.code {
            KeyCode::Enter => Some(Action::Start),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
            _ => None,
        },
        Context::Game => {
            if let Some(dir) = key_direction(key.code) {
                return Some(Action::Move(dir));
            }
            match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Bomb),
                KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::Pause),
                KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Restart),
                KeyCode::Char('n') | KeyCode::Char('N') => Some(Action::NextLevel),
                KeyCode::Char('x') | KeyCode::Char('X') => Some(Action::ToMenu),
                _ => None,
            }
        }
    }
}

pub struct InputState {
    /// Timestamp of the last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Key presses that arrived during the most recent `drain_events()`.
    pressed: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            pressed: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame.
    pub fn drain_events(&mut self) {
        self.pressed.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else { continue };
            match key.kind {
                KeyEventKind::Release if self.honor_release => {
                    self.last_active.remove(&key.code);
                }
                KeyEventKind::Release => {}
                KeyEventKind::Repeat => {
                    self.last_active.insert(key.code, Instant::now());
                }
                KeyEventKind::Press => {
                    let was_held = self.is_held(key.code);
                    self.last_active.insert(key.code, Instant::now());
                    if !was_held {
                        self.pressed.push(key);
                    }
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// The direction currently held, if any. Up wins over down over left
    /// over right when several are held.
    pub fn held_direction(&self) -> Option<Direction> {
        Direction::ALL.into_iter().find(|&d| {
            let keys = match d {
                Direction::Up => KEYS_UP,
                Direction::Down => KEYS_DOWN,
                Direction::Left => KEYS_LEFT,
                Direction::Right => KEYS_RIGHT,
            };
            keys.iter().any(|&k| self.is_held(k))
        })
    }

    /// Fresh presses this frame mapped through the key map.
    pub fn actions(&self, ctx: Context) -> Vec<Action> {
        self.pressed.iter().filter_map(|&k| map_key(k, ctx)).collect()
    }
}
