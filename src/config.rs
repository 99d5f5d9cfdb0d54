/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD or
/// `~/.local/share/gridblast`. A missing file, a missing key or a file
/// that fails to parse all fall back to the built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub rules: RulesConfig,
    pub generator: GeneratorConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_ms: u64,
    pub countdown_ms: u64,
    /// Ticks replayed after a stall before the schedule resyncs.
    pub max_catchup_ticks: u32,
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub level_time_secs: u32,
    pub bomb_fuse_ms: u64,
    pub explosion_ms: u64,
    pub max_bombs: usize,
    pub base_range: u32,
    pub base_speed_ms: u64,
    pub min_speed_ms: u64,
    pub speed_step_ms: u64,
    pub item_drop_chance: f64,
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Regenerate levels whose door can't be reached from the start.
    pub ensure_reachable: bool,
    pub reachability_attempts: u32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub bomb: Vec<String>,
    pub pause: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    generator: TomlGenerator,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick")]
    tick_ms: u64,
    #[serde(default = "default_countdown")]
    countdown_ms: u64,
    #[serde(default = "default_max_catchup")]
    max_catchup_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_level_time")]
    level_time_secs: u32,
    #[serde(default = "default_bomb_fuse")]
    bomb_fuse_ms: u64,
    #[serde(default = "default_explosion")]
    explosion_ms: u64,
    #[serde(default = "default_max_bombs")]
    max_bombs: usize,
    #[serde(default = "default_base_range")]
    base_range: u32,
    #[serde(default = "default_base_speed")]
    base_speed_ms: u64,
    #[serde(default = "default_min_speed")]
    min_speed_ms: u64,
    #[serde(default = "default_speed_step")]
    speed_step_ms: u64,
    #[serde(default = "default_drop_chance")]
    item_drop_chance: f64,
}

#[derive(Deserialize, Debug)]
struct TomlGenerator {
    #[serde(default)]
    ensure_reachable: bool,
    #[serde(default = "default_reach_attempts")]
    reachability_attempts: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_bomb_btns")]
    bomb: Vec<String>,
    #[serde(default = "default_pause_btns")]
    pause: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

// ── Defaults ──

fn default_tick() -> u64 { 50 }
fn default_countdown() -> u64 { 1000 }
fn default_max_catchup() -> u32 { 5 }   // 250ms of simulated time

fn default_level_time() -> u32 { 180 }
fn default_bomb_fuse() -> u64 { 2500 }
fn default_explosion() -> u64 { 600 }
fn default_max_bombs() -> usize { 3 }
fn default_base_range() -> u32 { 1 }
fn default_base_speed() -> u64 { 300 }
fn default_min_speed() -> u64 { 100 }
fn default_speed_step() -> u64 { 30 }
fn default_drop_chance() -> f64 { 0.25 }

fn default_reach_attempts() -> u32 { 20 }

fn default_bomb_btns() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_pause_btns() -> Vec<String> { vec!["Start".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_ms: default_tick(),
            countdown_ms: default_countdown(),
            max_catchup_ticks: default_max_catchup(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            level_time_secs: default_level_time(),
            bomb_fuse_ms: default_bomb_fuse(),
            explosion_ms: default_explosion(),
            max_bombs: default_max_bombs(),
            base_range: default_base_range(),
            base_speed_ms: default_base_speed(),
            min_speed_ms: default_min_speed(),
            speed_step_ms: default_speed_step(),
            item_drop_chance: default_drop_chance(),
        }
    }
}

impl Default for TomlGenerator {
    fn default() -> Self {
        TomlGenerator {
            ensure_reachable: false,
            reachability_attempts: default_reach_attempts(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            bomb: default_bomb_btns(),
            pause: default_pause_btns(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

/// `nan` and `inf` parse as TOML floats; treat them as unset.
fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        log::warn!("config: non-finite value {v}, using {fallback}");
        fallback
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from(TomlConfig::default())
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            timing: TimingConfig {
                // A zero period would spin the scheduler.
                tick_ms: t.timing.tick_ms.max(1),
                countdown_ms: t.timing.countdown_ms.max(1),
                max_catchup_ticks: t.timing.max_catchup_ticks.max(1),
            },
            rules: RulesConfig {
                level_time_secs: t.rules.level_time_secs,
                bomb_fuse_ms: t.rules.bomb_fuse_ms,
                explosion_ms: t.rules.explosion_ms,
                max_bombs: t.rules.max_bombs,
                base_range: t.rules.base_range,
                base_speed_ms: t.rules.base_speed_ms,
                min_speed_ms: t.rules.min_speed_ms,
                speed_step_ms: t.rules.speed_step_ms,
                item_drop_chance: finite_or(t.rules.item_drop_chance, default_drop_chance()).clamp(0.0, 1.0),
            },
            generator: GeneratorConfig {
                ensure_reachable: t.generator.ensure_reachable,
                reachability_attempts: t.generator.reachability_attempts.max(1),
            },
            gamepad: GamepadConfig {
                bomb: t.gamepad.bomb,
                pause: t.gamepad.pause,
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
            },
        }
    }
}

impl GameConfig {
    /// Load config from `config.toml`. See module docs for the search order.
    pub fn load() -> Self {
        GameConfig::from(load_toml(&candidate_dirs()))
    }

    /// Parse a config document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from)
    }
}

/// Candidate directories to search: exe dir + CWD + data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/gridblast)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/gridblast");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First `config.toml` found wins. Parse errors fall back to defaults.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => return parse_or_default(&text, &path),
            Err(e) => log::warn!("could not read {}: {e}", path.display()),
        }
    }
    log::debug!("no config.toml found, using defaults");
    TomlConfig::default()
}

fn parse_or_default(text: &str, path: &Path) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => {
            log::info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            log::warn!("{} parse error: {e}; using default settings", path.display());
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_rules() {
        let c = GameConfig::default();
        assert_eq!(c.timing.tick_ms, 50);
        assert_eq!(c.timing.countdown_ms, 1000);
        assert_eq!(c.rules.level_time_secs, 180);
        assert_eq!(c.rules.bomb_fuse_ms, 2500);
        assert_eq!(c.rules.explosion_ms, 600);
        assert_eq!(c.rules.max_bombs, 3);
        assert_eq!(c.rules.base_range, 1);
        assert_eq!(c.rules.base_speed_ms, 300);
        assert_eq!(c.rules.min_speed_ms, 100);
        assert_eq!(c.rules.speed_step_ms, 30);
        assert!(!c.generator.ensure_reachable);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let c = GameConfig::from_toml_str(
            "[rules]\nmax_bombs = 5\n\n[generator]\nensure_reachable = true\n",
        ).unwrap();
        assert_eq!(c.rules.max_bombs, 5);
        assert_eq!(c.rules.bomb_fuse_ms, 2500);
        assert!(c.generator.ensure_reachable);
        assert_eq!(c.timing.tick_ms, 50);
        assert_eq!(c.gamepad.pause, vec!["Start".to_string()]);
    }

    #[test]
    fn bad_document_is_an_error() {
        assert!(GameConfig::from_toml_str("[rules]\nmax_bombs = \"many\"").is_err());
    }

    #[test]
    fn parse_error_falls_back() {
        let cfg = parse_or_default("not = [toml", Path::new("config.toml"));
        assert_eq!(cfg.rules.max_bombs, 3);
    }

    #[test]
    fn degenerate_values_are_clamped() {
        let c = GameConfig::from_toml_str(
            "[timing]\ntick_ms = 0\n[rules]\nitem_drop_chance = 4.0\n",
        ).unwrap();
        assert_eq!(c.timing.tick_ms, 1);
        assert_eq!(c.rules.item_drop_chance, 1.0);

        let c = GameConfig::from_toml_str("[rules]\nitem_drop_chance = nan\n").unwrap();
        assert_eq!(c.rules.item_drop_chance, default_drop_chance());
        let c = GameConfig::from_toml_str("[rules]\nitem_drop_chance = -inf\n").unwrap();
        assert_eq!(c.rules.item_drop_chance, default_drop_chance());
    }
}
