/// Entry point and game loop.
///
/// Per frame:
///   1. Drain keyboard and gamepad input
///   2. Menu: start or quit
///   3. Game: `engine.advance(now)` first, then this frame's commands
///   4. Forward engine events to the sound engine
///   5. Render the published snapshot

mod ui;

use std::error::Error;
use std::time::Duration;

use env_logger::Env;
use rand::rngs::StdRng;
use rand::SeedableRng;

use gridblast::config::GameConfig;
use gridblast::sim::command::Command;
use gridblast::sim::engine::{Clock, Engine};
use gridblast::sim::world::Status;
use ui::gamepad::GamepadState;
use ui::input::{Action, Context, InputState};
use ui::renderer::{Renderer, View};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

enum Mode {
    Menu,
    Game(Engine<StdRng>),
}

fn main() {
    // Raw mode owns the terminal, so logs go to stderr only when asked for.
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = GameConfig::load();

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(score) => {
            println!();
            println!("Thanks for playing GridBlast!");
            if let Some(score) = score {
                println!("Final Score: {score}");
            }
        }
        Err(e) => eprintln!("Game error: {e}"),
    }
}

/// Runs until the player quits. Returns the last score seen, if any game
/// was played.
fn game_loop(
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<Option<u32>, Box<dyn Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let clock = Clock::new();
    let mut mode = Mode::Menu;
    let mut last_score: Option<u32> = None;
    let mut frame: u64 = 0;

    loop {
        kb.drain_events();
        gp.update();
        let now = clock.now();

        let ctx = match mode {
            Mode::Menu => Context::Menu,
            Mode::Game(_) => Context::Game,
        };
        let mut actions = kb.actions(ctx);
        actions.extend(gp.actions(ctx));
        if actions.contains(&Action::Quit) {
            break;
        }

        let mut next_mode = None;
        match &mut mode {
            Mode::Menu => {
                if actions.contains(&Action::Start) {
                    let rng = StdRng::from_entropy();
                    log::info!("new game");
                    next_mode = Some(Mode::Game(Engine::new(config, rng, now)));
                }
            }
            Mode::Game(engine) => {
                engine.advance(now);

                // Held direction keeps asking; the engine throttles by speed.
                let held = kb.held_direction().or_else(|| gp.held_direction());
                let mut commands: Vec<Command> = held.map(Command::Move).into_iter().collect();
                let mut to_menu = false;
                for action in &actions {
                    match action {
                        // Fresh presses already covered by `held`.
                        Action::Move(dir) if held != Some(*dir) => commands.push(Command::Move(*dir)),
                        Action::Move(_) => {}
                        Action::Bomb => commands.push(Command::PlaceBomb),
                        Action::Pause => commands.push(Command::TogglePause),
                        Action::Restart => commands.push(Command::Restart),
                        Action::NextLevel if engine.state().status() == Status::Won => {
                            commands.push(Command::NextLevel)
                        }
                        Action::NextLevel => {}
                        Action::ToMenu => to_menu = true,
                        Action::Start | Action::Quit => {}
                    }
                }
                for cmd in commands {
                    engine.handle(cmd, now);
                }

                if let Some(sound) = sound {
                    for event in engine.drain_events() {
                        sound.play(&event);
                    }
                } else {
                    engine.drain_events();
                }

                last_score = Some(engine.state().score);
                if to_menu {
                    next_mode = Some(Mode::Menu);
                }
            }
        }
        if let Some(m) = next_mode {
            mode = m;
        }

        match &mode {
            Mode::Menu => renderer.render(&View::Menu { last_score })?,
            Mode::Game(engine) => {
                let snapshot = engine.snapshot();
                renderer.render(&View::Game { state: snapshot.as_ref(), now, frame })?;
            }
        }

        frame = frame.wrapping_add(1);
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(last_score)
}
