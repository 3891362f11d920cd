/// Entry point and game loop.
///
/// Usage: `mazerunner [LEVEL]`
///   LEVEL is a level number (`<levels_dir>/level-N.properties`, falling
///   back to the built-in levels) or a path to a level file. Default: 1.

mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, error, info};

use config::GameConfig;
use sim::event::{GameEvent, HazardKind};
use sim::level::{load_numbered, resolve_level, LevelDef};
use sim::step::{self, FrameInput};
use sim::world::Session;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const MESSAGE_SECS: f32 = 2.0;

fn main() {
    let config = GameConfig::load();
    logging::init(&config.log_file);

    let arg = std::env::args().nth(1);
    let level = match resolve_level(arg.as_deref(), &config) {
        Ok(l) => l,
        Err(e) => {
            error!("cannot load level: {e}");
            eprintln!("mazerunner: {e}");
            std::process::exit(1);
        }
    };
    let number = level.number;
    let mut session = match start_session(level, &config) {
        Ok(s) => s,
        Err(e) => {
            error!("cannot start level: {e}");
            eprintln!("mazerunner: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }
    let enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
        && execute!(io::stdout(), PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)).is_ok();

    let sound = SoundEngine::new();
    let result = game_loop(&mut session, number, &mut renderer, sound.as_ref(), &config, enhanced);

    if enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Maze Runner!");
    if session.is_winner() {
        println!("Escaped in {:.0}s. Final Score: {}", session.elapsed, session.score);
    } else {
        println!("Final Score: {}", session.score);
    }
}

fn start_session(level: LevelDef, config: &GameConfig) -> error::Result<Session> {
    let rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    info!("loading {} ({} tiles)", level.name, level.grid.len());
    let mut session = Session::new(level.grid, config, rng)?;
    session.level_name = level.name;
    Ok(session)
}

// ── Key Constants ──

const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_SPRINT: &[KeyCode] = &[KeyCode::Tab];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P'), KeyCode::F(1)];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_NEXT: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char('n'), KeyCode::Char('N')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];

fn game_loop(
    session: &mut Session,
    mut number: Option<u32>,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    enhanced: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad connected");
    }

    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms.max(1));
    let dt = tick_rate.as_secs_f32();
    let mut last_tick = Instant::now();
    let mut sprint = false;
    let mut pending_jump = false;

    renderer.snap_camera(session);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }

        // ── Meta keys ──
        if kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed() {
            if !session.is_over() {
                session.paused = !session.paused;
                info!("paused: {}", session.paused);
            }
        }
        if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
            session.restart()?;
            pending_jump = false;
            renderer.snap_camera(session);
            session.set_message("Level restarted", MESSAGE_SECS);
        }
        if session.is_winner() && (kb.any_pressed(KEYS_NEXT) || gp.jump_pressed()) {
            if let Some(next) = number.map(|n| n + 1) {
                match load_numbered(next, config) {
                    Ok(level) => {
                        *session = start_session(level, config)?;
                        number = Some(next);
                        renderer.snap_camera(session);
                    }
                    Err(e) => info!("no level after {}: {e}", next - 1),
                }
            }
        }
        if kb.any_pressed(KEYS_SPRINT) || gp.sprint_pressed() {
            sprint = !sprint;
            session.set_message(if sprint { "Sprint on" } else { "Sprint off" }, MESSAGE_SECS);
        }
        if !session.paused && !session.is_over() && (kb.any_pressed(KEYS_JUMP) || gp.jump_pressed()) {
            pending_jump = true;
        }

        // ── Simulation ──
        if last_tick.elapsed() >= tick_rate {
            let input = FrameInput {
                direction: kb.held_direction().or_else(|| gp.direction()),
                jump: std::mem::take(&mut pending_jump),
                sprint,
            };
            let events = step::tick(session, input, dt);
            if let Some(sfx) = sound {
                sfx.play_events(&events);
            }
            announce(session, &events);
            last_tick = Instant::now();
        }

        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Message bar text for this tick's events.
fn announce(session: &mut Session, events: &[GameEvent]) {
    for event in events {
        debug!(?event, tick = session.tick, "game event");
        let msg = match event {
            GameEvent::KeyCollected => "Got the key! Find a door",
            GameEvent::HeartCollected { .. } => "Extra life!",
            GameEvent::LifeLost { cause: HazardKind::Obstacle } => "Ouch! A trap",
            GameEvent::LifeLost { cause: HazardKind::Enemy } => "Caught by an enemy!",
            GameEvent::ExitOpened { .. } => "The door swings open",
            GameEvent::ExitBlocked => "Locked. You need the key",
            GameEvent::JumpStarted | GameEvent::Landed | GameEvent::Won { .. } | GameEvent::Lost => continue,
        };
        session.set_message(msg, MESSAGE_SECS);
    }
}
