/// Entry point and frame loop.
///
/// One pass per display frame: drain input, feed the simulation,
/// render. Input is processed before animation advancement, which is
/// before rendering; the simulation's animation gate is the only
/// concurrency control there is.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use sim::event::GameEvent;
use sim::game::{Game, Screen, MENU_COLS};
use sim::level::{self, parse_levels};
use sim::save;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME: Duration = Duration::from_millis(16); // ~60 Hz

fn main() {
    let config = GameConfig::load();

    // Level source: a file next to the binary when present, the
    // embedded set otherwise. A wrong puzzle count is fatal — there is
    // no meaningful game with the wrong puzzles.
    let source = std::fs::read_to_string(&config.levels_file)
        .unwrap_or_else(|_| level::EMBEDDED_LEVELS.to_string());
    let levels = match parse_levels(&source, config.expected_levels) {
        Ok(levels) if !levels.is_empty() => levels,
        Ok(_) => {
            eprintln!("Level data error: the level set is empty");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Level data error: {e}");
            std::process::exit(1);
        }
    };

    let save_data = save::load(levels.len());
    let mut game = Game::new(levels, save_data, config.anim.clone());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    if let Some(sfx) = &sound {
        sfx.set_music(game.save.music);
    }

    let result = game_loop(&mut game, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = save::store(&game.save) {
        eprintln!("Warning: could not write save data: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }
}

fn game_loop(
    game: &mut Game,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last = Instant::now();

    loop {
        kb.drain_events();
        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_keys(game, &kb, sound) {
            break;
        }

        let dt = last.elapsed().as_secs_f32();
        last = Instant::now();

        let events = game.update(dt);
        process_sound_events(sound, &events);

        renderer.render(game)?;
        std::thread::sleep(FRAME);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::PlayerMoved => sfx.play_step(),
            GameEvent::BoxPushed { .. } => sfx.play_push(),
            GameEvent::LevelSolved { .. } => sfx.play_solve(),
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_MUSIC: &[KeyCode] = &[KeyCode::Char('m'), KeyCode::Char('M')];
const KEYS_FULLSCREEN: &[KeyCode] = &[KeyCode::Char('f'), KeyCode::Char('F')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

/// Handle this frame's key presses. Returns true to quit.
fn handle_keys(game: &mut Game, kb: &InputState, sound: Option<&SoundEngine>) -> bool {
    let esc = kb.any_pressed(&[KeyCode::Esc]);

    // Global preference toggles, persisted with the solved flags
    if kb.any_pressed(KEYS_MUSIC) {
        game.save.music = !game.save.music;
        if let Some(sfx) = sound {
            sfx.set_music(game.save.music);
        }
    }
    if kb.any_pressed(KEYS_FULLSCREEN) {
        game.save.fullscreen = !game.save.fullscreen;
    }

    match game.screen {
        // ── Level Select ──
        Screen::Menu => {
            let total = game.levels.len();
            if kb.any_pressed(KEYS_LEFT) {
                if game.menu_cursor > 0 {
                    game.menu_cursor -= 1;
                }
            } else if kb.any_pressed(KEYS_RIGHT) {
                if game.menu_cursor + 1 < total {
                    game.menu_cursor += 1;
                }
            } else if kb.any_pressed(KEYS_UP) {
                game.menu_cursor = game.menu_cursor.saturating_sub(MENU_COLS);
            } else if kb.any_pressed(KEYS_DOWN) {
                if game.menu_cursor + MENU_COLS < total {
                    game.menu_cursor += MENU_COLS;
                }
            } else if kb.any_pressed(KEYS_CONFIRM) {
                game.enter_level(game.menu_cursor);
            } else if esc || kb.any_pressed(KEYS_QUIT) {
                return true;
            }
        }

        // ── Playing ──
        Screen::Playing => {
            if esc {
                game.back_to_menu();
                let _ = save::store(&game.save);
                return false;
            }
            if kb.any_pressed(KEYS_RESTART) {
                game.restart_level();
            }

            // A rejected move is not an error; nothing further happens.
            if kb.any_pressed(KEYS_RIGHT) {
                game.handle_move(1, 0);
            } else if kb.any_pressed(KEYS_LEFT) {
                game.handle_move(-1, 0);
            } else if kb.any_pressed(KEYS_UP) {
                game.handle_move(0, -1);
            } else if kb.any_pressed(KEYS_DOWN) {
                game.handle_move(0, 1);
            }
        }
    }

    false
}
