mod entities;
mod game;
mod player;

use std::time::Duration;

use anyhow::Result;
use arcade2d::{CoreConfig, GameLoop, KeyId, RecordingSurface, TemplateLibrary};
use game::ShooterGame;

const RUN_SECONDS: u64 = 20;

/// Key held over `[from_ms, to_ms)` of game time.
struct ScriptedKey {
    key: KeyId,
    from_ms: u64,
    to_ms: u64,
}

fn script() -> Vec<ScriptedKey> {
    let hold = |key, from_ms, to_ms| ScriptedKey { key, from_ms, to_ms };
    vec![
        hold(KeyId(90), 500, 18_000),
        hold(KeyId(37), 2_000, 3_500),
        hold(KeyId(39), 5_000, 8_000),
        hold(KeyId(38), 9_000, 9_600),
        hold(KeyId(88), 10_000, 14_000),
        hold(KeyId(37), 12_000, 13_500),
        hold(KeyId(68), 15_000, 15_100),
    ]
}

fn main() -> Result<()> {
    env_logger::init();

    let config = CoreConfig::from_json(include_str!("../assets/config.json"))?;
    let library = TemplateLibrary::from_json(include_str!("../assets/kinds.json"))?;
    let mut game_loop = GameLoop::from_config(&config)?;
    let mut game = ShooterGame::new(&config, &library, game_loop.clock(), false)?;
    let mut surface = RecordingSurface::new();
    let script = script();

    let mut draw_commands = 0;
    let mut frames = 0u64;
    while game_loop.clock().now_ms() < RUN_SECONDS * 1000 {
        let now = game_loop.clock().now_ms();
        let input = game.input_mut();
        for scripted in &script {
            let held = (scripted.from_ms..scripted.to_ms).contains(&now);
            if held && !input.is_key_down(scripted.key) {
                input.press(scripted.key, now);
            } else if !held && input.is_key_down(scripted.key) {
                input.release(scripted.key);
            }
        }

        // a display that mostly keeps up, with the odd long frame
        let elapsed_ms = if fastrand::u8(..) < 4 { 70 } else { fastrand::u64(14..=19) };
        let ticks = game_loop.advance(&mut game, &mut surface, Duration::from_millis(elapsed_ms))?;
        if ticks > 0 {
            game.input_mut().begin_frame();
        }

        draw_commands += surface.len();
        surface.clear();
        frames += 1;
    }

    let stats = game.stats();
    log::info!(
        "done after {} frames / {} ticks: {} drones, {} kills, {} shots fired, {} dropped ticks",
        frames,
        game_loop.clock().frames(),
        stats.drones_spawned,
        stats.kills,
        game.player().shots_fired(),
        game_loop.dropped_ticks()
    );
    log::info!(
        "left on screen: {} drones, {} player shots",
        game.enemies().active_count(),
        game.player_shots().active_count()
    );
    log::info!(
        "{} sounds played ({} explosions), {} draw commands",
        game.sounds().played.len(),
        game.sounds().count("ENEMY_EXPLOSION"),
        draw_commands
    );
    Ok(())
}
