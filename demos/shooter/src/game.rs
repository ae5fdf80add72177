use anyhow::Result;
use arcade2d::{
    Alignment, Camera2D, CoreConfig, DrawResolver, DrawTarget, GameClock, GridSettings, InputSnapshot, KeyId,
    ObjectGrid, ObjectKind, ObjectManager, PoolId, PoolRegistry, RenderList, ScratchPool, Simulation, SoundLog,
    SoundSink, Sprite, Surface, TemplateLibrary, TextureHandle, Vec2,
};

use crate::entities::{Effect, Enemy, EnemyScope, GameEvent, Kinds, Shot, ShotScope};
use crate::player::{Player, PlayerScope};

pub const SCREEN_WIDTH: f32 = 384.0;
pub const SCREEN_HEIGHT: f32 = 512.0;

const BIN_SIZE: f32 = 32.0;
const ENEMY_SPAWN_DELAY_MS: u64 = 1000;
const DEBUG_KEY: KeyId = KeyId(68);

// Custom render-list targets.
const PLAYER: u32 = 0;
const BACKGROUND: u32 = 1;

#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub drones_spawned: u32,
    pub kills: u32,
}

pub struct ShooterGame {
    kinds: Kinds,

    effects: ObjectManager<Effect>,
    enemies: ObjectManager<Enemy>,
    player_shots: ObjectGrid<Shot>,
    enemy_shots: ObjectGrid<Shot>,
    player: Player,
    background: Sprite,

    render_list: RenderList,
    scratch: ScratchPool<Vec2>,
    input: InputSnapshot,
    sounds: SoundLog,
    events: Vec<GameEvent>,

    rng: fastrand::Rng,
    next_enemy_ms: u64,
    camera: Camera2D,
    debug: bool,
    stats: Stats,
}

impl ShooterGame {
    pub fn new(config: &CoreConfig, library: &TemplateLibrary, clock: &GameClock, debug: bool) -> Result<Self> {
        let kinds = Kinds::from_library(library)?;
        let mut registry = PoolRegistry::new();

        let effects = pool(&mut registry, "effects", 128, config)?;
        let enemies = pool(&mut registry, "enemies", 32, config)?;
        let player_shots = shot_grid(&mut registry, "player shots", 1024, config, debug)?;
        let enemy_shots = shot_grid(&mut registry, "enemy shots", 2048, config, debug)?;

        let player = Player::new(&kinds, SCREEN_WIDTH * 0.5, SCREEN_HEIGHT * 0.75, clock);
        let background = Sprite::new(TextureHandle::new(0), SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, 1, 1)
            .with_alignment(Alignment::TopLeft);

        log::info!("shooter: {} templates loaded, debug {}", library.len(), debug);

        Ok(Self {
            kinds,
            effects,
            enemies,
            player_shots,
            enemy_shots,
            player,
            background,
            render_list: RenderList::with_capacity(config.render_list_capacity)?,
            scratch: ScratchPool::vectors(config.scratch_pool_size),
            input: InputSnapshot::new(),
            sounds: SoundLog::new(),
            events: Vec::new(),
            rng: fastrand::Rng::with_seed(0x5eed),
            next_enemy_ms: 0,
            camera: Camera2D::default(),
            debug,
            stats: Stats::default(),
        })
    }

    pub fn input_mut(&mut self) -> &mut InputSnapshot {
        &mut self.input
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn sounds(&self) -> &SoundLog {
        &self.sounds
    }

    pub fn enemies(&self) -> &ObjectManager<Enemy> {
        &self.enemies
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_shots(&self) -> &ObjectGrid<Shot> {
        &self.player_shots
    }

    fn spawn_enemies(&mut self, clock: &GameClock) {
        let now = clock.now_ms();
        if now < self.next_enemy_ms {
            return;
        }
        self.next_enemy_ms = now + ENEMY_SPAWN_DELAY_MS;

        let x = 32.0 + self.rng.f32() * (SCREEN_WIDTH - 64.0);
        if self.enemies.spawn(Enemy::Drone, &self.kinds.drone, x, 0.0, clock).is_some() {
            self.stats.drones_spawned += 1;
        }
    }

    fn handle_events(&mut self, clock: &GameClock) {
        for event in self.events.drain(..) {
            match event {
                GameEvent::Explosion { x, y } => {
                    self.stats.kills += 1;
                    if self
                        .effects
                        .spawn(Effect::Explosion, &self.kinds.explosion, x, y, clock)
                        .is_some()
                    {
                        self.sounds.play_sound("ENEMY_EXPLOSION");
                    }
                }
                GameEvent::Sound(name) => self.sounds.play_sound(name),
            }
        }
    }

    /// Resolver for whichever pool owns `id`.
    fn pool_resolver(&self, id: PoolId) -> Option<&dyn DrawResolver> {
        if id == self.effects.id() {
            Some(&self.effects)
        } else if id == self.enemies.id() {
            Some(&self.enemies)
        } else if id == self.player_shots.id() {
            Some(&self.player_shots)
        } else if id == self.enemy_shots.id() {
            Some(&self.enemy_shots)
        } else {
            None
        }
    }
}

fn pool<K: ObjectKind>(
    registry: &mut PoolRegistry,
    name: &str,
    capacity: usize,
    config: &CoreConfig,
) -> Result<ObjectManager<K>> {
    let id = registry.register(name)?;
    Ok(ObjectManager::new(id, name, capacity)?.with_free_delay(config.free_delay_frames))
}

/// Shot pools draw in one batch and cover the screen plus one row of bins above it.
fn shot_grid(
    registry: &mut PoolRegistry,
    name: &str,
    capacity: usize,
    config: &CoreConfig,
    debug: bool,
) -> Result<ObjectGrid<Shot>> {
    let manager = pool(registry, name, capacity, config)?.with_draw_fn(ObjectManager::draw_active_objects);
    let settings =
        GridSettings::for_screen(SCREEN_WIDTH, SCREEN_HEIGHT + BIN_SIZE, BIN_SIZE).with_origin(0.0, -BIN_SIZE);
    Ok(ObjectGrid::with_list_capacity(manager, &settings, config.candidate_list_capacity)?.with_debug_overlay(debug))
}

impl Simulation for ShooterGame {
    fn update(&mut self, clock: &GameClock) -> Result<()> {
        if self.input.is_key_pressed(DEBUG_KEY) {
            self.debug = !self.debug;
        }

        self.spawn_enemies(clock);

        self.player.update(
            clock,
            &mut PlayerScope {
                input: &self.input,
                scratch: &mut self.scratch,
                enemy_shots: &mut self.enemy_shots,
                player_shots: &mut self.player_shots,
                kinds: &self.kinds,
                events: &mut self.events,
            },
        );

        self.effects.update(clock, &mut ());
        self.player_shots.update(clock, &mut ShotScope { enemies: &self.enemies });
        self.enemy_shots.update(clock, &mut ShotScope { enemies: &self.enemies });
        self.enemies.update(
            clock,
            &mut EnemyScope {
                player_shots: &mut self.player_shots,
                enemy_shots: &mut self.enemy_shots,
                ball: &self.kinds.ball,
                screen_height: SCREEN_HEIGHT,
                events: &mut self.events,
            },
        );

        self.handle_events(clock);
        self.scratch.reset();

        if clock.frames() % u64::from(clock.framerate()) == 0 {
            log::info!(
                "t={}ms enemies={} player shots={} enemy shots={} kills={}",
                clock.now_ms(),
                self.enemies.active_count(),
                self.player_shots.active_count(),
                self.enemy_shots.active_count(),
                self.stats.kills
            );
        }
        Ok(())
    }

    fn draw(&mut self, _clock: &GameClock, surface: &mut dyn Surface) -> Result<()> {
        self.render_list.add_object(DrawTarget::Custom(BACKGROUND), -10, -10, true);
        self.render_list.add_object(DrawTarget::Custom(PLAYER), 0, 999, false);
        self.effects.add_draw_calls(&mut self.render_list);
        self.player_shots.add_draw_calls(&mut self.render_list);
        self.enemy_shots.add_draw_calls(&mut self.render_list);
        self.enemies.add_draw_calls(&mut self.render_list);
        self.render_list.sort();

        let Camera2D { position } = self.camera;
        self.render_list.draw(&*self, surface, position.x, position.y);
        if self.debug {
            self.render_list.draw_debug(&*self, surface, position.x, position.y, 0);
        }
        self.render_list.clear();
        Ok(())
    }
}

impl DrawResolver for ShooterGame {
    fn draw_target(&self, target: DrawTarget, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        match target {
            DrawTarget::Custom(PLAYER) => self.player.draw(surface, xofs, yofs),
            DrawTarget::Custom(BACKGROUND) => self.background.draw(surface, xofs, yofs, 0),
            DrawTarget::Custom(_) => {}
            DrawTarget::Object(handle) => {
                if let Some(resolver) = self.pool_resolver(handle.pool) {
                    resolver.draw_target(target, surface, xofs, yofs);
                }
            }
            DrawTarget::Pool(id) => {
                if let Some(resolver) = self.pool_resolver(id) {
                    resolver.draw_target(target, surface, xofs, yofs);
                }
            }
        }
    }

    fn draw_target_debug(&self, target: DrawTarget, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        let id = match target {
            DrawTarget::Custom(PLAYER) => {
                self.player.draw_debug(surface, xofs, yofs);
                return;
            }
            DrawTarget::Custom(_) => return,
            DrawTarget::Object(handle) => handle.pool,
            DrawTarget::Pool(id) => id,
        };
        if let Some(resolver) = self.pool_resolver(id) {
            resolver.draw_target_debug(target, surface, xofs, yofs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade2d::RecordingSurface;

    fn game(debug: bool) -> (ShooterGame, GameClock) {
        let config = CoreConfig::default();
        let library = TemplateLibrary::from_json(include_str!("../assets/kinds.json")).unwrap();
        let clock = GameClock::new(config.framerate).unwrap();
        let game = ShooterGame::new(&config, &library, &clock, debug).unwrap();
        (game, clock)
    }

    #[test]
    fn drones_arrive_once_a_second() {
        let (mut game, mut clock) = game(false);
        for _ in 0..150 {
            clock.advance();
            game.update(&clock).unwrap();
        }
        assert_eq!(game.stats().drones_spawned, 3);
        assert_eq!(game.enemies().active_count(), 3);
    }

    #[test]
    fn holding_fire_kills_a_drone_overhead() {
        let (mut game, mut clock) = game(false);
        let overhead = game.player().pos() - Vec2::new(0.0, 250.0);
        game.enemies
            .spawn(Enemy::Drone, &game.kinds.drone, overhead.x, overhead.y, &clock)
            .unwrap();
        let shot_key = game.player().keys.shot;
        game.input_mut().press(shot_key, clock.now_ms());

        for _ in 0..60 * 5 {
            clock.advance();
            game.update(&clock).unwrap();
        }
        assert!(game.player().shots_fired() > 0);
        assert!(game.stats().kills > 0, "{:?}", game.stats());
        assert_eq!(game.sounds().count("ENEMY_EXPLOSION") as u32, game.stats().kills);
    }

    #[test]
    fn draw_batches_each_shot_grid_into_one_node() {
        let (mut game, mut clock) = game(false);
        let shot_key = game.player().keys.shot;
        game.input_mut().press(shot_key, clock.now_ms());
        clock.advance();
        game.update(&clock).unwrap();
        assert_eq!(game.player_shots().active_count(), 3);

        let mut surface = RecordingSurface::new();
        game.draw(&clock, &mut surface).unwrap();
        // background, one drone, two options, player, three vulcans
        assert_eq!(surface.image_count(), 8);
        assert!(game.render_list.is_empty());
    }

    #[test]
    fn debug_mode_adds_grid_overlays() {
        let (mut game, mut clock) = game(true);
        clock.advance();
        game.update(&clock).unwrap();

        let mut plain = RecordingSurface::new();
        game.debug = false;
        game.draw(&clock, &mut plain).unwrap();

        let mut debug = RecordingSurface::new();
        game.debug = true;
        game.draw(&clock, &mut debug).unwrap();
        assert!(debug.len() > plain.len());
    }
}
