use std::f32::consts::{PI, TAU};

use arcade2d::surface::WHITE;
use arcade2d::{
    CoreError, GameClock, GameObject, ObjectGrid, ObjectKind, ObjectManager, ObjectTemplate, Surface,
    TemplateLibrary,
};

/// Drones drift down the screen at this speed (px/s).
const DRONE_SPEED: f32 = 50.0;
/// Homing shots turn at most this fast (rad/s).
const HOMING_TURN_RATE: f32 = PI;

/// Side effects collisions hand back to the game.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    Explosion { x: f32, y: f32 },
    Sound(&'static str),
}

/// Every spawn template the game uses, resolved once at startup.
#[derive(Clone, Debug)]
pub struct Kinds {
    pub vulcan: ObjectTemplate,
    pub ball: ObjectTemplate,
    pub homing: ObjectTemplate,
    pub drone: ObjectTemplate,
    pub explosion: ObjectTemplate,
    pub player: ObjectTemplate,
    pub option: ObjectTemplate,
}

impl Kinds {
    pub fn from_library(library: &TemplateLibrary) -> Result<Self, CoreError> {
        Ok(Self {
            vulcan: library.get("vulcan")?.clone(),
            ball: library.get("ball")?.clone(),
            homing: library.get("homing")?.clone(),
            drone: library.get("drone")?.clone(),
            explosion: library.get("explosion")?.clone(),
            player: library.get("player")?.clone(),
            option: library.get("option")?.clone(),
        })
    }
}

/// What shots may look at while updating.
pub struct ShotScope<'a> {
    pub enemies: &'a ObjectManager<Enemy>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shot {
    Vulcan,
    /// Enemy bullet; vanishes with the enemy that fired it.
    Ball,
    /// Steers toward the nearest enemy.
    Homing,
}

impl ObjectKind for Shot {
    type Context<'a> = ShotScope<'a>;
    type Event = GameEvent;

    fn type_name(&self) -> &'static str {
        match self {
            Shot::Vulcan => "vulcan",
            Shot::Ball => "ball",
            Shot::Homing => "homing",
        }
    }

    fn on_update(&mut self, obj: &mut GameObject, clock: &GameClock, ctx: &mut ShotScope<'_>) {
        if *self == Shot::Homing {
            steer_towards_nearest(obj, clock, ctx.enemies);
        }

        let step = obj.vel * clock.frame_s();
        obj.offset_xy(step.x, step.y);

        if *self == Shot::Ball {
            if let Some(owner) = obj.owner {
                if !ctx.enemies.is_alive(owner) {
                    obj.deactivate(clock);
                }
            }
        }
    }

    fn on_draw(&self, obj: &GameObject, surface: &mut dyn Surface, xofs: f32, yofs: f32) -> bool {
        match self {
            Shot::Ball => {
                surface.draw_point(obj.pos.x + xofs, obj.pos.y + yofs, WHITE);
                true
            }
            Shot::Homing if obj.sprite.is_none() => {
                surface.stroke_circle(obj.pos + arcade2d::Vec2::new(xofs, yofs), 2.0, WHITE);
                true
            }
            _ => false,
        }
    }

    fn on_collide(
        &mut self,
        obj: &mut GameObject,
        other: &mut GameObject,
        clock: &GameClock,
        _events: &mut Vec<GameEvent>,
    ) {
        if *self != Shot::Ball {
            other.take_damage(obj.damage);
        }
        obj.deactivate(clock);
    }
}

/// Re-pick the nearest enemy every `next_action_delay_ms` and turn toward
/// it, limited to [`HOMING_TURN_RATE`].
fn steer_towards_nearest(obj: &mut GameObject, clock: &GameClock, enemies: &ObjectManager<Enemy>) {
    let now = clock.now_ms();
    if now >= obj.next_action_ms {
        obj.target = enemies.nearest_object(obj.pos);
        obj.next_action_ms = now + obj.next_action_delay_ms;
    }

    let Some(target) = obj.target.and_then(|h| enemies.get(h)).filter(|t| t.is_active()) else {
        return;
    };
    let desired = (target.pos - obj.pos).angle();
    let turn = (desired - obj.angle + PI).rem_euclid(TAU) - PI;
    let max_turn = HOMING_TURN_RATE * clock.frame_s();
    obj.aim(obj.angle + turn.clamp(-max_turn, max_turn));
}

/// What enemies may touch while updating.
pub struct EnemyScope<'a> {
    pub player_shots: &'a mut ObjectGrid<Shot>,
    pub enemy_shots: &'a mut ObjectGrid<Shot>,
    pub ball: &'a ObjectTemplate,
    pub screen_height: f32,
    pub events: &'a mut Vec<GameEvent>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Enemy {
    Drone,
}

impl ObjectKind for Enemy {
    type Context<'a> = EnemyScope<'a>;
    type Event = GameEvent;

    fn type_name(&self) -> &'static str {
        match self {
            Enemy::Drone => "drone",
        }
    }

    fn on_update(&mut self, obj: &mut GameObject, clock: &GameClock, ctx: &mut EnemyScope<'_>) {
        let bounds = obj.bounds;
        ctx.player_shots.test_collisions(&bounds);
        ctx.player_shots
            .perform_collision_response(obj, self, clock, ctx.events);
        if !obj.is_active() {
            return;
        }

        obj.offset_xy(0.0, DRONE_SPEED * clock.frame_s());
        let height = obj.sprite.map_or(0.0, |s| s.frame_height);
        if obj.pos.y > ctx.screen_height + height {
            obj.deactivate(clock);
            return;
        }

        let now = clock.now_ms();
        if now >= obj.next_action_ms {
            let owner = obj.handle();
            let angle = obj.angle;
            ctx.enemy_shots
                .spawn_with(Shot::Ball, ctx.ball, obj.pos.x, obj.pos.y, clock, |shot| {
                    shot.owner = owner;
                    shot.aim(angle);
                });
            obj.next_action_ms = now + obj.next_action_delay_ms;
        }
    }

    fn on_collide(
        &mut self,
        obj: &mut GameObject,
        _other: &mut GameObject,
        clock: &GameClock,
        events: &mut Vec<GameEvent>,
    ) {
        // The shot has already applied its damage. Later hits in the same
        // tick still reach this hook, so only the first one with the drone
        // active and out of health counts as the kill.
        if obj.is_active() && obj.health <= 0.0 {
            events.push(GameEvent::Explosion {
                x: obj.pos.x,
                y: obj.pos.y,
            });
            obj.deactivate(clock);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Explosion,
}

impl ObjectKind for Effect {
    type Context<'a> = ();
    type Event = GameEvent;

    fn type_name(&self) -> &'static str {
        match self {
            Effect::Explosion => "explosion",
        }
    }

    /// Two ticks per frame, gone after the last one.
    fn on_update(&mut self, obj: &mut GameObject, clock: &GameClock, _ctx: &mut ()) {
        let frame = (clock.now_ms() - obj.activate_ms) / (clock.frame_ms() * 2);
        if frame > 4 {
            obj.deactivate(clock);
        } else {
            obj.anim.current_frame = frame as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade2d::{GridSettings, PoolId};

    fn kinds() -> Kinds {
        let library = TemplateLibrary::from_json(include_str!("../assets/kinds.json")).unwrap();
        Kinds::from_library(&library).unwrap()
    }

    fn shot_grid(id: u16) -> ObjectGrid<Shot> {
        let pool = ObjectManager::new(PoolId(id), "shots", 32).unwrap();
        let settings = GridSettings::for_screen(384.0, 512.0, 32.0).with_max_refs_per_bin(32);
        ObjectGrid::new(pool, &settings).unwrap()
    }

    #[test]
    fn drone_takes_damage_and_explodes_once() {
        let clock = GameClock::new(60).unwrap();
        let kinds = kinds();
        let mut enemies = ObjectManager::new(PoolId(0), "enemies", 4).unwrap();
        let mut player_shots = shot_grid(1);
        let mut enemy_shots = shot_grid(2);
        let drone = enemies.spawn(Enemy::Drone, &kinds.drone, 100.0, 100.0, &clock).unwrap();

        // 20 health, 1 damage per vulcan, with a few to spare
        for _ in 0..25 {
            player_shots.spawn(Shot::Vulcan, &kinds.vulcan, 100.0, 100.0, &clock);
        }
        player_shots.update(&clock, &mut ShotScope { enemies: &enemies });

        let mut events = Vec::new();
        enemies.update(
            &clock,
            &mut EnemyScope {
                player_shots: &mut player_shots,
                enemy_shots: &mut enemy_shots,
                ball: &kinds.ball,
                screen_height: 512.0,
                events: &mut events,
            },
        );

        assert!(!enemies.is_alive(drone));
        assert_eq!(events, vec![GameEvent::Explosion { x: 100.0, y: 100.0 }]);
        assert_eq!(player_shots.active_count(), 0);
        assert_eq!(enemy_shots.active_count(), 0, "dead drones do not shoot");
    }

    #[test]
    fn ball_dies_with_its_owner() {
        let mut clock = GameClock::new(60).unwrap();
        let kinds = kinds();
        let mut enemies = ObjectManager::new(PoolId(0), "enemies", 4).unwrap();
        let mut player_shots = shot_grid(1);
        let mut enemy_shots = shot_grid(2);
        let drone = enemies.spawn(Enemy::Drone, &kinds.drone, 100.0, 100.0, &clock).unwrap();

        let mut events = Vec::new();
        enemies.update(
            &clock,
            &mut EnemyScope {
                player_shots: &mut player_shots,
                enemy_shots: &mut enemy_shots,
                ball: &kinds.ball,
                screen_height: 512.0,
                events: &mut events,
            },
        );
        assert_eq!(enemy_shots.active_count(), 1);
        let ball = enemy_shots.pool().iter_active().next().map(|(h, _)| h).unwrap();
        assert_eq!(enemy_shots.get(ball).unwrap().owner, Some(drone));

        enemies.get_mut(drone).unwrap().deactivate(&clock);
        clock.advance();
        enemy_shots.update(&clock, &mut ShotScope { enemies: &enemies });
        assert!(!enemy_shots.is_alive(ball));
    }

    #[test]
    fn explosion_plays_out_then_ends() {
        let mut clock = GameClock::new(60).unwrap();
        let kinds = kinds();
        let mut effects = ObjectManager::new(PoolId(0), "effects", 2).unwrap();
        let boom = effects.spawn(Effect::Explosion, &kinds.explosion, 0.0, 0.0, &clock).unwrap();

        let mut frames = Vec::new();
        while effects.is_alive(boom) {
            clock.advance();
            effects.update(&clock, &mut ());
            frames.push(effects.get(boom).unwrap().anim.current_frame);
        }
        assert_eq!(&frames[..4], &[0, 1, 1, 2]);
        assert!(frames.len() >= 9);
    }

    #[test]
    fn homing_shot_turns_toward_an_enemy() {
        let mut clock = GameClock::new(60).unwrap();
        let kinds = kinds();
        let mut enemies = ObjectManager::new(PoolId(0), "enemies", 4).unwrap();
        enemies.spawn(Enemy::Drone, &kinds.drone, 200.0, 100.0, &clock);
        let mut shots = shot_grid(1);
        let homing = shots
            .spawn_with(Shot::Homing, &kinds.homing, 100.0, 100.0, &clock, |s| s.aim(-PI * 0.5))
            .unwrap();

        for _ in 0..30 {
            clock.advance();
            shots.update(&clock, &mut ShotScope { enemies: &enemies });
        }
        let shot = shots.get(homing).unwrap();
        assert!(shot.target.is_some());
        assert!(shot.angle > -1.0, "still heading {}", shot.angle);
    }
}
