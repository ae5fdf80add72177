use arcade2d::surface::GREEN;
use arcade2d::{
    GameClock, GameObject, Inert, InputSnapshot, KeyId, MassSpring, ObjectGrid, ObjectKind, ScratchPool,
    SimpleBody, Surface, Vec2,
};

use crate::entities::{GameEvent, Kinds, Shot};

const MOVE_FORCE: f32 = 3500.0;
const SHOT_DELAY_MS: u64 = 100;
const HOMING_DELAY_MS: u64 = 400;
const OPTION_OFFSETS: [(f32, f32); 2] = [(-16.0, 8.0), (16.0, 8.0)];

/// Key bindings, using the browser key codes the level scripts were written with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerKeys {
    pub left: KeyId,
    pub right: KeyId,
    pub up: KeyId,
    pub down: KeyId,
    pub shot: KeyId,
    pub homing: KeyId,
}

impl Default for PlayerKeys {
    fn default() -> Self {
        Self {
            left: KeyId(37),
            right: KeyId(39),
            up: KeyId(38),
            down: KeyId(40),
            shot: KeyId(90),
            homing: KeyId(88),
        }
    }
}

pub struct PlayerKind;

impl ObjectKind for PlayerKind {
    type Context<'a> = ();
    type Event = GameEvent;

    fn type_name(&self) -> &'static str {
        "player"
    }

    fn on_collide(
        &mut self,
        _obj: &mut GameObject,
        _other: &mut GameObject,
        _clock: &GameClock,
        events: &mut Vec<GameEvent>,
    ) {
        events.push(GameEvent::Sound("PLAYER_HIT"));
    }
}

/// Satellite that trails the player on a spring.
struct PlayerOption {
    offset: Vec2,
    spring: MassSpring,
    object: GameObject,
}

impl PlayerOption {
    fn new(kinds: &Kinds, owner_pos: Vec2, offset: Vec2) -> Self {
        let mut spring = MassSpring::new(0.5, 5.0, 100.0);
        spring.pos = owner_pos + offset;
        spring.target = spring.pos;
        let mut object = GameObject::new();
        object.instantiate("option", &kinds.option, spring.pos.x, spring.pos.y);
        Self { offset, spring, object }
    }

    fn update(&mut self, owner_pos: Vec2, dt: f32) {
        self.spring.target = owner_pos + self.offset;
        self.spring.step(dt);
        self.object.move_to_xy(self.spring.pos.x, self.spring.pos.y);
    }
}

/// Everything the player reaches into during its update.
pub struct PlayerScope<'a> {
    pub input: &'a InputSnapshot,
    pub scratch: &'a mut ScratchPool<Vec2>,
    pub enemy_shots: &'a mut ObjectGrid<Shot>,
    pub player_shots: &'a mut ObjectGrid<Shot>,
    pub kinds: &'a Kinds,
    pub events: &'a mut Vec<GameEvent>,
}

pub struct Player {
    pub object: GameObject,
    pub keys: PlayerKeys,
    kind: PlayerKind,
    body: SimpleBody,
    options: Vec<PlayerOption>,
    next_shot_ms: u64,
    next_homing_ms: u64,
    shots_fired: u64,
}

impl Player {
    pub fn new(kinds: &Kinds, x: f32, y: f32, clock: &GameClock) -> Self {
        let mut object = GameObject::new();
        object.instantiate("player", &kinds.player, x, y);
        object.activate(clock);

        let mut body = SimpleBody::new(0.75, 300.0);
        body.pos = Vec2::new(x, y);

        let options = OPTION_OFFSETS
            .iter()
            .map(|&(ox, oy)| PlayerOption::new(kinds, body.pos, Vec2::new(ox, oy)))
            .collect();

        Self {
            object,
            keys: PlayerKeys::default(),
            kind: PlayerKind,
            body,
            options,
            next_shot_ms: 0,
            next_homing_ms: 0,
            shots_fired: 0,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn shots_fired(&self) -> u64 {
        self.shots_fired
    }

    pub fn update(&mut self, clock: &GameClock, scope: &mut PlayerScope<'_>) {
        let bounds = self.object.bounds;
        scope.enemy_shots.test_collisions(&bounds);
        scope
            .enemy_shots
            .perform_collision_response(&mut self.object, &mut self.kind, clock, scope.events);
        if self.object.health <= 0.0 {
            return;
        }

        let input = scope.input;
        let keys = self.keys;
        let force = scope.scratch.scope(|scratch| {
            let Some(dir) = scratch.get() else {
                return Vec2::ZERO;
            };
            let dir = &mut scratch[dir];
            dir.set(input.axis(keys.left, keys.right), input.axis(keys.up, keys.down));
            if dir.length_squared() > 0.0 {
                dir.normalize();
            }
            *dir * MOVE_FORCE
        });
        self.body.add_force(force);
        self.body.step(clock.frame_s());
        self.object.move_to_xy(self.body.pos.x, self.body.pos.y);

        for option in &mut self.options {
            option.update(self.body.pos, clock.frame_s());
        }

        let now = clock.now_ms();
        if input.is_key_down(keys.shot) && now >= self.next_shot_ms {
            self.fire_vulcans(clock, scope);
            self.next_shot_ms = now + SHOT_DELAY_MS;
        }
        if input.is_key_down(keys.homing) && now >= self.next_homing_ms {
            self.fire_homing(clock, scope);
            self.next_homing_ms = now + HOMING_DELAY_MS;
        }
    }

    /// One shot straight up from the ship and one from each option.
    fn fire_vulcans(&mut self, clock: &GameClock, scope: &mut PlayerScope<'_>) {
        let up = 270.0_f32.to_radians();
        let muzzles = std::iter::once(self.body.pos).chain(self.options.iter().map(|o| o.spring.pos));
        for muzzle in muzzles {
            let fired = scope
                .player_shots
                .spawn_with(Shot::Vulcan, &scope.kinds.vulcan, muzzle.x, muzzle.y, clock, |shot| {
                    shot.aim(up)
                });
            if fired.is_some() {
                self.shots_fired += 1;
            }
        }
    }

    /// Homing shots launched sideways from the options.
    fn fire_homing(&mut self, clock: &GameClock, scope: &mut PlayerScope<'_>) {
        for option in &self.options {
            let angle = if option.offset.x < 0.0 { 225.0_f32 } else { 315.0 }.to_radians();
            let fired = scope.player_shots.spawn_with(
                Shot::Homing,
                &scope.kinds.homing,
                option.spring.pos.x,
                option.spring.pos.y,
                clock,
                |shot| shot.aim(angle),
            );
            if fired.is_some() {
                self.shots_fired += 1;
            }
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        for option in &self.options {
            option.object.draw(&Inert, surface, xofs, yofs);
        }
        self.object.draw(&self.kind, surface, xofs, yofs);
    }

    pub fn draw_debug(&self, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        for option in &self.options {
            option.object.bounds.draw_debug(surface, xofs, yofs, GREEN);
        }
        self.object.bounds.draw_debug(surface, xofs, yofs, GREEN);
    }
}
