//! The pooled entity record and the behaviour trait that drives it.
//!
//! Every pooled entity is a plain [`GameObject`] holding the fields all kinds
//! share. Behaviour lives in a separate value implementing [`ObjectKind`],
//! stored next to the record in its pool slot. Spawning resets the record
//! from an [`ObjectTemplate`] and pairs it with a fresh kind value.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::clock::GameClock;
use crate::collision::CollisionBounds;
use crate::handle::ObjectHandle;
use crate::math::{clamp_scaled, Vec2};
use crate::sprite::{AnimState, Sprite};
use crate::surface::{Surface, GREEN, WHITE};
use crate::templates::ObjectTemplate;

bitflags! {
    /// Categories an object tests itself against.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CollisionFlags: u32 {
        const ENEMY_SHOTS = 1;
        const PLAYER_SHOTS = 1 << 1;
        const ENEMIES = 1 << 2;
        const PLAYERS = 1 << 3;
        const ITEMS = 1 << 4;
    }
}

/// How an object gets deactivated without its own code asking for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Culling {
    /// Only explicit `deactivate` calls.
    #[default]
    Manual,
    /// Deactivated by the owning grid when it leaves the grid extents.
    Auto,
    /// Deactivated once `timeout_ms` has passed since activation.
    Timeout,
}

pub const GENERIC_TYPE_NAME: &str = "GameObject.<type undefined>";

/// Per-kind behaviour for pooled objects.
///
/// All hooks default to doing nothing, so a kind only overrides what it needs.
pub trait ObjectKind {
    /// Whatever the update hook needs from outside its own pool
    /// (other pools to query, places to spawn into).
    type Context<'a>;
    /// Side effects a collision asks its caller to perform.
    type Event;

    /// Identity string compared by [`GameObject::is_same_type`].
    fn type_name(&self) -> &'static str;

    fn on_update(
        &mut self,
        _obj: &mut GameObject,
        _clock: &GameClock,
        _ctx: &mut Self::Context<'_>,
    ) {
    }

    /// Custom drawing. Return `true` if the object was drawn; `false` falls
    /// back to the sprite.
    fn on_draw(&self, _obj: &GameObject, _surface: &mut dyn Surface, _xofs: f32, _yofs: f32) -> bool {
        false
    }

    /// `obj` was hit by `other`.
    fn on_collide(
        &mut self,
        _obj: &mut GameObject,
        _other: &mut GameObject,
        _clock: &GameClock,
        _events: &mut Vec<Self::Event>,
    ) {
    }
}

/// Kind with no behaviour, for markers and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inert;

impl ObjectKind for Inert {
    type Context<'a> = ();
    type Event = ();

    fn type_name(&self) -> &'static str {
        "Inert"
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameObject {
    pub type_name: &'static str,
    pub sprite: Option<Sprite>,
    pub anim: AnimState,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading in radians.
    pub angle: f32,
    pub speed: f32,
    pub health: f32,

    pub state: u32,
    pub state_start_ms: u64,
    pub state_end_ms: u64,
    /// When the kind should next act (shoot, spawn, ...).
    pub next_action_ms: u64,
    pub next_action_delay_ms: u64,

    pub collision_flags: CollisionFlags,
    pub bounds: CollisionBounds,
    pub damage: f32,

    /// Relations only; may point at slots that have since been recycled.
    pub owner: Option<ObjectHandle>,
    pub target: Option<ObjectHandle>,

    pub layer: i32,
    pub priority: i32,

    pub activate_ms: u64,
    pub deactivate_ms: u64,
    pub deactivate_frame: u64,
    pub timeout_ms: u64,
    pub culling: Culling,

    active: bool,
    handle: Option<ObjectHandle>,
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new()
    }
}

impl GameObject {
    pub fn new() -> Self {
        Self {
            type_name: GENERIC_TYPE_NAME,
            sprite: None,
            anim: AnimState::default(),
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            angle: 0.0,
            speed: 0.0,
            health: 1.0,
            state: 0,
            state_start_ms: 0,
            state_end_ms: 0,
            next_action_ms: 0,
            next_action_delay_ms: 1,
            collision_flags: CollisionFlags::empty(),
            bounds: CollisionBounds::none(),
            damage: 0.0,
            owner: None,
            target: None,
            layer: 0,
            priority: 0,
            activate_ms: 0,
            deactivate_ms: 0,
            deactivate_frame: 0,
            timeout_ms: 0,
            culling: Culling::Manual,
            active: false,
            handle: None,
        }
    }

    /// Reset every field from `template`, then move to `(x, y)`.
    ///
    /// The object is left inactive; the pool activates it after wiring up
    /// its handle.
    pub fn instantiate(&mut self, type_name: &'static str, template: &ObjectTemplate, x: f32, y: f32) {
        let handle = self.handle;
        *self = Self {
            type_name,
            sprite: template.sprite,
            health: template.health,
            speed: template.speed,
            damage: template.damage,
            angle: template.angle_deg.to_radians(),
            bounds: template.bounds,
            collision_flags: template.collision_flags,
            culling: template.culling,
            timeout_ms: template.timeout_ms,
            layer: template.layer,
            priority: template.priority,
            next_action_delay_ms: template.next_action_delay_ms,
            handle,
            ..Self::new()
        };
        self.offset_xy(x, y);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handle of the slot this object lives in, if it is pooled.
    pub fn handle(&self) -> Option<ObjectHandle> {
        self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: ObjectHandle) {
        self.handle = Some(handle);
    }

    /// Drop the active flag without stamping times. Used by bulk resets.
    pub(crate) fn clear_active(&mut self) {
        self.active = false;
    }

    /// Start participating in updates, draws and collisions. No-op when already active.
    pub fn activate(&mut self, clock: &GameClock) {
        if self.active {
            return;
        }
        self.activate_ms = clock.now_ms();
        self.active = true;
    }

    /// Stop participating. The slot is recycled later by the pool.
    /// No-op when already inactive.
    pub fn deactivate(&mut self, clock: &GameClock) {
        if !self.active {
            return;
        }
        self.deactivate_ms = clock.now_ms();
        self.deactivate_frame = clock.frames();
        self.active = false;
    }

    /// Run the kind's update hook, then apply timeout culling.
    ///
    /// Auto culling needs grid extents and is applied by [`ObjectGrid`](crate::grid::ObjectGrid).
    pub fn update<K: ObjectKind>(&mut self, kind: &mut K, clock: &GameClock, ctx: &mut K::Context<'_>) {
        kind.on_update(self, clock, ctx);

        let deadline = self.activate_ms.saturating_add(self.timeout_ms);
        if self.culling == Culling::Timeout && clock.now_ms() > deadline {
            self.deactivate(clock);
        }
    }

    pub fn draw<K: ObjectKind>(&self, kind: &K, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        if kind.on_draw(self, surface, xofs, yofs) {
            return;
        }
        if let Some(sprite) = &self.sprite {
            sprite.draw(surface, self.pos.x + xofs, self.pos.y + yofs, self.anim.current_frame);
        }
    }

    pub fn draw_debug(&self, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        self.bounds.draw_debug(surface, xofs, yofs, GREEN);
        match &self.sprite {
            Some(sprite) => sprite.draw_debug(surface, self.pos.x + xofs, self.pos.y + yofs),
            None => surface.draw_point(self.pos.x + xofs, self.pos.y + yofs, WHITE),
        }
    }

    /// Tell this object it was hit by `other`.
    pub fn collide<K: ObjectKind>(
        &mut self,
        kind: &mut K,
        other: &mut GameObject,
        clock: &GameClock,
        events: &mut Vec<K::Event>,
    ) {
        kind.on_collide(self, other, clock, events);
    }

    /// Subtract `amount` from health, flooring at zero.
    ///
    /// Returns how much was actually removed, so a caller can spot the
    /// killing blow (`removed > 0 && health == 0`) exactly once.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let old = self.health;
        self.health = (self.health - amount).max(0.0);
        old - self.health
    }

    pub fn is_same_type(&self, other: &GameObject) -> bool {
        self.type_name == other.type_name
    }

    /// Move position and bounds together.
    pub fn offset_xy(&mut self, x: f32, y: f32) {
        self.pos.add_xy(x, y);
        self.bounds.pos.add_xy(x, y);
    }

    pub fn move_to_xy(&mut self, x: f32, y: f32) {
        let dx = x - self.pos.x;
        let dy = y - self.pos.y;
        self.offset_xy(dx, dy);
    }

    /// Drawn after `other` by the render list.
    pub fn in_front_of(&self, other: &GameObject) -> bool {
        (self.layer, self.priority) > (other.layer, other.priority)
    }

    /// Point velocity along the current speed at `angle` (radians).
    pub fn aim(&mut self, angle: f32) {
        self.angle = angle;
        self.vel.set_angle(angle).scale(self.speed);
    }

    /// Timeout long enough to cross a `width x height` diagonal at the current speed.
    pub fn set_timeout_from_extent(&mut self, width: f32, height: f32) {
        let diagonal = (width * width + height * height).sqrt();
        self.timeout_ms = if self.speed != 0.0 {
            ((diagonal / self.speed).abs() * 1000.0) as u64
        } else {
            0
        };
    }

    /// Enter `state`. A zero duration means open-ended.
    pub fn set_state(&mut self, state: u32, duration_ms: u64, clock: &GameClock) {
        self.state = state;
        self.state_start_ms = clock.now_ms();
        self.state_end_ms = if duration_ms > 0 {
            self.state_start_ms.saturating_add(duration_ms)
        } else {
            0
        };
    }

    /// Progress through the current state in `[0, 1]`; always 0 for open-ended states.
    pub fn state_t(&self, clock: &GameClock) -> f32 {
        if self.state_end_ms == 0 {
            0.0
        } else {
            clamp_scaled(
                clock.now_ms() as f32,
                self.state_start_ms as f32,
                self.state_end_ms as f32,
            )
        }
    }
}

impl std::fmt::Display for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
