//! Fixed-capacity object pool with deferred slot reuse.
//!
//! Slots are allocated once. A deactivated object keeps its slot for
//! `free_delay` more ticks before [`ObjectManager::get_free_instance`] may
//! hand it out again, so anything that looked it up earlier in the tick still
//! sees an inactive object rather than a recycled one.

use crate::clock::GameClock;
use crate::config::DEFAULT_FREE_DELAY;
use crate::error::CoreError;
use crate::handle::{ObjectHandle, PoolId};
use crate::math::Vec2;
use crate::object::{GameObject, ObjectKind};
use crate::render::{DrawResolver, DrawTarget, RenderList};
use crate::surface::{Surface, RED};
use crate::templates::ObjectTemplate;

/// Manager-level draw override. Lets a whole pool draw in one render-list entry.
pub type PoolDrawFn<K> = fn(&ObjectManager<K>, &mut dyn Surface, f32, f32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Free,
    InUse,
    PendingFree { free_at: u64 },
}

#[derive(Debug)]
struct Slot<K> {
    object: GameObject,
    kind: Option<K>,
    generation: u32,
    state: SlotState,
}

pub struct ObjectManager<K> {
    id: PoolId,
    name: String,
    slots: Vec<Slot<K>>,
    last_granted: Option<usize>,
    free_delay: u64,
    draw_fn: Option<PoolDrawFn<K>>,
    draw_debug_fn: Option<PoolDrawFn<K>>,
    pub layer: i32,
    pub priority: i32,
    exhausted: u64,
    exhaustion_reported: bool,
}

impl<K: ObjectKind> ObjectManager<K> {
    pub fn new(id: PoolId, name: &str, capacity: usize) -> Result<Self, CoreError> {
        Self::with_factory(id, name, capacity, GameObject::new)
    }

    /// Build `capacity` objects with `factory`. All slots start free.
    pub fn with_factory(
        id: PoolId,
        name: &str,
        capacity: usize,
        mut factory: impl FnMut() -> GameObject,
    ) -> Result<Self, CoreError> {
        if capacity == 0 {
            return Err(CoreError::ZeroCapacity {
                name: name.to_string(),
            });
        }
        let slots = (0..capacity)
            .map(|_| Slot {
                object: factory(),
                kind: None,
                generation: 0,
                state: SlotState::Free,
            })
            .collect();
        log::debug!("pool `{}` initialized with {} slots", name, capacity);
        Ok(Self {
            id,
            name: name.to_string(),
            slots,
            last_granted: None,
            free_delay: DEFAULT_FREE_DELAY,
            draw_fn: None,
            draw_debug_fn: None,
            layer: 0,
            priority: 0,
            exhausted: 0,
            exhaustion_reported: false,
        })
    }

    #[must_use]
    pub fn with_free_delay(mut self, frames: u64) -> Self {
        self.free_delay = frames;
        self
    }

    /// Draw the whole pool through `draw` as a single render-list entry.
    #[must_use]
    pub fn with_draw_fn(mut self, draw: PoolDrawFn<K>) -> Self {
        self.draw_fn = Some(draw);
        self
    }

    #[must_use]
    pub fn with_draw_debug_fn(mut self, draw: PoolDrawFn<K>) -> Self {
        self.draw_debug_fn = Some(draw);
        self
    }

    #[must_use]
    pub fn with_layer(mut self, layer: i32, priority: i32) -> Self {
        self.layer = layer;
        self.priority = priority;
        self
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_delay(&self) -> u64 {
        self.free_delay
    }

    /// How many acquisitions found the pool full.
    pub fn exhausted_count(&self) -> u64 {
        self.exhausted
    }

    pub fn has_custom_draw(&self) -> bool {
        self.draw_fn.is_some() || self.draw_debug_fn.is_some()
    }

    /// Claim a free slot, scanning round-robin from just after the last one granted.
    ///
    /// `None` means the pool is full; callers skip the spawn.
    pub fn get_free_instance(&mut self) -> Option<usize> {
        let len = self.slots.len();
        let start = self.last_granted.map_or(0, |last| last + 1);
        for step in 0..len {
            let index = (start + step) % len;
            let slot = &mut self.slots[index];
            if slot.state == SlotState::Free && !slot.object.is_active() {
                slot.state = SlotState::InUse;
                self.last_granted = Some(index);
                self.exhaustion_reported = false;
                return Some(index);
            }
        }

        self.exhausted += 1;
        if !self.exhaustion_reported {
            log::warn!("pool `{}`: no free objects available ({} slots)", self.name, len);
            self.exhaustion_reported = true;
        }
        None
    }

    /// Claim a slot and bring it to life as `kind`, using `template` and `(x, y)`.
    pub fn spawn(
        &mut self,
        kind: K,
        template: &ObjectTemplate,
        x: f32,
        y: f32,
        clock: &GameClock,
    ) -> Option<ObjectHandle> {
        self.spawn_with(kind, template, x, y, clock, |_| {})
    }

    /// Like [`spawn`](Self::spawn), running `configure` on the fresh object before it activates.
    pub fn spawn_with(
        &mut self,
        kind: K,
        template: &ObjectTemplate,
        x: f32,
        y: f32,
        clock: &GameClock,
        configure: impl FnOnce(&mut GameObject),
    ) -> Option<ObjectHandle> {
        let index = self.get_free_instance()?;
        let id = self.id;
        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        let handle = ObjectHandle::new(id, index, slot.generation);

        slot.object.instantiate(kind.type_name(), template, x, y);
        slot.object.set_handle(handle);
        configure(&mut slot.object);
        slot.object.activate(clock);
        slot.kind = Some(kind);
        log::trace!("pool `{}`: spawned {} at slot {}", self.name, slot.object.type_name, index);
        Some(handle)
    }

    /// Update every active object in index order and advance the free
    /// schedule of inactive ones.
    pub fn update(&mut self, clock: &GameClock, ctx: &mut K::Context<'_>) {
        self.update_with(clock, ctx, |_, _| {});
    }

    /// [`update`](Self::update) with `after` called on each object that was
    /// active when visited, right after its own update ran.
    pub(crate) fn update_with(
        &mut self,
        clock: &GameClock,
        ctx: &mut K::Context<'_>,
        mut after: impl FnMut(usize, &mut GameObject),
    ) {
        let frames = clock.frames();
        let delay = self.free_delay;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.object.is_active() {
                // an object revived through its handle claims its slot back
                slot.state = SlotState::InUse;
                if let Some(kind) = slot.kind.as_mut() {
                    slot.object.update(kind, clock, ctx);
                }
                after(index, &mut slot.object);
                continue;
            }

            slot.state = match slot.state {
                SlotState::Free => SlotState::Free,
                SlotState::InUse => {
                    let free_at = slot.object.deactivate_frame + delay;
                    if frames >= free_at {
                        SlotState::Free
                    } else {
                        SlotState::PendingFree { free_at }
                    }
                }
                SlotState::PendingFree { free_at } if frames >= free_at => SlotState::Free,
                pending => pending,
            };
        }
    }

    /// Deactivate everything and make every slot available immediately.
    pub fn deactivate_all(&mut self) {
        for slot in &mut self.slots {
            slot.object.clear_active();
            slot.state = SlotState::Free;
        }
    }

    /// [`deactivate_all`](Self::deactivate_all) plus rewinding the round-robin cursor.
    pub fn free_all(&mut self) {
        self.deactivate_all();
        self.last_granted = None;
        self.exhaustion_reported = false;
    }

    fn slot(&self, handle: ObjectHandle) -> Option<&Slot<K>> {
        if handle.pool != self.id {
            return None;
        }
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation)
    }

    fn slot_mut(&mut self, handle: ObjectHandle) -> Option<&mut Slot<K>> {
        if handle.pool != self.id {
            return None;
        }
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation)
    }

    /// The object `handle` points at, unless its slot has been recycled since.
    /// The object may be inactive.
    pub fn get(&self, handle: ObjectHandle) -> Option<&GameObject> {
        self.slot(handle).map(|slot| &slot.object)
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut GameObject> {
        self.slot_mut(handle).map(|slot| &mut slot.object)
    }

    pub fn kind(&self, handle: ObjectHandle) -> Option<&K> {
        self.slot(handle).and_then(|slot| slot.kind.as_ref())
    }

    /// Same slot, same generation, and still active.
    pub fn is_alive(&self, handle: ObjectHandle) -> bool {
        self.get(handle).is_some_and(GameObject::is_active)
    }

    pub fn object_at(&self, index: usize) -> Option<&GameObject> {
        self.slots.get(index).map(|slot| &slot.object)
    }

    pub fn object_at_mut(&mut self, index: usize) -> Option<&mut GameObject> {
        self.slots.get_mut(index).map(|slot| &mut slot.object)
    }

    /// Object and kind of slot `index`, both mutable.
    pub(crate) fn parts_mut(&mut self, index: usize) -> Option<(&mut GameObject, Option<&mut K>)> {
        self.slots
            .get_mut(index)
            .map(|slot| (&mut slot.object, slot.kind.as_mut()))
    }

    /// Mutable parts of two distinct slots.
    pub(crate) fn pair_mut(
        &mut self,
        a: usize,
        b: usize,
    ) -> Option<((&mut GameObject, Option<&mut K>), (&mut GameObject, Option<&mut K>))> {
        if a == b || a >= self.slots.len() || b >= self.slots.len() {
            return None;
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(high);
        let low_slot = &mut head[low];
        let high_slot = &mut tail[0];
        let low_parts = (&mut low_slot.object, low_slot.kind.as_mut());
        let high_parts = (&mut high_slot.object, high_slot.kind.as_mut());
        if a < b {
            Some((low_parts, high_parts))
        } else {
            Some((high_parts, low_parts))
        }
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (ObjectHandle, &GameObject)> + '_ {
        let id = self.id;
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.object.is_active())
            .map(move |(index, slot)| (ObjectHandle::new(id, index, slot.generation), &slot.object))
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.object.is_active()).count()
    }

    /// Slots `get_free_instance` could grant right now.
    pub fn free_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state == SlotState::Free && !slot.object.is_active())
            .count()
    }

    /// Brute-force nearest active object to `pos`. Fine for small pools only.
    pub fn nearest_object(&self, pos: Vec2) -> Option<ObjectHandle> {
        self.iter_active()
            .map(|(handle, obj)| (handle, pos.distance_squared(obj.pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _)| handle)
    }

    /// Queue this pool's draw calls: one entry for the whole pool when it
    /// has a custom draw function, otherwise one per active object.
    pub fn add_draw_calls(&self, list: &mut RenderList) {
        if self.has_custom_draw() {
            list.add_object(DrawTarget::Pool(self.id), self.layer, self.priority, false);
            return;
        }
        for (handle, obj) in self.iter_active() {
            list.add_object(DrawTarget::Object(handle), obj.layer, obj.priority, false);
        }
    }

    /// Run the pool-level draw function, if any.
    pub fn draw(&self, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        if let Some(draw) = self.draw_fn {
            draw(self, surface, xofs, yofs);
        }
    }

    pub fn draw_debug(&self, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        if let Some(draw) = self.draw_debug_fn {
            draw(self, surface, xofs, yofs);
        }
    }

    /// Draw one object through its kind.
    pub fn draw_object(&self, handle: ObjectHandle, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        if let Some(slot) = self.slot(handle) {
            if let Some(kind) = &slot.kind {
                slot.object.draw(kind, surface, xofs, yofs);
            }
        }
    }

    pub fn draw_object_debug(&self, handle: ObjectHandle, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        if let Some(obj) = self.get(handle) {
            obj.draw_debug(surface, xofs, yofs);
        }
    }

    /// Stock [`PoolDrawFn`]: every active object, in slot order.
    pub fn draw_active_objects(pool: &Self, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        for slot in &pool.slots {
            if let (true, Some(kind)) = (slot.object.is_active(), &slot.kind) {
                slot.object.draw(kind, surface, xofs, yofs);
            }
        }
    }

    /// Stock [`PoolDrawFn`] for debugging: inactive objects as red points.
    pub fn draw_inactive_positions(pool: &Self, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        for slot in &pool.slots {
            if !slot.object.is_active() {
                surface.draw_point(slot.object.pos.x + xofs, slot.object.pos.y + yofs, RED);
            }
        }
    }
}

impl<K: ObjectKind> DrawResolver for ObjectManager<K> {
    fn draw_target(&self, target: DrawTarget, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        match target {
            DrawTarget::Object(handle) => self.draw_object(handle, surface, xofs, yofs),
            DrawTarget::Pool(id) if id == self.id => self.draw(surface, xofs, yofs),
            _ => {}
        }
    }

    fn draw_target_debug(&self, target: DrawTarget, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        match target {
            DrawTarget::Object(handle) => self.draw_object_debug(handle, surface, xofs, yofs),
            DrawTarget::Pool(id) if id == self.id => self.draw_debug(surface, xofs, yofs),
            _ => {}
        }
    }
}

impl<K> std::fmt::Debug for ObjectManager<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectManager")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("capacity", &self.slots.len())
            .field("free_delay", &self.free_delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Inert;

    fn pool(capacity: usize) -> ObjectManager<Inert> {
        ObjectManager::new(PoolId(0), "test", capacity).unwrap()
    }

    #[test]
    fn zero_capacity_is_a_setup_error() {
        assert!(matches!(
            ObjectManager::<Inert>::new(PoolId(0), "empty", 0),
            Err(CoreError::ZeroCapacity { .. })
        ));
    }

    #[test]
    fn handles_go_stale_when_slot_is_reused() {
        let mut clock = GameClock::new(60).unwrap();
        let mut pool = pool(1);
        let template = ObjectTemplate::default();

        let first = pool.spawn(Inert, &template, 0.0, 0.0, &clock).unwrap();
        assert!(pool.is_alive(first));
        pool.get_mut(first).unwrap().deactivate(&clock);
        assert!(!pool.is_alive(first));
        assert!(pool.get(first).is_some());

        clock.advance();
        pool.update(&clock, &mut ());
        let second = pool.spawn(Inert, &template, 0.0, 0.0, &clock).unwrap();
        assert_eq!(second.index, first.index);
        assert_ne!(second.generation, first.generation);
        assert!(pool.get(first).is_none());
        assert!(pool.is_alive(second));
    }

    #[test]
    fn handles_from_other_pools_do_not_resolve() {
        let clock = GameClock::new(60).unwrap();
        let mut a = pool(2);
        let b = ObjectManager::<Inert>::new(PoolId(1), "other", 2).unwrap();
        let h = a.spawn(Inert, &ObjectTemplate::default(), 0.0, 0.0, &clock).unwrap();
        assert!(b.get(h).is_none());
    }

    #[test]
    fn nearest_object_ignores_inactive() {
        let clock = GameClock::new(60).unwrap();
        let mut pool = pool(3);
        let t = ObjectTemplate::default();
        let near = pool.spawn(Inert, &t, 1.0, 0.0, &clock).unwrap();
        let far = pool.spawn(Inert, &t, 10.0, 0.0, &clock).unwrap();
        assert_eq!(pool.nearest_object(Vec2::ZERO), Some(near));
        pool.get_mut(near).unwrap().deactivate(&clock);
        assert_eq!(pool.nearest_object(Vec2::ZERO), Some(far));
    }

    #[test]
    fn free_all_rewinds_cursor() {
        let clock = GameClock::new(60).unwrap();
        let mut pool = pool(4);
        let t = ObjectTemplate::default();
        pool.spawn(Inert, &t, 0.0, 0.0, &clock);
        pool.spawn(Inert, &t, 0.0, 0.0, &clock);
        pool.free_all();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.free_count(), 4);
        assert_eq!(pool.get_free_instance(), Some(0));
    }

    #[test]
    fn exhaustion_is_counted_not_fatal() {
        let mut pool = pool(1);
        assert_eq!(pool.get_free_instance(), Some(0));
        assert_eq!(pool.get_free_instance(), None);
        assert_eq!(pool.get_free_instance(), None);
        assert_eq!(pool.exhausted_count(), 2);
    }
}
