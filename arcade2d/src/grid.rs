//! Object pool with a uniform grid for broad-phase collision queries.
//!
//! Every update rebuilds the bins from object positions. Queries map an AABB
//! onto the cells it overlaps, gather the referenced objects as candidates,
//! then narrow them down by testing each candidate's position. Members are
//! treated as points, which suits small fast projectiles.
//!
//! All lists are fixed-size. A full bin, candidate list or collision list
//! silently drops the overflow for that tick; the drops are counted.

use crate::capped::CappedVec;
use crate::clock::GameClock;
use crate::collision::{test_aabb_point, CollisionBounds};
use crate::config::{GridSettings, DEFAULT_LIST_CAPACITY};
use crate::error::CoreError;
use crate::handle::{ObjectHandle, PoolId};
use crate::math::Vec2;
use crate::object::{Culling, GameObject, ObjectKind};
use crate::pool::ObjectManager;
use crate::render::{DrawResolver, DrawTarget, RenderList};
use crate::surface::{Color, Rect, Surface, GREEN};
use crate::templates::ObjectTemplate;

/// A cell coordinate in the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Fixed placement and cell layout of a grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
    pub size_x: u32,
    pub size_y: u32,
    bin_w: f32,
    bin_h: f32,
    inv_bin_w: f32,
    inv_bin_h: f32,
}

impl GridGeometry {
    fn from_settings(settings: &GridSettings) -> Self {
        let bin_w = settings.width / settings.size_x as f32;
        let bin_h = settings.height / settings.size_y as f32;
        Self {
            origin: Vec2::new(settings.px, settings.py),
            width: settings.width,
            height: settings.height,
            size_x: settings.size_x,
            size_y: settings.size_y,
            bin_w,
            bin_h,
            inv_bin_w: if bin_w != 0.0 { 1.0 / bin_w } else { 0.0 },
            inv_bin_h: if bin_h != 0.0 { 1.0 / bin_h } else { 0.0 },
        }
    }

    pub fn bin_size(&self) -> (f32, f32) {
        (self.bin_w, self.bin_h)
    }

    /// Cell containing `(x, y)`; may lie outside the grid.
    pub fn cell_of(&self, x: f32, y: f32) -> GridCoord {
        GridCoord {
            x: ((x - self.origin.x) * self.inv_bin_w).floor() as i32,
            y: ((y - self.origin.y) * self.inv_bin_h).floor() as i32,
        }
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && (coord.x as u32) < self.size_x && (coord.y as u32) < self.size_y
    }

    /// Row-major bin index, or `None` off the grid.
    pub fn index_of(&self, coord: GridCoord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.y as usize * self.size_x as usize + coord.x as usize)
    }
}

/// References to the pool slots currently inside one cell.
#[derive(Clone, Debug)]
pub struct ObjectGridBin {
    refs: CappedVec<usize>,
}

impl ObjectGridBin {
    fn new(max_refs: usize) -> Self {
        Self {
            refs: CappedVec::new(max_refs),
        }
    }

    pub fn refs(&self) -> &[usize] {
        &self.refs
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Fill fraction in `[0, 1]`.
    pub fn occupancy(&self) -> f32 {
        self.refs.len() as f32 / self.refs.capacity() as f32
    }
}

pub struct ObjectGrid<K> {
    pool: ObjectManager<K>,
    geometry: GridGeometry,
    bins: Vec<ObjectGridBin>,
    candidates: CappedVec<usize>,
    collisions: CappedVec<usize>,
    seen: Vec<bool>,
    dedupe: bool,
    debug_overlay: bool,
}

impl<K: ObjectKind> ObjectGrid<K> {
    pub fn new(pool: ObjectManager<K>, settings: &GridSettings) -> Result<Self, CoreError> {
        Self::with_list_capacity(pool, settings, DEFAULT_LIST_CAPACITY)
    }

    /// Grid whose candidate and collision lists hold `list_capacity` entries each.
    pub fn with_list_capacity(
        pool: ObjectManager<K>,
        settings: &GridSettings,
        list_capacity: usize,
    ) -> Result<Self, CoreError> {
        settings.validate(pool.name())?;
        if list_capacity == 0 {
            return Err(CoreError::ZeroCapacity {
                name: format!("{} candidate list", pool.name()),
            });
        }
        let geometry = GridGeometry::from_settings(settings);
        let bins = (0..settings.cell_count())
            .map(|_| ObjectGridBin::new(settings.max_refs_per_bin))
            .collect();
        log::debug!(
            "grid `{}`: {}x{} cells of {}x{} at {}",
            pool.name(),
            geometry.size_x,
            geometry.size_y,
            geometry.bin_w,
            geometry.bin_h,
            geometry.origin
        );
        Ok(Self {
            seen: vec![false; pool.capacity()],
            pool,
            geometry,
            bins,
            candidates: CappedVec::new(list_capacity),
            collisions: CappedVec::new(list_capacity),
            dedupe: false,
            debug_overlay: false,
        })
    }

    /// Remove duplicate candidates in every [`test_collisions`](Self::test_collisions).
    ///
    /// Members are bucketed by position and land in exactly one bin, so
    /// this is off by default.
    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Draw bin occupancy and cell outlines in [`draw_debug`](Self::draw_debug).
    #[must_use]
    pub fn with_debug_overlay(mut self, enabled: bool) -> Self {
        self.debug_overlay = enabled;
        self
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn pool(&self) -> &ObjectManager<K> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ObjectManager<K> {
        &mut self.pool
    }

    pub fn id(&self) -> PoolId {
        self.pool.id()
    }

    pub fn bin(&self, coord: GridCoord) -> Option<&ObjectGridBin> {
        self.geometry.index_of(coord).map(|i| &self.bins[i])
    }

    /// References dropped because a bin was full, since construction.
    pub fn bin_overflows(&self) -> u64 {
        self.bins.iter().map(|bin| bin.refs.dropped()).sum()
    }

    /// Candidates dropped because the candidate list was full, since construction.
    pub fn candidate_overflows(&self) -> u64 {
        self.candidates.dropped()
    }

    /// Update members, then rebuild the bins from their new positions.
    ///
    /// A member that ends its update outside the grid with [`Culling::Auto`]
    /// is deactivated here.
    pub fn update(&mut self, clock: &GameClock, ctx: &mut K::Context<'_>) {
        for bin in &mut self.bins {
            bin.refs.clear();
        }
        let geometry = self.geometry;
        let bins = &mut self.bins;
        self.pool.update_with(clock, ctx, |index, obj| {
            if !obj.is_active() {
                return;
            }
            match geometry.index_of(geometry.cell_of(obj.pos.x, obj.pos.y)) {
                Some(cell) => {
                    bins[cell].refs.push(index);
                }
                None => {
                    if obj.culling == Culling::Auto {
                        obj.deactivate(clock);
                    }
                }
            }
        });
    }

    /// Gather the members of every cell the AABB overlaps.
    ///
    /// The list is empty when the box misses the grid entirely, and
    /// truncated at capacity.
    pub fn get_candidates_aabb(&mut self, px: f32, py: f32, hw: f32, hh: f32) -> &[usize] {
        self.candidates.clear();
        let g = &self.geometry;
        let min = g.cell_of(px - hw, py - hh);
        let max = g.cell_of(px + hw, py + hh);
        let (size_x, size_y) = (g.size_x as i32, g.size_y as i32);
        if max.x < 0 || max.y < 0 || min.x >= size_x || min.y >= size_y {
            return &self.candidates;
        }
        let (x0, x1) = (min.x.max(0), max.x.min(size_x - 1));
        let (y0, y1) = (min.y.max(0), max.y.min(size_y - 1));

        'cells: for y in y0..=y1 {
            for x in x0..=x1 {
                let bin = &self.bins[y as usize * size_x as usize + x as usize];
                for &index in bin.refs.iter() {
                    if !self.candidates.push(index) {
                        break 'cells;
                    }
                }
            }
        }
        &self.candidates
    }

    /// Drop repeated entries from the candidate list, keeping first occurrences in order.
    pub fn remove_duplicate_candidates(&mut self) {
        let seen = &mut self.seen;
        self.candidates.retain(|&index| !std::mem::replace(&mut seen[index], true));
        for &index in self.candidates.iter() {
            self.seen[index] = false;
        }
    }

    /// Narrow phase: keep the active candidates whose position lies in the AABB.
    pub fn get_collisions_aabb_xy(&mut self, px: f32, py: f32, hw: f32, hh: f32) -> &[usize] {
        self.collisions.clear();
        for &index in self.candidates.iter() {
            let Some(obj) = self.pool.object_at(index) else {
                continue;
            };
            if obj.is_active() && test_aabb_point(px, py, hw, hh, obj.pos.x, obj.pos.y) {
                self.collisions.push(index);
            }
        }
        &self.collisions
    }

    /// Members whose position lies inside the box enclosing `bounds`
    /// (circles query their bounding square). The result stays
    /// available through [`collisions`](Self::collisions) until the next query.
    pub fn test_collisions(&mut self, bounds: &CollisionBounds) -> &[usize] {
        if !bounds.is_enabled() {
            self.candidates.clear();
            self.collisions.clear();
            return &self.collisions;
        }
        let (hw, hh) = bounds.half_extents();
        self.get_candidates_aabb(bounds.pos.x, bounds.pos.y, hw, hh);
        if self.dedupe {
            self.remove_duplicate_candidates();
        }
        self.get_collisions_aabb_xy(bounds.pos.x, bounds.pos.y, hw, hh)
    }

    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    pub fn collisions(&self) -> &[usize] {
        &self.collisions
    }

    /// Collide `object` (not a member of this grid) with every hit from the
    /// last query. Each hit is told first, then `object`, so whatever the
    /// hit does to `object` is visible to `object`'s own hook.
    ///
    /// Returns the number of hits processed.
    pub fn perform_collision_response<O>(
        &mut self,
        object: &mut GameObject,
        kind: &mut O,
        clock: &GameClock,
        events: &mut Vec<K::Event>,
    ) -> usize
    where
        O: ObjectKind<Event = K::Event>,
    {
        let mut processed = 0;
        for n in 0..self.collisions.len() {
            let index = self.collisions[n];
            let Some((hit, hit_kind)) = self.pool.parts_mut(index) else {
                continue;
            };
            if let Some(hit_kind) = hit_kind {
                hit.collide(hit_kind, object, clock, events);
            }
            object.collide(kind, hit, clock, events);
            processed += 1;
        }
        processed
    }

    /// Like [`perform_collision_response`](Self::perform_collision_response)
    /// for a querying object that lives in this grid. It is skipped if it
    /// shows up among its own hits.
    pub fn perform_member_collision_response(
        &mut self,
        handle: ObjectHandle,
        clock: &GameClock,
        events: &mut Vec<K::Event>,
    ) -> usize {
        if self.pool.get(handle).is_none() {
            return 0;
        }
        let own = handle.index();
        let mut processed = 0;
        for n in 0..self.collisions.len() {
            let index = self.collisions[n];
            let Some(((hit, hit_kind), (me, my_kind))) = self.pool.pair_mut(index, own) else {
                continue;
            };
            if let Some(hit_kind) = hit_kind {
                hit.collide(hit_kind, me, clock, events);
            }
            if let Some(my_kind) = my_kind {
                me.collide(my_kind, hit, clock, events);
            }
            processed += 1;
        }
        processed
    }

    pub fn get_free_instance(&mut self) -> Option<usize> {
        self.pool.get_free_instance()
    }

    pub fn spawn(&mut self, kind: K, template: &ObjectTemplate, x: f32, y: f32, clock: &GameClock) -> Option<ObjectHandle> {
        self.pool.spawn(kind, template, x, y, clock)
    }

    pub fn spawn_with(
        &mut self,
        kind: K,
        template: &ObjectTemplate,
        x: f32,
        y: f32,
        clock: &GameClock,
        configure: impl FnOnce(&mut GameObject),
    ) -> Option<ObjectHandle> {
        self.pool.spawn_with(kind, template, x, y, clock, configure)
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&GameObject> {
        self.pool.get(handle)
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut GameObject> {
        self.pool.get_mut(handle)
    }

    pub fn is_alive(&self, handle: ObjectHandle) -> bool {
        self.pool.is_alive(handle)
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn nearest_object(&self, pos: Vec2) -> Option<ObjectHandle> {
        self.pool.nearest_object(pos)
    }

    /// Deactivate all members and empty the bins. Slots are free immediately.
    pub fn deactivate_all(&mut self) {
        self.pool.deactivate_all();
        for bin in &mut self.bins {
            bin.refs.clear();
        }
    }

    pub fn free_all(&mut self) {
        self.pool.free_all();
        for bin in &mut self.bins {
            bin.refs.clear();
        }
    }

    pub fn add_draw_calls(&self, list: &mut RenderList) {
        if self.debug_overlay && !self.pool.has_custom_draw() {
            list.add_object(DrawTarget::Pool(self.id()), self.pool.layer, self.pool.priority, false);
        }
        self.pool.add_draw_calls(list);
    }

    pub fn draw(&self, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        self.pool.draw(surface, xofs, yofs);
    }

    pub fn draw_debug(&self, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        self.pool.draw_debug(surface, xofs, yofs);
        if self.debug_overlay {
            self.draw_grid(surface, xofs, yofs);
        }
    }

    /// Shade each occupied cell by how full its bin is, then outline the cells.
    pub fn draw_grid(&self, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        let g = &self.geometry;
        let ox = g.origin.x + xofs;
        let oy = g.origin.y + yofs;
        for y in 0..g.size_y {
            for x in 0..g.size_x {
                let bin = &self.bins[(y * g.size_x + x) as usize];
                if bin.is_empty() {
                    continue;
                }
                let fill: Color = [1.0, 0.0, 0.0, bin.occupancy()];
                surface.fill_rect(
                    Rect::new(
                        (ox + x as f32 * g.bin_w).floor(),
                        (oy + y as f32 * g.bin_h).floor(),
                        g.bin_w.floor(),
                        g.bin_h.floor(),
                    ),
                    fill,
                );
            }
        }

        surface.stroke_rect(Rect::new(ox.floor(), oy.floor(), g.width, g.height), GREEN);
        for y in 1..g.size_y {
            let ly = (oy + y as f32 * g.bin_h).floor();
            surface.draw_line(Vec2::new(ox, ly), Vec2::new(ox + g.width, ly), GREEN);
        }
        for x in 1..g.size_x {
            let lx = (ox + x as f32 * g.bin_w).floor();
            surface.draw_line(Vec2::new(lx, oy), Vec2::new(lx, oy + g.height), GREEN);
        }
    }
}

impl<K: ObjectKind> DrawResolver for ObjectGrid<K> {
    fn draw_target(&self, target: DrawTarget, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        match target {
            DrawTarget::Object(handle) => self.pool.draw_object(handle, surface, xofs, yofs),
            DrawTarget::Pool(id) if id == self.id() => self.draw(surface, xofs, yofs),
            _ => {}
        }
    }

    fn draw_target_debug(&self, target: DrawTarget, surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        match target {
            DrawTarget::Object(handle) => self.pool.draw_object_debug(handle, surface, xofs, yofs),
            DrawTarget::Pool(id) if id == self.id() => self.draw_debug(surface, xofs, yofs),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Inert;

    fn grid(capacity: usize) -> ObjectGrid<Inert> {
        let pool = ObjectManager::new(PoolId(0), "grid", capacity).unwrap();
        let settings = GridSettings {
            max_refs_per_bin: 4,
            px: 0.0,
            py: 0.0,
            width: 100.0,
            height: 100.0,
            size_x: 10,
            size_y: 10,
        };
        ObjectGrid::new(pool, &settings).unwrap()
    }

    #[test]
    fn duplicate_removal_keeps_first_occurrences() {
        let mut grid = grid(8);
        for index in [3, 1, 3, 5, 1, 1, 7] {
            grid.candidates.push(index);
        }
        grid.remove_duplicate_candidates();
        assert_eq!(grid.candidates(), &[3, 1, 5, 7]);
        assert!(grid.seen.iter().all(|s| !s));
    }

    #[test]
    fn query_off_grid_yields_nothing() {
        let clock = GameClock::new(60).unwrap();
        let mut grid = grid(4);
        grid.spawn(Inert, &ObjectTemplate::default(), 5.0, 5.0, &clock);
        grid.update(&clock, &mut ());
        assert_eq!(grid.get_candidates_aabb(5.0, 5.0, 1.0, 1.0), &[0]);
        assert!(grid.get_candidates_aabb(-50.0, -50.0, 5.0, 5.0).is_empty());
        assert!(grid.get_candidates_aabb(500.0, 5.0, 5.0, 5.0).is_empty());
    }

    #[test]
    fn full_bin_drops_extra_refs() {
        let clock = GameClock::new(60).unwrap();
        let mut grid = grid(6);
        for _ in 0..6 {
            grid.spawn(Inert, &ObjectTemplate::default(), 1.0, 1.0, &clock);
        }
        grid.update(&clock, &mut ());
        assert_eq!(grid.bin(GridCoord::new(0, 0)).map(ObjectGridBin::len), Some(4));
        assert_eq!(grid.bin_overflows(), 2);
    }

    #[test]
    fn zero_cells_fail_at_setup() {
        let pool = ObjectManager::<Inert>::new(PoolId(0), "flat", 4).unwrap();
        let settings = GridSettings::for_screen(100.0, 10.0, 32.0);
        assert!(matches!(
            ObjectGrid::new(pool, &settings),
            Err(CoreError::ZeroCells { .. })
        ));
    }
}
