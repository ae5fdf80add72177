//! Per-frame draw queue sorted by layer and priority.
//!
//! Nodes hold [`DrawTarget`] keys rather than references. Whatever owns the
//! pools implements [`DrawResolver`] and turns each key back into draw calls.
//! Typical frame:
//!
//! ```ignore
//! player.add_draw_calls(&mut list);
//! enemies.add_draw_calls(&mut list);
//! list.sort();
//! list.draw(&world, &mut surface, camera.position.x, camera.position.y);
//! list.clear();
//! ```

use crate::capped::CappedVec;
use crate::config::DEFAULT_RENDER_LIST_CAPACITY;
use crate::error::CoreError;
use crate::handle::{ObjectHandle, PoolId};
use crate::surface::Surface;

/// What a render-list node draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawTarget {
    /// A single pooled object.
    Object(ObjectHandle),
    /// A whole pool through its manager-level draw function.
    Pool(PoolId),
    /// Anything else the resolver knows about (player, background, HUD).
    Custom(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderNode {
    pub target: DrawTarget,
    pub layer: i32,
    pub priority: i32,
    /// Drawn without the camera offset.
    pub screen_relative: bool,
}

/// Turns render-list keys into draw calls.
pub trait DrawResolver {
    fn draw_target(&self, target: DrawTarget, surface: &mut dyn Surface, xofs: f32, yofs: f32);

    fn draw_target_debug(&self, _target: DrawTarget, _surface: &mut dyn Surface, _xofs: f32, _yofs: f32) {}
}

#[derive(Debug)]
pub struct RenderList {
    nodes: CappedVec<RenderNode>,
    overflow_reported: bool,
}

impl Default for RenderList {
    fn default() -> Self {
        Self {
            nodes: CappedVec::new(DEFAULT_RENDER_LIST_CAPACITY),
            overflow_reported: false,
        }
    }
}

impl RenderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, CoreError> {
        if capacity == 0 {
            return Err(CoreError::ZeroCapacity {
                name: "render list".into(),
            });
        }
        Ok(Self {
            nodes: CappedVec::new(capacity),
            overflow_reported: false,
        })
    }

    /// Queue `target`. Returns `false` (and drops the call) once the list is full.
    pub fn add_object(&mut self, target: DrawTarget, layer: i32, priority: i32, screen_relative: bool) -> bool {
        let added = self.nodes.push(RenderNode {
            target,
            layer,
            priority,
            screen_relative,
        });
        if !added && !self.overflow_reported {
            log::warn!(
                "render list full ({}/{}), dropping {:?}",
                self.nodes.len(),
                self.nodes.capacity(),
                target
            );
            self.overflow_reported = true;
        }
        added
    }

    /// Order by layer, then priority, both ascending. Ties keep insertion order.
    pub fn sort(&mut self) {
        self.nodes
            .as_mut_slice()
            .sort_by_key(|node| (node.layer, node.priority));
    }

    /// Draw every node in list order. Assumes [`sort`](Self::sort) ran.
    pub fn draw(&self, resolver: &dyn DrawResolver, surface: &mut dyn Surface, camera_x: f32, camera_y: f32) {
        for node in self.nodes.iter() {
            let (xofs, yofs) = offset(node, camera_x, camera_y);
            resolver.draw_target(node.target, surface, xofs, yofs);
        }
    }

    /// Debug-draw the nodes on `layer` only.
    pub fn draw_debug(
        &self,
        resolver: &dyn DrawResolver,
        surface: &mut dyn Surface,
        camera_x: f32,
        camera_y: f32,
        layer: i32,
    ) {
        for node in self.nodes.iter().filter(|node| node.layer == layer) {
            let (xofs, yofs) = offset(node, camera_x, camera_y);
            resolver.draw_target_debug(node.target, surface, xofs, yofs);
        }
    }

    /// Empty the list for the next frame. Storage is reused.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.overflow_reported = false;
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Calls dropped because the list was full, since construction.
    pub fn dropped(&self) -> u64 {
        self.nodes.dropped()
    }
}

fn offset(node: &RenderNode, camera_x: f32, camera_y: f32) -> (f32, f32) {
    if node.screen_relative {
        (0.0, 0.0)
    } else {
        (-camera_x, -camera_y)
    }
}
