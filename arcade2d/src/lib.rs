//! arcade2d - the simulation core of a fixed-timestep 2D arcade shooter.
//!
//! Entities live in pre-allocated pools, projectiles in pools backed by a
//! uniform grid for broad-phase collision, and everything is drawn through a
//! per-frame render list sorted by layer and priority. The crate is headless:
//! drawing goes through the [`Surface`] trait and sound through [`SoundSink`].

pub mod capped;
pub mod clock;
pub mod collision;
pub mod config;
pub mod driver;
pub mod error;
pub mod grid;
pub mod handle;
pub mod input;
pub mod math;
pub mod motion;
pub mod object;
pub mod pool;
pub mod random;
pub mod render;
pub mod scratch;
pub mod sound;
pub mod sprite;
pub mod surface;
pub mod templates;

pub use crate::capped::CappedVec;
pub use crate::clock::GameClock;
pub use crate::collision::{BoundsShape, CollisionBounds};
pub use crate::config::{CoreConfig, GridSettings};
pub use crate::driver::{GameLoop, Simulation};
pub use crate::error::CoreError;
pub use crate::grid::{GridCoord, ObjectGrid};
pub use crate::handle::{ObjectHandle, PoolId, PoolRegistry};
pub use crate::input::{InputSnapshot, KeyId};
pub use crate::math::{Camera2D, Vec2};
pub use crate::motion::{MassSpring, SimpleBody};
pub use crate::object::{CollisionFlags, Culling, GameObject, Inert, ObjectKind};
pub use crate::pool::ObjectManager;
pub use crate::random::RandomNumberTable;
pub use crate::render::{DrawResolver, DrawTarget, RenderList};
pub use crate::scratch::ScratchPool;
pub use crate::sound::{SoundLog, SoundSink};
pub use crate::sprite::{Alignment, Sprite, TextureHandle};
pub use crate::surface::{Color, RecordingSurface, Rect, Surface};
pub use crate::templates::{ObjectTemplate, TemplateLibrary};
