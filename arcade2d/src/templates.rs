//! Data-driven spawn templates.
//!
//! A template holds the starting field values for one kind of object. They
//! are loaded once at setup; a missing or duplicated name is a setup error,
//! never a per-tick one.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionBounds;
use crate::error::CoreError;
use crate::object::{CollisionFlags, Culling};
use crate::sprite::Sprite;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectTemplate {
    pub name: String,
    pub health: f32,
    pub speed: f32,
    pub damage: f32,
    /// Initial heading in degrees.
    pub angle_deg: f32,
    /// Bounds relative to the spawn position.
    pub bounds: CollisionBounds,
    pub collision_flags: CollisionFlags,
    pub culling: Culling,
    pub timeout_ms: u64,
    pub layer: i32,
    pub priority: i32,
    pub next_action_delay_ms: u64,
    pub sprite: Option<Sprite>,
}

impl Default for ObjectTemplate {
    fn default() -> Self {
        Self {
            name: String::new(),
            health: 1.0,
            speed: 0.0,
            damage: 0.0,
            angle_deg: 0.0,
            bounds: CollisionBounds::none(),
            collision_flags: CollisionFlags::empty(),
            culling: Culling::Manual,
            timeout_ms: 0,
            layer: 0,
            priority: 0,
            next_action_delay_ms: 1,
            sprite: None,
        }
    }
}

impl ObjectTemplate {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Templates keyed by name.
#[derive(Debug, Default)]
pub struct TemplateLibrary {
    templates: HashMap<String, ObjectTemplate>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut template: ObjectTemplate) -> Result<(), CoreError> {
        if self.templates.contains_key(&template.name) {
            return Err(CoreError::DuplicateName(template.name));
        }
        // offsets are derived, not stored
        if let Some(sprite) = template.sprite.as_mut() {
            sprite.align(sprite.alignment);
        }
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Parse a JSON array of templates.
    pub fn from_json(json: &str) -> Result<Self> {
        let list: Vec<ObjectTemplate> = serde_json::from_str(json)?;
        let mut library = Self::new();
        for template in list {
            library.insert(template)?;
        }
        log::debug!("loaded {} object templates", library.len());
        Ok(library)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn get(&self, name: &str) -> Result<&ObjectTemplate, CoreError> {
        self.templates
            .get(name)
            .ok_or_else(|| CoreError::MissingTemplate(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
