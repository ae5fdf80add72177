//! Tunables for the simulation core, loadable from JSON.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const DEFAULT_FRAMERATE: u32 = 60;
/// Ticks a deactivated object stays unavailable before its slot is reused.
pub const DEFAULT_FREE_DELAY: u64 = 1;
pub const DEFAULT_RENDER_LIST_CAPACITY: usize = 128;
/// Cap on both the candidate and the collision list of a grid.
pub const DEFAULT_LIST_CAPACITY: usize = 64;
pub const DEFAULT_SCRATCH_POOL_SIZE: usize = 16;
pub const DEFAULT_MAX_REFS_PER_BIN: usize = 16;
pub const DEFAULT_BIN_SIZE: f32 = 32.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub framerate: u32,
    pub free_delay_frames: u64,
    pub render_list_capacity: usize,
    pub candidate_list_capacity: usize,
    pub scratch_pool_size: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            framerate: DEFAULT_FRAMERATE,
            free_delay_frames: DEFAULT_FREE_DELAY,
            render_list_capacity: DEFAULT_RENDER_LIST_CAPACITY,
            candidate_list_capacity: DEFAULT_LIST_CAPACITY,
            scratch_pool_size: DEFAULT_SCRATCH_POOL_SIZE,
        }
    }
}

impl CoreConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.framerate == 0 {
            return Err(CoreError::ZeroFramerate);
        }
        if self.render_list_capacity == 0 {
            return Err(CoreError::ZeroCapacity {
                name: "render list".into(),
            });
        }
        if self.candidate_list_capacity == 0 {
            return Err(CoreError::ZeroCapacity {
                name: "candidate list".into(),
            });
        }
        Ok(())
    }
}

/// Geometry of an [`ObjectGrid`](crate::grid::ObjectGrid).
///
/// The grid covers `width x height` world units starting at `(px, py)`,
/// split into `size_x x size_y` equal cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    #[serde(default = "default_refs")]
    pub max_refs_per_bin: usize,
    pub px: f32,
    pub py: f32,
    pub width: f32,
    pub height: f32,
    pub size_x: u32,
    pub size_y: u32,
}

fn default_refs() -> usize {
    DEFAULT_MAX_REFS_PER_BIN
}

impl GridSettings {
    /// Grid over a `width x height` screen anchored at the origin,
    /// with as many whole `bin_size` cells as fit.
    pub fn for_screen(width: f32, height: f32, bin_size: f32) -> Self {
        Self {
            max_refs_per_bin: DEFAULT_MAX_REFS_PER_BIN,
            px: 0.0,
            py: 0.0,
            width,
            height,
            size_x: (width / bin_size).floor().max(0.0) as u32,
            size_y: (height / bin_size).floor().max(0.0) as u32,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, px: f32, py: f32) -> Self {
        self.px = px;
        self.py = py;
        self
    }

    #[must_use]
    pub fn with_max_refs_per_bin(mut self, refs: usize) -> Self {
        self.max_refs_per_bin = refs;
        self
    }

    pub fn cell_count(&self) -> usize {
        self.size_x as usize * self.size_y as usize
    }

    pub fn validate(&self, name: &str) -> Result<(), CoreError> {
        if self.size_x == 0 || self.size_y == 0 {
            return Err(CoreError::ZeroCells {
                name: name.to_string(),
                size_x: self.size_x,
                size_y: self.size_y,
            });
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(CoreError::InvalidExtents {
                name: name.to_string(),
                width: self.width,
                height: self.height,
            });
        }
        if self.max_refs_per_bin == 0 {
            return Err(CoreError::ZeroBinCapacity {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CoreConfig::from_json(r#"{ "framerate": 30 }"#).unwrap();
        assert_eq!(config.framerate, 30);
        assert_eq!(config.free_delay_frames, DEFAULT_FREE_DELAY);
        assert_eq!(config.render_list_capacity, 128);
    }

    #[test]
    fn zero_framerate_fails_validation() {
        assert!(CoreConfig::from_json(r#"{ "framerate": 0 }"#).is_err());
    }

    #[test]
    fn screen_grid_uses_whole_bins() {
        let settings = GridSettings::for_screen(384.0, 544.0, DEFAULT_BIN_SIZE);
        assert_eq!((settings.size_x, settings.size_y), (12, 17));
        assert!(settings.validate("shots").is_ok());
    }

    #[test]
    fn tiny_screen_has_zero_cells() {
        let settings = GridSettings::for_screen(16.0, 16.0, 32.0);
        assert!(matches!(
            settings.validate("tiny"),
            Err(CoreError::ZeroCells { .. })
        ));
    }
}
