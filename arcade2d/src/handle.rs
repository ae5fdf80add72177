use std::collections::HashMap;

use crate::error::CoreError;

/// Identifies one pool within a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(pub u16);

/// Generation-tagged reference to a pooled object.
///
/// Slots are recycled, so a handle only resolves while the slot's
/// generation still matches. A mismatch means "the thing I pointed at is gone".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    pub pool: PoolId,
    pub index: u32,
    pub generation: u32,
}

impl ObjectHandle {
    pub fn new(pool: PoolId, index: usize, generation: u32) -> Self {
        Self {
            pool,
            index: index as u32,
            generation,
        }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Hands out pool ids by unique name.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    names: HashMap<String, PoolId>,
    next: u16,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str) -> Result<PoolId, CoreError> {
        if self.names.contains_key(name) {
            return Err(CoreError::DuplicateName(name.to_string()));
        }
        let id = PoolId(self.next);
        self.next += 1;
        self.names.insert(name.to_string(), id);
        log::debug!("registered pool `{}` as {:?}", name, id);
        Ok(id)
    }

    pub fn get(&self, name: &str) -> Option<PoolId> {
        self.names.get(name).copied()
    }

    pub fn name_of(&self, id: PoolId) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, v)| **v == id)
            .map(|(k, _)| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_pool_names_fail() {
        let mut reg = PoolRegistry::new();
        let a = reg.register("enemies").unwrap();
        let b = reg.register("effects").unwrap();
        assert_ne!(a, b);
        assert_eq!(
            reg.register("enemies"),
            Err(CoreError::DuplicateName("enemies".into()))
        );
        assert_eq!(reg.get("effects"), Some(b));
        assert_eq!(reg.name_of(a), Some("enemies"));
    }
}
