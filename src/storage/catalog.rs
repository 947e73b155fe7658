use crate::core::{DbError, EntityDescriptor, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Schema catalog: entity name -> descriptor.
///
/// Immutable once built; cloning shares the underlying map.
#[derive(Debug, Clone)]
pub struct Catalog {
    entities: Arc<HashMap<String, Arc<EntityDescriptor>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            entities: Arc::new(HashMap::new()),
        }
    }

    /// Add an entity, returning a NEW catalog (copy-on-write).
    pub fn with_entity(self, descriptor: EntityDescriptor) -> Result<Self> {
        let name = descriptor.name().to_string();

        if self.entities.contains_key(&name) {
            return Err(DbError::TableExists(name));
        }

        let mut entities = (*self.entities).clone();
        entities.insert(name, Arc::new(descriptor));

        Ok(Self {
            entities: Arc::new(entities),
        })
    }

    /// Descriptor of `name`; unknown entities are an infrastructure fault.
    pub fn attributes_of(&self, name: &str) -> Result<Arc<EntityDescriptor>> {
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn list_entities(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<EntityDescriptor>> {
        self.entities.values()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
