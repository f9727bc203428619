//! Entity catalog
//!
//! The catalog is built once per session from the static seed list and is
//! read-only afterwards. Cloning shares the underlying storage.

mod model;
mod seed;

pub use model::EntityDefinition;
pub use seed::sample_entities;

use std::sync::Arc;

/// Immutable, process-wide set of entity definitions
#[derive(Debug, Clone)]
pub struct EntityCatalog {
    entities: Arc<[EntityDefinition]>,
}

impl EntityCatalog {
    pub fn new(entities: Vec<EntityDefinition>) -> Self {
        Self {
            entities: entities.into(),
        }
    }

    /// Catalog materialized from the shipped seed list
    pub fn from_seed() -> Self {
        Self::new(sample_entities())
    }

    /// All entities in catalog (seed) order
    pub fn all(&self) -> &[EntityDefinition] {
        &self.entities
    }

    pub fn get(&self, id: &str) -> Option<&EntityDefinition> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for EntityCatalog {
    fn default() -> Self {
        Self::from_seed()
    }
}
