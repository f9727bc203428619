//! Entity definition record

use serde::{Deserialize, Serialize};

/// A folkloric archetype: the unit of classification.
///
/// Empty `affected_genders` / `affected_age_groups` mean the entity is not
/// gated on that attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Unique key (also the overlay asset prefix)
    pub id: String,
    pub name: String,
    pub culture: String,
    /// Ordered trait tags from the question vocabulary
    pub traits: Vec<String>,
    pub description: String,
    /// Ordered ritual steps shown after the result
    pub traditions: Vec<String>,
    pub references: Vec<String>,
    #[serde(default)]
    pub affected_genders: Vec<String>,
    #[serde(default)]
    pub affected_age_groups: Vec<String>,
}

impl EntityDefinition {
    /// Whether the entity declares `tag` among its traits
    pub fn has_trait(&self, tag: &str) -> bool {
        self.traits.iter().any(|t| t == tag)
    }
}
