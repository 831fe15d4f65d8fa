//! Entity model: the agent and its attached capabilities.
//!
//! Entities are recreated by the caller for every layout pass from its own
//! attachment state. Each entity carries a type-specific payload expressed as
//! the tagged [`EntityData`] enum, so a skill can never carry a channel's
//! platform and a group can never lack its category.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{category::Category, color::Color, identifier::Id};

/// The closed set of entity type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Agent,
    Persona,
    Channel,
    Skill,
    SkillProvider,
    Tool,
    SecurityProfile,
    KnowledgeDocument,
    MemorySettings,
    CategoryGroup,
}

/// An integration provider declared by a skill, rendered as a sub-node of
/// the skill when its provider section is expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub provider_type: String,
    pub name: String,
}

impl Provider {
    pub fn new(provider_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            name: name.into(),
        }
    }
}

/// Type-specific payload of an entity, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityData {
    Agent {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
    Persona {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tone: Option<String>,
    },
    Channel {
        name: String,
        platform: String,
    },
    Skill {
        name: String,
        skill_type: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        providers: Vec<Provider>,
    },
    SkillProvider {
        provider_type: String,
        name: String,
    },
    Tool {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    SecurityProfile {
        name: String,
        level: String,
    },
    KnowledgeDocument {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    MemorySettings {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        window: Option<u32>,
    },
    CategoryGroup {
        category: Category,
        count: usize,
        expanded: bool,
        /// Accent of the category, for the host to style the group and its edges.
        color: Color,
    },
}

impl EntityData {
    /// Returns the bare type tag of this payload.
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityData::Agent { .. } => EntityType::Agent,
            EntityData::Persona { .. } => EntityType::Persona,
            EntityData::Channel { .. } => EntityType::Channel,
            EntityData::Skill { .. } => EntityType::Skill,
            EntityData::SkillProvider { .. } => EntityType::SkillProvider,
            EntityData::Tool { .. } => EntityType::Tool,
            EntityData::SecurityProfile { .. } => EntityType::SecurityProfile,
            EntityData::KnowledgeDocument { .. } => EntityType::KnowledgeDocument,
            EntityData::MemorySettings { .. } => EntityType::MemorySettings,
            EntityData::CategoryGroup { .. } => EntityType::CategoryGroup,
        }
    }

    /// Display text for the node.
    pub fn label(&self) -> &str {
        match self {
            EntityData::Agent { name, .. }
            | EntityData::Persona { name, .. }
            | EntityData::Channel { name, .. }
            | EntityData::Skill { name, .. }
            | EntityData::SkillProvider { name, .. }
            | EntityData::Tool { name, .. }
            | EntityData::SecurityProfile { name, .. }
            | EntityData::MemorySettings { name, .. } => name,
            EntityData::KnowledgeDocument { title, .. } => title,
            EntityData::CategoryGroup { category, .. } => category.label(),
        }
    }

    /// Providers declared by a skill; empty for every other payload.
    pub fn providers(&self) -> &[Provider] {
        match self {
            EntityData::Skill { providers, .. } => providers,
            _ => &[],
        }
    }
}

/// An attached capability instance (or the agent itself).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: Id,
    #[serde(flatten)]
    data: EntityData,
}

impl Entity {
    pub fn new(id: impl Into<Id>, data: EntityData) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }

    pub fn entity_type(&self) -> EntityType {
        self.data.entity_type()
    }

    /// Category this entity belongs to, if it is an attachable capability.
    pub fn category(&self) -> Option<Category> {
        Category::classify(self.entity_type())
    }
}

/// The root entity together with its attached members, grouped by category.
///
/// Members keep their attachment order within a category. Cardinality
/// violations are logged but tolerated so that degenerate input still renders.
///
/// # Examples
///
/// ```
/// use agentmap_core::{
///     category::Category,
///     entity::{CapabilityModel, Entity, EntityData},
/// };
///
/// let agent = Entity::new("agent-1", EntityData::Agent { name: "Support".into(), model: None });
/// let mut model = CapabilityModel::new(agent);
///
/// let tool = Entity::new("http", EntityData::Tool { name: "HTTP".into(), description: None });
/// assert!(model.attach(tool));
/// assert_eq!(model.members(Category::Tools).len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityModel {
    root: Entity,
    members: BTreeMap<Category, Vec<Entity>>,
}

impl CapabilityModel {
    /// Creates a model with no attached capabilities.
    pub fn new(root: Entity) -> Self {
        if root.entity_type() != EntityType::Agent {
            warn!(root:% = root.id(), entity_type:? = root.entity_type(); "Root entity is not an agent");
        }
        Self {
            root,
            members: BTreeMap::new(),
        }
    }

    /// Builder-style [`attach`](Self::attach).
    pub fn with(mut self, entity: Entity) -> Self {
        self.attach(entity);
        self
    }

    /// Attaches an entity to its category.
    ///
    /// Returns `false` (and ignores the entity) when its type has no category
    /// or its id contains `::`, the separator of diagram node ids. An entity
    /// whose id is already attached in the same category replaces the earlier
    /// one in place.
    pub fn attach(&mut self, entity: Entity) -> bool {
        if entity.id().is_nested() {
            warn!(id:% = entity.id(); "Ignoring entity whose id contains the node id separator");
            return false;
        }
        let Some(category) = entity.category() else {
            warn!(
                id:% = entity.id(),
                entity_type:? = entity.entity_type();
                "Ignoring entity that does not belong to a capability category"
            );
            return false;
        };

        let members = self.members.entry(category).or_default();
        if let Some(existing) = members.iter_mut().find(|m| m.id() == entity.id()) {
            *existing = entity;
        } else {
            members.push(entity);
        }

        let count = members.len();
        if !category.cardinality().allows(count) {
            warn!(category:% = category, count = count; "Category holds more members than its cardinality allows");
        }
        true
    }

    /// Detaches the entity with the given id, returning it if it was attached.
    pub fn detach(&mut self, id: Id) -> Option<Entity> {
        for members in self.members.values_mut() {
            if let Some(pos) = members.iter().position(|m| m.id() == id) {
                return Some(members.remove(pos));
            }
        }
        None
    }

    pub fn root(&self) -> &Entity {
        &self.root
    }

    /// Members of a category in attachment order.
    pub fn members(&self, category: Category) -> &[Entity] {
        self.members
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Categories that currently have at least one member, in canonical order.
    pub fn populated_categories(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL
            .into_iter()
            .filter(|category| !self.members(*category).is_empty())
    }

    /// Total number of attached members across all categories.
    pub fn member_count(&self) -> usize {
        self.members.values().map(Vec::len).sum()
    }
}
