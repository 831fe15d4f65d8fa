//! Structural fingerprint of a layout pass.
//!
//! A [`Fingerprint`] summarizes everything that changes the shape of the
//! diagram: the root, the members of every category (and the provider types of
//! each member), the expansion state and an explicit layout version counter.
//! Re-renders that leave it unchanged reuse the published layout, which keeps
//! node positions stable.

use std::{
    collections::{BTreeSet, hash_map::DefaultHasher},
    hash::{Hash, Hasher},
};

use agentmap_core::{category::Category, entity::CapabilityModel, identifier::Id};

use crate::structure::ViewState;

/// A member's contribution to the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct MemberKey {
    id: String,
    provider_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    root: Id,
    members: Vec<(Category, Vec<MemberKey>)>,
    expanded_categories: BTreeSet<Category>,
    expanded_children: BTreeSet<String>,
    layout_version: u64,
}

impl Fingerprint {
    /// Derives the fingerprint of the given structural state.
    pub fn new(model: &CapabilityModel, view: &ViewState, layout_version: u64) -> Self {
        let members = model
            .populated_categories()
            .map(|category| {
                let mut keys: Vec<MemberKey> = model
                    .members(category)
                    .iter()
                    .map(|member| {
                        let mut provider_types: Vec<String> = member
                            .data()
                            .providers()
                            .iter()
                            .map(|p| p.provider_type.clone())
                            .collect();
                        provider_types.sort();
                        MemberKey {
                            id: member.id().to_string(),
                            provider_types,
                        }
                    })
                    .collect();
                keys.sort();
                (category, keys)
            })
            .collect();

        Self {
            root: model.root().id(),
            members,
            expanded_categories: view.expanded_categories().collect(),
            expanded_children: view.expanded_children().map(|id| id.to_string()).collect(),
            layout_version,
        }
    }

    pub fn root(&self) -> Id {
        self.root
    }

    /// Categories expanded in exactly one of the two fingerprints.
    pub fn toggled_categories(&self, previous: &Fingerprint) -> Vec<Category> {
        self.expanded_categories
            .symmetric_difference(&previous.expanded_categories)
            .copied()
            .collect()
    }

    /// Member entity ids whose provider section is expanded in exactly one of
    /// the two fingerprints.
    pub fn toggled_children(&self, previous: &Fingerprint) -> Vec<Id> {
        self.expanded_children
            .symmetric_difference(&previous.expanded_children)
            .map(|id| Id::new(id))
            .collect()
    }

    /// Compact hash of the fingerprint for diagnostics.
    pub fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
