//! Diagram structure synthesis.
//!
//! Turns the caller's [`CapabilityModel`] and UI-local [`ViewState`] into a
//! [`DiagramTree`]: the root, one first-row slot per populated category (or per
//! member for at-most-one categories), visible group children and visible
//! provider sub-nodes. The tree is rebuilt from scratch on every layout pass;
//! it owns only connectivity, never positions.
//!
//! # Node identities
//!
//! | Node            | Id                                            |
//! |-----------------|-----------------------------------------------|
//! | root            | the root entity id                            |
//! | group           | `group::<category>`                           |
//! | direct / child  | `<category>::<entity id>`                     |
//! | provider        | `<category>::<entity id>::provider::<type>`   |
//!
//! Member ids share their category prefix so collapsing a category can drop
//! every related overlay entry with a single prefix match.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use agentmap_core::{
    category::Category,
    entity::{CapabilityModel, Entity, EntityData, EntityType},
    identifier::Id,
};

/// Layout role of a node; decides its tier and its rendered size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Root,
    Group,
    Direct,
    Child,
    Provider,
}

impl NodeRole {
    /// Tier in the top-down layout: 0 root, 1 slots, 2 children, 3 providers.
    pub fn tier(self) -> usize {
        match self {
            NodeRole::Root => 0,
            NodeRole::Group | NodeRole::Direct => 1,
            NodeRole::Child => 2,
            NodeRole::Provider => 3,
        }
    }
}

/// Visual weight of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    /// Root to a group or a direct node.
    Primary,
    /// Group to child, or child to provider.
    Nested,
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    id: Id,
    source: Id,
    target: Id,
    style: EdgeStyle,
}

impl Edge {
    fn new(source: Id, target: Id, style: EdgeStyle) -> Self {
        Self {
            id: Id::new(&format!("{source}->{target}")),
            source,
            target,
            style,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn style(&self) -> EdgeStyle {
        self.style
    }
}

/// Which categories and children the user has expanded.
///
/// This is UI-local toggle state; the engine never persists it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    expanded_categories: HashSet<Category>,
    expanded_children: HashSet<Id>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`expand_category`](Self::expand_category).
    pub fn with_category(mut self, category: Category) -> Self {
        self.expand_category(category);
        self
    }

    /// Builder-style [`expand_child`](Self::expand_child).
    pub fn with_child(mut self, entity: impl Into<Id>) -> Self {
        self.expand_child(entity.into());
        self
    }

    pub fn expand_category(&mut self, category: Category) {
        self.expanded_categories.insert(category);
    }

    pub fn collapse_category(&mut self, category: Category) {
        self.expanded_categories.remove(&category);
    }

    /// Flips a category between expanded and collapsed; returns the new state.
    pub fn toggle_category(&mut self, category: Category) -> bool {
        if !self.expanded_categories.remove(&category) {
            self.expanded_categories.insert(category);
            return true;
        }
        false
    }

    /// Opens the provider section of the member entity with this id.
    pub fn expand_child(&mut self, entity: Id) {
        self.expanded_children.insert(entity);
    }

    pub fn collapse_child(&mut self, entity: Id) {
        self.expanded_children.remove(&entity);
    }

    pub fn is_category_expanded(&self, category: Category) -> bool {
        self.expanded_categories.contains(&category)
    }

    pub fn is_child_expanded(&self, entity: Id) -> bool {
        self.expanded_children.contains(&entity)
    }

    pub fn expanded_categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.expanded_categories.iter().copied()
    }

    pub fn expanded_children(&self) -> impl Iterator<Item = Id> + '_ {
        self.expanded_children.iter().copied()
    }
}

/// Id of the group node for a category.
pub fn group_id(category: Category) -> Id {
    Id::new("group").create_nested(Id::new(category.key()))
}

/// Id of a category member's node.
///
/// Entity ids never contain `::` (see [`CapabilityModel::attach`]), so member
/// ids cannot collide with provider sub-node ids.
pub fn member_id(category: Category, entity: Id) -> Id {
    Id::new(category.key()).create_nested(entity)
}

/// Prefix shared by every member and provider node of a category.
pub fn member_prefix(category: Category) -> String {
    format!("{}::", category.key())
}

/// Prefix shared by every provider sub-node of a member node.
pub fn provider_prefix(member_node: Id) -> String {
    format!("{member_node}::provider::")
}

fn provider_id(member_node: Id, provider_type: &str) -> Id {
    member_node
        .create_nested(Id::new("provider"))
        .create_nested(Id::new(provider_type))
}

/// A synthesized node before placement.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramNode {
    id: Id,
    role: NodeRole,
    data: EntityData,
}

impl DiagramNode {
    fn new(id: Id, role: NodeRole, data: EntityData) -> Self {
        Self { id, role, data }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }

    pub fn entity_type(&self) -> EntityType {
        self.data.entity_type()
    }

    /// Group nodes are anchored to their category; everything else may be dragged.
    pub fn is_draggable(&self) -> bool {
        self.role != NodeRole::Group
    }
}

/// A visible child of an expanded group with its visible providers.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    node: DiagramNode,
    providers: Vec<DiagramNode>,
}

impl Branch {
    pub fn node(&self) -> &DiagramNode {
        &self.node
    }

    pub fn providers(&self) -> &[DiagramNode] {
        &self.providers
    }
}

/// One first-row position: a group node or a direct node.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    category: Category,
    head: DiagramNode,
    children: Vec<Branch>,
}

impl Slot {
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn head(&self) -> &DiagramNode {
        &self.head
    }

    /// Visible children; empty unless this is an expanded group.
    pub fn children(&self) -> &[Branch] {
        &self.children
    }

    pub fn has_visible_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// The rooted tree of visible nodes for one layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramTree {
    root: DiagramNode,
    slots: Vec<Slot>,
}

impl DiagramTree {
    /// Synthesizes the visible tree from attachment and expansion state.
    ///
    /// Slots appear in canonical category order, members in attachment order.
    pub fn build(model: &CapabilityModel, view: &ViewState) -> Self {
        let root_entity = model.root();
        let root = DiagramNode::new(root_entity.id(), NodeRole::Root, root_entity.data().clone());

        let mut slots = Vec::new();
        for category in model.populated_categories() {
            let members = model.members(category);

            if category.renders_as_group() {
                let expanded = view.is_category_expanded(category);
                let head = DiagramNode::new(
                    group_id(category),
                    NodeRole::Group,
                    EntityData::CategoryGroup {
                        category,
                        count: members.len(),
                        expanded,
                        color: category.color(),
                    },
                );
                let children = if expanded {
                    members
                        .iter()
                        .map(|member| Self::branch(category, member, view))
                        .collect()
                } else {
                    Vec::new()
                };
                slots.push(Slot {
                    category,
                    head,
                    children,
                });
            } else {
                slots.extend(members.iter().map(|member| Slot {
                    category,
                    head: DiagramNode::new(
                        member_id(category, member.id()),
                        NodeRole::Direct,
                        member.data().clone(),
                    ),
                    children: Vec::new(),
                }));
            }
        }

        Self { root, slots }
    }

    fn branch(category: Category, member: &Entity, view: &ViewState) -> Branch {
        let node_id = member_id(category, member.id());
        let node = DiagramNode::new(node_id, NodeRole::Child, member.data().clone());

        let providers = if view.is_child_expanded(member.id()) {
            // One sub-node per provider type; a repeated type replaces the earlier declaration.
            let mut by_type = IndexMap::new();
            for provider in member.data().providers() {
                if by_type
                    .insert(provider.provider_type.as_str(), provider)
                    .is_some()
                {
                    warn!(
                        member:% = member.id(),
                        provider_type = provider.provider_type.as_str();
                        "Duplicate provider type on member, keeping the last declaration"
                    );
                }
            }
            by_type
                .into_iter()
                .map(|(provider_type, provider)| {
                    DiagramNode::new(
                        provider_id(node_id, provider_type),
                        NodeRole::Provider,
                        EntityData::SkillProvider {
                            provider_type: provider.provider_type.clone(),
                            name: provider.name.clone(),
                        },
                    )
                })
                .collect()
        } else {
            Vec::new()
        };

        Branch { node, providers }
    }

    pub fn root(&self) -> &DiagramNode {
        &self.root
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Every node in deterministic order: root, then each slot's head,
    /// children and providers.
    pub fn nodes(&self) -> impl Iterator<Item = &DiagramNode> + '_ {
        std::iter::once(&self.root).chain(self.slots.iter().flat_map(|slot| {
            std::iter::once(&slot.head).chain(
                slot.children
                    .iter()
                    .flat_map(|branch| std::iter::once(&branch.node).chain(&branch.providers)),
            )
        }))
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Ids of every node in the tree.
    pub fn node_ids(&self) -> HashSet<Id> {
        self.nodes().map(DiagramNode::id).collect()
    }

    /// Finds a node by id.
    pub fn node(&self, id: Id) -> Option<&DiagramNode> {
        self.nodes().find(|node| node.id == id)
    }

    /// Connectivity of the tree: one primary edge per slot, one nested edge
    /// per visible child and provider.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for slot in &self.slots {
            edges.push(Edge::new(self.root.id, slot.head.id, EdgeStyle::Primary));
            for branch in &slot.children {
                edges.push(Edge::new(slot.head.id, branch.node.id, EdgeStyle::Nested));
                for provider in &branch.providers {
                    edges.push(Edge::new(branch.node.id, provider.id, EdgeStyle::Nested));
                }
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use agentmap_core::entity::Provider;

    use super::*;

    fn model() -> CapabilityModel {
        CapabilityModel::new(Entity::new(
            "agent",
            EntityData::Agent {
                name: "Agent".to_string(),
                model: None,
            },
        ))
        .with(Entity::new(
            "friendly",
            EntityData::Persona {
                name: "Friendly".to_string(),
                tone: None,
            },
        ))
        .with(skill("search", &["bing", "google"]))
        .with(skill("calendar", &[]))
        .with(Entity::new(
            "vault",
            EntityData::SecurityProfile {
                name: "Strict".to_string(),
                level: "high".to_string(),
            },
        ))
    }

    fn skill(id: &str, providers: &[&str]) -> Entity {
        Entity::new(
            id,
            EntityData::Skill {
                name: id.to_string(),
                skill_type: "builtin".to_string(),
                providers: providers.iter().map(|p| Provider::new(*p, *p)).collect(),
            },
        )
    }

    fn ids(tree: &DiagramTree) -> Vec<String> {
        tree.nodes().map(|n| n.id().to_string()).collect()
    }

    #[test]
    fn test_collapsed_group_has_no_children() {
        let tree = DiagramTree::build(&model(), &ViewState::new());

        assert_eq!(
            ids(&tree),
            vec!["agent", "persona::friendly", "group::skills", "security::vault"]
        );
        let group = tree.node(group_id(Category::Skills)).unwrap();
        assert_eq!(
            group.data(),
            &EntityData::CategoryGroup {
                category: Category::Skills,
                count: 2,
                expanded: false,
                color: Category::Skills.color(),
            }
        );
        assert!(!group.is_draggable());
        assert!(tree.edges().iter().all(|e| e.style() == EdgeStyle::Primary));
    }

    #[test]
    fn test_expanded_group_lists_members() {
        let view = ViewState::new().with_category(Category::Skills);
        let tree = DiagramTree::build(&model(), &view);

        let skills_slot = &tree.slots()[1];
        assert_eq!(skills_slot.category(), Category::Skills);
        assert_eq!(skills_slot.children().len(), 2);
        assert!(skills_slot.children()[0].providers().is_empty());

        let nested: Vec<_> = tree
            .edges()
            .into_iter()
            .filter(|e| e.style() == EdgeStyle::Nested)
            .map(|e| e.target().to_string())
            .collect();
        assert_eq!(nested, vec!["skills::search", "skills::calendar"]);
    }

    #[test]
    fn test_expanded_child_shows_providers() {
        let view = ViewState::new()
            .with_category(Category::Skills)
            .with_child("search");
        let tree = DiagramTree::build(&model(), &view);

        let search = &tree.slots()[1].children()[0];
        let provider_ids: Vec<_> = search
            .providers()
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        assert_eq!(
            provider_ids,
            vec![
                "skills::search::provider::bing",
                "skills::search::provider::google"
            ]
        );
        assert!(search.providers().iter().all(DiagramNode::is_draggable));
        assert!(
            tree.node(Id::new("skills::search::provider::bing"))
                .unwrap()
                .id()
                .starts_with(&provider_prefix(search.node().id()))
        );
    }

    #[test]
    fn test_providers_hidden_while_group_collapsed() {
        let view = ViewState::new().with_child("search");
        let tree = DiagramTree::build(&model(), &view);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_duplicate_provider_type_keeps_last_declaration() {
        let dup = Entity::new(
            "search",
            EntityData::Skill {
                name: "search".to_string(),
                skill_type: "builtin".to_string(),
                providers: vec![Provider::new("bing", "Old"), Provider::new("bing", "New")],
            },
        );
        let model = model().with(dup);
        let view = ViewState::new()
            .with_category(Category::Skills)
            .with_child("search");
        let tree = DiagramTree::build(&model, &view);

        let providers = tree.slots()[1].children()[0].providers();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].data().label(), "New");
    }

    #[test]
    fn test_expanded_empty_category_renders_nothing() {
        let view = ViewState::new().with_category(Category::Tools);
        let tree = DiagramTree::build(&model(), &view);
        assert!(tree.node(group_id(Category::Tools)).is_none());
    }

    #[test]
    fn test_direct_category_with_extra_members_gets_one_slot_each() {
        let model = model().with(Entity::new(
            "formal",
            EntityData::Persona {
                name: "Formal".to_string(),
                tone: None,
            },
        ));
        let tree = DiagramTree::build(&model, &ViewState::new());
        let personas = tree
            .slots()
            .iter()
            .filter(|s| s.category() == Category::Persona)
            .count();
        assert_eq!(personas, 2);
    }

    #[test]
    fn test_toggle_category() {
        let mut view = ViewState::new();
        assert!(view.toggle_category(Category::Tools));
        assert!(view.is_category_expanded(Category::Tools));
        assert!(!view.toggle_category(Category::Tools));
        assert!(!view.is_category_expanded(Category::Tools));
    }

    #[test]
    fn test_member_prefix_matches_members_and_providers() {
        let prefix = member_prefix(Category::Skills);
        let member = member_id(Category::Skills, Id::new("search"));
        assert!(member.starts_with(&prefix));
        assert!(provider_id(member, "bing").starts_with(&prefix));
        assert!(!group_id(Category::Skills).starts_with(&prefix));
    }

    #[test]
    fn test_node_ids_stay_unique() {
        let model = model().with(skill("search::provider::bing", &[]));
        let view = ViewState::new()
            .with_category(Category::Skills)
            .with_child("search");
        let tree = DiagramTree::build(&model, &view);

        let ids = ids(&tree);
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(tree.node_count(), ids.len());
    }
}
