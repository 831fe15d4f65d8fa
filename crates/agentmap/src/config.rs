//! Configuration types for capability diagram layout.
//!
//! Every spacing, size and radius the layout strategies use lives here rather
//! than in the algorithms, so tests can drive the engines with controlled
//! dimensions. All types implement [`serde::Deserialize`] with per-field
//! defaults, so partial configuration files are accepted.
//!
//! # Overview
//!
//! - [`LayoutConfig`] - Top-level configuration combining every section.
//! - [`NodeSizes`] - Rendered node dimensions per [`NodeRole`].
//! - [`TreeConfig`] - Gaps and tier spacing for the tiered tree strategy.
//! - [`RadialConfig`] - Radii, ring cap and sectors for the radial strategy.
//!
//! # Example
//!
//! ```
//! # use agentmap::config::LayoutConfig;
//! let config = LayoutConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.tree().section_gap(), 80.0);
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use agentmap_core::{
    category::{Category, Sector},
    geometry::{Point, Size},
};

use crate::{error::AgentMapError, layout::Strategy, structure::NodeRole};

/// Top-level layout configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LayoutConfig {
    /// Primary layout strategy.
    #[serde(default)]
    strategy: Strategy,

    /// Node dimensions section.
    #[serde(default)]
    sizes: NodeSizes,

    /// Tiered tree strategy section.
    #[serde(default)]
    tree: TreeConfig,

    /// Radial strategy section.
    #[serde(default)]
    radial: RadialConfig,
}

impl LayoutConfig {
    /// Creates a configuration with default values for every section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary layout strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the node dimensions
    pub fn with_sizes(mut self, sizes: NodeSizes) -> Self {
        self.sizes = sizes;
        self
    }

    /// Set the tiered tree settings
    pub fn with_tree(mut self, tree: TreeConfig) -> Self {
        self.tree = tree;
        self
    }

    /// Set the radial settings
    pub fn with_radial(mut self, radial: RadialConfig) -> Self {
        self.radial = radial;
        self
    }

    /// Returns the primary [`Strategy`].
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns the node dimensions.
    pub fn sizes(&self) -> &NodeSizes {
        &self.sizes
    }

    /// Returns the tiered tree settings.
    pub fn tree(&self) -> &TreeConfig {
        &self.tree
    }

    /// Returns the radial settings.
    pub fn radial(&self) -> &RadialConfig {
        &self.radial
    }

    /// Checks every section for values no layout can be computed from.
    ///
    /// # Errors
    ///
    /// Returns [`AgentMapError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), AgentMapError> {
        self.sizes.validate()?;
        self.tree.validate()?;
        self.radial.validate()
    }
}

/// Rendered node dimensions keyed by [`NodeRole`].
///
/// Roles missing from the table use the `fallback` size. Setting `roles` in a
/// configuration file replaces the whole table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeSizes {
    roles: IndexMap<NodeRole, Size>,
    fallback: Size,
}

impl Default for NodeSizes {
    fn default() -> Self {
        let roles = IndexMap::from([
            (NodeRole::Root, Size::new(240.0, 80.0)),
            (NodeRole::Group, Size::new(200.0, 64.0)),
            (NodeRole::Direct, Size::new(200.0, 64.0)),
            (NodeRole::Child, Size::new(180.0, 56.0)),
            (NodeRole::Provider, Size::new(150.0, 44.0)),
        ]);
        Self {
            roles,
            fallback: Size::new(180.0, 60.0),
        }
    }
}

impl NodeSizes {
    /// A table with no per-role entries; every node uses `fallback`.
    pub fn uniform(fallback: Size) -> Self {
        Self {
            roles: IndexMap::new(),
            fallback,
        }
    }

    /// Set the size used for one role
    pub fn with_role(mut self, role: NodeRole, size: Size) -> Self {
        self.roles.insert(role, size);
        self
    }

    /// Size of a node with the given role.
    pub fn size_of(&self, role: NodeRole) -> Size {
        self.roles.get(&role).copied().unwrap_or(self.fallback)
    }

    pub(crate) fn validate(&self) -> Result<(), AgentMapError> {
        if !self.fallback.is_positive() {
            return Err(AgentMapError::Config(format!(
                "fallback node size must be positive, got {:?}",
                self.fallback
            )));
        }
        for (role, size) in &self.roles {
            if !size.is_positive() {
                return Err(AgentMapError::Config(format!(
                    "size for {role:?} nodes must be positive, got {size:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Spacing for the tiered tree strategy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Gap between adjacent first-row slots when neither shows children.
    node_gap: f32,
    /// Gap between adjacent first-row slots when either shows children.
    section_gap: f32,
    /// Gap between sibling children of one group.
    child_gap: f32,
    /// Gap between provider sub-nodes of one skill.
    provider_gap: f32,
    /// Vertical distance from the root to the first row.
    root_to_slots: f32,
    /// Vertical distance from the first row to expanded group children.
    slots_to_children: f32,
    /// Vertical distance from children to their provider sub-nodes.
    children_to_providers: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            node_gap: 40.0,
            section_gap: 80.0,
            child_gap: 24.0,
            provider_gap: 16.0,
            root_to_slots: 160.0,
            slots_to_children: 140.0,
            children_to_providers: 110.0,
        }
    }
}

impl TreeConfig {
    pub fn with_node_gap(mut self, gap: f32) -> Self {
        self.node_gap = gap;
        self
    }

    pub fn with_section_gap(mut self, gap: f32) -> Self {
        self.section_gap = gap;
        self
    }

    pub fn with_child_gap(mut self, gap: f32) -> Self {
        self.child_gap = gap;
        self
    }

    pub fn with_provider_gap(mut self, gap: f32) -> Self {
        self.provider_gap = gap;
        self
    }

    /// Set the three vertical tier distances at once
    pub fn with_tier_spacing(
        mut self,
        root_to_slots: f32,
        slots_to_children: f32,
        children_to_providers: f32,
    ) -> Self {
        self.root_to_slots = root_to_slots;
        self.slots_to_children = slots_to_children;
        self.children_to_providers = children_to_providers;
        self
    }

    pub fn node_gap(&self) -> f32 {
        self.node_gap
    }

    pub fn section_gap(&self) -> f32 {
        self.section_gap
    }

    pub fn child_gap(&self) -> f32 {
        self.child_gap
    }

    pub fn provider_gap(&self) -> f32 {
        self.provider_gap
    }

    pub fn root_to_slots(&self) -> f32 {
        self.root_to_slots
    }

    pub fn slots_to_children(&self) -> f32 {
        self.slots_to_children
    }

    pub fn children_to_providers(&self) -> f32 {
        self.children_to_providers
    }

    pub(crate) fn validate(&self) -> Result<(), AgentMapError> {
        let fields = [
            ("node_gap", self.node_gap),
            ("section_gap", self.section_gap),
            ("child_gap", self.child_gap),
            ("provider_gap", self.provider_gap),
            ("root_to_slots", self.root_to_slots),
            ("slots_to_children", self.slots_to_children),
            ("children_to_providers", self.children_to_providers),
        ];
        check_non_negative("tree", &fields)
    }
}

/// Radii, ring cap and sectors for the radial strategy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RadialConfig {
    /// Position of the root node.
    center: Point,
    /// Radius of the first ring.
    inner_radius: f32,
    /// Radius of the overflow ring.
    outer_radius: f32,
    /// Maximum members per category on the first ring.
    ring_cap: usize,
    /// Minimum radius of the circle of children around an expanded group.
    child_radius: f32,
    /// Minimum radius of the circle of providers around an expanded skill.
    provider_radius: f32,
    /// Per-category sector overrides.
    sectors: IndexMap<Category, Sector>,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            center: Point::default(),
            inner_radius: 280.0,
            outer_radius: 440.0,
            ring_cap: 6,
            child_radius: 150.0,
            provider_radius: 90.0,
            sectors: IndexMap::new(),
        }
    }
}

impl RadialConfig {
    pub fn with_center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    /// Set the first and overflow ring radii
    pub fn with_radii(mut self, inner: f32, outer: f32) -> Self {
        self.inner_radius = inner;
        self.outer_radius = outer;
        self
    }

    pub fn with_ring_cap(mut self, cap: usize) -> Self {
        self.ring_cap = cap;
        self
    }

    pub fn with_child_radius(mut self, radius: f32) -> Self {
        self.child_radius = radius;
        self
    }

    pub fn with_provider_radius(mut self, radius: f32) -> Self {
        self.provider_radius = radius;
        self
    }

    /// Override the sector of one category
    pub fn with_sector(mut self, category: Category, sector: Sector) -> Self {
        self.sectors.insert(category, sector);
        self
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn inner_radius(&self) -> f32 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f32 {
        self.outer_radius
    }

    /// Ring cap, never less than one.
    pub fn ring_cap(&self) -> usize {
        self.ring_cap.max(1)
    }

    pub fn child_radius(&self) -> f32 {
        self.child_radius
    }

    pub fn provider_radius(&self) -> f32 {
        self.provider_radius
    }

    /// Sector assigned to a category, falling back to its default sector.
    pub fn sector(&self, category: Category) -> Sector {
        self.sectors
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_sector())
    }

    pub(crate) fn validate(&self) -> Result<(), AgentMapError> {
        if !self.center.is_finite() {
            return Err(AgentMapError::Config(format!(
                "radial.center must be finite, got {:?}",
                self.center
            )));
        }
        let fields = [
            ("inner_radius", self.inner_radius),
            ("outer_radius", self.outer_radius),
            ("child_radius", self.child_radius),
            ("provider_radius", self.provider_radius),
        ];
        check_non_negative("radial", &fields)?;
        if self.outer_radius < self.inner_radius {
            return Err(AgentMapError::Config(format!(
                "radial.outer_radius ({}) must not be smaller than radial.inner_radius ({})",
                self.outer_radius, self.inner_radius
            )));
        }
        for (category, sector) in &self.sectors {
            if !sector.start().is_finite() || !sector.end().is_finite() {
                return Err(AgentMapError::Config(format!(
                    "radial sector for {category} must be finite"
                )));
            }
        }
        Ok(())
    }
}

fn check_non_negative(section: &str, fields: &[(&str, f32)]) -> Result<(), AgentMapError> {
    for (name, value) in fields {
        if !value.is_finite() || *value < 0.0 {
            return Err(AgentMapError::Config(format!(
                "{section}.{name} must be a finite, non-negative number, got {value}"
            )));
        }
    }
    Ok(())
}
