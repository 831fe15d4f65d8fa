//! Layout of capability diagrams.
//!
//! This module turns a [`DiagramTree`] into positioned nodes. Strategies
//! produce a raw [`Placement`]; the session merges it with the overlay into a
//! published [`Layout`].
//!
//! # Pipeline Position
//!
//! ```text
//! CapabilityModel + ViewState
//!     ↓ structure
//! DiagramTree
//!     ↓ layout engines (this module)
//! Placement
//!     ↓ overlay merge (session)
//! Layout { nodes, edges }
//! ```
//!
//! # Submodules
//!
//! - [`engines`] - The [`LayoutEngine`] trait with the tiered and radial strategies
//! - [`positioning`] - Reusable row and angular distribution helpers

pub mod engines;
pub mod positioning;

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use agentmap_core::{
    entity::{EntityData, EntityType},
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

use crate::{
    config::NodeSizes,
    structure::{DiagramNode, DiagramTree, Edge, NodeRole},
};

pub use engines::{EngineBuilder, LayoutEngine};

/// Available layout strategies.
///
/// The names match external configuration strings (snake_case).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Tiered top-down tree (default)
    #[default]
    Tree,
    /// Category sectors on concentric rings around the root
    Radial,
}

impl FromStr for Strategy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tree" => Ok(Self::Tree),
            "radial" => Ok(Self::Radial),
            _ => Err("Unsupported layout strategy"),
        }
    }
}

impl From<Strategy> for &'static str {
    fn from(val: Strategy) -> Self {
        match val {
            Strategy::Tree => "tree",
            Strategy::Radial => "radial",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Raw node centers computed by a strategy, in tree order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    positions: IndexMap<Id, Point>,
}

impl Placement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: Id, position: Point) {
        self.positions.insert(id, position);
    }

    pub fn position(&self, id: Id) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, Point)> + '_ {
        self.positions.iter().map(|(id, point)| (*id, *point))
    }

    /// Returns the first node of `tree` that has no finite position, if any.
    pub fn first_unplaced(&self, tree: &DiagramTree) -> Option<Id> {
        tree.nodes()
            .map(DiagramNode::id)
            .find(|id| !self.position(*id).is_some_and(Point::is_finite))
    }
}

/// A positioned node as handed to the rendering host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    id: Id,
    #[serde(rename = "type")]
    node_type: EntityType,
    role: NodeRole,
    position: Point,
    size: Size,
    draggable: bool,
    data: EntityData,
}

impl LayoutNode {
    pub(crate) fn new(node: &DiagramNode, position: Point, size: Size) -> Self {
        Self {
            id: node.id(),
            node_type: node.entity_type(),
            role: node.role(),
            position,
            size,
            draggable: node.is_draggable(),
            data: node.data().clone(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn node_type(&self) -> EntityType {
        self.node_type
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Center of the node.
    pub fn position(&self) -> Point {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        self.position.to_bounds(self.size)
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }
}

/// The published result of a layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    nodes: Vec<LayoutNode>,
    edges: Vec<Edge>,
    #[serde(skip)]
    strategy: Strategy,
    #[serde(skip)]
    fallback: bool,
    #[serde(skip)]
    version: u64,
}

impl Layout {
    /// Combines a tree, its placement and node sizes into positioned nodes.
    ///
    /// Nodes the placement does not cover are placed at the origin; callers
    /// check coverage with [`Placement::first_unplaced`] beforehand.
    pub(crate) fn assemble(
        tree: &DiagramTree,
        placement: &Placement,
        sizes: &NodeSizes,
        strategy: Strategy,
    ) -> Self {
        let nodes = tree
            .nodes()
            .map(|node| {
                let position = placement.position(node.id()).unwrap_or_default();
                LayoutNode::new(node, position, sizes.size_of(node.role()))
            })
            .collect();

        Self {
            nodes,
            edges: tree.edges(),
            strategy,
            fallback: false,
            version: 0,
        }
    }

    pub(crate) fn mark_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    pub(crate) fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [LayoutNode] {
        &mut self.nodes
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: Id) -> Option<&LayoutNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub(crate) fn node_mut(&mut self, id: Id) -> Option<&mut LayoutNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    /// The single tier-0 node, if this layout has been computed.
    pub fn root(&self) -> Option<&LayoutNode> {
        self.nodes.iter().find(|node| node.role == NodeRole::Root)
    }

    /// Strategy that produced the positions.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// True when the primary strategy failed and the radial fallback was used.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Request version this layout was published for.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Bounding box of every node, or `None` for an empty layout.
    pub fn bounds(&self) -> Option<Bounds> {
        self.nodes
            .iter()
            .map(LayoutNode::bounds)
            .reduce(|acc, bounds| acc.merge(&bounds))
    }
}
