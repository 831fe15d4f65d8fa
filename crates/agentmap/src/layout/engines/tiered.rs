//! Tiered tree layout engine
//!
//! Deterministic top-down placement: the root on tier 0, one slot per
//! category head on tier 1, expanded group children on tier 2 and provider
//! sub-nodes on tier 3.
//!
//! Widths are computed bottom-up. A child's cell is as wide as the child or
//! its provider row, whichever is wider; a slot is as wide as its head or its
//! row of child cells. Slots are then laid out left to right, pinned
//! categories first, and the root is centered over the whole row. Tier
//! heights are fixed per tier pair and never depend on horizontal content.

use log::trace;

use agentmap_core::{
    geometry::{Point, Size},
    identifier::Id,
};

use crate::{
    config::{NodeSizes, TreeConfig},
    error::AgentMapError,
    layout::{
        Placement,
        engines::LayoutEngine,
        positioning::{distribute_horizontally, row_width},
    },
    structure::{Branch, DiagramTree, NodeRole, Slot},
};

/// Horizontal allocation of one tier-1 slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotExtent {
    head: Id,
    center: f32,
    width: f32,
}

impl SlotExtent {
    /// Id of the group or direct node heading the slot.
    pub fn head(&self) -> Id {
        self.head
    }

    pub fn center(&self) -> f32 {
        self.center
    }

    /// Allocated width, at least the head's width and its children's row.
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn min_x(&self) -> f32 {
        self.center - self.width / 2.0
    }

    pub fn max_x(&self) -> f32 {
        self.center + self.width / 2.0
    }
}

/// Tiered tree layout engine
#[derive(Default)]
pub struct Engine {
    spacing: TreeConfig,
    sizes: NodeSizes,
}

impl Engine {
    /// Create a new tiered engine with default spacing and sizes
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gaps and tier distances
    pub fn set_spacing(&mut self, spacing: TreeConfig) -> &mut Self {
        self.spacing = spacing;
        self
    }

    /// Set the node dimensions
    pub fn set_sizes(&mut self, sizes: NodeSizes) -> &mut Self {
        self.sizes = sizes;
        self
    }

    /// Tier-1 slots in their left-to-right placement order.
    ///
    /// Left-pinned categories come first, then centered ones, then
    /// right-pinned ones. The sort is stable, so within a pin class slots keep
    /// their canonical category order.
    pub fn ordered_slots<'a>(&self, tree: &'a DiagramTree) -> Vec<&'a Slot> {
        let mut slots: Vec<&Slot> = tree.slots().iter().collect();
        slots.sort_by_key(|slot| slot.category().pin());
        slots
    }

    /// Horizontal extent of every tier-1 slot, in placement order.
    ///
    /// # Errors
    ///
    /// Returns [`AgentMapError::Layout`] when the configuration is invalid.
    pub fn slot_extents(&self, tree: &DiagramTree) -> Result<Vec<SlotExtent>, AgentMapError> {
        self.check_config()?;
        Ok(self.extents(&self.ordered_slots(tree)))
    }

    fn check_config(&self) -> Result<(), AgentMapError> {
        self.spacing
            .validate()
            .and_then(|()| self.sizes.validate())
            .map_err(|err| AgentMapError::Layout(format!("cannot place tree: {err}")))
    }

    fn extents(&self, slots: &[&Slot]) -> Vec<SlotExtent> {
        let slot_sizes: Vec<Size> = slots
            .iter()
            .map(|slot| {
                let head = self.sizes.size_of(slot.head().role());
                Size::new(head.width().max(self.children_width(slot)), head.height())
            })
            .collect();

        let section_gaps: Vec<f32> = slots
            .windows(2)
            .map(|pair| {
                if pair[0].has_visible_children() || pair[1].has_visible_children() {
                    self.spacing.section_gap()
                } else {
                    0.0
                }
            })
            .collect();

        let centers = distribute_horizontally(
            &slot_sizes,
            self.spacing.node_gap(),
            Some(section_gaps.as_slice()),
        );

        slots
            .iter()
            .zip(slot_sizes)
            .zip(centers)
            .map(|((slot, size), center)| SlotExtent {
                head: slot.head().id(),
                center,
                width: size.width(),
            })
            .collect()
    }

    /// Width of a child's cell: the child itself or its provider row.
    fn cell_size(&self, branch: &Branch) -> Size {
        let own = self.sizes.size_of(NodeRole::Child);
        let providers = self.provider_sizes(branch);
        Size::new(
            own.width()
                .max(row_width(&providers, self.spacing.provider_gap())),
            own.height(),
        )
    }

    fn provider_sizes(&self, branch: &Branch) -> Vec<Size> {
        branch
            .providers()
            .iter()
            .map(|provider| self.sizes.size_of(provider.role()))
            .collect()
    }

    fn children_width(&self, slot: &Slot) -> f32 {
        let cells: Vec<Size> = slot
            .children()
            .iter()
            .map(|branch| self.cell_size(branch))
            .collect();
        row_width(&cells, self.spacing.child_gap())
    }

    /// Centers `sizes` as a row around `center_x` with a uniform `gap`.
    fn centered_row(sizes: &[Size], gap: f32, center_x: f32) -> Vec<f32> {
        let offset = center_x - row_width(sizes, gap) / 2.0;
        distribute_horizontally(sizes, gap, None)
            .into_iter()
            .map(|x| x + offset)
            .collect()
    }

    fn place(&self, tree: &DiagramTree) -> Result<Placement, AgentMapError> {
        self.check_config()?;

        let tier1_y = self.spacing.root_to_slots();
        let tier2_y = tier1_y + self.spacing.slots_to_children();
        let tier3_y = tier2_y + self.spacing.children_to_providers();

        let slots = self.ordered_slots(tree);
        let extents = self.extents(&slots);
        let total_width = extents.last().map_or(0.0, SlotExtent::max_x);

        let mut placement = Placement::new();
        placement.insert(tree.root().id(), Point::new(total_width / 2.0, 0.0));

        for (slot, extent) in slots.iter().zip(&extents) {
            placement.insert(slot.head().id(), Point::new(extent.center, tier1_y));

            let cells: Vec<Size> = slot
                .children()
                .iter()
                .map(|branch| self.cell_size(branch))
                .collect();
            let child_xs = Self::centered_row(&cells, self.spacing.child_gap(), extent.center);

            for (branch, child_x) in slot.children().iter().zip(child_xs) {
                placement.insert(branch.node().id(), Point::new(child_x, tier2_y));

                let providers = self.provider_sizes(branch);
                let provider_xs =
                    Self::centered_row(&providers, self.spacing.provider_gap(), child_x);
                for (provider, provider_x) in branch.providers().iter().zip(provider_xs) {
                    placement.insert(provider.id(), Point::new(provider_x, tier3_y));
                }
            }
        }

        if let Some((id, position)) = placement.iter().find(|(_, p)| !p.is_finite()) {
            return Err(AgentMapError::Layout(format!(
                "non-finite position {position:?} computed for node {id}"
            )));
        }

        trace!(nodes = placement.len(), width = total_width; "Placed tiered tree");
        Ok(placement)
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, tree: &DiagramTree) -> Result<Placement, AgentMapError> {
        self.place(tree)
    }
}

#[cfg(test)]
mod tests {
    use agentmap_core::{
        category::Category,
        entity::{CapabilityModel, Entity, EntityData, Provider},
    };
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::structure::{ViewState, group_id, member_id};

    fn agent() -> Entity {
        Entity::new(
            "agent",
            EntityData::Agent {
                name: "Agent".to_string(),
                model: None,
            },
        )
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

    fn model() -> CapabilityModel {
        CapabilityModel::new(agent())
            .with(Entity::new(
                "notes",
                EntityData::MemorySettings {
                    name: "Notes".to_string(),
                    window: None,
                },
            ))
            .with(skill("search", &["bing", "google"]))
            .with(skill("calendar", &[]))
            .with(skill("mail", &[]))
            .with(Entity::new(
                "friendly",
                EntityData::Persona {
                    name: "Friendly".to_string(),
                    tone: None,
                },
            ))
            .with(Entity::new(
                "strict",
                EntityData::SecurityProfile {
                    name: "Strict".to_string(),
                    level: "high".to_string(),
                },
            ))
    }

    /// Uniform 100x40 nodes with round gaps.
    fn engine() -> Engine {
        let mut engine = Engine::new();
        engine
            .set_sizes(NodeSizes::uniform(Size::new(100.0, 40.0)))
            .set_spacing(
                TreeConfig::default()
                    .with_node_gap(10.0)
                    .with_section_gap(50.0)
                    .with_child_gap(20.0)
                    .with_provider_gap(5.0)
                    .with_tier_spacing(100.0, 100.0, 100.0),
            );
        engine
    }

    fn position(placement: &Placement, id: &str) -> Point {
        placement.position(Id::new(id)).unwrap()
    }

    #[test]
    fn test_slot_order_follows_pins() {
        let tree = DiagramTree::build(&model(), &ViewState::new());
        let heads: Vec<String> = engine()
            .ordered_slots(&tree)
            .iter()
            .map(|slot| slot.head().id().to_string())
            .collect();
        assert_eq!(
            heads,
            vec![
                "persona::friendly",
                "security::strict",
                "group::skills",
                "memory::notes"
            ]
        );
    }

    #[test]
    fn test_collapsed_row_uses_node_gap() {
        let tree = DiagramTree::build(&model(), &ViewState::new());
        let placement = engine().calculate(&tree).unwrap();

        assert_approx_eq!(f32, position(&placement, "persona::friendly").x(), 50.0);
        assert_approx_eq!(f32, position(&placement, "security::strict").x(), 160.0);
        assert_approx_eq!(f32, position(&placement, "group::skills").x(), 270.0);
        assert_approx_eq!(f32, position(&placement, "memory::notes").x(), 380.0);
        assert_approx_eq!(f32, position(&placement, "memory::notes").y(), 100.0);

        // Row spans [0, 430].
        assert_approx_eq!(f32, position(&placement, "agent").x(), 215.0);
        assert_approx_eq!(f32, position(&placement, "agent").y(), 0.0);
    }

    #[test]
    fn test_expanded_group_widens_slot() {
        let view = ViewState::new().with_category(Category::Skills);
        let tree = DiagramTree::build(&model(), &view);
        let engine = engine();
        let extents = engine.slot_extents(&tree).unwrap();

        let skills = extents
            .iter()
            .find(|e| e.head() == group_id(Category::Skills))
            .unwrap();
        assert_approx_eq!(f32, skills.width(), 3.0 * 100.0 + 2.0 * 20.0);

        let placement = engine.calculate(&tree).unwrap();
        let group = position(&placement, "group::skills");
        let first = position(&placement, "skills::search");
        let last = position(&placement, "skills::mail");

        assert_approx_eq!(f32, first.y(), 200.0);
        assert_approx_eq!(f32, group.x(), (first.x() - 50.0 + last.x() + 50.0) / 2.0);
        assert_approx_eq!(f32, position(&placement, "skills::calendar").x(), group.x());
    }

    #[test]
    fn test_section_gap_next_to_expanded_slot() {
        let view = ViewState::new().with_category(Category::Skills);
        let tree = DiagramTree::build(&model(), &view);
        let extents = engine().slot_extents(&tree).unwrap();

        // persona | security | skills (expanded) | memory
        assert_approx_eq!(f32, extents[1].min_x() - extents[0].max_x(), 10.0);
        assert_approx_eq!(f32, extents[2].min_x() - extents[1].max_x(), 50.0);
        assert_approx_eq!(f32, extents[3].min_x() - extents[2].max_x(), 50.0);
    }

    #[test]
    fn test_providers_centered_under_skill() {
        let view = ViewState::new()
            .with_category(Category::Skills)
            .with_child("search");
        let tree = DiagramTree::build(&model(), &view);
        let placement = engine().calculate(&tree).unwrap();

        let search = position(&placement, "skills::search");
        let bing = position(&placement, "skills::search::provider::bing");
        let google = position(&placement, "skills::search::provider::google");

        assert_approx_eq!(f32, bing.y(), 300.0);
        assert_approx_eq!(f32, google.x() - bing.x(), 105.0);
        assert_approx_eq!(f32, (bing.x() + google.x()) / 2.0, search.x());
    }

    #[test]
    fn test_provider_row_widens_child_cell() {
        let view = ViewState::new()
            .with_category(Category::Skills)
            .with_child("search");
        let tree = DiagramTree::build(&model(), &view);
        let extents = engine().slot_extents(&tree).unwrap();

        let skills = extents
            .iter()
            .find(|e| e.head() == group_id(Category::Skills))
            .unwrap();
        // search cell is 205 wide (two providers), the others 100 each.
        assert_approx_eq!(f32, skills.width(), 205.0 + 100.0 + 100.0 + 2.0 * 20.0);
    }

    #[test]
    fn test_root_only_tree() {
        let tree = DiagramTree::build(&CapabilityModel::new(agent()), &ViewState::new());
        let placement = engine().calculate(&tree).unwrap();
        assert_eq!(placement.len(), 1);
        assert_eq!(position(&placement, "agent"), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_invalid_spacing_is_an_error() {
        let mut engine = engine();
        engine.set_spacing(TreeConfig::default().with_section_gap(f32::INFINITY));
        let tree = DiagramTree::build(&model(), &ViewState::new());
        assert!(matches!(
            engine.calculate(&tree),
            Err(AgentMapError::Layout(msg)) if msg.contains("section_gap")
        ));
    }

    #[test]
    fn test_every_node_is_placed() {
        let view = ViewState::new()
            .with_category(Category::Skills)
            .with_child("search")
            .with_child("calendar");
        let tree = DiagramTree::build(&model(), &view);
        let placement = engine().calculate(&tree).unwrap();
        assert_eq!(placement.first_unplaced(&tree), None);
        assert_eq!(placement.len(), tree.node_count());
        assert!(
            placement
                .position(member_id(Category::Persona, Id::new("friendly")))
                .is_some()
        );
    }
}
