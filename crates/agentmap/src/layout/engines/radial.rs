//! Radial layout engine
//!
//! Places the root at a fixed center and each category's heads on concentric
//! rings inside the category's angular sector. Expanded groups get their
//! children on a small circle around the group; expanded skills get their
//! providers on a smaller circle around the skill.
//!
//! A group cluster (the children circle plus every provider circle) must stay
//! inside the group's own wedge of the sector so that neighboring clusters
//! never overlap. Circles grow until siblings clear each other, and a group
//! whose cluster does not fit at its ring radius is moved outward along its
//! bearing.
//!
//! This engine has no failure modes and is used as the recovery strategy
//! when the primary one fails.

use std::f32::consts::PI;

use log::trace;

use agentmap_core::{
    category::{Category, Sector},
    geometry::{Point, Size},
};

use crate::{
    config::{NodeSizes, RadialConfig},
    error::AgentMapError,
    layout::{
        Placement,
        engines::LayoutEngine,
        positioning::{spread_in_sector, spread_on_circle},
    },
    structure::{Branch, DiagramTree, NodeRole, Slot},
};

/// Radial layout engine
#[derive(Default)]
pub struct Engine {
    config: RadialConfig,
    sizes: NodeSizes,
}

/// Radii of one expanded group's cluster.
#[derive(Debug, Clone, Copy)]
struct Cluster {
    child_radius: f32,
    /// Distance from the group to the farthest point any child or provider covers.
    reach: f32,
}

impl Engine {
    /// Create a new radial engine with default radii and sectors
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the radii, ring cap and sectors
    pub fn set_config(&mut self, config: RadialConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Set the node sizes used to keep sibling clusters apart
    pub fn set_sizes(&mut self, sizes: NodeSizes) -> &mut Self {
        self.sizes = sizes;
        self
    }

    /// Compute positions for every node in `tree`.
    pub fn place(&self, tree: &DiagramTree) -> Placement {
        let center = self.config.center();
        let mut placement = Placement::new();
        placement.insert(tree.root().id(), center);

        for category in Category::ALL {
            let slots: Vec<&Slot> = tree
                .slots()
                .iter()
                .filter(|slot| slot.category() == category)
                .collect();
            if slots.is_empty() {
                continue;
            }

            let sector = self.config.sector(category);
            let split = slots.len().min(self.config.ring_cap());
            let (inner, outer) = slots.split_at(split);

            for (ring, radius) in [
                (inner, self.config.inner_radius()),
                (outer, self.config.outer_radius()),
            ] {
                let bearings = spread_in_sector(sector, ring.len());
                let wedge = wedge_half_angle(sector, ring.len());
                for (slot, bearing) in ring.iter().zip(bearings) {
                    match self.cluster(slot) {
                        Some(cluster) => {
                            let distance = radius.max(cluster.reach / wedge.sin());
                            let head = center.at_bearing(distance, bearing);
                            placement.insert(slot.head().id(), head);
                            self.place_children(slot, head, cluster, &mut placement);
                        }
                        None => {
                            placement.insert(slot.head().id(), center.at_bearing(radius, bearing));
                        }
                    }
                }
            }
        }

        trace!(nodes = placement.len(); "Placed radial diagram");
        placement
    }

    /// Radii of a slot's children circle, `None` when nothing is expanded.
    fn cluster(&self, slot: &Slot) -> Option<Cluster> {
        if slot.children().is_empty() {
            return None;
        }
        let footprint = slot
            .children()
            .iter()
            .map(|branch| self.branch_footprint(branch))
            .fold(0.0, f32::max);
        let child_radius = ring_radius(
            self.config.child_radius(),
            footprint,
            slot.children().len(),
        );
        Some(Cluster {
            child_radius,
            reach: child_radius + footprint,
        })
    }

    /// Radius around a child that holds the child and all its providers.
    fn branch_footprint(&self, branch: &Branch) -> f32 {
        let child = half_diagonal(self.sizes.size_of(NodeRole::Child));
        if branch.providers().is_empty() {
            return child;
        }
        let provider = half_diagonal(self.sizes.size_of(NodeRole::Provider));
        child.max(self.provider_radius(branch) + provider)
    }

    fn provider_radius(&self, branch: &Branch) -> f32 {
        let provider = half_diagonal(self.sizes.size_of(NodeRole::Provider));
        ring_radius(
            self.config.provider_radius(),
            provider,
            branch.providers().len(),
        )
    }

    fn place_children(&self, slot: &Slot, head: Point, cluster: Cluster, placement: &mut Placement) {
        let bearings = spread_on_circle(slot.children().len());
        for (branch, bearing) in slot.children().iter().zip(bearings) {
            let child = head.at_bearing(cluster.child_radius, bearing);
            placement.insert(branch.node().id(), child);

            let provider_radius = self.provider_radius(branch);
            let provider_bearings = spread_on_circle(branch.providers().len());
            for (provider, provider_bearing) in branch.providers().iter().zip(provider_bearings) {
                placement.insert(
                    provider.id(),
                    child.at_bearing(provider_radius, provider_bearing),
                );
            }
        }
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, tree: &DiagramTree) -> Result<Placement, AgentMapError> {
        Ok(self.place(tree))
    }
}

fn half_diagonal(size: Size) -> f32 {
    size.width().hypot(size.height()) / 2.0
}

/// Smallest radius, at least `minimum`, at which `count` items of the given
/// footprint spread evenly on a circle keep clear of each other.
fn ring_radius(minimum: f32, footprint: f32, count: usize) -> f32 {
    if count < 2 {
        return minimum;
    }
    minimum.max(footprint / (PI / count as f32).sin())
}

/// Half-angle, in radians, of the wedge owned by each of `count` ring items.
///
/// Matches the spread of [`spread_in_sector`]: a single item owns the whole
/// sector, otherwise each item owns half the gap to its neighbor, capped by
/// the padding at the sector edges.
fn wedge_half_angle(sector: Sector, count: usize) -> f32 {
    let span = sector.span();
    let degrees = if count < 2 {
        span / 2.0
    } else {
        (0.1 * span).min(0.4 * span / (count - 1) as f32)
    };
    degrees.min(90.0).to_radians()
}

#[cfg(test)]
mod tests {
    use agentmap_core::{
        entity::{CapabilityModel, Entity, EntityData, Provider},
        identifier::Id,
    };
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::structure::ViewState;

    fn agent() -> Entity {
        Entity::new(
            "agent",
            EntityData::Agent {
                name: "Agent".to_string(),
                model: None,
            },
        )
    }

    fn channel(id: &str) -> Entity {
        Entity::new(
            id,
            EntityData::Channel {
                name: id.to_string(),
                platform: "web".to_string(),
            },
        )
    }

    fn bearing(center: Point, point: Point) -> f32 {
        let offset = point.sub_point(center);
        offset.x().atan2(-offset.y()).to_degrees().rem_euclid(360.0)
    }

    fn position(placement: &Placement, id: &str) -> Point {
        placement.position(Id::new(id)).unwrap()
    }

    #[test]
    fn test_root_at_center() {
        let mut engine = Engine::new();
        engine.set_config(RadialConfig::default().with_center(Point::new(500.0, 400.0)));
        let tree = DiagramTree::build(&CapabilityModel::new(agent()), &ViewState::new());

        let placement = engine.place(&tree);
        assert_eq!(placement.len(), 1);
        assert_eq!(position(&placement, "agent"), Point::new(500.0, 400.0));
    }

    #[test]
    fn test_single_member_at_sector_midpoint() {
        let model = CapabilityModel::new(agent()).with(Entity::new(
            "notes",
            EntityData::MemorySettings {
                name: "Notes".to_string(),
                window: None,
            },
        ));
        let tree = DiagramTree::build(&model, &ViewState::new());
        let placement = Engine::new().place(&tree);

        let notes = position(&placement, "memory::notes");
        assert_approx_eq!(f32, notes.hypot(), 280.0, epsilon = 1e-3);
        assert_approx_eq!(f32, bearing(Point::default(), notes), 315.0, epsilon = 1e-3);
    }

    #[test]
    fn test_group_sits_at_sector_midpoint() {
        let model = CapabilityModel::new(agent())
            .with(channel("slack"))
            .with(channel("email"));
        let tree = DiagramTree::build(&model, &ViewState::new());
        let placement = Engine::new().place(&tree);

        let group = position(&placement, "group::channels");
        assert_approx_eq!(f32, bearing(Point::default(), group), 60.0, epsilon = 1e-3);
    }

    #[test]
    fn test_overflow_ring() {
        let mut engine = Engine::new();
        engine.set_config(
            RadialConfig::default()
                .with_ring_cap(1)
                .with_radii(100.0, 200.0)
                .with_sector(Category::Persona, Sector::new(0.0, 100.0)),
        );
        let model = CapabilityModel::new(agent())
            .with(Entity::new(
                "a",
                EntityData::Persona {
                    name: "A".to_string(),
                    tone: None,
                },
            ))
            .with(Entity::new(
                "b",
                EntityData::Persona {
                    name: "B".to_string(),
                    tone: None,
                },
            ))
            .with(Entity::new(
                "c",
                EntityData::Persona {
                    name: "C".to_string(),
                    tone: None,
                },
            ));
        let tree = DiagramTree::build(&model, &ViewState::new());
        let placement = engine.place(&tree);

        let a = position(&placement, "persona::a");
        let b = position(&placement, "persona::b");
        let c = position(&placement, "persona::c");
        assert_approx_eq!(f32, a.hypot(), 100.0, epsilon = 1e-3);
        assert_approx_eq!(f32, bearing(Point::default(), a), 50.0, epsilon = 1e-3);
        assert_approx_eq!(f32, b.hypot(), 200.0, epsilon = 1e-3);
        assert_approx_eq!(f32, c.hypot(), 200.0, epsilon = 1e-3);
        assert_approx_eq!(f32, bearing(Point::default(), b), 10.0, epsilon = 1e-3);
        assert_approx_eq!(f32, bearing(Point::default(), c), 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_children_circle_the_group() {
        let model = CapabilityModel::new(agent())
            .with(channel("slack"))
            .with(channel("email"))
            .with(channel("sms"))
            .with(channel("voice"));
        let view = ViewState::new().with_category(Category::Channels);
        let tree = DiagramTree::build(&model, &view);
        let placement = Engine::new().place(&tree);

        let group = position(&placement, "group::channels");
        let expected = [
            ("channels::slack", 0.0),
            ("channels::email", 90.0),
            ("channels::sms", 180.0),
            ("channels::voice", 270.0),
        ];
        for (id, expected_bearing) in expected {
            let child = position(&placement, id);
            assert_approx_eq!(f32, group.distance(child), 150.0, epsilon = 1e-3);
            assert_approx_eq!(f32, bearing(group, child), expected_bearing, epsilon = 1e-2);
        }
    }

    #[test]
    fn test_providers_circle_the_skill() {
        let model = CapabilityModel::new(agent()).with(Entity::new(
            "search",
            EntityData::Skill {
                name: "Search".to_string(),
                skill_type: "web".to_string(),
                providers: vec![Provider::new("bing", "Bing"), Provider::new("ddg", "DDG")],
            },
        ));
        let view = ViewState::new()
            .with_category(Category::Skills)
            .with_child("search");
        let tree = DiagramTree::build(&model, &view);
        let placement = Engine::new().place(&tree);

        let skill = position(&placement, "skills::search");
        let bing = position(&placement, "skills::search::provider::bing");
        let ddg = position(&placement, "skills::search::provider::ddg");
        assert_approx_eq!(f32, skill.distance(bing), 90.0, epsilon = 1e-3);
        assert_approx_eq!(f32, skill.distance(ddg), 90.0, epsilon = 1e-3);
        assert_approx_eq!(f32, bing.distance(ddg), 180.0, epsilon = 1e-3);
        assert_eq!(placement.first_unplaced(&tree), None);
    }

    fn skill(id: &str, providers: &[&str]) -> Entity {
        Entity::new(
            id,
            EntityData::Skill {
                name: id.to_string(),
                skill_type: "builtin".to_string(),
                providers: providers
                    .iter()
                    .map(|provider| Provider::new(*provider, *provider))
                    .collect(),
            },
        )
    }

    fn tool(id: &str) -> Entity {
        Entity::new(
            id,
            EntityData::Tool {
                name: id.to_string(),
                description: None,
            },
        )
    }

    fn child_reach() -> f32 {
        180f32.hypot(56.0) / 2.0
    }

    fn assert_tiers_clear(tree: &DiagramTree, placement: &Placement) {
        let sizes = NodeSizes::default();
        let nodes: Vec<_> = tree.nodes().collect();
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                if a.role().tier() != b.role().tier() {
                    continue;
                }
                let a_bounds = placement
                    .position(a.id())
                    .unwrap()
                    .to_bounds(sizes.size_of(a.role()));
                let b_bounds = placement
                    .position(b.id())
                    .unwrap()
                    .to_bounds(sizes.size_of(b.role()));
                assert!(
                    !a_bounds.intersects(&b_bounds),
                    "{} overlaps {}",
                    a.id(),
                    b.id()
                );
            }
        }
    }

    #[test]
    fn test_adjacent_expanded_groups_do_not_overlap() {
        let model = CapabilityModel::new(agent())
            .with(channel("c0"))
            .with(channel("c1"))
            .with(skill("s0", &["bing", "brave"]))
            .with(skill("s1", &["ddg"]))
            .with(tool("t0"))
            .with(tool("t1"));
        let view = ViewState::new()
            .with_category(Category::Channels)
            .with_category(Category::Skills)
            .with_category(Category::Tools)
            .with_child("s0")
            .with_child("s1");
        let tree = DiagramTree::build(&model, &view);
        let placement = Engine::new().place(&tree);

        assert_eq!(placement.first_unplaced(&tree), None);
        assert_tiers_clear(&tree, &placement);
    }

    #[test]
    fn test_expanded_group_moves_out_along_its_bearing() {
        let model = CapabilityModel::new(agent())
            .with(channel("slack"))
            .with(channel("email"));
        let collapsed = Engine::new().place(&DiagramTree::build(&model, &ViewState::new()));
        let view = ViewState::new().with_category(Category::Channels);
        let expanded = Engine::new().place(&DiagramTree::build(&model, &view));

        let before = position(&collapsed, "group::channels");
        let after = position(&expanded, "group::channels");
        assert_approx_eq!(f32, before.hypot(), 280.0, epsilon = 1e-3);
        // The cluster must fit in a 30 degree half-wedge.
        assert_approx_eq!(f32, after.hypot(), (150.0 + child_reach()) / 0.5, epsilon = 1e-2);
        assert_approx_eq!(f32, bearing(Point::default(), after), 60.0, epsilon = 1e-2);
    }

    #[test]
    fn test_crowded_group_widens_child_circle() {
        let mut model = CapabilityModel::new(agent());
        for i in 0..10 {
            model.attach(channel(format!("c{i}").as_str()));
        }
        let view = ViewState::new().with_category(Category::Channels);
        let tree = DiagramTree::build(&model, &view);
        let placement = Engine::new().place(&tree);

        let group = position(&placement, "group::channels");
        let expected = child_reach() / (PI / 10.0).sin();
        assert!(expected > 150.0);
        assert_approx_eq!(
            f32,
            group.distance(position(&placement, "channels::c0")),
            expected,
            epsilon = 1e-2
        );
        assert_tiers_clear(&tree, &placement);
    }

    #[test]
    fn test_collapsed_group_stays_on_ring() {
        let mut engine = Engine::new();
        engine.set_sizes(NodeSizes::uniform(Size::new(10.0, 10.0)));
        let model = CapabilityModel::new(agent()).with(channel("slack"));
        let placement = engine.place(&DiagramTree::build(&model, &ViewState::new()));
        assert_approx_eq!(
            f32,
            position(&placement, "group::channels").hypot(),
            280.0,
            epsilon = 1e-3
        );
    }
}
