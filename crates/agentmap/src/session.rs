//! Layout orchestration for one editing session.
//!
//! A [`LayoutSession`] owns everything that outlives a single layout pass:
//! the position overlay, the last settled fingerprint, the request version
//! counter and the published [`Layout`]. Each pass goes through three steps:
//!
//! 1. [`prepare`](LayoutSession::prepare) decides whether the structure
//!    changed, prunes stale overlay entries and issues a versioned
//!    [`LayoutRequest`].
//! 2. [`compute`](LayoutSession::compute) runs the primary strategy. It reads
//!    nothing but the request, so hosts may run it off the UI path.
//! 3. [`resolve`](LayoutSession::resolve) publishes the outcome of the
//!    newest request, falling back to the radial strategy on failure.
//!
//! [`layout`](LayoutSession::layout) performs all three in one call.
//!
//! # Example
//!
//! ```
//! use agentmap::{
//!     category::Category,
//!     config::LayoutConfig,
//!     entity::{CapabilityModel, Entity, EntityData},
//!     session::LayoutSession,
//!     structure::ViewState,
//! };
//!
//! let agent = Entity::new("agent", EntityData::Agent { name: "Support".into(), model: None });
//! let model = CapabilityModel::new(agent).with(Entity::new(
//!     "http",
//!     EntityData::Tool { name: "HTTP".into(), description: None },
//! ));
//!
//! let mut session = LayoutSession::new("agent".into(), LayoutConfig::default());
//! let view = ViewState::new().with_category(Category::Tools);
//! let layout = session.layout(&model, &view);
//! assert_eq!(layout.nodes().len(), 3);
//! assert_eq!(layout.edges().len(), 2);
//! ```

use log::{debug, info, trace, warn};

use agentmap_core::{
    category::Category, entity::CapabilityModel, geometry::Point, identifier::Id,
};

use crate::{
    config::LayoutConfig,
    error::AgentMapError,
    fingerprint::Fingerprint,
    layout::{
        EngineBuilder, Layout, LayoutEngine, Placement, Strategy, engines::Radial,
    },
    overlay::PositionOverlay,
    structure::{DiagramTree, ViewState, member_id, member_prefix, provider_prefix},
};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has been requested yet.
    Idle,
    /// A request has been issued and not yet resolved.
    Computing { version: u64 },
    /// The layout of `version` is published and current.
    Settled { version: u64 },
}

/// A versioned unit of layout work.
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    version: u64,
    tree: DiagramTree,
    fingerprint: Fingerprint,
}

impl LayoutRequest {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn tree(&self) -> &DiagramTree {
        &self.tree
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// Layout state of one editing session, keyed by the root entity.
pub struct LayoutSession {
    root: Id,
    config: LayoutConfig,
    engines: EngineBuilder,
    fallback: Radial,
    overlay: PositionOverlay,
    state: SessionState,
    last_prepared: Option<Fingerprint>,
    settled: Option<Fingerprint>,
    issued: u64,
    layout_version: u64,
    published: Layout,
}

impl LayoutSession {
    /// Creates an idle session for the diagram rooted at `root`.
    pub fn new(root: Id, config: LayoutConfig) -> Self {
        let engines = EngineBuilder::new(config.clone());
        let fallback = engines.fallback();
        Self {
            root,
            config,
            engines,
            fallback,
            overlay: PositionOverlay::new(),
            state: SessionState::Idle,
            last_prepared: None,
            settled: None,
            issued: 0,
            layout_version: 0,
            published: Layout::default(),
        }
    }

    /// Seeds the session with an overlay kept from an earlier session.
    pub fn with_overlay(mut self, overlay: PositionOverlay) -> Self {
        self.overlay = overlay;
        self
    }

    /// Replaces the engine used for a strategy.
    pub fn with_engine(mut self, strategy: Strategy, engine: Box<dyn LayoutEngine>) -> Self {
        self.engines = self.engines.with_engine(strategy, engine);
        self
    }

    pub fn root(&self) -> Id {
        self.root
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn overlay(&self) -> &PositionOverlay {
        &self.overlay
    }

    /// The most recently published layout; empty before the first pass.
    pub fn published(&self) -> &Layout {
        &self.published
    }

    /// Forces the next [`prepare`](Self::prepare) to issue a request even
    /// when the structure is unchanged.
    pub fn bump_layout_version(&mut self) {
        self.layout_version += 1;
    }

    /// Starts a layout pass if the structure changed since the last settled one.
    ///
    /// Returns `None` when the published layout is still current.
    pub fn prepare(&mut self, model: &CapabilityModel, view: &ViewState) -> Option<LayoutRequest> {
        let root = model.root().id();
        if root != self.root {
            warn!(previous:% = self.root, root:% = root; "Root entity changed, resetting layout session");
            self.reset(root);
        }

        let fingerprint = Fingerprint::new(model, view, self.layout_version);
        if matches!(self.state, SessionState::Settled { .. })
            && self.settled.as_ref() == Some(&fingerprint)
        {
            debug!(digest = fingerprint.digest(); "Structure unchanged, keeping published layout");
            return None;
        }

        if let Some(previous) = &self.last_prepared {
            for category in fingerprint.toggled_categories(previous) {
                self.overlay.clear_prefix(&member_prefix(category));
            }
            for entity in fingerprint.toggled_children(previous) {
                for category in Category::ALL {
                    if model.members(category).iter().any(|m| m.id() == entity) {
                        let prefix = provider_prefix(member_id(category, entity));
                        self.overlay.clear_prefix(&prefix);
                    }
                }
            }
        }

        let tree = DiagramTree::build(model, view);
        self.overlay.invalidate(&tree.node_ids());

        self.issued += 1;
        let version = self.issued;
        self.state = SessionState::Computing { version };
        self.last_prepared = Some(fingerprint.clone());

        debug!(version = version, nodes = tree.node_count(); "Issued layout request");
        Some(LayoutRequest {
            version,
            tree,
            fingerprint,
        })
    }

    /// Runs the primary strategy for a request.
    ///
    /// # Errors
    ///
    /// Returns whatever the strategy reports; [`resolve`](Self::resolve)
    /// turns a failure into a fallback layout.
    pub fn compute(&mut self, request: &LayoutRequest) -> Result<Placement, AgentMapError> {
        let strategy = self.config.strategy();
        self.engines.engine(strategy).calculate(request.tree())
    }

    /// Publishes the outcome of a request.
    ///
    /// Responses for any version other than the newest issued one are
    /// discarded and `None` is returned. A failed or incomplete placement is
    /// replaced by the radial fallback.
    pub fn resolve(
        &mut self,
        request: LayoutRequest,
        outcome: Result<Placement, AgentMapError>,
    ) -> Option<&Layout> {
        if request.version != self.issued {
            debug!(
                version = request.version,
                latest = self.issued;
                "Discarding superseded layout response"
            );
            return None;
        }

        let tree = request.tree();
        let checked = outcome.and_then(|placement| match placement.first_unplaced(tree) {
            Some(id) => Err(AgentMapError::Layout(format!(
                "no valid position for node {id}"
            ))),
            None => Ok(placement),
        });

        let layout = match checked {
            Ok(placement) => {
                trace!(placement:? = placement; "Primary placement");
                Layout::assemble(tree, &placement, self.config.sizes(), self.config.strategy())
            }
            Err(err) => {
                warn!(
                    err:% = err,
                    strategy:% = self.config.strategy();
                    "Layout strategy failed, falling back to radial"
                );
                let placement = self.fallback.place(tree);
                Layout::assemble(tree, &placement, self.config.sizes(), Strategy::Radial)
                    .mark_fallback()
            }
        };

        let mut layout = layout.with_version(request.version);
        let overridden = self.overlay.apply(layout.nodes_mut());

        info!(
            version = request.version,
            nodes = layout.nodes().len(),
            edges = layout.edges().len(),
            strategy:% = layout.strategy(),
            fallback = layout.is_fallback(),
            overridden = overridden;
            "Published layout"
        );

        self.published = layout;
        self.settled = Some(request.fingerprint);
        self.state = SessionState::Settled {
            version: request.version,
        };
        Some(&self.published)
    }

    /// Prepares, computes and resolves in one call.
    ///
    /// Returns the published layout, which is unchanged when nothing
    /// structural changed since the last pass.
    pub fn layout(&mut self, model: &CapabilityModel, view: &ViewState) -> &Layout {
        if let Some(request) = self.prepare(model, view) {
            let outcome = self.compute(&request);
            self.resolve(request, outcome);
        }
        &self.published
    }

    /// Records the end of a drag gesture on a published node.
    ///
    /// Returns `false` and records nothing for unknown ids, group nodes and
    /// non-finite positions.
    pub fn record_drag(&mut self, id: Id, position: Point) -> bool {
        if !position.is_finite() {
            warn!(id:% = id, position:? = position; "Ignoring drag to a non-finite position");
            return false;
        }
        let Some(node) = self.published.node_mut(id) else {
            debug!(id:% = id; "Ignoring drag of a node that is not in the published layout");
            return false;
        };
        if !node.is_draggable() {
            debug!(id:% = id; "Ignoring drag of a fixed node");
            return false;
        }

        node.set_position(position);
        self.overlay.record(id, position);
        true
    }

    fn reset(&mut self, root: Id) {
        self.root = root;
        self.overlay.clear();
        self.state = SessionState::Idle;
        self.last_prepared = None;
        self.settled = None;
        self.published = Layout::default();
    }
}
