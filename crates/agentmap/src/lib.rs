//! Agentmap - Layout engine for agent capability diagrams.
//!
//! Takes an agent, the capabilities attached to it and the user's expansion
//! state, and produces positioned nodes and edges for a host UI to render.
//! Manual drags survive recomputation through a position overlay, and a
//! failing primary strategy is replaced by the radial one without surfacing
//! an error.
//!
//! # Usage
//!
//! ```
//! use agentmap::{
//!     LayoutSession,
//!     config::LayoutConfig,
//!     entity::{CapabilityModel, Entity, EntityData},
//!     geometry::Point,
//!     identifier::Id,
//!     structure::ViewState,
//! };
//!
//! let agent = Entity::new("agent", EntityData::Agent { name: "Support".into(), model: None });
//! let model = CapabilityModel::new(agent).with(Entity::new(
//!     "calm",
//!     EntityData::Persona { name: "Calm".into(), tone: None },
//! ));
//!
//! let mut session = LayoutSession::new(Id::new("agent"), LayoutConfig::default());
//! let layout = session.layout(&model, &ViewState::new());
//! assert!(layout.root().is_some());
//!
//! assert!(session.record_drag(Id::new("persona::calm"), Point::new(40.0, 300.0)));
//! assert_eq!(session.overlay().len(), 1);
//! ```

pub mod config;
pub mod fingerprint;
pub mod layout;
pub mod overlay;
pub mod session;
pub mod structure;

mod error;

pub use agentmap_core::{category, color, entity, geometry, identifier};

pub use error::AgentMapError;
pub use session::LayoutSession;
