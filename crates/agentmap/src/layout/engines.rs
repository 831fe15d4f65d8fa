//! Layout engine factory module
//!
//! This module provides the [`LayoutEngine`] trait implemented by every
//! placement strategy, and an [`EngineBuilder`] that creates engines for a
//! [`Strategy`] configured from a [`LayoutConfig`].

mod radial;
mod tiered;

use std::collections::HashMap;

use log::warn;

use crate::{
    config::LayoutConfig,
    error::AgentMapError,
    layout::{Placement, Strategy},
    structure::DiagramTree,
};

pub use radial::Engine as Radial;
pub use tiered::{Engine as Tiered, SlotExtent};

/// Trait defining the interface for capability diagram layout engines
pub trait LayoutEngine {
    /// Calculate node centers for every node of `tree`
    ///
    /// # Errors
    ///
    /// Returns [`AgentMapError::Layout`] when no valid placement can be
    /// computed. Callers recover by falling back to another strategy.
    fn calculate(&self, tree: &DiagramTree) -> Result<Placement, AgentMapError>;
}

/// Builder for creating and configuring layout engines.
///
/// Engines are created on first use and cached per strategy.
pub struct EngineBuilder {
    engines: HashMap<Strategy, Box<dyn LayoutEngine>>,
    config: LayoutConfig,
}

impl EngineBuilder {
    /// Create a new engine builder for the given configuration
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            engines: HashMap::new(),
            config,
        }
    }

    /// Replace the engine used for a strategy
    pub fn with_engine(mut self, strategy: Strategy, engine: Box<dyn LayoutEngine>) -> Self {
        self.engines.insert(strategy, engine);
        self
    }

    /// Get the engine of the specified strategy with configured options
    pub fn engine(&mut self, strategy: Strategy) -> &dyn LayoutEngine {
        let engine = self.engines.entry(strategy).or_insert_with(|| {
            let engine: Box<dyn LayoutEngine> = match strategy {
                Strategy::Tree => {
                    let mut e = Tiered::new();
                    e.set_spacing(self.config.tree().clone());
                    e.set_sizes(self.config.sizes().clone());
                    Box::new(e)
                }
                Strategy::Radial => Box::new(radial_engine(&self.config)),
            };
            engine
        });
        &**engine
    }

    /// A radial engine for recovery placement.
    ///
    /// Unlike [`engine`](Self::engine) this is never overridden, and an
    /// invalid radial section is replaced by the defaults so that the result
    /// is always finite.
    pub fn fallback(&self) -> Radial {
        radial_engine(&self.config)
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }
}

fn radial_engine(config: &LayoutConfig) -> Radial {
    let mut engine = Radial::new();
    match config.radial().validate() {
        Ok(()) => {
            engine.set_config(config.radial().clone());
        }
        Err(err) => {
            warn!(err:% = err; "Invalid radial configuration, using defaults");
        }
    }
    match config.sizes().validate() {
        Ok(()) => {
            engine.set_sizes(config.sizes().clone());
        }
        Err(err) => {
            warn!(err:% = err; "Invalid node sizes, spacing radial clusters with defaults");
        }
    }
    engine
}
