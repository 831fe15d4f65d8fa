//! Error types for Agentmap operations.
//!
//! Layout strategies report failures through [`AgentMapError`]; the
//! [`LayoutSession`](crate::session::LayoutSession) recovers from them by
//! falling back to the radial strategy, so these errors never reach the end
//! user as blocking failures.

use thiserror::Error;

/// The main error type for Agentmap operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentMapError {
    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
