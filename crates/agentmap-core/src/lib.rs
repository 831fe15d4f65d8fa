//! Agentmap Core Types and Definitions
//!
//! This crate provides the foundational types for the Agentmap capability
//! diagram engine. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Colors**: CSS color handling for category accents ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Categories**: Capability categories and classification ([`category`] module)
//! - **Entities**: The agent, its attached capabilities and their payloads ([`entity`] module)

pub mod category;
pub mod color;
pub mod entity;
pub mod geometry;
pub mod identifier;
