//! Archgraph Core Types and Definitions
//!
//! This crate provides the foundational types for Archgraph architecture
//! diagrams. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Properties**: Open key-value maps with defaulting accessors ([`properties`] module)
//! - **Model**: The diagram graph with its integrity invariants ([`model`] module)

pub mod geometry;
pub mod identifier;
pub mod model;
pub mod properties;
