//! Renderable architecture graph model.
//!
//! This module contains the building blocks of a positioned architecture diagram:
//! - [`Element`] - A node (person, system, container, component, ...) with optional position
//! - [`Relationship`] - A typed, labelled edge between two elements
//! - [`Diagram`] - The owning container that enforces referential integrity
//! - [`Cluster`] - A named group of elements assigned by the optimizer
//!
//! Integrity invariants are checked when the diagram is mutated; violations
//! are returned as [`GraphError`] at the point of insertion.

mod diagram;
mod element;
mod error;
mod relationship;

pub use diagram::{Cluster, ClusterKind, Diagram, DiagramLevel, DiagramStatistics};
pub use element::{Element, ElementDetail, ElementKind};
pub use error::{Endpoint, GraphError};
pub use relationship::{RelationKind, Relationship};
