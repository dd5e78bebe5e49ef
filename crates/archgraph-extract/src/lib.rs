//! Archgraph Extraction
//!
//! Heuristic construction of an architecture model from parsed source modules:
//!
//! - **Input model**: [`ModuleSummary`], [`CodeElement`] and [`RepositoryInfo`]
//! - **Classification**: [`Classifier`] groups modules into [`ArchNode`]s
//! - **Relationships**: [`RelationshipExtractor`] infers typed [`ArchEdge`]s
//! - **Enrichment**: the optional [`Enricher`] seam for external judgments
//!
//! Nothing here fails on unexpected input. A heuristic that finds nothing
//! produces fewer nodes or edges.

pub mod classifier;
pub mod enrich;
pub mod extractor;
pub mod keywords;
pub mod module;
pub mod node;

pub use classifier::{Classifier, FunctionalArea, ProjectContext, ProjectType};
pub use enrich::{Enricher, Enrichment, EnrichmentError, apply_enrichment};
pub use extractor::RelationshipExtractor;
pub use module::{AnalysisInput, CodeElement, CodeElementKind, ModuleSummary, Modules, RepositoryInfo};
pub use node::{ArchEdge, ArchNode, NodeCategory, NodeMap};
