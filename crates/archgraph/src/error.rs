//! Error types for Archgraph operations.
//!
//! Heuristic misses during classification never show up here; they simply
//! produce fewer nodes or edges. [`ArchgraphError`] covers I/O, broken graph
//! invariants, bad configuration and export failures.

use std::io;

use thiserror::Error;

use archgraph_core::model::GraphError;

/// The main error type for Archgraph operations.
#[derive(Debug, Error)]
pub enum ArchgraphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A diagram invariant was violated while building or optimizing a view.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for ArchgraphError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}
