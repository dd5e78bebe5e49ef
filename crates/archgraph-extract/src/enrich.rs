//! Optional best-effort enrichment of classified nodes.
//!
//! An [`Enricher`] is an external judgment service (for example a language
//! model) that describes a node's purpose. Its output only ever appends to a
//! node; failures are logged and skipped so the deterministic pipeline never
//! depends on it.

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    module::Modules,
    node::{ArchNode, NodeCategory, NodeMap},
};

/// Why an enrichment could not be produced.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("enrichment service unavailable")]
    Unavailable,

    #[error("enrichment failed: {0}")]
    Failed(String),
}

/// A structured judgment about one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub purpose: Option<String>,
    pub responsibilities: Vec<String>,
    pub interfaces: Vec<String>,
    /// Confidence in `0.0..=1.0`.
    pub confidence: f64,
}

/// A source of enrichment judgments.
pub trait Enricher {
    fn enrich(&self, node: &ArchNode, modules: &Modules) -> Result<Enrichment, EnrichmentError>;
}

/// Enriches every component of `nodes`.
///
/// Results below `confidence_threshold` are ignored. Returns the number of
/// nodes that were changed.
pub fn apply_enrichment(
    enricher: &dyn Enricher,
    nodes: &mut NodeMap,
    modules: &Modules,
    confidence_threshold: f64,
) -> usize {
    let mut enriched = 0;
    for node in nodes
        .values_mut()
        .filter(|node| node.category() == NodeCategory::Component)
    {
        let enrichment = match enricher.enrich(node, modules) {
            Ok(enrichment) => enrichment,
            Err(err) => {
                warn!(node = node.name(), err:% = err; "Skipping enrichment");
                continue;
            }
        };
        if enrichment.confidence < confidence_threshold {
            debug!(
                node = node.name(),
                confidence = enrichment.confidence;
                "Ignoring low confidence enrichment"
            );
            continue;
        }

        for responsibility in enrichment.responsibilities {
            node.add_responsibility(responsibility);
        }
        for interface in enrichment.interfaces {
            node.add_interface(interface);
        }
        let metadata = node.metadata_mut();
        if let Some(purpose) = enrichment.purpose {
            metadata.insert("purpose", purpose);
        }
        metadata.insert("enrichment_confidence", enrichment.confidence);
        enriched += 1;
    }

    info!(enriched = enriched; "Enrichment applied");
    enriched
}
