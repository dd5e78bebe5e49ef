//! The graph optimizer.
//!
//! [`DiagramOptimizer::optimize`] runs four passes over one diagram, strictly
//! in order, because later passes read what earlier ones wrote:
//!
//! 1. relationships: merge duplicates, drop transitive shortcuts, shorten
//!    common labels,
//! 2. clustering (see [`clustering`]),
//! 3. layout, using the engine of the configured [`LayoutStrategy`],
//! 4. validation: invariant violations are logged, never fixed, and elements
//!    still lacking a position get the default one.

mod clustering;
mod relationships;

pub use relationships::{merge_labels, shorten_label};

use log::{debug, info, warn};
use serde::Serialize;

use archgraph_core::model::{Diagram, GraphError};

use crate::{
    config::{LayoutStrategy, OptimizerConfig},
    layout::{Canvas, EngineBuilder, Simulation},
};

/// How many validation issues are logged individually.
const LOGGED_ISSUES: usize = 5;

/// What the layout pass did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutOutcome {
    pub strategy: LayoutStrategy,
    /// Elements positioned by the engine.
    pub positioned: usize,
    /// Present for the force-directed strategy only.
    pub simulation: Option<Simulation>,
}

/// Counters collected while optimizing a single diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub relationships_merged: usize,
    pub transitive_removed: usize,
    pub labels_shortened: usize,
    pub clusters_formed: usize,
    pub layout: LayoutOutcome,
    pub validation_issues: Vec<String>,
    /// Elements that fell back to the default position after layout.
    pub defaulted_positions: usize,
}

/// Optimizes diagrams according to an [`OptimizerConfig`].
///
/// # Examples
///
/// ```
/// # use archgraph::{config::OptimizerConfig, optimize::DiagramOptimizer};
/// # use archgraph_core::{identifier::Id, model::*};
/// let mut diagram = Diagram::new(Id::new("shop_container"), "Shop", DiagramLevel::Container);
/// let a = diagram.add_element(Element::new(ElementKind::Container, "Api")).unwrap();
/// let b = diagram.add_element(Element::new(ElementKind::Database, "Db")).unwrap();
/// diagram.connect(a, b, RelationKind::ReadsFrom, "reads").unwrap();
/// diagram.connect(a, b, RelationKind::WritesTo, "writes").unwrap();
///
/// let report = DiagramOptimizer::new(OptimizerConfig::default())
///     .optimize(&mut diagram)
///     .unwrap();
/// assert_eq!(report.relationships_merged, 1);
/// assert_eq!(diagram.relationships()[0].label(), "reads / writes");
/// assert!(diagram.elements().all(|element| element.position().is_some()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiagramOptimizer {
    config: OptimizerConfig,
}

impl DiagramOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Runs every pass over `diagram` in place.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] only if a pass would break a diagram invariant,
    /// which indicates a bug in the pass rather than bad input.
    pub fn optimize(&self, diagram: &mut Diagram) -> Result<OptimizationReport, GraphError> {
        info!(
            diagram:% = diagram.id(),
            elements = diagram.element_count(),
            relationships = diagram.relationship_count();
            "Optimizing diagram"
        );

        let (relationships_merged, transitive_removed, labels_shortened) =
            self.optimize_relationships(diagram)?;

        let clusters_formed = if self.config.enable_clustering() {
            clustering::cluster(diagram, &self.config)?
        } else {
            diagram.clear_clusters();
            0
        };
        info!(clusters = clusters_formed; "Clustering finished");

        let layout = self.apply_layout(diagram);
        let (validation_issues, defaulted_positions) = self.validate(diagram);

        Ok(OptimizationReport {
            relationships_merged,
            transitive_removed,
            labels_shortened,
            clusters_formed,
            layout,
            validation_issues,
            defaulted_positions,
        })
    }

    fn optimize_relationships(&self, diagram: &mut Diagram) -> Result<(usize, usize, usize), GraphError> {
        let mut merged = 0;
        if self.config.merge_duplicate_relationships() {
            let (relationships, folded) = relationships::merge_duplicates(
                diagram.relationships().to_vec(),
                self.config.merge_key(),
            );
            diagram.set_relationships(relationships)?;
            merged = folded;
        }

        let mut removed = 0;
        if self.config.simplify_transitive_relationships() {
            let transitive = relationships::transitive_relationships(diagram.relationships());
            removed = transitive.len();
            diagram.retain_relationships(|rel| !transitive.contains(&rel.id()));
        }

        let shortened = relationships::shorten_common_labels(
            diagram.relationships_mut(),
            self.config.max_relationship_labels(),
        );

        info!(
            merged = merged,
            transitive_removed = removed,
            labels_shortened = shortened,
            remaining = diagram.relationship_count();
            "Relationships optimized"
        );
        Ok((merged, removed, shortened))
    }

    fn canvas(&self) -> Canvas {
        Canvas::new(
            self.config.canvas(),
            self.config.margin(),
            self.config.element_size(),
        )
    }

    fn apply_layout(&self, diagram: &mut Diagram) -> LayoutOutcome {
        let strategy = self.config.layout_strategy();
        let mut builder = EngineBuilder::new()
            .with_canvas(self.canvas())
            .with_min_distance(self.config.min_element_distance())
            .with_max_iterations(self.config.max_optimization_iterations())
            .with_force_threshold(self.config.force_threshold())
            .with_learning_rate(self.config.learning_rate());
        let placement = builder.engine(strategy).calculate(diagram);

        let mut positioned = 0;
        for element in diagram.elements_mut() {
            if let Some(position) = placement.positions.get(&element.id()) {
                element.set_position(*position);
                positioned += 1;
            }
        }
        info!(strategy:% = strategy, positioned = positioned; "Layout applied");

        LayoutOutcome {
            strategy,
            positioned,
            simulation: placement.simulation,
        }
    }

    fn validate(&self, diagram: &mut Diagram) -> (Vec<String>, usize) {
        let issues = diagram.validate();
        if issues.is_empty() {
            debug!(diagram:% = diagram.id(); "Diagram validated");
        } else {
            warn!(diagram:% = diagram.id(), issues = issues.len(); "Diagram validation found issues");
            for issue in issues.iter().take(LOGGED_ISSUES) {
                warn!(issue = issue; "Validation issue");
            }
        }

        let default_position = self.canvas().default_position();
        let mut defaulted = 0;
        for element in diagram.elements_mut() {
            if element.position().is_none() {
                warn!(element:% = element.id(); "Element has no position, using default");
                element.set_position(default_position);
                defaulted += 1;
            }
        }
        (issues, defaulted)
    }
}
