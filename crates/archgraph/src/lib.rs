//! Archgraph - optimized, laid out architecture diagrams from source code summaries.
//!
//! Module summaries produced by an external parser are classified into
//! architecture nodes, connected by inferred relationships, converted into one
//! diagram per view and finally optimized: relationships are merged and
//! simplified, elements clustered and positioned.

pub mod config;
pub mod export;
pub mod insights;
pub mod layout;
pub mod optimize;
pub mod views;

mod error;

pub use archgraph_core::{geometry, identifier, model, properties};
pub use archgraph_extract as extract;

pub use error::ArchgraphError;

use log::{debug, info, trace};
use serde::Serialize;

use archgraph_core::model::{Diagram, DiagramStatistics};
use archgraph_extract::{
    AnalysisInput, ArchEdge, Classifier, Enricher, NodeMap, RelationshipExtractor, apply_enrichment,
};

use config::AppConfig;
use insights::Insights;
use optimize::{DiagramOptimizer, OptimizationReport};
use views::ViewBuilder;

/// Classified nodes and the relationships inferred between them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchitectureModel {
    pub nodes: NodeMap,
    pub edges: Vec<ArchEdge>,
}

/// One optimized view with its statistics and optimizer report.
#[derive(Debug, Clone, Serialize)]
pub struct DiagramOutput {
    pub diagram: Diagram,
    pub statistics: DiagramStatistics,
    pub report: OptimizationReport,
}

/// Everything produced by [`ArchitectureBuilder::run`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub project: String,
    pub diagrams: Vec<DiagramOutput>,
    pub insights: Insights,
}

/// Builder for analyzing a codebase and producing optimized diagrams.
///
/// This provides an API for processing module summaries through
/// classification, view construction and optimization.
///
/// # Examples
///
/// ```rust,no_run
/// use archgraph::{ArchitectureBuilder, config::AppConfig};
/// use archgraph::extract::{AnalysisInput, ModuleSummary, RepositoryInfo};
///
/// let mut input = AnalysisInput {
///     repository: RepositoryInfo::named("Shop"),
///     ..Default::default()
/// };
/// input.modules.insert(
///     "shop/service.py".to_string(),
///     ModuleSummary::new("shop/service.py", "python").with_class("OrderService"),
/// );
///
/// let builder = ArchitectureBuilder::new(AppConfig::default());
/// let output = builder.run(&input).expect("Failed to analyze");
///
/// for view in &output.diagrams {
///     println!("{}: {} elements", view.diagram.title(), view.statistics.total_elements);
/// }
/// ```
#[derive(Default)]
pub struct ArchitectureBuilder {
    config: AppConfig,
    enricher: Option<Box<dyn Enricher>>,
}

impl ArchitectureBuilder {
    /// Create a new architecture builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - View and optimizer settings
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            enricher: None,
        }
    }

    /// Attach an enrichment service consulted after classification.
    ///
    /// Enrichment failures are logged and never abort the analysis.
    pub fn with_enricher(mut self, enricher: impl Enricher + 'static) -> Self {
        self.enricher = Some(Box::new(enricher));
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Classify module summaries and infer relationships.
    ///
    /// Heuristic misses never fail; they yield fewer nodes or edges.
    pub fn analyze(&self, input: &AnalysisInput) -> ArchitectureModel {
        info!(modules = input.modules.len(); "Analyzing modules");

        let mut nodes = Classifier::new().classify(&input.modules, &input.repository);
        let edges = RelationshipExtractor::new().extract(&nodes, &input.modules);

        if let Some(enricher) = &self.enricher {
            apply_enrichment(
                enricher.as_ref(),
                &mut nodes,
                &input.modules,
                self.config.views().enrichment_confidence_threshold(),
            );
        }

        debug!(nodes = nodes.len(), edges = edges.len(); "Architecture model built");
        trace!(nodes:? = nodes; "Architecture nodes");
        ArchitectureModel { nodes, edges }
    }

    /// Build one diagram per configured view.
    ///
    /// # Errors
    ///
    /// Returns `ArchgraphError::Graph` if a view would break a diagram invariant.
    pub fn build_views(&self, model: &ArchitectureModel) -> Result<Vec<Diagram>, ArchgraphError> {
        let diagrams = ViewBuilder::new(self.config.views().clone()).build(&model.nodes, &model.edges)?;
        info!(views = diagrams.len(); "Views built");
        Ok(diagrams)
    }

    /// Optimize a single diagram in place.
    ///
    /// # Errors
    ///
    /// Returns `ArchgraphError::Graph` if an optimizer pass would break a
    /// diagram invariant.
    pub fn optimize(&self, diagram: &mut Diagram) -> Result<OptimizationReport, ArchgraphError> {
        let optimizer = DiagramOptimizer::new(self.config.optimizer().clone());
        Ok(optimizer.optimize(diagram)?)
    }

    /// Run the whole pipeline: analysis, views, optimization and insights.
    ///
    /// # Errors
    ///
    /// Returns `ArchgraphError` for integrity violations while building or
    /// optimizing views.
    pub fn run(&self, input: &AnalysisInput) -> Result<AnalysisOutput, ArchgraphError> {
        let model = self.analyze(input);
        let insights = insights::analyze(&model.nodes, &model.edges);

        let mut diagrams = Vec::new();
        for mut diagram in self.build_views(&model)? {
            let report = self.optimize(&mut diagram)?;
            let statistics = diagram.statistics();
            diagrams.push(DiagramOutput {
                diagram,
                statistics,
                report,
            });
        }

        info!(diagrams = diagrams.len(); "Analysis finished");
        Ok(AnalysisOutput {
            project: input.repository.project_name().to_string(),
            diagrams,
            insights,
        })
    }
}
