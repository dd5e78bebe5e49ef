//! Configuration types for Archgraph.
//!
//! This module provides configuration structures that control how views are
//! built and how each diagram is optimized and laid out. All types implement
//! [`serde::Deserialize`] so they can be loaded from TOML files; every field
//! has a default, so partial files are fine.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining optimizer and view settings.
//! - [`OptimizerConfig`] - Relationship, clustering and layout settings.
//! - [`ViewConfig`] - Which diagram levels are produced and what they include.
//!
//! # Example
//!
//! ```
//! # use archgraph::config::{AppConfig, LayoutStrategy};
//! let config = AppConfig::default();
//! assert_eq!(config.optimizer().layout_strategy(), LayoutStrategy::Hierarchical);
//! assert_eq!(config.views().levels().len(), 3);
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use archgraph_core::{geometry::Size, model::DiagramLevel};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Optimizer configuration section.
    #[serde(default)]
    optimizer: OptimizerConfig,

    /// View configuration section.
    #[serde(default)]
    views: ViewConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its two sections.
    pub fn new(optimizer: OptimizerConfig, views: ViewConfig) -> Self {
        Self { optimizer, views }
    }

    /// Returns the optimizer configuration.
    pub fn optimizer(&self) -> &OptimizerConfig {
        &self.optimizer
    }

    /// Returns the view configuration.
    pub fn views(&self) -> &ViewConfig {
        &self.views
    }
}

/// Strategy used to position diagram elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    /// Rows by element kind: persons, systems, containers, components.
    #[default]
    Hierarchical,
    /// Evenly around one circle.
    Circular,
    /// Iterative spring simulation.
    ForceDirected,
    /// Row-major grid.
    Grid,
    /// Rows by dependency depth.
    Layered,
}

impl LayoutStrategy {
    pub const ALL: [LayoutStrategy; 5] = [
        LayoutStrategy::Hierarchical,
        LayoutStrategy::Circular,
        LayoutStrategy::ForceDirected,
        LayoutStrategy::Grid,
        LayoutStrategy::Layered,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutStrategy::Hierarchical => "hierarchical",
            LayoutStrategy::Circular => "circular",
            LayoutStrategy::ForceDirected => "force_directed",
            LayoutStrategy::Grid => "grid",
            LayoutStrategy::Layered => "layered",
        }
    }
}

impl fmt::Display for LayoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutStrategy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or("Unsupported layout strategy")
    }
}

/// The grouping key used when merging duplicate relationships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeKey {
    /// Group by `(source, target)`; relationships of different kinds collapse.
    #[default]
    Endpoints,
    /// Group by `(source, target, kind)`.
    EndpointsAndKind,
}

/// Settings for the four optimizer passes.
///
/// Defaults reproduce a 1200x800 canvas with a 50 unit margin and
/// 120x80 elements.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    layout_strategy: LayoutStrategy,
    canvas_width: f32,
    canvas_height: f32,
    margin: f32,

    min_element_distance: f32,
    element_width: f32,
    element_height: f32,

    merge_duplicate_relationships: bool,
    merge_key: MergeKey,
    simplify_transitive_relationships: bool,
    max_relationship_labels: usize,

    enable_clustering: bool,
    cluster_by_type: bool,
    cluster_by_responsibility: bool,
    max_cluster_size: usize,

    max_optimization_iterations: usize,
    force_threshold: f32,
    learning_rate: f32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            layout_strategy: LayoutStrategy::default(),
            canvas_width: 1200.0,
            canvas_height: 800.0,
            margin: 50.0,
            min_element_distance: 100.0,
            element_width: 120.0,
            element_height: 80.0,
            merge_duplicate_relationships: true,
            merge_key: MergeKey::default(),
            simplify_transitive_relationships: true,
            max_relationship_labels: 50,
            enable_clustering: true,
            cluster_by_type: true,
            cluster_by_responsibility: true,
            max_cluster_size: 8,
            max_optimization_iterations: 100,
            force_threshold: 0.1,
            learning_rate: 0.1,
        }
    }
}

impl OptimizerConfig {
    pub fn with_layout_strategy(mut self, strategy: LayoutStrategy) -> Self {
        self.layout_strategy = strategy;
        self
    }

    pub fn with_merge_key(mut self, merge_key: MergeKey) -> Self {
        self.merge_key = merge_key;
        self
    }

    /// Enables or disables the whole clustering pass.
    pub fn with_clustering(mut self, enabled: bool) -> Self {
        self.enable_clustering = enabled;
        self
    }

    /// Selects which clustering groupings run.
    pub fn with_cluster_groupings(mut self, by_type: bool, by_responsibility: bool) -> Self {
        self.cluster_by_type = by_type;
        self.cluster_by_responsibility = by_responsibility;
        self
    }

    pub fn with_max_cluster_size(mut self, size: usize) -> Self {
        self.max_cluster_size = size;
        self
    }

    pub fn with_transitive_simplification(mut self, enabled: bool) -> Self {
        self.simplify_transitive_relationships = enabled;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_optimization_iterations = iterations;
        self
    }

    pub fn with_force_threshold(mut self, threshold: f32) -> Self {
        self.force_threshold = threshold;
        self
    }

    pub fn layout_strategy(&self) -> LayoutStrategy {
        self.layout_strategy
    }

    /// The drawable area, margins included.
    pub fn canvas(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn min_element_distance(&self) -> f32 {
        self.min_element_distance
    }

    pub fn element_size(&self) -> Size {
        Size::new(self.element_width, self.element_height)
    }

    pub fn merge_duplicate_relationships(&self) -> bool {
        self.merge_duplicate_relationships
    }

    pub fn merge_key(&self) -> MergeKey {
        self.merge_key
    }

    pub fn simplify_transitive_relationships(&self) -> bool {
        self.simplify_transitive_relationships
    }

    pub fn max_relationship_labels(&self) -> usize {
        self.max_relationship_labels
    }

    pub fn enable_clustering(&self) -> bool {
        self.enable_clustering
    }

    pub fn cluster_by_type(&self) -> bool {
        self.cluster_by_type
    }

    pub fn cluster_by_responsibility(&self) -> bool {
        self.cluster_by_responsibility
    }

    pub fn max_cluster_size(&self) -> usize {
        self.max_cluster_size
    }

    pub fn max_optimization_iterations(&self) -> usize {
        self.max_optimization_iterations
    }

    pub fn force_threshold(&self) -> f32 {
        self.force_threshold
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

/// Which views are built and what goes into them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    levels: Vec<DiagramLevel>,
    include_default_personas: bool,
    include_external_systems: bool,
    exclude_test_components: bool,
    enrichment_confidence_threshold: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            levels: vec![
                DiagramLevel::Context,
                DiagramLevel::Container,
                DiagramLevel::Component,
            ],
            include_default_personas: true,
            include_external_systems: true,
            exclude_test_components: true,
            enrichment_confidence_threshold: 0.7,
        }
    }
}

impl ViewConfig {
    pub fn with_levels(mut self, levels: Vec<DiagramLevel>) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_default_personas(mut self, include: bool) -> Self {
        self.include_default_personas = include;
        self
    }

    pub fn with_external_systems(mut self, include: bool) -> Self {
        self.include_external_systems = include;
        self
    }

    pub fn with_test_components_excluded(mut self, exclude: bool) -> Self {
        self.exclude_test_components = exclude;
        self
    }

    pub fn levels(&self) -> &[DiagramLevel] {
        &self.levels
    }

    pub fn include_default_personas(&self) -> bool {
        self.include_default_personas
    }

    pub fn include_external_systems(&self) -> bool {
        self.include_external_systems
    }

    pub fn exclude_test_components(&self) -> bool {
        self.exclude_test_components
    }

    /// Enrichment results below this confidence are ignored.
    pub fn enrichment_confidence_threshold(&self) -> f64 {
        self.enrichment_confidence_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [optimizer]
            layout_strategy = "force_directed"
            canvas_width = 1600
            merge_key = "endpoints_and_kind"

            [views]
            levels = ["component"]
            include_default_personas = false
            "#,
        )
        .unwrap();

        let optimizer = config.optimizer();
        assert_eq!(optimizer.layout_strategy(), LayoutStrategy::ForceDirected);
        assert_eq!(optimizer.canvas(), Size::new(1600.0, 800.0));
        assert_eq!(optimizer.merge_key(), MergeKey::EndpointsAndKind);
        assert_eq!(optimizer.max_cluster_size(), 8);
        assert_eq!(config.views().levels(), [DiagramLevel::Component]);
        assert!(!config.views().include_default_personas());
        assert!(config.views().exclude_test_components());
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[optimizer]\nlayout_strategy = \"spiral\"");
        assert!(result.is_err());
        assert!("spiral".parse::<LayoutStrategy>().is_err());
    }

    #[test]
    fn test_strategy_round_trips_through_display() {
        for strategy in LayoutStrategy::ALL {
            assert_eq!(strategy.to_string().parse::<LayoutStrategy>(), Ok(strategy));
        }
    }
}
