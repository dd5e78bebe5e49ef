//! Architecture insights computed from classified nodes and edges.
//!
//! Scores are heuristics on a 0-10 scale; nothing here affects the diagrams.

use std::collections::{BTreeMap, HashMap, HashSet};

use indexmap::IndexMap;
use log::debug;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use archgraph_core::model::RelationKind;
use archgraph_extract::{ArchEdge, ArchNode, CodeElementKind, NodeCategory, NodeMap};

const HIGHLY_CONNECTED: usize = 5;
const MANY_EXTERNAL_SYSTEMS: usize = 3;
const EXPECTED_LAYERS: [&str; 3] = ["controllers", "services", "data_access"];

/// Overall health rating derived from the mean of the three scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthRating {
    Excellent,
    Good,
    Fair,
    Poor,
    /// No nodes to judge.
    Unknown,
}

impl HealthRating {
    fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            HealthRating::Excellent
        } else if score >= 6.0 {
            HealthRating::Good
        } else if score >= 4.0 {
            HealthRating::Fair
        } else {
            HealthRating::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Complexity {
    /// Score per node, in node order.
    pub by_node: IndexMap<String, f64>,
    pub average: f64,
    /// The first node with the highest score.
    pub most_complex: Option<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Health {
    /// Fewer edges per component scores higher.
    pub modularity: f64,
    /// Fewer external systems scores higher.
    pub coupling: f64,
    /// Share of components with a functional area.
    pub cohesion: f64,
    pub rating: HealthRating,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Patterns {
    pub layered: bool,
    pub mvc: bool,
    pub repository: bool,
    pub api_gateway: bool,
    pub microservices: bool,
    /// Never detected from static imports.
    pub event_driven: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub nodes_by_category: BTreeMap<NodeCategory, usize>,
    pub edges_by_kind: BTreeMap<RelationKind, usize>,
    pub files_by_component: IndexMap<String, usize>,
    /// Rough size: 20 lines per class and 10 per function.
    pub estimated_lines_by_component: IndexMap<String, usize>,
    /// Longest chain of `depends_on` edges.
    pub dependency_depth: usize,
}

/// Everything [`analyze`] derives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub complexity: Complexity,
    pub health: Health,
    pub patterns: Patterns,
    pub recommendations: Vec<String>,
    pub metrics: Metrics,
}

/// Computes insights for a classified architecture.
pub fn analyze(nodes: &NodeMap, edges: &[ArchEdge]) -> Insights {
    let insights = Insights {
        complexity: complexity(nodes, edges),
        health: health(nodes, edges),
        patterns: patterns(nodes),
        recommendations: recommendations(nodes, edges),
        metrics: metrics(nodes, edges),
    };
    debug!(
        rating:? = insights.health.rating,
        recommendations = insights.recommendations.len();
        "Insights computed"
    );
    insights
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn components(nodes: &NodeMap) -> impl Iterator<Item = &ArchNode> {
    nodes
        .values()
        .filter(|node| node.category() == NodeCategory::Component)
}

fn complexity(nodes: &NodeMap, edges: &[ArchEdge]) -> Complexity {
    let by_node: IndexMap<String, f64> = nodes
        .values()
        .map(|node| {
            let incident = edges
                .iter()
                .filter(|edge| edge.source == node.name() || edge.target == node.name())
                .count();
            let mut score = node.code_elements().len() as f64 * 0.1 + incident as f64 * 0.5;
            if node.is_external() {
                score += 1.0;
            }
            (node.name().to_string(), round2(score))
        })
        .collect();

    let average = if by_node.is_empty() {
        0.0
    } else {
        round2(by_node.values().sum::<f64>() / by_node.len() as f64)
    };
    let most_complex = by_node
        .iter()
        .fold(None, |best: Option<(&String, f64)>, (name, score)| match best {
            Some((_, top)) if top >= *score => best,
            _ => Some((name, *score)),
        })
        .map(|(name, score)| (name.clone(), score));

    Complexity {
        by_node,
        average,
        most_complex,
    }
}

fn health(nodes: &NodeMap, edges: &[ArchEdge]) -> Health {
    if nodes.is_empty() {
        return Health {
            modularity: 0.0,
            coupling: 0.0,
            cohesion: 0.0,
            rating: HealthRating::Unknown,
        };
    }

    let component_count = components(nodes).count();
    let modularity = if component_count > 0 {
        (10.0 - edges.len() as f64 / component_count as f64).clamp(0.0, 10.0)
    } else {
        0.0
    };

    let external = nodes.values().filter(|node| node.is_external()).count();
    let coupling = (10.0 - external as f64 / nodes.len() as f64 * 10.0).clamp(0.0, 10.0);

    let with_area = components(nodes)
        .filter(|node| !node.functional_area().is_empty())
        .count();
    let cohesion = if component_count > 0 {
        with_area as f64 / component_count as f64 * 10.0
    } else {
        0.0
    };

    Health {
        modularity: round2(modularity),
        coupling: round2(coupling),
        cohesion: round2(cohesion),
        rating: HealthRating::from_score((modularity + coupling + cohesion) / 3.0),
    }
}

fn patterns(nodes: &NodeMap) -> Patterns {
    let areas: Vec<&str> = nodes.values().map(ArchNode::functional_area).collect();
    let has_area = |pattern: &str| areas.iter().any(|area| area.contains(pattern));

    let layers = ["controller", "service", "data"]
        .into_iter()
        .filter(|layer| has_area(layer))
        .count();
    let containers = nodes
        .values()
        .filter(|node| node.category() == NodeCategory::Container)
        .count();

    Patterns {
        layered: layers >= 2,
        mvc: has_area("controller") && has_area("model"),
        repository: has_area("data_access")
            || nodes
                .values()
                .any(|node| node.name().to_lowercase().contains("repository")),
        api_gateway: has_area("api"),
        // More than an application and its database.
        microservices: containers > 2,
        event_driven: false,
    }
}

fn recommendations(nodes: &NodeMap, edges: &[ArchEdge]) -> Vec<String> {
    let mut recommendations = Vec::new();

    let mut connections: IndexMap<&str, usize> = IndexMap::new();
    for edge in edges {
        *connections.entry(&edge.source).or_default() += 1;
        *connections.entry(&edge.target).or_default() += 1;
    }
    for (name, count) in connections {
        if count > HIGHLY_CONNECTED {
            recommendations.push(format!(
                "Consider breaking down '{name}' - it has {count} connections"
            ));
        }
    }

    let areas: HashSet<&str> = components(nodes).map(ArchNode::functional_area).collect();
    let missing: Vec<&str> = EXPECTED_LAYERS
        .into_iter()
        .filter(|layer| !areas.contains(layer))
        .collect();
    if !missing.is_empty() {
        recommendations.push(format!(
            "Consider adding {} layer(s) for better separation of concerns",
            missing.join(", ")
        ));
    }

    if nodes.values().filter(|node| node.is_external()).count() > MANY_EXTERNAL_SYSTEMS {
        recommendations.push(
            "High number of external dependencies - consider consolidating or creating facade patterns"
                .to_string(),
        );
    }

    let database_accessors: HashSet<&str> = edges
        .iter()
        .filter(|edge| matches!(edge.kind, RelationKind::ReadsFrom | RelationKind::WritesTo))
        .map(|edge| edge.source.as_str())
        .collect();
    if database_accessors.len() > 1 {
        recommendations.push(
            "Multiple components access database directly - consider implementing repository pattern"
                .to_string(),
        );
    }

    if recommendations.is_empty() {
        recommendations
            .push("Architecture looks well-structured! Continue following current patterns.".to_string());
    }
    recommendations
}

fn metrics(nodes: &NodeMap, edges: &[ArchEdge]) -> Metrics {
    let mut metrics = Metrics::default();
    for node in nodes.values() {
        *metrics.nodes_by_category.entry(node.category()).or_default() += 1;
    }
    for edge in edges {
        *metrics.edges_by_kind.entry(edge.kind).or_default() += 1;
    }
    for node in components(nodes) {
        let lines = node
            .code_elements()
            .iter()
            .map(|element| match element.kind {
                CodeElementKind::Class => 20,
                CodeElementKind::Function => 10,
                CodeElementKind::Interface | CodeElementKind::Method => 0,
            })
            .sum();
        metrics
            .files_by_component
            .insert(node.name().to_string(), node.source_files().len());
        metrics
            .estimated_lines_by_component
            .insert(node.name().to_string(), lines);
    }
    metrics.dependency_depth = dependency_depth(edges);
    metrics
}

/// Length of the longest simple path of `depends_on` edges.
///
/// A path stops at the first node it would revisit; that last step still
/// counts.
pub fn dependency_depth(edges: &[ArchEdge]) -> usize {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut indices: HashMap<&str, NodeIndex> = HashMap::new();
    for edge in edges.iter().filter(|edge| edge.kind == RelationKind::DependsOn) {
        let source = *indices
            .entry(&edge.source)
            .or_insert_with(|| graph.add_node(&edge.source));
        let target = *indices
            .entry(&edge.target)
            .or_insert_with(|| graph.add_node(&edge.target));
        graph.add_edge(source, target, ());
    }

    fn deepest(graph: &DiGraph<&str, ()>, node: NodeIndex, path: &mut Vec<NodeIndex>) -> usize {
        if path.contains(&node) {
            return path.len() + 1;
        }
        path.push(node);
        let depth = graph
            .neighbors(node)
            .map(|next| deepest(graph, next, path))
            .max()
            .unwrap_or(path.len());
        path.pop();
        depth
    }

    graph
        .node_indices()
        .map(|node| deepest(&graph, node, &mut Vec::new()).saturating_sub(1))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use archgraph_core::properties::Properties;
    use archgraph_extract::CodeElement;

    use super::*;

    fn component(area: &str, elements: usize) -> ArchNode {
        let name = format!("{area} Component");
        ArchNode::new(&name, NodeCategory::Component, "")
            .with_code_elements(
                (0..elements)
                    .map(|i| CodeElement::new(format!("f{i}"), CodeElementKind::Function))
                    .collect(),
            )
            .with_source_files([format!("{area}.py")])
            .with_metadata(Properties::new().with("functional_area", area))
    }

    fn layered() -> (NodeMap, Vec<ArchEdge>) {
        let mut nodes = NodeMap::new();
        for node in [
            component("controllers", 2),
            component("services", 4),
            component("data_access", 1),
            ArchNode::new("Stripe", NodeCategory::SoftwareSystem, "")
                .with_metadata(Properties::new().with("external", true)),
        ] {
            nodes.insert(node.name().to_string(), node);
        }
        let edges = vec![
            ArchEdge::new(
                "controllers Component",
                "services Component",
                RelationKind::DependsOn,
                "",
            ),
            ArchEdge::new(
                "services Component",
                "data_access Component",
                RelationKind::DependsOn,
                "",
            ),
            ArchEdge::new("services Component", "Stripe", RelationKind::Uses, ""),
        ];
        (nodes, edges)
    }

    #[test]
    fn test_complexity() {
        let (nodes, edges) = layered();
        let complexity = analyze(&nodes, &edges).complexity;

        assert!(approx_eq!(f64, complexity.by_node["services Component"], 1.9));
        assert!(approx_eq!(f64, complexity.by_node["Stripe"], 1.5));
        assert_eq!(
            complexity.most_complex,
            Some(("services Component".to_string(), 1.9))
        );
    }

    #[test]
    fn test_health() {
        let (nodes, edges) = layered();
        let health = analyze(&nodes, &edges).health;

        // 3 edges over 3 components, 1 external of 4 nodes, all components have an area.
        assert!(approx_eq!(f64, health.modularity, 9.0));
        assert!(approx_eq!(f64, health.coupling, 7.5));
        assert!(approx_eq!(f64, health.cohesion, 10.0));
        assert_eq!(health.rating, HealthRating::Excellent);
    }

    #[test]
    fn test_patterns_and_recommendations() {
        let (nodes, edges) = layered();
        let insights = analyze(&nodes, &edges);

        assert!(insights.patterns.layered);
        assert!(insights.patterns.repository);
        assert!(!insights.patterns.mvc);
        assert!(!insights.patterns.microservices);
        assert_eq!(
            insights.recommendations,
            ["Architecture looks well-structured! Continue following current patterns."]
        );
    }

    #[test]
    fn test_missing_layers_are_recommended() {
        let mut nodes = NodeMap::new();
        let node = component("services", 1);
        nodes.insert(node.name().to_string(), node);
        let recommendations = analyze(&nodes, &[]).recommendations;

        assert_eq!(
            recommendations,
            ["Consider adding controllers, data_access layer(s) for better separation of concerns"]
        );
    }

    #[test]
    fn test_metrics() {
        let (nodes, edges) = layered();
        let metrics = analyze(&nodes, &edges).metrics;

        assert_eq!(metrics.nodes_by_category[&NodeCategory::Component], 3);
        assert_eq!(metrics.edges_by_kind[&RelationKind::DependsOn], 2);
        assert_eq!(metrics.files_by_component["services Component"], 1);
        assert_eq!(metrics.estimated_lines_by_component["services Component"], 40);
        assert_eq!(metrics.dependency_depth, 2);
    }

    #[test]
    fn test_dependency_depth_with_cycle() {
        let edges = vec![
            ArchEdge::new("a", "b", RelationKind::DependsOn, ""),
            ArchEdge::new("b", "a", RelationKind::DependsOn, ""),
            ArchEdge::new("b", "c", RelationKind::Uses, ""),
        ];
        assert_eq!(dependency_depth(&edges), 2);
        assert_eq!(dependency_depth(&[]), 0);
    }

    #[test]
    fn test_empty_architecture() {
        let insights = analyze(&NodeMap::new(), &[]);
        assert_eq!(insights.health.rating, HealthRating::Unknown);
        assert_eq!(insights.complexity.most_complex, None);
        assert_eq!(insights.metrics.dependency_depth, 0);
    }
}
