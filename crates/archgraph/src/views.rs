//! Conversion of architecture nodes and edges into one [`Diagram`] per view.
//!
//! Every view is built from scratch out of the same node map, so the
//! diagrams share no state and can be optimized independently.

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use archgraph_core::{
    identifier::Id,
    model::{Diagram, DiagramLevel, Element, ElementKind, GraphError, RelationKind, Relationship},
};
use archgraph_extract::{ArchEdge, ArchNode, NodeCategory, NodeMap};

use crate::config::ViewConfig;

/// Persons added to context views: name, description and role.
const DEFAULT_PERSONAS: [(&str, &str, &str); 2] = [
    ("End User", "Primary system user", "user"),
    ("Administrator", "System administrator", "admin"),
];

/// Builds the configured views.
#[derive(Debug, Clone, Default)]
pub struct ViewBuilder {
    config: ViewConfig,
}

impl ViewBuilder {
    pub fn new(config: ViewConfig) -> Self {
        Self { config }
    }

    /// Builds one diagram per configured level, skipping views without elements.
    pub fn build(&self, nodes: &NodeMap, edges: &[ArchEdge]) -> Result<Vec<Diagram>, GraphError> {
        let mut diagrams = Vec::new();
        for level in self.config.levels() {
            let diagram = match level {
                DiagramLevel::Context => self.context(nodes)?,
                DiagramLevel::Container => self.container(nodes, edges)?,
                DiagramLevel::Component => self.component(nodes, edges)?,
                DiagramLevel::Code => {
                    debug!(level:% = level; "No view is built for this level");
                    continue;
                }
            };
            if diagram.element_count() == 0 {
                debug!(level:% = level; "Skipping empty view");
                continue;
            }
            info!(
                level:% = level,
                elements = diagram.element_count(),
                relationships = diagram.relationship_count();
                "View built"
            );
            diagrams.push(diagram);
        }
        Ok(diagrams)
    }

    fn context(&self, nodes: &NodeMap) -> Result<Diagram, GraphError> {
        let mut diagram = new_diagram(nodes, DiagramLevel::Context, "System Context")
            .with_description("High-level view of the system and its interactions");

        let Some(system) = main_system(nodes) else {
            return Ok(diagram);
        };
        let system_id = diagram.add_element(system_element(system, false))?;

        if self.config.include_external_systems() {
            for external in external_systems(nodes) {
                let id = diagram.add_element(system_element(external, true))?;
                diagram.connect(system_id, id, RelationKind::Uses, "depends on")?;
            }
        }

        if self.config.include_default_personas() {
            for (name, description, role) in DEFAULT_PERSONAS {
                let person =
                    Element::person(name, Some(role.to_string())).with_description(description);
                let id = diagram.add_element(person)?;
                diagram.connect(id, system_id, RelationKind::Uses, "uses")?;
            }
        }
        Ok(diagram)
    }

    fn container(&self, nodes: &NodeMap, edges: &[ArchEdge]) -> Result<Diagram, GraphError> {
        let mut diagram = new_diagram(nodes, DiagramLevel::Container, "Container Diagram")
            .with_description("Software architecture showing containers and their relationships");
        let mut ids: HashMap<&str, Id> = HashMap::new();

        let system_id = match main_system(nodes) {
            Some(system) => {
                let id = diagram.add_element(system_element(system, false))?;
                ids.insert(system.name(), id);
                Some(id)
            }
            None => None,
        };

        let mut application = None;
        for node in nodes.values().filter(|node| node.category() == NodeCategory::Container) {
            let kind = if node.container_type() == "database" {
                ElementKind::Database
            } else {
                ElementKind::Container
            };
            let element = Element::container(kind, node.name(), None, None)
                .with_description(node.description())
                .with_technology(node.technology().map(str::to_string));
            let id = diagram.add_element(element)?;
            if let Some(system_id) = system_id {
                diagram.link_container(system_id, id)?;
            }
            if application.is_none() && node.container_type() == "application" {
                application = Some(id);
            }
            ids.insert(node.name(), id);
        }

        if self.config.include_external_systems() {
            for external in external_systems(nodes) {
                ids.insert(external.name(), diagram.add_element(system_element(external, true))?);
            }
        }

        // Component endpoints are lifted onto the application container.
        let resolve = |name: &str| -> Option<Id> {
            if let Some(id) = ids.get(name) {
                return Some(*id);
            }
            let node = nodes.get(name)?;
            if node.category() == NodeCategory::Component {
                application
            } else {
                None
            }
        };

        let mut seen = HashSet::new();
        for edge in edges {
            let (Some(source), Some(target)) = (resolve(&edge.source), resolve(&edge.target)) else {
                continue;
            };
            if source == target || !seen.insert((source, target, edge.kind)) {
                continue;
            }
            add_edge(&mut diagram, source, target, edge)?;
        }
        Ok(diagram)
    }

    fn component(&self, nodes: &NodeMap, edges: &[ArchEdge]) -> Result<Diagram, GraphError> {
        let owner = nodes
            .values()
            .find(|node| node.container_type() == "application")
            .or_else(|| main_system(nodes))
            .map_or("Unknown Project", ArchNode::name);
        let mut diagram = new_diagram(nodes, DiagramLevel::Component, format!("{owner} Components"))
            .with_description(format!("Detailed view of components in {owner}"));
        let mut ids: HashMap<&str, Id> = HashMap::new();

        for node in nodes.values().filter(|node| node.category() == NodeCategory::Component) {
            if self.config.exclude_test_components() && node.name().to_lowercase().contains("test") {
                debug!(component = node.name(); "Excluding test component");
                continue;
            }
            let mut element = Element::component(
                node.name(),
                Some(responsibility(node)),
                node.interfaces().to_vec(),
            )
            .with_description(node.description())
            .with_technology(node.technology().map(str::to_string));

            let properties = element.properties_mut();
            properties.insert("functional_area", node.functional_area());
            properties.insert("source_files", node.source_files().len());
            properties.insert("code_elements", node.code_elements().len());
            for key in ["purpose", "enrichment_confidence"] {
                if let Some(value) = node.metadata().get(key) {
                    properties.insert(key, value.clone());
                }
            }

            ids.insert(node.name(), diagram.add_element(element)?);
        }

        for edge in edges {
            if let (Some(source), Some(target)) =
                (ids.get(edge.source.as_str()), ids.get(edge.target.as_str()))
            {
                add_edge(&mut diagram, *source, *target, edge)?;
            }
        }
        Ok(diagram)
    }
}

fn new_diagram(nodes: &NodeMap, level: DiagramLevel, title: impl Into<String>) -> Diagram {
    let project = main_system(nodes).map_or("Unknown Project", ArchNode::name);
    let mut diagram = Diagram::new(Id::new(&format!("{project}_{level}")), title, level);
    diagram.metadata_mut().insert("system", project);
    diagram
}

/// The first internal software system.
fn main_system(nodes: &NodeMap) -> Option<&ArchNode> {
    nodes
        .values()
        .find(|node| node.category() == NodeCategory::SoftwareSystem && !node.is_external())
}

fn external_systems(nodes: &NodeMap) -> impl Iterator<Item = &ArchNode> {
    nodes
        .values()
        .filter(|node| node.category() == NodeCategory::SoftwareSystem && node.is_external())
}

fn system_element(node: &ArchNode, external: bool) -> Element {
    Element::system(node.name(), external)
        .with_description(node.description())
        .with_technology(node.technology().map(str::to_string))
}

/// The first enriched responsibility, else one inferred from the functional area.
pub fn responsibility(node: &ArchNode) -> String {
    if let Some(first) = node.responsibilities().first() {
        return first.clone();
    }
    match node.functional_area() {
        "controllers" => "Request handling and routing",
        "services" => "Business logic processing",
        "data_access" => "Data access and persistence",
        "models" => "Data representation",
        _ => "Core functionality",
    }
    .to_string()
}

/// The label of an edge: its description, else its kind in title case.
fn edge_label(edge: &ArchEdge) -> String {
    if edge.description.is_empty() {
        edge.kind.title()
    } else {
        edge.description.clone()
    }
}

fn add_edge(diagram: &mut Diagram, source: Id, target: Id, edge: &ArchEdge) -> Result<Id, GraphError> {
    let mut properties = edge.metadata.clone();
    if let Some(protocol) = &edge.protocol {
        properties.insert("protocol", protocol.as_str());
    }
    let id = Id::from_sequence("rel", diagram.relationship_count());
    let relationship = Relationship::new(id, source, target, edge.kind)
        .with_label(edge_label(edge))
        .with_description(Some(edge.description.clone()).filter(|text| !text.is_empty()))
        .with_technology(edge.technology.clone())
        .with_properties(properties);
    diagram.add_relationship(relationship)
}
