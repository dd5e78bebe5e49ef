//! Architecture nodes and edges, the pre-layout classification output.

use std::{collections::BTreeSet, fmt};

use indexmap::IndexMap;
use serde::Serialize;

use archgraph_core::{model::RelationKind, properties::Properties};

use crate::module::CodeElement;

/// Architecture nodes keyed by their unique name, in creation order.
pub type NodeMap = IndexMap<String, ArchNode>;

/// The taxonomy category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    Person,
    SoftwareSystem,
    Container,
    Component,
}

impl NodeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeCategory::Person => "person",
            NodeCategory::SoftwareSystem => "software_system",
            NodeCategory::Container => "container",
            NodeCategory::Component => "component",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified architecture node.
///
/// Nodes are created by the [`Classifier`](crate::Classifier). After that only
/// metadata, responsibilities and interfaces may grow, through enrichment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchNode {
    name: String,
    category: NodeCategory,
    description: String,
    technology: Option<String>,
    responsibilities: Vec<String>,
    interfaces: Vec<String>,
    source_files: BTreeSet<String>,
    code_elements: Vec<CodeElement>,
    metadata: Properties,
}

impl ArchNode {
    pub fn new(
        name: impl Into<String>,
        category: NodeCategory,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            description: description.into(),
            technology: None,
            responsibilities: Vec::new(),
            interfaces: Vec::new(),
            source_files: BTreeSet::new(),
            code_elements: Vec::new(),
            metadata: Properties::new(),
        }
    }

    pub fn with_technology(mut self, technology: Option<String>) -> Self {
        self.technology = technology;
        self
    }

    pub fn with_source_files(mut self, files: impl IntoIterator<Item = String>) -> Self {
        self.source_files.extend(files);
        self
    }

    pub fn with_code_elements(mut self, elements: Vec<CodeElement>) -> Self {
        self.code_elements = elements;
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<String>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_metadata(mut self, metadata: Properties) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> NodeCategory {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn technology(&self) -> Option<&str> {
        self.technology.as_deref()
    }

    pub fn responsibilities(&self) -> &[String] {
        &self.responsibilities
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Keys of the modules this node was built from.
    pub fn source_files(&self) -> &BTreeSet<String> {
        &self.source_files
    }

    pub fn code_elements(&self) -> &[CodeElement] {
        &self.code_elements
    }

    pub fn metadata(&self) -> &Properties {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Properties {
        &mut self.metadata
    }

    /// Appends a responsibility unless it is already listed.
    pub fn add_responsibility(&mut self, responsibility: impl Into<String>) {
        let responsibility = responsibility.into();
        if !self.responsibilities.contains(&responsibility) {
            self.responsibilities.push(responsibility);
        }
    }

    /// Appends an interface name unless it is already listed.
    pub fn add_interface(&mut self, interface: impl Into<String>) {
        let interface = interface.into();
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
    }

    pub fn is_external(&self) -> bool {
        self.metadata.get_bool("external")
    }

    /// The functional area of a component, or `""`.
    pub fn functional_area(&self) -> &str {
        self.metadata.get_str("functional_area")
    }

    /// The container type (`application`, `database`, `frontend`), or `""`.
    pub fn container_type(&self) -> &str {
        self.metadata.get_str("container_type")
    }
}

/// A typed relation between two nodes, referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchEdge {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    pub description: String,
    pub technology: Option<String>,
    pub protocol: Option<String>,
    pub metadata: Properties,
}

impl ArchEdge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        kind: RelationKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            description: description.into(),
            technology: None,
            protocol: None,
            metadata: Properties::new(),
        }
    }

    pub fn with_technology(mut self, technology: Option<String>) -> Self {
        self.technology = technology;
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Properties) -> Self {
        self.metadata = metadata;
        self
    }

    /// The `(source, target, kind)` identity used for deduplication.
    pub fn key(&self) -> (&str, &str, RelationKind) {
        (&self.source, &self.target, self.kind)
    }
}
