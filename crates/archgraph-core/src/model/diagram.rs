//! The diagram container and its integrity checks.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    str::FromStr,
};

use indexmap::IndexMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    identifier::Id,
    model::{
        Element, ElementDetail, ElementKind, Endpoint, GraphError, RelationKind, Relationship,
    },
    properties::Properties,
};

/// The abstraction level a diagram is drawn at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DiagramLevel {
    Context,
    Container,
    Component,
    Code,
}

impl DiagramLevel {
    pub const ALL: [DiagramLevel; 4] = [
        DiagramLevel::Context,
        DiagramLevel::Container,
        DiagramLevel::Component,
        DiagramLevel::Code,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DiagramLevel::Context => "context",
            DiagramLevel::Container => "container",
            DiagramLevel::Component => "component",
            DiagramLevel::Code => "code",
        }
    }
}

impl fmt::Display for DiagramLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagramLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiagramLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or("Unsupported diagram level")
    }
}

/// How the members of a [`Cluster`] were grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterKind {
    /// Members share the same [`ElementKind`].
    ElementKind,
    /// Members share the same `responsibility` property.
    Responsibility,
}

impl ClusterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClusterKind::ElementKind => "element_kind",
            ClusterKind::Responsibility => "responsibility",
        }
    }
}

impl fmt::Display for ClusterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named group of elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    id: Id,
    kind: ClusterKind,
    name: String,
    members: Vec<Id>,
}

impl Cluster {
    pub fn new(id: Id, kind: ClusterKind, name: impl Into<String>, members: Vec<Id>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            members,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> ClusterKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Id] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Element and relationship counts of a diagram, partitioned by kind.
///
/// The per-kind counts always sum to the matching total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagramStatistics {
    pub total_elements: usize,
    pub total_relationships: usize,
    pub elements_by_kind: BTreeMap<ElementKind, usize>,
    pub relationships_by_kind: BTreeMap<RelationKind, usize>,
}

fn serialize_values<S: Serializer>(
    elements: &IndexMap<Id, Element>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(elements.values())
}

/// A single architecture view: elements, the relationships between them and
/// the clusters assigned by the optimizer.
///
/// The diagram is the sole owner of its elements. Every mutation keeps three
/// invariants:
///
/// 1. element ids are unique,
/// 2. no two elements share the same kind and name,
/// 3. every relationship endpoint names an element of this diagram.
///
/// Violations are reported as [`GraphError`] by the mutating call and leave
/// the diagram unchanged.
///
/// # Examples
///
/// ```
/// # use archgraph_core::{identifier::Id, model::*};
/// let mut diagram = Diagram::new(Id::new("shop_component"), "Shop", DiagramLevel::Component);
/// let api = diagram.add_element(Element::new(ElementKind::Component, "Api Component")).unwrap();
/// let data = diagram.add_element(Element::new(ElementKind::Component, "Data Access Component")).unwrap();
///
/// diagram.connect(api, data, RelationKind::DependsOn, "").unwrap();
/// assert!(diagram.connect(api, Id::new("nowhere"), RelationKind::Uses, "").is_err());
///
/// let stats = diagram.statistics();
/// assert_eq!(stats.total_elements, 2);
/// assert_eq!(stats.total_relationships, 1);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Diagram {
    id: Id,
    title: String,
    description: String,
    level: DiagramLevel,
    #[serde(serialize_with = "serialize_values")]
    elements: IndexMap<Id, Element>,
    relationships: Vec<Relationship>,
    clusters: Vec<Cluster>,
    metadata: Properties,
    #[serde(skip)]
    names: HashSet<(ElementKind, String)>,
    #[serde(skip)]
    next_relationship: usize,
}

impl Diagram {
    pub fn new(id: Id, title: impl Into<String>, level: DiagramLevel) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            level,
            elements: IndexMap::new(),
            relationships: Vec::new(),
            clusters: Vec::new(),
            metadata: Properties::new(),
            names: HashSet::new(),
            next_relationship: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn level(&self) -> DiagramLevel {
        self.level
    }

    pub fn metadata(&self) -> &Properties {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Properties {
        &mut self.metadata
    }

    /// Inserts an element, returning its id.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateId`] or [`GraphError::DuplicateName`] when the
    /// element clashes with one already present.
    pub fn add_element(&mut self, element: Element) -> Result<Id, GraphError> {
        let id = element.id();
        if self.elements.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        let key = (element.kind(), element.name().to_string());
        if self.names.contains(&key) {
            return Err(GraphError::DuplicateName {
                kind: key.0,
                name: key.1,
            });
        }

        trace!(id:% = id, kind:% = element.kind(); "Adding element");
        self.names.insert(key);
        self.elements.insert(id, element);
        Ok(id)
    }

    /// Removes an element together with every relationship touching it.
    ///
    /// Cluster memberships and ownership back-references to the element are
    /// dropped as well. Returns `false` when no such element exists.
    pub fn remove_element(&mut self, id: Id) -> bool {
        let Some(element) = self.elements.shift_remove(&id) else {
            return false;
        };
        self.names
            .remove(&(element.kind(), element.name().to_string()));

        let before = self.relationships.len();
        self.relationships
            .retain(|rel| rel.source() != id && rel.target() != id);
        debug!(
            id:% = id,
            removed_relationships = before - self.relationships.len();
            "Removed element"
        );

        for cluster in &mut self.clusters {
            cluster.members.retain(|member| *member != id);
        }
        self.clusters.retain(|cluster| !cluster.is_empty());

        for other in self.elements.values_mut() {
            match other.detail_mut() {
                Some(ElementDetail::System { containers, .. }) => {
                    containers.retain(|member| *member != id);
                }
                Some(ElementDetail::Container {
                    system, components, ..
                }) => {
                    components.retain(|member| *member != id);
                    if *system == Some(id) {
                        *system = None;
                    }
                }
                Some(ElementDetail::Component { container, .. }) => {
                    if *container == Some(id) {
                        *container = None;
                    }
                }
                Some(ElementDetail::Person { .. }) | None => {}
            }
        }
        true
    }

    pub fn contains_element(&self, id: Id) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn element(&self, id: Id) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn element_mut(&mut self, id: Id) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Returns the first element with the given name, in insertion order.
    pub fn element_by_name(&self, name: &str) -> Option<&Element> {
        self.elements.values().find(|element| element.name() == name)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.values_mut()
    }

    pub fn elements_of_kind(&self, kind: ElementKind) -> impl Iterator<Item = &Element> {
        self.elements
            .values()
            .filter(move |element| element.kind() == kind)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn check_endpoints(&self, relationship: &Relationship) -> Result<(), GraphError> {
        for (endpoint, role) in [
            (relationship.source(), Endpoint::Source),
            (relationship.target(), Endpoint::Target),
        ] {
            if !self.elements.contains_key(&endpoint) {
                return Err(GraphError::UnknownEndpoint {
                    relationship: relationship.id(),
                    endpoint,
                    role,
                });
            }
        }
        Ok(())
    }

    /// Inserts a relationship, returning its id.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownEndpoint`] when either endpoint is missing, or
    /// [`GraphError::DuplicateId`] when the relationship id is taken.
    pub fn add_relationship(&mut self, relationship: Relationship) -> Result<Id, GraphError> {
        self.check_endpoints(&relationship)?;
        let id = relationship.id();
        if self.relationships.iter().any(|rel| rel.id() == id) {
            return Err(GraphError::DuplicateId(id));
        }
        self.relationships.push(relationship);
        Ok(id)
    }

    /// Creates and inserts a relationship with a freshly allocated `rel_<n>` id.
    ///
    /// An empty `label` falls back to the title of `kind`.
    pub fn connect(
        &mut self,
        source: Id,
        target: Id,
        kind: RelationKind,
        label: impl Into<String>,
    ) -> Result<Id, GraphError> {
        let id = self.allocate_relationship_id();
        let relationship = Relationship::new(id, source, target, kind).with_label(label);
        self.add_relationship(relationship)
    }

    fn allocate_relationship_id(&mut self) -> Id {
        loop {
            let id = Id::from_sequence("rel", self.next_relationship);
            self.next_relationship += 1;
            if !self.relationships.iter().any(|rel| rel.id() == id) {
                return id;
            }
        }
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Mutable access to relationships. Endpoints cannot change through it.
    pub fn relationships_mut(&mut self) -> impl Iterator<Item = &mut Relationship> {
        self.relationships.iter_mut()
    }

    /// Relationships where `id` is the source or the target.
    pub fn relationships_for(&self, id: Id) -> impl Iterator<Item = &Relationship> {
        self.relationships
            .iter()
            .filter(move |rel| rel.source() == id || rel.target() == id)
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Replaces every relationship at once.
    ///
    /// All endpoints are checked before anything changes, so on error the
    /// previous relationships are kept.
    pub fn set_relationships(&mut self, relationships: Vec<Relationship>) -> Result<(), GraphError> {
        for relationship in &relationships {
            self.check_endpoints(relationship)?;
        }
        self.relationships = relationships;
        Ok(())
    }

    pub fn retain_relationships(&mut self, keep: impl FnMut(&Relationship) -> bool) {
        self.relationships.retain(keep);
    }

    /// Records that `system` owns `container`.
    pub fn link_container(&mut self, system: Id, container: Id) -> Result<(), GraphError> {
        self.check_link(system, container, |owner, member| {
            matches!(
                (owner, member),
                (ElementDetail::System { .. }, ElementDetail::Container { .. })
            )
        })?;
        if let Some(ElementDetail::Container { system: owner, .. }) =
            self.elements.get_mut(&container).and_then(Element::detail_mut)
        {
            *owner = Some(system);
        }
        if let Some(ElementDetail::System { containers, .. }) =
            self.elements.get_mut(&system).and_then(Element::detail_mut)
        {
            if !containers.contains(&container) {
                containers.push(container);
            }
        }
        Ok(())
    }

    /// Records that `container` owns `component`.
    pub fn link_component(&mut self, container: Id, component: Id) -> Result<(), GraphError> {
        self.check_link(container, component, |owner, member| {
            matches!(
                (owner, member),
                (ElementDetail::Container { .. }, ElementDetail::Component { .. })
            )
        })?;
        if let Some(ElementDetail::Component { container: owner, .. }) =
            self.elements.get_mut(&component).and_then(Element::detail_mut)
        {
            *owner = Some(container);
        }
        if let Some(ElementDetail::Container { components, .. }) =
            self.elements.get_mut(&container).and_then(Element::detail_mut)
        {
            if !components.contains(&component) {
                components.push(component);
            }
        }
        Ok(())
    }

    fn check_link(
        &self,
        owner: Id,
        member: Id,
        compatible: impl Fn(&ElementDetail, &ElementDetail) -> bool,
    ) -> Result<(), GraphError> {
        let owner_detail = self
            .elements
            .get(&owner)
            .ok_or(GraphError::UnknownElement(owner))?
            .detail();
        let member_detail = self
            .elements
            .get(&member)
            .ok_or(GraphError::UnknownElement(member))?
            .detail();
        match (owner_detail, member_detail) {
            (Some(owner_detail), Some(member_detail)) if compatible(owner_detail, member_detail) => {
                Ok(())
            }
            _ => Err(GraphError::InvalidLink {
                owner,
                member,
                reason: "element kinds cannot be linked",
            }),
        }
    }

    /// Records a cluster. Every member must be an element of this diagram.
    pub fn add_cluster(&mut self, cluster: Cluster) -> Result<(), GraphError> {
        if let Some(missing) = cluster
            .members
            .iter()
            .find(|member| !self.elements.contains_key(*member))
        {
            return Err(GraphError::UnknownElement(*missing));
        }
        self.clusters.push(cluster);
        Ok(())
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn clear_clusters(&mut self) {
        self.clusters.clear();
    }

    /// Re-checks every invariant without changing anything.
    ///
    /// Returns one human readable description per violation; an empty list
    /// means the diagram is consistent.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let mut seen_ids: HashMap<Id, usize> = HashMap::new();
        for (key, element) in &self.elements {
            if *key != element.id() {
                issues.push(format!(
                    "Element `{}` is stored under a different id `{key}`",
                    element.id()
                ));
            }
            *seen_ids.entry(element.id()).or_default() += 1;
        }
        for (id, count) in &seen_ids {
            if *count > 1 {
                issues.push(format!("Duplicate element id: {id}"));
            }
        }

        let mut seen_names = HashSet::new();
        for element in self.elements.values() {
            if !seen_names.insert((element.kind(), element.name())) {
                issues.push(format!(
                    "Duplicate {} name: {}",
                    element.kind(),
                    element.name()
                ));
            }
        }

        for rel in &self.relationships {
            if !self.elements.contains_key(&rel.source()) {
                issues.push(format!(
                    "Relationship {} references unknown source element {}",
                    rel.id(),
                    rel.source()
                ));
            }
            if !self.elements.contains_key(&rel.target()) {
                issues.push(format!(
                    "Relationship {} references unknown target element {}",
                    rel.id(),
                    rel.target()
                ));
            }
        }

        issues
    }

    pub fn statistics(&self) -> DiagramStatistics {
        let mut stats = DiagramStatistics {
            total_elements: self.elements.len(),
            total_relationships: self.relationships.len(),
            ..Default::default()
        };
        for element in self.elements.values() {
            *stats.elements_by_kind.entry(element.kind()).or_default() += 1;
        }
        for rel in &self.relationships {
            *stats.relationships_by_kind.entry(rel.kind()).or_default() += 1;
        }
        stats
    }
}
