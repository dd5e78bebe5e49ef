//! Diagram elements and their kind-specific payloads.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{geometry::Point, identifier::Id, properties::Properties};

/// The kind of a renderable element.
///
/// The names match external configuration strings (snake_case).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Person,
    System,
    ExternalSystem,
    Container,
    Component,
    Database,
    Queue,
    FileSystem,
}

impl ElementKind {
    /// Every kind, in declaration order.
    pub const ALL: [ElementKind; 8] = [
        ElementKind::Person,
        ElementKind::System,
        ElementKind::ExternalSystem,
        ElementKind::Container,
        ElementKind::Component,
        ElementKind::Database,
        ElementKind::Queue,
        ElementKind::FileSystem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Person => "person",
            ElementKind::System => "system",
            ElementKind::ExternalSystem => "external_system",
            ElementKind::Container => "container",
            ElementKind::Component => "component",
            ElementKind::Database => "database",
            ElementKind::Queue => "queue",
            ElementKind::FileSystem => "file_system",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or("Unsupported element kind")
    }
}

/// Kind-specific fields of an element.
///
/// Back-references (`system`, `container`) and ownership lists hold ids only;
/// the owning [`Diagram`](super::Diagram) is the single owner of every element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementDetail {
    Person {
        role: Option<String>,
    },
    System {
        external: bool,
        containers: Vec<Id>,
    },
    Container {
        system: Option<Id>,
        components: Vec<Id>,
        port: Option<u16>,
        url: Option<String>,
    },
    Component {
        container: Option<Id>,
        responsibility: Option<String>,
        interfaces: Vec<String>,
    },
}

/// A renderable node of an architecture diagram.
///
/// The id, kind and name are fixed at construction; everything else may be
/// enriched later. Positions are absent until a layout pass runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    id: Id,
    name: String,
    description: String,
    kind: ElementKind,
    technology: Option<String>,
    tags: BTreeSet<String>,
    properties: Properties,
    position: Option<Point>,
    detail: Option<ElementDetail>,
}

impl Element {
    /// Creates a plain element whose id is derived from its kind and name.
    ///
    /// An empty name becomes `"Unnamed <kind>"`.
    pub fn new(kind: ElementKind, name: impl Into<String>) -> Self {
        let mut name = name.into();
        if name.is_empty() {
            name = format!("Unnamed {kind}");
        }
        let id = Id::new(kind.as_str()).create_nested(Id::new(&name));
        Self {
            id,
            name,
            description: String::new(),
            kind,
            technology: None,
            tags: BTreeSet::new(),
            properties: Properties::new(),
            position: None,
            detail: None,
        }
    }

    /// Creates a person with an optional role.
    pub fn person(name: impl Into<String>, role: Option<String>) -> Self {
        let mut element = Self::new(ElementKind::Person, name);
        if let Some(role) = &role {
            element.properties.insert("role", role.as_str());
        }
        element.detail = Some(ElementDetail::Person { role });
        element
    }

    /// Creates a software system. External systems get the `external_system` kind.
    pub fn system(name: impl Into<String>, external: bool) -> Self {
        let kind = if external {
            ElementKind::ExternalSystem
        } else {
            ElementKind::System
        };
        let mut element = Self::new(kind, name);
        element.properties.insert("is_external", external);
        element.detail = Some(ElementDetail::System {
            external,
            containers: Vec::new(),
        });
        element
    }

    /// Creates a container of the given kind (`container`, `database`, `queue` or `file_system`).
    pub fn container(
        kind: ElementKind,
        name: impl Into<String>,
        port: Option<u16>,
        url: Option<String>,
    ) -> Self {
        let mut element = Self::new(kind, name);
        if let Some(port) = port {
            element.properties.insert("port", i64::from(port));
        }
        if let Some(url) = &url {
            element.properties.insert("url", url.as_str());
        }
        element.detail = Some(ElementDetail::Container {
            system: None,
            components: Vec::new(),
            port,
            url,
        });
        element
    }

    /// Creates a component with an optional responsibility and its interfaces.
    pub fn component(
        name: impl Into<String>,
        responsibility: Option<String>,
        interfaces: Vec<String>,
    ) -> Self {
        let mut element = Self::new(ElementKind::Component, name);
        if let Some(responsibility) = &responsibility {
            element
                .properties
                .insert("responsibility", responsibility.as_str());
        }
        if !interfaces.is_empty() {
            element.properties.insert("interfaces", interfaces.clone());
        }
        element.detail = Some(ElementDetail::Component {
            container: None,
            responsibility,
            interfaces,
        });
        element
    }

    /// Replaces the derived id with an explicit one.
    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_technology(mut self, technology: Option<String>) -> Self {
        self.technology = technology.filter(|tech| !tech.is_empty());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn technology(&self) -> Option<&str> {
        self.technology.as_deref()
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = Some(position);
    }

    pub fn detail(&self) -> Option<&ElementDetail> {
        self.detail.as_ref()
    }

    pub(super) fn detail_mut(&mut self) -> Option<&mut ElementDetail> {
        self.detail.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_derived_from_kind_and_name() {
        let element = Element::new(ElementKind::Component, "Services Component");
        assert_eq!(element.id(), "component::Services Component");
        assert_eq!(element.name(), "Services Component");
        assert!(element.position().is_none());
    }

    #[test]
    fn test_empty_name_is_replaced() {
        let element = Element::new(ElementKind::Queue, "");
        assert_eq!(element.name(), "Unnamed queue");
    }

    #[test]
    fn test_external_system_kind() {
        let external = Element::system("HTTP Client", true);
        let internal = Element::system("Shop", false);

        assert_eq!(external.kind(), ElementKind::ExternalSystem);
        assert_eq!(internal.kind(), ElementKind::System);
        assert!(external.properties().get_bool("is_external"));
        assert!(!internal.properties().get_bool("is_external"));
    }

    #[test]
    fn test_component_properties() {
        let component = Element::component(
            "Controllers Component",
            Some("Request handling and routing".to_string()),
            vec!["Handler".to_string()],
        );

        assert_eq!(
            component.properties().get_str("responsibility"),
            "Request handling and routing"
        );
        assert_eq!(component.properties().get_list("interfaces"), ["Handler"]);
        assert!(matches!(
            component.detail(),
            Some(ElementDetail::Component {
                container: None,
                ..
            })
        ));
    }

    #[test]
    fn test_container_properties() {
        let container = Element::container(
            ElementKind::Database,
            "Postgresql Database",
            Some(5432),
            None,
        );
        assert_eq!(container.kind(), ElementKind::Database);
        assert_eq!(container.properties().get_int("port"), 5432);
        assert!(!container.properties().contains_key("url"));
    }

    #[test]
    fn test_person_role() {
        let person = Element::person("Administrator", Some("admin".to_string()));
        assert_eq!(person.properties().get_str("role"), "admin");
        assert_eq!(person.kind(), ElementKind::Person);
    }

    #[test]
    fn test_element_kind_round_trip_strings() {
        for kind in ElementKind::ALL {
            assert_eq!(kind.as_str().parse::<ElementKind>(), Ok(kind));
        }
        assert!("widget".parse::<ElementKind>().is_err());
    }
}
