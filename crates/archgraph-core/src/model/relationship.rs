//! Typed relationships between diagram elements.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{identifier::Id, properties::Properties};

/// The kind of a relationship.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Uses,
    DependsOn,
    Includes,
    Extends,
    Implements,
    Calls,
    SendsDataTo,
    ReadsFrom,
    WritesTo,
}

impl RelationKind {
    /// Every kind, in declaration order.
    pub const ALL: [RelationKind; 9] = [
        RelationKind::Uses,
        RelationKind::DependsOn,
        RelationKind::Includes,
        RelationKind::Extends,
        RelationKind::Implements,
        RelationKind::Calls,
        RelationKind::SendsDataTo,
        RelationKind::ReadsFrom,
        RelationKind::WritesTo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Uses => "uses",
            RelationKind::DependsOn => "depends_on",
            RelationKind::Includes => "includes",
            RelationKind::Extends => "extends",
            RelationKind::Implements => "implements",
            RelationKind::Calls => "calls",
            RelationKind::SendsDataTo => "sends_data_to",
            RelationKind::ReadsFrom => "reads_from",
            RelationKind::WritesTo => "writes_to",
        }
    }

    /// Human readable form used as the default label, e.g. `"Depends On"`.
    pub fn title(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or("Unsupported relationship kind")
    }
}

/// A directed, labelled edge between two elements of the same diagram.
///
/// The endpoints are fixed at construction. Whether they exist is checked by
/// [`Diagram::add_relationship`](super::Diagram::add_relationship).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    id: Id,
    source: Id,
    target: Id,
    label: String,
    description: Option<String>,
    kind: RelationKind,
    technology: Option<String>,
    properties: Properties,
}

impl Relationship {
    /// Creates a relationship labelled with the title of its kind.
    pub fn new(id: Id, source: Id, target: Id, kind: RelationKind) -> Self {
        Self {
            id,
            source,
            target,
            label: kind.title(),
            description: None,
            kind,
            technology: None,
            properties: Properties::new(),
        }
    }

    /// Sets the label; an empty label keeps the default.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !label.is_empty() {
            self.label = label;
        }
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_technology(mut self, technology: Option<String>) -> Self {
        self.technology = technology;
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn technology(&self) -> Option<&str> {
        self.technology.as_deref()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        assert_eq!(RelationKind::DependsOn.title(), "Depends On");
        assert_eq!(RelationKind::Uses.title(), "Uses");
        assert_eq!(RelationKind::SendsDataTo.title(), "Sends Data To");
    }

    #[test]
    fn test_default_label_is_kind_title() {
        let rel = Relationship::new(
            Id::new("rel_0"),
            Id::new("a"),
            Id::new("b"),
            RelationKind::ReadsFrom,
        );
        assert_eq!(rel.label(), "Reads From");

        let rel = rel.with_label("");
        assert_eq!(rel.label(), "Reads From");

        let rel = rel.with_label("Reads orders");
        assert_eq!(rel.label(), "Reads orders");
    }

    #[test]
    fn test_kind_from_str() {
        for kind in RelationKind::ALL {
            assert_eq!(kind.as_str().parse::<RelationKind>(), Ok(kind));
        }
        assert!("owns".parse::<RelationKind>().is_err());
    }
}
