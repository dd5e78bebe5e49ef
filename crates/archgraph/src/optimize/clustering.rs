//! Clustering pass.
//!
//! Two independent groupings run one after the other: by element kind and by
//! the `responsibility` property. An element can end up in clusters from both.

use indexmap::IndexMap;
use log::debug;

use archgraph_core::{
    identifier::Id,
    model::{Cluster, ClusterKind, Diagram, ElementKind, GraphError},
};
use archgraph_extract::keywords::words_title;

use crate::config::OptimizerConfig;

const CLUSTER_PROPERTIES: [&str; 3] = ["cluster_id", "cluster_type", "cluster_ids"];

/// Replaces the clusters of `diagram` with freshly computed ones.
///
/// Returns the number of clusters formed.
pub fn cluster(diagram: &mut Diagram, config: &OptimizerConfig) -> Result<usize, GraphError> {
    diagram.clear_clusters();
    for element in diagram.elements_mut() {
        for key in CLUSTER_PROPERTIES {
            element.properties_mut().remove(key);
        }
    }

    let mut proposals = Vec::new();
    if config.cluster_by_type() {
        proposals.extend(by_kind(diagram));
    }
    if config.cluster_by_responsibility() {
        proposals.extend(by_responsibility(diagram, config.max_cluster_size()));
    }

    let formed = proposals.len();
    for (idx, (kind, name, members)) in proposals.into_iter().enumerate() {
        let id = Id::from_sequence("cluster", idx);
        debug!(id:% = id, kind:% = kind, name = name, members = members.len(); "Cluster formed");
        for member in &members {
            if let Some(element) = diagram.element_mut(*member) {
                let properties = element.properties_mut();
                if !properties.contains_key("cluster_id") {
                    properties.insert("cluster_id", id.as_string());
                }
                properties.insert("cluster_type", kind.as_str());
                properties.push_to_list("cluster_ids", id.as_string());
            }
        }
        diagram.add_cluster(Cluster::new(id, kind, name, members))?;
    }
    Ok(formed)
}

type Proposal = (ClusterKind, String, Vec<Id>);

/// One cluster per element kind with at least two members.
fn by_kind(diagram: &Diagram) -> Vec<Proposal> {
    let mut groups: IndexMap<ElementKind, Vec<Id>> = IndexMap::new();
    for element in diagram.elements() {
        groups.entry(element.kind()).or_default().push(element.id());
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(kind, members)| {
            let name = format!("{} Cluster", words_title(kind.as_str()));
            (ClusterKind::ElementKind, name, members)
        })
        .collect()
}

/// One cluster per `responsibility` value shared by `2..=max_size` elements.
///
/// Elements without the property are grouped under `unknown`.
fn by_responsibility(diagram: &Diagram, max_size: usize) -> Vec<Proposal> {
    let mut groups: IndexMap<String, Vec<Id>> = IndexMap::new();
    for element in diagram.elements() {
        let responsibility = element
            .properties()
            .get_str_or("responsibility", "unknown")
            .to_string();
        groups.entry(responsibility).or_default().push(element.id());
    }

    groups
        .into_iter()
        .filter(|(_, members)| (2..=max_size).contains(&members.len()))
        .map(|(responsibility, members)| {
            let name = format!("{responsibility} Components");
            (ClusterKind::Responsibility, name, members)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use archgraph_core::model::{DiagramLevel, Element};

    use super::*;

    fn diagram() -> Diagram {
        let mut diagram = Diagram::new(Id::new("clusters"), "Clusters", DiagramLevel::Container);
        diagram.add_element(Element::system("Shop", false)).unwrap();
        for (name, responsibility) in [
            ("Orders Component", "Business logic processing"),
            ("Billing Component", "Business logic processing"),
            ("Api Component", "Request handling and routing"),
        ] {
            diagram
                .add_element(Element::component(name, Some(responsibility.to_string()), vec![]))
                .unwrap();
        }
        diagram
    }

    #[test]
    fn test_kind_and_responsibility_clusters() {
        let mut diagram = diagram();
        let formed = cluster(&mut diagram, &OptimizerConfig::default()).unwrap();

        assert_eq!(formed, 2);
        let clusters = diagram.clusters();
        assert_eq!(clusters[0].id(), "cluster_0");
        assert_eq!(clusters[0].name(), "Component Cluster");
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[1].id(), "cluster_1");
        assert_eq!(clusters[1].name(), "Business logic processing Components");
        assert_eq!(clusters[1].kind(), ClusterKind::Responsibility);

        let orders = diagram.element_by_name("Orders Component").unwrap();
        assert_eq!(orders.properties().get_str("cluster_id"), "cluster_0");
        assert_eq!(orders.properties().get_str("cluster_type"), "responsibility");
        assert_eq!(orders.properties().get_list("cluster_ids"), ["cluster_0", "cluster_1"]);

        let shop = diagram.element_by_name("Shop").unwrap();
        assert!(!shop.properties().contains_key("cluster_id"));
    }

    #[test]
    fn test_responsibility_cluster_size_limit() {
        let mut diagram = diagram();
        let config = OptimizerConfig::default()
            .with_cluster_groupings(false, true)
            .with_max_cluster_size(1);
        assert_eq!(cluster(&mut diagram, &config).unwrap(), 0);
        assert!(diagram.clusters().is_empty());
    }

    #[test]
    fn test_reclustering_is_stable() {
        let mut diagram = diagram();
        let config = OptimizerConfig::default();
        cluster(&mut diagram, &config).unwrap();
        let first = diagram.clusters().to_vec();
        cluster(&mut diagram, &config).unwrap();

        assert_eq!(diagram.clusters(), first.as_slice());
        let orders = diagram.element_by_name("Orders Component").unwrap();
        assert_eq!(orders.properties().get_list("cluster_ids").len(), 2);
    }

    proptest! {
        #[test]
        fn kind_clusters_never_have_one_member(kinds in prop::collection::vec(0usize..8, 0..24)) {
            let mut diagram = Diagram::new(Id::new("p"), "P", DiagramLevel::Container);
            for (i, kind) in kinds.iter().enumerate() {
                diagram
                    .add_element(Element::new(ElementKind::ALL[*kind], format!("e{i}")))
                    .unwrap();
            }
            let config = OptimizerConfig::default().with_cluster_groupings(true, false);
            cluster(&mut diagram, &config).unwrap();

            for cluster in diagram.clusters() {
                prop_assert!(cluster.len() >= 2);
            }
        }
    }
}
