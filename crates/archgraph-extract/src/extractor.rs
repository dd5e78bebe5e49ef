//! Relationship extraction.
//!
//! Six independent passes propose candidate edges between classified nodes;
//! the combined list is then deduplicated by `(source, target, kind)`, keeping
//! the first occurrence.

use std::collections::{BTreeSet, HashSet};

use log::{debug, info};

use archgraph_core::{model::RelationKind, properties::Properties};

use crate::{
    keywords::{self, find_in},
    module::Modules,
    node::{ArchEdge, ArchNode, NodeCategory, NodeMap},
};

/// Which database operations a read/write check looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Read,
    Write,
}

impl Operation {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Operation::Read => keywords::READ_KEYWORDS,
            Operation::Write => keywords::WRITE_KEYWORDS,
        }
    }
}

/// Infers typed edges between architecture nodes.
#[derive(Debug, Default)]
pub struct RelationshipExtractor;

impl RelationshipExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Runs every pass and returns the deduplicated edge list.
    pub fn extract(&self, nodes: &NodeMap, modules: &Modules) -> Vec<ArchEdge> {
        let mut edges = Vec::new();
        edges.extend(self.dependency_edges(nodes, modules));
        edges.extend(self.containment_edges(nodes));
        edges.extend(self.api_edges(nodes));
        edges.extend(self.database_edges(nodes, modules));
        edges.extend(self.external_edges(nodes, modules));
        edges.extend(self.code_edges(nodes, modules));

        let candidates = edges.len();
        let edges = deduplicate(edges);
        info!(candidates = candidates, edges = edges.len(); "Relationship extraction finished");
        edges
    }

    /// `depends_on` edges from each importing component to the component or
    /// external system that owns the imported name.
    fn dependency_edges(&self, nodes: &NodeMap, modules: &Modules) -> Vec<ArchEdge> {
        let mut edges = Vec::new();
        for (key, module) in modules {
            let Some(source) = components(nodes).find(|node| node.source_files().contains(key))
            else {
                continue;
            };
            for import in &module.imports {
                let Some(target) = self.find_owner(import, nodes, modules) else {
                    continue;
                };
                if target == source.name() {
                    continue;
                }
                edges.push(
                    ArchEdge::new(
                        source.name(),
                        target,
                        RelationKind::DependsOn,
                        format!("Imports {import}"),
                    )
                    .with_metadata(Properties::new().with("import", import.as_str())),
                );
            }
        }
        debug!(edges = edges.len(); "Dependency pass");
        edges
    }

    /// The component whose module stem matches `import`, else the external
    /// system that recorded it.
    fn find_owner<'a>(&self, import: &str, nodes: &'a NodeMap, modules: &Modules) -> Option<&'a str> {
        components(nodes)
            .find(|node| {
                module_stems(node, modules).any(|stem| {
                    import == stem
                        || import
                            .strip_suffix(stem.as_str())
                            .is_some_and(|prefix| prefix.ends_with('.'))
                })
            })
            .or_else(|| {
                nodes.values().find(|node| {
                    node.is_external()
                        && node
                            .metadata()
                            .get_list("imports")
                            .iter()
                            .any(|recorded| recorded == import)
                })
            })
            .map(ArchNode::name)
    }

    /// The internal system includes every container; application containers
    /// include every component.
    fn containment_edges(&self, nodes: &NodeMap) -> Vec<ArchEdge> {
        let containers: Vec<&ArchNode> = nodes
            .values()
            .filter(|node| node.category() == NodeCategory::Container)
            .collect();
        let mut edges = Vec::new();

        for system in nodes
            .values()
            .filter(|node| node.category() == NodeCategory::SoftwareSystem && !node.is_external())
        {
            for container in &containers {
                edges.push(ArchEdge::new(
                    system.name(),
                    container.name(),
                    RelationKind::Includes,
                    format!("Contains {}", container.name()),
                ));
            }
        }

        for container in containers
            .iter()
            .filter(|container| container.container_type() == "application")
        {
            for component in components(nodes) {
                edges.push(ArchEdge::new(
                    container.name(),
                    component.name(),
                    RelationKind::Includes,
                    format!("Contains {}", component.name()),
                ));
            }
        }

        debug!(edges = edges.len(); "Containment pass");
        edges
    }

    /// Frontend containers use every API component.
    fn api_edges(&self, nodes: &NodeMap) -> Vec<ArchEdge> {
        let mut edges = Vec::new();
        for frontend in nodes
            .values()
            .filter(|node| node.container_type() == "frontend")
        {
            for api in nodes
                .values()
                .filter(|node| node.functional_area().to_lowercase().contains("api"))
            {
                edges.push(
                    ArchEdge::new(
                        frontend.name(),
                        api.name(),
                        RelationKind::Uses,
                        "Makes API calls",
                    )
                    .with_protocol("HTTPS")
                    .with_technology(Some("REST/JSON".to_string())),
                );
            }
        }
        debug!(edges = edges.len(); "API pass");
        edges
    }

    /// Data access components read from or write to database containers,
    /// judged by the names of their functions and classes.
    fn database_edges(&self, nodes: &NodeMap, modules: &Modules) -> Vec<ArchEdge> {
        let databases: Vec<&ArchNode> = nodes
            .values()
            .filter(|node| node.container_type() == "database")
            .collect();
        if databases.is_empty() {
            return Vec::new();
        }

        let mut edges = Vec::new();
        for data in nodes
            .values()
            .filter(|node| node.functional_area().to_lowercase().contains("data"))
        {
            let reads = has_operation(data, Operation::Read, modules);
            let writes = has_operation(data, Operation::Write, modules);
            for database in &databases {
                let technology = database.technology().map(str::to_string);
                if reads {
                    edges.push(
                        ArchEdge::new(
                            data.name(),
                            database.name(),
                            RelationKind::ReadsFrom,
                            "Reads data",
                        )
                        .with_technology(technology.clone()),
                    );
                }
                if writes {
                    edges.push(
                        ArchEdge::new(
                            data.name(),
                            database.name(),
                            RelationKind::WritesTo,
                            "Writes data",
                        )
                        .with_technology(technology),
                    );
                }
            }
        }
        debug!(edges = edges.len(); "Database pass");
        edges
    }

    /// Internal components use external systems whose recorded imports they share.
    fn external_edges(&self, nodes: &NodeMap, modules: &Modules) -> Vec<ArchEdge> {
        let externals: Vec<&ArchNode> = nodes.values().filter(|node| node.is_external()).collect();
        let mut edges = Vec::new();

        for component in components(nodes).filter(|node| !node.is_external()) {
            let imports = component_imports(component, modules);
            for external in &externals {
                let shares_import = external
                    .metadata()
                    .get_list("imports")
                    .iter()
                    .any(|import| imports.contains(import.as_str()));
                if shares_import {
                    edges.push(
                        ArchEdge::new(
                            component.name(),
                            external.name(),
                            RelationKind::Uses,
                            format!("Uses {} services", external.name()),
                        )
                        .with_metadata(Properties::new().with("external", true)),
                    );
                }
            }
        }
        debug!(edges = edges.len(); "External pass");
        edges
    }

    /// `calls` when a component imports another component's module, `extends`
    /// when one of its class names contains a class name of the other.
    ///
    /// The inheritance check is a loose naming heuristic: `SpecialUser`
    /// "extends" `User` whether or not the code says so.
    fn code_edges(&self, nodes: &NodeMap, modules: &Modules) -> Vec<ArchEdge> {
        let with_code: Vec<&ArchNode> = components(nodes)
            .filter(|node| !node.code_elements().is_empty())
            .collect();
        let mut edges = Vec::new();

        for source in &with_code {
            let imports = component_imports(source, modules);
            let source_classes = class_names(source, modules);
            for target in &with_code {
                if source.name() == target.name() {
                    continue;
                }

                let calls = module_stems(target, modules)
                    .any(|stem| imports.iter().any(|import| import.contains(stem.as_str())));
                if calls {
                    edges.push(
                        ArchEdge::new(
                            source.name(),
                            target.name(),
                            RelationKind::Calls,
                            "Calls methods",
                        )
                        .with_metadata(Properties::new().with("code_relationship", true)),
                    );
                }

                let target_classes = class_names(target, modules);
                let extends = source_classes.iter().any(|class| {
                    let lowered = class.to_lowercase();
                    target_classes
                        .iter()
                        .any(|base| base != class && lowered.contains(&base.to_lowercase()))
                });
                if extends {
                    edges.push(
                        ArchEdge::new(
                            source.name(),
                            target.name(),
                            RelationKind::Extends,
                            "Extends/inherits from",
                        )
                        .with_metadata(Properties::new().with("code_relationship", true)),
                    );
                }
            }
        }
        debug!(edges = edges.len(); "Code pass");
        edges
    }
}

/// Keeps the first edge of every `(source, target, kind)` triple.
pub fn deduplicate(edges: Vec<ArchEdge>) -> Vec<ArchEdge> {
    let mut seen = HashSet::new();
    edges
        .into_iter()
        .filter(|edge| {
            seen.insert((edge.source.clone(), edge.target.clone(), edge.kind))
        })
        .collect()
}

fn components(nodes: &NodeMap) -> impl Iterator<Item = &ArchNode> {
    nodes
        .values()
        .filter(|node| node.category() == NodeCategory::Component)
}

/// File stems of the modules a node was built from, in original case.
fn module_stems<'a>(node: &'a ArchNode, modules: &'a Modules) -> impl Iterator<Item = String> + 'a {
    node.source_files().iter().filter_map(|key| {
        let module = modules.get(key)?;
        module
            .path_or(key)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
    })
}

fn component_imports<'a>(node: &ArchNode, modules: &'a Modules) -> BTreeSet<&'a str> {
    node.source_files()
        .iter()
        .filter_map(|key| modules.get(key))
        .flat_map(|module| module.imports.iter().map(String::as_str))
        .collect()
}

fn class_names<'a>(node: &ArchNode, modules: &'a Modules) -> Vec<&'a str> {
    node.source_files()
        .iter()
        .filter_map(|key| modules.get(key))
        .flat_map(|module| module.classes.iter().map(|class| class.name.as_str()))
        .collect()
}

fn has_operation(node: &ArchNode, operation: Operation, modules: &Modules) -> bool {
    node.source_files()
        .iter()
        .filter_map(|key| modules.get(key))
        .flat_map(|module| module.functions.iter().chain(&module.classes))
        .any(|element| find_in(&element.name.to_lowercase(), operation.keywords()).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classifier::Classifier,
        module::{ModuleSummary, RepositoryInfo},
    };

    fn modules(entries: Vec<ModuleSummary>) -> Modules {
        entries
            .into_iter()
            .map(|module| (module.path.to_string_lossy().to_string(), module))
            .collect()
    }

    fn has_edge(edges: &[ArchEdge], source: &str, target: &str, kind: RelationKind) -> bool {
        edges.iter().any(|edge| edge.key() == (source, target, kind))
    }

    #[test]
    fn test_layered_dependencies() {
        let input = modules(vec![
            ModuleSummary::new("app/controller.py", "python")
                .with_import("service")
                .with_class("OrderController"),
            ModuleSummary::new("app/service.py", "python")
                .with_import("repository")
                .with_class("OrderService"),
            ModuleSummary::new("app/repository.py", "python").with_class("OrderStore"),
        ]);
        let nodes = Classifier::new().classify(&input, &RepositoryInfo::named("Shop"));
        let edges = RelationshipExtractor::new().extract(&nodes, &input);

        assert!(has_edge(
            &edges,
            "Controllers Component",
            "Services Component",
            RelationKind::DependsOn
        ));
        assert!(has_edge(
            &edges,
            "Services Component",
            "Data Access Component",
            RelationKind::DependsOn
        ));
        assert!(!edges.iter().any(|edge| edge.source == "Controllers Component"
            && edge.target == "Data Access Component"));
        assert_eq!(edges[0].description, "Imports service");
        assert_eq!(edges[0].metadata.get_str("import"), "service");
    }

    #[test]
    fn test_containment_and_database_io() {
        let input = modules(vec![
            ModuleSummary::new("app/views.py", "python")
                .with_import("django.http")
                .with_import("redis.client")
                .with_function("index"),
            ModuleSummary::new("app/dao.py", "python")
                .with_function("fetch_orders")
                .with_function("save_order"),
        ]);
        let nodes = Classifier::new().classify(&input, &RepositoryInfo::named("Shop"));
        let edges = RelationshipExtractor::new().extract(&nodes, &input);

        assert!(has_edge(&edges, "Shop", "Shop Application", RelationKind::Includes));
        assert!(has_edge(&edges, "Shop", "Redis Database", RelationKind::Includes));
        assert!(has_edge(
            &edges,
            "Shop Application",
            "Controllers Component",
            RelationKind::Includes
        ));
        assert!(has_edge(
            &edges,
            "Data Access Component",
            "Redis Database",
            RelationKind::ReadsFrom
        ));
        assert!(has_edge(
            &edges,
            "Data Access Component",
            "Redis Database",
            RelationKind::WritesTo
        ));
        // External systems never include anything.
        assert!(!edges.iter().any(|edge| edge.source == "Web Framework"
            && edge.kind == RelationKind::Includes));
    }

    #[test]
    fn test_external_usage() {
        let input = modules(vec![
            ModuleSummary::new("src/client.py", "python")
                .with_import("requests.adapters")
                .with_function("call"),
        ]);
        let nodes = Classifier::new().classify(&input, &RepositoryInfo::named("Pay"));
        let edges = RelationshipExtractor::new().extract(&nodes, &input);

        let usage = edges
            .iter()
            .find(|edge| edge.kind == RelationKind::Uses)
            .unwrap();
        assert_eq!(usage.source, "Business Logic Component");
        assert_eq!(usage.target, "HTTP Client");
        assert_eq!(usage.description, "Uses HTTP Client services");
        assert!(usage.metadata.get_bool("external"));
    }

    #[test]
    fn test_extends_heuristic() {
        let input = modules(vec![
            ModuleSummary::new("src/models.py", "python").with_class("User"),
            ModuleSummary::new("src/auth.py", "python").with_class("AdminUser"),
        ]);
        let nodes = Classifier::new().classify(&input, &RepositoryInfo::named("App"));
        let edges = RelationshipExtractor::new().extract(&nodes, &input);

        assert!(has_edge(
            &edges,
            "Authentication Component",
            "Models Component",
            RelationKind::Extends
        ));
        assert!(!has_edge(
            &edges,
            "Models Component",
            "Authentication Component",
            RelationKind::Extends
        ));
    }

    #[test]
    fn test_deduplicate_keeps_first() {
        let edges = vec![
            ArchEdge::new("a", "b", RelationKind::Uses, "first"),
            ArchEdge::new("a", "b", RelationKind::Uses, "second"),
            ArchEdge::new("a", "b", RelationKind::Calls, "third"),
        ];
        let unique = deduplicate(edges);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].description, "first");
        assert_eq!(unique[1].kind, RelationKind::Calls);
    }
}
