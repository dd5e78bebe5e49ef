//! Component classification.
//!
//! Turns module summaries into a name-keyed map of [`ArchNode`]s: one
//! software system, optional containers, one component per non-empty
//! functional area and the external systems referenced through imports.
//! Every step is best effort; missing data yields missing nodes, never an
//! error.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::Path,
};

use log::{debug, info};
use serde::Serialize;

use archgraph_core::properties::Properties;

use crate::{
    keywords::{self, find_in, title_case, words_title},
    module::{Modules, RepositoryInfo},
    node::{ArchNode, NodeCategory, NodeMap},
};

/// The coarse kind of the analyzed project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    WebApplication,
    ApiService,
    DesktopApplication,
    Library,
    Application,
}

impl ProjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectType::WebApplication => "web_application",
            ProjectType::ApiService => "api_service",
            ProjectType::DesktopApplication => "desktop_application",
            ProjectType::Library => "library",
            ProjectType::Application => "application",
        }
    }

    /// Whether the project gets a main application container.
    pub fn has_application_container(self) -> bool {
        matches!(self, ProjectType::WebApplication | ProjectType::ApiService)
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the ten fixed buckets modules are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionalArea {
    Authentication,
    UserManagement,
    DataAccess,
    Api,
    BusinessLogic,
    Utilities,
    Configuration,
    Models,
    Controllers,
    Services,
}

impl FunctionalArea {
    /// Every area, in the order components are emitted.
    pub const ALL: [FunctionalArea; 10] = [
        FunctionalArea::Authentication,
        FunctionalArea::UserManagement,
        FunctionalArea::DataAccess,
        FunctionalArea::Api,
        FunctionalArea::BusinessLogic,
        FunctionalArea::Utilities,
        FunctionalArea::Configuration,
        FunctionalArea::Models,
        FunctionalArea::Controllers,
        FunctionalArea::Services,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FunctionalArea::Authentication => "authentication",
            FunctionalArea::UserManagement => "user_management",
            FunctionalArea::DataAccess => "data_access",
            FunctionalArea::Api => "api",
            FunctionalArea::BusinessLogic => "business_logic",
            FunctionalArea::Utilities => "utilities",
            FunctionalArea::Configuration => "configuration",
            FunctionalArea::Models => "models",
            FunctionalArea::Controllers => "controllers",
            FunctionalArea::Services => "services",
        }
    }

    /// The name of the component built from this area, e.g. `"Data Access Component"`.
    pub fn component_name(self) -> String {
        format!("{} Component", words_title(self.as_str()))
    }
}

impl fmt::Display for FunctionalArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project-wide facts derived from every import and file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectContext {
    pub project_name: String,
    pub project_type: ProjectType,
    pub framework: Option<&'static str>,
    pub database: Option<&'static str>,
    pub has_api: bool,
    pub has_ui: bool,
}

/// Groups module summaries into architecture nodes.
///
/// # Examples
///
/// ```
/// # use archgraph_extract::{Classifier, ModuleSummary, Modules, RepositoryInfo};
/// let mut modules = Modules::new();
/// modules.insert(
///     "app/user_service.py".to_string(),
///     ModuleSummary::new("app/user_service.py", "python").with_class("UserService"),
/// );
///
/// let nodes = Classifier::new().classify(&modules, &RepositoryInfo::named("Shop"));
/// assert!(nodes.contains_key("Shop"));
/// assert!(nodes.contains_key("User Management Component"));
/// ```
#[derive(Debug, Default)]
pub struct Classifier;

impl Classifier {
    pub fn new() -> Self {
        Self
    }

    /// Classifies the whole codebase.
    pub fn classify(&self, modules: &Modules, repository: &RepositoryInfo) -> NodeMap {
        let context = self.analyze_context(modules, repository);
        info!(
            project = context.project_name,
            project_type:% = context.project_type,
            framework:? = context.framework,
            database:? = context.database;
            "Classifying modules"
        );

        let mut nodes = NodeMap::new();
        insert_first(&mut nodes, self.main_system(modules, &context));
        for container in self.containers(modules, &context) {
            insert_first(&mut nodes, container);
        }
        for component in self.components(modules) {
            insert_first(&mut nodes, component);
        }
        for external in self.external_systems(modules) {
            insert_first(&mut nodes, external);
        }

        info!(nodes = nodes.len(); "Classification finished");
        nodes
    }

    /// Derives the project context from imports and file names.
    pub fn analyze_context(&self, modules: &Modules, repository: &RepositoryInfo) -> ProjectContext {
        let mut imports = BTreeSet::new();
        let mut filenames = BTreeSet::new();
        for (key, module) in modules {
            imports.extend(module.imports.iter().map(|import| import.to_lowercase()));
            if let Some(name) = module.path_or(key).file_name() {
                filenames.insert(name.to_string_lossy().to_lowercase());
            }
        }
        let imports_text = imports.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
        let filenames_text = filenames
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        let project_type = if find_in(&imports_text, keywords::WEB_INDICATORS).is_some() {
            ProjectType::WebApplication
        } else if find_in(&imports_text, keywords::API_INDICATORS).is_some() {
            ProjectType::ApiService
        } else if find_in(&imports_text, keywords::DESKTOP_INDICATORS).is_some() {
            ProjectType::DesktopApplication
        } else if keywords::LIBRARY_MARKERS
            .iter()
            .any(|marker| filenames.contains(*marker))
        {
            ProjectType::Library
        } else {
            ProjectType::Application
        };

        let framework = keywords::FRAMEWORKS
            .iter()
            .find(|framework| imports_text.contains(framework.name))
            .map(|framework| framework.name);
        let database = find_in(&imports_text, keywords::DATABASES);

        let has_api = find_in(&imports_text, keywords::API_IMPORT_PATTERNS).is_some()
            || modules.values().any(|module| {
                module.functions.iter().any(|function| {
                    find_in(&function.name.to_lowercase(), keywords::API_FUNCTION_KEYWORDS)
                        .is_some()
                })
            });
        let has_ui = keywords::UI_PATTERNS
            .iter()
            .any(|pattern| imports_text.contains(pattern) || filenames_text.contains(pattern));

        ProjectContext {
            project_name: repository.project_name().to_string(),
            project_type,
            framework,
            database,
            has_api,
            has_ui,
        }
    }

    fn main_system(&self, modules: &Modules, context: &ProjectContext) -> ArchNode {
        let mut description = words_title(context.project_type.as_str());
        if let Some(framework) = context.framework {
            description.push_str(&format!(" built with {}", title_case(framework)));
        }

        ArchNode::new(
            &context.project_name,
            NodeCategory::SoftwareSystem,
            description,
        )
        .with_technology(context.framework.map(str::to_string))
        .with_source_files(modules.keys().cloned())
        .with_metadata(
            Properties::new()
                .with("project_type", context.project_type.as_str())
                .with("has_api", context.has_api)
                .with("has_ui", context.has_ui),
        )
    }

    fn containers(&self, modules: &Modules, context: &ProjectContext) -> Vec<ArchNode> {
        let mut containers = Vec::new();

        if context.project_type.has_application_container() {
            containers.push(
                ArchNode::new(
                    format!("{} Application", context.project_name),
                    NodeCategory::Container,
                    format!(
                        "Main {} container",
                        context.project_type.as_str().replace('_', " ")
                    ),
                )
                .with_technology(context.framework.map(str::to_string))
                .with_source_files(modules.keys().cloned())
                .with_metadata(Properties::new().with("container_type", "application")),
            );
        }

        if let Some(database) = context.database {
            containers.push(
                ArchNode::new(
                    format!("{} Database", title_case(database)),
                    NodeCategory::Container,
                    "Stores application data",
                )
                .with_technology(Some(database.to_string()))
                .with_metadata(Properties::new().with("container_type", "database")),
            );
        }

        if context.has_ui && context.project_type == ProjectType::ApiService {
            containers.push(
                ArchNode::new(
                    "Web Frontend",
                    NodeCategory::Container,
                    "User interface for the application",
                )
                .with_technology(Some("HTML/CSS/JavaScript".to_string()))
                .with_metadata(Properties::new().with("container_type", "frontend")),
            );
        }

        containers
    }

    fn components(&self, modules: &Modules) -> Vec<ArchNode> {
        let mut groups: BTreeMap<FunctionalArea, Vec<&str>> = BTreeMap::new();
        for (key, module) in modules {
            let area = Self::functional_area(module.path_or(key));
            debug!(module = key, area:% = area; "Assigned module to functional area");
            groups.entry(area).or_default().push(key);
        }

        FunctionalArea::ALL
            .into_iter()
            .filter_map(|area| {
                let keys = groups.get(&area)?;
                let mut code_elements = Vec::new();
                let mut interfaces = Vec::new();
                for key in keys {
                    let Some(module) = modules.get(*key) else {
                        continue;
                    };
                    code_elements.extend(module.code_elements().cloned());
                    for interface in &module.interfaces {
                        if !interfaces.contains(&interface.name) {
                            interfaces.push(interface.name.clone());
                        }
                    }
                }
                if code_elements.is_empty() {
                    debug!(area:% = area; "Skipping functional area without code elements");
                    return None;
                }

                Some(
                    ArchNode::new(
                        area.component_name(),
                        NodeCategory::Component,
                        format!("Handles {} functionality", area.as_str().replace('_', " ")),
                    )
                    .with_code_elements(code_elements)
                    .with_interfaces(interfaces)
                    .with_source_files(keys.iter().map(|key| key.to_string()))
                    .with_metadata(Properties::new().with("functional_area", area.as_str())),
                )
            })
            .collect()
    }

    /// Buckets a module by its file stem, then by its parent directory.
    pub fn functional_area(path: &Path) -> FunctionalArea {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let parent = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        keywords::MODULE_NAME_RULES
            .iter()
            .find(|(_, patterns)| find_in(&stem, patterns).is_some())
            .or_else(|| {
                keywords::PARENT_DIR_RULES
                    .iter()
                    .find(|(_, patterns)| find_in(&parent, patterns).is_some())
            })
            .map(|(area, _)| *area)
            .unwrap_or(FunctionalArea::BusinessLogic)
    }

    fn external_systems(&self, modules: &Modules) -> Vec<ArchNode> {
        let external_imports: BTreeSet<&str> = modules
            .values()
            .flat_map(|module| module.imports.iter())
            .map(String::as_str)
            .filter(|import| !is_local_import(import) && !is_standard_library(import))
            .collect();

        let mut groups: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
        let mut order: Vec<String> = Vec::new();
        for import in external_imports {
            let lowered = import.to_lowercase();
            let system = keywords::EXTERNAL_SYSTEMS
                .iter()
                .find(|(_, patterns)| find_in(&lowered, patterns).is_some())
                .map(|(name, _)| name.to_string())
                .unwrap_or_else(|| {
                    let root = import.split('.').next().unwrap_or(import);
                    format!("External {} System", title_case(root))
                });
            if !groups.contains_key(&system) {
                order.push(system.clone());
            }
            groups.entry(system).or_default().insert(import);
        }

        order
            .into_iter()
            .filter_map(|name| {
                let imports = groups.remove(&name)?;
                debug!(system = name, imports = imports.len(); "Detected external system");
                let imports: Vec<String> = imports.into_iter().map(str::to_string).collect();
                Some(
                    ArchNode::new(
                        &name,
                        NodeCategory::SoftwareSystem,
                        format!("External {name} system"),
                    )
                    .with_metadata(
                        Properties::new()
                            .with("external", true)
                            .with("imports", imports),
                    ),
                )
            })
            .collect()
    }
}

/// Inserts `node` unless a node with the same name already exists.
fn insert_first(nodes: &mut NodeMap, node: ArchNode) {
    if nodes.contains_key(node.name()) {
        debug!(name = node.name(); "Ignoring node with a name already in use");
        return;
    }
    nodes.insert(node.name().to_string(), node);
}

/// Relative and single-segment imports are treated as project-local.
pub fn is_local_import(import: &str) -> bool {
    import.starts_with('.') || !import.contains('.')
}

pub fn is_standard_library(import: &str) -> bool {
    let root = import.split('.').next().unwrap_or(import);
    keywords::STDLIB_MODULES.contains(&root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleSummary;

    fn modules(entries: Vec<ModuleSummary>) -> Modules {
        entries
            .into_iter()
            .map(|module| (module.path.to_string_lossy().to_string(), module))
            .collect()
    }

    #[test]
    fn test_functional_area_priority() {
        assert_eq!(
            Classifier::functional_area(Path::new("src/auth_controller.py")),
            FunctionalArea::Authentication
        );
        assert_eq!(
            Classifier::functional_area(Path::new("src/user_model.py")),
            FunctionalArea::UserManagement
        );
        assert_eq!(
            Classifier::functional_area(Path::new("src/repository.py")),
            FunctionalArea::DataAccess
        );
        assert_eq!(
            Classifier::functional_area(Path::new("src/models/order.py")),
            FunctionalArea::Models
        );
        assert_eq!(
            Classifier::functional_area(Path::new("src/main.py")),
            FunctionalArea::BusinessLogic
        );
    }

    #[test]
    fn test_import_filters() {
        assert!(is_local_import(".sibling"));
        assert!(is_local_import("requests"));
        assert!(!is_local_import("requests.adapters"));
        assert!(is_standard_library("os.path"));
        assert!(!is_standard_library("boto3.session"));
    }

    #[test]
    fn test_web_project_gets_application_and_database() {
        let input = modules(vec![
            ModuleSummary::new("app/routes.py", "python")
                .with_import("flask.views")
                .with_import("psycopg2.postgresql")
                .with_function("index"),
        ]);
        let context = Classifier::new().analyze_context(&input, &RepositoryInfo::named("Shop"));
        assert_eq!(context.project_type, ProjectType::WebApplication);
        assert_eq!(context.framework, Some("flask"));
        assert_eq!(context.database, Some("postgresql"));

        let nodes = Classifier::new().classify(&input, &RepositoryInfo::named("Shop"));
        let system = &nodes["Shop"];
        assert_eq!(system.description(), "Web Application built with Flask");
        assert_eq!(nodes["Shop Application"].container_type(), "application");
        assert_eq!(nodes["Postgresql Database"].container_type(), "database");
        assert!(!nodes.contains_key("Web Frontend"));
    }

    #[test]
    fn test_library_marker() {
        let input = modules(vec![ModuleSummary::new("pkg/Cargo.toml", "toml")]);
        let context = Classifier::new().analyze_context(&input, &RepositoryInfo::default());
        assert_eq!(context.project_type, ProjectType::Library);
        assert_eq!(context.project_name, "Unknown Project");
    }

    #[test]
    fn test_components_require_code_elements() {
        let input = modules(vec![
            ModuleSummary::new("src/settings.py", "python"),
            ModuleSummary::new("src/helpers.py", "python")
                .with_function("slugify")
                .with_interface("Formatter"),
        ]);
        let nodes = Classifier::new().classify(&input, &RepositoryInfo::named("Tool"));

        assert!(!nodes.contains_key("Configuration Component"));
        let utilities = &nodes["Utilities Component"];
        assert_eq!(utilities.category(), NodeCategory::Component);
        assert_eq!(utilities.functional_area(), "utilities");
        assert_eq!(utilities.description(), "Handles utilities functionality");
        assert_eq!(utilities.interfaces(), ["Formatter"]);
        assert_eq!(utilities.code_elements().len(), 2);
    }

    #[test]
    fn test_external_systems_grouping() {
        let input = modules(vec![
            ModuleSummary::new("src/client.py", "python")
                .with_import("requests.adapters")
                .with_import("httpx.client")
                .with_import("stripe.api")
                .with_import("os.path")
                .with_import("local")
                .with_function("call"),
        ]);
        let nodes = Classifier::new().classify(&input, &RepositoryInfo::named("Pay"));

        let http = &nodes["HTTP Client"];
        assert!(http.is_external());
        assert_eq!(
            http.metadata().get_list("imports"),
            ["httpx.client", "requests.adapters"]
        );
        assert!(nodes["External Stripe System"].is_external());
        assert!(!nodes.keys().any(|name| name.contains("Os")));
    }

    #[test]
    fn test_api_service_with_ui_gets_frontend() {
        let input = modules(vec![
            ModuleSummary::new("web/index.html", "html")
                .with_import("spring-web.mvc")
                .with_function("render"),
        ]);
        let nodes = Classifier::new().classify(&input, &RepositoryInfo::named("Portal"));
        assert_eq!(nodes["Web Frontend"].container_type(), "frontend");
        assert_eq!(nodes["Portal Application"].description(), "Main api service container");
    }
}
