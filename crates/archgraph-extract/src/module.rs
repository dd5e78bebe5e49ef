//! Per-file facts produced by source parsing.
//!
//! These types are the input of the whole pipeline. They are plain data and
//! deserialize from JSON so a parser written in any language can feed them in.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Module summaries keyed by module path, in input order.
pub type Modules = IndexMap<String, ModuleSummary>;

/// The kind of a declared code element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeElementKind {
    Class,
    #[default]
    Function,
    Interface,
    Method,
}

/// A class, function, interface or method declared in a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeElement {
    pub name: String,
    pub kind: CodeElementKind,
    pub file_path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    pub parent: Option<String>,
}

impl CodeElement {
    pub fn new(name: impl Into<String>, kind: CodeElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_lines(mut self, start_line: usize, end_line: usize) -> Self {
        self.start_line = start_line;
        self.end_line = end_line;
        self
    }
}

/// Facts about a single source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSummary {
    pub path: PathBuf,
    pub language: String,
    pub imports: BTreeSet<String>,
    pub exports: Vec<String>,
    pub classes: Vec<CodeElement>,
    pub functions: Vec<CodeElement>,
    pub interfaces: Vec<CodeElement>,
    pub dependencies: Vec<String>,
}

impl ModuleSummary {
    pub fn new(path: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            ..Default::default()
        }
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.insert(import.into());
        self
    }

    pub fn with_class(mut self, name: impl Into<String>) -> Self {
        let element = self.declared(name, CodeElementKind::Class);
        self.classes.push(element);
        self
    }

    pub fn with_function(mut self, name: impl Into<String>) -> Self {
        let element = self.declared(name, CodeElementKind::Function);
        self.functions.push(element);
        self
    }

    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        let element = self.declared(name, CodeElementKind::Interface);
        self.interfaces.push(element);
        self
    }

    fn declared(&self, name: impl Into<String>, kind: CodeElementKind) -> CodeElement {
        CodeElement {
            file_path: self.path.clone(),
            ..CodeElement::new(name, kind)
        }
    }

    /// The module path, or `key` when the summary carries none.
    pub fn path_or<'a>(&'a self, key: &'a str) -> &'a Path {
        if self.path.as_os_str().is_empty() {
            Path::new(key)
        } else {
            &self.path
        }
    }

    /// Classes, functions and interfaces, in that order.
    pub fn code_elements(&self) -> impl Iterator<Item = &CodeElement> {
        self.classes
            .iter()
            .chain(&self.functions)
            .chain(&self.interfaces)
    }
}

/// Coarse repository facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryInfo {
    pub name: Option<String>,
    pub project_type: Option<String>,
    pub technologies: Vec<String>,
    pub description: Option<String>,
}

impl RepositoryInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// The declared project name, or `"Unknown Project"`.
    pub fn project_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown Project")
    }
}

/// A complete analysis input: repository facts plus every module summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisInput {
    pub repository: RepositoryInfo,
    pub modules: Modules,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_missing_fields() {
        let json = r#"{
            "repository": { "name": "shop" },
            "modules": {
                "src/services/order.py": {
                    "language": "python",
                    "imports": ["repository", "requests.adapters"],
                    "classes": [{ "name": "OrderService", "kind": "class", "start_line": 3, "end_line": 40 }]
                }
            }
        }"#;

        let input: AnalysisInput = serde_json::from_str(json).unwrap();
        let (key, module) = input.modules.first().unwrap();

        assert_eq!(input.repository.project_name(), "shop");
        assert_eq!(module.path_or(key), Path::new("src/services/order.py"));
        assert_eq!(module.imports.len(), 2);
        assert_eq!(module.classes[0].kind, CodeElementKind::Class);
        assert_eq!(module.classes[0].end_line, 40);
        assert!(module.functions.is_empty());
    }

    #[test]
    fn test_unknown_project_name() {
        assert_eq!(RepositoryInfo::default().project_name(), "Unknown Project");
        assert_eq!(RepositoryInfo::named("").project_name(), "Unknown Project");
    }

    #[test]
    fn test_code_elements_order() {
        let module = ModuleSummary::new("a.py", "python")
            .with_function("run")
            .with_interface("Runner")
            .with_class("Job");
        let names: Vec<&str> = module.code_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Job", "run", "Runner"]);
        assert_eq!(module.classes[0].file_path, PathBuf::from("a.py"));
    }
}
