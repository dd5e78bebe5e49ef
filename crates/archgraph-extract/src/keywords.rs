//! Fixed heuristic dictionaries.
//!
//! Every table is scanned in declaration order, so the first match is stable
//! across runs.

use crate::classifier::FunctionalArea;

/// A known framework and the container type it implies.
#[derive(Debug, Clone, Copy)]
pub struct Framework {
    pub name: &'static str,
    pub kind: &'static str,
    pub container_type: &'static str,
}

pub static FRAMEWORKS: &[Framework] = &[
    Framework {
        name: "flask",
        kind: "web_framework",
        container_type: "web_application",
    },
    Framework {
        name: "django",
        kind: "web_framework",
        container_type: "web_application",
    },
    Framework {
        name: "fastapi",
        kind: "api_framework",
        container_type: "api_application",
    },
    Framework {
        name: "spring",
        kind: "web_framework",
        container_type: "web_application",
    },
    Framework {
        name: "express",
        kind: "web_framework",
        container_type: "web_application",
    },
    Framework {
        name: "react",
        kind: "frontend_framework",
        container_type: "spa",
    },
    Framework {
        name: "angular",
        kind: "frontend_framework",
        container_type: "spa",
    },
    Framework {
        name: "vue",
        kind: "frontend_framework",
        container_type: "spa",
    },
];

pub static DATABASES: &[&str] = &[
    "sqlite",
    "mysql",
    "postgresql",
    "mongodb",
    "redis",
    "cassandra",
    "dynamodb",
];

pub static WEB_INDICATORS: &[&str] = &["flask", "django", "fastapi", "express", "spring-boot"];
pub static API_INDICATORS: &[&str] = &["fastapi", "flask-restful", "express", "spring-web"];
pub static DESKTOP_INDICATORS: &[&str] = &["tkinter", "pyside", "electron", "swing"];
pub static LIBRARY_MARKERS: &[&str] = &["setup.py", "pyproject.toml", "cargo.toml", "package.json"];

pub static API_IMPORT_PATTERNS: &[&str] =
    &["rest", "graphql", "grpc", "soap", "api", "endpoint", "controller"];
pub static API_FUNCTION_KEYWORDS: &[&str] = &["route", "endpoint", "api", "get", "post"];
pub static UI_PATTERNS: &[&str] = &[
    "tkinter", "pyside", "react", "angular", "vue", "html", "css", "js",
];

pub static STDLIB_MODULES: &[&str] = &[
    "os",
    "sys",
    "json",
    "datetime",
    "pathlib",
    "re",
    "collections",
    "itertools",
    "functools",
    "typing",
    "abc",
    "dataclasses",
    "enum",
    "asyncio",
    "threading",
    "multiprocessing",
    "logging",
    "unittest",
    "http",
    "urllib",
    "socket",
    "ssl",
    "email",
    "html",
    "xml",
    "sqlite3",
    "csv",
    "configparser",
    "argparse",
    "math",
    "random",
];

/// Known external system categories and the import fragments that select them.
pub static EXTERNAL_SYSTEMS: &[(&str, &[&str])] = &[
    (
        "Database",
        &["sqlalchemy", "pymongo", "psycopg2", "mysql", "redis", "cassandra"],
    ),
    (
        "Web Framework",
        &["flask", "django", "fastapi", "tornado", "aiohttp"],
    ),
    ("HTTP Client", &["requests", "httpx", "aiohttp", "urllib3"]),
    (
        "Cloud Services",
        &["boto3", "azure", "google-cloud", "kubernetes"],
    ),
    ("Message Queue", &["celery", "rabbitmq", "kafka", "redis"]),
    (
        "Monitoring",
        &["prometheus", "datadog", "sentry", "newrelic"],
    ),
    ("Testing", &["pytest", "unittest", "mock", "coverage"]),
];

/// Module file stem rules, highest priority first.
pub static MODULE_NAME_RULES: &[(FunctionalArea, &[&str])] = &[
    (FunctionalArea::Authentication, &["auth", "login", "session"]),
    (FunctionalArea::UserManagement, &["user", "profile", "account"]),
    (FunctionalArea::Models, &["model", "entity", "schema"]),
    (FunctionalArea::Controllers, &["controller", "view", "handler"]),
    (FunctionalArea::Services, &["service", "business", "logic"]),
    (FunctionalArea::Api, &["api", "rest", "endpoint"]),
    (
        FunctionalArea::DataAccess,
        &["dao", "repository", "db", "database"],
    ),
    (FunctionalArea::Configuration, &["config", "settings", "env"]),
    (FunctionalArea::Utilities, &["util", "helper", "common"]),
];

/// Parent directory rules, consulted when no file stem rule matched.
pub static PARENT_DIR_RULES: &[(FunctionalArea, &[&str])] = &[
    (FunctionalArea::Models, &["model", "entity"]),
    (FunctionalArea::Controllers, &["controller", "view"]),
    (FunctionalArea::Services, &["service", "business"]),
];

pub static READ_KEYWORDS: &[&str] = &["select", "find", "get", "fetch", "load", "retrieve"];
pub static WRITE_KEYWORDS: &[&str] = &["insert", "create", "save", "update", "delete", "remove"];

/// Returns the first pattern contained in `haystack`.
pub fn find_in<'a>(haystack: &str, patterns: &[&'a str]) -> Option<&'a str> {
    patterns
        .iter()
        .copied()
        .find(|pattern| haystack.contains(pattern))
}

/// Capitalizes the first letter of every alphabetic run and lowercases the rest.
///
/// `"postgresql"` becomes `"Postgresql"`, `"web_application"` becomes `"Web_Application"`.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_alpha = false;
    for ch in text.chars() {
        if previous_is_alpha {
            result.extend(ch.to_lowercase());
        } else {
            result.extend(ch.to_uppercase());
        }
        previous_is_alpha = ch.is_alphabetic();
    }
    result
}

/// Title-cases an identifier after replacing underscores with spaces.
pub fn words_title(identifier: &str) -> String {
    title_case(&identifier.replace('_', " "))
}
