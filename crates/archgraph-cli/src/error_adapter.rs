//! Error adapter for converting ArchgraphError to miette diagnostics.
//!
//! Archgraph errors carry no source spans, so every error becomes a single
//! report with a stable code per variant.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use archgraph::ArchgraphError;

/// Adapter giving an [`ArchgraphError`] a miette code and help text.
pub struct ErrorAdapter<'a>(pub &'a ArchgraphError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            ArchgraphError::Io(_) => "archgraph::io",
            ArchgraphError::Graph(_) => "archgraph::graph",
            ArchgraphError::Config(_) => "archgraph::config",
            ArchgraphError::Export(_) => "archgraph::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            ArchgraphError::Config(_) => Some(Box::new(
                "check the TOML file passed with --config or archgraph/config.toml",
            )),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Wrap an [`ArchgraphError`] for rendering by miette.
pub fn to_reportable(err: &ArchgraphError) -> ErrorAdapter<'_> {
    ErrorAdapter(err)
}
