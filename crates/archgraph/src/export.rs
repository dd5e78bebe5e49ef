//! Hand-off of analysis results to external renderers.

pub mod json;

use crate::AnalysisOutput;

/// A destination for a finished analysis.
pub trait Exporter {
    fn export(&self, output: &AnalysisOutput) -> Result<(), Error>;
}

#[derive(Debug)]
pub enum Error {
    Serialize(serde_json::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "Serialization error: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}
