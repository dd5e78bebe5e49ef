//! JSON export of positioned diagrams, statistics, clusters and insights.

use std::{fs::File, io::Write, path::PathBuf};

use log::{error, info};

use crate::{AnalysisOutput, export};

/// Serializes `output` to a JSON string.
pub fn to_string(output: &AnalysisOutput, pretty: bool) -> Result<String, export::Error> {
    let result = if pretty {
        serde_json::to_string_pretty(output)
    } else {
        serde_json::to_string(output)
    };
    result.map_err(export::Error::Serialize)
}

/// Writes the analysis output as JSON to a file.
pub struct Json {
    path: PathBuf,
    pretty: bool,
}

impl Json {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    /// Emit compact JSON instead of the indented default.
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl export::Exporter for Json {
    fn export(&self, output: &AnalysisOutput) -> Result<(), export::Error> {
        let content = to_string(output, self.pretty)?;

        info!(path:? = self.path; "Creating JSON file");
        let mut file = match File::create(&self.path) {
            Ok(file) => file,
            Err(err) => {
                error!(path:? = self.path, err:% = err; "Failed to create JSON file");
                return Err(export::Error::Io(err));
            }
        };
        if let Err(err) = file.write_all(content.as_bytes()) {
            error!(path:? = self.path, err:% = err; "Failed to write JSON content");
            return Err(export::Error::Io(err));
        }
        Ok(())
    }
}
