//! CLI logic for the Archgraph architecture diagram tool.
//!
//! Reads a JSON analysis input, runs the Archgraph pipeline and writes the
//! positioned diagrams, statistics and insights as JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use archgraph::{
    ArchgraphError, ArchitectureBuilder,
    config::{AppConfig, LayoutStrategy},
    export::{Exporter, json::Json},
    extract::AnalysisInput,
};

/// Run the Archgraph CLI application
///
/// # Errors
///
/// Returns `ArchgraphError` for:
/// - File I/O errors
/// - Configuration loading errors and malformed input JSON
/// - Diagram integrity violations
/// - Export errors
pub fn run(args: &Args) -> Result<(), ArchgraphError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing analysis input"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(strategy) = &args.strategy {
        app_config = override_strategy(app_config, strategy)?;
    }

    let source = fs::read_to_string(&args.input)?;
    let input: AnalysisInput = serde_json::from_str(&source)
        .map_err(|err| ArchgraphError::Config(format!("Invalid analysis input: {err}")))?;

    let builder = ArchitectureBuilder::new(app_config);
    let output = builder.run(&input)?;

    let exporter = if args.compact {
        Json::new(&args.output).compact()
    } else {
        Json::new(&args.output)
    };
    exporter.export(&output)?;

    info!(output_file = args.output, diagrams = output.diagrams.len(); "JSON exported successfully");

    Ok(())
}

fn override_strategy(config: AppConfig, strategy: &str) -> Result<AppConfig, ArchgraphError> {
    let strategy: LayoutStrategy = strategy
        .parse()
        .map_err(|err: &str| ArchgraphError::Config(format!("{err}: {strategy}")))?;
    let optimizer = config.optimizer().clone().with_layout_strategy(strategy);
    Ok(AppConfig::new(optimizer, config.views().clone()))
}
