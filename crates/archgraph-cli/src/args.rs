use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON analysis input (repository info and module summaries)
    pub input: String,

    /// Path to output JSON file
    #[arg(short, long, default_value = "out.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Layout strategy overriding the configured one
    /// (hierarchical, circular, force_directed, grid, layered)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Write compact JSON instead of indented output
    #[arg(long)]
    pub compact: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
