//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod render;
pub mod templates;

/// doctk - hierarchical document templating
#[derive(Parser)]
#[command(name = "doctk")]
#[command(version, about = "doctk - render documents from hierarchical templates")]
#[command(long_about = r#"
doctk renders documents from a directory of templates and a data file.

COMMANDS:
  render     → Render a root template with data from a JSON/YAML file
  templates  → List the templates found in a template directory

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  4 - Template error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a document
    Render(render::RenderArgs),

    /// List available templates
    Templates(templates::TemplatesArgs),
}
