//! Render command - Render a document from templates and a data file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use doctk_render::{
    records_from, Node, NodeRef, OutputFormat, RenderConfig, TemplateNode, TokenMarkers,
};

/// Placeholder syntax accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarkerArg {
    /// `<!--{name}-->`
    Legacy,
    /// `{{name}}`
    Braces,
}

impl From<MarkerArg> for TokenMarkers {
    fn from(arg: MarkerArg) -> Self {
        match arg {
            MarkerArg::Legacy => TokenMarkers::Legacy,
            MarkerArg::Braces => TokenMarkers::Braces,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Html,
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => OutputFormat::Html,
            FormatArg::Text => OutputFormat::Text,
        }
    }
}

#[derive(Args)]
pub struct RenderArgs {
    /// Template directory (overrides the config file)
    #[arg(short, long, env = "DOCTK_TEMPLATES")]
    pub templates: Option<PathBuf>,

    /// Identity of the root template, e.g. `Invoice` for `Invoice.Template.htm`
    #[arg(short, long)]
    pub root: String,

    /// JSON or YAML data file; each top-level key becomes a data object
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Template scope to render
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Placeholder marker syntax
    #[arg(short, long, value_enum)]
    pub markers: Option<MarkerArg>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Wrap HTML output in a document shell
    #[arg(long)]
    pub document_shell: bool,

    /// Render config file (.yaml, .toml or .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: RenderArgs) -> Result<()> {
    info!("Rendering document: {}", args.root);

    let config = resolve_config(&args)?;
    let generator = config
        .build_generator()
        .context("Failed to set up the document generator")?;

    let root = TemplateNode::named(args.root.as_str());
    if let Some(data_path) = &args.data {
        let data = load_data(data_path)?;
        for record in records_from("Data", data) {
            record.install(root.data_source());
        }
    }

    let roots: Vec<NodeRef> = vec![Rc::new(root)];
    let mut buffer = Vec::new();
    generator
        .generate(&mut buffer, &roots, args.scope.as_deref())
        .with_context(|| format!("Failed to render template '{}'", args.root))?;

    match &args.output {
        Some(path) => {
            fs::write(path, &buffer)
                .with_context(|| format!("Failed to write output: {:?}", path))?;
            println!("✅ Wrote {} bytes to {}", buffer.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(&buffer)?;
            out.flush()?;
        }
    }

    Ok(())
}

/// Config file values overridden by command-line flags.
fn resolve_config(args: &RenderArgs) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => RenderConfig::new(),
    };

    if let Some(dir) = &args.templates {
        config = config.with_template_dir(dir.clone());
    }
    if let Some(markers) = args.markers {
        config = config.with_markers(markers.into());
    }
    if let Some(format) = args.format {
        config = config.with_format(format.into());
    }
    if args.document_shell {
        config = config.with_document_shell(true);
    }
    Ok(config)
}

/// Parse a JSON or YAML data file into a JSON value.
fn load_data(path: &Path) -> Result<serde_json::Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read data file: {:?}", path))?;
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in data file: {:?}", path)),
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in data file: {:?}", path)),
        other => anyhow::bail!(
            "Invalid argument --data: unsupported file type '{}' ({:?})",
            other,
            path
        ),
    }
}
