//! Render configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::generator::DocumentGenerator;
use crate::provider::{HtmlFormatProvider, TextFormatProvider, TokenMarkers};
use crate::source::DirectoryTemplates;

/// Output format produced by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Html,
    Text,
}

/// Settings for building a [`DocumentGenerator`].
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Placeholder marker pair.
    pub markers: TokenMarkers,

    /// Directory holding `*.Template.*` files.
    pub template_dir: Option<PathBuf>,

    /// Scope used when none is requested.
    pub default_scope: Option<String>,

    /// Wrap HTML output in a document shell.
    pub document_shell: bool,

    pub format: OutputFormat,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a `.yaml`/`.yml`, `.toml` or `.json` file.
    pub fn load(path: &Path) -> RenderResult<Self> {
        debug!("Loading render config from {:?}", path);
        let content = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let config: RenderConfig = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            other => {
                return Err(RenderError::Config(format!(
                    "Unsupported config file extension '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };
        Ok(config)
    }

    pub fn with_markers(mut self, markers: TokenMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    pub fn with_default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = Some(scope.into());
        self
    }

    pub fn with_document_shell(mut self, enabled: bool) -> Self {
        self.document_shell = enabled;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Build a generator reading templates from `template_dir`.
    pub fn build_generator(&self) -> RenderResult<DocumentGenerator> {
        let dir = self
            .template_dir
            .as_ref()
            .ok_or_else(|| RenderError::Config("No template directory configured".to_string()))?;
        let templates = DirectoryTemplates::new(dir.clone());

        let generator = match self.format {
            OutputFormat::Html => DocumentGenerator::new(
                HtmlFormatProvider::new(templates)
                    .with_markers(self.markers)
                    .with_document_shell(self.document_shell),
            ),
            OutputFormat::Text => {
                DocumentGenerator::new(TextFormatProvider::new(templates).with_markers(self.markers))
            }
        };

        Ok(match &self.default_scope {
            Some(scope) => generator.with_default_scope(scope.clone()),
            None => generator,
        })
    }
}
