//! Template storage.
//!
//! Providers find templates by file name, built as
//! `{identity}.Template.{scope}`. Where the files live is up to the
//! [`TemplateSource`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::RenderResult;

/// Marker between identity and scope in template file names.
pub const TEMPLATE_MARKER: &str = ".Template.";

/// File name of the template for `identity` in `scope`.
pub fn template_file_name(identity: &str, scope: &str) -> String {
    format!("{}{}{}", identity, TEMPLATE_MARKER, scope)
}

/// Lookup of raw template content by file name.
pub trait TemplateSource {
    /// Read a template; `Ok(None)` when it does not exist.
    fn open(&self, file_name: &str) -> RenderResult<Option<Vec<u8>>>;

    /// Names of all templates this source can serve, sorted.
    fn list(&self) -> RenderResult<Vec<String>>;
}

/// Templates held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplates {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template under an explicit file name.
    pub fn insert(&mut self, file_name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(file_name.into(), content.into());
    }

    /// Add the template of `identity` for `scope`.
    pub fn with_template(
        mut self,
        identity: &str,
        scope: &str,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(template_file_name(identity, scope), content);
        self
    }
}

impl TemplateSource for MemoryTemplates {
    fn open(&self, file_name: &str) -> RenderResult<Option<Vec<u8>>> {
        Ok(self.files.get(file_name).cloned())
    }

    fn list(&self) -> RenderResult<Vec<String>> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Templates stored as files below a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateSource for DirectoryTemplates {
    fn open(&self, file_name: &str) -> RenderResult<Option<Vec<u8>>> {
        let path = self.root.join(file_name);
        if !path.is_file() {
            return Ok(None);
        }
        debug!("Reading template file {:?}", path);
        Ok(Some(fs::read(&path)?))
    }

    fn list(&self) -> RenderResult<Vec<String>> {
        if !self.root.exists() {
            warn!("Template directory does not exist: {:?}", self.root);
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let name = relative.to_string_lossy().replace('\\', "/");
            if name.contains(TEMPLATE_MARKER) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
