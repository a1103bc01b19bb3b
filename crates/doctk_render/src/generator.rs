//! Document generation.
//!
//! The [`DocumentGenerator`] frames a list of root nodes with the provider's
//! document hooks and answers the process-level placeholders every template
//! can use:
//!
//! - `Generator.FormatProviderType`
//! - `DateTime.Now`
//! - `Environment.MachineName`, `Environment.UserName`
//! - `Guid.NewGuid`
//! - `Type.Member` for statics registered with [`DocumentGenerator::register_static`]

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::Write;

use chrono::Local;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{RenderError, RenderResult};
use crate::node::NodeRef;
use crate::provider::{FormatProvider, HtmlFormatProvider, TokenMarkers};
use crate::resolver::{split_name, Frame, Resolver};
use crate::source::TemplateSource;
use crate::value::Value;

type StaticAccessor = Box<dyn Fn() -> Value<'static>>;

/// Renders root nodes into a complete document.
pub struct DocumentGenerator {
    provider: Box<dyn FormatProvider>,
    default_scope: Option<String>,
    statics: HashMap<String, HashMap<String, StaticAccessor>>,
}

impl DocumentGenerator {
    pub fn new(provider: impl FormatProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            default_scope: None,
            statics: HashMap::new(),
        }
    }

    /// HTML generator over a template source.
    pub fn html(templates: impl TemplateSource + 'static, markers: TokenMarkers) -> Self {
        Self::new(HtmlFormatProvider::new(templates).with_markers(markers))
    }

    /// Scope used when `generate` is called without one.
    pub fn with_default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = Some(scope.into());
        self
    }

    /// Make `type_name.member` resolvable from every template.
    pub fn register_static<F>(&mut self, type_name: &str, member: &str, accessor: F)
    where
        F: Fn() -> Value<'static> + 'static,
    {
        self.statics
            .entry(type_name.to_string())
            .or_default()
            .insert(member.to_string(), Box::new(accessor));
    }

    pub fn with_static<F>(mut self, type_name: &str, member: &str, accessor: F) -> Self
    where
        F: Fn() -> Value<'static> + 'static,
    {
        self.register_static(type_name, member, accessor);
        self
    }

    pub fn provider(&self) -> &dyn FormatProvider {
        self.provider.as_ref()
    }

    /// Render `roots` in order and write the document to `target`.
    ///
    /// Output is assembled in memory first; if any node fails nothing is
    /// written.
    pub fn generate(
        &self,
        target: &mut dyn Write,
        roots: &[NodeRef],
        scope: Option<&str>,
    ) -> RenderResult<()> {
        let scope = scope
            .or(self.default_scope.as_deref())
            .or(self.provider.default_scope());
        info!(
            "Generating document with {} ({} root nodes, scope {:?})",
            self.provider.name(),
            roots.len(),
            scope
        );

        let frame = GeneratorFrame { generator: self };
        let resolver = Resolver::root(&frame);
        let provider = self.provider.as_ref();

        let mut buffer = Vec::new();
        provider.write_document_start(scope, &mut buffer, &resolver)?;
        for node in roots {
            debug!("Rendering root node {}", node.identity());
            node.write_output(&mut buffer, provider, Some(&resolver), scope)?;
        }
        provider.write_document_end(scope, &mut buffer, &resolver)?;

        target.write_all(&buffer)?;
        target.flush()?;
        info!("Document generated ({} bytes)", buffer.len());
        Ok(())
    }

    /// Render into a string. Fails on output that is not valid UTF-8.
    pub fn generate_to_string(&self, roots: &[NodeRef], scope: Option<&str>) -> RenderResult<String> {
        let mut out = Vec::new();
        self.generate(&mut out, roots, scope)?;
        String::from_utf8(out).map_err(|e| RenderError::InvalidEncoding(e.to_string()))
    }

    fn resolve_builtin(&self, name: &str) -> RenderResult<Option<Value<'static>>> {
        let value = match name {
            "Generator.FormatProviderType" => Value::from(self.provider.name()),
            "DateTime.Now" => Value::Timestamp(Local::now()),
            "Environment.MachineName" => machine_name().map(Value::from).unwrap_or(Value::Null),
            "Environment.UserName" => user_name().map(Value::from).unwrap_or(Value::Null),
            "Guid.NewGuid" => Value::Uuid(Uuid::new_v4()),
            _ => {
                let (type_name, member) = split_name(name);
                let Some(members) = self.statics.get(type_name) else {
                    return Ok(None);
                };
                match members.get(member) {
                    Some(accessor) => accessor(),
                    None => return Err(RenderError::member_lookup(type_name, member)),
                }
            }
        };
        Ok(Some(value))
    }
}

impl std::fmt::Debug for DocumentGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentGenerator")
            .field("provider", &self.provider.name())
            .field("default_scope", &self.default_scope)
            .finish()
    }
}

/// Root of every resolver chain during generation.
struct GeneratorFrame<'g> {
    generator: &'g DocumentGenerator,
}

impl Frame for GeneratorFrame<'_> {
    fn resolve_local(&self, name: &str) -> RenderResult<Option<Value<'_>>> {
        self.generator.resolve_builtin(name)
    }
}

fn machine_name() -> Option<String> {
    env::var("HOSTNAME")
        .or_else(|_| env::var("COMPUTERNAME"))
        .ok()
        .or_else(|| fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

fn user_name() -> Option<String> {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .ok()
        .filter(|name| !name.is_empty())
}
