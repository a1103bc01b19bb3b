//! Format providers.
//!
//! A [`FormatProvider`] owns everything format-specific: token markers,
//! escaping, image encoding, document framing and where templates come from.
//! The conversion of resolved values into output is implemented once, on
//! `dyn FormatProvider`, so every provider follows the same rules:
//!
//! - null writes nothing;
//! - template text is written verbatim, resolved text is escaped;
//! - nodes render themselves with the current resolver and scope;
//! - images use the provider's inline encoding;
//! - raw bytes are copied unescaped;
//! - lists apply these rules to each item in order;
//! - anything else is converted to text (optionally via a format spec) and
//!   escaped.

pub mod format;
pub mod html;
pub mod text;
pub mod tokenizer;

use std::borrow::Cow;
use std::io::Write;

use crate::error::RenderResult;
use crate::image::Image;
use crate::resolver::Resolver;
use crate::value::Value;

pub use format::format_scalar;
pub use html::HtmlFormatProvider;
pub use text::TextFormatProvider;
pub use tokenizer::{tokenize, Placeholder, Segment, TokenMarkers};

/// Strategy for a concrete output format.
pub trait FormatProvider {
    /// Human readable provider name.
    fn name(&self) -> &str;

    /// Which marker pair delimits placeholders.
    fn markers(&self) -> TokenMarkers;

    /// Scope used for template lookup when the caller gives none.
    fn default_scope(&self) -> Option<&str> {
        None
    }

    /// Raw template content for a node identity in a scope.
    ///
    /// Fails with [`RenderError::TemplateNotFound`](crate::RenderError::TemplateNotFound)
    /// when no such template exists.
    fn open_template(&self, scope: Option<&str>, identity: &str) -> RenderResult<Vec<u8>>;

    /// Escape text that came from data rather than from a template.
    fn escape<'t>(&self, text: &'t str) -> Cow<'t, str>;

    /// Inline encoding for an image.
    fn write_image(&self, target: &mut dyn Write, image: &Image) -> RenderResult<()>;

    fn write_page_break(&self, scope: Option<&str>, target: &mut dyn Write) -> RenderResult<()> {
        let _ = (scope, target);
        Ok(())
    }

    fn write_document_start(
        &self,
        scope: Option<&str>,
        target: &mut dyn Write,
        resolver: &Resolver<'_>,
    ) -> RenderResult<()> {
        let _ = (scope, target, resolver);
        Ok(())
    }

    fn write_document_end(
        &self,
        scope: Option<&str>,
        target: &mut dyn Write,
        resolver: &Resolver<'_>,
    ) -> RenderResult<()> {
        let _ = (scope, target, resolver);
        Ok(())
    }
}

impl<'p> dyn FormatProvider + 'p {
    /// Substitute every placeholder of `template` and write the result.
    pub fn render(
        &self,
        scope: Option<&str>,
        resolver: &Resolver<'_>,
        template: &str,
        target: &mut dyn Write,
    ) -> RenderResult<()> {
        for segment in tokenize(template, self.markers()) {
            match segment {
                Segment::Literal(text) => target.write_all(text.as_bytes())?,
                Segment::Token(token) => {
                    let placeholder = Placeholder::parse(token);
                    let value = resolver.resolve(placeholder.name)?;
                    let scope = placeholder.scope.or(scope);
                    self.write_value(scope, resolver, &value, false, placeholder.format, target)?;
                }
            }
        }
        Ok(())
    }

    /// Write one value following the shared conversion rules.
    ///
    /// `from_template` marks text that is trusted template content and must
    /// not be escaped.
    pub fn write_value(
        &self,
        scope: Option<&str>,
        resolver: &Resolver<'_>,
        value: &Value<'_>,
        from_template: bool,
        format: Option<&str>,
        target: &mut dyn Write,
    ) -> RenderResult<()> {
        match value {
            Value::Null => Ok(()),
            Value::Text(text) => self.write_text(text, from_template, target),
            Value::Node(node) => node.write_output(target, self, Some(resolver), scope),
            Value::Image(image) => self.write_image(target, image),
            Value::Bytes(bytes) => {
                target.write_all(bytes)?;
                Ok(())
            }
            Value::List(items) => {
                for item in items {
                    self.write_value(scope, resolver, item, from_template, format, target)?;
                }
                Ok(())
            }
            other => {
                let text = format_scalar(other, format)?;
                self.write_text(&text, from_template, target)
            }
        }
    }

    fn write_text(&self, text: &str, from_template: bool, target: &mut dyn Write) -> RenderResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        if from_template {
            target.write_all(text.as_bytes())?;
        } else {
            target.write_all(self.escape(text).as_bytes())?;
        }
        Ok(())
    }
}
