use std::borrow::Cow;
use std::io::Write;

use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::image::Image;
use crate::provider::{FormatProvider, TokenMarkers};
use crate::resolver::Resolver;
use crate::source::{template_file_name, TemplateSource};

const DEFAULT_SCOPE: &str = "htm";

/// HTML output: escaped text, inline data-URI images.
pub struct HtmlFormatProvider {
    markers: TokenMarkers,
    templates: Box<dyn TemplateSource>,
    document_shell: bool,
}

impl HtmlFormatProvider {
    pub fn new(templates: impl TemplateSource + 'static) -> Self {
        Self {
            markers: TokenMarkers::default(),
            templates: Box::new(templates),
            document_shell: false,
        }
    }

    pub fn with_markers(mut self, markers: TokenMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Wrap the document in `<html>`/`<body>` tags.
    pub fn with_document_shell(mut self, enabled: bool) -> Self {
        self.document_shell = enabled;
        self
    }

    pub fn templates(&self) -> &dyn TemplateSource {
        self.templates.as_ref()
    }
}

impl FormatProvider for HtmlFormatProvider {
    fn name(&self) -> &str {
        "HtmlFormatProvider"
    }

    fn markers(&self) -> TokenMarkers {
        self.markers
    }

    fn default_scope(&self) -> Option<&str> {
        Some(DEFAULT_SCOPE)
    }

    fn open_template(&self, scope: Option<&str>, identity: &str) -> RenderResult<Vec<u8>> {
        let file_name = template_file_name(identity, scope.unwrap_or(DEFAULT_SCOPE));
        debug!("Opening template {}", file_name);
        self.templates
            .open(&file_name)?
            .ok_or(RenderError::TemplateNotFound(file_name))
    }

    fn escape<'t>(&self, text: &'t str) -> Cow<'t, str> {
        escape_html(text)
    }

    fn write_image(&self, target: &mut dyn Write, image: &Image) -> RenderResult<()> {
        target.write_all(image.to_data_uri().as_bytes())?;
        Ok(())
    }

    fn write_page_break(&self, _scope: Option<&str>, target: &mut dyn Write) -> RenderResult<()> {
        writeln!(target, "<p id=\"pagebreak\">")?;
        Ok(())
    }

    fn write_document_start(
        &self,
        _scope: Option<&str>,
        target: &mut dyn Write,
        _resolver: &Resolver<'_>,
    ) -> RenderResult<()> {
        if self.document_shell {
            writeln!(target, "<!DOCTYPE html>")?;
            writeln!(target, "<html>")?;
            writeln!(target, "<head><meta charset=\"utf-8\"></head>")?;
            writeln!(target, "<body>")?;
        }
        Ok(())
    }

    fn write_document_end(
        &self,
        _scope: Option<&str>,
        target: &mut dyn Write,
        _resolver: &Resolver<'_>,
    ) -> RenderResult<()> {
        if self.document_shell {
            writeln!(target, "</body>")?;
            writeln!(target, "</html>")?;
        }
        Ok(())
    }
}

/// HTML-encode data text. Spaces become `&nbsp;` and line breaks `<br />`
/// so data keeps its layout inside flowing markup.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text
        .chars()
        .any(|c| matches!(c, '&' | '<' | '>' | '"' | '\'' | ' ' | '\r' | '\n'))
    {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            ' ' => out.push_str("&nbsp;"),
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str("<br />");
            }
            '\n' => out.push_str("<br />"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
