use std::borrow::Cow;
use std::io::Write;

use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::image::Image;
use crate::provider::{FormatProvider, TokenMarkers};
use crate::source::{template_file_name, TemplateSource};

const DEFAULT_SCOPE: &str = "txt";

/// Plain-text output. Nothing is escaped.
pub struct TextFormatProvider {
    markers: TokenMarkers,
    templates: Box<dyn TemplateSource>,
}

impl TextFormatProvider {
    pub fn new(templates: impl TemplateSource + 'static) -> Self {
        Self {
            markers: TokenMarkers::default(),
            templates: Box::new(templates),
        }
    }

    pub fn with_markers(mut self, markers: TokenMarkers) -> Self {
        self.markers = markers;
        self
    }
}

impl FormatProvider for TextFormatProvider {
    fn name(&self) -> &str {
        "TextFormatProvider"
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
        Cow::Borrowed(text)
    }

    // Plain text has no inline image encoding.
    fn write_image(&self, target: &mut dyn Write, image: &Image) -> RenderResult<()> {
        write!(target, "[image {}, {} bytes]", image.mime_type, image.data.len())?;
        Ok(())
    }

    fn write_page_break(&self, _scope: Option<&str>, target: &mut dyn Write) -> RenderResult<()> {
        target.write_all(b"\x0c")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryTemplates;

    #[test]
    fn test_text_provider_basics() {
        let provider =
            TextFormatProvider::new(MemoryTemplates::new().with_template("Note", "txt", "note"));
        assert_eq!(provider.open_template(None, "Note").unwrap(), b"note");
        assert_eq!(provider.escape("<a & b>"), "<a & b>");

        let mut out = Vec::new();
        provider
            .write_image(&mut out, &Image::png(vec![0; 4]))
            .unwrap();
        provider.write_page_break(None, &mut out).unwrap();
        assert_eq!(out, b"[image image/png, 4 bytes]\x0c");
    }
}
