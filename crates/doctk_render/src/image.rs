//! Image payloads and the node that embeds them.

use std::fs;
use std::io::Write;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use crate::data_source::DataSource;
use crate::error::RenderResult;
use crate::node::Node;
use crate::provider::FormatProvider;
use crate::resolver::Resolver;
use crate::value::Value;

/// Encoded image bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Image {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn png(data: Vec<u8>) -> Self {
        Self::new("image/png", data)
    }

    /// Read an image file, guessing the MIME type from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Ok(Self::new(mime_for_extension(&ext), data))
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64_STANDARD.encode(&self.data)
        )
    }
}

fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

type ImageProducer = Box<dyn Fn(&Resolver<'_>) -> RenderResult<Option<Image>>>;

enum Source {
    Static(Image),
    Generated(ImageProducer),
}

/// A node that writes one image through the provider's image encoding.
pub struct ImageNode {
    data: DataSource,
    source: Source,
}

impl ImageNode {
    /// Always emit the same image.
    pub fn new(image: Image) -> Self {
        Self {
            data: DataSource::new(),
            source: Source::Static(image),
        }
    }

    /// Produce the image at render time; `None` writes nothing.
    pub fn generated<F>(producer: F) -> Self
    where
        F: Fn(&Resolver<'_>) -> RenderResult<Option<Image>> + 'static,
    {
        Self {
            data: DataSource::new(),
            source: Source::Generated(Box::new(producer)),
        }
    }
}

impl Node for ImageNode {
    fn identity(&self) -> String {
        "ImageNode".to_string()
    }

    fn data_source(&self) -> &DataSource {
        &self.data
    }

    fn write_output(
        &self,
        target: &mut dyn Write,
        provider: &dyn FormatProvider,
        parent: Option<&Resolver<'_>>,
        scope: Option<&str>,
    ) -> RenderResult<()> {
        let resolver = Resolver::chained(&self.data, parent);
        if !self.is_visible(&resolver)? {
            return Ok(());
        }
        let image = match &self.source {
            Source::Static(image) => Some(image.clone()),
            Source::Generated(producer) => producer(&resolver)?,
        };
        match image {
            Some(image) => {
                provider.write_value(scope, &resolver, &Value::Image(image), false, None, target)
            }
            None => Ok(()),
        }
    }
}
