//! Error types for rendering.

use thiserror::Error;

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering a document.
///
/// Every variant aborts the whole document. A name that resolves nowhere in
/// the resolver chain is not an error; it renders as empty output.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Member '{member}' does not exist on '{target}'")]
    MemberLookup { target: String, member: String },

    #[error("Template '{0}' is not valid UTF-8")]
    InvalidEncoding(String),

    #[error("Invalid format spec '{spec}' for {value}")]
    InvalidFormat { spec: String, value: String },

    #[error("Repeating node item {index} is null")]
    NullItem { index: usize },

    #[error("Repeating node item {index} is a {kind}, expected a data object")]
    InvalidItem { index: usize, kind: &'static str },

    #[error("Data source entry '{key}' is not a {expected}")]
    TypeMismatch { key: String, expected: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RenderError {
    pub(crate) fn member_lookup(target: impl Into<String>, member: impl Into<String>) -> Self {
        Self::MemberLookup {
            target: target.into(),
            member: member.into(),
        }
    }

    pub(crate) fn invalid_format(spec: impl Into<String>, value: impl std::fmt::Display) -> Self {
        Self::InvalidFormat {
            spec: spec.into(),
            value: value.to_string(),
        }
    }
}
