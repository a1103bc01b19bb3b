//! Placeholder scanning.
//!
//! Templates alternate between literal text and tokens enclosed by one of the
//! two supported marker pairs. Markers are a provider setting, never guessed
//! from the content.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RenderError;

/// Token delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenMarkers {
    /// `<!--{name}-->`, invisible when a template is viewed as plain HTML.
    #[default]
    Legacy,
    /// `{{name}}`
    Braces,
}

impl TokenMarkers {
    pub fn open(&self) -> &'static str {
        match self {
            Self::Legacy => "<!--{",
            Self::Braces => "{{",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            Self::Legacy => "}-->",
            Self::Braces => "}}",
        }
    }
}

impl FromStr for TokenMarkers {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" | "comment" => Ok(Self::Legacy),
            "braces" | "v2" => Ok(Self::Braces),
            other => Err(RenderError::Config(format!("Unknown token markers: {}", other))),
        }
    }
}

/// A piece of template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    Literal(&'t str),
    Token(&'t str),
}

/// Iterator over the segments of a template.
///
/// A token with no closing marker swallows the rest of the template.
pub struct Tokens<'t> {
    rest: &'t str,
    open: &'static str,
    close: &'static str,
    in_token: bool,
}

pub fn tokenize(template: &str, markers: TokenMarkers) -> Tokens<'_> {
    Tokens {
        rest: template,
        open: markers.open(),
        close: markers.close(),
        in_token: false,
    }
}

impl<'t> Iterator for Tokens<'t> {
    type Item = Segment<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.rest.is_empty() {
                return None;
            }

            let marker = if self.in_token { self.close } else { self.open };
            let (piece, rest) = match self.rest.find(marker) {
                Some(at) => (&self.rest[..at], &self.rest[at + marker.len()..]),
                None => {
                    if self.in_token {
                        warn!("Unterminated token: {:?}", self.rest);
                    }
                    (self.rest, "")
                }
            };
            self.rest = rest;

            let segment = if self.in_token {
                Segment::Token(piece)
            } else {
                Segment::Literal(piece)
            };
            self.in_token = !self.in_token;

            match segment {
                Segment::Literal("") => continue,
                segment => return Some(segment),
            }
        }
    }
}

/// A token split into its parts: `target[.member][~scope][:format]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'t> {
    pub name: &'t str,
    pub scope: Option<&'t str>,
    pub format: Option<&'t str>,
}

impl<'t> Placeholder<'t> {
    pub fn parse(token: &'t str) -> Self {
        let (name, format) = match token.split_once(':') {
            Some((name, format)) => (name, Some(format)),
            None => (token, None),
        };
        let (name, scope) = match name.split_once('~') {
            Some((name, scope)) => (name, Some(scope.trim())),
            None => (name, None),
        };
        Self {
            name: name.trim(),
            scope: scope.filter(|s| !s.is_empty()),
            format: format.filter(|f| !f.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(template: &str, markers: TokenMarkers) -> Vec<Segment<'_>> {
        tokenize(template, markers).collect()
    }

    #[test]
    fn test_legacy_markers() {
        assert_eq!(
            segments("Hello <!--{me.Name}-->!", TokenMarkers::Legacy),
            vec![
                Segment::Literal("Hello "),
                Segment::Token("me.Name"),
                Segment::Literal("!"),
            ]
        );
    }

    #[test]
    fn test_brace_markers_ignore_legacy_syntax() {
        assert_eq!(
            segments("<!--{a}--> {{b}}", TokenMarkers::Braces),
            vec![
                Segment::Literal("<!--{a}--> "),
                Segment::Token("b"),
            ]
        );
        assert_eq!(
            segments("{{b}}", TokenMarkers::Legacy),
            vec![Segment::Literal("{{b}}")]
        );
    }

    #[test]
    fn test_adjacent_tokens() {
        assert_eq!(
            segments("{{a}}{{b}}", TokenMarkers::Braces),
            vec![Segment::Token("a"), Segment::Token("b")]
        );
    }

    #[test]
    fn test_unterminated_token_takes_the_rest() {
        assert_eq!(
            segments("x {{open", TokenMarkers::Braces),
            vec![Segment::Literal("x "), Segment::Token("open")]
        );
        assert_eq!(
            segments("x {{", TokenMarkers::Braces),
            vec![Segment::Literal("x ")]
        );
    }

    #[test]
    fn test_placeholder_parse() {
        assert_eq!(
            Placeholder::parse("Order.Total~pdf:F2"),
            Placeholder {
                name: "Order.Total",
                scope: Some("pdf"),
                format: Some("F2"),
            }
        );
        assert_eq!(
            Placeholder::parse(" DateTime.Now:%H:%M "),
            Placeholder {
                name: "DateTime.Now",
                scope: None,
                format: Some("%H:%M "),
            }
        );
        assert_eq!(
            Placeholder::parse("Body~"),
            Placeholder {
                name: "Body",
                scope: None,
                format: None,
            }
        );
    }

    #[test]
    fn test_markers_from_str() {
        assert_eq!("Braces".parse::<TokenMarkers>().unwrap(), TokenMarkers::Braces);
        assert_eq!("legacy".parse::<TokenMarkers>().unwrap(), TokenMarkers::Legacy);
        assert!(matches!(
            "xml".parse::<TokenMarkers>(),
            Err(RenderError::Config(_))
        ));
    }
}
