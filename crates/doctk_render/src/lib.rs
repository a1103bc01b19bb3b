//! # doctk_render
//!
//! Hierarchical document templating for doctk.
//!
//! A document is a tree of nodes. Each node renders a template file whose
//! placeholders are resolved against the node's own data first and then,
//! level by level, against its ancestors.
//!
//! # Architecture
//!
//! - **DataSource**: typed object bag owned by every node
//! - **Resolver**: chained name lookup from a node up to the generator
//! - **TemplateNode / RepeatingNode**: template-backed nodes with named areas
//! - **FormatProvider**: output format (HTML, plain text) and template lookup
//! - **DocumentGenerator**: renders root nodes into a complete document
//!
//! # Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use doctk_render::{DocumentGenerator, MemoryTemplates, NodeRef, TemplateNode, TokenMarkers};
//!
//! let templates = MemoryTemplates::new()
//!     .with_template("Page", "htm", "<h1>{{String}}</h1>{{Body}}")
//!     .with_template("Row", "htm", "<p>{{DateTime.Now:%Y-%m-%d}}</p>");
//!
//! let page = TemplateNode::named("Page");
//! page.data_source().set(String::from("Report"));
//! page.add("Body", Rc::new(TemplateNode::named("Row")));
//!
//! let generator = DocumentGenerator::html(templates, TokenMarkers::Braces);
//! let roots: Vec<NodeRef> = vec![Rc::new(page)];
//! let html = generator.generate_to_string(&roots, None)?;
//! ```

pub mod config;
pub mod data_source;
pub mod error;
pub mod generator;
pub mod image;
pub mod node;
pub mod provider;
pub mod record;
pub mod repeating;
pub mod resolver;
pub mod source;
pub mod template;
pub mod value;

// Re-export main types for convenience
pub use config::{OutputFormat, RenderConfig};
pub use data_source::DataSource;
pub use error::{RenderError, RenderResult};
pub use generator::DocumentGenerator;
pub use image::{Image, ImageNode};
pub use node::{Node, NodeRef, PageBreak};
pub use provider::{
    FormatProvider, HtmlFormatProvider, Placeholder, Segment, TextFormatProvider, TokenMarkers,
};
pub use record::{records_from, Record};
pub use repeating::RepeatingNode;
pub use resolver::{FnFrame, Frame, Resolver};
pub use source::{DirectoryTemplates, MemoryTemplates, TemplateSource};
pub use template::{Block, Named, TemplateNode};
pub use value::{DataObject, NodeHandle, Value};
