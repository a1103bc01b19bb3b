//! The render-tree node contract.

use std::io::Write;
use std::rc::Rc;

use crate::data_source::DataSource;
use crate::error::RenderResult;
use crate::provider::FormatProvider;
use crate::resolver::Resolver;

/// Shared handle to a node in a document tree.
pub type NodeRef = Rc<dyn Node>;

/// A unit of the render tree.
///
/// Nodes own a [`DataSource`] and write themselves to an output sink through
/// a [`FormatProvider`]. Rendering is single-threaded and depth-first; a tree
/// must not be rendered from two places at once.
pub trait Node {
    /// Identity used to look up this node's template.
    fn identity(&self) -> String;

    /// The node's own data.
    fn data_source(&self) -> &DataSource;

    /// Whether the node produces any output under `resolver`.
    fn is_visible(&self, resolver: &Resolver<'_>) -> RenderResult<bool> {
        let _ = resolver;
        Ok(true)
    }

    /// Render the node.
    ///
    /// `parent` is the resolver of the enclosing node, or `None` for a
    /// stand-alone render. `scope` selects the template variant.
    fn write_output(
        &self,
        target: &mut dyn Write,
        provider: &dyn FormatProvider,
        parent: Option<&Resolver<'_>>,
        scope: Option<&str>,
    ) -> RenderResult<()>;
}

/// Emits the provider's page break.
#[derive(Debug, Default)]
pub struct PageBreak {
    data: DataSource,
}

impl PageBreak {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Node for PageBreak {
    fn identity(&self) -> String {
        "PageBreak".to_string()
    }

    fn data_source(&self) -> &DataSource {
        &self.data
    }

    fn write_output(
        &self,
        target: &mut dyn Write,
        provider: &dyn FormatProvider,
        _parent: Option<&Resolver<'_>>,
        scope: Option<&str>,
    ) -> RenderResult<()> {
        provider.write_page_break(scope, target)
    }
}
