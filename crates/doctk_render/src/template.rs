//! Template-backed nodes with named child areas.
//!
//! A [`TemplateNode`] loads its template through the format provider and
//! resolves every placeholder with this lookup order:
//!
//! 1. an area whose id matches the target (case-insensitive);
//! 2. `subparts.<area>`, the legacy spelling of the same thing;
//! 3. `me` / `me.<member>`, the node itself and its [`Block`] members;
//! 4. an object in the node's own [`DataSource`] keyed by the target;
//! 5. otherwise the whole name is handed to the parent resolver.
//!
//! A member that does not exist on a resolved object is an error, not an
//! empty value.

use std::borrow::Cow;
use std::cell::{RefCell, RefMut};
use std::collections::HashMap;
use std::io::Write;

use tracing::debug;

use crate::data_source::DataSource;
use crate::error::{RenderError, RenderResult};
use crate::node::{Node, NodeRef};
use crate::provider::FormatProvider;
use crate::resolver::{read_member_path, split_name, Frame, Resolver};
use crate::value::{type_key_of, NodeHandle, Value};

/// Behaviour of a template-backed node.
///
/// The implementing type names the template (by default its own short type
/// name) and may hook into each render pass.
pub trait Block: 'static {
    /// Template identity, e.g. `Invoice` for `Invoice.Template.htm`.
    fn identity(&self) -> Cow<'_, str> {
        Cow::Owned(type_key_of::<Self>())
    }

    /// Called right before resolution on every render pass.
    ///
    /// Receives the parent resolver so data can be derived lazily from
    /// ancestors and stored in `data`.
    fn pick_sources(&self, data: &DataSource, parent: Option<&Resolver<'_>>) -> RenderResult<()> {
        let _ = (data, parent);
        Ok(())
    }

    /// Visibility predicate, evaluated against the node's own resolver.
    fn is_visible(&self, resolver: &Resolver<'_>) -> RenderResult<bool> {
        let _ = resolver;
        Ok(true)
    }

    /// Members reachable as `me.<name>`. `None` means no such member.
    fn member(&self, name: &str, data: &DataSource) -> Option<Value<'_>> {
        let _ = (name, data);
        None
    }
}

/// Block whose identity is chosen at runtime.
#[derive(Debug, Clone, Default)]
pub struct Named {
    identity: String,
}

impl Named {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }
}

impl Block for Named {
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.identity.as_str())
    }
}

fn normalize_area_id(area_id: &str) -> String {
    area_id.trim().to_lowercase()
}

/// A node rendered from a template, with named areas of child nodes.
pub struct TemplateNode<B: Block = Named> {
    block: B,
    data: DataSource,
    areas: RefCell<HashMap<String, Vec<NodeRef>>>,
}

impl TemplateNode<Named> {
    /// A node whose template identity is given explicitly.
    pub fn named(identity: impl Into<String>) -> Self {
        Self::new(Named::new(identity))
    }
}

impl<B: Block + Default> Default for TemplateNode<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: Block> TemplateNode<B> {
    pub fn new(block: B) -> Self {
        Self {
            block,
            data: DataSource::new(),
            areas: RefCell::new(HashMap::new()),
        }
    }

    pub fn block(&self) -> &B {
        &self.block
    }

    /// Mutable access to an area's child list, creating it if needed.
    ///
    /// Area ids are trimmed and compared case-insensitively. The returned
    /// guard must be dropped before the node is rendered.
    pub fn area(&self, area_id: &str) -> RefMut<'_, Vec<NodeRef>> {
        let key = normalize_area_id(area_id);
        RefMut::map(self.areas.borrow_mut(), |areas| areas.entry(key).or_default())
    }

    /// Append a child node to an area.
    pub fn add(&self, area_id: &str, node: NodeRef) -> &Self {
        self.area(area_id).push(node);
        self
    }

    /// Ids of all areas touched so far, sorted.
    pub fn area_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.areas.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn registered_area(&self, target: &str) -> Option<Vec<NodeRef>> {
        self.areas.borrow().get(&normalize_area_id(target)).cloned()
    }

    fn area_value(nodes: Vec<NodeRef>) -> Value<'static> {
        Value::List(nodes.into_iter().map(Value::node).collect())
    }

    fn resolve_me(&self, member: &str) -> RenderResult<Value<'_>> {
        if member.is_empty() {
            return Ok(Value::Node(NodeHandle::Borrowed(self)));
        }
        let (first, rest) = split_name(member);
        let value = self
            .block
            .member(first, &self.data)
            .ok_or_else(|| RenderError::member_lookup(self.identity(), first))?;
        if rest.is_empty() {
            Ok(value)
        } else {
            read_member_path(value, &format!("me.{}", first), rest)
        }
    }
}

impl<B: Block> Frame for TemplateNode<B> {
    fn resolve_local(&self, name: &str) -> RenderResult<Option<Value<'_>>> {
        let (target, member) = split_name(name);

        if let Some(nodes) = self.registered_area(target) {
            return Ok(Some(Self::area_value(nodes)));
        }

        if target.eq_ignore_ascii_case("subparts") {
            let nodes = self.area(member).clone();
            return Ok(Some(Self::area_value(nodes)));
        }

        if target.eq_ignore_ascii_case("me") {
            return self.resolve_me(member).map(Some);
        }

        self.data.resolve_local(name)
    }
}

impl<B: Block> Node for TemplateNode<B> {
    fn identity(&self) -> String {
        self.block.identity().into_owned()
    }

    fn data_source(&self) -> &DataSource {
        &self.data
    }

    fn is_visible(&self, resolver: &Resolver<'_>) -> RenderResult<bool> {
        self.block.is_visible(resolver)
    }

    fn write_output(
        &self,
        target: &mut dyn Write,
        provider: &dyn FormatProvider,
        parent: Option<&Resolver<'_>>,
        scope: Option<&str>,
    ) -> RenderResult<()> {
        self.block.pick_sources(&self.data, parent)?;

        let resolver = Resolver::chained(self, parent);
        if !self.is_visible(&resolver)? {
            debug!("Skipping invisible node: {}", self.block.identity());
            return Ok(());
        }

        let identity = self.block.identity();
        debug!("Rendering template node: {} (scope {:?})", identity, scope);
        let raw = provider.open_template(scope, &identity)?;
        let text =
            String::from_utf8(raw).map_err(|_| RenderError::InvalidEncoding(identity.to_string()))?;
        provider.render(scope, &resolver, &text, target)
    }
}

impl<B: Block> std::fmt::Debug for TemplateNode<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateNode")
            .field("identity", &self.block.identity())
            .field("data", &self.data)
            .field("areas", &self.area_ids())
            .finish()
    }
}
