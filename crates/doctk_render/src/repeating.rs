//! Nodes that repeat a template once per item.

use std::io::Write;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::debug;

use crate::data_source::DataSource;
use crate::error::{RenderError, RenderResult};
use crate::node::Node;
use crate::provider::FormatProvider;
use crate::resolver::Resolver;
use crate::template::{Block, TemplateNode};
use crate::value::{type_key_of, DataObject, Value};

type Selector = Box<dyn for<'r> Fn(&Resolver<'r>) -> RenderResult<Value<'r>>>;
type Visibility = Box<dyn Fn(&Resolver<'_>) -> RenderResult<bool>>;

enum Items {
    Fixed(Vec<Value<'static>>),
    Selected(Selector),
}

/// Renders a fresh `TemplateNode<B>` for every item of a sequence.
///
/// The item sequence is produced once per render, either from a fixed list
/// or from a selector that may look at ancestor data. Each item becomes the
/// only entry in its prototype's data source; names the item does not answer
/// fall through to this node's own data source and then to the parent chain.
pub struct RepeatingNode<B: Block + Default> {
    data: DataSource,
    items: Items,
    visible: Option<Visibility>,
    prototype: PhantomData<fn() -> B>,
}

impl<B: Block + Default> RepeatingNode<B> {
    /// Repeat over a fixed list of data objects.
    pub fn new<I, D>(items: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: DataObject,
    {
        Self::from_values(items.into_iter().map(Value::object).collect())
    }

    /// Repeat over a fixed list of values.
    pub fn from_values(items: Vec<Value<'static>>) -> Self {
        Self::with_items(Items::Fixed(items))
    }

    /// Repeat over whatever `selector` yields at render time.
    pub fn with_selector<F>(selector: F) -> Self
    where
        F: for<'r> Fn(&Resolver<'r>) -> RenderResult<Value<'r>> + 'static,
    {
        Self::with_items(Items::Selected(Box::new(selector)))
    }

    /// Only render when `predicate` holds.
    pub fn visible_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Resolver<'_>) -> RenderResult<bool> + 'static,
    {
        self.visible = Some(Box::new(predicate));
        self
    }

    fn with_items(items: Items) -> Self {
        Self {
            data: DataSource::new(),
            items,
            visible: None,
            prototype: PhantomData,
        }
    }
}

/// Flatten selected values into data objects, rejecting null items.
fn collect_items(values: Vec<Value<'_>>) -> RenderResult<Vec<Rc<dyn DataObject>>> {
    fn push(
        value: Value<'_>,
        out: &mut Vec<Rc<dyn DataObject>>,
        index: &mut usize,
    ) -> RenderResult<()> {
        let obj: Rc<dyn DataObject> = match value {
            Value::List(items) => {
                for item in items {
                    push(item, out, index)?;
                }
                return Ok(());
            }
            Value::Null => return Err(RenderError::NullItem { index: *index }),
            Value::Object(obj) => obj,
            Value::Text(s) => Rc::new(s),
            Value::Integer(i) => Rc::new(i),
            Value::Float(x) => Rc::new(x),
            Value::Bool(b) => Rc::new(b),
            other => {
                return Err(RenderError::InvalidItem {
                    index: *index,
                    kind: other.kind(),
                })
            }
        };
        out.push(obj);
        *index += 1;
        Ok(())
    }

    let mut out = Vec::with_capacity(values.len());
    let mut index = 0;
    for value in values {
        push(value, &mut out, &mut index)?;
    }
    Ok(out)
}

impl<B: Block + Default> Node for RepeatingNode<B> {
    fn identity(&self) -> String {
        format!("RepeatingNode<{}>", type_key_of::<B>())
    }

    fn data_source(&self) -> &DataSource {
        &self.data
    }

    fn is_visible(&self, resolver: &Resolver<'_>) -> RenderResult<bool> {
        match &self.visible {
            Some(predicate) => predicate(resolver),
            None => Ok(true),
        }
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

        let values = match &self.items {
            Items::Fixed(values) => values.clone(),
            Items::Selected(selector) => match selector(&resolver)? {
                Value::Null => Vec::new(),
                value => vec![value],
            },
        };
        let items = collect_items(values)?;
        debug!("Repeating {} over {} item(s)", type_key_of::<B>(), items.len());

        for item in items {
            let node = TemplateNode::<B>::default();
            node.data_source().set_shared(item);
            node.write_output(target, provider, Some(&resolver), scope)?;
        }
        Ok(())
    }
}
