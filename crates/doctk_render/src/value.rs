//! Resolved values and the data-object capability.
//!
//! A [`Value`] is what a resolver hands back for a placeholder. Typed data is
//! stored in a [`DataSource`](crate::DataSource) as a [`DataObject`], which
//! replaces runtime reflection with an explicit accessor: each type decides
//! which members it exposes and how it turns into text.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::error::RenderResult;
use crate::image::Image;
use crate::node::{Node, NodeRef};
use crate::provider::format::format_scalar;

/// Short type name used as a data-source key.
///
/// Module paths and generic arguments are stripped, so
/// `alloc::string::String` becomes `String` and `my_crate::Row<u8>` becomes
/// `Row`.
pub fn type_key_of<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Upcast helper so shared data objects can be downcast to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// An object that can live in a data source and be read by placeholders.
///
/// `member` returns `None` only when the member does not exist at all; a
/// member that exists but holds nothing should return `Some(Value::Null)`.
pub trait DataObject: AsAny {
    /// Key under which `DataSource::set` stores this object.
    fn type_key(&self) -> String {
        type_key_of::<Self>()
    }

    /// Read a named member.
    fn member(&self, name: &str) -> Option<Value<'static>> {
        let _ = name;
        None
    }

    /// Default text form, optionally shaped by a format spec.
    fn to_text(&self, format: Option<&str>) -> RenderResult<String> {
        let _ = format;
        Ok(self.type_key())
    }
}

impl DataObject for String {
    fn member(&self, name: &str) -> Option<Value<'static>> {
        match name {
            "Length" | "len" => Some(Value::Integer(self.chars().count() as i64)),
            _ => None,
        }
    }

    fn to_text(&self, _format: Option<&str>) -> RenderResult<String> {
        Ok(self.clone())
    }
}

impl DataObject for i64 {
    fn to_text(&self, format: Option<&str>) -> RenderResult<String> {
        format_scalar(&Value::Integer(*self), format)
    }
}

impl DataObject for f64 {
    fn to_text(&self, format: Option<&str>) -> RenderResult<String> {
        format_scalar(&Value::Float(*self), format)
    }
}

impl DataObject for bool {
    fn to_text(&self, format: Option<&str>) -> RenderResult<String> {
        format_scalar(&Value::Bool(*self), format)
    }
}

/// Handle to a node that is either shared or borrowed from the current frame.
#[derive(Clone)]
pub enum NodeHandle<'a> {
    Shared(NodeRef),
    Borrowed(&'a dyn Node),
}

impl<'a> Deref for NodeHandle<'a> {
    type Target = dyn Node + 'a;

    fn deref(&self) -> &Self::Target {
        match self {
            NodeHandle::Shared(node) => node.as_ref(),
            NodeHandle::Borrowed(node) => *node,
        }
    }
}

/// A value produced by resolving a placeholder name.
#[derive(Clone)]
pub enum Value<'a> {
    /// Nothing; renders as empty output.
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Local>),
    Uuid(Uuid),
    /// Image payload, written with the provider's inline encoding.
    Image(Image),
    /// Raw payload, copied to the output unescaped.
    Bytes(Vec<u8>),
    List(Vec<Value<'a>>),
    Object(Rc<dyn DataObject>),
    Node(NodeHandle<'a>),
}

impl<'a> Value<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Wrap a data object.
    pub fn object(obj: impl DataObject) -> Self {
        Value::Object(Rc::new(obj))
    }

    /// Wrap a shared node.
    pub fn node(node: NodeRef) -> Self {
        Value::Node(NodeHandle::Shared(node))
    }

    /// Text for plain scalar values, `None` for structural ones.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::Image(_) => "image",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::Node(_) => "node",
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Value::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Timestamp(t) => f.debug_tuple("Timestamp").field(t).finish(),
            Value::Uuid(u) => f.debug_tuple("Uuid").field(u).finish(),
            Value::Image(img) => f.debug_tuple("Image").field(img).finish(),
            Value::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Object(obj) => write!(f, "Object({})", obj.type_key()),
            Value::Node(node) => write!(f, "Node({})", node.identity()),
        }
    }
}

impl From<&str> for Value<'_> {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value<'_> {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value<'_> {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value<'_> {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Local>> for Value<'_> {
    fn from(t: DateTime<Local>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Uuid> for Value<'_> {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<Image> for Value<'_> {
    fn from(img: Image) -> Self {
        Value::Image(img)
    }
}

impl<'a> From<Vec<Value<'a>>> for Value<'a> {
    fn from(items: Vec<Value<'a>>) -> Self {
        Value::List(items)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}
