//! Chained name resolution.
//!
//! Each node renders with a [`Resolver`] made of its own [`Frame`] and a
//! reference to the resolver of its parent. A name that a frame does not
//! know is handed, unchanged, to the parent; the root of the chain answers
//! `Null` for anything nobody knows.

use crate::error::{RenderError, RenderResult};
use crate::value::Value;

/// A single level of name lookup.
pub trait Frame {
    /// Resolve `name` locally.
    ///
    /// `Ok(None)` means this frame has nothing for the name and the parent
    /// should be asked. `Ok(Some(Value::Null))` is a final null answer.
    fn resolve_local(&self, name: &str) -> RenderResult<Option<Value<'_>>>;
}

/// Frame backed by a closure, for ad-hoc lookups.
pub struct FnFrame<F>(pub F);

impl<F> Frame for FnFrame<F>
where
    F: Fn(&str) -> RenderResult<Option<Value<'static>>>,
{
    fn resolve_local(&self, name: &str) -> RenderResult<Option<Value<'_>>> {
        (self.0)(name)
    }
}

/// A frame plus an optional parent resolver.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    frame: &'a dyn Frame,
    parent: Option<&'a Resolver<'a>>,
}

impl<'a> Resolver<'a> {
    /// A resolver with no parent.
    pub fn root(frame: &'a dyn Frame) -> Self {
        Self {
            frame,
            parent: None,
        }
    }

    /// A resolver that falls back to `parent` when `frame` has no answer.
    pub fn chained(frame: &'a dyn Frame, parent: Option<&'a Resolver<'a>>) -> Self {
        Self { frame, parent }
    }

    pub fn parent(&self) -> Option<&'a Resolver<'a>> {
        self.parent
    }

    /// Resolve a dotted name through the chain.
    pub fn resolve(&self, name: &str) -> RenderResult<Value<'a>> {
        if let Some(value) = self.frame.resolve_local(name)? {
            return Ok(value);
        }
        match self.parent {
            Some(parent) => parent.resolve(name),
            None => Ok(Value::Null),
        }
    }
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut depth = 0;
        let mut current = self.parent;
        while let Some(parent) = current {
            depth += 1;
            current = parent.parent;
        }
        f.debug_struct("Resolver").field("depth", &depth).finish()
    }
}

/// Split `target.member` at the first dot. The member may itself be dotted.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.split_once('.') {
        Some((target, member)) => (target, member),
        None => (name, ""),
    }
}

/// Walk a dotted member path starting at `value`.
///
/// Every step must land on an object that exposes the next member; anything
/// else is a [`RenderError::MemberLookup`].
pub(crate) fn read_member_path<'a>(
    mut value: Value<'a>,
    target: &str,
    path: &str,
) -> RenderResult<Value<'a>> {
    let mut owner = target.to_string();
    for member in path.split('.') {
        value = match value {
            Value::Object(obj) => obj
                .member(member)
                .ok_or_else(|| RenderError::member_lookup(owner.as_str(), member))?,
            _ => return Err(RenderError::member_lookup(owner.as_str(), member)),
        };
        owner = format!("{}.{}", owner, member);
    }
    Ok(value)
}
