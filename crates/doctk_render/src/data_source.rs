//! Per-node typed object bag.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::resolver::{read_member_path, split_name, Frame};
use crate::value::{type_key_of, DataObject, Value};

/// Objects keyed by their semantic type key.
///
/// Setting a key again replaces the previous object. A key may also hold an
/// explicit null (see [`DataSource::set_as`]); lookups treat it like a
/// missing key so resolution falls through to the parent resolver.
///
/// Interior mutability lets nodes inject data while they are being rendered.
/// A data source is not meant to be shared across threads.
#[derive(Default)]
pub struct DataSource {
    entries: RefCell<HashMap<String, Option<Rc<dyn DataObject>>>>,
}

impl DataSource {
    /// Create an empty data source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object under its own type key.
    pub fn set<T: DataObject>(&self, value: T) {
        self.set_shared(Rc::new(value));
    }

    /// Store an already shared object under its own type key.
    pub fn set_shared(&self, value: Rc<dyn DataObject>) {
        let key = value.type_key();
        debug!("Setting data source entry: {}", key);
        self.entries.borrow_mut().insert(key, Some(value));
    }

    /// Store a value under the declared type's key, which may be null.
    pub fn set_as<T: DataObject>(&self, value: Option<T>) {
        let key = type_key_of::<T>();
        let value = value.map(|v| Rc::new(v) as Rc<dyn DataObject>);
        self.entries.borrow_mut().insert(key, value);
    }

    /// Get the object stored under a type key.
    pub fn get(&self, type_key: &str) -> Option<Rc<dyn DataObject>> {
        self.entries.borrow().get(type_key).cloned().flatten()
    }

    /// Get the object stored under `T`'s key, if it is a `T`.
    pub fn get_typed<T: DataObject>(&self) -> Option<Rc<T>> {
        self.get(&type_key_of::<T>())
            .and_then(|obj| obj.into_any_rc().downcast::<T>().ok())
    }

    /// Get the `T` stored under its key, storing a default one first if the
    /// key is absent or null.
    ///
    /// Fails with [`RenderError::TypeMismatch`] when the key holds an object
    /// of another concrete type; that entry is left in place.
    pub fn get_or_add<T: DataObject + Default>(&self) -> RenderResult<Rc<T>> {
        let key = type_key_of::<T>();
        if let Some(existing) = self.get(&key) {
            return existing
                .into_any_rc()
                .downcast::<T>()
                .map_err(|_| RenderError::TypeMismatch {
                    key,
                    expected: std::any::type_name::<T>().to_string(),
                });
        }
        let created = Rc::new(T::default());
        self.entries
            .borrow_mut()
            .insert(key, Some(created.clone() as Rc<dyn DataObject>));
        Ok(created)
    }

    /// Merge all entries into `target`; entries from `self` win on conflict.
    pub fn copy_into(&self, target: &DataSource) {
        if std::ptr::eq(self, target) {
            return;
        }
        let entries = self.entries.borrow();
        let mut target_entries = target.entries.borrow_mut();
        for (key, value) in entries.iter() {
            target_entries.insert(key.clone(), value.clone());
        }
    }

    /// Check whether a key has been set (even to null).
    pub fn contains(&self, type_key: &str) -> bool {
        self.entries.borrow().contains_key(type_key)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Frame for DataSource {
    fn resolve_local(&self, name: &str) -> RenderResult<Option<Value<'_>>> {
        let (target, member) = split_name(name);
        match self.get(target) {
            None => Ok(None),
            Some(obj) if member.is_empty() => Ok(Some(Value::Object(obj))),
            Some(obj) => read_member_path(Value::Object(obj), target, member).map(Some),
        }
    }
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("keys", &self.keys())
            .finish()
    }
}
