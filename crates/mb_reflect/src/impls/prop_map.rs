//! The dynamic property bag, and the placeholder type for untyped slots.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ReflectError;
use crate::token::{StaticType, TypeToken, ValueKind};
use crate::value::{Assoc, DebugValue, PropValue, Shape, ShapeMut};

/// A heterogeneous string-keyed property bag.
///
/// Entries hold any [`PropValue`], so a `PropMap` can stand in wherever the
/// concrete shape of the data is not known until runtime. Writes through
/// missing links of untyped slots materialize nested `PropMap`s.
///
/// # Examples
///
/// ```
/// use mb_reflect::PropMap;
///
/// let mut map = PropMap::new();
/// map.insert("id", 7i64);
/// map.insert("label", "primary".to_string());
///
/// assert_eq!(map.get("id").unwrap().downcast_ref::<i64>(), Some(&7));
/// ```
#[derive(Default)]
pub struct PropMap {
    entries: BTreeMap<String, Box<dyn PropValue>>,
}

impl PropMap {
    pub fn new() -> Self {
        PropMap {
            entries: BTreeMap::new(),
        }
    }

    /// Inserts a typed value, returning the previous entry if any.
    pub fn insert<T: PropValue>(&mut self, key: &str, value: T) -> Option<Box<dyn PropValue>> {
        self.entries.insert(key.to_string(), Box::new(value))
    }

    pub fn get(&self, key: &str) -> Option<&dyn PropValue> {
        self.entries.get(key).map(|v| &**v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut dyn PropValue> {
        self.entries.get_mut(key).map(|v| &mut **v)
    }
}

impl fmt::Debug for PropMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, DebugValue(&**v))))
            .finish()
    }
}

impl PropValue for PropMap {
    fn type_token(&self) -> TypeToken {
        <Self as StaticType>::token()
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::Assoc
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Assoc(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Assoc(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn assign(&mut self, value: Box<dyn PropValue>) -> Result<(), Box<dyn PropValue>> {
        *self = value.take::<Self>()?;
        Ok(())
    }

    fn try_clone(&self) -> Option<Box<dyn PropValue>> {
        let mut out = PropMap::new();
        for (key, value) in &self.entries {
            out.entries.insert(key.clone(), value.try_clone()?);
        }
        Some(Box::new(out))
    }

    fn debug_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl StaticType for PropMap {
    fn token() -> TypeToken {
        TypeToken::of_type::<Self>(ValueKind::Assoc)
            .with_element(Unknown::token)
            .with_default(|| Box::new(PropMap::new()))
    }
}

impl Assoc for PropMap {
    fn entry(&self, key: &str) -> Option<&dyn PropValue> {
        self.get(key)
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut dyn PropValue> {
        self.get_mut(key)
    }

    fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn insert_entry(
        &mut self,
        key: &str,
        value: Box<dyn PropValue>,
    ) -> Result<Option<Box<dyn PropValue>>, ReflectError> {
        Ok(self.entries.insert(key.to_string(), value))
    }

    fn remove_entry(&mut self, key: &str) -> Option<Box<dyn PropValue>> {
        self.entries.remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// -----------------------------------------------------------------------------

/// The declared type of slots whose value type cannot be known statically,
/// such as [`PropMap`] entries that are not present yet.
///
/// Object factories substitute a concrete type, by default [`PropMap`],
/// when asked to instantiate an `Unknown` slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unknown;

impl PropValue for Unknown {
    fn type_token(&self) -> TypeToken {
        <Self as StaticType>::token()
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::Scalar
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Scalar(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn assign(&mut self, value: Box<dyn PropValue>) -> Result<(), Box<dyn PropValue>> {
        *self = value.take::<Self>()?;
        Ok(())
    }

    fn try_clone(&self) -> Option<Box<dyn PropValue>> {
        Some(Box::new(Unknown))
    }

    fn debug_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<unknown>")
    }
}

impl StaticType for Unknown {
    fn token() -> TypeToken {
        TypeToken::of_type::<Self>(ValueKind::Scalar)
    }
}
