//! Instance-level path resolution.

use crate::error::ReflectError;
use crate::path::PathSegment;
use crate::token::TypeToken;
use crate::value::PropValue;
use crate::wrap::{Env, Wrapped, default_env, wrap};

/// Resolves property paths against a live value.
///
/// Reads walk the actual object graph, so runtime types win over declared
/// ones. Writes materialize missing links on the way down: an absent
/// optional or map entry named by an intermediate segment is created
/// through the environment's object factory before descent continues.
///
/// # Examples
///
/// ```
/// use mb_reflect::{MetaValue, PropMap};
///
/// let mut data = PropMap::new();
/// let mut meta = MetaValue::with_default_env(&mut data);
/// meta.set_value("order.id", Box::new(41_i64)).unwrap();
///
/// let id = meta.get_value("order.id").unwrap().unwrap();
/// assert_eq!(id.downcast_ref::<i64>(), Some(&41));
/// ```
pub struct MetaValue<'a> {
    value: &'a mut dyn PropValue,
    env: Env<'a>,
}

impl<'a> MetaValue<'a> {
    pub fn new(value: &'a mut dyn PropValue, env: Env<'a>) -> Self {
        MetaValue { value, env }
    }

    /// Wraps `value` with the default factories over the global descriptor
    /// cache.
    pub fn with_default_env(value: &'a mut dyn PropValue) -> Self {
        Self::new(value, default_env())
    }

    /// The underlying value.
    pub fn value(&self) -> &dyn PropValue {
        &*self.value
    }

    fn wrapper(&mut self) -> Result<Wrapped<'_>, ReflectError> {
        wrap(&mut *self.value, self.env)
    }

    /// Reads the value at `path`. A null link anywhere along the way, or
    /// an absent map key at the end, reads as `None`.
    pub fn get_value(&mut self, path: &str) -> Result<Option<&dyn PropValue>, ReflectError> {
        get_in(&mut *self.value, PathSegment::parse(path), self.env)
            .map(|found| found.map(|v| &*v))
    }

    /// Writes `value` at `path`, creating every missing link on the way.
    ///
    /// Writing through a null root fails: there is no slot to put the
    /// created links into.
    pub fn set_value(&mut self, path: &str, value: Box<dyn PropValue>) -> Result<(), ReflectError> {
        set_in(&mut *self.value, PathSegment::parse(path), self.env, value)
    }

    /// Empties the slot at `path`: optionals are cleared, map entries
    /// removed. A null link along the way makes this a no-op, never an
    /// error.
    pub fn clear_value(&mut self, path: &str) -> Result<(), ReflectError> {
        clear_in(&mut *self.value, PathSegment::parse(path), self.env)
    }

    /// Case-insensitive canonicalization of a dotted property path.
    pub fn find_property(&mut self, name: &str, strip_separators: bool) -> Option<String> {
        match self.wrapper() {
            Ok(Wrapped::Live(w)) => w.find_property(name, strip_separators),
            _ => None,
        }
    }

    pub fn getter_names(&mut self) -> Vec<String> {
        match self.wrapper() {
            Ok(Wrapped::Live(w)) => w.getter_names(),
            _ => Vec::new(),
        }
    }

    pub fn setter_names(&mut self) -> Vec<String> {
        match self.wrapper() {
            Ok(Wrapped::Live(w)) => w.setter_names(),
            _ => Vec::new(),
        }
    }

    /// The value type a read of `path` would produce, taking the runtime
    /// types of live links into account.
    pub fn getter_type(&mut self, path: &str) -> Result<TypeToken, ReflectError> {
        match self.wrapper()? {
            Wrapped::Live(mut w) => w.getter_type(path),
            Wrapped::Null => Err(null_root(path)),
        }
    }

    /// The value type a write to `path` expects.
    pub fn setter_type(&mut self, path: &str) -> Result<TypeToken, ReflectError> {
        match self.wrapper()? {
            Wrapped::Live(mut w) => w.setter_type(path),
            Wrapped::Null => Err(null_root(path)),
        }
    }

    pub fn has_getter(&mut self, path: &str) -> bool {
        match self.wrapper() {
            Ok(Wrapped::Live(mut w)) => w.has_getter(path),
            _ => false,
        }
    }

    pub fn has_setter(&mut self, path: &str) -> bool {
        match self.wrapper() {
            Ok(Wrapped::Live(mut w)) => w.has_setter(path),
            _ => false,
        }
    }

    /// Whether the wrapped value collects appended elements.
    pub fn is_sequence(&mut self) -> bool {
        match self.wrapper() {
            Ok(Wrapped::Live(w)) => w.is_sequence(),
            _ => false,
        }
    }

    pub fn append(&mut self, element: Box<dyn PropValue>) -> Result<(), ReflectError> {
        match self.wrapper()? {
            Wrapped::Live(mut w) => w.append(element),
            Wrapped::Null => Err(null_root("")),
        }
    }

    pub fn append_all(&mut self, elements: Vec<Box<dyn PropValue>>) -> Result<(), ReflectError> {
        match self.wrapper()? {
            Wrapped::Live(mut w) => w.append_all(elements),
            Wrapped::Null => Err(null_root("")),
        }
    }
}

fn null_root(path: &str) -> ReflectError {
    ReflectError::NullValue {
        property: path.to_string(),
    }
}

// -----------------------------------------------------------------------------
// Traversal

fn get_in<'v>(
    value: &'v mut dyn PropValue,
    seg: PathSegment<'_>,
    env: Env<'v>,
) -> Result<Option<&'v mut dyn PropValue>, ReflectError> {
    let w = match wrap(value, env)? {
        Wrapped::Live(w) => w,
        Wrapped::Null => return Ok(None),
    };
    match seg.children() {
        Some(rest) => match w.get_into(&seg)? {
            Some(child) => get_in(child, PathSegment::parse(rest), env),
            None => Ok(None),
        },
        None => w.get_into(&seg),
    }
}

fn set_in<'v>(
    value: &'v mut dyn PropValue,
    seg: PathSegment<'_>,
    env: Env<'v>,
    new_value: Box<dyn PropValue>,
) -> Result<(), ReflectError> {
    let mut w = match wrap(value, env)? {
        Wrapped::Live(w) => w,
        Wrapped::Null => {
            return Err(ReflectError::NullValue {
                property: seg.to_string(),
            });
        }
    };
    let Some(rest) = seg.children() else {
        return w.set(&seg, new_value);
    };
    // Descend through the link, creating it first if it reads null.
    let child = if w.get(&seg)?.is_some() {
        w.get_into(&seg)?.ok_or_else(|| ReflectError::NullValue {
            property: seg.indexed_name().to_string(),
        })?
    } else {
        w.instantiate_child(&seg, env.factory)?
    };
    set_in(child, PathSegment::parse(rest), env, new_value)
}

fn clear_in<'v>(
    value: &'v mut dyn PropValue,
    seg: PathSegment<'_>,
    env: Env<'v>,
) -> Result<(), ReflectError> {
    let mut w = match wrap(value, env)? {
        Wrapped::Live(w) => w,
        Wrapped::Null => return Ok(()),
    };
    match seg.children() {
        Some(rest) => match w.get_into(&seg)? {
            Some(child) => clear_in(child, PathSegment::parse(rest), env),
            // Nothing behind the link, so nothing to clear.
            None => Ok(()),
        },
        None => w.clear(&seg),
    }
}

// -----------------------------------------------------------------------------
