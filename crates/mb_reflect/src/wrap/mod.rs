//! Object wrapping: the uniform property interface over live values.
//!
//! An [`ObjectWrapper`] adapts one borrowed value to the interface the
//! instance-level resolver walks. Records, string-keyed maps and sequences
//! each get their own wrapper; an absent optional encountered during
//! traversal wraps to the [`Wrapped::Null`] sentinel, which callers detect
//! without touching the value.

use crate::descriptor::DescriptorCache;
use crate::error::ReflectError;
use crate::factory::{DefaultObjectFactory, ObjectFactory};
use crate::path::PathSegment;
use crate::token::TypeToken;
use crate::value::{PropValue, Shape, ShapeMut, flatten, flatten_mut};

mod assoc;
mod record;
mod seq;

pub use assoc::AssocWrapper;
pub use record::RecordWrapper;
pub use seq::SeqWrapper;

// -----------------------------------------------------------------------------
// Environment

/// The services a resolution shares across every wrapper it creates.
#[derive(Clone, Copy)]
pub struct Env<'e> {
    pub factory: &'e dyn ObjectFactory,
    pub wrappers: &'e dyn WrapperFactory,
    pub cache: &'e DescriptorCache,
}

impl<'e> Env<'e> {
    pub fn new(
        factory: &'e dyn ObjectFactory,
        wrappers: &'e dyn WrapperFactory,
        cache: &'e DescriptorCache,
    ) -> Self {
        Env {
            factory,
            wrappers,
            cache,
        }
    }
}

/// The standard environment: default factories over the global descriptor
/// cache.
pub fn default_env() -> Env<'static> {
    static FACTORY: DefaultObjectFactory = DefaultObjectFactory;
    static WRAPPERS: DefaultWrapperFactory = DefaultWrapperFactory;
    Env::new(&FACTORY, &WRAPPERS, DescriptorCache::global())
}

/// Supplies custom wrappers for values the built-in selection should not
/// handle.
pub trait WrapperFactory: Send + Sync {
    /// Whether this factory wants to wrap `value`. Checked before the
    /// built-in kind-based selection.
    fn has_wrapper_for(&self, value: &dyn PropValue) -> bool;

    fn wrapper_for<'a>(
        &self,
        value: &'a mut dyn PropValue,
        env: Env<'a>,
    ) -> Result<Box<dyn ObjectWrapper<'a> + 'a>, ReflectError>;
}

/// The standard factory: declines every value, leaving selection to the
/// built-in wrappers.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultWrapperFactory;

impl WrapperFactory for DefaultWrapperFactory {
    fn has_wrapper_for(&self, _value: &dyn PropValue) -> bool {
        false
    }

    fn wrapper_for<'a>(
        &self,
        value: &'a mut dyn PropValue,
        _env: Env<'a>,
    ) -> Result<Box<dyn ObjectWrapper<'a> + 'a>, ReflectError> {
        Err(ReflectError::Unsupported {
            operation: "wrapper_for",
            type_path: value.type_token().path(),
        })
    }
}

// -----------------------------------------------------------------------------
// Wrapper interface

/// The uniform property interface over one borrowed value.
///
/// Segment operations take the already split [`PathSegment`]; path
/// operations take a full dotted path and recurse through child wrappers.
/// Type queries borrow exclusively because they re-wrap the live child
/// value, which needs the same access as a write.
pub trait ObjectWrapper<'a> {
    /// Reads the value of one segment. Absent map keys and null optionals
    /// read as `None`.
    fn get(&mut self, seg: &PathSegment<'_>) -> Result<Option<&dyn PropValue>, ReflectError>;

    /// Like [`ObjectWrapper::get`], but consumes the wrapper and hands back
    /// a borrow living as long as the wrapped value, so traversal can
    /// continue into the child.
    fn get_into(
        self: Box<Self>,
        seg: &PathSegment<'_>,
    ) -> Result<Option<&'a mut dyn PropValue>, ReflectError>;

    /// Writes the value of one segment.
    fn set(&mut self, seg: &PathSegment<'_>, value: Box<dyn PropValue>)
    -> Result<(), ReflectError>;

    /// Empties the slot one segment names: optionals are cleared, map
    /// entries removed.
    fn clear(&mut self, seg: &PathSegment<'_>) -> Result<(), ReflectError>;

    /// Case-insensitive canonicalization of a dotted property path.
    fn find_property(&self, name: &str, strip_separators: bool) -> Option<String>;

    fn getter_names(&self) -> Vec<String>;

    fn setter_names(&self) -> Vec<String>;

    /// The value type a read of `path` would produce, preferring the
    /// runtime type of live links over declared types.
    fn getter_type(&mut self, path: &str) -> Result<TypeToken, ReflectError>;

    /// The value type a write to `path` expects.
    fn setter_type(&mut self, path: &str) -> Result<TypeToken, ReflectError>;

    fn has_getter(&mut self, path: &str) -> bool;

    fn has_setter(&mut self, path: &str) -> bool;

    /// Creates and stores a value for a link that currently reads null,
    /// returning a borrow of the freshly stored value.
    fn instantiate_child(
        self: Box<Self>,
        seg: &PathSegment<'_>,
        factory: &dyn ObjectFactory,
    ) -> Result<&'a mut dyn PropValue, ReflectError>;

    /// Whether this wrapper collects appended elements.
    fn is_sequence(&self) -> bool {
        false
    }

    fn append(&mut self, element: Box<dyn PropValue>) -> Result<(), ReflectError>;

    fn append_all(&mut self, elements: Vec<Box<dyn PropValue>>) -> Result<(), ReflectError>;
}

// -----------------------------------------------------------------------------
// Selection

/// The result of wrapping a value: a live wrapper, or the null sentinel
/// when the value is an absent optional.
pub enum Wrapped<'a> {
    Live(Box<dyn ObjectWrapper<'a> + 'a>),
    Null,
}

impl Wrapped<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Wrapped::Null)
    }
}

/// Selects the wrapper for a value: a custom factory wrapper when one
/// claims it, otherwise by structural kind. Optionals are seen through,
/// wrapping the inner value or yielding [`Wrapped::Null`].
pub fn wrap<'a>(value: &'a mut dyn PropValue, env: Env<'a>) -> Result<Wrapped<'a>, ReflectError> {
    if env.wrappers.has_wrapper_for(&*value) {
        return Ok(Wrapped::Live(env.wrappers.wrapper_for(value, env)?));
    }
    match value.shape_mut() {
        ShapeMut::Assoc(map) => Ok(Wrapped::Live(Box::new(AssocWrapper::new(map, env)))),
        ShapeMut::Seq(seq) => Ok(Wrapped::Live(Box::new(SeqWrapper::new(seq)))),
        ShapeMut::Opt(opt) => match opt.inner_mut() {
            Some(inner) => wrap(inner, env),
            None => Ok(Wrapped::Null),
        },
        ShapeMut::Record(value) | ShapeMut::Scalar(value) => {
            Ok(Wrapped::Live(Box::new(RecordWrapper::new(value, env))))
        }
    }
}

// -----------------------------------------------------------------------------
// Index resolution

// Applies the `[index]` part of a segment to an already resolved container
// value. `property` names the container for error reporting.

pub(crate) fn index_get<'v>(
    container: &'v dyn PropValue,
    property: &str,
    index: &str,
) -> Result<Option<&'v dyn PropValue>, ReflectError> {
    match container.shape() {
        Shape::Assoc(map) => Ok(map.entry(index).and_then(flatten)),
        Shape::Seq(seq) => {
            let position = parse_index(index)?;
            let len = seq.len();
            match seq.element(position) {
                Some(element) => Ok(flatten(element)),
                None => Err(ReflectError::IndexOutOfBounds {
                    index: position,
                    len,
                }),
            }
        }
        _ => Err(not_indexable(container, property)),
    }
}

pub(crate) fn index_get_mut<'v>(
    container: &'v mut dyn PropValue,
    property: &str,
    index: &str,
) -> Result<Option<&'v mut dyn PropValue>, ReflectError> {
    let type_path = container.type_token().path();
    match container.shape_mut() {
        ShapeMut::Assoc(map) => Ok(map.entry_mut(index).and_then(flatten_mut)),
        ShapeMut::Seq(seq) => {
            let position = parse_index(index)?;
            let len = seq.len();
            match seq.element_mut(position) {
                Some(element) => Ok(flatten_mut(element)),
                None => Err(ReflectError::IndexOutOfBounds {
                    index: position,
                    len,
                }),
            }
        }
        _ => Err(ReflectError::NotIndexable {
            property: property.to_string(),
            type_path,
        }),
    }
}

pub(crate) fn index_set(
    container: &mut dyn PropValue,
    property: &str,
    index: &str,
    value: Box<dyn PropValue>,
) -> Result<(), ReflectError> {
    let type_path = container.type_token().path();
    match container.shape_mut() {
        ShapeMut::Assoc(map) => {
            map.insert_entry(index, value)?;
            Ok(())
        }
        ShapeMut::Seq(seq) => seq.set_element(parse_index(index)?, value),
        _ => Err(ReflectError::NotIndexable {
            property: property.to_string(),
            type_path,
        }),
    }
}

pub(crate) fn index_clear(
    container: &mut dyn PropValue,
    property: &str,
    index: &str,
) -> Result<(), ReflectError> {
    let type_path = container.type_token().path();
    match container.shape_mut() {
        ShapeMut::Assoc(map) => {
            map.remove_entry(index);
            Ok(())
        }
        ShapeMut::Seq(seq) => {
            let position = parse_index(index)?;
            let len = seq.len();
            let Some(element) = seq.element_mut(position) else {
                return Err(ReflectError::IndexOutOfBounds {
                    index: position,
                    len,
                });
            };
            match element.shape_mut() {
                ShapeMut::Opt(opt) => {
                    opt.clear();
                    Ok(())
                }
                _ => Err(ReflectError::Unsupported {
                    operation: "clear a non-optional sequence element",
                    type_path,
                }),
            }
        }
        _ => Err(ReflectError::NotIndexable {
            property: property.to_string(),
            type_path,
        }),
    }
}

fn parse_index(raw: &str) -> Result<usize, ReflectError> {
    raw.parse().map_err(|_| ReflectError::IndexParse {
        raw: raw.to_string(),
    })
}

fn not_indexable(container: &dyn PropValue, property: &str) -> ReflectError {
    ReflectError::NotIndexable {
        property: property.to_string(),
        type_path: container.type_token().path(),
    }
}

// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::StaticType;

    #[test]
    fn wrapping_goes_by_kind() {
        let cache = DescriptorCache::new();
        let factory = DefaultObjectFactory;
        let wrappers = DefaultWrapperFactory;
        let env = Env::new(&factory, &wrappers, &cache);

        let mut seq = vec![1i64];
        let Wrapped::Live(w) = wrap(&mut seq, env).unwrap() else {
            panic!("sequence should wrap live");
        };
        assert!(w.is_sequence());

        let mut opt: Option<i64> = None;
        assert!(wrap(&mut opt, env).unwrap().is_null());

        let mut opt: Option<i64> = Some(3);
        let Wrapped::Live(w) = wrap(&mut opt, env).unwrap() else {
            panic!("present optional should wrap its inner value");
        };
        assert!(!w.is_sequence());
    }

    #[test]
    fn index_get_dispatches_on_container_kind() {
        let seq = vec![10i64, 20];
        let got = index_get(&seq, "items", "1").unwrap().unwrap();
        assert_eq!(got.downcast_ref::<i64>(), Some(&20));

        let err = index_get(&seq, "items", "9").unwrap_err();
        assert_eq!(err, ReflectError::IndexOutOfBounds { index: 9, len: 2 });

        let err = index_get(&seq, "items", "two").unwrap_err();
        assert!(matches!(err, ReflectError::IndexParse { .. }));

        let mut map: std::collections::HashMap<String, i64> = std::collections::HashMap::new();
        map.insert("a".to_string(), 1);
        assert!(index_get(&map, "scores", "a").unwrap().is_some());
        assert!(index_get(&map, "scores", "b").unwrap().is_none());

        let scalar = 5i64;
        let err = index_get(&scalar, "price", "0").unwrap_err();
        assert!(matches!(err, ReflectError::NotIndexable { .. }));
    }

    #[test]
    fn index_clear_empties_optional_elements() {
        let mut seq: Vec<Option<i64>> = vec![Some(1), Some(2)];
        index_clear(&mut seq, "slots", "0").unwrap();
        assert_eq!(seq, [None, Some(2)]);

        let mut plain = vec![1i64];
        let err = index_clear(&mut plain, "slots", "0").unwrap_err();
        assert!(matches!(err, ReflectError::Unsupported { .. }));
    }

    #[test]
    fn default_factory_is_inert() {
        let wrappers = DefaultWrapperFactory;
        let mut value = 1i64;
        assert!(!wrappers.has_wrapper_for(&value));

        let cache = DescriptorCache::new();
        let factory = DefaultObjectFactory;
        let env = Env::new(&factory, &wrappers, &cache);
        assert!(wrappers.wrapper_for(&mut value, env).is_err());
    }

    #[test]
    fn default_env_is_shared() {
        let env = default_env();
        let token = <i64 as StaticType>::token();
        env.cache.describe(token);
        assert!(DescriptorCache::global().contains(&token));
    }
}
