//! The base reflection trait and the structural views over it.
//!
//! [`PropValue`] is the object-safe trait every value addressable by a
//! property path implements. Code never matches on concrete types during
//! resolution; it asks a value for its [`Shape`], a borrowed view that tags
//! the value with the container subtrait it supports.

use std::any::{Any, TypeId};
use std::fmt;

use crate::error::ReflectError;
use crate::token::{TypeToken, ValueKind};

// -----------------------------------------------------------------------------
// Base trait

/// A value that can be addressed through property paths.
///
/// Implemented by the derive macro for records and by this crate for
/// scalars, strings, sequences, string-keyed maps and `Option`.
pub trait PropValue: Any + Send + Sync {
    /// The token describing this value's concrete type.
    fn type_token(&self) -> TypeToken;

    /// The structural category, equal to `self.type_token().kind()` but
    /// available without building a token.
    fn value_kind(&self) -> ValueKind;

    /// A shared structural view of this value.
    fn shape(&self) -> Shape<'_>;

    /// An exclusive structural view of this value.
    fn shape_mut(&mut self) -> ShapeMut<'_>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Replaces this value wholesale. Returns the incoming box unchanged
    /// when its concrete type does not match.
    fn assign(&mut self, value: Box<dyn PropValue>) -> Result<(), Box<dyn PropValue>>;

    /// A deep copy behind the trait object, when the type supports one.
    fn try_clone(&self) -> Option<Box<dyn PropValue>> {
        None
    }

    fn debug_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl dyn PropValue {
    /// Whether the underlying concrete type is `T`.
    pub fn is<T: PropValue>(&self) -> bool {
        self.as_any().type_id() == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: PropValue>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: PropValue>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Takes the concrete value out of the box, handing the box back on a
    /// type mismatch so the caller can report or retry.
    pub fn take<T: PropValue>(self: Box<Self>) -> Result<T, Box<dyn PropValue>> {
        if !self.is::<T>() {
            return Err(self);
        }
        // The identity check above makes this downcast infallible.
        match self.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => unreachable!(),
        }
    }
}

impl fmt::Debug for dyn PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.debug_fmt(f)
    }
}

/// Adapter rendering any [`PropValue`] with its reflective debug output.
///
/// Used by generated `debug_fmt` implementations to format fields that are
/// only known to be `PropValue`.
pub struct DebugValue<'a>(pub &'a dyn PropValue);

impl fmt::Debug for DebugValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.debug_fmt(f)
    }
}

// -----------------------------------------------------------------------------
// Structural views

/// A shared view tagging a value with its structural category.
pub enum Shape<'a> {
    Record(&'a dyn PropValue),
    Assoc(&'a dyn Assoc),
    Seq(&'a dyn Seq),
    Opt(&'a dyn OptValue),
    Scalar(&'a dyn PropValue),
}

/// An exclusive view tagging a value with its structural category.
pub enum ShapeMut<'a> {
    Record(&'a mut dyn PropValue),
    Assoc(&'a mut dyn Assoc),
    Seq(&'a mut dyn Seq),
    Opt(&'a mut dyn OptValue),
    Scalar(&'a mut dyn PropValue),
}

// -----------------------------------------------------------------------------
// Container subtraits

/// A string-keyed map. Every key doubles as a property name.
pub trait Assoc: PropValue {
    fn entry(&self, key: &str) -> Option<&dyn PropValue>;

    fn entry_mut(&mut self, key: &str) -> Option<&mut dyn PropValue>;

    fn contains_key(&self, key: &str) -> bool;

    /// Inserts or replaces an entry, returning the previous value.
    ///
    /// Fails with [`ReflectError::ValueType`] when the map carries a typed
    /// value slot the incoming box does not match.
    fn insert_entry(
        &mut self,
        key: &str,
        value: Box<dyn PropValue>,
    ) -> Result<Option<Box<dyn PropValue>>, ReflectError>;

    fn remove_entry(&mut self, key: &str) -> Option<Box<dyn PropValue>>;

    fn keys(&self) -> Vec<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A positionally indexed sequence.
pub trait Seq: PropValue {
    fn element(&self, index: usize) -> Option<&dyn PropValue>;

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn PropValue>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the element at an existing position.
    fn set_element(&mut self, index: usize, value: Box<dyn PropValue>)
    -> Result<(), ReflectError>;

    /// Appends an element, for growable sequences.
    fn append(&mut self, value: Box<dyn PropValue>) -> Result<(), ReflectError>;
}

/// An optional slot. The absent state is how a null property reads.
pub trait OptValue: PropValue {
    fn inner(&self) -> Option<&dyn PropValue>;

    fn inner_mut(&mut self) -> Option<&mut dyn PropValue>;

    /// Stores a value of the element type, replacing any present value.
    fn fill(&mut self, value: Box<dyn PropValue>) -> Result<(), ReflectError>;

    /// Empties the slot.
    fn clear(&mut self);
}

// -----------------------------------------------------------------------------
// Opt flattening

/// Sees through an optional slot: absent reads as `None`, anything else as
/// the value itself.
pub fn flatten<'a>(value: &'a dyn PropValue) -> Option<&'a dyn PropValue> {
    match value.shape() {
        Shape::Opt(opt) => opt.inner(),
        _ => Some(value),
    }
}

/// Exclusive counterpart of [`flatten`].
pub fn flatten_mut<'a>(value: &'a mut dyn PropValue) -> Option<&'a mut dyn PropValue> {
    if value.value_kind() != ValueKind::Opt {
        return Some(value);
    }
    match value.shape_mut() {
        ShapeMut::Opt(opt) => opt.inner_mut(),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
