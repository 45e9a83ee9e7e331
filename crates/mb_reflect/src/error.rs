//! Error type shared by descriptor building, wrapping and path resolution.

use std::fmt;

use crate::value::PropValue;

/// The error produced by every fallible reflection operation in this crate.
///
/// Accessor ambiguity deserves a note: resolving a type descriptor never
/// fails. When two candidate accessors for a property cannot be ordered, the
/// losing resolution is recorded inside the descriptor and surfaces as
/// [`ReflectError::AmbiguousAccessor`] only when that accessor is invoked.
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectError {
    /// The type has no readable property with this name.
    NoGetter {
        property: String,
        type_path: &'static str,
    },
    /// The type has no writable property with this name.
    NoSetter {
        property: String,
        type_path: &'static str,
    },
    /// The property has conflicting accessor candidates that could not be
    /// ordered when its descriptor was built.
    AmbiguousAccessor {
        message: String,
    },
    /// The property is readable, but exposes no mutable projection, so it
    /// cannot be traversed by a write.
    NoMutAccess {
        property: String,
        type_path: &'static str,
    },
    /// The type declares no way to construct a default instance.
    NoDefaultConstructor {
        type_path: &'static str,
    },
    /// An object factory failed to produce an instance.
    Instantiation {
        type_path: &'static str,
        detail: String,
    },
    /// The wrapper for this value does not support the requested operation.
    Unsupported {
        operation: &'static str,
        type_path: &'static str,
    },
    /// An `[index]` segment was applied to a value that is neither a
    /// sequence nor a string-keyed map.
    NotIndexable {
        property: String,
        type_path: &'static str,
    },
    /// A property that must hold a value to continue holds none.
    NullValue {
        property: String,
    },
    /// The text between `[` and `]` did not parse as a sequence index.
    IndexParse {
        raw: String,
    },
    /// A sequence index beyond the current length.
    IndexOutOfBounds {
        index: usize,
        len: usize,
    },
    /// A written value did not match the declared slot type.
    ValueType {
        expected: &'static str,
        found: &'static str,
    },
    /// An accessor was invoked on a value of the wrong concrete type.
    WrongReceiver {
        expected: &'static str,
        found: &'static str,
    },
    /// The value does not support cloning through reflection.
    NotCloneable {
        type_path: &'static str,
    },
}

impl ReflectError {
    pub fn no_getter(property: impl Into<String>, type_path: &'static str) -> Self {
        ReflectError::NoGetter {
            property: property.into(),
            type_path,
        }
    }

    pub fn no_setter(property: impl Into<String>, type_path: &'static str) -> Self {
        ReflectError::NoSetter {
            property: property.into(),
            type_path,
        }
    }

    /// Shorthand for [`ReflectError::ValueType`] with a statically known
    /// expected type, used by generated write accessors.
    pub fn value_type<T: 'static>(found: &dyn PropValue) -> Self {
        ReflectError::ValueType {
            expected: std::any::type_name::<T>(),
            found: found.type_token().path(),
        }
    }

    /// Shorthand for [`ReflectError::WrongReceiver`], used by generated
    /// accessors when the base object fails to downcast.
    pub fn wrong_receiver<T: 'static>(found: &dyn PropValue) -> Self {
        ReflectError::WrongReceiver {
            expected: std::any::type_name::<T>(),
            found: found.type_token().path(),
        }
    }
}

impl fmt::Display for ReflectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectError::NoGetter {
                property,
                type_path,
            } => write!(
                f,
                "there is no getter for property named '{property}' in `{type_path}`",
            ),
            ReflectError::NoSetter {
                property,
                type_path,
            } => write!(
                f,
                "there is no setter for property named '{property}' in `{type_path}`",
            ),
            ReflectError::AmbiguousAccessor { message } => f.write_str(message),
            ReflectError::NoMutAccess {
                property,
                type_path,
            } => write!(
                f,
                "property '{property}' of `{type_path}` has no mutable accessor and cannot be written through",
            ),
            ReflectError::NoDefaultConstructor { type_path } => {
                write!(f, "there is no default constructor for `{type_path}`")
            }
            ReflectError::Instantiation { type_path, detail } => {
                write!(f, "error instantiating `{type_path}`: {detail}")
            }
            ReflectError::Unsupported {
                operation,
                type_path,
            } => write!(
                f,
                "operation '{operation}' is not supported by the wrapper for `{type_path}`",
            ),
            ReflectError::NotIndexable {
                property,
                type_path,
            } => write!(
                f,
                "cannot index into property '{property}': `{type_path}` is neither a sequence nor a map",
            ),
            ReflectError::NullValue { property } => {
                write!(f, "property '{property}' holds no value")
            }
            ReflectError::IndexParse { raw } => {
                write!(f, "invalid sequence index '{raw}'")
            }
            ReflectError::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for sequence of length {len}")
            }
            ReflectError::ValueType { expected, found } => {
                write!(f, "expected a value of type `{expected}`, found `{found}`")
            }
            ReflectError::WrongReceiver { expected, found } => {
                write!(f, "accessor invoked on `{found}`, expected `{expected}`")
            }
            ReflectError::NotCloneable { type_path } => {
                write!(f, "`{type_path}` does not support cloning through reflection")
            }
        }
    }
}

impl std::error::Error for ReflectError {}
