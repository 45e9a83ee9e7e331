//! Type tokens: lightweight compile-time descriptions of reflected types.
//!
//! A [`TypeToken`] is a `Copy` handle carrying everything the resolution
//! layers need to reason about a type without an instance of it: identity,
//! display paths, its [`ValueKind`], an optional element type for containers,
//! an explicit widening chain for assignability checks, and hooks for schema
//! lookup and default construction.

use std::any::{Any, TypeId, type_name};
use std::fmt;

use crate::schema::TypeSchema;
use crate::value::PropValue;

// -----------------------------------------------------------------------------
// Value kind

/// The structural category of a reflected value.
///
/// The kind decides which wrapper a value receives and how an `[index]`
/// segment applies to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A named-field structure accessed through a type descriptor.
    Record,
    /// A string-keyed map; every key is a property.
    Assoc,
    /// A positionally indexed sequence.
    Seq,
    /// An optional slot; the absent state models a null property.
    Opt,
    /// A leaf value with no addressable interior.
    Scalar,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Record => "record",
            ValueKind::Assoc => "assoc",
            ValueKind::Seq => "seq",
            ValueKind::Opt => "opt",
            ValueKind::Scalar => "scalar",
        };
        f.write_str(name)
    }
}

// -----------------------------------------------------------------------------
// Type token

/// A copyable, instance-free description of a reflected type.
///
/// Tokens compare equal by [`TypeId`]. The optional hooks are plain function
/// pointers so a token can live in `static` tables and be produced from
/// nothing at any time.
#[derive(Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    path: &'static str,
    name: &'static str,
    kind: ValueKind,
    element: Option<fn() -> TypeToken>,
    supers: &'static [fn() -> TypeToken],
    schema: Option<fn() -> TypeSchema>,
    default_fn: Option<fn() -> Box<dyn PropValue>>,
}

impl TypeToken {
    /// Creates a bare token for `T` with the given kind and no hooks.
    pub fn of_type<T: Any>(kind: ValueKind) -> Self {
        let path = type_name::<T>();
        TypeToken {
            id: TypeId::of::<T>(),
            path,
            name: simple_name(path),
            kind,
            element: None,
            supers: &[],
            schema: None,
            default_fn: None,
        }
    }

    /// The token of any statically described type.
    pub fn of<T: StaticType>() -> Self {
        T::token()
    }

    /// Attaches the element type produced when an indexed read drills into
    /// a value of this type.
    pub fn with_element(mut self, element: fn() -> TypeToken) -> Self {
        self.element = Some(element);
        self
    }

    /// Attaches the widening chain used by [`TypeToken::is_assignable_to`].
    pub fn with_supers(mut self, supers: &'static [fn() -> TypeToken]) -> Self {
        self.supers = supers;
        self
    }

    /// Attaches the accessor schema this type descriptor is built from.
    pub fn with_schema(mut self, schema: fn() -> TypeSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Attaches a default constructor, making the type instantiable by
    /// object factories.
    pub fn with_default(mut self, default_fn: fn() -> Box<dyn PropValue>) -> Self {
        self.default_fn = Some(default_fn);
        self
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The full type path, e.g. `my_crate::order::Order`.
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// The short display name, e.g. `Order`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The element type of a container token, if declared.
    pub fn element(&self) -> Option<TypeToken> {
        self.element.map(|f| f())
    }

    pub fn schema(&self) -> Option<TypeSchema> {
        self.schema.map(|f| f())
    }

    pub fn default_fn(&self) -> Option<fn() -> Box<dyn PropValue>> {
        self.default_fn
    }

    /// Whether this token describes the concrete type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Whether a value of this type may stand where `other` is declared.
    ///
    /// Identity always qualifies; beyond that the token's declared widening
    /// chain is walked transitively. Chains are expected to be shallow.
    pub fn is_assignable_to(&self, other: &TypeToken) -> bool {
        if self.id == other.id {
            return true;
        }
        self.supers
            .iter()
            .any(|wider| wider().is_assignable_to(other))
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeToken")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

/// A type whose [`TypeToken`] can be produced without an instance.
pub trait StaticType: PropValue + Sized {
    fn token() -> TypeToken;
}

// The short name is the final path segment of the part before any generic
// bracket, with the generic tail kept.
fn simple_name(path: &'static str) -> &'static str {
    let head = match path.find('<') {
        Some(open) => &path[..open],
        None => path,
    };
    match head.rfind("::") {
        Some(sep) => &path[sep + 2..],
        None => path,
    }
}

// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_compare_by_type_identity() {
        let a = TypeToken::of_type::<i64>(ValueKind::Scalar);
        let b = TypeToken::of_type::<i64>(ValueKind::Scalar);
        let c = TypeToken::of_type::<u64>(ValueKind::Scalar);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is::<i64>());
        assert!(!a.is::<u64>());
    }

    #[test]
    fn simple_name_strips_modules_but_keeps_generics() {
        assert_eq!(simple_name("alloc::string::String"), "String");
        assert_eq!(simple_name("i32"), "i32");
        assert_eq!(
            simple_name("alloc::vec::Vec<alloc::string::String>"),
            "Vec<alloc::string::String>",
        );
    }

    struct Narrow;
    struct Wide;
    struct Widest;

    fn wide_token() -> TypeToken {
        static CHAIN: [fn() -> TypeToken; 1] = [widest_token];
        TypeToken::of_type::<Wide>(ValueKind::Scalar).with_supers(&CHAIN)
    }

    fn widest_token() -> TypeToken {
        TypeToken::of_type::<Widest>(ValueKind::Scalar)
    }

    fn narrow_token() -> TypeToken {
        static CHAIN: [fn() -> TypeToken; 1] = [wide_token];
        TypeToken::of_type::<Narrow>(ValueKind::Scalar).with_supers(&CHAIN)
    }

    #[test]
    fn assignability_walks_the_widening_chain() {
        let narrow = narrow_token();
        let wide = wide_token();
        let widest = widest_token();
        assert!(narrow.is_assignable_to(&narrow));
        assert!(narrow.is_assignable_to(&wide));
        assert!(narrow.is_assignable_to(&widest));
        assert!(wide.is_assignable_to(&widest));
        assert!(!wide.is_assignable_to(&narrow));
        assert!(!widest.is_assignable_to(&narrow));
    }
}
