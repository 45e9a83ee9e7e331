//! Accessor schemas: the raw material type descriptors are built from.
//!
//! A [`TypeSchema`] lists every accessor candidate a type declares, before
//! any conflict resolution. Method-style getters and setters may overlap and
//! disagree on types; field slots back them up. The descriptor builder in
//! [`crate::descriptor`] turns this table into one resolved accessor per
//! property.

use crate::error::ReflectError;
use crate::token::TypeToken;
use crate::value::PropValue;

// -----------------------------------------------------------------------------
// Invoker signatures

/// Projects a property out of a base value.
pub type ReadFn = for<'a> fn(&'a dyn PropValue) -> Result<&'a dyn PropValue, ReflectError>;

/// Exclusive counterpart of [`ReadFn`], used to traverse into a property
/// during writes.
pub type ReadMutFn =
    for<'a> fn(&'a mut dyn PropValue) -> Result<&'a mut dyn PropValue, ReflectError>;

/// Stores a value into a property of a base value.
pub type WriteFn = fn(&mut dyn PropValue, Box<dyn PropValue>) -> Result<(), ReflectError>;

// -----------------------------------------------------------------------------
// Candidates

/// A method-style getter candidate, named `get_x` or `is_x`.
#[derive(Clone, Copy)]
pub struct GetterCandidate {
    pub method: &'static str,
    pub value_type: TypeToken,
    pub read: ReadFn,
    /// Mutable projection, when the type offers an `x_mut` style accessor.
    pub read_mut: Option<ReadMutFn>,
}

/// A method-style setter candidate, named `set_x`.
#[derive(Clone, Copy)]
pub struct SetterCandidate {
    pub method: &'static str,
    pub value_type: TypeToken,
    pub write: WriteFn,
}

/// A plain field slot. Fields only back properties no method pair claims.
#[derive(Clone, Copy)]
pub struct FieldSlot {
    pub name: &'static str,
    pub value_type: TypeToken,
    pub read: ReadFn,
    pub read_mut: Option<ReadMutFn>,
    /// `None` marks a read-only field; it never becomes writable.
    pub write: Option<WriteFn>,
}

// -----------------------------------------------------------------------------
// Schema

/// The unresolved accessor table of one type.
pub struct TypeSchema {
    token: TypeToken,
    getters: Vec<GetterCandidate>,
    setters: Vec<SetterCandidate>,
    fields: Vec<FieldSlot>,
    default_fn: Option<fn() -> Box<dyn PropValue>>,
}

impl TypeSchema {
    pub fn builder(token: TypeToken) -> SchemaBuilder {
        SchemaBuilder {
            schema: TypeSchema {
                token,
                getters: Vec::new(),
                setters: Vec::new(),
                fields: Vec::new(),
                default_fn: None,
            },
        }
    }

    pub fn token(&self) -> TypeToken {
        self.token
    }

    pub fn getters(&self) -> &[GetterCandidate] {
        &self.getters
    }

    pub fn setters(&self) -> &[SetterCandidate] {
        &self.setters
    }

    pub fn fields(&self) -> &[FieldSlot] {
        &self.fields
    }

    pub fn default_fn(&self) -> Option<fn() -> Box<dyn PropValue>> {
        self.default_fn
    }
}

/// Builds a [`TypeSchema`] candidate by candidate.
pub struct SchemaBuilder {
    schema: TypeSchema,
}

impl SchemaBuilder {
    pub fn getter(mut self, method: &'static str, value_type: TypeToken, read: ReadFn) -> Self {
        self.schema.getters.push(GetterCandidate {
            method,
            value_type,
            read,
            read_mut: None,
        });
        self
    }

    /// A getter candidate that also offers a mutable projection.
    pub fn getter_mut(
        mut self,
        method: &'static str,
        value_type: TypeToken,
        read: ReadFn,
        read_mut: ReadMutFn,
    ) -> Self {
        self.schema.getters.push(GetterCandidate {
            method,
            value_type,
            read,
            read_mut: Some(read_mut),
        });
        self
    }

    pub fn setter(mut self, method: &'static str, value_type: TypeToken, write: WriteFn) -> Self {
        self.schema.setters.push(SetterCandidate {
            method,
            value_type,
            write,
        });
        self
    }

    pub fn field(
        mut self,
        name: &'static str,
        value_type: TypeToken,
        read: ReadFn,
        read_mut: Option<ReadMutFn>,
        write: Option<WriteFn>,
    ) -> Self {
        self.schema.fields.push(FieldSlot {
            name,
            value_type,
            read,
            read_mut,
            write,
        });
        self
    }

    pub fn default_fn(mut self, default_fn: fn() -> Box<dyn PropValue>) -> Self {
        self.schema.default_fn = Some(default_fn);
        self
    }

    /// Merges an ancestor schema in. Candidates already present, matched by
    /// accessor name and value type, keep their existing entry so the most
    /// derived declaration wins.
    pub fn extend(mut self, ancestor: TypeSchema) -> Self {
        for cand in ancestor.getters {
            let seen = self
                .schema
                .getters
                .iter()
                .any(|g| g.method == cand.method && g.value_type == cand.value_type);
            if !seen {
                self.schema.getters.push(cand);
            }
        }
        for cand in ancestor.setters {
            let seen = self
                .schema
                .setters
                .iter()
                .any(|s| s.method == cand.method && s.value_type == cand.value_type);
            if !seen {
                self.schema.setters.push(cand);
            }
        }
        for slot in ancestor.fields {
            let seen = self.schema.fields.iter().any(|f| f.name == slot.name);
            if !seen {
                self.schema.fields.push(slot);
            }
        }
        if self.schema.default_fn.is_none() {
            self.schema.default_fn = ancestor.default_fn;
        }
        self
    }

    pub fn build(self) -> TypeSchema {
        self.schema
    }
}

/// A type whose accessor schema can be produced without an instance.
///
/// Implemented by the derive macro; the schema hook on the type's token
/// points back at [`Described::schema`].
pub trait Described: PropValue {
    fn schema() -> TypeSchema;
}

// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ValueKind;

    struct Base;
    struct Derived;

    fn read_self(value: &dyn PropValue) -> Result<&dyn PropValue, ReflectError> {
        Ok(value)
    }

    fn base_schema() -> TypeSchema {
        TypeSchema::builder(TypeToken::of_type::<Base>(ValueKind::Record))
            .getter("get_id", TypeToken::of_type::<i64>(ValueKind::Scalar), read_self)
            .getter("get_label", TypeToken::of_type::<String>(ValueKind::Scalar), read_self)
            .field(
                "tag",
                TypeToken::of_type::<String>(ValueKind::Scalar),
                read_self,
                None,
                None,
            )
            .build()
    }

    #[test]
    fn extend_keeps_the_derived_declaration() {
        let schema = TypeSchema::builder(TypeToken::of_type::<Derived>(ValueKind::Record))
            .getter("get_id", TypeToken::of_type::<i64>(ValueKind::Scalar), read_self)
            .extend(base_schema())
            .build();

        // get_id deduplicated by (method, type), get_label inherited.
        assert_eq!(schema.getters().len(), 2);
        assert_eq!(schema.fields().len(), 1);
    }

    #[test]
    fn extend_keeps_conflicting_types_as_separate_candidates() {
        let schema = TypeSchema::builder(TypeToken::of_type::<Derived>(ValueKind::Record))
            .getter("get_id", TypeToken::of_type::<u32>(ValueKind::Scalar), read_self)
            .extend(base_schema())
            .build();

        // Same method name with a different type stays in; conflict
        // resolution happens later, in the descriptor builder.
        let ids: Vec<_> = schema
            .getters()
            .iter()
            .filter(|g| g.method == "get_id")
            .collect();
        assert_eq!(ids.len(), 2);
    }
}
