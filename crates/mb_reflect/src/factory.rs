//! Instance creation for path writes that must materialize missing links.

use crate::error::ReflectError;
use crate::impls::{PropMap, Unknown};
use crate::token::{StaticType, TypeToken, ValueKind};
use crate::value::PropValue;

/// Creates instances of reflected types on demand.
///
/// Custom implementations can substitute concrete types for abstract slots
/// or construct types that lack a default constructor.
pub trait ObjectFactory: Send + Sync {
    /// Builds a default instance of `ty`, after concretization.
    fn create(&self, ty: TypeToken) -> Result<Box<dyn PropValue>, ReflectError>;

    /// Builds an instance of `ty` from explicit constructor arguments.
    ///
    /// Rust exposes no runtime-enumerable constructors, so only factories
    /// with out-of-band knowledge of the target type can honor a non-empty
    /// argument list.
    fn create_with(
        &self,
        ty: TypeToken,
        args: Vec<Box<dyn PropValue>>,
    ) -> Result<Box<dyn PropValue>, ReflectError>;

    /// Maps an abstract or placeholder type to the concrete type that gets
    /// instantiated in its place.
    fn resolve_concrete(&self, ty: TypeToken) -> TypeToken;

    /// Whether values of `ty` collect appended elements.
    fn is_sequence(&self, ty: TypeToken) -> bool;
}

/// The standard factory: unknown slots become [`PropMap`]s, everything else
/// is built from the default constructor declared on its token.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultObjectFactory;

impl ObjectFactory for DefaultObjectFactory {
    fn create(&self, ty: TypeToken) -> Result<Box<dyn PropValue>, ReflectError> {
        let concrete = self.resolve_concrete(ty);
        match concrete.default_fn() {
            Some(default_fn) => Ok(default_fn()),
            None => Err(ReflectError::Instantiation {
                type_path: concrete.path(),
                detail: "the type declares no default constructor".to_string(),
            }),
        }
    }

    fn create_with(
        &self,
        ty: TypeToken,
        args: Vec<Box<dyn PropValue>>,
    ) -> Result<Box<dyn PropValue>, ReflectError> {
        if args.is_empty() {
            return self.create(ty);
        }
        let concrete = self.resolve_concrete(ty);
        Err(ReflectError::Instantiation {
            type_path: concrete.path(),
            detail: format!(
                "no constructor takes {} argument(s); the default factory only \
                 builds default instances",
                args.len(),
            ),
        })
    }

    fn resolve_concrete(&self, ty: TypeToken) -> TypeToken {
        if ty.is::<Unknown>() {
            PropMap::token()
        } else {
            ty
        }
    }

    fn is_sequence(&self, ty: TypeToken) -> bool {
        ty.kind() == ValueKind::Seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_slots_become_prop_maps() {
        let factory = DefaultObjectFactory;
        let created = factory.create(Unknown::token()).unwrap();
        assert!(created.is::<PropMap>());
    }

    #[test]
    fn default_constructor_backed_creation() {
        let factory = DefaultObjectFactory;
        let created = factory.create(<Vec<i64> as StaticType>::token()).unwrap();
        assert!(created.is::<Vec<i64>>());
    }

    #[test]
    fn missing_constructor_is_reported() {
        struct NoDefault;
        let factory = DefaultObjectFactory;
        let token = TypeToken::of_type::<NoDefault>(ValueKind::Record);
        assert!(matches!(
            factory.create(token),
            Err(ReflectError::Instantiation { .. }),
        ));
    }

    #[test]
    fn argument_lists_are_refused() {
        let factory = DefaultObjectFactory;
        let args: Vec<Box<dyn PropValue>> = vec![Box::new(7_i64)];
        assert!(matches!(
            factory.create_with(<Vec<i64> as StaticType>::token(), args),
            Err(ReflectError::Instantiation { .. }),
        ));
        let created = factory
            .create_with(<Vec<i64> as StaticType>::token(), Vec::new())
            .unwrap();
        assert!(created.is::<Vec<i64>>());
    }

    #[test]
    fn sequence_detection_goes_by_kind() {
        let factory = DefaultObjectFactory;
        assert!(factory.is_sequence(<Vec<i64> as StaticType>::token()));
        assert!(!factory.is_sequence(<i64 as StaticType>::token()));
    }
}
