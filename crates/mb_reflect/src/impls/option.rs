//! Optional slots. An absent `Option` is how a null property reads, and
//! filling one is how a write materializes a missing link.

use std::any::Any;
use std::fmt;

use crate::error::ReflectError;
use crate::token::{StaticType, TypeToken, ValueKind};
use crate::value::{OptValue, PropValue, Shape, ShapeMut};

impl<T: PropValue + StaticType> PropValue for Option<T> {
    fn type_token(&self) -> TypeToken {
        <Self as StaticType>::token()
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::Opt
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Opt(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Opt(self)
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
        match self {
            None => Some(Box::new(None::<T>)),
            Some(value) => {
                let cloned = value.try_clone()?.take::<T>().ok()?;
                Some(Box::new(Some(cloned)))
            }
        }
    }

    fn debug_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            None => f.write_str("None"),
            Some(value) => {
                f.write_str("Some(")?;
                value.debug_fmt(f)?;
                f.write_str(")")
            }
        }
    }
}

impl<T: PropValue + StaticType> StaticType for Option<T> {
    fn token() -> TypeToken {
        TypeToken::of_type::<Self>(ValueKind::Opt)
            .with_element(T::token)
            .with_default(|| Box::new(None::<T>))
    }
}

impl<T: PropValue + StaticType> OptValue for Option<T> {
    fn inner(&self) -> Option<&dyn PropValue> {
        self.as_ref().map(|v| v as &dyn PropValue)
    }

    fn inner_mut(&mut self) -> Option<&mut dyn PropValue> {
        self.as_mut().map(|v| v as &mut dyn PropValue)
    }

    fn fill(&mut self, value: Box<dyn PropValue>) -> Result<(), ReflectError> {
        let value = value
            .take::<T>()
            .map_err(|v| ReflectError::value_type::<T>(&*v))?;
        *self = Some(value);
        Ok(())
    }

    fn clear(&mut self) {
        *self = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_and_clear() {
        let mut slot: Option<i64> = None;
        assert!(slot.inner().is_none());

        slot.fill(Box::new(5i64)).unwrap();
        assert_eq!(slot, Some(5));
        assert!(slot.inner().is_some());

        let err = slot.fill(Box::new("x".to_string())).unwrap_err();
        assert!(matches!(err, ReflectError::ValueType { .. }));
        assert_eq!(slot, Some(5));

        OptValue::clear(&mut slot);
        assert_eq!(slot, None);
    }

    #[test]
    fn option_token_declares_its_element() {
        let token = <Option<String> as StaticType>::token();
        assert_eq!(token.kind(), ValueKind::Opt);
        assert!(token.element().unwrap().is::<String>());
        // A fresh option is always constructible, and starts empty.
        let fresh = token.default_fn().unwrap()();
        assert_eq!(fresh.take::<Option<String>>().ok(), Some(None));
    }

    #[test]
    fn debug_renders_the_inner_value() {
        let slot: Option<i64> = Some(3);
        assert_eq!(format!("{:?}", &slot as &dyn PropValue), "Some(3)");
    }
}
