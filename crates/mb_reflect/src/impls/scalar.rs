//! Scalar leaf values.

use std::any::Any;
use std::fmt;

use crate::token::{StaticType, TypeToken, ValueKind};
use crate::value::{PropValue, Shape, ShapeMut};

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl PropValue for $ty {
            fn type_token(&self) -> TypeToken {
                <$ty as StaticType>::token()
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
                Some(Box::new(self.clone()))
            }

            fn debug_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }

        impl StaticType for $ty {
            fn token() -> TypeToken {
                TypeToken::of_type::<$ty>(ValueKind::Scalar)
                    .with_default(|| Box::new(<$ty as Default>::default()))
            }
        }
    )*};
}

impl_scalar!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, String,
    &'static str,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_tokens_carry_defaults() {
        let token = <i64 as StaticType>::token();
        assert_eq!(token.kind(), ValueKind::Scalar);
        let built = token.default_fn().map(|f| f());
        assert_eq!(built.and_then(|b| b.take::<i64>().ok()), Some(0));
    }

    #[test]
    fn strings_reflect_as_scalars() {
        let s = "hello".to_string();
        assert_eq!(s.value_kind(), ValueKind::Scalar);
        assert!(matches!(s.shape(), Shape::Scalar(_)));
        assert_eq!(format!("{:?}", &s as &dyn PropValue), "\"hello\"");
    }
}
