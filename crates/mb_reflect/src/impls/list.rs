//! Sequence values: `Vec<T>` and fixed-size arrays.

use std::any::Any;
use std::fmt;

use crate::error::ReflectError;
use crate::token::{StaticType, TypeToken, ValueKind};
use crate::value::{DebugValue, PropValue, Seq, Shape, ShapeMut};

impl<T: PropValue + StaticType> PropValue for Vec<T> {
    fn type_token(&self) -> TypeToken {
        <Self as StaticType>::token()
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::Seq
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Seq(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Seq(self)
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
        let mut out = Vec::with_capacity(self.len());
        for item in self {
            out.push(item.try_clone()?.take::<T>().ok()?);
        }
        Some(Box::new(out))
    }

    fn debug_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|v| DebugValue(v)))
            .finish()
    }
}

impl<T: PropValue + StaticType> StaticType for Vec<T> {
    fn token() -> TypeToken {
        TypeToken::of_type::<Self>(ValueKind::Seq)
            .with_element(T::token)
            .with_default(|| Box::new(Vec::<T>::new()))
    }
}

impl<T: PropValue + StaticType> Seq for Vec<T> {
    fn element(&self, index: usize) -> Option<&dyn PropValue> {
        self.get(index).map(|v| v as &dyn PropValue)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn PropValue> {
        self.get_mut(index).map(|v| v as &mut dyn PropValue)
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn set_element(
        &mut self,
        index: usize,
        value: Box<dyn PropValue>,
    ) -> Result<(), ReflectError> {
        let len = self.len();
        if index >= len {
            return Err(ReflectError::IndexOutOfBounds { index, len });
        }
        self[index] = value
            .take::<T>()
            .map_err(|v| ReflectError::value_type::<T>(&*v))?;
        Ok(())
    }

    fn append(&mut self, value: Box<dyn PropValue>) -> Result<(), ReflectError> {
        let element = value
            .take::<T>()
            .map_err(|v| ReflectError::value_type::<T>(&*v))?;
        self.push(element);
        Ok(())
    }
}

impl<T: PropValue + StaticType, const N: usize> PropValue for [T; N] {
    fn type_token(&self) -> TypeToken {
        <Self as StaticType>::token()
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::Seq
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Seq(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Seq(self)
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
        let mut out = Vec::with_capacity(N);
        for item in self {
            out.push(item.try_clone()?.take::<T>().ok()?);
        }
        let arr: [T; N] = out.try_into().ok()?;
        Some(Box::new(arr))
    }

    fn debug_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|v| DebugValue(v)))
            .finish()
    }
}

impl<T: PropValue + StaticType, const N: usize> StaticType for [T; N] {
    fn token() -> TypeToken {
        // No default constructor: a missing array link cannot be
        // materialized without element values.
        TypeToken::of_type::<Self>(ValueKind::Seq).with_element(T::token)
    }
}

impl<T: PropValue + StaticType, const N: usize> Seq for [T; N] {
    fn element(&self, index: usize) -> Option<&dyn PropValue> {
        self.get(index).map(|v| v as &dyn PropValue)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn PropValue> {
        self.get_mut(index).map(|v| v as &mut dyn PropValue)
    }

    fn len(&self) -> usize {
        N
    }

    fn set_element(
        &mut self,
        index: usize,
        value: Box<dyn PropValue>,
    ) -> Result<(), ReflectError> {
        if index >= N {
            return Err(ReflectError::IndexOutOfBounds { index, len: N });
        }
        self[index] = value
            .take::<T>()
            .map_err(|v| ReflectError::value_type::<T>(&*v))?;
        Ok(())
    }

    fn append(&mut self, _value: Box<dyn PropValue>) -> Result<(), ReflectError> {
        Err(ReflectError::Unsupported {
            operation: "append",
            type_path: std::any::type_name::<Self>(),
        })
    }
}
