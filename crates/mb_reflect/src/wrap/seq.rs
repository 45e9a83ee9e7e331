//! The wrapper over sequences: append-only, with no addressable
//! properties.

use crate::error::ReflectError;
use crate::factory::ObjectFactory;
use crate::path::PathSegment;
use crate::token::TypeToken;
use crate::value::{PropValue, Seq};
use crate::wrap::ObjectWrapper;

/// Adapts a sequence to the wrapper interface. Sequences collect appended
/// elements; every property-style operation is refused. Indexed access
/// into a sequence happens through the wrapper of the record or map
/// holding it, not here.
pub struct SeqWrapper<'a> {
    value: &'a mut dyn Seq,
}

impl<'a> SeqWrapper<'a> {
    pub fn new(value: &'a mut dyn Seq) -> Self {
        SeqWrapper { value }
    }

    fn unsupported(&self, operation: &'static str) -> ReflectError {
        ReflectError::Unsupported {
            operation,
            type_path: self.value.type_token().path(),
        }
    }
}

impl<'a> ObjectWrapper<'a> for SeqWrapper<'a> {
    fn get(&mut self, _seg: &PathSegment<'_>) -> Result<Option<&dyn PropValue>, ReflectError> {
        Err(self.unsupported("get"))
    }

    fn get_into(
        self: Box<Self>,
        _seg: &PathSegment<'_>,
    ) -> Result<Option<&'a mut dyn PropValue>, ReflectError> {
        Err(ReflectError::Unsupported {
            operation: "get",
            type_path: self.value.type_token().path(),
        })
    }

    fn set(
        &mut self,
        _seg: &PathSegment<'_>,
        _value: Box<dyn PropValue>,
    ) -> Result<(), ReflectError> {
        Err(self.unsupported("set"))
    }

    fn clear(&mut self, _seg: &PathSegment<'_>) -> Result<(), ReflectError> {
        Err(self.unsupported("clear"))
    }

    fn find_property(&self, _name: &str, _strip_separators: bool) -> Option<String> {
        None
    }

    fn getter_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn setter_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn getter_type(&mut self, _path: &str) -> Result<TypeToken, ReflectError> {
        Err(self.unsupported("getter_type"))
    }

    fn setter_type(&mut self, _path: &str) -> Result<TypeToken, ReflectError> {
        Err(self.unsupported("setter_type"))
    }

    fn has_getter(&mut self, _path: &str) -> bool {
        false
    }

    fn has_setter(&mut self, _path: &str) -> bool {
        false
    }

    fn instantiate_child(
        self: Box<Self>,
        _seg: &PathSegment<'_>,
        _factory: &dyn ObjectFactory,
    ) -> Result<&'a mut dyn PropValue, ReflectError> {
        Err(ReflectError::Unsupported {
            operation: "instantiate_child",
            type_path: self.value.type_token().path(),
        })
    }

    fn is_sequence(&self) -> bool {
        true
    }

    fn append(&mut self, element: Box<dyn PropValue>) -> Result<(), ReflectError> {
        self.value.append(element)
    }

    fn append_all(&mut self, elements: Vec<Box<dyn PropValue>>) -> Result<(), ReflectError> {
        for element in elements {
            self.value.append(element)?;
        }
        Ok(())
    }
}
