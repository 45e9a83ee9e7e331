//! The wrapper over records (and over scalars, which simply expose no
//! properties).

use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::error::ReflectError;
use crate::factory::ObjectFactory;
use crate::meta::MetaType;
use crate::path::PathSegment;
use crate::token::{TypeToken, ValueKind};
use crate::value::{PropValue, ShapeMut, flatten, flatten_mut};
use crate::wrap::{
    Env, ObjectWrapper, Wrapped, index_clear, index_get, index_get_mut, index_set, wrap,
};

/// Adapts one record value to the wrapper interface through its type
/// descriptor.
pub struct RecordWrapper<'a> {
    value: &'a mut dyn PropValue,
    descriptor: Arc<TypeDescriptor>,
    env: Env<'a>,
}

impl<'a> RecordWrapper<'a> {
    pub fn new(value: &'a mut dyn PropValue, env: Env<'a>) -> Self {
        let descriptor = env.cache.describe(value.type_token());
        RecordWrapper {
            value,
            descriptor,
            env,
        }
    }

    fn static_meta(&self) -> MetaType<'a> {
        MetaType::of(self.descriptor.token(), self.env.cache)
    }

    // Shared-borrow read of one segment, through the resolved read
    // accessors.
    fn read(&self, seg: &PathSegment<'_>) -> Result<Option<&dyn PropValue>, ReflectError> {
        if let Some(index) = seg.index() {
            let container = self.container(seg)?;
            index_get(container, seg.name(), index)
        } else {
            let accessor = self.descriptor.getter(seg.name())?;
            Ok(flatten(accessor.invoke(&*self.value)?))
        }
    }

    // The container an indexed segment drills into: the named property, or
    // the wrapped value itself when the name is empty.
    fn container(&self, seg: &PathSegment<'_>) -> Result<&dyn PropValue, ReflectError> {
        if seg.name().is_empty() {
            return Ok(&*self.value);
        }
        let accessor = self.descriptor.getter(seg.name())?;
        flatten(accessor.invoke(&*self.value)?).ok_or_else(|| ReflectError::NullValue {
            property: seg.name().to_string(),
        })
    }

    fn container_mut<'v>(
        value: &'v mut dyn PropValue,
        descriptor: &TypeDescriptor,
        seg: &PathSegment<'_>,
    ) -> Result<&'v mut dyn PropValue, ReflectError> {
        if seg.name().is_empty() {
            return Ok(value);
        }
        let accessor = descriptor.getter(seg.name())?;
        flatten_mut(accessor.invoke_mut(value, seg.name())?).ok_or_else(|| {
            ReflectError::NullValue {
                property: seg.name().to_string(),
            }
        })
    }

    // Exclusive-borrow counterpart of `read`, used to hand traversal into
    // child values. Needs the property's mutable projection.
    fn read_mut<'v>(
        value: &'v mut dyn PropValue,
        descriptor: &TypeDescriptor,
        seg: &PathSegment<'_>,
    ) -> Result<Option<&'v mut dyn PropValue>, ReflectError> {
        if let Some(index) = seg.index() {
            let container = Self::container_mut(value, descriptor, seg)?;
            index_get_mut(container, seg.name(), index)
        } else {
            let accessor = descriptor.getter(seg.name())?;
            Ok(flatten_mut(accessor.invoke_mut(value, seg.name())?))
        }
    }

    // Wraps the live child a path's first segment names, for recursive
    // type queries. `None` means the query must fall back to declared
    // types.
    fn live_child(&mut self, seg: &PathSegment<'_>) -> Option<Wrapped<'_>> {
        let child = Self::read_mut(&mut *self.value, &self.descriptor, seg).ok()??;
        wrap(child, self.env).ok()
    }
}

impl<'a> ObjectWrapper<'a> for RecordWrapper<'a> {
    fn get(&mut self, seg: &PathSegment<'_>) -> Result<Option<&dyn PropValue>, ReflectError> {
        self.read(seg)
    }

    fn get_into(
        self: Box<Self>,
        seg: &PathSegment<'_>,
    ) -> Result<Option<&'a mut dyn PropValue>, ReflectError> {
        let RecordWrapper {
            value, descriptor, ..
        } = *self;
        Self::read_mut(value, &descriptor, seg)
    }

    fn set(
        &mut self,
        seg: &PathSegment<'_>,
        value: Box<dyn PropValue>,
    ) -> Result<(), ReflectError> {
        if let Some(index) = seg.index() {
            let container = Self::container_mut(&mut *self.value, &self.descriptor, seg)?;
            return index_set(container, seg.name(), index, value);
        }
        let declared = self.descriptor.setter_type(seg.name())?;
        if declared.kind() == ValueKind::Opt && value.type_token() != declared {
            // An element value aimed at an optional slot fills the slot
            // instead of replacing it.
            let accessor = self.descriptor.getter(seg.name())?;
            let slot = accessor.invoke_mut(&mut *self.value, seg.name())?;
            if let ShapeMut::Opt(opt) = slot.shape_mut() {
                return opt.fill(value);
            }
        }
        self.descriptor.setter(seg.name())?.invoke(&mut *self.value, value)
    }

    fn clear(&mut self, seg: &PathSegment<'_>) -> Result<(), ReflectError> {
        if let Some(index) = seg.index() {
            let container = Self::container_mut(&mut *self.value, &self.descriptor, seg)?;
            return index_clear(container, seg.name(), index);
        }
        // The slot must be writable, and only optionals can hold nothing.
        self.descriptor.setter(seg.name())?;
        let accessor = self.descriptor.getter(seg.name())?;
        let slot = accessor.invoke_mut(&mut *self.value, seg.name())?;
        let type_path = slot.type_token().path();
        match slot.shape_mut() {
            ShapeMut::Opt(opt) => {
                opt.clear();
                Ok(())
            }
            _ => Err(ReflectError::Unsupported {
                operation: "clear a non-optional property",
                type_path,
            }),
        }
    }

    fn find_property(&self, name: &str, strip_separators: bool) -> Option<String> {
        self.static_meta().find_property(name, strip_separators)
    }

    fn getter_names(&self) -> Vec<String> {
        self.descriptor.getter_names().to_vec()
    }

    fn setter_names(&self) -> Vec<String> {
        self.descriptor.setter_names().to_vec()
    }

    fn getter_type(&mut self, path: &str) -> Result<TypeToken, ReflectError> {
        let seg = PathSegment::parse(path);
        let Some(rest) = seg.children() else {
            return self.static_meta().getter_type(path);
        };
        if let Some(Wrapped::Live(mut child)) = self.live_child(&seg) {
            return child.getter_type(rest);
        }
        // Null or unreachable link: answer from declared types.
        self.static_meta().getter_type(path)
    }

    fn setter_type(&mut self, path: &str) -> Result<TypeToken, ReflectError> {
        let seg = PathSegment::parse(path);
        let Some(rest) = seg.children() else {
            return self.static_meta().setter_type(path);
        };
        if let Some(Wrapped::Live(mut child)) = self.live_child(&seg) {
            return child.setter_type(rest);
        }
        self.static_meta().setter_type(path)
    }

    fn has_getter(&mut self, path: &str) -> bool {
        let seg = PathSegment::parse(path);
        if !seg.has_next() {
            return self.static_meta().has_getter(path);
        }
        if !self.static_meta().has_getter(seg.indexed_name()) {
            return false;
        }
        if let Some(Wrapped::Live(mut child)) = self.live_child(&seg) {
            return child.has_getter(seg.children().unwrap_or(""));
        }
        self.static_meta().has_getter(path)
    }

    fn has_setter(&mut self, path: &str) -> bool {
        let seg = PathSegment::parse(path);
        if !seg.has_next() {
            return self.static_meta().has_setter(path);
        }
        if !self.static_meta().has_setter(seg.indexed_name()) {
            return false;
        }
        if let Some(Wrapped::Live(mut child)) = self.live_child(&seg) {
            return child.has_setter(seg.children().unwrap_or(""));
        }
        self.static_meta().has_setter(path)
    }

    fn instantiate_child(
        self: Box<Self>,
        seg: &PathSegment<'_>,
        factory: &dyn ObjectFactory,
    ) -> Result<&'a mut dyn PropValue, ReflectError> {
        let RecordWrapper {
            value, descriptor, ..
        } = *self;
        let declared = descriptor.setter_type(seg.name())?;
        let concrete = factory.resolve_concrete(declared);

        if concrete.kind() == ValueKind::Opt {
            // Fill the optional slot with a default-constructed element.
            let element = concrete.element().ok_or_else(|| ReflectError::Instantiation {
                type_path: concrete.path(),
                detail: "optional slot declares no element type".to_string(),
            })?;
            let created = factory.create(factory.resolve_concrete(element))?;
            let accessor = descriptor.getter(seg.name())?;
            let slot = accessor.invoke_mut(value, seg.name())?;
            let type_path = slot.type_token().path();
            match slot.shape_mut() {
                ShapeMut::Opt(opt) => {
                    opt.fill(created)?;
                    opt.inner_mut().ok_or_else(|| ReflectError::Instantiation {
                        type_path,
                        detail: "optional slot reads empty after fill".to_string(),
                    })
                }
                _ => Err(ReflectError::Instantiation {
                    type_path,
                    detail: "slot declared optional is not optional at runtime".to_string(),
                }),
            }
        } else if let Some(index) = seg.index() {
            // Materialize one cell of an existing container.
            let created = factory.create(concrete)?;
            let container = Self::container_mut(value, &descriptor, seg)?;
            index_set(&mut *container, seg.name(), index, created)?;
            index_get_mut(container, seg.name(), index)?.ok_or_else(|| {
                ReflectError::Instantiation {
                    type_path: concrete.path(),
                    detail: "freshly stored element reads back null".to_string(),
                }
            })
        } else {
            let created = factory.create(concrete)?;
            descriptor.setter(seg.name())?.invoke(&mut *value, created)?;
            Self::read_mut(value, &descriptor, seg)?.ok_or_else(|| {
                ReflectError::Instantiation {
                    type_path: concrete.path(),
                    detail: "freshly stored value reads back null".to_string(),
                }
            })
        }
    }

    fn append(&mut self, element: Box<dyn PropValue>) -> Result<(), ReflectError> {
        let _ = element;
        Err(ReflectError::Unsupported {
            operation: "append",
            type_path: self.descriptor.token().path(),
        })
    }

    fn append_all(&mut self, elements: Vec<Box<dyn PropValue>>) -> Result<(), ReflectError> {
        let _ = elements;
        Err(ReflectError::Unsupported {
            operation: "append_all",
            type_path: self.descriptor.token().path(),
        })
    }
}
