//! The wrapper over string-keyed maps: every key is a property.

use crate::error::ReflectError;
use crate::factory::ObjectFactory;
use crate::impls::Unknown;
use crate::path::PathSegment;
use crate::token::{StaticType, TypeToken};
use crate::value::{Assoc, PropValue, flatten, flatten_mut};
use crate::wrap::{Env, ObjectWrapper, Wrapped, index_clear, index_get, index_get_mut, index_set, wrap};

/// Adapts a string-keyed map to the wrapper interface. Reads of absent keys
/// yield `None`, and every key is writable.
pub struct AssocWrapper<'a> {
    value: &'a mut dyn Assoc,
    env: Env<'a>,
}

impl<'a> AssocWrapper<'a> {
    pub fn new(value: &'a mut dyn Assoc, env: Env<'a>) -> Self {
        AssocWrapper { value, env }
    }

    // The declared type of entry values; `Unknown` for heterogeneous maps.
    fn element_type(&self) -> TypeToken {
        self.value
            .type_token()
            .element()
            .unwrap_or_else(Unknown::token)
    }

    fn read(&self, seg: &PathSegment<'_>) -> Result<Option<&dyn PropValue>, ReflectError> {
        if let Some(index) = seg.index() {
            let container: &dyn PropValue = if seg.name().is_empty() {
                &*self.value
            } else {
                flatten(self.value.entry(seg.name()).ok_or_else(|| {
                    ReflectError::NullValue {
                        property: seg.name().to_string(),
                    }
                })?)
                .ok_or_else(|| ReflectError::NullValue {
                    property: seg.name().to_string(),
                })?
            };
            index_get(container, seg.name(), index)
        } else {
            Ok(self.value.entry(seg.name()).and_then(flatten))
        }
    }

    fn read_mut<'v>(
        map: &'v mut dyn Assoc,
        seg: &PathSegment<'_>,
    ) -> Result<Option<&'v mut dyn PropValue>, ReflectError> {
        if let Some(index) = seg.index() {
            let container: &'v mut dyn PropValue = if seg.name().is_empty() {
                map
            } else {
                map.entry_mut(seg.name())
                    .and_then(flatten_mut)
                    .ok_or_else(|| ReflectError::NullValue {
                        property: seg.name().to_string(),
                    })?
            };
            index_get_mut(container, seg.name(), index)
        } else {
            Ok(map.entry_mut(seg.name()).and_then(flatten_mut))
        }
    }

    fn live_child(&mut self, seg: &PathSegment<'_>) -> Option<Wrapped<'_>> {
        let child = Self::read_mut(&mut *self.value, seg).ok()??;
        wrap(child, self.env).ok()
    }
}

impl<'a> ObjectWrapper<'a> for AssocWrapper<'a> {
    fn get(&mut self, seg: &PathSegment<'_>) -> Result<Option<&dyn PropValue>, ReflectError> {
        self.read(seg)
    }

    fn get_into(
        self: Box<Self>,
        seg: &PathSegment<'_>,
    ) -> Result<Option<&'a mut dyn PropValue>, ReflectError> {
        let AssocWrapper { value, .. } = *self;
        Self::read_mut(value, seg)
    }

    fn set(
        &mut self,
        seg: &PathSegment<'_>,
        value: Box<dyn PropValue>,
    ) -> Result<(), ReflectError> {
        if let Some(index) = seg.index() {
            let container: &mut dyn PropValue = if seg.name().is_empty() {
                &mut *self.value
            } else {
                self.value
                    .entry_mut(seg.name())
                    .and_then(flatten_mut)
                    .ok_or_else(|| ReflectError::NullValue {
                        property: seg.name().to_string(),
                    })?
            };
            return index_set(container, seg.name(), index, value);
        }
        self.value.insert_entry(seg.name(), value)?;
        Ok(())
    }

    fn clear(&mut self, seg: &PathSegment<'_>) -> Result<(), ReflectError> {
        if let Some(index) = seg.index() {
            let container: &mut dyn PropValue = if seg.name().is_empty() {
                &mut *self.value
            } else {
                match self.value.entry_mut(seg.name()).and_then(flatten_mut) {
                    Some(container) => container,
                    // Clearing under a null link is a no-op.
                    None => return Ok(()),
                }
            };
            return index_clear(container, seg.name(), index);
        }
        self.value.remove_entry(seg.name());
        Ok(())
    }

    /// Maps canonicalize nothing: any key is a valid property of itself.
    fn find_property(&self, name: &str, _strip_separators: bool) -> Option<String> {
        Some(name.to_string())
    }

    fn getter_names(&self) -> Vec<String> {
        self.value.keys()
    }

    fn setter_names(&self) -> Vec<String> {
        self.value.keys()
    }

    fn getter_type(&mut self, path: &str) -> Result<TypeToken, ReflectError> {
        let seg = PathSegment::parse(path);
        if let Some(rest) = seg.children() {
            return match self.live_child(&seg) {
                Some(Wrapped::Live(mut child)) => child.getter_type(rest),
                // A null link reads as an untyped slot.
                _ => Ok(Unknown::token()),
            };
        }
        match self.read(&seg)? {
            Some(value) => Ok(value.type_token()),
            None => Ok(self.element_type()),
        }
    }

    fn setter_type(&mut self, path: &str) -> Result<TypeToken, ReflectError> {
        let seg = PathSegment::parse(path);
        if let Some(rest) = seg.children() {
            return match self.live_child(&seg) {
                Some(Wrapped::Live(mut child)) => child.setter_type(rest),
                _ => Ok(Unknown::token()),
            };
        }
        Ok(self.element_type())
    }

    fn has_getter(&mut self, path: &str) -> bool {
        let seg = PathSegment::parse(path);
        let Some(rest) = seg.children() else {
            return seg.name().is_empty() || self.value.contains_key(seg.name());
        };
        if !self.value.contains_key(seg.name()) {
            return false;
        }
        match self.live_child(&seg) {
            Some(Wrapped::Live(mut child)) => child.has_getter(rest),
            // A present key holding null still counts as readable.
            _ => true,
        }
    }

    fn has_setter(&mut self, _path: &str) -> bool {
        true
    }

    fn instantiate_child(
        self: Box<Self>,
        seg: &PathSegment<'_>,
        factory: &dyn ObjectFactory,
    ) -> Result<&'a mut dyn PropValue, ReflectError> {
        let declared = self
            .value
            .type_token()
            .element()
            .unwrap_or_else(Unknown::token);
        let concrete = factory.resolve_concrete(declared);
        let created = factory.create(concrete)?;
        let AssocWrapper { value, .. } = *self;
        if let Some(index) = seg.index() {
            let container: &'a mut dyn PropValue = if seg.name().is_empty() {
                value
            } else {
                value
                    .entry_mut(seg.name())
                    .and_then(flatten_mut)
                    .ok_or_else(|| ReflectError::NullValue {
                        property: seg.name().to_string(),
                    })?
            };
            index_set(&mut *container, seg.name(), index, created)?;
            index_get_mut(container, seg.name(), index)?.ok_or_else(|| {
                ReflectError::Instantiation {
                    type_path: concrete.path(),
                    detail: "freshly stored entry reads back null".to_string(),
                }
            })
        } else {
            value.insert_entry(seg.name(), created)?;
            value
                .entry_mut(seg.name())
                .and_then(flatten_mut)
                .ok_or_else(|| ReflectError::Instantiation {
                    type_path: concrete.path(),
                    detail: "freshly stored entry reads back null".to_string(),
                })
        }
    }

    fn append(&mut self, element: Box<dyn PropValue>) -> Result<(), ReflectError> {
        let _ = element;
        Err(ReflectError::Unsupported {
            operation: "append",
            type_path: self.value.type_token().path(),
        })
    }

    fn append_all(&mut self, elements: Vec<Box<dyn PropValue>>) -> Result<(), ReflectError> {
        let _ = elements;
        Err(ReflectError::Unsupported {
            operation: "append_all",
            type_path: self.value.type_token().path(),
        })
    }
}
