//! String-keyed map values with a statically typed value slot.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::ReflectError;
use crate::token::{StaticType, TypeToken, ValueKind};
use crate::value::{Assoc, DebugValue, PropValue, Shape, ShapeMut};

macro_rules! impl_string_map {
    ($map:ident) => {
        impl<V: PropValue + StaticType> PropValue for $map<String, V> {
            fn type_token(&self) -> TypeToken {
                <Self as StaticType>::token()
            }

            fn value_kind(&self) -> ValueKind {
                ValueKind::Assoc
            }

            fn shape(&self) -> Shape<'_> {
                Shape::Assoc(self)
            }

            fn shape_mut(&mut self) -> ShapeMut<'_> {
                ShapeMut::Assoc(self)
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
                let mut out = $map::new();
                for (key, value) in self {
                    out.insert(key.clone(), value.try_clone()?.take::<V>().ok()?);
                }
                Some(Box::new(out))
            }

            fn debug_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_map()
                    .entries(self.iter().map(|(k, v)| (k, DebugValue(v))))
                    .finish()
            }
        }

        impl<V: PropValue + StaticType> StaticType for $map<String, V> {
            fn token() -> TypeToken {
                TypeToken::of_type::<Self>(ValueKind::Assoc)
                    .with_element(V::token)
                    .with_default(|| Box::new($map::<String, V>::new()))
            }
        }

        impl<V: PropValue + StaticType> Assoc for $map<String, V> {
            fn entry(&self, key: &str) -> Option<&dyn PropValue> {
                self.get(key).map(|v| v as &dyn PropValue)
            }

            fn entry_mut(&mut self, key: &str) -> Option<&mut dyn PropValue> {
                self.get_mut(key).map(|v| v as &mut dyn PropValue)
            }

            fn contains_key(&self, key: &str) -> bool {
                $map::contains_key(self, key)
            }

            fn insert_entry(
                &mut self,
                key: &str,
                value: Box<dyn PropValue>,
            ) -> Result<Option<Box<dyn PropValue>>, ReflectError> {
                let value = value
                    .take::<V>()
                    .map_err(|v| ReflectError::value_type::<V>(&*v))?;
                Ok(self
                    .insert(key.to_string(), value)
                    .map(|old| Box::new(old) as Box<dyn PropValue>))
            }

            fn remove_entry(&mut self, key: &str) -> Option<Box<dyn PropValue>> {
                self.remove(key).map(|v| Box::new(v) as Box<dyn PropValue>)
            }

            fn keys(&self) -> Vec<String> {
                $map::keys(self).cloned().collect()
            }

            fn len(&self) -> usize {
                $map::len(self)
            }
        }
    };
}

impl_string_map!(HashMap);
impl_string_map!(BTreeMap);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_map_entries() {
        let mut m: HashMap<String, i64> = HashMap::new();
        m.insert_entry("a", Box::new(5i64)).unwrap();
        assert!(Assoc::contains_key(&m, "a"));
        assert_eq!(m.entry("a").unwrap().downcast_ref::<i64>(), Some(&5));

        let old = m.insert_entry("a", Box::new(6i64)).unwrap().unwrap();
        assert_eq!(old.take::<i64>().ok(), Some(5));

        let err = m.insert_entry("a", Box::new("x".to_string())).unwrap_err();
        assert!(matches!(err, ReflectError::ValueType { .. }));
    }

    #[test]
    fn map_token_knows_its_value_type() {
        let token = <BTreeMap<String, String> as StaticType>::token();
        assert_eq!(token.kind(), ValueKind::Assoc);
        assert!(token.element().unwrap().is::<String>());
        assert!(token.default_fn().is_some());
    }

    #[test]
    fn removed_entries_come_back_boxed() {
        let mut m: BTreeMap<String, i64> = BTreeMap::new();
        m.insert("a".to_string(), 1);
        let removed = Assoc::remove_entry(&mut m, "a").unwrap();
        assert_eq!(removed.take::<i64>().ok(), Some(1));
        assert!(Assoc::remove_entry(&mut m, "a").is_none());
    }
}
