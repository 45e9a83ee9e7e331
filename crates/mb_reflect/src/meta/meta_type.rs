//! Type-level path resolution.

use std::sync::Arc;

use crate::descriptor::{DescriptorCache, TypeDescriptor};
use crate::error::ReflectError;
use crate::path::PathSegment;
use crate::token::{StaticType, TypeToken, ValueKind};

/// Resolves property paths against declared types alone.
///
/// Every answer comes from type descriptors; no instance is consulted. An
/// indexed segment over a container substitutes the container's declared
/// element type.
pub struct MetaType<'c> {
    cache: &'c DescriptorCache,
    descriptor: Arc<TypeDescriptor>,
}

impl<'c> MetaType<'c> {
    pub fn of(token: TypeToken, cache: &'c DescriptorCache) -> Self {
        MetaType {
            cache,
            descriptor: cache.describe(token),
        }
    }

    pub fn for_type<T: StaticType>(cache: &'c DescriptorCache) -> Self {
        Self::of(T::token(), cache)
    }

    pub fn token(&self) -> TypeToken {
        self.descriptor.token()
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// The resolver for the declared type of one property. An optional
    /// property traverses as its element type: the link is nullable, not a
    /// different shape.
    pub fn meta_for(&self, property: &str) -> Result<MetaType<'c>, ReflectError> {
        let declared = self.descriptor.getter_type(property)?;
        Ok(Self::of(traversal_type(declared), self.cache))
    }

    // The read type of one segment: the declared property type, with the
    // container's element type substituted when the segment is indexed.
    fn segment_type(&self, seg: &PathSegment<'_>) -> Result<TypeToken, ReflectError> {
        self.property_type(seg.name(), seg.index().is_some())
    }

    fn property_type(&self, name: &str, indexed: bool) -> Result<TypeToken, ReflectError> {
        let declared = self.descriptor.getter_type(name)?;
        if indexed && matches!(declared.kind(), ValueKind::Seq | ValueKind::Assoc) {
            if let Some(element) = declared.element() {
                return Ok(element);
            }
        }
        Ok(declared)
    }

    /// The declared type a read of `path` produces.
    pub fn getter_type(&self, path: &str) -> Result<TypeToken, ReflectError> {
        let seg = PathSegment::parse(path);
        match seg.children() {
            Some(rest) => {
                let child = traversal_type(self.segment_type(&seg)?);
                MetaType::of(child, self.cache).getter_type(rest)
            }
            None => self.segment_type(&seg),
        }
    }

    /// The declared type a write to `path` expects. Intermediate segments
    /// resolve through getter types; only the final segment consults a
    /// setter.
    pub fn setter_type(&self, path: &str) -> Result<TypeToken, ReflectError> {
        let seg = PathSegment::parse(path);
        match seg.children() {
            Some(rest) => self.meta_for(seg.name())?.setter_type(rest),
            None => self.descriptor.setter_type(seg.name()),
        }
    }

    /// Whether every segment of `path` is readable by declaration.
    pub fn has_getter(&self, path: &str) -> bool {
        let seg = PathSegment::parse(path);
        if !self.descriptor.has_getter(seg.name()) {
            return false;
        }
        match seg.children() {
            Some(rest) => match self.segment_type(&seg) {
                Ok(child) => MetaType::of(traversal_type(child), self.cache).has_getter(rest),
                Err(_) => false,
            },
            None => true,
        }
    }

    /// Whether `path` ends in a writable property reachable through
    /// readable links.
    pub fn has_setter(&self, path: &str) -> bool {
        let seg = PathSegment::parse(path);
        match seg.children() {
            Some(rest) => {
                if !self.descriptor.has_setter(seg.name()) {
                    return false;
                }
                match self.meta_for(seg.name()) {
                    Ok(child) => child.has_setter(rest),
                    Err(_) => false,
                }
            }
            None => self.descriptor.has_setter(seg.name()),
        }
    }

    /// Canonicalizes a dotted path case-insensitively, segment by segment.
    /// With `strip_separators`, underscores in the query are ignored too.
    /// Returns `None` as soon as any segment fails to resolve. Indexes are
    /// not part of the canonical form.
    pub fn find_property(&self, name: &str, strip_separators: bool) -> Option<String> {
        let query: String = if strip_separators {
            name.chars().filter(|c| *c != '_').collect()
        } else {
            name.to_string()
        };
        let mut out = String::new();
        if self.build_property(&query, strip_separators, &mut out) && !out.is_empty() {
            Some(out)
        } else {
            None
        }
    }

    fn build_property(&self, path: &str, strip_separators: bool, out: &mut String) -> bool {
        let seg = PathSegment::parse(path);
        let Some(canonical) = self.descriptor.find_name(seg.name(), strip_separators) else {
            return false;
        };
        match seg.children() {
            Some(rest) => {
                out.push_str(canonical);
                out.push('.');
                match self.property_type(canonical, seg.index().is_some()) {
                    Ok(child) => MetaType::of(traversal_type(child), self.cache)
                        .build_property(rest, strip_separators, out),
                    Err(_) => false,
                }
            }
            None => {
                out.push_str(canonical);
                true
            }
        }
    }
}

// An optional link traverses as its element type; everything else as
// itself.
fn traversal_type(declared: TypeToken) -> TypeToken {
    if declared.kind() == ValueKind::Opt {
        declared.element().unwrap_or(declared)
    } else {
        declared
    }
}

// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(mb_reflect_derive::PropValue, Default, Clone, Debug)]
    #[prop(default)]
    struct Item {
        unit_price: f64,
        sku: String,
    }

    #[derive(mb_reflect_derive::PropValue, Default, Clone, Debug)]
    #[prop(default)]
    struct Order {
        id: i64,
        items: Vec<Item>,
        shipping: Option<Address>,
    }

    #[derive(mb_reflect_derive::PropValue, Default, Clone, Debug)]
    #[prop(default)]
    struct Address {
        city: String,
    }

    fn meta(cache: &DescriptorCache) -> MetaType<'_> {
        MetaType::for_type::<Order>(cache)
    }

    #[test]
    fn nested_getter_types() {
        let cache = DescriptorCache::new();
        let meta = meta(&cache);

        assert!(meta.getter_type("id").unwrap().is::<i64>());
        assert!(meta.getter_type("items").unwrap().is::<Vec<Item>>());
        // Indexing substitutes the element type, so the path keeps going.
        assert!(meta.getter_type("items[0]").unwrap().is::<Item>());
        assert!(meta.getter_type("items[0].unit_price").unwrap().is::<f64>());
    }

    #[test]
    fn optional_links_traverse_as_their_element() {
        let cache = DescriptorCache::new();
        let meta = meta(&cache);

        // The declared type of the link itself is the optional.
        assert!(meta.getter_type("shipping").unwrap().is::<Option<Address>>());
        // Descending sees through it: the link is nullable, not opaque.
        assert!(meta.getter_type("shipping.city").unwrap().is::<String>());
        assert!(meta.has_getter("shipping.city"));
        assert!(meta.has_setter("shipping.city"));
    }

    #[test]
    fn setter_traversal_ignores_indexes() {
        let cache = DescriptorCache::new();
        let meta = meta(&cache);

        assert!(meta.setter_type("id").unwrap().is::<i64>());
        assert!(meta.setter_type("shipping.city").unwrap().is::<String>());
        // Setter traversal resolves links by property name alone, so an
        // indexed link stops at the container type. Instance-level
        // resolution is what sees through live elements.
        assert!(meta.setter_type("items[0].sku").is_err());
    }

    #[test]
    fn has_getter_and_has_setter_walk_paths() {
        let cache = DescriptorCache::new();
        let meta = meta(&cache);

        assert!(meta.has_getter("items[0].sku"));
        assert!(!meta.has_getter("items[0].missing"));
        assert!(!meta.has_setter("items[0].sku"));
        assert!(!meta.has_setter("missing.sku"));
        assert!(!meta.has_getter("missing"));
    }

    #[test]
    fn find_property_canonicalizes_case() {
        let cache = DescriptorCache::new();
        let meta = meta(&cache);

        assert_eq!(
            meta.find_property("SHIPPING.CITY", false),
            Some("shipping.city".to_string()),
        );
        // The canonical form is idempotent.
        assert_eq!(
            meta.find_property("shipping.city", false),
            Some("shipping.city".to_string()),
        );
        assert_eq!(meta.find_property("shipping.missing", false), None);
        assert_eq!(meta.find_property("Id", false), Some("id".to_string()));
    }

    #[test]
    fn find_property_can_ignore_separators() {
        let cache = DescriptorCache::new();
        let meta = meta(&cache);

        assert_eq!(
            meta.find_property("items[0].unitprice", true),
            Some("items.unit_price".to_string()),
        );
        assert_eq!(meta.find_property("items[0].unitprice", false), None);
    }

    #[test]
    fn find_property_drops_indexes() {
        let cache = DescriptorCache::new();
        let meta = meta(&cache);

        // Indexes are not part of the canonical name; the element type
        // still resolves the rest of the path.
        assert_eq!(
            meta.find_property("Items[0].Unit_Price", false),
            Some("items.unit_price".to_string()),
        );
    }
}
