//! The process-wide descriptor cache.

use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use log::trace;

use super::TypeDescriptor;
use crate::token::TypeToken;

/// A concurrent cache of resolved [`TypeDescriptor`]s, keyed by type
/// identity.
///
/// Descriptors are built outside the map lock, so a slow schema never blocks
/// lookups of other types; when two threads race on the same type, one build
/// is discarded and both observe the same installed descriptor.
pub struct DescriptorCache {
    descriptors: DashMap<TypeId, Arc<TypeDescriptor>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        DescriptorCache {
            descriptors: DashMap::new(),
        }
    }

    /// The shared cache used by [`crate::wrap::default_env`].
    pub fn global() -> &'static DescriptorCache {
        static GLOBAL: OnceLock<DescriptorCache> = OnceLock::new();
        GLOBAL.get_or_init(DescriptorCache::new)
    }

    /// Returns the descriptor for `token`, building and caching it on first
    /// use. Types without a schema get an empty descriptor.
    pub fn describe(&self, token: TypeToken) -> Arc<TypeDescriptor> {
        if let Some(cached) = self.descriptors.get(&token.id()) {
            return Arc::clone(&cached);
        }
        trace!("building type descriptor for `{}`", token.path());
        let built = Arc::new(match token.schema() {
            Some(schema) => TypeDescriptor::build(schema),
            None => TypeDescriptor::empty(token),
        });
        Arc::clone(&self.descriptors.entry(token.id()).or_insert(built))
    }

    /// Whether a descriptor for `token` is already cached.
    pub fn contains(&self, token: &TypeToken) -> bool {
        self.descriptors.contains_key(&token.id())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Drops every cached descriptor. Outstanding references stay valid;
    /// later lookups rebuild.
    pub fn clear(&self) {
        self.descriptors.clear();
    }
}

impl Default for DescriptorCache {
    fn default() -> Self {
        DescriptorCache::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(mb_reflect_derive::PropValue, Default, Clone, Debug)]
    #[prop(default)]
    struct Cached {
        id: i64,
    }

    #[test]
    fn describe_caches_and_reuses() {
        use crate::token::StaticType;

        let cache = DescriptorCache::new();
        let token = <Cached as StaticType>::token();
        assert!(!cache.contains(&token));

        let first = cache.describe(token);
        let second = cache.describe(token);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert!(first.has_getter("id"));
    }

    #[test]
    fn clear_leaves_outstanding_descriptors_valid() {
        use crate::token::StaticType;

        let cache = DescriptorCache::new();
        let token = <Cached as StaticType>::token();
        let held = cache.describe(token);

        cache.clear();
        assert!(cache.is_empty());
        assert!(held.has_getter("id"));

        let rebuilt = cache.describe(token);
        assert!(!Arc::ptr_eq(&held, &rebuilt));
    }

    #[test]
    fn types_without_schema_get_empty_descriptors() {
        use crate::token::ValueKind;

        let cache = DescriptorCache::new();
        let token = TypeToken::of_type::<i64>(ValueKind::Scalar);
        let desc = cache.describe(token);
        assert!(desc.getter_names().is_empty());
    }
}
