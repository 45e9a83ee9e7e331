//! Property copying between values of related types.

use crate::descriptor::DescriptorCache;
use crate::error::ReflectError;
use crate::value::PropValue;

/// Copies every property the two types share from `source` into `target`,
/// returning how many were copied.
///
/// A property is shared when the target can write it, the source can read
/// it, and the source's value type is assignable to the slot. Optional
/// slots copy whole, absent or not. Copying goes through
/// [`PropValue::try_clone`], so a shared property whose value does not
/// support cloning is an error.
///
/// # Examples
///
/// ```
/// use mb_reflect::{DescriptorCache, copy_matching};
///
/// #[derive(mb_reflect::derive::PropValue, Default, Clone, Debug)]
/// #[prop(default, clone)]
/// struct Draft {
///     title: String,
///     pages: i64,
/// }
///
/// let source = Draft { title: "intro".to_string(), pages: 12 };
/// let mut target = Draft::default();
///
/// let cache = DescriptorCache::new();
/// let copied = copy_matching(&source, &mut target, &cache).unwrap();
/// assert_eq!(copied, 2);
/// assert_eq!(target.title, "intro");
/// ```
pub fn copy_matching(
    source: &dyn PropValue,
    target: &mut dyn PropValue,
    cache: &DescriptorCache,
) -> Result<usize, ReflectError> {
    let source_desc = cache.describe(source.type_token());
    let target_desc = cache.describe(target.type_token());

    let mut copied = 0;
    for property in target_desc.setter_names() {
        let Ok(getter) = source_desc.getter(property) else {
            continue;
        };
        let setter = target_desc.setter(property)?;
        if !getter.value_type().is_assignable_to(&setter.value_type()) {
            continue;
        }
        let value = getter.invoke(source)?;
        let Some(cloned) = value.try_clone() else {
            return Err(ReflectError::NotCloneable {
                type_path: value.type_token().path(),
            });
        };
        setter.invoke(target, cloned)?;
        copied += 1;
    }
    Ok(copied)
}

// -----------------------------------------------------------------------------
